//! Physical access to an OPC package (the ZIP container).
//!
//! A package is read completely into memory as an ordered list of members.
//! Writing replays the members in their original order with their original
//! compression method, so an untouched package comes back structurally
//! identical.

use std::collections::HashSet;
use std::io::{Cursor, Read, Write};

use zip::write::{SimpleFileOptions, ZipWriter};
use zip::{CompressionMethod, ZipArchive};

use crate::ooxml::opc::error::{OpcError, Result};

/// How a member is stored in the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Stored,
    Deflated,
}

impl Compression {
    fn method(self) -> CompressionMethod {
        match self {
            Compression::Stored => CompressionMethod::Stored,
            Compression::Deflated => CompressionMethod::Deflated,
        }
    }
}

/// One entry of the ZIP container.
#[derive(Debug, Clone)]
pub struct Member {
    /// ZIP member name, without leading slash
    pub name: String,
    pub data: Vec<u8>,
    pub compression: Compression,
    pub is_dir: bool,
    pub last_modified: Option<zip::DateTime>,
}

/// Upper bounds on decompressed sizes while reading a package.
///
/// Header sizes are not trusted; the limits apply to the bytes actually
/// inflated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadLimits {
    /// Largest single member, decompressed
    pub max_member_size: u64,
    /// Largest sum of all members, decompressed
    pub max_total_size: u64,
}

impl Default for ReadLimits {
    fn default() -> Self {
        Self {
            max_member_size: 512 * 1024 * 1024,
            max_total_size: 1024 * 1024 * 1024,
        }
    }
}

/// Buffers start no larger than this, whatever the header claims.
const PREALLOC_LIMIT: u64 = 4 * 1024 * 1024;

/// Reads all members of a ZIP-based package.
pub struct PhysPkgReader;

impl PhysPkgReader {
    /// Decompress every member of `data`, preserving archive order, under
    /// the default [`ReadLimits`].
    ///
    /// Fails on a corrupt archive, on two members sharing a name, or on a
    /// member that inflates past the limits.
    pub fn read_members(data: &[u8]) -> Result<Vec<Member>> {
        Self::read_members_with(data, ReadLimits::default())
    }

    pub fn read_members_with(data: &[u8], limits: ReadLimits) -> Result<Vec<Member>> {
        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let mut members = Vec::with_capacity(archive.len());
        let mut seen = HashSet::with_capacity(archive.len());
        let mut total = 0u64;

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();
            if !seen.insert(name.to_ascii_lowercase()) {
                return Err(OpcError::DuplicateMember(name));
            }
            let compression = match file.compression() {
                CompressionMethod::Stored => Compression::Stored,
                _ => Compression::Deflated,
            };
            let limit = limits.max_member_size.min(limits.max_total_size.saturating_sub(total));
            let mut buf = Vec::with_capacity(file.size().min(limit).min(PREALLOC_LIMIT) as usize);
            (&mut file).take(limit.saturating_add(1)).read_to_end(&mut buf)?;
            if buf.len() as u64 > limit {
                return Err(OpcError::MemberTooLarge { name, limit });
            }
            total += buf.len() as u64;
            members.push(Member {
                name,
                data: buf,
                compression,
                is_dir: file.is_dir(),
                last_modified: file.last_modified(),
            });
        }

        Ok(members)
    }
}

/// Writes package members to an in-memory ZIP archive.
pub struct PhysPkgWriter {
    zip_writer: ZipWriter<Cursor<Vec<u8>>>,
}

impl PhysPkgWriter {
    pub fn new() -> Self {
        Self {
            zip_writer: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Append one member.
    pub fn write(&mut self, member: &Member) -> Result<()> {
        let mut options = SimpleFileOptions::default().compression_method(member.compression.method());
        if let Some(ts) = member.last_modified {
            options = options.last_modified_time(ts);
        }
        if member.is_dir {
            self.zip_writer.add_directory(member.name.as_str(), options)?;
            return Ok(());
        }
        self.zip_writer.start_file(member.name.as_str(), options)?;
        self.zip_writer.write_all(&member.data)?;
        Ok(())
    }

    /// Finalize the archive and return its bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self.zip_writer.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for PhysPkgWriter {
    fn default() -> Self {
        Self::new()
    }
}
