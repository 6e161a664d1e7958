//! End-to-end batch runs over real files.
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use super::*;
use crate::common::error::ErrorKind;
use crate::ooxml::docx::Package;
use crate::ooxml::docx::testing::{docx_bytes, nested_table_xml, paragraph_xml};
use crate::replace::ReplacementRule;

fn write_doc(path: &Path, runs: &[&str]) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, docx_bytes(&paragraph_xml(runs))).unwrap();
    path.to_path_buf()
}

fn year_rule() -> Vec<ReplacementRule> {
    vec![ReplacementRule::new("2024", "2025").unwrap()]
}

fn text_of(path: &Path) -> String {
    Package::open(path).unwrap().document().text()
}

#[test]
fn test_two_valid_and_one_wrong_extension() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_doc(&dir.path().join("a.docx"), &["Report 20", "24 Summary"]);
    let b = write_doc(&dir.path().join("b.docx"), &["FY2024"]);
    let c = dir.path().join("c.txt");
    fs::write(&c, b"2024").unwrap();

    let summary = process_documents(&[&a, &b, &c], &year_rule(), &BatchOptions::default(), |_, _| {});
    assert_eq!((summary.total, summary.success, summary.failure), (3, 2, 1));
    assert_eq!(summary.total_replacements(), 2);
    assert_eq!(
        summary.result_for(&c).unwrap().error_kind(),
        Some(ErrorKind::Validation)
    );
    assert_eq!(text_of(&a), "Report 2025 Summary");
    assert_eq!(text_of(&b), "FY2025");
    assert!(summary.result_for(&a).unwrap().backup_path.as_ref().unwrap().exists());
}

#[test]
fn test_callbacks_run_on_calling_thread() {
    let dir = tempfile::tempdir().unwrap();
    let paths: Vec<_> = (0..6)
        .map(|i| write_doc(&dir.path().join(format!("d{}.docx", i)), &["2024"]))
        .collect();
    let caller = thread::current().id();
    let progress = RefCell::new(Vec::new());
    let seen = RefCell::new(0);

    let summary = BatchCoordinator::new(BatchOptions::default().with_max_workers(3))
        .on_progress(|done, total| {
            assert_eq!(thread::current().id(), caller);
            progress.borrow_mut().push((done, total));
        })
        .on_result(|_| {
            assert_eq!(thread::current().id(), caller);
            *seen.borrow_mut() += 1;
        })
        .process(&paths, &year_rule());

    assert!(summary.all_succeeded());
    let expected: Vec<_> = (1..=6).map(|i| (i, 6)).collect();
    assert_eq!(*progress.borrow(), expected);
    assert_eq!(*seen.borrow(), 6);
}

#[test]
fn test_concurrent_same_basename_backups() {
    let root = tempfile::tempdir().unwrap();
    let backups = root.path().join("backups");
    let paths: Vec<_> = (0..8)
        .map(|i| write_doc(&root.path().join(format!("dept{}", i)).join("report.docx"), &["2024 #", i.to_string().as_str()]))
        .collect();
    let originals: Vec<_> = paths.iter().map(|p| fs::read(p).unwrap()).collect();

    let options = BatchOptions::default().with_backup_dir(Some(&backups)).with_max_workers(4);
    let summary = process_documents(&paths, &year_rule(), &options, |_, _| {});
    assert!(summary.all_succeeded());

    let mut backup_paths: Vec<_> = summary
        .results
        .iter()
        .map(|r| r.backup_path.clone().unwrap())
        .collect();
    for (path, original) in paths.iter().zip(&originals) {
        let backup = summary.result_for(path).unwrap().backup_path.as_ref().unwrap();
        assert_eq!(&fs::read(backup).unwrap(), original);
    }
    backup_paths.sort();
    backup_paths.dedup();
    assert_eq!(backup_paths.len(), 8);
    assert_eq!(fs::read_dir(&backups).unwrap().count(), 8);
}

#[test]
fn test_cancelled_before_start() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_doc(&dir.path().join("a.docx"), &["2024"]);
    let before = fs::read(&a).unwrap();

    let cancel = CancelHandle::new();
    cancel.cancel();
    let summary = BatchCoordinator::new(BatchOptions::default())
        .with_cancel_handle(cancel)
        .process(&[&a], &year_rule());

    assert!(summary.cancelled);
    assert_eq!(summary.total, 1);
    assert_eq!(summary.results[0].error_kind(), Some(ErrorKind::Cancelled));
    assert_eq!(fs::read(&a).unwrap(), before);
}

#[test]
fn test_unwritable_backup_dir() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_doc(&dir.path().join("a.docx"), &["2024"]);
    let before = fs::read(&a).unwrap();
    let blocker = dir.path().join("file-not-dir");
    fs::write(&blocker, b"").unwrap();

    let options = BatchOptions::default().with_backup_dir(Some(blocker.join("backups")));
    let summary = process_documents(&[&a], &year_rule(), &options, |_, _| {});
    let result = &summary.results[0];
    assert!(!result.success);
    assert_eq!(result.error_kind(), Some(ErrorKind::Backup));
    assert_eq!(result.backup_path, None);
    assert_eq!(fs::read(&a).unwrap(), before);
}

#[test]
fn test_failures_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_doc(&dir.path().join("good.docx"), &["2024"]);
    let deep = dir.path().join("deep.docx");
    fs::write(&deep, docx_bytes(&nested_table_xml(101, &paragraph_xml(&["2024"])))).unwrap();
    let deep_before = fs::read(&deep).unwrap();
    let missing = dir.path().join("missing.docx");
    let empty = dir.path().join("empty.docx");
    fs::write(&empty, b"").unwrap();

    let options = BatchOptions::default().with_backup_enabled(false);
    let summary = process_documents(&[&good, &deep, &missing, &empty, &good], &year_rule(), &options, |_, _| {});

    assert_eq!((summary.total, summary.success, summary.failure), (5, 1, 4));
    let kinds: Vec<_> = summary.failed().map(|r| r.error_kind().unwrap()).collect();
    assert!(kinds.contains(&ErrorKind::Structural));
    assert!(kinds.contains(&ErrorKind::NotFound));
    assert_eq!(kinds.iter().filter(|k| **k == ErrorKind::Validation).count(), 2);
    assert_eq!(fs::read(&deep).unwrap(), deep_before);
    assert_eq!(text_of(&good), "2025");
}

#[test]
fn test_summary_serializes() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_doc(&dir.path().join("a.docx"), &["2024"]);
    let summary = process_documents(&[&a], &year_rule(), &BatchOptions::default(), |_, _| {});
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["total"], 1);
    assert_eq!(json["results"][0]["counts"][0], 1);
}
