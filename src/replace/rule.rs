//! Replacement rules.
use serde::{Deserialize, Serialize};

use crate::common::error::{Error, Result};

/// A literal find/replace pair. `find` is never empty.
///
/// Rules are applied in the order the caller supplies them.
///
/// # Examples
///
/// ```
/// use docsplice::replace::ReplacementRule;
///
/// let rule = ReplacementRule::new("2024", "2025").unwrap();
/// assert_eq!(rule.find(), "2024");
/// assert!(ReplacementRule::new("", "x").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRule")]
pub struct ReplacementRule {
    find: String,
    replace: String,
}

#[derive(Deserialize)]
struct RawRule {
    find: String,
    #[serde(default)]
    replace: String,
}

impl TryFrom<RawRule> for ReplacementRule {
    type Error = Error;

    fn try_from(raw: RawRule) -> Result<Self> {
        Self::new(raw.find, raw.replace)
    }
}

impl ReplacementRule {
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Result<Self> {
        let find = find.into();
        if find.is_empty() {
            return Err(Error::Validation("replacement rule has an empty find string".to_string()));
        }
        Ok(Self {
            find,
            replace: replace.into(),
        })
    }

    #[inline]
    pub fn find(&self) -> &str {
        &self.find
    }

    #[inline]
    pub fn replace(&self) -> &str {
        &self.replace
    }
}

/// Pair up parallel find/replace lists, as given on a command line.
pub fn rules_from_pairs<F, R>(finds: &[F], replaces: &[R]) -> Result<Vec<ReplacementRule>>
where
    F: AsRef<str>,
    R: AsRef<str>,
{
    if finds.len() != replaces.len() {
        return Err(Error::Validation(format!(
            "{} find strings but {} replacements",
            finds.len(),
            replaces.len()
        )));
    }
    finds
        .iter()
        .zip(replaces)
        .map(|(f, r)| ReplacementRule::new(f.as_ref(), r.as_ref()))
        .collect()
}
