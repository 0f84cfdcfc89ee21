//! Validated name newtypes for game entities
//!
//! These newtypes ensure that names are valid by construction:
//! - `QuantityName` is lower-cased, at most 32 characters, `^[0-9a-z][0-9a-z\-_]*$`
//! - `RuleTag` matches `^[a-z\-]+$`

use std::borrow::Borrow;
use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Maximum length for quantity names and aliases
pub const MAX_QUANTITY_NAME_LENGTH: usize = 32;

static QUANTITY_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-z][0-9a-z\-_]*$").expect("valid regex"));
static RULE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z\-]+$").expect("valid regex"));

// ============================================================================
// QuantityName
// ============================================================================

/// A validated quantity name or alias (lower-case, <=32 chars)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QuantityName(String);

impl QuantityName {
    /// Create a new validated quantity name. Input is lower-cased first.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the name is too long or contains
    /// characters outside `[0-9a-z\-_]` (or starts with `-`/`_`).
    pub fn new(name: impl AsRef<str>) -> Result<Self, DomainError> {
        let name = name.as_ref().to_lowercase();
        if name.chars().count() > MAX_QUANTITY_NAME_LENGTH {
            return Err(DomainError::validation(format!(
                "Quantity name {name:?} is too long"
            )));
        }
        if !QUANTITY_NAME_RE.is_match(&name) {
            return Err(DomainError::validation(format!(
                "Quantity name {name:?} is invalid"
            )));
        }
        Ok(Self(name))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuantityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for QuantityName {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<QuantityName> for String {
    fn from(name: QuantityName) -> String {
        name.0
    }
}

impl PartialEq<str> for QuantityName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

// ============================================================================
// RuleTag
// ============================================================================

/// A validated rule section tag
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RuleTag(String);

impl RuleTag {
    /// Tag of the sentinel node every rule tree hangs from.
    pub const ROOT: &'static str = "root";

    /// Create a new validated rule tag.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` unless the tag matches `^[a-z\-]+$`.
    pub fn new(tag: impl Into<String>) -> Result<Self, DomainError> {
        let tag = tag.into();
        if !RULE_TAG_RE.is_match(&tag) {
            return Err(DomainError::validation(format!("Invalid rule tag: {tag:?}")));
        }
        Ok(Self(tag))
    }

    pub fn root() -> Self {
        Self(Self::ROOT.to_string())
    }

    pub fn is_root(&self) -> bool {
        self.0 == Self::ROOT
    }

    /// Returns the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for RuleTag {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl Borrow<str> for RuleTag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<RuleTag> for String {
    fn from(tag: RuleTag) -> String {
        tag.0
    }
}
