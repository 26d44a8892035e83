//! Domain identifier types with validation
//!
//! Newtype wrappers for the opaque identifiers the pipeline passes around.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Batch tag newtype wrapper
///
/// An opaque cursor issued by the interop server identifying a position in
/// its ordered batch sequence. Never interpreted, only echoed back.
///
/// # Examples
///
/// ```
/// use keyfed::domain::ids::BatchTag;
/// use std::str::FromStr;
///
/// let tag = BatchTag::from_str("75b326f7-ae6f-42f6-9354-00c0a6b797b3").unwrap();
/// assert_eq!(tag.as_str(), "75b326f7-ae6f-42f6-9354-00c0a6b797b3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BatchTag(String);

impl BatchTag {
    /// Creates a new BatchTag from a string
    ///
    /// Returns `Err` if the tag is blank.
    pub fn new(tag: impl Into<String>) -> Result<Self, String> {
        let tag = tag.into();
        if tag.trim().is_empty() {
            return Err("Batch tag cannot be empty".to_string());
        }
        Ok(Self(tag))
    }

    /// Returns the batch tag as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BatchTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BatchTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for BatchTag {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BatchTag> for String {
    fn from(tag: BatchTag) -> Self {
        tag.0
    }
}

impl AsRef<str> for BatchTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Name of a secret held by the secret provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecretName(String);

impl SecretName {
    /// Creates a new SecretName, rejecting blank names
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("Secret name cannot be empty".to_string());
        }
        Ok(Self(name))
    }

    /// Returns the secret name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecretName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SecretName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
