//! Secure credential handling using the secrecy crate
//!
//! The interop bearer token and the state database URL are held as
//! [`SecretString`]. Memory is zeroed on drop, `Debug` output is redacted and
//! the value is only reachable through `expose_secret()`.
//!
//! # Example
//!
//! ```rust
//! use keyfed::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let token = secret_string("interop-token".to_string());
//! assert_eq!(token.expose_secret().as_ref(), "interop-token");
//! assert!(!format!("{token:?}").contains("interop-token"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret};
use zeroize::Zeroize;

/// Newtype wrapper for String that implements the required traits for Secret
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl SecretValue {
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Type alias for a secret string
pub type SecretString = Secret<SecretValue>;

/// Wrap a String as a SecretString
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_string_creation() {
        let secret = secret_string("bearer-token".to_string());
        assert_eq!(secret.expose_secret().as_ref(), "bearer-token");
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("sensitive-data".to_string());
        let debug_output = format!("{secret:?}");

        assert!(!debug_output.contains("sensitive-data"));
        assert!(debug_output.contains("REDACTED"));
    }

    #[test]
    fn test_blank_secret_is_empty() {
        assert!(secret_string("  \n".to_string()).expose_secret().is_empty());
        assert!(!secret_string("x".to_string()).expose_secret().is_empty());
    }
}
