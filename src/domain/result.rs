//! Result type alias for keyfed
//!
//! This module provides a convenient Result type alias that uses KeyFedError
//! as the error type.

use super::errors::KeyFedError;

/// Result type alias for keyfed operations
///
/// # Examples
///
/// ```
/// use keyfed::domain::result::Result;
/// use keyfed::domain::errors::KeyFedError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(KeyFedError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, KeyFedError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::KeyFedError;

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(KeyFedError::Validation("test error".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
