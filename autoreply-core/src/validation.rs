use crate::error::ValidationError;
use crate::keywords::KeywordSet;

/// Checks the required fields of the form.
///
/// Rules run in a fixed order (name, keywords, message) and the first
/// failing rule is reported on its own.
pub struct FormValidator;

impl FormValidator {
    pub fn validate(
        name: &str,
        keywords: &KeywordSet,
        dm_message: &str,
    ) -> Result<(), ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        if keywords.is_empty() {
            return Err(ValidationError::EmptyKeywords);
        }
        if dm_message.trim().is_empty() {
            return Err(ValidationError::MissingMessage);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords() -> KeywordSet {
        ["lead"].into_iter().collect()
    }

    #[test]
    fn test_valid_form() {
        assert_eq!(FormValidator::validate("Launch", &keywords(), "Hi!"), Ok(()));
    }

    #[test]
    fn test_missing_name_reported_first() {
        let result = FormValidator::validate("", &KeywordSet::new(), "");
        assert_eq!(result, Err(ValidationError::MissingName));
    }

    #[test]
    fn test_whitespace_name_is_missing() {
        let result = FormValidator::validate("   ", &keywords(), "Hi!");
        assert_eq!(result, Err(ValidationError::MissingName));
    }

    #[test]
    fn test_empty_keywords_before_message() {
        let result = FormValidator::validate("Launch", &KeywordSet::new(), "");
        assert_eq!(result, Err(ValidationError::EmptyKeywords));
    }

    #[test]
    fn test_missing_message() {
        let result = FormValidator::validate("Launch", &keywords(), " \n ");
        assert_eq!(result, Err(ValidationError::MissingMessage));
    }
}
