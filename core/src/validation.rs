use crate::{
    error::{Result, TaskError},
    models::{Credentials, NewTask, UpdateTask},
};

/// Validation utilities for task payloads
pub struct TaskValidator;

impl TaskValidator {
    /// Validate a task title
    ///
    /// Titles must:
    /// - Not be empty or only whitespace
    /// - Be at most 200 characters long
    ///
    /// # Returns
    /// * `Ok(())` - If the title is valid
    /// * `Err(TaskError::Validation)` - If the title is invalid
    pub fn validate_title(title: &str) -> Result<()> {
        let trimmed = title.trim();

        if trimmed.is_empty() {
            return Err(TaskError::validation("Title is required"));
        }

        if trimmed.len() > 200 {
            return Err(TaskError::validation(
                "Title must be at most 200 characters long",
            ));
        }

        Ok(())
    }

    /// Validate a task description; empty is allowed, it defaults to ""
    pub fn validate_description(description: &str) -> Result<()> {
        if description.len() > 2000 {
            return Err(TaskError::validation(
                "Description must be at most 2000 characters long",
            ));
        }

        Ok(())
    }

    /// Validate a complete NewTask structure
    pub fn validate_new_task(task: &NewTask) -> Result<()> {
        Self::validate_title(&task.title)?;
        Self::validate_description(&task.description)?;
        Ok(())
    }

    /// Validate a partial update; absent fields are not checked
    pub fn validate_update(update: &UpdateTask) -> Result<()> {
        if let Some(title) = &update.title {
            Self::validate_title(title)?;
        }
        if let Some(description) = &update.description {
            Self::validate_description(description)?;
        }
        Ok(())
    }
}

/// Validation utilities for registration and login input
pub struct CredentialValidator;

impl CredentialValidator {
    /// Both fields must be present and non-blank; the combined message
    /// mirrors what the registration endpoint reports.
    pub fn validate(credentials: &Credentials) -> Result<()> {
        if credentials.username.trim().is_empty() || credentials.password.is_empty() {
            return Err(TaskError::validation("Username and password are required"));
        }

        if credentials.username.len() > 50 {
            return Err(TaskError::validation(
                "Username must be at most 50 characters long",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_titles() {
        assert!(TaskValidator::validate_title("Write spec").is_ok());
        assert!(TaskValidator::validate_title("A").is_ok());
        assert!(TaskValidator::validate_title("Title with symbols: !@#$%").is_ok());
    }

    #[test]
    fn test_invalid_titles() {
        // Empty
        assert!(TaskValidator::validate_title("").is_err());

        // Only whitespace
        assert!(TaskValidator::validate_title("   ").is_err());

        // Too long
        assert!(TaskValidator::validate_title(&"a".repeat(201)).is_err());
    }

    #[test]
    fn test_empty_title_message() {
        let err = TaskValidator::validate_title("").unwrap_err();
        assert_eq!(err, TaskError::Validation("Title is required".to_string()));
    }

    #[test]
    fn test_descriptions() {
        assert!(TaskValidator::validate_description("").is_ok());
        assert!(TaskValidator::validate_description("details").is_ok());
        assert!(TaskValidator::validate_description(&"a".repeat(2001)).is_err());
    }

    #[test]
    fn test_validate_new_task() {
        let valid = NewTask {
            title: "Write spec".to_string(),
            description: String::new(),
            completed: false,
        };
        assert!(TaskValidator::validate_new_task(&valid).is_ok());

        let invalid = NewTask {
            title: "  ".to_string(),
            description: String::new(),
            completed: false,
        };
        assert!(TaskValidator::validate_new_task(&invalid).is_err());
    }

    #[test]
    fn test_validate_update_skips_absent_fields() {
        assert!(TaskValidator::validate_update(&UpdateTask::default()).is_ok());

        let completed_only = UpdateTask {
            completed: Some(true),
            ..Default::default()
        };
        assert!(TaskValidator::validate_update(&completed_only).is_ok());

        let blank_title = UpdateTask {
            title: Some("".to_string()),
            ..Default::default()
        };
        assert!(TaskValidator::validate_update(&blank_title).is_err());
    }

    #[test]
    fn test_credentials() {
        let valid = Credentials {
            username: "alice".to_string(),
            password: "secret".to_string(),
        };
        assert!(CredentialValidator::validate(&valid).is_ok());

        let missing_password = Credentials {
            username: "alice".to_string(),
            password: String::new(),
        };
        let err = CredentialValidator::validate(&missing_password).unwrap_err();
        assert_eq!(
            err,
            TaskError::Validation("Username and password are required".to_string())
        );

        let missing_username = Credentials {
            username: "  ".to_string(),
            password: "secret".to_string(),
        };
        assert!(CredentialValidator::validate(&missing_username).is_err());

        let oversized = Credentials {
            username: "a".repeat(51),
            password: "secret".to_string(),
        };
        assert!(CredentialValidator::validate(&oversized).is_err());
    }
}
