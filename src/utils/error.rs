use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("XML parsing error: {0}")]
    XmlError(#[from] quick_xml::DeError),

    #[error("XML writing error: {message}")]
    XmlWriteError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Storage constraint violated: {message}")]
    ConstraintViolation { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Storage,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::SerializationError(_)
            | EtlError::XmlError(_)
            | EtlError::ProcessingError { .. } => ErrorCategory::Input,
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            EtlError::ConstraintViolation { .. }
            | EtlError::DatabaseError(_)
            | EtlError::MigrationError(_) => ErrorCategory::Storage,
            EtlError::IoError(_) | EtlError::XmlWriteError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Process exit status for a failed run; never zero.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::SerializationError(_) => "Check that the input file is a JSON array of records",
            EtlError::XmlError(_) => "Check that the input file is a well-formed <Clients> document",
            EtlError::ConstraintViolation { .. } => {
                "Make sure referenced clients exist before importing invoices or products"
            }
            EtlError::DatabaseError(_) | EtlError::MigrationError(_) => {
                "Check that the database file is writable and not used by another process"
            }
            EtlError::ConfigError { .. } => {
                "Review the configuration file and command line flags"
            }
            EtlError::ConfigValidationError { .. } | EtlError::InvalidConfigValueError { .. } => {
                "Fix the reported configuration value and retry"
            }
            EtlError::IoError(_) => "Check that the file exists and is readable/writable",
            EtlError::XmlWriteError { .. } | EtlError::ProcessingError { .. } => {
                "Re-run with --verbose to see more detail"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input => format!("Input could not be processed: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Storage => format!("Nothing was saved: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

// 資料庫約束失敗視為資料問題，其餘錯誤保留原始 sqlx 錯誤
impl From<sqlx::Error> for EtlError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Database(db)
                if matches!(
                    db.kind(),
                    sqlx::error::ErrorKind::ForeignKeyViolation
                        | sqlx::error::ErrorKind::UniqueViolation
                        | sqlx::error::ErrorKind::CheckViolation
                        | sqlx::error::ErrorKind::NotNullViolation
                ) =>
            {
                EtlError::ConstraintViolation {
                    message: db.message().to_string(),
                }
            }
            _ => EtlError::DatabaseError(error),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_violation_is_storage_error() {
        let err = EtlError::ConstraintViolation {
            message: "invoice references unknown client 7".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.user_friendly_message().starts_with("Nothing was saved"));
    }

    #[test]
    fn test_every_failure_exits_non_zero() {
        let errors = [
            EtlError::ConstraintViolation {
                message: "duplicate link".to_string(),
            },
            EtlError::ProcessingError {
                message: "not UTF-8".to_string(),
            },
            EtlError::ConfigError {
                message: "bad file".to_string(),
            },
            EtlError::XmlWriteError {
                message: "writer closed".to_string(),
            },
            EtlError::IoError(std::io::Error::new(std::io::ErrorKind::NotFound, "absent.json")),
        ];
        let codes: Vec<i32> = errors.iter().map(EtlError::exit_code).collect();
        assert_eq!(codes, vec![2, 1, 1, 3, 3]);
    }

    #[test]
    fn test_pool_error_is_database_error() {
        let err: EtlError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, EtlError::DatabaseError(_)));
        assert_eq!(err.category(), ErrorCategory::Storage);
    }

    #[test]
    fn test_json_error_is_input_error() {
        let err: EtlError = serde_json::from_str::<Vec<u32>>("{").unwrap_err().into();
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }
}
