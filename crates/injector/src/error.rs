use thiserror::Error;

/// Result type for injection operations
pub type Result<T> = std::result::Result<T, InjectorError>;

/// Errors that can occur while rewriting a literal
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InjectorError {
    /// The value cannot be written as the declared type
    #[error("Cannot write {value} into `{name}` declared as {declared_type}")]
    InvalidLiteral {
        name: String,
        declared_type: String,
        value: String,
    },
}
