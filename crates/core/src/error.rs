use oncoreg_types::PathError;

/// Errors raised while building or loading form schemas and configuration.
///
/// The per-request engine operations (visibility, branch resolution, validation) never
/// return these; they report through booleans, `Option` and `ValidationResult`.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid field path: {0}")]
    InvalidPath(#[from] PathError),
    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),
    #[error("invalid form declaration: {0}")]
    InvalidDeclaration(String),
    #[error("section '{section}' refers to unknown parent section '{parent}'")]
    UnknownParentSection { section: String, parent: String },
    #[error("definition file is for form '{found}', expected '{expected}'")]
    FormMismatch { expected: String, found: String },
    #[error("failed to read definition file: {0}")]
    FileRead(std::io::Error),
    #[error("form definition error: {0}")]
    Definition(#[from] ncrp::NcrpError),
    #[error("failed to parse form record: {0}")]
    RecordDeserialization(serde_json::Error),
}

pub type FormResult<T> = std::result::Result<T, FormError>;
