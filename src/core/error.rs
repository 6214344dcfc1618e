use thiserror::Error;

/// Error type definitions
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error")]
    Io(#[source] std::io::Error),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Duplicate column name: {0}")]
    DuplicateColumnName(String),

    #[error("Column type mismatch: column {name}, expected {expected}, found {found}")]
    ColumnTypeMismatch {
        name: String,
        expected: String,
        found: String,
    },

    #[error("Length mismatch: expected {expected}, actual {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Consistency error: {0}")]
    Consistency(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The compiled engine requires `(values, index)` as the only positional parameters
    #[error(
        "the first {expected} positional arguments to `{function}` must be (values, index); \
         it declares {found}"
    )]
    Arity {
        function: String,
        expected: usize,
        found: usize,
    },

    /// Keyword arguments cannot be forwarded to compiled functions
    #[error("the compiled engine does not support keyword arguments: {0}")]
    UnsupportedKeyword(String),

    /// A group result did not line up with the group's rows
    #[error("Shape error in group {group}: expected {expected} values, got {actual}")]
    Shape {
        group: String,
        expected: usize,
        actual: usize,
    },

    #[error("Compilation error: {0}")]
    Compilation(String),

    /// Failure raised from inside a user-supplied transform function
    #[error("Function error: {0}")]
    Function(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<crate::optimized::jit::JitError> for Error {
    fn from(err: crate::optimized::jit::JitError) -> Self {
        use crate::optimized::jit::JitError;

        match err {
            JitError::CompilationFailed(msg) => Error::Compilation(msg),
            JitError::ExecutionFailed(msg) => Error::Function(msg),
            JitError::InvalidConfig(msg) => Error::ConfigurationError(msg),
        }
    }
}
