use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Protocol errors
    #[error("Invalid message format: {message}")]
    InvalidMessageFormat { message: String },

    #[error("Line exceeds maximum length {max}: got {length} bytes")]
    LineTooLong { length: usize, max: usize },

    // Validation errors
    #[error("{property} out of range: {value} not in {min}..={max}")]
    ValueOutOfRange {
        property: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Unknown input name: {0}")]
    UnknownInputName(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
