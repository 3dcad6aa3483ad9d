use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not extract structured data from this document: {0}")]
    SchemaUnresolved(String),

    #[error("No catalog records match: {0}")]
    NoMatch(String),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Document is empty: {0}")]
    EmptyDocument(String),

    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}
