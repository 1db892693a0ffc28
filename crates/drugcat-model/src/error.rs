use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown field domain: {0}")]
    UnknownFieldDomain(String),
    #[error("unknown table kind: {0}")]
    UnknownTableKind(String),
    #[error("row has {found} cells but table has {expected} columns")]
    RowWidth { expected: usize, found: usize },
}

pub type Result<T> = std::result::Result<T, ModelError>;
