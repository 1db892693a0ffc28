use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The run would produce an empty products artifact.
    #[error("no products: none of the {products_sources} product source(s) yielded a catalog entry")]
    NoProducts { products_sources: usize },

    #[error("invalid pipeline options: {0}")]
    InvalidOptions(String),
}
