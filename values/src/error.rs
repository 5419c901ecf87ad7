use thiserror::Error;

/// Errors raised when constructing value types that carry invariants.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    #[error("Embedding is empty")]
    EmptyEmbedding,

    #[error("Embedding contains a non-finite value at index {0}")]
    NonFiniteEmbedding(usize),
}

pub type ValueResult<T> = std::result::Result<T, ValueError>;
