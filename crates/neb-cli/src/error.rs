use nebgen::workflows::generate::GenerateError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
