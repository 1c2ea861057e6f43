use thiserror::Error;

/// Errors raised while building or fitting a pLSA model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlsaError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Non-finite {stage} value at iteration {iteration}")]
    NumericalInstability {
        stage: &'static str,
        iteration: usize,
    },

    #[error("Column {column} of the {matrix} matrix has a negative corner cell after {attempts} draws")]
    DegenerateInitialization {
        matrix: &'static str,
        column: usize,
        attempts: usize,
    },

    #[error("Did not converge within {iterations} iterations (last delta = {last_delta})")]
    NonConvergence { iterations: usize, last_delta: f64 },
}

impl PlsaError {
    pub(crate) fn invalid<S: Into<String>>(reason: S) -> PlsaError {
        PlsaError::InvalidConfiguration(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, PlsaError>;
