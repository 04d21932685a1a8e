//! Error types for the learnlab crate

use thiserror::Error;

/// Main error type for the learnlab crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("cluster count {k} is invalid for {points} points (must be between 1 and {points})")]
    InvalidClusterCount { k: usize, points: usize },

    #[error("{what} must not be empty")]
    EmptyInput { what: String },

    #[error("{what} contains a non-finite value ({value})")]
    NonFiniteValue { what: String, value: f64 },

    #[error("point {index} is assigned to cluster {cluster} but only {k} clusters exist")]
    InvalidAssignment { index: usize, cluster: usize, k: usize },

    #[error("{what} has {got} entries but {expected} points were given")]
    LengthMismatch {
        what: String,
        expected: usize,
        got: usize,
    },

    #[error("invalid grid layout: {message}")]
    InvalidGrid { message: String },

    #[error("invalid glyph '{glyph}' at row {row}, column {col} in grid layout")]
    InvalidGridGlyph { glyph: char, row: usize, col: usize },

    #[error("hyperparameter {name} = {value} is out of range ({expected})")]
    InvalidHyperparameter {
        name: String,
        value: f64,
        expected: String,
    },

    #[error("reward {name} = {value} must be finite")]
    InvalidReward { name: String, value: f64 },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("cell ({row}, {col}) is outside the {height}x{width} grid")]
    CellOutOfBounds {
        row: usize,
        col: usize,
        width: usize,
        height: usize,
    },

    #[error("q-table has {got} states but the grid has {expected}")]
    QTableShapeMismatch { expected: usize, got: usize },

    #[error("invalid number '{input}' in list '{list}'")]
    ParseList { input: String, list: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}

/// Reject NaN and infinities in a sequence of inputs.
pub(crate) fn ensure_finite<'a, I>(what: &str, values: I) -> Result<()>
where
    I: IntoIterator<Item = &'a f64>,
{
    match values.into_iter().find(|value| !value.is_finite()) {
        Some(&value) => Err(Error::NonFiniteValue {
            what: what.to_string(),
            value,
        }),
        None => Ok(()),
    }
}
