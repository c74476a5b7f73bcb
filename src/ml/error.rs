use thiserror::Error;

/// Failures raised by a forward step before the backend sees bad input.
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    /// Embedding lookup outside the table.
    #[error("token index {token} is out of range for a vocabulary of {vocab_size}")]
    TokenOutOfRange { token: usize, vocab_size: usize },

    /// Hidden state does not match (n_layers, 1, hidden_size).
    #[error("hidden state has shape {actual:?}, expected {expected:?}")]
    HiddenShape { expected: [usize; 3], actual: [usize; 3] },

    /// A continuous input carries the wrong number of features.
    #[error("input has {actual} features, expected {expected}")]
    InputWidth { expected: usize, actual: usize },

    #[error("attention history has {actual} rows but max_length is {max_length}")]
    HistoryLength { max_length: usize, actual: usize },

    #[error("attention history has shape {actual:?}, expected (1..={max_length}, {hidden_size})")]
    HistoryShape { max_length: usize, hidden_size: usize, actual: [usize; 2] },

    #[error("cannot encode an empty utterance")]
    EmptyUtterance,

    #[error("cannot fold an empty dialogue")]
    EmptyDialogue,

    /// Reading values back out of a tensor failed.
    #[error("tensor data: {0}")]
    TensorData(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
