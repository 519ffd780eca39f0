use thiserror::Error;

/// Errors surfaced while configuring or inspecting a cell
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CellError {
    /// The engine's mechanism library does not provide this mechanism
    #[error("Missing mechanism: {0}")]
    MissingMechanism(String),

    /// The attribute was never assigned on the compartment
    #[error("No such parameter: {0}")]
    MissingParameter(String),

    /// A value was given for a name the compartment cannot hold
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("No such section: {0}")]
    UnknownSection(usize),

    #[error("Unknown state variable: {0}")]
    UnknownStateVariable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CellError {
    fn from(err: serde_json::Error) -> Self {
        CellError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CellError>;
