use crate::span::Position;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarkupError {
    /// Invalid decoupled logic resource. Processing of the template stops.
    #[error("error processing decoupled logic resource \"{resource}\" (line {line}, col {col}): {message}")]
    DecoupledLogic {
        resource: String,
        line: usize,
        col: usize,
        message: String,
    },

    #[error("invalid markup selector \"{selector}\": {message}")]
    Selector { selector: String, message: String },

    #[error("unable to read \"{resource}\"")]
    Io {
        resource: String,
        #[source]
        source: std::io::Error,
    },
}

impl MarkupError {
    pub(crate) fn decoupled_logic(
        resource: &str,
        position: Position,
        message: impl Into<String>,
    ) -> Self {
        MarkupError::DecoupledLogic {
            resource: resource.to_string(),
            line: position.line,
            col: position.col,
            message: message.into(),
        }
    }

    pub(crate) fn selector(selector: &str, message: impl Into<String>) -> Self {
        MarkupError::Selector {
            selector: selector.to_string(),
            message: message.into(),
        }
    }
}
