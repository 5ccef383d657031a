//!A mod for the error types
use thiserror::Error;

use crate::sensor::SensorError;

///Error returned while building coinop from its configuration.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("BuildError: {0}")]
    Message(String),
    #[error("BuildError (multiple): \n{}", .0.join("\n"))]
    Messages(Vec<String>),
}

impl BuildError {
    pub fn from_string(msg: String) -> Self {
        BuildError::Message(msg)
    }
    pub fn from_errs(errs: Vec<BuildError>) -> Self {
        let mut messages = Vec::with_capacity(errs.len());
        for err in errs {
            match err {
                Self::Message(msg) => messages.push(msg),
                Self::Messages(mut msgs) => messages.append(&mut msgs),
            }
        }
        Self::Messages(messages)
    }
    pub fn message(msg: &str) -> Self {
        BuildError::Message(msg.to_string())
    }
}

impl From<SensorError> for BuildError {
    fn from(err: SensorError) -> Self {
        BuildError::from_string(err.to_string())
    }
}
