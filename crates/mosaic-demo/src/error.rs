#![forbid(unsafe_code)]

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error(transparent)]
    Overlay(#[from] mosaic::Error),
    #[error("window backend unavailable: {0}")]
    Window(String),
}

impl DemoError {
    /// Process exit code: 2 for configuration problems, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Overlay(mosaic::Error::Config(_)) => 2,
            Self::Overlay(_) | Self::Window(_) => 1,
        }
    }
}

impl From<mosaic::ConfigError> for DemoError {
    fn from(err: mosaic::ConfigError) -> Self {
        Self::Overlay(err.into())
    }
}

pub type Result<T> = std::result::Result<T, DemoError>;
