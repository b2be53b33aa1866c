use std::fmt::Display;
use thiserror::Error;

/// Everything that can go wrong while toggling the mode or echoing
#[derive(Error, Debug)]
pub enum EchoErrorVariants {
    /// Writing a startup sequence to the terminal failed
    #[error("failed to write the {sequence} sequence: {source}")]
    ModeSequence {
        /// Which sequence could not be written
        sequence: &'static str,

        /// Underlying write failure
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    IOError(std::io::Error),
}

/// Error returned by [`crate::EchoLoop::run`], wrapping [`EchoErrorVariants`]
#[derive(Debug)]
pub struct EchoError(pub EchoErrorVariants);

impl EchoError {
    pub(crate) fn mode_sequence(sequence: &'static str, source: std::io::Error) -> Self {
        Self(EchoErrorVariants::ModeSequence { sequence, source })
    }

    /// Whether the failure was the reader on the other end of stdout going away
    pub fn is_broken_pipe(&self) -> bool {
        let err = match &self.0 {
            EchoErrorVariants::ModeSequence { source, .. } => source,
            EchoErrorVariants::IOError(err) => err,
        };
        err.kind() == std::io::ErrorKind::BrokenPipe
    }
}

impl From<std::io::Error> for EchoError {
    fn from(err: std::io::Error) -> Self {
        Self(EchoErrorVariants::IOError(err))
    }
}

impl Display for EchoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
impl std::error::Error for EchoError {}

/// Standard [`std::result::Result`], with [`EchoError`] as the error variant
pub type Result<T> = std::result::Result<T, EchoError>;
