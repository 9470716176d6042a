//! Internal, typed initialization errors. The public engine surface
//! collapses these to a plain `bool`, matching a host API that predates
//! `Result`-based error reporting.

use thiserror::Error;

/// Reasons [`crate::engine::ReverbEngine::initialize`] can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("sample rate must be a finite number of Hz in [8000, 192000]")]
    InvalidSampleRate,
    #[error("channel count must be 1 (mono) or 2 (stereo)")]
    InvalidChannelCount,
    #[error("maximum block size must be at least 1")]
    ZeroBlockSize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_non_empty() {
        for err in [
            EngineError::InvalidSampleRate,
            EngineError::InvalidChannelCount,
            EngineError::ZeroBlockSize,
        ] {
            assert!(!format!("{err}").is_empty());
        }
    }
}
