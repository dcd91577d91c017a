//! Error type shared by all components of the simulator.
//!
//! Every fallible operation in the crate returns `Result<_, SimulatorError>`.
//! Errors always propagate out of the call that raised them; nothing in the
//! library logs and swallows.

use std::fmt;

/// The error kinds a rotor machine simulation can produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulatorError {
    /// The supplied data is not a bijection of 0..n.
    InvalidPermutation(String),
    /// A rotor id was referenced that the active rotor set does not contain.
    UnknownRotorId(u32),
    /// A rotor set file could not be parsed.
    RotorSetFormat(String),
    /// A symbol is outside the configured alphabet.
    AlphabetMismatch(char),
    /// An input character is not in the machine's input alphabet for the
    /// current shift state.
    UnknownSymbol(char),
    /// An operation was requested before the machine was fully set up.
    MachineNotReady(String),
    /// A state document could not be parsed.
    StateFormat(String),
    /// A parsed state violates a machine invariant.
    StateInvariantViolation(String),
    /// An indicator group failed verification during decryption.
    IndicatorInvalid(String),
    /// Two copies of the same indicator disagree.
    IndicatorInconsistent,
    /// A message header does not match the expected layout.
    HeaderFormat(String),
    /// A randomizer token or procedure is not supported by the machine.
    UnsupportedProcedure(String),
    /// An underlying I/O operation failed.
    IOError(String),
    /// The command line transport payload is malformed.
    TransportError(String),
}

impl fmt::Display for SimulatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulatorError::InvalidPermutation(msg) => write!(f, "invalid permutation: {}", msg),
            SimulatorError::UnknownRotorId(id) => write!(f, "unknown rotor id {}", id),
            SimulatorError::RotorSetFormat(msg) => write!(f, "rotor set format error: {}", msg),
            SimulatorError::AlphabetMismatch(c) => write!(f, "symbol '{}' not in alphabet", c),
            SimulatorError::UnknownSymbol(c) => write!(f, "unknown input symbol '{}'", c),
            SimulatorError::MachineNotReady(msg) => write!(f, "machine not ready: {}", msg),
            SimulatorError::StateFormat(msg) => write!(f, "state format error: {}", msg),
            SimulatorError::StateInvariantViolation(msg) => {
                write!(f, "state invariant violated: {}", msg)
            }
            SimulatorError::IndicatorInvalid(msg) => write!(f, "invalid indicator: {}", msg),
            SimulatorError::IndicatorInconsistent => write!(f, "indicator groups inconsistent"),
            SimulatorError::HeaderFormat(msg) => write!(f, "header has wrong format: {}", msg),
            SimulatorError::UnsupportedProcedure(msg) => {
                write!(f, "unsupported procedure: {}", msg)
            }
            SimulatorError::IOError(msg) => write!(f, "i/o error: {}", msg),
            SimulatorError::TransportError(msg) => write!(f, "transport error: {}", msg),
        }
    }
}

impl std::error::Error for SimulatorError {}

impl From<std::io::Error> for SimulatorError {
    fn from(err: std::io::Error) -> Self {
        SimulatorError::IOError(err.to_string())
    }
}

/// Shorthand used throughout the crate.
pub type Result<T> = std::result::Result<T, SimulatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            SimulatorError::UnknownRotorId(42).to_string(),
            "unknown rotor id 42"
        );
        assert_eq!(
            SimulatorError::UnknownSymbol('9').to_string(),
            "unknown input symbol '9'"
        );
        assert_eq!(
            SimulatorError::IndicatorInconsistent.to_string(),
            "indicator groups inconsistent"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: SimulatorError = io.into();
        assert!(matches!(err, SimulatorError::IOError(_)));
    }
}
