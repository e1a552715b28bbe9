//! Error types for the symbolic-constraint backend.
//!
//! Three kinds, matching the three failure categories a session can hit:
//! a malformed or unrecognized command (protocol error, poisons the
//! session), a solver that returned `unknown` (not fatal, just means the
//! driver gets no model back), and an internal invariant violation (a
//! programming error, terminates the session).

use std::fmt;

/// Result type for backend operations.
pub type BackendResult<T = ()> = Result<T, BackendError>;

/// An error raised while processing a command or servicing a solve request.
#[derive(Debug)]
pub struct BackendError {
    pub kind: BackendErrorKind,
}

/// The category of backend error.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendErrorKind {
    /// A malformed command, an opcode with no encoder, an arity mismatch,
    /// or a type-spec with an unknown `t` tag. The session is poisoned:
    /// no further commands are accepted until `reset()`.
    Protocol { message: String },

    /// Z3 returned `unknown` (timeout or undecidable). Not fatal; the
    /// session is left usable, just with no model for this check.
    SolverUnknown,

    /// A programming-error-class failure: decoding a model slot that
    /// doesn't exist, or indexing past a bounded-operation cap. The
    /// session is unusable past this point.
    Internal { message: String },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            BackendErrorKind::Protocol { message } => {
                write!(f, "protocol error: {message}")
            }
            BackendErrorKind::SolverUnknown => {
                write!(f, "solver returned unknown")
            }
            BackendErrorKind::Internal { message } => {
                write!(f, "internal error: {message}")
            }
        }
    }
}

impl std::error::Error for BackendError {}

impl BackendError {
    pub fn protocol(message: impl Into<String>) -> Self {
        Self {
            kind: BackendErrorKind::Protocol {
                message: message.into(),
            },
        }
    }

    pub fn solver_unknown() -> Self {
        Self {
            kind: BackendErrorKind::SolverUnknown,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: BackendErrorKind::Internal {
                message: message.into(),
            },
        }
    }

    /// True for errors that poison the session (§7: protocol and internal
    /// errors do; a solver-unknown result does not).
    pub fn poisons_session(&self) -> bool {
        !matches!(self.kind, BackendErrorKind::SolverUnknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solver_unknown_does_not_poison() {
        assert!(!BackendError::solver_unknown().poisons_session());
    }

    #[test]
    fn protocol_and_internal_poison() {
        assert!(BackendError::protocol("bad opcode").poisons_session());
        assert!(BackendError::internal("missing model slot").poisons_session());
    }

    #[test]
    fn display_is_human_readable() {
        let e = BackendError::protocol("unknown opcode 'Zzz'");
        assert_eq!(e.to_string(), "protocol error: unknown opcode 'Zzz'");
    }
}
