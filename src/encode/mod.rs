//! Constraint encoders: one function per opcode, organized into the four
//! families the original source groups them into. Every encoder takes
//! `&mut Session` plus its raw argument list and pushes assertions onto
//! `session.solver()`; none return a value beyond success/failure.

pub mod bifs;
pub mod boolean;
pub mod guards;
pub mod structural;

use serde_json::Value;
use z3::ast::Dynamic;

use crate::error::{BackendError, BackendResult};
use crate::session::Session;
use crate::wire::{TypeSig, WireTerm};

/// Parse argument `i` as an interchange term.
pub(crate) fn arg_term(args: &[Value], i: usize) -> BackendResult<WireTerm> {
    let v = args
        .get(i)
        .ok_or_else(|| BackendError::protocol(format!("missing argument {i}")))?;
    serde_json::from_value(v.clone())
        .map_err(|e| BackendError::protocol(format!("argument {i} is not a term: {e}")))
}

/// Parse argument `i` as a type signature (only `Psp`'s second argument).
pub(crate) fn arg_typesig(args: &[Value], i: usize) -> BackendResult<TypeSig> {
    let v = args
        .get(i)
        .ok_or_else(|| BackendError::protocol(format!("missing argument {i}")))?;
    serde_json::from_value(v.clone())
        .map_err(|e| BackendError::protocol(format!("argument {i} is not a type signature: {e}")))
}

/// Encode argument `i` directly into a `Term`-sorted Z3 value.
pub(crate) fn encode_arg<'ctx>(
    session: &mut Session<'ctx>,
    args: &[Value],
    i: usize,
) -> BackendResult<Dynamic<'ctx>> {
    let term = arg_term(args, i)?;
    session.encode_term(&term)
}

/// Read argument `i`'s `v` field as a plain integer, without encoding it
/// into the theory. Used where the original source reads a length bound
/// straight out of the JSON (`Ts`/`Nts`'s tuple size, `elm`'s index),
/// trusting the driver to send a concrete `Int` term there.
pub(crate) fn arg_int_literal(args: &[Value], i: usize) -> BackendResult<i64> {
    let v = args
        .get(i)
        .ok_or_else(|| BackendError::protocol(format!("missing argument {i}")))?;
    v.get("v")
        .and_then(Value::as_i64)
        .ok_or_else(|| BackendError::protocol(format!("argument {i} is not an integer literal")))
}
