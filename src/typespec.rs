//! The Type-Spec Binder: translates a `{t, i?, a?}` type signature into
//! (at most) one Z3 constraint over an already-encoded `Term` value.
//! Grounded on the `_bind_term_to_*` family in `z3_utils.py`.
//!
//! `any()` carries no constraint, so binding returns `Option<Bool>`
//! rather than `Bool`: `None` means "no assertion needed", matching the
//! original returning Python `None` for that case. Unlike the original,
//! a `union()` member that itself binds to `None` (an `any()` arm) makes
//! the whole union unconstrained rather than being passed into `Or()` —
//! the original would crash building `Or` over a `None` entry.

use serde_json::Value;
use z3::ast::{Ast, Bool, Dynamic};

use crate::error::{BackendError, BackendResult};
use crate::session::Session;
use crate::term::TermTheory;
use crate::util::ite_bool;
use crate::wire::TypeSig;

pub fn bind<'ctx>(
    session: &mut Session<'ctx>,
    x: &Dynamic<'ctx>,
    typesig: &TypeSig,
) -> BackendResult<Option<Bool<'ctx>>> {
    match typesig.t.as_str() {
        "literal" => {
            let info = require_info(typesig)?;
            let term: crate::wire::WireTerm = serde_json::from_value(info.clone())
                .map_err(|e| BackendError::protocol(format!("literal type spec: {e}")))?;
            let lit = session.encode_term(&term)?;
            Ok(Some(x._eq(&lit)))
        }
        "any" => Ok(None),
        "atom" => Ok(Some(session.theory().is_atm(x))),
        "boolean" => {
            let truthy = session.atom_true().clone();
            let falsy = session.atom_false().clone();
            Ok(Some(Bool::or(session.theory().ctx(), &[&x._eq(&truthy), &x._eq(&falsy)])))
        }
        "byte" => Ok(Some(int_range(session.theory(), x, 0, 255))),
        "char" => Ok(Some(char_constraint(session.theory(), x))),
        "float" => Ok(Some(session.theory().is_real(x))),
        "integer" => {
            let theory = session.theory();
            let is_int = theory.is_int(x);
            let info = typesig.i.as_ref().and_then(Value::as_str).unwrap_or("any");
            let refined = match info {
                "pos" => Some(theory.ival(x).gt(&z3::ast::Int::from_i64(theory.ctx(), 0))),
                "neg" => Some(theory.ival(x).lt(&z3::ast::Int::from_i64(theory.ctx(), 0))),
                "non_neg" => Some(theory.ival(x).ge(&z3::ast::Int::from_i64(theory.ctx(), 0))),
                "any" => None,
                other => {
                    return Err(BackendError::protocol(format!(
                        "unknown integer refinement `{other}`"
                    )))
                }
            };
            Ok(Some(match refined {
                Some(r) => Bool::and(theory.ctx(), &[&is_int, &r]),
                None => is_int,
            }))
        }
        "list" => bind_list(session, x, typesig, false, false),
        "nelist" => bind_list(session, x, typesig, true, false),
        "string" => bind_list(session, x, typesig, false, true),
        "nestring" => bind_list(session, x, typesig, true, true),
        "number" => {
            let theory = session.theory();
            Ok(Some(Bool::or(theory.ctx(), &[&theory.is_int(x), &theory.is_real(x)])))
        }
        "range" => bind_range(session, x, typesig),
        "timeout" => {
            let theory = session.theory();
            let ctx = theory.ctx();
            let infinity = session.atom_infinity().clone();
            let is_nonneg_int = Bool::and(
                ctx,
                &[&theory.is_int(x), &theory.ival(x).ge(&z3::ast::Int::from_i64(ctx, 0))],
            );
            Ok(Some(Bool::or(ctx, &[&x._eq(&infinity), &is_nonneg_int])))
        }
        "tuple" => bind_tuple(session, x, typesig),
        "union" => bind_union(session, x, typesig),
        other => Err(BackendError::protocol(format!("unknown type spec `{other}`"))),
    }
}

fn require_info(typesig: &TypeSig) -> BackendResult<&Value> {
    typesig
        .i
        .as_ref()
        .ok_or_else(|| BackendError::protocol(format!("type spec `{}` requires `i`", typesig.t)))
}

fn int_range<'ctx>(theory: &TermTheory<'ctx>, x: &Dynamic<'ctx>, lo: i64, hi: i64) -> Bool<'ctx> {
    let ctx = theory.ctx();
    let v = theory.ival(x);
    Bool::and(
        ctx,
        &[
            &theory.is_int(x),
            &v.ge(&z3::ast::Int::from_i64(ctx, lo)),
            &v.le(&z3::ast::Int::from_i64(ctx, hi)),
        ],
    )
}

fn char_constraint<'ctx>(theory: &TermTheory<'ctx>, x: &Dynamic<'ctx>) -> Bool<'ctx> {
    int_range(theory, x, 0, 0x10ffff)
}

fn bind_range<'ctx>(
    session: &mut Session<'ctx>,
    x: &Dynamic<'ctx>,
    typesig: &TypeSig,
) -> BackendResult<Option<Bool<'ctx>>> {
    let args = typesig
        .a
        .as_ref()
        .filter(|a| a.len() >= 2)
        .ok_or_else(|| BackendError::protocol("range type spec requires two bounds"))?;
    let from_term: crate::wire::WireTerm = serde_json::from_value(
        args[0]
            .get("i")
            .cloned()
            .ok_or_else(|| BackendError::protocol("range lower bound missing `i`"))?,
    )
    .map_err(|e| BackendError::protocol(format!("range lower bound: {e}")))?;
    let to_term: crate::wire::WireTerm = serde_json::from_value(
        args[1]
            .get("i")
            .cloned()
            .ok_or_else(|| BackendError::protocol("range upper bound missing `i`"))?,
    )
    .map_err(|e| BackendError::protocol(format!("range upper bound: {e}")))?;

    let from_z3 = session.encode_term(&from_term)?;
    let to_z3 = session.encode_term(&to_term)?;
    let theory = session.theory();
    Ok(Some(Bool::and(
        theory.ctx(),
        &[
            &theory.is_int(x),
            &theory.ival(x).ge(&theory.ival(&from_z3)),
            &theory.ival(x).le(&theory.ival(&to_z3)),
        ],
    )))
}

/// Shared helper for `list`/`nelist`/`string`/`nestring`: an `i`-bounded
/// `If`-chain over up to `max_len` `cons` cells (§4.3), each cell either
/// required to hold a `char` (the string variants) or to satisfy a
/// nested element type spec (the `i` field), or left unconstrained when
/// `i` is absent or itself `any()`.
fn bind_list<'ctx>(
    session: &mut Session<'ctx>,
    x: &Dynamic<'ctx>,
    typesig: &TypeSig,
    non_empty: bool,
    is_string: bool,
) -> BackendResult<Option<Bool<'ctx>>> {
    let element_sig: Option<TypeSig> = match &typesig.i {
        Some(v) => {
            let sig: TypeSig = serde_json::from_value(v.clone())
                .map_err(|e| BackendError::protocol(format!("list element type spec: {e}")))?;
            if sig.t == "any" {
                None
            } else {
                Some(sig)
            }
        }
        None => None,
    };

    let max_len = session.config().max_len;
    let theory = session.theory();
    let ctx = theory.ctx();
    let shape_ok = theory.is_lst(x);
    let mut cur = theory.lval(x);
    let cons_ok = if non_empty { Some(theory.is_cons(&cur)) } else { None };

    let needs_element_constraint = is_string || element_sig.is_some();
    let mut ax: Option<Bool<'ctx>> = None;

    if needs_element_constraint {
        let mut steps = Vec::with_capacity(max_len as usize);
        for _ in 0..max_len {
            let h = theory.hd(&cur);
            let is_cons = theory.is_cons(&cur);
            let is_nil = theory.is_nil(&cur);
            steps.push((is_cons, h, is_nil));
            cur = theory.tl(&cur);
        }

        for (is_cons, h, is_nil) in steps.into_iter().rev() {
            let elem_ok = if is_string {
                char_constraint(session.theory(), &h)
            } else {
                bind(session, &h, element_sig.as_ref().unwrap())?
                    .unwrap_or_else(|| Bool::from_bool(session.theory().ctx(), true))
            };
            let ctx = session.theory().ctx();
            ax = Some(match ax {
                None => ite_bool(ctx, &is_cons, &elem_ok, &is_nil),
                Some(rest) => {
                    let cont = Bool::and(ctx, &[&elem_ok, &rest]);
                    ite_bool(ctx, &is_cons, &cont, &is_nil)
                }
            });
        }
    }

    let mut clauses = vec![shape_ok];
    if let Some(c) = cons_ok {
        clauses.push(c);
    }
    if let Some(a) = ax {
        clauses.push(a);
    }
    let refs: Vec<&Bool> = clauses.iter().collect();
    Ok(Some(Bool::and(ctx, &refs)))
}

fn bind_tuple<'ctx>(
    session: &mut Session<'ctx>,
    x: &Dynamic<'ctx>,
    typesig: &TypeSig,
) -> BackendResult<Option<Bool<'ctx>>> {
    let element_sigs: Vec<TypeSig> = match &typesig.a {
        Some(raw) => raw
            .iter()
            .map(|v| serde_json::from_value(v.clone()))
            .collect::<Result<_, _>>()
            .map_err(|e| BackendError::protocol(format!("tuple element type spec: {e}")))?,
        None => Vec::new(),
    };

    let theory = session.theory();
    let is_tpl = theory.is_tpl(x);
    if element_sigs.is_empty() {
        return Ok(Some(is_tpl));
    }

    let mut clauses = vec![is_tpl];
    let mut cur = theory.tval(x);
    for sig in &element_sigs {
        let theory = session.theory();
        clauses.push(theory.is_cons(&cur));
        let h = theory.hd(&cur);
        if let Some(c) = bind(session, &h, sig)? {
            clauses.push(c);
        }
        let theory = session.theory();
        cur = theory.tl(&cur);
    }
    let theory = session.theory();
    clauses.push(theory.is_nil(&cur));
    let ctx = theory.ctx();
    let refs: Vec<&Bool> = clauses.iter().collect();
    Ok(Some(Bool::and(ctx, &refs)))
}

fn bind_union<'ctx>(
    session: &mut Session<'ctx>,
    x: &Dynamic<'ctx>,
    typesig: &TypeSig,
) -> BackendResult<Option<Bool<'ctx>>> {
    let member_sigs: Vec<TypeSig> = match &typesig.a {
        Some(raw) => raw
            .iter()
            .map(|v| serde_json::from_value(v.clone()))
            .collect::<Result<_, _>>()
            .map_err(|e| BackendError::protocol(format!("union member type spec: {e}")))?,
        None => Vec::new(),
    };

    let mut clauses = Vec::with_capacity(member_sigs.len());
    for sig in &member_sigs {
        match bind(session, x, sig)? {
            Some(c) => clauses.push(c),
            None => return Ok(None),
        }
    }
    let ctx = session.theory().ctx();
    let refs: Vec<&Bool> = clauses.iter().collect();
    Ok(Some(Bool::or(ctx, &refs)))
}
