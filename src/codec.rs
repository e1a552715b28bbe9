//! Term Codec: converts interchange-format terms (symbolic, concrete, or
//! aliased) to `Term` theory values and back.
//!
//! Grounded on `json_term_to_z3`/`z3_term_to_json` and their helpers in
//! `z3_utils.py`.

use std::collections::HashMap;

use serde_json::Value;
use z3::ast::{Ast, Dynamic, Int, Real};
use z3::Solver;

use crate::env::Environment;
use crate::error::{BackendError, BackendResult};
use crate::term::TermTheory;
use crate::wire::{ConcreteTerm, WireTerm};

/// Encode an interchange term into a `Term`-sorted Z3 value.
pub fn encode<'ctx>(
    theory: &TermTheory<'ctx>,
    env: &mut Environment<'ctx>,
    solver: &Solver<'ctx>,
    term: &WireTerm,
) -> BackendResult<Dynamic<'ctx>> {
    encode_with_ambient(theory, env, solver, term, &HashMap::new())
}

fn encode_with_ambient<'ctx>(
    theory: &TermTheory<'ctx>,
    env: &mut Environment<'ctx>,
    solver: &Solver<'ctx>,
    term: &WireTerm,
    ambient: &HashMap<String, WireTerm>,
) -> BackendResult<Dynamic<'ctx>> {
    match term {
        WireTerm::Symbolic { s } => Ok(env.resolve(s)),
        WireTerm::Aliased { l, d } => {
            let dict = if d.is_empty() { ambient } else { d };
            encode_aliased(theory, env, solver, l, dict)
        }
        WireTerm::Concrete(c) => {
            let dict = c.d.as_ref().unwrap_or(ambient);
            encode_concrete(theory, env, solver, c, dict)
        }
    }
}

/// On first encounter of alias `name`: allocate a fresh variable, encode
/// `dict[name]` concretely, assert equality, and memoize. Later
/// occurrences return the memoized variable without re-asserting.
fn encode_aliased<'ctx>(
    theory: &TermTheory<'ctx>,
    env: &mut Environment<'ctx>,
    solver: &Solver<'ctx>,
    name: &str,
    dict: &HashMap<String, WireTerm>,
) -> BackendResult<Dynamic<'ctx>> {
    if let Some(existing) = env.lookup(name) {
        return Ok(existing);
    }
    let fresh = env.resolve(name);
    let payload = dict
        .get(name)
        .ok_or_else(|| BackendError::protocol(format!("alias '{name}' missing from dictionary")))?;
    let encoded = encode_with_ambient(theory, env, solver, payload, dict)?;
    solver.assert(&fresh._eq(&encoded));
    Ok(fresh)
}

fn encode_concrete<'ctx>(
    theory: &TermTheory<'ctx>,
    env: &mut Environment<'ctx>,
    solver: &Solver<'ctx>,
    c: &ConcreteTerm,
    ambient: &HashMap<String, WireTerm>,
) -> BackendResult<Dynamic<'ctx>> {
    match c.t.as_str() {
        "Int" => {
            let n = c
                .v
                .as_i64()
                .ok_or_else(|| BackendError::protocol("Int payload must be an integer"))?;
            Ok(theory.mk_int(&Int::from_i64(theory.ctx(), n)))
        }
        "Real" => {
            let (num, den) = decode_rational_literal(&c.v)?;
            Ok(theory.mk_real(&Real::from_real(theory.ctx(), num, den)))
        }
        "List" | "Tuple" => {
            let arr = c
                .v
                .as_array()
                .ok_or_else(|| BackendError::protocol(format!("{} payload must be an array", c.t)))?;
            let mut acc = theory.nil();
            for elem in arr.iter().rev() {
                let wt: WireTerm = serde_json::from_value(elem.clone())
                    .map_err(|e| BackendError::protocol(format!("malformed element: {e}")))?;
                let enc = encode_with_ambient(theory, env, solver, &wt, ambient)?;
                acc = theory.cons(&enc, &acc);
            }
            Ok(if c.t == "List" {
                theory.mk_lst(&acc)
            } else {
                theory.mk_tpl(&acc)
            })
        }
        "Atom" => {
            let arr = c
                .v
                .as_array()
                .ok_or_else(|| BackendError::protocol("Atom payload must be an array"))?;
            let codes = arr
                .iter()
                .map(|v| {
                    v.as_i64()
                        .ok_or_else(|| BackendError::protocol("Atom codes must be integers"))
                })
                .collect::<BackendResult<Vec<i64>>>()?;
            Ok(theory.mk_atom_term(&codes))
        }
        other => Err(BackendError::protocol(format!(
            "unknown concrete term kind '{other}'"
        ))),
    }
}

/// Decompose a JSON number into an exact numerator/denominator pair by
/// reading its decimal textual form (rather than its float bit pattern),
/// so `3.5` becomes exactly `35/10`.
fn decode_rational_literal(v: &Value) -> BackendResult<(i32, i32)> {
    if let Some(i) = v.as_i64() {
        return Ok((
            i32::try_from(i).map_err(|_| BackendError::protocol("Real literal out of range"))?,
            1,
        ));
    }
    let s = v
        .as_f64()
        .map(|_| v.to_string())
        .ok_or_else(|| BackendError::protocol("Real payload must be numeric"))?;
    match s.find('.') {
        Some(dot) => {
            let decimals = (s.len() - dot - 1) as u32;
            let digits: String = s.chars().filter(|c| *c != '.').collect();
            let numerator: i64 = digits
                .parse()
                .map_err(|_| BackendError::protocol("malformed Real literal"))?;
            let denominator = 10i64.pow(decimals);
            Ok((
                i32::try_from(numerator)
                    .map_err(|_| BackendError::protocol("Real literal out of range"))?,
                i32::try_from(denominator)
                    .map_err(|_| BackendError::protocol("Real literal out of range"))?,
            ))
        }
        None => {
            let i: i64 = s
                .parse()
                .map_err(|_| BackendError::protocol("malformed Real literal"))?;
            Ok((
                i32::try_from(i).map_err(|_| BackendError::protocol("Real literal out of range"))?,
                1,
            ))
        }
    }
}

/// Decode a concrete (post-model, fully simplified) theory term back into
/// interchange JSON. Dispatches on which `Term` variant the value matches.
pub fn decode<'ctx>(theory: &TermTheory<'ctx>, term: &Dynamic<'ctx>) -> BackendResult<Value> {
    let term = term.simplify();
    if is_true(&theory.is_int(&term)) {
        let n = theory.ival(&term).simplify();
        let i = n
            .as_i64()
            .ok_or_else(|| BackendError::internal("int model value has no concrete i64"))?;
        Ok(serde_json::json!({"t": "Int", "v": i}))
    } else if is_true(&theory.is_real(&term)) {
        let r = theory.rval(&term).simplify();
        let (num, den) = r
            .as_real()
            .ok_or_else(|| BackendError::internal("real model value has no concrete rational"))?;
        let approx = num as f64 / den as f64;
        Ok(serde_json::json!({"t": "Real", "v": approx}))
    } else if is_true(&theory.is_lst(&term)) {
        let elems = decode_cons_chain(theory, &theory.lval(&term))?;
        Ok(serde_json::json!({"t": "List", "v": elems}))
    } else if is_true(&theory.is_tpl(&term)) {
        let elems = decode_cons_chain(theory, &theory.tval(&term))?;
        Ok(serde_json::json!({"t": "Tuple", "v": elems}))
    } else if is_true(&theory.is_atm(&term)) {
        let codes = decode_atom_codes(theory, &theory.aval(&term))?;
        Ok(serde_json::json!({"t": "Atom", "v": codes}))
    } else {
        Err(BackendError::internal(
            "model value matches no known Term variant",
        ))
    }
}

fn is_true(b: &z3::ast::Bool) -> bool {
    b.simplify().as_bool().unwrap_or(false)
}

fn decode_cons_chain<'ctx>(theory: &TermTheory<'ctx>, list: &Dynamic<'ctx>) -> BackendResult<Vec<Value>> {
    let mut out = Vec::new();
    let mut cur = list.simplify();
    loop {
        if is_true(&theory.is_cons(&cur)) {
            let hd = theory.hd(&cur).simplify();
            out.push(decode(theory, &hd)?);
            cur = theory.tl(&cur).simplify();
        } else {
            break;
        }
    }
    Ok(out)
}

fn decode_atom_codes<'ctx>(theory: &TermTheory<'ctx>, atom: &Dynamic<'ctx>) -> BackendResult<Vec<i64>> {
    let mut out = Vec::new();
    let mut cur = atom.simplify();
    loop {
        if is_true(&theory.is_acons(&cur)) {
            let hd = theory.ahd(&cur).simplify();
            let code = hd
                .as_i64()
                .ok_or_else(|| BackendError::internal("atom code has no concrete i64"))?;
            out.push(code);
            cur = theory.atl(&cur).simplify();
        } else {
            break;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use z3::{Config, Context};

    fn fresh<'ctx>(ctx: &'ctx Context) -> (TermTheory<'ctx>, Environment<'ctx>, Solver<'ctx>) {
        let theory = TermTheory::new(ctx);
        let env = Environment::new(ctx, theory.sort());
        let solver = Solver::new(ctx);
        (theory, env, solver)
    }

    #[test]
    fn int_roundtrips() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let (theory, mut env, solver) = fresh(&ctx);

        let wire: WireTerm = serde_json::from_str(r#"{"t": "Int", "v": 42}"#).unwrap();
        let enc = encode(&theory, &mut env, &solver, &wire).unwrap();
        let dec = decode(&theory, &enc).unwrap();
        assert_eq!(dec, serde_json::json!({"t": "Int", "v": 42}));
    }

    #[test]
    fn list_roundtrips() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let (theory, mut env, solver) = fresh(&ctx);

        let wire: WireTerm = serde_json::from_str(
            r#"{"t": "List", "v": [{"t":"Int","v":1}, {"t":"Int","v":2}]}"#,
        )
        .unwrap();
        let enc = encode(&theory, &mut env, &solver, &wire).unwrap();
        let dec = decode(&theory, &enc).unwrap();
        assert_eq!(
            dec,
            serde_json::json!({"t": "List", "v": [{"t":"Int","v":1}, {"t":"Int","v":2}]})
        );
    }

    #[test]
    fn atom_roundtrips() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let (theory, mut env, solver) = fresh(&ctx);

        let wire: WireTerm =
            serde_json::from_str(r#"{"t": "Atom", "v": [111, 107]}"#).unwrap(); // "ok"
        let enc = encode(&theory, &mut env, &solver, &wire).unwrap();
        let dec = decode(&theory, &enc).unwrap();
        assert_eq!(dec, serde_json::json!({"t": "Atom", "v": [111, 107]}));
    }

    #[test]
    fn symbolic_name_resolves_to_same_variable_both_times() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let (theory, mut env, solver) = fresh(&ctx);

        let wire: WireTerm = serde_json::from_str(r#"{"s": "X"}"#).unwrap();
        let a = encode(&theory, &mut env, &solver, &wire).unwrap();
        let b = encode(&theory, &mut env, &solver, &wire).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn aliased_term_is_memoized_and_asserted_equal() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let (theory, mut env, solver) = fresh(&ctx);

        let wire: WireTerm = serde_json::from_str(
            r#"{"l": "shared", "d": {"shared": {"t": "Int", "v": 9}}}"#,
        )
        .unwrap();
        let a = encode(&theory, &mut env, &solver, &wire).unwrap();
        let b = encode(&theory, &mut env, &solver, &wire).unwrap();
        assert_eq!(a, b);

        assert_eq!(solver.check(), z3::SatResult::Sat);
        let model = solver.model().unwrap();
        let val = model.eval(&a, true).unwrap();
        let dec = decode(&theory, &val).unwrap();
        assert_eq!(dec, serde_json::json!({"t": "Int", "v": 9}));
    }

    #[test]
    fn real_literal_decodes_to_exact_decimal_value() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let (theory, mut env, solver) = fresh(&ctx);

        let wire: WireTerm = serde_json::from_str(r#"{"t": "Real", "v": 3.5}"#).unwrap();
        let enc = encode(&theory, &mut env, &solver, &wire).unwrap();
        let dec = decode(&theory, &enc).unwrap();
        assert_eq!(dec["t"], "Real");
        assert!((dec["v"].as_f64().unwrap() - 3.5).abs() < 1e-9);
    }
}
