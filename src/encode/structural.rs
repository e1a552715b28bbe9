//! Structural decomposition and parameter bookkeeping: `Bkt` (break
//! tuple), `Bkl` (break list), `Pms` (declare parameters), `Psp`
//! (parameter type spec). Grounded on `_json_cmd_break_tuple_to_z3`,
//! `_json_cmd_break_list_to_z3`, `_json_cmd_define_params_to_z3`, and
//! `_json_cmd_parameter_spec_to_z3` in `z3_utils.py`.

use serde_json::Value;
use z3::ast::Ast;

use super::{arg_term, arg_typesig, encode_arg};
use crate::error::{BackendError, BackendResult};
use crate::session::Session;
use crate::wire::WireTerm;

fn break_sequence(session: &mut Session, args: &[Value], is_tuple: bool) -> BackendResult<()> {
    let head = encode_arg(session, args, 0)?;
    let theory = session.theory();
    let mut cur = if is_tuple {
        session.solver().assert(&theory.is_tpl(&head));
        theory.tval(&head)
    } else {
        session.solver().assert(&theory.is_lst(&head));
        theory.lval(&head)
    };
    for i in 1..args.len() {
        let elem = encode_arg(session, args, i)?;
        let theory = session.theory();
        session.solver().assert(&theory.is_cons(&cur));
        session.solver().assert(&elem._eq(&theory.hd(&cur)));
        cur = theory.tl(&cur);
    }
    let theory = session.theory();
    session.solver().assert(&theory.is_nil(&cur));
    Ok(())
}

pub fn break_tuple(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    break_sequence(session, args, true)
}

pub fn break_list(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    break_sequence(session, args, false)
}

/// Registers every argument as a declared parameter, resolving each one
/// to its backing variable first so `Session::solution` always has
/// something to read out of the model.
pub fn define_params(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    for i in 0..args.len() {
        let term = arg_term(args, i)?;
        let name = match &term {
            WireTerm::Symbolic { s } => s.clone(),
            _ => {
                return Err(BackendError::protocol(format!(
                    "Pms argument {i} is not a symbolic name"
                )))
            }
        };
        session.env_mut().resolve(&name);
        session.env_mut().add_param(&name);
    }
    Ok(())
}

pub fn parameter_spec(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t = encode_arg(session, args, 0)?;
    let typesig = arg_typesig(args, 1)?;
    if let Some(ax) = crate::typespec::bind(session, &t, &typesig)? {
        session.solver().assert(&ax);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use z3::{Config, Context, SatResult};

    #[test]
    fn break_tuple_matches_its_own_literal() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut session = Session::new(&ctx, SessionConfig::default());
        let args = vec![
            serde_json::json!({"t": "Tuple", "v": [{"t":"Int","v":1}, {"t":"Int","v":2}]}),
            serde_json::json!({"s": "A"}),
            serde_json::json!({"s": "B"}),
        ];
        break_tuple(&mut session, &args).unwrap();
        let a = encode_arg(&mut session, &args, 1).unwrap();
        let one = session.theory().mk_int(&z3::ast::Int::from_i64(&ctx, 1));
        session.solver().assert(&a._eq(&one));
        assert_eq!(session.solver().check(), SatResult::Sat);
    }

    #[test]
    fn break_list_rejects_wrong_arity() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut session = Session::new(&ctx, SessionConfig::default());
        let args = vec![
            serde_json::json!({"t": "List", "v": [{"t":"Int","v":1}]}),
            serde_json::json!({"s": "A"}),
            serde_json::json!({"s": "B"}),
        ];
        break_list(&mut session, &args).unwrap();
        assert_eq!(session.solver().check(), SatResult::Unsat);
    }

    #[test]
    fn define_params_registers_names_in_order() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut session = Session::new(&ctx, SessionConfig::default());
        let args = vec![serde_json::json!({"s": "X"}), serde_json::json!({"s": "Y"})];
        define_params(&mut session, &args).unwrap();
        assert_eq!(session.env().params(), &["X".to_string(), "Y".to_string()]);
    }
}
