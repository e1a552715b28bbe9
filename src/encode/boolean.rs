//! Boolean constraints: equality, disequality, and the `true`/`false`
//! atom guards. Grounded on `_json_cmd_{eq,neq,true,false}_to_z3` in
//! `z3_utils.py`.

use serde_json::Value;
use z3::ast::Ast;

use super::encode_arg;
use crate::error::BackendResult;
use crate::session::Session;

pub fn eq(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t1 = encode_arg(session, args, 0)?;
    let t2 = encode_arg(session, args, 1)?;
    session.solver().assert(&t1._eq(&t2));
    Ok(())
}

pub fn neq(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t1 = encode_arg(session, args, 0)?;
    let t2 = encode_arg(session, args, 1)?;
    session.solver().assert(&t1._eq(&t2).not());
    Ok(())
}

pub fn guard_true(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t = encode_arg(session, args, 0)?;
    let truthy = session.atom_true().clone();
    session.solver().assert(&t._eq(&truthy));
    Ok(())
}

pub fn guard_false(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t = encode_arg(session, args, 0)?;
    let falsy = session.atom_false().clone();
    session.solver().assert(&t._eq(&falsy));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use z3::{Config, Context, SatResult};

    #[test]
    fn eq_and_neq_on_the_same_pair_are_unsat_together() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut session = Session::new(&ctx, SessionConfig::default());

        let args = vec![
            serde_json::json!({"t":"Int","v":1}),
            serde_json::json!({"t":"Int","v":1}),
        ];
        eq(&mut session, &args).unwrap();
        neq(&mut session, &args).unwrap();

        assert_eq!(session.solver().check(), SatResult::Unsat);
    }

    #[test]
    fn guard_true_and_guard_false_on_same_term_are_unsat() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut session = Session::new(&ctx, SessionConfig::default());

        let args = vec![serde_json::json!({"s": "X"})];
        guard_true(&mut session, &args).unwrap();
        guard_false(&mut session, &args).unwrap();

        assert_eq!(session.solver().check(), SatResult::Unsat);
    }
}
