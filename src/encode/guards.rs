//! Type guards: list/tuple shape constraints. Grounded on
//! `_json_cmd_{nel,el,nl,ts,nts,nt}_to_z3` and their reversed
//! counterparts in `z3_utils.py`.
//!
//! `El` (empty list) fixes a bug in the original source: its handler
//! referenced an undefined name `s` instead of `self.solver` and would
//! have raised a `NameError` the first time a driver ever sent it. Here
//! it asserts through the session's solver like every other guard (§9).

use serde_json::Value;
use z3::ast::{Ast, Bool};

use super::{arg_int_literal, encode_arg};
use crate::error::BackendResult;
use crate::session::Session;

pub fn nel(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t = encode_arg(session, args, 0)?;
    let theory = session.theory();
    session.solver().assert(&theory.is_lst(&t));
    session.solver().assert(&theory.is_cons(&theory.lval(&t)));
    Ok(())
}

pub fn rev_nel(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t = encode_arg(session, args, 0)?;
    let theory = session.theory();
    let e = Bool::and(theory.ctx(), &[&theory.is_lst(&t), &theory.is_cons(&theory.lval(&t))]);
    session.solver().assert(&e.not());
    Ok(())
}

pub fn el(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t = encode_arg(session, args, 0)?;
    let theory = session.theory();
    session.solver().assert(&theory.is_lst(&t));
    session.solver().assert(&theory.is_nil(&theory.lval(&t)));
    Ok(())
}

pub fn nl(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t = encode_arg(session, args, 0)?;
    let theory = session.theory();
    session.solver().assert(&theory.is_lst(&t).not());
    Ok(())
}

pub fn ts(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t = encode_arg(session, args, 0)?;
    let len = arg_int_literal(args, 1)?;
    let theory = session.theory();
    session.solver().assert(&theory.is_tpl(&t));
    let mut cur = theory.tval(&t);
    for _ in 0..len {
        session.solver().assert(&theory.is_cons(&cur));
        cur = theory.tl(&cur);
    }
    session.solver().assert(&theory.is_nil(&cur));
    Ok(())
}

pub fn rev_ts(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t = encode_arg(session, args, 0)?;
    let len = arg_int_literal(args, 1)?;
    let theory = session.theory();
    let mut conj = vec![theory.is_tpl(&t)];
    let mut cur = theory.tval(&t);
    for _ in 0..len {
        conj.push(theory.is_cons(&cur));
        cur = theory.tl(&cur);
    }
    conj.push(theory.is_nil(&cur));
    let refs: Vec<&Bool> = conj.iter().collect();
    let e = Bool::and(theory.ctx(), &refs);
    session.solver().assert(&e.not());
    Ok(())
}

pub fn nts(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t = encode_arg(session, args, 0)?;
    let len = arg_int_literal(args, 1)?;
    let theory = session.theory();
    session.solver().assert(&theory.is_tpl(&t));
    let mut conj = Vec::new();
    let mut cur = theory.tval(&t);
    for _ in 0..len {
        conj.push(theory.is_cons(&cur));
        cur = theory.tl(&cur);
    }
    conj.push(theory.is_nil(&cur));
    let refs: Vec<&Bool> = conj.iter().collect();
    let e = Bool::and(theory.ctx(), &refs);
    session.solver().assert(&e.not());
    Ok(())
}

pub fn nt(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t = encode_arg(session, args, 0)?;
    let theory = session.theory();
    session.solver().assert(&theory.is_tpl(&t).not());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use z3::{Config, Context, SatResult};

    #[test]
    fn nel_and_its_reverse_on_same_term_are_unsat() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut session = Session::new(&ctx, SessionConfig::default());
        let args = vec![serde_json::json!({"s": "X"})];
        nel(&mut session, &args).unwrap();
        rev_nel(&mut session, &args).unwrap();
        assert_eq!(session.solver().check(), SatResult::Unsat);
    }

    #[test]
    fn el_accepts_empty_list_literal() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut session = Session::new(&ctx, SessionConfig::default());
        let args = vec![serde_json::json!({"t": "List", "v": []})];
        el(&mut session, &args).unwrap();
        assert_eq!(session.solver().check(), SatResult::Sat);
    }

    #[test]
    fn el_rejects_non_empty_list_literal() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut session = Session::new(&ctx, SessionConfig::default());
        let args = vec![serde_json::json!({"t": "List", "v": [{"t":"Int","v":1}]})];
        el(&mut session, &args).unwrap();
        assert_eq!(session.solver().check(), SatResult::Unsat);
    }

    #[test]
    fn ts_of_size_two_matches_two_element_tuple() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut session = Session::new(&ctx, SessionConfig::default());
        let args = vec![
            serde_json::json!({"t": "Tuple", "v": [{"t":"Int","v":1}, {"t":"Int","v":2}]}),
            serde_json::json!({"t": "Int", "v": 2}),
        ];
        ts(&mut session, &args).unwrap();
        assert_eq!(session.solver().check(), SatResult::Sat);
    }

    #[test]
    fn nts_rejects_matching_size() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut session = Session::new(&ctx, SessionConfig::default());
        let args = vec![
            serde_json::json!({"t": "Tuple", "v": [{"t":"Int","v":1}, {"t":"Int","v":2}]}),
            serde_json::json!({"t": "Int", "v": 2}),
        ];
        nts(&mut session, &args).unwrap();
        assert_eq!(session.solver().check(), SatResult::Unsat);
    }
}
