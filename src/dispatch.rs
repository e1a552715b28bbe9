//! Command Dispatcher: routes each opcode to its encoder. Forward and
//! reverse tables mirror the `opts`/`opts_rev` dict literals in
//! `z3_utils.py`'s `json_command_to_z3`.
//!
//! An opcode a driver sends that isn't in the selected table — or isn't
//! in the reverse table at all, since only the type-guard family has a
//! `r: true` counterpart — is a protocol error and poisons the session
//! rather than silently doing nothing.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::encode::{bifs, boolean, guards, structural};
use crate::error::BackendResult;
use crate::session::Session;
use crate::wire::Command;

type Encoder = fn(&mut Session, &[serde_json::Value]) -> BackendResult<()>;

fn forward_table() -> &'static HashMap<&'static str, Encoder> {
    static TABLE: OnceLock<HashMap<&'static str, Encoder>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut m: HashMap<&'static str, Encoder> = HashMap::new();
        m.insert("Eq", boolean::eq);
        m.insert("Neq", boolean::neq);
        m.insert("T", boolean::guard_true);
        m.insert("F", boolean::guard_false);
        m.insert("Nel", guards::nel);
        m.insert("El", guards::el);
        m.insert("Nl", guards::nl);
        m.insert("Nt", guards::nt);
        m.insert("Ts", guards::ts);
        m.insert("Nts", guards::nts);

        m.insert("=:=", bifs::seq);
        m.insert("=/=", bifs::sneq);
        m.insert("+", bifs::add);
        m.insert("-", bifs::minus);
        m.insert("*", bifs::mult);
        m.insert("/", bifs::rdiv);
        m.insert("div", bifs::div);
        m.insert("rem", bifs::rem);
        m.insert("or", bifs::or_);
        m.insert("and", bifs::and_);
        m.insert("ore", bifs::orelse);
        m.insert("anda", bifs::andalso);
        m.insert("not", bifs::not_);
        m.insert("xor", bifs::xor);
        m.insert("<", bifs::lt);
        m.insert(">", bifs::gt);
        m.insert(">=", bifs::gteq);
        m.insert("=<", bifs::lteq);

        m.insert("hd", bifs::hd);
        m.insert("tl", bifs::tl);
        m.insert("abs", bifs::abs);
        m.insert("elm", bifs::elem);
        m.insert("flt", bifs::float);
        m.insert("isa", bifs::is_atom);
        m.insert("isb", bifs::is_boolean);
        m.insert("isf", bifs::is_float);
        m.insert("isi", bifs::is_integer);
        m.insert("isl", bifs::is_list);
        m.insert("isn", bifs::is_number);
        m.insert("ist", bifs::is_tuple);
        m.insert("rnd", bifs::round);
        m.insert("trc", bifs::trunc);
        m.insert("ltt", bifs::list_to_tuple);
        m.insert("ttl", bifs::tuple_to_list);
        m.insert("len", bifs::length);
        m.insert("tpls", bifs::tuple_size);
        m.insert("mtpl2", bifs::make_tuple2);

        m.insert("Pms", structural::define_params);
        m.insert("Psp", structural::parameter_spec);
        m.insert("Bkt", structural::break_tuple);
        m.insert("Bkl", structural::break_list);
        m
    })
}

fn reverse_table() -> &'static HashMap<&'static str, Encoder> {
    static TABLE: OnceLock<HashMap<&'static str, Encoder>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut m: HashMap<&'static str, Encoder> = HashMap::new();
        m.insert("Eq", boolean::neq);
        m.insert("Neq", boolean::eq);
        m.insert("T", boolean::guard_false);
        m.insert("F", boolean::guard_true);
        m.insert("Nel", guards::rev_nel);
        m.insert("El", guards::nel);
        m.insert("Nl", guards::nel);
        m.insert("Ts", guards::rev_ts);
        m.insert("Nt", guards::ts);
        m.insert("Nts", guards::ts);
        m
    })
}

/// Dispatch a single command against `session`, poisoning it on any
/// protocol-level failure (unknown opcode, malformed argument) so the
/// caller can refuse further commands without a stale partial solver
/// state.
pub fn dispatch(session: &mut Session, cmd: &Command) -> BackendResult<()> {
    let table = if cmd.is_reverse() { reverse_table() } else { forward_table() };
    let encoder = match table.get(cmd.c.as_str()) {
        Some(f) => *f,
        None => {
            session.poison();
            return Err(crate::error::BackendError::protocol(format!(
                "unknown opcode `{}`{}",
                cmd.c,
                if cmd.is_reverse() { " (reverse)" } else { "" }
            )));
        }
    };
    match encoder(session, &cmd.a) {
        Ok(()) => Ok(()),
        Err(e) => {
            if e.poisons_session() {
                session.poison();
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use z3::{Config, Context, SatResult};

    fn cmd(c: &str, a: Vec<serde_json::Value>, r: bool) -> Command {
        Command {
            c: c.to_string(),
            a,
            r: if r { Some(true) } else { None },
        }
    }

    #[test]
    fn dispatches_forward_eq() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut session = Session::new(&ctx, SessionConfig::default());
        let c = cmd(
            "Eq",
            vec![serde_json::json!({"t":"Int","v":1}), serde_json::json!({"t":"Int","v":1})],
            false,
        );
        dispatch(&mut session, &c).unwrap();
        assert_eq!(session.solver().check(), SatResult::Sat);
    }

    #[test]
    fn dispatches_reverse_eq_as_neq() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut session = Session::new(&ctx, SessionConfig::default());
        let c = cmd(
            "Eq",
            vec![serde_json::json!({"t":"Int","v":1}), serde_json::json!({"t":"Int","v":1})],
            true,
        );
        dispatch(&mut session, &c).unwrap();
        assert_eq!(session.solver().check(), SatResult::Unsat);
    }

    #[test]
    fn unknown_opcode_poisons_session() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut session = Session::new(&ctx, SessionConfig::default());
        let c = cmd("Bogus", vec![], false);
        let err = dispatch(&mut session, &c);
        assert!(err.is_err());
        assert!(session.is_poisoned());
    }
}
