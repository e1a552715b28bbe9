//! Session state: one Z3 context, one solver, one environment, held for
//! the lifetime of a single exploration. Grounded on `ErlangZ3.__init__`
//! and `solve()` in `z3_utils.py`.

use z3::ast::{Ast, Dynamic};
use z3::{Context, SatResult, Solver};

use crate::codec;
use crate::env::Environment;
use crate::error::{BackendError, BackendResult};
use crate::term::TermTheory;
use crate::wire::WireTerm;

/// Session-local knobs. `max_len` bounds every unbounded-length encoding
/// (§4.4); `solver_timeout_ms` is forwarded to Z3's own `timeout` param.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub max_len: u32,
    pub solver_timeout_ms: Option<u32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_len: 100,
            solver_timeout_ms: None,
        }
    }
}

impl SessionConfig {
    pub fn with_max_len(mut self, max_len: u32) -> Self {
        self.max_len = max_len;
        self
    }

    pub fn with_solver_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.solver_timeout_ms = Some(timeout_ms);
        self
    }
}

/// The well-known atoms `true`, `false`, and `infinity`, as character-code
/// sequences (§3.1's Atom is a list of codes).
fn atom_codes(s: &str) -> Vec<i64> {
    s.bytes().map(|b| b as i64).collect()
}

/// All per-exploration state: the Z3 context (owned by the caller, since
/// `Session` and everything it holds is borrowed from it), the term
/// theory, the environment, the incremental solver, and the last
/// check/model pair.
pub struct Session<'ctx> {
    ctx: &'ctx Context,
    theory: TermTheory<'ctx>,
    env: Environment<'ctx>,
    solver: Solver<'ctx>,
    config: SessionConfig,
    poisoned: bool,
    atom_true: Dynamic<'ctx>,
    atom_false: Dynamic<'ctx>,
    atom_infinity: Dynamic<'ctx>,
    last_check: Option<SatResult>,
}

impl<'ctx> Session<'ctx> {
    pub fn new(ctx: &'ctx Context, config: SessionConfig) -> Self {
        let theory = TermTheory::new(ctx);
        let env = Environment::new(ctx, theory.sort());
        let solver = new_solver(ctx, &config);

        let atom_true = theory.mk_atom_term(&atom_codes("true"));
        let atom_false = theory.mk_atom_term(&atom_codes("false"));
        let atom_infinity = theory.mk_atom_term(&atom_codes("infinity"));

        Self {
            ctx,
            theory,
            env,
            solver,
            config,
            poisoned: false,
            atom_true,
            atom_false,
            atom_infinity,
            last_check: None,
        }
    }

    pub fn theory(&self) -> &TermTheory<'ctx> {
        &self.theory
    }

    pub fn env(&self) -> &Environment<'ctx> {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment<'ctx> {
        &mut self.env
    }

    pub fn solver(&self) -> &Solver<'ctx> {
        &self.solver
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn atom_true(&self) -> &Dynamic<'ctx> {
        &self.atom_true
    }

    pub fn atom_false(&self) -> &Dynamic<'ctx> {
        &self.atom_false
    }

    pub fn atom_infinity(&self) -> &Dynamic<'ctx> {
        &self.atom_infinity
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Mark this session unusable. Called on every protocol/internal error.
    pub fn poison(&mut self) {
        self.poisoned = true;
    }

    /// Encode an interchange term into a `Term`-sorted Z3 value, sharing
    /// this session's environment and solver (for alias assertions).
    pub fn encode_term(&mut self, term: &WireTerm) -> BackendResult<Dynamic<'ctx>> {
        codec::encode(&self.theory, &mut self.env, &self.solver, term)
    }

    /// Decode a fully concrete (post-model) theory value back into JSON.
    pub fn decode_term(&self, term: &Dynamic<'ctx>) -> BackendResult<serde_json::Value> {
        codec::decode(&self.theory, term)
    }

    /// Run the solver and cache the result. `Ok(true)` means a model is
    /// now available via [`Self::model`]; `Ok(false)` means unsatisfiable;
    /// a `SolverUnknown` error means the timeout/resource limit was hit.
    pub fn solve(&mut self) -> BackendResult<bool> {
        let result = self.solver.check();
        self.last_check = Some(result);
        match result {
            SatResult::Sat => Ok(true),
            SatResult::Unsat => Ok(false),
            SatResult::Unknown => Err(BackendError::solver_unknown()),
        }
    }

    /// The solution for every declared parameter, in declaration order:
    /// its decoded value, or the literal string `"any"` when the model
    /// leaves it unconstrained (§4.6).
    pub fn solution(&self) -> BackendResult<std::collections::HashMap<String, serde_json::Value>> {
        crate::solution::extract(self)
    }

    /// Reset this session to a fresh, empty solver and environment,
    /// clearing the poisoned flag. The `Term`/`List`/`Atom` sorts and the
    /// well-known atoms are reused — they carry no assertions.
    pub fn reset(&mut self) {
        self.env = Environment::new(self.ctx, self.theory.sort());
        self.solver = new_solver(self.ctx, &self.config);
        self.poisoned = false;
        self.last_check = None;
    }

    pub(crate) fn model(&self) -> Option<z3::Model<'ctx>> {
        if self.last_check != Some(SatResult::Sat) {
            return None;
        }
        self.solver.get_model()
    }
}

fn new_solver<'ctx>(ctx: &'ctx Context, config: &SessionConfig) -> Solver<'ctx> {
    let solver = Solver::new(ctx);
    if let Some(timeout_ms) = config.solver_timeout_ms {
        let params = z3::Params::new(ctx);
        params.set_u32("timeout", timeout_ms);
        solver.set_params(&params);
    }
    solver
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch;
    use z3::Config;

    fn cmd(json: &str) -> crate::wire::Command {
        serde_json::from_str(json).unwrap()
    }

    /// Scenario: `X =:= 1 + 1` combined with `X > 1` is satisfiable with
    /// `X = 2`.
    #[test]
    fn scenario_simple_arithmetic_equality() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut session = Session::new(&ctx, SessionConfig::default());

        dispatch::dispatch(&mut session, &cmd(r#"{"c": "Pms", "a": [{"s": "X"}]}"#)).unwrap();
        dispatch::dispatch(
            &mut session,
            &cmd(r#"{"c": "+", "a": [{"t":"Int","v":1}, {"t":"Int","v":1}, {"s":"X"}]}"#),
        )
        .unwrap();

        assert!(session.solve().unwrap());
        let sol = session.solution().unwrap();
        assert_eq!(sol["X"], serde_json::json!({"t": "Int", "v": 2}));
    }

    /// Scenario: asserting a symbolic term is both the atom `true` and
    /// the atom `false` is unsatisfiable.
    #[test]
    fn scenario_true_and_false_guard_is_unsat() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut session = Session::new(&ctx, SessionConfig::default());

        dispatch::dispatch(&mut session, &cmd(r#"{"c": "Pms", "a": [{"s": "X"}]}"#)).unwrap();
        dispatch::dispatch(&mut session, &cmd(r#"{"c": "T", "a": [{"s": "X"}]}"#)).unwrap();
        dispatch::dispatch(&mut session, &cmd(r#"{"c": "F", "a": [{"s": "X"}]}"#)).unwrap();

        assert!(!session.solve().unwrap());
    }

    /// Scenario: a non-empty-list guard (`Nel`) forces a `cons`, and its
    /// reverse forces `X` to not be a non-empty list.
    #[test]
    fn scenario_nel_and_its_reverse_are_mutually_exclusive() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut session = Session::new(&ctx, SessionConfig::default());

        dispatch::dispatch(&mut session, &cmd(r#"{"c": "Pms", "a": [{"s": "X"}]}"#)).unwrap();
        dispatch::dispatch(&mut session, &cmd(r#"{"c": "Nel", "a": [{"s": "X"}]}"#)).unwrap();
        dispatch::dispatch(
            &mut session,
            &cmd(r#"{"c": "Nel", "a": [{"s": "X"}], "r": true}"#),
        )
        .unwrap();

        assert!(!session.solve().unwrap());
    }

    /// Scenario: binding a parameter to `integer(non_neg)` and then
    /// asserting it is negative is unsatisfiable.
    #[test]
    fn scenario_typespec_conflicts_with_later_constraint() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut session = Session::new(&ctx, SessionConfig::default());

        dispatch::dispatch(&mut session, &cmd(r#"{"c": "Pms", "a": [{"s": "X"}]}"#)).unwrap();
        dispatch::dispatch(
            &mut session,
            &cmd(r#"{"c": "Psp", "a": [{"s": "X"}, {"t": "integer", "i": "non_neg"}]}"#),
        )
        .unwrap();
        dispatch::dispatch(
            &mut session,
            &cmd(r#"{"c": "<", "a": [{"s": "X"}, {"t":"Int","v":0}, {"t":"Atom","v":[116,114,117,101]}]}"#),
        )
        .unwrap();

        assert!(!session.solve().unwrap());
    }

    /// Scenario: an unconstrained parameter solves to the `"any"` sentinel.
    #[test]
    fn scenario_unconstrained_parameter_reports_any() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut session = Session::new(&ctx, SessionConfig::default());

        dispatch::dispatch(&mut session, &cmd(r#"{"c": "Pms", "a": [{"s": "X"}, {"s": "Y"}]}"#))
            .unwrap();
        dispatch::dispatch(
            &mut session,
            &cmd(r#"{"c": "Eq", "a": [{"s": "X"}, {"t":"Int","v":5}]}"#),
        )
        .unwrap();

        assert!(session.solve().unwrap());
        let sol = session.solution().unwrap();
        assert_eq!(sol["X"], serde_json::json!({"t": "Int", "v": 5}));
        assert_eq!(sol["Y"], serde_json::json!("any"));
    }

    /// Scenario: reset clears assertions and the poisoned flag.
    #[test]
    fn scenario_reset_clears_state() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut session = Session::new(&ctx, SessionConfig::default());

        dispatch::dispatch(&mut session, &cmd(r#"{"c": "Pms", "a": [{"s": "X"}]}"#)).unwrap();
        dispatch::dispatch(&mut session, &cmd(r#"{"c": "T", "a": [{"s": "X"}]}"#)).unwrap();
        dispatch::dispatch(&mut session, &cmd(r#"{"c": "F", "a": [{"s": "X"}]}"#)).unwrap();
        assert!(!session.solve().unwrap());

        session.reset();
        assert!(!session.is_poisoned());
        dispatch::dispatch(&mut session, &cmd(r#"{"c": "Pms", "a": [{"s": "X"}]}"#)).unwrap();
        dispatch::dispatch(&mut session, &cmd(r#"{"c": "T", "a": [{"s": "X"}]}"#)).unwrap();
        assert!(session.solve().unwrap());
    }
}
