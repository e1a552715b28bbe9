//! Environment: the symbolic-name -> Z3-variable map, a fresh-variable
//! counter, and the ordered parameter list.
//!
//! Grounded on the `Env` class in `z3_utils.py`: variables are created
//! lazily on first mention and never collected within a session; the
//! parameter list is append-only and its order is the order the solution
//! is eventually reported in.

use std::collections::HashMap;

use z3::ast::Dynamic;
use z3::{Context, Sort};

/// Maps symbolic names (issued by the driver) to their Z3 constant of sort
/// `Term`, and tracks which names are declared parameters.
pub struct Environment<'ctx> {
    ctx: &'ctx Context,
    term_sort: Sort<'ctx>,
    counter: u64,
    vars: HashMap<String, Dynamic<'ctx>>,
    params: Vec<String>,
}

impl<'ctx> Environment<'ctx> {
    pub fn new(ctx: &'ctx Context, term_sort: Sort<'ctx>) -> Self {
        Self {
            ctx,
            term_sort,
            counter: 0,
            vars: HashMap::new(),
            params: Vec::new(),
        }
    }

    /// Look up the variable for `name`, if one has already been created.
    pub fn lookup(&self, name: &str) -> Option<Dynamic<'ctx>> {
        self.vars.get(name).cloned()
    }

    /// Return the variable for `name`, creating and memoizing a fresh one
    /// of sort `Term` if this is the first mention.
    pub fn resolve(&mut self, name: &str) -> Dynamic<'ctx> {
        if let Some(v) = self.vars.get(name) {
            return v.clone();
        }
        self.counter += 1;
        let fresh_name = format!("x{}", self.counter);
        let v = Dynamic::new_const(self.ctx, fresh_name.as_str(), &self.term_sort);
        self.vars.insert(name.to_string(), v.clone());
        v
    }

    /// Register `name` as a declared parameter, in call order. Does not
    /// itself allocate a variable — callers resolve the name separately.
    pub fn add_param(&mut self, name: &str) {
        self.params.push(name.to_string());
    }

    /// Declared parameter names, in declaration order.
    pub fn params(&self) -> &[String] {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use z3::Config;

    #[test]
    fn resolving_same_name_twice_yields_same_variable() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let term_sort = Sort::uninterpreted(&ctx, "Term".into());
        let mut env = Environment::new(&ctx, term_sort);

        let a = env.resolve("X");
        let b = env.resolve("X");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_names_yield_distinct_variables() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let term_sort = Sort::uninterpreted(&ctx, "Term".into());
        let mut env = Environment::new(&ctx, term_sort);

        let a = env.resolve("X");
        let b = env.resolve("Y");
        assert_ne!(a, b);
    }

    #[test]
    fn params_preserve_declaration_order() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let term_sort = Sort::uninterpreted(&ctx, "Term".into());
        let mut env = Environment::new(&ctx, term_sort);

        env.add_param("B");
        env.add_param("A");
        env.add_param("C");
        assert_eq!(env.params(), &["B".to_string(), "A".to_string(), "C".to_string()]);
    }

    #[test]
    fn lookup_before_resolve_is_none() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let term_sort = Sort::uninterpreted(&ctx, "Term".into());
        let env = Environment::new(&ctx, term_sort);
        assert!(env.lookup("never-mentioned").is_none());
    }
}
