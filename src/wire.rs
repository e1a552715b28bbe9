//! Interchange wire types: the line-delimited JSON shapes exchanged with
//! the driver (§6). These are plain serde-derived structs/enums; the
//! actual encode/decode logic against the Term theory lives in
//! [`crate::codec`], [`crate::dispatch`], and [`crate::typespec`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{c: opcode, a: [args...], r?: true}`
///
/// `a`'s elements are kept as raw [`Value`]s rather than uniformly typed
/// as [`WireTerm`]: almost every opcode's arguments are terms, but `Psp`'s
/// second argument is a [`TypeSig`], a structurally distinct shape. Each
/// encoder in [`crate::encode`] parses its own arguments out of this list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Command {
    pub c: String,
    #[serde(default)]
    pub a: Vec<Value>,
    #[serde(default)]
    pub r: Option<bool>,
}

impl Command {
    /// True when this command requests the reversed (negated) predicate.
    pub fn is_reverse(&self) -> bool {
        self.r.unwrap_or(false)
    }
}

/// An interchange term: symbolic reference, aliased (shared/cyclic)
/// payload, or a fully concrete literal. Disambiguated structurally by
/// which keys are present, matching the original JSON dict shapes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum WireTerm {
    /// `{s: "<name>"}`
    Symbolic { s: String },
    /// `{l: "<name>", d: {...}}` — the payload lives at `d[name]`.
    Aliased {
        l: String,
        d: HashMap<String, WireTerm>,
    },
    /// `{t: kind, v: payload, d?: {...}}`
    Concrete(ConcreteTerm),
}

/// `{t: "Int"|"Real"|"List"|"Tuple"|"Atom", v: <payload>, d?: {...}}`
///
/// `v`'s shape depends on `t`: a number for `Int`/`Real`, an array of
/// terms for `List`/`Tuple`, an array of small integers for `Atom`. Kept
/// as a raw [`Value`] here; [`crate::codec`] dispatches on `t` to decode it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConcreteTerm {
    pub t: String,
    pub v: Value,
    #[serde(default)]
    pub d: Option<HashMap<String, WireTerm>>,
}

/// `{t: kind, i?: info, a?: [subsigs]}` — a parametric type signature, per
/// §4.5. `a`'s element shape varies by `kind` (subsigs for `tuple`/`union`,
/// bare `{i: term}` bound wrappers for `range`), so it is left as raw
/// [`Value`]s and parsed on demand in [`crate::typespec`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TypeSig {
    pub t: String,
    #[serde(default)]
    pub i: Option<Value>,
    #[serde(default)]
    pub a: Option<Vec<Value>>,
}

/// The response to a solve request: `{sat: true, solution: {...}}`,
/// `{sat: false}`, or `{sat: false, status: "unknown"}`.
#[derive(Debug, Clone, Serialize)]
pub struct SolveResponse {
    pub sat: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<HashMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl SolveResponse {
    pub fn sat(solution: HashMap<String, Value>) -> Self {
        Self {
            sat: true,
            solution: Some(solution),
            status: None,
        }
    }

    pub fn unsat() -> Self {
        Self {
            sat: false,
            solution: None,
            status: None,
        }
    }

    pub fn unknown() -> Self {
        Self {
            sat: false,
            solution: None,
            status: Some("unknown".to_string()),
        }
    }
}

/// A response to a malformed request: `{error: message}`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_symbolic_term() {
        let json = r#"{"s": "X"}"#;
        let t: WireTerm = serde_json::from_str(json).unwrap();
        assert!(matches!(t, WireTerm::Symbolic { s } if s == "X"));
    }

    #[test]
    fn parses_concrete_int_term() {
        let json = r#"{"t": "Int", "v": 7}"#;
        let t: WireTerm = serde_json::from_str(json).unwrap();
        match t {
            WireTerm::Concrete(c) => {
                assert_eq!(c.t, "Int");
                assert_eq!(c.v, serde_json::json!(7));
            }
            _ => panic!("expected concrete term"),
        }
    }

    #[test]
    fn parses_aliased_term() {
        let json = r#"{"l": "shared", "d": {"shared": {"t": "Int", "v": 1}}}"#;
        let t: WireTerm = serde_json::from_str(json).unwrap();
        assert!(matches!(t, WireTerm::Aliased { l, .. } if l == "shared"));
    }

    #[test]
    fn parses_command_with_reverse_flag() {
        let json = r#"{"c": "Nel", "a": [{"s": "L"}], "r": true}"#;
        let cmd: Command = serde_json::from_str(json).unwrap();
        assert_eq!(cmd.c, "Nel");
        assert!(cmd.is_reverse());
        assert_eq!(cmd.a.len(), 1);
        let term: WireTerm = serde_json::from_value(cmd.a[0].clone()).unwrap();
        assert!(matches!(term, WireTerm::Symbolic { s } if s == "L"));
    }

    #[test]
    fn command_without_reverse_flag_defaults_to_forward() {
        let json = r#"{"c": "Eq", "a": []}"#;
        let cmd: Command = serde_json::from_str(json).unwrap();
        assert!(!cmd.is_reverse());
    }

    #[test]
    fn solve_response_serializes_without_status_when_sat() {
        let mut sol = HashMap::new();
        sol.insert("X".to_string(), serde_json::json!({"t": "Int", "v": 7}));
        let resp = SolveResponse::sat(sol);
        let v = serde_json::to_value(&resp).unwrap();
        assert_eq!(v["sat"], true);
        assert!(v.get("status").is_none());
    }
}
