#![cfg_attr(docsrs, feature(doc_cfg))]

//! # concolic_smt_backend
//!
//! Z3-based symbolic-constraint backend for a concolic execution engine.
//!
//! ## Quick Start
//!
//! ```ignore
//! use concolic_smt_backend::{Session, SessionConfig};
//! use z3::{Config, Context};
//!
//! let cfg = Config::new();
//! let ctx = Context::new(&cfg);
//! let mut session = Session::new(&ctx, SessionConfig::default());
//! ```
//!
//! ## Architecture
//!
//! A driver speaks line-delimited JSON over stdio (§6): each line is
//! either a [`wire::Command`] encoding a constraint, or a `{"solve":
//! true}`/`{"reset": true}` session control. Every constraint is encoded
//! against a single mutually-recursive `Term`/`List`/`Atom` Z3 datatype
//! (see [`term`]), so the whole of Erlang's dynamic value universe lives
//! in one sort the solver can reason about uniformly.
//!
//! ## Modules
//!
//! - [`term`] - the `Term`/`List`/`Atom` datatype theory
//! - [`env`] - fresh-variable environment and parameter bookkeeping
//! - [`wire`] - interchange JSON shapes
//! - [`codec`] - interchange term <-> `Term` encode/decode
//! - [`encode`] - per-opcode and per-BIF constraint encoders
//! - [`dispatch`] - opcode routing
//! - [`typespec`] - type-signature to Z3 predicate compiler
//! - [`solution`] - model-to-interchange-JSON extraction
//! - [`session`] - ties everything together for one exploration
//! - [`error`] - error types
//! - [`util`] - small Z3 `ast` helpers shared across encoders

pub mod codec;
pub mod dispatch;
pub mod encode;
pub mod env;
pub mod error;
pub mod session;
pub mod solution;
pub mod term;
pub mod typespec;
pub mod util;
pub mod wire;

pub use error::{BackendError, BackendErrorKind, BackendResult};
pub use session::{Session, SessionConfig};
