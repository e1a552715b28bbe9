//! Solution Extractor: reads the last model back out as interchange
//! JSON, one entry per declared parameter, in declaration order.
//! Grounded on `z3_solution_to_json`/`z3_param_to_json` in `z3_utils.py`.

use std::collections::HashMap;

use serde_json::Value;
use z3::ast::Ast;

use crate::codec;
use crate::error::{BackendError, BackendResult};
use crate::session::Session;

/// Extract the current model's value for every declared parameter.
/// Requires the last `solve()` to have returned `Ok(true)`; callers
/// enforce that through [`Session::solution`].
pub fn extract(session: &Session) -> BackendResult<HashMap<String, Value>> {
    let model = session
        .model()
        .ok_or_else(|| BackendError::internal("solution requested without a satisfying model"))?;

    let mut out = HashMap::with_capacity(session.env().params().len());
    for name in session.env().params() {
        let var = session
            .env()
            .lookup(name)
            .ok_or_else(|| BackendError::internal(format!("declared parameter `{name}` was never resolved")))?;
        let value = match model.get_const_interp(&var) {
            Some(v) => codec::decode(session.theory(), &v)?,
            None => Value::String("any".to_string()),
        };
        out.insert(name.clone(), value);
    }
    Ok(out)
}
