//! Small shared helpers used across the encoder families and the
//! type-spec binder.

use z3::ast::{Ast, Bool};
use z3::Context;

/// `if cond then then_ else else_`, built out of `And`/`Or`/`Not` rather
/// than a native ITE, so every encoder shares one well-tested primitive.
pub(crate) fn ite_bool<'ctx>(
    ctx: &'ctx Context,
    cond: &Bool<'ctx>,
    then_: &Bool<'ctx>,
    else_: &Bool<'ctx>,
) -> Bool<'ctx> {
    Bool::or(
        ctx,
        &[
            &Bool::and(ctx, &[cond, then_]),
            &Bool::and(ctx, &[&cond.not(), else_]),
        ],
    )
}
