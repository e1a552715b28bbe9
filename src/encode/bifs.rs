//! Arithmetic, logical, comparison, predicate, structural, and
//! numeric-conversion BIFs, plus the bounded `length`/`tuple_size`/
//! `make_tuple/2` encodings. Grounded one-for-one on the
//! `_json_bif_*_to_z3` family in `z3_utils.py`.

use serde_json::Value;
use z3::ast::{Ast, Bool, Int, Real};

use super::{arg_int_literal, encode_arg};
use crate::error::BackendResult;
use crate::session::Session;
use crate::util::ite_bool;

fn and3<'ctx>(ctx: &'ctx z3::Context, clauses: &[Bool<'ctx>]) -> Bool<'ctx> {
    let refs: Vec<&Bool> = clauses.iter().collect();
    Bool::and(ctx, &refs)
}

fn or_all<'ctx>(ctx: &'ctx z3::Context, clauses: &[Bool<'ctx>]) -> Bool<'ctx> {
    let refs: Vec<&Bool> = clauses.iter().collect();
    Bool::or(ctx, &refs)
}

// ---- Equality-valued operators ----

pub fn seq(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    eq_valued(session, args, true)
}

pub fn sneq(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    eq_valued(session, args, false)
}

fn eq_valued(session: &mut Session, args: &[Value], want_equal: bool) -> BackendResult<()> {
    let t1 = encode_arg(session, args, 0)?;
    let t2 = encode_arg(session, args, 1)?;
    let t3 = encode_arg(session, args, 2)?;
    let theory = session.theory();
    let cond = if want_equal { t1._eq(&t2) } else { t1._eq(&t2).not() };
    let truthy = t3._eq(session.atom_true());
    let falsy = t3._eq(session.atom_false());
    let ax = ite_bool(theory.ctx(), &cond, &truthy, &falsy);
    session.solver().assert(&ax);
    Ok(())
}

// ---- Arithmetic ----

enum ArithOp {
    Add,
    Sub,
    Mul,
}

pub fn add(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    arith(session, args, ArithOp::Add)
}

pub fn minus(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    arith(session, args, ArithOp::Sub)
}

pub fn mult(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    arith(session, args, ArithOp::Mul)
}

fn arith(session: &mut Session, args: &[Value], op: ArithOp) -> BackendResult<()> {
    let t1 = encode_arg(session, args, 0)?;
    let t2 = encode_arg(session, args, 1)?;
    let t3 = encode_arg(session, args, 2)?;
    let theory = session.theory();
    let ctx = theory.ctx();

    let (i1, i2, i3) = (theory.ival(&t1), theory.ival(&t2), theory.ival(&t3));
    let (r1, r2, r3) = (theory.rval(&t1), theory.rval(&t2), theory.rval(&t3));

    let int_int = |a: &Int, b: &Int| -> Int {
        match op {
            ArithOp::Add => a.add(&[b]),
            ArithOp::Sub => a.sub(&[b]),
            ArithOp::Mul => a.mul(&[b]),
        }
    };
    let real_real = |a: &Real, b: &Real| -> Real {
        match op {
            ArithOp::Add => a.add(&[b]),
            ArithOp::Sub => a.sub(&[b]),
            ArithOp::Mul => a.mul(&[b]),
        }
    };

    let ii = and3(
        ctx,
        &[
            theory.is_int(&t1),
            theory.is_int(&t2),
            theory.is_int(&t3),
            int_int(&i1, &i2)._eq(&i3),
        ],
    );
    let ir = and3(
        ctx,
        &[
            theory.is_int(&t1),
            theory.is_real(&t2),
            theory.is_real(&t3),
            real_real(&i1.to_real(), &r2)._eq(&r3),
        ],
    );
    let ri = and3(
        ctx,
        &[
            theory.is_real(&t1),
            theory.is_int(&t2),
            theory.is_real(&t3),
            real_real(&r1, &i2.to_real())._eq(&r3),
        ],
    );
    let rr = and3(
        ctx,
        &[
            theory.is_real(&t1),
            theory.is_real(&t2),
            theory.is_real(&t3),
            real_real(&r1, &r2)._eq(&r3),
        ],
    );
    session.solver().assert(&or_all(ctx, &[ii, ir, ri, rr]));
    Ok(())
}

pub fn rdiv(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t1 = encode_arg(session, args, 0)?;
    let t2 = encode_arg(session, args, 1)?;
    let t3 = encode_arg(session, args, 2)?;
    let theory = session.theory();
    let ctx = theory.ctx();

    let (i1, i2) = (theory.ival(&t1), theory.ival(&t2));
    let (r1, r2) = (theory.rval(&t1), theory.rval(&t2));
    let r3 = theory.rval(&t3);
    let zero_i = Int::from_i64(ctx, 0);
    let zero_r = Real::from_real(ctx, 0, 1);

    session.solver().assert(&theory.is_real(&t3));

    let div_case = |dividend: Real, divisor: Real, nonzero: Bool| -> Bool {
        and3(ctx, &[nonzero, (dividend.div(&divisor))._eq(&r3)])
    };

    let ii = and3(
        ctx,
        &[
            theory.is_int(&t1),
            theory.is_int(&t2),
            div_case(i1.to_real(), i2.to_real(), i2._eq(&zero_i).not()),
        ],
    );
    let ir = and3(
        ctx,
        &[
            theory.is_int(&t1),
            theory.is_real(&t2),
            div_case(i1.to_real(), r2.clone(), r2._eq(&zero_r).not()),
        ],
    );
    let ri = and3(
        ctx,
        &[
            theory.is_real(&t1),
            theory.is_int(&t2),
            div_case(r1.clone(), i2.to_real(), i2._eq(&zero_i).not()),
        ],
    );
    let rr = and3(
        ctx,
        &[
            theory.is_real(&t1),
            theory.is_real(&t2),
            div_case(r1, r2.clone(), r2._eq(&zero_r).not()),
        ],
    );
    session.solver().assert(&or_all(ctx, &[ii, ir, ri, rr]));
    Ok(())
}

pub fn div(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t1 = encode_arg(session, args, 0)?;
    let t2 = encode_arg(session, args, 1)?;
    let t3 = encode_arg(session, args, 2)?;
    let theory = session.theory();
    let (i1, i2, i3) = (theory.ival(&t1), theory.ival(&t2), theory.ival(&t3));
    session.solver().assert(&theory.is_int(&t1));
    session.solver().assert(&theory.is_int(&t2));
    session.solver().assert(&theory.is_int(&t3));
    session
        .solver()
        .assert(&i2._eq(&Int::from_i64(theory.ctx(), 0)).not());
    session.solver().assert(&(i1.div(&i2))._eq(&i3));
    Ok(())
}

pub fn rem(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t1 = encode_arg(session, args, 0)?;
    let t2 = encode_arg(session, args, 1)?;
    let t3 = encode_arg(session, args, 2)?;
    let theory = session.theory();
    let (i1, i2, i3) = (theory.ival(&t1), theory.ival(&t2), theory.ival(&t3));
    session.solver().assert(&theory.is_int(&t1));
    session.solver().assert(&theory.is_int(&t2));
    session.solver().assert(&theory.is_int(&t3));
    session
        .solver()
        .assert(&i2._eq(&Int::from_i64(theory.ctx(), 0)).not());
    session.solver().assert(&(i1.modulo(&i2))._eq(&i3));
    Ok(())
}

pub fn abs(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t1 = encode_arg(session, args, 0)?;
    let t2 = encode_arg(session, args, 1)?;
    let theory = session.theory();
    let ctx = theory.ctx();
    let (i1, i2) = (theory.ival(&t1), theory.ival(&t2));
    let (r1, r2) = (theory.rval(&t1), theory.rval(&t2));
    let zero_i = Int::from_i64(ctx, 0);
    let zero_r = Real::from_real(ctx, 0, 1);

    let iabs = or_all(
        ctx,
        &[
            and3(ctx, &[i1.lt(&zero_i), i2._eq(&i1.unary_minus())]),
            and3(ctx, &[i1.ge(&zero_i), i2._eq(&i1)]),
        ],
    );
    let rabs = or_all(
        ctx,
        &[
            and3(ctx, &[r1.lt(&zero_r), r2._eq(&r1.unary_minus())]),
            and3(ctx, &[r1.ge(&zero_r), r2._eq(&r1)]),
        ],
    );
    session.solver().assert(&or_all(
        ctx,
        &[
            and3(ctx, &[theory.is_int(&t1), theory.is_int(&t2), iabs]),
            and3(ctx, &[theory.is_real(&t1), theory.is_real(&t2), rabs]),
        ],
    ));
    Ok(())
}

// ---- Logical connectives ----

fn truth_table(
    session: &mut Session,
    args: &[Value],
    rows: &[(bool, bool, bool)],
) -> BackendResult<()> {
    let t1 = encode_arg(session, args, 0)?;
    let t2 = encode_arg(session, args, 1)?;
    let t3 = encode_arg(session, args, 2)?;
    let truthy = session.atom_true().clone();
    let falsy = session.atom_false().clone();
    let ctx = session.theory().ctx();

    let pick = |t: &z3::ast::Dynamic<'_>, b: bool| -> Bool<'_> {
        if b {
            t._eq(&truthy)
        } else {
            t._eq(&falsy)
        }
    };
    let clauses: Vec<Bool> = rows
        .iter()
        .map(|&(a, b, c)| and3(ctx, &[pick(&t1, a), pick(&t2, b), pick(&t3, c)]))
        .collect();
    session.solver().assert(&or_all(ctx, &clauses));
    Ok(())
}

pub fn or_(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    truth_table(
        session,
        args,
        &[(true, false, true), (false, true, true), (true, true, true), (false, false, false)],
    )
}

pub fn and_(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    truth_table(
        session,
        args,
        &[(true, false, false), (false, true, false), (true, true, true), (false, false, false)],
    )
}

pub fn orelse(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    // `t1 == T -> t3 == T`; `t1`'s effect on `t2` only matters when `t1 == F`.
    let t1 = encode_arg(session, args, 0)?;
    let t2 = encode_arg(session, args, 1)?;
    let t3 = encode_arg(session, args, 2)?;
    let truthy = session.atom_true().clone();
    let falsy = session.atom_false().clone();
    let ctx = session.theory().ctx();

    let clauses = [
        and3(ctx, &[t1._eq(&truthy), t3._eq(&truthy)]),
        and3(ctx, &[t1._eq(&falsy), t2._eq(&truthy), t3._eq(&truthy)]),
        and3(ctx, &[t1._eq(&falsy), t2._eq(&falsy), t3._eq(&falsy)]),
    ];
    session.solver().assert(&or_all(ctx, &clauses));
    Ok(())
}

pub fn andalso(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t1 = encode_arg(session, args, 0)?;
    let t2 = encode_arg(session, args, 1)?;
    let t3 = encode_arg(session, args, 2)?;
    let truthy = session.atom_true().clone();
    let falsy = session.atom_false().clone();
    let ctx = session.theory().ctx();

    let clauses = [
        and3(ctx, &[t1._eq(&truthy), t2._eq(&falsy), t3._eq(&falsy)]),
        and3(ctx, &[t1._eq(&truthy), t2._eq(&truthy), t3._eq(&truthy)]),
        and3(ctx, &[t1._eq(&falsy), t3._eq(&falsy)]),
    ];
    session.solver().assert(&or_all(ctx, &clauses));
    Ok(())
}

pub fn not_(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t1 = encode_arg(session, args, 0)?;
    let t2 = encode_arg(session, args, 1)?;
    let truthy = session.atom_true().clone();
    let falsy = session.atom_false().clone();
    let ctx = session.theory().ctx();

    let clauses = [
        and3(ctx, &[t1._eq(&truthy), t2._eq(&falsy)]),
        and3(ctx, &[t1._eq(&falsy), t2._eq(&truthy)]),
    ];
    session.solver().assert(&or_all(ctx, &clauses));
    Ok(())
}

pub fn xor(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    truth_table(
        session,
        args,
        &[(true, false, true), (false, true, true), (true, true, false), (false, false, false)],
    )
}

// ---- Ordering comparisons ----

#[derive(Clone, Copy)]
pub enum CompareOp {
    Lt,
    Gt,
    Gteq,
    Lteq,
}

pub fn lt(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    compare(session, args, CompareOp::Lt)
}

pub fn gt(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    compare(session, args, CompareOp::Gt)
}

pub fn gteq(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    compare(session, args, CompareOp::Gteq)
}

pub fn lteq(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    compare(session, args, CompareOp::Lteq)
}

/// Erlang's total order across term kinds: numbers < atoms < tuples <
/// lists. Atom-atom, tuple-tuple, and list-list comparisons are
/// deliberately left unconstrained, matching the original source's
/// `#!# SIMPLIFIED` comment and spec's explicit Non-goal.
fn compare(session: &mut Session, args: &[Value], op: CompareOp) -> BackendResult<()> {
    let x = encode_arg(session, args, 0)?;
    let y = encode_arg(session, args, 1)?;
    let z = encode_arg(session, args, 2)?;
    let theory = session.theory();
    let ctx = theory.ctx();
    let truthy = session.atom_true().clone();
    let falsy = session.atom_false().clone();

    let (asc, desc) = match op {
        CompareOp::Lt | CompareOp::Lteq => (truthy.clone(), falsy.clone()),
        CompareOp::Gt | CompareOp::Gteq => (falsy.clone(), truthy.clone()),
    };

    let num_num = |lt: Bool<'_>| -> Bool<'_> { ite_bool(ctx, &lt, &z._eq(&truthy), &z._eq(&falsy)) };
    let cmp_int = |a: &Int<'_>, b: &Int<'_>| -> Bool<'_> { numeric_cmp(op, a.lt(b), a.gt(b), a.le(b), a.ge(b)) };
    let cmp_real = |a: &Real<'_>, b: &Real<'_>| -> Bool<'_> { numeric_cmp(op, a.lt(b), a.gt(b), a.le(b), a.ge(b)) };

    let (i_x, r_x) = (theory.ival(&x), theory.rval(&x));
    let (i_y, r_y) = (theory.ival(&y), theory.rval(&y));

    let int_int = and3(ctx, &[theory.is_int(&x), theory.is_int(&y), num_num(cmp_int(&i_x, &i_y))]);
    let real_real = and3(ctx, &[theory.is_real(&x), theory.is_real(&y), num_num(cmp_real(&r_x, &r_y))]);
    let int_real = and3(
        ctx,
        &[theory.is_int(&x), theory.is_real(&y), num_num(cmp_real(&i_x.to_real(), &r_y))],
    );
    let real_int = and3(
        ctx,
        &[theory.is_real(&x), theory.is_int(&y), num_num(cmp_real(&r_x, &i_y.to_real()))],
    );

    let x_is_num = Bool::or(ctx, &[&theory.is_int(&x), &theory.is_real(&x)]);
    let y_is_num = Bool::or(ctx, &[&theory.is_int(&y), &theory.is_real(&y)]);
    let x_is_compound = Bool::or(ctx, &[&theory.is_atm(&x), &theory.is_lst(&x), &theory.is_tpl(&x)]);
    let y_is_compound = Bool::or(ctx, &[&theory.is_atm(&y), &theory.is_lst(&y), &theory.is_tpl(&y)]);

    let num_compound = and3(ctx, &[x_is_num, y_is_compound.clone(), z._eq(&asc)]);
    let compound_num = and3(ctx, &[x_is_compound.clone(), y_is_num, z._eq(&desc)]);
    let atom_compound = and3(
        ctx,
        &[theory.is_atm(&x), Bool::or(ctx, &[&theory.is_lst(&y), &theory.is_tpl(&y)]), z._eq(&asc)],
    );
    let compound_atom = and3(
        ctx,
        &[Bool::or(ctx, &[&theory.is_lst(&x), &theory.is_tpl(&x)]), theory.is_atm(&y), z._eq(&desc)],
    );
    let tuple_list = and3(ctx, &[theory.is_tpl(&x), theory.is_lst(&y), z._eq(&asc)]);
    let list_tuple = and3(ctx, &[theory.is_lst(&x), theory.is_tpl(&y), z._eq(&desc)]);

    let _ = (x_is_compound, y_is_compound);
    session.solver().assert(&or_all(
        ctx,
        &[
            int_int, real_real, int_real, real_int, num_compound, compound_num, atom_compound,
            compound_atom, tuple_list, list_tuple,
        ],
    ));
    Ok(())
}

fn numeric_cmp<'ctx>(op: CompareOp, lt: Bool<'ctx>, gt: Bool<'ctx>, le: Bool<'ctx>, ge: Bool<'ctx>) -> Bool<'ctx> {
    match op {
        CompareOp::Lt => lt,
        CompareOp::Gt => gt,
        CompareOp::Lteq => le,
        CompareOp::Gteq => ge,
    }
}

// ---- List/tuple element access ----

pub fn hd(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t1 = encode_arg(session, args, 0)?;
    let t2 = encode_arg(session, args, 1)?;
    let theory = session.theory();
    session.solver().assert(&theory.is_lst(&t1));
    session.solver().assert(&theory.is_cons(&theory.lval(&t1)));
    session.solver().assert(&theory.hd(&theory.lval(&t1))._eq(&t2));
    Ok(())
}

pub fn tl(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t1 = encode_arg(session, args, 0)?;
    let t2 = encode_arg(session, args, 1)?;
    let theory = session.theory();
    session.solver().assert(&theory.is_lst(&t1));
    session.solver().assert(&theory.is_cons(&theory.lval(&t1)));
    session
        .solver()
        .assert(&theory.mk_lst(&theory.tl(&theory.lval(&t1)))._eq(&t2));
    Ok(())
}

/// erlang:element/2. The index (`term1`) is read straight off the wire
/// as a literal rather than encoded into the theory, matching the
/// original's `#!# SIMPLIFIED (Expect term1 to represent an Integer)`.
pub fn elem(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let idx = arg_int_literal(args, 0)?;
    let t2 = encode_arg(session, args, 1)?;
    let t3 = encode_arg(session, args, 2)?;
    let theory = session.theory();
    session.solver().assert(&theory.is_tpl(&t2));
    let mut cur = theory.tval(&t2);
    let mut head = None;
    for _ in 0..idx {
        session.solver().assert(&theory.is_cons(&cur));
        head = Some(theory.hd(&cur));
        cur = theory.tl(&cur);
    }
    if let Some(h) = head {
        session.solver().assert(&t3._eq(&h));
    }
    Ok(())
}

pub fn list_to_tuple(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t1 = encode_arg(session, args, 0)?;
    let t2 = encode_arg(session, args, 1)?;
    let theory = session.theory();
    session.solver().assert(&theory.is_lst(&t1));
    session.solver().assert(&theory.is_tpl(&t2));
    session.solver().assert(&theory.lval(&t1)._eq(&theory.tval(&t2)));
    Ok(())
}

pub fn tuple_to_list(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t1 = encode_arg(session, args, 0)?;
    let t2 = encode_arg(session, args, 1)?;
    let theory = session.theory();
    session.solver().assert(&theory.is_tpl(&t1));
    session.solver().assert(&theory.is_lst(&t2));
    session.solver().assert(&theory.tval(&t1)._eq(&theory.lval(&t2)));
    Ok(())
}

// ---- Numeric conversion & predicates ----

pub fn float(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t1 = encode_arg(session, args, 0)?;
    let t2 = encode_arg(session, args, 1)?;
    let theory = session.theory();
    let ctx = theory.ctx();
    session.solver().assert(&theory.is_real(&t2));
    let already_real = and3(ctx, &[theory.is_real(&t1), t2._eq(&t1)]);
    let cast = and3(
        ctx,
        &[theory.is_int(&t1), theory.rval(&t2)._eq(&theory.ival(&t1).to_real())],
    );
    session.solver().assert(&or_all(ctx, &[already_real, cast]));
    Ok(())
}

macro_rules! unary_predicate {
    ($name:ident, $test:ident) => {
        pub fn $name(session: &mut Session, args: &[Value]) -> BackendResult<()> {
            let t1 = encode_arg(session, args, 0)?;
            let t2 = encode_arg(session, args, 1)?;
            let theory = session.theory();
            let cond = theory.$test(&t1);
            let truthy = t2._eq(session.atom_true());
            let falsy = t2._eq(session.atom_false());
            let ax = ite_bool(session.theory().ctx(), &cond, &truthy, &falsy);
            session.solver().assert(&ax);
            Ok(())
        }
    };
}

unary_predicate!(is_atom, is_atm);
unary_predicate!(is_float, is_real);
unary_predicate!(is_integer, is_int);
unary_predicate!(is_list, is_lst);
unary_predicate!(is_tuple, is_tpl);

pub fn is_boolean(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t1 = encode_arg(session, args, 0)?;
    let t2 = encode_arg(session, args, 1)?;
    let ctx = session.theory().ctx();
    let truthy = session.atom_true().clone();
    let falsy = session.atom_false().clone();
    let cond = Bool::or(ctx, &[&t1._eq(&truthy), &t1._eq(&falsy)]);
    let ax = ite_bool(ctx, &cond, &t2._eq(&truthy), &t2._eq(&falsy));
    session.solver().assert(&ax);
    Ok(())
}

pub fn is_number(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t1 = encode_arg(session, args, 0)?;
    let t2 = encode_arg(session, args, 1)?;
    let theory = session.theory();
    let ctx = theory.ctx();
    let cond = Bool::or(ctx, &[&theory.is_int(&t1), &theory.is_real(&t1)]);
    let ax = ite_bool(ctx, &cond, &t2._eq(session.atom_true()), &t2._eq(session.atom_false()));
    session.solver().assert(&ax);
    Ok(())
}

pub fn trunc(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t1 = encode_arg(session, args, 0)?;
    let t2 = encode_arg(session, args, 1)?;
    let theory = session.theory();
    let ctx = theory.ctx();
    session.solver().assert(&theory.is_int(&t2));

    let e1 = and3(ctx, &[theory.is_int(&t1), t2._eq(&t1)]);
    let r1 = theory.rval(&t1);
    let truncated = r1.to_int();
    let zero = Real::from_real(ctx, 0, 1);
    let non_negative = and3(ctx, &[r1.ge(&zero), theory.ival(&t2)._eq(&truncated)]);
    let negative = and3(ctx, &[r1.lt(&zero), theory.ival(&t2)._eq(&(truncated.add(&[&Int::from_i64(ctx, 1)])))]);
    let e2 = and3(ctx, &[theory.is_real(&t1), or_all(ctx, &[non_negative, negative])]);

    session.solver().assert(&or_all(ctx, &[e1, e2]));
    Ok(())
}

pub fn round(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let t1 = encode_arg(session, args, 0)?;
    let t2 = encode_arg(session, args, 1)?;
    let theory = session.theory();
    let ctx = theory.ctx();
    session.solver().assert(&theory.is_int(&t2));

    let e1 = and3(ctx, &[theory.is_int(&t1), t2._eq(&t1)]);
    let r1 = theory.rval(&t1);
    let floor = r1.to_int();
    let half = Real::from_real(ctx, 1, 2);
    let rounds_up = r1.sub(&[&floor.to_real()]).ge(&half);
    let up = and3(ctx, &[rounds_up.clone(), theory.ival(&t2)._eq(&(floor.add(&[&Int::from_i64(ctx, 1)])))]);
    let down = and3(ctx, &[rounds_up.not(), theory.ival(&t2)._eq(&floor)]);
    let e2 = and3(ctx, &[theory.is_real(&t1), or_all(ctx, &[up, down])]);

    session.solver().assert(&or_all(ctx, &[e1, e2]));
    Ok(())
}

// ---- Bounded length / tuple_size / make_tuple ----

enum LenKind {
    List,
    Tuple,
}

pub fn length(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    bounded_len(session, args, LenKind::List)
}

pub fn tuple_size(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    bounded_len(session, args, LenKind::Tuple)
}

/// Bounds the unbounded `length`/`tuple_size` relation to `max_len`: an
/// `If`-chain (here, `Or`/`And`) that walks up to `max_len` `cons` cells,
/// matching `_bif_len_h` in the original source (§4.4).
fn bounded_len(session: &mut Session, args: &[Value], kind: LenKind) -> BackendResult<()> {
    let t = encode_arg(session, args, 0)?;
    let n = encode_arg(session, args, 1)?;
    let max_len = session.config().max_len;
    let theory = session.theory();
    let ctx = theory.ctx();

    let (shape_ok, mut cur) = match kind {
        LenKind::List => (theory.is_lst(&t), theory.lval(&t)),
        LenKind::Tuple => (theory.is_tpl(&t), theory.tval(&t)),
    };

    let mut steps = Vec::with_capacity(max_len as usize + 1);
    for i in 0..=max_len {
        steps.push((cur.clone(), i));
        cur = theory.tl(&cur);
    }

    let n_ival = theory.ival(&n);
    let mut ax = n_ival.ge(&Int::from_i64(ctx, (max_len + 1) as i64));
    for (x, i) in steps.into_iter().rev() {
        let matches_here = n_ival._eq(&Int::from_i64(ctx, i as i64));
        let continues = Bool::and(ctx, &[&theory.is_cons(&x), &ax]);
        ax = ite_bool(ctx, &theory.is_nil(&x), &matches_here, &continues);
    }

    session
        .solver()
        .assert(&and3(ctx, &[shape_ok, theory.is_int(&n), ax]));
    Ok(())
}

/// erlang:make_tuple/2, bounded the same way as `length`/`tuple_size`.
pub fn make_tuple2(session: &mut Session, args: &[Value]) -> BackendResult<()> {
    let x = encode_arg(session, args, 0)?;
    let n = encode_arg(session, args, 1)?;
    let y = encode_arg(session, args, 2)?;
    let max_len = session.config().max_len;
    let theory = session.theory();
    let ctx = theory.ctx();
    let n_ival = theory.ival(&n);

    let mut t = theory.nil();
    let mut clauses = vec![and3(
        ctx,
        &[n_ival._eq(&Int::from_i64(ctx, 0)), y._eq(&theory.mk_tpl(&t))],
    )];
    for i in 1..=max_len {
        t = theory.cons(&x, &t);
        clauses.push(and3(
            ctx,
            &[n_ival._eq(&Int::from_i64(ctx, i as i64)), y._eq(&theory.mk_tpl(&t))],
        ));
    }
    clauses.push(n_ival.gt(&Int::from_i64(ctx, max_len as i64)));

    session
        .solver()
        .assert(&and3(ctx, &[theory.is_int(&n), or_all(ctx, &clauses)]));
    Ok(())
}
