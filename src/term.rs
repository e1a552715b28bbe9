//! The Term Theory: three mutually recursive Z3 datatypes spanning the
//! source language's value universe.
//!
//! ```text
//! Term ::= int(Int) | real(Real) | lst(List) | tpl(List) | atm(Atom)
//! List ::= nil | cons(Term, List)
//! Atom ::= anil | acons(Int, Atom)
//! ```
//!
//! Declared once per session via [`TermTheory::new`]. Grounded on
//! `erlang_types()` in the original `z3_utils.py`.

use z3::ast::{Ast, Bool, Dynamic, Int, Real};
use z3::{Context, DatatypeAccessor, DatatypeBuilder, DatatypeSort, Sort};

/// Variant indices into `Term`'s `DatatypeSort`, fixed by declaration order.
mod term_variant {
    pub const INT: usize = 0;
    pub const REAL: usize = 1;
    pub const LST: usize = 2;
    pub const TPL: usize = 3;
    pub const ATM: usize = 4;
}

mod list_variant {
    pub const NIL: usize = 0;
    pub const CONS: usize = 1;
}

mod atom_variant {
    pub const ANIL: usize = 0;
    pub const ACONS: usize = 1;
}

/// The declared `Term`, `List`, and `Atom` sorts plus convenience
/// constructors/testers/accessors over them.
pub struct TermTheory<'ctx> {
    ctx: &'ctx Context,
    term: DatatypeSort<'ctx>,
    list: DatatypeSort<'ctx>,
    atom: DatatypeSort<'ctx>,
}

impl<'ctx> TermTheory<'ctx> {
    /// Declare the three datatypes simultaneously so each can reference
    /// the others (`Term::lst` takes a `List`, `List::cons` takes a `Term`).
    pub fn new(ctx: &'ctx Context) -> Self {
        let list_name = "List";
        let atom_name = "Atom";

        let term_builder = DatatypeBuilder::new(ctx, "Term")
            .variant("int", vec![("ival", DatatypeAccessor::Sort(Sort::int(ctx)))])
            .variant("real", vec![("rval", DatatypeAccessor::Sort(Sort::real(ctx)))])
            .variant("lst", vec![("lval", DatatypeAccessor::Datatype(list_name.into()))])
            .variant("tpl", vec![("tval", DatatypeAccessor::Datatype(list_name.into()))])
            .variant("atm", vec![("aval", DatatypeAccessor::Datatype(atom_name.into()))]);

        let list_builder = DatatypeBuilder::new(ctx, list_name)
            .variant("nil", vec![])
            .variant(
                "cons",
                vec![
                    ("hd", DatatypeAccessor::Datatype("Term".into())),
                    ("tl", DatatypeAccessor::Datatype(list_name.into())),
                ],
            );

        let atom_builder = DatatypeBuilder::new(ctx, atom_name)
            .variant("anil", vec![])
            .variant(
                "acons",
                vec![
                    ("ahd", DatatypeAccessor::Sort(Sort::int(ctx))),
                    ("atl", DatatypeAccessor::Datatype(atom_name.into())),
                ],
            );

        let mut sorts = z3::datatype_builder::create_datatypes(vec![
            term_builder,
            list_builder,
            atom_builder,
        ]);
        let atom = sorts.pop().unwrap();
        let list = sorts.pop().unwrap();
        let term = sorts.pop().unwrap();

        Self { ctx, term, list, atom }
    }

    // ---- Term constructors ----

    pub fn mk_int(&self, v: &Int<'ctx>) -> Dynamic<'ctx> {
        self.term.variants[term_variant::INT].constructor.apply(&[v])
    }

    pub fn mk_real(&self, v: &Real<'ctx>) -> Dynamic<'ctx> {
        self.term.variants[term_variant::REAL].constructor.apply(&[v])
    }

    pub fn mk_lst(&self, v: &Dynamic<'ctx>) -> Dynamic<'ctx> {
        self.term.variants[term_variant::LST].constructor.apply(&[v])
    }

    pub fn mk_tpl(&self, v: &Dynamic<'ctx>) -> Dynamic<'ctx> {
        self.term.variants[term_variant::TPL].constructor.apply(&[v])
    }

    pub fn mk_atm(&self, v: &Dynamic<'ctx>) -> Dynamic<'ctx> {
        self.term.variants[term_variant::ATM].constructor.apply(&[v])
    }

    // ---- Term testers ----

    pub fn is_int(&self, t: &Dynamic<'ctx>) -> Bool<'ctx> {
        self.term.variants[term_variant::INT].tester.apply(&[t]).as_bool().unwrap()
    }

    pub fn is_real(&self, t: &Dynamic<'ctx>) -> Bool<'ctx> {
        self.term.variants[term_variant::REAL].tester.apply(&[t]).as_bool().unwrap()
    }

    pub fn is_lst(&self, t: &Dynamic<'ctx>) -> Bool<'ctx> {
        self.term.variants[term_variant::LST].tester.apply(&[t]).as_bool().unwrap()
    }

    pub fn is_tpl(&self, t: &Dynamic<'ctx>) -> Bool<'ctx> {
        self.term.variants[term_variant::TPL].tester.apply(&[t]).as_bool().unwrap()
    }

    pub fn is_atm(&self, t: &Dynamic<'ctx>) -> Bool<'ctx> {
        self.term.variants[term_variant::ATM].tester.apply(&[t]).as_bool().unwrap()
    }

    // ---- Term accessors ----

    pub fn ival(&self, t: &Dynamic<'ctx>) -> Int<'ctx> {
        self.term.variants[term_variant::INT].accessors[0].apply(&[t]).as_int().unwrap()
    }

    pub fn rval(&self, t: &Dynamic<'ctx>) -> Real<'ctx> {
        self.term.variants[term_variant::REAL].accessors[0].apply(&[t]).as_real().unwrap()
    }

    pub fn lval(&self, t: &Dynamic<'ctx>) -> Dynamic<'ctx> {
        self.term.variants[term_variant::LST].accessors[0].apply(&[t])
    }

    pub fn tval(&self, t: &Dynamic<'ctx>) -> Dynamic<'ctx> {
        self.term.variants[term_variant::TPL].accessors[0].apply(&[t])
    }

    pub fn aval(&self, t: &Dynamic<'ctx>) -> Dynamic<'ctx> {
        self.term.variants[term_variant::ATM].accessors[0].apply(&[t])
    }

    // ---- List constructors/testers/accessors ----

    pub fn nil(&self) -> Dynamic<'ctx> {
        self.list.variants[list_variant::NIL].constructor.apply(&[])
    }

    pub fn cons(&self, hd: &Dynamic<'ctx>, tl: &Dynamic<'ctx>) -> Dynamic<'ctx> {
        self.list.variants[list_variant::CONS].constructor.apply(&[hd, tl])
    }

    pub fn is_nil(&self, l: &Dynamic<'ctx>) -> Bool<'ctx> {
        self.list.variants[list_variant::NIL].tester.apply(&[l]).as_bool().unwrap()
    }

    pub fn is_cons(&self, l: &Dynamic<'ctx>) -> Bool<'ctx> {
        self.list.variants[list_variant::CONS].tester.apply(&[l]).as_bool().unwrap()
    }

    pub fn hd(&self, l: &Dynamic<'ctx>) -> Dynamic<'ctx> {
        self.list.variants[list_variant::CONS].accessors[0].apply(&[l])
    }

    pub fn tl(&self, l: &Dynamic<'ctx>) -> Dynamic<'ctx> {
        self.list.variants[list_variant::CONS].accessors[1].apply(&[l])
    }

    // ---- Atom constructors/testers/accessors ----

    pub fn anil(&self) -> Dynamic<'ctx> {
        self.atom.variants[atom_variant::ANIL].constructor.apply(&[])
    }

    pub fn acons(&self, hd: &Int<'ctx>, tl: &Dynamic<'ctx>) -> Dynamic<'ctx> {
        self.atom.variants[atom_variant::ACONS].constructor.apply(&[hd, tl])
    }

    pub fn is_anil(&self, a: &Dynamic<'ctx>) -> Bool<'ctx> {
        self.atom.variants[atom_variant::ANIL].tester.apply(&[a]).as_bool().unwrap()
    }

    pub fn is_acons(&self, a: &Dynamic<'ctx>) -> Bool<'ctx> {
        self.atom.variants[atom_variant::ACONS].tester.apply(&[a]).as_bool().unwrap()
    }

    pub fn ahd(&self, a: &Dynamic<'ctx>) -> Int<'ctx> {
        self.atom.variants[atom_variant::ACONS].accessors[0].apply(&[a]).as_int().unwrap()
    }

    pub fn atl(&self, a: &Dynamic<'ctx>) -> Dynamic<'ctx> {
        self.atom.variants[atom_variant::ACONS].accessors[1].apply(&[a])
    }

    // ---- Whole-term helpers ----

    /// Build an `Atom` value from a sequence of character codes, folded
    /// right-to-left so the first code ends up at the head of the list.
    pub fn mk_atom_from_codes(&self, codes: &[i64]) -> Dynamic<'ctx> {
        let mut acc = self.anil();
        for &code in codes.iter().rev() {
            let code_int = Int::from_i64(self.ctx, code);
            acc = self.acons(&code_int, &acc);
        }
        acc
    }

    /// Build a `Term::atm` value directly from character codes.
    pub fn mk_atom_term(&self, codes: &[i64]) -> Dynamic<'ctx> {
        let atom = self.mk_atom_from_codes(codes);
        self.mk_atm(&atom)
    }

    pub fn ctx(&self) -> &'ctx Context {
        self.ctx
    }

    /// The `Term` sort itself, for declaring variables of this type.
    pub fn sort(&self) -> Sort<'ctx> {
        self.term.sort.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use z3::{Config, SatResult, Solver};

    #[test]
    fn int_roundtrips_through_constructor_and_accessor() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let theory = TermTheory::new(&ctx);
        let solver = Solver::new(&ctx);

        let five = Int::from_i64(&ctx, 5);
        let t = theory.mk_int(&five);
        solver.assert(&theory.is_int(&t));
        solver.assert(&theory.ival(&t)._eq(&five));
        assert_eq!(solver.check(), SatResult::Sat);
    }

    #[test]
    fn distinct_variants_are_mutually_exclusive() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let theory = TermTheory::new(&ctx);
        let solver = Solver::new(&ctx);

        let five = Int::from_i64(&ctx, 5);
        let t = theory.mk_int(&five);
        solver.assert(&theory.is_lst(&t));
        assert_eq!(solver.check(), SatResult::Unsat);
    }

    #[test]
    fn cons_list_has_expected_head_and_tail() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let theory = TermTheory::new(&ctx);
        let solver = Solver::new(&ctx);

        let one = theory.mk_int(&Int::from_i64(&ctx, 1));
        let lst = theory.cons(&one, &theory.nil());
        solver.assert(&theory.is_cons(&lst));
        solver.assert(&theory.hd(&lst)._eq(&one));
        solver.assert(&theory.is_nil(&theory.tl(&lst)));
        assert_eq!(solver.check(), SatResult::Sat);
    }

    #[test]
    fn atom_from_codes_builds_acons_chain() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let theory = TermTheory::new(&ctx);
        let solver = Solver::new(&ctx);

        let atom = theory.mk_atom_from_codes(&[116, 114, 117, 101]); // "true"
        solver.assert(&theory.is_acons(&atom));
        solver.assert(&theory.ahd(&atom)._eq(&Int::from_i64(&ctx, 116)));
        assert_eq!(solver.check(), SatResult::Sat);
    }
}
