//! Encoder: maps TinyScript [`Term`]s and [`Formula`]s onto Z3's integer
//! and boolean sorts.
//!
//! Every TinyScript variable name is interned to a single Z3 integer
//! constant of the same name for the lifetime of one [`z3::Context`] — two
//! calls to [`enc_term`] for `Term::Var("x")` against the same context
//! produce ASTs Z3 considers identical, so no separate interning table is
//! needed: Z3's own symbol table does the work.

use z3::ast::{Ast, Bool, Int};
use z3::Context;

use crate::ast::{Formula, Term};

/// Encode a [`Term`] as a Z3 integer expression.
///
/// `Term::Product` of two non-constant subterms produces a genuinely
/// nonlinear constraint; Z3 may answer `unknown` for queries built from it.
pub fn enc_term<'ctx>(ctx: &'ctx Context, e: &Term) -> Int<'ctx> {
    match e {
        Term::Const(v) => Int::from_i64(ctx, *v),
        Term::Var(name) => Int::new_const(ctx, name.as_str()),
        Term::Sum(l, r) => {
            let l = enc_term(ctx, l);
            let r = enc_term(ctx, r);
            Int::add(ctx, &[&l, &r])
        }
        Term::Difference(l, r) => {
            let l = enc_term(ctx, l);
            let r = enc_term(ctx, r);
            Int::sub(ctx, &[&l, &r])
        }
        Term::Product(l, r) => {
            let l = enc_term(ctx, l);
            let r = enc_term(ctx, r);
            Int::mul(ctx, &[&l, &r])
        }
    }
}

/// Encode a [`Formula`] as a Z3 boolean expression.
pub fn enc_formula<'ctx>(ctx: &'ctx Context, p: &Formula) -> Bool<'ctx> {
    match p {
        Formula::True => Bool::from_bool(ctx, true),
        Formula::False => Bool::from_bool(ctx, false),
        Formula::Not(q) => enc_formula(ctx, q).not(),
        Formula::And(p, q) => {
            let p = enc_formula(ctx, p);
            let q = enc_formula(ctx, q);
            Bool::and(ctx, &[&p, &q])
        }
        Formula::Or(p, q) => {
            let p = enc_formula(ctx, p);
            let q = enc_formula(ctx, q);
            Bool::or(ctx, &[&p, &q])
        }
        Formula::Implies(p, q) => enc_formula(ctx, p).implies(&enc_formula(ctx, q)),
        Formula::Eq(l, r) => enc_term(ctx, l)._eq(&enc_term(ctx, r)),
        Formula::Lt(l, r) => enc_term(ctx, l).lt(&enc_term(ctx, r)),
    }
}

/// The Z3 integer constant that [`enc_term`] produces for variable `name`.
/// Used by the box transformer to build substitution pairs for assignment.
pub fn var_const<'ctx>(ctx: &'ctx Context, name: &str) -> Int<'ctx> {
    Int::new_const(ctx, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::State;
    use crate::interpreter::{fmla_exec, term_exec};
    use crate::parser::{fmla_parse, term_parse};
    use z3::{Config, SatResult, Solver};

    fn state_to_asserts<'ctx>(ctx: &'ctx Context, state: &State) -> Vec<Bool<'ctx>> {
        state
            .iter()
            .map(|(name, v)| Int::new_const(ctx, name)._eq(&Int::from_i64(ctx, v)))
            .collect()
    }

    /// Encoder round-trip: for closed terms and concrete states, the
    /// interpreter and Z3 (under a model fixing each variable) agree.
    #[test]
    fn term_encoding_matches_interpreter() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let state = State::from_iter([("x".to_string(), 3), ("y".to_string(), 4)]);

        for src in ["x + y", "x - y", "x * y", "(x + 1) * (y - 2)", "5"] {
            let term = term_parse(src).unwrap();
            let expected = term_exec(&state, &term).unwrap();

            let solver = Solver::new(&ctx);
            for a in state_to_asserts(&ctx, &state) {
                solver.assert(&a);
            }
            let encoded = enc_term(&ctx, &term);
            let result_var = Int::new_const(&ctx, "#result");
            solver.assert(&result_var._eq(&encoded));
            assert_eq!(solver.check(), SatResult::Sat);
            let model = solver.get_model().unwrap();
            let got = model.eval(&result_var, true).unwrap().as_i64().unwrap();
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn formula_encoding_matches_interpreter() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let state = State::from_iter([("x".to_string(), 3), ("y".to_string(), 4)]);

        for src in ["x < y", "x == y", "x < y && true", "!(x == y) -> true"] {
            let fmla = fmla_parse(src).unwrap();
            let expected = fmla_exec(&state, &fmla).unwrap();

            let solver = Solver::new(&ctx);
            for a in state_to_asserts(&ctx, &state) {
                solver.assert(&a);
            }
            let encoded = enc_formula(&ctx, &fmla);
            let check = if expected { encoded.clone() } else { encoded.not() };
            solver.assert(&check);
            assert_eq!(solver.check(), SatResult::Sat, "formula {src} should be {expected}");
        }
    }
}
