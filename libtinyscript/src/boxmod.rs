//! The box-modality transformer: `box(alpha, phi, depth, strict)` computes a
//! formula equivalent to "after every trace of `alpha` of length bounded by
//! `depth` loop unrollings, `phi` holds in the final state", per the axioms
//! of (deterministic) dynamic logic.
//!
//! `While` is the only construct that consumes unrolling budget; it is
//! handled by direct self-recursion on the same AST node with `depth - 1`,
//! which is exactly the closed form
//! `[while q do a] phi = (!q -> phi) && (q -> [a][while q do a, depth-1] phi)`
//! — there's no need to materialize the unrolled `if`/`seq` tree.

use z3::ast::{Ast, Bool};
use z3::Context;

use crate::ast::{Prog, STDOUT};
use crate::encode::{enc_formula, enc_term, var_const};

/// Apply the box-modality axioms to `alpha`, producing a verification
/// condition equivalent to "every trace of `alpha`, unrolling `while` loops
/// up to `depth` times, satisfies `postcondition`".
///
/// When a `while` would need more than `depth` unrollings: if `strict` is
/// `true`, the axiom contributes `false` (the trace is treated as a
/// violation unless the solver can show the branch is unreachable);
/// if `false`, it contributes `true` (the trace is ignored).
///
/// The result is simplified via Z3's own term simplifier after every axiom
/// application, keeping intermediate formulas small.
pub fn box_modality<'ctx>(
    ctx: &'ctx Context,
    alpha: &Prog,
    postcondition: Bool<'ctx>,
    depth: u32,
    strict: bool,
) -> Bool<'ctx> {
    let result = match alpha {
        Prog::Skip => postcondition,

        // `abort` has no terminating trace, so the box modality holds
        // vacuously.
        Prog::Abort => Bool::from_bool(ctx, true),

        Prog::Assign(name, e) => {
            let lhs = var_const(ctx, name);
            let rhs = enc_term(ctx, e);
            postcondition.substitute(&[(&lhs, &rhs)])
        }

        Prog::Output(e) => {
            let lhs = var_const(ctx, STDOUT);
            let rhs = enc_term(ctx, e);
            postcondition.substitute(&[(&lhs, &rhs)])
        }

        Prog::Seq(a, b) => {
            let inner = box_modality(ctx, b, postcondition, depth, strict);
            box_modality(ctx, a, inner, depth, strict)
        }

        Prog::If(q, a, b) => {
            let qe = enc_formula(ctx, q);
            let then_branch = qe.implies(&box_modality(ctx, a, postcondition.clone(), depth, strict));
            let else_branch = qe.not().implies(&box_modality(ctx, b, postcondition, depth, strict));
            Bool::and(ctx, &[&then_branch, &else_branch])
        }

        Prog::While(q, body) => {
            if depth == 0 {
                return Bool::from_bool(ctx, !strict);
            }
            let qe = enc_formula(ctx, q);
            // [while q do body, depth] post = box(body, [while q do body, depth-1] post)
            let unrolled = box_modality(ctx, alpha, postcondition.clone(), depth - 1, strict);
            let body_then_loop = box_modality(ctx, body, unrolled, depth, strict);
            let then_branch = qe.implies(&body_then_loop);
            let else_branch = qe.not().implies(&postcondition);
            Bool::and(ctx, &[&then_branch, &else_branch])
        }
    };
    result.simplify()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use z3::ast::Int;
    use z3::{Config, SatResult, Solver};

    fn check_valid<'ctx>(ctx: &'ctx Context, vc: &Bool<'ctx>) -> bool {
        let solver = Solver::new(ctx);
        solver.assert(&vc.not());
        matches!(solver.check(), SatResult::Unsat)
    }

    #[test]
    fn skip_is_transparent() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let alpha = parse("skip").unwrap();
        let post = Bool::from_bool(&ctx, true);
        let vc = box_modality(&ctx, &alpha, post, 1, true);
        assert!(check_valid(&ctx, &vc));
    }

    #[test]
    fn abort_is_vacuously_safe() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let alpha = parse("abort").unwrap();
        let post = Bool::from_bool(&ctx, false);
        let vc = box_modality(&ctx, &alpha, post, 1, true);
        assert!(check_valid(&ctx, &vc));
    }

    #[test]
    fn assignment_substitutes_into_postcondition() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let alpha = parse("x := 5").unwrap();
        let x = Int::new_const(&ctx, "x");
        let post = x._eq(&Int::from_i64(&ctx, 5));
        let vc = box_modality(&ctx, &alpha, post, 1, true);
        assert!(check_valid(&ctx, &vc));
    }

    #[test]
    fn while_true_skip_is_unsatisfiable_postcondition_when_unrolled() {
        // `while (true) do skip done` never terminates within any finite
        // unrolling depth; with strict=true the box modality is `false`,
        // so `[alpha] false` is never valid (it's equivalent to `false`,
        // whose negation `true` is sat, not unsat).
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let alpha = parse("while (true) do skip done").unwrap();
        let post = Bool::from_bool(&ctx, false);
        let vc = box_modality(&ctx, &alpha, post, 3, true);
        assert!(!check_valid(&ctx, &vc));
    }

    #[test]
    fn bounded_loop_terminating_within_depth_is_valid() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let alpha = parse("i := 0; while (i < 3) do i := i + 1 done").unwrap();
        let i = Int::new_const(&ctx, "i");
        let post = i._eq(&Int::from_i64(&ctx, 3));
        let vc = box_modality(&ctx, &alpha, post, 5, true);
        assert!(check_valid(&ctx, &vc));
    }
}
