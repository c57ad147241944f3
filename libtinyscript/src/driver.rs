//! Symbolic driver: ties the box transformer, a policy instrumentation and
//! the solver together into a three-valued verdict.

use std::fmt;
use std::time::Duration;

use z3::ast::Bool;
use z3::{Config, Context, Params, SatResult, Solver};

use crate::ast::{Prog, State};
use crate::interpreter;
use crate::vars::vars_prog;

/// Outcome of a bounded symbolic check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckResult {
    /// Every trace within the unrolling depth satisfies the policy.
    Satisfies,
    /// A trace within the unrolling depth violates the policy.
    Violates,
    /// Indeterminate: solver timeout, or a non-terminating trace beyond the
    /// unrolling depth with no concrete witness.
    Unknown,
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CheckResult::Satisfies => "Satisfies",
            CheckResult::Violates => "Violates",
            CheckResult::Unknown => "Unknown",
        };
        write!(f, "{s}")
    }
}

/// A program together with the z3 [`Context`] that its formulas were built
/// from; kept alive together so encoded ASTs stay valid.
pub struct Query<'ctx> {
    ctx: &'ctx Context,
    vc: Bool<'ctx>,
}

impl<'ctx> Query<'ctx> {
    /// Wrap a pre-built verification condition.
    pub fn new(ctx: &'ctx Context, vc: Bool<'ctx>) -> Self {
        Self { ctx, vc }
    }
}

/// Check a verification condition `vc` for validity: query the solver for
/// the satisfiability of `!vc` under `timeout`, and map the result.
///
/// A solver context is scoped to this call and dropped on every exit path,
/// including the timeout path: [`z3::Solver`] owns no resources beyond the
/// lifetime of this stack frame.
pub fn check_vc(query: &Query<'_>, timeout: Duration) -> CheckResult {
    check_vc_with_witness(query, timeout).0
}

/// As [`check_vc`], but also returns the satisfying model for `!vc` when the
/// verdict is [`CheckResult::Violates`] — the counterexample trace a policy
/// check needs to replay on the reference interpreter.
pub fn check_vc_with_witness<'ctx>(
    query: &Query<'ctx>,
    timeout: Duration,
) -> (CheckResult, Option<z3::Model<'ctx>>) {
    let solver = Solver::new(query.ctx);
    let mut params = Params::new(query.ctx);
    params.set_u32("timeout", timeout.as_millis().min(u64::from(u32::MAX) as u128) as u32);
    solver.set_params(&params);

    solver.assert(&query.vc.not());
    match solver.check() {
        SatResult::Unsat => (CheckResult::Satisfies, None),
        SatResult::Sat => (CheckResult::Violates, solver.get_model()),
        SatResult::Unknown => {
            tracing::debug!(reason = %solver.get_reason_unknown().unwrap_or_default(), "solver returned unknown");
            (CheckResult::Unknown, None)
        }
    }
}

/// Build a fresh, scoped Z3 context. One context per query: the encoder's
/// name interning lives inside it and is discarded when it's dropped.
pub fn new_context() -> Context {
    Context::new(&Config::new())
}

/// Reconstruct an initial [`State`] from a satisfying model and replay it on
/// the reference interpreter, returning the resulting trace.
///
/// `alpha` determines which variables are populated from the model: every
/// variable appearing anywhere in the program is read out of the model
/// (defaulting to `0` when the model leaves it unconstrained), mirroring
/// the "model completion" behaviour needed to run `alpha` without spurious
/// interpreter errors.
pub fn replay<'ctx>(
    ctx: &'ctx Context,
    alpha: &Prog,
    model: &z3::Model<'ctx>,
    max_steps: Option<u64>,
) -> (State, interpreter::Status, Option<u64>) {
    use z3::ast::{Ast, Int};

    let mut bindings = Vec::new();
    for name in vars_prog(alpha) {
        let v = Int::new_const(ctx, name.as_str());
        let value = model
            .eval(&v, true)
            .and_then(|n| n.as_i64())
            .unwrap_or(0);
        bindings.push((name, value));
    }
    let state = State::from_iter(bindings);
    interpreter::exec(&state, alpha, max_steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Formula;
    use crate::boxmod::box_modality;
    use crate::encode::enc_formula;
    use crate::parser::parse;

    #[test]
    fn satisfies_when_vc_is_valid() {
        let ctx = new_context();
        let alpha = parse("x := 1").unwrap();
        let post = enc_formula(&ctx, &Formula::True);
        let vc = box_modality(&ctx, &alpha, post, 1, true);
        let q = Query::new(&ctx, vc);
        assert_eq!(check_vc(&q, Duration::from_secs(5)), CheckResult::Satisfies);
    }

    #[test]
    fn violates_when_vc_is_falsifiable() {
        let ctx = new_context();
        let alpha = parse("x := 1").unwrap();
        let post = enc_formula(&ctx, &Formula::False);
        let vc = box_modality(&ctx, &alpha, post, 1, true);
        let q = Query::new(&ctx, vc);
        assert_eq!(check_vc(&q, Duration::from_secs(5)), CheckResult::Violates);
    }
}
