//! Runtime step-bound policy: the program must terminate within a fixed
//! number of elementary steps.
//!
//! Instrumentation adds a single ghost counter, `#steps`, incremented before
//! every elementary statement (`skip`, assignment, `output`, `abort`); the
//! postcondition asserts the counter never exceeds the configured bound.
//!
//! Unlike [`crate::policy::defuse`] and [`crate::policy::taint`], this
//! policy runs the box transformer with `strict = true`: a trace that loops
//! past the unrolling depth without terminating has, by construction, not
//! stayed within the step bound, so it must count as a violation rather than
//! being silently ignored.

use std::time::Duration;

use crate::ast::{Formula, Prog, Term};
use crate::boxmod::box_modality;
use crate::driver::{check_vc_with_witness, new_context, replay, CheckResult, Query};
use crate::encode::enc_formula;
use crate::interpreter::{self, Status};

/// Ghost counter name.
pub const STEPS: &str = "#steps";

fn increment() -> Prog {
    Prog::assign(STEPS, Term::sum(Term::var(STEPS), Term::Const(1)))
}

fn instrument_stmt(alpha: &Prog) -> Prog {
    match alpha {
        Prog::Skip => Prog::seq(increment(), Prog::Skip),
        Prog::Abort => Prog::seq(increment(), Prog::Abort),
        Prog::Assign(name, e) => Prog::seq(increment(), Prog::assign(name.clone(), (**e).clone())),
        Prog::Output(e) => Prog::seq(increment(), Prog::output((**e).clone())),
        Prog::Seq(a, b) => Prog::seq(instrument_stmt(a), instrument_stmt(b)),
        Prog::If(q, a, b) => {
            Prog::if_then_else((**q).clone(), instrument_stmt(a), instrument_stmt(b))
        }
        Prog::While(q, body) => Prog::while_loop((**q).clone(), instrument_stmt(body)),
    }
}

/// Rewrite `alpha` to maintain `#steps`, initialised to zero.
pub fn instrument(alpha: &Prog) -> Prog {
    Prog::seq(Prog::assign(STEPS, Term::Const(0)), instrument_stmt(alpha))
}

/// `#steps <= step_bound`.
pub fn postcondition(step_bound: u64) -> Formula {
    let bound = i64::try_from(step_bound).unwrap_or(i64::MAX).saturating_add(1);
    Formula::lt(Term::var(STEPS), Term::Const(bound))
}

/// Bounded check of the step-bound policy.
///
/// A solver-reported violation is replayed on the reference interpreter
/// before being trusted: the box modality only reasons about traces within
/// `depth` loop unrollings, so a counterexample that requires more than
/// `depth` iterations to actually exceed `step_bound` is an artifact of the
/// bound rather than a genuine violation, and is reported as `Unknown`
/// instead.
pub fn symbolic_check(alpha: &Prog, step_bound: u64, depth: u32, timeout: Duration) -> CheckResult {
    let instrumented = instrument(alpha);
    let ctx = new_context();
    let post = enc_formula(&ctx, &postcondition(step_bound));
    let vc = box_modality(&ctx, &instrumented, post, depth, true);
    let query = Query::new(&ctx, vc);

    let (result, model) = check_vc_with_witness(&query, timeout);
    match (result, model) {
        (CheckResult::Violates, Some(model)) => {
            let replay_budget = step_bound.saturating_add(1).saturating_mul(4).max(64);
            let (final_state, status, _) =
                replay(&ctx, &instrumented, &model, Some(replay_budget));
            let steps_taken = final_state.get(STEPS).unwrap_or(0);
            let genuinely_violates = match status {
                Status::MaxSteps => true,
                _ => steps_taken > i64::try_from(step_bound).unwrap_or(i64::MAX),
            };
            if genuinely_violates {
                tracing::debug!(steps_taken, step_bound, "confirmed step-bound violation");
                CheckResult::Violates
            } else {
                tracing::debug!("counterexample did not reproduce under replay, reporting unknown");
                CheckResult::Unknown
            }
        }
        (other, _) => other,
    }
}

/// Run `alpha` under instrumentation with an interpreter step budget well
/// beyond `step_bound`, reporting how many elementary steps it actually took.
/// Used by the CLI to show a concrete trace alongside the verdict.
pub fn observe(alpha: &Prog, step_bound: u64) -> (Status, u64) {
    let instrumented = instrument(alpha);
    let budget = step_bound.saturating_add(1).saturating_mul(4).max(64);
    let (state, status, remaining) =
        interpreter::exec(&crate::ast::State::new(), &instrumented, Some(budget));
    (status, interpreter::steps_used(budget, remaining))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn terminating_loop_within_bound_satisfies() {
        let alpha = parse("i := 0; while (i < 3) do i := i + 1 done").unwrap();
        let result = symbolic_check(&alpha, 20, 5, Duration::from_secs(5));
        assert_eq!(result, CheckResult::Satisfies);
    }

    #[test]
    fn loop_exceeding_bound_violates() {
        let alpha = parse("i := 0; while (i < 10) do i := i + 1 done").unwrap();
        let result = symbolic_check(&alpha, 3, 12, Duration::from_secs(5));
        assert_eq!(result, CheckResult::Violates);
    }

    #[test]
    fn single_assignment_satisfies_any_positive_bound() {
        let alpha = parse("x := 1").unwrap();
        let result = symbolic_check(&alpha, 1, 1, Duration::from_secs(5));
        assert_eq!(result, CheckResult::Satisfies);
    }
}
