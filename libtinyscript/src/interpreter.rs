//! Small-step reference interpreter for TinyScript.
//!
//! Used as a test oracle and to replay SMT counterexamples (see
//! [`crate::driver`]). Deterministic; never panics on a well-formed [`Prog`].
//!
//! Only elementary statements (`Skip`, `Assign`, `Output`, `Abort`) consume a
//! step; evaluating a loop guard and dispatching to the body is free, exactly
//! like `if`. A statement that dispatches for free must be able to terminate
//! on an exhausted budget it never needed to spend — only the elementary
//! arms themselves check for a zero budget (see [`elementary_step`]).

use crate::ast::{Formula, Prog, State, Term, STDOUT};

/// Outcome of running a program to completion or to a resource limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Ran to completion normally.
    Terminated,
    /// Executed an `abort` statement.
    Aborted,
    /// Evaluating a term or formula hit an undefined variable.
    Error(String),
    /// Exhausted the step budget before terminating.
    MaxSteps,
}

/// Evaluate a [`Term`] against `state`, or fail if it reads an undefined
/// variable.
pub fn term_exec(state: &State, e: &Term) -> Result<i64, String> {
    match e {
        Term::Const(v) => Ok(*v),
        Term::Var(name) => state
            .get(name)
            .ok_or_else(|| format!("variable {name:?} undefined in state")),
        Term::Sum(l, r) => Ok(term_exec(state, l)? + term_exec(state, r)?),
        Term::Difference(l, r) => Ok(term_exec(state, l)? - term_exec(state, r)?),
        Term::Product(l, r) => Ok(term_exec(state, l)? * term_exec(state, r)?),
    }
}

/// Evaluate a [`Formula`] against `state`, or fail if it reads an undefined
/// variable.
pub fn fmla_exec(state: &State, p: &Formula) -> Result<bool, String> {
    match p {
        Formula::True => Ok(true),
        Formula::False => Ok(false),
        Formula::Not(q) => Ok(!fmla_exec(state, q)?),
        Formula::And(p, q) => Ok(fmla_exec(state, p)? && fmla_exec(state, q)?),
        Formula::Or(p, q) => Ok(fmla_exec(state, p)? || fmla_exec(state, q)?),
        Formula::Implies(p, q) => Ok(!fmla_exec(state, p)? || fmla_exec(state, q)?),
        Formula::Eq(l, r) => Ok(term_exec(state, l)? == term_exec(state, r)?),
        Formula::Lt(l, r) => Ok(term_exec(state, l)? < term_exec(state, r)?),
    }
}

/// Run one elementary statement that consumes a step of `max_steps`,
/// reporting `MaxSteps` if the budget is already exhausted rather than
/// evaluating `body`. Only [`Prog::Skip`], [`Prog::Assign`], [`Prog::Output`]
/// and [`Prog::Abort`] call this: `Seq`, `If` and a `While` guard dispatch
/// for free and must never see an exhausted budget turned into a spurious
/// `MaxSteps` before they've had a chance to terminate without spending it.
fn elementary_step(
    state: &State,
    max_steps: Option<u64>,
    body: impl FnOnce() -> (State, Status),
) -> (State, Status, Option<u64>) {
    if max_steps == Some(0) {
        return (state.clone(), Status::MaxSteps, Some(0));
    }
    let (next_state, status) = body();
    let remaining = match status {
        Status::Terminated | Status::Aborted => max_steps.map(|m| m - 1),
        _ => max_steps,
    };
    (next_state, status, remaining)
}

/// Execute `alpha` from `state`, consuming at most `max_steps` elementary
/// steps (`None` means unbounded). Returns the final state, the status and
/// the steps remaining in the budget (`None` if unbounded).
pub fn exec(state: &State, alpha: &Prog, max_steps: Option<u64>) -> (State, Status, Option<u64>) {
    match alpha {
        Prog::Skip => elementary_step(state, max_steps, || (state.clone(), Status::Terminated)),
        Prog::Assign(name, e) => elementary_step(state, max_steps, || match term_exec(state, e) {
            Ok(v) => (state.with(name.clone(), v), Status::Terminated),
            Err(msg) => {
                tracing::debug!(%msg, "interpreter error evaluating assignment");
                (state.clone(), Status::Error(msg))
            }
        }),
        Prog::Seq(a, b) => {
            let (s1, st1, rem1) = exec(state, a, max_steps);
            match st1 {
                Status::Terminated => exec(&s1, b, rem1),
                _ => (s1, st1, rem1),
            }
        }
        Prog::If(q, a, b) => match fmla_exec(state, q) {
            Ok(true) => exec(state, a, max_steps),
            Ok(false) => exec(state, b, max_steps),
            Err(msg) => {
                tracing::debug!(%msg, "interpreter error evaluating if-condition");
                (state.clone(), Status::Error(msg), max_steps)
            }
        },
        Prog::While(q, body) => {
            let mut state = state.clone();
            let mut remaining = max_steps;
            loop {
                match fmla_exec(&state, q) {
                    Ok(false) => return (state, Status::Terminated, remaining),
                    Ok(true) => {}
                    Err(msg) => {
                        tracing::debug!(%msg, "interpreter error evaluating while-condition");
                        return (state, Status::Error(msg), remaining);
                    }
                }
                let (s2, st2, rem2) = exec(&state, body, remaining);
                match st2 {
                    Status::Terminated => {
                        state = s2;
                        remaining = rem2;
                    }
                    _ => return (s2, st2, rem2),
                }
            }
        }
        Prog::Output(e) => elementary_step(state, max_steps, || match term_exec(state, e) {
            Ok(v) => (state.with(STDOUT, v), Status::Terminated),
            Err(msg) => {
                tracing::debug!(%msg, "interpreter error evaluating output");
                (state.clone(), Status::Error(msg))
            }
        }),
        Prog::Abort => elementary_step(state, max_steps, || (state.clone(), Status::Aborted)),
    }
}

/// Steps consumed so far, given the starting budget and what [`exec`]
/// reported remaining. Only meaningful when `max_steps` was `Some`.
pub fn steps_used(max_steps: u64, remaining: Option<u64>) -> u64 {
    max_steps - remaining.unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn terminates_and_counts_elementary_steps() {
        let p = parse("x := 1; y := 2; output x").unwrap();
        let (state, status, remaining) = exec(&State::new(), &p, Some(100));
        assert_eq!(status, Status::Terminated);
        assert_eq!(state.get("x"), Some(1));
        assert_eq!(state.get(STDOUT), Some(1));
        assert_eq!(steps_used(100, remaining), 3);
    }

    #[test]
    fn while_loop_only_charges_body_steps() {
        // 5 iterations, 1 elementary statement (assignment) per iteration.
        let p = parse("i := 0; while (i < 5) do i := i + 1 done").unwrap();
        let (state, status, remaining) = exec(&State::new(), &p, Some(100));
        assert_eq!(status, Status::Terminated);
        assert_eq!(state.get("i"), Some(5));
        assert_eq!(steps_used(100, remaining), 6);
    }

    #[test]
    fn undefined_read_is_an_error() {
        let p = parse("output y").unwrap();
        let (_, status, _) = exec(&State::new(), &p, Some(10));
        assert!(matches!(status, Status::Error(_)));
    }

    #[test]
    fn abort_has_no_further_effect() {
        let p = parse("x := 1; abort; x := 2").unwrap();
        let (state, status, _) = exec(&State::new(), &p, Some(10));
        assert_eq!(status, Status::Aborted);
        assert_eq!(state.get("x"), Some(1));
    }

    #[test]
    fn exhausting_the_step_budget_reports_maxsteps() {
        let p = parse("while (true) do skip done").unwrap();
        let (_, status, remaining) = exec(&State::new(), &p, Some(3));
        assert_eq!(status, Status::MaxSteps);
        assert_eq!(remaining, Some(0));
    }

    #[test]
    fn zero_budget_left_over_does_not_block_a_free_termination() {
        // The `skip` spends the only step in the budget; the `while`'s guard
        // is already false, so it terminates for free rather than needing
        // (and lacking) a step of its own.
        let p = parse("skip; while (false) do x := 1 done").unwrap();
        let (_, status, remaining) = exec(&State::new(), &p, Some(1));
        assert_eq!(status, Status::Terminated);
        assert_eq!(remaining, Some(0));
    }
}
