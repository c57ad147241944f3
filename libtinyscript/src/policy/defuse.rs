//! Define-before-use policy: every variable must be assigned before it is
//! read.
//!
//! Instrumentation adds one boolean ghost flag per variable, `#def_<name>`,
//! set once that variable has been assigned, plus a single `#violation`
//! flag latched the first time a read observes its flag unset. The
//! postcondition asserts `#violation` never latches.
//!
//! Run with `strict = false`: a trace that loops past the unrolling depth
//! without having (yet) read an undefined variable says nothing about what
//! happens on further iterations, so it must not count as either a pass or
//! a failure — the box modality's `strict = false` branch drops it rather
//! than forcing it to `false`.

use std::time::Duration;

use crate::ast::{Formula, Prog, Term};
use crate::boxmod::box_modality;
use crate::driver::{check_vc, new_context, CheckResult, Query};
use crate::encode::enc_formula;
use crate::vars::{vars_formula, vars_prog, vars_term};

/// Ghost flag for `#violation`.
pub const VIOLATION: &str = "#violation";

fn def_flag(name: &str) -> String {
    format!("#def_{name}")
}

/// `if #def_v then skip else #violation := 1`, for every `v` read by a
/// statement about to execute.
fn checks(reads: &[String]) -> Prog {
    reads.iter().fold(Prog::Skip, |acc, v| {
        let guard = Formula::eq(Term::var(def_flag(v)), Term::Const(1));
        let check = Prog::if_then_else(
            guard,
            Prog::Skip,
            Prog::assign(VIOLATION, Term::Const(1)),
        );
        Prog::seq(acc, check)
    })
}

fn mark_defined(name: &str) -> Prog {
    Prog::assign(def_flag(name), Term::Const(1))
}

fn instrument_stmt(alpha: &Prog) -> Prog {
    match alpha {
        Prog::Skip => Prog::Skip,
        Prog::Abort => Prog::Abort,
        Prog::Assign(name, e) => Prog::seq_all(vec![
            checks(&vars_term(e)),
            Prog::assign(name.clone(), (**e).clone()),
            mark_defined(name),
        ]),
        Prog::Output(e) => Prog::seq(checks(&vars_term(e)), Prog::output((**e).clone())),
        Prog::Seq(a, b) => Prog::seq(instrument_stmt(a), instrument_stmt(b)),
        Prog::If(q, a, b) => Prog::seq(
            checks(&vars_formula(q)),
            Prog::if_then_else((**q).clone(), instrument_stmt(a), instrument_stmt(b)),
        ),
        Prog::While(q, body) => Prog::seq(
            checks(&vars_formula(q)),
            Prog::while_loop(
                (**q).clone(),
                Prog::seq(instrument_stmt(body), checks(&vars_formula(q))),
            ),
        ),
    }
}

/// Rewrite `alpha` to maintain `#def_<name>` and `#violation`, all
/// initialised to "undefined" / "no violation yet".
pub fn instrument(alpha: &Prog) -> Prog {
    let init = vars_prog(alpha)
        .into_iter()
        .fold(Prog::assign(VIOLATION, Term::Const(0)), |acc, v| {
            Prog::seq(acc, Prog::assign(def_flag(&v), Term::Const(0)))
        });
    Prog::seq(init, instrument_stmt(alpha))
}

/// `#violation == 0`.
pub fn postcondition() -> Formula {
    Formula::eq(Term::var(VIOLATION), Term::Const(0))
}

/// Bounded check of the define-before-use policy.
pub fn symbolic_check(alpha: &Prog, depth: u32, timeout: Duration) -> CheckResult {
    let instrumented = instrument(alpha);
    let ctx = new_context();
    let post = enc_formula(&ctx, &postcondition());
    let vc = box_modality(&ctx, &instrumented, post, depth, false);
    let query = Query::new(&ctx, vc);
    check_vc(&query, timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn assign_then_use_satisfies() {
        let alpha = parse("x := 1; y := x + 1; output y").unwrap();
        assert_eq!(symbolic_check(&alpha, 5, Duration::from_secs(5)), CheckResult::Satisfies);
    }

    #[test]
    fn reading_before_assignment_violates() {
        let alpha = parse("output y").unwrap();
        assert_eq!(symbolic_check(&alpha, 5, Duration::from_secs(5)), CheckResult::Violates);
    }

    #[test]
    fn conditional_definition_on_both_branches_satisfies() {
        let alpha = parse("if (true) then x := 1 else x := 2 endif; output x").unwrap();
        assert_eq!(symbolic_check(&alpha, 5, Duration::from_secs(5)), CheckResult::Satisfies);
    }

    #[test]
    fn conditional_definition_on_one_branch_can_violate() {
        let alpha = parse("if (x < 1) then skip else x := 2 endif; output x").unwrap();
        assert_eq!(symbolic_check(&alpha, 5, Duration::from_secs(5)), CheckResult::Violates);
    }
}
