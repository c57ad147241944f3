//! Taint / non-interference policy: values derived from a designated set of
//! "source" variables must never reach `output`.
//!
//! Instrumentation adds one boolean ghost flag per variable, `#tnt_<name>`,
//! updated on every assignment to be the disjunction of the taint of the
//! variables read on the right-hand side; a variable whose name carries the
//! configured source prefix is additionally treated as tainted on every
//! assignment to it, regardless of what it's assigned from, since it
//! represents a channel that is sensitive by construction rather than by
//! dataflow. A single `#leak` flag latches the first time a tainted value
//! reaches `output`. The postcondition asserts `#leak` never latches.
//!
//! Run with `strict = false`, for the same reason as
//! [`crate::policy::defuse`]: a trace that loops past the unrolling depth
//! without having (yet) leaked says nothing about further iterations.

use std::time::Duration;

use crate::ast::{Formula, Prog, Term};
use crate::boxmod::box_modality;
use crate::driver::{check_vc, new_context, CheckResult, Query};
use crate::encode::enc_formula;
use crate::vars::{vars_prog, vars_term};

/// Ghost flag for `#leak`.
pub const LEAK: &str = "#leak";

fn taint_flag(name: &str) -> String {
    format!("#tnt_{name}")
}

fn is_tainted(name: &str) -> Formula {
    Formula::eq(Term::var(taint_flag(name)), Term::Const(1))
}

/// `v1 == 1 || v2 == 1 || ...`, `false` if `names` is empty.
fn any_tainted(names: &[String]) -> Formula {
    names
        .iter()
        .map(|v| is_tainted(v))
        .fold(None, |acc, f| match acc {
            None => Some(f),
            Some(acc) => Some(Formula::or(acc, f)),
        })
        .unwrap_or(Formula::False)
}

/// `#tnt_name := 1 if (name is source-named || any read var is tainted) else 0`.
fn update_taint(name: &str, rhs_vars: &[String], source_prefix: &str) -> Prog {
    let mut condition = any_tainted(rhs_vars);
    if name.starts_with(source_prefix) {
        condition = Formula::or(Formula::True, condition);
    }
    Prog::if_then_else(
        condition,
        Prog::assign(taint_flag(name), Term::Const(1)),
        Prog::assign(taint_flag(name), Term::Const(0)),
    )
}

fn leak_check(rhs_vars: &[String]) -> Prog {
    Prog::if_then_else(
        any_tainted(rhs_vars),
        Prog::assign(LEAK, Term::Const(1)),
        Prog::Skip,
    )
}

fn instrument_stmt(alpha: &Prog, source_prefix: &str) -> Prog {
    match alpha {
        Prog::Skip => Prog::Skip,
        Prog::Abort => Prog::Abort,
        Prog::Assign(name, e) => Prog::seq(
            Prog::assign(name.clone(), (**e).clone()),
            update_taint(name, &vars_term(e), source_prefix),
        ),
        Prog::Output(e) => Prog::seq(leak_check(&vars_term(e)), Prog::output((**e).clone())),
        Prog::Seq(a, b) => Prog::seq(
            instrument_stmt(a, source_prefix),
            instrument_stmt(b, source_prefix),
        ),
        Prog::If(q, a, b) => Prog::if_then_else(
            (**q).clone(),
            instrument_stmt(a, source_prefix),
            instrument_stmt(b, source_prefix),
        ),
        Prog::While(q, body) => Prog::while_loop((**q).clone(), instrument_stmt(body, source_prefix)),
    }
}

/// Rewrite `alpha` to maintain `#tnt_<name>` (source-named variables start
/// tainted) and `#leak` (initially clear).
pub fn instrument(alpha: &Prog, source_prefix: &str) -> Prog {
    let init = vars_prog(alpha).into_iter().fold(
        Prog::assign(LEAK, Term::Const(0)),
        |acc, v| {
            let initial = i64::from(v.starts_with(source_prefix));
            Prog::seq(acc, Prog::assign(taint_flag(&v), Term::Const(initial)))
        },
    );
    Prog::seq(init, instrument_stmt(alpha, source_prefix))
}

/// `#leak == 0`.
pub fn postcondition() -> Formula {
    Formula::eq(Term::var(LEAK), Term::Const(0))
}

/// Bounded check of the taint / non-interference policy. Variables whose
/// name starts with `source_prefix` are treated as the sensitive sources
/// whose influence on `output` must never be observable.
pub fn symbolic_check(alpha: &Prog, source_prefix: &str, depth: u32, timeout: Duration) -> CheckResult {
    let instrumented = instrument(alpha, source_prefix);
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

    const PREFIX: &str = "sec_";

    #[test]
    fn untainted_output_satisfies() {
        let alpha = parse("x := 1; output x").unwrap();
        assert_eq!(symbolic_check(&alpha, PREFIX, 5, Duration::from_secs(5)), CheckResult::Satisfies);
    }

    #[test]
    fn direct_output_of_a_source_violates() {
        let alpha = parse("sec_a := 7; output sec_a").unwrap();
        assert_eq!(symbolic_check(&alpha, PREFIX, 5, Duration::from_secs(5)), CheckResult::Violates);
    }

    #[test]
    fn derived_value_from_a_source_violates() {
        let alpha = parse("sec_a := 3; b := sec_a + 1; output b").unwrap();
        assert_eq!(symbolic_check(&alpha, PREFIX, 5, Duration::from_secs(5)), CheckResult::Violates);
    }

    #[test]
    fn source_variable_never_output_satisfies() {
        let alpha = parse("sec_a := 3; b := 4; output b").unwrap();
        assert_eq!(symbolic_check(&alpha, PREFIX, 5, Duration::from_secs(5)), CheckResult::Satisfies);
    }
}
