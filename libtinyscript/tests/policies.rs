//! End-to-end scenarios: one program checked against all three policies at
//! once, at the defaults (`depth = 5`, `step_bound = 100`, `timeout = 10s`,
//! `source_prefix = "sec_"`).

use std::time::Duration;

use libtinyscript::parser::parse;
use libtinyscript::policy::{defuse, runtime, taint};
use libtinyscript::CheckResult;

const DEPTH: u32 = 5;
const STEP_BOUND: u64 = 100;
const PREFIX: &str = "sec_";

fn timeout() -> Duration {
    Duration::from_secs(10)
}

fn check_all(src: &str) -> (CheckResult, CheckResult, CheckResult) {
    let alpha = parse(src).unwrap_or_else(|e| panic!("parse {src:?}: {e}"));
    (
        runtime::symbolic_check(&alpha, STEP_BOUND, DEPTH, timeout()),
        defuse::symbolic_check(&alpha, DEPTH, timeout()),
        taint::symbolic_check(&alpha, PREFIX, DEPTH, timeout()),
    )
}

#[test]
fn scenario_1_skip() {
    assert_eq!(
        check_all("skip"),
        (CheckResult::Satisfies, CheckResult::Satisfies, CheckResult::Satisfies)
    );
}

#[test]
fn scenario_2_assign_then_output() {
    assert_eq!(
        check_all("x := 1; output x"),
        (CheckResult::Satisfies, CheckResult::Satisfies, CheckResult::Satisfies)
    );
}

#[test]
fn scenario_3_output_of_never_assigned_variable() {
    assert_eq!(
        check_all("output y"),
        (CheckResult::Satisfies, CheckResult::Violates, CheckResult::Satisfies)
    );
}

#[test]
fn scenario_4_direct_output_of_a_source() {
    assert_eq!(
        check_all("sec_a := 7; output sec_a"),
        (CheckResult::Satisfies, CheckResult::Satisfies, CheckResult::Violates)
    );
}

#[test]
fn scenario_5_derived_value_from_a_source() {
    assert_eq!(
        check_all("sec_a := 3; b := sec_a + 1; output b"),
        (CheckResult::Satisfies, CheckResult::Satisfies, CheckResult::Violates)
    );
}

#[test]
fn scenario_6_infinite_loop() {
    assert_eq!(
        check_all("while (true) do skip done"),
        (CheckResult::Violates, CheckResult::Satisfies, CheckResult::Satisfies)
    );
}

#[test]
fn scenario_7_loop_exceeding_the_step_bound_but_not_the_unroll_depth() {
    assert_eq!(
        check_all("i := 0; while (i < 200) do i := i + 1 done"),
        (CheckResult::Violates, CheckResult::Satisfies, CheckResult::Satisfies)
    );
}

#[test]
fn scenario_8_definition_on_only_one_branch() {
    assert_eq!(
        check_all("if (x < 0) then y := 1 else skip endif; output y"),
        (CheckResult::Satisfies, CheckResult::Violates, CheckResult::Satisfies)
    );
}
