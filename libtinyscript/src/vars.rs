//! Variable collectors: syntactic passes over [`Term`], [`Formula`] and
//! [`Prog`] that gather the set of variable names mentioned, in
//! first-occurrence order and without duplicates.
//!
//! The Python original implements `@unique` as a decorator that dedupes
//! while preserving order; here it's a plain helper, [`dedupe`], applied
//! once at the end of each collector rather than threaded through every
//! recursive call.

use crate::ast::{Formula, Prog, Term};

/// Remove duplicates from `items`, keeping the first occurrence of each and
/// preserving relative order.
pub fn dedupe(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

fn collect_term(e: &Term, out: &mut Vec<String>) {
    match e {
        Term::Const(_) => {}
        Term::Var(name) => out.push(name.clone()),
        Term::Sum(l, r) | Term::Difference(l, r) | Term::Product(l, r) => {
            collect_term(l, out);
            collect_term(r, out);
        }
    }
}

/// Collect the variables appearing in a term, deduplicated in first-seen order.
pub fn vars_term(e: &Term) -> Vec<String> {
    let mut out = Vec::new();
    collect_term(e, &mut out);
    dedupe(out)
}

fn collect_formula(p: &Formula, out: &mut Vec<String>) {
    match p {
        Formula::True | Formula::False => {}
        Formula::Not(q) => collect_formula(q, out),
        Formula::And(p, q) | Formula::Or(p, q) | Formula::Implies(p, q) => {
            collect_formula(p, out);
            collect_formula(q, out);
        }
        Formula::Eq(l, r) | Formula::Lt(l, r) => {
            collect_term(l, out);
            collect_term(r, out);
        }
    }
}

/// Collect the variables appearing in a formula, deduplicated in first-seen order.
pub fn vars_formula(p: &Formula) -> Vec<String> {
    let mut out = Vec::new();
    collect_formula(p, &mut out);
    dedupe(out)
}

fn collect_prog(alpha: &Prog, out: &mut Vec<String>) {
    match alpha {
        Prog::Skip | Prog::Abort => {}
        Prog::Assign(name, exp) => {
            out.push(name.clone());
            collect_term(exp, out);
        }
        Prog::Seq(a, b) => {
            collect_prog(a, out);
            collect_prog(b, out);
        }
        Prog::If(q, a, b) => {
            collect_formula(q, out);
            collect_prog(a, out);
            collect_prog(b, out);
        }
        Prog::While(q, a) => {
            collect_formula(q, out);
            collect_prog(a, out);
        }
        Prog::Output(e) => collect_term(e, out),
    }
}

/// Collect every variable name appearing in a program, deduplicated in
/// first-seen order. Includes both assignment targets and read sites.
pub fn vars_prog(alpha: &Prog) -> Vec<String> {
    let mut out = Vec::new();
    collect_prog(alpha, &mut out);
    dedupe(out)
}
