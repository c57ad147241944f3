//! Pretty-printer for [`Term`], [`Formula`] and [`Prog`]. Output always
//! round-trips through [`crate::parser::parse`] (modulo `Seq` associativity,
//! which the grammar pins left-associative anyway).

use crate::ast::{Formula, Prog, Term};

/// Render a [`Term`], fully parenthesizing every binary operator so the
/// result is unambiguous regardless of precedence.
pub fn term_stringify(e: &Term) -> String {
    match e {
        Term::Const(v) => v.to_string(),
        Term::Var(name) => name.clone(),
        Term::Sum(l, r) => format!("({})+({})", term_stringify(l), term_stringify(r)),
        Term::Difference(l, r) => format!("({})-({})", term_stringify(l), term_stringify(r)),
        Term::Product(l, r) => format!("({})*({})", term_stringify(l), term_stringify(r)),
    }
}

/// Render a [`Formula`], fully parenthesizing every connective.
pub fn fmla_stringify(p: &Formula) -> String {
    match p {
        Formula::True => "true".to_string(),
        Formula::False => "false".to_string(),
        Formula::Not(q) => format!("!({})", fmla_stringify(q)),
        Formula::And(p, q) => format!("({})&&({})", fmla_stringify(p), fmla_stringify(q)),
        Formula::Or(p, q) => format!("({})||({})", fmla_stringify(p), fmla_stringify(q)),
        Formula::Implies(p, q) => format!("({})->({})", fmla_stringify(p), fmla_stringify(q)),
        Formula::Eq(l, r) => format!("({})==({})", term_stringify(l), term_stringify(r)),
        Formula::Lt(l, r) => format!("({})<({})", term_stringify(l), term_stringify(r)),
    }
}

/// Render a [`Prog`] with a C-like indentation of four spaces per level,
/// starting at `indent`.
pub fn stringify(alpha: &Prog, indent: usize) -> String {
    let pad = " ".repeat(indent);
    match alpha {
        Prog::Skip => format!("{pad}skip"),
        Prog::Abort => format!("{pad}abort"),
        Prog::Assign(name, exp) => format!("{pad}{name} := {}", term_stringify(exp)),
        Prog::Seq(a, b) => format!("{};\n{}", stringify(a, indent), stringify(b, indent)),
        Prog::If(q, a, b) => format!(
            "{pad}if ({}) then\n{}\n{pad}else\n{}\n{pad}endif",
            fmla_stringify(q),
            stringify(a, indent + 4),
            stringify(b, indent + 4)
        ),
        Prog::While(q, a) => format!(
            "{pad}while ({}) do\n{}\n{pad}done",
            fmla_stringify(q),
            stringify(a, indent + 4)
        ),
        Prog::Output(e) => format!("{pad}output {}", term_stringify(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn assert_roundtrip(alpha: &Prog) {
        let printed = stringify(alpha, 0);
        let reparsed = parse(&printed).unwrap_or_else(|e| panic!("reparse {printed:?}: {e}"));
        assert_eq!(&reparsed, alpha, "round-trip mismatch for {printed:?}");
    }

    #[test]
    fn roundtrips_simple_program() {
        let alpha = Prog::seq(
            Prog::assign("x", Term::sum(Term::Const(1), Term::var("y"))),
            Prog::output(Term::var("x")),
        );
        assert_roundtrip(&alpha);
    }

    #[test]
    fn roundtrips_control_flow() {
        let alpha = Prog::seq(
            Prog::if_then_else(
                Formula::lt(Term::var("x"), Term::Const(0)),
                Prog::assign("y", Term::Const(1)),
                Prog::Skip,
            ),
            Prog::while_loop(
                Formula::lt(Term::var("y"), Term::Const(10)),
                Prog::assign("y", Term::sum(Term::var("y"), Term::Const(1))),
            ),
        );
        assert_roundtrip(&alpha);
    }

    #[test]
    fn roundtrips_abort_and_connectives() {
        let alpha = Prog::if_then_else(
            Formula::implies(
                Formula::and(Formula::True, Formula::not(Formula::False)),
                Formula::or(Formula::eq(Term::Const(1), Term::Const(1)), Formula::False),
            ),
            Prog::Abort,
            Prog::Skip,
        );
        assert_roundtrip(&alpha);
    }
}
