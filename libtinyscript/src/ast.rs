//! Sum-type definitions for the TinyScript abstract syntax: arithmetic
//! [`Term`]s, boolean [`Formula`]s and imperative [`Prog`]rams.
//!
//! Nodes are constructed by the parser and never mutated afterwards; passes
//! that "rewrite" a program (see [`crate::policy`]) build a fresh tree rooted
//! at the original rather than mutating in place.

use std::fmt;
use std::rc::Rc;

/// An integer-valued arithmetic expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// A literal integer constant.
    Const(i64),
    /// A reference to a named variable.
    Var(String),
    /// `left + right`.
    Sum(Rc<Term>, Rc<Term>),
    /// `left - right`.
    Difference(Rc<Term>, Rc<Term>),
    /// `left * right`.
    Product(Rc<Term>, Rc<Term>),
}

impl Term {
    /// Build a [`Term::Var`] from anything that converts to a `String`.
    pub fn var(name: impl Into<String>) -> Self {
        Term::Var(name.into())
    }

    /// Build a [`Term::Sum`], boxing both operands.
    pub fn sum(l: Term, r: Term) -> Self {
        Term::Sum(Rc::new(l), Rc::new(r))
    }

    /// Build a [`Term::Difference`], boxing both operands.
    pub fn difference(l: Term, r: Term) -> Self {
        Term::Difference(Rc::new(l), Rc::new(r))
    }

    /// Build a [`Term::Product`], boxing both operands.
    pub fn product(l: Term, r: Term) -> Self {
        Term::Product(Rc::new(l), Rc::new(r))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::printer::term_stringify(self))
    }
}

/// A quantifier-free boolean expression over [`Term`]s.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Formula {
    /// The constant `true`.
    True,
    /// The constant `false`.
    False,
    /// `!q`.
    Not(Rc<Formula>),
    /// `p && q`.
    And(Rc<Formula>, Rc<Formula>),
    /// `p || q`.
    Or(Rc<Formula>, Rc<Formula>),
    /// `p -> q`.
    Implies(Rc<Formula>, Rc<Formula>),
    /// `left == right`.
    Eq(Rc<Term>, Rc<Term>),
    /// `left < right`.
    Lt(Rc<Term>, Rc<Term>),
}

impl Formula {
    /// Build a [`Formula::Not`].
    pub fn not(q: Formula) -> Self {
        Formula::Not(Rc::new(q))
    }

    /// Build a [`Formula::And`].
    pub fn and(p: Formula, q: Formula) -> Self {
        Formula::And(Rc::new(p), Rc::new(q))
    }

    /// Build a [`Formula::Or`].
    pub fn or(p: Formula, q: Formula) -> Self {
        Formula::Or(Rc::new(p), Rc::new(q))
    }

    /// Build a [`Formula::Implies`].
    pub fn implies(p: Formula, q: Formula) -> Self {
        Formula::Implies(Rc::new(p), Rc::new(q))
    }

    /// Build a [`Formula::Eq`].
    pub fn eq(l: Term, r: Term) -> Self {
        Formula::Eq(Rc::new(l), Rc::new(r))
    }

    /// Build a [`Formula::Lt`].
    pub fn lt(l: Term, r: Term) -> Self {
        Formula::Lt(Rc::new(l), Rc::new(r))
    }

    /// `Formula::Eq` chained with `&&` over a non-empty list; `true` if empty.
    pub fn conjoin(fs: impl IntoIterator<Item = Formula>) -> Self {
        fs.into_iter()
            .fold(None, |acc, f| match acc {
                None => Some(f),
                Some(acc) => Some(Formula::and(acc, f)),
            })
            .unwrap_or(Formula::True)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::printer::fmla_stringify(self))
    }
}

/// A TinyScript program. Programs are immutable trees; subtrees may be
/// shared via [`Rc`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Prog {
    /// Does nothing; one elementary step.
    Skip,
    /// `name := exp`; one elementary step.
    Assign(String, Rc<Term>),
    /// `alpha ; beta`, left-associative in concrete syntax.
    Seq(Rc<Prog>, Rc<Prog>),
    /// `if q then alpha else beta endif`.
    If(Rc<Formula>, Rc<Prog>, Rc<Prog>),
    /// `while q do alpha done`.
    While(Rc<Formula>, Rc<Prog>),
    /// `output e`; one elementary step, records into `#stdout`.
    Output(Rc<Term>),
    /// Aborts the program; one elementary step, no terminating trace.
    Abort,
}

impl Prog {
    /// Build a [`Prog::Assign`].
    pub fn assign(name: impl Into<String>, exp: Term) -> Self {
        Prog::Assign(name.into(), Rc::new(exp))
    }

    /// Build a [`Prog::Seq`], left-associating a whole slice of statements.
    pub fn seq(alpha: Prog, beta: Prog) -> Self {
        Prog::Seq(Rc::new(alpha), Rc::new(beta))
    }

    /// Sequence an arbitrary, non-empty list of statements left-associatively.
    pub fn seq_all(stmts: Vec<Prog>) -> Self {
        let mut iter = stmts.into_iter();
        let first = iter.next().unwrap_or(Prog::Skip);
        iter.fold(first, Prog::seq)
    }

    /// Build a [`Prog::If`].
    pub fn if_then_else(q: Formula, alpha: Prog, beta: Prog) -> Self {
        Prog::If(Rc::new(q), Rc::new(alpha), Rc::new(beta))
    }

    /// Build a [`Prog::While`].
    pub fn while_loop(q: Formula, alpha: Prog) -> Self {
        Prog::While(Rc::new(q), Rc::new(alpha))
    }

    /// Build a [`Prog::Output`].
    pub fn output(e: Term) -> Self {
        Prog::Output(Rc::new(e))
    }
}

impl fmt::Display for Prog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::printer::stringify(self, 0))
    }
}

/// An interpreter state: a finite mapping from variable names to integers.
///
/// The distinguished name `#stdout` records the value of the most recent
/// `output` statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    variables: std::collections::BTreeMap<String, i64>,
}

/// Name of the ghost variable tracking the last `output`ed value.
pub const STDOUT: &str = "#stdout";

impl State {
    /// An empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from an iterator of `(name, value)` pairs.
    pub fn from_iter(vars: impl IntoIterator<Item = (String, i64)>) -> Self {
        Self {
            variables: vars.into_iter().collect(),
        }
    }

    /// Look up a variable's value.
    pub fn get(&self, name: &str) -> Option<i64> {
        self.variables.get(name).copied()
    }

    /// Functionally update a state, returning a new state with `name` bound
    /// to `value`. Does not mutate `self`.
    #[must_use]
    pub fn with(&self, name: impl Into<String>, value: i64) -> Self {
        let mut variables = self.variables.clone();
        variables.insert(name.into(), value);
        Self { variables }
    }

    /// Iterate over all bound names and values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Returns whether `name` belongs to the reserved ghost-state namespace.
///
/// Any identifier beginning with `#` is reserved for instrumentation and
/// cannot be introduced by a legal source program; the parser enforces this
/// on source text, but internal passes that synthesize fresh names route
/// through here too.
pub fn is_ghost_name(name: &str) -> bool {
    name.starts_with('#')
}
