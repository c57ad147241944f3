//! Safety policies: each submodule rewrites a program to thread ghost state
//! through it, states the postcondition the ghost state must satisfy, and
//! wires both into a bounded symbolic check against the reference solver.
//!
//! All ghost identifiers live in the `#`-prefixed namespace (see
//! [`crate::ast::is_ghost_name`]); the parser rejects `#`-prefixed names in
//! source text, so instrumentation can never collide with a program's own
//! variables.

pub mod defuse;
pub mod runtime;
pub mod taint;
