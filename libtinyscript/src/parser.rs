//! Recursive-descent parser for the TinyScript surface syntax described in
//! the grammar below (precedence low to high: `;`, `->`, `||`, `&&`, `!`,
//! comparisons, `+`/`-`, `*`; all binary operators left-associative except
//! comparisons, which are non-associative):
//!
//! ```text
//! term   ::= int | ident | term '+' term | term '-' term | term '*' term | '(' term ')'
//! formula::= 'true' | 'false' | '!' formula | formula '&&' formula
//!          | formula '||' formula | formula '->' formula
//!          | term '==' term | term '<' term | '(' formula ')'
//! prog   ::= 'skip' | 'abort' | ident ':=' term
//!          | 'output' term
//!          | 'if' '(' formula ')' 'then' prog 'else' prog 'endif'
//!          | 'while' '(' formula ')' 'do' prog 'done'
//!          | prog ';' prog
//! ```

use crate::ast::{is_ghost_name, Formula, Prog, Term};
use crate::error::Error;
use crate::lexer::{lex, Spanned, Token};
use crate::vars::vars_prog;

/// Parse a standalone [`Term`].
pub fn term_parse(src: &str) -> Result<Term, Error> {
    let toks = lex(src).map_err(|(o, m)| Error::Parse { offset: o, message: m })?;
    let mut p = Parser::new(&toks, src.len());
    let t = p.term()?;
    p.expect_eof()?;
    Ok(t)
}

/// Parse a standalone [`Formula`].
pub fn fmla_parse(src: &str) -> Result<Formula, Error> {
    let toks = lex(src).map_err(|(o, m)| Error::Parse { offset: o, message: m })?;
    let mut p = Parser::new(&toks, src.len());
    let f = p.formula()?;
    p.expect_eof()?;
    Ok(f)
}

/// Parse a whole [`Prog`].
pub fn parse(src: &str) -> Result<Prog, Error> {
    let toks = lex(src).map_err(|(o, m)| Error::Parse { offset: o, message: m })?;
    let mut p = Parser::new(&toks, src.len());
    let prog = p.program()?;
    p.expect_eof()?;
    Ok(prog)
}

/// Parse a whole [`Prog`] from source text submitted by a user, rejecting
/// any use of the reserved `#`-prefixed ghost namespace.
///
/// [`parse`] itself accepts `#` identifiers, since instrumentation passes
/// build programs that contain them and reuse this parser in their own
/// tests; this wrapper is the boundary that source files actually cross.
pub fn parse_source(src: &str) -> Result<Prog, Error> {
    let prog = parse(src)?;
    if let Some(name) = vars_prog(&prog).into_iter().find(|v| is_ghost_name(v)) {
        return Err(Error::ReservedIdentifier(name));
    }
    Ok(prog)
}

struct Parser<'a> {
    toks: &'a [Spanned<Token>],
    pos: usize,
    eof_offset: usize,
}

impl<'a> Parser<'a> {
    fn new(toks: &'a [Spanned<Token>], eof_offset: usize) -> Self {
        Self {
            toks,
            pos: 0,
            eof_offset,
        }
    }

    fn offset(&self) -> usize {
        self.toks
            .get(self.pos)
            .map(|t| t.offset)
            .unwrap_or(self.eof_offset)
    }

    fn peek(&self) -> Option<&Token> {
        self.toks.get(self.pos).map(|t| &t.value)
    }

    fn bump(&mut self) -> Option<&Token> {
        let t = self.toks.get(self.pos).map(|t| &t.value);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn err(&self, message: impl Into<String>) -> Error {
        Error::Parse {
            offset: self.offset(),
            message: message.into(),
        }
    }

    fn expect_eof(&self) -> Result<(), Error> {
        if self.pos != self.toks.len() {
            return Err(self.err(format!(
                "unexpected trailing token {}",
                self.toks[self.pos].value
            )));
        }
        Ok(())
    }

    fn eat(&mut self, tok: &Token) -> bool {
        if self.peek() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: &Token) -> Result<(), Error> {
        if self.eat(tok) {
            Ok(())
        } else {
            let found = self
                .peek()
                .map(|t| t.to_string())
                .unwrap_or_else(|| "end of input".to_string());
            Err(self.err(format!("expected {tok}, found {found}")))
        }
    }

    fn ident(&mut self) -> Result<String, Error> {
        match self.bump() {
            Some(Token::Ident(s)) => Ok(s.clone()),
            other => {
                let found = other
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "end of input".to_string());
                Err(self.err(format!("expected identifier, found {found}")))
            }
        }
    }

    // --- terms: `*` binds tighter than `+`/`-`, both left-associative ---

    fn term(&mut self) -> Result<Term, Error> {
        let mut lhs = self.term_product()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    let rhs = self.term_product()?;
                    lhs = Term::sum(lhs, rhs);
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    let rhs = self.term_product()?;
                    lhs = Term::difference(lhs, rhs);
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn term_product(&mut self) -> Result<Term, Error> {
        let mut lhs = self.term_atom()?;
        while self.eat(&Token::Star) {
            let rhs = self.term_atom()?;
            lhs = Term::product(lhs, rhs);
        }
        Ok(lhs)
    }

    fn term_atom(&mut self) -> Result<Term, Error> {
        match self.peek().cloned() {
            Some(Token::Int(n)) => {
                self.pos += 1;
                Ok(Term::Const(n))
            }
            Some(Token::Minus) => {
                // Unary negation, as sugar for `0 - atom`.
                self.pos += 1;
                let inner = self.term_atom()?;
                Ok(match inner {
                    Term::Const(n) => Term::Const(-n),
                    other => Term::difference(Term::Const(0), other),
                })
            }
            Some(Token::Ident(name)) => {
                self.pos += 1;
                Ok(Term::var(name))
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let t = self.term()?;
                self.expect(&Token::RParen)?;
                Ok(t)
            }
            _ => {
                let found = self
                    .peek()
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "end of input".to_string());
                Err(self.err(format!("expected a term, found {found}")))
            }
        }
    }

    // --- formulas: `;`-free fragment, precedence '->' < '||' < '&&' < '!' < comparisons ---

    fn formula(&mut self) -> Result<Formula, Error> {
        let mut lhs = self.formula_or()?;
        while self.eat(&Token::Arrow) {
            let rhs = self.formula_or()?;
            lhs = Formula::implies(lhs, rhs);
        }
        Ok(lhs)
    }

    fn formula_or(&mut self) -> Result<Formula, Error> {
        let mut lhs = self.formula_and()?;
        while self.eat(&Token::OrOr) {
            let rhs = self.formula_and()?;
            lhs = Formula::or(lhs, rhs);
        }
        Ok(lhs)
    }

    fn formula_and(&mut self) -> Result<Formula, Error> {
        let mut lhs = self.formula_not()?;
        while self.eat(&Token::AndAnd) {
            let rhs = self.formula_not()?;
            lhs = Formula::and(lhs, rhs);
        }
        Ok(lhs)
    }

    fn formula_not(&mut self) -> Result<Formula, Error> {
        if self.eat(&Token::Bang) {
            Ok(Formula::not(self.formula_not()?))
        } else {
            self.formula_atom()
        }
    }

    fn formula_atom(&mut self) -> Result<Formula, Error> {
        match self.peek() {
            Some(Token::KwTrue) => {
                self.pos += 1;
                Ok(Formula::True)
            }
            Some(Token::KwFalse) => {
                self.pos += 1;
                Ok(Formula::False)
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let f = self.formula()?;
                self.expect(&Token::RParen)?;
                Ok(f)
            }
            _ => {
                // Comparisons are non-associative: parse one term, one
                // comparison operator, one term, and stop.
                let l = self.term()?;
                match self.bump().cloned() {
                    Some(Token::EqEq) => Ok(Formula::eq(l, self.term()?)),
                    Some(Token::Lt) => Ok(Formula::lt(l, self.term()?)),
                    other => {
                        let found = other
                            .map(|t| t.to_string())
                            .unwrap_or_else(|| "end of input".to_string());
                        Err(self.err(format!("expected '==' or '<', found {found}")))
                    }
                }
            }
        }
    }

    // --- programs: `;` is left-associative and lowest precedence ---

    fn program(&mut self) -> Result<Prog, Error> {
        let mut lhs = self.statement()?;
        while self.eat(&Token::Semi) {
            let rhs = self.statement()?;
            lhs = Prog::seq(lhs, rhs);
        }
        Ok(lhs)
    }

    fn statement(&mut self) -> Result<Prog, Error> {
        match self.peek() {
            Some(Token::KwSkip) => {
                self.pos += 1;
                Ok(Prog::Skip)
            }
            Some(Token::KwAbort) => {
                self.pos += 1;
                Ok(Prog::Abort)
            }
            Some(Token::KwOutput) => {
                self.pos += 1;
                Ok(Prog::output(self.term()?))
            }
            Some(Token::KwIf) => {
                self.pos += 1;
                self.expect(&Token::LParen)?;
                let q = self.formula()?;
                self.expect(&Token::RParen)?;
                self.expect(&Token::KwThen)?;
                let alpha = self.program()?;
                self.expect(&Token::KwElse)?;
                let beta = self.program()?;
                self.expect(&Token::KwEndif)?;
                Ok(Prog::if_then_else(q, alpha, beta))
            }
            Some(Token::KwWhile) => {
                self.pos += 1;
                self.expect(&Token::LParen)?;
                let q = self.formula()?;
                self.expect(&Token::RParen)?;
                self.expect(&Token::KwDo)?;
                let alpha = self.program()?;
                self.expect(&Token::KwDone)?;
                Ok(Prog::while_loop(q, alpha))
            }
            Some(Token::Ident(_)) => {
                let name = self.ident()?;
                self.expect(&Token::Assign)?;
                let e = self.term()?;
                Ok(Prog::assign(name, e))
            }
            _ => {
                let found = self
                    .peek()
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "end of input".to_string());
                Err(self.err(format!("expected a statement, found {found}")))
            }
        }
    }
}
