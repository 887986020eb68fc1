//! Parse-state trace - observational side channel
//!
//! The parser keeps a coarse notion of "where in the grammar it is" and logs
//! every state change together with the token in view at that moment. The
//! log exists for callers that want to visualize a parse; no parse decision
//! ever consults it.

use crate::lexer::{Token, TokenKind};

/// Coarse parser position, one entry per grammar region of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserState {
    Start,
    ExpectStatement,
    InFunctionDef,
    InFunctionParams,
    InFunctionBody,
    InIfCondition,
    InIfBody,
    InAssignment,
    InExpression,
    InTerm,
    InFactor,
    InFunctionCall,
    InTryBlock,
    InExceptBlock,
    ExpectOperand,
    ExpectOperator,
    EndStatement,
}

/// Append-only log of parser state changes.
///
/// `states` pairs each state entered with the token in view at entry.
/// `transitions` records the edges `(from, to, token kind)` for callers that
/// render the parse as an automaton.
#[derive(Debug, Clone, Default)]
pub struct ParseTrace {
    pub states: Vec<(ParserState, Token)>,
    pub transitions: Vec<(ParserState, ParserState, TokenKind)>,
}

impl ParseTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, from: ParserState, to: ParserState, token: &Token) {
        self.states.push((to, token.clone()));
        self.transitions.push((from, to, token.kind));
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }
}
