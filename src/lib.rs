//! py2cpp - source-to-source translator
//!
//! # Overview
//! Translates a small indentation-structured, Python-like scripting language
//! into statically typed C++. The pipeline is four stages run in order:
//! an indentation-sensitive lexer, a recursive-descent parser, a
//! type-inferring semantic analyzer, and a tree-walking C++ emitter. Types
//! are never written in the source; the analyzer infers one `DataType` per
//! expression and the emitter uses them to choose declaration forms.
//!
//! A note on precedence: `and` and `or` are parsed at the same level,
//! left to right, which differs from full Python.

pub mod diagnostics;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod semantic;
pub mod translator;

pub use error::{Result, Stage, TranslateError};

use lexer::Token;
use parser::{ParserState, Program};
use semantic::SymbolTable;

/// Everything a successful run produces. The intermediate products are kept
/// so callers can display them alongside the emitted code.
#[derive(Debug)]
pub struct Translation {
    pub tokens: Vec<Token>,
    pub ast: Program,
    pub symbols: SymbolTable,
    pub target_code: String,
}

/// Run the whole pipeline on one source text.
///
/// The stages run in strict order and the first failure aborts the run;
/// repeating the call on the same input yields identical output.
pub fn translate(source: &str) -> Result<Translation> {
    let tokens = lexer::tokenize(source)?;
    let mut ast = parser::parse(tokens.clone())?;
    let symbols = semantic::analyze(&mut ast)?;
    let target_code = translator::translate(&ast, &symbols);
    Ok(Translation {
        tokens,
        ast,
        symbols,
        target_code,
    })
}

/// Observation hook: the sequence of parser states entered while parsing
/// `source`, each paired with the token in view at that moment. The trace
/// is returned even when the parse itself fails; only a lexer failure
/// prevents one.
pub fn parse_trace(source: &str) -> Result<Vec<(ParserState, Token)>> {
    let tokens = lexer::tokenize(source)?;
    let (_, trace) = parser::parse_with_trace(tokens);
    Ok(trace.states)
}
