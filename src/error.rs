//! Error types for the translation pipeline

use serde::Serialize;
use thiserror::Error;

use crate::semantic::DataType;

/// The pipeline stage an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Lex,
    Parse,
    Semantic,
    Translate,
}

/// Every failure the pipeline can report. Variants that know a source line
/// spell it as `line <N>` in their display text so surrounding tools can
/// extract it with a plain substring match.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("Indentation error at line {line}: unindent does not match any outer indentation level")]
    Indentation { line: usize },

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Variable '{name}' is not defined at line {line}")]
    UndefinedVariable { name: String, line: usize },

    #[error("Function '{name}' is not defined at line {line}")]
    UndefinedFunction { name: String, line: usize },

    #[error("'{name}' is not a function at line {line}")]
    NotCallable { name: String, line: usize },

    #[error("Type mismatch at line {line}: variable '{name}' is type {expected} but assigned {found}")]
    AssignmentMismatch {
        name: String,
        expected: DataType,
        found: DataType,
        line: usize,
    },

    #[error("Cannot perform arithmetic on strings with '{op}' at line {line}")]
    StringArithmetic { op: &'static str, line: usize },

    #[error("Function '{name}' already defined at line {line}")]
    FunctionRedefinition { name: String, line: usize },

    #[error("Return statement outside of function at line {line}")]
    ReturnOutsideFunction { line: usize },

    #[error("Inconsistent return types in function '{name}' at line {line}: expected {expected}, got {found}")]
    ReturnTypeMismatch {
        name: String,
        expected: DataType,
        found: DataType,
        line: usize,
    },

    #[error("Loop range '{bound}' must be an integer at line {line}")]
    LoopBound { bound: &'static str, line: usize },

    #[error("Internal translation error: {message}")]
    Internal { message: String },
}

impl TranslateError {
    pub fn stage(&self) -> Stage {
        match self {
            TranslateError::Indentation { .. } => Stage::Lex,
            TranslateError::Parse { .. } => Stage::Parse,
            TranslateError::UndefinedVariable { .. }
            | TranslateError::UndefinedFunction { .. }
            | TranslateError::NotCallable { .. }
            | TranslateError::AssignmentMismatch { .. }
            | TranslateError::StringArithmetic { .. }
            | TranslateError::FunctionRedefinition { .. }
            | TranslateError::ReturnOutsideFunction { .. }
            | TranslateError::ReturnTypeMismatch { .. }
            | TranslateError::LoopBound { .. } => Stage::Semantic,
            TranslateError::Internal { .. } => Stage::Translate,
        }
    }

    /// The source line the error points at, when one is known.
    pub fn line(&self) -> Option<usize> {
        match self {
            TranslateError::Indentation { line }
            | TranslateError::Parse { line, .. }
            | TranslateError::UndefinedVariable { line, .. }
            | TranslateError::UndefinedFunction { line, .. }
            | TranslateError::NotCallable { line, .. }
            | TranslateError::AssignmentMismatch { line, .. }
            | TranslateError::StringArithmetic { line, .. }
            | TranslateError::FunctionRedefinition { line, .. }
            | TranslateError::ReturnOutsideFunction { line }
            | TranslateError::ReturnTypeMismatch { line, .. }
            | TranslateError::LoopBound { line, .. } => Some(*line),
            TranslateError::Internal { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TranslateError>;
