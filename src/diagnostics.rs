//! Structured diagnostics for tool consumption
//!
//! Wraps a pipeline error in a record with a stable code, a span, and the
//! stage it came from, renderable as plain text or JSON. The human-readable
//! message is the error's own display text, so the `line <N>` substring
//! survives into both renderings.

use serde::Serialize;
use std::path::Path;

use crate::error::TranslateError;

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticSpan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    pub severity: DiagnosticSeverity,
    pub span: DiagnosticSpan,
    pub stage: crate::error::Stage,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct Diagnostics {
    pub diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn add(&mut self, diag: Diagnostic) {
        self.diagnostics.push(diag);
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for diag in &self.diagnostics {
            let file = diag.span.file.as_deref().unwrap_or("<input>");
            out.push_str(&format!(
                "[{}] {}:{} {}\n",
                diag.code, file, diag.span.line, diag.message
            ));
        }
        out
    }
}

fn code_for(err: &TranslateError) -> &'static str {
    match err {
        TranslateError::Indentation { .. } => "P2C-INDENT-ERROR",
        TranslateError::Parse { .. } => "P2C-PARSE-ERROR",
        TranslateError::UndefinedVariable { .. } => "P2C-UNDEFINED-VARIABLE",
        TranslateError::UndefinedFunction { .. } => "P2C-UNDEFINED-FUNCTION",
        TranslateError::NotCallable { .. } => "P2C-NOT-CALLABLE",
        TranslateError::AssignmentMismatch { .. } => "P2C-TYPE-MISMATCH",
        TranslateError::StringArithmetic { .. } => "P2C-STRING-ARITHMETIC",
        TranslateError::FunctionRedefinition { .. } => "P2C-FUNCTION-REDEFINED",
        TranslateError::ReturnOutsideFunction { .. } => "P2C-RETURN-OUTSIDE-FUNCTION",
        TranslateError::ReturnTypeMismatch { .. } => "P2C-RETURN-TYPE-MISMATCH",
        TranslateError::LoopBound { .. } => "P2C-LOOP-BOUND",
        TranslateError::Internal { .. } => "P2C-INTERNAL-ERROR",
    }
}

/// Build the diagnostics bundle for a failed run.
pub fn from_error(err: &TranslateError, file: Option<&Path>) -> Diagnostics {
    let mut diags = Diagnostics::new();
    diags.add(Diagnostic {
        code: code_for(err).to_string(),
        message: err.to_string(),
        severity: DiagnosticSeverity::Error,
        span: DiagnosticSpan {
            file: file.map(|p| p.display().to_string()),
            line: err.line().unwrap_or(1),
            column: 1,
        },
        stage: err.stage(),
    });
    diags
}
