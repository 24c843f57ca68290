//! Error and warning reporting.
//!
//! Stages report user-facing problems as [`Diagnostic`]s through a shared
//! [`Handler`]; nothing in the library crates prints or exits. The driver
//! renders collected diagnostics with [`render_diagnostic`] and maps them
//! to a non-zero exit code. The rendered shape is
//!
//! ```text
//! path:line:col: syntax error: got '}' but expected 'identifier'
//! fn }(): u32 {
//!    ^
//! ```

use std::cell::RefCell;
use std::fmt;

use crate::span::{SourceFile, Span};

/// Diagnostic severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
        }
    }
}

/// A single reported problem.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub level: Level,
    /// Category prefix shown after the location, e.g. `syntax error`.
    pub category: &'static str,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn error(category: &'static str, message: impl Into<String>, span: Span) -> Self {
        Self {
            level: Level::Error,
            category,
            message: message.into(),
            span,
        }
    }
}

/// Collects diagnostics across the pipeline.
///
/// Shared by plain reference; interior mutability keeps the lexer, parser
/// and resolver free to hold it alongside mutable state of their own.
#[derive(Default)]
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    /// Report a parse-stage error.
    pub fn syntax_error(&self, message: impl Into<String>, span: Span) {
        self.emit(Diagnostic::error("syntax error", message, span));
    }

    /// Report a resolve-stage error.
    pub fn semantic_error(&self, message: impl Into<String>, span: Span) {
        self.emit(Diagnostic::error("semantic error", message, span));
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.level == Level::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Error)
            .count()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }
}

/// Render one diagnostic against its source file: the location header,
/// the offending line, and a caret under the offending column.
pub fn render_diagnostic(file: &SourceFile, diagnostic: &Diagnostic) -> String {
    let span = diagnostic.span;
    let line = file.line_of(span.start);
    let caret_col = span.column.max(1) as usize;
    format!(
        "{}:{}:{}: {}: {}\n{}\n{:>width$}\n",
        file.name,
        span.line,
        span.column,
        diagnostic.category,
        diagnostic.message,
        line,
        "^",
        width = caret_col,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_collects_and_counts() {
        let handler = Handler::new();
        assert!(!handler.has_errors());

        handler.syntax_error("got '1' but expected 'fn'", Span::new(0, 1, 1, 1));
        assert!(handler.has_errors());
        assert_eq!(handler.error_count(), 1);
        assert_eq!(handler.diagnostics().len(), 1);
    }

    #[test]
    fn render_places_caret_under_column() {
        let file = SourceFile::new("main.ol", "fn main(): u32 {\nreturn }\n}\n");
        // The `}` after `return` sits at line 2, column 8.
        let diag = Diagnostic::error(
            "syntax error",
            "got '}' but expected 'number'",
            Span::new(24, 25, 2, 8),
        );
        let rendered = render_diagnostic(&file, &diag);
        let mut lines = rendered.lines();
        assert_eq!(
            lines.next(),
            Some("main.ol:2:8: syntax error: got '}' but expected 'number'")
        );
        assert_eq!(lines.next(), Some("return }"));
        assert_eq!(lines.next(), Some("       ^"));
    }

    #[test]
    fn semantic_category() {
        let handler = Handler::new();
        handler.semantic_error("undefined name 'x'", Span::DUMMY);
        let diags = handler.diagnostics();
        assert_eq!(diags[0].category, "semantic error");
        assert_eq!(diags[0].level, Level::Error);
    }
}
