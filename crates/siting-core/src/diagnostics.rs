//! Diagnostics collected while sanitizing and indexing simulation data.
//!
//! Rows with unusable values are dropped rather than propagated into the cost
//! math. Each drop is recorded here as a warning so front-ends can report how
//! much of a dataset was discarded and why.
//!
//! ```
//! use siting_core::diagnostics::{DiagnosticIssue, Diagnostics};
//!
//! let mut diag = Diagnostics::new();
//! diag.add(DiagnosticIssue::warning("row", "non-finite latitude").with_entity("location 17"));
//! assert_eq!(diag.warning_count(), 1);
//! assert_eq!(diag.summary(), "1 warning");
//! ```

use serde::Serialize;

/// A single dropped-data warning
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticIssue {
    /// Category for grouping (e.g., "row")
    pub category: String,
    pub message: String,
    /// Optional input line / row number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Optional entity reference (e.g., "location 17")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl DiagnosticIssue {
    pub fn warning(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            message: message.into(),
            line: None,
            entity: None,
        }
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

impl std::fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[warning:{}] {}", self.category, self.message)?;

        if let Some(entity) = &self.entity {
            write!(f, " ({})", entity)?;
        }
        if let Some(line) = self.line {
            write!(f, " at row {}", line)?;
        }

        Ok(())
    }
}

/// Collection of diagnostic issues for one operation
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: DiagnosticIssue) {
        self.issues.push(issue);
    }

    pub fn warning_count(&self) -> usize {
        self.issues.len()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn summary(&self) -> String {
        match self.warning_count() {
            0 => "No issues".to_string(),
            1 => "1 warning".to_string(),
            n => format!("{n} warnings"),
        }
    }
}
