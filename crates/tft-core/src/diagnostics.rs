//! Readiness diagnostics for operator-entered test data.
//!
//! Form input arrives one field at a time, so the boundary layer needs to
//! explain *why* a calculation cannot run yet. Issues come in two severities:
//!
//! - **Warning**: a field is still empty; the calculation is simply not ready.
//! - **Error**: a field holds a value outside its documented range.
//!
//! # Example
//!
//! ```
//! use tft_core::diagnostics::{Diagnostics, Severity};
//!
//! let mut diag = Diagnostics::new();
//! diag.add_missing("test_voltage_v");
//! diag.add_out_of_range("impedance_percent", "must be in (0, 100], got 120");
//!
//! assert_eq!(diag.warning_count(), 1);
//! assert_eq!(diag.error_count(), 1);
//! assert!(!diag.is_ready());
//! ```

use serde::Serialize;

/// Severity level for diagnostic issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Field not filled in yet
    Warning,
    /// Field filled in with an unusable value
    Error,
}

/// A single issue with one input field
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    /// Category for grouping ("missing", "range")
    pub category: String,
    /// Name of the input field the issue refers to
    pub field: &'static str,
    /// Human-readable description of the issue
    pub message: String,
}

impl DiagnosticIssue {
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category: category.into(),
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(
            f,
            "[{}:{}] {} ({})",
            severity, self.category, self.message, self.field
        )
    }
}

/// Collection of issues found while checking a draft input
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a field that has not been filled in
    pub fn add_missing(&mut self, field: &'static str) {
        self.issues.push(DiagnosticIssue::new(
            Severity::Warning,
            "missing",
            field,
            "value required",
        ));
    }

    /// Record a field whose value is outside its documented range
    pub fn add_out_of_range(&mut self, field: &'static str, message: &str) {
        self.issues.push(DiagnosticIssue::new(
            Severity::Error,
            "range",
            field,
            message,
        ));
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// No missing fields and no out-of-range values
    pub fn is_ready(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn errors(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    /// Names of the fields still waiting for a value
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.warnings().map(|i| i.field).collect()
    }

    pub fn summary(&self) -> String {
        let plural = |n: usize| if n == 1 { "" } else { "s" };
        match (self.warning_count(), self.error_count()) {
            (0, 0) => "Ready".to_string(),
            (w, 0) => format!("{} missing field{}", w, plural(w)),
            (0, e) => format!("{} invalid field{}", e, plural(e)),
            (w, e) => format!(
                "{} missing field{}, {} invalid field{}",
                w,
                plural(w),
                e,
                plural(e)
            ),
        }
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Diagnostics: {}", self.summary())?;
        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_ready() {
        let diag = Diagnostics::new();
        assert!(diag.is_ready());
        assert_eq!(diag.summary(), "Ready");
    }

    #[test]
    fn test_missing_fields_listed_in_order() {
        let mut diag = Diagnostics::new();
        diag.add_missing("impedance_percent");
        diag.add_missing("hv_rated_kv");
        assert_eq!(diag.missing_fields(), vec!["impedance_percent", "hv_rated_kv"]);
        assert_eq!(diag.error_count(), 0);
        assert_eq!(diag.summary(), "2 missing fields");
    }

    #[test]
    fn test_mixed_summary() {
        let mut diag = Diagnostics::new();
        diag.add_missing("tested_side");
        diag.add_out_of_range("rated_power_mva", "must be in (0, 1000]");
        assert_eq!(diag.summary(), "1 missing field, 1 invalid field");
    }

    #[test]
    fn test_issue_display() {
        let issue = DiagnosticIssue::new(Severity::Error, "range", "test_voltage_v", "too high");
        assert_eq!(issue.to_string(), "[error:range] too high (test_voltage_v)");
    }

    #[test]
    fn test_serialization_uses_lowercase_severity() {
        let mut diag = Diagnostics::new();
        diag.add_missing("lv_rated_kv");
        let json = serde_json::to_string(&diag).unwrap();
        assert!(json.contains("\"severity\":\"warning\""));
        assert!(json.contains("lv_rated_kv"));
    }
}
