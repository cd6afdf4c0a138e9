//! Injected diagnostics collector.
//!
//! Malformed-input tolerance is a first-class design goal: one bad record
//! must not sink the whole document, but every anomaly must leave a trace.
//! Readers receive a `&mut Diagnostics` and append records; nothing in the
//! decoder keeps process-wide mutable state, so tests can assert on emitted
//! diagnostics deterministically. Records are mirrored to the `log` crate
//! for applications that just want them on a console.

use std::fmt;

/// How serious a diagnostic record is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Observational: an unparsed zone, a recognized byte range
    Note,
    /// Malformed input was skipped or truncated
    Warning,
}

/// One diagnostic record: a position in the input and what was seen there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Absolute position in the main stream the record refers to
    pub position: u64,
    /// Severity of the record
    pub severity: Severity,
    /// Human-readable annotation
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Note => "note",
            Severity::Warning => "warning",
        };
        write!(f, "{:#06x}: {}: {}", self.position, tag, self.message)
    }
}

/// Ordered collector of diagnostic records.
#[derive(Debug, Default)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record malformed input that was skipped or truncated.
    pub fn warn(&mut self, position: u64, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{position:#06x}: {message}");
        self.records.push(Diagnostic {
            position,
            severity: Severity::Warning,
            message,
        });
    }

    /// Record an observational annotation.
    pub fn note(&mut self, position: u64, message: impl Into<String>) {
        let message = message.into();
        log::debug!("{position:#06x}: {message}");
        self.records.push(Diagnostic {
            position,
            severity: Severity::Note,
            message,
        });
    }

    /// All records in emission order.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.records.iter()
    }

    /// Number of records collected.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of warning-severity records.
    pub fn warning_count(&self) -> usize {
        self.records
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_keep_order_and_severity() {
        let mut diag = Diagnostics::new();
        diag.note(0x10, "zone 3 seen");
        diag.warn(0x42c, "bad row");
        assert_eq!(diag.len(), 2);
        assert_eq!(diag.warning_count(), 1);
        let rendered = diag.iter().map(|d| d.to_string()).collect::<Vec<_>>();
        assert_eq!(rendered[1], "0x042c: warning: bad row");
    }
}
