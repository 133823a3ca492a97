//! # Diagnostic Reporting
//!
//! A [`Reporter`] is the sink the field orchestrator notifies whenever a
//! pair fails validation. Reporting never changes which pairs are accepted:
//! if a sink fails, the orchestrator logs the failure and carries on.
//!
//! Stock sinks:
//!
//! - [`TracingReporter`] — one `tracing` warning per event.
//! - [`CollectingReporter`] — keeps owned copies for later draining.
//! - [`JsonLinesReporter`] — writes one JSON object per line to any writer.
//!
//! Any `FnMut(&Diagnostic<'_>) -> Result<(), ReportError>` closure is also a
//! reporter; wrap it in [`report_fn`] to pin the closure signature.

use std::io::Write;

use kvs_core::Value;
use serde::Serialize;
use thiserror::Error;

use crate::error::Violation;
use crate::field::{Diagnostic, Rejected};

/// Failure of the sink itself.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to write diagnostic: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode diagnostic: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("diagnostic sink unavailable: {0}")]
    Unavailable(String),
}

/// Sink for validation diagnostics.
pub trait Reporter {
    fn report(&mut self, diagnostic: &Diagnostic<'_>) -> Result<(), ReportError>;
}

impl<F> Reporter for F
where
    F: FnMut(&Diagnostic<'_>) -> Result<(), ReportError>,
{
    fn report(&mut self, diagnostic: &Diagnostic<'_>) -> Result<(), ReportError> {
        self(diagnostic)
    }
}

/// Identity helper that gives a closure the reporter signature.
pub fn report_fn<F>(f: F) -> F
where
    F: FnMut(&Diagnostic<'_>) -> Result<(), ReportError>,
{
    f
}

/// Logs each diagnostic as a `tracing` warning.
#[derive(Debug, Default)]
pub struct TracingReporter {
    reported: usize,
}

impl TracingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of diagnostics logged so far.
    pub fn reported(&self) -> usize {
        self.reported
    }
}

impl Reporter for TracingReporter {
    fn report(&mut self, diagnostic: &Diagnostic<'_>) -> Result<(), ReportError> {
        self.reported += 1;
        tracing::warn!(
            key = diagnostic.key,
            value = %diagnostic.value,
            error = %diagnostic.error,
            "failed to validate key"
        );
        Ok(())
    }
}

/// Retains every diagnostic it receives.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    events: Vec<Rejected>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Rejected] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take every event collected so far, leaving the reporter empty.
    pub fn drain(&mut self) -> Vec<Rejected> {
        std::mem::take(&mut self.events)
    }
}

impl Reporter for CollectingReporter {
    fn report(&mut self, diagnostic: &Diagnostic<'_>) -> Result<(), ReportError> {
        self.events.push(diagnostic.to_owned_event());
        Ok(())
    }
}

#[derive(Serialize)]
struct DiagnosticLine<'a> {
    key: &'a str,
    value: &'a Value,
    error: String,
    violations: Vec<Violation>,
}

/// Writes each diagnostic as one JSON object per line.
#[derive(Debug)]
pub struct JsonLinesReporter<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesReporter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Reporter for JsonLinesReporter<W> {
    fn report(&mut self, diagnostic: &Diagnostic<'_>) -> Result<(), ReportError> {
        let line = DiagnosticLine {
            key: diagnostic.key,
            value: diagnostic.value,
            error: diagnostic.error.to_string(),
            violations: diagnostic.error.violations().into_inner(),
        };
        serde_json::to_writer(&mut self.writer, &line)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}
