//! Non-fatal composition warnings.
//!
//! Authoring mistakes that still produce valid output (pulling a section twice,
//! leaving sections or the body unconsumed) are reported here instead of
//! failing the render pass.

use std::{fmt, sync::Mutex};

use metrics::counter;
use tracing::warn;

use crate::util::lock::mutex_lock;

pub(crate) const METRIC_COMPOSE_DIAGNOSTICS: &str = "trellis_compose_diagnostics_total";

const SOURCE: &str = "application::compose::diagnostics";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    SectionAlreadyRendered {
        template_path: String,
        name: String,
    },
    SectionsNotRendered {
        template_path: String,
        names: Vec<String>,
    },
    BodyNotRendered {
        template_path: String,
    },
}

impl Diagnostic {
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::SectionAlreadyRendered { .. } => "section_already_rendered",
            Diagnostic::SectionsNotRendered { .. } => "sections_not_rendered",
            Diagnostic::BodyNotRendered { .. } => "body_not_rendered",
        }
    }

    pub fn template_path(&self) -> &str {
        match self {
            Diagnostic::SectionAlreadyRendered { template_path, .. }
            | Diagnostic::SectionsNotRendered { template_path, .. }
            | Diagnostic::BodyNotRendered { template_path } => template_path,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::SectionAlreadyRendered { name, .. } => {
                write!(f, "section already rendered: {name}")
            }
            Diagnostic::SectionsNotRendered { names, .. } => {
                write!(f, "section(s) not rendered: {}", names.join(", "))
            }
            Diagnostic::BodyNotRendered { .. } => f.write_str("body not rendered"),
        }
    }
}

/// Receives composition warnings. Must never fail the render pass.
pub trait DiagnosticSink: Send + Sync {
    fn warn(&self, diagnostic: Diagnostic);
}

/// Default sink: structured `tracing` warning plus a per-kind counter.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn warn(&self, diagnostic: Diagnostic) {
        let kind = diagnostic.kind();
        counter!(METRIC_COMPOSE_DIAGNOSTICS, "kind" => kind).increment(1);
        warn!(
            target: "trellis::compose",
            kind,
            template_path = diagnostic.template_path(),
            detail = ?diagnostic,
            "{diagnostic}"
        );
    }
}

/// Keeps every diagnostic in memory, in emission order.
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    entries: Mutex<Vec<Diagnostic>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Diagnostic> {
        mutex_lock(&self.entries, SOURCE, "snapshot").clone()
    }

    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *mutex_lock(&self.entries, SOURCE, "take"))
    }

    pub fn is_empty(&self) -> bool {
        mutex_lock(&self.entries, SOURCE, "is_empty").is_empty()
    }
}

impl DiagnosticSink for CollectingDiagnostics {
    fn warn(&self, diagnostic: Diagnostic) {
        mutex_lock(&self.entries, SOURCE, "warn").push(diagnostic);
    }
}
