//! Layout/section composition.
//!
//! A content page defines sections and writes a body; the layout executing on
//! its behalf pulls both through a [`Composer`], which records what was
//! consumed and reports leftovers once the layout finishes.

mod composer;
mod diagnostics;
mod instrumentation;
mod state;

pub use composer::{ChildContent, Composer};
pub use diagnostics::{CollectingDiagnostics, Diagnostic, DiagnosticSink, TracingDiagnostics};
pub(crate) use diagnostics::METRIC_COMPOSE_DIAGNOSTICS;
pub use instrumentation::{RegionEvent, RegionTracer, TracingRegionTracer};
pub use state::RenderState;
