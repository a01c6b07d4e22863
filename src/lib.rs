//! Layout and section composition for server-rendered pages.
//!
//! A content page writes a body and defines named sections; the layout it
//! names pulls them in through a [`Composer`](application::compose::Composer)
//! that tracks consumption and reports leftovers as diagnostics. Layouts may
//! nest: each layout's output becomes the body of the next.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
mod util;

pub use application::{
    catalog::PageCatalog,
    compose::{
        ChildContent, CollectingDiagnostics, Composer, Diagnostic, DiagnosticSink,
        RegionEvent, RegionTracer, RenderState, TracingDiagnostics, TracingRegionTracer,
    },
    engine::{ComposeOptions, ViewEngine},
    page::{Page, PageContext},
};
pub use domain::{
    content::{Content, ContentSink, SinkError},
    error::ComposeError,
    page_data::PageData,
    sections::{FnSection, SectionName, SectionRegistry, SectionRenderer, section_fn},
};
pub use infra::sink::{BufferSink, ContentStream, StreamSink, stream_channel};
