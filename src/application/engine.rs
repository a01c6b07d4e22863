//! Render pass execution: content page first, then each layout in its chain.

use std::{num::NonZeroUsize, sync::Arc, time::Instant};

use metrics::{counter, histogram};
use tracing::{Instrument, debug, debug_span, error, info_span};
use uuid::Uuid;

use crate::{
    domain::{
        content::{Content, ContentSink},
        error::ComposeError,
        page_data::PageData,
        paths,
        sections::SectionRegistry,
    },
    infra::sink::{BufferSink, ContentStream, stream_channel},
};

use super::{
    catalog::PageCatalog,
    compose::{
        ChildContent, Composer, DiagnosticSink, RegionTracer, TracingDiagnostics,
        TracingRegionTracer,
    },
    page::{Page, PageContext},
};

pub(crate) const METRIC_RENDER_PASS_TOTAL: &str = "trellis_render_pass_total";
pub(crate) const METRIC_RENDER_PASS_MS: &str = "trellis_render_pass_ms";

const DEFAULT_MAX_LAYOUT_DEPTH: usize = 8;
const DEFAULT_STREAM_BUFFER_CHUNKS: usize = 16;

/// Engine-level knobs, resolved from the `[compose]` settings table.
#[derive(Debug, Clone)]
pub struct ComposeOptions {
    /// Maximum number of layouts wrapping one view, and of nested partials.
    pub max_layout_depth: NonZeroUsize,
    /// Forward begin/end region events to the region tracer.
    pub trace_regions: bool,
    /// Pending chunks a streamed response may buffer.
    pub stream_buffer_chunks: NonZeroUsize,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            max_layout_depth: NonZeroUsize::new(DEFAULT_MAX_LAYOUT_DEPTH)
                .unwrap_or(NonZeroUsize::MIN),
            trace_regions: false,
            stream_buffer_chunks: NonZeroUsize::new(DEFAULT_STREAM_BUFFER_CHUNKS)
                .unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl From<&crate::config::ComposeSettings> for ComposeOptions {
    fn from(settings: &crate::config::ComposeSettings) -> Self {
        Self {
            max_layout_depth: settings.max_layout_depth,
            trace_regions: settings.trace_regions,
            stream_buffer_chunks: settings.stream_buffer_chunks,
        }
    }
}

/// Renders views from a [`PageCatalog`]. Cheap to share behind an `Arc`; each
/// call to [`ViewEngine::render`] is an independent render pass.
pub struct ViewEngine {
    catalog: Arc<PageCatalog>,
    options: ComposeOptions,
    diagnostics: Arc<dyn DiagnosticSink>,
    tracer: Arc<dyn RegionTracer>,
}

impl ViewEngine {
    pub fn new(catalog: Arc<PageCatalog>, options: ComposeOptions) -> Self {
        Self {
            catalog,
            options,
            diagnostics: Arc::new(TracingDiagnostics),
            tracer: Arc::new(TracingRegionTracer),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Replace the region tracer. It only receives events while
    /// `trace_regions` is enabled.
    pub fn with_region_tracer(mut self, tracer: Arc<dyn RegionTracer>) -> Self {
        self.tracer = tracer;
        self
    }

    pub fn catalog(&self) -> &Arc<PageCatalog> {
        &self.catalog
    }

    pub fn options(&self) -> &ComposeOptions {
        &self.options
    }

    /// Render `view_path` into `sink`.
    pub async fn render(
        &self,
        view_path: &str,
        sink: &mut dyn ContentSink,
    ) -> Result<(), ComposeError> {
        self.render_with_data(view_path, sink, PageData::new())
            .await
            .map(|_| ())
    }

    /// Render with caller-provided page data, returning the data as the pages
    /// left it.
    pub async fn render_with_data(
        &self,
        view_path: &str,
        sink: &mut dyn ContentSink,
        mut data: PageData,
    ) -> Result<PageData, ComposeError> {
        let pass_id = Uuid::new_v4();
        let span = info_span!("render_pass", %pass_id, view = view_path);
        let started_at = Instant::now();

        let result = self
            .render_at_depth(view_path, sink, &mut data, 0)
            .instrument(span)
            .await;

        let outcome = if result.is_ok() { "ok" } else { "error" };
        counter!(METRIC_RENDER_PASS_TOTAL, "outcome" => outcome).increment(1);
        histogram!(METRIC_RENDER_PASS_MS).record(started_at.elapsed().as_secs_f64() * 1000.0);

        result.map(|()| data)
    }

    pub async fn render_to_content(&self, view_path: &str) -> Result<Content, ComposeError> {
        let mut buffer = BufferSink::new();
        self.render(view_path, &mut buffer).await?;
        Ok(buffer.into_content())
    }

    /// Start a render pass on a background task and return its output as a
    /// stream. Unknown views fail before anything is spawned; later failures
    /// end the stream early and are logged.
    pub fn render_stream(self: &Arc<Self>, view_path: &str) -> Result<ContentStream, ComposeError> {
        let view = paths::normalize(view_path)?;
        if !self.catalog.contains(&view) {
            return Err(ComposeError::PageNotFound { path: view });
        }

        let (mut sink, stream) = stream_channel(self.options.stream_buffer_chunks);
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = engine.render(&view, &mut sink).await {
                error!(view = %view, error = %err, "streamed render pass failed");
            }
        });
        Ok(stream)
    }

    pub(crate) async fn render_at_depth(
        &self,
        view_path: &str,
        sink: &mut dyn ContentSink,
        data: &mut PageData,
        depth: usize,
    ) -> Result<(), ComposeError> {
        let max_depth = self.options.max_layout_depth.get();
        let view = paths::normalize(view_path)?;
        if depth > max_depth {
            return Err(ComposeError::LayoutDepthExceeded {
                view_path: view,
                max_depth,
            });
        }

        let mut page = self.catalog.get(&view)?;
        let mut child: Option<ChildContent> = None;
        let mut layouts = 0usize;

        loop {
            let layout = page
                .layout()
                .map(|reference| paths::resolve(page.path(), reference))
                .transpose()?;
            let composer = self.composer_for(page.as_ref(), &view, child.take());

            let Some(layout) = layout else {
                let sections = self
                    .execute(page.as_ref(), &mut *sink, composer, data, depth)
                    .await?;
                if !sections.is_empty() {
                    debug!(
                        page = page.path(),
                        sections = ?sections,
                        "sections defined by a page without a layout are discarded"
                    );
                }
                return Ok(());
            };

            layouts += 1;
            if layouts > max_depth {
                return Err(ComposeError::LayoutDepthExceeded {
                    view_path: view,
                    max_depth,
                });
            }

            let mut buffer = BufferSink::new();
            let sections = self
                .execute(page.as_ref(), &mut buffer, composer, data, depth)
                .await?;
            let body = buffer.into_content();
            child = Some(ChildContent::new(sections, (!body.is_empty()).then_some(body)));
            page = self.catalog.get(&layout)?;
        }
    }

    fn composer_for(&self, page: &dyn Page, view: &str, child: Option<ChildContent>) -> Composer {
        let composer = match child {
            Some(child) => {
                Composer::for_layout(page.path(), view, child, Arc::clone(&self.diagnostics))
            }
            None => Composer::unbound(page.path(), view, Arc::clone(&self.diagnostics)),
        };
        let tracer = self
            .options
            .trace_regions
            .then(|| Arc::clone(&self.tracer));
        composer.with_tracer(tracer)
    }

    /// Run one page and the completeness check of its composer. Returns the
    /// sections the page defined for its own layout.
    async fn execute(
        &self,
        page: &dyn Page,
        sink: &mut dyn ContentSink,
        composer: Composer,
        data: &mut PageData,
        depth: usize,
    ) -> Result<SectionRegistry, ComposeError> {
        let span = debug_span!("page", path = page.path(), layout = composer.is_layout());
        let mut ctx = PageContext::new(self, page.path().to_string(), sink, composer, data, depth);
        page.execute(&mut ctx).instrument(span).await?;

        let (sections, composer) = ctx.finish();
        composer.ensure_rendered_body_or_sections();
        Ok(sections)
    }
}
