use std::sync::Arc;

use tracing::debug;

use crate::domain::{
    content::{Content, ContentSink},
    error::{ComposeError, require_name},
    sections::{SectionName, SectionRegistry},
};

use super::{
    diagnostics::{Diagnostic, DiagnosticSink},
    instrumentation::{RegionEvent, RegionTracer},
    state::RenderState,
};

/// What a content page hands to the layout executing on its behalf.
#[derive(Debug, Default)]
pub struct ChildContent {
    pub sections: SectionRegistry,
    pub body: Option<Content>,
}

impl ChildContent {
    pub fn new(sections: SectionRegistry, body: Option<Content>) -> Self {
        Self { sections, body }
    }
}

/// Gates and records how a layout consumes its child's body and sections.
///
/// One composer exists per layout execution. Operations take `&mut self`, so
/// a composer cannot be driven from two places at once.
pub struct Composer {
    template_path: String,
    view_path: String,
    child: Option<ChildContent>,
    state: RenderState,
    diagnostics: Arc<dyn DiagnosticSink>,
    tracer: Option<Arc<dyn RegionTracer>>,
}

impl Composer {
    /// Composer for a page that is not executing as anyone's layout. Every pull
    /// operation on it fails with [`ComposeError::InvalidState`].
    pub fn unbound(
        template_path: impl Into<String>,
        view_path: impl Into<String>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            template_path: template_path.into(),
            view_path: view_path.into(),
            child: None,
            state: RenderState::new(),
            diagnostics,
            tracer: None,
        }
    }

    /// Composer for the layout at `template_path`, bound to `child`.
    pub fn for_layout(
        template_path: impl Into<String>,
        view_path: impl Into<String>,
        child: ChildContent,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            child: Some(child),
            ..Self::unbound(template_path, view_path, diagnostics)
        }
    }

    pub fn with_tracer(mut self, tracer: Option<Arc<dyn RegionTracer>>) -> Self {
        self.tracer = tracer;
        self
    }

    pub fn template_path(&self) -> &str {
        &self.template_path
    }

    pub fn view_path(&self) -> &str {
        &self.view_path
    }

    pub fn is_layout(&self) -> bool {
        self.child.is_some()
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// The child's captured body. Only the first call is recorded; later calls
    /// hand back the same content.
    pub fn render_body(&mut self) -> Result<Content, ComposeError> {
        let body = self
            .child
            .as_ref()
            .and_then(|child| child.body.clone())
            .ok_or_else(|| ComposeError::invalid_state("render_body", &self.template_path))?;

        if !self.state.body_rendered() {
            self.state.mark_body_rendered();
        }
        Ok(body)
    }

    pub fn ignore_body(&mut self) {
        self.state.mark_body_ignored();
    }

    pub fn is_section_defined(&self, name: &str) -> Result<bool, ComposeError> {
        require_name(name, "name")?;
        let sections = self.bound_sections("is_section_defined")?;
        Ok(sections.has(name))
    }

    /// Write section `name` into `sink`.
    ///
    /// Returns the empty sentinel when the section ran, `None` when an optional
    /// section is missing. Pulling the same section twice writes it twice and
    /// emits a diagnostic.
    pub async fn render_section(
        &mut self,
        name: &str,
        required: bool,
        sink: &mut dyn ContentSink,
    ) -> Result<Option<Content>, ComposeError> {
        require_name(name, "name")?;
        let renderer = {
            let sections = self.bound_sections("render_section")?;
            sections.get(name)
        };

        let section = SectionName::new(name);
        if self.state.is_section_rendered(&section) {
            self.diagnostics.warn(Diagnostic::SectionAlreadyRendered {
                template_path: self.template_path.clone(),
                name: name.to_string(),
            });
        }

        let Some(renderer) = renderer else {
            if required {
                return Err(ComposeError::SectionNotDefined {
                    name: name.to_string(),
                    template_path: self.template_path.clone(),
                    view_path: self.view_path.clone(),
                });
            }
            return Ok(None);
        };

        debug!(
            section = name,
            template_path = %self.template_path,
            "rendering section"
        );
        self.state.mark_section_rendered(section);
        renderer.render(sink).await?;
        Ok(Some(Content::empty()))
    }

    pub fn ignore_section(&mut self, name: &str) -> Result<(), ComposeError> {
        require_name(name, "name")?;
        let sections = self.bound_sections("ignore_section")?;
        if !sections.has(name) {
            return Err(ComposeError::SectionNotDefined {
                name: name.to_string(),
                template_path: self.template_path.clone(),
                view_path: self.view_path.clone(),
            });
        }

        self.state.mark_section_ignored(SectionName::new(name));
        Ok(())
    }

    /// End-of-layout completeness check. Reports through the diagnostic sink and
    /// never fails.
    pub fn ensure_rendered_body_or_sections(&self) {
        let Some(child) = self.child.as_ref() else {
            return;
        };

        if !child.sections.is_empty() {
            let missing = child.sections.unconsumed(
                self.state.rendered_sections(),
                self.state.ignored_sections(),
            );
            if !missing.is_empty() {
                self.diagnostics.warn(Diagnostic::SectionsNotRendered {
                    template_path: self.template_path.clone(),
                    names: missing.iter().map(ToString::to_string).collect(),
                });
            }
        } else if child.body.is_some() && !self.state.body_rendered() && !self.state.body_ignored()
        {
            self.diagnostics.warn(Diagnostic::BodyNotRendered {
                template_path: self.template_path.clone(),
            });
        }
    }

    pub fn begin_context(&self, position: usize, length: usize, is_literal: bool) {
        if let Some(tracer) = self.tracer.as_ref() {
            tracer.begin_region(&RegionEvent {
                path: self.template_path.clone(),
                position,
                length,
                is_literal,
            });
        }
    }

    pub fn end_context(&self) {
        if let Some(tracer) = self.tracer.as_ref() {
            tracer.end_region(&self.template_path);
        }
    }

    fn bound_sections(&self, operation: &'static str) -> Result<&SectionRegistry, ComposeError> {
        self.child
            .as_ref()
            .map(|child| &child.sections)
            .ok_or_else(|| ComposeError::invalid_state(operation, &self.template_path))
    }
}
