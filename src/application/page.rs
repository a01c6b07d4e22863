use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::domain::{
    content::{Content, ContentSink},
    error::ComposeError,
    page_data::PageData,
    paths,
    sections::{SectionRegistry, SectionRenderer},
};

use super::{compose::Composer, engine::ViewEngine};

/// A compiled template. The same trait covers content pages, layouts and
/// partials; what a page is depends on how the engine reaches it.
#[async_trait]
pub trait Page: Send + Sync {
    /// Virtual path the page is registered under.
    fn path(&self) -> &str;

    /// Layout reference, resolved relative to [`Page::path`].
    fn layout(&self) -> Option<&str> {
        None
    }

    async fn execute(&self, ctx: &mut PageContext<'_>) -> Result<(), ComposeError>;
}

/// Everything a page can do while it executes: write output, define sections
/// for its own layout, pull its child's body and sections when it is acting
/// as a layout, share page data, and render partials.
pub struct PageContext<'a> {
    engine: &'a ViewEngine,
    path: String,
    sink: &'a mut dyn ContentSink,
    sections: SectionRegistry,
    composer: Composer,
    data: &'a mut PageData,
    depth: usize,
}

impl<'a> PageContext<'a> {
    pub(crate) fn new(
        engine: &'a ViewEngine,
        path: String,
        sink: &'a mut dyn ContentSink,
        composer: Composer,
        data: &'a mut PageData,
        depth: usize,
    ) -> Self {
        Self {
            engine,
            path,
            sink,
            sections: SectionRegistry::new(),
            composer,
            data,
            depth,
        }
    }

    /// Hand back the sections this page defined together with its composer.
    pub(crate) fn finish(self) -> (SectionRegistry, Composer) {
        (self.sections, self.composer)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn view_path(&self) -> &str {
        self.composer.view_path()
    }

    pub fn is_layout(&self) -> bool {
        self.composer.is_layout()
    }

    pub fn data(&self) -> &PageData {
        &*self.data
    }

    pub fn data_mut(&mut self) -> &mut PageData {
        &mut *self.data
    }

    pub async fn write(&mut self, content: &Content) -> Result<(), ComposeError> {
        self.sink.write(content).await?;
        Ok(())
    }

    pub async fn write_literal(&mut self, markup: &str) -> Result<(), ComposeError> {
        self.sink.write_str(markup).await?;
        Ok(())
    }

    /// Write a literal block copied from the template source, bracketed by
    /// region events.
    pub async fn write_literal_at(
        &mut self,
        position: usize,
        markup: &str,
    ) -> Result<(), ComposeError> {
        self.composer.begin_context(position, markup.len(), true);
        let result = self.write_literal(markup).await;
        self.composer.end_context();
        result
    }

    pub fn begin_context(&self, position: usize, length: usize, is_literal: bool) {
        self.composer.begin_context(position, length, is_literal);
    }

    pub fn end_context(&self) {
        self.composer.end_context();
    }

    /// Define a section for the layout this page renders into.
    pub fn define_section<R>(&mut self, name: &str, renderer: R) -> Result<(), ComposeError>
    where
        R: SectionRenderer + 'static,
    {
        self.sections.define(name, Arc::new(renderer))
    }

    /// Write the child's body at the current position.
    pub async fn render_body(&mut self) -> Result<(), ComposeError> {
        let body = self.composer.render_body()?;
        self.sink.write(&body).await?;
        Ok(())
    }

    pub fn ignore_body(&mut self) {
        self.composer.ignore_body();
    }

    pub fn is_section_defined(&self, name: &str) -> Result<bool, ComposeError> {
        self.composer.is_section_defined(name)
    }

    /// Render an optional section. `None` when the child did not define it.
    pub async fn render_section(&mut self, name: &str) -> Result<Option<Content>, ComposeError> {
        self.composer.render_section(name, false, &mut *self.sink).await
    }

    /// Render a section the child must define.
    pub async fn render_required_section(&mut self, name: &str) -> Result<Content, ComposeError> {
        let token = self.composer.render_section(name, true, &mut *self.sink).await?;
        Ok(token.unwrap_or_default())
    }

    pub fn ignore_section(&mut self, name: &str) -> Result<(), ComposeError> {
        self.composer.ignore_section(name)
    }

    /// Render another page in place. The partial shares page data and may have
    /// its own layout; its sections stay private to it.
    pub async fn render_partial(&mut self, reference: &str) -> Result<(), ComposeError> {
        let target = paths::resolve(&self.path, reference)?;
        let nested: BoxFuture<'_, Result<(), ComposeError>> = Box::pin(
            self.engine
                .render_at_depth(&target, &mut *self.sink, &mut *self.data, self.depth + 1),
        );
        nested.await
    }
}
