//! askama glue: compiled templates as page output and section renderers.

use askama::{Error as AskamaError, Template};
use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    content::{Content, ContentSink},
    error::ComposeError,
    sections::SectionRenderer,
};

#[derive(Debug, Error)]
#[error("template for `{page}` failed to render")]
pub struct TemplateRenderError {
    pub(crate) page: String,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(page: impl Into<String>, error: AskamaError) -> Self {
        Self {
            page: page.into(),
            error,
        }
    }
}

impl From<TemplateRenderError> for ComposeError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError { page, error } = err;
        ComposeError::page(page, error.to_string())
    }
}

/// Render `template` on behalf of the page at `page`.
pub fn render_template<T: Template>(page: &str, template: &T) -> Result<Content, ComposeError> {
    template
        .render()
        .map(Content::from_markup)
        .map_err(|err| TemplateRenderError::new(page, err).into())
}

/// A template deferred until a layout pulls it as a section.
pub struct TemplateSection<T> {
    page: String,
    template: T,
}

impl<T> TemplateSection<T>
where
    T: Template + Send + Sync,
{
    pub fn new(page: impl Into<String>, template: T) -> Self {
        Self {
            page: page.into(),
            template,
        }
    }
}

#[async_trait]
impl<T> SectionRenderer for TemplateSection<T>
where
    T: Template + Send + Sync,
{
    async fn render(&self, sink: &mut dyn ContentSink) -> Result<(), ComposeError> {
        let content = render_template(&self.page, &self.template)?;
        sink.write(&content).await?;
        Ok(())
    }
}
