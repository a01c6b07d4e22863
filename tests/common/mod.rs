#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use trellis::{
    CollectingDiagnostics, ComposeError, ComposeOptions, Content, Page, PageCatalog, PageContext,
    ViewEngine,
};

/// One instruction a scripted page performs, in order.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    Write(&'static str),
    Define(&'static str, &'static str),
    RenderBody,
    IgnoreBody,
    Section(&'static str),
    Required(&'static str),
    Ignore(&'static str),
    IfDefined(&'static str, &'static str),
    Partial(&'static str),
    SetData(&'static str, &'static str),
    WriteData(&'static str),
}

pub struct Scripted {
    path: &'static str,
    layout: Option<&'static str>,
    steps: Vec<Step>,
}

#[async_trait]
impl Page for Scripted {
    fn path(&self) -> &str {
        self.path
    }

    fn layout(&self) -> Option<&str> {
        self.layout
    }

    async fn execute(&self, ctx: &mut PageContext<'_>) -> Result<(), ComposeError> {
        for step in &self.steps {
            match *step {
                Step::Write(markup) => ctx.write_literal(markup).await?,
                Step::Define(name, markup) => {
                    ctx.define_section(name, Content::from_static(markup))?
                }
                Step::RenderBody => ctx.render_body().await?,
                Step::IgnoreBody => ctx.ignore_body(),
                Step::Section(name) => {
                    ctx.render_section(name).await?;
                }
                Step::Required(name) => {
                    ctx.render_required_section(name).await?;
                }
                Step::Ignore(name) => ctx.ignore_section(name)?,
                Step::IfDefined(name, markup) => {
                    if ctx.is_section_defined(name)? {
                        ctx.write_literal(markup).await?;
                    }
                }
                Step::Partial(reference) => ctx.render_partial(reference).await?,
                Step::SetData(key, value) => ctx.data_mut().set(key, value),
                Step::WriteData(key) => {
                    let value = ctx.data().get_str(key).unwrap_or_default().to_string();
                    ctx.write_literal(&value).await?;
                }
            }
        }
        Ok(())
    }
}

pub fn page(path: &'static str, steps: &[Step]) -> Arc<dyn Page> {
    Arc::new(Scripted {
        path,
        layout: None,
        steps: steps.to_vec(),
    })
}

pub fn with_layout(path: &'static str, layout: &'static str, steps: &[Step]) -> Arc<dyn Page> {
    Arc::new(Scripted {
        path,
        layout: Some(layout),
        steps: steps.to_vec(),
    })
}

pub fn catalog(pages: impl IntoIterator<Item = Arc<dyn Page>>) -> Arc<PageCatalog> {
    let catalog = PageCatalog::new();
    for page in pages {
        catalog.register(page).expect("unique page paths");
    }
    Arc::new(catalog)
}

/// Engine over `pages` that records diagnostics instead of logging them.
pub fn engine(
    pages: impl IntoIterator<Item = Arc<dyn Page>>,
) -> (ViewEngine, Arc<CollectingDiagnostics>) {
    engine_with_options(pages, ComposeOptions::default())
}

pub fn engine_with_options(
    pages: impl IntoIterator<Item = Arc<dyn Page>>,
    options: ComposeOptions,
) -> (ViewEngine, Arc<CollectingDiagnostics>) {
    let diagnostics = Arc::new(CollectingDiagnostics::new());
    let engine = ViewEngine::new(catalog(pages), options).with_diagnostics(diagnostics.clone());
    (engine, diagnostics)
}

pub async fn render(engine: &ViewEngine, view: &str) -> Result<String, ComposeError> {
    engine
        .render_to_content(view)
        .await
        .map(|content| content.to_string_lossy())
}
