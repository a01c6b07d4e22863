//! Bundled demo site: a content page under two nested layouts, a page whose
//! layout hides part of it, and a sections-only page.

use std::sync::Arc;

use askama::Template;
use async_trait::async_trait;
use serde_json::Value;

use crate::{
    application::{
        catalog::PageCatalog,
        page::{Page, PageContext},
    },
    domain::{content::Content, error::ComposeError, sections::section_fn},
};

use super::views::{TemplateSection, render_template};

const DEFAULT_TITLE: &str = "Trellis";
const ROOT_CLOSE_POSITION: usize = 96;

/// Build a catalog holding every demo page.
pub fn demo_catalog() -> Result<PageCatalog, ComposeError> {
    let catalog = PageCatalog::new();
    let pages: [Arc<dyn Page>; 7] = [
        Arc::new(RootLayout),
        Arc::new(SiteLayout),
        Arc::new(PrintLayout),
        Arc::new(HomePage),
        Arc::new(AboutPage),
        Arc::new(PrintPage),
        Arc::new(GreetingPartial),
    ];
    for page in pages {
        catalog.register(page)?;
    }
    Ok(catalog)
}

pub struct NavLink {
    pub href: &'static str,
    pub label: &'static str,
}

const NAV_LINKS: &[NavLink] = &[
    NavLink {
        href: "/",
        label: "Home",
    },
    NavLink {
        href: "/about",
        label: "About",
    },
    NavLink {
        href: "/print",
        label: "Print",
    },
];

#[derive(Template)]
#[template(
    source = "<!doctype html>\n<html lang=\"en\">\n<head><title>{{ title }}</title></head>\n<body>",
    ext = "html"
)]
struct RootHeadTemplate<'a> {
    title: &'a str,
}

#[derive(Template)]
#[template(
    source = "<h1>{{ headline }}</h1><ul>{% for feature in features %}<li>{{ feature }}</li>{% endfor %}</ul>",
    ext = "html"
)]
struct HomeBodyTemplate {
    headline: &'static str,
    features: &'static [&'static str],
}

#[derive(Template)]
#[template(
    source = "<nav>{% for link in links %}<a href=\"{{ link.href }}\">{{ link.label }}</a>{% endfor %}</nav>",
    ext = "html"
)]
struct NavTemplate {
    links: &'static [NavLink],
}

#[derive(Template)]
#[template(source = "<p class=\"greeting\">Welcome, {{ visitor }}.</p>", ext = "html")]
struct GreetingTemplate<'a> {
    visitor: &'a str,
}

#[derive(Template)]
#[template(source = "<h1>{{ title }}</h1><p>{{ blurb }}</p>", ext = "html")]
struct ArticleTemplate {
    title: &'static str,
    blurb: &'static str,
}

/// Outermost document shell.
struct RootLayout;

#[async_trait]
impl Page for RootLayout {
    fn path(&self) -> &str {
        "/_root"
    }

    async fn execute(&self, ctx: &mut PageContext<'_>) -> Result<(), ComposeError> {
        let title = ctx
            .data()
            .get_str("title")
            .unwrap_or(DEFAULT_TITLE)
            .to_string();
        let head = render_template(ctx.path(), &RootHeadTemplate { title: &title })?;
        ctx.write(&head).await?;
        ctx.write_literal("\n").await?;

        ctx.render_body().await?;

        ctx.write_literal("<footer>").await?;
        if ctx.render_section("Footer").await?.is_none() {
            ctx.write_literal("<p>Composed with trellis.</p>").await?;
        }
        ctx.write_literal_at(ROOT_CLOSE_POSITION, "</footer>\n</body>\n</html>\n")
            .await
    }
}

/// Site chrome shared by content pages. Nests inside the root layout.
struct SiteLayout;

#[async_trait]
impl Page for SiteLayout {
    fn path(&self) -> &str {
        "/_layout"
    }

    fn layout(&self) -> Option<&str> {
        Some("_root")
    }

    async fn execute(&self, ctx: &mut PageContext<'_>) -> Result<(), ComposeError> {
        ctx.define_section("Footer", Content::from_static("<p>Trellis demo site</p>"))?;

        ctx.write_literal("<main>\n").await?;
        ctx.render_body().await?;
        ctx.write_literal("</main>\n").await?;

        let hide_sidebar = ctx
            .data()
            .get("hide_sidebar")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if ctx.is_section_defined("Sidebar")? {
            if hide_sidebar {
                ctx.ignore_section("Sidebar")?;
            } else {
                ctx.write_literal("<aside>").await?;
                ctx.render_section("Sidebar").await?;
                ctx.write_literal("</aside>\n").await?;
            }
        }

        ctx.render_section("Scripts").await?;
        Ok(())
    }
}

/// Layout for pages that only contribute sections.
struct PrintLayout;

#[async_trait]
impl Page for PrintLayout {
    fn path(&self) -> &str {
        "/_print"
    }

    async fn execute(&self, ctx: &mut PageContext<'_>) -> Result<(), ComposeError> {
        ctx.write_literal("<!doctype html>\n<html>\n<body class=\"print\">\n")
            .await?;
        ctx.ignore_body();
        ctx.render_required_section("Content").await?;
        ctx.write_literal("\n</body>\n</html>\n").await
    }
}

struct HomePage;

#[async_trait]
impl Page for HomePage {
    fn path(&self) -> &str {
        "/index"
    }

    fn layout(&self) -> Option<&str> {
        Some("_layout")
    }

    async fn execute(&self, ctx: &mut PageContext<'_>) -> Result<(), ComposeError> {
        ctx.data_mut().set("title", "Home");

        let body = render_template(
            ctx.path(),
            &HomeBodyTemplate {
                headline: "Layouts, composed",
                features: &["Named sections", "Nested layouts", "Streaming output"],
            },
        )?;
        ctx.write(&body).await?;
        ctx.write_literal("\n").await?;
        ctx.render_partial("_greeting").await?;

        let page = ctx.path().to_string();
        ctx.define_section(
            "Sidebar",
            TemplateSection::new(page, NavTemplate { links: NAV_LINKS }),
        )?;
        ctx.define_section(
            "Scripts",
            section_fn(|sink| {
                Box::pin(async move {
                    sink.write_str("<script src=\"/app.js\"></script>\n").await?;
                    Ok::<(), ComposeError>(())
                })
            }),
        )?;
        Ok(())
    }
}

struct AboutPage;

#[async_trait]
impl Page for AboutPage {
    fn path(&self) -> &str {
        "/about"
    }

    fn layout(&self) -> Option<&str> {
        Some("_layout")
    }

    async fn execute(&self, ctx: &mut PageContext<'_>) -> Result<(), ComposeError> {
        ctx.data_mut().set("title", "About");
        ctx.data_mut().set("hide_sidebar", true);

        let body = render_template(
            ctx.path(),
            &ArticleTemplate {
                title: "About",
                blurb: "Every page here is a content page wrapped by two layouts",
            },
        )?;
        ctx.write(&body).await?;
        ctx.write_literal("\n").await?;

        ctx.define_section("Sidebar", Content::from_static("<p>Hidden on this page</p>"))?;
        Ok(())
    }
}

struct PrintPage;

#[async_trait]
impl Page for PrintPage {
    fn path(&self) -> &str {
        "/print"
    }

    fn layout(&self) -> Option<&str> {
        Some("_print")
    }

    async fn execute(&self, ctx: &mut PageContext<'_>) -> Result<(), ComposeError> {
        ctx.data_mut().set("title", "Printable summary");

        let page = ctx.path().to_string();
        ctx.define_section(
            "Content",
            TemplateSection::new(
                page,
                ArticleTemplate {
                    title: "Trellis at a glance",
                    blurb: "Pages define sections and layouts pull them in",
                },
            ),
        )
    }
}

/// Partial rendered in place by the home page.
struct GreetingPartial;

#[async_trait]
impl Page for GreetingPartial {
    fn path(&self) -> &str {
        "/_greeting"
    }

    async fn execute(&self, ctx: &mut PageContext<'_>) -> Result<(), ComposeError> {
        let visitor = ctx.data().get_str("visitor").unwrap_or("guest").to_string();
        let greeting = render_template(ctx.path(), &GreetingTemplate { visitor: &visitor })?;
        ctx.write(&greeting).await?;
        ctx.write_literal("\n").await
    }
}
