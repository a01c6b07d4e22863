mod common;

use std::sync::Arc;

use async_trait::async_trait;
use common::{Step, engine, page, render, with_layout};
use trellis::{
    BufferSink, ChildContent, CollectingDiagnostics, ComposeError, Composer, Content, Diagnostic,
    Page, PageContext, SectionRegistry, section_fn,
};

#[tokio::test]
async fn defining_a_section_twice_conflicts() {
    let (engine, _) = engine([
        with_layout(
            "/index",
            "_layout",
            &[Step::Define("Title", "a"), Step::Define("title", "b")],
        ),
        page("/_layout", &[Step::Section("Title")]),
    ]);

    let err = render(&engine, "/index").await.expect_err("conflict");
    assert!(matches!(err, ComposeError::Conflict { ref name } if name == "title"));
}

#[tokio::test]
async fn section_lookup_ignores_case() {
    let (engine, diagnostics) = engine([
        with_layout("/index", "_layout", &[Step::Define("Scripts", "<script/>")]),
        page(
            "/_layout",
            &[Step::IfDefined("scripts", "[has scripts]"), Step::Section("SCRIPTS")],
        ),
    ]);

    let html = render(&engine, "/index").await.expect("renders");
    assert_eq!(html, "[has scripts]<script/>");
    assert!(diagnostics.is_empty());
}

#[tokio::test]
async fn pull_operations_need_a_child() {
    for step in [
        Step::RenderBody,
        Step::Section("Title"),
        Step::Required("Title"),
        Step::Ignore("Title"),
        Step::IfDefined("Title", ""),
    ] {
        let (engine, _) = engine([page("/index", &[step])]);
        let err = render(&engine, "/index").await.expect_err("no layout context");
        assert!(
            matches!(err, ComposeError::InvalidState { ref template_path, .. } if template_path == "/index"),
            "{step:?} returned {err:?}"
        );
    }
}

#[tokio::test]
async fn ignoring_the_body_needs_no_child() {
    let (engine, diagnostics) = engine([page("/index", &[Step::IgnoreBody, Step::Write("ok")])]);

    assert_eq!(render(&engine, "/index").await.expect("renders"), "ok");
    assert!(diagnostics.is_empty());
}

#[tokio::test]
async fn missing_required_section_names_section_layout_and_view() {
    let (engine, _) = engine([
        with_layout("/blog/post", "_layout", &[Step::Write("body")]),
        page("/blog/_layout", &[Step::RenderBody, Step::Required("Sidebar")]),
    ]);

    let err = render(&engine, "/blog/post").await.expect_err("required");
    match err {
        ComposeError::SectionNotDefined {
            name,
            template_path,
            view_path,
        } => {
            assert_eq!(name, "Sidebar");
            assert_eq!(template_path, "/blog/_layout");
            assert_eq!(view_path, "/blog/post");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn missing_optional_section_renders_nothing() {
    let (engine, diagnostics) = engine([
        with_layout("/index", "_layout", &[Step::Write("body")]),
        page(
            "/_layout",
            &[Step::Write("["), Step::Section("Sidebar"), Step::Write("]"), Step::RenderBody],
        ),
    ]);

    assert_eq!(render(&engine, "/index").await.expect("renders"), "[]body");
    assert!(diagnostics.is_empty());
}

#[tokio::test]
async fn rendering_a_section_twice_writes_twice_and_warns() {
    let (engine, diagnostics) = engine([
        with_layout("/index", "_layout", &[Step::Define("Scripts", "<s/>")]),
        page("/_layout", &[Step::Section("Scripts"), Step::Section("Scripts")]),
    ]);

    assert_eq!(render(&engine, "/index").await.expect("renders"), "<s/><s/>");
    assert_eq!(
        diagnostics.take(),
        vec![Diagnostic::SectionAlreadyRendered {
            template_path: "/_layout".into(),
            name: "Scripts".into(),
        }]
    );
}

#[tokio::test]
async fn ignoring_an_undefined_section_fails() {
    let (engine, _) = engine([
        with_layout("/index", "_layout", &[Step::Define("Title", "t")]),
        page("/_layout", &[Step::Section("Title"), Step::Ignore("Scripts")]),
    ]);

    let err = render(&engine, "/index").await.expect_err("undefined");
    assert!(matches!(err, ComposeError::SectionNotDefined { ref name, .. } if name == "Scripts"));
}

#[tokio::test]
async fn ignored_sections_are_not_reported() {
    let (engine, diagnostics) = engine([
        with_layout(
            "/index",
            "_layout",
            &[Step::Define("Title", "t"), Step::Define("Scripts", "s")],
        ),
        page("/_layout", &[Step::Section("Title"), Step::Ignore("scripts")]),
    ]);

    assert_eq!(render(&engine, "/index").await.expect("renders"), "t");
    assert!(diagnostics.is_empty());
}

#[tokio::test]
async fn unrendered_sections_produce_one_warning() {
    let (engine, diagnostics) = engine([
        with_layout(
            "/index",
            "_layout",
            &[Step::Define("Title", "t"), Step::Define("Scripts", "s")],
        ),
        page("/_layout", &[Step::Section("Title")]),
    ]);

    assert_eq!(render(&engine, "/index").await.expect("renders"), "t");
    let reported = diagnostics.take();
    assert_eq!(
        reported,
        vec![Diagnostic::SectionsNotRendered {
            template_path: "/_layout".into(),
            names: vec!["Scripts".into()],
        }]
    );
    assert_eq!(reported[0].to_string(), "section(s) not rendered: Scripts");
}

#[tokio::test]
async fn unrendered_body_is_reported_unless_ignored() {
    let (engine, diagnostics) = engine([
        with_layout("/index", "_layout", &[Step::Write("body")]),
        page("/_layout", &[Step::Write("chrome")]),
        with_layout("/quiet", "_quiet", &[Step::Write("body")]),
        page("/_quiet", &[Step::IgnoreBody, Step::Write("chrome")]),
    ]);

    assert_eq!(render(&engine, "/index").await.expect("renders"), "chrome");
    assert_eq!(
        diagnostics.take(),
        vec![Diagnostic::BodyNotRendered {
            template_path: "/_layout".into(),
        }]
    );

    assert_eq!(render(&engine, "/quiet").await.expect("renders"), "chrome");
    assert!(diagnostics.is_empty());
}

#[tokio::test]
async fn rendering_the_body_wins_over_ignoring_it() {
    let (engine, diagnostics) = engine([
        with_layout("/index", "_layout", &[Step::Write("body")]),
        page("/_layout", &[Step::RenderBody, Step::IgnoreBody]),
        with_layout("/other", "_other", &[Step::Write("body")]),
        page("/_other", &[Step::IgnoreBody, Step::RenderBody]),
    ]);

    assert_eq!(render(&engine, "/index").await.expect("renders"), "body");
    assert_eq!(render(&engine, "/other").await.expect("renders"), "body");
    assert!(diagnostics.is_empty());
}

#[tokio::test]
async fn pulls_land_in_the_order_they_are_issued() {
    let (engine, _) = engine([
        with_layout(
            "/index",
            "_layout",
            &[
                Step::Write("<p>body</p>"),
                Step::Define("Head", "<title>t</title>"),
                Step::Define("Scripts", "<script/>"),
            ],
        ),
        page(
            "/_layout",
            &[
                Step::Write("<html>"),
                Step::Section("Head"),
                Step::Write("<body>"),
                Step::RenderBody,
                Step::Section("Scripts"),
                Step::Write("</body></html>"),
            ],
        ),
    ]);

    assert_eq!(
        render(&engine, "/index").await.expect("renders"),
        "<html><title>t</title><body><p>body</p><script/></body></html>"
    );
}

#[tokio::test]
async fn absent_body_cannot_be_rendered() {
    let diagnostics = Arc::new(CollectingDiagnostics::new());
    let mut composer = Composer::for_layout(
        "/_layout",
        "/index",
        ChildContent::new(SectionRegistry::new(), None),
        diagnostics.clone(),
    );

    let err = composer.render_body().expect_err("no body captured");
    assert!(matches!(err, ComposeError::InvalidState { operation: "render_body", .. }));

    composer.ensure_rendered_body_or_sections();
    assert!(diagnostics.is_empty());
}

#[tokio::test]
async fn composer_renders_sections_into_the_sink_it_is_given() {
    let mut sections = SectionRegistry::new();
    sections
        .define("Title", Arc::new(Content::from_static("<h1>Hi</h1>")))
        .expect("defined");
    let diagnostics = Arc::new(CollectingDiagnostics::new());
    let mut composer = Composer::for_layout(
        "/_layout",
        "/index",
        ChildContent::new(sections, Some(Content::from_static("body"))),
        diagnostics.clone(),
    );
    let mut sink = BufferSink::new();

    let token = composer
        .render_section("title", true, &mut sink)
        .await
        .expect("rendered");
    assert_eq!(token, Some(Content::empty()));
    assert_eq!(sink.into_content().to_string_lossy(), "<h1>Hi</h1>");

    composer.ensure_rendered_body_or_sections();
    assert!(diagnostics.is_empty());
}

#[tokio::test]
async fn sections_only_child_has_no_body_to_render() {
    let (engine, diagnostics) = engine([
        with_layout("/index", "_layout", &[Step::Define("Title", "t")]),
        page("/_layout", &[Step::Section("Title"), Step::RenderBody]),
    ]);

    let err = render(&engine, "/index").await.expect_err("no body");
    match err {
        ComposeError::InvalidState {
            operation,
            template_path,
        } => {
            assert_eq!(operation, "render_body");
            assert_eq!(template_path, "/_layout");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(diagnostics.is_empty());
}

#[tokio::test]
async fn empty_child_leaves_nothing_to_report() {
    let (engine, diagnostics) = engine([
        with_layout("/empty", "_shell", &[]),
        page("/_shell", &[Step::Write("<html/>")]),
    ]);

    assert_eq!(render(&engine, "/empty").await.expect("renders"), "<html/>");
    assert!(diagnostics.is_empty());
}

/// Content page whose `Sidebar` section fails when its layout pulls it.
struct BrokenSidebar;

#[async_trait]
impl Page for BrokenSidebar {
    fn path(&self) -> &str {
        "/index"
    }

    fn layout(&self) -> Option<&str> {
        Some("_layout")
    }

    async fn execute(&self, ctx: &mut PageContext<'_>) -> Result<(), ComposeError> {
        ctx.write_literal("<p>body</p>").await?;
        ctx.define_section(
            "Sidebar",
            section_fn(|_sink| {
                Box::pin(async move {
                    Err::<(), _>(ComposeError::page("/index", "sidebar data unavailable"))
                })
            }),
        )
    }
}

#[tokio::test]
async fn failing_section_fails_the_render_pass() {
    let (engine, _) = engine([
        Arc::new(BrokenSidebar) as Arc<dyn Page>,
        page(
            "/_layout",
            &[Step::RenderBody, Step::Section("Sidebar"), Step::Write("<footer/>")],
        ),
    ]);

    let err = render(&engine, "/index").await.expect_err("section failure");
    match err {
        ComposeError::Page { path, message } => {
            assert_eq!(path, "/index");
            assert_eq!(message, "sidebar data unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
