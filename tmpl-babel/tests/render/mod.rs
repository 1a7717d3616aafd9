//! Rendering the policy report fixture end to end (context → template → HTML).

use crate::common::{fixture_path, read_fixture};
use chrono::{TimeZone, Utc};
use tmpl_babel::context::{RenderContext, DEFAULT_DATE_FORMAT, DEFAULT_GENERATED_KEY};
use tmpl_babel::publish::{publish, PublishArtifact, PublishSpec};
use tmpl_babel::render::TemplateRenderer;

fn prepared_context() -> RenderContext {
    let mut ctx = RenderContext::load(fixture_path("policy_report.json")).unwrap();
    ctx.format_date_fields(&["policy_report.date"], DEFAULT_DATE_FORMAT)
        .unwrap();
    let now = Utc.with_ymd_and_hms(2025, 10, 1, 9, 15, 0).unwrap();
    ctx.stamp_generated(DEFAULT_GENERATED_KEY, &now, DEFAULT_DATE_FORMAT)
        .unwrap();
    ctx
}

fn render_fixture() -> String {
    let template = read_fixture("policy_report.html");
    TemplateRenderer::default()
        .render_named("policy_report.html", &template, prepared_context().as_map())
        .unwrap()
}

#[test]
fn renders_header_fields() {
    let html = render_fixture();
    assert!(html.contains("<title>Policy Report PR-2025-0042</title>"));
    assert!(html.contains("<h1>Home Insurance Policy</h1>"));
    assert!(html.contains("<p>Holder: Jane Doe</p>"));
    assert!(html.contains("<p>Issued: Sep 18, 2025, 19:29 PM</p>"));
    assert!(html.contains("<footer>Generated Oct 01, 2025, 09:15 AM</footer>"));
}

#[test]
fn renders_loop_variables() {
    let html = render_fixture();
    assert_eq!(html.matches("class=\"first-row\"").count(), 1);
    assert!(html.contains("<td>1</td>"));
    assert!(html.contains("<td>3</td>"));
    assert!(html.contains("<td data-offset=\"0\">Fire</td>"));
    assert!(html.contains("<td data-offset=\"2\">Theft</td>"));
}

#[test]
fn renders_defaults_for_missing_values() {
    let html = render_fixture();
    assert!(html.contains("<td>Not covered</td>"));
    assert!(html.contains("<td>250,000 EUR</td>"));
}

#[test]
fn missing_context_keys_use_defaults() {
    let template = read_fixture("policy_report.html");
    let ctx = RenderContext::from_json_str(r#"{"policy_report": {}}"#).unwrap();
    let html = TemplateRenderer::default().render(&template, ctx.as_map()).unwrap();
    assert!(html.contains("<title>Policy Report N/A</title>"));
    assert!(html.contains("<p>Holder: Unknown holder</p>"));
    assert!(html.contains("<p>Issued: -</p>"));
    assert!(!html.contains("<tr"));
}

#[test]
fn publish_matches_direct_render() {
    let template = read_fixture("policy_report.html");
    let ctx = prepared_context();
    let result = publish(PublishSpec::new(&template, &ctx, "html")).unwrap();
    let PublishArtifact::InMemory(html) = result.artifact else {
        panic!("expected in-memory HTML");
    };
    assert_eq!(html, render_fixture());
}
