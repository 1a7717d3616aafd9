//! Conversion of complete templates.

use crate::common::read_fixture;
use insta::assert_snapshot;
use tmpl_babel::dialect::{convert, convert_with_report, Rule};

#[test]
fn converts_policy_report_template() {
    let source = read_fixture("policy_report.html");
    let expected = read_fixture("policy_report.django.html");
    assert_eq!(convert(&source), expected);
}

#[test]
fn reports_rewrites_in_policy_report_template() {
    let source = read_fixture("policy_report.html");
    let (_, report) = convert_with_report(&source);

    assert_eq!(report.count(Rule::DefaultFilter), 5);
    assert_eq!(report.count(Rule::LoopIndex0), 1);
    assert_eq!(report.count(Rule::LoopIndex), 1);
    assert_eq!(report.count(Rule::LoopFirst), 1);
}

#[test]
fn converted_template_has_no_jinja_leftovers() {
    let converted = convert(&read_fixture("policy_report.html"));
    assert!(!converted.contains("|default("));
    assert!(!converted.contains("{{ loop."));
    assert!(!converted.contains("if loop."));
}

#[test]
fn snapshot_of_loop_row() {
    let row = r#"<tr class="{% if loop.first %}first{% endif %}"><td>{{ loop.index }}/{{ loop.index0 }}</td><td>{{ c.limit|default("-") }}</td></tr>"#;
    assert_snapshot!(
        convert(row),
        @r#"<tr class="{% if forloop.first %}first{% endif %}"><td>{{ forloop.counter }}/{{ forloop.counter0 }}</td><td>{{ c.limit|default:"-" }}</td></tr>"#
    );
}

#[test]
fn patterns_inside_comments_are_still_rewritten() {
    assert_eq!(
        convert("{# loop.index #}"),
        "{# forloop.counter #}"
    );
}
