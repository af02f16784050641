use mdq_engine::MarkdownQuery;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::Value;

const DOC: &str = "\
# Title

Intro paragraph with context.

| Name | Role |
| ---- | ---- |
| Ada | Engineer |
| Grace | Admiral |

## API

API description.

### Endpoints

- GET /users
- POST /users

## Settings

Settings description.

Second settings paragraph.
";

fn doc() -> MarkdownQuery {
    MarkdownQuery::new(DOC)
}

#[test]
fn depth_selector_returns_headings_in_document_order() {
    let q = doc().query("h2").unwrap();
    assert_eq!(q.count(), 2);
    let headings: Vec<String> = q.each().iter().map(|h| h.text()).collect();
    assert!(headings[0].starts_with("## API"));
    assert!(headings[1].starts_with("## Settings"));
}

#[test]
fn queries_are_deterministic() {
    let a = doc().query("section2 paragraph").unwrap().text();
    let b = doc().query("section2 paragraph").unwrap().text();
    assert_eq!(a, b);
}

#[test]
fn query_does_not_mutate_the_receiver() {
    let all = doc();
    let before = all.count();
    let narrowed = all.query("h3").unwrap();
    assert_eq!(all.count(), before);
    assert_eq!(narrowed.count(), 1);
}

#[test]
fn matched_text_is_verbatim_source() {
    let q = doc().query("h1").unwrap();
    let text = q.text();
    assert!(DOC.contains(&text));
    assert!(text.starts_with("# Title"));
    assert_eq!(q.get(), text);
}

#[test]
fn table_converts_to_header_keyed_rows() {
    let rows = doc().query("table[0]").unwrap().to_json();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["Name"], Value::String("Ada".into()));
    assert_eq!(rows[0]["Role"], Value::String("Engineer".into()));
    assert_eq!(rows[1]["Name"], Value::String("Grace".into()));
}

#[test]
fn short_table_rows_fill_missing_cells_with_empty_strings() {
    let md = "| A | B |\n| - | - |\n| only |\n";
    let rows = MarkdownQuery::new(md).query("table").unwrap().to_json();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["A"], Value::String("only".into()));
    assert_eq!(rows[0]["B"], Value::String("".into()));
}

#[test]
fn to_json_ignores_non_table_matches() {
    assert!(doc().query("paragraph").unwrap().to_json().is_empty());
}

#[test]
fn matcher_and_its_negation_partition_the_matches() {
    let all = doc().query("h2").unwrap().count();
    let hit = doc().query("h2(\"API\")").unwrap().count();
    let miss = doc().query("h2(!\"API\")").unwrap().count();
    assert_eq!(hit, 1);
    assert_eq!(hit + miss, all);
}

#[rstest]
#[case("h2(~\"Set\")", 1)]
#[case("h2(/api/)", 1)]
#[case("h2(/API/i)", 1)]
#[case("paragraph(~\"settings\")", 2)]
#[case("item(\"GET /users\")", 1)]
fn matcher_variants(#[case] selector: &str, #[case] expected: usize) {
    assert_eq!(doc().query(selector).unwrap().count(), expected);
}

#[test]
fn invalid_regex_matcher_is_an_error() {
    let err = doc().query("paragraph(/[unclosed/)").unwrap_err();
    assert_eq!(err.pattern, "[unclosed");
}

#[test]
fn section_scope_excludes_sibling_sections() {
    let api = doc().query("section2(\"API\")").unwrap().text();
    assert!(api.contains("API description."));
    assert!(api.contains("### Endpoints"));
    assert!(api.contains("GET /users"));
    assert!(!api.contains("Settings description."));
}

#[test]
fn section_chain_resolves_per_section() {
    let per_section = doc().query("section2 paragraph[0]").unwrap();
    assert_eq!(per_section.count(), 2);
    let texts: Vec<String> = per_section.each().iter().map(|p| p.text()).collect();
    assert!(texts[0].contains("API description."));
    assert!(texts[1].contains("Settings description."));
}

#[test]
fn requerying_a_section_still_finds_its_own_heading() {
    let section = doc().query("section2(\"API\")").unwrap();
    let heading = section.query("h2").unwrap();
    assert_eq!(heading.count(), 1);
    assert!(heading.text().starts_with("## API"));
}

#[rstest]
#[case("h2[0]", "## API")]
#[case("h2[-1]", "## Settings")]
#[case("item[1]", "- POST /users")]
fn index_positions(#[case] selector: &str, #[case] prefix: &str) {
    let q = doc().query(selector).unwrap();
    assert_eq!(q.count(), 1);
    assert!(q.text().starts_with(prefix));
}

#[test]
fn out_of_range_index_is_empty_not_an_error() {
    let q = doc().query("h2[9]").unwrap();
    assert!(q.is_empty());
    assert_eq!(q.text(), "");
}

#[test]
fn slice_positions_select_ranges() {
    assert_eq!(doc().query("heading[1:3]").unwrap().count(), 2);
    assert_eq!(doc().query("heading[:2]").unwrap().count(), 2);
    assert_eq!(doc().query("heading[-2:]").unwrap().count(), 2);
    assert!(doc().query("heading[3:1]").unwrap().is_empty());
}

#[test]
fn first_and_last_narrow_to_one_match() {
    let headings = doc().query("heading").unwrap();
    assert!(headings.first().text().starts_with("# Title"));
    assert!(headings.last().text().starts_with("## Settings"));
    let empty = doc().query("code").unwrap();
    assert!(empty.first().is_empty());
    assert!(empty.last().is_empty());
}

#[test]
fn each_splits_into_single_match_queries() {
    let parts = doc().query("h2").unwrap().each();
    assert_eq!(parts.len(), 2);
    for part in &parts {
        assert_eq!(part.count(), 1);
    }
}

#[test]
fn before_returns_everything_ahead_of_the_first_match() {
    let before = doc().query("h3").unwrap().first().before();
    let text = before.text();
    assert!(text.contains("# Title"));
    assert!(text.contains("Intro paragraph"));
    assert!(text.contains("| Ada | Engineer |"));
    assert!(text.contains("API description."));
    assert!(!text.contains("Endpoints"));
    assert!(!text.contains("GET /users"));
}

#[test]
fn after_returns_everything_past_the_last_match() {
    let after = doc().query("h3").unwrap().last().after();
    let text = after.text();
    assert!(text.contains("GET /users"));
    assert!(text.contains("Settings description."));
    assert!(!text.contains("API description."));
}

#[test]
fn before_and_after_on_empty_matches_are_empty() {
    let empty = doc().query("code").unwrap();
    assert!(empty.before().is_empty());
    assert!(empty.after().is_empty());
}

#[test]
fn replace_substitutes_matched_spans_in_place() {
    let out = doc().query("h2(\"Settings\")").unwrap().replace("## Config\n\n");
    assert!(out.contains("## Config"));
    assert!(!out.contains("## Settings"));
    assert!(out.contains("API description."), "other content survives");
}

#[test]
fn replace_preserves_unmatched_text_byte_for_byte() {
    let out = doc().query("paragraph(~\"Intro\")").unwrap().replace("");
    let expected = DOC.replace("Intro paragraph with context.\n\n", "");
    assert_eq!(out, expected);
}

#[test]
fn replace_skips_matches_nested_inside_earlier_matches() {
    let md = "## Parent\n\n### Child\n\nContent\n";
    let q = MarkdownQuery::new(md).query("section").unwrap();
    assert_eq!(q.count(), 2, "both sections match, child nested in parent");
    assert_eq!(q.replace("REPLACED\n"), "REPLACED\n");
}

#[test]
fn replace_with_no_matches_returns_the_source_unchanged() {
    assert_eq!(doc().query("code").unwrap().replace("x"), DOC);
}

#[test]
fn unknown_selector_words_are_skipped() {
    let strict = doc().query("h2").unwrap().count();
    let sloppy = doc().query("wibble h2 h9").unwrap().count();
    assert_eq!(sloppy, strict);
}

#[test]
fn empty_selector_matches_nothing() {
    assert!(doc().query("").unwrap().is_empty());
    assert!(doc().query("   ").unwrap().is_empty());
}

#[test]
fn empty_document_is_inert_everywhere() {
    let q = MarkdownQuery::new("");
    assert_eq!(q.count(), 0);
    assert_eq!(q.text(), "");
    let narrowed = q.query("heading[0]").unwrap();
    assert!(narrowed.is_empty());
    assert!(narrowed.to_json().is_empty());
    assert!(narrowed.before().is_empty());
    assert!(narrowed.after().is_empty());
    assert_eq!(narrowed.replace("x"), "");
}

#[test]
fn fresh_query_matches_every_top_level_token() {
    let q = doc();
    assert!(q.count() >= 9);
    assert_eq!(q.text(), DOC, "full match set reproduces the document");
}

#[test]
fn blockquote_and_rule_selectors() {
    let md = "> quoted words\n\n---\n\nafter\n";
    let q = MarkdownQuery::new(md);
    assert_eq!(q.query("blockquote").unwrap().count(), 1);
    assert_eq!(q.query("hr").unwrap().count(), 1);
    assert!(q.query("blockquote(~\"quoted\")").unwrap().count() == 1);
}

#[test]
fn code_selector_matches_fenced_blocks() {
    let md = "```sh\nls -la\n```\n";
    let q = MarkdownQuery::new(md).query("code(~\"ls\")").unwrap();
    assert_eq!(q.count(), 1);
    assert!(q.text().contains("```sh"));
}
