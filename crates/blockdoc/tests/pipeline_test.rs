#![allow(clippy::unwrap_used, clippy::expect_used)]
//! End-to-end normalize → render → sanitize tests.

mod common;

use blockdoc::{
    Block, BlockDocument, BlockKind, Config, HtmlSanitizer, normalize, normalize_str, render, safe_html,
    safe_html_from_str,
};
use blockdoc_test_utils::{XSS_PAYLOADS, assert, test_document};
use serde_json::{Value, json};

use common::setup;

fn hostile_inputs() -> Vec<Value> {
    vec![
        Value::Null,
        json!(true),
        json!(17),
        json!("not json at all"),
        json!("{\"blocks\": [truncated"),
        json!([1, 2, 3]),
        json!({ "blocks": null }),
        json!({ "blocks": {} }),
        json!({ "blocks": [] }),
        json!({ "blocks": [null, 4, "x", []] }),
        json!({ "blocks": [{ "type": 5, "data": "nope" }] }),
        json!({ "time": "yesterday", "version": 2, "blocks": [{}] }),
        json!({ "blocks": [{ "type": "header", "data": { "level": "loud" } }] }),
        json!({ "blocks": [{ "type": "list", "data": { "items": "a,b" } }] }),
        json!({ "blocks": [{ "type": "image", "data": { "file": 3 } }] }),
    ]
}

#[test]
fn representative_documents_render_exactly() {
    setup();
    let cases = [
        (
            test_document().paragraph("Hello").build(),
            "<p>Hello</p>",
        ),
        (test_document().header("Title", 9).build(), "<h6>Title</h6>"),
        (
            test_document().list("ordered", &["a", "b"]).build(),
            "<ol><li>a</li><li>b</li></ol>",
        ),
        (json!({}), "<p></p>"),
    ];

    for (input, expected) in cases {
        assert_eq!(safe_html(&input), expected, "input: {input}");
    }
}

#[test]
fn normalization_is_total_and_never_empty() {
    setup();
    for input in hostile_inputs() {
        let doc = normalize(&input);
        assert!(!doc.blocks.is_empty(), "no blocks for {input}");
        assert!(doc.is_canonical(), "non-canonical result for {input}");
        assert!(!doc.format_version.is_empty());
        // Rendering hostile input must not panic either.
        let _ = safe_html(&input);
    }
}

#[test]
fn normalization_is_idempotent() {
    setup();
    let mut inputs = hostile_inputs();
    inputs.push(
        test_document()
            .with_time(1_700_000_000_000)
            .paragraph("p")
            .header("h", 0)
            .list("ordered", &["one"])
            .quote("q", "c")
            .image("https://example.com/a.png", "cap")
            .with_block(json!({ "id": "w1", "type": "custom-widget", "data": { "x": 1 } }))
            .build(),
    );

    for input in inputs {
        let once = normalize(&input);
        let twice = normalize(&once.to_wire());
        assert_eq!(once, twice, "input: {input}");
    }
}

#[test]
fn text_and_value_entry_points_agree() {
    setup();
    let wire = test_document()
        .with_time(42)
        .header("Same", 3)
        .paragraph("either way")
        .build();
    let text = serde_json::to_string(&wire).unwrap();

    assert_eq!(normalize_str(&text), normalize(&wire));
    assert_eq!(normalize(&Value::String(text.clone())), normalize(&wire));
    assert_eq!(safe_html_from_str(&text), safe_html(&wire));
}

#[test]
fn unknown_kinds_survive_and_render_nothing() {
    setup();
    let input = test_document()
        .paragraph("before")
        .with_block(json!({ "type": "custom-widget", "data": { "x": 1 } }))
        .paragraph("after")
        .build();

    let doc = normalize(&input);
    assert_eq!(doc.blocks.len(), 3);
    match &doc.blocks[1].kind {
        BlockKind::Other { kind, data } => {
            assert_eq!(kind, "custom-widget");
            assert_eq!(data.get("x"), Some(&json!(1)));
        }
        other => panic!("expected unknown kind to be preserved, got {other:?}"),
    }
    assert::json_eq(
        &doc.to_wire()["blocks"][1],
        &json!({ "type": "custom-widget", "data": { "x": 1 } }),
    );
    assert_eq!(safe_html(&input), "<p>before</p><p>after</p>");
}

#[test]
fn block_ids_are_kept_through_the_pipeline() {
    setup();
    let input = json!({
        "blocks": [{ "id": "abc123", "type": "paragraph", "data": { "text": "x" } }]
    });
    let doc = normalize(&input);
    assert_eq!(doc.blocks[0].id.as_deref(), Some("abc123"));
    assert_eq!(doc.to_wire()["blocks"][0]["id"], "abc123");
}

#[test]
fn hostile_payloads_never_survive_in_any_text_field() {
    setup();
    for &payload in XSS_PAYLOADS {
        let input = test_document()
            .paragraph(payload)
            .header(payload, 2)
            .list("unordered", &[payload, "safe"])
            .quote(payload, payload)
            .image("https://example.com/a.png", payload)
            .build();

        let html = safe_html(&input);
        assert::no_script_vectors(&html);
    }
}

#[test]
fn script_markers_typed_as_text_are_defused() {
    setup();
    let html = safe_html(
        &test_document()
            .paragraph("click javascript:alert(1) or onerror=alert(1)")
            .build(),
    );
    assert_eq!(
        html,
        "<p>click javascript&#58;alert(1) or onerror&#61;alert(1)</p>"
    );
    assert::no_script_vectors(&html);
}

#[test]
fn script_image_url_is_not_rendered() {
    setup();
    for url in ["javascript:alert(1)", "JaVaScRiPt:alert(1)", "data:text/html,<b>", "x\" onerror=\"alert(1)"] {
        let html = safe_html(&test_document().image(url, "cap").build());
        assert_eq!(html, "", "url: {url}");
    }
}

#[test]
fn safe_image_renders_as_figure() {
    setup();
    let html = safe_html(&test_document().image("https://example.com/a.png", "A <b>cat</b>").build());

    assert::contains(&html, "<figure>");
    assert::contains(&html, "src=\"https://example.com/a.png\"");
    assert::contains(&html, "alt=\"A cat\"");
    assert::contains(&html, "<figcaption>A <b>cat</b></figcaption>");
}

#[test]
fn relative_and_spaced_image_urls_still_render() {
    setup();
    for (url, src) in [
        ("uploads/a.png", "src=\"uploads/a.png\""),
        ("//cdn.example.com/a.png", "src=\"//cdn.example.com/a.png\""),
        (
            "https://example.com/my photo.jpg",
            "src=\"https://example.com/my%20photo.jpg\"",
        ),
    ] {
        let html = safe_html(&test_document().image(url, "cap").build());
        assert::contains(&html, "<figure>");
        assert::contains(&html, src);
    }
}

#[test]
fn image_without_caption_gets_fallback_alt() {
    setup();
    let html = safe_html(&test_document().image("/uploads/a.png", "").build());
    assert::contains(&html, "alt=\"image\"");
    assert::not_contains(&html, "<figcaption>");
}

#[test]
fn quote_renders_caption_only_when_present() {
    setup();
    let with_caption = safe_html(&test_document().quote("Words", "Someone").build());
    assert_eq!(
        with_caption,
        "<blockquote><p>Words</p><cite>Someone</cite></blockquote>"
    );

    let without = safe_html(&test_document().quote("Words", "").build());
    assert::not_contains(&without, "<cite>");
}

#[test]
fn render_of_hand_built_document_renormalizes() {
    setup();
    let doc = BlockDocument::new(vec![Block::new(BlockKind::Heading {
        text: "Loud".to_string(),
        level: 12,
    })]);
    assert!(!doc.is_canonical());
    assert_eq!(render(&doc), "<h6>Loud</h6>");
}

#[test]
fn configured_sanitizer_rewrites_links() {
    setup();
    let html = safe_html(
        &test_document()
            .paragraph("see <a href=\"https://example.com\">here</a> or <a href=\"ftp://x\">there</a>")
            .build(),
    );
    assert::contains(&html, "href=\"https://example.com\"");
    assert::contains(&html, "rel=\"noopener noreferrer\"");
    assert::not_contains(&html, "ftp://");

    let config = Config {
        url_schemes: vec!["https".to_string()],
        link_rel: None,
        ..Config::default()
    };
    let strict = HtmlSanitizer::from_config(&config);
    assert::not_contains(&strict.clean("<a href=\"mailto:a@b.c\">m</a>"), "mailto:");
}

#[test]
fn serde_round_trips_through_wire_shape() {
    setup();
    let input = test_document()
        .with_time(1_700_000_000_000)
        .with_version("2.28.0")
        .header("T", 1)
        .list("ordered", &["a"])
        .build();
    let doc = normalize(&input);

    let value = serde_json::to_value(&doc).unwrap();
    assert_eq!(value, doc.to_wire());
    assert_eq!(value["version"], "2.28.0");
    assert_eq!(value["time"], 1_700_000_000_000_i64);

    let back: BlockDocument = serde_json::from_value(value).unwrap();
    assert_eq!(back, doc);

    // Deserialization is as forgiving as normalization.
    let junk: BlockDocument = serde_json::from_str("[1, 2]").unwrap();
    assert_eq!(junk.blocks, vec![Block::paragraph("")]);
}
