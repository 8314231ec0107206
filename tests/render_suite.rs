use std::path::{Path, PathBuf};

use elk_svg::{Config, PrelaidEngine, load_graph, render_json, render_svg};
use futures::executor::block_on;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn render_fixture(name: &str) -> String {
    let input = std::fs::read_to_string(fixture(name)).expect("fixture read failed");
    block_on(render_json(&input, &PrelaidEngine, &Config::default())).expect("render failed")
}

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.starts_with("<?xml"), "{fixture}: missing prolog");
    assert!(svg.contains("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.trim_end().ends_with("</svg>"), "{fixture}: missing </svg tag");
    assert_eq!(
        svg.matches("<marker ").count(),
        svg.matches("</marker>").count(),
        "{fixture}: unbalanced markers"
    );
}

#[test]
fn render_all_fixtures() {
    for name in ["basic.json", "nested.json"] {
        let svg = render_fixture(name);
        assert_valid_svg(&svg, name);
    }
}

#[test]
fn basic_fixture_matches_expected_canvas() {
    let svg = render_fixture("basic.json");
    assert!(svg.contains("width=\"180\" height=\"180\" viewBox=\"-40 -40 180 180\""));
    assert!(svg.contains("fill=\"#10B981\" stroke=\"#047857\""));
    assert!(svg.contains(">a</text>"));
    assert_eq!(svg.matches("<path").count(), 0);
}

#[test]
fn nested_fixture_accumulates_offsets() {
    let svg = render_fixture("nested.json");
    assert!(svg.contains("width=\"600\" height=\"360\""));
    assert!(svg.contains(">Checkout flow</text>"));

    // validate sits inside backend at (180, 12)
    assert!(svg.contains("<rect x=\"192\" y=\"52\" width=\"120\" height=\"60\""));
    assert!(svg.contains("d=\"M 132 110 L 160 110 L 160 82 L 192 82\""));
    assert!(svg.contains("d=\"M 312 77 L 368 77\""));
    assert!(svg.contains("d=\"M 428 102 L 428 142\""));
    assert!(svg.contains("stroke-width=\"2\" marker-end=\"url(#arrowhead-64748B)\""));
    assert!(svg.contains("<rect x=\"318\" y=\"61\" width=\"34\" height=\"16\""));
}

#[test]
fn nested_fixture_defines_one_marker_per_color() {
    let svg = render_fixture("nested.json");
    assert_eq!(svg.matches("<marker ").count(), 2);
    assert_eq!(svg.matches("id=\"arrowhead-64748B\"").count(), 1);
    assert_eq!(svg.matches("id=\"arrowhead-10B981\"").count(), 1);
}

#[test]
fn nested_fixture_legend_lists_semantic_colors_only() {
    let svg = render_fixture("nested.json");
    assert!(svg.contains(">LEGEND</text>"));
    for label in ["User action", "System action", "Positive outcome"] {
        assert!(svg.contains(&format!(">{label}</text>")), "{label} missing");
    }
    // stripe uses the legacy `provider` key
    assert!(!svg.contains("External service"));
}

#[test]
fn engine_input_keeps_unknown_fields() {
    let input = std::fs::read_to_string(fixture("nested.json")).unwrap();
    let graph = load_graph(&input).unwrap();
    let value = serde_json::to_value(&graph).unwrap();
    assert_eq!(value["layoutOptions"]["elk.direction"], "RIGHT");
    assert_eq!(value["children"][1]["edges"][0]["sections"][0]["id"], "s2");
}

#[test]
fn malformed_input_is_parse_error() {
    let input = std::fs::read_to_string(fixture("broken.json.txt")).unwrap();
    let err = block_on(render_json(&input, &PrelaidEngine, &Config::default())).unwrap_err();
    assert!(matches!(err, elk_svg::Error::Parse(_)));
}

#[test]
fn rendering_is_deterministic() {
    let input = std::fs::read_to_string(fixture("nested.json")).unwrap();
    let graph = load_graph(&input).unwrap();
    let config = Config::default();
    assert_eq!(render_svg(&graph, &config), render_svg(&graph, &config));
}
