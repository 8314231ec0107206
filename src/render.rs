use crate::config::{Config, RenderConfig};
use crate::graph::{Edge, Graph, Node, Point};
use crate::palette::{self, Category};
use crate::text::wrap_text;
use crate::theme::Theme;
use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;
use regex::Regex;

static MARKER_ID_STRIP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_-]").unwrap());

const NODE_LABEL_PADDING: f32 = 16.0;
const SUBTITLE_PADDING: f32 = 12.0;
const LEGEND_X: f32 = 10.0;

struct Context<'a> {
    theme: &'a Theme,
    config: &'a RenderConfig,
    markers: IndexMap<String, String>,
}

impl Context<'_> {
    fn marker_for(&self, color: &str) -> &str {
        self.markers.get(color).map(String::as_str).unwrap_or_default()
    }

    fn edge_color<'e>(&'e self, edge: &'e Edge) -> &'e str {
        edge.edge_color.as_deref().unwrap_or(&self.theme.edge_color)
    }
}

/// Renders a laid-out graph. Node and edge coordinates are relative to the
/// enclosing container; the renderer accumulates offsets while descending.
pub fn render_svg(graph: &Graph, config: &Config) -> String {
    let theme = &config.theme;
    let cfg = &config.render;
    let (content_w, content_h) = graph.bounds();
    let show_legend = graph.show_legend();

    let total_w = content_w + cfg.margin * 2.0;
    let legend_pad = if show_legend { cfg.legend_height } else { 0.0 };
    let total_h = content_h + cfg.margin * 2.0 + legend_pad;

    let ctx = Context {
        theme,
        config: cfg,
        markers: assign_marker_ids(collect_edge_colors(graph, &theme.edge_color)),
    };

    let mut svg = String::new();
    svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"{o} {o} {w} {h}\">\n",
        w = fmt_num(total_w),
        h = fmt_num(total_h),
        o = fmt_num(-cfg.margin),
    ));

    svg.push_str("<defs>\n");
    for (color, id) in &ctx.markers {
        svg.push_str(&format!(
            "  <marker id=\"{id}\" markerWidth=\"8\" markerHeight=\"6\" refX=\"8\" refY=\"3\" orient=\"auto\">\n"
        ));
        svg.push_str(&format!(
            "    <polygon points=\"0 0, 8 3, 0 6\" fill=\"{}\"/>\n",
            escape_xml(color)
        ));
        svg.push_str("  </marker>\n");
    }
    svg.push_str("</defs>\n");

    svg.push_str(&format!(
        "<rect x=\"{o}\" y=\"{o}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"12\"/>\n",
        fmt_num(total_w),
        fmt_num(total_h),
        escape_xml(&theme.background),
        o = fmt_num(-cfg.margin),
    ));

    if let Some(title) = graph.title.as_deref() {
        let title_y = -cfg.margin / 2.0 + cfg.title_font_size / 3.0;
        svg.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"700\" fill=\"{}\">{}</text>\n",
            fmt_num(content_w / 2.0),
            fmt_num(title_y),
            escape_xml(&theme.font_family),
            fmt_num(cfg.title_font_size),
            escape_xml(&theme.title_color),
            escape_xml(title)
        ));
    }

    let origin = Point::default();
    for node in &graph.children {
        render_node(&mut svg, node, origin, &ctx);
    }
    render_edges(&mut svg, &graph.edges, &graph.children, origin, &ctx);

    if show_legend {
        let used = used_categories(graph);
        render_legend(&mut svg, &used, content_h, &ctx);
    }

    svg.push_str("</svg>\n");
    svg
}

fn render_node(svg: &mut String, node: &Node, offset: Point, ctx: &Context<'_>) {
    let cfg = ctx.config;
    let font_family = escape_xml(&ctx.theme.font_family);
    let x = offset.x + node.x.unwrap_or(0.0);
    let y = offset.y + node.y.unwrap_or(0.0);
    let w = node.width.unwrap_or(cfg.default_node_width);
    let h = node.height.unwrap_or(cfg.default_node_height);

    if node.is_container() {
        let swatch = palette::container_swatch(node.container_color.as_ref());
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"8\" ry=\"8\" fill=\"{}\" stroke=\"{}\" stroke-width=\"2\" stroke-dasharray=\"6,3\"/>\n",
            fmt_num(x),
            fmt_num(y),
            fmt_num(w),
            fmt_num(h),
            swatch.fill,
            swatch.stroke
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-family=\"{font_family}\" font-size=\"{}\" font-weight=\"700\" fill=\"{}\" letter-spacing=\"0.05em\">{}</text>\n",
            fmt_num(x + 10.0),
            fmt_num(y + 20.0),
            fmt_num(cfg.container_font_size),
            swatch.text,
            escape_xml(&node.display_label())
        ));
        let child_offset = Point { x, y };
        for child in &node.children {
            render_node(svg, child, child_offset, ctx);
        }
        return;
    }

    let swatch = palette::node_swatch(node.color.as_ref());
    svg.push_str(&format!(
        "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"6\" ry=\"6\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.5\"/>\n",
        fmt_num(x),
        fmt_num(y),
        fmt_num(w),
        fmt_num(h),
        swatch.fill,
        swatch.stroke
    ));

    let font_size = node.font_size.unwrap_or(cfg.font_size);
    let lines = wrap_text(
        &node.display_label(),
        w - NODE_LABEL_PADDING,
        font_size,
        cfg.char_width_ratio,
    );
    let line_height = font_size + 3.0;
    let text_height = lines.len() as f32 * line_height;
    let start_y = y + (h - text_height) / 2.0 + font_size;
    let center_x = x + w / 2.0;

    for (idx, line) in lines.iter().enumerate() {
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-family=\"{font_family}\" font-size=\"{}\" font-weight=\"600\" fill=\"{}\">{}</text>\n",
            fmt_num(center_x),
            fmt_num(start_y + idx as f32 * line_height),
            fmt_num(font_size),
            swatch.text,
            escape_xml(line)
        ));
    }

    if let Some(subtitle) = node.subtitle.as_deref().filter(|s| !s.is_empty()) {
        let sub_lines = wrap_text(
            subtitle,
            w - SUBTITLE_PADDING,
            cfg.subtitle_font_size,
            cfg.char_width_ratio,
        );
        let sub_start = start_y + lines.len() as f32 * line_height;
        for (idx, line) in sub_lines.iter().enumerate() {
            svg.push_str(&format!(
                "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-family=\"{font_family}\" font-size=\"{}\" fill=\"{}\" opacity=\"0.8\">{}</text>\n",
                fmt_num(center_x),
                fmt_num(sub_start + idx as f32 * cfg.subtitle_line_height),
                fmt_num(cfg.subtitle_font_size),
                swatch.text,
                escape_xml(line)
            ));
        }
    }
}

/// Renders `edges` (owned by the container at `offset`), then descends into
/// every node's own edge list.
fn render_edges(svg: &mut String, edges: &[Edge], nodes: &[Node], offset: Point, ctx: &Context<'_>) {
    for edge in edges {
        render_edge(svg, edge, offset, ctx);
    }
    for node in nodes {
        let node_offset = Point {
            x: offset.x + node.x.unwrap_or(0.0),
            y: offset.y + node.y.unwrap_or(0.0),
        };
        render_edges(svg, &node.edges, &node.children, node_offset, ctx);
    }
}

fn render_edge(svg: &mut String, edge: &Edge, offset: Point, ctx: &Context<'_>) {
    if edge.sections.is_empty() {
        return;
    }
    let color = ctx.edge_color(edge);
    let stroke_width = edge.stroke_width.unwrap_or(ctx.config.edge_stroke_width);
    let dash = if edge.dashed {
        " stroke-dasharray=\"5,3\""
    } else {
        ""
    };

    for section in &edge.sections {
        let points: Vec<Point> = section
            .points()
            .map(|p| Point {
                x: p.x + offset.x,
                y: p.y + offset.y,
            })
            .collect();
        svg.push_str(&format!(
            "  <path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" marker-end=\"url(#{})\"{dash}/>\n",
            points_to_path(&points),
            escape_xml(color),
            fmt_num(stroke_width),
            ctx.marker_for(color)
        ));
    }

    for label in &edge.labels {
        let (Some(text), Some(lx)) = (label.text.as_deref(), label.x) else {
            continue;
        };
        let lx = lx + offset.x;
        let ly = label.y.unwrap_or(0.0) + offset.y;
        let lw = label.width.unwrap_or(0.0);
        let lh = label.height.unwrap_or(0.0);
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"3\" fill=\"{}\" opacity=\"0.9\"/>\n",
            fmt_num(lx - 2.0),
            fmt_num(ly - 1.0),
            fmt_num(lw + 4.0),
            fmt_num(lh + 2.0),
            escape_xml(&ctx.theme.edge_label_background)
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>\n",
            fmt_num(lx + lw / 2.0),
            fmt_num(ly + 12.0),
            escape_xml(&ctx.theme.font_family),
            fmt_num(ctx.config.edge_label_font_size),
            escape_xml(&ctx.theme.edge_label_color),
            escape_xml(text)
        ));
    }
}

fn render_legend(svg: &mut String, used: &[Category], content_h: f32, ctx: &Context<'_>) {
    if used.is_empty() {
        return;
    }
    let cfg = ctx.config;
    let font_family = escape_xml(&ctx.theme.font_family);
    let legend_y = content_h + 15.0;
    let cols = used.len().min(cfg.legend_columns.max(1));
    let swatch_size = cfg.legend_swatch_size;

    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" font-family=\"{font_family}\" font-size=\"11\" font-weight=\"700\" fill=\"{}\">LEGEND</text>\n",
        fmt_num(LEGEND_X),
        fmt_num(legend_y),
        escape_xml(&ctx.theme.legend_title_color)
    ));
    for (idx, category) in used.iter().enumerate() {
        let col = idx % cols;
        let row = idx / cols;
        let x = LEGEND_X + col as f32 * cfg.legend_column_width;
        let y = legend_y + 8.0 + row as f32 * cfg.legend_row_height;
        let swatch = category.swatch();
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{s}\" height=\"{s}\" rx=\"2\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>\n",
            fmt_num(x),
            fmt_num(y),
            swatch.fill,
            swatch.stroke,
            s = fmt_num(swatch_size),
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-family=\"{font_family}\" font-size=\"10\" fill=\"{}\">{}</text>\n",
            fmt_num(x + swatch_size + 5.0),
            fmt_num(y + swatch_size - 1.0),
            escape_xml(&ctx.theme.legend_text_color),
            escape_xml(category.legend_label())
        ));
    }
}

/// Distinct edge colors across the whole tree, in first-use order.
pub fn collect_edge_colors(graph: &Graph, default_color: &str) -> IndexSet<String> {
    fn walk(edges: &[Edge], nodes: &[Node], default: &str, out: &mut IndexSet<String>) {
        for edge in edges {
            let color = edge.edge_color.as_deref().unwrap_or(default);
            if !out.contains(color) {
                out.insert(color.to_string());
            }
        }
        for node in nodes {
            walk(&node.edges, &node.children, default, out);
        }
    }
    let mut colors = IndexSet::new();
    walk(&graph.edges, &graph.children, default_color, &mut colors);
    colors
}

/// Semantic categories named by leaf nodes, in first-use order.
pub fn used_categories(graph: &Graph) -> Vec<Category> {
    fn walk(nodes: &[Node], out: &mut IndexSet<Category>) {
        for node in nodes {
            if node.is_container() {
                walk(&node.children, out);
            } else if let Some(category) = node.color.as_ref().and_then(|c| c.legend_category()) {
                out.insert(category);
            }
        }
    }
    let mut used = IndexSet::new();
    walk(&graph.children, &mut used);
    used.into_iter().collect()
}

pub fn marker_id(color: &str) -> String {
    format!("arrowhead-{}", MARKER_ID_STRIP.replace_all(color, ""))
}

/// One marker id per color. Colors that sanitize to an id already taken get
/// a `-2`, `-3`, ... suffix.
fn assign_marker_ids(colors: IndexSet<String>) -> IndexMap<String, String> {
    let mut taken = IndexSet::new();
    colors
        .into_iter()
        .map(|color| {
            let base = marker_id(&color);
            let mut id = base.clone();
            let mut n = 2;
            while !taken.insert(id.clone()) {
                id = format!("{base}-{n}");
                n += 1;
            }
            (color, id)
        })
        .collect()
}

fn points_to_path(points: &[Point]) -> String {
    let mut d = String::new();
    for (idx, point) in points.iter().enumerate() {
        if idx > 0 {
            d.push(' ');
        }
        let cmd = if idx == 0 { 'M' } else { 'L' };
        d.push_str(&format!("{cmd} {} {}", fmt_num(point.x), fmt_num(point.y)));
    }
    d
}

/// Two decimals at most, no trailing zeros.
fn fmt_num(value: f32) -> String {
    let rounded = (value as f64 * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{rounded}")
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
