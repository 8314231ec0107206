//! ELK JSON graph model.
//!
//! Fields the renderer does not read (`layoutOptions`, ports, ...) are kept in
//! `extra` so the graph can be handed to the layout engine unmodified.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::borrow::Cow;
use std::fmt;

use crate::error::Result;
use crate::palette::ColorKey;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ElkId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<Edge>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: ElkId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_color: Option<ColorKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<Edge>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ElkId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<ElkId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<ElkId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_color: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dashed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<Section>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Graph element identifier. ELK accepts strings and numbers alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElkId {
    Text(String),
    Number(Number),
}

impl Default for ElkId {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl fmt::Display for ElkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

impl From<&str> for ElkId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Label of a node or an edge; the engine adds the position and box size.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Label {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub start_point: Point,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bend_points: Vec<Point>,
    pub end_point: Point,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Section {
    /// Start point, bend points and end point in route order.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        std::iter::once(self.start_point)
            .chain(self.bend_points.iter().copied())
            .chain(std::iter::once(self.end_point))
    }
}

pub fn load_graph(input: &str) -> Result<Graph> {
    let graph: Graph = serde_json::from_str(input)?;
    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "loaded graph"
    );
    Ok(graph)
}

impl Graph {
    pub fn show_legend(&self) -> bool {
        self.legend != Some(false)
    }

    /// Engine-reported bounding box, or the extent of the top-level nodes
    /// when the graph carries no size of its own.
    pub fn bounds(&self) -> (f32, f32) {
        let (extent_w, extent_h) = self.children.iter().fold((0.0f32, 0.0f32), |(w, h), n| {
            (
                w.max(n.x.unwrap_or(0.0) + n.width.unwrap_or(0.0)),
                h.max(n.y.unwrap_or(0.0) + n.height.unwrap_or(0.0)),
            )
        });
        (
            self.width.unwrap_or(extent_w),
            self.height.unwrap_or(extent_h),
        )
    }

    pub fn node_count(&self) -> usize {
        self.children.iter().map(Node::subtree_size).sum()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len() + self.children.iter().map(Node::nested_edge_count).sum::<usize>()
    }
}

impl Node {
    pub fn is_container(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn display_label(&self) -> Cow<'_, str> {
        let text = self
            .label
            .as_deref()
            .or_else(|| self.labels.first().and_then(|l| l.text.as_deref()));
        match (text, &self.id) {
            (Some(text), _) => Cow::Borrowed(text),
            (None, ElkId::Text(id)) => Cow::Borrowed(id),
            (None, id) => Cow::Owned(id.to_string()),
        }
    }

    fn subtree_size(&self) -> usize {
        1 + self.children.iter().map(Node::subtree_size).sum::<usize>()
    }

    fn nested_edge_count(&self) -> usize {
        self.edges.len() + self.children.iter().map(Node::nested_edge_count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Category;

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(
            load_graph("{ not json"),
            Err(crate::error::Error::Parse(_))
        ));
        assert!(load_graph("[1, 2]").is_err());
    }

    #[test]
    fn tolerates_missing_optional_fields() {
        let graph = load_graph(r#"{"children":[{"id":"a"}]}"#).unwrap();
        assert!(graph.show_legend());
        assert!(graph.edges.is_empty());
        let node = &graph.children[0];
        assert_eq!(node.display_label(), "a");
        assert!(node.color.is_none());
        assert!(!node.is_container());
    }

    #[test]
    fn resolves_color_keys_on_load() {
        let graph =
            load_graph(r#"{"children":[{"id":"a","color":"provider"},{"id":"b","color":"??"}]}"#)
                .unwrap();
        let a = graph.children[0].color.as_ref().unwrap();
        assert_eq!(a.category(), Category::External);
        let b = graph.children[1].color.as_ref().unwrap();
        assert_eq!(b.category(), Category::Neutral);
    }

    #[test]
    fn label_falls_back_to_elk_labels() {
        let graph = load_graph(r#"{"children":[{"id":"n1","labels":[{"text":"First"}]}]}"#)
            .unwrap();
        assert_eq!(graph.children[0].display_label(), "First");
    }

    #[test]
    fn layout_options_pass_through() {
        let input = r##"{"id":"root","layoutOptions":{"elk.algorithm":"layered"},
            "children":[{"id":"a","ports":[{"id":"p"}]}],
            "edges":[{"id":"e","sources":["a"],"targets":["a"],"edgeColor":"#F00"}]}"##;
        let graph = load_graph(input).unwrap();
        let value = serde_json::to_value(&graph).unwrap();
        assert_eq!(value["layoutOptions"]["elk.algorithm"], "layered");
        assert_eq!(value["children"][0]["ports"][0]["id"], "p");
        assert_eq!(value["edges"][0]["edgeColor"], "#F00");
        assert!(value["children"][0].get("x").is_none());
        assert!(value["edges"][0].get("dashed").is_none());
    }

    #[test]
    fn numeric_ids_are_accepted() {
        let graph = load_graph(
            r#"{"children":[{"id":1,"width":80,"height":30},{"id":"two"}],
                "edges":[{"id":7,"sources":[1],"targets":["two"]}]}"#,
        )
        .unwrap();
        assert_eq!(graph.children[0].display_label(), "1");
        assert_eq!(graph.children[1].display_label(), "two");
        let value = serde_json::to_value(&graph).unwrap();
        assert_eq!(value["children"][0]["id"], 1);
        assert_eq!(value["edges"][0]["id"], 7);
        assert_eq!(value["edges"][0]["sources"][0], 1);
        assert_eq!(value["edges"][0]["targets"][0], "two");
    }

    #[test]
    fn edges_without_ids_stay_without_ids() {
        let graph = load_graph(
            r#"{"children":[{"id":"a"},{"id":"b"}],
                "edges":[{"sources":["a"],"targets":["b"]},{"sources":["b"],"targets":["a"]}]}"#,
        )
        .unwrap();
        assert!(graph.edges.iter().all(|e| e.id.is_none()));
        let value = serde_json::to_value(&graph).unwrap();
        for edge in value["edges"].as_array().unwrap() {
            assert!(edge.get("id").is_none());
        }
    }

    #[test]
    fn bounds_fall_back_to_node_extent() {
        let graph = load_graph(
            r#"{"children":[{"id":"a","x":0,"y":0,"width":100,"height":40},
                {"id":"b","x":150,"y":60,"width":50,"height":30}]}"#,
        )
        .unwrap();
        assert_eq!(graph.bounds(), (200.0, 90.0));

        let sized = load_graph(r#"{"width":500,"height":300,"children":[]}"#).unwrap();
        assert_eq!(sized.bounds(), (500.0, 300.0));
    }

    #[test]
    fn counts_nested_nodes_and_edges() {
        let graph = load_graph(
            r#"{"children":[{"id":"g","children":[{"id":"a"},{"id":"b"}],
                "edges":[{"id":"e1","sources":["a"],"targets":["b"]}]}],
                "edges":[{"id":"e0"}]}"#,
        )
        .unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }
}
