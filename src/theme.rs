use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub background: String,
    pub title_color: String,
    pub edge_color: String,
    pub edge_label_color: String,
    pub edge_label_background: String,
    pub legend_title_color: String,
    pub legend_text_color: String,
}

impl Theme {
    pub fn modern() -> Self {
        Self {
            font_family: "Inter, -apple-system, sans-serif".to_string(),
            background: "#FFFFFF".to_string(),
            title_color: "#1E293B".to_string(),
            edge_color: "#64748B".to_string(),
            edge_label_color: "#475569".to_string(),
            edge_label_background: "white".to_string(),
            legend_title_color: "#64748B".to_string(),
            legend_text_color: "#475569".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::modern()
    }
}
