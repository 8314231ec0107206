//! Semantic color categories for node fills.
//!
//! Every leaf node maps onto one of eight categories. Legacy keys from older
//! diagrams are accepted as aliases, and `container` names the default
//! style of container regions.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swatch {
    pub fill: &'static str,
    pub stroke: &'static str,
    pub text: &'static str,
}

pub const CONTAINER: Swatch = Swatch {
    fill: "#F3F4F6",
    stroke: "#D1D5DB",
    text: "#374151",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Action,
    External,
    Decision,
    User,
    Success,
    Negative,
    Neutral,
    Data,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Action,
        Category::External,
        Category::Decision,
        Category::User,
        Category::Success,
        Category::Negative,
        Category::Neutral,
        Category::Data,
    ];

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "action" => Some(Self::Action),
            "external" => Some(Self::External),
            "decision" => Some(Self::Decision),
            "user" => Some(Self::User),
            "success" => Some(Self::Success),
            "negative" => Some(Self::Negative),
            "neutral" => Some(Self::Neutral),
            "data" => Some(Self::Data),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Action => "action",
            Self::External => "external",
            Self::Decision => "decision",
            Self::User => "user",
            Self::Success => "success",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Data => "data",
        }
    }

    pub fn swatch(self) -> Swatch {
        let (fill, stroke, text) = match self {
            Self::Action => ("#3B82F6", "#1E40AF", "#FFFFFF"),
            Self::External => ("#14B8A6", "#0D9488", "#FFFFFF"),
            Self::Decision => ("#EC4899", "#BE185D", "#FFFFFF"),
            Self::User => ("#F97316", "#EA580C", "#FFFFFF"),
            Self::Success => ("#10B981", "#047857", "#FFFFFF"),
            Self::Negative => ("#EF4444", "#B91C1C", "#FFFFFF"),
            Self::Neutral => ("#6B7280", "#374151", "#FFFFFF"),
            Self::Data => ("#F59E0B", "#D97706", "#1F2937"),
        };
        Swatch { fill, stroke, text }
    }

    pub fn legend_label(self) -> &'static str {
        match self {
            Self::Action => "System action",
            Self::External => "External service",
            Self::Decision => "Decision point",
            Self::User => "User action",
            Self::Success => "Positive outcome",
            Self::Negative => "Negative outcome",
            Self::Neutral => "Neutral / info",
            Self::Data => "Data / artifact",
        }
    }
}

static LEGACY_ALIASES: [(&str, Category); 10] = [
    ("core", Category::Action),
    ("provider", Category::External),
    ("tool", Category::Success),
    ("output", Category::Data),
    ("context", Category::Decision),
    ("state", Category::User),
    ("highlight", Category::Negative),
    ("model", Category::Action),
    ("graph", Category::Action),
    ("step", Category::Action),
];

/// A `color` / `containerColor` value, resolved when the graph is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum ColorKey {
    Semantic(Category),
    Legacy(&'static str, Category),
    Container,
    Unknown(String),
}

impl ColorKey {
    pub fn resolve(key: &str) -> Self {
        if let Some(category) = Category::from_key(key) {
            return Self::Semantic(category);
        }
        if key == "container" {
            return Self::Container;
        }
        LEGACY_ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|&(alias, category)| Self::Legacy(alias, category))
            .unwrap_or_else(|| Self::Unknown(key.to_string()))
    }

    /// Category a leaf node is drawn with.
    pub fn category(&self) -> Category {
        match self {
            Self::Semantic(category) | Self::Legacy(_, category) => *category,
            Self::Container | Self::Unknown(_) => Category::Neutral,
        }
    }

    /// Only documented keys appear in the legend.
    pub fn legend_category(&self) -> Option<Category> {
        match self {
            Self::Semantic(category) => Some(*category),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Semantic(category) => category.key(),
            Self::Legacy(alias, _) => alias,
            Self::Container => "container",
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<String> for ColorKey {
    fn from(value: String) -> Self {
        Self::resolve(&value)
    }
}

impl<'de> Deserialize<'de> for ColorKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

impl From<ColorKey> for String {
    fn from(value: ColorKey) -> Self {
        value.as_str().to_string()
    }
}

pub fn node_swatch(color: Option<&ColorKey>) -> Swatch {
    color
        .map(ColorKey::category)
        .unwrap_or(Category::Neutral)
        .swatch()
}

pub fn container_swatch(color: Option<&ColorKey>) -> Swatch {
    match color {
        Some(ColorKey::Semantic(category)) | Some(ColorKey::Legacy(_, category)) => {
            category.swatch()
        }
        _ => CONTAINER,
    }
}

pub fn all_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = Category::ALL.iter().map(|c| c.key()).collect();
    keys.push("container");
    keys.extend(LEGACY_ALIASES.iter().map(|(alias, _)| *alias));
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_aliases_resolve_onto_categories() {
        assert_eq!(ColorKey::resolve("core").category(), Category::Action);
        assert_eq!(ColorKey::resolve("provider").category(), Category::External);
        assert_eq!(ColorKey::resolve("tool").category(), Category::Success);
        assert_eq!(ColorKey::resolve("highlight").category(), Category::Negative);
        assert_eq!(ColorKey::resolve("step").category(), Category::Action);
    }

    #[test]
    fn unknown_and_container_fall_back_to_neutral() {
        assert_eq!(ColorKey::resolve("chartreuse").category(), Category::Neutral);
        assert_eq!(ColorKey::resolve("container").category(), Category::Neutral);
        assert_eq!(node_swatch(None), Category::Neutral.swatch());
    }

    #[test]
    fn legend_only_lists_semantic_keys() {
        assert_eq!(
            ColorKey::resolve("success").legend_category(),
            Some(Category::Success)
        );
        assert_eq!(ColorKey::resolve("tool").legend_category(), None);
        assert_eq!(ColorKey::resolve("container").legend_category(), None);
    }

    #[test]
    fn raw_key_survives_serialization() {
        for raw in ["data", "model", "container", "whatever"] {
            let key: ColorKey = serde_json::from_value(serde_json::json!(raw)).unwrap();
            assert_eq!(serde_json::to_value(&key).unwrap(), serde_json::json!(raw));
        }
    }

    #[test]
    fn deserializes_from_borrowed_and_owned_input() {
        let owned = String::from(r#""provider""#);
        let key: ColorKey = serde_json::from_str(&owned).unwrap();
        drop(owned);
        assert_eq!(key, ColorKey::Legacy("provider", Category::External));
        assert_eq!(key.as_str(), "provider");
    }

    #[test]
    fn container_swatch_defaults() {
        assert_eq!(container_swatch(None), CONTAINER);
        assert_eq!(
            container_swatch(Some(&ColorKey::resolve("data"))),
            Category::Data.swatch()
        );
        assert_eq!(container_swatch(Some(&ColorKey::resolve("bogus"))), CONTAINER);
    }
}
