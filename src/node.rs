//! Design Node Tree - Read-only input from the design tool

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Node type the design tool uses for text layers
pub const TEXT_NODE_TYPE: &str = "TEXT";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DesignNode {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default)]
    pub children: Vec<DesignNode>,
    #[serde(default)]
    pub fills: Vec<FillEntry>,
    #[serde(default)]
    pub component_properties: BTreeMap<String, PropertyDescriptor>,
    #[serde(default)]
    pub corner_radius: Option<f64>,
    #[serde(default)]
    pub padding_top: Option<f64>,
    #[serde(default)]
    pub padding_right: Option<f64>,
    #[serde(default)]
    pub padding_bottom: Option<f64>,
    #[serde(default)]
    pub padding_left: Option<f64>,
    #[serde(default)]
    pub font_size: Option<f64>,
    #[serde(default)]
    pub font_weight: Option<f64>,
}

impl DesignNode {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            node_type: "FRAME".to_string(),
            ..Self::default()
        }
    }

    pub fn with_child(mut self, child: DesignNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_fill(mut self, r: f64, g: f64, b: f64) -> Self {
        self.fills.push(FillEntry::solid(r, g, b));
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, descriptor: PropertyDescriptor) -> Self {
        self.component_properties.insert(key.into(), descriptor);
        self
    }

    pub fn is_text(&self) -> bool {
        self.node_type == TEXT_NODE_TYPE
    }

    /// Pre-order depth-first search, root included. First child wins.
    pub fn find_first<'a, F>(&'a self, predicate: &F) -> Option<&'a DesignNode>
    where
        F: Fn(&DesignNode) -> bool,
    {
        if predicate(self) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_first(predicate))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillEntry {
    #[serde(rename = "type")]
    pub fill_type: String,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub color: Option<Rgb>,
}

impl FillEntry {
    pub fn solid(r: f64, g: f64, b: f64) -> Self {
        Self {
            fill_type: "SOLID".to_string(),
            visible: None,
            color: Some(Rgb { r, g, b }),
        }
    }

    /// Solid, not explicitly hidden, and carrying a color
    pub fn is_usable_solid(&self) -> bool {
        self.fill_type == "SOLID" && self.visible != Some(false) && self.color.is_some()
    }
}

/// Channels in [0, 1]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    #[serde(rename = "type", default)]
    pub property_type: String,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub variant_options: Vec<String>,
}

impl PropertyDescriptor {
    pub fn variant(value: &str) -> Self {
        Self {
            property_type: "VARIANT".to_string(),
            value: Some(serde_json::Value::String(value.to_string())),
            variant_options: vec![],
        }
    }
}
