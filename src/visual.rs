//! Visual Decision Extractor
//!
//! Derives concrete style values from the authoritative design node. When the
//! node has no usable fill, a keyword palette keyed on the artifact name is used.

use serde::{Deserialize, Serialize};

use crate::node::{DesignNode, Rgb};

pub const DEFAULT_PADDING: &str = "12px 24px";
pub const DEFAULT_RADIUS: &str = "8px";
pub const DEFAULT_FONT_SIZE: &str = "16px";

const BLACK: &str = "#000000";
const WHITE: &str = "#FFFFFF";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VisualDecision {
    pub hex_color: String,
    pub contrast_color: String,
    pub border_radius: String,
    pub padding: String,
    pub font_size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    /// True when the color came from the design node
    pub authoritative: bool,
}

/// `{r,g,b}` in [0,1] to `#RRGGBB`
pub fn rgb_to_hex(color: Rgb) -> String {
    let channel = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("#{:02X}{:02X}{:02X}", channel(color.r), channel(color.g), channel(color.b))
}

/// Perceived luminance in [0,1]
pub fn luminance(color: Rgb) -> f64 {
    0.299 * color.r + 0.587 * color.g + 0.114 * color.b
}

/// Black on light fills, white otherwise. Exactly 0.5 is white.
pub fn contrast_color(color: Rgb) -> &'static str {
    if luminance(color) > 0.5 { BLACK } else { WHITE }
}

/// First usable solid fill, pre-order, root included
pub fn find_solid_fill(node: &DesignNode) -> Option<Rgb> {
    node.find_first(&|n| n.fills.iter().any(|f| f.is_usable_solid()))
        .and_then(|n| n.fills.iter().find(|f| f.is_usable_solid()))
        .and_then(|f| f.color)
}

/// Palette used when the design gives no color
pub fn fallback_palette(hint: &str) -> (&'static str, &'static str) {
    let hint = hint.to_lowercase();
    if hint.contains("danger") || hint.contains("delete") {
        ("#DC2626", WHITE)
    } else if hint.contains("success") || hint.contains("confirm") {
        ("#16A34A", WHITE)
    } else if hint.contains("warn") {
        ("#CA8A04", BLACK)
    } else if hint.contains("info") {
        ("#2563EB", WHITE)
    } else {
        ("#333333", WHITE)
    }
}

pub fn decide(node: Option<&DesignNode>, fallback_hint: &str) -> VisualDecision {
    let fill = node.and_then(find_solid_fill);
    let (hex_color, contrast, authoritative) = match fill {
        Some(rgb) => (rgb_to_hex(rgb), contrast_color(rgb).to_string(), true),
        None => {
            let (hex, contrast) = fallback_palette(fallback_hint);
            (hex.to_string(), contrast.to_string(), false)
        }
    };

    let border_radius = node
        .and_then(|n| n.corner_radius)
        .map(px)
        .unwrap_or_else(|| DEFAULT_RADIUS.to_string());

    let padding = node
        .and_then(padding_of)
        .unwrap_or_else(|| DEFAULT_PADDING.to_string());

    let text = node.and_then(|n| n.find_first(&|c| c.is_text()));
    let font_size = text
        .and_then(|t| t.font_size)
        .map(px)
        .unwrap_or_else(|| DEFAULT_FONT_SIZE.to_string());
    let font_weight = text.and_then(|t| t.font_weight).map(|w| format!("{}", w.round() as i64));

    let decision = VisualDecision {
        hex_color,
        contrast_color: contrast,
        border_radius,
        padding,
        font_size,
        font_weight,
        authoritative,
    };
    tracing::debug!(?decision, "visual decision");
    decision
}

fn padding_of(node: &DesignNode) -> Option<String> {
    let sides = [node.padding_top, node.padding_right, node.padding_bottom, node.padding_left]
        .map(|p| p.unwrap_or(0.0));
    if !sides.iter().any(|p| *p > 0.0) {
        return None;
    }
    Some(sides.map(px).join(" "))
}

fn px(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}px", value as i64)
    } else {
        format!("{}px", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(r: f64, g: f64, b: f64) -> Rgb {
        Rgb { r, g, b }
    }

    #[test]
    fn test_rgb_to_hex() {
        assert_eq!(rgb_to_hex(rgb(1.0, 0.0, 0.0)), "#FF0000");
        assert_eq!(rgb_to_hex(rgb(0.0, 0.5, 1.0)), "#0080FF");
        assert_eq!(rgb_to_hex(rgb(0.0, 0.0, 0.0)), "#000000");
    }

    #[test]
    fn test_contrast_boundaries() {
        assert_eq!(contrast_color(rgb(1.0, 0.0, 0.0)), "#FFFFFF");
        assert_eq!(contrast_color(rgb(1.0, 1.0, 1.0)), "#000000");
        assert_eq!(contrast_color(rgb(0.5, 0.5, 0.5)), "#FFFFFF");
    }

    #[test]
    fn test_deep_fill_search() {
        let mut hidden = DesignNode::new("hidden").with_fill(0.0, 1.0, 0.0);
        hidden.fills[0].visible = Some(false);
        let tree = DesignNode::new("root")
            .with_child(hidden)
            .with_child(DesignNode::new("deep").with_child(DesignNode::new("leaf").with_fill(0.0, 0.0, 1.0)))
            .with_child(DesignNode::new("later").with_fill(1.0, 0.0, 0.0));

        let decision = decide(Some(&tree), "danger");
        assert_eq!(decision.hex_color, "#0000FF");
        assert!(decision.authoritative);
    }

    #[test]
    fn test_layout_and_typography() {
        let mut node = DesignNode::new("app-button").with_fill(1.0, 1.0, 1.0);
        node.corner_radius = Some(4.0);
        node.padding_top = Some(8.0);
        node.padding_left = Some(16.5);
        let mut label = DesignNode::new("Label");
        label.node_type = "TEXT".to_string();
        label.font_size = Some(14.0);
        label.font_weight = Some(600.0);
        let node = node.with_child(label);

        let decision = decide(Some(&node), "");
        assert_eq!(decision.contrast_color, "#000000");
        assert_eq!(decision.border_radius, "4px");
        assert_eq!(decision.padding, "8px 0px 0px 16.5px");
        assert_eq!(decision.font_size, "14px");
        assert_eq!(decision.font_weight.as_deref(), Some("600"));
    }

    #[test]
    fn test_keyword_fallback() {
        assert_eq!(decide(None, "DeleteButton").hex_color, "#DC2626");
        assert_eq!(decide(None, "confirm-dialog").hex_color, "#16A34A");
        let warn = decide(None, "WarningBanner");
        assert_eq!((warn.hex_color.as_str(), warn.contrast_color.as_str()), ("#CA8A04", "#000000"));
        assert_eq!(decide(None, "InfoTip").hex_color, "#2563EB");

        let neutral = decide(None, "Avatar");
        assert_eq!(neutral.hex_color, "#333333");
        assert_eq!(neutral.padding, DEFAULT_PADDING);
        assert_eq!(neutral.border_radius, DEFAULT_RADIUS);
        assert_eq!(neutral.font_size, DEFAULT_FONT_SIZE);
        assert!(!neutral.authoritative);
    }
}
