//! Layout normalizer.
//!
//! Folds the raw auto-layout fields of one node (mode, axis alignment, wrap,
//! spacing, four paddings, sizing, overflow, positioning, bounding box) into
//! a single flexbox-flavoured `Layout` descriptor.
//!
//! The translation is a fixed table. Raw values outside the table produce no
//! field at all; there is no fallback.

use crate::raw::RawNode;
use serde::Serialize;

// ─── Descriptor ──────────────────────────────────────────────────────────

/// Main-axis distribution (`primaryAxisAlignItems`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum JustifyContent {
    FlexStart,
    Center,
    FlexEnd,
    SpaceBetween,
}

impl JustifyContent {
    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw {
            "MIN" => Some(Self::FlexStart),
            "CENTER" => Some(Self::Center),
            "MAX" => Some(Self::FlexEnd),
            "SPACE_BETWEEN" => Some(Self::SpaceBetween),
            _ => None,
        }
    }
}

/// Cross-axis alignment of children (`counterAxisAlignItems`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignItems {
    FlexStart,
    Center,
    FlexEnd,
    Baseline,
}

impl AlignItems {
    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw {
            "MIN" => Some(Self::FlexStart),
            "CENTER" => Some(Self::Center),
            "MAX" => Some(Self::FlexEnd),
            "BASELINE" => Some(Self::Baseline),
            _ => None,
        }
    }
}

/// Cross-axis alignment of the node inside its parent (`layoutAlign`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignSelf {
    Auto,
    FlexStart,
    Center,
    FlexEnd,
    Stretch,
}

impl AlignSelf {
    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw {
            "INHERIT" => Some(Self::Auto),
            "MIN" => Some(Self::FlexStart),
            "CENTER" => Some(Self::Center),
            "MAX" => Some(Self::FlexEnd),
            "STRETCH" => Some(Self::Stretch),
            _ => None,
        }
    }
}

/// Positioning scheme (`layoutPositioning`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    Relative,
    Absolute,
}

impl Position {
    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw {
            "AUTO" => Some(Self::Relative),
            "ABSOLUTE" => Some(Self::Absolute),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Sizing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical: Option<String>,
}

/// The unified layout of one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    /// Lower-cased layout mode (`"horizontal"`, `"vertical"`, …) or `"none"`.
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justify_content: Option<JustifyContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align_items: Option<AlignItems>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align_self: Option<AlignSelf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<String>,
    /// Copied from the absolute bounding box. These are canvas coordinates,
    /// not an offset from the parent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_relative_to_parent: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizing: Option<Sizing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overflow_scroll: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

// ─── Normalization ───────────────────────────────────────────────────────

/// Whether `node` has any field that would show up in a `Layout`.
/// Nodes without one get no layout descriptor at all.
pub fn has_layout_properties(node: &RawNode) -> bool {
    node.layout_mode.is_some()
        || node.primary_axis_align_items.is_some()
        || node.counter_axis_align_items.is_some()
        || node.layout_align.is_some()
        || node.layout_wrap.is_some()
        || node.item_spacing.is_some()
        || node.padding_top.is_some()
        || node.padding_right.is_some()
        || node.padding_bottom.is_some()
        || node.padding_left.is_some()
        || node.layout_sizing_horizontal.is_some()
        || node.layout_sizing_vertical.is_some()
        || node.layout_positioning.is_some()
        || node.layout_grow.is_some()
        || !node.overflow_direction.is_empty()
        || node.absolute_bounding_box.is_some()
}

/// Build the layout descriptor of `node`.
///
/// `parent` is the enclosing raw node, if any. It is threaded through the
/// walk for parent-relative geometry but not consulted yet.
pub fn build_layout(node: &RawNode, _parent: Option<&RawNode>) -> Layout {
    let mode = node
        .layout_mode
        .as_deref()
        .map_or_else(|| "none".to_string(), str::to_lowercase);

    let (location_relative_to_parent, dimensions) = match node.absolute_bounding_box {
        Some(bb) => (
            Some(Point { x: bb.x, y: bb.y }),
            Some(Dimensions {
                width: bb.width,
                height: bb.height,
            }),
        ),
        None => (None, None),
    };

    let sizing = (node.layout_sizing_horizontal.is_some() || node.layout_sizing_vertical.is_some())
        .then(|| Sizing {
            horizontal: node.layout_sizing_horizontal.as_deref().map(str::to_lowercase),
            vertical: node.layout_sizing_vertical.as_deref().map(str::to_lowercase),
        });

    let overflow_scroll: Option<Vec<String>> = (!node.overflow_direction.is_empty()).then(|| {
        node.overflow_direction
            .iter()
            .map(|dir| dir.to_lowercase())
            .collect()
    });

    Layout {
        mode,
        justify_content: node
            .primary_axis_align_items
            .as_deref()
            .and_then(JustifyContent::from_raw),
        align_items: node
            .counter_axis_align_items
            .as_deref()
            .and_then(AlignItems::from_raw),
        align_self: node.layout_align.as_deref().and_then(AlignSelf::from_raw),
        wrap: node.layout_wrap.as_deref().map(|w| w == "WRAP"),
        gap: node.item_spacing.map(px),
        location_relative_to_parent,
        dimensions,
        padding: padding(node),
        sizing,
        overflow_scroll,
        position: node.layout_positioning.as_deref().and_then(Position::from_raw),
    }
}

/// CSS shorthand for the four paddings, or `None` unless all four are set.
fn padding(node: &RawNode) -> Option<String> {
    let (top, right, bottom, left) = (
        node.padding_top?,
        node.padding_right?,
        node.padding_bottom?,
        node.padding_left?,
    );
    if top == right && right == bottom && bottom == left {
        Some(px(top))
    } else {
        Some(px4([top, right, bottom, left]))
    }
}

/// Format a length as whole pixels: `8.0` → `"8px"`.
pub fn px(value: f64) -> String {
    format!("{value:.0}px")
}

/// Four lengths as a space-separated CSS shorthand.
pub fn px4(values: [f64; 4]) -> String {
    let [a, b, c, d] = values;
    format!("{a:.0}px {b:.0}px {c:.0}px {d:.0}px")
}
