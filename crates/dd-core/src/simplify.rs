//! Node simplifier: raw design node → compact `SimplifiedNode`.
//!
//! Walks the raw tree pre-order. Hidden nodes are pruned together with their
//! whole subtree before any of it is looked at. Style fragments are moved
//! into the shared `StyleTable` and replaced by ids, auto-layout fields are
//! folded into one `Layout`, and vector nodes come out typed as images.
//!
//! Nothing here fails: a missing or unusable optional field is simply not
//! carried over.

use crate::config::DigestConfig;
use crate::layout::{build_layout, has_layout_properties, px, px4};
use crate::raw::RawNode;
use crate::style::{StyleCategory, StyleTable};
use serde::Serialize;
use serde_json::{Value, json};

/// Type tag given to vector nodes in the output.
pub const IMAGE_SVG_TYPE: &str = "IMAGE-SVG";

// ─── Output model ────────────────────────────────────────────────────────

/// One `componentProperties` entry flattened to strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentProperty {
    pub name: String,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// The compact form of one raw node.
///
/// Style fields hold ids into the build's style table, never payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fills: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strokes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effects: Option<String>,
    /// Only present when not fully opaque.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<String>,
    /// The node's `Layout`, serialized as compact JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub component_properties: Vec<ComponentProperty>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SimplifiedNode>,
}

impl SimplifiedNode {
    fn bare(node: &RawNode) -> Self {
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            kind: node.kind.clone(),
            text: None,
            text_style: None,
            fills: None,
            strokes: None,
            effects: None,
            opacity: None,
            border_radius: None,
            layout: None,
            component_id: None,
            component_properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Self::subtree_len).sum::<usize>()
    }

    /// Style-table ids referenced directly by this node.
    pub fn style_refs(&self) -> impl Iterator<Item = &str> {
        [&self.text_style, &self.fills, &self.strokes, &self.effects]
            .into_iter()
            .filter_map(|r| r.as_deref())
    }
}

// ─── Simplifier ──────────────────────────────────────────────────────────

/// Recursive simplifier bound to one build's style table.
pub struct Simplifier<'t> {
    table: &'t mut StyleTable,
    rewrite_vectors: bool,
}

impl<'t> Simplifier<'t> {
    pub fn new(table: &'t mut StyleTable, config: &DigestConfig) -> Self {
        Self {
            table,
            rewrite_vectors: config.rewrite_vectors,
        }
    }

    /// Simplify `node` and its visible descendants.
    ///
    /// Returns `None` for a hidden node; its subtree is not visited and adds
    /// nothing to the style table.
    pub fn simplify(&mut self, node: &RawNode, parent: Option<&RawNode>) -> Option<SimplifiedNode> {
        if !node.is_visible() {
            log::debug!("pruned hidden node {} ({})", node.id, node.name);
            return None;
        }

        let mut out = SimplifiedNode::bare(node);
        out.text = node.characters.clone();

        self.extract_styles(node, &mut out);

        out.opacity = node.opacity.filter(|o| *o != 1.0);
        out.border_radius = border_radius(node);

        if has_layout_properties(node) {
            out.layout = serialize_layout(node, parent);
        }

        out.component_id = node.component_id.clone();
        out.component_properties = component_properties(node);

        out.children = node
            .children
            .iter()
            .filter_map(|child| self.simplify(child, Some(node)))
            .collect();

        if self.rewrite_vectors && node.is_vector() {
            out.kind = IMAGE_SVG_TYPE.to_string();
        }

        log::trace!("simplified {} {} ({})", out.kind, out.id, out.name);
        Some(out)
    }

    fn extract_styles(&mut self, node: &RawNode, out: &mut SimplifiedNode) {
        if !node.style.is_empty() {
            out.text_style = Some(
                self.table
                    .intern(Value::Object(node.style.clone()), StyleCategory::Style),
            );
        }

        if !node.fills.is_empty() {
            out.fills = Some(
                self.table
                    .intern(Value::Array(node.fills.clone()), StyleCategory::Fill),
            );
        }

        if let Some(bundle) = stroke_bundle(node) {
            out.strokes = Some(self.table.intern(bundle, StyleCategory::Stroke));
        }

        if !node.effects.is_empty() {
            out.effects = Some(
                self.table
                    .intern(Value::Array(node.effects.clone()), StyleCategory::Effect),
            );
        }
    }
}

/// Simplify one node with the default options.
pub fn simplify_node(
    node: &RawNode,
    table: &mut StyleTable,
    parent: Option<&RawNode>,
) -> Option<SimplifiedNode> {
    Simplifier::new(table, &DigestConfig::default()).simplify(node, parent)
}

// ─── Field extraction ────────────────────────────────────────────────────

/// Stroke paints, weight, and alignment as one fragment. Built only when
/// there is something to draw.
fn stroke_bundle(node: &RawNode) -> Option<Value> {
    let weight = node.stroke_weight.unwrap_or(0.0);
    if node.strokes.is_empty() && weight <= 0.0 {
        return None;
    }
    let mut bundle = json!({
        "colors": node.strokes,
        "weight": weight,
    });
    if let Some(align) = &node.stroke_align {
        bundle["align"] = Value::String(align.clone());
    }
    Some(bundle)
}

fn border_radius(node: &RawNode) -> Option<String> {
    if let Some(radius) = node.corner_radius {
        return Some(px(radius));
    }
    match node.rectangle_corner_radii.as_slice() {
        &[a, b, c, d] => Some(px4([a, b, c, d])),
        _ => None,
    }
}

fn serialize_layout(node: &RawNode, parent: Option<&RawNode>) -> Option<String> {
    let layout = build_layout(node, parent);
    match serde_json::to_string(&layout) {
        Ok(json) => Some(json),
        Err(e) => {
            log::warn!("dropping layout of {}: {e}", node.id);
            None
        }
    }
}

/// Flatten object-valued `componentProperties` entries, in map order.
/// Entries that are not objects are skipped.
fn component_properties(node: &RawNode) -> Vec<ComponentProperty> {
    node.component_properties
        .iter()
        .filter_map(|(name, prop)| {
            let prop = prop.as_object()?;
            Some(ComponentProperty {
                name: name.clone(),
                value: prop.get("value").map(display_value).unwrap_or_default(),
                kind: prop.get("type").map(display_value).unwrap_or_default(),
            })
        })
        .collect()
}

/// Plain-text rendering of a JSON scalar; containers fall back to JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.as_f64().map_or_else(|| n.to_string(), display_number),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Shortest decimal form, switching to `1e+21` / `1e-05` style exponents
/// when the decimal exponent is below -4 or at least 6.
fn display_number(f: f64) -> String {
    let sci = format!("{f:e}");
    let exponent = sci
        .split_once('e')
        .and_then(|(mantissa, exp)| Some((mantissa, exp.parse::<i32>().ok()?)));
    match exponent {
        Some((mantissa, exp)) if f.is_finite() && (exp < -4 || exp >= 6) => {
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.unsigned_abs())
        }
        _ => f.to_string(),
    }
}
