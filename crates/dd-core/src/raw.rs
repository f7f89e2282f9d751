//! Raw design-tool responses, as decoded from the file/nodes API.
//!
//! Only the fields the simplifier reads are modelled; everything else in the
//! payload is ignored. Style payloads (`style`, `fills`, `strokes`, `effects`)
//! stay untyped `Value`s because they are copied into the style table as-is.
//!
//! Absence is the norm here: `null`, a missing key, a value of the wrong
//! type, and (for string fields) an empty string all decode to "not
//! present". Only the tree structure is strict: `id`, `name` and `type` are
//! required, and `children` must be a list of nodes.

use crate::error::{DigestError, Result};
use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::fmt;

/// The tag the API uses for vector/path nodes.
pub const VECTOR_TYPE: &str = "VECTOR";

// ─── Geometry ────────────────────────────────────────────────────────────

/// Absolute bounding box in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// One element of the raw document tree.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,

    /// `Some(false)` hides the node and its whole subtree.
    #[serde(default, deserialize_with = "lenient")]
    pub visible: Option<bool>,

    #[serde(default, deserialize_with = "non_empty")]
    pub characters: Option<String>,

    // Style payloads
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub style: Map<String, Value>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub fills: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub strokes: Vec<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub stroke_weight: Option<f64>,
    #[serde(default, deserialize_with = "non_empty")]
    pub stroke_align: Option<String>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub effects: Vec<Value>,

    #[serde(default, deserialize_with = "lenient")]
    pub opacity: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub corner_radius: Option<f64>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub rectangle_corner_radii: Vec<f64>,

    // Component linkage
    #[serde(default, deserialize_with = "non_empty")]
    pub component_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub component_properties: Map<String, Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<RawNode>,

    // Auto-layout
    #[serde(default, deserialize_with = "non_empty")]
    pub layout_mode: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub primary_axis_align_items: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub counter_axis_align_items: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub layout_align: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub layout_wrap: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub item_spacing: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub padding_top: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub padding_right: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub padding_bottom: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub padding_left: Option<f64>,
    #[serde(default, deserialize_with = "non_empty")]
    pub layout_sizing_horizontal: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub layout_sizing_vertical: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub layout_positioning: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub layout_grow: Option<f64>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub overflow_direction: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub absolute_bounding_box: Option<BoundingBox>,
}

impl RawNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// A node is visible unless it explicitly says otherwise.
    pub fn is_visible(&self) -> bool {
        self.visible.unwrap_or(true)
    }

    pub fn is_vector(&self) -> bool {
        self.kind == VECTOR_TYPE
    }
}

// ─── Responses ───────────────────────────────────────────────────────────

/// Whole-document response (`GET /files/:key`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub last_modified: String,
    #[serde(default)]
    pub thumbnail_url: String,
    pub document: RawNode,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub components: Map<String, Value>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub component_sets: Map<String, Value>,
}

/// Node-set response (`GET /files/:key/nodes?ids=…`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodesResponse {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub last_modified: String,
    #[serde(default)]
    pub thumbnail_url: String,
    /// Requested node id → wrapper, in request order. The API answers
    /// `null` for ids it could not resolve.
    #[serde(deserialize_with = "ordered_entries")]
    pub nodes: Vec<(String, Option<NodeWrapper>)>,
}

/// One requested subtree plus the component tables it references.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeWrapper {
    pub document: RawNode,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub components: Map<String, Value>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub component_sets: Map<String, Value>,
}

/// Either response shape.
#[derive(Debug, Clone)]
pub enum RawResponse {
    File(FileResponse),
    Nodes(NodesResponse),
}

impl RawResponse {
    /// Decode a response whose shape is not known up front.
    ///
    /// An object carrying a `nodes` object is a node-set response; otherwise
    /// one carrying `document` is a file response.
    pub fn from_value(value: Value) -> Result<Self> {
        let obj = value.as_object().ok_or(DigestError::UnrecognizedResponse)?;
        if obj.get("nodes").is_some_and(Value::is_object) {
            Ok(Self::Nodes(serde_json::from_value(value)?))
        } else if obj.contains_key("document") {
            Ok(Self::File(serde_json::from_value(value)?))
        } else {
            Err(DigestError::UnrecognizedResponse)
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(text)?)
    }
}

// ─── Lenient field decoders ──────────────────────────────────────────────

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Optional scalar: any value that does not convert to `T` is absent.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Optional collection: any value that does not convert to `T` is empty.
fn lenient_or_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

fn non_empty<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient::<D, String>(deserializer)?.filter(|s| !s.is_empty()))
}

/// Decode a JSON object into its entries, keeping document order.
fn ordered_entries<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<(String, Option<NodeWrapper>)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = Vec<(String, Option<NodeWrapper>)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of node id to node wrapper")
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries: Self::Value = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn visibility_defaults_to_true() {
        let node: RawNode =
            serde_json::from_value(json!({"id": "1:1", "name": "a", "type": "FRAME"})).unwrap();
        assert!(node.is_visible());

        let hidden: RawNode = serde_json::from_value(
            json!({"id": "1:2", "name": "b", "type": "FRAME", "visible": false}),
        )
        .unwrap();
        assert!(!hidden.is_visible());
    }

    #[test]
    fn empty_and_null_fields_are_absent() {
        let node: RawNode = serde_json::from_value(json!({
            "id": "1:1",
            "name": "a",
            "type": "TEXT",
            "characters": "",
            "layoutMode": "",
            "fills": null,
            "children": null,
            "opacity": null
        }))
        .unwrap();
        assert!(node.characters.is_none());
        assert!(node.layout_mode.is_none());
        assert!(node.fills.is_empty());
        assert!(node.children.is_empty());
        assert!(node.opacity.is_none());
    }

    #[test]
    fn wrongly_typed_optional_fields_are_absent() {
        let node: RawNode = serde_json::from_value(json!({
            "id": "1:1",
            "name": "a",
            "type": "FRAME",
            "visible": "no",
            "opacity": "0.5",
            "cornerRadius": "mixed",
            "rectangleCornerRadii": [4, "x", 4, 4],
            "componentProperties": [],
            "componentId": 7,
            "style": [],
            "fills": {"type": "SOLID"},
            "layoutMode": 3,
            "paddingTop": true,
            "overflowDirection": "VERTICAL",
            "absoluteBoundingBox": {"x": null, "y": 0, "width": 10, "height": 10},
            "children": [{"id": "1:2", "name": "b", "type": "TEXT", "itemSpacing": "8"}]
        }))
        .unwrap();
        assert!(node.is_visible());
        assert_eq!(node.opacity, None);
        assert_eq!(node.corner_radius, None);
        assert!(node.rectangle_corner_radii.is_empty());
        assert!(node.component_properties.is_empty());
        assert_eq!(node.component_id, None);
        assert!(node.style.is_empty());
        assert!(node.fills.is_empty());
        assert_eq!(node.layout_mode, None);
        assert_eq!(node.padding_top, None);
        assert!(node.overflow_direction.is_empty());
        assert_eq!(node.absolute_bounding_box, None);
        assert_eq!(node.children[0].item_spacing, None);
    }

    #[test]
    fn well_typed_optional_fields_survive() {
        let node: RawNode = serde_json::from_value(json!({
            "id": "1:1",
            "name": "a",
            "type": "FRAME",
            "opacity": 0.5,
            "rectangleCornerRadii": [4, 4, 0, 0],
            "overflowDirection": ["VERTICAL_SCROLLING"],
            "absoluteBoundingBox": {"x": 1, "y": 2, "width": 3, "height": 4}
        }))
        .unwrap();
        assert_eq!(node.opacity, Some(0.5));
        assert_eq!(node.rectangle_corner_radii, [4.0, 4.0, 0.0, 0.0]);
        assert_eq!(node.overflow_direction, ["VERTICAL_SCROLLING"]);
        assert_eq!(
            node.absolute_bounding_box,
            Some(BoundingBox { x: 1.0, y: 2.0, width: 3.0, height: 4.0 })
        );
    }

    #[test]
    fn detects_node_set_response_in_request_order() {
        let resp = RawResponse::from_value(json!({
            "name": "Doc",
            "nodes": {
                "9:9": {"document": {"id": "9:9", "name": "z", "type": "FRAME"}},
                "1:1": {"document": {"id": "1:1", "name": "a", "type": "FRAME"}},
                "5:5": null
            }
        }))
        .unwrap();
        let RawResponse::Nodes(nodes) = resp else {
            panic!("expected node-set response");
        };
        let ids: Vec<_> = nodes.nodes.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["9:9", "1:1", "5:5"]);
        assert!(nodes.nodes[2].1.is_none());
    }

    #[test]
    fn detects_file_response() {
        let resp = RawResponse::from_value(json!({
            "name": "Doc",
            "lastModified": "2024-01-01T00:00:00Z",
            "document": {"id": "0:0", "name": "Document", "type": "DOCUMENT"}
        }))
        .unwrap();
        assert!(matches!(resp, RawResponse::File(_)));
    }

    #[test]
    fn rejects_unrecognized_shapes() {
        assert!(matches!(
            RawResponse::from_value(json!({"name": "Doc"})),
            Err(DigestError::UnrecognizedResponse)
        ));
        assert!(matches!(
            RawResponse::from_value(json!([1, 2, 3])),
            Err(DigestError::UnrecognizedResponse)
        ));
        assert!(matches!(
            RawResponse::from_json("{not json"),
            Err(DigestError::Malformed(_))
        ));
        // Identity fields are required.
        assert!(matches!(
            RawResponse::from_value(json!({
                "document": {"id": "0:0", "name": "D", "type": "DOCUMENT", "children": [
                    {"id": "1:1", "type": "FRAME"}
                ]}
            })),
            Err(DigestError::Malformed(_))
        ));
        // Children must be nodes.
        assert!(matches!(
            RawResponse::from_value(json!({
                "document": {"id": "0:0", "name": "D", "type": "DOCUMENT", "children": [42]}
            })),
            Err(DigestError::Malformed(_))
        ));
    }
}
