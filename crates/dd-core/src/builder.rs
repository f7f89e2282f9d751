//! Tree builder: raw response → `SimplifiedDesign`.
//!
//! Accepts either a whole-document response or a node-set response, runs the
//! simplifier over every root with one shared style table, and assembles the
//! finished design. A build is atomic: decoding happens before any traversal,
//! so a malformed input yields an error and nothing else.

use crate::config::DigestConfig;
use crate::error::Result;
use crate::raw::{FileResponse, NodesResponse, RawResponse};
use crate::simplify::{SimplifiedNode, Simplifier};
use crate::style::StyleTable;
use serde::Serialize;
use serde_json::{Map, Value};

// ─── Output model ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignMetadata {
    pub name: String,
    pub last_modified: String,
    pub thumbnail_url: String,
}

/// The style-variable table as it appears in the output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GlobalVars {
    /// id → style payload, in first-seen order.
    pub styles: Map<String, Value>,
}

/// The finished, compact design.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedDesign {
    pub metadata: DesignMetadata,
    pub nodes: Vec<SimplifiedNode>,
    pub components: Map<String, Value>,
    pub component_sets: Map<String, Value>,
    pub global_vars: GlobalVars,
}

impl SimplifiedDesign {
    /// Total number of simplified nodes, at every depth.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().map(SimplifiedNode::subtree_len).sum()
    }

    /// Pre-order walk over every simplified node.
    pub fn walk(&self) -> Vec<&SimplifiedNode> {
        fn visit<'a>(node: &'a SimplifiedNode, out: &mut Vec<&'a SimplifiedNode>) {
            out.push(node);
            for child in &node.children {
                visit(child, out);
            }
        }
        let mut out = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            visit(node, &mut out);
        }
        out
    }
}

// ─── Entry points ────────────────────────────────────────────────────────

/// Build from a raw JSON response of either shape.
///
/// # Errors
/// `DigestError::Malformed` / `UnrecognizedResponse` when the text is not a
/// design response.
pub fn build_from_str(text: &str, config: &DigestConfig) -> Result<SimplifiedDesign> {
    let response = RawResponse::from_json(text)?;
    Ok(build(&response, config))
}

/// Build from an already-decoded JSON value of either shape.
///
/// # Errors
/// Same as [`build_from_str`].
pub fn build_from_value(value: Value, config: &DigestConfig) -> Result<SimplifiedDesign> {
    let response = RawResponse::from_value(value)?;
    Ok(build(&response, config))
}

/// Build from a decoded response. Infallible once decoding succeeded.
pub fn build(response: &RawResponse, config: &DigestConfig) -> SimplifiedDesign {
    let mut table = StyleTable::new(config.ids);
    let (metadata, nodes, components, component_sets) = match response {
        RawResponse::File(file) => build_file(file, &mut table, config),
        RawResponse::Nodes(set) => build_node_set(set, &mut table, config),
    };

    log::debug!(
        "built design {:?}: {} top-level nodes, {} style variables",
        metadata.name,
        nodes.len(),
        table.len()
    );

    SimplifiedDesign {
        metadata,
        nodes,
        components,
        component_sets,
        global_vars: GlobalVars {
            styles: table.into_styles(),
        },
    }
}

type Parts = (
    DesignMetadata,
    Vec<SimplifiedNode>,
    Map<String, Value>,
    Map<String, Value>,
);

/// Whole-document mode: the pages under the document root become the nodes.
fn build_file(file: &FileResponse, table: &mut StyleTable, config: &DigestConfig) -> Parts {
    let metadata = DesignMetadata {
        name: file.name.clone(),
        last_modified: file.last_modified.clone(),
        thumbnail_url: file.thumbnail_url.clone(),
    };

    let root = &file.document;
    let mut simplifier = Simplifier::new(table, config);
    let nodes = root
        .children
        .iter()
        .filter_map(|child| simplifier.simplify(child, Some(root)))
        .collect();

    (
        metadata,
        nodes,
        file.components.clone(),
        file.component_sets.clone(),
    )
}

/// Node-set mode: every requested subtree is a root, in request order.
/// Component tables are merged; a later subtree wins on key clashes.
fn build_node_set(set: &NodesResponse, table: &mut StyleTable, config: &DigestConfig) -> Parts {
    let metadata = DesignMetadata {
        name: set.name.clone(),
        last_modified: set.last_modified.clone(),
        thumbnail_url: set.thumbnail_url.clone(),
    };

    let mut components = Map::new();
    let mut component_sets = Map::new();
    for (requested, wrapper) in &set.nodes {
        let Some(wrapper) = wrapper else {
            log::warn!("requested node {requested} was not found in the file, skipping");
            continue;
        };
        merge_into(&mut components, &wrapper.components);
        merge_into(&mut component_sets, &wrapper.component_sets);
    }

    let mut simplifier = Simplifier::new(table, config);
    let nodes = set
        .nodes
        .iter()
        .filter_map(|(_, wrapper)| wrapper.as_ref())
        .filter_map(|wrapper| simplifier.simplify(&wrapper.document, None))
        .collect();

    (metadata, nodes, components, component_sets)
}

/// Copy every entry of `src` into `dst`, overwriting on clashes.
fn merge_into(dst: &mut Map<String, Value>, src: &Map<String, Value>) {
    for (key, value) in src {
        dst.insert(key.clone(), value.clone());
    }
}
