//! JSON document parsing and structural limits.
//!
//! The blob is parsed into a `serde_json::Value` tree with keys kept in
//! document order and numbers kept as their raw literal text. Before any
//! field is looked at, the tree is measured against [`ParseLimits`].

use crate::config::ParseLimits;
use crate::error::DocumentError;
use serde_json::Value;

/// A parsed configuration document that fits within its limits.
#[derive(Debug, Clone)]
pub struct Document {
    root: Value,
    nodes: usize,
}

impl Document {
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Number of nodes in the tree. Every value counts once and so does
    /// every object key.
    pub fn nodes(&self) -> usize {
        self.nodes
    }
}

/// Parse a complete JSON document and check it against `limits`.
pub fn parse_document(src: &[u8], limits: &ParseLimits) -> Result<Document, DocumentError> {
    let root: Value = serde_json::from_slice(src)?;
    let mut nodes = 0;
    measure(&root, 0, &mut nodes, limits)?;
    Ok(Document { root, nodes })
}

fn measure(
    value: &Value,
    depth: usize,
    nodes: &mut usize,
    limits: &ParseLimits,
) -> Result<(), DocumentError> {
    count_node(nodes, limits)?;
    match value {
        Value::Array(items) => {
            let depth = enter(depth, limits)?;
            for item in items {
                measure(item, depth, nodes, limits)?;
            }
        }
        Value::Object(map) => {
            let depth = enter(depth, limits)?;
            for child in map.values() {
                count_node(nodes, limits)?;
                measure(child, depth, nodes, limits)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn count_node(nodes: &mut usize, limits: &ParseLimits) -> Result<(), DocumentError> {
    *nodes += 1;
    if *nodes > limits.max_nodes {
        return Err(DocumentError::TooManyNodes {
            limit: limits.max_nodes,
        });
    }
    Ok(())
}

fn enter(depth: usize, limits: &ParseLimits) -> Result<usize, DocumentError> {
    let depth = depth + 1;
    if depth > limits.max_depth {
        return Err(DocumentError::TooDeep {
            limit: limits.max_depth,
        });
    }
    Ok(depth)
}
