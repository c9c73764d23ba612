//! `$ref` resolution
//!
//! Every schema node is classified once into a [`ResolvedNode`] before the
//! passport traversal looks at it, so callers pattern-match on the variant
//! instead of inspecting `type`, `properties` and `items` ad hoc.

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::json_schema::{JsonSchema, SchemaNode, SchemaType};

/// Prefix stripped from `$ref` pointers before looking up a component.
pub const DEFAULT_REF_PREFIX: &str = "#/components/schemas/";

/// Upper bound on `$ref` chains (a ref whose target is again a ref).
const MAX_REF_CHAIN: usize = 32;

/// A schema node after reference resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedNode<'a> {
    /// A string, number, integer, boolean or null node.
    Scalar {
        ty: SchemaType,
        node: &'a SchemaNode,
    },
    Object { node: &'a SchemaNode },
    Array { node: &'a SchemaNode },
    /// A `$ref` whose target is missing or forms a cycle.
    UnresolvedRef { reference: &'a str },
}

impl<'a> ResolvedNode<'a> {
    /// The display type of this node. Unresolved references are objects.
    pub fn schema_type(&self) -> SchemaType {
        match self {
            ResolvedNode::Scalar { ty, .. } => *ty,
            ResolvedNode::Object { .. } | ResolvedNode::UnresolvedRef { .. } => SchemaType::Object,
            ResolvedNode::Array { .. } => SchemaType::Array,
        }
    }

    /// The resolved target node, if any.
    pub fn node(&self) -> Option<&'a SchemaNode> {
        match self {
            ResolvedNode::Scalar { node, .. }
            | ResolvedNode::Object { node }
            | ResolvedNode::Array { node } => Some(node),
            ResolvedNode::UnresolvedRef { .. } => None,
        }
    }

    /// Child property definitions of an object node. `None` when the node is
    /// not an object or declares no properties.
    pub fn properties(&self) -> Option<&'a IndexMap<String, SchemaNode>> {
        match self {
            ResolvedNode::Object { node } if !node.properties.is_empty() => Some(&node.properties),
            _ => None,
        }
    }

    /// The `required` list of an object node.
    pub fn required(&self) -> &'a [String] {
        match self {
            ResolvedNode::Object { node } => &node.required,
            _ => &[],
        }
    }

    /// The unresolved `items` definition of an array node.
    pub fn items(&self) -> Option<&'a SchemaNode> {
        match self {
            ResolvedNode::Array { node } => node.items.as_deref(),
            _ => None,
        }
    }
}

/// Resolves `$ref` pointers against a schema's component dictionary
#[derive(Debug, Clone, Copy)]
pub struct SchemaResolver<'a> {
    schema: &'a JsonSchema,
    prefix: &'a str,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(schema: &'a JsonSchema) -> Self {
        Self::with_prefix(schema, DEFAULT_REF_PREFIX)
    }

    pub fn with_prefix(schema: &'a JsonSchema, prefix: &'a str) -> Self {
        Self { schema, prefix }
    }

    pub fn schema(&self) -> &'a JsonSchema {
        self.schema
    }

    /// Look up the component a pointer refers to.
    ///
    /// The configured prefix is stripped first. Pointers with another prefix
    /// (for example `#/$defs/Name`) fall back to their last segment.
    pub fn lookup(&self, reference: &str) -> Option<&'a SchemaNode> {
        let name = reference
            .strip_prefix(self.prefix)
            .unwrap_or_else(|| reference.rsplit('/').next().unwrap_or(reference));
        self.schema.component(name)
    }

    /// Follow a `$ref` chain to the first node without a reference.
    fn follow(&self, node: &'a SchemaNode) -> Result<&'a SchemaNode, &'a str> {
        let mut current = node;
        for _ in 0..MAX_REF_CHAIN {
            let Some(reference) = current.reference.as_deref() else {
                return Ok(current);
            };
            match self.lookup(reference) {
                Some(target) => {
                    trace!(reference, "resolved schema reference");
                    current = target;
                }
                None => {
                    debug!(reference, "unresolved schema reference");
                    return Err(reference);
                }
            }
        }
        let reference = current.reference.as_deref().unwrap_or_default();
        debug!(reference, "schema reference chain too deep");
        Err(reference)
    }

    pub fn resolve(&self, node: &'a SchemaNode) -> ResolvedNode<'a> {
        let target = match self.follow(node) {
            Ok(target) => target,
            Err(reference) => return ResolvedNode::UnresolvedRef { reference },
        };
        match infer_type(target) {
            SchemaType::Object => ResolvedNode::Object { node: target },
            SchemaType::Array => ResolvedNode::Array { node: target },
            ty => ResolvedNode::Scalar { ty, node: target },
        }
    }

    /// The display type of a node after following `$ref`.
    pub fn property_type(&self, node: &'a SchemaNode) -> SchemaType {
        self.resolve(node).schema_type()
    }
}

/// Declared type, or a structural guess when `type` is absent.
fn infer_type(node: &SchemaNode) -> SchemaType {
    if let Some(ty) = node.declared_type() {
        return ty;
    }
    if !node.properties.is_empty() {
        SchemaType::Object
    } else if node.items.is_some() {
        SchemaType::Array
    } else {
        SchemaType::String
    }
}
