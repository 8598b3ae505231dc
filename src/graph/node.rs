//! Nodes, handles and attributes

use std::fmt;

use indexmap::IndexMap;

use super::context::Graph;

/// ONNX default domain
pub const ONNX_DOMAIN: &str = "";

/// Microsoft contrib-op domain
pub const MS_DOMAIN: &str = "com.microsoft";

/// Stable handle of a node inside its graph's arena
///
/// Handles are never reused: once a node is removed its handle resolves to
/// nothing for the rest of the graph's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub usize);

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Typed attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Single float
    Float(f32),
    /// Single integer
    Int(i64),
    /// String
    String(String),
    /// List of floats
    Floats(Vec<f32>),
    /// List of integers
    Ints(Vec<i64>),
    /// List of strings
    Strings(Vec<String>),
}

/// Open attribute bag, keyed by name, insertion order preserved
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attributes {
    values: IndexMap<String, AttributeValue>,
}

impl Attributes {
    /// Empty attribute bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: AttributeValue) -> Self {
        self.set(name, value);
        self
    }

    /// Set or replace an attribute
    pub fn set(&mut self, name: &str, value: AttributeValue) {
        self.values.insert(name.to_string(), value);
    }

    /// Remove an attribute by name
    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        self.values.shift_remove(name)
    }

    /// Raw lookup
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.values.get(name)
    }

    /// Check if an attribute is present
    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Float attribute, `None` if absent or of another type
    pub fn get_float(&self, name: &str) -> Option<f32> {
        match self.values.get(name)? {
            AttributeValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer attribute
    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.values.get(name)? {
            AttributeValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// String attribute
    pub fn get_string(&self, name: &str) -> Option<&str> {
        match self.values.get(name)? {
            AttributeValue::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Integer list attribute
    pub fn get_ints(&self, name: &str) -> Option<&[i64]> {
        match self.values.get(name)? {
            AttributeValue::Ints(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no attributes
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// An operator node
///
/// Inputs and outputs are descriptor names; an empty input name marks an
/// omitted optional input and creates no edge.
#[derive(Debug, Clone)]
pub struct Node {
    /// Arena handle
    pub index: NodeIndex,
    /// Unique name within the graph
    pub name: String,
    /// Operator type, e.g. `MatMul`
    pub op_type: String,
    /// Operator domain, `""` for the ONNX default domain
    pub domain: String,
    /// Opset version the operator schema was resolved against
    pub since_version: i64,
    /// Input descriptor names
    pub inputs: Vec<String>,
    /// Output descriptor names
    pub outputs: Vec<String>,
    /// Outer-scope values read by nested subgraphs
    pub implicit_inputs: Vec<String>,
    /// Assigned execution provider, empty when unassigned
    pub execution_provider: String,
    /// Operator attributes
    pub attributes: Attributes,
    /// Free-form documentation
    pub doc_string: String,
    /// Nested subgraphs keyed by the attribute that holds them
    pub subgraphs: IndexMap<String, Graph>,
}

impl Node {
    /// Check if this node owns nested subgraphs
    pub fn has_subgraphs(&self) -> bool {
        !self.subgraphs.is_empty()
    }

    /// Explicit and implicit inputs that create edges
    pub fn edge_inputs(&self) -> impl Iterator<Item = &str> {
        self.inputs
            .iter()
            .chain(self.implicit_inputs.iter())
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }
}

/// Everything needed to create a node
#[derive(Debug, Clone, Default)]
pub struct NodeSpec {
    /// Node name (must be unique)
    pub name: String,
    /// Operator type
    pub op_type: String,
    /// Operator domain
    pub domain: String,
    /// Opset version
    pub since_version: i64,
    /// Input descriptor names
    pub inputs: Vec<String>,
    /// Output descriptor names
    pub outputs: Vec<String>,
    /// Execution provider
    pub execution_provider: String,
    /// Attributes
    pub attributes: Attributes,
    /// Documentation
    pub doc_string: String,
    /// Nested subgraphs
    pub subgraphs: IndexMap<String, Graph>,
}

impl NodeSpec {
    /// Default-domain node with version 1
    pub fn new(op_type: &str, inputs: &[&str], outputs: &[&str], name: &str) -> Self {
        Self {
            name: name.to_string(),
            op_type: op_type.to_string(),
            domain: ONNX_DOMAIN.to_string(),
            since_version: 1,
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Set the opset version
    pub fn version(mut self, since_version: i64) -> Self {
        self.since_version = since_version;
        self
    }

    /// Set the domain
    pub fn domain(mut self, domain: &str) -> Self {
        self.domain = domain.to_string();
        self
    }

    /// Set the execution provider
    pub fn provider(mut self, provider: &str) -> Self {
        self.execution_provider = provider.to_string();
        self
    }

    /// Add an attribute
    pub fn attr(mut self, name: &str, value: AttributeValue) -> Self {
        self.attributes.set(name, value);
        self
    }

    /// Attach a nested subgraph
    pub fn subgraph(mut self, attribute: &str, graph: Graph) -> Self {
        self.subgraphs.insert(attribute.to_string(), graph);
        self
    }
}

/// Shorthand for [`NodeSpec::new`]
pub fn make_node(op_type: &str, inputs: &[&str], outputs: &[&str], name: &str) -> NodeSpec {
    NodeSpec::new(op_type, inputs, outputs, name)
}
