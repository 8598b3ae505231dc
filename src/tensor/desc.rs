//! Tensor descriptors
//!
//! A descriptor is the graph-level identity of a value. Edges are implicit:
//! a node consuming descriptor `x` is connected to the node producing `x`.

use super::dtype::ElementType;
use super::shape::TensorShape;

/// Name, element type and optional static shape of a graph value
#[derive(Debug, Clone, PartialEq)]
pub struct TensorDesc {
    /// Unique name within the owning graph
    pub name: String,
    /// Element type
    pub elem_type: ElementType,
    /// Static shape, `None` when shape inference had nothing to say
    pub shape: Option<TensorShape>,
}

impl TensorDesc {
    /// Descriptor with a known, fully concrete shape
    pub fn new(name: &str, elem_type: ElementType, dims: &[u64]) -> Self {
        Self {
            name: name.to_string(),
            elem_type,
            shape: Some(TensorShape::from_dims(dims)),
        }
    }

    /// Descriptor with an explicit (possibly partially unknown) shape
    pub fn with_shape(name: &str, elem_type: ElementType, shape: TensorShape) -> Self {
        Self {
            name: name.to_string(),
            elem_type,
            shape: Some(shape),
        }
    }

    /// Descriptor without shape information
    pub fn unshaped(name: &str, elem_type: ElementType) -> Self {
        Self {
            name: name.to_string(),
            elem_type,
            shape: None,
        }
    }

    /// Rank, if the shape is known
    pub fn rank(&self) -> Option<usize> {
        self.shape.as_ref().map(TensorShape::rank)
    }
}
