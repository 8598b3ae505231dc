//! Tensor metadata for graph values
//!
//! This module provides the type information the fusion pass reasons about:
//! - Element types (`dtype`)
//! - Static shapes with unknown dimensions (`shape`)
//! - Value descriptors tying a name to both (`desc`)
//!
//! # Example
//!
//! ```ignore
//! use matmul_add_fusion::tensor::{Dim, ElementType, TensorDesc, TensorShape};
//!
//! let a = TensorDesc::new("A", ElementType::Float, &[2, 3]);
//! let x = TensorDesc::with_shape(
//!     "X",
//!     ElementType::Float,
//!     TensorShape::new(vec![Dim::symbolic("batch"), Dim::Known(3)]),
//! );
//! ```

pub mod desc;
pub mod dtype;
pub mod shape;

// Re-export commonly used items
pub use desc::TensorDesc;
pub use dtype::{ElementType, GEMM_ELEMENT_TYPES};
pub use shape::{Dim, TensorShape};
