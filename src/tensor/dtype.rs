//! Tensor element types
//!
//! Mirrors the ONNX `TensorProto.DataType` numbering so graphs built by an
//! external loader can hand element types over without a lookup table.

use std::fmt;

/// Element type of a tensor descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ElementType {
    /// Unknown or not yet inferred
    Undefined = 0,
    /// 32-bit IEEE float
    Float = 1,
    /// Unsigned 8-bit integer
    Uint8 = 2,
    /// Signed 8-bit integer
    Int8 = 3,
    /// Unsigned 16-bit integer
    Uint16 = 4,
    /// Signed 16-bit integer
    Int16 = 5,
    /// Signed 32-bit integer
    Int32 = 6,
    /// Signed 64-bit integer
    Int64 = 7,
    /// UTF-8 string
    String = 8,
    /// Boolean
    Bool = 9,
    /// 16-bit IEEE float
    Float16 = 10,
    /// 64-bit IEEE float
    Double = 11,
    /// Unsigned 32-bit integer
    Uint32 = 12,
    /// Unsigned 64-bit integer
    Uint64 = 13,
    /// Brain floating point (16-bit)
    Bfloat16 = 16,
}

impl ElementType {
    /// Convert an ONNX data type code
    pub fn from_i32(value: i32) -> Option<Self> {
        let ty = match value {
            0 => Self::Undefined,
            1 => Self::Float,
            2 => Self::Uint8,
            3 => Self::Int8,
            4 => Self::Uint16,
            5 => Self::Int16,
            6 => Self::Int32,
            7 => Self::Int64,
            8 => Self::String,
            9 => Self::Bool,
            10 => Self::Float16,
            11 => Self::Double,
            12 => Self::Uint32,
            13 => Self::Uint64,
            16 => Self::Bfloat16,
            _ => return None,
        };
        Some(ty)
    }

    /// The `tensor(<type>)` spelling used in ONNX type strings
    pub fn as_onnx_str(self) -> &'static str {
        match self {
            Self::Undefined => "tensor(undefined)",
            Self::Float => "tensor(float)",
            Self::Uint8 => "tensor(uint8)",
            Self::Int8 => "tensor(int8)",
            Self::Uint16 => "tensor(uint16)",
            Self::Int16 => "tensor(int16)",
            Self::Int32 => "tensor(int32)",
            Self::Int64 => "tensor(int64)",
            Self::String => "tensor(string)",
            Self::Bool => "tensor(bool)",
            Self::Float16 => "tensor(float16)",
            Self::Double => "tensor(double)",
            Self::Uint32 => "tensor(uint32)",
            Self::Uint64 => "tensor(uint64)",
            Self::Bfloat16 => "tensor(bfloat16)",
        }
    }

    /// Size in bytes of one element, `None` for variable-width types
    pub fn size(self) -> Option<usize> {
        match self {
            Self::Float | Self::Int32 | Self::Uint32 => Some(4),
            Self::Uint8 | Self::Int8 | Self::Bool => Some(1),
            Self::Uint16 | Self::Int16 | Self::Float16 | Self::Bfloat16 => Some(2),
            Self::Int64 | Self::Uint64 | Self::Double => Some(8),
            Self::Undefined | Self::String => None,
        }
    }

    /// Check if the element type is floating point
    pub fn is_float(self) -> bool {
        matches!(
            self,
            Self::Float | Self::Double | Self::Float16 | Self::Bfloat16
        )
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_onnx_str())
    }
}

/// Element types accepted by the fused Gemm / FusedMatMul kernels
pub const GEMM_ELEMENT_TYPES: &[ElementType] = &[
    ElementType::Float,
    ElementType::Float16,
    ElementType::Bfloat16,
];
