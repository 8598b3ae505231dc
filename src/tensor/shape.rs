//! Static tensor shapes
//!
//! A shape is an ordered list of dimensions. A dimension is either a
//! concrete value or unknown (optionally with a symbolic name). Unknown
//! dimensions never compare equal to anything, including other unknowns.

use std::fmt;

/// One dimension of a static shape
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Dim {
    /// Concrete, nonnegative extent
    Known(u64),
    /// Unknown extent, with the symbolic name if the loader had one
    Unknown(Option<String>),
}

impl Dim {
    /// Unnamed unknown dimension
    pub fn unknown() -> Self {
        Dim::Unknown(None)
    }

    /// Symbolic unknown dimension
    pub fn symbolic(name: &str) -> Self {
        Dim::Unknown(Some(name.to_string()))
    }

    /// Concrete value, if any
    pub fn value(&self) -> Option<u64> {
        match self {
            Dim::Known(v) => Some(*v),
            Dim::Unknown(_) => None,
        }
    }

    /// Check if the dimension is concrete
    pub fn is_known(&self) -> bool {
        matches!(self, Dim::Known(_))
    }

    /// Concrete equality: false as soon as either side is unknown
    pub fn same_known(&self, other: &Dim) -> bool {
        match (self, other) {
            (Dim::Known(a), Dim::Known(b)) => a == b,
            _ => false,
        }
    }

    /// Check if the dimension is the concrete value `v`
    pub fn is_value(&self, v: u64) -> bool {
        self.value() == Some(v)
    }
}

impl From<u64> for Dim {
    fn from(v: u64) -> Self {
        Dim::Known(v)
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dim::Known(v) => write!(f, "{}", v),
            Dim::Unknown(Some(name)) => f.write_str(name),
            Dim::Unknown(None) => f.write_str("?"),
        }
    }
}

/// Static shape of a tensor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TensorShape {
    dims: Vec<Dim>,
}

impl TensorShape {
    /// Create a shape from dimensions
    pub fn new(dims: Vec<Dim>) -> Self {
        Self { dims }
    }

    /// Create a fully concrete shape
    pub fn from_dims(dims: &[u64]) -> Self {
        Self {
            dims: dims.iter().map(|&d| Dim::Known(d)).collect(),
        }
    }

    /// Number of dimensions
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// All dimensions
    pub fn dims(&self) -> &[Dim] {
        &self.dims
    }

    /// Dimension at `index`
    pub fn dim(&self, index: usize) -> Option<&Dim> {
        self.dims.get(index)
    }

    /// The last two dimensions, as (rows, cols)
    pub fn matrix_dims(&self) -> Option<(&Dim, &Dim)> {
        let rank = self.rank();
        if rank < 2 {
            return None;
        }
        Some((&self.dims[rank - 2], &self.dims[rank - 1]))
    }

    /// Check if any dimension is unknown
    pub fn is_dynamic(&self) -> bool {
        self.dims.iter().any(|d| !d.is_known())
    }

    /// Concrete dimension values, `None` if any dimension is unknown
    pub fn concrete(&self) -> Option<Vec<usize>> {
        self.dims
            .iter()
            .map(|d| d.value().map(|v| v as usize))
            .collect()
    }

    /// Total number of elements, `None` if any dimension is unknown
    pub fn numel(&self) -> Option<u64> {
        self.dims.iter().map(|d| d.value()).product()
    }
}

impl fmt::Display for TensorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", d)?;
        }
        f.write_str(")")
    }
}
