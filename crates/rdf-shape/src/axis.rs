//! # Axis Descriptors
//!
//! Input types of the shape resolver. These are deliberately independent
//! of the document schema: the schema crate converts its typed tensor
//! descriptions into this form.

use std::fmt;

use serde::Serialize;

/// Identifies one axis of one tensor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct AxisKey {
    /// Tensor id.
    pub tensor_id: String,
    /// Axis id within the tensor.
    pub axis_id: String,
}

impl AxisKey {
    /// Build a key from borrowed ids.
    pub fn new(tensor_id: &str, axis_id: &str) -> Self {
        Self {
            tensor_id: tensor_id.to_string(),
            axis_id: axis_id.to_string(),
        }
    }
}

impl fmt::Display for AxisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.tensor_id, self.axis_id)
    }
}

/// How an axis size is expressed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SizeExpr {
    /// A concrete size.
    Fixed {
        /// The size.
        size: u64,
    },
    /// `min + k * step` for any non-negative integer `k`.
    Parametrized {
        /// Smallest valid size.
        min: u64,
        /// Increment between valid sizes.
        step: u64,
    },
    /// Relative to another tensor's axis.
    Reference {
        /// Referenced tensor.
        tensor_id: String,
        /// Referenced axis.
        axis_id: String,
        /// Multiplier applied to the referenced size.
        scale: f64,
        /// Added twice (once per edge) after scaling.
        offset: i64,
    },
}

impl SizeExpr {
    /// Shorthand for a fixed size.
    pub fn fixed(size: u64) -> Self {
        Self::Fixed { size }
    }

    /// Shorthand for a parametrized size.
    pub fn parametrized(min: u64, step: u64) -> Self {
        Self::Parametrized { min, step }
    }

    /// Shorthand for a reference size.
    pub fn reference(tensor_id: &str, axis_id: &str, scale: f64, offset: i64) -> Self {
        Self::Reference {
            tensor_id: tensor_id.to_string(),
            axis_id: axis_id.to_string(),
            scale,
            offset,
        }
    }

    /// The axis this size depends on, if any.
    pub fn dependency(&self) -> Option<AxisKey> {
        match self {
            Self::Reference {
                tensor_id, axis_id, ..
            } => Some(AxisKey::new(tensor_id, axis_id)),
            _ => None,
        }
    }
}

/// One axis of a tensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TensorAxisDescr {
    /// Axis id, unique within its tensor.
    pub id: String,
    /// Size expression.
    pub size: SizeExpr,
    /// Unreliable margin on each edge, if declared.
    pub halo: Option<u64>,
}

impl TensorAxisDescr {
    /// An axis without halo.
    pub fn new(id: &str, size: SizeExpr) -> Self {
        Self {
            id: id.to_string(),
            size,
            halo: None,
        }
    }

    /// Attach a halo.
    pub fn with_halo(mut self, halo: u64) -> Self {
        self.halo = Some(halo);
        self
    }
}

/// All axes of one tensor, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TensorShapeDescr {
    /// Tensor id.
    pub tensor_id: String,
    /// Axes in declaration order.
    pub axes: Vec<TensorAxisDescr>,
}

impl TensorShapeDescr {
    /// Build a tensor description.
    pub fn new(tensor_id: &str, axes: Vec<TensorAxisDescr>) -> Self {
        Self {
            tensor_id: tensor_id.to_string(),
            axes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_dependency() {
        let size = SizeExpr::reference("raw", "y", 2.0, 0);
        assert_eq!(size.dependency(), Some(AxisKey::new("raw", "y")));
        assert_eq!(SizeExpr::fixed(3).dependency(), None);
        assert_eq!(SizeExpr::parametrized(16, 8).dependency(), None);
    }

    #[test]
    fn axis_key_display() {
        assert_eq!(AxisKey::new("raw", "x").to_string(), "raw.x");
    }
}
