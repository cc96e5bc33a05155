//! # Shape Errors
//!
//! Inconsistencies in the tensor axis graph. These are fail-fast: a graph
//! that cannot be resolved has no meaningful partial result.

use thiserror::Error;

use crate::axis::AxisKey;

/// Why a set of tensor shapes could not be resolved.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    /// Axes reference each other in a loop (including self-references).
    #[error("cyclic axis reference: {}", render_path(.path))]
    Cycle {
        /// The loop, with the first axis repeated at the end.
        path: Vec<AxisKey>,
    },

    /// An axis references a tensor or axis that does not exist.
    #[error("axis {from} references unknown axis {to}")]
    DanglingReference {
        /// The referencing axis.
        from: AxisKey,
        /// The missing target.
        to: AxisKey,
    },

    /// The same axis id appears twice in one tensor.
    #[error("axis {0} is declared more than once")]
    DuplicateAxis(AxisKey),

    /// A computed size is negative, non-integral, or overflows.
    #[error("axis {axis} resolves to invalid size {value}")]
    InvalidSize {
        /// The offending axis.
        axis: AxisKey,
        /// The computed value.
        value: f64,
    },
}

fn render_path(path: &[AxisKey]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_lists_path() {
        let err = ShapeError::Cycle {
            path: vec![
                AxisKey::new("a", "x"),
                AxisKey::new("b", "x"),
                AxisKey::new("a", "x"),
            ],
        };
        assert_eq!(err.to_string(), "cyclic axis reference: a.x -> b.x -> a.x");
    }
}
