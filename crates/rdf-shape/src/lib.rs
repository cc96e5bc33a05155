//! # rdf-shape — Tensor Shape Resolution
//!
//! Resolves the symbolic axis sizes of a model's input and output tensors
//! into concrete per-axis sizes.
//!
//! - **Descriptors** (`axis.rs`): [`TensorShapeDescr`] groups the
//!   [`TensorAxisDescr`]s of one tensor. Each axis carries a [`SizeExpr`]:
//!   a fixed integer, a parametrized `min + k * step`, or a reference to
//!   another tensor's axis with `scale` and `offset`.
//!
//! - **Resolver** (`resolve.rs`): builds the dependency graph in which a
//!   reference axis depends on the axis it names, orders it topologically,
//!   and evaluates sizes in that order.
//!
//! ## Size Rules
//!
//! ```text
//! fixed(n)                        = n
//! parametrized(min, step)         = min + k * step      (k = 0 unless supplied)
//! reference(t, a, scale, offset)  = size(t.a) * scale + 2 * offset
//! ```
//!
//! Halo is attached to the resolved axis as metadata and never subtracted.
//!
//! ## Failure Modes
//!
//! A self-reference or reference loop is [`ShapeError::Cycle`]; a reference
//! to a tensor or axis that does not exist is
//! [`ShapeError::DanglingReference`].

pub mod axis;
pub mod error;
pub mod resolve;

pub use axis::{AxisKey, SizeExpr, TensorAxisDescr, TensorShapeDescr};
pub use error::ShapeError;
pub use resolve::{first_duplicate_id, resolve_shapes, ResolvedAxis, ResolvedShapes, ShapeResolver};
