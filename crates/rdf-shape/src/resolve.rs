//! # Shape Resolver
//!
//! Resolves every axis of a set of tensors to a concrete size.
//!
//! ## Algorithm
//!
//! 1. Index all axes by [`AxisKey`], rejecting duplicate ids per tensor.
//! 2. Check every reference target exists; self-references are cycles.
//! 3. Kahn's algorithm over the reference edges. Axes without a dependency
//!    seed the queue in declaration order, so the evaluation order is
//!    deterministic.
//! 4. Anything left unprocessed lies on (or behind) a cycle. Each axis has
//!    at most one outgoing reference, so following references from any
//!    leftover axis reaches the loop, which is reported.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::axis::{AxisKey, SizeExpr, TensorAxisDescr, TensorShapeDescr};
use crate::error::ShapeError;

/// Computed values are accepted as integers within this distance.
const INTEGRAL_TOLERANCE: f64 = 1e-6;

/// A resolved axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedAxis {
    /// Concrete size.
    pub size: u64,
    /// Halo carried over from the descriptor.
    pub halo: Option<u64>,
    /// The expression the size was computed from.
    pub expr: SizeExpr,
}

/// Concrete sizes for every axis of a set of tensors.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedShapes {
    axes: BTreeMap<AxisKey, ResolvedAxis>,
    #[serde(skip)]
    declaration_order: Vec<AxisKey>,
}

impl ResolvedShapes {
    /// The resolved axis, if it exists.
    pub fn get(&self, tensor_id: &str, axis_id: &str) -> Option<&ResolvedAxis> {
        self.axes.get(&AxisKey::new(tensor_id, axis_id))
    }

    /// The resolved size, if the axis exists.
    pub fn size(&self, tensor_id: &str, axis_id: &str) -> Option<u64> {
        self.get(tensor_id, axis_id).map(|a| a.size)
    }

    /// `(axis_id, size)` pairs of one tensor in declaration order.
    pub fn tensor_shape(&self, tensor_id: &str) -> Vec<(&str, u64)> {
        self.declaration_order
            .iter()
            .filter(|k| k.tensor_id == tensor_id)
            .filter_map(|k| self.axes.get(k).map(|a| (k.axis_id.as_str(), a.size)))
            .collect()
    }

    /// All resolved axes, ordered by key.
    pub fn iter(&self) -> impl Iterator<Item = (&AxisKey, &ResolvedAxis)> {
        self.axes.iter()
    }

    /// Number of resolved axes.
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    /// Whether no axes were resolved.
    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }
}

/// The first tensor id or axis key declared more than once, in declaration
/// order. Resolution is only meaningful when this is `None`.
pub fn first_duplicate_id(tensors: &[TensorShapeDescr]) -> Option<String> {
    let mut tensor_ids = HashSet::new();
    let mut axis_keys = HashSet::new();
    for tensor in tensors {
        if !tensor_ids.insert(tensor.tensor_id.as_str()) {
            return Some(tensor.tensor_id.clone());
        }
        for axis in &tensor.axes {
            let key = AxisKey::new(&tensor.tensor_id, &axis.id);
            if axis_keys.contains(&key) {
                return Some(key.to_string());
            }
            axis_keys.insert(key);
        }
    }
    None
}

/// Resolve a set of tensors with every parametrized axis at its minimum.
pub fn resolve_shapes(tensors: &[TensorShapeDescr]) -> Result<ResolvedShapes, ShapeError> {
    ShapeResolver::new(tensors).resolve()
}

/// Configurable shape resolution.
///
/// Parametrized axes resolve to `min` unless a step count `k` is supplied
/// with [`ShapeResolver::with_step_count`], in which case they resolve to
/// `min + k * step`. Reference axes see the adjusted size.
#[derive(Debug, Clone)]
pub struct ShapeResolver<'a> {
    tensors: &'a [TensorShapeDescr],
    step_counts: HashMap<AxisKey, u64>,
}

impl<'a> ShapeResolver<'a> {
    /// A resolver over the given tensors.
    pub fn new(tensors: &'a [TensorShapeDescr]) -> Self {
        Self {
            tensors,
            step_counts: HashMap::new(),
        }
    }

    /// Use `k` steps for a parametrized axis. Ignored for other axes.
    pub fn with_step_count(mut self, tensor_id: &str, axis_id: &str, k: u64) -> Self {
        self.step_counts.insert(AxisKey::new(tensor_id, axis_id), k);
        self
    }

    /// Resolve all axes.
    pub fn resolve(&self) -> Result<ResolvedShapes, ShapeError> {
        let mut index: HashMap<AxisKey, &TensorAxisDescr> = HashMap::new();
        let mut declaration_order = Vec::new();
        for tensor in self.tensors {
            for axis in &tensor.axes {
                let key = AxisKey::new(&tensor.tensor_id, &axis.id);
                if index.insert(key.clone(), axis).is_some() {
                    return Err(ShapeError::DuplicateAxis(key));
                }
                declaration_order.push(key);
            }
        }

        // Reference edges: dependents[target] lists the axes that need it.
        let mut dependents: HashMap<&AxisKey, Vec<&AxisKey>> = HashMap::new();
        let mut queue: VecDeque<&AxisKey> = VecDeque::new();
        for key in &declaration_order {
            match index[key].size.dependency() {
                Some(target) => {
                    if &target == key {
                        return Err(ShapeError::Cycle {
                            path: vec![key.clone(), key.clone()],
                        });
                    }
                    let Some((target_key, _)) = index.get_key_value(&target) else {
                        return Err(ShapeError::DanglingReference {
                            from: key.clone(),
                            to: target,
                        });
                    };
                    dependents.entry(target_key).or_default().push(key);
                }
                None => queue.push_back(key),
            }
        }

        let mut axes: BTreeMap<AxisKey, ResolvedAxis> = BTreeMap::new();
        while let Some(key) = queue.pop_front() {
            let descr = index[key];
            let size = self.evaluate(key, &descr.size, &axes)?;
            tracing::trace!(axis = %key, size, "resolved axis size");
            axes.insert(
                key.clone(),
                ResolvedAxis {
                    size,
                    halo: descr.halo,
                    expr: descr.size.clone(),
                },
            );
            if let Some(next) = dependents.get(key) {
                queue.extend(next.iter().copied());
            }
        }

        if axes.len() < declaration_order.len() {
            return Err(ShapeError::Cycle {
                path: find_cycle(&declaration_order, &index, &axes),
            });
        }

        tracing::debug!(axes = axes.len(), "resolved tensor shapes");
        Ok(ResolvedShapes {
            axes,
            declaration_order,
        })
    }

    fn evaluate(
        &self,
        key: &AxisKey,
        expr: &SizeExpr,
        resolved: &BTreeMap<AxisKey, ResolvedAxis>,
    ) -> Result<u64, ShapeError> {
        match expr {
            SizeExpr::Fixed { size } => Ok(*size),
            SizeExpr::Parametrized { min, step } => {
                let k = self.step_counts.get(key).copied().unwrap_or(0);
                step.checked_mul(k)
                    .and_then(|grow| min.checked_add(grow))
                    .ok_or_else(|| ShapeError::InvalidSize {
                        axis: key.clone(),
                        value: *min as f64 + (*step as f64) * (k as f64),
                    })
            }
            SizeExpr::Reference {
                tensor_id,
                axis_id,
                scale,
                offset,
            } => {
                // Kahn's order guarantees the target is already resolved.
                let target = AxisKey::new(tensor_id, axis_id);
                let base = resolved.get(&target).map(|a| a.size).ok_or_else(|| {
                    ShapeError::DanglingReference {
                        from: key.clone(),
                        to: target.clone(),
                    }
                })?;
                let value = base as f64 * scale + 2.0 * (*offset as f64);
                to_size(key, value)
            }
        }
    }
}

fn to_size(key: &AxisKey, value: f64) -> Result<u64, ShapeError> {
    let rounded = value.round();
    let valid = value.is_finite()
        && rounded >= 0.0
        && (value - rounded).abs() <= INTEGRAL_TOLERANCE
        && rounded <= u64::MAX as f64;
    if valid {
        Ok(rounded as u64)
    } else {
        Err(ShapeError::InvalidSize {
            axis: key.clone(),
            value,
        })
    }
}

/// Follow references from the first unresolved axis until one repeats.
fn find_cycle(
    declaration_order: &[AxisKey],
    index: &HashMap<AxisKey, &TensorAxisDescr>,
    resolved: &BTreeMap<AxisKey, ResolvedAxis>,
) -> Vec<AxisKey> {
    let Some(start) = declaration_order.iter().find(|k| !resolved.contains_key(*k)) else {
        return Vec::new();
    };

    let mut walk: Vec<AxisKey> = Vec::new();
    let mut seen: HashSet<AxisKey> = HashSet::new();
    let mut current = start.clone();
    while seen.insert(current.clone()) {
        walk.push(current.clone());
        match index.get(&current).and_then(|a| a.size.dependency()) {
            Some(next) => current = next,
            None => return walk,
        }
    }

    // `current` is the first repeated axis; the loop starts at its first visit.
    let loop_start = walk.iter().position(|k| *k == current).unwrap_or(0);
    let mut path = walk.split_off(loop_start);
    path.push(current);
    path
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// A chain of doubling references multiplies the root size by 2^n.
        #[test]
        fn reference_chain_multiplies(root in 1u64..1000, depth in 1usize..12) {
            let mut tensors = vec![TensorShapeDescr::new(
                "t0",
                vec![TensorAxisDescr::new("x", SizeExpr::fixed(root))],
            )];
            for i in 1..=depth {
                let prev = format!("t{}", i - 1);
                tensors.push(TensorShapeDescr::new(
                    &format!("t{i}"),
                    vec![TensorAxisDescr::new("x", SizeExpr::reference(&prev, "x", 2.0, 0))],
                ));
            }
            // Reverse so dependents are declared before their targets.
            tensors.reverse();
            let shapes = resolve_shapes(&tensors).unwrap();
            let last = format!("t{depth}");
            prop_assert_eq!(shapes.size(&last, "x"), Some(root << depth));
        }

        /// Closing any chain into a ring is always reported as a cycle.
        #[test]
        fn ring_is_always_a_cycle(len in 1usize..10) {
            let tensors: Vec<_> = (0..len)
                .map(|i| {
                    let next = format!("t{}", (i + 1) % len);
                    TensorShapeDescr::new(
                        &format!("t{i}"),
                        vec![TensorAxisDescr::new("x", SizeExpr::reference(&next, "x", 1.0, 0))],
                    )
                })
                .collect();
            let is_cycle = matches!(resolve_shapes(&tensors), Err(ShapeError::Cycle { .. }));
            prop_assert!(is_cycle);
        }
    }
}
