//! Claim and reclaim of generic resources from a node's pool.
//!
//! Generic resources are capacity items distinct from scalar
//! memory/CPU: either **named** (a specific attached device, handed
//! out whole) or **discrete** (an anonymous counter of identical
//! items). Tasks demand discrete amounts per kind; the claim operation
//! decides which concrete items satisfy the demand and returns the
//! resulting assignment, which the ledger records on the task so the
//! exact same items can be reclaimed later.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A concrete generic resource held by a node or assigned to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenericResource {
    /// A specific, individually identified item of some kind.
    Named {
        /// Resource kind, e.g. "gpu".
        kind: String,
        /// Identity of this particular item, e.g. "gpu-uuid-1".
        id: String,
    },

    /// An anonymous counter of interchangeable items of some kind.
    Discrete {
        /// Resource kind, e.g. "ssd-slot".
        kind: String,
        /// Number of items.
        units: i64,
    },
}

impl GenericResource {
    /// Creates a named resource.
    pub fn named(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Named {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Creates a discrete resource counter.
    pub fn discrete(kind: impl Into<String>, units: i64) -> Self {
        Self::Discrete {
            kind: kind.into(),
            units,
        }
    }

    /// Returns the resource kind.
    pub fn kind(&self) -> &str {
        match self {
            Self::Named { kind, .. } | Self::Discrete { kind, .. } => kind,
        }
    }

    /// Number of items this entry represents (1 for named).
    pub fn units(&self) -> i64 {
        match self {
            Self::Named { .. } => 1,
            Self::Discrete { units, .. } => *units,
        }
    }
}

/// A task's demand for generic resources of one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericDemand {
    /// Resource kind demanded.
    pub kind: String,

    /// Number of items demanded.
    pub units: i64,
}

impl GenericDemand {
    /// Creates a demand for `units` items of `kind`.
    pub fn new(kind: impl Into<String>, units: i64) -> Self {
        Self {
            kind: kind.into(),
            units,
        }
    }
}

/// Errors from claiming generic resources.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClaimError {
    /// The pool cannot cover a demand.
    #[error("insufficient generic resource '{kind}': requested {requested}, available {available}")]
    Insufficient {
        kind: String,
        requested: i64,
        available: i64,
    },
}

/// Total items of `kind` in the pool, counting named entries as one each.
pub fn available_units(pool: &[GenericResource], kind: &str) -> i64 {
    pool.iter()
        .filter(|r| r.kind() == kind)
        .map(GenericResource::units)
        .sum()
}

/// Satisfies `demand` from `pool`, subtracting the claimed items and
/// returning them as the task's assignment.
///
/// Named items of a kind are handed out before the discrete counter of
/// that kind is drawn down. The operation is atomic: if any demand
/// cannot be covered, the pool is left untouched and an error is
/// returned.
pub fn claim(
    pool: &mut Vec<GenericResource>,
    demand: &[GenericDemand],
) -> Result<Vec<GenericResource>, ClaimError> {
    for d in demand {
        let available = available_units(pool, &d.kind);
        if available < d.units {
            return Err(ClaimError::Insufficient {
                kind: d.kind.clone(),
                requested: d.units,
                available,
            });
        }
    }

    let mut assignment = Vec::new();
    for d in demand {
        let mut remaining = d.units;

        // Named items first.
        let mut i = 0;
        while i < pool.len() && remaining > 0 {
            if matches!(&pool[i], GenericResource::Named { kind, .. } if kind == &d.kind) {
                assignment.push(pool.swap_remove(i));
                remaining -= 1;
            } else {
                i += 1;
            }
        }

        // The discrete counter covers the rest.
        for entry in pool.iter_mut() {
            if remaining == 0 {
                break;
            }
            if let GenericResource::Discrete { kind, units } = entry {
                if *kind == d.kind && *units > 0 {
                    let take = remaining.min(*units);
                    *units -= take;
                    remaining -= take;
                    assignment.push(GenericResource::Discrete {
                        kind: kind.clone(),
                        units: take,
                    });
                }
            }
        }

        debug_assert_eq!(remaining, 0, "claim was validated against the pool");
    }

    pool.retain(|r| r.units() > 0);

    Ok(assignment)
}

/// Returns a previously claimed `assignment` to `pool`.
///
/// `baseline` is the node's full generic capacity; discrete counters
/// are capped at the baseline amount for their kind so a duplicated
/// release cannot inflate the pool past what the node actually has.
pub fn reclaim(
    pool: &mut Vec<GenericResource>,
    assignment: &[GenericResource],
    baseline: &[GenericResource],
) {
    for item in assignment {
        match item {
            GenericResource::Named { .. } => {
                if !pool.contains(item) {
                    pool.push(item.clone());
                }
            }
            GenericResource::Discrete { kind, units } => {
                let cap = available_units(baseline, kind);
                let current = available_units(pool, kind);
                let add = (*units).min(cap - current).max(0);
                if add == 0 {
                    continue;
                }

                let counter = pool.iter_mut().find_map(|r| match r {
                    GenericResource::Discrete { kind: k, units } if k == kind => Some(units),
                    _ => None,
                });
                match counter {
                    Some(units) => *units += add,
                    None => pool.push(GenericResource::Discrete {
                        kind: kind.clone(),
                        units: add,
                    }),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gpu_pool() -> Vec<GenericResource> {
        vec![
            GenericResource::named("gpu", "gpu-0"),
            GenericResource::named("gpu", "gpu-1"),
            GenericResource::discrete("ssd-slot", 4),
        ]
    }

    #[test]
    fn test_claim_prefers_named() {
        let mut pool = gpu_pool();
        let assignment = claim(&mut pool, &[GenericDemand::new("gpu", 2)]).unwrap();

        assert_eq!(assignment.len(), 2);
        assert!(assignment.iter().all(|r| matches!(r, GenericResource::Named { .. })));
        assert_eq!(available_units(&pool, "gpu"), 0);
        assert_eq!(available_units(&pool, "ssd-slot"), 4);
    }

    #[test]
    fn test_claim_draws_down_discrete() {
        let mut pool = gpu_pool();
        let assignment = claim(&mut pool, &[GenericDemand::new("ssd-slot", 3)]).unwrap();

        assert_eq!(
            assignment,
            vec![GenericResource::discrete("ssd-slot", 3)]
        );
        assert_eq!(available_units(&pool, "ssd-slot"), 1);
    }

    #[test]
    fn test_claim_insufficient_leaves_pool_untouched() {
        let mut pool = gpu_pool();
        let before = pool.clone();

        let err = claim(
            &mut pool,
            &[
                GenericDemand::new("ssd-slot", 2),
                GenericDemand::new("gpu", 3),
            ],
        )
        .unwrap_err();

        assert_eq!(
            err,
            ClaimError::Insufficient {
                kind: "gpu".to_string(),
                requested: 3,
                available: 2,
            }
        );
        assert_eq!(pool, before);
    }

    #[test]
    fn test_claim_removes_exhausted_counters() {
        let mut pool = vec![GenericResource::discrete("ssd-slot", 2)];
        claim(&mut pool, &[GenericDemand::new("ssd-slot", 2)]).unwrap();
        assert!(pool.is_empty());
    }

    #[test]
    fn test_reclaim_restores_pool() {
        let baseline = gpu_pool();
        let mut pool = gpu_pool();

        let assignment = claim(
            &mut pool,
            &[
                GenericDemand::new("gpu", 2),
                GenericDemand::new("ssd-slot", 3),
            ],
        )
        .unwrap();
        reclaim(&mut pool, &assignment, &baseline);

        assert_eq!(available_units(&pool, "gpu"), 2);
        assert_eq!(available_units(&pool, "ssd-slot"), 4);
    }

    #[test]
    fn test_reclaim_caps_at_baseline() {
        let baseline = vec![GenericResource::discrete("ssd-slot", 4)];
        let mut pool = vec![GenericResource::discrete("ssd-slot", 3)];

        // Releasing more than was ever missing must not exceed capacity.
        reclaim(
            &mut pool,
            &[GenericResource::discrete("ssd-slot", 5)],
            &baseline,
        );
        assert_eq!(available_units(&pool, "ssd-slot"), 4);
    }

    #[test]
    fn test_reclaim_ignores_duplicate_named() {
        let baseline = vec![GenericResource::named("gpu", "gpu-0")];
        let mut pool = vec![GenericResource::named("gpu", "gpu-0")];

        reclaim(
            &mut pool,
            &[GenericResource::named("gpu", "gpu-0")],
            &baseline,
        );
        assert_eq!(pool.len(), 1);
    }
}
