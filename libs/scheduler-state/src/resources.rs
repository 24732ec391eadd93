//! Scalar and generic resource accounting types.

use serde::{Deserialize, Serialize};

use crate::generic_resource::{GenericDemand, GenericResource};

/// A concrete resource pool: what a node has, or has left.
///
/// Scalars are signed so the available-resources ledger can dip below
/// zero when the store reports more reservations than the node's
/// advertised capacity; placement filters treat that as "full".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    /// Memory in bytes.
    pub memory_bytes: i64,

    /// CPU in billionths of a core.
    pub nano_cpus: i64,

    /// Discrete or named generic resources (e.g. attached devices).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic: Vec<GenericResource>,
}

impl Resources {
    /// Creates a pool with the given scalars and no generic resources.
    pub fn new(memory_bytes: i64, nano_cpus: i64) -> Self {
        Self {
            memory_bytes,
            nano_cpus,
            generic: Vec::new(),
        }
    }

    /// Adds generic resources to the pool.
    #[must_use]
    pub fn with_generic(mut self, generic: Vec<GenericResource>) -> Self {
        self.generic = generic;
        self
    }
}

/// A resource demand carried on a task as its reservation.
///
/// Unlike [`Resources`], generic entries here are always discrete
/// ("2 of kind gpu"); the allocator decides which concrete items
/// satisfy them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
    /// Reserved memory in bytes.
    pub memory_bytes: i64,

    /// Reserved CPU in billionths of a core.
    pub nano_cpus: i64,

    /// Generic resource demands.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic: Vec<GenericDemand>,
}

impl ResourceSpec {
    /// Creates a demand for the given scalars and no generic resources.
    pub fn new(memory_bytes: i64, nano_cpus: i64) -> Self {
        Self {
            memory_bytes,
            nano_cpus,
            generic: Vec::new(),
        }
    }

    /// Adds generic demands to the spec.
    #[must_use]
    pub fn with_generic(mut self, generic: Vec<GenericDemand>) -> Self {
        self.generic = generic;
        self
    }
}
