//! Type-safe wrapper for boolean variables.
//!
//! This module provides the newtype used for boolean variable leaves and
//! quantifier binders, preventing accidental mixing of variable numbers with
//! node slots or ids.

use std::fmt;

/// A boolean variable identifier (1-indexed).
///
/// Variables name boolean leaves in the formula pool. Fresh Tseitin
/// substitutes draw from the same numbering, so variable identity is global
/// to one pool.
///
/// # Invariants
///
/// - Variable IDs must be >= 1 (0 is reserved).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Variable(u32);

impl Variable {
    /// Creates a new variable with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if `id == 0`. Variables must be 1-indexed.
    pub fn new(id: u32) -> Self {
        assert_ne!(id, 0, "Variable IDs must be >= 1");
        Variable(id)
    }

    /// Returns the raw variable ID as a `u32`.
    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl From<Variable> for u32 {
    fn from(var: Variable) -> Self {
        var.0
    }
}

impl From<u32> for Variable {
    fn from(id: u32) -> Self {
        Variable::new(id)
    }
}
