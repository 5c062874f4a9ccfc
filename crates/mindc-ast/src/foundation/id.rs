//! Stable handles into the definition arena.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle of a [`Definition`](crate::ast::Definition) stored in a
/// compilation context arena.
///
/// Handles stay valid for the lifetime of the context. Replacing the
/// definition stored behind a handle (capability upgrade, extends merge) is
/// visible to every holder of the handle, which is how "replace everywhere"
/// is achieved without aliasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DefId(u32);

impl DefId {
    /// Create a handle from an arena index.
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Arena index of this handle.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
