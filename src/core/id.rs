//=========================================================================
// Unique Identifiers
//=========================================================================
//
// Process-wide source of 64-bit identifiers used as listener handles.
//
// A single atomically incremented counter. Values are unique for the
// lifetime of the process; no ordering is promised across threads beyond
// uniqueness.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

//=== UniqueId ============================================================

/// Opaque 64-bit identifier, never reused within a process run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UniqueId(u64);

impl UniqueId {
    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//=== IdGenerator =========================================================

/// Monotonic identifier source.
///
/// The engine uses the process-wide instance returned by
/// [`IdGenerator::global`]; standalone generators exist for isolation.
#[derive(Debug)]
pub struct IdGenerator {
    next: AtomicU64,
}

static GLOBAL: IdGenerator = IdGenerator::new();

impl IdGenerator {
    /// Creates a generator whose first id is 1.
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// The process-wide generator, alive from process start.
    pub fn global() -> &'static IdGenerator {
        &GLOBAL
    }

    /// Returns a fresh id. Safe to call from any thread.
    pub fn next(&self) -> UniqueId {
        UniqueId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
