//! Allocator event model.
//!
//! One event renders as one line of text; `Display` *is* the wire encoding.
//! Hex fields are lowercase with no `0x` prefix.

use std::fmt;

/// Label carried by allocate events.
pub const MALLOC_LABEL: &str = "aa";
/// Label carried by free events.
pub const FREE_LABEL: &str = "aaa";
/// Label carried by corruption marker events.
pub const CORRUPT_LABEL: &str = "aa";
/// Diagnostic line emitted when an address candidate collides with a live
/// allocation. Not an event: consumers treat it as a retry notice.
pub const COLLISION_LINE: &str = "used";

/// A single allocator event as it appears on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocEvent {
    /// `m:<addr>,<size>,<label>`: allocate `size` bytes at `addr`.
    Malloc { addr: u64, size: u64, label: String },
    /// `f:<addr>,<label>`: release the allocation at `addr`.
    Free { addr: u64, label: String },
    /// `c:<addr>,aa`: synthetic corruption marker; carries no liveness
    /// information and may name any address.
    Corrupt { addr: u64 },
}

impl AllocEvent {
    /// Allocate event with the standard label.
    pub fn malloc(addr: u64, size: u64) -> Self {
        Self::Malloc {
            addr,
            size,
            label: MALLOC_LABEL.to_string(),
        }
    }

    /// Free event with the standard label.
    pub fn free(addr: u64) -> Self {
        Self::Free {
            addr,
            label: FREE_LABEL.to_string(),
        }
    }

    /// Address the event refers to.
    pub fn addr(&self) -> u64 {
        match self {
            Self::Malloc { addr, .. } | Self::Free { addr, .. } | Self::Corrupt { addr } => *addr,
        }
    }
}

impl fmt::Display for AllocEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malloc { addr, size, label } => write!(f, "m:{addr:x},{size:x},{label}"),
            Self::Free { addr, label } => write!(f, "f:{addr:x},{label}"),
            Self::Corrupt { addr } => write!(f, "c:{addr:x},{CORRUPT_LABEL}"),
        }
    }
}
