//! ## allocsim-engine::tracker
//! **Consumer-side reconstruction of allocator state**
//!
//! Replays a parsed event stream into a chunk map and classifies the
//! anomalies a downstream visualizer cares about: allocations overlapping a
//! live chunk, frees of unknown addresses, and corruption markers. Overlap
//! queries go through a bucket index over the address space so each
//! allocation only inspects the buckets it spans.

use std::collections::HashMap;
use std::fmt;
use std::ops::RangeInclusive;

use allocsim_core::AllocEvent;

/// Bucket granularity for the overlap index.
pub const BUCKET_BYTES: u64 = 1024;

/// Synthetic size for chunks only known from a free or corruption marker.
const PLACEHOLDER_SIZE: u64 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkState {
    Ok,
    AlreadyUsed,
    AlreadyFreed,
    Corrupted,
}

impl fmt::Display for ChunkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkState::Ok => write!(f, "ok"),
            ChunkState::AlreadyUsed => write!(f, "already used"),
            ChunkState::AlreadyFreed => write!(f, "already freed"),
            ChunkState::Corrupted => write!(f, "corrupted"),
        }
    }
}

/// One tracked allocation.
#[derive(Clone, Debug)]
pub struct Chunk {
    pub ptr: u64,
    pub size: u64,
    pub label: String,
    pub state: ChunkState,
}

impl Chunk {
    fn new(ptr: u64, size: u64, label: String) -> Self {
        Self {
            ptr,
            size,
            label,
            state: ChunkState::Ok,
        }
    }

    fn placeholder(ptr: u64, state: ChunkState) -> Self {
        Self {
            ptr,
            size: PLACEHOLDER_SIZE,
            label: String::new(),
            state,
        }
    }

    /// Freed and corrupted chunks are ghosts: they stay visible but no
    /// longer occupy bytes for overlap purposes.
    fn solid(&self) -> bool {
        self.state != ChunkState::AlreadyFreed && self.state != ChunkState::Corrupted
    }

    fn overlaps(&self, other: &Chunk) -> bool {
        (self.solid() && other.solid())
            && ((self.ptr >= other.ptr && self.ptr < other.ptr.saturating_add(other.size))
                || (other.ptr >= self.ptr && other.ptr < self.ptr.saturating_add(self.size)))
    }

    fn bucket_range(&self) -> RangeInclusive<u64> {
        let first = self.ptr / BUCKET_BYTES;
        let last = self.ptr.saturating_add(self.size.saturating_sub(1)) / BUCKET_BYTES;
        first..=last
    }
}

/// Classification of events that contradict the tracked state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anomaly {
    /// An allocate landed on bytes already owned by a live chunk.
    OverlappingAlloc,
    /// A free named an address with no live allocation.
    UnknownFree,
    /// A corruption marker was observed.
    Corruption,
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::OverlappingAlloc => write!(f, "overlapping alloc"),
            Anomaly::UnknownFree => write!(f, "unknown free"),
            Anomaly::Corruption => write!(f, "corruption"),
        }
    }
}

/// Chunk map plus bucket index, fed one event at a time.
#[derive(Debug, Default)]
pub struct StreamTracker {
    chunks: HashMap<u64, Chunk>,
    buckets: HashMap<u64, Vec<u64>>,
}

impl StreamTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one event; returns the anomaly it exposed, if any.
    pub fn apply(&mut self, event: &AllocEvent) -> Option<Anomaly> {
        match event {
            AllocEvent::Malloc { addr, size, label } => self.alloc(*addr, *size, label.clone()),
            AllocEvent::Free { addr, .. } => self.free(*addr),
            AllocEvent::Corrupt { addr } => self.corrupt(*addr),
        }
    }

    pub fn chunk(&self, ptr: u64) -> Option<&Chunk> {
        self.chunks.get(&ptr)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Number of chunks still occupying memory (ghosts excluded).
    pub fn live_len(&self) -> usize {
        self.chunks.values().filter(|chunk| chunk.solid()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    fn collides(&self, chunk: &Chunk) -> bool {
        chunk.bucket_range().any(|idx| {
            self.buckets.get(&idx).is_some_and(|ptrs| {
                ptrs.iter().any(|ptr| {
                    self.chunks
                        .get(ptr)
                        .is_some_and(|other| chunk.overlaps(other))
                })
            })
        })
    }

    fn insert(&mut self, chunk: Chunk) {
        for idx in chunk.bucket_range() {
            self.buckets.entry(idx).or_default().push(chunk.ptr);
        }
        self.chunks.insert(chunk.ptr, chunk);
    }

    fn remove_from_buckets(&mut self, chunk: &Chunk) {
        for idx in chunk.bucket_range() {
            if let Some(ptrs) = self.buckets.get_mut(&idx) {
                ptrs.retain(|&ptr| ptr != chunk.ptr);
            }
        }
    }

    fn alloc(&mut self, ptr: u64, size: u64, label: String) -> Option<Anomaly> {
        // A re-allocation at a tracked address replaces the old chunk.
        if let Some(stale) = self.chunks.remove(&ptr) {
            self.remove_from_buckets(&stale);
        }

        let mut chunk = Chunk::new(ptr, size, label);
        let overlapping = self.collides(&chunk);
        if overlapping {
            chunk.state = ChunkState::AlreadyUsed;
        }
        self.insert(chunk);
        overlapping.then_some(Anomaly::OverlappingAlloc)
    }

    fn free(&mut self, ptr: u64) -> Option<Anomaly> {
        if let Some(chunk) = self.chunks.remove(&ptr) {
            self.remove_from_buckets(&chunk);
            return None;
        }
        self.insert(Chunk::placeholder(ptr, ChunkState::AlreadyFreed));
        Some(Anomaly::UnknownFree)
    }

    fn corrupt(&mut self, ptr: u64) -> Option<Anomaly> {
        if let Some(chunk) = self.chunks.get_mut(&ptr) {
            chunk.state = ChunkState::Corrupted;
        } else {
            self.insert(Chunk::placeholder(ptr, ChunkState::Corrupted));
        }
        Some(Anomaly::Corruption)
    }
}
