//! # allocsim-core
//!
//! Foundation types for the synthetic allocator stream: the event model and
//! the live-address set the generator mutates.

pub mod events;
pub mod live;

pub use events::AllocEvent;
pub use live::LiveSet;
