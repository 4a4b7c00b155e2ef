//! Plain data describing sprites.
//!
//! Submodules overview:
//! - [`resolution`] – frame geometry: sheet regions and scaled surface size
//! - [`spritestate`] – immutable descriptors of named animation states

pub mod resolution;
pub mod spritestate;
