//! Playback logic.
//!
//! - [`animator`] – the sprite animator state machine and render loop

pub mod animator;
