//! Sprite sheet animation library.
//!
//! Plays rows of a sprite sheet as named animation states, either looping or
//! once with a completion callback, throttled against the display refresh.
//!
//! There is no ECS; the modules split by role. [`components`] holds plain data
//! (state descriptors, frame geometry), [`resources`] the collaborators an
//! animator owns for its lifetime (state registry, refresh scheduler, canvas,
//! sheet image, config) and [`systems`] the animator that drives them each tick.

pub mod components;
pub mod error;
pub mod resources;
pub mod systems;
