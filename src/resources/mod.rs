//! Long-lived collaborators owned by an animator.
//!
//! Overview
//! - `canvas` – drawing surface trait and the retained canvas implementation
//! - `scheduler` – per-refresh frame requests and cancellation by handle
//! - `sheetimage` – sprite sheet image handles with asynchronous readiness
//! - `spriteconfig` – construction parameters, loaded from INI or built in code
//! - `statestore` – registry of animation states keyed by id
pub mod canvas;
pub mod scheduler;
pub mod sheetimage;
pub mod spriteconfig;
pub mod statestore;
