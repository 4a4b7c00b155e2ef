//! Playback state descriptors.
//!
//! A state is one row of the sprite sheet plus a frame range and a loop flag.
//! Descriptors are immutable once created; the animator clones the one it is
//! playing so that removing a state mid-playback does not disturb the run.

use serde::{Deserialize, Serialize};

use crate::error::{SpriteError, SpriteResult};

/// Immutable description of a named animation state.
///
/// Indices are stored 0-based. Use [`StateDescriptor::create`] to build one
/// from the 1-based numbers a human reads off the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawState")]
pub struct StateDescriptor {
    /// Identifier, unique within one animator.
    pub id: String,
    /// Zero-based sheet row. Frame Y origin is `row * frame_height`.
    pub row: u32,
    /// Zero-based index of the last frame; frames cycle in `[0, last_frame]`.
    pub last_frame: u32,
    /// `true` repeats until stopped or replaced, `false` plays once.
    #[serde(rename = "loop")]
    pub looped: bool,
}

/// Wire form, checked through [`StateDescriptor::create`] on the way in.
#[derive(Deserialize)]
struct RawState {
    id: String,
    row: u32,
    last_frame: u32,
    #[serde(rename = "loop")]
    looped: bool,
}

impl TryFrom<RawState> for StateDescriptor {
    type Error = SpriteError;

    fn try_from(raw: RawState) -> SpriteResult<Self> {
        // `u32::MAX` has no 1-based counterpart.
        let Some(row) = raw.row.checked_add(1) else {
            return Err(SpriteError::OutOfRange { id: raw.id, field: "row" });
        };
        let Some(frames) = raw.last_frame.checked_add(1) else {
            return Err(SpriteError::OutOfRange { id: raw.id, field: "last_frame" });
        };
        Self::create(raw.id, row, frames, raw.looped)
    }
}

impl StateDescriptor {
    /// Build a descriptor from 1-based inputs.
    ///
    /// `row` is the sheet row counted from 1 and `frames` the number of
    /// frames in that row. Both are stored minus one.
    pub fn create(id: impl Into<String>, row: u32, frames: u32, looped: bool) -> SpriteResult<Self> {
        let id = id.into();
        let Some(row) = row.checked_sub(1) else {
            return Err(SpriteError::ZeroBased { id, field: "row" });
        };
        let Some(last_frame) = frames.checked_sub(1) else {
            return Err(SpriteError::ZeroBased { id, field: "frames" });
        };
        Ok(Self {
            id,
            row,
            last_frame,
            looped,
        })
    }

    /// Number of frames in the state.
    pub fn frame_count(&self) -> u64 {
        u64::from(self.last_frame) + 1
    }
}
