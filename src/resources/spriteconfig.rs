//! Sprite configuration.
//!
//! Everything needed to build a [`SpriteAnimator`](crate::systems::animator::SpriteAnimator):
//! the sheet locator, frame size, display scale, stagger and the states the
//! sheet contains. Can be built in code or loaded from an INI file.
//!
//! # Configuration File Format
//!
//! ```ini
//! [sprite]
//! id = hero
//! sheet = assets/hero.png
//! width = 32
//! height = 32
//! scale = 2
//! stagger = 5
//! launch = idle
//!
//! [state.idle]
//! row = 1
//! frames = 4
//! loop = true
//!
//! [state.jump]
//! row = 2
//! frames = 3
//! loop = false
//! ```
//!
//! Rows and frame counts in the file are 1-based, as read off the sheet.

use std::path::Path;

use configparser::ini::Ini;
use log::info;

use crate::components::spritestate::StateDescriptor;
use crate::error::{SpriteError, SpriteResult};

const SPRITE_SECTION: &str = "sprite";
const STATE_PREFIX: &str = "state.";
const DEFAULT_SCALE: f32 = 1.0;
const DEFAULT_STAGGER: u32 = 0;
pub const DEFAULT_CONFIG_PATH: &str = "./sprite.ini";

/// Construction parameters for one animated sprite.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteConfig {
    pub id: String,
    /// Path or URL of the sprite sheet image.
    pub sheet: String,
    /// Width of one frame in the sheet, in pixels.
    pub frame_width: f32,
    /// Height of one frame in the sheet, in pixels.
    pub frame_height: f32,
    /// Display scale factor.
    pub scale: f32,
    /// Ticks skipped between frame advances. A frame is drawn every
    /// `stagger + 1` ticks.
    pub stagger: u32,
    /// State seeded first into the registry.
    pub launch: StateDescriptor,
    /// Further states registered after the launch state.
    pub states: Vec<StateDescriptor>,
}

impl SpriteConfig {
    /// Create a configuration with scale 1, no stagger and only the launch state.
    pub fn new(
        id: impl Into<String>,
        sheet: impl Into<String>,
        frame_width: f32,
        frame_height: f32,
        launch: StateDescriptor,
    ) -> Self {
        Self {
            id: id.into(),
            sheet: sheet.into(),
            frame_width,
            frame_height,
            scale: DEFAULT_SCALE,
            stagger: DEFAULT_STAGGER,
            launch,
            states: Vec::new(),
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_stagger(mut self, stagger: u32) -> Self {
        self.stagger = stagger;
        self
    }

    pub fn with_state(mut self, state: StateDescriptor) -> Self {
        self.states.push(state);
        self
    }

    /// Load configuration from an INI file.
    pub fn load_from_file(path: impl AsRef<Path>) -> SpriteResult<Self> {
        let path = path.as_ref();
        let mut ini = Ini::new_cs();
        ini.load(path)
            .map_err(|e| SpriteError::Config(format!("failed to load {}: {}", path.display(), e)))?;
        let config = Self::from_ini(&ini)?;
        info!(
            "Loaded sprite '{}' from {}: {}x{} at scale {}, stagger={}, {} state(s)",
            config.id,
            path.display(),
            config.frame_width,
            config.frame_height,
            config.scale,
            config.stagger,
            config.states.len() + 1
        );
        Ok(config)
    }

    /// Parse configuration from INI text.
    pub fn from_ini_str(text: &str) -> SpriteResult<Self> {
        let mut ini = Ini::new_cs();
        ini.read(text.to_string()).map_err(SpriteError::Config)?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> SpriteResult<Self> {
        let id = required(ini, SPRITE_SECTION, "id")?;
        let sheet = required(ini, SPRITE_SECTION, "sheet")?;
        let frame_width = float(ini, SPRITE_SECTION, "width")?
            .ok_or_else(|| missing(SPRITE_SECTION, "width"))?;
        let frame_height = float(ini, SPRITE_SECTION, "height")?
            .ok_or_else(|| missing(SPRITE_SECTION, "height"))?;
        let scale = float(ini, SPRITE_SECTION, "scale")?.unwrap_or(DEFAULT_SCALE);
        let stagger = match ini.getuint(SPRITE_SECTION, "stagger").map_err(SpriteError::Config)? {
            Some(value) => u32::try_from(value)
                .map_err(|_| SpriteError::Config(format!("stagger {} out of range", value)))?,
            None => DEFAULT_STAGGER,
        };
        let launch_id = required(ini, SPRITE_SECTION, "launch")?;

        let mut sections: Vec<String> = ini
            .sections()
            .into_iter()
            .filter(|s| s.starts_with(STATE_PREFIX))
            .collect();
        sections.sort_unstable();

        let mut launch = None;
        let mut states = Vec::with_capacity(sections.len());
        for section in &sections {
            let state = parse_state(ini, section)?;
            if state.id == launch_id {
                launch = Some(state);
            } else {
                states.push(state);
            }
        }
        let launch = launch.ok_or(SpriteError::UnknownLaunch(launch_id))?;

        Ok(Self {
            id,
            sheet,
            frame_width,
            frame_height,
            scale,
            stagger,
            launch,
            states,
        })
    }

    /// Save configuration to an INI file, overwriting it.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> SpriteResult<()> {
        let path = path.as_ref();
        let mut ini = Ini::new_cs();
        ini.set(SPRITE_SECTION, "id", Some(self.id.clone()));
        ini.set(SPRITE_SECTION, "sheet", Some(self.sheet.clone()));
        ini.set(SPRITE_SECTION, "width", Some(self.frame_width.to_string()));
        ini.set(SPRITE_SECTION, "height", Some(self.frame_height.to_string()));
        ini.set(SPRITE_SECTION, "scale", Some(self.scale.to_string()));
        ini.set(SPRITE_SECTION, "stagger", Some(self.stagger.to_string()));
        ini.set(SPRITE_SECTION, "launch", Some(self.launch.id.clone()));
        for state in std::iter::once(&self.launch).chain(&self.states) {
            let section = format!("{}{}", STATE_PREFIX, state.id);
            ini.set(&section, "row", Some((u64::from(state.row) + 1).to_string()));
            ini.set(&section, "frames", Some(state.frame_count().to_string()));
            ini.set(&section, "loop", Some(state.looped.to_string()));
        }
        ini.write(path)?;
        info!("Saved sprite '{}' to {}", self.id, path.display());
        Ok(())
    }

    /// Parse a JSON array of 0-based state descriptors.
    ///
    /// ```json
    /// [{"id": "walk", "row": 0, "last_frame": 3, "loop": true}]
    /// ```
    pub fn states_from_json(json: &str) -> SpriteResult<Vec<StateDescriptor>> {
        Ok(serde_json::from_str(json)?)
    }
}

fn missing(section: &str, key: &str) -> SpriteError {
    SpriteError::MissingKey {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn required(ini: &Ini, section: &str, key: &str) -> SpriteResult<String> {
    ini.get(section, key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| missing(section, key))
}

fn float(ini: &Ini, section: &str, key: &str) -> SpriteResult<Option<f32>> {
    Ok(ini
        .getfloat(section, key)
        .map_err(SpriteError::Config)?
        .map(|v| v as f32))
}

fn parse_state(ini: &Ini, section: &str) -> SpriteResult<StateDescriptor> {
    let id = &section[STATE_PREFIX.len()..];
    let uint = |key: &str| -> SpriteResult<u32> {
        let value = ini
            .getuint(section, key)
            .map_err(SpriteError::Config)?
            .ok_or_else(|| missing(section, key))?;
        u32::try_from(value)
            .map_err(|_| SpriteError::Config(format!("[{}] {} = {} out of range", section, key, value)))
    };
    let row = uint("row")?;
    let frames = uint("frames")?;
    let looped = ini
        .getbool(section, "loop")
        .map_err(SpriteError::Config)?
        .unwrap_or(true);
    StateDescriptor::create(id, row, frames, looped)
}
