//! Sprite sheet animator.
//!
//! [`SpriteAnimator`] plays one named state at a time onto its [`Canvas`].
//! Playback is driven by the [`RefreshScheduler`]: every tick requests the
//! next one, and `play`/`stop` cancel the pending request before doing
//! anything else, so at most one render cycle is ever scheduled.
//!
//! # Tick Flow
//!
//! 1. The throttle counter counts ticks up to `stagger`. On the tick where it
//!    equals `stagger` the destination rect is cleared, the current frame is
//!    blitted and the counter resets; every other tick only increments it.
//! 2. On a drawing tick the frame advances. A looping cycle wraps from the
//!    last frame to 0. A one-shot cycle stops after drawing the last frame and
//!    fires its completion callback.
//! 3. Unless the one-shot just finished, the next tick is requested.
//!
//! # Example
//!
//! ```
//! use spriteanimator::components::spritestate::StateDescriptor;
//! use spriteanimator::resources::canvas::RetainedCanvas;
//! use spriteanimator::resources::sheetimage::SheetHandle;
//! use spriteanimator::resources::spriteconfig::SpriteConfig;
//! use spriteanimator::systems::animator::{PlaybackMode, SpriteAnimator};
//!
//! let walk = StateDescriptor::create("walk", 1, 4, true).unwrap();
//! let config = SpriteConfig::new("hero", "hero.png", 32.0, 32.0, walk);
//! let mut hero =
//!     SpriteAnimator::new(&config, RetainedCanvas::new(), SheetHandle::loaded("hero.png")).unwrap();
//!
//! hero.play("walk", None);
//! assert_eq!(hero.mode(), PlaybackMode::Looping);
//! hero.refresh();
//! assert_eq!(hero.node().draw_count(), 1);
//! ```

use log::{debug, info, warn};
use serde::Serialize;

use crate::components::resolution::FrameGeometry;
use crate::components::spritestate::StateDescriptor;
use crate::error::SpriteResult;
use crate::resources::canvas::{Canvas, SurfaceStyle};
use crate::resources::scheduler::{FrameHandle, RefreshScheduler};
use crate::resources::sheetimage::SheetImage;
use crate::resources::spriteconfig::SpriteConfig;
use crate::resources::statestore::{StateStore, StoreStatus};

/// Container the surface is mounted into when none is named.
pub const ROOT_CONTAINER: &str = "root";

/// Called once when a one-shot state finishes on its own.
///
/// Receives the animator, so it can chain into another state or stop.
pub type CompletionCallback<C, I> = Box<dyn FnOnce(&mut SpriteAnimator<C, I>)>;

/// What the animator is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaybackMode {
    /// Nothing scheduled.
    Idle,
    /// Repeating the current state until stopped or replaced.
    Looping,
    /// Playing the current state once, then going idle.
    OneShot,
}

/// Outcome of [`SpriteAnimator::play`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayStatus {
    Started(PlaybackMode),
    /// No state with that id; the animator is left idle.
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenderCycle {
    Looping,
    OneShot,
}

impl From<RenderCycle> for PlaybackMode {
    fn from(cycle: RenderCycle) -> Self {
        match cycle {
            RenderCycle::Looping => PlaybackMode::Looping,
            RenderCycle::OneShot => PlaybackMode::OneShot,
        }
    }
}

/// The pending tick and which cycle it belongs to.
#[derive(Debug, Clone, Copy)]
struct ScheduledCycle {
    handle: FrameHandle,
    cycle: RenderCycle,
}

pub struct SpriteAnimator<C: Canvas, I: SheetImage> {
    id: String,
    canvas: C,
    image: I,
    geometry: FrameGeometry,
    style: SurfaceStyle,
    container: Option<String>,

    states: StateStore,
    current: Option<StateDescriptor>,
    frame: u32,
    throttle: u32,
    stagger: u32,

    on_complete: Option<CompletionCallback<C, I>>,
    scheduled: Option<ScheduledCycle>,
    scheduler: RefreshScheduler,
}

impl<C: Canvas, I: SheetImage> SpriteAnimator<C, I> {
    /// Build an animator from `config`, drawing into `canvas` from `image`.
    ///
    /// The canvas is resized to the scaled frame size. The launch state and
    /// any extra configured states are registered, but nothing plays until
    /// the first [`play`](Self::play).
    pub fn new(config: &SpriteConfig, mut canvas: C, image: I) -> SpriteResult<Self> {
        let geometry = FrameGeometry::new(config.frame_width, config.frame_height, config.scale)?;
        canvas.resize(geometry.surface_size());

        let mut states = StateStore::with_launch(config.launch.clone());
        for state in &config.states {
            states.register(state.clone());
        }

        info!(
            "Sprite '{}' created from {} ({} state(s), stagger {})",
            config.id,
            image.locator(),
            states.len(),
            config.stagger
        );

        Ok(Self {
            id: config.id.clone(),
            canvas,
            image,
            geometry,
            style: SurfaceStyle::sized(geometry.surface_size()),
            container: None,
            states,
            current: Some(config.launch.clone()),
            frame: 0,
            throttle: 0,
            stagger: config.stagger,
            on_complete: None,
            scheduled: None,
            scheduler: RefreshScheduler::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Surface style handle.
    pub fn style(&self) -> &SurfaceStyle {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut SurfaceStyle {
        &mut self.style
    }

    /// The drawing surface.
    pub fn node(&self) -> &C {
        &self.canvas
    }

    pub fn node_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    pub fn image(&self) -> &I {
        &self.image
    }

    pub fn geometry(&self) -> &FrameGeometry {
        &self.geometry
    }

    pub fn states(&self) -> &StateStore {
        &self.states
    }

    /// State of the current or most recent run.
    pub fn current_state(&self) -> Option<&StateDescriptor> {
        self.current.as_ref()
    }

    /// Index of the frame the next drawing tick will show.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn throttle(&self) -> u32 {
        self.throttle
    }

    pub fn stagger(&self) -> u32 {
        self.stagger
    }

    pub fn mode(&self) -> PlaybackMode {
        self.scheduled
            .map_or(PlaybackMode::Idle, |s| s.cycle.into())
    }

    /// Handle of the pending tick, if any.
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.scheduled.map(|s| s.handle)
    }

    pub fn register_state(&mut self, state: StateDescriptor) -> StoreStatus {
        self.states.register(state)
    }

    /// Remove a state from the registry.
    ///
    /// A run already in progress keeps its own copy of the descriptor and is
    /// not interrupted.
    pub fn remove_state(&mut self, id: &str) -> StoreStatus {
        self.states.remove(id)
    }

    /// Start playing `state_id`, replacing whatever was running.
    ///
    /// `on_complete` is only kept for one-shot states and fires once when the
    /// last frame has been drawn. It does not fire if the run is cancelled by
    /// another `play` or by [`stop`](Self::stop).
    pub fn play(&mut self, state_id: &str, on_complete: Option<CompletionCallback<C, I>>) -> PlayStatus {
        self.cancel();
        self.on_complete = None;

        let Some(state) = self.states.get(state_id).cloned() else {
            warn!("Sprite '{}': no such state {}", self.id, state_id);
            return PlayStatus::Unknown;
        };

        self.frame = 0;
        let cycle = if state.looped {
            if on_complete.is_some() {
                debug!(
                    "Sprite '{}': state {} loops, completion callback ignored",
                    self.id, state.id
                );
            }
            RenderCycle::Looping
        } else {
            self.on_complete = on_complete;
            RenderCycle::OneShot
        };
        debug!("Sprite '{}': playing {} ({:?})", self.id, state.id, cycle);
        self.current = Some(state);
        self.schedule(cycle);
        PlayStatus::Started(cycle.into())
    }

    /// Play a one-shot state and run `f` when it completes.
    pub fn play_then<F>(&mut self, state_id: &str, f: F) -> PlayStatus
    where
        F: FnOnce(&mut Self) + 'static,
    {
        self.play(state_id, Some(Box::new(f)))
    }

    /// Halt playback and reset the frame and throttle counters.
    ///
    /// Safe to call while idle.
    pub fn stop(&mut self) {
        self.cancel();
        self.on_complete = None;
        self.frame = 0;
        self.throttle = 0;
    }

    /// Mount the surface into `container`, or the root container if `None`.
    pub fn attach_to(&mut self, container: Option<&str>) {
        let container = container.unwrap_or(ROOT_CONTAINER);
        info!("Sprite '{}' attached to {}", self.id, container);
        self.container = Some(container.to_string());
    }

    /// Unmount the surface and stop playback.
    pub fn detach(&mut self) {
        if let Some(container) = self.container.take() {
            info!("Sprite '{}' detached from {}", self.id, container);
        }
        self.stop();
    }

    pub fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }

    pub fn is_attached(&self) -> bool {
        self.container.is_some()
    }

    /// Run the tick identified by `handle`.
    ///
    /// Returns `false` without touching any state when `handle` is not the
    /// pending tick, e.g. one that was cancelled by `play` or `stop`.
    pub fn on_frame(&mut self, handle: FrameHandle) -> bool {
        let Some(scheduled) = self.scheduled.filter(|s| s.handle == handle) else {
            debug!("Sprite '{}': ignoring stale frame {}", self.id, handle.id());
            return false;
        };
        self.scheduled = None;
        // No-op after `refresh`, which has already drained it.
        self.scheduler.cancel_frame(handle);
        match scheduled.cycle {
            RenderCycle::Looping => self.render_loop(),
            RenderCycle::OneShot => self.render_once(),
        }
        true
    }

    /// One display refresh: run every tick due now. Returns how many ran.
    pub fn refresh(&mut self) -> usize {
        let due = self.scheduler.take_due();
        due.into_iter().filter(|h| self.on_frame(*h)).count()
    }

    fn schedule(&mut self, cycle: RenderCycle) {
        debug_assert!(self.scheduled.is_none(), "render cycle already scheduled");
        let handle = self.scheduler.request_frame();
        self.scheduled = Some(ScheduledCycle { handle, cycle });
    }

    fn cancel(&mut self) {
        if let Some(scheduled) = self.scheduled.take() {
            self.scheduler.cancel_frame(scheduled.handle);
        }
    }

    fn last_frame(&self) -> u32 {
        self.current.as_ref().map_or(0, |s| s.last_frame)
    }

    /// Shared tick body. Returns `true` when a frame was drawn and the frame
    /// counter may advance.
    fn render_frame(&mut self) -> bool {
        if self.throttle < self.stagger {
            self.throttle += 1;
            return false;
        }
        self.throttle = 0;

        let Some(row) = self.current.as_ref().map(|s| s.row) else {
            return false;
        };
        if !self.image.is_ready() {
            debug!(
                "Sprite '{}': {} not loaded yet, holding frame {}",
                self.id,
                self.image.locator(),
                self.frame
            );
            return false;
        }

        let dest = self.geometry.dest_rect();
        let src = self.geometry.source_rect(self.frame, row);
        self.canvas.clear_rect(dest);
        self.canvas.draw_image(&self.image, src, dest);
        true
    }

    fn render_loop(&mut self) {
        if self.render_frame() {
            self.frame = if self.frame < self.last_frame() {
                self.frame + 1
            } else {
                0
            };
        }
        self.schedule(RenderCycle::Looping);
    }

    fn render_once(&mut self) {
        if self.render_frame() {
            if self.frame < self.last_frame() {
                self.frame += 1;
            } else {
                self.finish();
                return;
            }
        }
        self.schedule(RenderCycle::OneShot);
    }

    /// Natural end of a one-shot run.
    fn finish(&mut self) {
        let callback = self.on_complete.take();
        self.stop();
        if let Some(state) = &self.current {
            debug!("Sprite '{}': {} finished", self.id, state.id);
        }
        if let Some(callback) = callback {
            callback(self);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::components::resolution::{Rect, Resolution};
    use crate::resources::sheetimage::SheetHandle;

    /// Records every blit as `(frame column, row)` derived from the source rect.
    #[derive(Default)]
    struct FrameLog {
        size: Resolution,
        frames: Vec<(u32, u32)>,
        clears: usize,
    }

    const FRAME: f32 = 10.0;

    impl Canvas for FrameLog {
        fn resize(&mut self, size: Resolution) {
            self.size = size;
        }

        fn clear_rect(&mut self, _rect: Rect) {
            self.clears += 1;
        }

        fn draw_image(&mut self, _image: &dyn SheetImage, src: Rect, _dst: Rect) {
            self.frames.push(((src.x / FRAME) as u32, (src.y / FRAME) as u32));
        }
    }

    type TestAnimator = SpriteAnimator<FrameLog, SheetHandle>;

    fn state(id: &str, row: u32, frames: u32, looped: bool) -> StateDescriptor {
        StateDescriptor::create(id, row, frames, looped).unwrap()
    }

    fn animator(stagger: u32) -> TestAnimator {
        let config = SpriteConfig::new("hero", "hero.png", FRAME, FRAME, state("walk", 1, 4, true))
            .with_stagger(stagger)
            .with_state(state("jump", 2, 3, false));
        SpriteAnimator::new(&config, FrameLog::default(), SheetHandle::loaded("hero.png")).unwrap()
    }

    fn run(anim: &mut TestAnimator, refreshes: usize) {
        for _ in 0..refreshes {
            anim.refresh();
        }
    }

    fn columns(anim: &TestAnimator) -> Vec<u32> {
        anim.node().frames.iter().map(|(col, _)| *col).collect()
    }

    #[test]
    fn test_new_is_idle_and_sized() {
        let config = SpriteConfig::new("hero", "hero.png", 16.0, 8.0, state("walk", 1, 4, true))
            .with_scale(2.0);
        let anim =
            SpriteAnimator::new(&config, FrameLog::default(), SheetHandle::loaded("hero.png")).unwrap();
        assert_eq!(anim.mode(), PlaybackMode::Idle);
        assert_eq!(anim.node().size, Resolution { w: 32.0, h: 16.0 });
        assert_eq!(anim.style().width, 32.0);
        assert_eq!(anim.current_state().unwrap().id, "walk");
        assert_eq!(anim.id(), "hero");
    }

    #[test]
    fn test_new_rejects_bad_dimensions() {
        let config = SpriteConfig::new("hero", "hero.png", 0.0, 8.0, state("walk", 1, 4, true));
        assert!(SpriteAnimator::new(&config, FrameLog::default(), SheetHandle::loaded("x")).is_err());
    }

    #[test]
    fn test_construction_does_not_draw() {
        let mut anim = animator(0);
        run(&mut anim, 5);
        assert!(anim.node().frames.is_empty());
    }

    #[test]
    fn test_loop_wraps_frames() {
        let mut anim = animator(0);
        assert_eq!(anim.play("walk", None), PlayStatus::Started(PlaybackMode::Looping));
        run(&mut anim, 5);
        assert_eq!(columns(&anim), vec![0, 1, 2, 3, 0]);
        assert_eq!(anim.mode(), PlaybackMode::Looping);
        assert_eq!(anim.node().clears, 5);
    }

    #[test]
    fn test_one_shot_fires_callback_once() {
        let mut anim = animator(0);
        let fired = Rc::new(Cell::new(0));
        let seen = Rc::clone(&fired);
        let status = anim.play_then("jump", move |a: &mut TestAnimator| {
            seen.set(seen.get() + 1);
            assert_eq!(a.mode(), PlaybackMode::Idle);
        });
        assert_eq!(status, PlayStatus::Started(PlaybackMode::OneShot));

        run(&mut anim, 3);
        assert_eq!(anim.node().frames, vec![(0, 1), (1, 1), (2, 1)]);
        assert_eq!(fired.get(), 1);
        assert_eq!(anim.mode(), PlaybackMode::Idle);
        assert_eq!(anim.frame(), 0);

        run(&mut anim, 10);
        assert_eq!(anim.node().frames.len(), 3);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_stagger_throttles_draws() {
        let mut anim = animator(2);
        anim.play("walk", None);
        run(&mut anim, 9);
        // One draw every third tick, starting on the third.
        assert_eq!(columns(&anim), vec![0, 1, 2]);
        anim.refresh();
        assert_eq!(anim.throttle(), 1);
    }

    #[test]
    fn test_one_shot_with_stagger() {
        let mut anim = animator(1);
        let fired = Rc::new(Cell::new(false));
        let seen = Rc::clone(&fired);
        anim.play_then("jump", move |_| seen.set(true));
        run(&mut anim, 5);
        assert_eq!(columns(&anim), vec![0, 1]);
        assert!(!fired.get());
        anim.refresh();
        assert_eq!(columns(&anim), vec![0, 1, 2]);
        assert!(fired.get());
    }

    #[test]
    fn test_unknown_state_leaves_idle() {
        let mut anim = animator(0);
        anim.play("walk", None);
        run(&mut anim, 2);
        assert_eq!(anim.play("nope", None), PlayStatus::Unknown);
        assert_eq!(anim.mode(), PlaybackMode::Idle);
        run(&mut anim, 3);
        assert_eq!(columns(&anim), vec![0, 1]);
    }

    #[test]
    fn test_switch_cancels_previous_run() {
        let mut anim = animator(0);
        anim.play("walk", None);
        run(&mut anim, 2);
        let stale = anim.pending_frame().unwrap();

        anim.play("jump", None);
        assert!(!anim.on_frame(stale));
        assert_eq!(anim.frame(), 0);
        run(&mut anim, 1);
        assert_eq!(anim.node().frames, vec![(0, 0), (1, 0), (0, 1)]);
    }

    #[test]
    fn test_switch_drops_pending_callback() {
        let mut anim = animator(0);
        let fired = Rc::new(Cell::new(false));
        let seen = Rc::clone(&fired);
        anim.play_then("jump", move |_| seen.set(true));
        run(&mut anim, 1);
        anim.play("walk", None);
        run(&mut anim, 10);
        assert!(!fired.get());
    }

    #[test]
    fn test_looping_ignores_callback() {
        let mut anim = animator(0);
        let fired = Rc::new(Cell::new(false));
        let seen = Rc::clone(&fired);
        anim.play_then("walk", move |_| seen.set(true));
        run(&mut anim, 12);
        assert!(!fired.get());
        assert_eq!(anim.mode(), PlaybackMode::Looping);
    }

    #[test]
    fn test_stop_resets_and_is_idempotent() {
        let mut anim = animator(3);
        anim.stop();
        assert_eq!(anim.frame(), 0);
        assert_eq!(anim.mode(), PlaybackMode::Idle);

        anim.play("walk", None);
        run(&mut anim, 6);
        assert_eq!(anim.frame(), 1);
        assert_eq!(anim.throttle(), 2);
        anim.stop();
        anim.stop();
        assert_eq!(anim.frame(), 0);
        assert_eq!(anim.throttle(), 0);
        assert_eq!(anim.pending_frame(), None);
        run(&mut anim, 8);
        assert_eq!(columns(&anim), vec![0]);
    }

    #[test]
    fn test_play_keeps_throttle_position() {
        let mut anim = animator(3);
        anim.play("walk", None);
        run(&mut anim, 2);
        assert_eq!(anim.throttle(), 2);
        anim.play("jump", None);
        assert_eq!(anim.throttle(), 2);
        run(&mut anim, 2);
        assert_eq!(anim.node().frames, vec![(0, 1)]);
    }

    #[test]
    fn test_callback_can_chain_state() {
        let mut anim = animator(0);
        anim.play_then("jump", |a: &mut TestAnimator| {
            a.play("walk", None);
        });
        run(&mut anim, 5);
        assert_eq!(
            anim.node().frames,
            vec![(0, 1), (1, 1), (2, 1), (0, 0), (1, 0)]
        );
        assert_eq!(anim.mode(), PlaybackMode::Looping);
    }

    #[test]
    fn test_callback_can_stop() {
        let mut anim = animator(0);
        let fired = Rc::new(Cell::new(0));
        let seen = Rc::clone(&fired);
        anim.play_then("jump", move |a: &mut TestAnimator| {
            seen.set(seen.get() + 1);
            a.stop();
        });
        run(&mut anim, 6);
        assert_eq!(fired.get(), 1);
        assert_eq!(anim.mode(), PlaybackMode::Idle);
    }

    #[test]
    fn test_callback_replays_same_one_shot() {
        let mut anim = animator(0);
        let order = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&order);
        anim.play_then("jump", move |a: &mut TestAnimator| {
            log.borrow_mut().push("first");
            let log = Rc::clone(&log);
            a.play_then("jump", move |_| log.borrow_mut().push("second"));
        });
        run(&mut anim, 6);
        assert_eq!(*order.borrow(), vec!["first", "second"]);
        assert_eq!(anim.node().frames.len(), 6);
    }

    #[test]
    fn test_single_frame_one_shot() {
        let mut anim = animator(0);
        anim.register_state(state("blink", 3, 1, false));
        let fired = Rc::new(Cell::new(false));
        let seen = Rc::clone(&fired);
        anim.play_then("blink", move |_| seen.set(true));
        run(&mut anim, 1);
        assert_eq!(anim.node().frames, vec![(0, 2)]);
        assert!(fired.get());
    }

    #[test]
    fn test_waits_for_image() {
        let config = SpriteConfig::new("hero", "hero.png", FRAME, FRAME, state("walk", 1, 3, true));
        let sheet = SheetHandle::pending("hero.png");
        let signal = sheet.signal();
        let mut anim = SpriteAnimator::new(&config, FrameLog::default(), sheet).unwrap();
        anim.play("walk", None);
        run(&mut anim, 3);
        assert!(anim.node().frames.is_empty());
        assert_eq!(anim.frame(), 0);
        signal.mark_ready();
        run(&mut anim, 2);
        assert_eq!(columns(&anim), vec![0, 1]);
    }

    #[test]
    fn test_removing_current_state_keeps_running() {
        let mut anim = animator(0);
        anim.play("walk", None);
        assert_eq!(anim.remove_state("walk"), StoreStatus::Applied);
        run(&mut anim, 2);
        assert_eq!(columns(&anim), vec![0, 1]);
        assert_eq!(anim.play("walk", None), PlayStatus::Unknown);
    }

    #[test]
    fn test_duplicate_registration_keeps_original() {
        let mut anim = animator(0);
        assert_eq!(
            anim.register_state(state("jump", 4, 8, true)),
            StoreStatus::Duplicate
        );
        assert_eq!(anim.states().get("jump"), Some(&state("jump", 2, 3, false)));
        assert_eq!(anim.remove_state("nope"), StoreStatus::Unknown);
        assert_eq!(anim.states().len(), 2);
    }

    #[test]
    fn test_attach_and_detach() {
        let mut anim = animator(0);
        anim.attach_to(None);
        assert_eq!(anim.container(), Some(ROOT_CONTAINER));
        anim.attach_to(Some("stage"));
        assert_eq!(anim.container(), Some("stage"));

        anim.play("walk", None);
        run(&mut anim, 2);
        anim.detach();
        assert!(!anim.is_attached());
        assert_eq!(anim.mode(), PlaybackMode::Idle);
        assert_eq!(anim.frame(), 0);
    }

    #[test]
    fn test_only_one_tick_pending() {
        let mut anim = animator(0);
        anim.play("walk", None);
        anim.play("jump", None);
        anim.play("walk", None);
        assert_eq!(anim.scheduler.pending(), 1);
        assert_eq!(anim.refresh(), 1);
        assert_eq!(anim.scheduler.pending(), 1);
    }

    #[test]
    fn test_on_frame_keeps_single_pending_tick() {
        let mut anim = animator(0);
        anim.play("walk", None);
        for _ in 0..1000 {
            let handle = anim.pending_frame().unwrap();
            assert!(anim.on_frame(handle));
        }
        assert_eq!(anim.scheduler.pending(), 1);
        assert_eq!(anim.node().frames.len(), 1000);
        // The one remaining request is the live one.
        assert_eq!(anim.refresh(), 1);
        assert_eq!(anim.node().frames.len(), 1001);
    }
}
