//! raylib window presenting a single sprite.
//!
//! The window's refresh is the animator's tick: `refresh()` runs once per
//! frame before drawing, and whatever the retained canvas currently holds is
//! blitted from the sheet texture at the sprite's style position.

use log::info;
use raylib::prelude::*;

use spriteanimator::resources::sheetimage::{ReadySignal, SheetImage};

use crate::Animator;

const MARGIN: i32 = 32;
const TARGET_FPS: u32 = 60;

fn digit_index(key: KeyboardKey) -> Option<usize> {
    use KeyboardKey::*;
    let index = match key {
        KEY_ONE => 0,
        KEY_TWO => 1,
        KEY_THREE => 2,
        KEY_FOUR => 3,
        KEY_FIVE => 4,
        KEY_SIX => 5,
        KEY_SEVEN => 6,
        KEY_EIGHT => 7,
        KEY_NINE => 8,
        _ => return None,
    };
    Some(index)
}

/// Play `id`; one-shot states fall back to `start` when they finish.
fn play_returning(hero: &mut Animator, id: &str, start: &str) {
    let start = start.to_string();
    hero.play_then(id, move |a: &mut Animator| {
        a.play(&start, None);
    });
}

pub fn run(mut hero: Animator, start: &str, sheet_loaded: ReadySignal) -> Result<(), String> {
    let size = hero.geometry().surface_size();
    let (mut rl, thread) = raylib::init()
        .size(size.w as i32 + MARGIN * 2, size.h as i32 + MARGIN * 2)
        .title(&format!("spriteanimator - {}", hero.id()))
        .build();
    rl.set_target_fps(TARGET_FPS);

    let texture = rl
        .load_texture(&thread, hero.image().locator())
        .map_err(|e| format!("Failed to load sprite sheet {}: {}", hero.image().locator(), e))?;
    sheet_loaded.mark_ready();

    let ids: Vec<String> = hero.states().ids().into_iter().map(String::from).collect();
    info!("States: {}", ids.join(", "));

    {
        let style = hero.style_mut();
        style.left = MARGIN as f32;
        style.top = MARGIN as f32;
    }
    hero.attach_to(None);
    play_returning(&mut hero, start, start);

    while !rl.window_should_close() {
        if let Some(key) = rl.get_key_pressed() {
            match key {
                KeyboardKey::KEY_SPACE => play_returning(&mut hero, start, start),
                KeyboardKey::KEY_S => hero.stop(),
                KeyboardKey::KEY_D => {
                    if hero.is_attached() {
                        hero.detach();
                    } else {
                        hero.attach_to(None);
                        play_returning(&mut hero, start, start);
                    }
                }
                other => {
                    if let Some(id) = digit_index(other).and_then(|i| ids.get(i)) {
                        play_returning(&mut hero, id, start);
                    }
                }
            }
        }

        hero.refresh();

        let mut d = rl.begin_drawing(&thread);
        d.clear_background(Color::DARKGRAY);
        if hero.is_attached() && hero.style().visible {
            if let Some(call) = hero.node().current() {
                let style = hero.style();
                let src = Rectangle::new(call.src.x, call.src.y, call.src.width, call.src.height);
                let dest = Rectangle::new(
                    style.left + call.dst.x,
                    style.top + call.dst.y,
                    call.dst.width,
                    call.dst.height,
                );
                d.draw_texture_pro(&texture, src, dest, Vector2::zero(), 0.0, Color::WHITE);
            }
        }
        let state = hero.current_state().map_or("-", |s| s.id.as_str());
        d.draw_text(
            &format!("{} {:?} frame {}", state, hero.mode(), hero.frame()),
            4,
            4,
            10,
            Color::RAYWHITE,
        );
    }
    Ok(())
}
