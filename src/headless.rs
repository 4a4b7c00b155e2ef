//! Windowless playback.
//!
//! Simulates a fixed number of display refreshes and prints every draw the
//! animator makes, as text or as JSON lines.

use log::{error, info, warn};
use serde::Serialize;

use spriteanimator::resources::canvas::DrawCall;
use spriteanimator::systems::animator::{PlayStatus, PlaybackMode};

use crate::{Animator, Cli};

#[derive(Serialize)]
struct TickRecord<'a> {
    tick: u32,
    state: &'a str,
    mode: PlaybackMode,
    #[serde(flatten)]
    call: &'a DrawCall,
}

/// Run one refresh and return its draws, labelled with the state and mode
/// that drew them. Completion callbacks run after the draw and may switch
/// state, so the label is read before the refresh.
fn step(hero: &mut Animator) -> (String, PlaybackMode, Vec<DrawCall>) {
    let state = hero.current_state().map_or_else(|| "-".to_string(), |s| s.id.clone());
    let mode = hero.mode();
    hero.refresh();
    (state, mode, hero.node_mut().drain_history())
}

/// Completion callback for `--shuffle`: pick any registered state and keep
/// shuffling for as long as one-shot states come up.
fn shuffle_next(animator: &mut Animator) {
    let ids: Vec<String> = animator.states().ids().into_iter().map(String::from).collect();
    if ids.is_empty() {
        warn!("No states left to shuffle");
        return;
    }
    let next = &ids[fastrand::usize(..ids.len())];
    info!("Shuffled into {}", next);
    animator.play_then(next, shuffle_next);
}

pub fn run(mut hero: Animator, start: &str, cli: &Cli) {
    hero.attach_to(None);
    let status = if cli.shuffle {
        hero.play_then(start, shuffle_next)
    } else {
        hero.play(start, None)
    };
    if status == PlayStatus::Unknown {
        error!("Sprite '{}' has no state {}", hero.id(), start);
        std::process::exit(1);
    }

    for tick in 0..cli.ticks {
        let (state, mode, calls) = step(&mut hero);
        for call in &calls {
            if cli.json {
                let record = TickRecord {
                    tick,
                    state: &state,
                    mode,
                    call,
                };
                match serde_json::to_string(&record) {
                    Ok(line) => println!("{}", line),
                    Err(e) => error!("Failed to encode draw call: {}", e),
                }
            } else {
                println!(
                    "tick {:>5}  {:<12} src=({}, {}) {}x{}",
                    tick, state, call.src.x, call.src.y, call.src.width, call.src.height
                );
            }
        }
        if hero.mode() == PlaybackMode::Idle {
            info!("Sprite '{}' went idle after {} tick(s)", hero.id(), tick + 1);
            break;
        }
    }

    hero.detach();
    info!("{} frame(s) drawn", hero.node().draw_count());
}
