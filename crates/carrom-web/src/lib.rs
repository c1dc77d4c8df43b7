pub mod runner;

pub use runner::{DiscInstance, GameEvent, MatchRunner};

use std::cell::RefCell;

use glam::Vec2;
use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNER: RefCell<Option<MatchRunner>> = const { RefCell::new(None) };
}

/// Runs `f` on the live match. Before `carrom_init` succeeds every export is
/// a no-op returning the default value.
fn with_runner<R: Default>(f: impl FnOnce(&mut MatchRunner) -> R) -> R {
    RUNNER.with(|cell| match cell.borrow_mut().as_mut() {
        Some(runner) => f(runner),
        None => {
            log::warn!("carrom: not initialized, call carrom_init() first");
            R::default()
        }
    })
}

/// Start a new match. `config_json` may be empty for the default config.
#[wasm_bindgen]
pub fn carrom_init(config_json: &str) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let runner = MatchRunner::from_json(config_json).map_err(|e| {
        let msg = e.to_string();
        web_sys::console::error_1(&JsValue::from_str(&msg));
        JsValue::from_str(&msg)
    })?;
    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(runner);
    });
    log::info!("carrom: initialized");
    Ok(())
}

#[wasm_bindgen]
pub fn carrom_tick(dt: f32) {
    with_runner(|r| r.tick(dt));
}

#[wasm_bindgen]
pub fn carrom_shoot(striker_x: f32, angle: f32, power: f32) -> bool {
    with_runner(|r| r.shoot(striker_x, angle, power))
}

#[wasm_bindgen]
pub fn carrom_shoot_at(striker_x: f32, target_x: f32, target_y: f32, power: f32) -> bool {
    with_runner(|r| r.shoot_at(striker_x, Vec2::new(target_x, target_y), power))
}

/// Hand a message from the peer to the match.
#[wasm_bindgen]
pub fn carrom_receive(raw: &str) -> bool {
    with_runner(|r| r.receive(raw))
}

/// Next message for the peer, or `undefined` when the outbox is empty.
#[wasm_bindgen]
pub fn carrom_next_outgoing() -> Option<String> {
    with_runner(|r| r.next_outgoing())
}

#[wasm_bindgen]
pub fn carrom_disconnect() {
    with_runner(|r| r.disconnect());
}

#[wasm_bindgen]
pub fn carrom_abort() -> bool {
    with_runner(|r| r.abort())
}

// -- Buffers --

#[wasm_bindgen]
pub fn get_game_events_ptr() -> *const f32 {
    with_runner(|r| Some(r.game_events_ptr())).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_game_events_len() -> u32 {
    with_runner(|r| r.game_events_len())
}

#[wasm_bindgen]
pub fn get_discs_ptr() -> *const f32 {
    with_runner(|r| Some(r.discs_ptr())).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_disc_count() -> u32 {
    with_runner(|r| r.disc_count())
}

#[wasm_bindgen]
pub fn get_game_event_floats() -> u32 {
    GameEvent::FLOATS as u32
}

// -- State --

#[wasm_bindgen]
pub fn get_phase() -> f32 {
    with_runner(|r| r.phase())
}

#[wasm_bindgen]
pub fn get_current_player() -> i32 {
    with_runner(|r| Some(r.current_player())).unwrap_or(-1)
}

#[wasm_bindgen]
pub fn get_score(player: u32) -> u32 {
    with_runner(|r| r.score(player))
}

#[wasm_bindgen]
pub fn get_winner() -> i32 {
    with_runner(|r| Some(r.winner())).unwrap_or(-1)
}

#[wasm_bindgen]
pub fn is_awaiting_local_shot() -> bool {
    with_runner(|r| r.awaiting_local_shot())
}

#[wasm_bindgen]
pub fn get_board_size() -> f32 {
    with_runner(|r| r.board_size())
}
