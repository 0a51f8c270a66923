//! Antigravity Field entry point
//!
//! On the web this mounts the background on the page canvas. Natively it runs
//! the simulation headless and logs what it would draw.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;

    use antigravity_field::consts::CANVAS_ID;
    use antigravity_field::platform::web::{Mount, mount};
    use antigravity_field::settings::Settings;

    thread_local! {
        static MOUNT: RefCell<Option<Mount>> = const { RefCell::new(None) };
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Antigravity Field starting...");

        let settings = Settings::load();
        log::info!(
            "Settings: quality {}, smooth scroll {}",
            settings.quality.as_str(),
            settings.effective_smooth_scroll()
        );

        match mount(CANVAS_ID, &settings).await {
            Ok(mount) => MOUNT.with(|slot| *slot.borrow_mut() = Some(mount)),
            Err(e) => log::warn!("Background disabled: {}", e),
        }
    }

    pub fn unmount() {
        if let Some(mount) = MOUNT.with(|slot| slot.borrow_mut().take()) {
            mount.unmount();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

/// Stop the background and release its listeners
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn unmount_background() {
    wasm_app::unmount();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let ticks = match std::env::args().nth(1) {
        Some(arg) => match arg.parse::<u64>() {
            Ok(ticks) => ticks,
            Err(_) => {
                log::error!("Expected a tick count, got {:?}", arg);
                std::process::exit(2);
            }
        },
        None => 600,
    };

    headless::run(ticks);
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use antigravity_field::renderer::build_instances;
    use antigravity_field::settings::Settings;
    use antigravity_field::sim::{FieldState, PointerPress, TickInput, WorldBounds, tick};
    use glam::Vec2;

    const WIDTH: f32 = 1920.0;
    const HEIGHT: f32 = 1080.0;
    const PRESS_EVERY: u64 = 120;
    const REPORT_EVERY: u64 = 60;

    pub fn run(ticks: u64) {
        let settings = Settings::load();
        let world = WorldBounds::new(WIDTH, HEIGHT, HEIGHT * 3.0);
        let seed = 0x5eed;
        let mut state = FieldState::new(seed, world, settings.tuning());
        state.prefill = settings.prefill;
        state.resize(world);

        log::info!(
            "Headless run: {} ticks, {}x{} viewport, world height {}, seed {:#x}",
            ticks,
            WIDTH,
            HEIGHT,
            world.world_height,
            seed
        );

        let mut instances = Vec::new();
        let mut input = TickInput::default();
        for t in 0..ticks {
            // Slow scroll down the page and back
            let phase = (t as f32 / 600.0) * std::f32::consts::TAU;
            input.scroll_y = (1.0 - phase.cos()) * 0.5 * world.scroll_limit();

            // Pointer sweeps left to right across the middle of the screen
            let x = (t as f32 * 4.0) % WIDTH;
            let pointer = Vec2::new(x, HEIGHT * 0.5);
            input.pointer = Some(pointer);

            input.presses.clear();
            if t > 0 && t % PRESS_EVERY == 0 {
                input.presses.push(PointerPress {
                    pos: pointer,
                    scroll_y: input.scroll_y,
                });
            }

            tick(&mut state, &input);

            if (t + 1) % REPORT_EVERY == 0 || t + 1 == ticks {
                build_instances(&state, input.scroll_y, &mut instances);
                log::info!(
                    "tick {:>5}: {:>4} particles, {} shockwaves, {:>4} visible, mean speed {:.3}",
                    state.time_ticks,
                    state.particles.len(),
                    state.shockwaves.len(),
                    instances.len(),
                    mean_speed(&state)
                );
            }
        }
    }

    fn mean_speed(state: &FieldState) -> f32 {
        if state.particles.is_empty() {
            return 0.0;
        }
        let total: f32 = state.particles.iter().map(|p| p.vel.length()).sum();
        total / state.particles.len() as f32
    }
}
