//! Interactive mode: drag the obstacle through the fluid with the mouse

use std::{error::Error, time::Instant};

use minifb::{Key, MouseButton, MouseMode, Window, WindowOptions};
use screen_size::get_primary_screen_size as get_screen_size;
use tracing::info;

use crate::{
    observers::imgstream::colorize,
    preprocessing::{InteractiveSettings, RenderedField, SimulationInput},
    sim::{fluid::Fluid, obstacle::DragPos},
};

const FALLBACK_SCREEN_WIDTH: f32 = 1280.;

/// Pack a colour into minifb's `0RGB` pixel format
fn pack_rgb((r, g, b): (u8, u8, u8)) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

/// Colour-map the selected field into `buffer`
fn render(fluid: &Fluid, field: RenderedField, buffer: &mut [u32]) {
    let f = fluid.field();
    let values = match field {
        RenderedField::Smoke => f.smoke(),
        RenderedField::Pressure => f.pressure(),
    };

    for (px, color) in buffer.iter_mut().zip(colorize(values, f.obstacle_mask())) {
        *px = pack_rgb(color);
    }
}

/// Open a window and run the simulation in real time. Each frame measures
/// the wall-clock `dt`, moves the obstacle to the mouse while the left
/// button is held, steps the fluid and draws the chosen field.
///
/// Parameters
/// - `settings` - Window settings
/// - `input` - The simulation parameters
pub fn run_interactive(
    settings: &InteractiveSettings,
    input: &SimulationInput,
) -> Result<(), Box<dyn Error>> {
    let mut fluid = input.build_fluid();
    let (rows, cols) = (fluid.field().cell_rows(), fluid.field().cell_cols());

    let screen_w = get_screen_size()
        .map(|(w, _)| w as f32)
        .unwrap_or(FALLBACK_SCREEN_WIDTH);
    let init_w = (screen_w * settings.screen_fraction).max(cols as f32) as usize;
    let init_h = (init_w as f32 * (rows as f32 / cols as f32)) as usize;

    let mut window = Window::new(
        "Smoke 2D",
        init_w,
        init_h,
        WindowOptions {
            resize: true,
            ..WindowOptions::default()
        },
    )?;
    window.set_target_fps(60);

    info!("Opened {}x{} window; drag with the left mouse button", init_w, init_h);

    let mut buffer: Vec<u32> = vec![0; rows * cols];
    let mut ball: Option<DragPos> = None;
    let mut dragging = false;
    let mut last = Instant::now();

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32();
        last = now;

        if dt <= 0. {
            continue;
        }

        let mouse = window.get_mouse_pos(MouseMode::Clamp);
        match (window.get_mouse_down(MouseButton::Left), mouse) {
            (true, Some((mx, my))) => {
                let (win_w, win_h) = window.get_size();
                let next = DragPos::new(mx / win_w as f32, my / win_h as f32);

                // a fresh press places the ball without flinging the fluid
                let prev = match ball {
                    Some(pos) if dragging => pos,
                    _ => next,
                };

                fluid.inject_obstacle(prev, next, input.ball_radius, dt);
                ball = Some(next);
                dragging = true;
            }
            _ => dragging = false,
        }

        fluid.step(dt);

        render(&fluid, input.field, &mut buffer);
        window.update_with_buffer(&buffer, cols, rows)?;
    }

    info!(
        "Window closed after {} frames ({:.2} s simulated)",
        fluid.field().frame(),
        fluid.time()
    );

    Ok(())
}
