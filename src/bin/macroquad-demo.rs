use macroquad::prelude::*;

use fluctlb::{SimulationParameters, LBM};

const N: usize = 32;
const STEPS_PER_FRAME: usize = 2;

// thermal energy used when noise is switched on
const TEMPERATURE: f64 = 1e-5;
// initial shear wave amplitude
const AMPLITUDE: f64 = 0.01;

#[macroquad::main("Fluctuating LBM")]
async fn main() {
    env_logger::init();

    let mut thermal = false;
    let mut plot = Plot::Velocity;
    let mut sim = create_sim(thermal);

    // event loop
    loop {
        // handle events
        if is_key_pressed(KeyCode::Escape) {
            std::process::exit(0);
        } else if is_key_pressed(KeyCode::R) {
            sim = create_sim(thermal);
        } else if is_key_pressed(KeyCode::T) {
            thermal = !thermal;
            sim = create_sim(thermal);
        } else if is_key_pressed(KeyCode::S) {
            plot = plot.next();
        }
        // step the simulation
        for _ in 0..STEPS_PER_FRAME {
            if let Err(e) = sim.step() {
                ::log::error!("{e}");
                std::process::exit(1);
            }
        }
        // draw the state of the simulation
        clear_background(WHITE);
        render_sim(&sim, plot);
        let label = format!(
            "step {}  T = {:e}  A = {:.3e}",
            sim.current_step(),
            sim.params().temperature,
            sim.shear_wave_amplitude()
        );
        draw_text(&label, 10.0, 20.0, 20.0, BLACK);
        // wait for the next render
        next_frame().await;
    }
}

fn create_sim(thermal: bool) -> LBM {
    let params = SimulationParameters {
        n: N,
        amplitude: AMPLITUDE,
        temperature: if thermal { TEMPERATURE } else { 0.0 },
        // a fresh noise realisation on every reset
        seed: ::rand::random(),
        ..Default::default()
    };
    match LBM::new(params) {
        Ok(sim) => sim,
        Err(e) => {
            ::log::error!("{e}");
            std::process::exit(1);
        }
    }
}

/// map `w` in [-1, 1] onto a blue-white-red scale
fn diverging(w: f32) -> Color {
    let w = w.clamp(-1.0, 1.0);
    Color {
        r: 1.0 - (-w).max(0.0),
        g: 1.0 - w.abs(),
        b: 1.0 - w.max(0.0),
        a: 1.0,
    }
}

fn render_sim(sim: &LBM, plot: Plot) {
    let width = screen_width() / N as f32;
    let height = screen_height() / N as f32;
    let grid = sim.grid();

    // value shown at screen cell (i, j) of the z = 0 plane
    let values: Vec<f64> = match plot {
        Plot::Velocity => (0..N * N)
            .map(|c| sim.velocity_field()[grid.index([c % N, c / N, 0])][1])
            .collect(),
        Plot::StructureFactor => (0..N * N)
            .map(|c| {
                // put the zero mode in the middle of the screen
                let kx = (c % N + N / 2) % N;
                let ky = (c / N + N / 2) % N;
                sim.structure_factor()
                    .mean(grid.index([kx, ky, 0]))
                    .map_or(0.0, |s| s[3])
            })
            .collect(),
    };
    let scale = values.iter().fold(f64::EPSILON, |m, v| m.max(v.abs()));

    for i in 0..N {
        for j in 0..N {
            let w = (values[i + N * j] / scale) as f32;
            draw_rectangle(i as f32 * width, j as f32 * height, width, height, diverging(w));
        }
    }
}

#[derive(Clone, Copy)]
enum Plot {
    Velocity,
    StructureFactor,
}

impl Plot {
    fn next(self) -> Self {
        match self {
            Plot::Velocity => Plot::StructureFactor,
            Plot::StructureFactor => Plot::Velocity,
        }
    }
}
