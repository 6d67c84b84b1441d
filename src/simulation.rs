use std::f64::consts::TAU;

use crate::collision::{CollisionOperator, RelaxationRates};
use crate::config::SimulationParameters;
use crate::equilibrium::equilibrium;
use crate::error::{LbmError, Result};
use crate::grid::{try_par_map_cells, Field, Grid};
use crate::moments::{density_momentum, moments};
use crate::noise::cell_rng;
use crate::output::{OutputSink, VelocitySnapshot};
use crate::stencil::{Populations, Stencil, DIM};
use crate::stream::gather;
use crate::structure_factor::StructureFactor;
use crate::Dot;

/// Fluctuating Lattice Boltzmann simulation on a periodic D3Q19 cube
///
/// * multiple-relaxation-time collision with optional thermal noise
/// * double-buffered fused stream/collide
/// * running velocity structure factor
pub struct LBM {
    params: SimulationParameters,
    stencil: Stencil,
    collision: CollisionOperator,
    grid: Grid,
    /// current generation
    fold: Field,
    /// scratch generation written by the next step
    fnew: Field,
    /// velocity at each lattice cell
    velocity: Vec<[f64; DIM]>,
    structure_factor: StructureFactor,
    step: u64,
}

fn degenerate(stencil: &Stencil, f: &Populations, grid: Grid, cell: usize, step: u64) -> LbmError {
    LbmError::DegenerateDensity {
        cell: grid.coords(cell),
        step,
        density: density_momentum(stencil, f).0,
    }
}

impl LBM {
    /// validate `params` and set up the initial shear wave
    pub fn new(params: SimulationParameters) -> Result<Self> {
        params.validate()?;

        let stencil = Stencil::d3q19();
        let rates = RelaxationRates::new(params.tau, params.bulk_tau(), params.ghost_rate);
        log::info!(
            "D3Q19 lattice of {n}^3 cells, tau = {}, nu = {:.6}, temperature = {:e}",
            rates.tau(),
            rates.kinematic_viscosity(),
            params.temperature,
            n = params.n,
        );

        let collision = CollisionOperator::new(&stencil, rates, params.temperature);
        let grid = Grid::new(params.n);
        let structure_factor =
            StructureFactor::new(grid, params.var_scaling, params.subtract_mean)?;

        let mut sim = Self {
            fold: Field::at_rest(grid, &stencil, 1.0),
            fnew: Field::at_rest(grid, &stencil, 1.0),
            velocity: vec![[0.0; DIM]; grid.len()],
            params,
            stencil,
            collision,
            grid,
            structure_factor,
            step: 0,
        };
        sim.initialize_shear_wave()?;
        Ok(sim)
    }

    /// reset to `u_y(x) = A sin(2πx/n)` at unit density, step 0 and an empty
    /// structure factor
    pub fn initialize_shear_wave(&mut self) -> Result<()> {
        let n = self.grid.n() as f64;
        let amplitude = self.params.amplitude;
        let stencil = &self.stencil;
        self.fold = Field::from_fn(self.grid, |[x, _, _]| {
            let uy = amplitude * (TAU * x as f64 / n).sin();
            equilibrium(stencil, 1.0, [0.0, uy, 0.0])
        });

        self.structure_factor = StructureFactor::new(
            self.grid,
            self.params.var_scaling,
            self.params.subtract_mean,
        )?;
        self.step = 0;
        self.update_macro()
    }

    /// execute the configured number of steps, emitting diagnostics at step 0
    /// and every `plot_int` steps
    pub fn run<S: OutputSink>(&mut self, sink: &mut S) -> Result<()> {
        let plot_int = self.params.plot_int;

        if plot_int > 0 && self.step == 0 {
            self.structure_factor.accumulate(&self.velocity);
            self.output(sink)?;
        }

        for _ in 0..self.params.steps {
            self.step()?;
            if plot_int > 0 && self.step % plot_int == 0 {
                self.output(sink)?;
            }
        }
        Ok(())
    }

    /// advance one generation.
    ///
    /// on a degenerate cell the state is left at the previous step and the
    /// offending cell is reported.
    pub fn step(&mut self) -> Result<()> {
        self.stream_collide()?;
        std::mem::swap(&mut self.fold, &mut self.fnew);
        self.step += 1;

        self.update_macro()?;
        self.structure_factor.accumulate(&self.velocity);

        log::debug!("LB step {}", self.step);
        Ok(())
    }

    /// every cell gathers its incoming populations from `fold` and collides
    /// them into its own slot of `fnew`
    fn stream_collide(&mut self) -> Result<()> {
        let step = self.step + 1;
        let seed = self.params.seed;
        let grid = self.grid;
        let stencil = &self.stencil;
        let collision = &self.collision;
        let src = &self.fold;

        try_par_map_cells(self.fnew.cells_mut(), |cell| {
            let f = gather(stencil, src, cell);
            let mut rng = cell_rng(seed, step, cell);
            collision
                .collide(stencil, &f, &mut rng)
                .ok_or_else(|| degenerate(stencil, &f, grid, cell, step))
        })
    }

    /// recompute the velocity field from the current populations.
    ///
    /// ## Note
    /// if the populations are changed through [`LBM::populations_mut()`],
    /// this function should be explicitly called.
    pub fn update_macro(&mut self) -> Result<()> {
        let step = self.step;
        let grid = self.grid;
        let stencil = &self.stencil;
        let field = &self.fold;

        try_par_map_cells(&mut self.velocity, |cell| {
            let f = field.get(cell);
            moments(stencil, f)
                .map(|m| m.velocity)
                .ok_or_else(|| degenerate(stencil, f, grid, cell, step))
        })
    }

    fn output<S: OutputSink>(&self, sink: &mut S) -> Result<()> {
        let snapshot = self.structure_factor.flush(self.step, self.time())?;
        sink.velocity(&self.velocity_snapshot());
        sink.structure_factor(&snapshot);
        log::info!(
            "output at step {}: shear wave amplitude {:.6e}, kinetic energy {:.6e}",
            self.step,
            self.shear_wave_amplitude(),
            self.kinetic_energy()
        );
        Ok(())
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn stencil(&self) -> &Stencil {
        &self.stencil
    }

    pub fn collision(&self) -> &CollisionOperator {
        &self.collision
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    /// steps performed since initialization
    pub fn current_step(&self) -> u64 {
        self.step
    }

    /// simulated time, one unit per step
    pub fn time(&self) -> f64 {
        self.step as f64
    }

    pub fn populations(&self) -> &Field {
        &self.fold
    }

    pub fn populations_mut(&mut self) -> &mut Field {
        &mut self.fold
    }

    pub fn velocity_field(&self) -> &[[f64; DIM]] {
        &self.velocity
    }

    pub fn velocity_snapshot(&self) -> VelocitySnapshot {
        VelocitySnapshot {
            step: self.step,
            time: self.time(),
            n: self.grid.n(),
            velocity: self.velocity.clone(),
        }
    }

    pub fn structure_factor(&self) -> &StructureFactor {
        &self.structure_factor
    }

    pub fn total_mass(&self) -> f64 {
        self.fold.total_mass(&self.stencil)
    }

    pub fn total_momentum(&self) -> [f64; DIM] {
        self.fold.total_momentum(&self.stencil)
    }

    /// `Σ ½ ρ u²` over the grid
    pub fn kinetic_energy(&self) -> f64 {
        self.fold
            .cells()
            .iter()
            .zip(&self.velocity)
            .map(|(f, u)| 0.5 * density_momentum(&self.stencil, f).0 * u.dot(*u))
            .sum()
    }

    /// projection of `u_y` onto `sin(2πx/n)`, averaged over the grid
    pub fn shear_wave_amplitude(&self) -> f64 {
        let n = self.grid.n() as f64;
        let sum: f64 = self
            .velocity
            .iter()
            .enumerate()
            .map(|(i, u)| {
                let x = self.grid.coords(i)[0] as f64;
                u[1] * (TAU * x / n).sin()
            })
            .sum();
        2.0 * sum / self.grid.len() as f64
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::output::Recorder;
    use crate::stencil::Q;
    use approx::assert_abs_diff_eq;

    fn small(n: usize) -> SimulationParameters {
        SimulationParameters {
            n,
            steps: 6,
            plot_int: 3,
            ..Default::default()
        }
    }

    #[test]
    fn invalid_parameters_abort_setup() {
        let params = SimulationParameters {
            tau: 0.3,
            ..small(4)
        };
        assert!(matches!(LBM::new(params), Err(LbmError::InvalidConfig(_))));
    }

    #[test]
    fn output_cadence() {
        let mut sim = LBM::new(small(4)).unwrap();
        let mut recorder = Recorder::default();
        sim.run(&mut recorder).unwrap();

        let steps: Vec<u64> = recorder.velocity.iter().map(|s| s.step).collect();
        assert_eq!(steps, vec![0, 3, 6]);
        let samples: Vec<u64> = recorder.structure_factor.iter().map(|s| s.samples).collect();
        assert_eq!(samples, vec![1, 4, 7]);
        assert_eq!(recorder.structure_factor[2].time, 6.0);
        assert_eq!(sim.current_step(), 6);
    }

    #[test]
    fn disabled_output_still_steps() {
        let params = SimulationParameters {
            plot_int: 0,
            ..small(4)
        };
        let mut sim = LBM::new(params).unwrap();
        let mut recorder = Recorder::default();
        sim.run(&mut recorder).unwrap();

        assert!(recorder.velocity.is_empty());
        assert!(recorder.structure_factor.is_empty());
        assert_eq!(sim.structure_factor().samples(), 6);
    }

    #[test]
    fn degenerate_cell_halts_with_location() {
        let mut sim = LBM::new(small(4)).unwrap();
        sim.step().unwrap();

        // every population arriving at (1, 2, 3) is emptied
        let grid = sim.grid();
        let target = grid.index([1, 2, 3]);
        for i in 0..Q {
            let from = grid.shift(target, sim.stencil().velocity(i).map(|c| -c));
            sim.populations_mut().cells_mut()[from][i] = 0.0;
        }

        match sim.step() {
            Err(LbmError::DegenerateDensity { cell, step, density }) => {
                assert_eq!(cell, [1, 2, 3]);
                assert_eq!(step, 2);
                assert_eq!(density, 0.0);
            }
            other => panic!("expected degenerate density, got {other:?}"),
        }
        assert_eq!(sim.current_step(), 1);
    }

    #[test]
    fn update_macro_reports_degenerate_cell() {
        let mut sim = LBM::new(small(3)).unwrap();
        let cell = sim.grid().index([2, 0, 1]);
        sim.populations_mut().cells_mut()[cell] = [0.0; Q];
        assert!(matches!(
            sim.update_macro(),
            Err(LbmError::DegenerateDensity { cell: [2, 0, 1], step: 0, .. })
        ));
    }

    #[test]
    fn reset_restores_the_initial_state() {
        let mut sim = LBM::new(small(4)).unwrap();
        let initial = sim.populations().clone();
        for _ in 0..3 {
            sim.step().unwrap();
        }
        sim.initialize_shear_wave().unwrap();

        assert_eq!(sim.current_step(), 0);
        assert_eq!(sim.structure_factor().samples(), 0);
        assert_eq!(sim.populations(), &initial);
    }

    #[test]
    fn kinetic_energy_of_the_shear_wave() {
        let n = 8;
        let sim = LBM::new(small(n)).unwrap();
        let a = sim.params().amplitude;
        // ½ A² <sin²> n³
        let expected = 0.5 * a * a * 0.5 * (n * n * n) as f64;
        assert_abs_diff_eq!(sim.kinetic_energy(), expected, epsilon = 1e-15);
        assert_abs_diff_eq!(sim.shear_wave_amplitude(), a, epsilon = 1e-15);
    }
}
