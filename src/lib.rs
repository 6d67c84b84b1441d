//! Fluctuating Lattice Boltzmann Method for a periodic 3D fluid.
//!
//! * D3Q19 lattice with a multiple-relaxation-time collision in a
//!   weighted-orthogonal moment basis
//! * thermal noise obeying fluctuation-dissipation, drawn from per-cell
//!   counter-based random streams
//! * running average of the velocity structure factor
//!
//! ```
//! use fluctlb::{Recorder, SimulationParameters, LBM};
//!
//! let params = SimulationParameters {
//!     n: 8,
//!     steps: 20,
//!     plot_int: 10,
//!     ..Default::default()
//! };
//! let mut sim = LBM::new(params).unwrap();
//! let mut recorder = Recorder::default();
//! sim.run(&mut recorder).unwrap();
//!
//! // steps 0, 10 and 20
//! assert_eq!(recorder.velocity.len(), 3);
//! ```

use std::ops::{Add, Mul};

pub mod collision;
pub mod config;
pub mod dft;
pub mod equilibrium;
pub mod error;
pub mod grid;
pub mod moments;
pub mod noise;
pub mod output;
pub mod simulation;
pub mod stencil;
pub mod stream;
pub mod structure_factor;

pub use collision::{CollisionOperator, RelaxationRates};
pub use config::SimulationParameters;
pub use error::{LbmError, Result};
pub use grid::{Field, Grid};
pub use output::{ModeSpectrum, OutputSink, Recorder, StructureFactorSnapshot, VelocitySnapshot};
pub use simulation::LBM;
pub use stencil::{Populations, Stencil, Q};
pub use structure_factor::StructureFactor;

pub(crate) trait Dot<T> {
    /// Compute the dot product of two vector-like objects
    fn dot(self, other: Self) -> T;
}

impl<T> Dot<T> for [T; stencil::DIM]
where
    T: Mul<Output = T> + Add<Output = T> + Copy,
{
    fn dot(self, other: Self) -> T {
        self[0] * other[0] + self[1] * other[1] + self[2] * other[2]
    }
}
