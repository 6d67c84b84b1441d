//! Running average of the velocity structure factor.
//!
//! every accumulated velocity field is transformed component-wise and the
//! symmetric tensor
//!
//! ```math
//! S_ab(k) = Re( û_a(k) conj(û_b(k)) ) / scaling_ab
//! ```
//!
//! is added to the sum of its wavevector. the sum is never reset, so later
//! flushes average over the whole run.

use rayon::prelude::*;

use crate::dft::{Complex, Dft3};
use crate::error::{LbmError, Result};
use crate::grid::Grid;
use crate::output::{ModeSpectrum, StructureFactorSnapshot};
use crate::stencil::DIM;

/// names of the analysed variables
pub const VAR_NAMES: [&str; DIM] = ["velx", "vely", "velz"];

/// independent entries of a symmetric `DIM x DIM` tensor
pub const NCOV: usize = DIM * (DIM + 1) / 2;

/// component pairs of the upper triangle, in storage order
pub const PAIRS: [(usize, usize); NCOV] = [(0, 0), (0, 1), (0, 2), (1, 1), (1, 2), (2, 2)];

#[derive(Clone, Debug)]
pub struct StructureFactor {
    grid: Grid,
    dft: Dft3,
    /// inverse of the variance scaling of each pair
    scaling: [f64; NCOV],
    subtract_mean: bool,
    sum: Vec<[f64; NCOV]>,
    counts: Vec<u64>,
}

impl StructureFactor {
    /// `var_scaling` divides each tensor entry, so a field whose variance
    /// matches it has a unit spectrum
    pub fn new(grid: Grid, var_scaling: [f64; NCOV], subtract_mean: bool) -> Result<Self> {
        if let Some(bad) = var_scaling.iter().find(|s| !(s.is_finite() && **s != 0.0)) {
            return Err(LbmError::InvalidConfig(format!(
                "variance scaling must be finite and non-zero, got {bad}"
            )));
        }

        Ok(Self {
            grid,
            dft: Dft3::new(grid.n()),
            scaling: var_scaling.map(|s| 1.0 / s),
            subtract_mean,
            sum: vec![[0.0; NCOV]; grid.len()],
            counts: vec![0; grid.len()],
        })
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    /// number of fields accumulated so far
    pub fn samples(&self) -> u64 {
        self.counts.first().copied().unwrap_or(0)
    }

    /// signed wavevector of the mode stored at `index`
    pub fn wavevector(&self, index: usize) -> [i32; DIM] {
        self.grid.coords(index).map(|k| self.dft.wavenumber(k))
    }

    /// add one velocity field, laid out like [`Grid`], to the average
    pub fn accumulate(&mut self, velocity: &[[f64; DIM]]) {
        let len = self.grid.len();
        debug_assert_eq!(velocity.len(), len);

        let spectra: Vec<Vec<Complex>> = (0..DIM)
            .into_par_iter()
            .map(|a| {
                let mut component: Vec<f64> = velocity.iter().map(|u| u[a]).collect();
                if self.subtract_mean {
                    let mean = component.iter().sum::<f64>() / len as f64;
                    for v in &mut component {
                        *v -= mean;
                    }
                }

                let mut spectrum = self.dft.forward(&component);
                if self.subtract_mean {
                    spectrum[0] = Complex::ZERO;
                }
                spectrum
            })
            .collect();

        let scaling = self.scaling;
        self.sum
            .par_iter_mut()
            .zip(self.counts.par_iter_mut())
            .enumerate()
            .for_each(|(k, (acc, count))| {
                for (p, &(a, b)) in PAIRS.iter().enumerate() {
                    let cross = spectra[a][k] * spectra[b][k].conj();
                    acc[p] += cross.re * scaling[p];
                }
                *count += 1;
            });
    }

    /// time-averaged tensor of the mode stored at `index`
    pub fn mean(&self, index: usize) -> Option<[f64; NCOV]> {
        let count = self.counts[index];
        if count == 0 {
            return None;
        }
        Some(self.sum[index].map(|s| s / count as f64))
    }

    /// snapshot of the running average, tagged with `step` and `time`
    pub fn flush(&self, step: u64, time: f64) -> Result<StructureFactorSnapshot> {
        let samples = self.samples();
        if samples == 0 {
            return Err(LbmError::EmptyStructureFactor);
        }

        let modes = (0..self.grid.len())
            .into_par_iter()
            .map(|k| ModeSpectrum {
                wavevector: self.wavevector(k),
                tensor: self.sum[k].map(|s| s / self.counts[k] as f64),
            })
            .collect();

        log::debug!("structure factor flushed at step {step} over {samples} samples");
        Ok(StructureFactorSnapshot {
            step,
            time,
            n: self.grid.n(),
            samples,
            modes,
        })
    }
}
