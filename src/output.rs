//! Diagnostic records produced at the output cadence, and where they go.

use crate::stencil::DIM;
use crate::structure_factor::NCOV;

/// Macroscopic velocity at every cell, `x` fastest
#[derive(Clone, Debug, PartialEq)]
pub struct VelocitySnapshot {
    pub step: u64,
    pub time: f64,
    pub n: usize,
    pub velocity: Vec<[f64; DIM]>,
}

impl VelocitySnapshot {
    pub fn at(&self, [x, y, z]: [usize; DIM]) -> [f64; DIM] {
        self.velocity[x + self.n * (y + self.n * z)]
    }
}

/// Time-averaged structure factor tensor of a single wavevector.
///
/// `tensor` holds the upper triangle `xx, xy, xz, yy, yz, zz`.
#[derive(Clone, Debug, PartialEq)]
pub struct ModeSpectrum {
    pub wavevector: [i32; DIM],
    pub tensor: [f64; NCOV],
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructureFactorSnapshot {
    pub step: u64,
    pub time: f64,
    pub n: usize,
    /// number of velocity fields averaged so far
    pub samples: u64,
    pub modes: Vec<ModeSpectrum>,
}

impl StructureFactorSnapshot {
    pub fn mode(&self, wavevector: [i32; DIM]) -> Option<&ModeSpectrum> {
        self.modes.iter().find(|m| m.wavevector == wavevector)
    }
}

/// Consumer of the periodic diagnostics
pub trait OutputSink {
    fn velocity(&mut self, snapshot: &VelocitySnapshot);
    fn structure_factor(&mut self, snapshot: &StructureFactorSnapshot);
}

/// Keeps every snapshot in memory
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    pub velocity: Vec<VelocitySnapshot>,
    pub structure_factor: Vec<StructureFactorSnapshot>,
}

impl OutputSink for Recorder {
    fn velocity(&mut self, snapshot: &VelocitySnapshot) {
        self.velocity.push(snapshot.clone());
    }

    fn structure_factor(&mut self, snapshot: &StructureFactorSnapshot) {
        self.structure_factor.push(snapshot.clone());
    }
}
