//! Multiple-relaxation-time collision with optional thermal fluctuations.
//!
//! The deviation from equilibrium is relaxed mode by mode in the weighted
//! orthogonal basis of [`Stencil`]:
//!
//! ```math
//! m*_k = m_eq_k + γ_k (m_k - m_eq_k) + sqrt(ρ b_k (T / c_s²) (1 - γ_k²)) r_k
//! ```
//!
//! with `γ_k = 1 - λ_k` and `r_k` standard normal. density and momentum are
//! carried through untouched.
//!
//! ## Note
//! stability requires `τ ≥ 1/2`. nothing in here checks it; populations
//! simply diverge outside that range.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::equilibrium::equilibrium;
use crate::moments::moments;
use crate::stencil::{ModeClass, Populations, Stencil, CS2, Q};

/// Relaxation rate `λ_k` of every moment
#[derive(Clone, Debug, PartialEq)]
pub struct RelaxationRates {
    tau: f64,
    tau_bulk: f64,
    rates: [f64; Q],
}

impl RelaxationRates {
    /// shear modes relax at `1/tau`, the bulk mode at `1/tau_bulk`, ghost modes at `ghost`
    pub fn new(tau: f64, tau_bulk: f64, ghost: f64) -> Self {
        let rates = std::array::from_fn(|k| match ModeClass::of(k) {
            ModeClass::Conserved => 0.0,
            ModeClass::Bulk => 1.0 / tau_bulk,
            ModeClass::Shear => 1.0 / tau,
            ModeClass::Ghost => ghost,
        });
        Self {
            tau,
            tau_bulk,
            rates,
        }
    }

    /// single relaxation time for the stress, ghost modes projected out every step
    pub fn from_tau(tau: f64) -> Self {
        Self::new(tau, tau, 1.0)
    }

    #[inline]
    pub fn rate(&self, k: usize) -> f64 {
        self.rates[k]
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }

    pub fn tau_bulk(&self) -> f64 {
        self.tau_bulk
    }

    /// `ν = c_s² (τ - 1/2)`
    pub fn kinematic_viscosity(&self) -> f64 {
        CS2 * (self.tau - 0.5)
    }
}

/// Per-cell collision, shared read-only by every worker.
#[derive(Clone, Debug)]
pub struct CollisionOperator {
    rates: RelaxationRates,
    temperature: f64,
    /// noise standard deviation of each mode at unit density
    amplitude: [f64; Q],
}

impl CollisionOperator {
    pub fn new(stencil: &Stencil, rates: RelaxationRates, temperature: f64) -> Self {
        let amplitude = std::array::from_fn(|k| {
            if ModeClass::of(k) == ModeClass::Conserved || temperature <= 0.0 {
                return 0.0;
            }
            let gamma = 1.0 - rates.rate(k);
            (stencil.norm(k) * temperature / CS2 * (1.0 - gamma * gamma)).sqrt()
        });

        Self {
            rates,
            temperature,
            amplitude,
        }
    }

    pub fn rates(&self) -> &RelaxationRates {
        &self.rates
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// whether collisions draw from the random stream at all
    pub fn is_thermal(&self) -> bool {
        self.temperature > 0.0
    }

    /// relax one population set.
    ///
    /// returns `None` when the incoming density is degenerate. `rng` is only
    /// read when the temperature is positive.
    pub fn collide<R: Rng>(
        &self,
        stencil: &Stencil,
        f: &Populations,
        rng: &mut R,
    ) -> Option<Populations> {
        let hydro = moments(stencil, f)?;
        let feq = equilibrium(stencil, hydro.density, hydro.velocity);

        let mut modes = stencil.to_moments(f);
        let modes_eq = stencil.to_moments(&feq);
        let sqrt_rho = hydro.density.sqrt();

        for k in 0..Q {
            if ModeClass::of(k) == ModeClass::Conserved {
                continue;
            }

            let gamma = 1.0 - self.rates.rate(k);
            let mut relaxed = modes_eq[k] + gamma * (modes[k] - modes_eq[k]);
            if self.is_thermal() {
                let r: f64 = StandardNormal.sample(rng);
                relaxed += sqrt_rho * self.amplitude[k] * r;
            }
            modes[k] = relaxed;
        }

        Some(stencil.from_moments(&modes))
    }
}
