use crate::stencil::{Populations, Stencil, DIM};

/// Hydrodynamic content of a single cell
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Moments {
    /// `ρ = Σ_i f_i`
    pub density: f64,
    /// `ρu = Σ_i f_i c_i`
    pub momentum: [f64; DIM],
    /// `u = ρu / ρ`
    pub velocity: [f64; DIM],
}

/// raw zeroth and first moments, with no check on the density
pub fn density_momentum(stencil: &Stencil, f: &Populations) -> (f64, [f64; DIM]) {
    let mut rho = 0.0;
    let mut j = [0.0; DIM];
    for (i, fi) in f.iter().enumerate() {
        let c = stencil.velocity(i);
        rho += fi;
        for a in 0..DIM {
            j[a] += fi * c[a] as f64;
        }
    }
    (rho, j)
}

/// reduce a population set to density and velocity.
///
/// returns `None` when the density is not a positive finite number, since no
/// meaningful velocity exists for such a cell.
pub fn moments(stencil: &Stencil, f: &Populations) -> Option<Moments> {
    let (density, momentum) = density_momentum(stencil, f);
    if !(density.is_finite() && density > 0.0) {
        return None;
    }

    let velocity = momentum.map(|j| j / density);
    if velocity.iter().any(|u| !u.is_finite()) {
        return None;
    }

    Some(Moments {
        density,
        momentum,
        velocity,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::stencil::{Q, WEIGHTS};
    use approx::assert_abs_diff_eq;

    #[test]
    fn single_direction() {
        let stencil = Stencil::d3q19();
        let mut f = [0.0; Q];
        f[0] = 1.0;
        // (1, 1, 0)
        f[7] = 1.0;

        let m = moments(&stencil, &f).unwrap();
        assert_eq!(m.density, 2.0);
        assert_eq!(m.momentum, [1.0, 1.0, 0.0]);
        assert_eq!(m.velocity, [0.5, 0.5, 0.0]);
    }

    #[test]
    fn weights_are_at_rest() {
        let stencil = Stencil::d3q19();
        let m = moments(&stencil, &WEIGHTS).unwrap();
        assert_abs_diff_eq!(m.density, 1.0, epsilon = 1e-15);
        for a in 0..DIM {
            assert_abs_diff_eq!(m.velocity[a], 0.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn degenerate_density_is_rejected() {
        let stencil = Stencil::d3q19();
        assert_eq!(moments(&stencil, &[0.0; Q]), None);
        assert_eq!(moments(&stencil, &[-1.0; Q]), None);

        let mut f = WEIGHTS;
        f[3] = f64::NAN;
        assert_eq!(moments(&stencil, &f), None);

        // the raw sums remain available for inspection
        let (rho, _) = density_momentum(&stencil, &[0.0; Q]);
        assert_eq!(rho, 0.0);
    }
}
