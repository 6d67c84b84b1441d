//! D3Q19 velocity set and the weighted-orthogonal moment basis built on it.

/// Number of lattice directions in the D3Q19 scheme
pub const Q: usize = 19;

/// Number of spatial dimensions
pub const DIM: usize = 3;

/// Lattice sound speed squared, `c_s² = 1/3`
pub const CS2: f64 = 1.0 / 3.0;

/// One population value per lattice direction
pub type Populations = [f64; Q];

/// coordinates describing the displacement of each direction in the D3Q19 scheme
pub const SITE_VECS: [[i32; DIM]; Q] = [
    [0, 0, 0], // rest
    [1, 0, 0], // faces
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
    [0, 0, 1],
    [0, 0, -1],
    [1, 1, 0], // edges
    [-1, -1, 0],
    [1, -1, 0],
    [-1, 1, 0],
    [1, 0, 1],
    [-1, 0, -1],
    [1, 0, -1],
    [-1, 0, 1],
    [0, 1, 1],
    [0, -1, -1],
    [0, 1, -1],
    [0, -1, 1],
];

/// weights of directions in the D3Q19 scheme
pub const WEIGHTS: [f64; Q] = [
    1.0 / 3.0,
    1.0 / 18.0,
    1.0 / 18.0,
    1.0 / 18.0,
    1.0 / 18.0,
    1.0 / 18.0,
    1.0 / 18.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
];

/// reversed lattice directions, `SITE_VECS[SITE_REV[i]] == -SITE_VECS[i]`
pub const SITE_REV: [usize; Q] = [
    0, 2, 1, 4, 3, 6, 5, 8, 7, 10, 9, 12, 11, 14, 13, 16, 15, 18, 17,
];

/// Relaxation class of a moment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeClass {
    /// density and momentum, never relaxed
    Conserved,
    /// trace of the stress tensor
    Bulk,
    /// traceless stress, sets the kinematic viscosity
    Shear,
    /// kinetic modes with no hydrodynamic counterpart
    Ghost,
}

impl ModeClass {
    /// class of the `k`-th basis vector
    pub fn of(k: usize) -> Self {
        match k {
            0..=3 => Self::Conserved,
            4 => Self::Bulk,
            5..=9 => Self::Shear,
            _ => Self::Ghost,
        }
    }
}

/// Evaluate the 19 basis polynomials at a lattice velocity.
///
/// The set is orthogonal under `⟨a, b⟩ = Σ_i w_i a_i b_i`.
fn basis_row(c: [i32; DIM]) -> [f64; Q] {
    let [x, y, z] = c.map(f64::from);
    let (xx, yy, zz) = (x * x, y * y, z * z);
    let c2 = xx + yy + zz;
    [
        1.0,
        x,
        y,
        z,
        c2 - 1.0,
        3.0 * xx - c2,
        yy - zz,
        x * y,
        y * z,
        z * x,
        (3.0 * c2 - 5.0) * x,
        (3.0 * c2 - 5.0) * y,
        (3.0 * c2 - 5.0) * z,
        (yy - zz) * x,
        (zz - xx) * y,
        (xx - yy) * z,
        3.0 * c2 * c2 - 6.0 * c2 + 1.0,
        (2.0 * c2 - 3.0) * (3.0 * xx - c2),
        (2.0 * c2 - 3.0) * (yy - zz),
    ]
}

/// Immutable lattice description shared by every cell.
///
/// Owns the direction table together with the moment basis, so the collision
/// and streaming kernels only need a `&Stencil`.
#[derive(Clone, Debug)]
pub struct Stencil {
    /// `basis[k][i]` is the `k`-th basis polynomial evaluated at `c_i`
    basis: [[f64; Q]; Q],
    /// `Σ_i w_i basis[k][i]²`
    norms: [f64; Q],
}

impl Default for Stencil {
    fn default() -> Self {
        Self::d3q19()
    }
}

impl Stencil {
    pub fn d3q19() -> Self {
        let mut basis = [[0.0; Q]; Q];
        for (i, c) in SITE_VECS.iter().enumerate() {
            for (k, e) in basis_row(*c).into_iter().enumerate() {
                basis[k][i] = e;
            }
        }

        let norms = std::array::from_fn(|k| {
            (0..Q).map(|i| WEIGHTS[i] * basis[k][i] * basis[k][i]).sum()
        });

        Self { basis, norms }
    }

    #[inline]
    pub fn velocity(&self, i: usize) -> [i32; DIM] {
        SITE_VECS[i]
    }

    #[inline]
    pub fn weight(&self, i: usize) -> f64 {
        WEIGHTS[i]
    }

    /// index of the direction pointing opposite to `i`
    #[inline]
    pub fn opposite(&self, i: usize) -> usize {
        SITE_REV[i]
    }

    /// weighted norm `b_k` of the `k`-th basis vector
    #[inline]
    pub fn norm(&self, k: usize) -> f64 {
        self.norms[k]
    }

    /// project populations onto the moment basis, `m_k = Σ_i e_k(c_i) f_i`
    pub fn to_moments(&self, f: &Populations) -> [f64; Q] {
        std::array::from_fn(|k| {
            self.basis[k]
                .iter()
                .zip(f.iter())
                .map(|(e, f)| e * f)
                .sum()
        })
    }

    /// inverse of [`Stencil::to_moments`], `f_i = w_i Σ_k e_k(c_i) m_k / b_k`
    pub fn from_moments(&self, m: &[f64; Q]) -> Populations {
        let scaled: [f64; Q] = std::array::from_fn(|k| m[k] / self.norms[k]);
        std::array::from_fn(|i| {
            let sum: f64 = (0..Q).map(|k| self.basis[k][i] * scaled[k]).sum();
            WEIGHTS[i] * sum
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn weights_are_normalized_and_isotropic() {
        let stencil = Stencil::d3q19();

        let total: f64 = (0..Q).map(|i| stencil.weight(i)).sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-15);

        for a in 0..DIM {
            let first: f64 = (0..Q)
                .map(|i| stencil.weight(i) * stencil.velocity(i)[a] as f64)
                .sum();
            assert_abs_diff_eq!(first, 0.0, epsilon = 1e-15);

            // second moment of the weights gives the sound speed
            for b in 0..DIM {
                let second: f64 = (0..Q)
                    .map(|i| {
                        let c = stencil.velocity(i);
                        stencil.weight(i) * (c[a] * c[b]) as f64
                    })
                    .sum();
                let expected = if a == b { CS2 } else { 0.0 };
                assert_abs_diff_eq!(second, expected, epsilon = 1e-15);
            }
        }
    }

    #[test]
    fn directions_are_closed_under_negation() {
        let stencil = Stencil::d3q19();
        for i in 0..Q {
            let j = stencil.opposite(i);
            assert_eq!(stencil.opposite(j), i);
            assert_eq!(stencil.velocity(j), stencil.velocity(i).map(|c| -c));
        }
    }

    #[test]
    fn basis_is_weighted_orthogonal() {
        let stencil = Stencil::d3q19();
        for k in 0..Q {
            for l in 0..Q {
                let dot: f64 = (0..Q)
                    .map(|i| WEIGHTS[i] * stencil.basis[k][i] * stencil.basis[l][i])
                    .sum();
                let expected = if k == l { stencil.norm(k) } else { 0.0 };
                assert_abs_diff_eq!(dot, expected, epsilon = 1e-14);
            }
        }

        let expected = [
            1.0,
            1.0 / 3.0,
            1.0 / 3.0,
            1.0 / 3.0,
            2.0 / 3.0,
            4.0 / 3.0,
            4.0 / 9.0,
            1.0 / 9.0,
            1.0 / 9.0,
            1.0 / 9.0,
            2.0 / 3.0,
            2.0 / 3.0,
            2.0 / 3.0,
            2.0 / 9.0,
            2.0 / 9.0,
            2.0 / 9.0,
            2.0,
            4.0 / 3.0,
            4.0 / 9.0,
        ];
        for (k, b) in expected.iter().enumerate() {
            assert_abs_diff_eq!(stencil.norm(k), *b, epsilon = 1e-14);
        }
    }

    #[test]
    fn moment_transform_inverts() {
        let stencil = Stencil::d3q19();
        let f: Populations = std::array::from_fn(|i| WEIGHTS[i] * (1.0 + 0.01 * i as f64));

        let back = stencil.from_moments(&stencil.to_moments(&f));
        for i in 0..Q {
            assert_abs_diff_eq!(back[i], f[i], epsilon = 1e-14);
        }
    }

    #[test]
    fn mode_classes() {
        let conserved = (0..Q).filter(|k| ModeClass::of(*k) == ModeClass::Conserved);
        assert_eq!(conserved.count(), 1 + DIM);
        assert_eq!(ModeClass::of(4), ModeClass::Bulk);
        assert_eq!((5..10).filter(|k| ModeClass::of(*k) == ModeClass::Shear).count(), 5);
        assert_eq!(ModeClass::of(18), ModeClass::Ghost);
    }
}
