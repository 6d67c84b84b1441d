//! Separable discrete Fourier transform over the periodic cube.

use std::f64::consts::TAU;
use std::ops::{AddAssign, Mul};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const ZERO: Self = Self { re: 0.0, im: 0.0 };

    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    pub fn conj(self) -> Self {
        Self::new(self.re, -self.im)
    }

    pub fn norm_sqr(self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    pub fn scale(self, s: f64) -> Self {
        Self::new(self.re * s, self.im * s)
    }
}

impl AddAssign for Complex {
    fn add_assign(&mut self, o: Self) {
        self.re += o.re;
        self.im += o.im;
    }
}

impl Mul for Complex {
    type Output = Self;
    fn mul(self, o: Self) -> Self {
        Self::new(
            self.re * o.re - self.im * o.im,
            self.re * o.im + self.im * o.re,
        )
    }
}

/// Forward 3D DFT on an `n³` grid laid out as [`crate::grid::Grid`] does,
/// normalized by `1 / sqrt(n³)`.
#[derive(Clone, Debug)]
pub struct Dft3 {
    n: usize,
    /// `exp(-2πi j / n)`
    twiddle: Vec<Complex>,
}

impl Dft3 {
    pub fn new(n: usize) -> Self {
        let twiddle = (0..n)
            .map(|j| {
                let phase = -TAU * j as f64 / n as f64;
                Complex::new(phase.cos(), phase.sin())
            })
            .collect();
        Self { n, twiddle }
    }

    pub fn forward(&self, input: &[f64]) -> Vec<Complex> {
        let n = self.n;
        debug_assert_eq!(input.len(), n * n * n);

        let mut data: Vec<Complex> = input.iter().map(|&v| Complex::new(v, 0.0)).collect();
        let mut line = vec![Complex::ZERO; n];
        for stride in [1, n, n * n] {
            self.pass(&mut data, &mut line, stride);
        }

        let norm = 1.0 / ((n * n * n) as f64).sqrt();
        for v in &mut data {
            *v = v.scale(norm);
        }
        data
    }

    /// 1D transform of every line along the axis with the given stride
    fn pass(&self, data: &mut [Complex], line: &mut [Complex], stride: usize) {
        let n = self.n;
        for base in 0..data.len() {
            // only lines starting at coordinate 0 along this axis
            if (base / stride) % n != 0 {
                continue;
            }
            for (j, v) in line.iter_mut().enumerate() {
                *v = data[base + j * stride];
            }
            for k in 0..n {
                let mut acc = Complex::ZERO;
                for (j, v) in line.iter().enumerate() {
                    acc += *v * self.twiddle[(j * k) % n];
                }
                data[base + k * stride] = acc;
            }
        }
    }

    /// signed wavenumber of index `k`, in `[-n/2, n/2)`
    pub fn wavenumber(&self, k: usize) -> i32 {
        if k < self.n.div_ceil(2) {
            k as i32
        } else {
            k as i32 - self.n as i32
        }
    }
}
