//! Periodic cubic lattice, population buffers and the parallel cell map.

use rayon::prelude::*;

use crate::equilibrium::at_rest;
use crate::moments::density_momentum;
use crate::stencil::{Populations, Stencil, DIM, Q};

/// Cubic periodic domain of `n³` cells.
///
/// cells are laid out with `x` fastest: `index = x + n (y + n z)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    n: usize,
}

impl Grid {
    pub fn new(n: usize) -> Self {
        Self { n }
    }

    /// cells along each axis
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// total number of cells
    #[inline]
    pub fn len(&self) -> usize {
        self.n * self.n * self.n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    pub fn index(&self, [x, y, z]: [usize; DIM]) -> usize {
        x + self.n * (y + self.n * z)
    }

    #[inline]
    pub fn coords(&self, index: usize) -> [usize; DIM] {
        let n = self.n;
        [index % n, (index / n) % n, index / (n * n)]
    }

    /// index of the cell displaced by `c` from `index`, wrapped periodically
    #[inline]
    pub fn shift(&self, index: usize, c: [i32; DIM]) -> usize {
        let n = self.n as i64;
        let coords = self.coords(index);
        let wrapped: [usize; DIM] =
            std::array::from_fn(|a| (coords[a] as i64 + c[a] as i64).rem_euclid(n) as usize);
        self.index(wrapped)
    }
}

/// One generation of populations over the whole grid
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    grid: Grid,
    cells: Vec<Populations>,
}

impl Field {
    /// uniform rest state of density `rho`
    pub fn at_rest(grid: Grid, stencil: &Stencil, rho: f64) -> Self {
        Self {
            grid,
            cells: vec![at_rest(stencil, rho); grid.len()],
        }
    }

    /// populations given by `init(coords)` at every cell
    pub fn from_fn<F>(grid: Grid, init: F) -> Self
    where
        F: Fn([usize; DIM]) -> Populations + Sync,
    {
        let mut cells = vec![[0.0; Q]; grid.len()];
        par_map_cells(&mut cells, |i| init(grid.coords(i)));
        Self { grid, cells }
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn cells(&self) -> &[Populations] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Populations] {
        &mut self.cells
    }

    #[inline]
    pub fn get(&self, index: usize) -> &Populations {
        &self.cells[index]
    }

    pub fn total_mass(&self, stencil: &Stencil) -> f64 {
        self.cells
            .par_iter()
            .map(|f| density_momentum(stencil, f).0)
            .sum()
    }

    pub fn total_momentum(&self, stencil: &Stencil) -> [f64; DIM] {
        self.cells
            .par_iter()
            .map(|f| density_momentum(stencil, f).1)
            .reduce(|| [0.0; DIM], |a, b| [a[0] + b[0], a[1] + b[1], a[2] + b[2]])
    }
}

/// Apply a pure per-cell function to every cell index, writing into `out`.
///
/// `out` must be a buffer distinct from anything `f` reads.
pub fn par_map_cells<T, F>(out: &mut [T], f: F)
where
    T: Send,
    F: Fn(usize) -> T + Sync,
{
    out.par_iter_mut()
        .enumerate()
        .for_each(|(i, slot)| *slot = f(i));
}

/// Fallible [`par_map_cells`].
///
/// every cell is still visited; when some fail, the error of the lowest cell
/// index is returned so the outcome does not depend on scheduling.
pub fn try_par_map_cells<T, E, F>(out: &mut [T], f: F) -> Result<(), E>
where
    T: Send,
    E: Send,
    F: Fn(usize) -> Result<T, E> + Sync,
{
    let first_error = out
        .par_iter_mut()
        .enumerate()
        .filter_map(|(i, slot)| match f(i) {
            Ok(value) => {
                *slot = value;
                None
            }
            Err(e) => Some((i, e)),
        })
        .min_by_key(|(i, _)| *i);

    match first_error {
        Some((_, e)) => Err(e),
        None => Ok(()),
    }
}
