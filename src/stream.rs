//! Propagation of populations to neighboring cells under periodic wrap.
//!
//! written as a pull: the destination cell gathers direction `i` from the cell
//! at `x - c_i`. this is the same permutation of (cell, direction) pairs as
//! pushing each population to `x + c_i`, but every worker only writes its own
//! cell.

use crate::grid::{par_map_cells, Field};
use crate::stencil::{Populations, Stencil};

/// populations arriving at `cell` after one streaming pass over `field`
#[inline]
pub fn gather(stencil: &Stencil, field: &Field, cell: usize) -> Populations {
    let grid = field.grid();
    std::array::from_fn(|i| {
        let c = stencil.velocity(i).map(|v| -v);
        field.get(grid.shift(cell, c))[i]
    })
}

/// stream `src` into the separate buffer `dst`
pub fn stream(stencil: &Stencil, src: &Field, dst: &mut Field) {
    debug_assert_eq!(src.grid(), dst.grid());
    par_map_cells(dst.cells_mut(), |cell| gather(stencil, src, cell));
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::grid::Grid;
    use crate::stencil::{DIM, Q, WEIGHTS};
    use approx::assert_abs_diff_eq;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn random_field(grid: Grid, seed: u64) -> Field {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut field = Field::at_rest(grid, &Stencil::d3q19(), 1.0);
        for f in field.cells_mut() {
            for i in 0..Q {
                f[i] = WEIGHTS[i] * rng.gen_range(0.5..1.5);
            }
        }
        field
    }

    #[test]
    fn population_moves_along_its_direction() {
        let stencil = Stencil::d3q19();
        let grid = Grid::new(4);
        let mut src = Field::at_rest(grid, &stencil, 0.0);
        let mut dst = src.clone();

        // direction 9 is (1, -1, 0); from the x = 3 face it wraps to x = 0
        let from = grid.index([3, 0, 2]);
        src.cells_mut()[from][9] = 1.0;
        stream(&stencil, &src, &mut dst);

        let to = grid.index([0, 3, 2]);
        assert_eq!(dst.get(to)[9], 1.0);
        let moved: f64 = dst.cells().iter().map(|f| f.iter().sum::<f64>()).sum();
        assert_eq!(moved, 1.0);
    }

    #[test]
    fn streaming_is_lossless() {
        let stencil = Stencil::d3q19();
        let grid = Grid::new(5);
        let src = random_field(grid, 3);
        let mut dst = Field::at_rest(grid, &stencil, 0.0);
        stream(&stencil, &src, &mut dst);

        assert_abs_diff_eq!(
            dst.total_mass(&stencil),
            src.total_mass(&stencil),
            epsilon = 1e-11
        );
        let (j0, j1) = (src.total_momentum(&stencil), dst.total_momentum(&stencil));
        for a in 0..DIM {
            assert_abs_diff_eq!(j1[a], j0[a], epsilon = 1e-11);
        }
    }

    #[test]
    fn streaming_is_a_permutation() {
        let stencil = Stencil::d3q19();
        let grid = Grid::new(3);
        let src = random_field(grid, 9);
        let mut dst = Field::at_rest(grid, &stencil, 0.0);
        stream(&stencil, &src, &mut dst);

        for i in 0..Q {
            let mut before: Vec<f64> = src.cells().iter().map(|f| f[i]).collect();
            let mut after: Vec<f64> = dst.cells().iter().map(|f| f[i]).collect();
            before.sort_by(f64::total_cmp);
            after.sort_by(f64::total_cmp);
            assert_eq!(before, after);
        }

        // streaming back along the opposite directions restores the field
        let mut back = Field::at_rest(grid, &stencil, 0.0);
        par_map_cells(back.cells_mut(), |cell| {
            std::array::from_fn(|i| dst.get(grid.shift(cell, stencil.velocity(i)))[i])
        });
        assert_eq!(back, src);
    }
}
