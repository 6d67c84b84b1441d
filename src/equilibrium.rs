use crate::stencil::{Populations, Stencil, DIM, Q};
use crate::Dot;

/// Second-order Hermite equilibrium of the lattice:
///
/// ```math
/// f_eq = w * ρ * ( 1 + 3(c⋅u) + (9/2)(c⋅u)^2 - (3/2)(u⋅u) )
/// ```
///
/// its zeroth moment is `ρ` and its first moment is `ρu` for any `u`.
/// the result is only physically meaningful while `|u|` stays well below the
/// lattice sound speed, which is not checked here.
pub fn equilibrium(stencil: &Stencil, rho: f64, u: [f64; DIM]) -> Populations {
    let uu = u.dot(u);
    std::array::from_fn(|i| {
        let c = stencil.velocity(i).map(f64::from);
        let p1 = 3.0 * c.dot(u);
        // p2 = 9 / 2 * c.dot(u) ^ 2
        let p2 = p1 * p1 / 2.0;
        let p3 = 1.5 * uu;
        stencil.weight(i) * rho * (1.0 + p1 + p2 - p3)
    })
}

/// rest state of density `rho`
pub fn at_rest(stencil: &Stencil, rho: f64) -> Populations {
    let mut f = [0.0; Q];
    for (i, f) in f.iter_mut().enumerate() {
        *f = rho * stencil.weight(i);
    }
    f
}
