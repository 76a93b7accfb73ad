//! D2Q9 velocity set and the TRT collision kernel shared by every phase.
//!
//! ```text
//!   6   2   5
//!    \  |  /
//!   3 - 0 - 1
//!    /  |  \
//!   7   4   8
//! ```

pub const Q: usize = 9;

/// Populations of one cell, indexed by direction.
pub type Populations = [f32; Q];

/// Discrete velocities: [ex, ey]
pub const E: [[i32; 2]; Q] = [
    [0, 0],
    [1, 0],
    [0, 1],
    [-1, 0],
    [0, -1],
    [1, 1],
    [-1, 1],
    [-1, -1],
    [1, -1],
];

pub const W: [f32; Q] = [
    4.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 9.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
];

/// Opposite direction, for bounce-back and the TRT split.
pub const OPP: [usize; Q] = [0, 3, 4, 1, 2, 7, 8, 5, 6];

#[inline]
pub fn sum(f: &Populations) -> f32 {
    f.iter().sum()
}

/// First moment Σ f_i e_i.
#[inline]
pub fn momentum(f: &Populations) -> [f32; 2] {
    let mut m = [0.0, 0.0];
    for (fi, e) in f.iter().zip(E.iter()) {
        m[0] += fi * e[0] as f32;
        m[1] += fi * e[1] as f32;
    }
    m
}

/// Macroscopic velocity; zero for an empty cell.
#[inline]
pub fn velocity(f: &Populations) -> [f32; 2] {
    let rho = sum(f);
    if rho.abs() < 1e-12 {
        return [0.0, 0.0];
    }
    let m = momentum(f);
    [m[0] / rho, m[1] / rho]
}

/// Second-order equilibrium of the Navier-Stokes lattice:
/// f_i^eq = w_i ρ [1 + 3(e_i·u) + 9/2(e_i·u)² - 3/2(u·u)]
pub fn fluid_equilibrium(rho: f32, u: [f32; 2]) -> Populations {
    let uu = u[0] * u[0] + u[1] * u[1];
    std::array::from_fn(|i| {
        let eu = E[i][0] as f32 * u[0] + E[i][1] as f32 * u[1];
        W[i] * rho * (1.0 + 3.0 * eu + 4.5 * eu * eu - 1.5 * uu)
    })
}

/// Linear equilibrium of the advection-diffusion lattice:
/// g_i^eq = w_i C [1 + 3(e_i·u)]
pub fn solute_equilibrium(c: f32, u: [f32; 2]) -> Populations {
    std::array::from_fn(|i| {
        let eu = E[i][0] as f32 * u[0] + E[i][1] as f32 * u[1];
        W[i] * c * (1.0 + 3.0 * eu)
    })
}

/// Rest state of a cell holding `amount` of the conserved quantity.
pub fn at_rest(amount: f32) -> Populations {
    std::array::from_fn(|i| W[i] * amount)
}

/// Two-relaxation-time collision. The deviation from equilibrium is split
/// into the part symmetric and the part antisymmetric under direction
/// reversal; each relaxes at its own rate.
pub fn trt_collide(f: &Populations, feq: &Populations, plus_omega: f32, minus_omega: f32) -> Populations {
    std::array::from_fn(|i| {
        let o = OPP[i];
        let f_plus = 0.5 * (f[i] + f[o]);
        let f_minus = 0.5 * (f[i] - f[o]);
        let eq_plus = 0.5 * (feq[i] + feq[o]);
        let eq_minus = 0.5 * (feq[i] - feq[o]);
        f[i] - plus_omega * (f_plus - eq_plus) - minus_omega * (f_minus - eq_minus)
    })
}

/// Scale `u` down so its magnitude does not exceed `limit`.
#[inline]
pub fn limit_speed(u: [f32; 2], limit: f32) -> [f32; 2] {
    let mag = (u[0] * u[0] + u[1] * u[1]).sqrt();
    if mag > limit && mag > 0.0 {
        let s = limit / mag;
        [u[0] * s, u[1] * s]
    } else {
        u
    }
}
