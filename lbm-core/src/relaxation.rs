//! Mapping from physical diffusive coefficients to TRT relaxation rates.

/// Λ, the product of the two TRT relaxation parameters.
pub const TRT_MAGIC: f32 = 0.25;

/// Derived relaxation state of one phase. Only built from a coefficient, so
/// it always matches the last value set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Relaxation {
    plus_omega: f32,
    minus_omega: f32,
    tau: f32,
}

impl Relaxation {
    /// Fluid mapping: viscosity sets the symmetric (even) rate.
    pub fn from_viscosity(viscosity: f32) -> Relaxation {
        let (primary, secondary) = magic_pair(viscosity);
        Relaxation {
            plus_omega: primary,
            minus_omega: secondary,
            tau: 1.0 / primary,
        }
    }

    /// Solute mapping: diffusivity sets the antisymmetric (odd) rate.
    pub fn from_diffusivity(diffusivity: f32) -> Relaxation {
        let (primary, secondary) = magic_pair(diffusivity);
        Relaxation {
            plus_omega: secondary,
            minus_omega: primary,
            tau: 1.0 / primary,
        }
    }

    pub fn plus_omega(&self) -> f32 {
        self.plus_omega
    }

    pub fn minus_omega(&self) -> f32 {
        self.minus_omega
    }

    pub fn tau(&self) -> f32 {
        self.tau
    }
}

/// (ω from the coefficient, ω from the magic parameter). The coefficient must
/// be positive; callers validate before getting here.
fn magic_pair(coefficient: f32) -> (f32, f32) {
    let primary = 1.0 / (3.0 * coefficient + 0.5);
    let secondary = 1.0 / (TRT_MAGIC / (1.0 / primary - 0.5) + 0.5);
    (primary, secondary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn fluid_rates_follow_viscosity() {
        let r = Relaxation::from_viscosity(0.1);
        // 1 / (0.3 + 0.5)
        assert_relative_eq!(r.plus_omega(), 1.25, max_relative = 1e-6);
        // 1 / (0.25 / 0.3 + 0.5)
        assert_relative_eq!(r.minus_omega(), 1.0 / (0.25 / 0.3 + 0.5), max_relative = 1e-6);
        assert_relative_eq!(r.tau(), 0.8, max_relative = 1e-6);
    }

    #[test]
    fn solute_rates_are_mirrored() {
        let d = 0.02;
        let fluid = Relaxation::from_viscosity(d);
        let solute = Relaxation::from_diffusivity(d);
        assert_eq!(fluid.plus_omega(), solute.minus_omega());
        assert_eq!(fluid.minus_omega(), solute.plus_omega());
        assert_eq!(fluid.tau(), solute.tau());
        assert_relative_eq!(solute.tau(), 3.0 * d + 0.5, max_relative = 1e-6);
    }

    #[test]
    fn magic_product_is_constant() {
        for c in [0.01f32, 0.1, 0.5, 1.0] {
            let r = Relaxation::from_viscosity(c);
            let lambda = (1.0 / r.plus_omega() - 0.5) * (1.0 / r.minus_omega() - 0.5);
            assert_relative_eq!(lambda, TRT_MAGIC, max_relative = 1e-4);
        }
    }
}
