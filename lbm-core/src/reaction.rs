//! Reaction coupling between the solute species.
//!
//! Each tick a per-cell reaction extent ξ is computed from the reactant
//! concentrations by mass action. Species i then changes by
//! `molar_mass_i * coefficient_i * ξ` during its collision pass, so every
//! reaction event consumes and produces in the fixed stoichiometric ratio.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::grid::DoubleBuffer;
use crate::lattice::{self, Populations};
use crate::nodes::NodeKind;
use crate::params::SOLUTE_COUNT;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stoichiometry {
    /// Signed coefficients: negative for reactants, positive for products.
    pub coefficients: [i32; SOLUTE_COUNT],
    pub molar_masses: [f32; SOLUTE_COUNT],
}

impl Default for Stoichiometry {
    /// A + B -> C
    fn default() -> Self {
        Stoichiometry {
            coefficients: [-1, -1, 1],
            molar_masses: [1.0; SOLUTE_COUNT],
        }
    }
}

impl Stoichiometry {
    pub fn validate(&self) -> EngineResult<()> {
        if !self.coefficients.iter().any(|&c| c < 0) {
            return Err(EngineError::InvalidStoichiometry(
                "at least one species must be a reactant".into(),
            ));
        }
        if let Some(m) = self.molar_masses.iter().find(|m| !(m.is_finite() && **m > 0.0)) {
            return Err(EngineError::InvalidStoichiometry(format!(
                "molar masses must be positive, got {m}"
            )));
        }
        Ok(())
    }

    pub fn mol_mass_times_coeffs(&self) -> [f32; SOLUTE_COUNT] {
        std::array::from_fn(|i| self.molar_masses[i] * self.coefficients[i] as f32)
    }

    /// Mass-action extent for the given concentrations, clamped so no
    /// reactant is driven below zero.
    pub fn extent(&self, rate: f32, concentrations: [f32; SOLUTE_COUNT]) -> f32 {
        let mut xi = rate;
        let mut limit = f32::INFINITY;
        for i in 0..SOLUTE_COUNT {
            let nu = self.coefficients[i];
            if nu >= 0 {
                continue;
            }
            let c = concentrations[i].max(0.0);
            xi *= c.powi(-nu);
            limit = limit.min(c / (-nu as f32 * self.molar_masses[i]));
        }
        xi.clamp(0.0, limit)
    }
}

pub struct Reaction {
    field: DoubleBuffer<f32>,
    rate: f32,
    stoichiometry: Stoichiometry,
    mol_mass_times_coeffs: [f32; SOLUTE_COUNT],
}

impl Reaction {
    pub fn new(width: usize, height: usize, stoichiometry: Stoichiometry, rate: f32) -> EngineResult<Reaction> {
        stoichiometry.validate()?;
        let mol_mass_times_coeffs = stoichiometry.mol_mass_times_coeffs();
        Ok(Reaction {
            field: DoubleBuffer::new(width, height, 0.0, "reaction")?,
            rate,
            stoichiometry,
            mol_mass_times_coeffs,
        })
    }

    /// Current per-cell extent.
    pub fn read(&self) -> &[f32] {
        self.field.read()
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.rate = rate;
    }

    pub fn stoichiometry(&self) -> &Stoichiometry {
        &self.stoichiometry
    }

    pub fn mol_mass_times_coeff(&self, species: usize) -> f32 {
        self.mol_mass_times_coeffs[species]
    }

    pub fn reset(&mut self) {
        self.field.clear(0.0);
    }

    pub fn resize(&mut self, width: usize, height: usize) -> EngineResult<()> {
        self.field.resize(width, height, 0.0, "reaction")
    }

    /// Recompute the extent from the solutes' current concentrations.
    /// Passing `enabled = false` forces the rate to zero.
    pub fn update(&mut self, nodes: &[NodeKind], solutes: [&[Populations]; SOLUTE_COUNT], enabled: bool) {
        let rate = if enabled { self.rate } else { 0.0 };
        let width = self.field.width();
        let stoichiometry = &self.stoichiometry;

        self.field.update(|x, y, _| {
            let idx = y * width + x;
            if rate == 0.0 || nodes[idx].is_wall() {
                return 0.0;
            }
            let c = std::array::from_fn(|s| lattice::sum(&solutes[s][idx]));
            stoichiometry.extent(rate, c)
        });
    }
}
