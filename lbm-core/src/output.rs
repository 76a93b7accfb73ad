//! Read-only views of the current buffers, for visualization and analysis.

use crate::lattice::{self, Populations};
use crate::nodes::NodeKind;
use crate::params::SOLUTE_COUNT;

#[derive(Clone, Copy)]
pub struct OutputFields<'a> {
    pub width: usize,
    pub height: usize,
    pub nodes: &'a [NodeKind],
    pub fluid: &'a [Populations],
    pub solutes: [&'a [Populations]; SOLUTE_COUNT],
    pub solute_colors: [[f32; 3]; SOLUTE_COUNT],
    pub animation_phase: f32,
}

/// Macroscopic state of one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSample {
    pub node: NodeKind,
    pub density: f32,
    pub velocity: [f32; 2],
    pub concentrations: [f32; SOLUTE_COUNT],
}

impl OutputFields<'_> {
    pub fn sample(&self, x: usize, y: usize) -> Option<CellSample> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y * self.width + x;
        let f = &self.fluid[idx];
        Some(CellSample {
            node: self.nodes[idx],
            density: lattice::sum(f),
            velocity: lattice::velocity(f),
            concentrations: std::array::from_fn(|s| lattice::sum(&self.solutes[s][idx])),
        })
    }

    pub fn density(&self) -> Vec<f32> {
        self.fluid.iter().map(lattice::sum).collect()
    }

    /// Interleaved (ux, uy) per cell.
    pub fn velocity(&self) -> Vec<f32> {
        self.fluid.iter().flat_map(lattice::velocity).collect()
    }

    pub fn concentration(&self, species: usize) -> Vec<f32> {
        self.solutes[species].iter().map(lattice::sum).collect()
    }

    pub fn wall_mask(&self) -> Vec<u8> {
        self.nodes.iter().map(|n| n.is_wall() as u8).collect()
    }

    /// Summed fluid density over non-wall cells.
    pub fn total_mass(&self) -> f64 {
        self.fluid
            .iter()
            .zip(self.nodes)
            .filter(|(_, n)| !n.is_wall())
            .map(|(f, _)| lattice::sum(f) as f64)
            .sum()
    }

    pub fn total_concentration(&self, species: usize) -> f64 {
        self.solutes[species]
            .iter()
            .map(|g| lattice::sum(g) as f64)
            .sum()
    }
}
