//! Solute phase: advection-diffusion of one species on the D2Q9 lattice,
//! carried by the fluid velocity and fed by the reaction and the solute
//! brushes.

use crate::error::EngineResult;
use crate::fluid::gather;
use crate::grid::{DoubleBuffer, cell_center};
use crate::lattice::{self, Populations, W};
use crate::nodes::NodeKind;
use crate::params::{Brush, INIT_SOLUTE_CONCENTRATION, SOLUTE_SOURCE_RATE, SPEED_OF_SOUND};
use crate::relaxation::Relaxation;

/// User painting of concentration under the brush. Polarity is +1 when
/// adding and -1 when removing.
#[derive(Debug, Clone, Copy)]
pub struct Source {
    pub brush: Brush,
    pub polarity: f32,
}

/// Everything a solute collision reads besides its own populations.
#[derive(Clone, Copy)]
pub struct Coupling<'a> {
    pub nodes: &'a [NodeKind],
    pub fluid: &'a [Populations],
    pub extent: &'a [f32],
    /// Molar mass times signed stoichiometric coefficient of this species.
    pub mol_mass_times_coeff: f32,
    pub source: Option<Source>,
}

pub struct SolutePhase {
    field: DoubleBuffer<Populations>,
    relaxation: Relaxation,
    color: [f32; 3],
}

impl SolutePhase {
    pub fn new(width: usize, height: usize, diffusivity: f32, color: [f32; 3]) -> EngineResult<SolutePhase> {
        Ok(SolutePhase {
            field: DoubleBuffer::new(width, height, empty_state(), "solute")?,
            relaxation: Relaxation::from_diffusivity(diffusivity),
            color,
        })
    }

    pub fn read(&self) -> &[Populations] {
        self.field.read()
    }

    pub fn relaxation(&self) -> Relaxation {
        self.relaxation
    }

    pub fn set_diffusivity(&mut self, diffusivity: f32) {
        self.relaxation = Relaxation::from_diffusivity(diffusivity);
    }

    pub fn color(&self) -> [f32; 3] {
        self.color
    }

    pub fn set_color(&mut self, color: [f32; 3]) {
        self.color = color;
    }

    pub fn resize(&mut self, width: usize, height: usize) -> EngineResult<()> {
        self.field.resize(width, height, empty_state(), "solute")
    }

    /// Background concentration everywhere, plus `seed` inside an
    /// aspect-corrected circle on fluid cells. A zero radius seeds nothing.
    pub fn init(&mut self, nodes: &[NodeKind], center: [f32; 2], radius: f32, aspect: [f32; 2], seed: f32) {
        let (width, height) = (self.field.width(), self.field.height());
        self.field.clear(empty_state());
        self.field.fill_with(|x, y| {
            if nodes[y * width + x].is_wall() {
                return empty_state();
            }
            let p = cell_center(x, y, width, height);
            let dx = (p[0] - center[0]) * aspect[0];
            let dy = (p[1] - center[1]) * aspect[1];
            if dx * dx + dy * dy < radius * radius {
                lattice::at_rest(seed)
            } else {
                empty_state()
            }
        });
    }

    pub fn collide(&mut self, coupling: Coupling<'_>) {
        let (width, height) = (self.field.width(), self.field.height());
        let plus = self.relaxation.plus_omega();
        let minus = self.relaxation.minus_omega();

        self.field.update(|x, y, prev| {
            let idx = y * width + x;
            if coupling.nodes[idx].is_wall() {
                return empty_state();
            }
            let g = &prev[idx];
            let c = lattice::sum(g);
            let u = lattice::limit_speed(lattice::velocity(&coupling.fluid[idx]), SPEED_OF_SOUND);
            let geq = lattice::solute_equilibrium(c, u);
            let mut post = lattice::trt_collide(g, &geq, plus, minus);

            // Reaction extent is already clamped to what this cell can supply.
            let mut delta = coupling.mol_mass_times_coeff * coupling.extent[idx];
            if let Some(source) = coupling.source {
                if source.brush.covers(x, y, width, height) {
                    let available = (c + delta).max(0.0);
                    delta += (source.polarity * SOLUTE_SOURCE_RATE).max(-available);
                }
            }
            if delta != 0.0 {
                for (gi, wi) in post.iter_mut().zip(W.iter()) {
                    *gi += wi * delta;
                }
            }
            post
        });
    }

    pub fn stream(&mut self, nodes: &[NodeKind]) {
        let (width, height) = (self.field.width(), self.field.height());

        self.field.update(|x, y, post| {
            if nodes[y * width + x].is_wall() {
                return empty_state();
            }
            gather(post, nodes, x, y, width, height)
        });
    }
}

fn empty_state() -> Populations {
    lattice::at_rest(INIT_SOLUTE_CONCENTRATION)
}
