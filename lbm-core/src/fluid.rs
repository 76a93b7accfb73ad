//! Fluid phase: D2Q9 TRT collision with cursor forcing, then streaming with
//! halfway bounce-back at walls.

use crate::error::EngineResult;
use crate::grid::{DoubleBuffer, wrap_index};
use crate::lattice::{self, E, OPP, Populations, Q};
use crate::nodes::NodeKind;
use crate::params::{Brush, INIT_FLUID_VELOCITY, REFERENCE_DENSITY, SPEED_OF_SOUND};
use crate::relaxation::Relaxation;

/// Velocity perturbation applied under the brush during collision.
#[derive(Debug, Clone, Copy)]
pub struct Forcing {
    pub brush: Brush,
    pub velocity: [f32; 2],
}

pub struct FluidPhase {
    field: DoubleBuffer<Populations>,
    relaxation: Relaxation,
}

impl FluidPhase {
    pub fn new(width: usize, height: usize, viscosity: f32) -> EngineResult<FluidPhase> {
        Ok(FluidPhase {
            field: DoubleBuffer::new(width, height, rest_state(), "fluid")?,
            relaxation: Relaxation::from_viscosity(viscosity),
        })
    }

    pub fn read(&self) -> &[Populations] {
        self.field.read()
    }

    pub fn relaxation(&self) -> Relaxation {
        self.relaxation
    }

    pub fn set_viscosity(&mut self, viscosity: f32) {
        self.relaxation = Relaxation::from_viscosity(viscosity);
    }

    pub fn resize(&mut self, width: usize, height: usize) -> EngineResult<()> {
        self.field.resize(width, height, rest_state(), "fluid")
    }

    /// Uniform equilibrium at the reference density and initial velocity.
    pub fn init(&mut self) {
        let feq = lattice::fluid_equilibrium(REFERENCE_DENSITY, INIT_FLUID_VELOCITY);
        self.field.clear(feq);
    }

    pub fn collide(&mut self, nodes: &[NodeKind], forcing: Option<Forcing>) {
        let (width, height) = (self.field.width(), self.field.height());
        let plus = self.relaxation.plus_omega();
        let minus = self.relaxation.minus_omega();

        self.field.update(|x, y, prev| {
            let idx = y * width + x;
            if nodes[idx].is_wall() {
                return rest_state();
            }
            let f = &prev[idx];
            let rho = lattice::sum(f);
            if !rho.is_finite() || rho <= 0.0 {
                return rest_state();
            }
            let mut u = lattice::velocity(f);
            if let Some(force) = forcing {
                if force.brush.covers(x, y, width, height) {
                    u[0] += force.velocity[0];
                    u[1] += force.velocity[1];
                }
            }
            let u = lattice::limit_speed(u, SPEED_OF_SOUND);
            let feq = lattice::fluid_equilibrium(rho, u);
            lattice::trt_collide(f, &feq, plus, minus)
        });
    }

    pub fn stream(&mut self, nodes: &[NodeKind]) {
        let (width, height) = (self.field.width(), self.field.height());

        self.field.update(|x, y, post| {
            let idx = y * width + x;
            if nodes[idx].is_wall() {
                return rest_state();
            }
            let f = gather(post, nodes, x, y, width, height);

            let rho = lattice::sum(&f);
            if !rho.is_finite() || rho <= 0.0 {
                return rest_state();
            }
            let u = lattice::velocity(&f);
            let capped = lattice::limit_speed(u, SPEED_OF_SOUND);
            if capped != u {
                lattice::fluid_equilibrium(rho, capped)
            } else {
                f
            }
        });
    }
}

/// Pull every population from its upstream neighbour; a wall upstream
/// reflects the cell's own opposite population instead.
pub(crate) fn gather(
    post: &[Populations],
    nodes: &[NodeKind],
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> Populations {
    let idx = y * width + x;
    let mut f = [0.0; Q];
    for i in 0..Q {
        let src = wrap_index(x, y, -E[i][0], -E[i][1], width, height);
        f[i] = if nodes[src].is_wall() {
            post[idx][OPP[i]]
        } else {
            post[src][i]
        };
    }
    f
}

fn rest_state() -> Populations {
    lattice::at_rest(REFERENCE_DENSITY)
}
