use std::f32::consts::PI;

use log::{debug, info, trace};

use crate::error::{EngineError, EngineResult};
use crate::fluid::{FluidPhase, Forcing};
use crate::grid::cell_count;
use crate::nodes::NodeClassifier;
use crate::output::OutputFields;
use crate::params::{
    INIT_SOLUTE_SEEDS, SEED_CONCENTRATION, SOLUTE_COUNT, SimulationParams, SimulationState, Tool,
    check_coefficient, check_rate,
};
use crate::reaction::{Reaction, Stoichiometry};
use crate::relaxation::Relaxation;
use crate::solute::{Coupling, SolutePhase, Source};

const ANIMATION_PHASE_STEP: f32 = 0.1;

/// Owns every field and runs the passes of one tick in a fixed order:
/// nodes, fluid, reaction, then each solute.
pub struct Engine {
    width: usize,
    height: usize,
    aspect: [f32; 2],
    animation_phase: f32,
    steps: u64,

    nodes: NodeClassifier,
    fluid: FluidPhase,
    reaction: Reaction,
    solutes: [SolutePhase; SOLUTE_COUNT],
}

impl Engine {
    pub fn new(width: usize, height: usize, state: &SimulationState) -> EngineResult<Engine> {
        Engine::with_stoichiometry(width, height, state, Stoichiometry::default())
    }

    pub fn with_stoichiometry(
        width: usize,
        height: usize,
        state: &SimulationState,
        stoichiometry: Stoichiometry,
    ) -> EngineResult<Engine> {
        let params = &state.params;
        params.validate()?;

        let solutes = [
            SolutePhase::new(width, height, params.solute_diffusivities[0], params.solute_colors[0])?,
            SolutePhase::new(width, height, params.solute_diffusivities[1], params.solute_colors[1])?,
            SolutePhase::new(width, height, params.solute_diffusivities[2], params.solute_colors[2])?,
        ];
        let mut engine = Engine {
            width,
            height,
            aspect: state.interaction.aspect,
            animation_phase: 0.0,
            steps: 0,
            nodes: NodeClassifier::new(width, height)?,
            fluid: FluidPhase::new(width, height, params.fluid_viscosity)?,
            reaction: Reaction::new(width, height, stoichiometry, params.reaction_rate)?,
            solutes,
        };
        engine.init_fields();

        info!(
            "engine ready: {}x{} lattice, viscosity={}, stoichiometry={:?}",
            width,
            height,
            params.fluid_viscosity,
            engine.reaction.stoichiometry().coefficients
        );
        Ok(engine)
    }

    // ---- Accessors ----

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn animation_phase(&self) -> f32 {
        self.animation_phase
    }

    pub fn fluid_relaxation(&self) -> Relaxation {
        self.fluid.relaxation()
    }

    pub fn solute_relaxation(&self, id: usize) -> EngineResult<Relaxation> {
        Ok(self.solute(id)?.relaxation())
    }

    pub fn solute_color(&self, id: usize) -> EngineResult<[f32; 3]> {
        Ok(self.solute(id)?.color())
    }

    pub fn reaction_rate(&self) -> f32 {
        self.reaction.rate()
    }

    pub fn stoichiometry(&self) -> &Stoichiometry {
        self.reaction.stoichiometry()
    }

    /// Current per-cell reaction extent.
    pub fn reaction_extent(&self) -> &[f32] {
        self.reaction.read()
    }

    pub fn output(&self) -> OutputFields<'_> {
        OutputFields {
            width: self.width,
            height: self.height,
            nodes: self.nodes.read(),
            fluid: self.fluid.read(),
            solutes: [self.solutes[0].read(), self.solutes[1].read(), self.solutes[2].read()],
            solute_colors: [self.solutes[0].color(), self.solutes[1].color(), self.solutes[2].color()],
            animation_phase: self.animation_phase,
        }
    }

    // ---- Parameters ----

    pub fn set_viscosity(&mut self, viscosity: f32) -> EngineResult<()> {
        check_coefficient("fluid viscosity", viscosity)?;
        self.fluid.set_viscosity(viscosity);
        debug!("viscosity set to {viscosity}, tau={}", self.fluid.relaxation().tau());
        Ok(())
    }

    pub fn set_solute_diffusivity(&mut self, id: usize, diffusivity: f32) -> EngineResult<()> {
        check_coefficient("solute diffusivity", diffusivity)?;
        let solute = self.solute_mut(id)?;
        solute.set_diffusivity(diffusivity);
        debug!("solute {id} diffusivity set to {diffusivity}, tau={}", solute.relaxation().tau());
        Ok(())
    }

    /// Display metadata only.
    pub fn set_solute_color(&mut self, id: usize, color: [f32; 3]) -> EngineResult<()> {
        self.solute_mut(id)?.set_color(color);
        Ok(())
    }

    pub fn set_reaction_rate(&mut self, rate: f32) -> EngineResult<()> {
        check_rate(rate)?;
        self.reaction.set_rate(rate);
        debug!("reaction rate set to {rate}");
        Ok(())
    }

    /// Push every coefficient from `params` into the engine.
    pub fn apply_params(&mut self, params: &SimulationParams) -> EngineResult<()> {
        params.validate()?;
        self.set_viscosity(params.fluid_viscosity)?;
        self.set_reaction_rate(params.reaction_rate)?;
        for id in 0..SOLUTE_COUNT {
            self.set_solute_diffusivity(id, params.solute_diffusivities[id])?;
            self.set_solute_color(id, params.solute_colors[id])?;
        }
        Ok(())
    }

    // ---- Simulation ----

    /// Advance by one tick.
    pub fn step(&mut self, state: &SimulationState) {
        let input = &state.interaction;
        let params = &state.params;
        self.aspect = input.aspect;
        let brush = input.brush();

        self.nodes.update(input, params.boundary_walls);
        let nodes = self.nodes.read();

        let forcing = input.is_using(Tool::Force).then_some(Forcing {
            brush,
            velocity: input.cursor_vel,
        });
        self.fluid.collide(nodes, forcing);
        self.fluid.stream(nodes);

        let [s0, s1, s2] = &self.solutes;
        self.reaction
            .update(nodes, [s0.read(), s1.read(), s2.read()], params.reaction_enabled);

        let fluid = self.fluid.read();
        let extent = self.reaction.read();
        for (id, solute) in self.solutes.iter_mut().enumerate() {
            let selected = input.active_solute == id;
            let adding = selected && input.is_using(Tool::AddSolute);
            let removing = selected && input.is_using(Tool::RemoveSolute);
            let polarity = (adding as i32 - removing as i32) as f32;

            solute.collide(Coupling {
                nodes,
                fluid,
                extent,
                mol_mass_times_coeff: self.reaction.mol_mass_times_coeff(id),
                source: (polarity != 0.0).then_some(Source { brush, polarity }),
            });
            solute.stream(nodes);
        }

        self.steps += 1;
        trace!("step {} done", self.steps);
    }

    /// One rendered frame: `steps_per_frame` ticks, then the wall animation.
    pub fn run_frame(&mut self, state: &SimulationState) -> u32 {
        let n = state.params.steps_per_frame.max(1);
        for _ in 0..n {
            self.step(state);
        }
        self.advance_animation_phase();
        n
    }

    /// Cosmetic wall-highlight phase, independent of the physics.
    pub fn advance_animation_phase(&mut self) {
        self.animation_phase = (self.animation_phase - ANIMATION_PHASE_STEP) % (2.0 * PI);
    }

    // ---- Lifecycle ----

    /// Reallocate every field at the new extents and reinitialize them.
    /// An allocation failure part way through leaves the engine unusable.
    pub fn resize(&mut self, width: usize, height: usize) -> EngineResult<()> {
        cell_count(width, height)?;
        self.nodes.resize(width, height)?;
        self.fluid.resize(width, height)?;
        self.reaction.resize(width, height)?;
        for solute in self.solutes.iter_mut() {
            solute.resize(width, height)?;
        }
        self.width = width;
        self.height = height;
        self.init_fields();
        info!("lattice resized to {width}x{height}");
        Ok(())
    }

    pub fn reset_node_ids(&mut self) {
        self.nodes.reset();
        debug!("walls reset");
    }

    pub fn reset_fluid(&mut self) {
        self.fluid.init();
        debug!("fluid reset");
    }

    /// Empty the solute without reseeding it.
    pub fn reset_solute(&mut self, id: usize) -> EngineResult<()> {
        let aspect = self.aspect;
        let nodes = self.nodes.read();
        let solute = self
            .solutes
            .get_mut(id)
            .ok_or(EngineError::SoluteIndex { index: id, count: SOLUTE_COUNT })?;
        solute.init(nodes, [0.0, 0.0], 0.0, aspect, SEED_CONCENTRATION);
        debug!("solute {id} reset");
        Ok(())
    }

    /// Restore every field and coefficient to its initial configuration.
    pub fn reset_all(&mut self, state: &SimulationState) -> EngineResult<()> {
        self.apply_params(&state.params)?;
        self.aspect = state.interaction.aspect;
        self.init_fields();
        info!("engine reset");
        Ok(())
    }

    fn init_fields(&mut self) {
        self.nodes.reset();
        self.reaction.reset();
        self.fluid.init();
        let nodes = self.nodes.read();
        for (solute, (center, radius)) in self.solutes.iter_mut().zip(INIT_SOLUTE_SEEDS) {
            solute.init(nodes, center, radius, self.aspect, SEED_CONCENTRATION);
        }
    }

    fn solute(&self, id: usize) -> EngineResult<&SolutePhase> {
        self.solutes
            .get(id)
            .ok_or(EngineError::SoluteIndex { index: id, count: SOLUTE_COUNT })
    }

    fn solute_mut(&mut self, id: usize) -> EngineResult<&mut SolutePhase> {
        self.solutes
            .get_mut(id)
            .ok_or(EngineError::SoluteIndex { index: id, count: SOLUTE_COUNT })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn animation_phase_wraps() {
        let mut e = Engine::new(4, 4, &SimulationState::default()).unwrap();
        for _ in 0..100 {
            e.advance_animation_phase();
        }
        let p = e.animation_phase();
        assert!(p <= 0.0 && p > -2.0 * PI);
        assert_relative_eq!(p, -10.0 + 2.0 * PI, max_relative = 1e-3);
    }

    #[test]
    fn out_of_range_solute_is_rejected() {
        let mut e = Engine::new(4, 4, &SimulationState::default()).unwrap();
        let err = EngineError::SoluteIndex { index: 3, count: SOLUTE_COUNT };
        assert_eq!(e.set_solute_diffusivity(3, 0.1), Err(err.clone()));
        assert_eq!(e.reset_solute(3), Err(err.clone()));
        assert_eq!(e.set_solute_color(7, [0.0; 3]), Err(EngineError::SoluteIndex { index: 7, count: 3 }));
        assert_eq!(e.solute_relaxation(3), Err(err));
    }

    #[test]
    fn invalid_coefficients_leave_state_untouched() {
        let mut e = Engine::new(4, 4, &SimulationState::default()).unwrap();
        let before = e.fluid_relaxation();
        assert!(e.set_viscosity(0.0).is_err());
        assert!(e.set_viscosity(-1.0).is_err());
        assert!(e.set_viscosity(f32::NAN).is_err());
        assert_eq!(e.fluid_relaxation(), before);
        assert!(e.set_reaction_rate(-0.5).is_err());
        assert!(e.set_reaction_rate(0.0).is_ok());
    }

    #[test]
    fn run_frame_counts_steps() {
        let mut state = SimulationState::default();
        state.params.steps_per_frame = 3;
        let mut e = Engine::new(6, 6, &state).unwrap();
        assert_eq!(e.run_frame(&state), 3);
        assert_eq!(e.steps(), 3);
        assert!(e.animation_phase() < 0.0);
    }
}
