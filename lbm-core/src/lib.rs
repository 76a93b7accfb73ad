//! Real-time 2D lattice Boltzmann simulation of a fluid carrying three
//! reacting solutes.
//!
//! The fluid is a D2Q9 two-relaxation-time (TRT) solver; each solute is an
//! advection-diffusion lattice on the same grid, advected by the fluid and
//! coupled to the others through a stoichiometric reaction. All state lives
//! in double-buffered fields owned by [`Engine`]; the caller owns a
//! [`SimulationState`] and passes it into every tick.
//!
//! ```
//! use lbm_core::{Engine, SimulationState, Tool};
//!
//! let mut state = SimulationState::default();
//! let mut engine = Engine::new(64, 64, &state).unwrap();
//!
//! // Drag through the middle of the domain.
//! state.interaction.is_focused = true;
//! state.interaction.is_cursor_active = true;
//! state.interaction.active_tool = Tool::Force;
//! state.interaction.cursor_vel = [0.05, 0.0];
//! for _ in 0..10 {
//!     engine.step(&state);
//! }
//!
//! let out = engine.output();
//! let cell = out.sample(32, 32).unwrap();
//! assert!(cell.velocity[0] > 0.0);
//! ```

pub mod engine;
pub mod error;
pub mod fluid;
pub mod grid;
pub mod lattice;
pub mod nodes;
pub mod output;
pub mod params;
pub mod reaction;
pub mod relaxation;
pub mod solute;

pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use nodes::NodeKind;
pub use output::{CellSample, OutputFields};
pub use params::{BoundaryWalls, Interaction, SOLUTE_COUNT, SimulationParams, SimulationState, Tool};
pub use reaction::Stoichiometry;
pub use relaxation::Relaxation;
