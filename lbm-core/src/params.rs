//! Caller-owned simulation state: per-tick interaction input and the
//! tunable parameters. The engine never holds on to either; they are passed
//! into every call that needs them.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::grid::cell_center;

pub const SOLUTE_COUNT: usize = 3;

// ---- Lattice constants ----
pub const SPEED_OF_SOUND: f32 = 0.3;
pub const REFERENCE_DENSITY: f32 = 1.0;
pub const INIT_FLUID_VELOCITY: [f32; 2] = [0.0, 0.0];
pub const INIT_SOLUTE_CONCENTRATION: f32 = 0.0;
pub const SEED_CONCENTRATION: f32 = 1.0;
pub const INIT_SOLUTE_SEEDS: [([f32; 2], f32); SOLUTE_COUNT] =
    [([0.4, 0.4], 0.2), ([0.5, 0.6], 0.2), ([0.6, 0.4], 0.2)];

// ---- Interaction constants ----
pub const TOOL_SIZE_MULTIPLIER: f32 = 0.5;
pub const SOLUTE_SOURCE_RATE: f32 = 0.05;

// ---- Defaults ----
pub const INIT_FLUID_VISCOSITY: f32 = 0.1;
pub const INIT_SOLUTE_DIFFUSIVITY: f32 = 0.02;
pub const INIT_SOLUTE_COLORS: [[f32; 3]; SOLUTE_COUNT] =
    [[1.0, 0.78, 0.0], [0.39, 0.0, 1.0], [0.39, 1.0, 0.78]];
pub const INIT_REACTION_RATE: f32 = 0.01;
pub const INIT_TOOL_SIZE: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    #[default]
    Force,
    AddWall,
    RemoveWall,
    AddSolute,
    RemoveSolute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryWalls {
    #[default]
    None,
    Vertical,
    Horizontal,
    Both,
}

impl BoundaryWalls {
    pub fn from_flags(vertical: bool, horizontal: bool) -> BoundaryWalls {
        match (vertical, horizontal) {
            (false, false) => BoundaryWalls::None,
            (true, false) => BoundaryWalls::Vertical,
            (false, true) => BoundaryWalls::Horizontal,
            (true, true) => BoundaryWalls::Both,
        }
    }

    pub fn has_vertical(&self) -> bool {
        matches!(self, BoundaryWalls::Vertical | BoundaryWalls::Both)
    }

    pub fn has_horizontal(&self) -> bool {
        matches!(self, BoundaryWalls::Horizontal | BoundaryWalls::Both)
    }

    /// Does the configuration force cell (x, y) to be a wall?
    pub fn forces(&self, x: usize, y: usize, width: usize, height: usize) -> bool {
        (self.has_vertical() && (x == 0 || x + 1 == width))
            || (self.has_horizontal() && (y == 0 || y + 1 == height))
    }
}

/// Pointer and tool state sampled by the UI once per tick. Positions and
/// velocities are in normalized simulation coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Interaction {
    pub cursor_pos: [f32; 2],
    pub cursor_vel: [f32; 2],
    pub is_focused: bool,
    pub is_cursor_active: bool,
    pub active_tool: Tool,
    pub active_solute: usize,
    pub tool_size: f32,
    /// Aspect-correction factors of the viewport: (a, 1) when wide, (1, 1/a) when tall.
    pub aspect: [f32; 2],
}

impl Default for Interaction {
    fn default() -> Self {
        Interaction {
            cursor_pos: [0.5, 0.5],
            cursor_vel: [0.0, 0.0],
            is_focused: false,
            is_cursor_active: false,
            active_tool: Tool::Force,
            active_solute: 0,
            tool_size: INIT_TOOL_SIZE,
            aspect: [1.0, 1.0],
        }
    }
}

impl Interaction {
    /// Is the pointer pressed over the focused viewport with `tool` selected?
    pub fn is_using(&self, tool: Tool) -> bool {
        self.is_focused && self.is_cursor_active && self.active_tool == tool
    }

    pub fn brush(&self) -> Brush {
        Brush {
            center: self.cursor_pos,
            radius: TOOL_SIZE_MULTIPLIER * self.tool_size,
            aspect: self.aspect,
        }
    }
}

/// Tunable physical and orchestration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub fluid_viscosity: f32,
    pub solute_diffusivities: [f32; SOLUTE_COUNT],
    pub solute_colors: [[f32; 3]; SOLUTE_COUNT],
    pub reaction_enabled: bool,
    pub reaction_rate: f32,
    pub boundary_walls: BoundaryWalls,
    pub steps_per_frame: u32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        SimulationParams {
            fluid_viscosity: INIT_FLUID_VISCOSITY,
            solute_diffusivities: [INIT_SOLUTE_DIFFUSIVITY; SOLUTE_COUNT],
            solute_colors: INIT_SOLUTE_COLORS,
            reaction_enabled: false,
            reaction_rate: INIT_REACTION_RATE,
            boundary_walls: BoundaryWalls::None,
            steps_per_frame: 1,
        }
    }
}

impl SimulationParams {
    pub fn validate(&self) -> EngineResult<()> {
        check_coefficient("fluid viscosity", self.fluid_viscosity)?;
        for &d in &self.solute_diffusivities {
            check_coefficient("solute diffusivity", d)?;
        }
        check_rate(self.reaction_rate)?;
        if self.steps_per_frame == 0 {
            return Err(EngineError::InvalidParameter {
                name: "steps per frame",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationState {
    pub interaction: Interaction,
    pub params: SimulationParams,
}

impl SimulationState {
    /// Restore the resettable state: tool selection, brush size and every
    /// parameter. Cursor, focus, active solute and aspect are kept.
    pub fn reset(&mut self) {
        self.interaction.active_tool = Tool::Force;
        self.interaction.tool_size = INIT_TOOL_SIZE;
        self.params = SimulationParams::default();
    }
}

/// Circular, aspect-corrected footprint of the active tool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub center: [f32; 2],
    pub radius: f32,
    pub aspect: [f32; 2],
}

impl Brush {
    pub fn covers(&self, x: usize, y: usize, width: usize, height: usize) -> bool {
        let p = cell_center(x, y, width, height);
        let dx = (p[0] - self.center[0]) * self.aspect[0];
        let dy = (p[1] - self.center[1]) * self.aspect[1];
        dx * dx + dy * dy < self.radius * self.radius
    }
}

pub(crate) fn check_coefficient(name: &'static str, value: f32) -> EngineResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidCoefficient { name, value })
    }
}

pub(crate) fn check_rate(value: f32) -> EngineResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidParameter {
            name: "reaction rate",
            reason: format!("must be non-negative and finite, got {value}"),
        })
    }
}
