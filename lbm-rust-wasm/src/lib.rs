use lbm_core::{BoundaryWalls, Engine, SimulationState, Tool};
use wasm_bindgen::prelude::*;

/// Browser-facing handle. The page owns the interaction state through the
/// setters below and pulls sampled fields after each frame.
#[wasm_bindgen]
pub struct Simulation {
    inner: Engine,
    state: SimulationState,
}

#[wasm_bindgen]
impl Simulation {
    #[wasm_bindgen(constructor)]
    pub fn new(width: usize, height: usize) -> Result<Simulation, JsValue> {
        let state = SimulationState::default();
        let inner = Engine::new(width, height, &state).map_err(to_js)?;
        Ok(Simulation { inner, state })
    }

    // Pointer and tool input
    pub fn set_cursor(&mut self, x: f32, y: f32, vx: f32, vy: f32) {
        self.state.interaction.cursor_pos = [x, y];
        self.state.interaction.cursor_vel = [vx, vy];
    }
    pub fn set_pointer(&mut self, focused: bool, active: bool) {
        self.state.interaction.is_focused = focused;
        self.state.interaction.is_cursor_active = active;
    }
    pub fn set_aspect(&mut self, ax: f32, ay: f32) {
        self.state.interaction.aspect = [ax, ay];
    }
    /// 0 force, 1 add wall, 2 remove wall, 3 add solute, 4 remove solute
    pub fn set_tool(&mut self, tool: u8) -> Result<(), JsValue> {
        self.state.interaction.active_tool = match tool {
            0 => Tool::Force,
            1 => Tool::AddWall,
            2 => Tool::RemoveWall,
            3 => Tool::AddSolute,
            4 => Tool::RemoveSolute,
            _ => return Err(JsValue::from_str("unknown tool")),
        };
        Ok(())
    }
    pub fn set_active_solute(&mut self, id: usize) { self.state.interaction.active_solute = id; }
    pub fn set_tool_size(&mut self, size: f32) { self.state.interaction.tool_size = size; }

    // Parameters
    pub fn set_viscosity(&mut self, v: f32) -> Result<(), JsValue> {
        self.inner.set_viscosity(v).map_err(to_js)?;
        self.state.params.fluid_viscosity = v;
        Ok(())
    }
    pub fn set_solute_diffusivity(&mut self, id: usize, d: f32) -> Result<(), JsValue> {
        self.inner.set_solute_diffusivity(id, d).map_err(to_js)?;
        self.state.params.solute_diffusivities[id] = d;
        Ok(())
    }
    pub fn set_solute_color(&mut self, id: usize, r: f32, g: f32, b: f32) -> Result<(), JsValue> {
        self.inner.set_solute_color(id, [r, g, b]).map_err(to_js)?;
        self.state.params.solute_colors[id] = [r, g, b];
        Ok(())
    }
    pub fn set_reaction_rate(&mut self, rate: f32) -> Result<(), JsValue> {
        self.inner.set_reaction_rate(rate).map_err(to_js)?;
        self.state.params.reaction_rate = rate;
        Ok(())
    }
    pub fn set_reaction_enabled(&mut self, on: bool) { self.state.params.reaction_enabled = on; }
    pub fn set_walls(&mut self, vertical: bool, horizontal: bool) {
        self.state.params.boundary_walls = BoundaryWalls::from_flags(vertical, horizontal);
    }
    pub fn set_steps_per_frame(&mut self, n: u32) { self.state.params.steps_per_frame = n.max(1); }

    // Lifecycle
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), JsValue> {
        self.inner.resize(width, height).map_err(to_js)
    }
    pub fn reset_walls(&mut self) { self.inner.reset_node_ids(); }
    pub fn reset_fluid(&mut self) { self.inner.reset_fluid(); }
    pub fn reset_solute(&mut self, id: usize) -> Result<(), JsValue> {
        self.inner.reset_solute(id).map_err(to_js)
    }
    pub fn reset_all(&mut self) -> Result<(), JsValue> {
        self.state.reset();
        self.inner.reset_all(&self.state).map_err(to_js)
    }

    pub fn width(&self) -> usize { self.inner.width() }
    pub fn height(&self) -> usize { self.inner.height() }
    pub fn animation_phase(&self) -> f32 { self.inner.animation_phase() }

    // Copy-based JS access (reliable)
    pub fn get_walls(&self) -> Vec<u8> { self.inner.output().wall_mask() }
    pub fn get_density(&self) -> Vec<f32> { self.inner.output().density() }
    pub fn get_velocity(&self) -> Vec<f32> { self.inner.output().velocity() }
    pub fn get_concentration(&self, id: usize) -> Result<Vec<f32>, JsValue> {
        if id >= lbm_core::SOLUTE_COUNT {
            return Err(JsValue::from_str("solute index out of range"));
        }
        Ok(self.inner.output().concentration(id))
    }

    // Frame + timing (WASM-only)
    pub fn frame(&mut self) -> FrameInfo {
        let t0 = now_ms();
        let steps = self.inner.run_frame(&self.state);
        let t1 = now_ms();
        FrameInfo { steps, compute_ms: t1 - t0, total_steps: self.inner.steps() as f64 }
    }
    pub fn step(&mut self) {
        self.inner.step(&self.state);
    }
}

#[wasm_bindgen]
pub struct FrameInfo {
    steps: u32,
    compute_ms: f64,
    total_steps: f64,
}

#[wasm_bindgen]
impl FrameInfo {
    pub fn steps(&self) -> u32 { self.steps }
    pub fn compute_ms(&self) -> f64 { self.compute_ms }
    pub fn total_steps(&self) -> f64 { self.total_steps }
}

fn to_js(e: lbm_core::EngineError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
