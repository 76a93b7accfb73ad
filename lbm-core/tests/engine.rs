use approx::assert_relative_eq;
use lbm_core::params::{INIT_SOLUTE_SEEDS, TOOL_SIZE_MULTIPLIER};
use lbm_core::relaxation::TRT_MAGIC;
use lbm_core::{BoundaryWalls, Engine, NodeKind, SimulationState, Stoichiometry, Tool};

fn dragging(vel: [f32; 2]) -> SimulationState {
    let mut state = SimulationState::default();
    state.interaction.is_focused = true;
    state.interaction.is_cursor_active = true;
    state.interaction.active_tool = Tool::Force;
    state.interaction.cursor_vel = vel;
    state
}

fn idle(mut state: SimulationState) -> SimulationState {
    state.interaction.is_cursor_active = false;
    state.interaction.cursor_vel = [0.0, 0.0];
    state
}

#[test]
fn fluid_mass_is_conserved_without_forcing() {
    let stir = dragging([0.04, 0.02]);
    let mut engine = Engine::new(32, 32, &stir).unwrap();
    for _ in 0..5 {
        engine.step(&stir);
    }
    let quiet = idle(stir);
    let m0 = engine.output().total_mass();
    for _ in 0..200 {
        engine.step(&quiet);
    }
    assert_relative_eq!(engine.output().total_mass(), m0, max_relative = 1e-5);
}

#[test]
fn fluid_mass_is_conserved_inside_walls() {
    let mut stir = dragging([0.05, -0.03]);
    stir.params.boundary_walls = BoundaryWalls::Both;
    let mut engine = Engine::new(24, 20, &stir).unwrap();
    for _ in 0..5 {
        engine.step(&stir);
    }
    let quiet = idle(stir);
    engine.step(&quiet);
    let m0 = engine.output().total_mass();
    for _ in 0..200 {
        engine.step(&quiet);
    }
    assert_relative_eq!(engine.output().total_mass(), m0, max_relative = 1e-5);
}

#[test]
fn concentrations_are_conserved_with_reaction_disabled() {
    let stir = dragging([0.03, 0.03]);
    let mut engine = Engine::new(32, 32, &stir).unwrap();
    let before: Vec<f64> = (0..3).map(|s| engine.output().total_concentration(s)).collect();
    assert!(before.iter().all(|&c| c > 0.0));

    for _ in 0..10 {
        engine.step(&stir);
    }
    let quiet = idle(stir);
    for _ in 0..100 {
        engine.step(&quiet);
    }
    for (s, c0) in before.into_iter().enumerate() {
        assert_relative_eq!(engine.output().total_concentration(s), c0, max_relative = 1e-4);
    }
}

#[test]
fn reaction_follows_stoichiometry() {
    let mut state = SimulationState::default();
    state.params.reaction_enabled = true;
    state.params.reaction_rate = 0.5;
    let mut engine = Engine::new(32, 32, &state).unwrap();

    let totals = |e: &Engine| -> [f64; 3] {
        let out = e.output();
        [out.total_concentration(0), out.total_concentration(1), out.total_concentration(2)]
    };
    let [a0, b0, c0] = totals(&engine);

    for _ in 0..30 {
        engine.step(&state);
    }
    let [a1, b1, c1] = totals(&engine);

    assert!(a1 < a0 && b1 < b0, "reactants should be consumed");
    assert!(c1 > c0, "product should form");
    // A + B -> C: every unit of A lost shows up as one unit of C.
    assert_relative_eq!(a0 - a1, c1 - c0, max_relative = 1e-3);
    assert_relative_eq!(a1 + c1, a0 + c0, max_relative = 1e-4);
    assert_relative_eq!(b1 + c1, b0 + c0, max_relative = 1e-4);
}

#[test]
fn custom_stoichiometry_scales_production() {
    let mut state = SimulationState::default();
    state.params.reaction_enabled = true;
    state.params.reaction_rate = 0.2;
    let stoichiometry = Stoichiometry { coefficients: [-1, -1, 2], molar_masses: [1.0, 1.0, 1.0] };
    let mut engine = Engine::with_stoichiometry(24, 24, &state, stoichiometry).unwrap();

    let out = engine.output();
    let (a0, c0) = (out.total_concentration(0), out.total_concentration(2));
    for _ in 0..20 {
        engine.step(&state);
    }
    let out = engine.output();
    let (a1, c1) = (out.total_concentration(0), out.total_concentration(2));
    assert!(a0 > a1);
    assert_relative_eq!(2.0 * (a0 - a1), c1 - c0, max_relative = 1e-3);
}

#[test]
fn disabled_reaction_has_zero_extent() {
    let mut state = SimulationState::default();
    state.params.reaction_rate = 1.0;
    let mut engine = Engine::new(16, 16, &state).unwrap();
    engine.step(&state);
    assert!(engine.reaction_extent().iter().all(|&x| x == 0.0));

    state.params.reaction_enabled = true;
    engine.step(&state);
    assert!(engine.reaction_extent().iter().all(|&x| x >= 0.0));
    assert!(engine.reaction_extent().iter().any(|&x| x > 0.0));
}

#[test]
fn reset_fluid_matches_fresh_engine() {
    let state = SimulationState::default();
    let fresh = Engine::new(20, 16, &state).unwrap();

    let stir = dragging([0.05, 0.0]);
    let mut engine = Engine::new(20, 16, &state).unwrap();
    for _ in 0..10 {
        engine.step(&stir);
    }
    assert_ne!(engine.output().fluid, fresh.output().fluid);

    engine.reset_fluid();
    assert_eq!(engine.output().fluid, fresh.output().fluid);
}

#[test]
fn reset_solute_empties_only_that_species() {
    let state = SimulationState::default();
    let mut engine = Engine::new(20, 20, &state).unwrap();
    engine.reset_solute(1).unwrap();
    let out = engine.output();
    assert_eq!(out.total_concentration(1), 0.0);
    assert!(out.total_concentration(0) > 0.0);
    assert!(out.total_concentration(2) > 0.0);
}

#[test]
fn reset_all_restores_initial_configuration() {
    let mut state = SimulationState::default();
    let fresh = Engine::new(16, 16, &state).unwrap();
    let mut engine = Engine::new(16, 16, &state).unwrap();

    state.params.fluid_viscosity = 0.4;
    engine.set_viscosity(0.4).unwrap();
    engine.set_solute_diffusivity(2, 0.3).unwrap();
    state.interaction.is_focused = true;
    state.interaction.is_cursor_active = true;
    state.interaction.active_tool = Tool::AddWall;
    for _ in 0..3 {
        engine.step(&state);
    }
    assert!(engine.output().nodes.iter().any(|n| n.is_wall()));

    state.reset();
    engine.reset_all(&state).unwrap();
    let (a, b) = (engine.output(), fresh.output());
    assert_eq!(a.nodes, b.nodes);
    assert_eq!(a.fluid, b.fluid);
    for s in 0..3 {
        assert_eq!(a.solutes[s], b.solutes[s]);
    }
    assert_eq!(engine.fluid_relaxation(), fresh.fluid_relaxation());
    assert_eq!(engine.solute_relaxation(2).unwrap(), fresh.solute_relaxation(2).unwrap());
}

#[test]
fn wall_painting_converges_after_one_tick() {
    let mut state = SimulationState::default();
    state.interaction.is_focused = true;
    state.interaction.is_cursor_active = true;
    state.interaction.active_tool = Tool::AddWall;
    state.interaction.cursor_pos = [0.3, 0.6];
    state.interaction.tool_size = 0.3;
    let mut engine = Engine::new(32, 32, &state).unwrap();

    engine.step(&state);
    let first: Vec<NodeKind> = engine.output().nodes.to_vec();
    assert!(first.iter().any(|n| *n == NodeKind::Wall));
    for _ in 0..10 {
        engine.step(&state);
        assert_eq!(engine.output().nodes, first.as_slice());
    }

    // Painted region matches the brush footprint.
    let radius = TOOL_SIZE_MULTIPLIER * 0.3;
    let out = engine.output();
    let cx = (0.3 * 32.0) as usize;
    let cy = (0.6 * 32.0) as usize;
    assert_eq!(out.sample(cx, cy).unwrap().node, NodeKind::Wall);
    let far = ((0.3 + radius + 0.1) * 32.0) as usize;
    assert_eq!(out.sample(far, cy).unwrap().node, NodeKind::Fluid);
}

#[test]
fn walls_block_solute_under_them() {
    let mut state = SimulationState::default();
    state.interaction.is_focused = true;
    state.interaction.is_cursor_active = true;
    state.interaction.active_tool = Tool::AddWall;
    let (center, _) = INIT_SOLUTE_SEEDS[1];
    state.interaction.cursor_pos = center;
    let mut engine = Engine::new(32, 32, &state).unwrap();
    engine.step(&state);

    let out = engine.output();
    for (idx, node) in out.nodes.iter().enumerate() {
        if node.is_wall() {
            let (x, y) = (idx % 32, idx / 32);
            assert_eq!(out.sample(x, y).unwrap().concentrations, [0.0; 3]);
        }
    }
}

#[test]
fn viscosity_changes_recompute_relaxation() {
    let state = SimulationState::default();
    let mut engine = Engine::new(8, 8, &state).unwrap();

    let expected = |v: f32| {
        let plus = 1.0 / (3.0 * v + 0.5);
        let minus = 1.0 / (TRT_MAGIC / (1.0 / plus - 0.5) + 0.5);
        (plus, minus, 1.0 / plus)
    };

    engine.set_viscosity(0.05).unwrap();
    let r1 = engine.fluid_relaxation();
    engine.set_viscosity(0.3).unwrap();
    let r2 = engine.fluid_relaxation();
    assert_ne!(r1, r2);

    for (r, v) in [(r1, 0.05), (r2, 0.3)] {
        let (plus, minus, tau) = expected(v);
        assert_relative_eq!(r.plus_omega(), plus, max_relative = 1e-6);
        assert_relative_eq!(r.minus_omega(), minus, max_relative = 1e-6);
        assert_relative_eq!(r.tau(), tau, max_relative = 1e-6);
    }

    engine.set_viscosity(0.05).unwrap();
    assert_eq!(engine.fluid_relaxation(), r1);
}

#[test]
fn solute_diffusivity_uses_mirrored_mapping() {
    let state = SimulationState::default();
    let mut engine = Engine::new(8, 8, &state).unwrap();
    engine.set_solute_diffusivity(0, 0.2).unwrap();
    let r = engine.solute_relaxation(0).unwrap();
    assert_relative_eq!(r.minus_omega(), 1.0 / (3.0 * 0.2 + 0.5), max_relative = 1e-6);
    assert_relative_eq!(r.tau(), 3.0 * 0.2 + 0.5, max_relative = 1e-6);
    // Other species keep their own coefficients.
    assert_ne!(engine.solute_relaxation(1).unwrap(), r);
}

#[test]
fn resize_reports_new_extents_everywhere() {
    let state = SimulationState::default();
    let mut engine = Engine::new(16, 16, &state).unwrap();
    for _ in 0..3 {
        engine.step(&dragging([0.05, 0.0]));
    }

    engine.resize(40, 20).unwrap();
    let out = engine.output();
    assert_eq!((engine.width(), engine.height()), (40, 20));
    assert_eq!((out.width, out.height), (40, 20));
    assert_eq!(out.nodes.len(), 800);
    assert_eq!(out.fluid.len(), 800);
    for s in 0..3 {
        assert_eq!(out.solutes[s].len(), 800);
    }
    assert_eq!(engine.reaction_extent().len(), 800);
    assert!(out.sample(39, 19).is_some());
    assert!(out.sample(40, 0).is_none());

    let cell = out.sample(0, 0).unwrap();
    assert_relative_eq!(cell.density, 1.0, max_relative = 1e-6);
    assert_eq!(cell.velocity, [0.0, 0.0]);

    engine.step(&state);
    assert_eq!(engine.output().fluid.len(), 800);
}

#[test]
fn resize_rejects_empty_lattice() {
    let state = SimulationState::default();
    let mut engine = Engine::new(8, 8, &state).unwrap();
    assert!(engine.resize(0, 8).is_err());
    assert_eq!((engine.width(), engine.height()), (8, 8));
    assert_eq!(engine.output().fluid.len(), 64);
}

#[test]
fn adding_solute_requires_selection() {
    let mut state = SimulationState::default();
    state.interaction.is_focused = true;
    state.interaction.is_cursor_active = true;
    state.interaction.active_tool = Tool::AddSolute;
    state.interaction.active_solute = 2;
    state.interaction.cursor_pos = [0.1, 0.9];
    let mut engine = Engine::new(32, 32, &state).unwrap();
    let before: Vec<f64> = (0..3).map(|s| engine.output().total_concentration(s)).collect();

    for _ in 0..5 {
        engine.step(&state);
    }
    let out = engine.output();
    assert!(out.total_concentration(2) > before[2]);
    assert_relative_eq!(out.total_concentration(0), before[0], max_relative = 1e-5);
    assert_relative_eq!(out.total_concentration(1), before[1], max_relative = 1e-5);
}

#[test]
fn steps_are_deterministic() {
    let stir = dragging([0.05, 0.01]);
    let mut a = Engine::new(24, 24, &stir).unwrap();
    let mut b = Engine::new(24, 24, &stir).unwrap();
    for _ in 0..20 {
        a.step(&stir);
        b.step(&stir);
    }
    assert_eq!(a.output().fluid, b.output().fluid);
    assert_eq!(a.output().solutes[0], b.output().solutes[0]);
}

#[test]
fn invalid_construction_is_reported() {
    let state = SimulationState::default();
    assert!(Engine::new(0, 10, &state).is_err());

    let mut bad = SimulationState::default();
    bad.params.solute_diffusivities[1] = -0.1;
    assert!(Engine::new(10, 10, &bad).is_err());

    let products_only = Stoichiometry { coefficients: [1, 1, 1], molar_masses: [1.0; 3] };
    assert!(Engine::with_stoichiometry(10, 10, &state, products_only).is_err());
}
