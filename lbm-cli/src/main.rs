mod gestures;

use clap::Parser;
use gestures::{generate_gesture, sample_gesture_type};
use lbm_core::{BoundaryWalls, Engine, SOLUTE_COUNT, SimulationParams, SimulationState};
use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Output directory
    #[arg(long)]
    out: PathBuf,

    /// Lattice width
    #[arg(long, default_value_t = 128)]
    width: usize,

    /// Lattice height
    #[arg(long, default_value_t = 128)]
    height: usize,

    /// Episode start index (for deterministic split-by-range)
    #[arg(long, default_value_t = 0)]
    episode_start: usize,

    /// Number of episodes to record
    #[arg(long, default_value_t = 4)]
    episodes: usize,

    /// Rendered frames per episode
    #[arg(long, default_value_t = 120)]
    frames: usize,

    /// Record every n-th frame
    #[arg(long, default_value_t = 1)]
    record_every: usize,

    /// JSON file with simulation parameters (missing keys take defaults)
    #[arg(long)]
    params: Option<PathBuf>,

    /// Override steps per rendered frame
    #[arg(long)]
    steps_per_frame: Option<u32>,

    /// Enable the A + B -> C reaction
    #[arg(long)]
    reaction: bool,

    /// Boundary walls: none, vertical, horizontal or both
    #[arg(long)]
    walls: Option<String>,

    /// Base RNG seed (reproducibility)
    #[arg(long, default_value_t = 123)]
    seed: u64,
}

#[derive(Serialize)]
struct MetaRow {
    global_frame_idx: u64,

    episode_idx: usize,
    frame_idx: usize,
    steps: u64,

    base_seed: u64,
    episode_seed: u64,

    width: usize,
    height: usize,

    gesture: String,
    tool_size: f32,
    solute: usize,

    total_mass: f64,
    total_concentration: [f64; SOLUTE_COUNT],
    max_speed: f32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.record_every == 0 {
        return Err("record_every must be >= 1".into());
    }

    let mut params = match &args.params {
        Some(path) => load_params(path)?,
        None => SimulationParams::default(),
    };
    if let Some(n) = args.steps_per_frame {
        params.steps_per_frame = n;
    }
    if args.reaction {
        params.reaction_enabled = true;
    }
    if let Some(w) = &args.walls {
        params.boundary_walls = parse_walls(w)?;
    }
    params.validate()?;

    fs::create_dir_all(&args.out)?;

    let mut solute_writer = BufWriter::new(File::create(args.out.join("solutes.bin"))?);
    let mut wall_writer = BufWriter::new(File::create(args.out.join("walls.bin"))?);

    let mut meta_file = BufWriter::new(
        OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(args.out.join("meta.jsonl"))?,
    );

    let mut global_idx: u64 = 0;

    for local_episode in 0..args.episodes {
        let episode_idx = args.episode_start + local_episode;

        // Deterministic per-episode seed
        let episode_seed = args.seed ^ ((episode_idx as u64).wrapping_mul(0x9E3779B97F4A7C15));
        let mut rng = ChaCha8Rng::seed_from_u64(episode_seed);

        let mut state = SimulationState { params: params.clone(), ..Default::default() };
        state.interaction.is_focused = true;
        state.interaction.aspect = aspect_for(args.width, args.height);

        let mut engine = Engine::new(args.width, args.height, &state)?;
        info!("episode {episode_idx}: seed {episode_seed:#x}");

        let mut frame_idx = 0;
        while frame_idx < args.frames {
            let kind = sample_gesture_type(&mut rng);
            let gesture = generate_gesture(&mut rng, kind);
            debug!("episode {episode_idx} frame {frame_idx}: {gesture:?}");

            state.interaction.active_tool = kind.tool();
            state.interaction.active_solute = gesture.solute;
            state.interaction.tool_size = gesture.tool_size;
            state.interaction.is_cursor_active = gesture.is_pressed();

            for g in 0..gesture.frames {
                if frame_idx >= args.frames {
                    break;
                }
                let (pos, vel) = gesture.cursor_at(g);
                state.interaction.cursor_pos = pos;
                state.interaction.cursor_vel = if gesture.is_pressed() { vel } else { [0.0, 0.0] };

                engine.run_frame(&state);

                if frame_idx % args.record_every == 0 {
                    let out = engine.output();
                    for s in 0..SOLUTE_COUNT {
                        write_f32_vec(&mut solute_writer, &out.concentration(s))?;
                    }
                    wall_writer.write_all(&out.wall_mask())?;

                    let row = MetaRow {
                        global_frame_idx: global_idx,

                        episode_idx,
                        frame_idx,
                        steps: engine.steps(),

                        base_seed: args.seed,
                        episode_seed,

                        width: args.width,
                        height: args.height,

                        gesture: kind.as_str().to_string(),
                        tool_size: gesture.tool_size,
                        solute: gesture.solute,

                        total_mass: out.total_mass(),
                        total_concentration: std::array::from_fn(|s| out.total_concentration(s)),
                        max_speed: max_speed(&out.velocity()),
                    };

                    serde_json::to_writer(&mut meta_file, &row)?;
                    meta_file.write_all(b"\n")?;

                    global_idx += 1;
                }
                frame_idx += 1;
            }
        }
    }

    solute_writer.flush()?;
    wall_writer.flush()?;
    meta_file.flush()?;

    info!("wrote recording to: {}", args.out.display());
    info!(
        "frames: {} (episodes={} * frames={} / record_every={})",
        global_idx, args.episodes, args.frames, args.record_every
    );

    Ok(())
}

fn write_f32_vec<W: Write>(w: &mut W, v: &[f32]) -> std::io::Result<()> {
    for &x in v {
        w.write_all(&x.to_le_bytes())?;
    }
    Ok(())
}

fn load_params(path: &Path) -> Result<SimulationParams, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("reading {}: {e}", path.display()))?;
    let params: SimulationParams = serde_json::from_str(&text)?;
    Ok(params)
}

fn parse_walls(s: &str) -> Result<BoundaryWalls, Box<dyn std::error::Error>> {
    match s.trim().to_ascii_lowercase().as_str() {
        "none" => Ok(BoundaryWalls::None),
        "vertical" => Ok(BoundaryWalls::Vertical),
        "horizontal" => Ok(BoundaryWalls::Horizontal),
        "both" => Ok(BoundaryWalls::Both),
        other => Err(format!("unknown wall configuration '{other}'").into()),
    }
}

/// Aspect-correction factors for a viewport showing the whole lattice.
fn aspect_for(width: usize, height: usize) -> [f32; 2] {
    let a = width as f32 / height.max(1) as f32;
    if a > 1.0 { [a, 1.0] } else { [1.0, 1.0 / a] }
}

fn max_speed(velocity: &[f32]) -> f32 {
    velocity
        .chunks_exact(2)
        .map(|u| (u[0] * u[0] + u[1] * u[1]).sqrt())
        .fold(0.0, f32::max)
}
