use lbm_core::{SOLUTE_COUNT, Tool};
use rand::Rng;

/// Matches the UI's drag-to-velocity scaling.
pub const CURSOR_FORCE_MULTIPLIER: f32 = 6.0;

#[derive(Clone, Copy, Debug)]
pub enum GestureType {
    Stir,
    PaintWall,
    EraseWall,
    Inject,
    Drain,
    Idle,
}

impl GestureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GestureType::Stir => "stir",
            GestureType::PaintWall => "paint_wall",
            GestureType::EraseWall => "erase_wall",
            GestureType::Inject => "inject",
            GestureType::Drain => "drain",
            GestureType::Idle => "idle",
        }
    }

    pub fn tool(&self) -> Tool {
        match self {
            GestureType::Stir | GestureType::Idle => Tool::Force,
            GestureType::PaintWall => Tool::AddWall,
            GestureType::EraseWall => Tool::RemoveWall,
            GestureType::Inject => Tool::AddSolute,
            GestureType::Drain => Tool::RemoveSolute,
        }
    }
}

pub fn sample_gesture_type<R: Rng>(rng: &mut R) -> GestureType {
    // Stirring dominates, like in interactive sessions.
    match rng.gen_range(0..10) {
        0..=3 => GestureType::Stir,
        4 => GestureType::PaintWall,
        5 => GestureType::EraseWall,
        6 | 7 => GestureType::Inject,
        8 => GestureType::Drain,
        _ => GestureType::Idle,
    }
}

/// A straight pointer stroke across the viewport, held for `frames` frames.
#[derive(Clone, Debug)]
pub struct Gesture {
    pub kind: GestureType,
    pub solute: usize,
    pub tool_size: f32,
    pub start: [f32; 2],
    pub end: [f32; 2],
    pub frames: usize,
}

impl Gesture {
    /// Cursor position at `frame`, and the drag since the previous frame.
    pub fn cursor_at(&self, frame: usize) -> ([f32; 2], [f32; 2]) {
        let t = |f: usize| {
            if self.frames <= 1 {
                1.0
            } else {
                f.min(self.frames - 1) as f32 / (self.frames - 1) as f32
            }
        };
        let lerp = |t: f32| {
            [
                self.start[0] + t * (self.end[0] - self.start[0]),
                self.start[1] + t * (self.end[1] - self.start[1]),
            ]
        };
        let pos = lerp(t(frame));
        let prev = lerp(t(frame.saturating_sub(1)));
        let vel = [
            CURSOR_FORCE_MULTIPLIER * (pos[0] - prev[0]),
            CURSOR_FORCE_MULTIPLIER * (pos[1] - prev[1]),
        ];
        (pos, vel)
    }

    pub fn is_pressed(&self) -> bool {
        !matches!(self.kind, GestureType::Idle)
    }
}

pub fn generate_gesture<R: Rng>(rng: &mut R, kind: GestureType) -> Gesture {
    let start = [rng.gen_range(0.1..0.9), rng.gen_range(0.1..0.9)];
    let end = match kind {
        // Walls and sources are painted in short strokes.
        GestureType::PaintWall | GestureType::EraseWall | GestureType::Inject | GestureType::Drain => [
            (start[0] + rng.gen_range(-0.15..0.15f32)).clamp(0.05, 0.95),
            (start[1] + rng.gen_range(-0.15..0.15f32)).clamp(0.05, 0.95),
        ],
        _ => [rng.gen_range(0.1..0.9), rng.gen_range(0.1..0.9)],
    };

    Gesture {
        kind,
        solute: rng.gen_range(0..SOLUTE_COUNT),
        tool_size: rng.gen_range(0.05..0.3),
        start,
        end,
        frames: rng.gen_range(4..=16),
    }
}
