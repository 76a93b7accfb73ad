//! Per-cell fluid/wall classification, painted by the wall brushes and by
//! the boundary-wall configuration.

use crate::error::EngineResult;
use crate::grid::DoubleBuffer;
use crate::params::{BoundaryWalls, Interaction, Tool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum NodeKind {
    #[default]
    Fluid = 0,
    /// Painted by the user.
    Wall = 1,
    /// Forced by the boundary-wall configuration.
    Boundary = 2,
}

impl NodeKind {
    #[inline]
    pub fn is_wall(self) -> bool {
        self != NodeKind::Fluid
    }
}

/// What the wall brush does this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Paint {
    None,
    Add,
    Remove,
}

pub struct NodeClassifier {
    field: DoubleBuffer<NodeKind>,
}

impl NodeClassifier {
    pub fn new(width: usize, height: usize) -> EngineResult<NodeClassifier> {
        Ok(NodeClassifier {
            field: DoubleBuffer::new(width, height, NodeKind::Fluid, "node")?,
        })
    }

    pub fn read(&self) -> &[NodeKind] {
        self.field.read()
    }

    pub fn width(&self) -> usize {
        self.field.width()
    }

    pub fn height(&self) -> usize {
        self.field.height()
    }

    /// Empty domain: every cell is fluid.
    pub fn reset(&mut self) {
        self.field.clear(NodeKind::Fluid);
    }

    pub fn resize(&mut self, width: usize, height: usize) -> EngineResult<()> {
        self.field.resize(width, height, NodeKind::Fluid, "node")
    }

    /// One classification tick, reading the previous tags.
    pub fn update(&mut self, input: &Interaction, walls: BoundaryWalls) {
        let paint = if input.is_using(Tool::AddWall) {
            Paint::Add
        } else if input.is_using(Tool::RemoveWall) {
            Paint::Remove
        } else {
            Paint::None
        };
        let brush = input.brush();
        let (width, height) = (self.width(), self.height());

        self.field.update(|x, y, prev| {
            if walls.forces(x, y, width, height) {
                return NodeKind::Boundary;
            }
            let current = match prev[y * width + x] {
                // The boundary configuration no longer wants this cell.
                NodeKind::Boundary => NodeKind::Fluid,
                kind => kind,
            };
            if paint == Paint::None || !brush.covers(x, y, width, height) {
                return current;
            }
            match paint {
                Paint::Add => NodeKind::Wall,
                _ => NodeKind::Fluid,
            }
        });
    }
}
