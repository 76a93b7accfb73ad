//! Double-buffered lattice storage.
//!
//! Every field lives in two equally shaped buffers. One is "current" (the
//! state at the end of the last pass, readable by every other pass) and the
//! other is scratch space that the next pass writes into. A pass is a kernel
//! evaluated once per cell; when it has filled the whole write buffer the
//! roles are swapped by flipping a single index, without copying.

use crate::error::{EngineError, EngineResult};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Clone)]
pub struct DoubleBuffer<T> {
    width: usize,
    height: usize,
    buffers: [Vec<T>; 2],
    current: usize,
}

impl<T: Copy + Send + Sync> DoubleBuffer<T> {
    /// Allocate both buffers filled with `value`.
    pub fn new(width: usize, height: usize, value: T, field: &'static str) -> EngineResult<Self> {
        let cells = cell_count(width, height)?;
        Ok(DoubleBuffer {
            width,
            height,
            buffers: [alloc(cells, value, field)?, alloc(cells, value, field)?],
            current: 0,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The current (last completed) buffer.
    pub fn read(&self) -> &[T] {
        &self.buffers[self.current]
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.read().get(y * self.width + x)
    }

    /// Exchange read and write roles.
    pub fn swap(&mut self) {
        self.current ^= 1;
    }

    /// Reset both buffers to a uniform value.
    pub fn clear(&mut self, value: T) {
        self.buffers[0].fill(value);
        self.buffers[1].fill(value);
    }

    /// Reallocate both buffers at new dimensions. Prior contents are gone;
    /// the caller must re-run its initialization pass.
    pub fn resize(&mut self, width: usize, height: usize, value: T, field: &'static str) -> EngineResult<()> {
        *self = DoubleBuffer::new(width, height, value, field)?;
        Ok(())
    }

    /// Run `kernel` for every cell, writing into the scratch buffer while the
    /// current buffer stays readable, then swap. The kernel sees the cell
    /// coordinates and the current buffer of this field.
    pub fn update<F>(&mut self, kernel: F)
    where
        F: Fn(usize, usize, &[T]) -> T + Send + Sync,
    {
        let width = self.width;
        let (read, write) = self.split();
        dispatch(write, width, |x, y, cell| *cell = kernel(x, y, read));
        self.swap();
    }

    /// Write every cell from `kernel` without reading this field's previous
    /// state (used by initialization passes), then swap.
    pub fn fill_with<F>(&mut self, kernel: F)
    where
        F: Fn(usize, usize) -> T + Send + Sync,
    {
        self.update(|x, y, _| kernel(x, y));
    }

    fn split(&mut self) -> (&[T], &mut [T]) {
        let [a, b] = &mut self.buffers;
        if self.current == 0 {
            (a.as_slice(), b.as_mut_slice())
        } else {
            (b.as_slice(), a.as_mut_slice())
        }
    }
}

/// Evaluate a per-cell kernel over `dst`, row-major with the given width.
/// Cells are independent; each invocation writes only its own cell.
pub fn dispatch<T, F>(dst: &mut [T], width: usize, kernel: F)
where
    T: Send,
    F: Fn(usize, usize, &mut T) + Send + Sync,
{
    #[cfg(feature = "parallel")]
    dst.par_iter_mut()
        .enumerate()
        .for_each(|(idx, cell)| kernel(idx % width, idx / width, cell));

    #[cfg(not(feature = "parallel"))]
    dst.iter_mut()
        .enumerate()
        .for_each(|(idx, cell)| kernel(idx % width, idx / width, cell));
}

/// Neighbour index with periodic wrap-around.
#[inline]
pub fn wrap_index(x: usize, y: usize, dx: i32, dy: i32, width: usize, height: usize) -> usize {
    let nx = (x as i64 + dx as i64).rem_euclid(width as i64) as usize;
    let ny = (y as i64 + dy as i64).rem_euclid(height as i64) as usize;
    ny * width + nx
}

/// Normalized coordinates of a cell centre, in `[0, 1]²`.
#[inline]
pub fn cell_center(x: usize, y: usize, width: usize, height: usize) -> [f32; 2] {
    [
        (x as f32 + 0.5) / width as f32,
        (y as f32 + 0.5) / height as f32,
    ]
}

pub(crate) fn cell_count(width: usize, height: usize) -> EngineResult<usize> {
    if width == 0 || height == 0 {
        return Err(EngineError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(EngineError::InvalidDimensions { width, height })
}

fn alloc<T: Copy>(cells: usize, value: T, field: &'static str) -> EngineResult<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(cells)
        .map_err(|_| EngineError::Allocation { field, cells })?;
    v.resize(cells, value);
    Ok(v)
}
