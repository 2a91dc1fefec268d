//! Dense 3-D grids over (pixel-row, pixel-col, depth) slots. All four
//! optimisation grids share one shape, and slots are addressed either
//! by linear index or by coordinate.

use std::ops::{Index, IndexMut};

/// Shape of a screen-space grid: a square spatial resolution and a
/// temporal depth, both powers of two so neighbourhood lookups can
/// wrap toroidally with a mask.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GridShape {
    pub resolution: usize,
    pub depth: usize,
}

impl GridShape {
    pub fn new(resolution: usize, depth: usize) -> GridShape {
        assert!(resolution > 0);
        assert!(depth > 0);

        GridShape {
            resolution,
            depth,
        }
    }

    pub fn len(&self) -> usize {
        self.resolution * self.resolution * self.depth
    }

    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        assert!(x < self.resolution);
        assert!(y < self.resolution);
        assert!(z < self.depth);

        x + y * self.resolution + z * self.resolution * self.resolution
    }

    pub fn coordinate(&self, index: usize) -> (usize, usize, usize) {
        assert!(index < self.len());

        (index % self.resolution,
         (index / self.resolution) % self.resolution,
         index / (self.resolution * self.resolution))
    }

    /// Index of a neighbour offset from (x, y, z), wrapping around the
    /// grid edges. Requires power-of-two extents.
    pub fn wrapping_index(&self, x: isize, y: isize, z: isize) -> usize {
        let sm = self.resolution as isize - 1;
        let dm = self.depth as isize - 1;

        self.index((x & sm) as usize, (y & sm) as usize, (z & dm) as usize)
    }
}

/// A dense grid of per-slot values with shape (resolution, resolution,
/// depth).
#[derive(Debug, Clone, PartialEq)]
pub struct Grid3<T> {
    shape: GridShape,
    data: Vec<T>,
}

impl<T: Copy + Default> Grid3<T> {
    pub fn new(shape: GridShape) -> Grid3<T> {
        Grid3 {
            shape,
            data: vec![T::default(); shape.len()],
        }
    }
}

impl<T> Grid3<T> {
    /// Wrap an existing slot vector. The data length must match the
    /// shape.
    pub fn from_vec(shape: GridShape, data: Vec<T>) -> Grid3<T> {
        assert_eq!(data.len(), shape.len());

        Grid3 {
            shape,
            data,
        }
    }
}

impl<T> Grid3<T> {
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> &T {
        &self.data[self.shape.index(x, y, z)]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T> Index<usize> for Grid3<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.data[index]
    }
}

impl<T> IndexMut<usize> for Grid3<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.data[index]
    }
}
