use std::fmt::{self, Display};
use std::ops::{Index, IndexMut};

use rand::{Rng, distr::uniform::SampleRange};

/// A fixed-shape row-major matrix of `f32`.
///
/// The backing buffer is allocated zeroed at construction, always holds
/// exactly `rows * cols` elements, and is never resized. Every operation
/// works in place or into a pre-sized destination. Operand shapes are
/// checked; a mismatch is a construction bug and panics.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    buffer: Box<[f32]>,
}

impl Matrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "matrix dimensions must be positive");
        let buffer: Box<[f32]> = bytemuck::zeroed_slice_box(rows * cols);
        Self { rows, cols, buffer }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.buffer
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.buffer
    }

    /// Sets every element to `v`.
    pub fn fill(&mut self, v: f32) {
        self.buffer.fill(v);
    }

    /// Zeroes the whole buffer.
    pub fn zero(&mut self) {
        bytemuck::fill_zeroes(&mut self.buffer);
    }

    /// Draws every element independently and uniformly from `range`.
    pub fn randomize(&mut self, rng: &mut impl Rng, range: impl SampleRange<f32> + Clone) {
        for p in self.buffer.iter_mut() {
            *p = rng.random_range(range.clone());
        }
    }

    /// Elementwise in-place addition. Shapes must be identical.
    pub fn add(&mut self, other: &Matrix) {
        assert!(
            self.rows == other.rows && self.cols == other.cols,
            "shape mismatch in add: {}x{} += {}x{}",
            self.rows,
            self.cols,
            other.rows,
            other.cols,
        );
        for (p, q) in self.buffer.iter_mut().zip(other.buffer.iter()) {
            *p += q;
        }
    }

    /// `dest = a · b` by the standard triple loop.
    /// `dest` must be pre-sized to `a.rows × b.cols`.
    pub fn matmul(dest: &mut Matrix, a: &Matrix, b: &Matrix) {
        assert!(
            a.cols == b.rows && dest.rows == a.rows && dest.cols == b.cols,
            "shape mismatch in matmul: dest {}x{} = a {}x{} * b {}x{}",
            dest.rows,
            dest.cols,
            a.rows,
            a.cols,
            b.rows,
            b.cols,
        );
        for i in 0..a.rows {
            for j in 0..b.cols {
                let mut sum = 0.0f32;
                for k in 0..a.cols {
                    sum += a.buffer[i * a.cols + k] * b.buffer[k * b.cols + j];
                }
                dest.buffer[i * dest.cols + j] = sum;
            }
        }
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f32;

    fn index(&self, (i, j): (usize, usize)) -> &f32 {
        assert!(
            i < self.rows && j < self.cols,
            "index ({i}, {j}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols,
        );
        &self.buffer[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f32 {
        assert!(
            i < self.rows && j < self.cols,
            "index ({i}, {j}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols,
        );
        &mut self.buffer[i * self.cols + j]
    }
}

impl Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for i in 0..self.rows {
            write!(f, "[")?;
            for j in 0..self.cols {
                write!(f, " {:8.4}", self[(i, j)])?;
            }
            writeln!(f, " ]")?;
        }
        Ok(())
    }
}
