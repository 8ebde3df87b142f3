use num_traits::Zero;
use std::ops::{Add, AddAssign, Mul};

/// Dense matrix with element values stored in row-major order (C-style).
#[derive(Debug, Clone, PartialEq)]
pub struct Mat<T> {
    rows: usize,
    cols: usize,
    values: Vec<T>,
}

impl<T> Mat<T>
where
    T: Copy + Zero,
{
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            values: vec![T::zero(); rows * cols],
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    #[inline]
    fn ix(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        assert!(row < self.rows);
        assert!(col < self.cols);
        self.values[self.ix(row, col)]
    }

    /// Accumulates `v` into the element at (`row`, `col`).
    #[inline]
    pub fn add_to(&mut self, row: usize, col: usize, v: T)
    where
        T: AddAssign,
    {
        assert!(row < self.rows);
        assert!(col < self.cols);
        let i = self.ix(row, col);
        self.values[i] += v
    }

    pub fn row(&self, row: usize) -> &[T] {
        assert!(row < self.rows);
        let i = self.ix(row, 0);
        &self.values[i..i + self.cols]
    }

    pub fn mat_vec(&self, b: &[T]) -> Vec<T>
    where
        T: Mul<Output = T> + Add<Output = T>,
    {
        assert_eq!(b.len(), self.cols);

        (0..self.rows).map(|i| dot(self.row(i), b)).collect()
    }
}

/// Computes the dot-product of `a` and `b`.
pub fn dot<T>(a: &[T], b: &[T]) -> T
where
    T: Mul<Output = T> + Add<Output = T> + Zero + Copy,
{
    a.iter()
        .zip(b)
        .map(|(&ai, &bi)| ai * bi)
        .reduce(|x, y| x + y)
        .unwrap_or(T::zero())
}
