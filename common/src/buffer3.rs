//! Dense 3-D buffer indexed as `(x, y, z)`.
//!
//! Storage is x-fastest, then y, then z, so one z-plane is a contiguous
//! `width * height` slice.

use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::slice;

#[derive(Debug, Clone, PartialEq)]
pub struct Buffer3<T> {
    values: Vec<T>,
    width: usize,
    height: usize,
    depth: usize,
}

impl<T> Buffer3<T> {
    pub fn new(width: usize, height: usize, depth: usize, values: Vec<T>) -> Self {
        assert_eq!(
            values.len(),
            width * height * depth,
            "values length must equal width * height * depth"
        );
        Self {
            values,
            width,
            height,
            depth,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> &T {
        debug_assert!(self.contains(x, y, z));
        &self.values[self.index(x, y, z)]
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize, z: usize) -> &mut T {
        debug_assert!(self.contains(x, y, z));
        let idx = self.index(x, y, z);
        &mut self.values[idx]
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.height + y) * self.width + x
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize, z: usize) -> bool {
        x < self.width && y < self.height && z < self.depth
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of elements in one z-plane.
    #[inline]
    pub fn plane_len(&self) -> usize {
        self.width * self.height
    }

    /// The contiguous `width * height` slice for channel `z`.
    #[inline]
    pub fn plane(&self, z: usize) -> &[T] {
        let len = self.plane_len();
        &self.values[z * len..(z + 1) * len]
    }

    #[inline]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.values
    }
}

impl<T: Clone> Buffer3<T> {
    pub fn new_filled(width: usize, height: usize, depth: usize, value: T) -> Self {
        Self {
            values: vec![value; width * height * depth],
            width,
            height,
            depth,
        }
    }
}

impl<T> Index<(usize, usize, usize)> for Buffer3<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y, z): (usize, usize, usize)) -> &Self::Output {
        &self.values[(z * self.height + y) * self.width + x]
    }
}

impl<T> IndexMut<(usize, usize, usize)> for Buffer3<T> {
    #[inline]
    fn index_mut(&mut self, (x, y, z): (usize, usize, usize)) -> &mut Self::Output {
        &mut self.values[(z * self.height + y) * self.width + x]
    }
}

impl<T> Deref for Buffer3<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.values
    }
}

impl<T> DerefMut for Buffer3<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.values
    }
}

impl<'a, T> IntoIterator for &'a Buffer3<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stores_dimensions() {
        let buf = Buffer3::new(3, 2, 2, (0..12).collect());
        assert_eq!(buf.width(), 3);
        assert_eq!(buf.height(), 2);
        assert_eq!(buf.depth(), 2);
        assert_eq!(buf.len(), 12);
        assert_eq!(buf.plane_len(), 6);
    }

    #[test]
    #[should_panic(expected = "values length must equal width * height * depth")]
    fn test_new_panics_on_size_mismatch() {
        Buffer3::new(3, 2, 2, vec![1, 2, 3]);
    }

    #[test]
    fn test_index_is_x_fastest() {
        let buf = Buffer3::new(3, 2, 2, (0..12).collect::<Vec<i32>>());
        assert_eq!(buf[(0, 0, 0)], 0);
        assert_eq!(buf[(2, 0, 0)], 2);
        assert_eq!(buf[(0, 1, 0)], 3); // 1 * 3
        assert_eq!(buf[(0, 0, 1)], 6); // 1 * 6
        assert_eq!(buf[(2, 1, 1)], 11);
        assert_eq!(*buf.get(1, 1, 1), 10);
    }

    #[test]
    fn test_plane_slice() {
        let buf = Buffer3::new(2, 2, 3, (0..12).collect::<Vec<i32>>());
        assert_eq!(buf.plane(1), &[4, 5, 6, 7]);
        assert_eq!(buf.plane(2), &[8, 9, 10, 11]);
    }

    #[test]
    fn test_get_mut_and_contains() {
        let mut buf = Buffer3::new_filled(2, 2, 2, 0u8);
        *buf.get_mut(1, 0, 1) = 9;
        assert_eq!(buf[(1, 0, 1)], 9);
        assert!(buf.contains(1, 1, 1));
        assert!(!buf.contains(2, 0, 0));
        assert!(!buf.contains(0, 0, 2));
    }
}
