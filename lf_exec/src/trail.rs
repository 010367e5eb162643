//! Bounded history of past vehicle positions, kept for display.

use std::collections::VecDeque;
use nalgebra::Vector2;
use serde::Serialize;

/// A trail of the most recent vehicle positions, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct Trail {
    points: VecDeque<Vector2<f64>>,

    #[serde(skip)]
    max_len: usize
}

impl Trail {
    /// Create an empty trail. Storage grows with the trail up to `max_len`.
    pub fn new(max_len: usize) -> Self {
        Self {
            points: VecDeque::new(),
            max_len
        }
    }

    /// Add a position, dropping the oldest one if the trail is full.
    pub fn push(&mut self, point: Vector2<f64>) {
        self.points.push_back(point);
        while self.points.len() > self.max_len {
            self.points.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<&Vector2<f64>> {
        self.points.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vector2<f64>> {
        self.points.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_trail_bounded() {
        let mut trail = Trail::new(100);

        for i in 0..250 {
            trail.push(Vector2::new(i as f64, 0.0));
        }

        assert_eq!(trail.len(), 100);
        assert_eq!(trail.iter().next(), Some(&Vector2::new(150.0, 0.0)));
        assert_eq!(trail.latest(), Some(&Vector2::new(249.0, 0.0)));

        trail.clear();
        assert!(trail.is_empty());
    }

    #[test]
    fn test_trail_large_limit() {
        let mut trail = Trail::new(usize::MAX);
        assert!(trail.is_empty());

        for i in 0..10 {
            trail.push(Vector2::new(0.0, i as f64));
        }

        assert_eq!(trail.len(), 10);
        assert_eq!(trail.latest(), Some(&Vector2::new(0.0, 9.0)));
    }
}
