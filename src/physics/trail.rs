use std::collections::VecDeque;

use crate::math::Vec2;

/// Bounded history of positions, oldest first
#[derive(Debug, Clone)]
pub struct Trail {
    points: VecDeque<Vec2>,
    max_length: usize,
}

impl Trail {
    pub fn new(max_length: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(max_length),
            max_length,
        }
    }

    /// Record a position, dropping the oldest once full
    pub fn push_back(&mut self, pos: Vec2) {
        if self.max_length == 0 {
            return;
        }
        if self.points.len() == self.max_length {
            self.points.pop_front();
        }
        self.points.push_back(pos);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Oldest to newest
    pub fn points(&self) -> impl ExactSizeIterator<Item = &Vec2> + DoubleEndedIterator {
        self.points.iter()
    }
}
