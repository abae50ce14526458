use std::collections::{VecDeque, vec_deque};

use serde::{Deserialize, Serialize};

use crate::model::Point;

/// Smallest finite trail length accepted; smaller requests are raised to this.
pub const MIN_TRAIL_LENGTH: usize = 10;
/// Hard bound applied to an `Unbounded` trail.
pub const UNBOUNDED_TRAIL_CAP: usize = 1_000_000;
/// Length used by a fresh engine and by the "limited trail" toggle.
pub const DEFAULT_TRAIL_LENGTH: usize = 1000;

/// Retention policy for the tip trail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrailLimit {
    Capped(usize),
    Unbounded,
}

impl Default for TrailLimit {
    fn default() -> Self {
        Self::Capped(DEFAULT_TRAIL_LENGTH)
    }
}

impl From<Option<usize>> for TrailLimit {
    fn from(value: Option<usize>) -> Self {
        match value {
            Some(n) => Self::Capped(n),
            None => Self::Unbounded,
        }
    }
}

impl TrailLimit {
    /// Applies the minimum length to a finite cap.
    pub fn clamped(self) -> Self {
        match self {
            Self::Capped(n) => Self::Capped(n.max(MIN_TRAIL_LENGTH)),
            Self::Unbounded => Self::Unbounded,
        }
    }

    /// Number of points actually retained.
    pub fn capacity(&self) -> usize {
        match self {
            Self::Capped(n) => (*n).max(MIN_TRAIL_LENGTH),
            Self::Unbounded => UNBOUNDED_TRAIL_CAP,
        }
    }
}

/// Insertion-ordered tip positions, oldest first.
///
/// A new limit is enforced lazily: the next `push` drops as many of the oldest points as
/// needed to get back under the cap.
#[derive(Clone, Debug, Default)]
pub struct Trail {
    points: VecDeque<Point>,
    limit: TrailLimit,
}

impl Trail {
    pub fn new(limit: TrailLimit) -> Self {
        Self {
            points: VecDeque::new(),
            limit: limit.clamped(),
        }
    }

    pub fn push(&mut self, point: Point) {
        self.points.push_back(point);
        let capacity = self.limit.capacity();
        if self.points.len() > capacity {
            let excess = self.points.len() - capacity;
            self.points.drain(..excess);
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn limit(&self) -> TrailLimit {
        self.limit
    }

    pub fn set_limit(&mut self, limit: TrailLimit) {
        let clamped = limit.clamped();
        if clamped != limit {
            tracing::trace!(?limit, ?clamped, "trail limit raised to minimum");
        }
        self.limit = clamped;
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, Point> {
        self.points.iter()
    }

    pub fn first(&self) -> Option<&Point> {
        self.points.front()
    }

    pub fn last(&self) -> Option<&Point> {
        self.points.back()
    }
}

impl<'a> IntoIterator for &'a Trail {
    type Item = &'a Point;
    type IntoIter = vec_deque::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(i: usize) -> Point {
        Point::new(i as f64, -(i as f64))
    }

    #[test]
    fn test_small_cap_is_clamped() {
        let mut trail = Trail::default();
        trail.set_limit(TrailLimit::Capped(3));
        assert_eq!(trail.limit(), TrailLimit::Capped(MIN_TRAIL_LENGTH));
        for i in 0..25 {
            trail.push(point(i));
        }
        assert_eq!(trail.len(), MIN_TRAIL_LENGTH);
        assert_eq!(trail.first(), Some(&point(15)));
        assert_eq!(trail.last(), Some(&point(24)));
    }

    #[test]
    fn test_lower_cap_applies_on_next_push() {
        let mut trail = Trail::new(TrailLimit::Unbounded);
        for i in 0..40 {
            trail.push(point(i));
        }
        trail.set_limit(TrailLimit::Capped(12));
        assert_eq!(trail.len(), 40);
        trail.push(point(40));
        assert_eq!(trail.len(), 12);
        assert_eq!(trail.first(), Some(&point(29)));
    }

    #[test]
    fn test_none_means_unbounded() {
        assert_eq!(TrailLimit::from(None::<usize>), TrailLimit::Unbounded);
        assert_eq!(TrailLimit::from(Some(50usize)), TrailLimit::Capped(50));
        assert_eq!(TrailLimit::Unbounded.capacity(), UNBOUNDED_TRAIL_CAP);
    }

    #[test]
    fn test_iterates_oldest_first() {
        let mut trail = Trail::default();
        for i in 0..5 {
            trail.push(point(i));
        }
        let xs: Vec<f64> = trail.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }
}
