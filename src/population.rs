//! Bounded collection of distinct lattice points

use crate::core::types::LatticePoint;
use std::collections::HashSet;

/// Points kept by the sieve between rounds
///
/// Membership is tracked by an explicit index of image vectors built when a
/// point is inserted. Points are immutable, so the index never goes stale.
#[derive(Debug, Clone, Default)]
pub struct Population {
    points: Vec<LatticePoint>,
    index: HashSet<Vec<i64>>,
}

impl Population {
    /// Empty population
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty population with room for `capacity` points
    pub fn with_capacity(capacity: usize) -> Self {
        Population {
            points: Vec::with_capacity(capacity),
            index: HashSet::with_capacity(capacity),
        }
    }

    /// Collect points, dropping zero vectors and repeated images
    pub fn from_points<I: IntoIterator<Item = LatticePoint>>(points: I) -> Self {
        let mut population = Population::new();
        for point in points {
            population.insert(point);
        }
        population
    }

    /// Insert a point; returns `false` if it is zero or its image is present
    pub fn insert(&mut self, point: LatticePoint) -> bool {
        if point.is_zero() || self.index.contains(point.image()) {
            return false;
        }
        self.index.insert(point.image().to_vec());
        self.points.push(point);
        true
    }

    /// Whether a point with the same image is present
    pub fn contains(&self, point: &LatticePoint) -> bool {
        self.index.contains(point.image())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Stable sort, ascending by norm
    pub fn sort_by_norm(&mut self) {
        self.points.sort_by_key(|p| p.norm_squared());
    }

    pub fn is_sorted_by_norm(&self) -> bool {
        self.points.windows(2).all(|w| w[0].norm_squared() <= w[1].norm_squared())
    }

    /// Keep only the first `len` points
    pub fn truncate(&mut self, len: usize) {
        if len >= self.points.len() {
            return;
        }
        for dropped in self.points.drain(len..) {
            self.index.remove(dropped.image());
        }
    }

    /// Shortest point, assuming the population is sorted
    pub fn first(&self) -> Option<&LatticePoint> {
        self.points.first()
    }

    /// Shortest point regardless of order
    pub fn shortest(&self) -> Option<&LatticePoint> {
        self.points.iter().min_by_key(|p| p.norm_squared())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LatticePoint> {
        self.points.iter()
    }

    pub fn as_slice(&self) -> &[LatticePoint] {
        &self.points
    }

    /// Norms in population order
    pub fn norms(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.norm()).collect()
    }

    pub fn into_vec(self) -> Vec<LatticePoint> {
        self.points
    }
}

impl<'a> IntoIterator for &'a Population {
    type Item = &'a LatticePoint;
    type IntoIter = std::slice::Iter<'a, LatticePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
