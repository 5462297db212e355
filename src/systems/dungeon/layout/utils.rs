// UTILS

use bevy::math::DVec2;
use bevy::prelude::*;

/// Undirected graph edge between two room centers.
/// Equality ignores direction, `a -> b` equals `b -> a`.
#[derive(Clone, Copy, Debug)]
pub struct Edge {
    pub start: Vec2,
    pub end: Vec2,
    pub weight: f32,
}

impl Edge {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self {
            start,
            end,
            weight: start.distance(end),
        }
    }

    pub fn connects(&self, a: Vec2, b: Vec2) -> bool {
        (self.start == a && self.end == b) || (self.start == b && self.end == a)
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.connects(other.start, other.end)
    }
}

/// z component of the cross product of `ab` and `ac`
/// # Returns a positive value when `a, b, c` turn counter-clockwise
pub fn orientation(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    (b - a).perp_dot(c - a)
}

/// Removes exact duplicates, keeping the first occurrence.
pub fn dedup_points(points: &[Vec2]) -> Vec<Vec2> {
    let mut unique: Vec<Vec2> = Vec::with_capacity(points.len());
    for &p in points {
        if !unique.contains(&p) {
            unique.push(p);
        }
    }
    unique
}

/// Sum of edge weights
pub fn total_weight(edges: &[Edge]) -> f32 {
    edges.iter().map(|e| e.weight).sum()
}
