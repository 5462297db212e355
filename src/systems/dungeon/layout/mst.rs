// Kruskal's algorithm over the triangulation edges

use bevy::prelude::*;

use super::error::DungeonError;
use super::union_find::UnionFind;
use super::utils::Edge;

/// Minimum spanning forest of `edges`. For a connected input the result has
/// one edge fewer than there are distinct endpoints, and never a cycle.
/// Equal weights keep their input order.
/// # Errors `StaleSet` if a resolved root no longer names a set
pub fn minimum_spanning_tree(edges: &[Edge]) -> Result<Vec<Edge>, DungeonError> {
    let mut union_find = UnionFind::new();
    for edge in edges {
        union_find.make_set(edge.start);
        union_find.make_set(edge.end);
    }

    let mut sorted = edges.to_vec();
    sorted.sort_by(|a, b| a.weight.total_cmp(&b.weight));

    let mut result = Vec::new();
    for edge in sorted {
        // resolve roots every iteration, earlier unions invalidate older ones
        let (Some(r1), Some(r2)) = (union_find.find(edge.start), union_find.find(edge.end)) else {
            continue;
        };
        if r1 == r2 {
            continue;
        }
        union_find.union(r1, r2)?;
        result.push(edge);
    }

    debug!(
        "spanning tree keeps {} of {} edges over {} components",
        result.len(),
        edges.len(),
        union_find.len()
    );
    Ok(result)
}

/// Number of distinct points touched by `edges`.
pub fn vertex_count(edges: &[Edge]) -> usize {
    let mut seen: Vec<Vec2> = Vec::new();
    for edge in edges {
        for p in [edge.start, edge.end] {
            if !seen.contains(&p) {
                seen.push(p);
            }
        }
    }
    seen.len()
}
