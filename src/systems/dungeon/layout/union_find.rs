// disjoint sets over room centers, used by the spanning tree extraction
// lookups are a linear scan over the sets, there are no parent pointers

use bevy::prelude::*;

use super::error::DungeonError;

/// One disjoint set: the surviving root and every point merged into it.
#[derive(Clone, Debug, PartialEq)]
pub struct PointSet {
    pub root: Vec2,
    pub members: Vec<Vec2>,
}

impl PointSet {
    pub fn contains(&self, point: Vec2) -> bool {
        self.root == point || self.members.contains(&point)
    }

    pub fn len(&self) -> usize {
        self.members.len() + 1
    }
}

#[derive(Clone, Debug, Default)]
pub struct UnionFind {
    sets: Vec<PointSet>,
}

impl UnionFind {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a singleton set rooted at `point`.
    /// # Returns `false` (and changes nothing) if the point already belongs to a set
    pub fn make_set(&mut self, point: Vec2) -> bool {
        if self.find(point).is_some() {
            return false;
        }
        self.sets.push(PointSet {
            root: point,
            members: Vec::new(),
        });
        true
    }

    /// Root of the set containing `point`, `None` if it was never inserted
    pub fn find(&self, point: Vec2) -> Option<Vec2> {
        self.sets.iter().find(|s| s.contains(point)).map(|s| s.root)
    }

    /// Merges the set rooted at `absorbed` into the set rooted at `survivor`.
    /// Both arguments must be current roots, resolve them with `find` first.
    pub fn union(&mut self, survivor: Vec2, absorbed: Vec2) -> Result<(), DungeonError> {
        let keep = self.index_of_root(survivor).ok_or(DungeonError::StaleSet)?;
        let gone = self.index_of_root(absorbed).ok_or(DungeonError::StaleSet)?;
        if keep == gone {
            return Ok(());
        }

        let absorbed_set = self.sets.remove(gone);
        // removal shifts everything after it down by one
        let keep = if gone < keep { keep - 1 } else { keep };

        let target = &mut self.sets[keep];
        target.members.push(absorbed_set.root);
        target.members.extend(absorbed_set.members);
        Ok(())
    }

    pub fn sets(&self) -> &[PointSet] {
        &self.sets
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    fn index_of_root(&self, root: Vec2) -> Option<usize> {
        self.sets.iter().position(|s| s.root == root)
    }
}
