// turns rooms and corridor edges into floor and wall tiles

use std::collections::HashSet;

use bevy::prelude::*;

use super::rooms::Room;
use super::utils::Edge;

/// Two disjoint tile layers on the integer grid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TileLayers {
    pub floor: HashSet<IVec2>,
    pub walls: HashSet<IVec2>,
}

impl TileLayers {
    pub fn is_floor(&self, tile: IVec2) -> bool {
        self.floor.contains(&tile)
    }

    pub fn is_wall(&self, tile: IVec2) -> bool {
        self.walls.contains(&tile)
    }

    /// Inclusive bounding box over both layers
    pub fn bounds(&self) -> Option<(IVec2, IVec2)> {
        let mut tiles = self.floor.iter().chain(self.walls.iter());
        let first = *tiles.next()?;
        Some(tiles.fold((first, first), |(min, max), &t| (min.min(t), max.max(t))))
    }

    pub fn clear(&mut self) {
        self.floor.clear();
        self.walls.clear();
    }
}

/// Paints every room and every edge, then rings the floor with walls.
pub fn rasterize(rooms: &[Room], edges: &[Edge], thickness: i32) -> TileLayers {
    let mut floor = HashSet::new();
    for room in rooms {
        paint_room(&mut floor, room);
    }
    for edge in edges {
        paint_edge(&mut floor, edge, thickness);
    }

    let walls = infer_walls(&floor);
    debug!("rasterized {} floor tiles, {} wall tiles", floor.len(), walls.len());
    TileLayers { floor, walls }
}

/// Fills `center ± half_extents`, inclusive. Odd sizes come out exactly
/// `width x height`, doubled (even) sizes one tile wider and taller.
pub fn paint_room(floor: &mut HashSet<IVec2>, room: &Room) {
    let (min, max) = room.bounds();
    for x in min.x..=max.x {
        for y in min.y..=max.y {
            floor.insert(IVec2::new(x, y));
        }
    }
}

/// Stamps a `(2t+1)` square around every tile of the line between the
/// truncated edge endpoints.
pub fn paint_edge(floor: &mut HashSet<IVec2>, edge: &Edge, thickness: i32) {
    for tile in line_tiles(edge.start.as_ivec2(), edge.end.as_ivec2()) {
        for u in -thickness..=thickness {
            for v in -thickness..=thickness {
                floor.insert(tile + IVec2::new(u, v));
            }
        }
    }
}

/// Integer line from `a` to `b`, endpoints included. Steps along whichever
/// axis is longer; diagonals step along y.
pub fn line_tiles(a: IVec2, b: IVec2) -> Vec<IVec2> {
    let delta = (b - a).abs();
    if delta.x > delta.y {
        let (from, to) = if a.x > b.x { (b, a) } else { (a, b) };
        walk(from, to, |p| p, |major, minor| IVec2::new(major, minor))
    } else {
        let (from, to) = if a.y > b.y { (b, a) } else { (a, b) };
        walk(from, to, |p| IVec2::new(p.y, p.x), |major, minor| IVec2::new(minor, major))
    }
}

// bresenham along the major axis, `swizzle` maps to (major, minor)
fn walk(
    from: IVec2,
    to: IVec2,
    swizzle: impl Fn(IVec2) -> IVec2,
    unswizzle: impl Fn(i32, i32) -> IVec2,
) -> Vec<IVec2> {
    let (from, to) = (swizzle(from), swizzle(to));
    let d_major = to.x - from.x;
    let dir = if to.y < from.y { -1 } else { 1 };
    let d_minor = (to.y - from.y) * dir;

    let mut tiles = Vec::with_capacity(d_major as usize + 1);
    let mut minor = from.y;
    let mut decision = 2 * d_minor - d_major;
    for step in 0..=d_major {
        tiles.push(unswizzle(from.x + step, minor));
        if decision >= 0 {
            minor += dir;
            decision -= 2 * d_major;
        }
        decision += 2 * d_minor;
    }
    tiles
}

/// Every non-floor tile in the 8-neighbourhood of a floor tile.
pub fn infer_walls(floor: &HashSet<IVec2>) -> HashSet<IVec2> {
    let mut walls = HashSet::new();
    for &tile in floor {
        for dx in -1..=1 {
            for dy in -1..=1 {
                let neighbor = tile + IVec2::new(dx, dy);
                if !floor.contains(&neighbor) {
                    walls.insert(neighbor);
                }
            }
        }
    }
    walls
}
