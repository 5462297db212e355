// room cloud: creation, separation and main room selection

use bevy::prelude::*;
use rand::Rng;
use rand_distr::{Distribution, UnitDisc};

use super::params::DungeonParams;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Room {
    pub id: u32,
    pub position: Vec2,  // moves while separating
    pub center: IVec2,   // floor of position, valid once separation is done
    pub width: i32,
    pub height: i32,
}

impl Room {
    pub fn new(id: u32, position: Vec2, width: i32, height: i32) -> Self {
        Self {
            id,
            position,
            center: IVec2::ZERO,
            width,
            height,
        }
    }

    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Integer half-size, `dim / 2` rounded down
    pub fn half_extents(&self) -> IVec2 {
        IVec2::new(self.width / 2, self.height / 2)
    }

    /// Axis-aligned overlap test on positions, rooms closer than `margin`
    /// (or touching) count as overlapping.
    pub fn overlaps(&self, other: &Room, margin: i32) -> bool {
        let distance = (other.position - self.position).abs();
        let reach = (self.half_extents() + other.half_extents() + IVec2::splat(margin)).as_vec2();
        distance.x <= reach.x && distance.y <= reach.y
    }

    pub fn finalize_center(&mut self) {
        self.center = self.position.floor().as_ivec2();
    }

    /// Inclusive tile rectangle `(min, max)` around the center.
    pub fn bounds(&self) -> (IVec2, IVec2) {
        let half = self.half_extents();
        (self.center.saturating_sub(half), self.center.saturating_add(half))
    }

    pub fn contains_tile(&self, tile: IVec2) -> bool {
        let (min, max) = self.bounds();
        tile.cmpge(min).all() && tile.cmple(max).all()
    }
}

/// How the relaxation ended.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeparationOutcome {
    pub passes: usize,
    pub converged: bool,
}

/// Spawns `params.cell_count` rooms inside a disc of radius `params.spawn_radius`.
/// Roughly `main_room_count / cell_count` of them come out doubled, about
/// half of the rest shrink by 2.
pub fn create_rooms(params: &DungeonParams, rng: &mut impl Rng) -> Vec<Room> {
    let mut rooms: Vec<Room> = Vec::with_capacity(params.cell_count);
    let big_threshold = 1.0 - params.main_room_count as f32 / params.cell_count as f32;
    let palette = &params.room_size_palette;

    for i in 0..params.cell_count {
        // exact coincidence only, anything else separation can resolve
        let position = loop {
            let [x, y]: [f32; 2] = UnitDisc.sample(rng);
            let candidate = Vec2::new(x, y) * params.spawn_radius;
            if !rooms.iter().any(|r| r.position == candidate) {
                break candidate;
            }
        };

        let mut width = palette[rng.random_range(0..palette.len())];
        let mut height = palette[rng.random_range(0..palette.len())];

        // skew sizes a bit
        let roll: f32 = rng.random();
        if roll >= big_threshold {
            width *= 2;
            height *= 2;
        } else if roll >= 0.5 {
            width -= 2;
            height -= 2;
        }

        rooms.push(Room::new(i as u32 + 1, position, width, height));
    }

    rooms
}

pub fn any_overlapping(rooms: &[Room], margin: i32) -> bool {
    rooms.iter().enumerate().any(|(i, a)| {
        rooms[i + 1..].iter().any(|b| a.overlaps(b, margin))
    })
}

/// One relaxation pass. Every room moves away from the mean position of the
/// rooms it overlaps; rooms are moved in place, in order.
/// # Returns the number of rooms that moved
pub fn separation_pass(rooms: &mut [Room], margin: i32) -> usize {
    let mut moved = 0;
    for i in 0..rooms.len() {
        let room = rooms[i];
        let mut push = Vec2::ZERO;
        let mut neighbors = 0;

        for (j, other) in rooms.iter().enumerate() {
            if j != i && room.overlaps(other, margin) {
                push += other.position - room.position;
                neighbors += 1;
            }
        }

        if neighbors == 0 {
            continue;
        }

        // mean offset, not normalized
        push /= neighbors as f32;
        if push != Vec2::ZERO {
            rooms[i].position -= push;
            moved += 1;
        }
    }
    moved
}

/// Runs separation passes until nothing overlaps or `max_passes` is reached.
/// Hitting the cap is not an error, the rooms keep whatever overlap remains.
pub fn separate_rooms(rooms: &mut [Room], margin: i32, max_passes: usize) -> SeparationOutcome {
    if !any_overlapping(rooms, margin) {
        return SeparationOutcome {
            passes: 0,
            converged: true,
        };
    }

    for pass in 1..=max_passes {
        separation_pass(rooms, margin);
        if !any_overlapping(rooms, margin) {
            return SeparationOutcome {
                passes: pass,
                converged: true,
            };
        }
    }

    SeparationOutcome {
        passes: max_passes,
        converged: false,
    }
}

/// Sorts `rooms` by area, largest first, and returns copies of the first `count`.
pub fn select_main_rooms(rooms: &mut [Room], count: usize) -> Vec<Room> {
    rooms.sort_by_key(|r| std::cmp::Reverse(r.area())); // stable
    rooms.iter().take(count).copied().collect()
}

/// Start is the room with the greatest center Y, end the one with the least.
/// Ties keep the earlier pick, which starts as rooms 0 and 1.
/// # Returns `None` for fewer than 2 rooms
pub fn find_start_and_end(rooms: &[Room]) -> Option<(Room, Room)> {
    let mut start = *rooms.first()?;
    let mut end = *rooms.get(1)?;

    for room in rooms {
        if room.center.y > start.center.y {
            start = *room;
        }
        if room.center.y < end.center.y {
            end = *room;
        }
    }

    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn room(id: u32, x: f32, y: f32, w: i32, h: i32) -> Room {
        Room::new(id, Vec2::new(x, y), w, h)
    }

    fn placed(id: u32, cx: i32, cy: i32, w: i32, h: i32) -> Room {
        let mut r = room(id, cx as f32, cy as f32, w, h);
        r.finalize_center();
        r
    }

    #[test]
    fn overlap_uses_integer_half_extents_and_margin() {
        let a = room(1, 0.0, 0.0, 9, 9); // half 4
        let b = room(2, 9.5, 0.0, 9, 9);
        assert!(!a.overlaps(&b, 0));
        assert!(a.overlaps(&b, 2));

        // touching counts
        let c = room(3, 8.0, 0.0, 9, 9);
        assert!(a.overlaps(&c, 0));

        // needs both axes
        let d = room(4, 0.0, 20.0, 9, 9);
        assert!(!a.overlaps(&d, 1));
    }

    #[test]
    fn center_is_floored() {
        let mut r = room(1, -2.5, 3.7, 9, 9);
        r.finalize_center();
        assert_eq!(r.center, IVec2::new(-3, 3));
    }

    #[test]
    fn bounds_cover_half_extents() {
        let r = placed(1, 2, -1, 5, 3);
        assert_eq!(r.bounds(), (IVec2::new(0, -2), IVec2::new(4, 0)));
        assert!(r.contains_tile(IVec2::new(4, 0)));
        assert!(!r.contains_tile(IVec2::new(5, 0)));
    }

    #[test]
    fn extreme_rooms_do_not_overflow() {
        let mut far = room(1, 1.0e12, -1.0e12, 99_999, 99_999);
        far.finalize_center();
        let (min, max) = far.bounds();
        assert_eq!(max.x, i32::MAX);
        assert_eq!(min.y, i32::MIN);
        assert_eq!(far.area(), 99_999_i64 * 99_999);
    }

    #[test]
    fn created_rooms_respect_palette_and_disc() {
        let params = DungeonParams {
            cell_count: 200,
            main_room_count: 20,
            spawn_radius: 12.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let rooms = create_rooms(&params, &mut rng);
        assert_eq!(rooms.len(), 200);

        let mut allowed = Vec::new();
        for &size in &params.room_size_palette {
            allowed.extend([size, size * 2, size - 2]);
        }
        for (i, r) in rooms.iter().enumerate() {
            assert_eq!(r.id, i as u32 + 1);
            assert!(r.position.length() <= params.spawn_radius + 1e-4);
            assert!(allowed.contains(&r.width) && allowed.contains(&r.height));
            assert!(r.width > 0 && r.height > 0);
        }

        // both size modifiers show up over 200 draws
        assert!(rooms.iter().any(|r| r.width > 17));
        assert!(rooms.iter().any(|r| r.width % 2 == 1 && !params.room_size_palette.contains(&r.width)));
    }

    #[test]
    fn separation_pushes_pair_apart() {
        let mut rooms = vec![room(1, 0.0, 0.0, 9, 9), room(2, 1.0, 0.5, 9, 9)];
        let outcome = separate_rooms(&mut rooms, 1, 50);
        assert!(outcome.converged);
        assert!(outcome.passes > 0);
        assert!(!rooms[0].overlaps(&rooms[1], 1));
        // moved in opposite directions along their starting offset
        assert!(rooms[0].position.x < 0.0);
        assert!(rooms[1].position.x > 1.0);
    }

    #[test]
    fn separation_of_clear_rooms_is_a_no_op() {
        let mut rooms = vec![room(1, 0.0, 0.0, 5, 5), room(2, 50.0, 0.0, 5, 5)];
        let before = rooms.clone();
        let outcome = separate_rooms(&mut rooms, 1, 10);
        assert_eq!(outcome, SeparationOutcome { passes: 0, converged: true });
        assert_eq!(rooms, before);
    }

    #[test]
    fn separation_cap_is_reported() {
        // identical positions never get a push, so this can not converge
        let mut rooms = vec![room(1, 0.0, 0.0, 5, 5), room(2, 0.0, 0.0, 5, 5)];
        let outcome = separate_rooms(&mut rooms, 0, 4);
        assert_eq!(outcome, SeparationOutcome { passes: 4, converged: false });
    }

    #[test]
    fn converged_cloud_has_no_overlap() {
        let params = DungeonParams {
            cell_count: 40,
            main_room_count: 8,
            ..Default::default()
        };
        for seed in 0..5 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut rooms = create_rooms(&params, &mut rng);
            let outcome = separate_rooms(&mut rooms, params.overlap_margin, params.max_separation_passes());
            if outcome.converged {
                for i in 0..rooms.len() {
                    for j in (i + 1)..rooms.len() {
                        assert!(!rooms[i].overlaps(&rooms[j], params.overlap_margin));
                    }
                }
            }
        }
    }

    #[test]
    fn main_rooms_are_largest() {
        let mut rooms = vec![
            room(1, 0.0, 0.0, 5, 5),
            room(2, 0.0, 0.0, 17, 17),
            room(3, 0.0, 0.0, 9, 11),
            room(4, 0.0, 0.0, 11, 9),
        ];
        let main = select_main_rooms(&mut rooms, 3);
        let ids: Vec<u32> = main.iter().map(|r| r.id).collect();
        // equal areas keep their order
        assert_eq!(ids, vec![2, 3, 4]);
        assert_eq!(rooms[3].id, 1);
    }

    #[test]
    fn start_and_end_are_vertical_extremes() {
        let rooms = vec![
            placed(1, 0, 0, 5, 5),
            placed(2, 10, 30, 5, 5),
            placed(3, -4, -12, 5, 5),
            placed(4, 40, 5, 5, 5),
        ];
        let (start, end) = find_start_and_end(&rooms).unwrap();
        assert_eq!(start.id, 2);
        assert_eq!(end.id, 3);
    }

    #[test]
    fn start_and_end_ties_keep_first_two() {
        let rooms = vec![placed(1, 0, 0, 5, 5), placed(2, 10, 0, 5, 5), placed(3, 20, 0, 5, 5)];
        let (start, end) = find_start_and_end(&rooms).unwrap();
        assert_eq!((start.id, end.id), (1, 2));
        assert!(find_start_and_end(&rooms[..1]).is_none());
    }
}
