use crate::config::*;

use super::error::DungeonError;

/// Everything a generation run needs besides its random source.
#[derive(Clone, Debug, PartialEq)]
pub struct DungeonParams {
    pub cell_count: usize,
    pub main_room_count: usize,
    pub spawn_radius: f32,
    pub overlap_margin: i32,
    pub extra_edge_percentage: f32,
    pub edge_thickness: i32,
    pub room_size_palette: Vec<i32>,
    // None draws a seed from the OS
    pub seed: Option<u64>,
}

impl Default for DungeonParams {
    fn default() -> Self {
        Self {
            cell_count: CELL_COUNT,
            main_room_count: MAIN_ROOM_COUNT,
            spawn_radius: SPAWN_RADIUS,
            overlap_margin: OVERLAP_MARGIN,
            extra_edge_percentage: EXTRA_EDGE_PERCENTAGE,
            edge_thickness: EDGE_THICKNESS,
            room_size_palette: ROOM_SIZE_PALETTE.to_vec(),
            seed: Some(INITIAL_SEED),
        }
    }
}

impl DungeonParams {
    /// Checks every precondition of a generation run.
    pub fn validate(&self) -> Result<(), DungeonError> {
        if self.main_room_count < 2 {
            return Err(invalid(format!(
                "main_room_count must be at least 2, got {}",
                self.main_room_count
            )));
        }
        if self.main_room_count >= self.cell_count {
            return Err(invalid(format!(
                "main_room_count ({}) must be below cell_count ({})",
                self.main_room_count, self.cell_count
            )));
        }
        if !(self.spawn_radius.is_finite() && self.spawn_radius > 0.0) {
            return Err(invalid(format!(
                "spawn_radius must be a positive number, got {}",
                self.spawn_radius
            )));
        }
        // tile coordinates are i32
        if self.spawn_radius > MAX_SPAWN_RADIUS {
            return Err(invalid(format!(
                "spawn_radius must be at most {MAX_SPAWN_RADIUS}, got {}",
                self.spawn_radius
            )));
        }
        if !(0..=MAX_OVERLAP_MARGIN).contains(&self.overlap_margin) {
            return Err(invalid(format!(
                "overlap_margin must be within [0, {MAX_OVERLAP_MARGIN}], got {}",
                self.overlap_margin
            )));
        }
        if !(0.0..=1.0).contains(&self.extra_edge_percentage) {
            return Err(invalid(format!(
                "extra_edge_percentage must be within [0, 1], got {}",
                self.extra_edge_percentage
            )));
        }
        if !(0..=MAX_EDGE_THICKNESS).contains(&self.edge_thickness) {
            return Err(invalid(format!(
                "edge_thickness must be within [0, {MAX_EDGE_THICKNESS}], got {}",
                self.edge_thickness
            )));
        }
        if self.room_size_palette.is_empty() {
            return Err(invalid("room_size_palette is empty".to_string()));
        }
        // shrinking takes 2 off, so 3 is the smallest size that stays positive
        if let Some(bad) = self
            .room_size_palette
            .iter()
            .find(|&&size| !(3..=MAX_ROOM_SIZE).contains(&size) || size % 2 == 0)
        {
            return Err(invalid(format!(
                "room sizes must be odd and within [3, {MAX_ROOM_SIZE}], got {bad}"
            )));
        }
        Ok(())
    }

    pub fn max_separation_passes(&self) -> usize {
        SEPARATION_PASSES_PER_ROOM * self.cell_count
    }
}

fn invalid(message: String) -> DungeonError {
    DungeonError::InvalidConfig(message)
}
