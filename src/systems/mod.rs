pub mod dungeon;
pub mod ui;
