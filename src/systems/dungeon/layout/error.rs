use thiserror::Error;

/// Failures surfaced by a generation run. All of them are raised before the
/// offending step mutates anything.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DungeonError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("triangulation needs at least 3 distinct points, got {found}")]
    TooFewPoints { found: usize },
    #[error("union-find set handle no longer names a set")]
    StaleSet,
}
