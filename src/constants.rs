/// Maximum number of diagnostic samples kept per obstruction category.
pub const OBSTRUCTION_SAMPLE_CAP: usize = 5;

/// Prefix for generated workspace names.
pub const DEFAULT_WORKSPACE_PREFIX: &str = "room";
