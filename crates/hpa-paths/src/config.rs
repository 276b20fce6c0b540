use crate::error::PathError;

/// Tuning for cluster preprocessing and search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HpaConfig {
    /// Clusters per axis. The grid is cut into `resolution × resolution`
    /// square clusters.
    pub resolution: i32,
    /// Openings up to this width get one entrance at their midpoint; wider
    /// openings get one entrance at each end.
    pub entrance_min_width: i32,
    /// Cap on open-set pops for a single A* run. `None` is unbounded.
    pub max_expansions: Option<usize>,
}

impl Default for HpaConfig {
    fn default() -> Self {
        Self {
            resolution: 3,
            entrance_min_width: 3,
            max_expansions: None,
        }
    }
}

impl HpaConfig {
    /// Side length of one cluster on a `width × height` grid.
    ///
    /// Integer division: leftover rows and columns are not clustered.
    pub fn cluster_size(&self, width: i32, height: i32) -> i32 {
        if self.resolution <= 0 {
            return 0;
        }
        width.min(height) / self.resolution
    }

    /// Check the settings against a grid of the given size.
    pub fn validate(&self, width: i32, height: i32) -> Result<(), PathError> {
        if self.resolution < 1 {
            return Err(PathError::InvalidConfig(format!(
                "resolution must be at least 1, got {}",
                self.resolution
            )));
        }
        if self.entrance_min_width < 1 {
            return Err(PathError::InvalidConfig(format!(
                "entrance_min_width must be at least 1, got {}",
                self.entrance_min_width
            )));
        }
        if self.cluster_size(width, height) < 1 {
            return Err(PathError::InvalidConfig(format!(
                "a {width}x{height} grid is too small for resolution {}",
                self.resolution
            )));
        }
        if self.max_expansions == Some(0) {
            return Err(PathError::InvalidConfig(
                "max_expansions must be positive when set".to_string(),
            ));
        }
        Ok(())
    }
}
