use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::TangentMode;

/// Tunes polygon synthesis and the corner filters. Every field has a default, so a config file
/// only needs to mention what it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneModelConfig {
    /// Larger values let a single fill polygon cover more of a curved span before it's split.
    pub max_poly_size: f64,
    /// How far (in meters, along the lane) an anchor polygon extends around its way-point.
    pub anchor_depth: f64,
    pub tangent_mode: TangentMode,
    /// Fill spans shorter than this are skipped outright.
    pub min_fill_span: f64,
    pub filter: FilterConfig,
    pub current_pose_update: CurrentPoseConfig,
}

impl Default for LaneModelConfig {
    fn default() -> LaneModelConfig {
        LaneModelConfig {
            max_poly_size: 4.0,
            anchor_depth: 1.0,
            tangent_mode: TangentMode::ChordSum,
            min_fill_span: 0.05,
            filter: FilterConfig::default(),
            current_pose_update: CurrentPoseConfig::default(),
        }
    }
}

impl LaneModelConfig {
    pub fn load(path: &str) -> Result<LaneModelConfig> {
        let raw = fs_err::read_to_string(path)?;
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Variance (m^2) of a freshly placed corner along each axis.
    pub initial_variance: f64,
    /// Range noise is distance^2 divided by this.
    pub range_noise_divisor: f64,
    /// Radians^2
    pub bearing_variance: f64,
    pub outlier_sd: Option<f64>,
    pub deadzone: Option<f64>,
    /// Observer-to-corner distances are clamped to at least this many meters in the Jacobians.
    pub min_distance: f64,
}

impl Default for FilterConfig {
    fn default() -> FilterConfig {
        FilterConfig {
            initial_variance: 6.25,
            range_noise_divisor: 50.0,
            bearing_variance: 0.0025,
            outlier_sd: None,
            deadzone: None,
            min_distance: 1e-3,
        }
    }
}

/// Gates the pseudo-observations made from the held vehicle pose.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentPoseConfig {
    pub min_range: f64,
    pub max_range: f64,
    /// Radians either side of the vehicle's heading.
    pub max_bearing: f64,
}

impl Default for CurrentPoseConfig {
    fn default() -> CurrentPoseConfig {
        CurrentPoseConfig {
            min_range: 5.0,
            max_range: 80.0,
            max_bearing: 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config() {
        let cfg: LaneModelConfig =
            serde_json::from_str(r#"{"max_poly_size": 2.5, "filter": {"outlier_sd": 3.0}}"#)
                .unwrap();
        assert_eq!(cfg.max_poly_size, 2.5);
        assert_eq!(cfg.anchor_depth, 1.0);
        assert_eq!(cfg.filter.outlier_sd, Some(3.0));
        assert_eq!(cfg.filter.initial_variance, 6.25);
        assert_eq!(cfg.current_pose_update, CurrentPoseConfig::default());
    }

    #[test]
    fn load_from_file() {
        let path = std::env::temp_dir().join("lane_model_config_test.json");
        let path = path.to_str().unwrap().to_string();
        let mut cfg = LaneModelConfig::default();
        cfg.tangent_mode = TangentMode::Straightest;
        fs_err::write(&path, serde_json::to_string_pretty(&cfg).unwrap()).unwrap();
        assert_eq!(LaneModelConfig::load(&path).unwrap(), cfg);

        assert!(LaneModelConfig::load("/definitely/not/here.json").is_err());
    }
}
