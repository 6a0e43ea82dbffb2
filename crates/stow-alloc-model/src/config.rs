// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use serde::Deserialize;
use std::path::PathBuf;

/// Symmetry breaking applied among identical boxes in the placement model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymmetryMode {
    /// Full lexicographic ordering on (x, y, z).
    #[default]
    Full,
    /// Ordering along the container's longest axis only.
    Simple,
    /// No symmetry breaking.
    None,
}

/// Which box, if any, gets pinned to the container origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum AnchorMode {
    /// The box with the largest nominal volume.
    #[serde(rename = "larger")]
    Larger,
    /// The heaviest box within the most populous identical-size class.
    #[serde(rename = "heavierWithinMostRecurringSimilar")]
    HeavierWithinMostRecurringSimilar,
}

/// Weights of the placement soft-objective terms. A weight of zero
/// disables its term entirely; no variables are created for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct SoftWeights {
    #[serde(default, rename = "prefer_total_floor_area_weight")]
    pub floor_area: u32,
    #[serde(default, rename = "prefer_large_base_lower_weight")]
    pub large_base_lower: u32,
    #[serde(default, rename = "prefer_large_base_lower_non_linear_weight")]
    pub large_base_lower_quadratic: u32,
    #[serde(default, rename = "prefer_put_boxes_by_volume_lower_z_weight")]
    pub volume_lower: u32,
    #[serde(default, rename = "prefer_maximize_surface_contact_weight")]
    pub surface_contact: u32,
    #[serde(
        default,
        rename = "prefer_orientation_where_side_with_biggest_surface_is_at_the_bottom_weight"
    )]
    pub biggest_face_down: u32,
}

impl SoftWeights {
    #[inline]
    pub fn all_zero(&self) -> bool {
        self.floor_area == 0
            && self.large_base_lower == 0
            && self.large_base_lower_quadratic == 0
            && self.volume_lower == 0
            && self.surface_contact == 0
            && self.biggest_face_down == 0
    }
}

fn default_time_limit() -> f64 {
    60.0
}

/// The Phase-2 settings document (a standalone JSON file referenced by the
/// input document).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Phase2Settings {
    #[serde(default, rename = "symmetry_mode")]
    pub symmetry: SymmetryMode,
    #[serde(
        default = "default_time_limit",
        rename = "solver_phase2_max_time_in_seconds",
        alias = "max_time_in_seconds"
    )]
    pub time_limit_seconds: f64,
    #[serde(default, rename = "anchor_mode")]
    pub anchor: Option<AnchorMode>,
    #[serde(flatten)]
    pub weights: SoftWeights,
}

impl Default for Phase2Settings {
    fn default() -> Self {
        Self {
            symmetry: SymmetryMode::default(),
            time_limit_seconds: default_time_limit(),
            anchor: None,
            weights: SoftWeights::default(),
        }
    }
}

fn default_num_iterations() -> usize {
    100
}

fn default_percentage() -> u32 {
    10
}

fn default_max_no_improve() -> usize {
    20
}

/// Parameters of the outer adaptive large-neighborhood search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AlnsParams {
    #[serde(default = "default_num_iterations")]
    pub num_iterations: usize,
    /// Percentage of all boxes removed per destroy step, in `[0, 100]`.
    #[serde(default = "default_percentage")]
    pub num_can_be_moved_percentage: u32,
    #[serde(default = "default_time_limit")]
    pub time_limit: f64,
    #[serde(default = "default_max_no_improve")]
    pub max_no_improve: usize,
}

impl Default for AlnsParams {
    fn default() -> Self {
        Self {
            num_iterations: default_num_iterations(),
            num_can_be_moved_percentage: default_percentage(),
            time_limit: default_time_limit(),
            max_no_improve: default_max_no_improve(),
        }
    }
}

impl AlnsParams {
    /// Number of boxes the destroy operator removes per iteration:
    /// `max(1, ⌊n · percentage / 100⌋)`.
    #[inline]
    pub fn num_remove(&self, total_items: usize) -> usize {
        let raw = total_items * self.num_can_be_moved_percentage as usize / 100;
        raw.max(1)
    }
}

/// Everything the orchestrator needs besides the problem itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveSettings {
    pub phase1_time_limit_seconds: f64,
    pub step2_settings_file: Option<PathBuf>,
    pub alns: AlnsParams,
}

impl Default for SolveSettings {
    fn default() -> Self {
        Self {
            phase1_time_limit_seconds: default_time_limit(),
            step2_settings_file: None,
            alns: AlnsParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase2_settings_defaults() {
        let s: Phase2Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(s.symmetry, SymmetryMode::Full);
        assert_eq!(s.time_limit_seconds, 60.0);
        assert!(s.anchor.is_none());
        assert!(s.weights.all_zero());
    }

    #[test]
    fn test_phase2_settings_full_document() {
        let doc = r#"{
            "symmetry_mode": "simple",
            "solver_phase2_max_time_in_seconds": 5,
            "anchor_mode": "heavierWithinMostRecurringSimilar",
            "prefer_total_floor_area_weight": 2,
            "prefer_maximize_surface_contact_weight": 3,
            "prefer_large_base_lower_weight": 1
        }"#;
        let s: Phase2Settings = serde_json::from_str(doc).unwrap();
        assert_eq!(s.symmetry, SymmetryMode::Simple);
        assert_eq!(s.time_limit_seconds, 5.0);
        assert_eq!(s.anchor, Some(AnchorMode::HeavierWithinMostRecurringSimilar));
        assert_eq!(s.weights.floor_area, 2);
        assert_eq!(s.weights.surface_contact, 3);
        assert_eq!(s.weights.large_base_lower, 1);
        assert_eq!(s.weights.biggest_face_down, 0);
    }

    #[test]
    fn test_phase2_settings_legacy_time_field() {
        let s: Phase2Settings =
            serde_json::from_str(r#"{"max_time_in_seconds": 7.5}"#).unwrap();
        assert_eq!(s.time_limit_seconds, 7.5);
    }

    #[test]
    fn test_alns_num_remove_floors_at_one() {
        let params = AlnsParams {
            num_can_be_moved_percentage: 10,
            ..AlnsParams::default()
        };
        assert_eq!(params.num_remove(5), 1);
        assert_eq!(params.num_remove(30), 3);
        assert_eq!(params.num_remove(0), 1);
    }
}
