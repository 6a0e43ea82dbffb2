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

//! JSON ingest for the input document and the Phase-2 settings document.
//!
//! Items without an `id` receive sequential 1-based ids; duplicate ids are
//! accepted as labels. All structural validation beyond deserialization
//! happens through [`Item::new`] and [`ContainerSpec::new`].

use crate::{
    common::{GroupId, ItemId},
    config::{AlnsParams, Phase2Settings, SolveSettings},
    problem::{ContainerSpec, Item, Problem, ProblemBuilder, err::ProblemError},
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use stow_alloc_core::prelude::{Extent3, RotationPolicy};

#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Problem(ProblemError),
    PercentageOutOfRange(u32),
    NonPositiveTimeLimit(f64),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "I/O error: {e}"),
            LoadError::Json(e) => write!(f, "Malformed document: {e}"),
            LoadError::Problem(e) => write!(f, "Invalid problem: {e}"),
            LoadError::PercentageOutOfRange(p) => {
                write!(f, "num_can_be_moved_percentage {p} is outside [0, 100]")
            }
            LoadError::NonPositiveTimeLimit(t) => {
                write!(f, "Time limit {t} must be positive")
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            LoadError::Json(e) => Some(e),
            LoadError::Problem(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e)
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Json(e)
    }
}

impl From<ProblemError> for LoadError {
    fn from(e: ProblemError) -> Self {
        LoadError::Problem(e)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
enum RotationField {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "z")]
    Z,
    #[serde(rename = "free")]
    Free,
}

impl From<RotationField> for RotationPolicy {
    fn from(r: RotationField) -> Self {
        match r {
            RotationField::None => RotationPolicy::Fixed,
            RotationField::Z => RotationPolicy::ZAxis,
            RotationField::Free => RotationPolicy::Free,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ContainerDoc {
    size: [i64; 3],
    weight: i64,
}

#[derive(Debug, Deserialize)]
struct ItemDoc {
    #[serde(default)]
    id: Option<i64>,
    size: [i64; 3],
    weight: i64,
    #[serde(default)]
    rotation: Option<RotationField>,
    #[serde(default)]
    group_id: Option<i64>,
}

fn default_phase1_time() -> f64 {
    60.0
}

#[derive(Debug, Deserialize)]
struct InputDoc {
    container: ContainerDoc,
    items: Vec<ItemDoc>,
    #[serde(
        default = "default_phase1_time",
        rename = "solver_phase1_max_time_in_seconds",
        alias = "max_time_in_seconds"
    )]
    phase1_time_limit: f64,
    #[serde(default)]
    step2_settings_file: Option<PathBuf>,
    #[serde(default)]
    alns_params: Option<AlnsParams>,
}

fn settings_from(doc: &InputDoc) -> Result<SolveSettings, LoadError> {
    if doc.phase1_time_limit <= 0.0 {
        return Err(LoadError::NonPositiveTimeLimit(doc.phase1_time_limit));
    }
    let alns = doc.alns_params.clone().unwrap_or_default();
    if alns.num_can_be_moved_percentage > 100 {
        return Err(LoadError::PercentageOutOfRange(
            alns.num_can_be_moved_percentage,
        ));
    }
    if alns.time_limit <= 0.0 {
        return Err(LoadError::NonPositiveTimeLimit(alns.time_limit));
    }
    Ok(SolveSettings {
        phase1_time_limit_seconds: doc.phase1_time_limit,
        step2_settings_file: doc.step2_settings_file.clone(),
        alns,
    })
}

/// Parse the input document from a string.
pub fn parse_problem(text: &str) -> Result<(Problem, SolveSettings), LoadError> {
    let doc: InputDoc = serde_json::from_str(text)?;
    let settings = settings_from(&doc)?;

    let spec = ContainerSpec::new(Extent3::from(doc.container.size), doc.container.weight)?;

    let mut builder = ProblemBuilder::with_capacity(spec, doc.items.len());
    for (idx, raw) in doc.items.iter().enumerate() {
        let id = ItemId::new(raw.id.unwrap_or(idx as i64 + 1));
        let rotation = raw
            .rotation
            .map(RotationPolicy::from)
            .unwrap_or(RotationPolicy::Free);
        builder.add_item(Item::new(
            id,
            Extent3::from(raw.size),
            raw.weight,
            rotation,
            raw.group_id.map(GroupId::new),
        )?);
    }

    let problem = builder.build()?;
    Ok((problem, settings))
}

/// Load and parse the input document from a file.
pub fn load_problem<P: AsRef<Path>>(path: P) -> Result<(Problem, SolveSettings), LoadError> {
    let text = std::fs::read_to_string(path)?;
    parse_problem(&text)
}

/// Parse the Phase-2 settings document from a string.
pub fn parse_phase2_settings(text: &str) -> Result<Phase2Settings, LoadError> {
    let settings: Phase2Settings = serde_json::from_str(text)?;
    if settings.time_limit_seconds <= 0.0 {
        return Err(LoadError::NonPositiveTimeLimit(settings.time_limit_seconds));
    }
    Ok(settings)
}

/// Load and parse the Phase-2 settings document from a file.
pub fn load_phase2_settings<P: AsRef<Path>>(path: P) -> Result<Phase2Settings, LoadError> {
    let text = std::fs::read_to_string(path)?;
    parse_phase2_settings(&text)
}
