//! Run records written next to every artifact the CLI produces.
//!
//! `grid.csv` gets `grid.csv.meta.json` describing the mesh that was built,
//! what was written, and which build produced it.

use anyhow::{Context, Result};
use quadspline::{MeshStats, Rect};
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Mesh inputs and the refinement counters they led to.
#[derive(Clone, Debug, Serialize)]
pub struct MeshRecord {
    pub function: String,
    /// `[x_lo, y_lo, x_hi, y_hi]`
    pub domain: [f64; 4],
    pub precision: f64,
    pub stats: StatsRecord,
}

impl MeshRecord {
    pub fn new(function: impl Into<String>, domain: Rect, precision: f64, stats: &MeshStats) -> Self {
        Self {
            function: function.into(),
            domain: [domain.x_lo, domain.y_lo, domain.x_hi, domain.y_hi],
            precision,
            stats: stats.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StatsRecord {
    pub quadrants: usize,
    pub leaves: usize,
    pub triangles: usize,
    pub split_triangles: usize,
    pub evaluations: usize,
    pub max_level: u32,
    pub rollbacks: usize,
    pub impure: usize,
    pub capped: usize,
}

impl From<&MeshStats> for StatsRecord {
    fn from(s: &MeshStats) -> Self {
        Self {
            quadrants: s.quadrants,
            leaves: s.leaves,
            triangles: s.triangles,
            split_triangles: s.split_triangles,
            evaluations: s.evaluations,
            max_level: s.max_level,
            rollbacks: s.rollbacks,
            impure: s.impure,
            capped: s.capped,
        }
    }
}

/// What the artifact holds.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputRecord {
    Grid {
        nx: usize,
        ny: usize,
    },
    Spline {
        weight: String,
        pieces: usize,
        degree: usize,
        definite_integral: f64,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct RunRecord {
    /// `GIT_COMMIT` at build or run time, if set.
    pub code_rev: Option<String>,
    pub version: &'static str,
    pub tags: Vec<String>,
    pub mesh: MeshRecord,
    pub output: OutputRecord,
}

impl RunRecord {
    pub fn new(mesh: MeshRecord, output: OutputRecord, tags: Vec<String>) -> Self {
        Self {
            code_rev: code_rev(),
            version: quadspline::VERSION,
            tags,
            mesh,
            output,
        }
    }

    /// Write the record beside `artifact`, whose directory must already exist.
    pub fn write_next_to(&self, artifact: &Path) -> Result<PathBuf> {
        let path = record_path(artifact);
        std::fs::write(&path, serde_json::to_vec_pretty(self)?)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}

/// `<file name>.meta.json` in the artifact's directory.
pub fn record_path(artifact: &Path) -> PathBuf {
    let mut name = artifact
        .file_name()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("artifact"));
    name.push(".meta.json");
    artifact.with_file_name(name)
}

pub fn code_rev() -> Option<String> {
    option_env!("GIT_COMMIT")
        .map(str::to_string)
        .or_else(|| std::env::var("GIT_COMMIT").ok())
        .filter(|s| !s.is_empty())
}
