//! Value sources that feed the two mutations.
//!
//! Failure elevations arrive as fragility-curve sampling results; replacement
//! outlet flows arrive as a hydrograph exported from a results file.  Both are
//! plain JSON so the core stays free of any results-file reader.

use std::fs;
use std::path::Path;

use serde::de::Error as _;
use serde::{Deserialize, Serialize};

use crate::error::{BFileError, Result};

// ── Fragility-curve results ──────────────────────────────────────────────────

/// One sampled failure elevation for a named structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragilityResult {
    #[serde(rename = "location")]
    pub name:              String,
    pub failure_elevation: f64,
}

/// `{"results": [{"location": "...", "failure_elevation": 612.3}, ...]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FragilityResults {
    pub results: Vec<FragilityResult>,
}

impl FragilityResults {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_slice(&fs::read(path)?)
    }
}

// ── Replacement flows ────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum FlowTable {
    Flat(Vec<f64>),
    /// Hydrograph rows of `[time, flow, ...]`; the flow is column 1.
    Rows(Vec<Vec<f64>>),
}

/// Parse replacement flows from either a flat array or hydrograph rows.
pub fn parse_flows(bytes: &[u8]) -> Result<Vec<f64>> {
    match serde_json::from_slice(bytes)? {
        FlowTable::Flat(values) => Ok(values),
        FlowTable::Rows(rows) => rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.get(1).copied().ok_or_else(|| {
                    BFileError::Json(serde_json::Error::custom(format!(
                        "hydrograph row {i} has no flow column"
                    )))
                })
            })
            .collect(),
    }
}

pub fn load_flows<P: AsRef<Path>>(path: P) -> Result<Vec<f64>> {
    parse_flows(&fs::read(path)?)
}
