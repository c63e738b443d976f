//! The decoded b-file and its file-level operations.
//!
//! ```no_run
//! use rasbfile::{BFile, StructureLookup};
//!
//! let lookup = StructureLookup::from_connection_names(["Dam A", "Dam B"]);
//! let mut bf = BFile::open("model.b01")?.with_lookup(lookup);
//! bf.amend_breach_failure_elevation("Dam B", 612.5)?;
//! bf.save("model.b01")?;
//! # Ok::<(), rasbfile::BFileError>(())
//! ```

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::block::Block;
use crate::breach::BreachStructure;
use crate::config::UnknownStructurePolicy;
use crate::error::{BFileError, Result};
use crate::inputs::FragilityResults;
use crate::lookup::StructureLookup;
use crate::outlet::OutletTimeSeries;
use crate::segment::{latin1_encode, segment, split_lines, LineEnding};

/// Outcome of a batch of failure-elevation amendments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmendReport {
    pub applied: Vec<String>,
    pub skipped: Vec<String>,
}

/// An ordered list of decoded blocks plus the external name → id table.
///
/// Blocks keep file order; mutations rewrite cells in place and never add,
/// remove or reorder blocks or rows.
#[derive(Debug, Clone, PartialEq)]
pub struct BFile {
    blocks:        Vec<Block>,
    lookup:        StructureLookup,
    ending:        LineEnding,
    final_newline: bool,
}

impl BFile {
    // ── Decode / encode ──────────────────────────────────────────────────────

    /// Decode a whole b-file.  Any error leaves nothing constructed.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let source = split_lines(bytes)?;
        let line_count = source.lines.len();
        let blocks = segment(source.lines)
            .into_iter()
            .map(Block::decode)
            .collect::<Result<Vec<_>>>()?;
        debug!(
            target: "rasbfile::decode",
            lines = line_count,
            blocks = blocks.len(),
            "Decoded b-file"
        );
        Ok(Self {
            blocks,
            lookup: StructureLookup::default(),
            ending: source.ending,
            final_newline: source.final_newline,
        })
    }

    /// Render every block back to bytes.  Unmodified files come back
    /// byte-for-byte.
    pub fn encode(&self) -> Vec<u8> {
        let mut lines = Vec::new();
        for block in &self.blocks {
            block.render(&mut lines);
        }
        let ending = self.ending.as_str();
        let mut out = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                out.extend_from_slice(ending.as_bytes());
            }
            latin1_encode(line, &mut out);
        }
        if self.final_newline && !lines.is_empty() {
            out.extend_from_slice(ending.as_bytes());
        }
        out
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::decode(&fs::read(path)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.encode())?;
        Ok(())
    }

    // ── Lookup table ─────────────────────────────────────────────────────────

    pub fn with_lookup(mut self, lookup: StructureLookup) -> Self {
        self.lookup = lookup;
        self
    }

    pub fn set_lookup(&mut self, lookup: StructureLookup) {
        self.lookup = lookup;
    }

    pub fn lookup(&self) -> &StructureLookup {
        &self.lookup
    }

    // ── Read access ──────────────────────────────────────────────────────────

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn line_ending(&self) -> LineEnding {
        self.ending
    }

    pub fn breach_structures(&self) -> impl Iterator<Item = &BreachStructure> + '_ {
        self.blocks.iter().flat_map(Block::breach_structures)
    }

    pub fn structure(&self, structure_id: i64) -> Option<&BreachStructure> {
        self.breach_structures().find(|s| s.structure_id() == structure_id)
    }

    pub fn outlet_series(&self) -> impl Iterator<Item = &OutletTimeSeries> + '_ {
        self.blocks.iter().filter_map(|b| match b {
            Block::OutletTimeSeries(ts) => Some(ts),
            _ => None,
        })
    }

    /// First outlet series whose name contains `name`.
    pub fn find_outlet(&self, name: &str) -> Option<&OutletTimeSeries> {
        self.outlet_series().find(|ts| ts.name().contains(name))
    }

    // ── Mutations ────────────────────────────────────────────────────────────

    /// Set the failure elevation of the structure called `structure_name`.
    pub fn amend_breach_failure_elevation(
        &mut self,
        structure_name: &str,
        elevation: f64,
    ) -> Result<()> {
        let id = self
            .lookup
            .get(structure_name)
            .ok_or_else(|| BFileError::UnknownStructure(structure_name.to_owned()))?;
        self.set_failure_elevation(id, elevation)
            .ok_or_else(|| BFileError::UnknownStructure(structure_name.to_owned()))
    }

    /// Set the failure elevation of the structure with SNET id `structure_id`.
    pub fn amend_breach_failure_elevation_by_id(
        &mut self,
        structure_id: i64,
        elevation: f64,
    ) -> Result<()> {
        self.set_failure_elevation(structure_id, elevation)
            .ok_or_else(|| BFileError::UnknownStructure(structure_id.to_string()))
    }

    fn set_failure_elevation(&mut self, structure_id: i64, elevation: f64) -> Option<()> {
        let structure = self.blocks.iter_mut().find_map(|b| match b {
            Block::BreachData(bd) => bd.structure_mut(structure_id),
            _ => None,
        })?;
        let previous = structure.set_failure_elevation(elevation)?;
        info!(
            target: "rasbfile::amend",
            structure_id,
            from = previous.as_str().trim(),
            to = structure.failure_elevation_cell().as_str(),
            "Amended failure elevation"
        );
        Some(())
    }

    /// Replace the flows of the first outlet series whose name contains
    /// `series_name`.
    pub fn amend_outlet_flows(&mut self, series_name: &str, values: &[f64]) -> Result<()> {
        let series = self
            .blocks
            .iter_mut()
            .find_map(|b| match b {
                Block::OutletTimeSeries(ts) if ts.name().contains(series_name) => Some(ts),
                _ => None,
            })
            .ok_or_else(|| BFileError::UnknownSeries(series_name.to_owned()))?;
        series.update_flow_series(values)?;
        info!(
            target: "rasbfile::amend",
            series = series.name(),
            values = values.len(),
            "Replaced outlet flows"
        );
        Ok(())
    }

    /// Apply every sampled failure elevation.  Each amendment is atomic;
    /// `policy` decides whether an unresolved structure stops the batch.
    pub fn apply_failure_elevations(
        &mut self,
        results: &FragilityResults,
        policy: UnknownStructurePolicy,
    ) -> Result<AmendReport> {
        let mut report = AmendReport::default();
        for r in &results.results {
            match self.amend_breach_failure_elevation(&r.name, r.failure_elevation) {
                Ok(()) => report.applied.push(r.name.clone()),
                Err(BFileError::UnknownStructure(name)) if policy == UnknownStructurePolicy::Skip => {
                    warn!(target: "rasbfile::amend", structure = %name, "Skipping unknown structure");
                    report.skipped.push(name);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(report)
    }
}
