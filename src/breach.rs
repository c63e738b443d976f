//! Breach-data block decoder.
//!
//! The body of a breach-data block is a structure count followed by that
//! many structure records laid end to end.  Records have no length prefix:
//! each record's extent is derived from two flags on its first row and from
//! the ordinate counts those flags point at.
//!
//! ```text
//! row 0            id … breach-method flag (col 9) … mass-wasting flag (col 13)
//! row 1
//! row 2            failure elevation in col 0 (mass wasting off)
//! row 2a           present only with mass wasting; failure elevation moves to row 3
//! count            progression ordinate count in col 0
//! ordinates        ceil(count / 5) rows
//! count            downcutting ordinate count   ┐ simplified physical
//! ordinates        ceil(count / 5) rows         ┘ breaching only
//! ```

use crate::block::HeaderLine;
use crate::cell::{Cell, Row};
use crate::config::{
    BASELINE_ROWS, BREACH_METHOD_COLUMN, FAILURE_ELEVATION_ROW, FLAG_SET, MASS_WASTING_COLUMN,
    ORDINATES_PER_ROW,
};
use crate::error::{BFileError, Result};
use crate::segment::RawBlock;

// ── Layout ───────────────────────────────────────────────────────────────────

/// Shape of one structure record, as derived from its flags and counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureLayout {
    pub mass_wasting:          bool,
    /// Breach method 1: simplified physical breaching, which adds a
    /// downcutting ordinate table.
    pub simplified_physical:   bool,
    pub progression_ordinates: usize,
    pub downcutting_ordinates: Option<usize>,
    /// Total rows the record occupies.
    pub row_span:              usize,
}

impl StructureLayout {
    /// Row (within the record) whose first cell is the failure elevation.
    pub fn failure_elevation_row(&self) -> usize {
        FAILURE_ELEVATION_ROW + usize::from(self.mass_wasting)
    }
}

/// Rows needed to hold `count` ordinates, five per row.
fn ordinate_rows(count: usize) -> usize {
    count / ORDINATES_PER_ROW + usize::from(count % ORDINATES_PER_ROW != 0)
}

fn body_row(raw: &RawBlock, index: usize) -> Result<Row> {
    let text = raw.body.get(index).ok_or(BFileError::TruncatedBlock {
        line:      raw.first_line,
        needed:    index + 1,
        available: raw.body.len(),
    })?;
    Row::parse(text, raw.body_line(index))
}

/// Derive the layout of the record whose first row is body row `first`.
fn derive_layout(raw: &RawBlock, first: usize) -> Result<StructureLayout> {
    let head = body_row(raw, first)?;
    let mass_wasting = head.int_at(MASS_WASTING_COLUMN, "mass wasting flag")? == FLAG_SET;
    let simplified_physical = head.int_at(BREACH_METHOD_COLUMN, "breach method flag")? == FLAG_SET;

    let mut span = BASELINE_ROWS + usize::from(mass_wasting);
    let progression_ordinates =
        body_row(raw, first + span)?.count_at(0, "progression ordinate count")?;
    span += 1 + ordinate_rows(progression_ordinates);

    let downcutting_ordinates = if simplified_physical {
        let count = body_row(raw, first + span)?.count_at(0, "downcutting ordinate count")?;
        span += 1 + ordinate_rows(count);
        Some(count)
    } else {
        None
    };

    Ok(StructureLayout {
        mass_wasting,
        simplified_physical,
        progression_ordinates,
        downcutting_ordinates,
        row_span: span,
    })
}

// ── Structure record ─────────────────────────────────────────────────────────

/// One structure's breach parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreachStructure {
    structure_id: i64,
    layout:       StructureLayout,
    rows:         Vec<Row>,
}

impl BreachStructure {
    /// SNET identifier: the integer in the record's first cell.
    pub fn structure_id(&self) -> i64 {
        self.structure_id
    }

    pub fn layout(&self) -> &StructureLayout {
        &self.layout
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn failure_elevation_cell(&self) -> &Cell {
        // Presence of this cell is checked when the record is decoded.
        &self.rows[self.layout.failure_elevation_row()].cells()[0]
    }

    pub fn failure_elevation(&self) -> Option<f64> {
        self.failure_elevation_cell().parse_float()
    }

    /// Overwrite the failure elevation cell, returning the previous cell.
    /// `None` leaves the record untouched.
    pub fn set_failure_elevation(&mut self, elevation: f64) -> Option<Cell> {
        let row = self.layout.failure_elevation_row();
        self.rows.get_mut(row)?.replace(0, Cell::from_float(elevation))
    }
}

// ── Block ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct BreachDataBlock {
    header:     HeaderLine,
    count_row:  Row,
    structures: Vec<BreachStructure>,
    /// Body lines after the last structure, kept verbatim.
    trailing:   Vec<String>,
}

impl BreachDataBlock {
    pub fn decode(header: HeaderLine, raw: &RawBlock) -> Result<Self> {
        let count_row = body_row(raw, 0)?;
        let count = count_row.count_at(0, "breach structure count")?;

        // Every record takes at least one body row.
        let mut structures = Vec::with_capacity(count.min(raw.body.len()));
        let mut first = 1;
        for _ in 0..count {
            let layout = derive_layout(raw, first)?;
            let rows = (first..first + layout.row_span)
                .map(|i| body_row(raw, i))
                .collect::<Result<Vec<_>>>()?;
            let structure_id = rows[0].int_at(0, "structure id")?;
            rows[layout.failure_elevation_row()].require(0, "failure elevation")?;
            structures.push(BreachStructure { structure_id, layout, rows });
            first += layout.row_span;
        }

        Ok(Self {
            header,
            count_row,
            structures,
            trailing: raw.body[first..].to_vec(),
        })
    }

    pub fn structures(&self) -> &[BreachStructure] {
        &self.structures
    }

    pub fn structure_mut(&mut self, structure_id: i64) -> Option<&mut BreachStructure> {
        self.structures.iter_mut().find(|s| s.structure_id == structure_id)
    }

    pub fn trailing_lines(&self) -> &[String] {
        &self.trailing
    }

    pub fn render(&self, out: &mut Vec<String>) {
        out.push(self.header.render());
        out.push(self.count_row.to_string());
        for s in &self.structures {
            out.extend(s.rows.iter().map(Row::to_string));
        }
        out.extend(self.trailing.iter().cloned());
    }
}
