//! Fixed-width cell codec.
//!
//! A b-file data row is a run of 8-character cells with no separator.  A
//! cell holds either a right-justified integer or a fixed-point decimal.
//! Cells are the atomic unit of both reading and writing: a row is only ever
//! rebuilt by concatenating its cells, so an untouched cell is re-emitted
//! exactly as it was read.

use std::fmt;

use crate::config::CELL_WIDTH;
use crate::error::{BFileError, Result};

// ── Cell ─────────────────────────────────────────────────────────────────────

/// One 8-character field.  Always exactly [`CELL_WIDTH`] ASCII bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cell(String);

impl Cell {
    /// Encode a float the way RAS does: round to 8 decimal digits, format
    /// as `%8.8f`, then keep the first 8 characters.
    pub fn from_float(value: f64) -> Self {
        Cell(encode_float(value))
    }

    /// Right-justify an integer in 8 characters, truncating if wider.
    pub fn from_int(value: i64) -> Self {
        let mut text = format!("{:>width$}", value, width = CELL_WIDTH);
        text.truncate(CELL_WIDTH);
        Cell(text)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Integer value of the cell, ignoring surrounding blanks.
    pub fn parse_int(&self) -> Option<i64> {
        self.0.trim().parse().ok()
    }

    /// Decimal value of the cell, ignoring surrounding blanks.
    pub fn parse_float(&self) -> Option<f64> {
        self.0.trim().parse().ok()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Float → cell text.  Overflow past 8 characters is truncated, not rounded.
pub fn encode_float(value: f64) -> String {
    let rounded = (value * 1e8).round() / 1e8;
    let mut text = format!("{:width$.prec$}", rounded, width = CELL_WIDTH, prec = CELL_WIDTH);
    text.truncate(CELL_WIDTH);
    text
}

/// Split a row into its cells, left to right.
///
/// `line` is the 1-based source line used in the error if the row is not a
/// whole number of cells.
pub fn tokenize(row: &str, line: usize) -> Result<Vec<Cell>> {
    // Multi-byte text can never be a numeric row, and byte slicing below
    // relies on one byte per character.
    if !row.is_ascii() || row.len() % CELL_WIDTH != 0 {
        return Err(BFileError::MalformedRow { line, len: row.chars().count() });
    }
    Ok(row
        .as_bytes()
        .chunks(CELL_WIDTH)
        .map(|chunk| Cell(String::from_utf8_lossy(chunk).into_owned()))
        .collect())
}

// ── Row ──────────────────────────────────────────────────────────────────────

/// A tokenized data row, remembering the source line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    line:  usize,
    cells: Vec<Cell>,
}

impl Row {
    pub fn parse(text: &str, line: usize) -> Result<Self> {
        Ok(Self { line, cells: tokenize(text, line)? })
    }

    /// 1-based source line of this row.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, column: usize) -> Option<&Cell> {
        self.cells.get(column)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Replace one cell.  Returns the previous cell, or `None` if the column
    /// does not exist (the row is left untouched in that case).
    pub fn replace(&mut self, column: usize, cell: Cell) -> Option<Cell> {
        self.cells
            .get_mut(column)
            .map(|slot| std::mem::replace(slot, cell))
    }

    /// Fetch a cell that must exist, naming `field` in the error otherwise.
    pub fn require(&self, column: usize, field: &'static str) -> Result<&Cell> {
        self.cells.get(column).ok_or(BFileError::MissingCell {
            line: self.line,
            column,
            cells: self.cells.len(),
            field,
        })
    }

    /// Integer flag or identifier held in `column`.
    pub fn int_at(&self, column: usize, field: &'static str) -> Result<i64> {
        let cell = self.require(column, field)?;
        cell.parse_int().ok_or_else(|| self.parse_error(column, field, cell))
    }

    /// Non-negative count held in `column`.
    pub fn count_at(&self, column: usize, field: &'static str) -> Result<usize> {
        let cell = self.require(column, field)?;
        cell.parse_int()
            .and_then(|v| usize::try_from(v).ok())
            .ok_or_else(|| self.parse_error(column, field, cell))
    }

    fn parse_error(&self, column: usize, field: &'static str, cell: &Cell) -> BFileError {
        BFileError::FlagParse {
            line: self.line,
            column,
            field,
            text: cell.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.cells.iter().try_for_each(|c| f.write_str(c.as_str()))
    }
}
