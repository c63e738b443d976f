//! Format constants and run options.
//!
//! The b-file carries no length prefixes or delimiters, so every constant
//! below is load-bearing: a structure record's extent is recovered from the
//! flag columns and ordinate counts named here.  None of these values are
//! negotiated or read from the file itself.

use serde::{Deserialize, Serialize};

// ── Cell geometry ────────────────────────────────────────────────────────────

/// Width of every fixed-width field, in ASCII characters.
pub const CELL_WIDTH: usize = 8;

/// Number of (index, flow) pairs written on one outlet time-series row.
pub const PAIRS_PER_ROW: usize = 5;

/// Number of ordinates stored on one progression/downcutting row.
pub const ORDINATES_PER_ROW: usize = 5;

// ── Header markers ───────────────────────────────────────────────────────────

/// Substring identifying a breach-data header line.
pub const BREACH_DATA_MARKER: &str = "Breach Data";

/// Substring identifying an outlet time-series header; the series name
/// follows it on the same line.
pub const OUTLET_TS_MARKER: &str = "Outlet TS - ";

/// Row that terminates an outlet flow table in some source variants.
pub const END_OF_FLOW_SENTINEL: &str = " 3.4E+38";

// ── Breach structure layout ──────────────────────────────────────────────────

/// Column of a structure's first row holding the mass-wasting flag.
pub const MASS_WASTING_COLUMN: usize = 13;

/// Column of a structure's first row holding the breach-method flag.
pub const BREACH_METHOD_COLUMN: usize = 9;

/// Flag value meaning "set" for both structure flags.
pub const FLAG_SET: i64 = 1;

/// Rows every structure record has before the optional mass-wasting row
/// and the ordinate tables.
pub const BASELINE_ROWS: usize = 3;

/// Row index of the failure elevation within a structure's rows.
pub const FAILURE_ELEVATION_ROW: usize = 2;

/// Offset from a structure's position in the geometry structure table to
/// its SNET identifier.
pub const SNET_ID_OFFSET: i64 = 2;

// ── Run options ──────────────────────────────────────────────────────────────

/// What a batch amendment does when a structure name cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownStructurePolicy {
    /// Stop at the first unresolved name; nothing after it is applied.
    #[default]
    Abort,
    /// Log the unresolved name and continue with the rest of the batch.
    Skip,
}
