//! Outlet time-series block decoder.
//!
//! ```text
//! Outlet TS - <series name>
//!       48                         declared row count
//!    idx    flow   idx    flow …   five (index, flow) pairs per row
//!  3.4E+38                         optional sentinel; it and every line
//! …                                after it are carried verbatim
//! ```

use crate::block::HeaderLine;
use crate::cell::{tokenize, Cell};
use crate::config::{END_OF_FLOW_SENTINEL, PAIRS_PER_ROW};
use crate::error::{BFileError, Result};
use crate::segment::RawBlock;

/// One (index, flow) sample.  The cell text is kept so an untouched pair is
/// written back exactly as read.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowPair {
    index:      f64,
    flow:       f64,
    index_cell: Cell,
    flow_cell:  Cell,
}

impl FlowPair {
    pub fn index(&self) -> f64 {
        self.index
    }

    pub fn flow(&self) -> f64 {
        self.flow
    }

    fn set_flow(&mut self, flow: f64) {
        self.flow = flow;
        self.flow_cell = Cell::from_float(flow);
    }
}

fn parse_value(cell: &Cell, line: usize, column: usize, field: &'static str) -> Result<f64> {
    cell.parse_float().ok_or_else(|| BFileError::FlagParse {
        line,
        column,
        field,
        text: cell.as_str().to_owned(),
    })
}

/// Parse one row of up to five pairs.
fn parse_pairs(text: &str, line: usize) -> Result<Vec<FlowPair>> {
    let cells = tokenize(text, line)?;
    if cells.len() % 2 != 0 || cells.len() > 2 * PAIRS_PER_ROW {
        return Err(BFileError::MalformedRow { line, len: text.len() });
    }
    cells
        .chunks(2)
        .enumerate()
        .map(|(slot, pair)| {
            Ok(FlowPair {
                index:      parse_value(&pair[0], line, 2 * slot, "time index")?,
                flow:       parse_value(&pair[1], line, 2 * slot + 1, "flow")?,
                index_cell: pair[0].clone(),
                flow_cell:  pair[1].clone(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutletTimeSeries {
    header:     HeaderLine,
    count_line: String,
    declared:   usize,
    pairs:      Vec<FlowPair>,
    /// Sentinel and anything after it, kept verbatim.
    trailing:   Vec<String>,
}

impl OutletTimeSeries {
    pub fn decode(header: HeaderLine, raw: &RawBlock) -> Result<Self> {
        let name = header.suffix().to_owned();
        let count_line = raw.body.first().ok_or(BFileError::TruncatedBlock {
            line:      raw.first_line,
            needed:    1,
            available: 0,
        })?;
        let declared: usize = count_line.trim().parse().map_err(|_| BFileError::FlagParse {
            line:   raw.body_line(0),
            column: 0,
            field:  "declared row count",
            text:   count_line.clone(),
        })?;

        let mut pairs = Vec::with_capacity(declared.min(PAIRS_PER_ROW * raw.body.len()));
        let mut next = 1;
        while next < raw.body.len() && pairs.len() < declared {
            let text = &raw.body[next];
            if text.as_str() == END_OF_FLOW_SENTINEL {
                break;
            }
            let line = raw.body_line(next);
            let row = parse_pairs(text, line)?;
            let total = pairs.len() + row.len();
            if total > declared {
                return Err(BFileError::SeriesCount { name, declared, found: total });
            }
            // Only the final row may be short; otherwise re-wrapping at five
            // pairs would move values between lines.
            if row.len() < PAIRS_PER_ROW && total < declared {
                return Err(BFileError::MalformedRow { line, len: text.len() });
            }
            pairs.extend(row);
            next += 1;
        }
        if pairs.len() != declared {
            return Err(BFileError::SeriesCount { name, declared, found: pairs.len() });
        }

        Ok(Self {
            header,
            count_line: count_line.clone(),
            declared,
            pairs,
            trailing: raw.body[next..].to_vec(),
        })
    }

    /// Series name: the header text after the outlet marker.
    pub fn name(&self) -> &str {
        self.header.suffix()
    }

    pub fn declared_row_count(&self) -> usize {
        self.declared
    }

    pub fn pairs(&self) -> &[FlowPair] {
        &self.pairs
    }

    pub fn series(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.pairs.iter().map(|p| (p.index, p.flow))
    }

    pub fn flows(&self) -> Vec<f64> {
        self.pairs.iter().map(FlowPair::flow).collect()
    }

    pub fn trailing_lines(&self) -> &[String] {
        &self.trailing
    }

    /// Replace every flow value, leaving the time index column untouched.
    /// The series is unchanged if the lengths disagree.
    pub fn update_flow_series(&mut self, values: &[f64]) -> Result<()> {
        if values.len() != self.declared {
            return Err(BFileError::LengthMismatch {
                expected: self.declared,
                actual:   values.len(),
            });
        }
        for (pair, &flow) in self.pairs.iter_mut().zip(values) {
            pair.set_flow(flow);
        }
        Ok(())
    }

    pub fn render(&self, out: &mut Vec<String>) {
        out.push(self.header.render());
        out.push(self.count_line.clone());
        for row in self.pairs.chunks(PAIRS_PER_ROW) {
            let mut text = String::with_capacity(row.len() * 16);
            for p in row {
                text.push_str(p.index_cell.as_str());
                text.push_str(p.flow_cell.as_str());
            }
            out.push(text);
        }
        out.extend(self.trailing.iter().cloned());
    }
}
