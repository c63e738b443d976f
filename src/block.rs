//! The closed set of block kinds a b-file decodes into.

use tracing::debug;

use crate::breach::{BreachDataBlock, BreachStructure};
use crate::config::{BREACH_DATA_MARKER, OUTLET_TS_MARKER};
use crate::error::Result;
use crate::outlet::OutletTimeSeries;
use crate::segment::RawBlock;

// ── Header line ──────────────────────────────────────────────────────────────

/// A header line split around the marker that identified it.
///
/// The line is rebuilt from its parts on encode; for an outlet block the
/// text after the marker is the series name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLine {
    prefix: String,
    marker: &'static str,
    suffix: String,
}

impl HeaderLine {
    /// Split `text` at the first occurrence of `marker`.
    pub fn split(text: &str, marker: &'static str) -> Option<Self> {
        let at = text.find(marker)?;
        Some(Self {
            prefix: text[..at].to_owned(),
            marker,
            suffix: text[at + marker.len()..].to_owned(),
        })
    }

    /// Text following the marker.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn render(&self) -> String {
        format!("{}{}{}", self.prefix, self.marker, self.suffix)
    }
}

// ── Default block ────────────────────────────────────────────────────────────

/// Any block without a recognised marker, kept line for line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultBlock {
    pub header: Option<String>,
    pub body:   Vec<String>,
}

impl DefaultBlock {
    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }
}

// ── Block ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Default(DefaultBlock),
    BreachData(BreachDataBlock),
    OutletTimeSeries(OutletTimeSeries),
}

impl Block {
    /// Pick a decoder by header marker and run it.
    pub fn decode(raw: RawBlock) -> Result<Self> {
        let line = raw.first_line;
        let header = raw.header.as_deref().unwrap_or_default();
        let block = if let Some(h) = HeaderLine::split(header, BREACH_DATA_MARKER) {
            Block::BreachData(BreachDataBlock::decode(h, &raw)?)
        } else if let Some(h) = HeaderLine::split(header, OUTLET_TS_MARKER) {
            Block::OutletTimeSeries(OutletTimeSeries::decode(h, &raw)?)
        } else {
            Block::Default(DefaultBlock { header: raw.header, body: raw.body })
        };
        debug!(
            target: "rasbfile::decode",
            line,
            kind = block.kind(),
            "Decoded block"
        );
        Ok(block)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Block::Default(_)          => "default",
            Block::BreachData(_)       => "breach-data",
            Block::OutletTimeSeries(_) => "outlet-ts",
        }
    }

    /// Structure records held by this block; empty unless breach data.
    pub fn breach_structures(&self) -> &[BreachStructure] {
        match self {
            Block::BreachData(b) => b.structures(),
            _ => &[],
        }
    }

    /// Append this block's lines, unterminated, in file order.
    pub fn render(&self, out: &mut Vec<String>) {
        match self {
            Block::Default(b) => {
                out.extend(b.header.iter().cloned());
                out.extend(b.body.iter().cloned());
            }
            Block::BreachData(b)       => b.render(out),
            Block::OutletTimeSeries(b) => b.render(out),
        }
    }
}
