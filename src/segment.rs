//! Line splitting, line classification and block segmentation.
//!
//! A b-file has no explicit block terminators.  A line whose first character
//! is a letter opens a new block; every other line (numeric rows, blank or
//! whitespace-only lines) belongs to the block opened most recently.  The
//! last block simply runs to end-of-file.
//!
//! Bytes are mapped one-to-one onto chars (`0x00..=0xFF` → `U+0000..=U+00FF`)
//! so text in any 8-bit code page survives a decode/encode cycle unchanged.

use crate::error::{BFileError, Result};

// ── Line endings ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf   => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// A file split into lines, with terminators stripped but remembered.
#[derive(Debug, Clone, Default)]
pub struct SourceLines {
    pub lines:         Vec<String>,
    pub ending:        LineEnding,
    /// Whether the last line was followed by a terminator.
    pub final_newline: bool,
}

/// Split raw bytes into lines.  Every terminated line must use the same
/// ending; an unterminated last line is kept exactly as found.
pub fn split_lines(bytes: &[u8]) -> Result<SourceLines> {
    let mut out = SourceLines::default();
    if bytes.is_empty() {
        return Ok(out);
    }

    let mut pieces: Vec<&[u8]> = bytes.split(|&b| b == b'\n').collect();
    // `split` yields a trailing empty piece after a final '\n'.
    let last_unterminated = if pieces.last().is_some_and(|p| p.is_empty()) {
        pieces.pop();
        out.final_newline = true;
        None
    } else {
        pieces.pop()
    };

    let mut ending: Option<LineEnding> = None;
    for (i, piece) in pieces.into_iter().enumerate() {
        let (text, this) = match piece.strip_suffix(b"\r") {
            Some(text) => (text, LineEnding::CrLf),
            None       => (piece, LineEnding::Lf),
        };
        match ending {
            None => ending = Some(this),
            Some(seen) if seen != this => {
                return Err(BFileError::MixedLineEndings { line: i + 1 });
            }
            Some(_) => {}
        }
        out.lines.push(latin1_decode(text));
    }
    if let Some(last) = last_unterminated {
        out.lines.push(latin1_decode(last));
    }
    out.ending = ending.unwrap_or_default();
    Ok(out)
}

pub fn latin1_decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Append `text` as bytes.  Chars outside `U+0000..=U+00FF` cannot come from
/// a decoded file and are written as `?`.
pub fn latin1_encode(text: &str, out: &mut Vec<u8>) {
    out.extend(text.chars().map(|c| u8::try_from(c).unwrap_or(b'?')));
}

// ── Classification ───────────────────────────────────────────────────────────

/// A header line starts with a letter.  Nothing else marks a block boundary.
pub fn is_header(line: &str) -> bool {
    line.chars().next().is_some_and(char::is_alphabetic)
}

// ── Segmentation ─────────────────────────────────────────────────────────────

/// A header line plus the body lines that follow it, not yet interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    /// `None` only for data lines that precede the first header.
    pub header:     Option<String>,
    /// 1-based line number of the block's first line.
    pub first_line: usize,
    pub body:       Vec<String>,
}

impl RawBlock {
    /// 1-based source line of body line `index`.
    pub fn body_line(&self, index: usize) -> usize {
        self.first_line + index + usize::from(self.header.is_some())
    }
}

/// Group lines into blocks, preserving order.
pub fn segment(lines: Vec<String>) -> Vec<RawBlock> {
    let mut blocks: Vec<RawBlock> = Vec::new();
    for (i, line) in lines.into_iter().enumerate() {
        let line_no = i + 1;
        if is_header(&line) {
            blocks.push(RawBlock { header: Some(line), first_line: line_no, body: Vec::new() });
            continue;
        }
        match blocks.last_mut() {
            Some(block) => block.body.push(line),
            None => blocks.push(RawBlock { header: None, first_line: line_no, body: vec![line] }),
        }
    }
    blocks
}
