//! Two-line lookahead scanner.
//!
//! The scanner is fed one line at a time (terminator included) and writes the
//! rewritten output as it goes. A chapter line is held back until the next line
//! arrives, then both are classified together:
//!
//! | lookahead             | output                                      |
//! |-----------------------|---------------------------------------------|
//! | `\input{hierarchy}`   | `\chapter{Class Index}` + `\input{hierarchy}` |
//! | `\input{annotated}`   | heading + lookahead, unchanged              |
//! | `\input{files}`       | nothing                                     |
//! | anything else         | heading + lookahead, unchanged              |
//! | end of stream         | heading, unchanged                          |
//!
//! The lookahead line is consumed by the pair and is never treated as a
//! chapter line itself.

use crate::marker::{is_chapter_line, IndexSection, CLASS_INDEX_HEADING};
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Counters collected over one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixStats {
    pub lines_read: usize,
    pub lines_written: usize,
    pub hierarchy_rewrites: usize,
    pub annotated_kept: usize,
    pub files_suppressed: usize,
    /// Chapter lines followed by an unrecognized line
    pub passthrough_pairs: usize,
    /// Chapter lines with nothing after them
    pub trailing_markers: usize,
}

impl FixStats {
    /// Chapter lines followed by a recognized index section.
    pub fn matched_sections(&self) -> usize {
        self.hierarchy_rewrites + self.annotated_kept + self.files_suppressed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScanState {
    #[default]
    Scanning,
    /// A chapter line was read and waits for the next line.
    AwaitingSection { heading: Vec<u8>, line_no: usize },
}

#[derive(Debug, Default)]
pub struct Scanner {
    state: ScanState,
    stats: FixStats,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// Consume one input line and write whatever it releases.
    pub fn feed<W: Write>(&mut self, line: &[u8], out: &mut W) -> io::Result<()> {
        self.stats.lines_read += 1;
        let line_no = self.stats.lines_read;

        match std::mem::take(&mut self.state) {
            ScanState::Scanning => {
                if is_chapter_line(line) {
                    self.state = ScanState::AwaitingSection {
                        heading: line.to_vec(),
                        line_no,
                    };
                } else {
                    out.write_all(line)?;
                    self.stats.lines_written += 1;
                }
            }
            ScanState::AwaitingSection { heading, line_no } => {
                let section = IndexSection::classify(line);
                if let Some(section) = section {
                    debug!(line = line_no, section = section.name(), "index chapter");
                }
                match section {
                    Some(IndexSection::Hierarchy) => {
                        out.write_all(&[CLASS_INDEX_HEADING, line].concat())?;
                        self.stats.lines_written += 2;
                        self.stats.hierarchy_rewrites += 1;
                    }
                    Some(IndexSection::Files) => {
                        self.stats.files_suppressed += 1;
                    }
                    Some(IndexSection::Annotated) => {
                        out.write_all(&[heading.as_slice(), line].concat())?;
                        self.stats.lines_written += 2;
                        self.stats.annotated_kept += 1;
                    }
                    None => {
                        out.write_all(&[heading.as_slice(), line].concat())?;
                        self.stats.lines_written += 2;
                        self.stats.passthrough_pairs += 1;
                    }
                }
            }
        }

        Ok(())
    }

    /// Flush a held chapter line at end of stream and return the counters.
    pub fn finish<W: Write>(mut self, out: &mut W) -> io::Result<FixStats> {
        if let ScanState::AwaitingSection { heading, line_no } = std::mem::take(&mut self.state) {
            debug!(line = line_no, "chapter line at end of input, emitting unchanged");
            out.write_all(&heading)?;
            self.stats.lines_written += 1;
            self.stats.trailing_markers += 1;
        }
        Ok(self.stats)
    }
}

/// Run the scanner over a whole stream.
///
/// Lines are split on `\n` and passed through as raw bytes, so input without
/// chapter lines comes out byte-identical.
pub fn fix_stream<R: BufRead, W: Write>(mut reader: R, mut writer: W) -> io::Result<FixStats> {
    let mut scanner = Scanner::new();
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        scanner.feed(&line, &mut writer)?;
    }

    let stats = scanner.finish(&mut writer)?;
    writer.flush()?;
    Ok(stats)
}
