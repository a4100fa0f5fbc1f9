//! Chapter marker detection and index section classification.
//!
//! All matching is done on raw line bytes, terminator included. The marker is
//! a fixed substring; section lines must match exactly, newline and all.

/// Substring identifying a chapter heading line.
pub const CHAPTER_MARKER: &[u8] = b"\\chapter{";

/// Heading emitted in place of the generated hierarchy chapter line.
pub const CLASS_INDEX_HEADING: &[u8] = b"\\chapter{Class Index}\n";

/// Generated index table that may follow a chapter heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSection {
    /// `\input{hierarchy}`: heading is replaced with [`CLASS_INDEX_HEADING`]
    Hierarchy,
    /// `\input{annotated}`: heading and input are kept as-is
    Annotated,
    /// `\input{files}`: heading and input are both dropped
    Files,
}

impl IndexSection {
    pub const ALL: [IndexSection; 3] = [Self::Hierarchy, Self::Annotated, Self::Files];

    /// The exact, newline-terminated line that introduces this section.
    pub fn input_line(self) -> &'static [u8] {
        match self {
            Self::Hierarchy => b"\\input{hierarchy}\n",
            Self::Annotated => b"\\input{annotated}\n",
            Self::Files => b"\\input{files}\n",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Hierarchy => "hierarchy",
            Self::Annotated => "annotated",
            Self::Files => "files",
        }
    }

    /// Classify the line read after a chapter marker.
    pub fn classify(line: &[u8]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|section| section.input_line() == line)
    }
}

/// Whether the line contains the chapter marker anywhere.
pub fn is_chapter_line(line: &[u8]) -> bool {
    line.windows(CHAPTER_MARKER.len())
        .any(|window| window == CHAPTER_MARKER)
}
