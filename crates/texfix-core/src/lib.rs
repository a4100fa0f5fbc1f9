//! texfix-core: Library for post-processing generated LaTeX indexes
//!
//! This crate provides:
//! - Chapter marker detection and index section classification
//! - A two-line lookahead scanner that rewrites or drops index chapters
//! - In-place replacement of the index file via a scratch temp file
//! - Configuration loading for the temp file location
//!
//! ```rust
//! let fixed = texfix_core::fix_bytes(b"\\chapter{X}\n\\input{files}\nKeep me\n");
//! assert_eq!(fixed, b"Keep me\n");
//! ```

pub mod config;
pub mod error;
pub mod fixer;
pub mod marker;
pub mod scanner;

// Re-exports for convenience
pub use config::{default_config_path, load_config, Config, FixerConfig, DEFAULT_TEMP_PATH};
pub use error::{FixError, Result};
pub use fixer::{fix_bytes, fix_index};
pub use marker::{is_chapter_line, IndexSection, CHAPTER_MARKER, CLASS_INDEX_HEADING};
pub use scanner::{fix_stream, FixStats, ScanState, Scanner};
