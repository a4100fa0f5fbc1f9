//! In-place index fixing.
//!
//! The rewritten index is written to the configured temp path first and only
//! then moved over the input, so a failed pass leaves the input untouched.

use crate::config::FixerConfig;
use crate::error::{FixError, Result};
use crate::scanner::{FixStats, Scanner};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Rewrite the index file at `input_path` in place.
///
/// The temp file's directory must already exist; it is not created. On any
/// failure before replacement the temp file is removed and the input is left
/// as it was.
pub fn fix_index(input_path: &Path, config: &FixerConfig) -> Result<FixStats> {
    let temp_path = config.temp_path.as_path();
    debug!(
        input = %input_path.display(),
        temp = %temp_path.display(),
        "fixing index"
    );

    let input = File::open(input_path).map_err(|source| FixError::OpenInput {
        path: input_path.to_path_buf(),
        source,
    })?;
    if is_same_file(input_path, temp_path) {
        return Err(FixError::CreateTemp {
            path: temp_path.to_path_buf(),
            source: io::Error::new(
                io::ErrorKind::InvalidInput,
                "temp path is the input file",
            ),
        });
    }
    let output = File::create(temp_path).map_err(|source| FixError::CreateTemp {
        path: temp_path.to_path_buf(),
        source,
    })?;

    let stats = match write_fixed(BufReader::new(input), output, input_path, temp_path) {
        Ok(stats) => stats,
        Err(err) => {
            fs::remove_file(temp_path).ok();
            return Err(err);
        }
    };

    replace_file(temp_path, input_path)?;

    info!(
        input = %input_path.display(),
        lines_read = stats.lines_read,
        lines_written = stats.lines_written,
        hierarchy = stats.hierarchy_rewrites,
        annotated = stats.annotated_kept,
        files = stats.files_suppressed,
        "index fixed"
    );
    Ok(stats)
}

/// Apply the rewrite to an in-memory document.
pub fn fix_bytes(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut scanner = Scanner::new();
    for line in input.split_inclusive(|&b| b == b'\n') {
        scanner
            .feed(line, &mut out)
            .expect("writing to a Vec cannot fail");
    }
    scanner
        .finish(&mut out)
        .expect("writing to a Vec cannot fail");
    out
}

fn write_fixed<R: BufRead>(
    mut reader: R,
    output: File,
    input_path: &Path,
    temp_path: &Path,
) -> Result<FixStats> {
    let write_err = |source| FixError::Write {
        path: temp_path.to_path_buf(),
        source,
    };

    let mut writer = BufWriter::new(output);
    let mut scanner = Scanner::new();
    let mut line = Vec::new();

    loop {
        line.clear();
        let n = reader
            .read_until(b'\n', &mut line)
            .map_err(|source| FixError::Read {
                path: input_path.to_path_buf(),
                source,
            })?;
        if n == 0 {
            break;
        }
        scanner.feed(&line, &mut writer).map_err(write_err)?;
    }

    let stats = scanner.finish(&mut writer).map_err(write_err)?;
    writer.flush().map_err(write_err)?;
    writer.get_ref().sync_all().map_err(write_err)?;
    Ok(stats)
}

/// Whether both paths name the same existing file, including through
/// symlinks or hardlinks.
fn is_same_file(a: &Path, b: &Path) -> bool {
    let (Ok(meta_a), Ok(meta_b)) = (fs::metadata(a), fs::metadata(b)) else {
        return false;
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        meta_a.dev() == meta_b.dev() && meta_a.ino() == meta_b.ino()
    }

    #[cfg(not(unix))]
    {
        let _ = (meta_a, meta_b);
        match (fs::canonicalize(a), fs::canonicalize(b)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

/// Move `from` over `to`.
///
/// A plain rename replaces the destination atomically. Only when `from` and
/// `to` are on different filesystems is the content copied over `to` instead,
/// which is not atomic. `from` is gone afterwards unless its cleanup fails.
fn replace_file(from: &Path, to: &Path) -> Result<()> {
    let replace_err = |source| FixError::Replace {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    let rename_err = match fs::rename(from, to) {
        Ok(()) => return Ok(()),
        Err(err) => err,
    };

    if rename_err.kind() != io::ErrorKind::CrossesDevices {
        fs::remove_file(from).ok();
        return Err(replace_err(rename_err));
    }

    warn!(
        from = %from.display(),
        to = %to.display(),
        "temp file is on another filesystem, falling back to copy"
    );

    if let Err(source) = fs::copy(from, to) {
        fs::remove_file(from).ok();
        return Err(replace_err(source));
    }
    if let Err(err) = fs::remove_file(from) {
        warn!(path = %from.display(), error = %err, "failed to remove temp file");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_fix_bytes_files_example() {
        assert_eq!(fix_bytes(b"\\chapter{X}\n\\input{files}\nKeep me\n"), b"Keep me\n");
    }

    #[test]
    fn test_fix_bytes_matches_stream() {
        let input = b"a\n\\chapter{H}\n\\input{hierarchy}\n\\chapter{T}";
        let mut streamed = Vec::new();
        crate::fix_stream(&input[..], &mut streamed).unwrap();
        assert_eq!(fix_bytes(input), streamed);
    }

    #[test]
    fn test_fix_bytes_empty() {
        assert!(fix_bytes(b"").is_empty());
    }

    #[test]
    fn test_replace_file_overwrites_destination() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("temp.tex");
        let to = dir.path().join("refman.tex");
        fs::write(&from, "new").unwrap();
        fs::write(&to, "old").unwrap();

        replace_file(&from, &to).unwrap();

        assert_eq!(fs::read_to_string(&to).unwrap(), "new");
        assert!(!from.exists());
    }

    #[test]
    fn test_replace_file_missing_source() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("missing.tex");
        let to = dir.path().join("refman.tex");
        fs::write(&to, "old").unwrap();

        let err = replace_file(&from, &to).unwrap_err();
        assert!(matches!(err, FixError::Replace { .. }));
        assert_eq!(fs::read_to_string(&to).unwrap(), "old");
    }

    #[test]
    fn test_replace_file_failed_rename_does_not_copy() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("temp.tex");
        let to = dir.path().join("refman.tex");
        fs::write(&from, "new").unwrap();
        fs::create_dir(&to).unwrap();

        let err = replace_file(&from, &to).unwrap_err();
        assert!(matches!(err, FixError::Replace { .. }));
        assert!(to.is_dir());
        assert!(!from.exists());
    }

    #[test]
    fn test_is_same_file() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.tex");
        let b = dir.path().join("b.tex");
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();

        assert!(is_same_file(&a, &a));
        assert!(is_same_file(&a, &dir.path().join(".").join("a.tex")));
        assert!(!is_same_file(&a, &b));
        assert!(!is_same_file(&a, &dir.path().join("missing.tex")));
    }

    #[cfg(unix)]
    #[test]
    fn test_is_same_file_through_hardlink() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.tex");
        let link = dir.path().join("link.tex");
        fs::write(&a, "a").unwrap();
        fs::hard_link(&a, &link).unwrap();

        assert!(is_same_file(&a, &link));
    }

    #[test]
    fn test_missing_input_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let temp = dir.path().join("temp.tex");
        let config = FixerConfig::with_temp_path(&temp);

        let err = fix_index(&dir.path().join("absent.tex"), &config).unwrap_err();
        assert!(matches!(err, FixError::OpenInput { .. }));
        assert!(!temp.exists());
    }
}
