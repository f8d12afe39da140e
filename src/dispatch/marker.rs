//! Result-path recovery from handler output
//!
//! A handler reports success by printing `FINAL_OUTPUT_PATH::<path>` on
//! standard output. The marker may appear anywhere in a line; the path is the
//! rest of that line with surrounding whitespace removed.

use std::path::PathBuf;

pub const MARKER_PREFIX: &str = "FINAL_OUTPUT_PATH::";

/// Outcome of scanning handler output for the marker line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerLine {
    Resolved(PathBuf),
    NotFound,
}

/// Find the first marker carrying a non-empty path
pub fn parse_marker(stdout: &str) -> MarkerLine {
    stdout
        .lines()
        .find_map(|line| {
            let (_, value) = line.split_once(MARKER_PREFIX)?;
            let value = value.trim();
            (!value.is_empty()).then(|| PathBuf::from(value))
        })
        .map_or(MarkerLine::NotFound, MarkerLine::Resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(path: &str) -> MarkerLine {
        MarkerLine::Resolved(PathBuf::from(path))
    }

    #[test]
    fn test_single_marker() {
        assert_eq!(
            parse_marker("FINAL_OUTPUT_PATH::/tmp/out123.png\n"),
            resolved("/tmp/out123.png")
        );
    }

    #[test]
    fn test_marker_among_progress_output() {
        let out = "quality=85 size=612KB\nquality=70 size=480KB\nFINAL_OUTPUT_PATH::uploads/abc_compressed.jpg\ndone\n";
        assert_eq!(parse_marker(out), resolved("uploads/abc_compressed.jpg"));
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(
            parse_marker("FINAL_OUTPUT_PATH::   /tmp/a b.pdf \r\n"),
            resolved("/tmp/a b.pdf")
        );
    }

    #[test]
    fn test_first_marker_wins() {
        let out = "FINAL_OUTPUT_PATH::/tmp/first.png\nFINAL_OUTPUT_PATH::/tmp/second.png\n";
        assert_eq!(parse_marker(out), resolved("/tmp/first.png"));
    }

    #[test]
    fn test_marker_mid_line() {
        assert_eq!(
            parse_marker("[info] FINAL_OUTPUT_PATH::/tmp/x.pdf"),
            resolved("/tmp/x.pdf")
        );
    }

    #[test]
    fn test_empty_value_is_skipped() {
        assert_eq!(parse_marker("FINAL_OUTPUT_PATH::\n"), MarkerLine::NotFound);
        assert_eq!(
            parse_marker("FINAL_OUTPUT_PATH::  \nFINAL_OUTPUT_PATH::/tmp/y.png\n"),
            resolved("/tmp/y.png")
        );
    }

    #[test]
    fn test_no_marker() {
        assert_eq!(parse_marker(""), MarkerLine::NotFound);
        assert_eq!(
            parse_marker("Traceback (most recent call last):\n  ...\n"),
            MarkerLine::NotFound
        );
        assert_eq!(parse_marker("final_output_path::/tmp/x.png"), MarkerLine::NotFound);
    }
}
