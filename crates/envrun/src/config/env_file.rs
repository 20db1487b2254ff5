//! Definitions file parser
//!
//! The format is line oriented:
//!
//! ```text
//! # comment
//! KEY=value
//! KEY2 = value with spaces   # not a comment, part of the value
//! ```
//!
//! There is no quoting, escaping or line continuation.

use crate::config::environment::Environment;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Lines starting with optional whitespace then '#'
static COMMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*#").unwrap());

/// Stricter than POSIX, laxer than shells (dots and hyphens are accepted)
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[[:alpha:]][-._a-zA-Z0-9]*$").unwrap());

/// Characters trimmed from keys and values
const TRIMMED: &[char] = &[' ', '\t'];

/// Check a variable name against the naming rule
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

/// Parsed definitions file
#[derive(Debug, Clone, Default)]
pub struct EnvFile {
    /// Valid definitions
    pub vars: Environment,
    /// Keys rejected by the naming rule, in file order
    pub rejected: Vec<String>,
}

impl EnvFile {
    /// Load definitions from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EnvFileError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| EnvFileError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse_reader(BufReader::new(file))
    }

    /// Parse definitions from an in-memory string
    pub fn parse_str(content: &str) -> Self {
        let mut env_file = Self::default();
        for line in content.lines() {
            env_file.parse_line(line);
        }
        env_file
    }

    /// Parse definitions from a buffered reader.
    ///
    /// Invalid UTF-8 is replaced rather than rejected; only read failures are
    /// returned as errors.
    pub fn parse_reader(mut reader: impl BufRead) -> Result<Self, EnvFileError> {
        let mut env_file = Self::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = reader.read_until(b'\n', &mut buf).map_err(EnvFileError::Read)?;
            if read == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            let line = line.strip_suffix('\n').unwrap_or(&line);
            let line = line.strip_suffix('\r').unwrap_or(line);
            env_file.parse_line(line);
        }

        Ok(env_file)
    }

    fn parse_line(&mut self, line: &str) {
        if COMMENT_PATTERN.is_match(line) {
            return;
        }

        let Some((key, value)) = line.split_once('=') else {
            return;
        };

        let key = key.trim_matches(TRIMMED);
        let value = value.trim_matches(TRIMMED);

        if !is_valid_name(key) {
            log::warn!("Rejected variable: \"{}\"", key);
            self.rejected.push(key.to_string());
            return;
        }

        self.vars.insert(key, value);
    }
}

/// Errors that can occur when loading a definitions file
#[derive(Debug, thiserror::Error)]
pub enum EnvFileError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read definitions: {0}")]
    Read(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_simple_file() {
        let content = "\
# comment
KEY=value
KEY2 = value with spaces   # not a comment
PATH_LIKE=${HOME}/bin
";
        let env_file = EnvFile::parse_str(content);
        assert_eq!(env_file.vars.len(), 3);
        assert_eq!(env_file.vars.get("KEY"), Some("value"));
        assert_eq!(
            env_file.vars.get("KEY2"),
            Some("value with spaces   # not a comment")
        );
        assert_eq!(env_file.vars.get("PATH_LIKE"), Some("${HOME}/bin"));
        assert!(env_file.rejected.is_empty());
    }

    #[test]
    fn test_comments_never_produce_entries() {
        let content = "#A=1\n   #B=2\n\t# C=3\n#\n";
        let env_file = EnvFile::parse_str(content);
        assert!(env_file.vars.is_empty());
        assert!(env_file.rejected.is_empty());
    }

    #[test]
    fn test_split_on_first_equals() {
        let env_file = EnvFile::parse_str("URL=http://host/?a=b=c");
        assert_eq!(env_file.vars.get("URL"), Some("http://host/?a=b=c"));
    }

    #[test]
    fn test_lines_without_separator_are_ignored() {
        let env_file = EnvFile::parse_str("just noise\n\nexport\nA=1");
        assert_eq!(env_file.vars.len(), 1);
        assert!(env_file.rejected.is_empty());
    }

    #[test]
    fn test_trims_only_spaces_and_tabs() {
        let env_file = EnvFile::parse_str(" \tKEY\t = \t a  b \t\x0b");
        assert_eq!(env_file.vars.get("KEY"), Some("a  b \t\x0b"));
    }

    #[test]
    fn test_empty_value_is_kept() {
        let env_file = EnvFile::parse_str("EMPTY=");
        assert_eq!(env_file.vars.get("EMPTY"), Some(""));
    }

    #[test]
    fn test_invalid_names_rejected() {
        let content = "\
1ABC=x
=novalue
_LEADING=x
WITH SPACE=x
BAD$=x
good.name-1_x=ok
";
        let env_file = EnvFile::parse_str(content);
        assert_eq!(env_file.vars.len(), 1);
        assert_eq!(env_file.vars.get("good.name-1_x"), Some("ok"));
        assert_eq!(
            env_file.rejected,
            vec!["1ABC", "", "_LEADING", "WITH SPACE", "BAD$"]
        );
    }

    #[test]
    fn test_last_duplicate_wins() {
        let env_file = EnvFile::parse_str("A=1\nA=2\n");
        assert_eq!(env_file.vars.get("A"), Some("2"));
    }

    #[test]
    fn test_parse_reader_handles_crlf_and_invalid_utf8() {
        let bytes: &[u8] = b"A=1\r\nB=caf\xff\nC=3";
        let env_file = EnvFile::parse_reader(Cursor::new(bytes)).unwrap();
        assert_eq!(env_file.vars.get("A"), Some("1"));
        assert_eq!(env_file.vars.get("B"), Some("caf\u{fffd}"));
        assert_eq!(env_file.vars.get("C"), Some("3"));
    }

    /// Yields `data` once, then fails every read
    struct FailingReader {
        data: Option<&'static [u8]>,
    }

    impl std::io::Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.data.take() {
                Some(data) => {
                    buf[..data.len()].copy_from_slice(data);
                    Ok(data.len())
                }
                None => Err(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "device went away",
                )),
            }
        }
    }

    #[test]
    fn test_parse_reader_propagates_read_error() {
        let reader = BufReader::new(FailingReader {
            data: Some(b"A=1\nB=2"),
        });

        let result = EnvFile::parse_reader(reader);
        match result {
            Err(EnvFileError::Read(e)) => assert_eq!(e.to_string(), "device went away"),
            other => panic!("expected a read error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_file_missing() {
        let result = EnvFile::from_file("/nonexistent/definitions.env");
        assert!(matches!(result, Err(EnvFileError::Io { .. })));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "NAME=envrun\n# NAME=other\n").unwrap();

        let env_file = EnvFile::from_file(&path).unwrap();
        assert_eq!(env_file.vars.get("NAME"), Some("envrun"));
    }

    #[test]
    fn test_is_valid_name() {
        assert!(is_valid_name("a"));
        assert!(is_valid_name("My.Var-2"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("-x"));
        assert!(!is_valid_name("é"));
    }
}
