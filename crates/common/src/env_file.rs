//! Dotenv-style key/value file
//!
//! Holds `FB_APP_ID`, `FB_APP_SECRET` and `FB_ACCESS_TOKEN`. Values are read
//! with dotenvy, so quoting, escapes and `${VAR}` substitution follow the
//! usual dotenv grammar. Lines are also kept verbatim so that rewriting one
//! key leaves the rest of the file byte-identical.
//!
//! Lookups give the process environment precedence over the file, matching
//! the usual dotenv behaviour of never overriding variables already set.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Entry {
        key: String,
        /// Original text, re-emitted unless the value is replaced
        raw: Option<String>,
    },
    Other(String),
}

/// In-memory view of a key/value configuration file.
#[derive(Debug, Clone)]
pub struct EnvFile {
    path: PathBuf,
    lines: Vec<Line>,
    values: HashMap<String, String>,
}

impl EnvFile {
    /// Read the file at `path`. A missing file yields an empty view; it is
    /// created on the first `save`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let contents = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(Error::Io(e)),
        };
        Ok(Self::parse(path, &contents))
    }

    /// Parse file contents without touching the filesystem. Lines dotenvy
    /// cannot parse contribute no value but are still preserved.
    pub fn parse(path: impl Into<PathBuf>, contents: &str) -> Self {
        let values = dotenvy::from_read_iter(contents.as_bytes())
            .filter_map(std::result::Result::ok)
            .collect();
        Self {
            path: path.into(),
            lines: contents.lines().map(scan_line).collect(),
            values,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value stored in the file for `key`. Later entries win.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Resolve `key` from the process environment first, then the file.
    pub fn lookup(&self, key: &str) -> Option<String> {
        match std::env::var(key) {
            Ok(v) => Some(v),
            Err(_) => self.get(key).map(str::to_owned),
        }
    }

    /// Like [`lookup`](Self::lookup) but treats empty values as absent.
    pub fn lookup_non_empty(&self, key: &str) -> Option<String> {
        self.lookup(key).filter(|v| !v.trim().is_empty())
    }

    /// Insert or replace `key`. Every existing entry for the key is rewritten
    /// in place; if none exists the entry is appended.
    pub fn set(&mut self, key: &str, value: &str) {
        let mut found = false;
        for line in &mut self.lines {
            if let Line::Entry { key: k, raw } = line {
                if k == key {
                    *raw = None;
                    found = true;
                }
            }
        }
        if !found {
            self.lines.push(Line::Entry {
                key: key.to_owned(),
                raw: None,
            });
        }
        self.values.insert(key.to_owned(), value.to_owned());
    }

    /// Render the file contents.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                Line::Entry {
                    raw: Some(raw), ..
                } => out.push_str(raw),
                Line::Entry { key, .. } => {
                    let value = self.get(key).unwrap_or_default();
                    out.push_str(&format!("{key}=\"{}\"", escape_value(value)));
                }
                Line::Other(text) => out.push_str(text),
            }
            out.push('\n');
        }
        out
    }

    /// Persist to disk.
    ///
    /// Writes a temp file next to the target and renames it over the original
    /// so a crash never leaves a truncated file. Permissions are 0600 on unix
    /// since the file holds the app secret and access token.
    pub fn save(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let tmp_path = dir.join(format!(".env.tmp.{}", std::process::id()));

        let write_err = |source| Error::Write {
            path: self.path.clone(),
            source,
        };

        std::fs::write(&tmp_path, self.render()).map_err(write_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))
                .map_err(write_err)?;
        }

        if let Err(e) = std::fs::rename(&tmp_path, &self.path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(write_err(e));
        }
        Ok(())
    }

    /// Load `path`, set one key and write it back, preserving every other line.
    pub fn set_key(path: impl Into<PathBuf>, key: &str, value: &str) -> Result<()> {
        let mut file = Self::load(path)?;
        file.set(key, value);
        file.save()
    }
}

/// Classify a line by key only; values come from dotenvy.
fn scan_line(text: &str) -> Line {
    let trimmed = text.trim_start();
    if trimmed.starts_with('#') {
        return Line::Other(text.to_owned());
    }
    let body = trimmed.strip_prefix("export ").unwrap_or(trimmed);
    match body.split_once('=') {
        Some((key, _)) if !key.trim().is_empty() && !key.trim().contains(char::is_whitespace) => {
            Line::Entry {
                key: key.trim().to_owned(),
                raw: Some(text.to_owned()),
            }
        }
        _ => Line::Other(text.to_owned()),
    }
}

fn escape_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"# Meta app credentials
FB_APP_ID=1234567890
export FB_APP_SECRET='s3cr3t'
FB_ACCESS_TOKEN="old-token"
OTHER_KEY=keep # trailing comment
not an entry
"#;

    #[test]
    fn parses_quoting_styles() {
        let file = EnvFile::parse(".env", SAMPLE);
        assert_eq!(file.get("FB_APP_ID"), Some("1234567890"));
        assert_eq!(file.get("FB_APP_SECRET"), Some("s3cr3t"));
        assert_eq!(file.get("FB_ACCESS_TOKEN"), Some("old-token"));
        assert_eq!(file.get("OTHER_KEY"), Some("keep"));
        assert_eq!(file.get("MISSING"), None);
    }

    #[test]
    fn substitutes_earlier_values() {
        let file = EnvFile::parse(
            ".env",
            "FB_APP_ID=123\nFB_APP_SECRET=\"${FB_APP_ID}-sec\"\n",
        );
        assert_eq!(file.get("FB_APP_SECRET"), Some("123-sec"));
    }

    #[test]
    fn set_value_with_dollar_is_not_substituted_on_reload() {
        let mut file = EnvFile::parse(".env", "FB_APP_ID=1\n");
        file.set("FB_ACCESS_TOKEN", "a$FB_APP_ID");
        let reparsed = EnvFile::parse(".env", &file.render());
        assert_eq!(reparsed.get("FB_ACCESS_TOKEN"), Some("a$FB_APP_ID"));
    }

    #[test]
    fn later_entries_win() {
        let file = EnvFile::parse(".env", "A=1\nA=2\n");
        assert_eq!(file.get("A"), Some("2"));
    }

    #[test]
    fn set_rewrites_in_place_and_preserves_other_lines() {
        let mut file = EnvFile::parse(".env", SAMPLE);
        file.set("FB_ACCESS_TOKEN", "new-token");
        let rendered = file.render();

        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "# Meta app credentials");
        assert_eq!(lines[1], "FB_APP_ID=1234567890");
        assert_eq!(lines[2], "export FB_APP_SECRET='s3cr3t'");
        assert_eq!(lines[3], "FB_ACCESS_TOKEN=\"new-token\"");
        assert_eq!(lines[4], "OTHER_KEY=keep # trailing comment");
        assert_eq!(lines[5], "not an entry");
    }

    #[test]
    fn set_appends_missing_key() {
        let mut file = EnvFile::parse(".env", "FB_APP_ID=1\n");
        file.set("FB_ACCESS_TOKEN", "tok\"en");
        let rendered = file.render();
        assert!(rendered.ends_with("FB_ACCESS_TOKEN=\"tok\\\"en\"\n"));

        let reparsed = EnvFile::parse(".env", &rendered);
        assert_eq!(reparsed.get("FB_ACCESS_TOKEN"), Some("tok\"en"));
    }

    #[test]
    fn set_key_roundtrips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "FB_APP_ID=42\n# keep\n").unwrap();

        EnvFile::set_key(&path, "FB_ACCESS_TOKEN", "EAAB-long").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "FB_APP_ID=42\n# keep\nFB_ACCESS_TOKEN=\"EAAB-long\"\n");
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = EnvFile::load(dir.path().join("absent.env")).unwrap();
        assert_eq!(file.render(), "");
        assert_eq!(file.get("FB_APP_ID"), None);
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_0600() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        EnvFile::set_key(&path, "FB_ACCESS_TOKEN", "t").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "env file must be 0600, got {mode:o}");
    }

    #[test]
    fn lookup_non_empty_skips_blank_file_values() {
        let file = EnvFile::parse(".env", "META_TEST_BLANK_TOKEN=\"\"\n");
        assert_eq!(file.lookup_non_empty("META_TEST_BLANK_TOKEN"), None);
    }
}
