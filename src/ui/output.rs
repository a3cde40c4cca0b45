// Thu Oct 15 2026 - Alex

use crate::orchestrator::{SearchResultSet, Termination};
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub symbol: String,
    pub directory: PathBuf,
    pub matches: Vec<PathBuf>,
    pub termination: Termination,
}

impl JsonReport {
    pub fn new(symbol: &str, directory: &Path, result: &SearchResultSet) -> Self {
        Self {
            symbol: symbol.to_string(),
            directory: directory.to_path_buf(),
            matches: result.paths().map(Path::to_path_buf).collect(),
            termination: result.termination(),
        }
    }
}

pub fn write_text<W: Write>(out: &mut W, symbol: &str, directory: &Path, result: &SearchResultSet) -> io::Result<()> {
    if result.is_empty() {
        return writeln!(
            out,
            "{} No matches found for {} in {}",
            "[!]".red(),
            symbol,
            directory.display()
        );
    }

    for record in result {
        writeln!(out, "{} {}", "[*]".blue(), record)?;
    }
    Ok(())
}

pub fn write_json<W: Write>(out: &mut W, report: &JsonReport) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::MatchRecord;

    fn render(result: &SearchResultSet) -> String {
        colored::control::set_override(false);
        let mut buf = Vec::new();
        write_text(&mut buf, "puts", Path::new("/lib"), result).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_text_lists_matches() {
        let result = SearchResultSet::new(
            vec![MatchRecord::new("/lib/a.so"), MatchRecord::new("/lib/b.so")],
            Termination::Exhausted,
        );
        assert_eq!(render(&result), "[*] /lib/a.so\n[*] /lib/b.so\n");
    }

    #[test]
    fn test_text_reports_no_match() {
        let result = SearchResultSet::new(Vec::new(), Termination::Exhausted);
        assert_eq!(render(&result), "[!] No matches found for puts in /lib\n");
    }

    #[test]
    fn test_json_document() {
        let result = SearchResultSet::new(vec![MatchRecord::new("/lib/a.so")], Termination::Stopped);
        let mut buf = Vec::new();
        write_json(&mut buf, &JsonReport::new("puts", Path::new("/lib"), &result)).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["symbol"], "puts");
        assert_eq!(value["directory"], "/lib");
        assert_eq!(value["matches"][0], "/lib/a.so");
        assert_eq!(value["termination"], "stopped");
    }
}
