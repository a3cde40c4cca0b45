// Thu Oct 15 2026 - Alex

use crate::discovery::DiscoveryError;
use goblin::elf::header::{ELFMAG, SELFMAG};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

const LOG_TARGET: &str = "findso::discovery";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Substring a file name must contain to be considered, `.so` by default
    /// so versioned names like `libc.so.6` are picked up.
    pub name_pattern: String,
    pub follow_symlinks: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            name_pattern: ".so".to_string(),
            follow_symlinks: false,
        }
    }
}

/// Recursively collects the ELF files under `root` whose names match.
///
/// Entries are visited in name order within each directory, so the result is
/// stable across runs. Only a bad `root` is an error; anything unreadable
/// below it is logged and skipped.
pub fn scan_directory(root: &Path, options: &ScanOptions) -> Result<Vec<PathBuf>, DiscoveryError> {
    let metadata = fs::metadata(root).map_err(|source| DiscoveryError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(DiscoveryError::NotADirectory(root.to_path_buf()));
    }

    let mut walker = Walker {
        options,
        visited: HashSet::new(),
        found: Vec::new(),
    };
    walker.walk_root(root)?;

    let candidates = walker.found.len();
    let elf_files: Vec<PathBuf> = walker
        .found
        .into_iter()
        .filter(|path| match has_elf_magic(path) {
            Ok(true) => true,
            Ok(false) => {
                log::debug!(target: LOG_TARGET, "{} is not an ELF file", path.display());
                false
            }
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Error checking file {}: {}", path.display(), e);
                false
            }
        })
        .collect();

    log::info!(
        target: LOG_TARGET,
        "{}: {} candidates, {} ELF files",
        root.display(),
        candidates,
        elf_files.len()
    );
    Ok(elf_files)
}

/// Whether `path` starts with the ELF magic. Short files are simply not ELF.
pub fn has_elf_magic(path: &Path) -> io::Result<bool> {
    let mut magic = [0u8; SELFMAG];
    let mut file = File::open(path)?;
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(&magic[..] == &ELFMAG[..]),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}

struct Walker<'a> {
    options: &'a ScanOptions,
    visited: HashSet<PathBuf>,
    found: Vec<PathBuf>,
}

impl Walker<'_> {
    fn walk_root(&mut self, root: &Path) -> Result<(), DiscoveryError> {
        let entries = self
            .read_sorted(root)
            .map_err(|source| DiscoveryError::RootUnreadable {
                path: root.to_path_buf(),
                source,
            })?;
        self.mark_visited(root);
        self.visit_entries(entries);
        Ok(())
    }

    fn walk(&mut self, dir: &Path) {
        if !self.mark_visited(dir) {
            log::debug!(target: LOG_TARGET, "{} already visited", dir.display());
            return;
        }
        match self.read_sorted(dir) {
            Ok(entries) => self.visit_entries(entries),
            Err(e) => log::warn!(target: LOG_TARGET, "Cannot read directory {}: {}", dir.display(), e),
        }
    }

    fn visit_entries(&mut self, entries: Vec<PathBuf>) {
        for path in entries {
            let metadata = match fs::symlink_metadata(&path) {
                Ok(m) => m,
                Err(e) => {
                    log::warn!(target: LOG_TARGET, "Cannot stat {}: {}", path.display(), e);
                    continue;
                }
            };

            let metadata = if metadata.file_type().is_symlink() {
                if !self.options.follow_symlinks {
                    continue;
                }
                match fs::metadata(&path) {
                    Ok(m) => m,
                    Err(e) => {
                        log::debug!(target: LOG_TARGET, "Dangling link {}: {}", path.display(), e);
                        continue;
                    }
                }
            } else {
                metadata
            };

            if metadata.is_dir() {
                self.walk(&path);
            } else if metadata.is_file() && self.name_matches(&path) {
                self.found.push(path);
            }
        }
    }

    fn name_matches(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy().contains(self.options.name_pattern.as_str()))
            .unwrap_or(false)
    }

    fn read_sorted(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut entries = fs::read_dir(dir)?
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.path()),
                Err(e) => {
                    log::warn!(target: LOG_TARGET, "Error listing {}: {}", dir.display(), e);
                    None
                }
            })
            .collect::<Vec<_>>();
        entries.sort();
        Ok(entries)
    }

    /// Returns false when `dir` was seen before; guards against symlink cycles.
    fn mark_visited(&mut self, dir: &Path) -> bool {
        let key = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        self.visited.insert(key)
    }
}
