//! Lazy input-tree traversal with output-path mirroring
//!
//! Pre-order: a directory is yielded before the images inside it, and those
//! before its subdirectories. Entries are sorted by name.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use crate::trim::{Result, TrimError};

/// Recognized image extensions (compared case-insensitively)
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Check whether a path has a supported image extension
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// One image to trim and where its crop goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Item yielded by [`TreeWalker`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEntry {
    /// A directory to mirror
    Directory { input: PathBuf, output: PathBuf },
    /// An image to trim
    Image(TrimJob),
}

/// Iterator over an input tree, yielding mirrored output paths
#[derive(Debug)]
pub struct TreeWalker {
    input_root: PathBuf,
    output_root: PathBuf,
    stack: Vec<PathBuf>,
    pending: VecDeque<Result<WalkEntry>>,
}

impl TreeWalker {
    /// Walk `input_root`, mirroring into `output_root`.
    ///
    /// A single image file as `input_root` yields the output root directory
    /// and one job writing to `output_root/<file name>`.
    pub fn new(input_root: &Path, output_root: &Path) -> Self {
        let mut walker = Self {
            input_root: input_root.to_path_buf(),
            output_root: output_root.to_path_buf(),
            stack: Vec::new(),
            pending: VecDeque::new(),
        };

        if input_root.is_file() {
            let parent = input_root
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            walker.pending.push_back(Ok(WalkEntry::Directory {
                input: parent,
                output: output_root.to_path_buf(),
            }));
            if let (true, Some(name)) = (is_image_file(input_root), input_root.file_name()) {
                walker.pending.push_back(Ok(WalkEntry::Image(TrimJob {
                    input: input_root.to_path_buf(),
                    output: output_root.join(name),
                })));
            }
        } else {
            walker.stack.push(input_root.to_path_buf());
        }

        walker
    }

    /// Mirrored output location of a path under the input root
    pub fn mirror(&self, input: &Path) -> PathBuf {
        match input.strip_prefix(&self.input_root) {
            Ok(rel) if rel.as_os_str().is_empty() => self.output_root.clone(),
            Ok(rel) => self.output_root.join(rel),
            Err(_) => self.output_root.clone(),
        }
    }

    /// The output root is skipped when it lives inside the input tree
    fn is_output_root(&self, dir: &Path) -> bool {
        if dir == self.output_root {
            return true;
        }
        match (fs::canonicalize(dir), fs::canonicalize(&self.output_root)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    fn expand(&mut self, dir: PathBuf) {
        self.pending.push_back(Ok(WalkEntry::Directory {
            output: self.mirror(&dir),
            input: dir.clone(),
        }));

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                self.pending.push_back(Err(TrimError::IoError(e)));
                return;
            }
        };

        let mut files = Vec::new();
        let mut subdirs = Vec::new();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    self.pending.push_back(Err(TrimError::IoError(e)));
                    continue;
                }
            };
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };

            if file_type.is_dir() {
                if !self.is_output_root(&path) {
                    subdirs.push(path);
                }
            } else if file_type.is_file() {
                files.push(path);
            } else if file_type.is_symlink() && path.is_file() {
                // Linked files are read, linked directories are not walked
                files.push(path);
            }
        }

        files.sort();
        subdirs.sort();

        for file in files.into_iter().filter(|f| is_image_file(f)) {
            let output = self.mirror(&file);
            self.pending
                .push_back(Ok(WalkEntry::Image(TrimJob { input: file, output })));
        }

        self.stack.extend(subdirs.into_iter().rev());
    }
}

impl Iterator for TreeWalker {
    type Item = Result<WalkEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.pending.pop_front() {
                return Some(entry);
            }
            let dir = self.stack.pop()?;
            self.expand(dir);
        }
    }
}
