// Wordlist input and the append-only passive wordlist

use crate::error::{FuzzError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::{Path, PathBuf};

/// Load wordlist from file, preserving order. Blank lines are skipped.
pub fn load_wordlist(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| {
        FuzzError::Wordlist(format!("Failed to read wordlist {}: {}", path.display(), e))
    })?;

    let words = parse_wordlist(&content);
    if words.is_empty() {
        return Err(FuzzError::Wordlist(format!(
            "Wordlist {} is empty",
            path.display()
        )));
    }

    Ok(words)
}

pub fn parse_wordlist(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Tokens already present in a passive output file. A missing file is empty.
pub fn load_existing_tokens(path: &Path) -> Result<Vec<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(parse_wordlist(&content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

/// Appends one token per line, flushing each line as it is written so an
/// interrupted run never leaves a partial batch behind.
pub struct WordlistAppender {
    path: PathBuf,
    writer: LineWriter<File>,
}

impl WordlistAppender {
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: LineWriter::new(file),
        })
    }

    pub fn append(&mut self, token: &str) -> io::Result<()> {
        writeln!(self.writer, "{}", token)?;
        self.writer.flush()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
