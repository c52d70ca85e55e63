// Passive mining of candidate tokens from fetched pages

use crate::error::Result;
use crate::wordlist::{WordlistAppender, load_existing_tokens};
use delve_scanner::PageSnapshot;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::io;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9_./-]+").expect("valid token pattern"));

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("failed to append to passive wordlist: {0}")]
    Io(#[from] io::Error),
}

/// Tokens already written this run (or preloaded from the output file).
#[derive(Debug, Clone, Default)]
pub struct SeenTokens {
    tokens: HashSet<String>,
}

impl SeenTokens {
    pub fn insert(&mut self, token: impl Into<String>) -> bool {
        self.tokens.insert(token.into())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SeenTokens {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Mine maximal `[A-Za-z0-9_./-]` runs from page text, link attributes and script
/// bodies. Returns only tokens absent from `seen`, sorted and without duplicates.
pub fn extract_tokens(
    text: &str,
    link_attributes: &[Option<String>],
    script_bodies: &[String],
    seen: &SeenTokens,
) -> Vec<String> {
    let sources = std::iter::once(text)
        .chain(link_attributes.iter().flatten().map(String::as_str))
        .chain(script_bodies.iter().map(String::as_str));

    let mut fresh = BTreeSet::new();
    for source in sources {
        for token in TOKEN_PATTERN.find_iter(source) {
            let token = token.as_str();
            if !seen.contains(token) {
                fresh.insert(token.to_string());
            }
        }
    }

    fresh.into_iter().collect()
}

/// Owns the seen set and the output file; every new token is persisted then
/// marked seen so it is never emitted twice in one run.
pub struct PassiveMiner {
    seen: SeenTokens,
    sink: WordlistAppender,
}

impl PassiveMiner {
    pub fn open(output: &Path, preload: bool) -> Result<Self> {
        let seen = if preload {
            let existing: SeenTokens = load_existing_tokens(output)?.into_iter().collect();
            debug!(
                "Preloaded {} passive tokens from {}",
                existing.len(),
                output.display()
            );
            existing
        } else {
            SeenTokens::default()
        };

        Ok(Self {
            seen,
            sink: WordlistAppender::open(output)?,
        })
    }

    pub fn mine(
        &mut self,
        snapshot: &PageSnapshot,
    ) -> std::result::Result<Vec<String>, ExtractionError> {
        let tokens = extract_tokens(
            &snapshot.visible_text,
            &snapshot.link_attributes,
            &snapshot.script_bodies,
            &self.seen,
        );

        for token in &tokens {
            self.sink.append(token)?;
            self.seen.insert(token.as_str());
        }

        Ok(tokens)
    }

    pub fn seen(&self) -> &SeenTokens {
        &self.seen
    }

    pub fn output_path(&self) -> &Path {
        self.sink.path()
    }
}
