// Target URL handling: FUZZ templates and path-append mode

use crate::error::{FuzzError, Result};
use crate::frontier::{FrontierEntry, normalize_url};
use url::Url;

pub const FUZZ_KEYWORD: &str = "FUZZ";

/// How a wordlist token is placed into a URL, decided once from the raw target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlStrategy {
    /// The target contains `FUZZ`; every occurrence is replaced literally.
    Template(String),
    /// The target is a base path; tokens are appended as a new path segment.
    PathAppend,
}

#[derive(Debug, Clone)]
pub struct Target {
    start_url: String,
    strategy: UrlStrategy,
    add_slash: bool,
}

impl Target {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let invalid = |reason: String| FuzzError::InvalidTarget {
            url: raw.to_string(),
            reason,
        };

        let (start_url, strategy) = if raw.contains(FUZZ_KEYWORD) {
            // probe with a harmless token so the substituted form is what gets validated
            Url::parse(&raw.replace(FUZZ_KEYWORD, "delve")).map_err(|e| invalid(e.to_string()))?;
            (
                normalize_url(&raw.replace(FUZZ_KEYWORD, "")),
                UrlStrategy::Template(raw.to_string()),
            )
        } else {
            Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
            (normalize_url(raw), UrlStrategy::PathAppend)
        };

        Ok(Self {
            start_url,
            strategy,
            add_slash: false,
        })
    }

    /// Append a trailing `/` to path-append URLs (directory probing).
    pub fn with_add_slash(mut self, add_slash: bool) -> Self {
        self.add_slash = add_slash;
        self
    }

    /// Normalized root of the traversal.
    pub fn start_url(&self) -> &str {
        &self.start_url
    }

    pub fn strategy(&self) -> &UrlStrategy {
        &self.strategy
    }

    /// Build the request URL for `word` under `entry`.
    ///
    /// Templates only apply at the root; discovered directories are always
    /// extended by path-append.
    pub fn build_url(&self, entry: &FrontierEntry, word: &str) -> String {
        match &self.strategy {
            UrlStrategy::Template(template) if entry.depth == 1 => {
                template.replace(FUZZ_KEYWORD, word)
            }
            _ => {
                let mut url = format!("{}/{}", entry.url, word.trim_start_matches('/'));
                if self.add_slash && !url.ends_with('/') {
                    url.push('/');
                }
                url
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_target() {
        let target = Target::parse("https://x/FUZZ").unwrap();
        assert_eq!(target.start_url(), "https://x");
        assert!(matches!(target.strategy(), UrlStrategy::Template(_)));

        let root = FrontierEntry::new(target.start_url(), 1);
        assert_eq!(target.build_url(&root, "admin"), "https://x/admin");
    }

    #[test]
    fn test_template_with_suffix() {
        let target = Target::parse("https://x/api/FUZZ.json").unwrap();
        let root = FrontierEntry::new(target.start_url(), 1);
        assert_eq!(target.build_url(&root, "users"), "https://x/api/users.json");
    }

    #[test]
    fn test_template_only_applies_at_root() {
        let target = Target::parse("https://x/FUZZ").unwrap();
        let nested = FrontierEntry::new("https://x/admin", 2);
        assert_eq!(target.build_url(&nested, "login"), "https://x/admin/login");
    }

    #[test]
    fn test_path_append_strips_leading_slash() {
        let target = Target::parse("https://x/base/").unwrap();
        assert_eq!(target.start_url(), "https://x/base");
        assert_eq!(target.strategy(), &UrlStrategy::PathAppend);

        let root = FrontierEntry::new(target.start_url(), 1);
        assert_eq!(target.build_url(&root, "/admin"), "https://x/base/admin");
    }

    #[test]
    fn test_add_slash() {
        let target = Target::parse("https://x").unwrap().with_add_slash(true);
        let root = FrontierEntry::new(target.start_url(), 1);
        assert_eq!(target.build_url(&root, "admin"), "https://x/admin/");
        assert_eq!(target.build_url(&root, "docs/"), "https://x/docs/");
    }

    #[test]
    fn test_invalid_target() {
        assert!(matches!(
            Target::parse("not a url"),
            Err(FuzzError::InvalidTarget { .. })
        ));
    }
}
