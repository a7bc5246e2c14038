use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use url::Url;

use crate::error::{LoomError, Result};

const SHARE_HOST: &str = "loom.com";

static SLUGGED_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|-)([0-9a-f]{32})$").expect("valid regex"));
static PLAIN_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("valid regex"));

/// A validated share URL and the video identifier it points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    pub id: String,
    pub url: String,
}

impl ShareLink {
    /// Parse a share URL of the form `https://www.loom.com/share/<id>`.
    ///
    /// `/embed/<id>` links are accepted too. Query strings and fragments are
    /// ignored, and a title slug in front of the identifier is stripped.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let url = Url::parse(trimmed)
            .map_err(|e| LoomError::InvalidInput(format!("'{}' is not a valid URL: {}", trimmed, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(LoomError::InvalidInput(format!(
                "unsupported URL scheme '{}' in '{}'",
                url.scheme(),
                trimmed
            )));
        }

        let host = url.host_str().unwrap_or_default();
        if host != SHARE_HOST && !host.ends_with(&format!(".{}", SHARE_HOST)) {
            return Err(LoomError::InvalidInput(format!(
                "'{}' is not a Loom share link",
                trimmed
            )));
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        let id = match segments.as_slice() {
            [kind, segment] if matches!(*kind, "share" | "embed") => extract_id(segment),
            _ => None,
        }
        .ok_or_else(|| {
            LoomError::InvalidInput(format!(
                "expected https://www.loom.com/share/[ID], got '{}'",
                trimmed
            ))
        })?;

        Ok(Self {
            id,
            url: trimmed.to_string(),
        })
    }
}

fn extract_id(segment: &str) -> Option<String> {
    if let Some(caps) = SLUGGED_ID.captures(segment) {
        return Some(caps[1].to_string());
    }
    if PLAIN_ID.is_match(segment) {
        return Some(segment.to_string());
    }
    None
}

impl fmt::Display for ShareLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_parse_plain_share_link() {
        let link = ShareLink::parse(&format!("https://www.loom.com/share/{}", ID)).unwrap();
        assert_eq!(link.id, ID);
    }

    #[test]
    fn test_parse_ignores_query_and_fragment() {
        let link =
            ShareLink::parse(&format!("https://www.loom.com/share/{}?sid=42#t=10", ID)).unwrap();
        assert_eq!(link.id, ID);
        assert!(link.url.contains("sid=42"));
    }

    #[test]
    fn test_parse_embed_and_trailing_slash() {
        let link = ShareLink::parse(&format!("https://loom.com/embed/{}/", ID)).unwrap();
        assert_eq!(link.id, ID);
    }

    #[test]
    fn test_parse_strips_title_slug() {
        let link =
            ShareLink::parse(&format!("https://www.loom.com/share/weekly-demo-{}", ID)).unwrap();
        assert_eq!(link.id, ID);
    }

    #[test]
    fn test_parse_rejects_other_hosts() {
        let err = ShareLink::parse(&format!("https://example.com/share/{}", ID)).unwrap_err();
        assert!(matches!(err, LoomError::InvalidInput(_)));

        // Suffix match must be on a label boundary
        assert!(ShareLink::parse(&format!("https://notloom.com/share/{}", ID)).is_err());
    }

    #[test]
    fn test_parse_rejects_malformed_links() {
        for input in [
            "",
            "not a url",
            "ftp://www.loom.com/share/abc",
            "https://www.loom.com/",
            "https://www.loom.com/looms/videos",
            "https://www.loom.com/share/abc/extra",
            "https://www.loom.com/share/bad%20id",
        ] {
            let result = ShareLink::parse(input);
            assert!(
                matches!(result, Err(LoomError::InvalidInput(_))),
                "expected InvalidInput for {:?}",
                input
            );
        }
    }
}
