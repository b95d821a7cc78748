//! Wikipedia summary client
//!
//! Fetches a short encyclopedic summary for a recipe title from the
//! Wikipedia REST API. "Not found", "gone" and server errors are expected
//! outcomes and resolve to `None`, never an error.
//!
//! Cocktail names collide with bands, films and towns, so two guards keep
//! unrelated summaries out:
//! - a disambiguation page redirects once through the related-pages list,
//!   picking the first title that mentions a beverage keyword; a second
//!   disambiguation page resolves to `None`;
//! - a direct hit is only accepted when the title or the extract mentions a
//!   beverage keyword.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("barkeep/", env!("CARGO_PKG_VERSION"));

/// Phrases that mark a disambiguation extract (matched case-insensitively)
const DISAMBIGUATION_MARKERS: [&str; 2] = ["may refer to", "refer to:"];

/// Beverage-domain keywords, shared by the disambiguation pick and the
/// relevance gate
const DOMAIN_KEYWORDS: [&str; 26] = [
    "cocktail",
    "drink",
    "beverage",
    "alcohol",
    "liqueur",
    "spirit",
    "mixed",
    "punch",
    "shot",
    "sour",
    "highball",
    "lowball",
    "martini",
    "fizz",
    "sling",
    "cooler",
    "flip",
    "smash",
    "spritz",
    "colada",
    "daiquiri",
    "margarita",
    "mojito",
    "negroni",
    "manhattan",
    "old fashioned",
];

/// Source of optional encyclopedic summaries, keyed by exact title
#[async_trait]
pub trait SummarySource: Send + Sync {
    /// Short summary for the title, or `None` when unavailable or when the
    /// best match is not a beverage topic
    async fn summary(&self, title: &str, cancel: &CancellationToken) -> Option<String>;
}

/// Wikipedia REST API client
pub struct WikipediaClient {
    http_client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    extract: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RelatedResponse {
    pages: Option<Vec<RelatedPage>>,
}

#[derive(Debug, Deserialize)]
struct RelatedPage {
    title: String,
}

impl WikipediaClient {
    pub fn new(base_url: &str, timeout: Duration) -> crate::Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| crate::Error::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET `{base}/{endpoint}/{title}`, degrading every failure to `None`
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        title: &str,
        cancel: &CancellationToken,
    ) -> Option<T> {
        let url = format!("{}/{}/{}", self.base_url, endpoint, urlencode(title));

        let response = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(url = %url, "summary request cancelled");
                return None;
            }
            resp = self.http_client.get(&url).send() => resp,
        };

        let response = match response {
            Ok(resp) => resp,
            Err(e) => {
                warn!(url = %url, error = %e, "summary request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            // 404/410 are the normal no-article answers; anything else is
            // still just an absent summary
            if status.as_u16() != 404 && status.as_u16() != 410 {
                warn!(url = %url, status = %status, "summary lookup returned error status");
            }
            return None;
        }

        let payload = tokio::select! {
            _ = cancel.cancelled() => return None,
            body = response.json::<T>() => body,
        };

        match payload {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(url = %url, error = %e, "summary payload failed to parse");
                None
            }
        }
    }

    /// First related page title that mentions a beverage keyword
    async fn related_beverage_title(
        &self,
        title: &str,
        cancel: &CancellationToken,
    ) -> Option<String> {
        self.get_json::<RelatedResponse>("page/related", title, cancel)
            .await
            .and_then(|rel| rel.pages)
            .unwrap_or_default()
            .into_iter()
            .map(|page| page.title)
            .find(|candidate| mentions_domain_keyword(candidate))
    }
}

#[async_trait]
impl SummarySource for WikipediaClient {
    async fn summary(&self, title: &str, cancel: &CancellationToken) -> Option<String> {
        let mut current_title = title.to_string();

        // At most one disambiguation redirect: a disambiguation page that
        // leads to another disambiguation page yields no summary.
        for redirects_left in (0..2).rev() {
            let extract = self
                .get_json::<SummaryResponse>("page/summary", &current_title, cancel)
                .await
                .and_then(|resp| resp.extract)
                .filter(|extract| !extract.trim().is_empty())?;

            if is_disambiguation(&extract) {
                if redirects_left == 0 {
                    debug!(title = %current_title, "second disambiguation page, giving up");
                    return None;
                }
                current_title = self.related_beverage_title(&current_title, cancel).await?;
                debug!(title = %title, redirect = %current_title, "following disambiguation");
                continue;
            }

            if !mentions_domain_keyword(&current_title) && !mentions_domain_keyword(&extract) {
                debug!(title = %current_title, "summary is not a beverage topic, discarding");
                return None;
            }

            return Some(extract);
        }

        None
    }
}

fn is_disambiguation(extract: &str) -> bool {
    let extract = extract.to_lowercase();
    DISAMBIGUATION_MARKERS
        .iter()
        .any(|marker| extract.contains(marker))
}

fn mentions_domain_keyword(text: &str) -> bool {
    let text = text.to_lowercase();
    DOMAIN_KEYWORDS.iter().any(|keyword| text.contains(keyword))
}

/// Percent-encode a title for a path segment
fn urlencode(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for byte in title.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disambiguation_markers_match_case_insensitively() {
        assert!(is_disambiguation("Foo may refer to several things."));
        assert!(is_disambiguation("Foo May Refer To:"));
        assert!(is_disambiguation("Things that refer to: Foo"));
        assert!(!is_disambiguation("A refreshing highball from Cuba."));
    }

    #[test]
    fn keyword_gate_accepts_title_or_extract_mentions() {
        // title mentions a keyword
        assert!(mentions_domain_keyword("Mojito (cocktail)"));
        // extract mentions a keyword
        assert!(mentions_domain_keyword("A mixed drink from Havana."));
        // neither
        assert!(!mentions_domain_keyword("Foo (band)"));
        assert!(!mentions_domain_keyword("Bar (city)"));
    }

    #[test]
    fn related_pick_takes_first_beverage_title() {
        let candidates = ["Foo (band)", "Mojito (cocktail)", "Daiquiri (drink)"];
        let picked = candidates
            .iter()
            .find(|c| mentions_domain_keyword(c))
            .copied();
        assert_eq!(picked, Some("Mojito (cocktail)"));
    }

    #[test]
    fn related_pick_is_none_without_beverage_titles() {
        let candidates = ["Foo (band)", "Bar (city)"];
        assert!(!candidates.iter().any(|c| mentions_domain_keyword(c)));
    }

    #[test]
    fn titles_are_percent_encoded_for_the_path() {
        assert_eq!(urlencode("Old Fashioned"), "Old%20Fashioned");
        assert_eq!(urlencode("Piña colada"), "Pi%C3%B1a%20colada");
        assert_eq!(urlencode("B-52"), "B-52");
    }
}
