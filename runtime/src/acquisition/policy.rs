// Copyright 2026 Websift Contributors
// SPDX-License-Identifier: Apache-2.0

//! Advisory robots.txt check.
//!
//! The outcome is logged and returned, never enforced: a disallowed path
//! still gets scraped. An unreachable robots.txt means "unrestricted".

use super::http_client::HttpClient;
use crate::extraction::BROWSER_USER_AGENT;
use std::collections::BTreeMap;
use tracing::{debug, warn};
use url::Url;

/// Timeout for the robots.txt fetch.
pub const ROBOTS_TIMEOUT_MS: u64 = 5_000;

/// User-agent tokens whose sections apply to this service.
const AGENT_TOKENS: [&str; 2] = ["*", "educational"];

/// Result of evaluating a site's crawl directives for one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyOutcome {
    /// robots.txt missing, non-200, or unreachable.
    Unreachable,
    /// No applicable rule matches the target path.
    Allowed,
    /// An applicable `Disallow` rule covers the target path.
    Disallowed { rule: String },
}

/// Fetches and interprets robots.txt for target URLs.
#[derive(Clone)]
pub struct PolicyChecker {
    http: HttpClient,
}

impl PolicyChecker {
    pub fn new() -> Self {
        Self {
            http: HttpClient::new(BROWSER_USER_AGENT, ROBOTS_TIMEOUT_MS),
        }
    }

    /// Check `target` against its site's robots.txt. Never fails.
    pub async fn check(&self, target: &Url) -> PolicyOutcome {
        let Some(robots_url) = robots_url(target) else {
            return PolicyOutcome::Unreachable;
        };

        let body = match self
            .http
            .get(robots_url.as_str(), &BTreeMap::new(), ROBOTS_TIMEOUT_MS)
            .await
        {
            Ok(resp) if resp.status == 200 => resp.body,
            Ok(resp) => {
                debug!(url = %robots_url, status = resp.status, "robots.txt not usable");
                return PolicyOutcome::Unreachable;
            }
            Err(e) => {
                debug!(url = %robots_url, "could not access robots.txt: {e}");
                return PolicyOutcome::Unreachable;
            }
        };

        let outcome = evaluate_directives(&body, target.path());
        if let PolicyOutcome::Disallowed { rule } = &outcome {
            warn!(url = %target, rule = %rule, "robots.txt disallows scraping this URL");
        }
        outcome
    }
}

impl Default for PolicyChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// `/robots.txt` on the target's origin.
pub fn robots_url(target: &Url) -> Option<Url> {
    if !matches!(target.scheme(), "http" | "https") {
        return None;
    }
    let mut robots = target.clone();
    robots.set_path("/robots.txt");
    robots.set_query(None);
    robots.set_fragment(None);
    Some(robots)
}

/// Evaluate robots.txt `content` for `path`.
///
/// Matching is case-insensitive. A section applies when its user-agent value
/// mentions `*` or `educational`; the first applicable `Disallow` that is `/`
/// or a prefix of `path` decides.
pub fn evaluate_directives(content: &str, path: &str) -> PolicyOutcome {
    let path = path.to_ascii_lowercase();
    let mut section_applies = false;

    for raw in content.lines() {
        let line = raw.split('#').next().unwrap_or("").trim().to_ascii_lowercase();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "user-agent" => {
                section_applies = AGENT_TOKENS.iter().any(|token| value.contains(token));
            }
            "disallow" if section_applies => {
                if value == "/" || (!value.is_empty() && path.starts_with(value)) {
                    return PolicyOutcome::Disallowed {
                        rule: value.to_string(),
                    };
                }
            }
            _ => {}
        }
    }

    PolicyOutcome::Allowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_robots_url_replaces_path_query_fragment() {
        let target = Url::parse("https://example.com:8443/a/b?x=1#frag").unwrap();
        assert_eq!(
            robots_url(&target).unwrap().as_str(),
            "https://example.com:8443/robots.txt"
        );
        assert!(robots_url(&Url::parse("data:text/html,hi").unwrap()).is_none());
    }

    #[test]
    fn test_wildcard_section_disallow_prefix() {
        let robots = "User-agent: *\nDisallow: /private\n";
        assert_eq!(
            evaluate_directives(robots, "/private/page"),
            PolicyOutcome::Disallowed {
                rule: "/private".into()
            }
        );
        assert_eq!(evaluate_directives(robots, "/public"), PolicyOutcome::Allowed);
    }

    #[test]
    fn test_root_disallow_blocks_everything() {
        let robots = "user-agent: EducationalBot\nDisallow: /\n";
        assert!(matches!(
            evaluate_directives(robots, "/anything"),
            PolicyOutcome::Disallowed { .. }
        ));
    }

    #[test]
    fn test_other_agents_and_empty_disallow_are_ignored() {
        let robots = "\
# comments are skipped
User-agent: Googlebot
Disallow: /

User-agent: *
Disallow:
Disallow: /tmp # trailing comment
";
        assert_eq!(evaluate_directives(robots, "/docs"), PolicyOutcome::Allowed);
        assert!(matches!(
            evaluate_directives(robots, "/tmp/x"),
            PolicyOutcome::Disallowed { .. }
        ));
    }

    #[tokio::test]
    async fn test_check_fetches_robots_from_origin() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /admin"))
            .mount(&server)
            .await;

        let checker = PolicyChecker::new();
        let blocked = Url::parse(&format!("{}/admin/panel", server.uri())).unwrap();
        let open = Url::parse(&format!("{}/blog", server.uri())).unwrap();
        assert!(matches!(
            checker.check(&blocked).await,
            PolicyOutcome::Disallowed { .. }
        ));
        assert_eq!(checker.check(&open).await, PolicyOutcome::Allowed);
    }

    #[tokio::test]
    async fn test_missing_robots_is_unrestricted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let target = Url::parse(&format!("{}/page", server.uri())).unwrap();
        assert_eq!(
            PolicyChecker::new().check(&target).await,
            PolicyOutcome::Unreachable
        );
    }
}
