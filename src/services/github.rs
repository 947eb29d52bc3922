//! GitHub repository statistics
//!
//! Reads stars, forks, license and last push from `/repos/{owner}/{repo}`.
//! The contributor count comes from requesting one contributor per page and
//! reading the page number of the `rel="last"` link.

use bson::DateTime;
use chrono::{DateTime as ChronoDateTime, Utc};
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, LINK};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::types::{OpenAltError, Result};

/// Statistics of one repository
#[derive(Debug, Clone, PartialEq)]
pub struct RepoStats {
    pub stars: i64,
    pub forks: i64,
    pub contributors: i64,
    /// SPDX identifier, when GitHub recognised the license
    pub license: Option<String>,
    pub pushed_at: Option<DateTime>,
}

/// Source of repository statistics
#[async_trait::async_trait]
pub trait RepoStatsSource: Send + Sync {
    async fn fetch_stats(&self, owner: &str, repo: &str) -> Result<RepoStats>;
}

/// Split a GitHub URL into `(owner, repo)`.
///
/// Accepts `https://github.com/owner/repo`, optionally with `www.`, a `.git`
/// suffix, a trailing slash or extra path segments.
pub fn parse_github_url(url: &str) -> Option<(String, String)> {
    let rest = url
        .trim()
        .strip_prefix("https://")
        .or_else(|| url.trim().strip_prefix("http://"))?;
    let rest = rest.strip_prefix("www.").unwrap_or(rest);
    let path = rest.strip_prefix("github.com/")?;

    let mut segments = path.split(['/', '?', '#']).filter(|s| !s.is_empty());
    let owner = segments.next()?;
    let repo = segments.next()?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);

    let valid = |s: &str| {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };
    if !valid(owner) || !valid(repo) {
        return None;
    }

    Some((owner.to_string(), repo.to_string()))
}

/// Page number of the `rel="last"` entry of a `Link` header
pub fn last_page_from_link(link: &str) -> Option<i64> {
    link.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        if !params.split(';').any(|p| p.trim() == "rel=\"last\"") {
            return None;
        }
        let target = target.trim().trim_start_matches('<').trim_end_matches('>');
        let query = target.split_once('?')?.1;
        query.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            if key == "page" {
                value.parse().ok()
            } else {
                None
            }
        })
    })
}

#[derive(Debug, Deserialize)]
struct RepoResponse {
    #[serde(default)]
    stargazers_count: i64,
    #[serde(default)]
    forks_count: i64,
    #[serde(default)]
    pushed_at: Option<String>,
    #[serde(default)]
    license: Option<LicenseResponse>,
}

#[derive(Debug, Deserialize)]
struct LicenseResponse {
    spdx_id: Option<String>,
}

/// GitHub REST API client
pub struct GitHubClient {
    base_url: String,
    token: Option<String>,
    http_client: reqwest::Client,
}

impl GitHubClient {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("openalt/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OpenAltError::Config(format!("Failed to build GitHub HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            http_client,
        })
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        if let Some(ref token) = self.token {
            if let Ok(value) = format!("Bearer {}", token).parse() {
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers
    }

    async fn fetch_repo(&self, owner: &str, repo: &str) -> Result<RepoResponse> {
        let url = format!("{}/repos/{}/{}", self.base_url, owner, repo);
        let response = self.http_client.get(&url).headers(self.headers()).send().await?;

        match response.status() {
            s if s.is_success() => Ok(response.json().await?),
            reqwest::StatusCode::NOT_FOUND => Err(OpenAltError::not_found(format!(
                "GitHub repository {}/{} not found",
                owner, repo
            ))),
            s => Err(OpenAltError::Upstream(format!("GitHub returned HTTP {} for {}", s, url))),
        }
    }

    async fn fetch_contributors(&self, owner: &str, repo: &str) -> Result<i64> {
        let url = format!(
            "{}/repos/{}/{}/contributors?per_page=1&anon=true",
            self.base_url, owner, repo
        );
        let response = self.http_client.get(&url).headers(self.headers()).send().await?;

        // 204 is returned for empty repositories
        if response.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(0);
        }
        if !response.status().is_success() {
            return Err(OpenAltError::Upstream(format!(
                "GitHub returned HTTP {} for {}",
                response.status(),
                url
            )));
        }

        let last_page = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(last_page_from_link);

        match last_page {
            Some(pages) => Ok(pages),
            // No pagination: zero or one contributor on the single page
            None => {
                let page: Vec<serde_json::Value> = response.json().await?;
                Ok(page.len() as i64)
            }
        }
    }
}

#[async_trait::async_trait]
impl RepoStatsSource for GitHubClient {
    async fn fetch_stats(&self, owner: &str, repo: &str) -> Result<RepoStats> {
        let info = self.fetch_repo(owner, repo).await?;
        let contributors = self.fetch_contributors(owner, repo).await?;

        let pushed_at = info
            .pushed_at
            .as_deref()
            .and_then(|s| s.parse::<ChronoDateTime<Utc>>().ok())
            .map(DateTime::from_chrono);

        let license = info
            .license
            .and_then(|l| l.spdx_id)
            .filter(|id| id != "NOASSERTION");

        debug!(owner, repo, stars = info.stargazers_count, contributors, "Fetched GitHub stats");

        Ok(RepoStats {
            stars: info.stargazers_count,
            forks: info.forks_count,
            contributors,
            license,
            pushed_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_keeps_configuration() {
        let client = GitHubClient::new(
            "https://github.example.com/api/",
            Some(String::new()),
            Duration::from_secs(2),
        )
        .unwrap();
        assert_eq!(client.base_url, "https://github.example.com/api");
        assert!(client.token.is_none());
        assert!(!client.headers().contains_key(AUTHORIZATION));
    }

    #[test]
    fn test_parse_github_url() {
        let expected = Some(("gimp".to_string(), "gimp".to_string()));
        assert_eq!(parse_github_url("https://github.com/gimp/gimp"), expected);
        assert_eq!(parse_github_url("https://github.com/gimp/gimp.git"), expected);
        assert_eq!(parse_github_url("https://www.github.com/gimp/gimp/"), expected);
        assert_eq!(parse_github_url("http://github.com/gimp/gimp/tree/master"), expected);
        assert_eq!(
            parse_github_url("https://github.com/nextcloud/server?tab=readme"),
            Some(("nextcloud".to_string(), "server".to_string()))
        );
    }

    #[test]
    fn test_parse_github_url_rejects() {
        assert_eq!(parse_github_url("https://gitlab.com/gimp/gimp"), None);
        assert_eq!(parse_github_url("https://github.com/gimp"), None);
        assert_eq!(parse_github_url("github.com/gimp/gimp"), None);
        assert_eq!(parse_github_url("https://github.com/gi mp/gimp"), None);
    }

    #[test]
    fn test_last_page_from_link() {
        let link = r#"<https://api.github.com/repositories/1/contributors?per_page=1&anon=true&page=2>; rel="next", <https://api.github.com/repositories/1/contributors?per_page=1&anon=true&page=318>; rel="last""#;
        assert_eq!(last_page_from_link(link), Some(318));

        let no_last = r#"<https://api.github.com/x?page=1>; rel="prev""#;
        assert_eq!(last_page_from_link(no_last), None);
        assert_eq!(last_page_from_link(""), None);
    }
}
