use crate::domain::ports::SearchEngine;
use crate::utils::error::{LookupError, LookupResult};
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.google.com/search";
pub const DEFAULT_RESULT_SELECTOR: &str = "div.g";

static RESULT_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid link selector"));
static RESULT_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h3").expect("valid title selector"));

/// Scrapes a search results page. A result is a block matching the
/// configured selector that holds both a link and an `<h3>` title.
#[derive(Debug, Clone)]
pub struct WebSearch {
    client: Client,
    endpoint: String,
    result_selector: Selector,
    user_agent: String,
}

impl WebSearch {
    pub fn new(
        endpoint: impl Into<String>,
        result_selector: &str,
        timeout: Duration,
        user_agent: impl Into<String>,
    ) -> LookupResult<Self> {
        let result_selector = Selector::parse(result_selector).map_err(|e| {
            LookupError::Malformed(format!("invalid result selector '{}': {}", result_selector, e))
        })?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            result_selector,
            user_agent: user_agent.into(),
        })
    }

    fn result_links(&self, html: &str, limit: usize) -> Vec<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.result_selector)
            .filter_map(|block| {
                let link = block.select(&RESULT_LINK).next()?;
                block.select(&RESULT_TITLE).next()?;
                link.value().attr("href").map(str::to_string)
            })
            .take(limit)
            .collect()
    }
}

#[async_trait]
impl SearchEngine for WebSearch {
    async fn search(&self, query: &str, num_results: usize) -> LookupResult<Vec<String>> {
        let num = num_results.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("num", num.as_str()), ("hl", "en")])
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let links = self.result_links(&body, num_results);
        tracing::debug!("search '{}' returned {} results", query, links.len());
        Ok(links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn results_page(count: usize) -> String {
        let blocks: String = (0..count)
            .map(|i| {
                format!(
                    r#"<div class="g"><a href="https://site{i}.example/"><h3>Result {i}</h3></a></div>"#
                )
            })
            .collect();
        format!("<html><body>{}<div class=\"g\"><a href=\"/ad\">ad</a></div></body></html>", blocks)
    }

    fn engine(server: &MockServer) -> WebSearch {
        WebSearch::new(
            server.url("/search"),
            DEFAULT_RESULT_SELECTOR,
            Duration::from_secs(5),
            "phish-detect-test",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_counts_titled_results_only() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/search")
                .query_param("q", "https://example.com")
                .query_param("num", "10");
            then.status(200).body(results_page(7));
        });

        let links = engine(&server).search("https://example.com", 10).await.unwrap();

        mock.assert();
        assert_eq!(links.len(), 7);
        assert_eq!(links[0], "https://site0.example/");
    }

    #[tokio::test]
    async fn test_caps_at_requested_count() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/search");
            then.status(200).body(results_page(4));
        });

        let links = engine(&server).search("site:https://example.com", 1).await.unwrap();
        assert_eq!(links.len(), 1);
    }

    #[tokio::test]
    async fn test_rate_limited_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/search");
            then.status(429);
        });

        let err = engine(&server).search("anything", 10).await.unwrap_err();
        assert!(matches!(err, LookupError::Status(429)));
    }

    #[test]
    fn test_invalid_selector() {
        let err = WebSearch::new("http://localhost/", "div[", Duration::from_secs(1), "ua").unwrap_err();
        assert!(matches!(err, LookupError::Malformed(_)));
    }
}
