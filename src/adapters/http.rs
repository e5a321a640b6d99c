use crate::domain::model::Page;
use crate::domain::ports::PageFetcher;
use crate::utils::error::{LookupError, LookupResult};
use async_trait::async_trait;
use reqwest::header::{LOCATION, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;
use url::Url;

pub const MAX_REDIRECTS: usize = 30;

/// Fetches pages with a bounded timeout. Redirects are followed by hand so
/// the number of hops is known.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
    user_agent: String,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration, user_agent: impl Into<String>) -> LookupResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            client,
            user_agent: user_agent.into(),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> LookupResult<Page> {
        let mut current =
            Url::parse(url).map_err(|e| LookupError::InvalidTarget(format!("{}: {}", url, e)))?;
        let mut redirects = 0;

        loop {
            tracing::debug!("GET {}", current);
            let response = self
                .client
                .get(current.clone())
                .header(USER_AGENT, &self.user_agent)
                .send()
                .await?;
            let status = response.status();

            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);

            match location {
                Some(location) if status.is_redirection() => {
                    if redirects >= MAX_REDIRECTS {
                        return Err(LookupError::Malformed(format!(
                            "exceeded {} redirects",
                            MAX_REDIRECTS
                        )));
                    }
                    current = current.join(&location).map_err(|e| {
                        LookupError::Malformed(format!("bad redirect target '{}': {}", location, e))
                    })?;
                    redirects += 1;
                }
                _ => {
                    // 錯誤狀態碼仍讀取內容，只有傳輸失敗才算查詢失敗
                    let body = response.text().await?;
                    return Ok(Page {
                        final_url: current.to_string(),
                        status: status.as_u16(),
                        redirects,
                        body,
                    });
                }
            }
        }
    }
}
