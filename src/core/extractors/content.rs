use crate::domain::model::{Lean, Page, Signal};
use crate::domain::ports::PageFetcher;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

pub const ANCHOR_THRESHOLD: usize = 20;
pub const EXTERNAL_LINK_THRESHOLD: usize = 10;
pub const REDIRECT_THRESHOLD: usize = 1;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+").expect("valid email pattern")
});

static FAVICON: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"link[rel~="icon"]"#).expect("valid favicon selector"));
static SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("valid script selector"));
static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("valid anchor selector"));
static LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid link selector"));
static IFRAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("iframe").expect("valid iframe selector"));

/// 取得頁面後套用判斷；任何抓取失敗都視為不確定
async fn inspect_page<F>(fetcher: &F, url: &str, check: &str, inspect: impl FnOnce(&Page) -> Signal) -> Signal
where
    F: PageFetcher + ?Sized,
{
    match fetcher.fetch(url).await {
        Ok(page) => {
            tracing::debug!(
                "{} check on {} (HTTP {}, {} redirects)",
                check,
                page.final_url,
                page.status,
                page.redirects
            );
            inspect(&page)
        }
        Err(e) => {
            tracing::debug!("{} lookup failed for {}: {}", check, url, e);
            Signal::Indeterminate
        }
    }
}

// Html is not Send, so parsing stays inside these synchronous helpers.

fn has_favicon_link(body: &str) -> bool {
    Html::parse_document(body).select(&FAVICON).next().is_some()
}

fn scripts_reference_http(body: &str) -> bool {
    Html::parse_document(body)
        .select(&SCRIPT)
        .any(|script| script.text().collect::<String>().contains("http"))
}

fn anchor_count(body: &str) -> usize {
    Html::parse_document(body).select(&ANCHOR).count()
}

fn outbound_link_count(body: &str) -> usize {
    Html::parse_document(body)
        .select(&LINK)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| !href.starts_with('#'))
        .count()
}

fn has_iframe_element(body: &str) -> bool {
    Html::parse_document(body).select(&IFRAME).next().is_some()
}

pub async fn has_favicon<F: PageFetcher + ?Sized>(fetcher: &F, url: &str) -> Signal {
    inspect_page(fetcher, url, "favicon", |page| {
        Signal::indicator(has_favicon_link(&page.body), Lean::Legitimate)
    })
    .await
}

pub async fn count_links_in_scripts<F: PageFetcher + ?Sized>(fetcher: &F, url: &str) -> Signal {
    inspect_page(fetcher, url, "script links", |page| {
        Signal::indicator(scripts_reference_http(&page.body), Lean::Phishing)
    })
    .await
}

pub async fn count_links_in_anchors<F: PageFetcher + ?Sized>(fetcher: &F, url: &str) -> Signal {
    inspect_page(fetcher, url, "anchors", |page| {
        Signal::indicator(anchor_count(&page.body) > ANCHOR_THRESHOLD, Lean::Legitimate)
    })
    .await
}

pub async fn has_popup_window<F: PageFetcher + ?Sized>(fetcher: &F, url: &str) -> Signal {
    inspect_page(fetcher, url, "popup", |page| {
        Signal::indicator(page.body.contains("window.open"), Lean::Phishing)
    })
    .await
}

pub async fn has_iframe<F: PageFetcher + ?Sized>(fetcher: &F, url: &str) -> Signal {
    inspect_page(fetcher, url, "iframe", |page| {
        Signal::indicator(has_iframe_element(&page.body), Lean::Phishing)
    })
    .await
}

pub async fn website_forwarding<F: PageFetcher + ?Sized>(fetcher: &F, url: &str) -> Signal {
    inspect_page(fetcher, url, "forwarding", |page| {
        Signal::indicator(page.redirects > REDIRECT_THRESHOLD, Lean::Phishing)
    })
    .await
}

pub async fn status_bar_customization<F: PageFetcher + ?Sized>(fetcher: &F, url: &str) -> Signal {
    inspect_page(fetcher, url, "status bar", |page| {
        Signal::indicator(page.body.contains("window.status"), Lean::Phishing)
    })
    .await
}

pub async fn disable_right_click<F: PageFetcher + ?Sized>(fetcher: &F, url: &str) -> Signal {
    inspect_page(fetcher, url, "right click", |page| {
        Signal::indicator(page.body.contains("event.button==2"), Lean::Phishing)
    })
    .await
}

pub async fn has_info_email<F: PageFetcher + ?Sized>(fetcher: &F, url: &str) -> Signal {
    inspect_page(fetcher, url, "email", |page| {
        Signal::indicator(EMAIL.is_match(&page.body), Lean::Phishing)
    })
    .await
}

pub async fn count_links_pointing_to_page<F: PageFetcher + ?Sized>(fetcher: &F, url: &str) -> Signal {
    inspect_page(fetcher, url, "outbound links", |page| {
        Signal::indicator(
            outbound_link_count(&page.body) > EXTERNAL_LINK_THRESHOLD,
            Lean::Legitimate,
        )
    })
    .await
}
