//! Shop information extraction from restaurant listing pages.
//!
//! Given a URL a user pasted (a Tabelog page, a Ramen Database entry, a
//! Google Maps place...), fetch the page server-side and pull out the shop
//! name and address. Known sites get dedicated patterns; anything else falls
//! back to OGP / `<title>` and JSON-LD address fields.

use std::sync::LazyLock;
use std::time::Duration;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use regex::Regex;
use reqwest::{
    Client,
    header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, HeaderMap, HeaderValue},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::config::ShopInfoSettings;
use crate::prefecture::extract_prefecture;

/// Extracted shop information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopInfo {
    /// Shop name.
    pub name: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// Prefecture derived from the address.
    pub prefecture: Option<String>,
    /// Which extractor produced the result.
    pub source: ShopSource,
    /// The URL the information was extracted from.
    pub url: String,
}

/// Known source sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShopSource {
    Tabelog,
    RamenDb,
    Retty,
    GoogleMaps,
    Generic,
}

impl ShopSource {
    /// Detect the source site from a URL host.
    #[must_use]
    pub fn detect(url: &Url) -> Self {
        let host = url.host_str().unwrap_or_default().to_lowercase();
        if host == "tabelog.com" || host.ends_with(".tabelog.com") {
            Self::Tabelog
        } else if host == "ramendb.supleks.jp" {
            Self::RamenDb
        } else if host == "retty.me" || host.ends_with(".retty.me") {
            Self::Retty
        } else if ((host.starts_with("www.google.") || host.starts_with("maps.google."))
            && url.path().starts_with("/maps"))
            || host == "maps.app.goo.gl"
        {
            Self::GoogleMaps
        } else {
            Self::Generic
        }
    }
}

/// Shop-info fetch errors.
#[derive(Debug, Error)]
pub enum ShopInfoError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Source returned HTTP {0}")]
    UpstreamStatus(u16),

    #[error("Failed to fetch page: {0}")]
    Transport(String),
}

impl ShopInfoError {
    /// HTTP status reported to the caller.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidUrl(_) | Self::UpstreamStatus(_) => StatusCode::BAD_REQUEST,
            Self::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ShopInfoError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Shop info fetch failed");
        } else {
            tracing::debug!(error = %self, "Shop info request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// Generic metadata
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex"));

static OG_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<meta[^>]+property=["']og:title["'][^>]+content=["']([^"']*)["']"#)
        .expect("valid regex")
});

static OG_TITLE_RE2: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<meta[^>]+content=["']([^"']*)["'][^>]+property=["']og:title["']"#)
        .expect("valid regex")
});

static OG_ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<meta[^>]+property=["'](?:og|place):street[-_]address["'][^>]+content=["']([^"']*)["']"#)
        .expect("valid regex")
});

static LD_REGION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""addressRegion"\s*:\s*"([^"]*)""#).expect("valid regex"));

static LD_LOCALITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""addressLocality"\s*:\s*"([^"]*)""#).expect("valid regex"));

static LD_STREET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""streetAddress"\s*:\s*"([^"]*)""#).expect("valid regex"));

// Tabelog
static TABELOG_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<h2[^>]+class=["'][^"']*display-name[^"']*["'][^>]*>\s*(?:<a[^>]*>)?\s*<span[^>]*>(.*?)</span>"#)
        .expect("valid regex")
});

static TABELOG_ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<p[^>]+class=["'][^"']*rstinfo-table__address[^"']*["'][^>]*>(.*?)</p>"#)
        .expect("valid regex")
});

// Ramen Database
static RAMENDB_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<h1[^>]*>\s*(?:<[^>]+>\s*)*?<span[^>]+itemprop=["']name["'][^>]*>(.*?)</span>"#)
        .expect("valid regex")
});

static RAMENDB_ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<(?:td|span|div)[^>]+itemprop=["']address["'][^>]*>(.*?)</(?:td|span|div)>"#)
        .expect("valid regex")
});

// Markup helpers
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static NUMERIC_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("valid regex"));

static TRAILING_PAREN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[（(][^（()）]*[)）]\s*$").expect("valid regex"));

/// Fetch a page and extract shop information from it.
pub async fn fetch_shop_info(
    url: &str,
    settings: &ShopInfoSettings,
) -> Result<ShopInfo, ShopInfoError> {
    let parsed = Url::parse(url).map_err(|e| ShopInfoError::InvalidUrl(format!("{url}: {e}")))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ShopInfoError::InvalidUrl(format!(
            "unsupported scheme: {}",
            parsed.scheme()
        )));
    }

    let client = Client::builder()
        .user_agent(&settings.user_agent)
        .default_headers(browser_headers())
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()
        .map_err(|e| ShopInfoError::Transport(e.to_string()))?;

    let response = client.get(parsed.clone()).send().await.map_err(|e| {
        warn!(url = %url, error = %e, "Failed to fetch shop page");
        ShopInfoError::Transport(e.to_string())
    })?;

    if !response.status().is_success() {
        debug!(url = %url, status = %response.status(), "Shop page returned non-success status");
        return Err(ShopInfoError::UpstreamStatus(response.status().as_u16()));
    }

    // Redirects (short links in particular) may land on a different site.
    let final_url = response.url().clone();

    let body = response
        .text()
        .await
        .map_err(|e| ShopInfoError::Transport(e.to_string()))?;
    let body = truncate_at_char_boundary(&body, settings.max_size);

    let info = extract_shop_info(body, &final_url);
    debug!(url = %url, source = ?info.source, name = ?info.name, "Extracted shop info");
    Ok(info)
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("ja,en-US;q=0.9,en;q=0.8"),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers
}

fn truncate_at_char_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Extract shop information from an already-fetched page.
#[must_use]
pub fn extract_shop_info(html: &str, url: &Url) -> ShopInfo {
    let source = ShopSource::detect(url);

    let (name, address) = match source {
        ShopSource::Tabelog => (
            first_capture(&TABELOG_NAME_RE, html)
                .or_else(|| og_title(html).map(|t| strip_site_suffix(&t, &[" - 食べログ"]))),
            first_capture(&TABELOG_ADDRESS_RE, html).or_else(|| generic_address(html)),
        ),
        ShopSource::RamenDb => (
            first_capture(&RAMENDB_NAME_RE, html).or_else(|| {
                og_title(html).map(|t| {
                    strip_site_suffix(&t, &[" | ラーメンデータベース", " - ラーメンデータベース"])
                })
            }),
            first_capture(&RAMENDB_ADDRESS_RE, html).or_else(|| generic_address(html)),
        ),
        ShopSource::Retty => (
            og_title(html).map(|t| strip_site_suffix(&t, &[" - Retty", " [Retty]", " | Retty"])),
            generic_address(html),
        ),
        ShopSource::GoogleMaps => google_maps_title(html),
        ShopSource::Generic => (
            og_title(html).or_else(|| first_capture(&TITLE_RE, html)),
            generic_address(html),
        ),
    };

    let name = name.filter(|n| !n.is_empty());
    let address = address.filter(|a| !a.is_empty());
    let prefecture = address
        .as_deref()
        .and_then(extract_prefecture)
        .map(str::to_string);

    ShopInfo {
        name,
        address,
        prefecture,
        source,
        url: url.to_string(),
    }
}

fn first_capture(re: &Regex, html: &str) -> Option<String> {
    let cap = re.captures(html)?;
    Some(clean_text(cap.get(1)?.as_str()))
}

fn og_title(html: &str) -> Option<String> {
    let cap = OG_TITLE_RE
        .captures(html)
        .or_else(|| OG_TITLE_RE2.captures(html))?;
    Some(clean_text(cap.get(1)?.as_str()))
}

/// Google Maps place titles look like `Name · Address`.
fn google_maps_title(html: &str) -> (Option<String>, Option<String>) {
    let Some(title) = og_title(html).or_else(|| first_capture(&TITLE_RE, html)) else {
        return (None, None);
    };
    let title = strip_site_suffix(&title, &[" - Google マップ", " - Google Maps"]);
    match title.split_once(" · ") {
        Some((name, address)) => (
            Some(name.trim().to_string()),
            Some(address.trim().to_string()),
        ),
        None => (Some(title), generic_address(html)),
    }
}

fn generic_address(html: &str) -> Option<String> {
    if let Some(cap) = OG_ADDRESS_RE.captures(html) {
        return cap.get(1).map(|m| clean_text(m.as_str()));
    }

    let street = LD_STREET_RE.captures(html)?.get(1)?.as_str();
    let region = LD_REGION_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map_or("", |m| m.as_str());
    let locality = LD_LOCALITY_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map_or("", |m| m.as_str());

    // Japanese addresses read region → locality → street; skip parts the
    // street address already carries.
    let mut address = String::new();
    for part in [region, locality] {
        if !part.is_empty() && !street.contains(part) && !address.contains(part) {
            address.push_str(part);
        }
    }
    address.push_str(street);
    Some(clean_text(&address))
}

fn strip_site_suffix(title: &str, suffixes: &[&str]) -> String {
    let mut result = title.trim();
    for suffix in suffixes {
        if let Some(stripped) = result.strip_suffix(suffix) {
            result = stripped.trim_end();
            break;
        }
    }
    // Tabelog and Retty append "(station/genre)" to the shop name.
    TRAILING_PAREN_RE.replace(result, "").trim().to_string()
}

/// Strip tags, decode entities and collapse whitespace.
fn clean_text(raw: &str) -> String {
    let without_tags = TAG_RE.replace_all(raw, " ");
    let decoded = decode_html_entities(&without_tags);
    WHITESPACE_RE.replace_all(decoded.trim(), " ").into_owned()
}

/// Decode common named and numeric HTML entities.
fn decode_html_entities(s: &str) -> String {
    let named = s
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ");

    let numeric = NUMERIC_ENTITY_RE.replace_all(&named, |caps: &regex::Captures<'_>| {
        let raw = &caps[1];
        let code = raw
            .strip_prefix('x')
            .map_or_else(|| raw.parse().ok(), |hex| u32::from_str_radix(hex, 16).ok());
        code.and_then(char::from_u32)
            .map_or_else(|| caps[0].to_string(), |c| c.to_string())
    });

    // Last so that "&amp;lt;" decodes to "&lt;" rather than "<".
    numeric.replace("&amp;", "&")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_detect_source() {
        assert_eq!(
            ShopSource::detect(&url("https://tabelog.com/tokyo/A1303/A130301/13001234/")),
            ShopSource::Tabelog
        );
        assert_eq!(
            ShopSource::detect(&url("https://ramendb.supleks.jp/s/1234.html")),
            ShopSource::RamenDb
        );
        assert_eq!(
            ShopSource::detect(&url("https://retty.me/area/PRE13/ARE1/SUB1/100000001/")),
            ShopSource::Retty
        );
        assert_eq!(
            ShopSource::detect(&url("https://www.google.com/maps/place/foo")),
            ShopSource::GoogleMaps
        );
        assert_eq!(
            ShopSource::detect(&url("https://example.com/")),
            ShopSource::Generic
        );
    }

    #[test]
    fn test_tabelog_extraction() {
        let html = r#"
            <html><head>
            <meta property="og:title" content="らーめん太郎 (渋谷/ラーメン) - 食べログ">
            </head><body>
            <h2 class="display-name">
                <span>
                    らーめん太郎
                </span>
            </h2>
            <p class="rstinfo-table__address"><span><a href="/tokyo/">東京都</a></span><span><a>渋谷区</a>道玄坂1-2-3</span></p>
            </body></html>
        "#;
        let info = extract_shop_info(html, &url("https://tabelog.com/tokyo/A1/A2/13000001/"));
        assert_eq!(info.source, ShopSource::Tabelog);
        assert_eq!(info.name.as_deref(), Some("らーめん太郎"));
        assert_eq!(info.address.as_deref(), Some("東京都 渋谷区 道玄坂1-2-3"));
        assert_eq!(info.prefecture.as_deref(), Some("東京都"));
    }

    #[test]
    fn test_tabelog_falls_back_to_og_title() {
        let html = r#"<meta property="og:title" content="麺屋 花 (札幌/ラーメン) - 食べログ">"#;
        let info = extract_shop_info(html, &url("https://tabelog.com/hokkaido/x/"));
        assert_eq!(info.name.as_deref(), Some("麺屋 花"));
        assert!(info.address.is_none());
        assert!(info.prefecture.is_none());
    }

    #[test]
    fn test_ramendb_extraction() {
        let html = r#"
            <h1><span itemprop="name">中華そば 青葉</span></h1>
            <table><tr><th>住所</th><td itemprop="address">東京都中野区中野5-58-1</td></tr></table>
        "#;
        let info = extract_shop_info(html, &url("https://ramendb.supleks.jp/s/1.html"));
        assert_eq!(info.name.as_deref(), Some("中華そば 青葉"));
        assert_eq!(info.address.as_deref(), Some("東京都中野区中野5-58-1"));
        assert_eq!(info.prefecture.as_deref(), Some("東京都"));
    }

    #[test]
    fn test_google_maps_title_split() {
        let html = r#"<meta content="一蘭 渋谷店 · 〒150-0041 東京都渋谷区神南1丁目22−7" property="og:title">"#;
        let info = extract_shop_info(html, &url("https://www.google.com/maps/place/x"));
        assert_eq!(info.name.as_deref(), Some("一蘭 渋谷店"));
        assert_eq!(
            info.address.as_deref(),
            Some("〒150-0041 東京都渋谷区神南1丁目22−7")
        );
        assert_eq!(info.prefecture.as_deref(), Some("東京都"));
    }

    #[test]
    fn test_generic_fallback_with_json_ld() {
        let html = r#"
            <title>Ramen Shop &amp; Bar</title>
            <script type="application/ld+json">
            {"@type":"Restaurant","address":{"addressRegion":"大阪府","addressLocality":"大阪市北区","streetAddress":"梅田1-1-1"}}
            </script>
        "#;
        let info = extract_shop_info(html, &url("https://ramen.example.jp/"));
        assert_eq!(info.source, ShopSource::Generic);
        assert_eq!(info.name.as_deref(), Some("Ramen Shop & Bar"));
        assert_eq!(info.address.as_deref(), Some("大阪府大阪市北区梅田1-1-1"));
        assert_eq!(info.prefecture.as_deref(), Some("大阪府"));
    }

    #[test]
    fn test_generic_without_metadata() {
        let info = extract_shop_info("<html></html>", &url("https://example.com/"));
        assert!(info.name.is_none());
        assert!(info.address.is_none());
    }

    #[test]
    fn test_decode_numeric_entities() {
        assert_eq!(decode_html_entities("&#12521;&#x30FC;"), "ラー");
        assert_eq!(decode_html_entities("A &amp;lt; B"), "A &lt; B");
    }

    #[test]
    fn test_truncate_at_char_boundary() {
        let s = "ラーメン";
        // Each character is 3 bytes; 4 is mid-character.
        assert_eq!(truncate_at_char_boundary(s, 4), "ラ");
        assert_eq!(truncate_at_char_boundary(s, 100), s);
    }

    #[test]
    fn test_error_status() {
        assert_eq!(
            ShopInfoError::InvalidUrl("x".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ShopInfoError::UpstreamStatus(404).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ShopInfoError::Transport("timeout".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_http_scheme() {
        let err = fetch_shop_info("ftp://example.com/", &ShopInfoSettings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ShopInfoError::InvalidUrl(_)));
    }
}
