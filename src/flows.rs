//! End-to-end scenarios composed from the page objects and API clients

use anyhow::{Context, anyhow};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};
use url::Url;

use crate::api::PinterestApi;
use crate::browser::PageDriver;
use crate::config::current_timestamp;
use crate::context::RunContext;
use crate::errors::{ProbeError, ProbeResult};
use crate::pages::{HomePage, LoginPage, SearchResultPage};
use crate::wait::WaitBudget;

/// Files smaller than this are treated as broken downloads
pub const MIN_IMAGE_BYTES: u64 = 1024;

#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub keyword: String,
    pub pin_count: usize,
    pub url: String,
    pub logged_in: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadReport {
    pub keyword: String,
    pub directory: PathBuf,
    pub requested: usize,
    pub files: Vec<PathBuf>,
}

/// Log in when credentials are configured, otherwise open the home page
/// anonymously. Returns whether a login was attempted.
pub async fn sign_in<P: PageDriver>(page: &P, ctx: &RunContext) -> ProbeResult<bool> {
    let credentials = &ctx.settings.credentials;
    if !credentials.is_valid() {
        warn!("PINTEREST_EMAIL / PINTEREST_PASSWORD not set, continuing anonymously");
        HomePage::new(page, ctx).navigate().await?;
        return Ok(false);
    }

    info!("Ensuring authenticated state...");
    let login = LoginPage::new(page, ctx);
    login.navigate().await?;
    login
        .login(&credentials.email, &credentials.password)
        .await?;
    Ok(true)
}

/// Search for `keyword` and check that pins load and the URL reflects it
pub async fn search<P: PageDriver>(
    page: &P,
    ctx: &RunContext,
    keyword: &str,
) -> ProbeResult<SearchReport> {
    let logged_in = sign_in(page, ctx).await?;
    HomePage::new(page, ctx).search_for(keyword).await?;

    let results = SearchResultPage::new(page, ctx);
    let pin_count = results
        .wait_for_results(1, ctx.budget(WaitBudget::Element))
        .await?;
    if pin_count == 0 {
        return Err(ProbeError::Timeout(format!(
            "Expected pins for '{}', found 0",
            keyword
        )));
    }
    info!("Found {} pins for '{}'", pin_count, keyword);

    let url = results.base().current_url().await?;
    if !url_mentions_keyword(&url, keyword) {
        return Err(ProbeError::Other(anyhow!(
            "URL mismatch. Keyword: {}, URL: {}",
            keyword,
            url
        )));
    }

    Ok(SearchReport {
        keyword: keyword.to_string(),
        pin_count,
        url,
        logged_in,
    })
}

/// Search for `keyword` and download the first `count` full-size images into
/// `{downloads}/{keyword}/`
pub async fn download_images<P: PageDriver>(
    page: &P,
    ctx: &RunContext,
    api: &PinterestApi,
    keyword: &str,
    count: usize,
) -> ProbeResult<DownloadReport> {
    sign_in(page, ctx).await?;
    HomePage::new(page, ctx).search_for(keyword).await?;

    let urls = SearchResultPage::new(page, ctx).image_urls(count).await?;
    if urls.len() < count {
        return Err(ProbeError::Other(anyhow!(
            "Not enough images found: wanted {}, got {}",
            count,
            urls.len()
        )));
    }

    let directory = ctx.settings.downloads_dir().join(download_dir_name(keyword));
    std::fs::create_dir_all(&directory)
        .with_context(|| format!("Failed to create {}", directory.display()))?;

    let files = download_all(api, &urls, &directory).await;
    if files.len() != count {
        return Err(ProbeError::Other(anyhow!(
            "Expected {} downloads, got {}",
            count,
            files.len()
        )));
    }

    info!("Download finished. Files at: {}", directory.display());
    Ok(DownloadReport {
        keyword: keyword.to_string(),
        directory,
        requested: count,
        files,
    })
}

/// Download each URL as `img_{n}_{timestamp}{ext}`; keeps only files that
/// arrived and pass the size sanity check
pub async fn download_all(api: &PinterestApi, urls: &[String], directory: &std::path::Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for (i, url) in urls.iter().enumerate() {
        let name = format!("img_{}_{}{}", i + 1, current_timestamp(), image_extension(url));
        let path = directory.join(name);
        if !api.download_file(url, &path).await {
            continue;
        }

        let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        if size <= MIN_IMAGE_BYTES {
            warn!("File too small (broken?): {} ({} bytes)", path.display(), size);
            if let Err(e) = std::fs::remove_file(&path) {
                warn!("Could not remove {}: {}", path.display(), e);
            }
            continue;
        }
        files.push(path);
    }
    files
}

/// Whether a results URL carries the keyword, either percent-encoded in the
/// query or hyphenated in the path
pub fn url_mentions_keyword(url: &str, keyword: &str) -> bool {
    let keyword = keyword.to_lowercase();
    let lower = url.to_lowercase();
    if lower.contains(&keyword.replace(' ', "%20")) || lower.contains(&keyword.replace(' ', "-")) {
        return true;
    }
    match Url::parse(url) {
        Ok(parsed) => parsed
            .query_pairs()
            .any(|(_, value)| value.to_lowercase().contains(&keyword)),
        Err(_) => false,
    }
}

/// File extension for a downloaded image, `.jpg` when the URL has none we know
pub fn image_extension(url: &str) -> &'static str {
    let ext = Url::parse(url).ok().and_then(|parsed| {
        parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .and_then(|file| file.rsplit_once('.'))
            .map(|(_, ext)| ext.to_lowercase())
    });
    match ext.as_deref() {
        Some("png") => ".png",
        Some("webp") => ".webp",
        Some("gif") => ".gif",
        _ => ".jpg",
    }
}

pub fn download_dir_name(keyword: &str) -> String {
    keyword.replace(' ', "_")
}
