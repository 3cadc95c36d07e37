use std::path::Path;

use reqwest::{header::COOKIE, Client};
use tokio::fs;
use tracing::{debug, info};

use crate::{
    parse::{MediaReference, PageDocument},
    CrawlConfig, Error, PageId, Result,
};

/// Builds the HTTP client shared by all page and media requests of a run.
pub fn build_client(config: &CrawlConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(Error::Client)
}

/// Requests an observation page with the session cookie and parses it.
pub async fn fetch_page(client: &Client, id: &PageId, config: &CrawlConfig) -> Result<PageDocument> {
    let url = config.observation_url(id);
    info!("requesting: {url:?}");

    let fetch_err = |source| Error::Fetch {
        id: id.clone(),
        source,
    };
    let res = client
        .get(&url)
        .header(COOKIE, format!("{}={}", config.cookie_name, config.cookie_value))
        .send()
        .await
        .and_then(|res| res.error_for_status())
        .map_err(fetch_err)?;
    let page_url = res.url().clone();
    let html = res.text().await.map_err(fetch_err)?;

    Ok(PageDocument::parse(id.clone(), page_url, &html))
}

/// Downloads an asset and writes it to `dest`, replacing any file already there.
/// An asset without a usable URL fails before anything is requested.
pub async fn download_media(client: &Client, media: &MediaReference, dest: &Path) -> Result<()> {
    let url = media.url.as_ref().ok_or_else(|| Error::MediaSource {
        kind: media.kind,
        ordinal: media.ordinal,
        src: media.src.clone(),
    })?;
    let download_err = |source| Error::Download {
        url: url.to_string(),
        source,
    };
    let bytes = client
        .get(url.clone())
        .send()
        .await
        .and_then(|res| res.error_for_status())
        .map_err(download_err)?
        .bytes()
        .await
        .map_err(download_err)?;

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(dest, &bytes).await?;
    debug!("saved {} bytes from {} to {}", bytes.len(), url, dest.display());

    Ok(())
}

