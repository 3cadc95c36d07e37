use std::sync::OnceLock;

use chrono::NaiveDateTime;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::{Error, PageId, Result};

const CAPTION_DATE_FORMAT: &str = "%d %b %Y %I:%M %p";
const LOGGED_OUT_MARKER: &str = "logged out";

const ALERT_SELECTOR: &str = ".alert";
const TITLE_SELECTOR: &str = "h1";
const DESCRIPTION_SELECTOR: &str = ".page-note p";
const CAPTION_SELECTOR: &str = ".obs-metadata p";
const IMAGE_SELECTOR: &str = ".obs-media-gallery-main img";
const VIDEO_SELECTOR: &str = ".obs-media-gallery-main .obs-video-wrapper video source";
const PREVIOUS_LINK_SELECTOR: &str = "li.previous a";

/// A fetched observation page, parsed and ready to be queried.
pub struct PageDocument {
    id: PageId,
    url: Url,
    html: Html,
}

impl PageDocument {
    pub fn parse(id: PageId, url: Url, body: &str) -> Self {
        Self {
            id,
            url,
            html: Html::parse_document(body),
        }
    }

    pub fn id(&self) -> &PageId {
        &self.id
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationMetadata {
    pub title: String,
    /// Single line: the page's line breaks are replaced by spaces.
    pub description: String,
    pub artist: String,
    pub date: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn extension(self) -> &'static str {
        match self {
            MediaKind::Image => "jpeg",
            MediaKind::Video => "mp4",
        }
    }
}

/// One asset found on a page. `ordinal` is the element's position among the
/// page's assets of the same kind, starting at 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReference {
    pub kind: MediaKind,
    /// The raw `src` attribute, if the element has one.
    pub src: Option<String>,
    /// `src` resolved against the page URL. `None` when it is missing or not a URL.
    pub url: Option<Url>,
    pub ordinal: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageMedia {
    pub images: Vec<MediaReference>,
    pub videos: Vec<MediaReference>,
}

impl PageMedia {
    /// Images first, then videos.
    pub fn iter(&self) -> impl Iterator<Item = &MediaReference> {
        self.images.iter().chain(self.videos.iter())
    }
}

/// Extracts the observation's metadata.
/// Alerts are checked first: a logged-out page has none of the other fields.
pub fn extract_metadata(doc: &PageDocument) -> Result<ObservationMetadata> {
    check_session(doc)?;

    let title = first_text(doc, TITLE_SELECTOR)?;
    let description = first_text(doc, DESCRIPTION_SELECTOR)?
        .replace("\r\n", " ")
        .replace('\n', " ");
    let caption = first_text(doc, CAPTION_SELECTOR)?;
    let (artist, date) = parse_caption(&caption).map_err(|reason| Error::MetadataParse {
        id: doc.id.clone(),
        reason,
    })?;

    Ok(ObservationMetadata {
        title,
        description,
        artist,
        date,
    })
}

fn check_session(doc: &PageDocument) -> Result<()> {
    let alert_selector = create_selector(ALERT_SELECTOR)?;
    for alert in doc.html.select(&alert_selector) {
        let alert_text = element_text(alert);
        if alert_text.is_empty() {
            continue;
        }
        warn!(observation = %doc.id, "alert: {alert_text:?}");
        if alert_text.contains(LOGGED_OUT_MARKER) {
            return Err(Error::SessionExpired);
        }
    }
    Ok(())
}

/// Splits `Authored by <artist> added <date>` into the artist and the parsed date.
fn parse_caption(caption: &str) -> core::result::Result<(String, NaiveDateTime), String> {
    static CAPTION_RE: OnceLock<Regex> = OnceLock::new();
    let caption_re = CAPTION_RE
        .get_or_init(|| Regex::new(r"Authored by (.*) added (.*)").expect("valid caption regex"));

    let caps = caption_re
        .captures(caption)
        .ok_or_else(|| format!("caption {caption:?} doesn't match \"Authored by .. added ..\""))?;
    let artist = caps[1].to_string();
    let date = NaiveDateTime::parse_from_str(caps[2].trim(), CAPTION_DATE_FORMAT)
        .map_err(|e| format!("couldn't parse date {:?}: {e}", &caps[2]))?;

    Ok((artist, date))
}

/// Finds the images and videos of the main gallery, in document order.
/// A page without media yields empty lists.
pub fn extract_media(doc: &PageDocument) -> Result<PageMedia> {
    Ok(PageMedia {
        images: media_refs(doc, IMAGE_SELECTOR, MediaKind::Image)?,
        videos: media_refs(doc, VIDEO_SELECTOR, MediaKind::Video)?,
    })
}

fn media_refs(doc: &PageDocument, sel_str: &str, kind: MediaKind) -> Result<Vec<MediaReference>> {
    let selector = create_selector(sel_str)?;

    let refs = doc
        .html
        .select(&selector)
        .enumerate()
        .map(|(ordinal, element)| {
            let src = element.value().attr("src").map(|s| s.trim().to_string());
            let url = src
                .as_deref()
                .filter(|src| !src.is_empty())
                .and_then(|src| doc.url.join(src).ok());
            if url.is_none() {
                warn!(observation = %doc.id, "{kind:?} {ordinal} has no usable src: {src:?}");
            }
            MediaReference {
                kind,
                src,
                url,
                ordinal,
            }
        })
        .collect();
    Ok(refs)
}

/// Reads the id of the next observation to visit out of the "previous" link.
/// `Ok(None)` means the chain ends on this page.
pub fn next_observation_id(doc: &PageDocument, base_url: &str) -> Result<Option<PageId>> {
    let link_selector = create_selector(PREVIOUS_LINK_SELECTOR)?;
    let Some(link) = doc.html.select(&link_selector).next() else {
        return Ok(None);
    };

    let href = link.value().attr("href").unwrap_or_default().trim();
    if href.is_empty() {
        return Err(Error::NavigationParse {
            href: href.to_string(),
        });
    }
    // Relative links are made absolute so they can be compared with the base URL.
    let absolute = doc
        .url
        .join(href)
        .map(String::from)
        .unwrap_or_else(|_| href.to_string());

    id_after_base(&absolute, base_url)
        .or_else(|| id_after_base(href, base_url))
        .map(|id| Some(PageId::new(id)))
        .ok_or_else(|| Error::NavigationParse {
            href: href.to_string(),
        })
}

/// The run of digits right after `<base_url>/` in `href`.
fn id_after_base<'a>(href: &'a str, base_url: &str) -> Option<&'a str> {
    let start = href.find(base_url)? + base_url.len();
    let rest = href[start..].strip_prefix('/')?;
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}

fn first_text(doc: &PageDocument, sel_str: &str) -> Result<String> {
    let selector = create_selector(sel_str)?;
    doc.html
        .select(&selector)
        .next()
        .map(element_text)
        .ok_or_else(|| Error::MetadataParse {
            id: doc.id.clone(),
            reason: format!("no element matches {sel_str:?}"),
        })
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::InvalidSelector(sel_str.into()))
}
