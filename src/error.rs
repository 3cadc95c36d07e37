use thiserror::Error;

use crate::{parse::MediaKind, PageId};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("You appear to be logged out. Check cookie value.")]
    SessionExpired,

    #[error("Couldn't fetch observation {id}: {source}")]
    Fetch {
        id: PageId,
        #[source]
        source: reqwest::Error,
    },
    #[error("Couldn't download media from {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{kind:?} {ordinal} has no usable src: {src:?}")]
    MediaSource {
        kind: MediaKind,
        ordinal: usize,
        src: Option<String>,
    },
    #[error("Couldn't build the HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Observation {id} doesn't have the expected structure: {reason}")]
    MetadataParse { id: PageId, reason: String },
    #[error("Observation id not found in the previous link: {href}")]
    NavigationParse { href: String },
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Environment variable {0:?} is required")]
    MissingEnv(&'static str),
    #[error("Environment variable {name:?} has an invalid value: {value:?}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),
}
