//! Walks a chain of Tapestry observation pages through their "previous" links,
//! saving every attached image and video and collecting a Markdown journal
//! of the visited observations.

mod config;
mod error;
mod journal;
mod macros;
pub mod naming;
pub mod parse;
pub mod process;
pub mod request;

use std::fmt;

pub use config::CrawlConfig;
pub use error::{Error, Result};
pub use journal::Journal;
#[doc(hidden)]
pub use macros::secs_between;

const COOKIE_NAME: &str = "tapestry_session";
const IMAGES_DIR: &str = "./images";
const JOURNAL_FILE_NAME: &str = "observations-info.md";
const DEFAULT_HOST: &str = "tapestryjournal.com";
/// Seconds.
const DEFAULT_TIMEOUT: f64 = 60.0;
#[doc(hidden)]
pub const TIME_PREFIX_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Identifies one observation page. Used as the request path segment and as the
/// cursor of the walk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageId(String);

impl PageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
