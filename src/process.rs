use chrono::Local;
use reqwest::Client;
use tracing::{error, info};

use crate::naming::media_path;
use crate::parse::{extract_media, extract_metadata, next_observation_id, MediaKind};
use crate::request::{build_client, download_media, fetch_page};
use crate::{info_time, CrawlConfig, Error, Journal, PageId, Result};

/// Where the walk stands. `Done` and `Aborted` are terminal.
#[derive(Debug)]
pub enum CrawlState {
    Walking(PageId),
    Done,
    Aborted(Error),
}

impl CrawlState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CrawlState::Walking(_))
    }
}

/// Totals of a finished walk.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CrawlReport {
    pub pages: usize,
    pub images: usize,
    pub videos: usize,
}

/// Follows the "previous" links from the first observation, one page at a time,
/// saving media and collecting the journal on the way.
pub struct Crawler {
    config: CrawlConfig,
    client: Client,
    journal: Journal,
    report: CrawlReport,
}

impl Crawler {
    pub fn new(config: CrawlConfig) -> Result<Self> {
        let client = build_client(&config)?;
        Ok(Self {
            journal: Journal::new(&config.name),
            config,
            client,
            report: CrawlReport::default(),
        })
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn report(&self) -> CrawlReport {
        self.report
    }

    /// Walks the whole chain, then writes the journal once, whether the walk
    /// finished or stopped on an error.
    pub async fn run(mut self) -> Result<CrawlReport> {
        let start_time = Local::now();
        let mut state = CrawlState::Walking(self.config.first_observation_id.clone());

        let outcome = loop {
            state = match state {
                CrawlState::Walking(id) => {
                    info_time!("{}", id);
                    self.step(&id).await
                }
                CrawlState::Done => break Ok(()),
                CrawlState::Aborted(e) => break Err(e),
            };
        };

        let journal_path = self.config.journal_path();
        let written = self.journal.write_to(&journal_path).await;
        if written.is_ok() {
            info!(
                "journal with {} observations written to {}",
                self.journal.len(),
                journal_path.display()
            );
        }

        match (outcome, written) {
            (Ok(()), Ok(())) => {
                info_time!(start_time, "Finished walking {} observations.", self.report.pages);
                Ok(self.report)
            }
            (Ok(()), Err(write_err)) => Err(write_err),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(write_err)) => {
                error!("couldn't write the journal after the walk stopped: {write_err}");
                Err(e)
            }
        }
    }

    /// Processes one observation and returns the next state.
    pub async fn step(&mut self, id: &PageId) -> CrawlState {
        match self.visit(id).await {
            Ok(Some(next_id)) => CrawlState::Walking(next_id),
            Ok(None) => CrawlState::Done,
            Err(e) => CrawlState::Aborted(e),
        }
    }

    async fn visit(&mut self, id: &PageId) -> Result<Option<PageId>> {
        // The parsed page is dropped before any media request goes out.
        let (metadata, media, next_id) = {
            let doc = fetch_page(&self.client, id, &self.config).await?;
            let metadata = extract_metadata(&doc)?;
            let media = extract_media(&doc)?;
            // Applied after the media is saved and the journal updated.
            let next_id = next_observation_id(&doc, &self.config.base_url);
            (metadata, media, next_id)
        };

        for media_ref in media.iter() {
            let dest = media_path(
                &self.config.images_dir,
                &metadata,
                media_ref.ordinal,
                media_ref.kind,
            );
            download_media(&self.client, media_ref, &dest).await?;
            match media_ref.kind {
                MediaKind::Image => self.report.images += 1,
                MediaKind::Video => self.report.videos += 1,
            }
        }

        self.journal.push(&metadata);
        self.report.pages += 1;

        next_id
    }
}
