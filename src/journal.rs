use std::path::Path;

use tokio::fs;

use crate::{parse::ObservationMetadata, Result};

const JOURNAL_DATE_FORMAT: &str = "%-d %B %Y %I:%M%p";

/// The Markdown summary of a crawl: one section per visited observation, in visiting order.
#[derive(Debug, Clone)]
pub struct Journal {
    owner: String,
    sections: Vec<String>,
}

impl Journal {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            sections: Vec::new(),
        }
    }

    pub fn push(&mut self, metadata: &ObservationMetadata) {
        self.sections.push(format_section(metadata));
    }

    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn render(&self) -> String {
        let mut md = format!("# Tapestry observations for {}\n\n", self.owner);
        for section in &self.sections {
            md.push_str(section);
        }
        md
    }

    /// Writes the rendered journal, creating the parent directory if needed.
    pub async fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, self.render()).await?;
        Ok(())
    }
}

fn format_section(metadata: &ObservationMetadata) -> String {
    format!(
        "## {}\n\n### {}, {}\n\n{}\n\n",
        metadata.title,
        metadata.artist,
        metadata.date.format(JOURNAL_DATE_FORMAT),
        metadata.description
    )
}
