//! Paged text document with a footer on every page

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ClientResult;
use crate::format;

/// Lines per page, footer included
pub const PAGE_LINES: usize = 60;

/// Report width in characters
pub const PAGE_WIDTH: usize = 78;

/// Separator line plus the footer text
const FOOTER_LINES: usize = 2;

const PAGE_BREAK: char = '\u{000C}';

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub report_id: Uuid,
    pub loan_id: String,
    pub generated_at: DateTime<Utc>,
    pages: Vec<Vec<String>>,
}

impl ReportDocument {
    /// Lay out sections onto pages.
    ///
    /// A section that fits on one page is moved to the next page rather than
    /// split; longer sections flow across pages.
    pub(crate) fn paginate(
        report_id: Uuid,
        loan_id: &str,
        generated_at: DateTime<Utc>,
        sections: Vec<Vec<String>>,
    ) -> Self {
        let capacity = PAGE_LINES - FOOTER_LINES;
        let mut pages: Vec<Vec<String>> = vec![Vec::new()];

        for section in sections {
            let used = pages.last().map_or(0, Vec::len);
            if used > 0 && section.len() <= capacity && used + section.len() > capacity {
                pages.push(Vec::new());
            }
            for line in section {
                if pages.last().map_or(0, Vec::len) >= capacity {
                    pages.push(Vec::new());
                }
                if let Some(page) = pages.last_mut() {
                    page.push(line);
                }
            }
        }

        let total = pages.len();
        for (index, page) in pages.iter_mut().enumerate() {
            page.resize(capacity, String::new());
            page.push("-".repeat(PAGE_WIDTH));
            page.push(footer(generated_at, report_id, index + 1, total));
        }

        Self {
            report_id,
            loan_id: loan_id.to_string(),
            generated_at,
            pages,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[Vec<String>] {
        &self.pages
    }

    /// Whole document, pages separated by form feeds
    pub fn render(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.join("\n"))
            .collect::<Vec<_>>()
            .join(&format!("\n{}", PAGE_BREAK))
            + "\n"
    }

    pub fn file_name(&self) -> String {
        let safe: String = self
            .loan_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        format!("loan-report-{}.txt", safe)
    }

    /// Write into `dir` (created if needed) and return the file path
    pub fn write_to(&self, dir: &Path) -> ClientResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        std::fs::write(&path, self.render())?;

        tracing::info!(
            path = %path.display(),
            pages = self.page_count(),
            report_id = %self.report_id,
            "Loan report written"
        );
        Ok(path)
    }
}

fn footer(generated_at: DateTime<Utc>, report_id: Uuid, page: usize, total: usize) -> String {
    format!(
        "Generated {} | Report {} | Page {} of {}",
        format::datetime(Some(generated_at)),
        report_id,
        page,
        total
    )
}
