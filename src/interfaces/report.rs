use crate::application::engine::TransactionEngine;
use crate::application::views::{StatsView, TransactionView};
use crate::domain::filter::{SortBy, SortOrder, TransactionFilter};
use crate::domain::stats::StatsScope;
use crate::error::{LedgerError, Result};
use serde::Serialize;
use std::io::Write;

/// Final state of a replay: every live transaction in scope plus the rollup.
#[derive(Debug, Serialize)]
pub struct Report {
    pub transactions: Vec<TransactionView>,
    pub stats: StatsView,
}

impl Report {
    /// Walks every page of the scope in creation order, then takes the stats.
    pub async fn collect(engine: &TransactionEngine, tenant_id: Option<&str>) -> Result<Self> {
        let page_size = engine.config().max_page_size;
        let mut filter = TransactionFilter {
            tenant_id: tenant_id.map(str::to_string),
            ..Default::default()
        }
        .sorted(SortBy::CreatedAt, SortOrder::Asc)
        .paged(page_size, 0);

        let mut transactions = Vec::new();
        loop {
            let page = engine.list(&filter).await?;
            transactions.extend(page.summaries());
            match page.next_offset() {
                Some(offset) => filter.offset = Some(offset),
                None => break,
            }
        }

        let scope = StatsScope {
            tenant_id: tenant_id.map(str::to_string),
            ..Default::default()
        };
        let stats = engine.stats(&scope).await?;

        Ok(Self {
            transactions,
            stats: StatsView::from(&stats),
        })
    }
}

/// Writes a [`Report`] as pretty-printed JSON.
pub struct ReportWriter<W: Write> {
    writer: W,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_report(&mut self, report: &Report) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, report)
            .map_err(|e| LedgerError::IoError(e.into()))?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
