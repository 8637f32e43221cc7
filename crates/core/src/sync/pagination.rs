//! Offset pagination over a CRM collection

use mes_domain::{RawRecord, RecordKind};
use tracing::{debug, warn};

use super::ports::CrmSource;

/// Records gathered from one collection, plus the page-level problems met on
/// the way.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub records: Vec<RawRecord>,
    pub pages: usize,
    pub errors: Vec<String>,
}

/// Fetch every page of `kind`, advancing the offset by `page_size`.
///
/// Stops at the first short or empty page, after `max_pages` pages, or on the
/// first fetch failure. A page is short when the source returned fewer entries
/// than requested, whether or not every entry was a usable record. Records
/// from pages fetched before a failure are kept.
pub async fn fetch_all(
    source: &dyn CrmSource,
    kind: RecordKind,
    page_size: usize,
    max_pages: usize,
) -> FetchOutcome {
    let page_size = page_size.max(1);
    let mut outcome = FetchOutcome::default();
    let mut offset = 0;

    while outcome.pages < max_pages {
        let page = match source.fetch_page(kind, offset, page_size).await {
            Ok(page) => page,
            Err(e) => {
                warn!(kind = %kind, offset, error = %e, "page fetch failed; stopping pagination");
                outcome.errors.push(format!(
                    "Failed to fetch {} at offset {offset}: {e}",
                    kind.collection()
                ));
                return outcome;
            }
        };

        outcome.pages += 1;
        let received = page.received;
        let skipped = page.skipped();
        if skipped > 0 {
            warn!(kind = %kind, offset, skipped, "page contained non-record entries");
            outcome.errors.push(format!(
                "Ignored {skipped} non-object {} entries at offset {offset}",
                kind.collection()
            ));
        }
        outcome.records.extend(page.records);
        debug!(kind = %kind, offset, received, "fetched page");

        if received < page_size {
            return outcome;
        }
        offset += page_size;
    }

    warn!(kind = %kind, max_pages, "page limit reached; stopping pagination");
    outcome
}
