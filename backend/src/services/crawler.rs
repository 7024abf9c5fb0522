use crate::error::FetchError;
use crate::models::BatchEntry;
use crate::services::assembler::assemble_page;
use crate::services::fetchers::timed_call;
use crate::services::harvest_service::Harvester;
use log::info;

/// Cursor over the search results of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    pub page_token: Option<String>,
    pub collected: usize,
    pub target: usize,
    exhausted: bool,
}

impl PaginationState {
    pub fn new(target: usize) -> Self {
        PaginationState {
            page_token: None,
            collected: 0,
            target,
            exhausted: false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.target.saturating_sub(self.collected)
    }

    pub fn page_size(&self, page_cap: u32) -> u32 {
        (page_cap as usize).min(self.remaining()) as u32
    }

    /// Records a processed page. An empty page or a missing token ends the crawl.
    pub fn advance(&mut self, appended: usize, next_page_token: Option<String>) {
        self.collected += appended;
        self.exhausted = appended == 0 || next_page_token.is_none();
        self.page_token = next_page_token;
    }

    pub fn is_done(&self) -> bool {
        self.exhausted || self.collected >= self.target
    }
}

/// Walks the search result pages for `query` until `target` entries are collected
/// or the results run out. Pages are fetched one after another; the items of a page
/// are assembled concurrently and kept in result order.
pub async fn crawl_search_results(
    harvester: &Harvester,
    query: &str,
    target: usize,
) -> Result<Vec<BatchEntry>, FetchError> {
    info!("Starting YouTube search crawl for '{query}' ({target} videos)...");

    let settings = &harvester.settings;
    let mut state = PaginationState::new(target);
    let mut batch = Vec::with_capacity(target.min(settings.page_cap as usize * 4));
    let mut page_number = 0;

    while !state.is_done() {
        page_number += 1;
        let page_size = state.page_size(settings.page_cap);
        let page = timed_call(
            settings,
            harvester
                .api
                .search(query, page_size, state.page_token.as_deref()),
        )
        .await?;

        let mut items = page.items;
        items.truncate(state.remaining());
        info!(
            "Search page {page_number} for '{query}': {} results (requested {page_size})",
            items.len()
        );

        let entries = assemble_page(harvester, query, items).await;
        state.advance(entries.len(), page.next_page_token);
        batch.extend(entries);
    }

    let failed = batch.iter().filter(|entry| entry.is_failed()).count();
    info!(
        "YouTube search crawl completed: {} entries over {page_number} pages, {failed} failed.",
        batch.len()
    );
    Ok(batch)
}
