use dedup_store::DedupStore;
use notifier::Notifier;
use reddit_client::FeedFetch;
use redwatch_core::{find_keywords, Item, ItemKind, MonitorConfig};
use tracing::{debug, error, info, warn};

/// The poll loop: fetch -> dedup-check -> match -> notify -> record, one
/// item at a time in fetched order, forever.
pub struct MonitorService<F, S, N> {
    fetcher: F,
    store: S,
    notifier: N,
    config: MonitorConfig,
}

impl<F, S, N> MonitorService<F, S, N>
where
    F: FeedFetch,
    S: DedupStore,
    N: Notifier,
{
    pub fn new(fetcher: F, store: S, notifier: N, config: MonitorConfig) -> Self {
        Self {
            fetcher,
            store,
            notifier,
            config,
        }
    }

    /// Runs until process termination. No error inside a cycle escalates
    /// out of the loop; a bad cycle degrades to "some items unprocessed
    /// this round".
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        loop {
            ticker.tick().await;
            info!("Fetching new data");
            self.run_cycle().await;
        }
    }

    /// One full pass over both item kinds, fetched and processed
    /// independently: a fetch failure for posts must not prevent comment
    /// processing in the same cycle, and vice versa.
    pub async fn run_cycle(&self) {
        for kind in [ItemKind::Post, ItemKind::Comment] {
            match self.fetcher.fetch(kind).await {
                Ok(items) => {
                    debug!("Processing {} {}s", items.len(), kind.label());
                    for item in items {
                        self.process_item(&item).await;
                    }
                }
                Err(e) => error!("Error fetching {}s: {}", kind.label(), e),
            }
        }
    }

    async fn process_item(&self, item: &Item) {
        match self.store.contains(&item.identifier).await {
            Ok(true) => return,
            Ok(false) => {}
            Err(e) => {
                // Without a reliable dedup answer, notifying risks a
                // duplicate, so the item is skipped for this cycle.
                warn!(
                    "Skipping {} {}: dedup check failed: {}",
                    item.kind.label(),
                    item.identifier,
                    e
                );
                return;
            }
        }

        let found = find_keywords(&item.text, &self.config.keywords);
        if found.is_empty() {
            // Unmatched items stay unrecorded; they are rescanned for as
            // long as the feed window keeps returning them.
            return;
        }

        info!(
            "Found keywords {:?} in new {} from r/{}: {}",
            found,
            item.kind.label(),
            item.subreddit,
            item.url()
        );

        let subject = format!(
            "Reddit Keyword Alert: {} in r/{}",
            item.kind.title_label(),
            item.subreddit
        );
        let body = format!(
            "Keywords {:?} found in {}:\n{}",
            found,
            item.kind.label(),
            item.url()
        );

        if let Err(e) = self.notifier.notify(&subject, &body).await {
            // Delivery is ambiguous on error; the item stays unrecorded so
            // the alert is retried next cycle instead of silently dropped.
            error!("Error sending {} notification: {}", item.kind.label(), e);
            return;
        }

        if let Err(e) = self.store.record(&item.identifier).await {
            // The notification went out but the marker did not stick; a
            // later cycle may notify again.
            error!(
                "Error recording notified {} {}: {}",
                item.kind.label(),
                item.identifier,
                e
            );
        }
    }
}
