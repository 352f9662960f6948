use dedup_store::AnyStore;
use notifier::EmailNotifier;
use poll_service::MonitorService;
use reddit_client::RedditFeedClient;
use redwatch_core::MonitorConfig;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            "redwatch=info,redwatch_core=info,reddit_client=info,dedup_store=info,notifier=info,poll_service=info"
                .to_string()
        }))
        .init();

    tracing::info!("Starting Redwatch - Reddit keyword monitor");

    // All startup failures are fatal; the loop itself never exits on error.
    let config = match MonitorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("FATAL: {}", e);
            std::process::exit(1);
        }
    };

    let store = match AnyStore::open(&config.store).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("FATAL: Unable to open dedup store: {}", e);
            std::process::exit(1);
        }
    };

    let notifier = match EmailNotifier::new(
        &config.smtp_host,
        &config.smtp_user,
        &config.smtp_password,
        &config.recipient,
    ) {
        Ok(notifier) => notifier,
        Err(e) => {
            tracing::error!("FATAL: Unable to configure notifier: {}", e);
            std::process::exit(1);
        }
    };

    let fetcher = match RedditFeedClient::new(&config.user_agent, &config.subreddits) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            tracing::error!("FATAL: Unable to build feed client: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Monitoring subreddits: {:?}", config.subreddits);
    tracing::info!("Looking for keywords: {:?}", config.keywords);
    tracing::info!("Sending notifications to: {}", config.recipient);
    tracing::info!("Persistence: {}", store.backend_label());
    tracing::info!("Poll interval: {:?}", config.poll_interval);

    let service = MonitorService::new(fetcher, store, notifier, config);
    service.run().await;
}
