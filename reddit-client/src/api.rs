use redwatch_core::{FetchError, Item, ItemKind};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

const REDDIT_BASE: &str = "https://www.reddit.com";

/// Window size of one fetch; the listing endpoints cap out at 100.
const FETCH_LIMIT: u32 = 100;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Deserialize)]
pub struct Listing<T> {
    pub data: ListingData<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingData<T> {
    pub children: Vec<ListingChild<T>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingChild<T> {
    pub data: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostData {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    pub permalink: String,
    #[serde(default)]
    pub created_utc: f64,
    pub subreddit: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentData {
    #[serde(default)]
    pub body: String,
    pub permalink: String,
    #[serde(default)]
    pub created_utc: f64,
    pub subreddit: String,
}

impl From<PostData> for Item {
    fn from(post: PostData) -> Self {
        Self {
            identifier: post.permalink,
            text: format!("{} {}", post.title, post.selftext),
            subreddit: post.subreddit,
            created_utc: post.created_utc,
            kind: ItemKind::Post,
        }
    }
}

impl From<CommentData> for Item {
    fn from(comment: CommentData) -> Self {
        Self {
            identifier: comment.permalink,
            text: comment.body,
            subreddit: comment.subreddit,
            created_utc: comment.created_utc,
            kind: ItemKind::Comment,
        }
    }
}

/// Seam between the poll loop and the feed transport, so the loop can be
/// exercised against a scripted feed in tests.
#[allow(async_fn_in_trait)]
pub trait FeedFetch {
    async fn fetch(&self, kind: ItemKind) -> Result<Vec<Item>, FetchError>;
}

/// Read-only client for the public Reddit listing endpoints. One GET per
/// item kind per cycle against the combined multireddit, User-Agent set on
/// every request.
#[derive(Debug, Clone)]
pub struct RedditFeedClient {
    http_client: Client,
    combined_subreddits: String,
}

impl RedditFeedClient {
    pub fn new(user_agent: &str, subreddits: &[String]) -> Result<Self, FetchError> {
        let http_client = Client::builder()
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http_client,
            combined_subreddits: subreddits.join("+"),
        })
    }

    fn endpoint(&self, kind: ItemKind) -> String {
        match kind {
            ItemKind::Post => format!("{}/r/{}/new/.json", REDDIT_BASE, self.combined_subreddits),
            ItemKind::Comment => {
                format!("{}/r/{}/comments/.json", REDDIT_BASE, self.combined_subreddits)
            }
        }
    }

    pub async fn fetch_posts(&self) -> Result<Vec<Item>, FetchError> {
        let endpoint = self.endpoint(ItemKind::Post);
        let listing: Listing<PostData> = self.get_listing(&endpoint).await?;
        let items: Vec<Item> = listing
            .data
            .children
            .into_iter()
            .map(|child| child.data.into())
            .collect();
        info!("Retrieved {} posts from r/{}", items.len(), self.combined_subreddits);
        Ok(items)
    }

    pub async fn fetch_comments(&self) -> Result<Vec<Item>, FetchError> {
        let endpoint = self.endpoint(ItemKind::Comment);
        let listing: Listing<CommentData> = self.get_listing(&endpoint).await?;
        let items: Vec<Item> = listing
            .data
            .children
            .into_iter()
            .map(|child| child.data.into())
            .collect();
        info!(
            "Retrieved {} comments from r/{}",
            items.len(),
            self.combined_subreddits
        );
        Ok(items)
    }

    async fn get_listing<T>(&self, endpoint: &str) -> Result<Listing<T>, FetchError>
    where
        T: serde::de::DeserializeOwned,
    {
        debug!("Fetching feed window: GET {}", endpoint);

        let response = self
            .http_client
            .get(endpoint)
            .query(&[("limit", FETCH_LIMIT)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status_code: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }

        response
            .json::<Listing<T>>()
            .await
            .map_err(|e| FetchError::InvalidResponse {
                details: format!("failed to decode listing from {}: {}", endpoint, e),
            })
    }
}

impl FeedFetch for RedditFeedClient {
    async fn fetch(&self, kind: ItemKind) -> Result<Vec<Item>, FetchError> {
        match kind {
            ItemKind::Post => self.fetch_posts().await,
            ItemKind::Comment => self.fetch_comments().await,
        }
    }
}
