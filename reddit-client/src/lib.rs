pub mod api;

pub use api::{FeedFetch, RedditFeedClient};
