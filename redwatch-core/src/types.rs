#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Post,
    Comment,
}

impl ItemKind {
    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Post => "post",
            ItemKind::Comment => "comment",
        }
    }

    /// Capitalized form used in notification subject lines.
    pub fn title_label(&self) -> &'static str {
        match self {
            ItemKind::Post => "Post",
            ItemKind::Comment => "Comment",
        }
    }
}

/// One fetched content unit. Items are rebuilt fresh every cycle and never
/// persisted; the permalink is the sole dedup key.
#[derive(Debug, Clone)]
pub struct Item {
    pub identifier: String,
    pub text: String,
    pub subreddit: String,
    pub created_utc: f64,
    pub kind: ItemKind,
}

impl Item {
    pub fn url(&self) -> String {
        format!("https://www.reddit.com{}", self.identifier)
    }
}
