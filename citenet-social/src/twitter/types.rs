use citenet_common::profiles;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersResponse {
    pub data: Option<Vec<User>>,
    #[serde(default)]
    pub errors: Option<Vec<ApiIssue>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowsResponse {
    pub data: Option<Vec<User>>,
    #[serde(default)]
    pub meta: Option<Meta>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Meta {
    #[serde(default)]
    pub result_count: Option<u64>,
    #[serde(default)]
    pub next_token: Option<String>,
}

/// Partial failure entry the users endpoint reports for handles it could not
/// resolve (suspended, renamed, never existed).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiIssue {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub verified: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub protected: Option<bool>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub public_metrics: Option<PublicMetrics>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PublicMetrics {
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub following_count: u64,
    #[serde(default)]
    pub tweet_count: u64,
    #[serde(default)]
    pub listed_count: Option<u64>,
}

impl From<User> for profiles::UserProfile {
    fn from(user: User) -> Self {
        profiles::UserProfile {
            id: user.id,
            username: user.username,
            name: user.name,
            created_at: user.created_at,
            verified: user.verified,
            public_metrics: user.public_metrics.map(|m| profiles::PublicMetrics {
                followers_count: m.followers_count,
                following_count: m.following_count,
                tweet_count: m.tweet_count,
                listed_count: m.listed_count,
            }),
        }
    }
}
