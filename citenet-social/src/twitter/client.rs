//! Thin wrapper around the Twitter/X user endpoints with Citenet defaults.
//!
//! Handles auth and request parameter shaping before delegating to the
//! shared HTTP client. Rate-limit responses surface as
//! [`citenet_http::HttpError::RateLimited`]; the cooldown policy lives with
//! the collectors in [`crate::twitter::collect`].
use std::borrow::Cow;

use citenet_http::{Auth, HttpClient, HttpError, RequestOpts};

use crate::twitter::types::{FollowsResponse, UsersResponse};

/// The users-by endpoint accepts at most this many handles per request.
pub const MAX_USERS_PER_BATCH: usize = 100;

/// Follows pagination upper bound per page.
const MAX_FOLLOWS_PER_PAGE: &str = "1000";

const USER_FIELDS: &str = "created_at,description,entities,id,location,name,\
pinned_tweet_id,profile_image_url,protected,public_metrics,url,username,\
verified,withheld";

const FOLLOW_FIELDS: &str = "created_at,public_metrics,username,verified";

/// Which side of the follow relation to page through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FollowKind {
    Followers,
    Following,
}

impl FollowKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FollowKind::Followers => "followers",
            FollowKind::Following => "following",
        }
    }
}

#[derive(Clone)]
pub struct TwitterApi {
    http: HttpClient,
    bearer: String,
}

impl TwitterApi {
    pub fn new(bearer_token: String) -> Self {
        let http = HttpClient::new("https://api.twitter.com/").expect("twitter base url");
        Self {
            http,
            bearer: bearer_token,
        }
    }

    /// Look up profile data for up to [`MAX_USERS_PER_BATCH`] handles.
    pub async fn users_by(&self, handles: &[String]) -> Result<UsersResponse, HttpError> {
        if handles.is_empty() || handles.len() > MAX_USERS_PER_BATCH {
            return Err(HttpError::Build(format!(
                "users_by batch must hold 1..={} handles, got {}",
                MAX_USERS_PER_BATCH,
                handles.len()
            )));
        }

        let params: Vec<(&str, Cow<'_, str>)> = vec![
            ("usernames", handles.join(",").into()),
            ("user.fields", USER_FIELDS.into()),
        ];

        self.http
            .get_json(
                "2/users/by",
                RequestOpts {
                    auth: Some(Auth::Bearer(&self.bearer)),
                    query: Some(params),
                    retries: Some(1),
                    ..Default::default()
                },
            )
            .await
    }

    /// Fetch one page of followers/following for `user_id`, optionally
    /// resuming from an opaque continuation token.
    pub async fn follows_page(
        &self,
        user_id: &str,
        kind: FollowKind,
        pagination_token: Option<&str>,
    ) -> Result<FollowsResponse, HttpError> {
        let mut params: Vec<(&str, Cow<'_, str>)> = vec![
            ("max_results", MAX_FOLLOWS_PER_PAGE.into()),
            ("user.fields", FOLLOW_FIELDS.into()),
        ];
        if let Some(token) = pagination_token {
            params.push(("pagination_token", token.to_string().into()));
        }

        let path = format!("2/users/{}/{}", user_id, kind.as_str());
        self.http
            .get_json(
                &path,
                RequestOpts {
                    auth: Some(Auth::Bearer(&self.bearer)),
                    query: Some(params),
                    retries: Some(1),
                    ..Default::default()
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn users_by_rejects_oversized_and_empty_batches() {
        let api = TwitterApi::new("test-token".into());

        let handles: Vec<String> = (0..=MAX_USERS_PER_BATCH).map(|i| format!("u{i}")).collect();
        let err = api.users_by(&handles).await.unwrap_err();
        assert!(matches!(err, HttpError::Build(_)));

        let err = api.users_by(&[]).await.unwrap_err();
        assert!(matches!(err, HttpError::Build(_)));
    }
}
