//! Cached Twitter user profiles.
//!
//! Profiles are collected once through the REST API and cached on disk as a
//! single JSON object keyed by handle. Coverage is always partial (suspended
//! and deleted accounts never resolve), so every accessor that feeds graph
//! construction falls back to neutral defaults instead of failing.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Neutral stand-in for missing profile metrics. Deliberately 1 rather than
/// 0 so inverse-log weighting never divides by a degenerate value.
pub const NEUTRAL_METRIC: u64 = 1;

/// Aggregate activity counters returned by the user endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublicMetrics {
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub following_count: u64,
    #[serde(default)]
    pub tweet_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listed_count: Option<u64>,
}

/// One cached user object, in the shape the REST API returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_metrics: Option<PublicMetrics>,
}

impl UserProfile {
    pub fn followers(&self) -> u64 {
        self.public_metrics
            .as_ref()
            .map(|m| m.followers_count)
            .unwrap_or(NEUTRAL_METRIC)
    }

    pub fn following(&self) -> u64 {
        self.public_metrics
            .as_ref()
            .map(|m| m.following_count)
            .unwrap_or(NEUTRAL_METRIC)
    }

    pub fn tweet_count(&self) -> u64 {
        self.public_metrics
            .as_ref()
            .map(|m| m.tweet_count)
            .unwrap_or(NEUTRAL_METRIC)
    }

    pub fn is_verified(&self) -> bool {
        self.verified.unwrap_or(false)
    }

    /// Account age in whole days at `now`, if `created_at` is present and
    /// parses as RFC 3339.
    pub fn account_age_days(&self, now: OffsetDateTime) -> Option<i64> {
        let created = self.created_at.as_deref()?;
        let created = OffsetDateTime::parse(created, &Rfc3339).ok()?;
        Some((now - created).whole_days())
    }
}

/// Handle-keyed profile table, loaded from the cached collection output.
#[derive(Debug, Clone, Default)]
pub struct ProfileTable {
    users: HashMap<String, UserProfile>,
}

impl ProfileTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the table from a JSON object keyed by handle.
    pub fn load(path: impl AsRef<Path>) -> crate::Result<Self> {
        let file = File::open(path.as_ref())?;
        let users: HashMap<String, UserProfile> =
            serde_json::from_reader(BufReader::new(file))?;
        Ok(Self { users })
    }

    /// Write the table back out as a handle-keyed JSON object.
    pub fn save(&self, path: impl AsRef<Path>) -> crate::Result<()> {
        let file = File::create(path.as_ref())?;
        serde_json::to_writer(BufWriter::new(file), &self.users)?;
        Ok(())
    }

    pub fn get(&self, handle: &str) -> Option<&UserProfile> {
        self.users.get(handle)
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.users.contains_key(handle)
    }

    /// Insert a profile under its own username. Later inserts win, matching
    /// the merge order of collection output files.
    pub fn insert(&mut self, profile: UserProfile) {
        self.users.insert(profile.username.clone(), profile);
    }

    /// Follower count for a handle, if the profile is cached.
    pub fn followers(&self, handle: &str) -> Option<u64> {
        self.users.get(handle).map(|u| u.followers())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &UserProfile)> {
        self.users.iter()
    }
}

impl FromIterator<UserProfile> for ProfileTable {
    fn from_iter<I: IntoIterator<Item = UserProfile>>(iter: I) -> Self {
        let mut table = Self::new();
        for profile in iter {
            table.insert(profile);
        }
        table
    }
}
