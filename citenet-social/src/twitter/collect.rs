//! Collection loops for user profiles and follow lists.
//!
//! The REST API enforces aggressive rate limits, so both loops share one
//! contract: on a rate-limit response, flush everything accumulated so far
//! to durable storage, sleep through a fixed multi-minute cooldown, then
//! resume exactly where the pass stopped (same batch, or same continuation
//! token). Any other API failure abandons the affected batch, keeps what was
//! already collected, and moves on — a failed handle is never worth the run.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use citenet_common::ProfileTable;
use citenet_http::HttpError;
use tokio::time::sleep;

use crate::twitter::client::{FollowKind, TwitterApi, MAX_USERS_PER_BATCH};
use crate::twitter::types::User;

/// Fixed cooldown applied when the API reports a rate-limit window.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(15 * 60);

pub struct UserCollector {
    api: TwitterApi,
    out_dir: PathBuf,
    batch_size: usize,
    cooldown: Duration,
    flush_seq: AtomicU32,
}

impl UserCollector {
    pub fn new(api: TwitterApi, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            api,
            out_dir: out_dir.into(),
            batch_size: MAX_USERS_PER_BATCH,
            cooldown: DEFAULT_COOLDOWN,
            flush_seq: AtomicU32::new(0),
        }
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Batches are capped at the endpoint maximum regardless of the
    /// requested size.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.clamp(1, MAX_USERS_PER_BATCH);
        self
    }

    /// Collect profile data for `handles`, writing timestamped JSON batch
    /// files into the output directory. Returns the number of profiles the
    /// API resolved.
    pub async fn collect_users(&self, handles: &[String]) -> Result<usize> {
        std::fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("creating {}", self.out_dir.display()))?;

        let mut pending: Vec<User> = Vec::new();
        let mut resolved = 0usize;

        for (batch_no, batch) in handles.chunks(self.batch_size).enumerate() {
            loop {
                match self.api.users_by(batch).await {
                    Ok(resp) => {
                        if let Some(errors) = &resp.errors {
                            tracing::debug!(
                                batch = batch_no,
                                unresolved = errors.len(),
                                "some handles did not resolve"
                            );
                        }
                        if let Some(users) = resp.data {
                            resolved += users.len();
                            pending.extend(users);
                        }
                        tracing::info!(batch = batch_no, resolved, "users batch done");
                        break;
                    }
                    Err(HttpError::RateLimited { retry_after_secs, .. }) => {
                        self.flush_users(&mut pending)?;
                        tracing::warn!(
                            batch = batch_no,
                            ?retry_after_secs,
                            cooldown_secs = self.cooldown.as_secs(),
                            "rate limited; flushed partials, cooling down"
                        );
                        sleep(self.cooldown).await;
                        // retry the same batch
                    }
                    Err(err) => {
                        tracing::warn!(batch = batch_no, error = %err, "batch failed; skipping");
                        self.flush_users(&mut pending)?;
                        break;
                    }
                }
            }
        }

        self.flush_users(&mut pending)?;
        Ok(resolved)
    }

    /// Page through followers or following for one user id. Partial pages
    /// are written out before every cooldown, and the final result replaces
    /// them once the walk completes.
    pub async fn collect_follows(&self, user_id: &str, kind: FollowKind) -> Result<Vec<User>> {
        std::fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("creating {}", self.out_dir.display()))?;

        let mut collected: Vec<User> = Vec::new();
        let mut token: Option<String> = None;

        loop {
            match self.api.follows_page(user_id, kind, token.as_deref()).await {
                Ok(page) => {
                    if let Some(users) = page.data {
                        collected.extend(users);
                    }
                    token = page.meta.and_then(|m| m.next_token);
                    if token.is_none() {
                        break;
                    }
                }
                Err(HttpError::RateLimited { retry_after_secs, .. }) => {
                    self.write_follows(user_id, kind, &collected)?;
                    tracing::warn!(
                        user_id,
                        kind = kind.as_str(),
                        collected = collected.len(),
                        ?retry_after_secs,
                        cooldown_secs = self.cooldown.as_secs(),
                        "rate limited; flushed partial pages, cooling down"
                    );
                    sleep(self.cooldown).await;
                    // resume from the same continuation token
                }
                Err(err) => {
                    tracing::warn!(
                        user_id,
                        kind = kind.as_str(),
                        error = %err,
                        "follows pass aborted for this user"
                    );
                    break;
                }
            }
        }

        self.write_follows(user_id, kind, &collected)?;
        Ok(collected)
    }

    fn flush_users(&self, pending: &mut Vec<User>) -> Result<()> {
        if pending.is_empty() {
            return Ok(());
        }
        let seq = self.flush_seq.fetch_add(1, Ordering::Relaxed);
        let name = format!("{}-{seq}.json", chrono::Utc::now().timestamp());
        let path = self.out_dir.join(name);
        write_json(&path, &pending)?;
        tracing::info!(saved = pending.len(), path = %path.display(), "flushed user batch");
        pending.clear();
        Ok(())
    }

    // FIXME: partial flushes share the final file name; write a .partial
    // suffix so an interrupted walk is distinguishable from a complete one.
    fn write_follows(&self, user_id: &str, kind: FollowKind, users: &[User]) -> Result<PathBuf> {
        let path = self
            .out_dir
            .join(format!("{user_id}-{}.json", kind.as_str()));
        write_json(&path, &users)?;
        Ok(path)
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer(BufWriter::new(file), value)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Merge collection output files (each a JSON list of user objects) into the
/// single handle-keyed profile table. Files are read in the given order, so
/// later files win on duplicate handles.
pub fn combine_user_files<P: AsRef<Path>>(paths: &[P]) -> Result<ProfileTable> {
    let mut table = ProfileTable::new();
    for path in paths {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let users: Vec<User> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing {}", path.display()))?;
        for user in users {
            table.insert(user.into());
        }
    }
    tracing::info!(users = table.len(), files = paths.len(), "combined user data");
    Ok(table)
}

/// Handles present in the citation data but absent from the profile table —
/// the re-collection worklist.
pub fn missing_handles<'a, I>(authors: I, table: &ProfileTable) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut missing: Vec<String> = authors
        .into_iter()
        .filter(|a| !table.contains(a))
        .cloned()
        .collect();
    missing.sort();
    missing.dedup();
    missing
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(handle: &str, followers: u64) -> User {
        User {
            id: format!("id-{handle}"),
            username: handle.into(),
            name: None,
            created_at: None,
            verified: None,
            description: None,
            location: None,
            profile_image_url: None,
            protected: None,
            url: None,
            public_metrics: Some(crate::twitter::types::PublicMetrics {
                followers_count: followers,
                following_count: 0,
                tweet_count: 0,
                listed_count: None,
            }),
        }
    }

    fn dump(dir: &Path, name: &str, users: &[User]) -> PathBuf {
        let path = dir.join(name);
        write_json(&path, &users).unwrap();
        path
    }

    #[test]
    fn combine_merges_with_later_files_winning() {
        let dir = tempfile::tempdir().unwrap();
        let first = dump(dir.path(), "100.json", &[user("a", 1), user("b", 2)]);
        let second = dump(dir.path(), "200.json", &[user("b", 9), user("c", 3)]);

        let table = combine_user_files(&[first, second]).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.followers("b"), Some(9));
    }

    #[test]
    fn missing_handles_dedupes_and_sorts() {
        let table: ProfileTable = vec![user("known", 1).into()].into_iter().collect();
        let authors: Vec<String> = ["zeta", "known", "alpha", "zeta"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(missing_handles(&authors, &table), vec!["alpha", "zeta"]);
    }
}
