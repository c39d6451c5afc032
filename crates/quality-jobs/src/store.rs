//! Job-id-keyed store.
//!
//! The map lock is held only to insert or look up an entry. Each entry has
//! its own lock, held only for the duration of a transition or a read, never
//! across pipeline work, so readers observe either the pre-completion state
//! or the fully written terminal result.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use tokio::sync::watch;

use crate::error::{JobError, Result};
use crate::job::{Job, JobFailure, JobId, JobStatus};
use quality_engine::{AnalysisOutcome, AnalysisStage, RawDataset};

/// One job plus the signal that fires when it reaches a terminal state.
#[derive(Debug)]
pub struct JobEntry {
    job: RwLock<Job>,
    terminal: watch::Sender<bool>,
}

impl JobEntry {
    fn new(job: Job) -> Self {
        let (terminal, _) = watch::channel(false);
        Self {
            job: RwLock::new(job),
            terminal,
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Job> {
        self.job.read()
    }

    pub fn status(&self) -> JobStatus {
        self.job.read().status()
    }

    pub(crate) fn begin(&self) -> bool {
        self.job.write().begin()
    }

    pub(crate) fn take_upload(&self) -> Option<Arc<[u8]>> {
        self.job.write().take_upload()
    }

    pub(crate) fn set_stage(&self, stage: AnalysisStage) {
        self.job.write().set_stage(stage);
    }

    pub(crate) fn attach_raw(&self, raw: Arc<RawDataset>) -> bool {
        self.job.write().attach_raw(raw)
    }

    pub(crate) fn complete(&self, outcome: AnalysisOutcome) -> bool {
        let published = self.job.write().complete(outcome);
        if published {
            self.terminal.send_replace(true);
        }
        published
    }

    pub(crate) fn fail(&self, failure: JobFailure) -> bool {
        let published = self.job.write().fail(failure);
        if published {
            self.terminal.send_replace(true);
        }
        published
    }

    /// Resolves once the job is `completed` or `failed`.
    pub(crate) async fn terminated(&self) {
        let mut rx = self.terminal.subscribe();
        // The sender lives as long as `self`, so this cannot observe a
        // closed channel.
        let _ = rx.wait_for(|done| *done).await;
    }
}

/// Concurrent map of all jobs.
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<JobId, Arc<JobEntry>>>,
}

static_assertions::assert_impl_all!(JobStore: Send, Sync);
static_assertions::assert_impl_all!(JobEntry: Send, Sync);

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new `queued` job over `upload`.
    pub fn insert(&self, upload: Arc<[u8]>) -> JobId {
        let id = JobId::new();
        let entry = Arc::new(JobEntry::new(Job::new(id, upload)));
        self.jobs.write().insert(id, entry);
        id
    }

    pub fn get(&self, id: JobId) -> Result<Arc<JobEntry>> {
        self.jobs
            .read()
            .get(&id)
            .cloned()
            .ok_or(JobError::UnknownJob(id))
    }

    pub fn contains(&self, id: JobId) -> bool {
        self.jobs.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.read().is_empty()
    }

    /// Ids of all jobs, sorted for stable listing.
    pub fn ids(&self) -> Vec<JobId> {
        let mut ids: Vec<JobId> = self.jobs.read().keys().copied().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload() -> Arc<[u8]> {
        Arc::from(&b"a,b\n1,2\n"[..])
    }

    #[test]
    fn test_insert_and_get() {
        let store = JobStore::new();
        assert!(store.is_empty());

        let id = store.insert(upload());
        assert_eq!(store.len(), 1);
        assert!(store.contains(id));
        assert_eq!(store.get(id).unwrap().status(), JobStatus::Queued);
    }

    #[test]
    fn test_unknown_id() {
        let store = JobStore::new();
        let err = store.get(JobId::new()).unwrap_err();
        assert!(matches!(err, JobError::UnknownJob(_)));
    }

    #[test]
    fn test_ids_are_distinct_and_sorted() {
        let store = JobStore::new();
        for _ in 0..5 {
            store.insert(upload());
        }
        let ids = store.ids();
        assert_eq!(ids.len(), 5);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_terminated_resolves_after_failure() {
        let store = JobStore::new();
        let entry = store.get(store.insert(upload())).unwrap();
        entry.begin();

        let waiter = {
            let entry = entry.clone();
            tokio::spawn(async move { entry.terminated().await })
        };
        assert!(entry.fail(JobFailure::new("PARSE_ERROR", "bad")));
        waiter.await.unwrap();

        // Already terminal: resolves immediately
        entry.terminated().await;
        assert!(!entry.fail(JobFailure::new("PARSE_ERROR", "again")));
    }
}
