//! Year-partitioned sequential code allocation.
//!
//! # Responsibility
//! - Assign `PROJ-YYYY-NNN` codes to a whole batch before any insert.
//!
//! # Invariants
//! - Drafts are grouped by year bucket; relative order inside a group is
//!   preserved and numbering continues after the highest stored sequence.
//! - Output order equals input order.
//! - Only codes with the exact `PROJ-<bucket>-<digits>` shape count toward
//!   the highest stored sequence.
//!
//! Allocation reads and the later inserts do not share a transaction; two
//! concurrent imports for the same year can pick the same numbers, and the
//! loser surfaces as a per-record `DuplicateCode` failure at commit time.

use crate::model::code::{ProjectCode, YearBucket};
use crate::model::project::{PendingProject, ProjectDraft};
use crate::repo::project_repo::{ProjectRepository, RepoResult};
use log::debug;
use std::collections::BTreeMap;

/// Code allocator bound to one project store.
pub struct IdentifierAllocator<'repo, R: ?Sized> {
    repo: &'repo R,
}

impl<'repo, R: ProjectRepository + ?Sized> IdentifierAllocator<'repo, R> {
    pub fn new(repo: &'repo R) -> Self {
        Self { repo }
    }

    /// Allocates codes for a batch; undated drafts land in bucket `0000`.
    pub fn allocate(&self, drafts: Vec<ProjectDraft>) -> RepoResult<Vec<PendingProject>> {
        let buckets: Vec<YearBucket> = drafts.iter().map(ProjectDraft::year_bucket).collect();

        // Keyed by rendered prefix: `Year(0)` and `Undated` share `0000`.
        let mut next_by_prefix: BTreeMap<String, u32> = BTreeMap::new();
        for bucket in &buckets {
            let prefix = bucket.code_prefix();
            if !next_by_prefix.contains_key(&prefix) {
                let next = self.highest_existing(*bucket)? + 1;
                next_by_prefix.insert(prefix, next);
            }
        }

        let mut pending = Vec::with_capacity(drafts.len());
        for (draft, bucket) in drafts.into_iter().zip(buckets) {
            let slot = next_by_prefix.entry(bucket.code_prefix()).or_insert(1);
            let code = ProjectCode::new(bucket, *slot);
            *slot += 1;
            pending.push(PendingProject { code, draft });
        }

        debug!(
            "event=import_allocate module=import status=ok drafts={} buckets={}",
            pending.len(),
            next_by_prefix.len()
        );
        Ok(pending)
    }

    /// Allocates one code for a single draft.
    ///
    /// `undated_fallback` replaces the `0000` bucket when the draft has no
    /// dates; manual entry passes the current year.
    pub fn allocate_one(
        &self,
        draft: ProjectDraft,
        undated_fallback: YearBucket,
    ) -> RepoResult<PendingProject> {
        let bucket = draft
            .dated_year()
            .map_or(undated_fallback, YearBucket::Year);
        let code = ProjectCode::new(bucket, self.highest_existing(bucket)? + 1);
        Ok(PendingProject { code, draft })
    }

    /// Highest stored sequence number in `bucket`, or 0.
    pub fn highest_existing(&self, bucket: YearBucket) -> RepoResult<u32> {
        let existing = self.repo.find_by_code_prefix(&bucket.code_prefix())?;
        Ok(existing
            .iter()
            .filter_map(|project| project.code.sequence_in(bucket))
            .max()
            .unwrap_or(0))
    }
}
