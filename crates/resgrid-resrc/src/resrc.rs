//! In-memory resource with an allocation/reservation state machine.
//!
//! A [`Resrc`] tracks a capacity (`size`), the amount still `available`, and
//! per-job allocations and reservations. Committing a job takes everything
//! that is still available; releasing returns exactly what that job holds.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ResourceError, ResourceResult};
use crate::resource::{JobId, Resource};

/// Derived scheduling state of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceState {
    /// Nothing committed.
    Idle,
    /// At least one job holds an allocation.
    Allocated,
    /// Only reservations are held.
    Reserved,
}

impl ResourceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceState::Idle => "idle",
            ResourceState::Allocated => "allocated",
            ResourceState::Reserved => "reserved",
        }
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable part of a resource, guarded by the resource's lock.
#[derive(Debug, Default)]
struct Holdings {
    available: u64,
    allocs: BTreeMap<JobId, u64>,
    reservtns: BTreeMap<JobId, u64>,
}

impl Holdings {
    fn state(&self) -> ResourceState {
        if !self.allocs.is_empty() {
            ResourceState::Allocated
        } else if !self.reservtns.is_empty() {
            ResourceState::Reserved
        } else {
            ResourceState::Idle
        }
    }

    fn holds(&self, job_id: JobId) -> bool {
        self.allocs.contains_key(&job_id) || self.reservtns.contains_key(&job_id)
    }
}

/// A schedulable resource held in memory.
#[derive(Debug)]
pub struct Resrc {
    kind: String,
    name: String,
    path: String,
    id: i64,
    size: u64,
    tags: BTreeSet<String>,
    holdings: Mutex<Holdings>,
}

impl Resrc {
    /// Create an idle resource of the given type with capacity `size`.
    pub fn new(kind: &str, name: &str, id: i64, size: u64) -> Self {
        Self {
            kind: kind.to_string(),
            name: name.to_string(),
            path: format!("/{name}"),
            id,
            size,
            tags: BTreeSet::new(),
            holdings: Mutex::new(Holdings {
                available: size,
                ..Holdings::default()
            }),
        }
    }

    /// Set the hierarchical path (e.g. `/cluster0/rack0/node3`).
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Attach free-form tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn available(&self) -> u64 {
        self.lock().available
    }

    pub fn state(&self) -> ResourceState {
        self.lock().state()
    }

    /// Whether `job_id` currently holds an allocation or reservation here.
    pub fn is_held_by(&self, job_id: JobId) -> bool {
        self.lock().holds(job_id)
    }

    /// Jobs holding an allocation, in ascending id order.
    pub fn allocated_jobs(&self) -> Vec<JobId> {
        self.lock().allocs.keys().copied().collect()
    }

    /// Jobs holding a reservation, in ascending id order.
    pub fn reserved_jobs(&self) -> Vec<JobId> {
        self.lock().reservtns.keys().copied().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Holdings> {
        self.holdings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take everything still available for `job_id`, recording it with `record`.
    fn commit(
        &self,
        job_id: JobId,
        record: impl FnOnce(&mut Holdings, u64),
    ) -> ResourceResult<()> {
        if job_id <= 0 {
            return Err(ResourceError::InvalidJob(job_id));
        }
        let mut holdings = self.lock();
        if holdings.holds(job_id) {
            return Err(ResourceError::AlreadyHeld {
                resource: self.name.clone(),
                job_id,
            });
        }
        if holdings.available == 0 {
            return Err(ResourceError::Unavailable {
                resource: self.name.clone(),
                job_id,
            });
        }
        let amount = holdings.available;
        holdings.available = 0;
        record(&mut holdings, amount);
        Ok(())
    }
}

impl Resource for Resrc {
    fn name(&self) -> &str {
        &self.name
    }

    fn allocate(&self, job_id: JobId) -> ResourceResult<()> {
        self.commit(job_id, |h, amount| {
            h.allocs.insert(job_id, amount);
        })?;
        debug!(resource = %self.path, job_id, "resource allocated");
        Ok(())
    }

    fn reserve(&self, job_id: JobId) -> ResourceResult<()> {
        self.commit(job_id, |h, amount| {
            h.reservtns.insert(job_id, amount);
        })?;
        debug!(resource = %self.path, job_id, "resource reserved");
        Ok(())
    }

    fn release(&self, job_id: JobId) -> ResourceResult<()> {
        let mut holdings = self.lock();
        if !holdings.holds(job_id) {
            return Err(ResourceError::NotHeld {
                resource: self.name.clone(),
                job_id,
            });
        }
        let returned = holdings.allocs.remove(&job_id).unwrap_or(0)
            + holdings.reservtns.remove(&job_id).unwrap_or(0);
        holdings.available = (holdings.available + returned).min(self.size);
        debug!(resource = %self.path, job_id, returned, "resource released");
        Ok(())
    }

    fn to_json(&self, out: &mut Map<String, Value>) -> ResourceResult<()> {
        let holdings = self.lock();
        out.insert("type".to_string(), Value::from(self.kind.as_str()));
        out.insert("path".to_string(), Value::from(self.path.as_str()));
        out.insert("name".to_string(), Value::from(self.name.as_str()));
        out.insert("id".to_string(), Value::from(self.id));
        out.insert("size".to_string(), Value::from(self.size));
        out.insert("available".to_string(), Value::from(holdings.available));
        out.insert("state".to_string(), Value::from(holdings.state().as_str()));
        if !self.tags.is_empty() {
            let tags = serde_json::to_value(&self.tags)
                .map_err(|e| ResourceError::Serialize(e.to_string()))?;
            out.insert("tags".to_string(), tags);
        }
        Ok(())
    }
}

impl fmt::Display for Resrc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let holdings = self.lock();
        write!(
            f,
            "{} {} (id {}) {} {}/{}",
            self.kind,
            self.name,
            self.id,
            holdings.state(),
            holdings.available,
            self.size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core(name: &str) -> Resrc {
        Resrc::new("core", name, 0, 1)
    }

    #[test]
    fn new_resource_is_idle_and_fully_available() {
        let r = Resrc::new("node", "node0", 7, 16);
        assert_eq!(r.state(), ResourceState::Idle);
        assert_eq!(r.available(), 16);
        assert_eq!(r.path(), "/node0");
    }

    #[test]
    fn allocate_takes_everything_available() {
        let r = Resrc::new("memory", "mem0", 0, 4096);
        r.allocate(11).unwrap();

        assert_eq!(r.state(), ResourceState::Allocated);
        assert_eq!(r.available(), 0);
        assert_eq!(r.allocated_jobs(), vec![11]);
    }

    #[test]
    fn allocate_exhausted_resource_fails() {
        let r = core("core0");
        r.allocate(1).unwrap();

        let err = r.allocate(2).unwrap_err();
        assert!(matches!(err, ResourceError::Unavailable { job_id: 2, .. }));
        assert_eq!(r.allocated_jobs(), vec![1]);
    }

    #[test]
    fn allocate_twice_by_same_job_fails() {
        let r = core("core0");
        r.allocate(1).unwrap();
        assert!(matches!(
            r.allocate(1),
            Err(ResourceError::AlreadyHeld { job_id: 1, .. })
        ));
    }

    #[test]
    fn non_positive_job_id_rejected() {
        let r = core("core0");
        assert_eq!(r.allocate(0), Err(ResourceError::InvalidJob(0)));
        assert_eq!(r.reserve(-3), Err(ResourceError::InvalidJob(-3)));
        assert_eq!(r.state(), ResourceState::Idle);
    }

    #[test]
    fn reserve_then_release() {
        let r = core("core0");
        r.reserve(5).unwrap();
        assert_eq!(r.state(), ResourceState::Reserved);
        assert_eq!(r.reserved_jobs(), vec![5]);

        r.release(5).unwrap();
        assert_eq!(r.state(), ResourceState::Idle);
        assert_eq!(r.available(), 1);
    }

    #[test]
    fn release_by_non_holder_fails_without_mutation() {
        let r = core("core0");
        r.allocate(1).unwrap();

        let err = r.release(2).unwrap_err();
        assert!(matches!(err, ResourceError::NotHeld { job_id: 2, .. }));
        assert_eq!(r.state(), ResourceState::Allocated);
        assert_eq!(r.available(), 0);
        assert_eq!(r.allocated_jobs(), vec![1]);
    }

    #[test]
    fn to_json_writes_own_fields() {
        let r = Resrc::new("node", "node3", 3, 2)
            .with_path("/c0/rack0/node3")
            .with_tags(["gpu"]);
        r.reserve(9).unwrap();

        let mut out = Map::new();
        r.to_json(&mut out).unwrap();

        assert_eq!(out["type"], "node");
        assert_eq!(out["path"], "/c0/rack0/node3");
        assert_eq!(out["name"], "node3");
        assert_eq!(out["id"], 3);
        assert_eq!(out["size"], 2);
        assert_eq!(out["available"], 0);
        assert_eq!(out["state"], "reserved");
        assert_eq!(out["tags"], serde_json::json!(["gpu"]));
    }

    #[test]
    fn display_is_single_line() {
        let r = Resrc::new("socket", "socket1", 1, 8);
        assert_eq!(r.to_string(), "socket socket1 (id 1) idle 8/8");
    }
}
