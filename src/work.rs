//! Shared data model: work items, per-directory tallies, and the message
//! shapes passed between workers, the coordinator, and the main flow.

use std::collections::HashMap;
use std::path::PathBuf;

pub type Inode = u64;
pub type Uid = u32;

/// A directory queued for accounting. Carries its own absolute path rather
/// than a name to resolve against a shared process working directory —
/// workers here are threads in one address space, so there is no `cwd` to
/// race on; see the design notes on the cwd-per-process pitfall.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub dir_path: PathBuf,
    pub name: String,
    pub parent_inode: Inode,
    pub inode: Inode,
}

/// Per-UID file counts and byte totals accumulated for one directory's
/// direct children, or rolled up from a subtree.
#[derive(Debug, Default, Clone)]
pub struct Tally {
    pub files_by_uid: HashMap<Uid, u64>,
    pub size_by_uid: HashMap<Uid, u64>,
}

impl Tally {
    pub fn credit(&mut self, uid: Uid, size: u64) {
        *self.files_by_uid.entry(uid).or_insert(0) += 1;
        *self.size_by_uid.entry(uid).or_insert(0) += size;
    }

    /// Credits a file count without crediting bytes — used for a hard-link
    /// sighting whose bytes were already credited on first sight.
    pub fn credit_file_only(&mut self, uid: Uid) {
        *self.files_by_uid.entry(uid).or_insert(0) += 1;
    }

    pub fn add_assign(&mut self, other: &Tally) {
        for (&uid, &n) in &other.files_by_uid {
            *self.files_by_uid.entry(uid).or_insert(0) += n;
        }
        for (&uid, &n) in &other.size_by_uid {
            *self.size_by_uid.entry(uid).or_insert(0) += n;
        }
    }

    pub fn sum_files(&self) -> u64 {
        self.files_by_uid.values().sum()
    }

    pub fn sum_size(&self) -> u64 {
        self.size_by_uid.values().sum()
    }
}

/// Emitted once per successfully accounted directory.
#[derive(Debug, Clone)]
pub struct DirResult {
    pub name: String,
    pub parent_inode: Inode,
    pub inode: Inode,
    pub tally: Tally,
}

/// Signals that a directory could not be accounted. Carries no tally
/// contribution; consumed only for termination counting.
#[derive(Debug, Clone)]
pub struct ErrResult {
    pub path: PathBuf,
    pub parent_inode: Inode,
}

pub enum ResultMsg {
    Dir(DirResult),
    Err(ErrResult),
}

pub enum WorkMsg {
    Item(WorkItem),
    Shutdown,
}

/// Messages workers send to the coordinator.
pub enum StateMsg {
    /// A worker finished accounting one directory and submitted `submitted`
    /// children as new work.
    DirDone { worker_id: usize, submitted: usize },
    /// Periodic progress tick: `count`/`size` are the delta since the last
    /// tick from this worker, not a running total.
    Progress {
        cwd: PathBuf,
        count: u64,
        size: u64,
    },
}

/// Sent by the coordinator once submitted == done across all workers.
pub struct ManagerDoneMsg {
    pub total_work: usize,
}
