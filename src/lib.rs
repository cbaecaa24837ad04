//! fsacct - high-throughput parallel filesystem accounting
//!
//! Walks one or more directory trees with a fixed pool of worker threads
//! coordinated by an explicit termination-detection protocol, tallying file
//! counts and byte totals per owning user and rolling subtree totals up to
//! their ancestors.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam_channel::unbounded;

use crate::config::WalkConfig;
use crate::coordinator::run_coordinator;
use crate::store::ResultStore;
use crate::work::{Inode, ManagerDoneMsg, ResultMsg, StateMsg, WorkItem, WorkMsg};
use crate::worker::run_worker;

pub mod accountant;
pub mod config;
pub mod error;
pub mod format;
pub mod output;
pub mod reader;
pub mod stat;
pub mod store;
pub mod users;
pub mod work;

mod coordinator;
mod worker;

/// Tunables for one [`traverse`] run, independent of the filter/limit
/// configuration carried in [`WalkConfig`].
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Number of worker threads pulling from the shared work queue.
    pub num_workers: usize,
    /// How often the coordinator reports progress to stderr; `None`
    /// disables status reporting entirely.
    pub status_interval: Option<Duration>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            num_workers: 8,
            status_interval: None,
        }
    }
}

/// Walks every root in `roots` to completion and returns the populated
/// result store along with each root's inode (for use as
/// [`store::ResultStore::aggregate`]'s root set).
///
/// Each root is canonicalized and stat'd up front; a root that does not
/// exist or cannot be accessed fails the whole call, since there is no
/// partial-roots result worth returning.
pub fn traverse(
    roots: &[PathBuf],
    config: Arc<WalkConfig>,
    options: &EngineOptions,
) -> Result<(ResultStore, Vec<Inode>)> {
    let mut canonical_roots = Vec::with_capacity(roots.len());
    for root in roots {
        let canonical = root
            .canonicalize()
            .with_context(|| format!("failed to access path: {}", root.display()))?;
        canonical_roots.push((canonical, root.to_string_lossy().into_owned()));
    }
    // Multiple roots are de-duplicated by prefix: a root nested under
    // another already-kept root would otherwise be walked twice.
    canonical_roots.sort_by(|a, b| a.0.cmp(&b.0));
    let mut deduped_roots: Vec<(PathBuf, String)> = Vec::with_capacity(canonical_roots.len());
    for (canonical, display) in canonical_roots {
        let nested = deduped_roots.iter().any(|(kept, _)| canonical.starts_with(kept));
        if !nested {
            deduped_roots.push((canonical, display));
        }
    }

    let mut root_items = Vec::with_capacity(deduped_roots.len());
    let mut root_inodes = Vec::with_capacity(deduped_roots.len());
    for (canonical, display) in deduped_roots {
        let inode = inode_of(&canonical)?;
        root_inodes.push(inode);
        root_items.push(WorkItem {
            dir_path: canonical,
            name: display,
            parent_inode: 0,
            inode,
        });
    }
    let num_roots = root_items.len();

    let (work_tx, work_rx) = unbounded::<WorkMsg>();
    let (result_tx, result_rx) = unbounded::<ResultMsg>();
    let (state_tx, state_rx) = unbounded::<StateMsg>();
    let (done_tx, done_rx) = crossbeam_channel::bounded::<ManagerDoneMsg>(1);

    let store = thread::scope(|scope| -> Result<ResultStore> {
        let coordinator_work_tx = work_tx.clone();
        scope.spawn(move || {
            run_coordinator(
                options.num_workers,
                num_roots,
                options.status_interval,
                state_rx,
                coordinator_work_tx,
                done_tx,
            );
        });

        let mut worker_handles = Vec::with_capacity(options.num_workers);
        for worker_id in 0..options.num_workers {
            let worker_config = Arc::clone(&config);
            let work_rx = work_rx.clone();
            let work_tx = work_tx.clone();
            let result_tx = result_tx.clone();
            let state_tx = state_tx.clone();
            worker_handles.push(scope.spawn(move || {
                run_worker(worker_id, worker_config, work_rx, work_tx, result_tx, state_tx)
            }));
        }

        for item in root_items {
            work_tx
                .send(WorkMsg::Item(item))
                .context("worker pool closed before it could accept the root directories")?;
        }

        // Drop our own handles so the channels close once the pool shuts
        // down; otherwise `result_rx`'s iterator below never terminates.
        drop(work_tx);
        drop(work_rx);
        drop(state_tx);
        drop(result_tx);

        let mut store = ResultStore::new();
        for msg in result_rx {
            if let ResultMsg::Dir(dir) = msg {
                store.insert(dir);
            }
        }

        let _ = done_rx.recv();

        for handle in worker_handles {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(account_err)) => return Err(account_err.into()),
                Err(_) => anyhow::bail!("a worker thread panicked"),
            }
        }

        Ok(store)
    })?;

    Ok((store, root_inodes))
}

#[cfg(unix)]
fn inode_of(path: &Path) -> Result<Inode> {
    use std::os::unix::fs::MetadataExt;
    Ok(std::fs::symlink_metadata(path)?.ino())
}

#[cfg(not(unix))]
fn inode_of(path: &Path) -> Result<Inode> {
    let _ = path;
    Ok(0)
}
