//! Per-directory enumeration, filtering, hard-link dedup, and tallying.
//!
//! One [`Accountant`] lives per worker for the worker's lifetime, so its
//! [`HardLinkSet`](std::collections::HashSet) carries state across the
//! directories that worker visits — dedup is exact within a worker and
//! approximate across workers, the documented accuracy/throughput tradeoff.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::WalkConfig;
use crate::error::AccountError;
use crate::reader::{DType, DirReader};
use crate::stat::{stat_batch, StatRecord};
use crate::work::{DirResult, Inode, Tally, WorkItem};

/// Emit a progress tick every this many entries seen in one directory.
const PROGRESS_TICK: u64 = 10_000;

pub struct AccountOutcome {
    pub result: DirResult,
    pub children: Vec<WorkItem>,
}

pub struct Accountant {
    config: Arc<WalkConfig>,
    hardlinks: HashSet<Inode>,
}

impl Accountant {
    pub fn new(config: Arc<WalkConfig>) -> Self {
        Self {
            config,
            hardlinks: HashSet::new(),
        }
    }

    /// Accounts for one directory. `on_progress(cwd, file_delta, size_delta)`
    /// is invoked every [`PROGRESS_TICK`] entries with the counts credited
    /// since the previous tick.
    pub fn account(
        &mut self,
        item: &WorkItem,
        mut on_progress: impl FnMut(&PathBuf, u64, u64),
    ) -> Result<AccountOutcome, AccountError> {
        let dir_path = &item.dir_path;
        let reader =
            DirReader::open(dir_path).map_err(|e| AccountError::from_io(dir_path.clone(), e))?;

        let mut dirs: Vec<OsString> = Vec::new();
        let mut files_maybe: Vec<OsString> = Vec::new();

        for entry in reader {
            let (name, dtype) = entry.map_err(|e| AccountError::from_io(dir_path.clone(), e))?;
            let child_path = dir_path.join(&name);
            if self.config.is_excluded(&child_path) {
                continue;
            }
            match dtype {
                DType::Dir => dirs.push(name),
                DType::Other | DType::Unknown => files_maybe.push(name),
            }
        }

        let mut tally = Tally::default();
        let mut entries_seen: u64 = 0;
        let mut last_tick_files: u64 = 0;
        let mut last_tick_size: u64 = 0;

        let (file_stats, _file_errs) = stat_batch(dir_path, files_maybe);
        for outcome in file_stats {
            entries_seen += 1;

            let record = outcome.record;
            if record.is_dir {
                // `dtype` was unavailable; rescue it into the directory set.
                dirs.push(outcome.name);
            } else {
                let child_path = dir_path.join(&outcome.name);
                if self.config.matches_include(&child_path) {
                    self.credit(&mut tally, &record);
                }
            }

            if entries_seen % PROGRESS_TICK == 0 {
                Self::tick(&mut on_progress, dir_path, &tally, &mut last_tick_files, &mut last_tick_size);
            }
        }

        let mut children = Vec::with_capacity(dirs.len());
        let (dir_stats, _dir_errs) = stat_batch(dir_path, dirs);
        for outcome in dir_stats {
            entries_seen += 1;

            let record = outcome.record;
            let child_path = dir_path.join(&outcome.name);
            let name_str = outcome.name.to_string_lossy().into_owned();

            // Non-matching subdirectories are still traversed (so the tree
            // below them is seen) but their own entry is not credited here.
            if self.config.matches_include(&child_path) {
                tally.credit(record.uid, record.size);
            }

            children.push(WorkItem {
                dir_path: child_path,
                name: name_str,
                parent_inode: item.inode,
                inode: record.inode,
            });

            if entries_seen % PROGRESS_TICK == 0 {
                Self::tick(&mut on_progress, dir_path, &tally, &mut last_tick_files, &mut last_tick_size);
            }
        }

        let result = DirResult {
            name: item.name.clone(),
            parent_inode: item.parent_inode,
            inode: item.inode,
            tally,
        };

        Ok(AccountOutcome { result, children })
    }

    fn tick(
        on_progress: &mut impl FnMut(&PathBuf, u64, u64),
        dir_path: &PathBuf,
        tally: &Tally,
        last_files: &mut u64,
        last_size: &mut u64,
    ) {
        let cur_files = tally.sum_files();
        let cur_size = tally.sum_size();
        on_progress(dir_path, cur_files - *last_files, cur_size - *last_size);
        *last_files = cur_files;
        *last_size = cur_size;
    }

    /// Hard-link rule: a link count of 1 always credits bytes; above that,
    /// only the first sighting of the inode credits bytes, later sightings
    /// still credit a file.
    fn credit(&mut self, tally: &mut Tally, record: &StatRecord) {
        let credit_size = record.nlink <= 1 || self.hardlinks.insert(record.inode);
        if credit_size {
            tally.credit(record.uid, record.size);
        } else {
            tally.credit_file_only(record.uid);
        }
    }
}
