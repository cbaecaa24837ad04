//! Batched, optionally-sharded `lstat`-equivalent metadata lookups.
//!
//! Below the shard threshold the caller's own thread does all the work;
//! above it, the batch is split across a small, fixed number of auxiliary
//! threads that each stat their shard and feed a shared bounded channel,
//! matching the fan-out pattern used for parallel directory walking
//! elsewhere in this corpus (crossbeam-channel worker shards).

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;
use std::thread;

use crate::work::{Inode, Uid};

/// Above this many names, the batch is sharded across auxiliary threads.
const SHARD_THRESHOLD: usize = 1000;
/// Number of auxiliary threads a sharded batch is split across.
const SHARD_COUNT: usize = 2;

#[derive(Debug, Clone, Copy)]
pub struct StatRecord {
    pub mode: u32,
    pub size: u64,
    pub inode: Inode,
    pub nlink: u64,
    pub uid: Uid,
    pub is_dir: bool,
}

#[derive(Debug, Clone)]
pub struct StatOutcome {
    pub name: OsString,
    pub record: StatRecord,
}

/// Stats every name in `names` against `dir`, returning the successful
/// records plus the names that failed (with their error). Every input name
/// produces exactly one outcome, success or failure.
pub fn stat_batch(dir: &Path, names: Vec<OsString>) -> (Vec<StatOutcome>, Vec<(OsString, io::Error)>) {
    if names.len() > SHARD_THRESHOLD {
        stat_batch_sharded(dir, names)
    } else {
        stat_batch_serial(dir, &names)
    }
}

fn stat_one(dir: &Path, name: &OsString) -> io::Result<StatRecord> {
    let path = dir.join(name);
    let meta = fs::symlink_metadata(&path)?;
    Ok(to_record(&meta))
}

#[cfg(unix)]
fn to_record(meta: &fs::Metadata) -> StatRecord {
    use std::os::unix::fs::MetadataExt;
    StatRecord {
        mode: meta.mode(),
        size: meta.len(),
        inode: meta.ino(),
        nlink: meta.nlink(),
        uid: meta.uid(),
        is_dir: meta.is_dir(),
    }
}

#[cfg(not(unix))]
fn to_record(meta: &fs::Metadata) -> StatRecord {
    StatRecord {
        mode: 0,
        size: meta.len(),
        inode: 0,
        nlink: 1,
        uid: 0,
        is_dir: meta.is_dir(),
    }
}

fn stat_batch_serial(dir: &Path, names: &[OsString]) -> (Vec<StatOutcome>, Vec<(OsString, io::Error)>) {
    let mut ok = Vec::with_capacity(names.len());
    let mut errs = Vec::new();
    for name in names {
        match stat_one(dir, name) {
            Ok(record) => ok.push(StatOutcome {
                name: name.clone(),
                record,
            }),
            Err(err) => errs.push((name.clone(), err)),
        }
    }
    (ok, errs)
}

fn stat_batch_sharded(dir: &Path, names: Vec<OsString>) -> (Vec<StatOutcome>, Vec<(OsString, io::Error)>) {
    let chunk_size = names.len().div_ceil(SHARD_COUNT).max(1);
    let (tx, rx) = crossbeam_channel::bounded::<(Vec<StatOutcome>, Vec<(OsString, io::Error)>)>(SHARD_COUNT);

    thread::scope(|scope| {
        for chunk in names.chunks(chunk_size) {
            let tx = tx.clone();
            let chunk = chunk.to_vec();
            scope.spawn(move || {
                let shard_result = stat_batch_serial(dir, &chunk);
                let _ = tx.send(shard_result);
            });
        }
        drop(tx);

        let mut ok = Vec::with_capacity(names.len());
        let mut errs = Vec::new();
        for (shard_ok, shard_errs) in rx {
            ok.extend(shard_ok);
            errs.extend(shard_errs);
        }
        (ok, errs)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn stats_every_name_exactly_once() {
        let dir = TempDir::new().unwrap();
        let mut names = Vec::new();
        for i in 0..10 {
            let name = format!("f{i}");
            fs::write(dir.path().join(&name), b"hello").unwrap();
            names.push(OsString::from(name));
        }

        let (ok, errs) = stat_batch(dir.path(), names.clone());
        assert!(errs.is_empty());
        assert_eq!(ok.len(), names.len());
        for outcome in &ok {
            assert_eq!(outcome.record.size, 5);
            assert!(!outcome.record.is_dir);
        }
    }

    #[test]
    fn shards_large_batches_without_losing_entries() {
        let dir = TempDir::new().unwrap();
        let mut names = Vec::new();
        for i in 0..2000 {
            let name = format!("f{i}");
            fs::write(dir.path().join(&name), b"x").unwrap();
            names.push(OsString::from(name));
        }

        let (ok, errs) = stat_batch(dir.path(), names.clone());
        assert!(errs.is_empty());
        assert_eq!(ok.len(), 2000);
    }

    #[test]
    fn missing_name_surfaces_as_error_not_panic() {
        let dir = TempDir::new().unwrap();
        let (ok, errs) = stat_batch(dir.path(), vec![OsString::from("nope")]);
        assert!(ok.is_empty());
        assert_eq!(errs.len(), 1);
    }
}
