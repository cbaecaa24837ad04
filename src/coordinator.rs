//! Termination-detecting supervisor: tracks submitted/done counts per
//! worker, shuts down the pool on quiescence, and emits periodic progress
//! lines to stderr.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};

use crate::format::to_human;
use crate::work::{ManagerDoneMsg, StateMsg, WorkMsg};

/// Runs the coordinator loop to completion. `num_roots` seeds the
/// bootstrap count (each root counts as one submission before any worker
/// starts). Blocks until the pool quiesces, then pushes `num_workers`
/// shutdown messages and reports `total_work` on `done_tx`.
pub fn run_coordinator(
    num_workers: usize,
    num_roots: usize,
    status_interval: Option<Duration>,
    state_rx: Receiver<StateMsg>,
    work_tx: Sender<WorkMsg>,
    done_tx: Sender<ManagerDoneMsg>,
) {
    let mut submitted = vec![0i64; num_workers];
    let mut done = vec![0i64; num_workers];
    submitted[0] += num_roots as i64;

    let mut cum_count: u64 = 0;
    let mut cum_size: u64 = 0;
    let mut current_dir = PathBuf::new();
    let mut last_report = Instant::now();
    let start = Instant::now();

    for msg in state_rx {
        match msg {
            StateMsg::DirDone { worker_id, submitted: n } => {
                submitted[worker_id] += n as i64;
                done[worker_id] += 1;

                let total_submitted: i64 = submitted.iter().sum();
                let total_done: i64 = done.iter().sum();
                if total_submitted == total_done {
                    for _ in 0..num_workers {
                        let _ = work_tx.send(WorkMsg::Shutdown);
                    }
                    let _ = done_tx.send(ManagerDoneMsg {
                        total_work: total_done as usize,
                    });
                    break;
                }
            }
            StateMsg::Progress { cwd, count, size } => {
                cum_count += count;
                cum_size += size;
                current_dir = cwd;

                if let Some(interval) = status_interval {
                    if last_report.elapsed() >= interval {
                        report_progress(start, cum_count, cum_size, &current_dir);
                        last_report = Instant::now();
                    }
                }
            }
        }
    }
}

fn report_progress(start: Instant, cum_count: u64, cum_size: u64, current_dir: &PathBuf) {
    let elapsed = start.elapsed().as_secs_f64().max(1e-6);
    let rate = cum_count as f64 / elapsed;
    eprintln!(
        "# {:>5.0} files/s {:>6} {:>4} {}",
        rate,
        cum_count,
        to_human(cum_size),
        current_dir.display()
    );
}
