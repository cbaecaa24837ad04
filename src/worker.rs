//! Worker pool: W independent threads, each running an [`Accountant`] in a
//! loop, pulling work items from a shared queue and pushing discovered
//! child directories back onto it.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};

use crate::accountant::Accountant;
use crate::config::WalkConfig;
use crate::error::AccountError;
use crate::work::{ErrResult, ResultMsg, StateMsg, WorkMsg};

/// Runs one worker's loop until it receives `WorkMsg::Shutdown` or hits a
/// fatal error. `AccessDenied`/`NotFound` are logged and absorbed per item;
/// any other `AccountError` (e.g. a raw I/O fault) is fatal for this worker
/// — its current item is still reported so the termination count stays
/// balanced, but the worker then stops and returns the error to the caller.
pub fn run_worker(
    worker_id: usize,
    config: Arc<WalkConfig>,
    work_rx: Receiver<WorkMsg>,
    work_tx: Sender<WorkMsg>,
    result_tx: Sender<ResultMsg>,
    state_tx: Sender<StateMsg>,
) -> Result<(), AccountError> {
    let mut accountant = Accountant::new(config);

    while let Ok(msg) = work_rx.recv() {
        let item = match msg {
            WorkMsg::Item(item) => item,
            WorkMsg::Shutdown => break,
        };
        let dir_path = item.dir_path.clone();
        let parent_inode = item.parent_inode;

        let outcome = accountant.account(&item, |cwd, file_delta, size_delta| {
            let _ = state_tx.send(StateMsg::Progress {
                cwd: cwd.clone(),
                count: file_delta,
                size: size_delta,
            });
        });

        match outcome {
            Ok(outcome) => {
                let submitted = outcome.children.len();
                for child in outcome.children {
                    // A send failure means the channel closed during
                    // shutdown; the item is simply dropped.
                    let _ = work_tx.send(WorkMsg::Item(child));
                }
                let _ = result_tx.send(ResultMsg::Dir(outcome.result));
                let _ = state_tx.send(StateMsg::DirDone { worker_id, submitted });
            }
            Err(err) => {
                log_account_error(&err);
                let _ = result_tx.send(ResultMsg::Err(ErrResult {
                    path: dir_path,
                    parent_inode,
                }));
                let _ = state_tx.send(StateMsg::DirDone {
                    worker_id,
                    submitted: 0,
                });

                if matches!(err, AccountError::Io { .. }) {
                    return Err(err);
                }
            }
        }
    }

    Ok(())
}

fn log_account_error(err: &AccountError) {
    match err {
        AccountError::AccessDenied(path) => {
            log::warn!("access denied to directory {}", path.display());
        }
        AccountError::NotFound(path) => {
            log::warn!("could not access dir,file or file in dir {}", path.display());
        }
        AccountError::Io { path, source } => {
            log::error!("error reading {}: {}", path.display(), source);
        }
    }
}
