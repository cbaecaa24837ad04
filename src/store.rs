//! Result store and depth-first aggregator: collects per-directory results
//! keyed by inode, then rolls subtree tallies up to ancestors, subject to
//! `--exclude-subdirs`, `--max-depth`, and the file/size limits.

use std::collections::HashMap;

use crate::config::WalkConfig;
use crate::format::to_human;
use crate::users::UserTable;
use crate::work::{DirResult, Inode, Tally};

struct StoredDir {
    name: String,
    tally: Tally,
    counted: bool,
}

/// One emitted output line, pre-filter-applied.
#[derive(Debug, Clone)]
pub struct OutputRow {
    pub user: Option<String>,
    pub files: u64,
    pub size: u64,
    pub path: String,
}

pub struct ResultStore {
    all: HashMap<Inode, StoredDir>,
    tree: HashMap<Inode, Vec<Inode>>,
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultStore {
    pub fn new() -> Self {
        Self {
            all: HashMap::new(),
            tree: HashMap::new(),
        }
    }

    pub fn insert(&mut self, result: DirResult) {
        self.tree.entry(result.parent_inode).or_default().push(result.inode);
        self.all.insert(
            result.inode,
            StoredDir {
                name: result.name,
                tally: result.tally,
                counted: false,
            },
        );
    }

    /// Aggregates each root independently and returns the filtered, rolled-
    /// up report rows, in traversal order.
    pub fn aggregate(&mut self, roots: &[Inode], config: &WalkConfig, users: &UserTable) -> Vec<OutputRow> {
        let mut rows = Vec::new();
        for &root in roots {
            self.aggregate_root(root, config, users, &mut rows);
        }
        rows
    }

    fn aggregate_root(&mut self, root: Inode, config: &WalkConfig, users: &UserTable, rows: &mut Vec<OutputRow>) {
        // Inode missing from `ALL` means the root itself errored; that
        // branch is silently trimmed.
        if !self.all.contains_key(&root) {
            return;
        }

        struct Frame {
            inode: Inode,
            parent_path: String,
            depth: usize,
        }

        // Pop a node, append it, push its children: this produces a
        // post-order traversal when `order` is later consumed in reverse.
        let mut stack = vec![Frame {
            inode: root,
            parent_path: String::new(),
            depth: 0,
        }];
        let mut order: Vec<(Inode, String, usize)> = Vec::new();

        while let Some(frame) = stack.pop() {
            let name = match self.all.get(&frame.inode) {
                Some(dir) => dir.name.clone(),
                None => continue,
            };
            let path = if frame.parent_path.is_empty() {
                name
            } else {
                format!("{}/{}", frame.parent_path, name)
            };

            if let Some(children) = self.tree.get(&frame.inode) {
                for &child in children {
                    if self.all.contains_key(&child) {
                        stack.push(Frame {
                            inode: child,
                            parent_path: path.clone(),
                            depth: frame.depth + 1,
                        });
                    }
                }
            }

            order.push((frame.inode, path, frame.depth));
        }

        for (inode, path, depth) in order.into_iter().rev() {
            if !config.exclude_subdirs {
                self.roll_up_children(inode);
            }

            let dir = match self.all.get(&inode) {
                Some(dir) => dir,
                None => continue,
            };
            let sum_files = dir.tally.sum_files();
            let sum_size = dir.tally.sum_size();

            if sum_files == 0 && sum_size == 0 && !config.path_survives_filters(&path) {
                continue;
            }
            if depth > config.max_depth {
                continue;
            }

            if config.per_user {
                emit_per_user_rows(dir, config, users, &path, rows);
            } else if sum_files >= config.file_limit && sum_size >= config.size_limit {
                rows.push(OutputRow {
                    user: None,
                    files: sum_files,
                    size: sum_size,
                    path,
                });
            }
        }
    }

    fn roll_up_children(&mut self, inode: Inode) {
        let children = match self.tree.get(&inode) {
            Some(children) => children.clone(),
            None => return,
        };

        let mut accum = Tally::default();
        for child in &children {
            if let Some(child_dir) = self.all.get_mut(child) {
                if !child_dir.counted {
                    child_dir.counted = true;
                    accum.add_assign(&child_dir.tally);
                }
            }
        }

        if let Some(dir) = self.all.get_mut(&inode) {
            dir.tally.add_assign(&accum);
        }
    }
}

fn emit_per_user_rows(dir: &StoredDir, config: &WalkConfig, users: &UserTable, path: &str, rows: &mut Vec<OutputRow>) {
    for (&uid, &files) in &dir.tally.files_by_uid {
        let size = *dir.tally.size_by_uid.get(&uid).unwrap_or(&0);
        if files > config.file_limit || size > config.size_limit {
            rows.push(OutputRow {
                user: Some(users.name_for(uid)),
                files,
                size,
                path: path.to_string(),
            });
        }
    }
}

impl OutputRow {
    pub fn size_human(&self) -> String {
        to_human(self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(uid: u32, files: u64, size: u64) -> Tally {
        let mut t = Tally::default();
        t.files_by_uid.insert(uid, files);
        t.size_by_uid.insert(uid, size);
        t
    }

    fn dir_config() -> WalkConfig {
        WalkConfig {
            max_depth: usize::MAX,
            file_limit: 0,
            size_limit: 0,
            exclude: None,
            include: None,
            exclude_subdirs: false,
            per_user: false,
        }
    }

    #[test]
    fn rolls_up_subtree_into_parent() {
        let mut store = ResultStore::new();
        store.insert(DirResult {
            name: "R".into(),
            parent_inode: 0,
            inode: 1,
            tally: tally(1000, 0, 0),
        });
        store.insert(DirResult {
            name: "sub".into(),
            parent_inode: 1,
            inode: 2,
            tally: tally(1000, 2, 30),
        });

        let users = UserTable::load();
        let config = dir_config();
        let rows = store.aggregate(&[1], &config, &users);

        let root_row = rows.iter().find(|r| r.path == "R").unwrap();
        assert_eq!(root_row.files, 2);
        assert_eq!(root_row.size, 30);

        let sub_row = rows.iter().find(|r| r.path == "R/sub").unwrap();
        assert_eq!(sub_row.files, 2);
        assert_eq!(sub_row.size, 30);
    }

    #[test]
    fn exclude_subdirs_keeps_direct_counts_only() {
        let mut store = ResultStore::new();
        store.insert(DirResult {
            name: "R".into(),
            parent_inode: 0,
            inode: 1,
            tally: Tally::default(),
        });
        store.insert(DirResult {
            name: "sub".into(),
            parent_inode: 1,
            inode: 2,
            tally: tally(1000, 2, 30),
        });

        let users = UserTable::load();
        let mut config = dir_config();
        config.exclude_subdirs = true;
        let rows = store.aggregate(&[1], &config, &users);

        let root_row = rows.iter().find(|r| r.path == "R").unwrap();
        assert_eq!(root_row.files, 0);
        assert_eq!(root_row.size, 0);
    }

    #[test]
    fn max_depth_filters_deep_nodes() {
        let mut store = ResultStore::new();
        store.insert(DirResult {
            name: "R".into(),
            parent_inode: 0,
            inode: 1,
            tally: Tally::default(),
        });
        store.insert(DirResult {
            name: "sub".into(),
            parent_inode: 1,
            inode: 2,
            tally: tally(1000, 1, 10),
        });

        let users = UserTable::load();
        let mut config = dir_config();
        config.max_depth = 0;
        let rows = store.aggregate(&[1], &config, &users);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].path, "R");
    }

    #[test]
    fn file_limit_suppresses_small_directories() {
        let mut store = ResultStore::new();
        store.insert(DirResult {
            name: "R".into(),
            parent_inode: 0,
            inode: 1,
            tally: tally(1000, 1, 1),
        });

        let users = UserTable::load();
        let mut config = dir_config();
        config.file_limit = 5;
        let rows = store.aggregate(&[1], &config, &users);
        assert!(rows.is_empty());
    }

    #[test]
    fn missing_root_yields_no_rows() {
        let mut store = ResultStore::new();
        let users = UserTable::load();
        let config = dir_config();
        let rows = store.aggregate(&[99], &config, &users);
        assert!(rows.is_empty());
    }
}
