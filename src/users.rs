//! Snapshot UID-to-username lookup, loaded once at startup.
//!
//! `uzers::all_users()` walks `/etc/passwd`-equivalent sources and is
//! documented unsafe because it is not reentrant against concurrent calls
//! elsewhere in the process; we call it exactly once, before any worker
//! thread starts, and hand out an immutable table after that.

use std::collections::HashMap;

use crate::work::Uid;

pub struct UserTable {
    names: HashMap<Uid, String>,
}

impl UserTable {
    /// Takes a snapshot of the system's user database. Safe to call once at
    /// startup; the returned table is immutable and `Send + Sync`.
    pub fn load() -> Self {
        let names = unsafe { uzers::all_users() }
            .map(|user| (user.uid(), user.name().to_string_lossy().into_owned()))
            .collect();
        Self { names }
    }

    /// Resolves a uid to its username, falling back to `"unknown(<id>)"`
    /// for a uid absent from the snapshot (e.g. a user deleted mid-walk).
    pub fn name_for(&self, uid: Uid) -> String {
        self.names
            .get(&uid)
            .cloned()
            .unwrap_or_else(|| format!("unknown({uid})"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_uid_falls_back_to_placeholder() {
        let table = UserTable { names: HashMap::new() };
        assert_eq!(table.name_for(424242), "unknown(424242)");
    }

    #[test]
    fn known_uid_resolves_to_its_name() {
        let mut names = HashMap::new();
        names.insert(1000, "alice".to_string());
        let table = UserTable { names };
        assert_eq!(table.name_for(1000), "alice");
    }
}
