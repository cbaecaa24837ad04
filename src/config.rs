//! Immutable traversal configuration, threaded into every worker behind an
//! `Arc`, mirroring the teacher's `AnalysisConfig`.

use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct WalkConfig {
    pub max_depth: usize,
    pub file_limit: u64,
    pub size_limit: u64,
    pub exclude: Option<Regex>,
    pub include: Option<Regex>,
    pub exclude_subdirs: bool,
    pub per_user: bool,
}

impl WalkConfig {
    /// Compiles the user-supplied `--exclude`/`--include` patterns, anchoring
    /// each to the end of the path as the interface requires.
    pub fn compile(
        exclude_pattern: Option<&str>,
        include_pattern: Option<&str>,
    ) -> Result<(Option<Regex>, Option<Regex>)> {
        let exclude = exclude_pattern.map(anchor).transpose()?;
        let include = include_pattern.map(anchor).transpose()?;
        Ok((exclude, include))
    }

    /// Whether `path` matches the exclude pattern (should be dropped
    /// immediately, without being stat'd).
    pub fn is_excluded(&self, path: &Path) -> bool {
        match &self.exclude {
            Some(re) => re.is_match(&path.to_string_lossy()),
            None => false,
        }
    }

    /// Whether `path` should be credited under the include filter. Absent an
    /// include pattern, everything matches.
    pub fn matches_include(&self, path: &Path) -> bool {
        match &self.include {
            Some(re) => re.is_match(&path.to_string_lossy()),
            None => true,
        }
    }

    /// Re-applies both filters to a reported (joined, relative) path at
    /// aggregation time, so an empty-looking branch that was actually
    /// filtered out does not print a spurious `0 0` row.
    pub fn path_survives_filters(&self, path: &str) -> bool {
        if let Some(re) = &self.exclude {
            if re.is_match(path) {
                return false;
            }
        }
        match &self.include {
            Some(re) => re.is_match(path),
            None => true,
        }
    }
}

fn anchor(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("(?:{pattern})$")).with_context(|| format!("invalid regex `{pattern}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclude_pattern_is_anchored_to_path_end() {
        let (exclude, _) = WalkConfig::compile(Some(r".*\.tmp"), None).unwrap();
        let cfg = WalkConfig {
            max_depth: usize::MAX,
            file_limit: 0,
            size_limit: 0,
            exclude,
            include: None,
            exclude_subdirs: false,
            per_user: false,
        };
        assert!(cfg.is_excluded(Path::new("/tmp/root/drop.tmp")));
        assert!(!cfg.is_excluded(Path::new("/tmp/root/keep")));
    }

    #[test]
    fn invalid_regex_fails_to_compile() {
        assert!(WalkConfig::compile(Some("("), None).is_err());
    }
}
