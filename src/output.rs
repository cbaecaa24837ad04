//! Report rendering: fixed-width columns to stdout, human-readable sizes
//! optional, a leading user column when `--user` is set.

use crate::store::OutputRow;

#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    pub human_readable: bool,
    pub per_user: bool,
    pub quiet: bool,
}

/// Prints every row, plus a header unless `quiet` is set.
pub fn print_report(rows: &[OutputRow], config: &OutputConfig) {
    if !config.quiet {
        print_header(config);
    }
    for row in rows {
        print_row(row, config);
    }
}

fn print_header(config: &OutputConfig) {
    if config.per_user {
        println!("{:>15} {:>15} {:>15} {}", "user", "files", "size", "path");
    } else {
        println!("{:>15} {:>15} {}", "files", "size", "path");
    }
}

fn print_row(row: &OutputRow, config: &OutputConfig) {
    let size = if config.human_readable {
        row.size_human()
    } else {
        row.size.to_string()
    };

    if config.per_user {
        let user = row.user.as_deref().unwrap_or("-");
        println!("{:>15} {:>15} {:>15} {}", user, row.files, size, row.path);
    } else {
        println!("{:>15} {:>15} {}", row.files, size, row.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(user: Option<&str>, files: u64, size: u64, path: &str) -> OutputRow {
        OutputRow {
            user: user.map(str::to_string),
            files,
            size,
            path: path.to_string(),
        }
    }

    #[test]
    fn human_readable_size_uses_binary_units() {
        let r = row(None, 2, 1_048_576, "R/sub");
        assert_eq!(r.size_human(), "1.0 M");
    }

    #[test]
    fn config_defaults_are_verbose_and_raw_bytes() {
        let config = OutputConfig::default();
        assert!(!config.human_readable);
        assert!(!config.per_user);
        assert!(!config.quiet);
    }
}
