use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, DebugLogRotation};

const LOG_FILE_NAME: &str = "ghsearch-debug.log";
const DEFAULT_FILTER: &str = "ghsearch=debug,warn";

/// Keeps the non-blocking writer flushing until dropped.
pub struct LogGuard(#[allow(dead_code)] WorkerGuard);

/// Initialize debug logging.
///
/// The TUI owns stdout, so logs only ever go to a file. When `debug` is off
/// this is a no-op. `RUST_LOG` overrides the default filter.
pub fn init(config: &Config) -> Result<Option<LogGuard>> {
    if !config.debug {
        return Ok(None);
    }

    let rotation = config.debug_log_rotation.unwrap_or(DebugLogRotation::Session);
    let base = resolve_base_log_path(config.debug_log_path.as_deref())?;
    let (writer, log_file, guard) = open_writer(&base, rotation, config.debug_log_keep)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer)
        .try_init()
        .ok(); // Already initialized (tests) is fine.

    tracing::info!(log_file = %log_file.display(), rotation = ?rotation, "debug logging enabled");

    Ok(Some(LogGuard(guard)))
}

fn open_writer(
    base: &Path,
    rotation: DebugLogRotation,
    keep: Option<usize>,
) -> Result<(NonBlocking, PathBuf, WorkerGuard)> {
    let (dir, base_name) = split_dir_and_name(base)?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    match rotation {
        DebugLogRotation::None => {
            let (writer, guard) = tracing_appender::non_blocking(open_append(base)?);
            Ok((writer, base.to_path_buf(), guard))
        }
        DebugLogRotation::Daily => {
            // tracing_appender names daily files `{base_name}.{YYYY-MM-DD}`
            cleanup_rotated_logs(&dir, &format!("{base_name}."), keep.unwrap_or(7), is_date_suffix)?;
            let appender = tracing_appender::rolling::daily(&dir, &base_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            Ok((writer, base.to_path_buf(), guard))
        }
        DebugLogRotation::Session => {
            cleanup_rotated_logs(&dir, &format!("{base_name}.session-"), keep.unwrap_or(20), |_| true)?;
            let ts = chrono::Local::now().format("%Y%m%d-%H%M%S");
            let session_path = dir.join(format!("{base_name}.session-{ts}"));
            let (writer, guard) = tracing_appender::non_blocking(open_append(&session_path)?);
            Ok((writer, session_path, guard))
        }
    }
}

fn open_append(path: &Path) -> Result<std::fs::File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))
}

fn resolve_base_log_path(config_value: Option<&str>) -> Result<PathBuf> {
    let Some(raw) = config_value else {
        return Ok(crate::config::config_path()?.with_file_name(LOG_FILE_NAME));
    };

    let path = PathBuf::from(expand_tilde(raw));

    // Trailing separator or an existing directory means "put the log in here".
    if raw.ends_with(std::path::MAIN_SEPARATOR) || path.is_dir() {
        return Ok(path.join(LOG_FILE_NAME));
    }

    Ok(path)
}

fn expand_tilde(raw: &str) -> String {
    if raw == "~" || raw.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            let suffix = raw.strip_prefix('~').unwrap_or("");
            return format!("{}{}", home.display(), suffix);
        }
    }
    raw.to_string()
}

fn split_dir_and_name(path: &Path) -> Result<(PathBuf, String)> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .context("Invalid debug_log_path: not valid UTF-8")?
        .to_string();
    Ok((dir, name))
}

/// Remove the oldest files named `{prefix}{suffix}` with an accepted
/// suffix, keeping `keep` of them.
fn cleanup_rotated_logs(dir: &Path, prefix: &str, keep: usize, accept_suffix: fn(&str) -> bool) -> Result<()> {
    if keep == 0 {
        return Ok(());
    }

    let mut candidates: Vec<String> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read log directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| name.strip_prefix(prefix).is_some_and(accept_suffix))
        .collect();

    // Both suffix formats sort lexicographically by time; newest first.
    candidates.sort();
    candidates.reverse();

    for name in candidates.iter().skip(keep) {
        let path = dir.join(name);
        if let Err(e) = std::fs::remove_file(&path) {
            tracing::debug!(error = %e, file = %path.display(), "failed to remove old log file");
        }
    }

    Ok(())
}

/// `YYYY-MM-DD`, the suffix tracing-appender gives daily files
fn is_date_suffix(suffix: &str) -> bool {
    let bytes = suffix.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

const TOKEN_PREFIXES: [&str; 7] = [
    "github_pat_",
    "ghp_",
    "gho_",
    "ghu_",
    "ghs_",
    "ghr_",
    "Bearer ",
];

/// Best-effort redaction of GitHub tokens (`ghp_...`, `github_pat_...`, `Bearer ...`).
pub fn redact_secrets(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    'outer: while !rest.is_empty() {
        for prefix in TOKEN_PREFIXES {
            if let Some(tail) = rest.strip_prefix(prefix) {
                let body_len = tail
                    .bytes()
                    .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
                    .count();

                // Require a minimum length to reduce false positives.
                if body_len >= 8 {
                    out.push_str(prefix);
                    out.push_str("***REDACTED***");
                    rest = &tail[body_len..];
                    continue 'outer;
                }
            }
        }

        let mut chars = rest.chars();
        if let Some(ch) = chars.next() {
            out.push(ch);
        }
        rest = chars.as_str();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacts_classic_and_fine_grained_tokens() {
        let input = "token ghp_abcdefghij1234 and github_pat_11ABC_defghijklmnop end";
        let redacted = redact_secrets(input);
        assert_eq!(
            redacted,
            "token ghp_***REDACTED*** and github_pat_***REDACTED*** end"
        );
    }

    #[test]
    fn test_short_lookalikes_are_left_alone() {
        assert_eq!(redact_secrets("ghp_short"), "ghp_short");
        assert_eq!(
            redact_secrets("Authorization: Bearer abcdef123456"),
            "Authorization: Bearer ***REDACTED***"
        );
        assert_eq!(redact_secrets("no secrets here ✓"), "no secrets here ✓");
    }

    #[test]
    fn test_cleanup_keeps_newest_files() {
        let dir = tempfile::tempdir().unwrap();
        for day in ["2026-01-01", "2026-01-02", "2026-01-03"] {
            std::fs::write(dir.path().join(format!("app.log.{day}")), "x").unwrap();
        }
        std::fs::write(dir.path().join("unrelated.txt"), "x").unwrap();

        cleanup_rotated_logs(dir.path(), "app.log.", 2, is_date_suffix).unwrap();

        assert!(!dir.path().join("app.log.2026-01-01").exists());
        assert!(dir.path().join("app.log.2026-01-02").exists());
        assert!(dir.path().join("app.log.2026-01-03").exists());
        assert!(dir.path().join("unrelated.txt").exists());
    }

    #[test]
    fn test_daily_cleanup_leaves_session_logs_alone() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "app.log.2026-01-01",
            "app.log.2026-01-02",
            "app.log.session-20250101-090000",
            "app.log.session-20250102-090000",
        ] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }

        cleanup_rotated_logs(dir.path(), "app.log.", 1, is_date_suffix).unwrap();

        assert!(!dir.path().join("app.log.2026-01-01").exists());
        assert!(dir.path().join("app.log.2026-01-02").exists());
        assert!(dir.path().join("app.log.session-20250101-090000").exists());
        assert!(dir.path().join("app.log.session-20250102-090000").exists());
    }

    #[test]
    fn test_date_suffix_shape() {
        assert!(is_date_suffix("2026-10-16"));
        assert!(!is_date_suffix("session-20261016-120000"));
        assert!(!is_date_suffix("2026-1-016"));
    }
}
