//! SQLite DSN handling: memory detection, path absolutization and the
//! pragma parameters we accept in the query string.

use sqlx::sqlite::{SqliteJournalMode, SqliteSynchronous};
use std::path::{Path, PathBuf};

const MEMORY_DSN: &str = "sqlite::memory:";
const PRAGMA_KEYS: &[&str] = &["journal_mode", "synchronous", "busy_timeout"];

pub fn is_memory_dsn(dsn: &str) -> bool {
    let lower = dsn.to_ascii_lowercase();
    lower == MEMORY_DSN
        || lower == "sqlite://:memory:"
        || lower.contains("mode=memory")
}

fn split_query(dsn: &str) -> (&str, Option<&str>) {
    match dsn.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (dsn, None),
    }
}

/// Strip the scheme and query, leaving the file path of a file-backed DSN.
pub(crate) fn file_path(dsn: &str) -> Option<PathBuf> {
    if is_memory_dsn(dsn) {
        return None;
    }
    let (head, _) = split_query(dsn);
    let raw = head
        .strip_prefix("sqlite://")
        .or_else(|| head.strip_prefix("sqlite:"))?;
    if raw.is_empty() {
        None
    } else {
        Some(PathBuf::from(raw))
    }
}

/// Rewrite a relative file DSN so it points under `base_dir`.
///
/// Memory DSNs collapse to `sqlite::memory:`; absolute paths are left alone.
/// Backslashes become forward slashes so Windows paths survive as URLs.
pub fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path) -> String {
    if is_memory_dsn(dsn) && !dsn.contains('?') {
        return MEMORY_DSN.to_string();
    }
    let Some(path) = file_path(dsn) else {
        return dsn.to_string();
    };
    if path.is_absolute() {
        return dsn.to_string();
    }

    let mut out = String::from("sqlite://");
    out.push_str(&base_dir.join(path).to_string_lossy().replace('\\', "/"));
    if let (_, Some(query)) = split_query(dsn) {
        out.push('?');
        out.push_str(query);
    }
    out
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Pragmas {
    pub journal_mode: Option<SqliteJournalMode>,
    pub synchronous: Option<SqliteSynchronous>,
    pub busy_timeout_ms: Option<u64>,
}

fn journal_mode(value: &str) -> Option<SqliteJournalMode> {
    match value.to_ascii_uppercase().as_str() {
        "DELETE" => Some(SqliteJournalMode::Delete),
        "WAL" => Some(SqliteJournalMode::Wal),
        "MEMORY" => Some(SqliteJournalMode::Memory),
        "TRUNCATE" => Some(SqliteJournalMode::Truncate),
        "PERSIST" => Some(SqliteJournalMode::Persist),
        "OFF" => Some(SqliteJournalMode::Off),
        _ => None,
    }
}

fn synchronous(value: &str) -> Option<SqliteSynchronous> {
    match value.to_ascii_uppercase().as_str() {
        "OFF" => Some(SqliteSynchronous::Off),
        "NORMAL" => Some(SqliteSynchronous::Normal),
        "FULL" => Some(SqliteSynchronous::Full),
        "EXTRA" => Some(SqliteSynchronous::Extra),
        _ => None,
    }
}

/// Pull our pragma parameters out of the DSN query.
///
/// Returns the DSN sqlx should see (pragmas removed, other params kept)
/// and the parsed values. Invalid values are logged and dropped.
pub(crate) fn extract_pragmas(dsn: &str) -> (String, Pragmas) {
    let (head, query) = split_query(dsn);
    let Some(query) = query else {
        return (dsn.to_string(), Pragmas::default());
    };

    let mut pragmas = Pragmas::default();
    let mut kept = url::form_urlencoded::Serializer::new(String::new());
    let mut kept_any = false;

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let key_lower = key.to_ascii_lowercase();
        if !PRAGMA_KEYS.contains(&key_lower.as_str()) {
            kept.append_pair(&key, &value);
            kept_any = true;
            continue;
        }
        match key_lower.as_str() {
            "journal_mode" => match journal_mode(&value) {
                Some(mode) => pragmas.journal_mode = Some(mode),
                None => tracing::warn!(value = %value, "invalid journal_mode in DSN, ignoring"),
            },
            "synchronous" => match synchronous(&value) {
                Some(mode) => pragmas.synchronous = Some(mode),
                None => tracing::warn!(value = %value, "invalid synchronous in DSN, ignoring"),
            },
            _ => match value.parse::<u64>() {
                Ok(ms) => pragmas.busy_timeout_ms = Some(ms),
                Err(_) => tracing::warn!(value = %value, "invalid busy_timeout in DSN, ignoring"),
            },
        }
    }

    let clean = if kept_any {
        format!("{head}?{}", kept.finish())
    } else {
        head.to_string()
    };
    (clean, pragmas)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_detection() {
        assert!(is_memory_dsn("sqlite::memory:"));
        assert!(is_memory_dsn("sqlite://:memory:"));
        assert!(is_memory_dsn("sqlite://file.db?mode=memory&cache=shared"));
        assert!(!is_memory_dsn("sqlite://database/portfohub.db"));
    }

    #[test]
    fn file_path_strips_scheme_and_query() {
        assert_eq!(
            file_path("sqlite://database/app.db?journal_mode=wal"),
            Some(PathBuf::from("database/app.db"))
        );
        assert_eq!(file_path("sqlite:app.db"), Some(PathBuf::from("app.db")));
        assert_eq!(file_path("sqlite::memory:"), None);
        assert_eq!(file_path("sqlite://"), None);
    }

    #[test]
    fn relative_dsn_is_anchored_at_base_dir() {
        let base = Path::new("/srv/portfohub");
        assert_eq!(
            absolutize_sqlite_dsn("sqlite://database/app.db?busy_timeout=100", base),
            "sqlite:///srv/portfohub/database/app.db?busy_timeout=100"
        );
        assert_eq!(
            absolutize_sqlite_dsn("sqlite:///var/lib/app.db", base),
            "sqlite:///var/lib/app.db"
        );
        assert_eq!(
            absolutize_sqlite_dsn("sqlite://:memory:", base),
            "sqlite::memory:"
        );
    }

    #[test]
    fn pragmas_are_extracted_and_other_params_kept() {
        let (clean, pragmas) =
            extract_pragmas("sqlite://app.db?journal_mode=wal&mode=rwc&busy_timeout=250");

        assert_eq!(clean, "sqlite://app.db?mode=rwc");
        assert_eq!(pragmas.journal_mode, Some(SqliteJournalMode::Wal));
        assert_eq!(pragmas.synchronous, None);
        assert_eq!(pragmas.busy_timeout_ms, Some(250));
    }

    #[test]
    fn invalid_pragma_values_are_dropped() {
        let (clean, pragmas) =
            extract_pragmas("sqlite://app.db?journal_mode=sideways&synchronous=maybe&busy_timeout=-1");

        assert_eq!(clean, "sqlite://app.db");
        assert_eq!(pragmas, Pragmas::default());
    }
}
