use crate::config::{LoggingConfig, Section};
use file_rotate::{
    compression::Compression,
    suffix::AppendCount,
    ContentLimit, FileRotate,
};
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter::Targets, fmt};

const DEFAULT_SECTION: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 100;
const DEFAULT_MAX_BACKUPS: usize = 3;

fn parse_level(s: &str) -> LevelFilter {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" | "none" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

/// Size-rotated log file shared between writer handles.
#[derive(Clone)]
struct RotatingFile(Arc<Mutex<FileRotate<AppendCount>>>);

impl RotatingFile {
    fn open(path: &Path, section: &Section) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
        let backups = section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS);
        let rot = FileRotate::new(
            path,
            AppendCount::new(backups),
            ContentLimit::BytesSurpassed(max_bytes as usize),
            Compression::None,
            #[cfg(unix)]
            None,
        );
        Ok(Self(Arc::new(Mutex::new(rot))))
    }
}

/// Writer handed to the fmt layer for a single event. `None` swallows output.
struct RoutedWriter(Option<RotatingFile>);

impl Write for RoutedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &self.0 {
            Some(file) => file.0.lock().write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &self.0 {
            Some(file) => file.0.lock().flush(),
            None => Ok(()),
        }
    }
}

/// Sends each event to the file of the subsystem owning its target,
/// falling back to the default file.
#[derive(Clone, Default)]
struct FileRouter {
    default: Option<RotatingFile>,
    by_subsystem: HashMap<String, RotatingFile>,
}

fn belongs_to(target: &str, subsystem: &str) -> bool {
    target == subsystem
        || target
            .strip_prefix(subsystem)
            .is_some_and(|rest| rest.starts_with("::"))
}

impl FileRouter {
    fn from_config(cfg: &LoggingConfig, base_dir: &Path) -> Self {
        let mut router = FileRouter::default();
        for (name, section) in cfg {
            if section.file.trim().is_empty() {
                continue;
            }
            let path = resolve_log_path(&section.file, base_dir);
            let file = match RotatingFile::open(&path, section) {
                Ok(file) => file,
                Err(e) => {
                    eprintln!("Failed to open log file '{}': {e}", path.display());
                    continue;
                }
            };
            if name == DEFAULT_SECTION {
                router.default = Some(file);
            } else {
                router.by_subsystem.insert(name.clone(), file);
            }
        }
        router
    }

    fn route(&self, target: &str) -> Option<RotatingFile> {
        self.by_subsystem
            .iter()
            .find(|(name, _)| belongs_to(target, name))
            .map(|(_, file)| file.clone())
            .or_else(|| self.default.clone())
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_subsystem.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = RoutedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RoutedWriter(self.default.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        RoutedWriter(self.route(meta.target()))
    }
}

fn console_targets(cfg: &LoggingConfig) -> Targets {
    let default = cfg
        .get(DEFAULT_SECTION)
        .map(|s| parse_level(&s.console_level))
        .unwrap_or(LevelFilter::OFF);

    cfg.iter()
        .filter(|(name, _)| name.as_str() != DEFAULT_SECTION)
        .fold(Targets::new().with_default(default), |t, (name, s)| {
            t.with_target(name.clone(), parse_level(&s.console_level))
        })
}

fn file_level(section: &Section) -> LevelFilter {
    if section.file.trim().is_empty() {
        LevelFilter::OFF
    } else if section.file_level.trim().is_empty() {
        parse_level(&section.console_level)
    } else {
        parse_level(&section.file_level)
    }
}

fn file_targets(cfg: &LoggingConfig) -> Targets {
    let default_section = cfg.get(DEFAULT_SECTION);
    let default = default_section.map(file_level).unwrap_or(LevelFilter::OFF);

    cfg.iter()
        .filter(|(name, _)| name.as_str() != DEFAULT_SECTION)
        .fold(Targets::new().with_default(default), |t, (name, s)| {
            // A subsystem without its own file logs into the default one.
            let level = if s.file.trim().is_empty() {
                default
            } else {
                file_level(s)
            };
            t.with_target(name.clone(), level)
        })
}

/// Install the global subscriber.
///
/// Relative log files are resolved against `base_dir` (normally `server.home_dir`).
/// Console output is human-readable; file output is JSON, one event per line.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        init_default_logging();
        return;
    }

    let ansi = atty::is(atty::Stream::Stdout);
    let console = fmt::layer()
        .with_ansi(ansi)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(console_targets(cfg));

    let router = FileRouter::from_config(cfg, base_dir);
    let file = (!router.is_empty()).then(|| {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_target(true)
            .with_level(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(router)
            .with_filter(file_targets(cfg))
    });

    let _ = Registry::default().with(console).with(file).try_init();
}

fn init_default_logging() {
    let _ = fmt()
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_logging_config;
    use tempfile::tempdir;
    use tracing::Level;

    fn section(console: &str, file: &str, file_level: &str) -> Section {
        Section {
            console_level: console.into(),
            file: file.into(),
            file_level: file_level.into(),
            max_backups: Some(1),
            max_size_mb: Some(1),
        }
    }

    #[test]
    fn level_parsing() {
        assert_eq!(parse_level("trace"), LevelFilter::TRACE);
        assert_eq!(parse_level("DEBUG"), LevelFilter::DEBUG);
        assert_eq!(parse_level(" Warn "), LevelFilter::WARN);
        assert_eq!(parse_level("off"), LevelFilter::OFF);
        assert_eq!(parse_level("none"), LevelFilter::OFF);
        assert_eq!(parse_level("bogus"), LevelFilter::INFO);
    }

    #[test]
    fn relative_log_paths_resolve_under_base_dir() {
        let tmp = tempdir().unwrap();
        let resolved = resolve_log_path("logs/app.log", tmp.path());
        assert!(resolved.starts_with(tmp.path()));
        assert!(resolved.ends_with("logs/app.log"));
    }

    #[test]
    fn rotating_file_creates_parent_dirs() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nested/dir/app.log");
        RotatingFile::open(&path, &section("info", "x", "")).unwrap();
        assert!(path.parent().unwrap().is_dir());
    }

    #[test]
    fn subsystem_match_requires_module_boundary() {
        assert!(belongs_to("portfolio", "portfolio"));
        assert!(belongs_to("portfolio::domain", "portfolio"));
        assert!(!belongs_to("portfolio_extra::x", "portfolio"));
    }

    #[test]
    fn router_prefers_subsystem_file_then_default() {
        let tmp = tempdir().unwrap();
        let mut cfg = default_logging_config();
        cfg.insert("sqlx".into(), section("warn", "logs/sql.log", "debug"));

        let router = FileRouter::from_config(&cfg, tmp.path());
        let sql = router.route("sqlx::query").unwrap();
        let other = router.route("portfolio::domain").unwrap();

        assert!(Arc::ptr_eq(&sql.0, &router.by_subsystem["sqlx"].0));
        assert!(Arc::ptr_eq(&other.0, &router.default.as_ref().unwrap().0));
    }

    #[test]
    fn console_targets_apply_subsystem_overrides() {
        let mut cfg = default_logging_config();
        cfg.insert("sqlx".into(), section("warn", "", ""));

        let targets = console_targets(&cfg);
        assert!(targets.would_enable("portfolio::service", &Level::INFO));
        assert!(!targets.would_enable("portfolio::service", &Level::DEBUG));
        assert!(!targets.would_enable("sqlx::query", &Level::INFO));
        assert!(targets.would_enable("sqlx::query", &Level::WARN));
    }

    #[test]
    fn file_targets_follow_default_file_for_fileless_subsystems() {
        let mut cfg = default_logging_config();
        cfg.insert("web_ingress".into(), section("info", "", ""));

        let targets = file_targets(&cfg);
        assert!(targets.would_enable("web_ingress::request_id", &Level::DEBUG));
        assert!(!targets.would_enable("web_ingress::request_id", &Level::TRACE));
    }
}
