use crate::config::{LoggingConfig, Section};
use std::{
    collections::HashMap,
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::Level;
use tracing_subscriber::{filter::FilterFn, fmt};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};

// -------- level helpers --------
fn parse_tracing_level(s: &str) -> Option<tracing::Level> {
    match s.to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        "off" | "none" => None,
        _ => Some(Level::INFO),
    }
}

// -------- filtering functions --------

type CrateFilter = FilterFn<Box<dyn Fn(&tracing::Metadata<'_>) -> bool + Send + Sync + 'static>>;

/// Filter for the "default" section: everything that is not claimed by an explicit subsystem.
fn create_default_filter_for_crates(
    crate_names: &[String],
    max_level: tracing::Level,
) -> CrateFilter {
    let crates = crate_names.to_vec();
    FilterFn::new(Box::new(move |meta: &tracing::Metadata<'_>| {
        let t = meta.target();
        if crates.iter().any(|c| matches_crate_prefix(t, c)) {
            return false;
        }
        meta.level() <= &max_level
    }))
}

/// Returns true if target == crate_name or target starts with "crate_name::"
fn matches_crate_prefix(target: &str, crate_name: &str) -> bool {
    target
        .strip_prefix(crate_name)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

// -------- rotating writer for files --------
#[derive(Clone)]
struct RotWriter(Arc<Mutex<FileRotate<AppendTimestamp>>>);

#[derive(Clone)]
struct RotWriterHandle(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl Write for RotWriterHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("log writer poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("log writer poisoned"))?
            .flush()
    }
}

// A writer handle that may be None (drops writes)
#[derive(Clone)]
struct RoutedWriterHandle(Option<RotWriterHandle>);

impl Write for RoutedWriterHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.0 {
            Some(w) => w.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.0 {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }
}

/// Route log records to different files by target prefix
/// (e.g. "attendance" → logs/attendance.log, everything else → default file).
#[derive(Clone)]
struct MultiFileRouter {
    default: Option<RotWriter>,
    by_prefix: HashMap<String, RotWriter>,
}

impl MultiFileRouter {
    fn resolve_for(&self, target: &str) -> Option<RotWriterHandle> {
        self.by_prefix
            .iter()
            .find(|(crate_name, _)| matches_crate_prefix(target, crate_name))
            .map(|(_, wr)| wr)
            .or(self.default.as_ref())
            .map(|w| RotWriterHandle(w.0.clone()))
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_prefix.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for MultiFileRouter {
    type Writer = RoutedWriterHandle;

    fn make_writer(&'a self) -> Self::Writer {
        RoutedWriterHandle(self.default.as_ref().map(|w| RotWriterHandle(w.0.clone())))
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        RoutedWriterHandle(self.resolve_for(meta.target()))
    }
}

// -------- config extraction --------

struct ConfigData<'a> {
    default_section: Option<&'a Section>,
    crate_sections: Vec<(String, &'a Section)>,
    crate_names: Vec<String>,
}

fn extract_config_data(cfg: &LoggingConfig) -> ConfigData<'_> {
    let crate_sections = cfg
        .iter()
        .filter(|(k, _)| k.as_str() != "default")
        .map(|(k, v)| (k.clone(), v))
        .collect::<Vec<_>>();

    let crate_names = crate_sections.iter().map(|(n, _)| n.clone()).collect();

    ConfigData {
        default_section: cfg.get("default"),
        crate_sections,
        crate_names,
    }
}

// -------- path resolution helpers --------

/// Resolve a log file path against `base_dir` (home_dir).
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

/// Which rotated files to keep: `max_backups` wins, then `max_age_days`, then one day.
fn rotation_limit(max_backups: Option<usize>, max_age_days: Option<u32>) -> FileLimit {
    match (max_backups, max_age_days) {
        (Some(n), _) if n > 0 => FileLimit::MaxFiles(n),
        (_, Some(days)) if days > 0 => FileLimit::Age(chrono::Duration::days(i64::from(days))),
        _ => FileLimit::Age(chrono::Duration::days(1)),
    }
}

/// Create a rotating writer, ensuring the parent directory exists.
fn create_rotating_writer_at_path(
    log_path: &Path,
    max_bytes: usize,
    limit: FileLimit,
) -> std::io::Result<RotWriter> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let rot = FileRotate::new(
        log_path,
        AppendTimestamp::default(limit),
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::None,
        #[cfg(unix)]
        None,
    );

    Ok(RotWriter(Arc::new(Mutex::new(rot))))
}

fn create_file_writer(subsystem: &str, section: &Section, base_dir: &Path) -> Option<RotWriter> {
    if section.file.trim().is_empty() {
        return None;
    }

    let max_bytes = section.max_size_mb.unwrap_or(100) * 1024 * 1024;
    let log_path = resolve_log_path(&section.file, base_dir);

    let limit = rotation_limit(section.max_backups, section.max_age_days);

    match create_rotating_writer_at_path(&log_path, max_bytes as usize, limit) {
        Ok(writer) => Some(writer),
        Err(e) => {
            // No subscriber is installed yet.
            eprintln!(
                "Failed to init log file for '{}': {} ({})",
                subsystem,
                log_path.to_string_lossy(),
                e
            );
            None
        }
    }
}

// -------- public init --------

/// Initialize logging from a configuration.
/// - `cfg`: LoggingConfig containing the logging sections
/// - `base_dir`: base directory used to resolve relative log file paths (usually server.home_dir)
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    // Bridge `log` → `tracing` before installing the subscriber
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        init_default_logging();
        return;
    }

    let config_data = extract_config_data(cfg);
    let console_targets = build_console_targets(&config_data);
    let file_router = build_file_router(&config_data, base_dir);
    let file_targets = build_file_targets(&config_data);

    build_logging_layers(config_data, console_targets, file_targets, file_router);
}

fn init_default_logging() {
    let _ = fmt()
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .try_init();
}

fn build_console_targets(config: &ConfigData) -> tracing_subscriber::filter::Targets {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::filter::Targets;

    let mut targets = Targets::new().with_default(LevelFilter::OFF);
    for (crate_name, section) in &config.crate_sections {
        if let Some(level) =
            parse_tracing_level(&section.console_level).map(LevelFilter::from_level)
        {
            targets = targets.with_target(crate_name.clone(), level);
        }
    }
    targets
}

fn build_file_router(config: &ConfigData, base_dir: &Path) -> MultiFileRouter {
    let default = config
        .default_section
        .and_then(|section| create_file_writer("default", section, base_dir));

    let by_prefix = config
        .crate_sections
        .iter()
        .filter_map(|(crate_name, section)| {
            create_file_writer(crate_name, section, base_dir).map(|w| (crate_name.clone(), w))
        })
        .collect();

    MultiFileRouter { default, by_prefix }
}

fn build_file_targets(config: &ConfigData) -> tracing_subscriber::filter::Targets {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::filter::Targets;

    let mut targets = Targets::new().with_default(LevelFilter::OFF);
    for (crate_name, section) in &config.crate_sections {
        if section.file.trim().is_empty() {
            continue;
        }
        if let Some(level) = parse_tracing_level(&section.file_level).map(LevelFilter::from_level) {
            targets = targets.with_target(crate_name.clone(), level);
        }
    }
    targets
}

fn build_logging_layers(
    config: ConfigData,
    console_targets: tracing_subscriber::filter::Targets,
    file_targets: tracing_subscriber::filter::Targets,
    file_router: MultiFileRouter,
) {
    use tracing_subscriber::{layer::SubscriberExt, prelude::*, Registry};

    let ansi = atty::is(atty::Stream::Stdout);

    let console_layer = fmt::layer()
        .with_ansi(ansi)
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(console_targets);

    let explicit_file_layer = (!file_router.is_empty()).then(|| {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_target(true)
            .with_level(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(file_router.clone())
            .with_filter(file_targets)
    });

    let default_section = config.default_section;

    let console_default = default_section
        .and_then(|s| parse_tracing_level(&s.console_level))
        .map(|level| {
            fmt::layer()
                .with_ansi(ansi)
                .with_target(true)
                .with_level(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_filter(create_default_filter_for_crates(&config.crate_names, level))
        });

    let file_default = default_section
        .filter(|_| file_router.default.is_some())
        .and_then(|s| parse_tracing_level(&s.file_level))
        .map(|level| {
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(true)
                .with_level(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_writer(file_router.clone())
                .with_filter(create_default_filter_for_crates(&config.crate_names, level))
        });

    let _ = Registry::default()
        .with(console_layer)
        .with(explicit_file_layer)
        .with(console_default)
        .with(file_default)
        .try_init();
}

// =================== tests ===================
