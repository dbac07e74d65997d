use anyhow::{anyhow, bail, Context, Result};
use api_ingress::{ApiIngress, ApiIngressConfig};
use attendance::{Attendance, AttendanceConfig, StorageKind};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const ATTENDANCE_MODULE: &str = "attendance";
const INGRESS_MODULE: &str = "api_ingress";

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
/// - Adds `mode=rwc` so a missing database file is created.
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case("sqlite::memory:") || dsn.eq_ignore_ascii_case("sqlite://:memory:")
    {
        return Ok("sqlite::memory:".to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        bail!("Empty SQLite path in DSN");
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create '{}'", dir.display()))?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    match query {
        Some(q) if q.contains("mode=") => {
            out.push('?');
            out.push_str(q);
        }
        Some(q) => {
            out.push('?');
            out.push_str(q);
            out.push_str("&mode=rwc");
        }
        None => out.push_str("?mode=rwc"),
    }
    Ok(out)
}

/// Visitcount Server - event attendance counter
#[derive(Parser)]
#[command(name = "visitcount-server")]
#[command(about = "Visitcount Server - event attendance counter")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Keep registrations in memory instead of the configured store
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
    /// Apply pending database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Visitcount Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config, args),
        Commands::Migrate => migrate_database(config).await,
    }
}

/// Detect DB backend from URL scheme (sqlite/postgres).
fn detect_from_dsn(cfg: &DatabaseConfig) -> Result<&'static str> {
    let raw = cfg.url.trim().to_owned();
    if raw.is_empty() {
        bail!("Database URL not configured");
    }

    let url = Url::parse(&raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;

    match url.scheme() {
        "sqlite" | "sqlite3" => Ok("sqlite"),
        "postgres" | "postgresql" => Ok("postgres"),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

async fn connect_database(config: &AppConfig) -> Result<DatabaseConnection> {
    let db_config = config
        .database
        .clone()
        .ok_or_else(|| anyhow!("storage 'database' needs a database section in the config"))?;
    let backend = detect_from_dsn(&db_config)?;

    let mut dsn = db_config.url.trim().to_owned();
    if backend == "sqlite" {
        // Absolutize sqlite DSNs to avoid cwd issues
        let normalized = dsn.replacen("sqlite3://", "sqlite://", 1);
        dsn = absolutize_sqlite_dsn(&normalized, Path::new(&config.server.home_dir), true)?;
    }

    let mut opts = ConnectOptions::new(dsn.clone());
    opts.max_connections(db_config.max_conns.unwrap_or(10))
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    if backend == "sqlite" {
        let busy = Duration::from_millis(u64::from(db_config.busy_timeout_ms.unwrap_or(5000)));
        opts.map_sqlx_sqlite_opts(move |o| o.busy_timeout(busy));
    }

    tracing::info!("Connecting to database: {}", dsn);
    let db = Database::connect(opts)
        .await
        .with_context(|| format!("Failed to connect to database '{dsn}'"))?;
    tracing::info!("Connected DB backend: {}", backend);
    Ok(db)
}

/// Typed module sections, with `--mock` and `server.timeout_sec` folded in.
fn module_configs(config: &AppConfig, args: &CliArgs) -> Result<(AttendanceConfig, ApiIngressConfig)> {
    let mut attendance: AttendanceConfig = config.module_config(ATTENDANCE_MODULE)?;
    if args.mock {
        tracing::info!("--mock: keeping registrations in memory");
        attendance.storage = StorageKind::Memory;
    }

    let mut ingress: ApiIngressConfig = config.module_config(INGRESS_MODULE)?;
    if config.server.timeout_sec > 0 {
        ingress.request_timeout_secs = config.server.timeout_sec;
    }
    Ok((attendance, ingress))
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Initializing modules...");
    let (attendance_cfg, ingress_cfg) = module_configs(&config, &args)?;
    let home_dir = PathBuf::from(&config.server.home_dir);

    let db = if attendance_cfg.storage == StorageKind::Database {
        let db = connect_database(&config).await?;
        let auto_migrate = config.database.as_ref().is_some_and(|d| d.auto_migrate);
        if auto_migrate {
            attendance::migrate(&db)
                .await
                .context("Failed to apply database migrations")?;
            tracing::info!("Database migrations applied");
        } else {
            let pending = attendance::pending_migrations(&db)
                .await
                .context("Failed to inspect database migrations")?;
            if !pending.is_empty() {
                bail!(
                    "database has pending migrations ({}); run `visitcount-server migrate` or set database.auto_migrate: true",
                    pending.join(", ")
                );
            }
        }
        Some(db)
    } else {
        None
    };

    let attendance = Attendance::init(&attendance_cfg, db, &home_dir).await?;

    let ingress = ApiIngress::new(ingress_cfg);
    let bind_addr = ingress
        .config()
        .resolve_bind_addr(&config.server.host, config.server.port);
    let router = ingress.build_router(
        attendance.register_rest(axum::Router::new()),
        Some(attendance.openapi()),
    );

    let cancel = modkit::shutdown_token();
    ingress.serve(&bind_addr, router, cancel).await?;
    tracing::info!("Visitcount Server stopped");
    Ok(())
}

fn check_config(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");

    let (attendance_cfg, ingress_cfg) = module_configs(&config, &args)?;

    let bind_addr = ingress_cfg.resolve_bind_addr(&config.server.host, config.server.port);
    bind_addr
        .parse::<std::net::SocketAddr>()
        .map_err(|e| anyhow!("Invalid bind address '{}': {}", bind_addr, e))?;

    if attendance_cfg.storage == StorageKind::Database {
        let db_config = config
            .database
            .as_ref()
            .ok_or_else(|| anyhow!("storage 'database' needs a database section in the config"))?;
        detect_from_dsn(db_config)?;
    }

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);

    Ok(())
}

async fn migrate_database(config: AppConfig) -> Result<()> {
    let db = connect_database(&config).await?;
    let pending = attendance::pending_migrations(&db).await?;
    if pending.is_empty() {
        println!("Database schema is up to date");
        return Ok(());
    }

    attendance::migrate(&db)
        .await
        .context("Failed to apply database migrations")?;
    for name in &pending {
        tracing::info!(migration = %name, "Applied migration");
    }
    println!("Applied {} migration(s): {}", pending.len(), pending.join(", "));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_dsn_is_made_absolute() {
        let base = tempfile::tempdir().unwrap();
        let dsn = absolutize_sqlite_dsn("sqlite://database/visitcount.db", base.path(), true)
            .unwrap();
        let expected = base
            .path()
            .join("database/visitcount.db")
            .to_string_lossy()
            .replace('\\', "/");
        assert_eq!(dsn, format!("sqlite://{expected}?mode=rwc"));
        assert!(base.path().join("database").is_dir());
    }

    #[test]
    fn sqlite_dsn_keeps_query_and_memory() {
        let base = Path::new("/srv/visitcount");
        assert_eq!(
            absolutize_sqlite_dsn("sqlite::memory:", base, false).unwrap(),
            "sqlite::memory:"
        );
        let dsn = absolutize_sqlite_dsn("sqlite:///data/v.db?mode=ro", base, false).unwrap();
        assert_eq!(dsn, "sqlite:///data/v.db?mode=ro");
        let dsn = absolutize_sqlite_dsn("sqlite:///data/v.db?cache=shared", base, false).unwrap();
        assert_eq!(dsn, "sqlite:///data/v.db?cache=shared&mode=rwc");
    }

    #[test]
    fn sqlite_dsn_rejects_empty_path() {
        assert!(absolutize_sqlite_dsn("sqlite://", Path::new("/tmp"), false).is_err());
        assert!(absolutize_sqlite_dsn("postgres://x", Path::new("/tmp"), false).is_err());
    }

    #[test]
    fn backend_is_detected_from_scheme() {
        let cfg = |url: &str| DatabaseConfig {
            url: url.to_string(),
            max_conns: None,
            busy_timeout_ms: None,
            auto_migrate: false,
        };
        assert_eq!(detect_from_dsn(&cfg("sqlite://db.sqlite")).unwrap(), "sqlite");
        assert_eq!(detect_from_dsn(&cfg("postgres://u@h/db")).unwrap(), "postgres");
        assert!(detect_from_dsn(&cfg("mysql://u@h/db")).is_err());
        assert!(detect_from_dsn(&cfg("  ")).is_err());
    }

    #[test]
    fn mock_forces_memory_storage() {
        let mut config = AppConfig::default();
        config.server.timeout_sec = 12;
        let args = CliArgs {
            mock: true,
            ..Default::default()
        };
        let (attendance, ingress) = module_configs(&config, &args).unwrap();
        assert_eq!(attendance.storage, StorageKind::Memory);
        assert_eq!(ingress.request_timeout_secs, 12);
    }
}
