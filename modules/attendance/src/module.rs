use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use sea_orm::DatabaseConnection;
use tracing::{debug, info};

use crate::api::rest::{openapi, routes};
use crate::config::{AttendanceConfig, StorageKind};
use crate::contract::client::AttendanceApi;
use crate::domain::repo::RegistrationsRepository;
use crate::domain::service::{Service, ServiceConfig};
use crate::gateways::local::AttendanceLocalClient;
use crate::infra::storage::{
    FileRegistrationsRepository, MemoryRegistrationsRepository, SeaOrmRegistrationsRepository,
};

/// The attendance module: the wired domain service plus its REST surface.
#[derive(Clone)]
pub struct Attendance {
    service: Arc<Service>,
}

impl Attendance {
    /// Build the module from its config.
    ///
    /// `db` is required for `storage: database`; `home_dir` anchors a relative `data_file`.
    pub async fn init(
        cfg: &AttendanceConfig,
        db: Option<DatabaseConnection>,
        home_dir: &Path,
    ) -> anyhow::Result<Self> {
        info!(storage = ?cfg.storage, "Initializing attendance module");
        debug!(
            "Loaded attendance config: fingerprint_len={}, utc_offset_minutes={}, daily_breakdown_days={}",
            cfg.fingerprint_len, cfg.utc_offset_minutes, cfg.daily_breakdown_days
        );

        let repo: Arc<dyn RegistrationsRepository> = match cfg.storage {
            StorageKind::Memory => Arc::new(MemoryRegistrationsRepository::new()),
            StorageKind::File => {
                let path = home_dir.join(&cfg.data_file);
                Arc::new(
                    FileRegistrationsRepository::open(&path)
                        .await
                        .with_context(|| format!("failed to open {}", path.display()))?,
                )
            }
            StorageKind::Database => {
                let conn = db.ok_or_else(|| {
                    anyhow::anyhow!("storage 'database' requires a database connection")
                })?;
                Arc::new(SeaOrmRegistrationsRepository::new(conn))
            }
        };

        Ok(Self::with_repository(repo, service_config(cfg)))
    }

    /// Wire the service over an already built repository.
    pub fn with_repository(
        repo: Arc<dyn RegistrationsRepository>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            service: Arc::new(Service::new(repo, config)),
        }
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// In-process client for other modules.
    pub fn client(&self) -> Arc<dyn AttendanceApi> {
        Arc::new(AttendanceLocalClient::new(self.service.clone()))
    }

    pub fn register_rest(&self, router: axum::Router) -> axum::Router {
        info!("Registering attendance REST routes");
        routes::register_routes(router, self.service.clone())
    }

    /// OpenAPI document for the routes added by [`Attendance::register_rest`].
    pub fn openapi(&self) -> utoipa::openapi::OpenApi {
        openapi::openapi()
    }
}

pub fn service_config(cfg: &AttendanceConfig) -> ServiceConfig {
    ServiceConfig {
        fingerprint_len: cfg.fingerprint_len,
        utc_offset_minutes: cfg.utc_offset_minutes,
        daily_breakdown_days: cfg.daily_breakdown_days,
        admin_username: cfg.admin_username.clone(),
        admin_password: cfg.admin_password.clone(),
    }
}
