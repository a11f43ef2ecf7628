//! Wiring of stores, repositories and services for one process.

use crate::config::CoreConfig;
use crate::dashboard::{self, DashboardSummary};
use crate::notifications::NotificationStore;
use crate::password::PasswordHasher;
use crate::records::incident::IncidentService;
use crate::records::indicator::{IndicatorService, IndicatorSubmission};
use crate::records::risk::RiskService;
use crate::records::survey::Survey;
use crate::records::system_log::SystemLogService;
use crate::records::unit::Unit;
use crate::records::user::UserService;
use crate::repository::{Entity, Repository};
use crate::roles::Scope;
use crate::session::{SessionCodec, SessionUser};
use crate::store::open_store;
use crate::MutuResult;
use std::sync::Arc;

/// Every service the API and CLI need, built once at startup and shared.
#[derive(Clone)]
pub struct Services {
    pub incidents: IncidentService,
    pub risks: RiskService,
    pub indicator_submissions: Repository<IndicatorSubmission>,
    pub indicators: IndicatorService,
    pub surveys: Repository<Survey>,
    pub units: Repository<Unit>,
    pub users: UserService,
    pub logs: SystemLogService,
    pub notifications: Arc<NotificationStore>,
    pub sessions: SessionCodec,
}

impl Services {
    /// Opens every store on the configured backend.
    pub fn open(cfg: &CoreConfig) -> MutuResult<Self> {
        let backend = cfg.backend();
        let logs = SystemLogService::new(open_store(backend)?);
        let notifications = Arc::new(NotificationStore::new());

        fn repository<T: Entity>(
            cfg: &CoreConfig,
            logs: &SystemLogService,
        ) -> MutuResult<Repository<T>> {
            Ok(Repository::new(open_store(cfg.backend())?, logs.clone()))
        }

        let users = repository(cfg, &logs)?;
        let indicator_submissions = repository(cfg, &logs)?;

        let services = Self {
            incidents: IncidentService::new(repository(cfg, &logs)?, Arc::clone(&notifications)),
            risks: RiskService::new(
                repository(cfg, &logs)?,
                Repository::clone(&users),
                Arc::clone(&notifications),
            ),
            indicators: IndicatorService::new(
                repository(cfg, &logs)?,
                Repository::clone(&indicator_submissions),
            ),
            indicator_submissions,
            surveys: repository(cfg, &logs)?,
            units: repository(cfg, &logs)?,
            users: UserService::new(
                users,
                logs.clone(),
                PasswordHasher::new(cfg.password_iterations()),
            ),
            logs,
            notifications,
            sessions: SessionCodec::new(cfg.session_secret().clone()),
        };

        match backend.data_dir() {
            Some(dir) => tracing::info!("record stores opened under {}", dir.display()),
            None => tracing::info!("record stores opened in memory"),
        }
        Ok(services)
    }

    /// The user behind a session token, re-read from the user store.
    ///
    /// Missing, forged and stale tokens (for deleted accounts) all read as signed out.
    pub fn current_user(&self, token: Option<&str>) -> MutuResult<Option<SessionUser>> {
        let Some(id) = self.sessions.user_id(token) else {
            return Ok(None);
        };
        let user = self.users.session_user(&id)?;
        if user.is_none() {
            tracing::warn!("session token names unknown user {}", id.short());
        }
        Ok(user)
    }

    /// Dashboard counters for everything visible under `scope`.
    pub fn dashboard(&self, scope: &Scope) -> MutuResult<DashboardSummary> {
        let incidents = self.incidents.list(scope)?;
        let risks = self.risks.records(scope)?;
        let indicator_entries = self.indicators.list(scope)?.len();
        let surveys = self.surveys.find_all(scope)?.len();
        Ok(dashboard::summarise(
            &incidents,
            &risks,
            indicator_entries,
            surveys,
        ))
    }
}
