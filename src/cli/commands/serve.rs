//! `credvault serve`: run the HTTP API.

use std::sync::Arc;

use crate::auth::{IdentityProvider, TokenAuthority};
use crate::cli::output;
use crate::config::{KeySources, Settings};
use crate::crypto::MasterKey;
use crate::errors::Result;
use crate::server::{self, AppState};
use crate::service::VaultService;
use crate::vault::{CredentialRepository, MemoryRepository, OwnerId, VaultStore};

/// Owner of the token printed in `--ephemeral` mode.
const DEV_OWNER: &str = "dev";

/// Execute the `serve` command.
pub fn execute(settings: &Settings, ephemeral: bool) -> Result<()> {
    init_tracing(&settings.log_level);

    let state = build_state(settings, &KeySources::from_env(), ephemeral)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server::start_server(&settings.server_config(), state))
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("credvault={log_level},tower_http={log_level},warn")));

    // A second init (tests, embedding) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Wire storage, keys, audit and identity into the shared handler state.
pub fn build_state(settings: &Settings, sources: &KeySources, ephemeral: bool) -> Result<AppState> {
    let (master_key, authority) = if ephemeral {
        output::warning("Ephemeral mode: random keys, nothing survives a restart. Never use in production.");
        let authority = TokenAuthority::generate();
        let token = authority.issue(&OwnerId::new(DEV_OWNER)?, settings.token_ttl())?;
        output::info(&format!("Development token for owner '{DEV_OWNER}':"));
        println!("{token}");
        (MasterKey::generate(), authority)
    } else {
        (
            settings.resolve_master_key(sources)?,
            settings.resolve_token_authority(sources)?,
        )
    };

    let repo = open_repository(settings, ephemeral)?;
    let mut service = VaultService::new(VaultStore::new(repo, master_key));
    if let Some(sink) = open_audit(settings) {
        service = service.with_audit(sink);
    }

    let identity: Arc<dyn IdentityProvider> = Arc::new(authority);
    Ok(AppState {
        service: Arc::new(service),
        identity,
    })
}

fn open_repository(settings: &Settings, ephemeral: bool) -> Result<Arc<dyn CredentialRepository>> {
    match (&settings.database_path, ephemeral) {
        (Some(path), false) => open_sqlite(path),
        (Some(_), true) => {
            tracing::warn!("ephemeral mode ignores database_path");
            Ok(Arc::new(MemoryRepository::new()))
        }
        (None, _) => {
            tracing::warn!("no database_path configured; credentials are kept in memory only");
            Ok(Arc::new(MemoryRepository::new()))
        }
    }
}

#[cfg(feature = "sqlite")]
fn open_sqlite(path: &std::path::Path) -> Result<Arc<dyn CredentialRepository>> {
    let repo = crate::vault::SqliteRepository::open(path)?;
    tracing::info!(path = %path.display(), "opened credential database");
    Ok(Arc::new(repo))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(_path: &std::path::Path) -> Result<Arc<dyn CredentialRepository>> {
    Err(crate::errors::VaultError::Config(
        "database_path requires the `sqlite` feature".into(),
    ))
}

/// The audit sink, if configured. A sink that fails to open is logged and
/// skipped; the service runs without it.
#[cfg(feature = "sqlite")]
fn open_audit(settings: &Settings) -> Option<Arc<dyn crate::audit::AuditSink>> {
    let path = settings.audit_path.as_ref()?;
    match crate::audit::AuditLog::open(path) {
        Ok(log) => Some(Arc::new(log)),
        Err(e) => {
            tracing::warn!(error = %e, "audit trail unavailable");
            None
        }
    }
}

#[cfg(not(feature = "sqlite"))]
fn open_audit(settings: &Settings) -> Option<Arc<dyn crate::audit::AuditSink>> {
    if settings.audit_path.is_some() {
        tracing::warn!("audit_path requires the `sqlite` feature; audit trail disabled");
    }
    None
}
