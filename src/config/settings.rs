use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::auth::TokenAuthority;
use crate::crypto::{derive_master_key, Argon2Params, MasterKey};
use crate::errors::{Result, VaultError};
use crate::server::ServerConfig;

/// Environment variable holding the base64 master key.
pub const ENV_MASTER_KEY: &str = "CREDVAULT_MASTER_KEY";
/// Environment variable holding a passphrase for Argon2id derivation.
pub const ENV_PASSPHRASE: &str = "CREDVAULT_PASSPHRASE";
/// Environment variable holding the bearer-token signing secret.
pub const ENV_TOKEN_SECRET: &str = "CREDVAULT_TOKEN_SECRET";

/// Deployment configuration, loaded from `credvault.toml`.
///
/// Every field has a default so the service starts without any config
/// file at all. Secrets are never read from this file; see [`KeySources`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Address to bind (default: 127.0.0.1).
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind (default: 5000).
    #[serde(default = "default_port")]
    pub port: u16,

    /// SQLite credential database. Absent means in-memory storage.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// SQLite audit database. Absent disables the audit trail.
    #[serde(default)]
    pub audit_path: Option<PathBuf>,

    /// Origins allowed by CORS.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Log level for this crate when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Lifetime of tokens minted by `credvault token`.
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: u32,

    /// Base64 salt for passphrase derivation.
    #[serde(default)]
    pub kdf_salt: Option<String>,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5000".to_string(),
    ]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_token_ttl_hours() -> u32 {
    24
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_path: None,
            audit_path: None,
            allowed_origins: default_allowed_origins(),
            log_level: default_log_level(),
            token_ttl_hours: default_token_ttl_hours(),
            kdf_salt: None,
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the config directory.
    pub const FILE_NAME: &'static str = "credvault.toml";

    /// Load settings from `<config_dir>/credvault.toml`.
    ///
    /// If the file does not exist, defaults are returned. If it exists
    /// but cannot be parsed, an error is returned. Relative paths in the
    /// file are resolved against `config_dir`.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let mut settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::Config(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.database_path = settings.database_path.map(|p| config_dir.join(p));
        settings.audit_path = settings.audit_path.map(|p| config_dir.join(p));
        Ok(settings)
    }

    /// Apply `CREDVAULT_HOST`, `CREDVAULT_PORT`, `CREDVAULT_DATABASE_PATH`,
    /// `CREDVAULT_AUDIT_PATH` and `CREDVAULT_LOG_LEVEL` from `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = lookup("CREDVAULT_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("CREDVAULT_PORT") {
            self.port = port
                .parse()
                .map_err(|_| VaultError::Config(format!("CREDVAULT_PORT is not a port: {port}")))?;
        }
        if let Some(path) = lookup("CREDVAULT_DATABASE_PATH") {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("CREDVAULT_AUDIT_PATH") {
            self.audit_path = Some(PathBuf::from(path));
        }
        if let Some(level) = lookup("CREDVAULT_LOG_LEVEL") {
            self.log_level = level;
        }
        Ok(())
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            allowed_origins: self.allowed_origins.clone(),
        }
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.token_ttl_hours))
    }

    /// The master key: `CREDVAULT_MASTER_KEY` wins, otherwise
    /// `CREDVAULT_PASSPHRASE` with `kdf_salt`.
    pub fn resolve_master_key(&self, sources: &KeySources) -> Result<MasterKey> {
        if let Some(encoded) = &sources.master_key {
            return MasterKey::from_base64(encoded);
        }

        let Some(passphrase) = &sources.passphrase else {
            return Err(VaultError::Config(format!(
                "no master key configured: set {ENV_MASTER_KEY} or {ENV_PASSPHRASE}"
            )));
        };
        let salt_b64 = self.kdf_salt.as_deref().ok_or_else(|| {
            VaultError::Config(format!("{ENV_PASSPHRASE} requires kdf_salt in {}", Self::FILE_NAME))
        })?;
        let salt = BASE64
            .decode(salt_b64.trim())
            .map_err(|_| VaultError::Config("kdf_salt is not valid base64".into()))?;

        derive_master_key(passphrase.as_bytes(), &salt, &self.argon2_params())
    }

    pub fn resolve_token_authority(&self, sources: &KeySources) -> Result<TokenAuthority> {
        let secret = sources.token_secret.as_ref().ok_or_else(|| {
            VaultError::Config(format!("no token secret configured: set {ENV_TOKEN_SECRET}"))
        })?;
        TokenAuthority::new(secret.as_bytes().to_vec())
    }
}

/// Secret inputs, read from the environment only.
#[derive(Default)]
pub struct KeySources {
    pub master_key: Option<Zeroizing<String>>,
    pub passphrase: Option<Zeroizing<String>>,
    pub token_secret: Option<Zeroizing<String>>,
}

impl KeySources {
    pub fn from_env() -> Self {
        let read = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.is_empty())
                .map(Zeroizing::new)
        };
        Self {
            master_key: read(ENV_MASTER_KEY),
            passphrase: read(ENV_PASSPHRASE),
            token_secret: read(ENV_TOKEN_SECRET),
        }
    }
}

impl std::fmt::Debug for KeySources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySources")
            .field("master_key", &self.master_key.is_some())
            .field("passphrase", &self.passphrase.is_some())
            .field("token_secret", &self.token_secret.is_some())
            .finish()
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::generate_salt;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.host, "127.0.0.1");
        assert_eq!(s.port, 5000);
        assert!(s.database_path.is_none());
        assert_eq!(s.allowed_origins.len(), 2);
        assert_eq!(s.token_ttl_hours, 24);
        assert_eq!(s.argon2_memory_kib, 65_536);
        assert_eq!(s.argon2_iterations, 3);
        assert_eq!(s.argon2_parallelism, 4);
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.port, 5000);
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
host = "0.0.0.0"
port = 8080
database_path = "data/vault.db"
allowed_origins = ["https://vault.example.com"]
token_ttl_hours = 2
"#;
        fs::write(tmp.path().join(Settings::FILE_NAME), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.port, 8080);
        assert_eq!(
            settings.database_path,
            Some(tmp.path().join("data/vault.db"))
        );
        assert_eq!(settings.allowed_origins, vec!["https://vault.example.com"]);
        assert_eq!(settings.token_ttl(), chrono::Duration::hours(2));
        // Unspecified fields keep their defaults.
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn load_rejects_malformed_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(Settings::FILE_NAME), "port = \"many\"").unwrap();
        assert!(matches!(
            Settings::load(tmp.path()),
            Err(VaultError::Config(_))
        ));
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut settings = Settings::default();
        settings
            .apply_overrides(|name| match name {
                "CREDVAULT_PORT" => Some("9000".into()),
                "CREDVAULT_DATABASE_PATH" => Some("/tmp/v.db".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.database_path, Some(PathBuf::from("/tmp/v.db")));

        let bad = settings.apply_overrides(|name| {
            (name == "CREDVAULT_PORT").then(|| "ninety".to_string())
        });
        assert!(bad.is_err());
    }

    #[test]
    fn master_key_from_base64_source() {
        let key = MasterKey::generate();
        let sources = KeySources {
            master_key: Some(key.to_base64()),
            ..KeySources::default()
        };
        let resolved = Settings::default().resolve_master_key(&sources).unwrap();
        assert_eq!(resolved.as_bytes(), key.as_bytes());
    }

    #[test]
    fn master_key_from_passphrase_needs_salt() {
        let sources = KeySources {
            passphrase: Some(Zeroizing::new("correct horse battery".into())),
            ..KeySources::default()
        };
        let mut settings = Settings {
            argon2_memory_kib: 8_192,
            argon2_iterations: 1,
            argon2_parallelism: 1,
            ..Settings::default()
        };
        assert!(matches!(
            settings.resolve_master_key(&sources),
            Err(VaultError::Config(_))
        ));

        settings.kdf_salt = Some(BASE64.encode(generate_salt()));
        let a = settings.resolve_master_key(&sources).unwrap();
        let b = settings.resolve_master_key(&sources).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn missing_secrets_are_config_errors() {
        let settings = Settings::default();
        let empty = KeySources::default();
        assert!(matches!(
            settings.resolve_master_key(&empty),
            Err(VaultError::Config(_))
        ));
        assert!(matches!(
            settings.resolve_token_authority(&empty),
            Err(VaultError::Config(_))
        ));
    }

    #[test]
    fn key_sources_debug_hides_values() {
        let sources = KeySources {
            token_secret: Some(Zeroizing::new("super-secret-value".into())),
            ..KeySources::default()
        };
        assert!(!format!("{sources:?}").contains("super-secret"));
    }
}
