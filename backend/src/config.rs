//! Service configuration loaded via OrthoConfig.
//!
//! Values come from `CATERING_*` environment variables, command-line flags or
//! an optional config file. Unset optional fields fall back to the defaults
//! exposed by the accessor methods.

use std::net::{AddrParseError, SocketAddr};
use std::path::{Path, PathBuf};

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TOKEN_SECRET_FILE: &str = "/var/run/secrets/token_secret";
const DEFAULT_CLIENT_URL: &str = "http://localhost:5173";
const DEFAULT_UPLOAD_DIR: &str = "./uploads";
const DEFAULT_UPLOAD_BASE_URL: &str = "/uploads";
const DEFAULT_MAIL_FROM: &str = "CaterEase <no-reply@caterease.local>";

/// Settings for the catering API process.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CATERING")]
pub struct AppSettings {
    /// Socket address the HTTP listener binds to.
    pub bind_addr: Option<String>,
    /// Postgres connection URL. In-memory stores are used when absent.
    pub database_url: Option<String>,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = false)]
    pub run_migrations: bool,
    /// File holding the HS256 signing secret.
    pub token_secret_file: Option<PathBuf>,
    /// Generate a throwaway secret when the secret file cannot be read.
    #[ortho_config(default = false)]
    pub allow_ephemeral_secret: bool,
    /// Front-end origin used in password reset links.
    pub client_url: Option<String>,
    /// Directory uploaded images are written to.
    pub upload_dir: Option<PathBuf>,
    /// Public URL prefix for stored images.
    pub upload_base_url: Option<String>,
    /// HTTP mail relay endpoint. Mail is only logged when absent.
    pub mail_relay_url: Option<String>,
    /// Sender address for outgoing mail.
    pub mail_from: Option<String>,
}

impl AppSettings {
    /// Resolve the listen address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    /// Returns [`AddrParseError`] when the configured value is not a socket
    /// address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
    }

    pub fn token_secret_file(&self) -> &Path {
        self.token_secret_file
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_TOKEN_SECRET_FILE))
    }

    pub fn client_url(&self) -> &str {
        self.client_url.as_deref().unwrap_or(DEFAULT_CLIENT_URL)
    }

    pub fn upload_dir(&self) -> &Path {
        self.upload_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_UPLOAD_DIR))
    }

    pub fn upload_base_url(&self) -> &str {
        self.upload_base_url
            .as_deref()
            .unwrap_or(DEFAULT_UPLOAD_BASE_URL)
    }

    pub fn mail_from(&self) -> &str {
        self.mail_from.as_deref().unwrap_or(DEFAULT_MAIL_FROM)
    }
}
