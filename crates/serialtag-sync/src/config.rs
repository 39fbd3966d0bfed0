//! Command line and settings file handling.
//!
//! Settings are read from an optional TOML file (default
//! `./serialtag_settings.toml`):
//!
//! ```toml
//! auth_token = "..."
//! user = "ops@example.net"
//! password = "..."
//! controller = "https://api.elcapitan.cloudgenix.com"
//! ```
//!
//! Command line flags take precedence over the file. A token may also come
//! from the `X_AUTH_TOKEN` or `AUTH_TOKEN` environment variables.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use serialtag_common::{SyncError, SyncResult};

use crate::endpoints::DEFAULT_CONTROLLER;
use crate::http_client::HttpControllerConfig;
use crate::sync::SyncMode;

/// Default settings file, relative to the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "serialtag_settings.toml";

/// Environment variables consulted for a token, highest priority first.
pub const TOKEN_ENV_VARS: [&str; 2] = ["X_AUTH_TOKEN", "AUTH_TOKEN"];

/// Check/Create Serial Number Tags
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "serialtagsync")]
#[command(version, about = "Check/Create Serial Number Tags (v1.0)", long_about = None)]
pub struct Args {
    /// Remove all Serial Tags.
    #[arg(long, help_heading = "Tag Options")]
    pub remove: bool,

    /// Controller URI, ex. https://api.elcapitan.cloudgenix.com
    #[arg(short = 'C', long, help_heading = "API")]
    pub controller: Option<String>,

    /// Use this email as User Name instead of the settings file or prompting
    #[arg(short = 'E', long, help_heading = "Login")]
    pub email: Option<String>,

    /// Use this Password instead of the settings file or prompting
    #[arg(short = 'P', long, alias = "PW", help_heading = "Login")]
    pub password: Option<String>,

    /// Do not verify SSL certificate
    #[arg(short = 'I', long, help_heading = "Login")]
    pub insecure: bool,

    /// Ignore Region-based redirection.
    #[arg(long = "noregion", alias = "NR", help_heading = "Login")]
    pub ignore_region: bool,

    /// Enable debug output, levels 0-2
    #[arg(short = 'D', long, default_value_t = 0, help_heading = "Debug")]
    pub sdkdebug: u8,

    /// Settings file with auth_token / user / password / controller
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    pub settings: PathBuf,
}

/// Contents of the settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Static API token.
    pub auth_token: Option<String>,
    /// Login email.
    pub user: Option<String>,
    /// Login password.
    pub password: Option<String>,
    /// Controller URI.
    pub controller: Option<String>,
}

impl Settings {
    /// Loads settings, returning defaults when the file does not exist.
    pub fn load(path: &Path) -> SyncResult<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents).map_err(|e| {
                SyncError::invalid_config(path.display().to_string(), e.to_string())
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(SyncError::io(
                format!("read settings file {}", path.display()),
                e,
            )),
        }
    }

    /// Parses settings from TOML.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

/// Credentials gathered from all sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Static token.
    pub token: Option<String>,
    /// Login email.
    pub email: Option<String>,
    /// Login password.
    pub password: Option<String>,
    /// Email or password was given on the command line.
    pub from_command_line: bool,
}

impl Credentials {
    /// Returns the token if it should be used instead of a login.
    pub fn token_for_login(&self) -> Option<&str> {
        if self.from_command_line {
            return None;
        }
        self.token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Fully resolved run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Ensure or remove.
    pub mode: SyncMode,
    /// Connection settings.
    pub http: HttpControllerConfig,
    /// Credentials for authentication.
    pub credentials: Credentials,
    /// Default log filter directive.
    pub log_filter: &'static str,
}

impl RunConfig {
    /// Merges command line, settings file and environment.
    ///
    /// `env` looks up an environment variable; it is a parameter so the
    /// resolution can be exercised without touching the process environment.
    pub fn resolve<F>(args: &Args, settings: &Settings, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = settings
            .auth_token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| {
                TOKEN_ENV_VARS
                    .into_iter()
                    .find_map(|var| env(var).filter(|t| !t.is_empty()))
            });

        let credentials = Credentials {
            token,
            email: args.email.clone().or_else(|| settings.user.clone()),
            password: args.password.clone().or_else(|| settings.password.clone()),
            from_command_line: args.email.is_some() || args.password.is_some(),
        };

        let controller = args
            .controller
            .clone()
            .or_else(|| settings.controller.clone())
            .unwrap_or_else(|| DEFAULT_CONTROLLER.to_string());

        Self {
            mode: if args.remove {
                SyncMode::Remove
            } else {
                SyncMode::Ensure
            },
            http: HttpControllerConfig {
                controller,
                insecure: args.insecure,
                ignore_region: args.ignore_region,
            },
            credentials,
            log_filter: log_filter(args.sdkdebug),
        }
    }
}

/// Maps the debug level to a log filter directive.
///
/// 0 shows warnings and errors only, 1 adds info, 2 and above add debug.
pub fn log_filter(sdkdebug: u8) -> &'static str {
    match sdkdebug {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}
