//! Command-line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{AppConfig, AuthConfig, ConfigError};

#[derive(Parser, Debug)]
#[command(name = "duserver", version, about = "Serve disk-usage summaries from du reports")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server for a du report
    Server(ServerArgs),
}

#[derive(Args, Debug)]
pub struct ServerArgs {
    /// du report to load, as written by `du -ak --time`
    #[arg(short = 'f', long = "dufile", value_name = "FILE")]
    pub dufile: PathBuf,

    /// Ignore report paths under a prefix, like ./xxx/*
    #[arg(short = 'i', long = "ignores", value_name = "PREFIX")]
    pub ignores: Vec<String>,

    /// Listen host
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Basic auth user; enables authentication
    #[arg(short = 'U', long = "auth.user")]
    pub auth_user: Option<String>,

    /// Basic auth password
    #[arg(short = 'P', long = "auth.pass")]
    pub auth_pass: Option<String>,

    /// Abort on the first malformed report line
    #[arg(long)]
    pub strict: bool,

    /// JSON config file; flags given here take precedence
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl ServerArgs {
    /// Loads the config file, if any, and applies the flags on top.
    pub fn resolve_config(&self) -> Result<AppConfig, ConfigError> {
        let base = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };
        Ok(self.apply(base))
    }

    fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(user) = self.auth_user.as_deref().filter(|u| !u.is_empty()) {
            config.server.auth = Some(AuthConfig {
                user: user.to_string(),
                password: self.auth_pass.clone().unwrap_or_default(),
            });
        }
        config.index.ignore.extend(self.ignores.iter().cloned());
        config.index.strict |= self.strict;
        config
    }
}
