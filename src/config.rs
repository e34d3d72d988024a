use crate::db;
use crate::public_address::HttpPublicAddress;

use hyper::Uri;
use serde::Deserialize;
#[cfg(feature = "multi-thread")]
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_data_dir")]
    pub data_dir: PathBuf,
    /// Explicit database locations override the `data_dir` defaults
    #[serde(default)]
    pub ipv4_database: Option<PathBuf>,
    #[serde(default)]
    pub ipv6_database: Option<PathBuf>,
    #[serde(
        default = "HttpPublicAddress::default_uri",
        alias = "public_address_url",
        with = "http_serde::uri"
    )]
    pub public_address_uri: Uri,
    #[serde(default = "Config::default_log_level")]
    pub log_level: log::Level,
    /// Worker threads; unset means one per core
    #[cfg(feature = "multi-thread")]
    #[serde(default)]
    pub threads: Option<NonZeroUsize>,
}

impl Config {
    fn default_data_dir() -> PathBuf {
        ".".into()
    }

    fn default_log_level() -> log::Level {
        log::Level::Info
    }

    pub fn ipv4_database_path(&self) -> PathBuf {
        self.ipv4_database
            .clone()
            .unwrap_or_else(|| self.data_dir.join(db::IPV4_DATABASE))
    }

    pub fn ipv6_database_path(&self) -> PathBuf {
        self.ipv6_database
            .clone()
            .unwrap_or_else(|| self.data_dir.join(db::IPV6_DATABASE))
    }
}

pub fn parse_config<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let toml_string = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&toml_string)?;
    Ok(config)
}
