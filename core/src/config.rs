use camino::{Utf8Path as Path, Utf8PathBuf as PathBuf};
use color_eyre::eyre::{bail, Context, Result};
use serde::Deserialize;

use crate::core::asset_manager::StoreParams;

pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 128 * 1024 * 1024;
pub const DEFAULT_BASE_URL: &str = "/static";
pub const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_FILE_NAME: &str = "images.db";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TomlServer {
    address: Option<String>,
    port: Option<u16>,
}

/// Either a number of bytes or a human readable size like "128 MiB"
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum TomlSize {
    Bytes(u64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TomlImages {
    dir: String,
    url: Option<String>,
    max_size: Option<TomlSize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TomlDatabase {
    path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TomlConfig {
    #[serde(rename = "Server")]
    pub server: Option<TomlServer>,
    #[serde(rename = "Images")]
    pub images: TomlImages,
    #[serde(rename = "Database")]
    pub database: Option<TomlDatabase>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub address: Option<String>,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagesConfig {
    /// Directory holding the image files
    pub dir: PathBuf,
    /// URL prefix the files are served under
    pub url: String,
    pub max_size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub server: ServerConfig,
    pub images: ImagesConfig,
    /// Path of the sqlite database file
    pub database_path: PathBuf,
}

impl Config {
    pub fn store_params(&self) -> StoreParams {
        StoreParams {
            max_upload_size: self.images.max_size,
            base_url: self.images.url.clone(),
        }
    }
}

pub async fn read_config(path: &Path) -> Result<Config> {
    let toml_str = tokio::fs::read_to_string(path)
        .await
        .context(format!("Error reading config file {}", path))?;
    // all paths in config are relative to this
    let config_dir = path.parent().unwrap_or(Path::new("."));
    parse_config(&toml_str, config_dir)
}

pub fn parse_config(toml_str: &str, config_dir: &Path) -> Result<Config> {
    let toml_config: TomlConfig = toml::from_str(toml_str).context("Error parsing config file")?;
    let server = ServerConfig {
        address: toml_config.server.as_ref().and_then(|s| s.address.clone()),
        port: toml_config
            .server
            .as_ref()
            .and_then(|s| s.port)
            .unwrap_or(DEFAULT_PORT),
    };
    let max_size = match toml_config.images.max_size {
        None => DEFAULT_MAX_UPLOAD_SIZE,
        Some(TomlSize::Bytes(bytes)) => bytes,
        Some(TomlSize::Text(text)) => parse_size::parse_size(&text)
            .wrap_err_with(|| format!("Invalid Images.max_size '{}'", text))?,
    };
    if max_size == 0 {
        bail!("Images.max_size must be larger than zero");
    }
    let images = ImagesConfig {
        dir: resolve(config_dir, &toml_config.images.dir),
        url: toml_config
            .images
            .url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
        max_size,
    };
    let database_path = match toml_config.database.and_then(|db| db.path) {
        Some(path) => resolve(config_dir, &path),
        None => config_dir.join(DEFAULT_DB_FILE_NAME),
    };
    Ok(Config {
        server,
        images,
        database_path,
    })
}

fn resolve(config_dir: &Path, path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        config_dir.join(path)
    }
}
