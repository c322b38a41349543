use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use anyhow::Result;
use once_cell::sync::Lazy;
use tracing::warn;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_FONT_SIZE: f32 = 20.0;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub dev_mode: bool,
    pub log_level: String,
    pub log_dir: PathBuf,
    pub font_path: PathBuf,
    pub font_size: f32,
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
}

pub static CONFIG: Lazy<Config> =
    Lazy::new(|| Config::load().expect("Failed to load configuration"));

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_bool(&value))
        .unwrap_or(default)
}

fn env_string(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_u16(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u16>().ok())
        .unwrap_or(default)
}

fn env_f32(name: &str, default: f32) -> f32 {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<f32>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn parse_host(value: &str) -> IpAddr {
    match value.trim() {
        "localhost" => IpAddr::V4(Ipv4Addr::LOCALHOST),
        other => other.parse::<IpAddr>().unwrap_or_else(|_| {
            warn!("Invalid HOST value '{}'; binding to 127.0.0.1.", other);
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }),
    }
}

fn sanitize_font_size(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        warn!("Invalid FONT_SIZE value '{}'; using {}.", value, DEFAULT_FONT_SIZE);
        DEFAULT_FONT_SIZE
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let dev_mode = env_bool("DEV_MODE", false);
        let default_level = if dev_mode { "debug" } else { "info" };

        Ok(Config {
            host: parse_host(&env_string("HOST", "127.0.0.1")),
            port: env_u16("PORT", DEFAULT_PORT),
            dev_mode,
            log_level: env_string("LOG_LEVEL", default_level),
            log_dir: PathBuf::from(env_string("LOG_DIR", "logs")),
            font_path: PathBuf::from(env_string("FONT_PATH", "arial.ttf")),
            font_size: sanitize_font_size(env_f32("FONT_SIZE", DEFAULT_FONT_SIZE)),
            static_dir: PathBuf::from(env_string("STATIC_DIR", "static")),
            max_upload_bytes: env_usize("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES).max(1024),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
