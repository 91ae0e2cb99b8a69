use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub static CONFIG_PATH: Lazy<&'static Path> = Lazy::new(|| {
    Path::new(option_env!("SNAPMATCH_CONFIG_PATH").unwrap_or("/usr/local/etc/snapmatch/config.toml"))
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the photo-event service.
    pub server: String,
    /// v4l device used for selfie capture.
    pub camera: String,
    /// Fixed raster size for captured stills.
    pub capture_width: u32,
    pub capture_height: u32,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: "http://localhost:8000".to_string(),
            camera: "/dev/video0".to_string(),
            capture_width: 640,
            capture_height: 480,
            timeout_secs: 30,
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.unwrap_or(&CONFIG_PATH);
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config at {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}

pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<()> {
    let path = path.unwrap_or(&CONFIG_PATH);
    let data = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = load_config(Some(Path::new("/nonexistent/snapmatch.toml"))).unwrap();
        assert_eq!(cfg.server, "http://localhost:8000");
        assert_eq!(cfg.camera, "/dev/video0");
        assert_eq!((cfg.capture_width, cfg.capture_height), (640, 480));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let cfg = Config {
            server: "https://photos.example.com".into(),
            camera: "/dev/video2".into(),
            capture_width: 1280,
            capture_height: 720,
            timeout_secs: 5,
        };
        let raw = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&raw).unwrap();
        assert_eq!(back.server, cfg.server);
        assert_eq!(back.timeout_secs, 5);
    }
}
