use serde::{Deserialize, Serialize};
use std::path::Path;

/// One simulated channel definition for the built-in feed simulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimChannel {
    pub name: String,
    /// Wave period in seconds.
    pub period: f64,
    pub amplitude: f64,
    pub offset: f64,
    /// Uniform noise half-width added to each sample.
    #[serde(default)]
    pub noise: f64,
    /// Probability per tick of toggling a disconnect gap.
    #[serde(default)]
    pub dropout: f64,
    #[serde(default)]
    pub units: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSettings {
    pub title: String,
    pub width: f32,
    pub height: f32,
    /// Bind address of the remote command listener.
    pub command_bind: String,
    /// Rolling history window for new plot windows, in seconds.
    pub default_back_length: f64,
    /// Directory image windows load `<channel>.png` from.
    pub image_dir: String,
    #[serde(default)]
    pub sim_channels: Vec<SimChannel>,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            title: "stripmon".to_string(),
            width: 1280.0,
            height: 720.0,
            command_bind: "127.0.0.1:1337".to_string(),
            default_back_length: 60.0,
            image_dir: "images".to_string(),
            sim_channels: vec![
                SimChannel {
                    name: "sim:sine".to_string(),
                    period: 12.0,
                    amplitude: 5.0,
                    offset: 10.0,
                    noise: 0.2,
                    dropout: 0.0,
                    units: "mbar".to_string(),
                },
                SimChannel {
                    name: "sim:flaky".to_string(),
                    period: 7.0,
                    amplitude: 2.0,
                    offset: -1.0,
                    noise: 0.05,
                    dropout: 0.01,
                    units: "V".to_string(),
                },
            ],
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub fn normalize_settings(mut settings: MonitorSettings) -> Result<MonitorSettings, String> {
    if settings.command_bind.trim().is_empty() {
        return Err("command_bind must not be empty".to_string());
    }
    if !settings.default_back_length.is_finite() {
        return Err("default_back_length must be a finite number of seconds".to_string());
    }
    settings.width = settings.width.max(200.0);
    settings.height = settings.height.max(150.0);
    settings.default_back_length = settings.default_back_length.max(1.0);
    for channel in &mut settings.sim_channels {
        channel.period = channel.period.max(0.1);
        channel.dropout = channel.dropout.clamp(0.0, 1.0);
    }
    Ok(settings)
}

pub fn load_settings_file(path: &Path) -> Result<MonitorSettings, SettingsError> {
    let data = std::fs::read_to_string(path)?;
    let settings: MonitorSettings = toml::from_str(&data)?;
    Ok(settings)
}

/// Load settings, falling back to defaults when the file does not exist.
/// A present-but-invalid file is an error rather than a silent default.
pub fn load_or_default(path: &Path) -> Result<MonitorSettings, String> {
    if !path.exists() {
        log::debug!("settings file '{}' not found, using defaults", path.display());
        return normalize_settings(MonitorSettings::default());
    }
    let settings = load_settings_file(path)
        .map_err(|e| format!("Failed to load settings file '{}': {e}", path.display()))?;
    normalize_settings(settings)
}

pub fn save_settings_file(path: &Path, settings: &MonitorSettings) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let data = toml::to_string_pretty(settings)
        .map_err(|e| format!("Failed to serialize settings: {e}"))?;
    std::fs::write(path, data).map_err(|e| {
        format!(
            "Failed to write settings file '{}': {e}",
            path.display()
        )
    })
}
