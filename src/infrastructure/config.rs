use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DATA_PATH_ENV: &str = "DATA_PATH";
pub const DEFAULT_DATA_PATH: &str = "./cleaned_data.csv";
const CONFIG_FILE: &str = "config/dashboard";

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub server: ServerSettings,
    pub data: DataSettings,
    pub page: PageSettings,
    pub chart: ChartSettings,
    pub session: SessionSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataSettings {
    pub path: String,
    pub base_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PageSettings {
    pub title: String,
    pub stylesheet: PathBuf,
    pub footer: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartSettings {
    pub color: String,
    pub width: u32,
    pub height: u32,
    pub pie_bins: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    /// Seconds a session may sit idle before its selection is forgotten
    pub ttl_secs: u64,
}

impl SessionSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl DataSettings {
    /// Data file location: `path` joined onto `base_dir`. An absolute
    /// `path` is used as is.
    pub fn resolve_data_path(&self) -> PathBuf {
        self.base_dir.join(&self.path)
    }
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    build_dashboard_config(Some(CONFIG_FILE), std::env::var(DATA_PATH_ENV).ok())
}

/// Layer defaults, the optional config file and the `DATA_PATH` override,
/// in increasing precedence.
pub fn build_dashboard_config(
    file: Option<&str>,
    data_path_override: Option<String>,
) -> anyhow::Result<DashboardConfig> {
    let mut builder = config::Config::builder()
        .set_default("server.bind", "0.0.0.0:8080")?
        .set_default("data.path", DEFAULT_DATA_PATH)?
        .set_default("data.base_dir", ".")?
        .set_default("page.title", "Smart Agriculture Dashboard")?
        .set_default("page.stylesheet", "./styles.css")?
        .set_default("page.footer", "Smart Agriculture Dashboard © 2024")?
        .set_default("chart.color", "#365341")?
        .set_default("chart.width", 800)?
        .set_default("chart.height", 450)?
        .set_default("chart.pie_bins", 5)?
        .set_default("session.ttl_secs", 1800)?;

    if let Some(file) = file {
        builder = builder.add_source(config::File::with_name(file).required(false));
    }

    let settings = builder
        .set_override_option("data.path", data_path_override)?
        .build()?;

    let config: DashboardConfig = settings.try_deserialize()?;
    anyhow::ensure!(config.chart.pie_bins > 0, "chart.pie_bins must be at least 1");
    anyhow::ensure!(
        config.chart.width > 0 && config.chart.height > 0,
        "chart.width and chart.height must be positive"
    );
    anyhow::ensure!(config.session.ttl_secs > 0, "session.ttl_secs must be positive");

    Ok(config)
}
