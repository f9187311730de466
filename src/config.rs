use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Стандартная частота обновления, если правило задаёт разрешение без частоты
pub const DEFAULT_REFRESH_RATE: f32 = 60.0;

/// Префикс директив в файле правил по умолчанию
pub const DEFAULT_NAMESPACE: &str = "hyprvibr";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub rules: RulesConfig,
    pub hyprland: HyprlandConfig,
    pub dry_run: DryRunConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RulesConfig {
    /// Файл с директивами `<namespace>-app` и `<namespace>-saturation`
    pub path: PathBuf,
    pub namespace: String,
    pub default_refresh_rate: f32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HyprlandConfig {
    /// Переопределяет HYPRLAND_INSTANCE_SIGNATURE
    #[serde(default)]
    pub instance_signature: Option<String>,
    /// Внешняя программа для установки CTM: аргументы с плейсхолдерами `{monitor}` и `{matrix}`
    #[serde(default)]
    pub ctm_command: Vec<String>,
    pub notifications: bool,
    pub reconnect_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DryRunConfig {
    pub event_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "full".to_string(),
            },
            rules: RulesConfig {
                path: default_rules_path(),
                namespace: DEFAULT_NAMESPACE.to_string(),
                default_refresh_rate: DEFAULT_REFRESH_RATE,
            },
            hyprland: HyprlandConfig {
                instance_signature: None,
                ctm_command: Vec::new(),
                notifications: true,
                reconnect_delay_ms: 2000,
            },
            dry_run: DryRunConfig {
                event_interval_ms: 5000,
            },
        }
    }
}

fn config_home() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"))
}

fn default_rules_path() -> PathBuf {
    config_home().join("hypr").join("hyprvibr.conf")
}

/// Путь к файлу настроек демона по умолчанию
pub fn default_config_path() -> PathBuf {
    config_home().join("hyprvibr").join("hyprvibr.toml")
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();
        Self::from_figment(
            Figment::from(Serialized::defaults(Config::default()))
                .merge(Toml::file(config_path))
                .merge(Env::prefixed("HYPRVIBR_").split("__")),
        )
        .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))
    }

    fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "full" | "compact" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Валидация правил
        if self.rules.namespace.trim().is_empty() {
            anyhow::bail!("rules.namespace не может быть пустым");
        }

        if !(self.rules.default_refresh_rate > 0.0) {
            anyhow::bail!(
                "rules.default_refresh_rate должно быть больше 0, получено {}",
                self.rules.default_refresh_rate
            );
        }

        if self.hyprland.reconnect_delay_ms < 100 {
            anyhow::bail!("hyprland.reconnect_delay_ms должно быть минимум 100");
        }

        if self.dry_run.event_interval_ms == 0 {
            anyhow::bail!("dry_run.event_interval_ms должно быть больше 0");
        }

        Ok(())
    }

    /// Ключевые слова директив для текущего пространства имён
    pub fn saturation_keyword(&self) -> String {
        format!("{}-saturation", self.rules.namespace)
    }

    pub fn app_keyword(&self) -> String {
        format!("{}-app", self.rules.namespace)
    }
}
