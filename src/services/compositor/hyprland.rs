use crate::config::Config;
use crate::error::{Result, VibrError};
use crate::events::{DisplayMode, MonitorHandle, MonitorId, MonitorInfo, MonitorRule, WindowAddress, WindowInfo};
use crate::services::ctm::{format_matrix, Mat3};
use crate::vibr_error;
use serde::Deserialize;
use std::process::Command;
use tracing::{debug, info, warn};

use super::ipc::HyprSockets;
use super::r#trait::{Compositor, NotifyLevel};

const NOTIFY_TIMEOUT_MS: u32 = 5000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HyprMonitor {
    id: i64,
    name: String,
    width: i32,
    height: i32,
    refresh_rate: f32,
    x: i32,
    y: i32,
    scale: f32,
    #[serde(default)]
    transform: u8,
    #[serde(default)]
    focused: bool,
}

impl From<HyprMonitor> for MonitorInfo {
    fn from(m: HyprMonitor) -> Self {
        MonitorInfo {
            id: MonitorId(m.id),
            name: m.name,
            mode: DisplayMode {
                width: m.width,
                height: m.height,
                refresh_rate: m.refresh_rate,
                x: m.x,
                y: m.y,
                scale: m.scale,
                transform: m.transform,
            },
            focused: m.focused,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct HyprClient {
    address: String,
    monitor: i64,
    class: String,
    title: String,
    initial_class: String,
}

impl HyprClient {
    fn into_window(self) -> Option<WindowInfo> {
        if self.address.is_empty() {
            return None;
        }
        Some(
            WindowInfo::new(WindowAddress::new(&self.address), self.initial_class, MonitorId(self.monitor))
                .with_title(self.title)
                .with_class(self.class),
        )
    }
}

#[derive(Debug, Deserialize)]
struct CursorPos {
    x: f64,
    y: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HyprVersion {
    tag: String,
}

pub struct HyprlandCompositor {
    sockets: HyprSockets,
    ctm_command: Vec<String>,
    notifications: bool,
}

impl HyprlandCompositor {
    pub fn new(config: &Config) -> Result<Self> {
        let sockets = HyprSockets::discover(config.hyprland.instance_signature.as_deref())?;
        info!("Инициализация HyprlandCompositor ({:?})", sockets.dir());

        if config.hyprland.ctm_command.is_empty() {
            warn!("hyprland.ctm_command не задан - насыщенность применяться не будет");
        }

        Ok(Self {
            sockets,
            ctm_command: config.hyprland.ctm_command.clone(),
            notifications: config.hyprland.notifications,
        })
    }

    fn query<T: for<'de> Deserialize<'de>>(&self, command: &str) -> Result<T> {
        let response = self.sockets.request(command)?;
        Ok(serde_json::from_str(&response)?)
    }

    fn clients(&self) -> Result<Vec<HyprClient>> {
        self.query("j/clients")
    }

    /// Подставить монитор и матрицу в шаблон внешней команды
    fn ctm_args(&self, monitor: &MonitorHandle, matrix: &Mat3) -> Vec<String> {
        let matrix = format_matrix(matrix);
        self.ctm_command
            .iter()
            .skip(1)
            .map(|arg| arg.replace("{monitor}", &monitor.name).replace("{matrix}", &matrix))
            .collect()
    }
}

impl Compositor for HyprlandCompositor {
    fn name(&self) -> &'static str {
        "Hyprland"
    }

    fn version(&self) -> Result<String> {
        let version: HyprVersion = self.query("j/version")?;
        Ok(version.tag)
    }

    fn monitors(&self) -> Result<Vec<MonitorInfo>> {
        let monitors: Vec<HyprMonitor> = self.query("j/monitors")?;
        let mut monitors: Vec<MonitorInfo> = monitors.into_iter().map(MonitorInfo::from).collect();
        monitors.sort_by_key(|m| m.id);
        Ok(monitors)
    }

    fn monitor_under_cursor(&self) -> Option<MonitorInfo> {
        let pos: CursorPos = match self.query("j/cursorpos") {
            Ok(pos) => pos,
            Err(e) => {
                debug!("Не удалось получить позицию курсора: {}", e);
                return None;
            }
        };
        self.monitors()
            .ok()?
            .into_iter()
            .find(|m| m.mode.contains(pos.x, pos.y))
    }

    fn window(&self, address: &WindowAddress) -> Option<WindowInfo> {
        match self.clients() {
            Ok(clients) => clients
                .into_iter()
                .filter_map(HyprClient::into_window)
                .find(|w| &w.address == address),
            Err(e) => {
                warn!("Не удалось получить список окон: {}", e);
                None
            }
        }
    }

    fn active_window(&self) -> Option<WindowInfo> {
        // Без активного окна Hyprland отвечает `{}`
        match self.query::<HyprClient>("j/activewindow") {
            Ok(client) => client.into_window(),
            Err(e) => {
                warn!("Не удалось получить активное окно: {}", e);
                None
            }
        }
    }

    fn set_ctm(&self, monitor: &MonitorHandle, matrix: &Mat3) -> Result<()> {
        let Some(program) = self.ctm_command.first() else {
            return Err(vibr_error!(
                service_unavailable,
                "CTM для {} не применена: hyprland.ctm_command не задан",
                monitor
            ));
        };

        let output = Command::new(program)
            .args(self.ctm_args(monitor, matrix))
            .output()
            .map_err(|e| VibrError::ServiceUnavailable(format!("{} не запускается: {}", program, e)))?;

        if !output.status.success() {
            return Err(VibrError::Ipc(format!(
                "{} вернул ошибку: {}",
                program,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        debug!("CTM установлена на {}: {}", monitor, format_matrix(matrix));
        Ok(())
    }

    fn apply_monitor_rule(&self, rule: &MonitorRule) -> Result<()> {
        self.sockets.command(&format!("keyword monitor {}", rule))
    }

    fn notify(&self, level: NotifyLevel, message: &str) -> Result<()> {
        if !self.notifications {
            return Ok(());
        }
        // Иконки hyprctl notify: 0 warning, 3 error, 5 ok
        let (icon, color) = match level {
            NotifyLevel::Info => (5, "rgb(33ff33)"),
            NotifyLevel::Warning => (0, "rgb(ffcc33)"),
            NotifyLevel::Error => (3, "rgb(ff3333)"),
        };
        self.sockets
            .command(&format!("notify {} {} {} {}", icon, NOTIFY_TIMEOUT_MS, color, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONITORS_JSON: &str = r#"[
        {"id": 1, "name": "HDMI-A-1", "description": "", "width": 1920, "height": 1080,
         "refreshRate": 60.00000, "x": 2560, "y": 0, "scale": 1.00, "transform": 1, "focused": false},
        {"id": 0, "name": "DP-1", "width": 2560, "height": 1440,
         "refreshRate": 143.99800, "x": 0, "y": 0, "scale": 1.25, "focused": true}
    ]"#;

    #[test]
    fn test_monitor_json_mapping() {
        let monitors: Vec<HyprMonitor> = serde_json::from_str(MONITORS_JSON).unwrap();
        let dp: MonitorInfo = monitors.into_iter().nth(1).map(MonitorInfo::from).unwrap();

        assert_eq!(dp.id, MonitorId(0));
        assert_eq!(dp.name, "DP-1");
        assert_eq!(dp.mode.width, 2560);
        assert_eq!(dp.mode.scale, 1.25);
        assert_eq!(dp.mode.transform, 0);
        assert!(dp.focused);
    }

    #[test]
    fn test_rotated_monitor_json_mapping() {
        let monitors: Vec<HyprMonitor> = serde_json::from_str(MONITORS_JSON).unwrap();
        let hdmi: MonitorInfo = monitors.into_iter().next().map(MonitorInfo::from).unwrap();

        assert_eq!(hdmi.mode.transform, 1);
        // Повёрнутый 1920x1080 занимает 1080 по ширине и 1920 по высоте
        assert!(hdmi.mode.contains(2560.0 + 1000.0, 1800.0));
        assert!(!hdmi.mode.contains(2560.0 + 1500.0, 100.0));
    }

    #[test]
    fn test_client_json_mapping() {
        let client: HyprClient = serde_json::from_str(
            r#"{"address": "0x55d1f0a0", "mapped": true, "monitor": 1,
                "class": "firefox-nightly", "title": "Firefox",
                "initialClass": "firefox", "initialTitle": "Firefox"}"#,
        )
        .unwrap();
        let window = client.into_window().unwrap();

        assert_eq!(window.address, WindowAddress::new("55d1f0a0"));
        assert_eq!(window.initial_class, "firefox");
        assert_eq!(window.class, "firefox-nightly");
        assert_eq!(window.monitor, MonitorId(1));
    }

    #[test]
    fn test_empty_active_window() {
        let client: HyprClient = serde_json::from_str("{}").unwrap();
        assert!(client.into_window().is_none());
    }

    #[test]
    fn test_ctm_args_template() {
        let compositor = HyprlandCompositor {
            sockets: HyprSockets::new("/nonexistent"),
            ctm_command: vec![
                "vibr-ctm".to_string(),
                "--output={monitor}".to_string(),
                "{matrix}".to_string(),
            ],
            notifications: false,
        };
        let handle = MonitorHandle {
            id: MonitorId(0),
            name: "DP-1".to_string(),
        };

        assert_eq!(
            compositor.ctm_args(&handle, &crate::services::ctm::IDENTITY),
            vec!["--output=DP-1".to_string(), "1,0,0,0,1,0,0,0,1".to_string()]
        );
        assert!(compositor.notify(NotifyLevel::Info, "skipped").is_ok());
    }

    #[test]
    fn test_ctm_without_command_is_an_error() {
        let compositor = HyprlandCompositor {
            sockets: HyprSockets::new("/nonexistent"),
            ctm_command: Vec::new(),
            notifications: false,
        };
        let handle = MonitorHandle {
            id: MonitorId(1),
            name: "HDMI-A-1".to_string(),
        };

        let err = compositor
            .set_ctm(&handle, &crate::services::ctm::saturation_matrix(0.5))
            .unwrap_err();
        assert!(matches!(err, VibrError::ServiceUnavailable(_)));
        assert!(err.to_string().contains("ctm_command"));
    }
}
