use crate::error::Result;
use crate::vibr_error;
use crate::events::{DisplayMode, MonitorHandle, MonitorId, MonitorInfo, MonitorRule, WindowAddress, WindowInfo};
use crate::services::ctm::{format_matrix, Mat3};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::info;

use super::r#trait::{Compositor, NotifyLevel};

/// Окна демо-сценария: адрес, класс, монитор, заголовок
pub const DEMO_WINDOWS: [(&str, &str, i64, &str); 4] = [
    ("d1", "kitty", 0, "Terminal - dry_run"),
    ("d2", "firefox", 0, "Browser - dry_run"),
    ("d3", "mpv", 1, "Video - dry_run"),
    ("d4", "cs2", 0, "Game - dry_run"),
];

#[derive(Debug, Default)]
struct DryRunState {
    monitors: Vec<MonitorInfo>,
    windows: Vec<WindowInfo>,
    active: Option<WindowAddress>,
    cursor: Option<(f64, f64)>,
    ctm: HashMap<MonitorId, Mat3>,
    ctm_log: Vec<(MonitorId, Mat3)>,
    mode_commands: Vec<String>,
    notifications: Vec<String>,
}

/// Композитор в памяти: ничего не трогает, только пишет в лог и запоминает действия
#[derive(Debug, Default)]
pub struct DryRunCompositor {
    state: RwLock<DryRunState>,
}

impl DryRunCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Два монитора и несколько окон для `--dry-run`
    pub fn with_demo_setup() -> Self {
        let compositor = Self::new();
        compositor.add_monitor(demo_monitor(0, "DP-1", 2560, 1440, 144.0, 0));
        compositor.add_monitor(demo_monitor(1, "HDMI-A-1", 1920, 1080, 60.0, 2560));

        for (address, class, monitor, title) in DEMO_WINDOWS {
            compositor.add_window(
                WindowInfo::new(WindowAddress::new(address), class, MonitorId(monitor)).with_title(title),
            );
        }

        compositor.set_cursor(100.0, 100.0);
        compositor
    }

    pub fn add_monitor(&self, monitor: MonitorInfo) {
        let mut state = self.state.write();
        state.monitors.push(monitor);
        state.monitors.sort_by_key(|m| m.id);
    }

    pub fn add_window(&self, window: WindowInfo) {
        self.state.write().windows.push(window);
    }

    pub fn set_cursor(&self, x: f64, y: f64) {
        self.state.write().cursor = Some((x, y));
    }

    pub fn set_active(&self, address: Option<WindowAddress>) {
        self.state.write().active = address;
    }
}

/// Управление сценарием и инспекция выполненных действий в тестах
#[allow(dead_code)]
impl DryRunCompositor {
    pub fn remove_monitor(&self, id: MonitorId) {
        let mut state = self.state.write();
        state.monitors.retain(|m| m.id != id);
        state.ctm.remove(&id);
    }

    pub fn clear_cursor(&self) {
        self.state.write().cursor = None;
    }

    /// Текущая матрица монитора (`None`, если её никто не ставил)
    pub fn ctm_of(&self, id: MonitorId) -> Option<Mat3> {
        self.state.read().ctm.get(&id).copied()
    }

    pub fn ctm_log(&self) -> Vec<(MonitorId, Mat3)> {
        self.state.read().ctm_log.clone()
    }

    pub fn mode_commands(&self) -> Vec<String> {
        self.state.read().mode_commands.clone()
    }

    pub fn notifications(&self) -> Vec<String> {
        self.state.read().notifications.clone()
    }

    pub fn clear_log(&self) {
        let mut state = self.state.write();
        state.ctm_log.clear();
        state.mode_commands.clear();
        state.notifications.clear();
    }
}

fn demo_monitor(id: i64, name: &str, width: i32, height: i32, refresh_rate: f32, x: i32) -> MonitorInfo {
    MonitorInfo {
        id: MonitorId(id),
        name: name.to_string(),
        mode: DisplayMode {
            width,
            height,
            refresh_rate,
            x,
            y: 0,
            scale: 1.0,
            transform: 0,
        },
        focused: id == 0,
    }
}

impl Compositor for DryRunCompositor {
    fn name(&self) -> &'static str {
        "DryRun"
    }

    fn version(&self) -> Result<String> {
        Ok("dry-run".to_string())
    }

    fn monitors(&self) -> Result<Vec<MonitorInfo>> {
        Ok(self.state.read().monitors.clone())
    }

    fn monitor_under_cursor(&self) -> Option<MonitorInfo> {
        let state = self.state.read();
        let (x, y) = state.cursor?;
        state.monitors.iter().find(|m| m.mode.contains(x, y)).cloned()
    }

    fn window(&self, address: &WindowAddress) -> Option<WindowInfo> {
        self.state.read().windows.iter().find(|w| &w.address == address).cloned()
    }

    fn active_window(&self) -> Option<WindowInfo> {
        let address = self.state.read().active.clone()?;
        self.window(&address)
    }

    fn set_ctm(&self, monitor: &MonitorHandle, matrix: &Mat3) -> Result<()> {
        let mut state = self.state.write();
        if !state.monitors.iter().any(|m| m.id == monitor.id) {
            return Err(vibr_error!(service_unavailable, "монитор {} не найден", monitor));
        }
        info!("[DRY RUN] CTM {} -> [{}]", monitor, format_matrix(matrix));
        state.ctm.insert(monitor.id, *matrix);
        state.ctm_log.push((monitor.id, *matrix));
        Ok(())
    }

    fn apply_monitor_rule(&self, rule: &MonitorRule) -> Result<()> {
        let mut state = self.state.write();
        let monitor = state
            .monitors
            .iter_mut()
            .find(|m| m.name == rule.monitor)
            .ok_or_else(|| vibr_error!(service_unavailable, "монитор {} не найден", rule.monitor))?;

        info!("[DRY RUN] keyword monitor {}", rule);
        monitor.mode = rule.mode;
        state.mode_commands.push(rule.to_string());
        Ok(())
    }

    fn notify(&self, level: NotifyLevel, message: &str) -> Result<()> {
        info!("[DRY RUN] Уведомление ({:?}): {}", level, message);
        self.state.write().notifications.push(message.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_setup() {
        let compositor = DryRunCompositor::with_demo_setup();

        assert_eq!(compositor.monitors().unwrap().len(), 2);
        for (address, class, _, _) in DEMO_WINDOWS {
            let window = compositor.window(&WindowAddress::new(address)).unwrap();
            assert_eq!(window.initial_class, class);
        }
        assert_eq!(compositor.monitor_under_cursor().map(|m| m.name), Some("DP-1".to_string()));
        assert!(compositor.active_window().is_none());
    }

    #[test]
    fn test_mode_rule_updates_monitor() {
        let compositor = DryRunCompositor::with_demo_setup();
        let dp = compositor.monitor(MonitorId(0)).unwrap();

        let rule = MonitorRule::override_for(&dp, crate::events::Resolution::new(1920, 1080), 60.0);
        compositor.apply_monitor_rule(&rule).unwrap();

        let dp = compositor.monitor(MonitorId(0)).unwrap();
        assert_eq!(dp.mode.resolution(), crate::events::Resolution::new(1920, 1080));
        assert_eq!(compositor.mode_commands(), vec!["DP-1,1920x1080@60,0x0,1".to_string()]);
    }

    #[test]
    fn test_removed_monitor_is_gone() {
        let compositor = DryRunCompositor::with_demo_setup();
        let handle = compositor.monitor(MonitorId(1)).unwrap().handle();

        compositor.remove_monitor(MonitorId(1));

        assert!(compositor.monitor(MonitorId(1)).is_none());
        assert!(compositor.set_ctm(&handle, &crate::services::ctm::IDENTITY).is_err());
    }
}
