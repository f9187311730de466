use crate::config::Config;
use crate::error::Result;
use crate::events::{MonitorHandle, MonitorId, MonitorInfo, MonitorRule, WindowAddress, WindowInfo};
use crate::services::ctm::Mat3;
use super::dry_run::DryRunCompositor;
use std::fmt;
use std::sync::Arc;

/// Уровень уведомления композитора
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Warning,
    Error,
}

/// Narrow view of the compositor used by the reconciler and the controller.
///
/// Monitors and windows are never held by reference: callers keep ids/addresses
/// and resolve them again on every use. A referent that no longer resolves is `None`.
pub trait Compositor: Send + Sync {
    /// Имя бэкенда для логов
    fn name(&self) -> &'static str;

    /// Версия композитора (проверяется при старте)
    fn version(&self) -> Result<String>;

    fn monitors(&self) -> Result<Vec<MonitorInfo>>;

    fn monitor(&self, id: MonitorId) -> Option<MonitorInfo> {
        self.monitors().ok()?.into_iter().find(|m| m.id == id)
    }

    /// Монитор под указателем мыши
    fn monitor_under_cursor(&self) -> Option<MonitorInfo>;

    fn window(&self, address: &WindowAddress) -> Option<WindowInfo>;

    fn active_window(&self) -> Option<WindowInfo>;

    /// Установить матрицу цветового преобразования
    fn set_ctm(&self, monitor: &MonitorHandle, matrix: &Mat3) -> Result<()>;

    /// Сменить режим монитора (разрешение, частота, позиция, масштаб)
    fn apply_monitor_rule(&self, rule: &MonitorRule) -> Result<()>;

    fn notify(&self, level: NotifyLevel, message: &str) -> Result<()>;
}

impl fmt::Debug for dyn Compositor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Compositor({})", self.name())
    }
}

/// Factory function: the shared demo compositor in dry-run mode, Hyprland otherwise
pub fn create_compositor(config: Arc<Config>, demo: Option<Arc<DryRunCompositor>>) -> Result<Arc<dyn Compositor>> {
    match demo {
        Some(demo) => Ok(demo as Arc<dyn Compositor>),
        None => Ok(Arc::new(super::hyprland::HyprlandCompositor::new(&config)?)),
    }
}
