pub mod monitor;
pub mod window;

pub use monitor::{DisplayMode, MonitorHandle, MonitorId, MonitorInfo, MonitorRule, Resolution};
pub use window::{WindowAddress, WindowInfo};

/// События композитора, на которые реагирует демон
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// Смена активного окна; `None` означает рабочий стол без фокуса
    FocusChanged(Option<WindowAddress>),
    /// Композитор перечитал свою конфигурацию
    ConfigReloaded,
}

impl HostEvent {
    pub fn focus(address: impl Into<String>) -> Self {
        let address = address.into();
        if address.is_empty() {
            Self::FocusChanged(None)
        } else {
            Self::FocusChanged(Some(WindowAddress::new(address)))
        }
    }
}
