use serde::{Deserialize, Serialize};
use std::fmt;

use super::monitor::MonitorId;

/// Адрес окна в Hyprland (`0x...`), используется как слабая ссылка на окно
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowAddress(String);

impl WindowAddress {
    /// Нормализует адрес: события socket2 приходят без префикса `0x`, а `j/clients` с ним
    pub fn new(address: impl AsRef<str>) -> Self {
        let raw = address.as_ref().trim();
        let hex = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .unwrap_or(raw);
        Self(format!("0x{}", hex.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Информация об окне
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowInfo {
    pub address: WindowAddress,
    pub title: String,
    pub class: String,
    /// Класс на момент создания окна; правила сопоставляются именно с ним
    pub initial_class: String,
    pub monitor: MonitorId,
}

impl WindowInfo {
    pub fn new(address: WindowAddress, initial_class: impl Into<String>, monitor: MonitorId) -> Self {
        let initial_class = initial_class.into();
        Self {
            address,
            title: String::new(),
            class: initial_class.clone(),
            initial_class,
            monitor,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }
}

impl fmt::Display for WindowInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.title.is_empty() {
            write!(f, "{} ({})", self.address, self.initial_class)
        } else {
            write!(f, "\"{}\" ({})", self.title, self.initial_class)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_info_creation() {
        let window = WindowInfo::new(WindowAddress::new("abc"), "firefox", MonitorId(1))
            .with_title("Mozilla Firefox")
            .with_class("firefox-nightly");

        assert_eq!(window.address.as_str(), "0xabc");
        assert_eq!(window.initial_class, "firefox");
        assert_eq!(window.class, "firefox-nightly");
        assert_eq!(window.monitor, MonitorId(1));
        assert_eq!(window.to_string(), "\"Mozilla Firefox\" (firefox)");
    }

    #[test]
    fn test_address_normalization() {
        assert_eq!(WindowAddress::new("0xABC"), WindowAddress::new("abc"));
        assert_eq!(WindowAddress::new(" 5586d2f4 ").as_str(), "0x5586d2f4");
    }
}
