use serde::{Deserialize, Serialize};
use std::fmt;

/// Идентификатор монитора в композиторе
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonitorId(pub i64);

impl fmt::Display for MonitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Разрешение, запрошенное правилом. Значения не проверяются при разборе,
/// применяется только строго положительная пара.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: i32,
    pub height: i32,
}

impl Resolution {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Режим вывода монитора: разрешение, частота, смещение и масштаб
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayMode {
    pub width: i32,
    pub height: i32,
    pub refresh_rate: f32,
    pub x: i32,
    pub y: i32,
    pub scale: f32,
    /// Поворот/отражение вывода в нумерации `wl_output` (0-7)
    #[serde(default)]
    pub transform: u8,
}

impl DisplayMode {
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    /// Нечётные значения transform поворачивают вывод на 90 или 270 градусов
    pub fn is_rotated(&self) -> bool {
        self.transform % 2 == 1
    }

    /// Точка в логических координатах лежит внутри монитора
    pub fn contains(&self, px: f64, py: f64) -> bool {
        let scale = if self.scale > 0.0 { f64::from(self.scale) } else { 1.0 };
        let (x, y) = (f64::from(self.x), f64::from(self.y));
        let (width, height) = if self.is_rotated() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        };
        let w = f64::from(width) / scale;
        let h = f64::from(height) / scale;
        px >= x && px < x + w && py >= y && py < y + h
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorInfo {
    pub id: MonitorId,
    pub name: String,
    pub mode: DisplayMode,
    #[serde(default)]
    pub focused: bool,
}

impl MonitorInfo {
    pub fn handle(&self) -> MonitorHandle {
        MonitorHandle {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

impl fmt::Display for MonitorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Невладеющая ссылка на монитор: перед каждым использованием
/// разрешается заново через композитор.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonitorHandle {
    pub id: MonitorId,
    pub name: String,
}

impl fmt::Display for MonitorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Команда смены режима монитора в формате `keyword monitor`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorRule {
    pub monitor: String,
    pub mode: DisplayMode,
}

impl MonitorRule {
    /// Новое разрешение с сохранением позиции и масштаба монитора
    pub fn override_for(monitor: &MonitorInfo, resolution: Resolution, refresh_rate: f32) -> Self {
        Self {
            monitor: monitor.name.clone(),
            mode: DisplayMode {
                width: resolution.width,
                height: resolution.height,
                refresh_rate,
                ..monitor.mode
            },
        }
    }

    pub fn restore(monitor: &MonitorHandle, mode: DisplayMode) -> Self {
        Self {
            monitor: monitor.name.clone(),
            mode,
        }
    }
}

impl fmt::Display for MonitorRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{}x{}@{},{}x{},{}",
            self.monitor,
            self.mode.width,
            self.mode.height,
            self.mode.refresh_rate,
            self.mode.x,
            self.mode.y,
            self.mode.scale
        )?;
        // Без явного transform Hyprland сбросит поворот
        if self.mode.transform != 0 {
            write!(f, ",transform,{}", self.mode.transform)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> MonitorInfo {
        MonitorInfo {
            id: MonitorId(0),
            name: "DP-1".to_string(),
            mode: DisplayMode {
                width: 2560,
                height: 1440,
                refresh_rate: 144.0,
                x: 1920,
                y: 0,
                scale: 1.25,
                transform: 0,
            },
            focused: true,
        }
    }

    #[test]
    fn test_override_keeps_position_and_scale() {
        let rule = MonitorRule::override_for(&monitor(), Resolution::new(1920, 1080), 60.0);
        assert_eq!(rule.to_string(), "DP-1,1920x1080@60,1920x0,1.25");
    }

    #[test]
    fn test_restore_command_uses_saved_mode() {
        let m = monitor();
        let rule = MonitorRule::restore(&m.handle(), m.mode);
        assert_eq!(rule.to_string(), "DP-1,2560x1440@144,1920x0,1.25");
    }

    #[test]
    fn test_rotated_output_swaps_logical_size() {
        let mut m = monitor();
        m.mode.scale = 1.0;
        m.mode.transform = 1;

        assert!(m.mode.is_rotated());
        assert!(m.mode.contains(1920.0 + 1000.0, 2000.0));
        assert!(!m.mode.contains(1920.0 + 2000.0, 100.0));

        m.mode.transform = 2;
        assert!(!m.mode.is_rotated());
        assert!(m.mode.contains(1920.0 + 2000.0, 100.0));
    }

    #[test]
    fn test_rule_keeps_rotation() {
        let mut m = monitor();
        m.mode.transform = 3;
        let rule = MonitorRule::override_for(&m, Resolution::new(1920, 1080), 60.0);
        assert_eq!(rule.to_string(), "DP-1,1920x1080@60,1920x0,1.25,transform,3");
    }

    #[test]
    fn test_resolution_validity() {
        assert!(Resolution::new(1920, 1080).is_valid());
        assert!(!Resolution::new(0, 1080).is_valid());
        assert!(!Resolution::new(1920, -1).is_valid());
    }

    #[test]
    fn test_contains_uses_logical_size() {
        let m = monitor();
        // 2560 / 1.25 = 2048 логических пикселей
        assert!(m.mode.contains(1920.0, 10.0));
        assert!(m.mode.contains(1920.0 + 2047.0, 1151.0));
        assert!(!m.mode.contains(1920.0 + 2048.0, 10.0));
        assert!(!m.mode.contains(100.0, 10.0));
    }
}
