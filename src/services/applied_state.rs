use crate::events::{DisplayMode, MonitorHandle, MonitorId, Resolution};

/// Исходный режим монитора, снятый в начале эпизода переопределения разрешения
#[derive(Debug, Clone, PartialEq)]
pub struct SavedMode {
    pub monitor: MonitorHandle,
    pub mode: DisplayMode,
}

/// Желаемое состояние, вычисляемое заново на каждое событие
#[derive(Debug, Clone, PartialEq)]
pub struct DesiredState {
    pub monitor: Option<MonitorHandle>,
    pub saturation: f32,
    pub resolution: Option<Resolution>,
}

impl DesiredState {
    pub fn idle() -> Self {
        Self {
            monitor: None,
            saturation: 0.0,
            resolution: None,
        }
    }
}

/// Что демон сейчас применил и как это откатить.
///
/// Снимок режима хранится не более чем для одного монитора: он
/// сохраняется один раз за эпизод и снимается ровно один раз при откате.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppliedState {
    monitor: Option<MonitorHandle>,
    saturation: f32,
    resolution: Option<Resolution>,
    saved_mode: Option<SavedMode>,
    broadcast: bool,
}

impl AppliedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn monitor(&self) -> Option<&MonitorHandle> {
        self.monitor.as_ref()
    }

    pub fn monitor_id(&self) -> Option<MonitorId> {
        self.monitor.as_ref().map(|m| m.id)
    }

    pub fn saturation(&self) -> f32 {
        self.saturation
    }

    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    /// Было ли активно переопределение разрешения
    pub fn resolution_active(&self) -> bool {
        self.resolution.is_some_and(|r| r.is_valid())
    }

    pub fn saved_mode(&self) -> Option<&SavedMode> {
        self.saved_mode.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.monitor.is_none() && self.saved_mode.is_none()
    }

    /// Отличается ли желаемое состояние от применённого
    pub fn differs_from(&self, desired: &DesiredState) -> bool {
        self.monitor_id() != desired.monitor.as_ref().map(|m| m.id)
            || self.saturation != desired.saturation
            || self.resolution != desired.resolution
    }

    /// Сохранить исходный режим, если эпизод ещё не начат. Возвращает `true`, если снимок сделан.
    pub fn save_mode_once(&mut self, monitor: MonitorHandle, mode: DisplayMode) -> bool {
        if self.saved_mode.is_some() {
            return false;
        }
        self.saved_mode = Some(SavedMode { monitor, mode });
        true
    }

    /// Забрать снимок, только если он относится к указанному монитору
    pub fn take_saved_mode_for(&mut self, id: MonitorId) -> Option<SavedMode> {
        if self.saved_mode.as_ref().map(|s| s.monitor.id) == Some(id) {
            self.saved_mode.take()
        } else {
            None
        }
    }

    pub fn take_saved_mode(&mut self) -> Option<SavedMode> {
        self.saved_mode.take()
    }

    /// Отслеживаемый монитор исчез: откатывать больше нечего
    pub fn forget_monitor(&mut self) -> Option<SavedMode> {
        self.monitor = None;
        self.saturation = 0.0;
        self.resolution = None;
        self.saved_mode.take()
    }

    pub fn commit(&mut self, desired: DesiredState) {
        self.monitor = desired.monitor;
        self.saturation = desired.saturation;
        self.resolution = desired.resolution;
    }

    pub fn broadcast_active(&self) -> bool {
        self.broadcast
    }

    pub fn set_broadcast(&mut self, active: bool) {
        self.broadcast = active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(id: i64) -> MonitorHandle {
        MonitorHandle {
            id: MonitorId(id),
            name: format!("DP-{}", id),
        }
    }

    fn mode(width: i32, height: i32) -> DisplayMode {
        DisplayMode {
            width,
            height,
            refresh_rate: 144.0,
            x: 0,
            y: 0,
            scale: 1.0,
            transform: 0,
        }
    }

    #[test]
    fn test_snapshot_is_saved_once_per_episode() {
        let mut state = AppliedState::new();

        assert!(state.save_mode_once(handle(1), mode(2560, 1440)));
        assert!(!state.save_mode_once(handle(1), mode(1920, 1080)));

        assert_eq!(state.saved_mode().map(|s| s.mode.width), Some(2560));
    }

    #[test]
    fn test_snapshot_taken_only_for_its_monitor() {
        let mut state = AppliedState::new();
        state.save_mode_once(handle(1), mode(2560, 1440));

        assert!(state.take_saved_mode_for(MonitorId(2)).is_none());
        assert!(state.saved_mode().is_some());

        let saved = state.take_saved_mode_for(MonitorId(1)).unwrap();
        assert_eq!(saved.monitor, handle(1));
        assert!(state.saved_mode().is_none());
        assert!(state.take_saved_mode_for(MonitorId(1)).is_none());
    }

    #[test]
    fn test_differs_from() {
        let mut state = AppliedState::new();
        assert!(!state.differs_from(&DesiredState::idle()));

        let desired = DesiredState {
            monitor: Some(handle(1)),
            saturation: 0.5,
            resolution: None,
        };
        assert!(state.differs_from(&desired));

        state.commit(desired.clone());
        assert!(!state.differs_from(&desired));
        assert!(state.differs_from(&DesiredState {
            resolution: Some(Resolution::new(1920, 1080)),
            ..desired
        }));
    }

    #[test]
    fn test_forget_monitor_drops_snapshot() {
        let mut state = AppliedState::new();
        state.commit(DesiredState {
            monitor: Some(handle(1)),
            saturation: 0.5,
            resolution: Some(Resolution::new(1920, 1080)),
        });
        state.save_mode_once(handle(1), mode(2560, 1440));
        assert!(state.resolution_active());

        assert!(state.forget_monitor().is_some());
        assert!(state.is_idle());
        assert!(!state.resolution_active());
    }
}
