use crate::config::Config;
use crate::error::{Result, VibrError};
use crate::events::{HostEvent, WindowAddress};
use crate::rules::{load_rules_file, RuleStore};
use crate::services::compositor::{Compositor, NotifyLevel};
use crate::services::reconciler::Reconciler;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Hooks the host drives the daemon through, one per event kind.
///
/// Only the event source knows how the compositor names these events;
/// everything behind this trait works with plain handles.
pub trait PluginHooks {
    fn on_focus_changed(&mut self, window: Option<WindowAddress>);
    fn on_config_reload_start(&mut self);
    fn on_config_reload_end(&mut self);
    fn on_unload(&mut self);
}

/// Единственный владелец хранилища правил и применённого состояния
pub struct Controller {
    config: Arc<Config>,
    host: Arc<dyn Compositor>,
    rules: RuleStore,
    reconciler: Reconciler,
}

impl Controller {
    pub fn new(config: Arc<Config>, host: Arc<dyn Compositor>) -> Self {
        info!("Инициализация Controller (композитор: {})", host.name());
        let reconciler = Reconciler::new(config.rules.default_refresh_rate);
        Self {
            config,
            host,
            rules: RuleStore::new(),
            reconciler,
        }
    }

    /// Проверка версии композитора, первая загрузка правил и уведомление о старте
    pub fn start(&mut self) -> Result<()> {
        match self.host.version() {
            Ok(version) if !version.is_empty() => info!("{} версии {}", self.host.name(), version),
            // Сокет ответил, но версию не разобрать: работаем дальше
            Ok(_) | Err(VibrError::Json(_)) => {
                warn!("Не удалось определить версию {}, продолжаем", self.host.name());
                self.notify(NotifyLevel::Warning, "[hyprvibr] unknown compositor version, continuing");
            }
            Err(e) => return Err(e),
        }

        self.reload_rules();
        self.notify(NotifyLevel::Info, "hyprvibr loaded");
        Ok(())
    }

    /// Полный цикл перезагрузки: очистка, чтение файла правил, переоценка
    pub fn reload_rules(&mut self) {
        self.on_config_reload_start();
        self.load_rules();
        self.on_config_reload_end();
    }

    fn load_rules(&mut self) {
        let path = &self.config.rules.path;
        match load_rules_file(path, &self.config.rules.namespace, &mut self.rules) {
            Ok(report) if report.missing => {
                self.notify(
                    NotifyLevel::Warning,
                    &format!("[hyprvibr] rules file {} not found", path.display()),
                );
            }
            Ok(report) if report.has_errors() => {
                let message = format!(
                    "[hyprvibr] {} error(s) in {}: {}",
                    report.errors.len(),
                    path.display(),
                    report.errors[0]
                );
                self.notify(NotifyLevel::Error, &message);
            }
            Ok(_) => {}
            Err(e) => {
                error!("Не удалось прочитать файл правил {:?}: {}", path, e);
                self.notify(NotifyLevel::Error, &format!("[hyprvibr] failed to read {}", path.display()));
            }
        }
    }

    pub fn dispatch(&mut self, event: HostEvent) {
        match event {
            HostEvent::FocusChanged(window) => self.on_focus_changed(window),
            HostEvent::ConfigReloaded => self.reload_rules(),
        }
    }

    /// `dispatch` из async-кода: вызовы композитора блокирующие, поток рантайма
    /// на это время передаёт свои задачи другим воркерам
    pub fn dispatch_blocking(&mut self, event: HostEvent) {
        tokio::task::block_in_place(|| self.dispatch(event));
    }

    fn notify(&self, level: NotifyLevel, message: &str) {
        if let Err(e) = self.host.notify(level, message) {
            warn!("Не удалось отправить уведомление: {}", e);
        }
    }
}

impl PluginHooks for Controller {
    fn on_focus_changed(&mut self, window: Option<WindowAddress>) {
        // Окно могло закрыться, пока событие шло по сокету
        let window = window.and_then(|address| self.host.window(&address));
        match &window {
            Some(w) => info!("Активное окно: {}", w),
            None => info!("Нет активного окна"),
        }

        let decision = self.reconciler.handle_focus(window.as_ref(), &self.rules, self.host.as_ref());
        if decision.changed && decision.next.is_idle() {
            info!("Все мониторы в исходном состоянии");
        } else if decision.changed {
            info!(
                "Состояние обновлено: монитор {:?}, насыщенность {}, разрешение {:?}",
                decision.next.monitor().map(|m| m.name.as_str()),
                decision.next.saturation(),
                decision.next.resolution()
            );
        }
    }

    fn on_config_reload_start(&mut self) {
        info!("Перезагрузка конфигурации: очищаем правила");
        self.rules.clear();
    }

    fn on_config_reload_end(&mut self) {
        self.reconciler.broadcast_global(&self.rules, self.host.as_ref());

        let window = self.host.active_window();
        self.reconciler.handle_focus(window.as_ref(), &self.rules, self.host.as_ref());
    }

    fn on_unload(&mut self) {
        info!("Выгрузка: возвращаем мониторы в исходное состояние");
        // Без правил "нет окна" ведёт в Idle даже при глобальной насыщенности
        self.rules.clear();
        self.reconciler.handle_focus(None, &self.rules, self.host.as_ref());
        self.reconciler.broadcast_global(&self.rules, self.host.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MonitorId;
    use crate::services::compositor::DryRunCompositor;
    use crate::services::ctm::{saturation_matrix, IDENTITY};
    use std::io::Write;

    fn setup(rules_text: &str) -> (Controller, Arc<DryRunCompositor>, tempfile::NamedTempFile) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", rules_text).unwrap();

        let mut config = Config::default();
        config.rules.path = file.path().to_path_buf();

        let host = Arc::new(DryRunCompositor::with_demo_setup());
        let controller = Controller::new(Arc::new(config), host.clone());
        (controller, host, file)
    }

    #[test]
    fn test_start_loads_rules_and_notifies() {
        let (mut controller, host, _file) = setup("hyprvibr-app = mpv,0.5\n");

        controller.start().unwrap();

        assert!(controller.rules.lookup("mpv").is_some());
        assert_eq!(host.notifications(), vec!["hyprvibr loaded".to_string()]);
    }

    #[test]
    fn test_focus_follows_rules() {
        let (mut controller, host, _file) = setup("hyprvibr-app = mpv,0.5\n");
        controller.start().unwrap();

        controller.dispatch(HostEvent::focus("d3"));
        assert_eq!(host.ctm_of(MonitorId(1)), Some(saturation_matrix(0.5)));

        controller.dispatch(HostEvent::focus("d1"));
        assert_eq!(host.ctm_of(MonitorId(1)), Some(IDENTITY));
        assert!(controller.reconciler.state().is_idle());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_dispatch_blocking_inside_runtime() {
        let (mut controller, host, _file) = setup("hyprvibr-app = mpv,0.5\n");
        tokio::task::block_in_place(|| controller.start()).unwrap();

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        tx.send(HostEvent::focus("d3")).unwrap();
        drop(tx);
        while let Some(event) = rx.recv().await {
            controller.dispatch_blocking(event);
        }

        assert_eq!(host.ctm_of(MonitorId(1)), Some(saturation_matrix(0.5)));
    }

    #[test]
    fn test_closed_window_is_no_window() {
        let (mut controller, host, _file) = setup("hyprvibr-app = mpv,0.5\n");
        controller.start().unwrap();
        controller.dispatch(HostEvent::focus("d3"));

        controller.dispatch(HostEvent::focus("deadbeef"));
        assert_eq!(host.ctm_of(MonitorId(1)), Some(IDENTITY));
    }

    #[test]
    fn test_reload_replaces_rules_and_broadcasts_global() {
        let (mut controller, host, file) = setup("hyprvibr-app = mpv,0.5\n");
        controller.start().unwrap();
        controller.dispatch(HostEvent::focus("d3"));

        std::fs::write(file.path(), "hyprvibr-saturation = 0.8\n").unwrap();
        host.set_active(None);
        controller.dispatch(HostEvent::ConfigReloaded);

        assert!(controller.rules.lookup("mpv").is_none());
        assert_eq!(host.ctm_of(MonitorId(0)), Some(saturation_matrix(0.8)));
        assert_eq!(host.ctm_of(MonitorId(1)), Some(saturation_matrix(0.8)));
        assert!(controller.reconciler.state().broadcast_active());
    }

    #[test]
    fn test_reload_with_focused_rule_window_repaints_after_broadcast() {
        let (mut controller, host, _file) = setup("hyprvibr-saturation = 0.8\nhyprvibr-app = mpv,0.5\n");
        host.set_active(Some(WindowAddress::new("d3")));

        controller.start().unwrap();

        assert_eq!(host.ctm_of(MonitorId(0)), Some(saturation_matrix(0.8)));
        assert_eq!(host.ctm_of(MonitorId(1)), Some(saturation_matrix(0.5)));
        assert_eq!(
            host.ctm_log(),
            vec![
                (MonitorId(0), saturation_matrix(0.8)),
                (MonitorId(1), saturation_matrix(0.8)),
                (MonitorId(1), saturation_matrix(0.5)),
            ]
        );
        assert_eq!(controller.reconciler.state().monitor_id(), Some(MonitorId(1)));
    }

    #[test]
    fn test_missing_rules_file_warns_and_runs_without_rules() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.rules.path = dir.path().join("hyprvibr.conf");
        let host = Arc::new(DryRunCompositor::with_demo_setup());
        let mut controller = Controller::new(Arc::new(config), host.clone());

        controller.start().unwrap();

        assert!(controller.rules.is_empty());
        let notes = host.notifications();
        assert_eq!(notes.len(), 2);
        assert!(notes[0].contains("not found"));
    }

    #[test]
    fn test_parse_errors_are_reported_not_fatal() {
        let (mut controller, host, _file) = setup("hyprvibr-app = broken\nhyprvibr-app = mpv,0.5\n");

        controller.start().unwrap();

        assert!(controller.rules.lookup("mpv").is_some());
        let notes = host.notifications();
        assert_eq!(notes.len(), 2);
        assert!(notes[0].contains("requires 2-5 params"));
    }

    #[test]
    fn test_unload_restores_everything() {
        let (mut controller, host, _file) =
            setup("hyprvibr-saturation = 0.7\nhyprvibr-app = cs2,1.0,1920,1080\n");
        controller.start().unwrap();
        controller.dispatch(HostEvent::focus("d4"));
        assert_eq!(host.mode_commands(), vec!["DP-1,1920x1080@60,0x0,1".to_string()]);

        controller.on_unload();

        assert_eq!(host.ctm_of(MonitorId(0)), Some(IDENTITY));
        assert_eq!(host.ctm_of(MonitorId(1)), Some(IDENTITY));
        assert_eq!(
            host.mode_commands().last().map(String::as_str),
            Some("DP-1,2560x1440@144,0x0,1")
        );
        assert!(controller.reconciler.state().is_idle());
        assert!(!controller.reconciler.state().broadcast_active());
    }
}
