use crate::debug_if_enabled;
use crate::events::{MonitorHandle, MonitorInfo, MonitorRule, WindowInfo};
use crate::rules::{AppRule, RuleStore};
use crate::services::applied_state::{AppliedState, DesiredState};
use crate::services::compositor::Compositor;
use crate::services::ctm::Ctm;
use smallvec::SmallVec;
use std::fmt;
use tracing::{info, warn};

/// Побочный эффект, который реконсилер просит выполнить композитор
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetCtm { monitor: MonitorHandle, ctm: Ctm },
    ChangeMode(MonitorRule),
    RestoreMode(MonitorRule),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::SetCtm { monitor, ctm } => write!(f, "CTM {} -> {}", monitor, ctm),
            Action::ChangeMode(rule) => write!(f, "смена режима {}", rule),
            Action::RestoreMode(rule) => write!(f, "восстановление режима {}", rule),
        }
    }
}

pub type Actions = SmallVec<[Action; 4]>;

/// Результат решения: упорядоченные действия и состояние после их выполнения
#[derive(Debug, Clone)]
pub struct Decision {
    pub actions: Actions,
    pub changed: bool,
    pub next: AppliedState,
}

/// Сводит желаемое состояние (окно + правила) с применённым и выдаёт минимальный набор действий.
pub struct Reconciler {
    state: AppliedState,
    default_refresh_rate: f32,
}

impl Reconciler {
    pub fn new(default_refresh_rate: f32) -> Self {
        Self {
            state: AppliedState::new(),
            default_refresh_rate,
        }
    }

    pub fn state(&self) -> &AppliedState {
        &self.state
    }

    /// Обработать смену фокуса: решить, выполнить, зафиксировать
    pub fn handle_focus(&mut self, window: Option<&WindowInfo>, rules: &RuleStore, host: &dyn Compositor) -> Decision {
        let decision = self.decide(window, rules, host);
        execute(&decision.actions, host);
        self.state = decision.next.clone();
        decision
    }

    /// Вычислить действия, не трогая композитор (только чтение реестра)
    pub fn decide(&self, window: Option<&WindowInfo>, rules: &RuleStore, host: &dyn Compositor) -> Decision {
        let mut next = self.state.clone();
        let mut actions = Actions::new();

        // Слабая ссылка: отслеживаемый монитор мог исчезнуть
        let prev_monitor = match self.state.monitor() {
            Some(handle) => {
                let live = host.monitor(handle.id);
                if live.is_none() {
                    debug_if_enabled!("Отслеживаемый монитор {} исчез, забываем его", handle);
                    next.forget_monitor();
                }
                live
            }
            None => None,
        };

        let rule = window.and_then(|w| rules.lookup(&w.initial_class));
        let (target, desired) = self.desired_state(window, rule, rules, prev_monitor.as_ref(), host);

        let changed = next.differs_from(&desired);

        // Перекраска при каждом событии: CTM мог быть сброшен композитором
        if let Some(monitor) = &target {
            actions.push(Action::SetCtm {
                monitor: monitor.handle(),
                ctm: Ctm::for_saturation(desired.saturation),
            });
        }

        if changed {
            let target_id = target.as_ref().map(|m| m.id);

            if let Some(prev) = prev_monitor.as_ref().filter(|p| Some(p.id) != target_id) {
                actions.push(Action::SetCtm {
                    monitor: prev.handle(),
                    ctm: Ctm::Identity,
                });
                if let Some(saved) = next.take_saved_mode_for(prev.id) {
                    actions.push(Action::RestoreMode(MonitorRule::restore(&saved.monitor, saved.mode)));
                }
            }

            let resolution = rule.and_then(AppRule::resolution_override);
            match (&target, resolution) {
                (Some(monitor), Some(resolution)) => {
                    next.save_mode_once(monitor.handle(), monitor.mode);
                    if monitor.mode.resolution() != resolution {
                        let rate = rule
                            .and_then(|r| r.refresh_rate)
                            .unwrap_or(self.default_refresh_rate);
                        actions.push(Action::ChangeMode(MonitorRule::override_for(monitor, resolution, rate)));
                    }
                }
                _ => {
                    if self.state.resolution_active() {
                        if let Some(saved) = next.take_saved_mode() {
                            actions.push(Action::RestoreMode(MonitorRule::restore(&saved.monitor, saved.mode)));
                        }
                    }
                }
            }

            next.commit(desired);
        }

        Decision { actions, changed, next }
    }

    fn desired_state(
        &self,
        window: Option<&WindowInfo>,
        rule: Option<&AppRule>,
        rules: &RuleStore,
        prev_monitor: Option<&MonitorInfo>,
        host: &dyn Compositor,
    ) -> (Option<MonitorInfo>, DesiredState) {
        let global = rules.global_saturation();

        let (target, saturation, resolution) = match (window, rule) {
            (None, _) if rules.global_enabled() => {
                (fallback_monitor(prev_monitor, host), global, None)
            }
            (None, _) => (None, 0.0, None),
            (Some(window), None) if rules.global_enabled() => (host.monitor(window.monitor), global, None),
            (Some(_), None) => (None, 0.0, None),
            (Some(window), Some(rule)) => {
                (host.monitor(window.monitor), rule.saturation, rule.resolution)
            }
        };

        match target {
            Some(monitor) => {
                let desired = DesiredState {
                    monitor: Some(monitor.handle()),
                    saturation,
                    resolution,
                };
                (Some(monitor), desired)
            }
            // Окно без живого монитора - то же самое, что отсутствие цели
            None => (None, DesiredState::idle()),
        }
    }

    /// Рассылка глобальной насыщенности на все известные мониторы после перезагрузки.
    /// Если глобальная насыщенность выключена, снимаем прошлую рассылку.
    pub fn broadcast_global(&mut self, rules: &RuleStore, host: &dyn Compositor) -> Actions {
        let mut actions = Actions::new();

        let ctm = if rules.global_enabled() {
            Ctm::Saturation(rules.global_saturation())
        } else if self.state.broadcast_active() {
            Ctm::Identity
        } else {
            return actions;
        };

        match host.monitors() {
            Ok(monitors) => {
                for monitor in monitors {
                    actions.push(Action::SetCtm {
                        monitor: monitor.handle(),
                        ctm,
                    });
                }
            }
            Err(e) => warn!("Не удалось получить список мониторов для рассылки: {}", e),
        }

        info!("Рассылка насыщенности ({}) на {} мониторов", ctm, actions.len());
        execute(&actions, host);
        self.state.set_broadcast(!ctm.is_identity());
        actions
    }
}

/// Отслеживаемый монитор, затем монитор под курсором, затем любой:
/// сфокусированный, иначе с наименьшим id
fn fallback_monitor(prev_monitor: Option<&MonitorInfo>, host: &dyn Compositor) -> Option<MonitorInfo> {
    prev_monitor
        .cloned()
        .or_else(|| host.monitor_under_cursor())
        .or_else(|| {
            host.monitors()
                .ok()?
                .into_iter()
                .min_by_key(|m| (!m.focused, m.id))
        })
}

/// Выполнить действия по порядку. Ошибки композитора только логируются.
pub fn execute(actions: &[Action], host: &dyn Compositor) {
    for action in actions {
        debug_if_enabled!("Выполняем: {}", action);
        let result = match action {
            Action::SetCtm { monitor, ctm } => host.set_ctm(monitor, &ctm.matrix()),
            Action::ChangeMode(rule) | Action::RestoreMode(rule) => host.apply_monitor_rule(rule),
        };
        match result {
            Ok(()) => {
                if !matches!(action, Action::SetCtm { .. }) {
                    info!("Выполнено: {}", action);
                }
            }
            Err(e) => warn!("Не удалось выполнить '{}': {}", action, e),
        }
    }
}
