use crate::config::Config;
use crate::error::Result;
use crate::events::HostEvent;
use crate::services::compositor::{DryRunCompositor, DEMO_WINDOWS};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{interval, Duration};
use tracing::info;

use super::r#trait::EventSourceTrait;

pub struct DryRunEventSource {
    events: UnboundedSender<HostEvent>,
    host: Arc<DryRunCompositor>,
    period: Duration,
}

impl DryRunEventSource {
    pub fn new(config: Arc<Config>, events: UnboundedSender<HostEvent>, host: Arc<DryRunCompositor>) -> Self {
        Self {
            events,
            host,
            period: Duration::from_millis(config.dry_run.event_interval_ms),
        }
    }

    /// Сценарий: все демо-окна по очереди, reload при активном последнем окне,
    /// затем рабочий стол без фокуса
    fn script() -> Vec<HostEvent> {
        DEMO_WINDOWS
            .iter()
            .map(|(address, ..)| HostEvent::focus(*address))
            .chain([HostEvent::ConfigReloaded, HostEvent::FocusChanged(None)])
            .collect()
    }

    pub async fn run(self) -> Result<()> {
        info!("Dry-run режим - события композитора эмулируются");

        let script = Self::script();
        let mut ticker = interval(self.period);

        for event in script.iter().cycle() {
            ticker.tick().await;

            info!("Dry-run: эмулируем событие {:?}", event);
            // Композитор должен знать активное окно к моменту обработки события
            if let HostEvent::FocusChanged(address) = event {
                self.host.set_active(address.clone());
            }
            if self.events.send(event.clone()).is_err() {
                break;
            }
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl EventSourceTrait for DryRunEventSource {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run().await
    }
}
