use crate::config::Config;
use crate::error::Result;
use crate::events::HostEvent;
use crate::services::compositor::HyprSockets;
use crate::trace_if_enabled;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixStream;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};

use super::r#trait::EventSourceTrait;

/// Разобрать строку `.socket2.sock` вида `EVENT>>DATA`
pub fn parse_event_line(line: &str) -> Option<HostEvent> {
    let (name, data) = line.split_once(">>")?;
    match name {
        "activewindowv2" => {
            let address = data.trim().trim_matches(',');
            Some(HostEvent::focus(address))
        }
        "configreloaded" => Some(HostEvent::ConfigReloaded),
        _ => None,
    }
}

enum StreamEnd {
    /// Сокет закрыт композитором
    Closed,
    /// Получатель событий завершился
    ReceiverGone,
}

pub struct HyprlandEventSource {
    sockets: HyprSockets,
    events: UnboundedSender<HostEvent>,
    reconnect_delay: Duration,
}

impl HyprlandEventSource {
    pub fn new(config: Arc<Config>, events: UnboundedSender<HostEvent>) -> Result<Self> {
        let sockets = HyprSockets::discover(config.hyprland.instance_signature.as_deref())?;
        info!("Инициализация HyprlandEventSource ({:?})", sockets.event_path());

        Ok(Self {
            sockets,
            events,
            reconnect_delay: Duration::from_millis(config.hyprland.reconnect_delay_ms),
        })
    }

    pub async fn run(self) -> Result<()> {
        loop {
            match self.listen().await {
                Ok(StreamEnd::ReceiverGone) => {
                    debug!("Получатель событий закрыт, HyprlandEventSource завершается");
                    return Ok(());
                }
                Ok(StreamEnd::Closed) => {
                    warn!("Сокет событий Hyprland закрыт, переподключение через {:?}", self.reconnect_delay);
                }
                Err(e) => {
                    error!("Ошибка сокета событий Hyprland: {}. Переподключение через {:?}", e, self.reconnect_delay);
                }
            }
            sleep(self.reconnect_delay).await;
        }
    }

    async fn listen(&self) -> Result<StreamEnd> {
        let stream = UnixStream::connect(self.sockets.event_path()).await?;
        info!("Подключено к сокету событий Hyprland");

        let mut lines = BufReader::new(stream).lines();
        while let Some(line) = lines.next_line().await? {
            trace_if_enabled!("socket2: {}", line);

            if let Some(event) = parse_event_line(&line) {
                debug!("Событие композитора: {:?}", event);
                if self.events.send(event).is_err() {
                    return Ok(StreamEnd::ReceiverGone);
                }
            }
        }

        Ok(StreamEnd::Closed)
    }
}

#[async_trait::async_trait]
impl EventSourceTrait for HyprlandEventSource {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run().await
    }
}
