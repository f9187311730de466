use crate::config::Config;
use crate::error::Result;
use crate::events::HostEvent;
use crate::services::compositor::DryRunCompositor;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Trait for event sources that can run in different modes
#[async_trait::async_trait]
pub trait EventSourceTrait {
    /// Run the event source until the receiving side is dropped
    async fn run(self: Box<Self>) -> Result<()>;
}

/// Factory function: scripted events over the demo compositor in dry-run mode,
/// the Hyprland event socket otherwise
pub fn create_event_source(
    config: Arc<Config>,
    events: UnboundedSender<HostEvent>,
    demo: Option<Arc<DryRunCompositor>>,
) -> Result<Box<dyn EventSourceTrait + Send>> {
    match demo {
        Some(host) => Ok(Box::new(super::dry_run::DryRunEventSource::new(config, events, host))),
        None => Ok(Box::new(super::hyprland::HyprlandEventSource::new(config, events)?)),
    }
}
