pub mod applied_state;
pub mod compositor;
pub mod controller;
pub mod ctm;
pub mod event_source;
pub mod reconciler;

pub use compositor::create_compositor;
pub use controller::{Controller, PluginHooks};
pub use event_source::create_event_source;
