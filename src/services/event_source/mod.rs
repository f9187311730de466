//! Event sources: responsibility and boundaries
//!
//! This module and its submodules are the only code that knows the compositor's
//! event names. They translate raw events into `HostEvent`s and push them, in
//! delivery order, into the controller's channel. No state decisions live here.

mod dry_run;
mod hyprland;
mod r#trait;

pub use self::r#trait::create_event_source;
