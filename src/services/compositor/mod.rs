//! Compositor service: responsibility and boundaries
//!
//! This module and its submodules are the ONLY code that talks to the compositor:
//! registry queries (monitors, windows, cursor) and the two side effects the
//! reconciler needs (CTM and monitor mode). They MUST NOT make decisions about
//! saturation or resolution; those belong to the Reconciler.

mod dry_run;
mod hyprland;
mod ipc;
mod r#trait;

pub use self::dry_run::{DryRunCompositor, DEMO_WINDOWS};
pub use self::ipc::HyprSockets;
pub use self::r#trait::{create_compositor, Compositor, NotifyLevel};
