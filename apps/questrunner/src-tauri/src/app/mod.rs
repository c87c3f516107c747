//! Application setup and lifecycle management
//!
//! The context is usable on its own; the desktop shell only adds the Tauri
//! builder, plugins, and window handling around it.

#[cfg(feature = "desktop")]
pub mod lifecycle;
#[cfg(feature = "desktop")]
pub mod plugins;
pub mod state;

#[cfg(feature = "desktop")]
pub use lifecycle::*;
#[cfg(feature = "desktop")]
pub use plugins::*;
pub use state::*;
