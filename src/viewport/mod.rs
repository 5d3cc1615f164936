//! Rendering-surface ownership and synchronization.
//!
//! [`ViewportController`] is the only owner of the surface handle. Other
//! components never touch the surface; they issue [`ViewportCommand`]s or
//! call the controller's intent-level methods.

pub mod command;
pub mod controller;
pub mod scene;
pub mod style;
pub mod surface;

pub use command::ViewportCommand;
pub use controller::{LoadStatus, RenderError, ViewerState, ViewportController};
pub use scene::SceneSurface;
pub use style::{Selector, Spin, SpinAxis, StyleSpec, VisualStyle};
pub use surface::{RenderSurface, SurfaceConfig, SurfaceError};
