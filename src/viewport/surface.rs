//! Contract of the rendering engine the controller drives.
//!
//! The engine itself is an external collaborator: anything that can clear,
//! load a structure, apply a style, set a background, spin, frame the view
//! and draw can sit behind [`RenderSurface`]. [`super::scene::SceneSurface`]
//! is the in-crate headless implementation.

use std::fmt;
use std::time::Duration;

use super::style::{Selector, Spin, StyleSpec};

/// Parameters passed to the surface factory when it is first created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceConfig {
    /// Initial background color string.
    pub background: String,
}

/// The surface refused a structure (malformed or unsupported encoding).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceError(pub String);

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for SurfaceError {}

/// Mutable handle to one rendering surface.
///
/// All methods are called from a single thread, never concurrently.
pub trait RenderSurface {
    /// Remove every loaded model.
    fn clear(&mut self);

    /// Add a model from structure text in the given format (e.g. `"sdf"`).
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if the text cannot be understood. The
    /// surface holds no model from this call afterwards.
    fn load(&mut self, text: &str, format: &str) -> Result<(), SurfaceError>;

    /// Replace the style of the selected atoms.
    fn set_style(&mut self, selector: Selector, style: StyleSpec);

    /// Change the background color.
    fn set_background(&mut self, color: &str);

    /// Start (`Some`) or stop (`None`) continuous rotation.
    fn spin(&mut self, spin: Option<Spin>);

    /// Move the camera so the loaded models fill the view.
    fn fit_view(&mut self);

    /// Draw a frame.
    fn render(&mut self);

    /// Advance time-based animation (spin). Engines that animate on their
    /// own clock can ignore this.
    fn advance(&mut self, _dt: Duration) {}
}
