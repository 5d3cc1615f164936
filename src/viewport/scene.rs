//! Headless scene that implements [`RenderSurface`].
//!
//! Holds parsed molecules, the active style, a clear color and an orbit
//! camera. `render` records a [`Frame`] snapshot instead of drawing, which
//! is enough for a host that rasterizes elsewhere and for tests.

use std::time::Duration;

use glam::{Quat, Vec3};

use super::style::{Selector, Spin, StyleSpec};
use super::surface::{RenderSurface, SurfaceConfig, SurfaceError};
use crate::color::parse_color;
use crate::structure::Molecule;

/// Used when a background string does not parse.
const FALLBACK_CLEAR: [f32; 4] = [0.2, 0.2, 0.2, 1.0];

/// Camera orbiting a focus point.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    orientation: Quat,
    distance: f32,
    focus: Vec3,
    fovy: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            orientation: Quat::IDENTITY,
            distance: 20.0,
            focus: Vec3::ZERO,
            fovy: 45.0,
        }
    }
}

impl OrbitCamera {
    /// Eye position.
    #[must_use]
    pub fn eye(&self) -> Vec3 {
        self.focus + (self.orientation * Vec3::Z) * self.distance
    }

    /// Point the camera looks at.
    #[must_use]
    pub fn focus(&self) -> Vec3 {
        self.focus
    }

    /// Distance from eye to focus.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Vertical field of view in degrees.
    #[must_use]
    pub fn fovy(&self) -> f32 {
        self.fovy
    }

    /// Center on the centroid of `positions` and back off until their
    /// bounding sphere fits the field of view.
    pub fn fit_to_positions(&mut self, positions: &[Vec3]) {
        if positions.is_empty() {
            return;
        }

        let centroid: Vec3 =
            positions.iter().copied().sum::<Vec3>() / positions.len() as f32;
        let radius = positions
            .iter()
            .map(|p| (*p - centroid).length())
            .fold(0.0f32, f32::max)
            // A single atom still needs some room.
            .max(1.0);

        self.focus = centroid;
        let half_fov = self.fovy.to_radians() / 2.0;
        self.distance = radius / half_fov.tan() * 1.5;
    }

    /// Rotate about a world axis through the focus point.
    pub fn orbit(&mut self, axis: Vec3, angle: f32) {
        self.orientation =
            (Quat::from_axis_angle(axis, angle) * self.orientation).normalize();
    }
}

/// What the last `render` call would have drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Atoms across all models.
    pub atoms: usize,
    /// Bonds across all models.
    pub bonds: usize,
    /// Active representation, if one was set.
    pub style: Option<StyleSpec>,
    /// Clear color.
    pub clear_color: [f32; 4],
    /// Camera eye at draw time.
    pub eye: Vec3,
}

/// In-memory [`RenderSurface`].
#[derive(Debug, Clone)]
pub struct SceneSurface {
    models: Vec<Molecule>,
    style: Option<StyleSpec>,
    background: String,
    clear_color: [f32; 4],
    spin: Option<Spin>,
    camera: OrbitCamera,
    frames: u64,
    last_frame: Option<Frame>,
}

impl SceneSurface {
    /// Create a scene; usable directly as a mount factory.
    #[must_use]
    pub fn new(config: &SurfaceConfig) -> Self {
        let mut scene = Self {
            models: Vec::new(),
            style: None,
            background: String::new(),
            clear_color: FALLBACK_CLEAR,
            spin: None,
            camera: OrbitCamera::default(),
            frames: 0,
            last_frame: None,
        };
        scene.apply_background(&config.background);
        scene
    }

    /// Loaded models.
    #[must_use]
    pub fn models(&self) -> &[Molecule] {
        &self.models
    }

    /// Style applied to all atoms.
    #[must_use]
    pub fn style(&self) -> Option<StyleSpec> {
        self.style
    }

    /// Background color as given.
    #[must_use]
    pub fn background(&self) -> &str {
        &self.background
    }

    /// Parsed background.
    #[must_use]
    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    /// Active rotation, if any.
    #[must_use]
    pub fn spin_state(&self) -> Option<Spin> {
        self.spin
    }

    /// Orbit camera.
    #[must_use]
    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    /// Number of frames rendered.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Snapshot from the most recent render.
    #[must_use]
    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    fn apply_background(&mut self, color: &str) {
        color.clone_into(&mut self.background);
        self.clear_color = match parse_color(color) {
            Ok(rgba) => rgba,
            Err(e) => {
                log::warn!("{e}, using fallback background");
                FALLBACK_CLEAR
            }
        };
    }
}

impl RenderSurface for SceneSurface {
    fn clear(&mut self) {
        self.models.clear();
    }

    fn load(&mut self, text: &str, format: &str) -> Result<(), SurfaceError> {
        if !matches!(format, "sdf" | "mol") {
            return Err(SurfaceError(format!(
                "unsupported structure format: {format}"
            )));
        }
        let molecule = Molecule::from_sdf(text)
            .map_err(|e| SurfaceError(format!("malformed structure: {e}")))?;
        log::debug!(
            "scene: loaded {} ({} atoms, {} bonds)",
            molecule.formula(),
            molecule.atoms.len(),
            molecule.bonds.len()
        );
        self.models.push(molecule);
        Ok(())
    }

    fn set_style(&mut self, selector: Selector, style: StyleSpec) {
        match selector {
            Selector::All => self.style = Some(style),
        }
    }

    fn set_background(&mut self, color: &str) {
        self.apply_background(color);
    }

    fn spin(&mut self, spin: Option<Spin>) {
        self.spin = spin;
    }

    fn fit_view(&mut self) {
        let positions: Vec<Vec3> =
            self.models.iter().flat_map(Molecule::positions).collect();
        self.camera.fit_to_positions(&positions);
    }

    fn render(&mut self) {
        self.frames += 1;
        self.last_frame = Some(Frame {
            atoms: self.models.iter().map(|m| m.atoms.len()).sum(),
            bonds: self.models.iter().map(|m| m.bonds.len()).sum(),
            style: self.style,
            clear_color: self.clear_color,
            eye: self.camera.eye(),
        });
    }

    fn advance(&mut self, dt: Duration) {
        if let Some(spin) = self.spin {
            self.camera
                .orbit(spin.axis.vector(), spin.speed * dt.as_secs_f32());
        }
    }
}
