use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::viewport::{Spin, SpinAxis, VisualStyle};

/// A named background color offered by the display controls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct BackgroundPreset {
    /// Label shown to the user.
    pub name: String,
    /// CSS-style color string handed to the surface.
    pub color: String,
}

impl BackgroundPreset {
    fn new(name: &str, color: &str) -> Self {
        Self {
            name: name.to_owned(),
            color: color.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Display", inline)]
#[serde(default)]
/// Initial viewer state and the choices offered by the display controls.
pub struct DisplayOptions {
    /// Representation used for atoms and bonds.
    #[schemars(title = "Style")]
    pub style: VisualStyle,
    /// Background color string.
    #[schemars(title = "Background")]
    pub background: String,
    /// Whether the structure rotates continuously.
    #[schemars(title = "Spin")]
    pub spin: bool,
    /// Axis the structure spins around.
    #[schemars(skip)]
    pub spin_axis: SpinAxis,
    /// Rotation rate in radians per second.
    #[schemars(
        title = "Spin Speed",
        range(min = 0.05, max = 5.0),
        extend("step" = 0.05)
    )]
    pub spin_speed: f32,
    /// Background choices offered to the user.
    #[schemars(skip)]
    pub background_presets: Vec<BackgroundPreset>,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            style: VisualStyle::Stick,
            background: "#333".to_owned(),
            spin: true,
            spin_axis: SpinAxis::Y,
            spin_speed: 0.5,
            background_presets: vec![
                BackgroundPreset::new("Dark", "#333"),
                BackgroundPreset::new("Light", "#ccc"),
            ],
        }
    }
}

impl DisplayOptions {
    /// The fixed rotation applied whenever spin is enabled.
    #[must_use]
    pub fn spin_params(&self) -> Spin {
        Spin {
            axis: self.spin_axis,
            speed: self.spin_speed,
        }
    }
}
