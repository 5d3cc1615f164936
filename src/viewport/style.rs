//! Representation styles and rotation parameters.

use std::fmt;

use glam::Vec3;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How atoms and bonds are drawn.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum VisualStyle {
    /// Bonds as cylinders.
    #[default]
    Stick,
    /// Space-filling van der Waals spheres.
    Sphere,
    /// Bonds as thin lines.
    Line,
}

impl VisualStyle {
    /// Every style, in the order offered to the user.
    pub const ALL: [Self; 3] = [Self::Stick, Self::Sphere, Self::Line];

    /// Representation key understood by the rendering engine.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Stick => "stick",
            Self::Sphere => "sphere",
            Self::Line => "line",
        }
    }

    /// Capitalised label for buttons.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Stick => "Stick",
            Self::Sphere => "Sphere",
            Self::Line => "Line",
        }
    }

    /// Style spec selecting only this representation with engine defaults.
    #[must_use]
    pub fn spec(self) -> StyleSpec {
        StyleSpec {
            representation: self,
        }
    }
}

impl fmt::Display for VisualStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Which atoms a style applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selector {
    /// Every atom in the scene (the empty selector).
    #[default]
    All,
}

impl Selector {
    /// Engine-side JSON form of the selector.
    #[must_use]
    pub fn to_json(self) -> serde_json::Value {
        match self {
            Self::All => serde_json::json!({}),
        }
    }
}

/// A style to apply: exactly one representation, default parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleSpec {
    /// The single representation drawn.
    pub representation: VisualStyle,
}

impl StyleSpec {
    /// Engine-side JSON form, e.g. `{"stick": {}}`.
    #[must_use]
    pub fn to_json(self) -> serde_json::Value {
        let mut spec = serde_json::Map::new();
        let _ = spec.insert(
            self.representation.key().to_owned(),
            serde_json::json!({}),
        );
        serde_json::Value::Object(spec)
    }
}

/// Rotation axis for the spin animation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SpinAxis {
    /// Screen-horizontal axis.
    X,
    /// Screen-vertical axis.
    #[default]
    Y,
    /// Axis pointing out of the screen.
    Z,
}

impl SpinAxis {
    /// Unit vector for this axis.
    #[must_use]
    pub fn vector(self) -> Vec3 {
        match self {
            Self::X => Vec3::X,
            Self::Y => Vec3::Y,
            Self::Z => Vec3::Z,
        }
    }
}

/// Continuous rotation: a fixed axis at a fixed rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    /// Rotation axis.
    pub axis: SpinAxis,
    /// Radians per second.
    pub speed: f32,
}

impl Default for Spin {
    fn default() -> Self {
        Self {
            axis: SpinAxis::Y,
            speed: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_names_exactly_one_representation() {
        for style in VisualStyle::ALL {
            let json = style.spec().to_json();
            let obj = json.as_object().unwrap();
            assert_eq!(obj.len(), 1);
            assert!(obj.contains_key(style.key()));
        }
        assert_eq!(
            VisualStyle::Sphere.spec().to_json().to_string(),
            r#"{"sphere":{}}"#
        );
    }

    #[test]
    fn selector_all_is_empty_object() {
        assert_eq!(Selector::All.to_json().to_string(), "{}");
    }

    #[test]
    fn style_serializes_as_key() {
        let json = serde_json::to_string(&VisualStyle::Line).unwrap();
        assert_eq!(json, "\"line\"");
    }

    #[test]
    fn default_spin_is_y_at_half_speed() {
        let spin = Spin::default();
        assert_eq!(spin.axis.vector(), Vec3::Y);
        assert_eq!(spin.speed, 0.5);
    }
}
