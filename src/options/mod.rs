//! Runtime configuration with TOML file support.
//!
//! Options cover the PubChem endpoint and the initial display state. All
//! sections use `#[serde(default)]` so partial TOML files work. The only
//! environment override is the service base URL
//! ([`BASE_URL_ENV`]).

mod display;
mod pubchem;

use std::path::Path;

pub use display::{BackgroundPreset, DisplayOptions};
pub use pubchem::{PubChemOptions, DEFAULT_BASE_URL};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::MolviewError;

/// Environment variable that replaces [`PubChemOptions::base_url`].
pub const BASE_URL_ENV: &str = "MOLVIEW_PUBCHEM_BASE_URL";

/// Top-level options container.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Service endpoint and request parameters.
    pub pubchem: PubChemOptions,
    /// Initial viewer state and display choices.
    pub display: DisplayOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, MolviewError> {
        let content =
            std::fs::read_to_string(path).map_err(MolviewError::Io)?;
        let options: Self = toml::from_str(&content)
            .map_err(|e| MolviewError::OptionsParse(e.to_string()))?;
        log::info!("loaded options from {}", path.display());
        Ok(options)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), MolviewError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| MolviewError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(MolviewError::Io)?;
        }
        std::fs::write(path, content).map_err(MolviewError::Io)
    }

    /// Apply [`BASE_URL_ENV`] if it is set.
    pub fn apply_env_overrides(&mut self) {
        self.override_base_url(std::env::var(BASE_URL_ENV).ok());
    }

    fn override_base_url(&mut self, value: Option<String>) {
        if let Some(url) = value.filter(|v| !v.trim().is_empty()) {
            log::info!("PubChem base URL overridden: {url}");
            self.pubchem.base_url = url.trim().to_owned();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::{SpinAxis, VisualStyle};

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r##"
[display]
style = "sphere"
background = "#ccc"
"##;
        let opts: Options = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.display.style, VisualStyle::Sphere);
        assert_eq!(opts.display.background, "#ccc");
        // Everything else should be default
        assert!(opts.display.spin);
        assert_eq!(opts.display.spin_axis, SpinAxis::Y);
        assert_eq!(opts.pubchem.base_url, DEFAULT_BASE_URL);
        assert_eq!(opts.pubchem.timeout_secs, 30);
    }

    #[test]
    fn defaults_match_viewer_startup_state() {
        let display = DisplayOptions::default();
        assert_eq!(display.style, VisualStyle::Stick);
        assert_eq!(display.background, "#333");
        assert_eq!(display.spin_speed, 0.5);
        let names: Vec<&str> = display
            .background_presets
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, ["Dark", "Light"]);
    }

    #[test]
    fn base_url_override() {
        let mut opts = Options::default();
        opts.override_base_url(None);
        assert_eq!(opts.pubchem.base_url, DEFAULT_BASE_URL);
        opts.override_base_url(Some("   ".to_owned()));
        assert_eq!(opts.pubchem.base_url, DEFAULT_BASE_URL);
        opts.override_base_url(Some(" http://localhost:8080/pug ".to_owned()));
        assert_eq!(opts.pubchem.base_url, "http://localhost:8080/pug");
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir()
            .join(format!("molview-options-{}", std::process::id()));
        let path = dir.join("options.toml");
        let mut opts = Options::default();
        opts.display.spin = false;
        opts.save(&path).unwrap();
        let loaded = Options::load(&path).unwrap();
        assert_eq!(loaded, opts);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_reports_parse_errors() {
        let dir = std::env::temp_dir()
            .join(format!("molview-bad-options-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        std::fs::write(&path, "display = 3").unwrap();
        assert!(matches!(
            Options::load(&path),
            Err(MolviewError::OptionsParse(_))
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();
        assert!(props.contains_key("pubchem"));
        assert!(props.contains_key("display"));

        let display = &props["display"]["properties"];
        assert!(display.get("style").is_some());
        assert!(display.get("spin").is_some());
        assert!(display.get("spin_axis").is_none());
        assert!(display.get("background_presets").is_none());
        assert!(props["pubchem"]["properties"].get("user_agent").is_none());
    }
}
