//! Scene settings: JSON file, then command-line overrides.
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use vizkit_core::VizError;

/// The three visualization programs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneKind {
    /// One mesh, four shading modes in a 2x2 grid
    Shading,
    /// Clip / cut of a mesh at its center plane
    Clip,
    /// Volume rendering and isosurface of a DICOM series
    Volume,
}

impl SceneKind {
    pub fn default_window_size(self) -> [u32; 2] {
        match self {
            SceneKind::Shading => [700, 700],
            SceneKind::Clip => [1000, 650],
            SceneKind::Volume => [1500, 500],
        }
    }

    pub fn default_export(self) -> Option<PathBuf> {
        match self {
            SceneKind::Shading => Some(PathBuf::from("GraphicMM1.jpg")),
            SceneKind::Clip | SceneKind::Volume => None,
        }
    }

    pub fn window_title(self) -> &'static str {
        match self {
            SceneKind::Shading => "GraphicMM1",
            SceneKind::Clip => "Clip",
            SceneKind::Volume => "Volume",
        }
    }
}

impl FromStr for SceneKind {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shading" => Ok(SceneKind::Shading),
            "clip" => Ok(SceneKind::Clip),
            "volume" => Ok(SceneKind::Volume),
            other => Err(VizError::configuration(format!(
                "unknown scene '{}', expected shading, clip or volume",
                other
            ))),
        }
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SceneKind::Shading => "shading",
            SceneKind::Clip => "clip",
            SceneKind::Volume => "volume",
        };
        f.write_str(name)
    }
}

/// Settings shared by every scene.
///
/// Fields left out of a config file keep their defaults; window size and
/// export path fall back to per-scene values when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub window_size: Option<[u32; 2]>,
    pub export: Option<PathBuf>,
    /// Capture RGBA instead of RGB when exporting
    pub rgba: bool,
    pub iso_value: f32,
    pub camera_position: [f32; 3],
    pub focal_point: [f32; 3],
    pub interactive: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            window_size: None,
            export: None,
            rgba: false,
            iso_value: 100.0,
            camera_position: [350.0, 400.0, 850.0],
            focal_point: [0.0, 0.0, 0.0],
            interactive: true,
        }
    }
}

impl SceneConfig {
    /// Read a JSON config file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn window_size(&self, kind: SceneKind) -> [u32; 2] {
        self.window_size.unwrap_or_else(|| kind.default_window_size())
    }

    pub fn export_path(&self, kind: SceneKind) -> Option<PathBuf> {
        self.export.clone().or_else(|| kind.default_export())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_scene_constants() {
        let config = SceneConfig::default();
        assert_eq!(config.window_size(SceneKind::Shading), [700, 700]);
        assert_eq!(config.window_size(SceneKind::Clip), [1000, 650]);
        assert_eq!(config.window_size(SceneKind::Volume), [1500, 500]);
        assert_eq!(
            config.export_path(SceneKind::Shading),
            Some(PathBuf::from("GraphicMM1.jpg"))
        );
        assert_eq!(config.export_path(SceneKind::Clip), None);
        assert_eq!(config.iso_value, 100.0);
        assert!(!config.rgba);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = SceneConfig::from_json(r#"{ "iso_value": 250.5, "window_size": [320, 200] }"#)
            .unwrap();
        assert_eq!(config.iso_value, 250.5);
        assert_eq!(config.window_size(SceneKind::Volume), [320, 200]);
        assert_eq!(config.camera_position, [350.0, 400.0, 850.0]);
        assert!(config.interactive);
    }

    #[test]
    fn load_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = SceneConfig::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid config"));
    }

    #[test]
    fn scene_names_parse() {
        assert_eq!("clip".parse::<SceneKind>().unwrap(), SceneKind::Clip);
        assert!(matches!(
            "owl".parse::<SceneKind>(),
            Err(VizError::Configuration { .. })
        ));
        assert_eq!(SceneKind::Volume.to_string(), "volume");
    }
}
