//! Viewer settings
//!
//! Persistent preferences stored as XML in the user's config directory, plus
//! command-line overrides.

use quick_xml::de::from_str;
use quick_xml::se::to_string;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::player::{Format, Layout};

const MIN_WINDOW_SIZE: u32 = 320;
const MAX_WINDOW_SIZE: u32 = 16384;

/// Persistent viewer preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "VrViewerSettings", default)]
pub struct ViewerSettings {
    /// Stereo layout of the source video
    #[serde(rename = "layout")]
    pub layout: Layout,

    /// Projection format of the source video
    #[serde(rename = "format")]
    pub format: Format,

    /// Flat look-around view instead of the side-by-side stereo preview
    #[serde(rename = "debug")]
    pub debug: bool,

    #[serde(rename = "windowWidth")]
    pub window_width: u32,

    #[serde(rename = "windowHeight")]
    pub window_height: u32,

    /// Vertical field of view of the flat camera (30-120)
    #[serde(rename = "fieldOfViewDegrees")]
    pub field_of_view_degrees: f32,

    /// Distance of the screen quad from the viewer, in metres
    #[serde(rename = "screenDistance")]
    pub screen_distance: f32,

    /// Media opened in the previous session
    #[serde(rename = "lastOpenedFile", skip_serializing_if = "Option::is_none")]
    pub last_opened_file: Option<String>,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            layout: Layout::Mono,
            format: Format::Screen,
            debug: true,
            window_width: 1920,
            window_height: 1080,
            field_of_view_degrees: 90.0,
            screen_distance: 2.0,
            last_opened_file: None,
        }
    }
}

impl ViewerSettings {
    /// Clamp numeric values to usable ranges
    pub fn clamp(&mut self) {
        self.window_width = self.window_width.clamp(MIN_WINDOW_SIZE, MAX_WINDOW_SIZE);
        self.window_height = self.window_height.clamp(MIN_WINDOW_SIZE, MAX_WINDOW_SIZE);

        if !self.field_of_view_degrees.is_finite() {
            self.field_of_view_degrees = 90.0;
        }
        self.field_of_view_degrees = self.field_of_view_degrees.clamp(30.0, 120.0);

        if !self.screen_distance.is_finite() || self.screen_distance <= 0.0 {
            self.screen_distance = 2.0;
        }
        self.screen_distance = self.screen_distance.clamp(0.1, 50.0);
    }

    /// Load settings from an XML file
    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(SettingsError::Io)?;
        let mut settings: Self = from_str(&contents).map_err(SettingsError::XmlParse)?;
        settings.clamp();
        Ok(settings)
    }

    /// Save settings to an XML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), SettingsError> {
        let xml = to_string(self).map_err(SettingsError::XmlWrite)?;
        let formatted = format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", xml);
        fs::write(path, formatted).map_err(SettingsError::Io)?;
        Ok(())
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("VrViewer");
            p.push("settings.xml");
            p
        })
    }

    /// Load settings from the config directory
    ///
    /// A missing or unreadable file yields the defaults.
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match Self::load_from_file(&path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring settings at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings to the config directory
    pub fn save(&self) -> Result<(), SettingsError> {
        let Some(path) = Self::settings_path() else {
            return Err(SettingsError::NoConfigDir);
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(SettingsError::Io)?;
        }

        self.save_to_file(&path)
    }

    /// Record the media being played so the next session reopens it
    pub fn remember_media(&mut self, path: &Path) {
        self.last_opened_file = Some(path.display().to_string());
    }

    /// Apply command-line overrides
    pub fn apply_cli(&mut self, args: &CliArgs) {
        if let Some(layout) = args.layout {
            self.layout = layout;
        }
        if let Some(format) = args.format {
            self.format = format;
        }
        if args.stereo {
            self.debug = false;
        }
        if let Some(media) = &args.media {
            self.remember_media(media);
        }
    }
}

/// Command-line arguments: `vr-viewer [MEDIA] [--layout L] [--format F] [--stereo]`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    pub media: Option<PathBuf>,
    pub layout: Option<Layout>,
    pub format: Option<Format>,
    pub stereo: bool,
}

impl CliArgs {
    /// Parse arguments, excluding the program name
    ///
    /// Unknown flags and flags missing their value are logged and skipped.
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parsed = Self::default();
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--layout" | "-l" => match args.next() {
                    Some(value) => parsed.layout = Some(Layout::from_name(&value)),
                    None => tracing::warn!("--layout needs a value"),
                },
                "--format" | "-f" => match args.next() {
                    Some(value) => parsed.format = Some(Format::from_name(&value)),
                    None => tracing::warn!("--format needs a value"),
                },
                "--stereo" => parsed.stereo = true,
                flag if flag.starts_with('-') => {
                    tracing::warn!("Ignoring unknown argument '{}'", flag);
                }
                _ => parsed.media = Some(PathBuf::from(arg)),
            }
        }

        parsed
    }
}

/// Settings error type
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    XmlParse(quick_xml::DeError),
    XmlWrite(quick_xml::SeError),
    NoConfigDir,
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "IO error: {}", e),
            SettingsError::XmlParse(e) => write!(f, "XML parse error: {}", e),
            SettingsError::XmlWrite(e) => write!(f, "XML write error: {}", e),
            SettingsError::NoConfigDir => write!(f, "Could not find config directory"),
        }
    }
}

impl std::error::Error for SettingsError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vr_viewer_{}_{}.xml", name, std::process::id()))
    }

    #[test]
    fn test_defaults() {
        let settings = ViewerSettings::default();
        assert_eq!(settings.layout, Layout::Mono);
        assert_eq!(settings.format, Format::Screen);
        assert!(settings.debug);
        assert_eq!(settings.field_of_view_degrees, 90.0);
    }

    #[test]
    fn test_save_and_load_file() {
        let path = temp_path("roundtrip");
        let settings = ViewerSettings {
            layout: Layout::StereoTopBottom,
            format: Format::Fov360,
            debug: false,
            last_opened_file: Some("/videos/beach.png".to_string()),
            ..ViewerSettings::default()
        };

        settings.save_to_file(&path).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("<?xml"));

        let loaded = ViewerSettings::load_from_file(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_fields_default() {
        let path = temp_path("partial");
        fs::write(&path, "<VrViewerSettings><format>180</format></VrViewerSettings>").unwrap();
        let loaded = ViewerSettings::load_from_file(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded.format, Format::Fov180);
        assert_eq!(loaded.layout, Layout::Mono);
        assert_eq!(loaded.window_width, 1920);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let path = temp_path("corrupt");
        fs::write(&path, "<VrViewerSettings><windowWidth>wide</windowWidth>").unwrap();
        let result = ViewerSettings::load_from_file(&path);
        fs::remove_file(&path).ok();
        assert!(result.is_err());
    }

    #[test]
    fn test_clamp() {
        let mut settings = ViewerSettings {
            window_width: 10,
            field_of_view_degrees: f32::NAN,
            screen_distance: -1.0,
            ..ViewerSettings::default()
        };
        settings.clamp();
        assert_eq!(settings.window_width, MIN_WINDOW_SIZE);
        assert_eq!(settings.field_of_view_degrees, 90.0);
        assert_eq!(settings.screen_distance, 2.0);
    }

    #[test]
    fn test_cli_parsing() {
        let args = CliArgs::parse(["clip.png", "--layout", "stereoLeftRight", "--format", "180", "--stereo"]);
        assert_eq!(args.media, Some(PathBuf::from("clip.png")));
        assert_eq!(args.layout, Some(Layout::StereoLeftRight));
        assert_eq!(args.format, Some(Format::Fov180));
        assert!(args.stereo);
    }

    #[test]
    fn test_cli_skips_bad_arguments() {
        let args = CliArgs::parse(["--verbose", "--layout"]);
        assert_eq!(args, CliArgs::default());
    }

    #[test]
    fn test_dropped_media_is_remembered() {
        let path = temp_path("dropped");
        let mut settings = ViewerSettings::default();
        settings.remember_media(Path::new("/videos/dropped.png"));
        settings.save_to_file(&path).unwrap();

        let loaded = ViewerSettings::load_from_file(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(loaded.last_opened_file.as_deref(), Some("/videos/dropped.png"));
    }

    #[test]
    fn test_cli_overrides_settings() {
        let mut settings = ViewerSettings::default();
        settings.apply_cli(&CliArgs::parse(["--format", "360", "--stereo"]));
        assert_eq!(settings.format, Format::Fov360);
        assert_eq!(settings.layout, Layout::Mono);
        assert!(!settings.debug);
    }
}
