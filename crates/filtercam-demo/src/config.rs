//! Application configuration for the demo.

use std::path::PathBuf;

/// Default output path for the last displayed frame.
const DEFAULT_OUTPUT: &str = "filtercam-preview.png";
/// Default number of frames to capture before exiting.
const DEFAULT_FRAMES: u64 = 120;
/// Default capture frame rate.
const DEFAULT_FPS: u32 = 30;
/// Default test pattern width.
const DEFAULT_WIDTH: u32 = 1280;
/// Default test pattern height.
const DEFAULT_HEIGHT: u32 = 720;

/// Runtime configuration for the FilterCam demo application.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Still image to filter repeatedly. Test pattern when unset.
    pub input: Option<PathBuf>,
    /// Where the last displayed frame is written as PNG.
    pub output: PathBuf,
    /// Frames to capture before the session ends.
    pub frames: u64,
    /// Capture frame rate.
    pub fps: u32,
    /// JSON file with initial filter settings.
    pub settings: Option<PathBuf>,
    /// Test pattern width.
    pub width: u32,
    /// Test pattern height.
    pub height: u32,
}

impl AppConfig {
    /// Build a config from a variable lookup, falling back to defaults for
    /// anything missing or unparsable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parse_var<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            key: &str,
        ) -> Option<T> {
            lookup(key).and_then(|s| s.trim().parse().ok())
        }
        Self {
            input: lookup("FILTERCAM_INPUT").map(PathBuf::from),
            output: lookup("FILTERCAM_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            frames: parse_var(&lookup, "FILTERCAM_FRAMES").unwrap_or(DEFAULT_FRAMES),
            fps: parse_var(&lookup, "FILTERCAM_FPS").unwrap_or(DEFAULT_FPS),
            settings: lookup("FILTERCAM_SETTINGS").map(PathBuf::from),
            width: parse_var(&lookup, "FILTERCAM_WIDTH").unwrap_or(DEFAULT_WIDTH),
            height: parse_var(&lookup, "FILTERCAM_HEIGHT").unwrap_or(DEFAULT_HEIGHT),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_variables() {
        let c = config(&[]);
        assert_eq!(c.input, None);
        assert_eq!(c.output, PathBuf::from("filtercam-preview.png"));
        assert_eq!(c.frames, 120);
        assert_eq!(c.fps, 30);
        assert_eq!(c.settings, None);
        assert_eq!((c.width, c.height), (1280, 720));
    }

    #[test]
    fn test_variables_override_defaults() {
        let c = config(&[
            ("FILTERCAM_INPUT", "shot.jpg"),
            ("FILTERCAM_OUTPUT", "out.png"),
            ("FILTERCAM_FRAMES", "10"),
            ("FILTERCAM_FPS", " 60 "),
            ("FILTERCAM_SETTINGS", "look.json"),
        ]);
        assert_eq!(c.input, Some(PathBuf::from("shot.jpg")));
        assert_eq!(c.output, PathBuf::from("out.png"));
        assert_eq!(c.frames, 10);
        assert_eq!(c.fps, 60);
        assert_eq!(c.settings, Some(PathBuf::from("look.json")));
    }

    #[test]
    fn test_unparsable_numbers_fall_back() {
        let c = config(&[("FILTERCAM_FRAMES", "lots"), ("FILTERCAM_FPS", "-1")]);
        assert_eq!(c.frames, 120);
        assert_eq!(c.fps, 30);
    }
}
