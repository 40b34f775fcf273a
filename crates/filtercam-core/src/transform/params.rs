//! Filter parameters shared between the parameter UI and the pipeline.
//!
//! [`FilterParameters`] is the live, concurrently written instance. Every
//! scalar sits in its own atomic cell, so a writer never waits for a frame
//! and a frame never waits for a writer. Reads of different fields are not
//! consistent with each other; each stage only needs its own group.
//!
//! [`FilterSettings`] is the plain value form of the same data, used for
//! snapshots, JSON files and golden tests.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

/// Saturation, brightness and contrast for the color controls stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorControls {
    /// Color intensity multiplier. 1.0 = neutral.
    pub saturation: f32,
    /// Additive brightness offset. 0.0 = neutral.
    pub brightness: f32,
    /// Contrast multiplier around mid-gray. 1.0 = neutral.
    pub contrast: f32,
}

impl ColorControls {
    /// Values that leave the image unchanged.
    pub const IDENTITY: Self = Self {
        saturation: 1.0,
        brightness: 0.0,
        contrast: 1.0,
    };
}

impl Default for ColorControls {
    fn default() -> Self {
        Self {
            saturation: 0.7,
            brightness: 0.0,
            contrast: 1.2,
        }
    }
}

/// Highlight and shadow amounts for the tonal remap stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightShadow {
    /// Highlight strength. 1.0 = neutral, below compresses, above expands.
    pub highlight_amount: f32,
    /// Shadow strength. 0.0 = neutral, above lifts, below lowers.
    pub shadow_amount: f32,
}

impl HighlightShadow {
    /// Values that leave the image unchanged.
    pub const IDENTITY: Self = Self {
        highlight_amount: 1.0,
        shadow_amount: 0.0,
    };
}

impl Default for HighlightShadow {
    fn default() -> Self {
        Self {
            highlight_amount: 1.1,
            shadow_amount: -0.15,
        }
    }
}

/// White balance neutral point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Neutral {
    /// Correlated color temperature in kelvin (blue-yellow axis).
    pub temperature: f32,
    /// Green-magenta offset from the Planckian locus.
    pub tint: f32,
}

impl Default for Neutral {
    fn default() -> Self {
        Self {
            temperature: 6555.0,
            tint: 7.0,
        }
    }
}

/// Vignette strength and reach.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vignette {
    /// Darkening strength. 0.0 = off.
    pub intensity: f32,
    /// Normalized distance from center at which the darkening is full.
    pub radius: f32,
}

impl Default for Vignette {
    fn default() -> Self {
        Self {
            intensity: 0.4,
            radius: 0.6,
        }
    }
}

/// Read access to filter parameters, one group per pipeline stage.
///
/// The pipeline calls each method when the matching stage starts, so a live
/// source can change between stages of the same frame.
pub trait ParameterSource {
    /// Parameters for the color controls stage.
    fn color_controls(&self) -> ColorControls;

    /// Parameters for the highlight/shadow stage.
    fn highlight_shadow(&self) -> HighlightShadow;

    /// Parameters for the temperature and tint stage.
    fn neutral(&self) -> Neutral;

    /// Parameters for the vignette stage.
    fn vignette(&self) -> Vignette;
}

/// Value form of every filter parameter.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Color controls stage.
    pub color_controls: ColorControls,
    /// Highlight/shadow stage.
    pub highlight_shadow: HighlightShadow,
    /// Temperature and tint stage.
    pub neutral: Neutral,
    /// Vignette stage.
    pub vignette: Vignette,
}

impl FilterSettings {
    /// Settings whose parametric stages are all identities.
    ///
    /// The neutral is the white balance target, so temperature and tint do
    /// nothing either. Only the fixed fade remains.
    pub fn identity() -> Self {
        Self {
            color_controls: ColorControls::IDENTITY,
            highlight_shadow: HighlightShadow::IDENTITY,
            neutral: crate::color_management::white_balance::TARGET_NEUTRAL,
            vignette: Vignette {
                intensity: 0.0,
                ..Vignette::default()
            },
        }
    }

    /// Parse settings from JSON. Missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize settings as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl ParameterSource for FilterSettings {
    fn color_controls(&self) -> ColorControls {
        self.color_controls
    }

    fn highlight_shadow(&self) -> HighlightShadow {
        self.highlight_shadow
    }

    fn neutral(&self) -> Neutral {
        self.neutral
    }

    fn vignette(&self) -> Vignette {
        self.vignette
    }
}

/// Identifies one independently settable scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterParameter {
    Saturation,
    Brightness,
    Contrast,
    HighlightAmount,
    ShadowAmount,
    /// Neutral point x (kelvin).
    NeutralTemperature,
    /// Neutral point y.
    NeutralTint,
    VignetteIntensity,
    VignetteRadius,
}

impl FilterParameter {
    /// Every parameter, in stage order.
    pub const ALL: [Self; 9] = [
        Self::Saturation,
        Self::Brightness,
        Self::Contrast,
        Self::HighlightAmount,
        Self::ShadowAmount,
        Self::NeutralTemperature,
        Self::NeutralTint,
        Self::VignetteIntensity,
        Self::VignetteRadius,
    ];

    /// Human-readable label for UI sliders and logs.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Saturation => "Saturation",
            Self::Brightness => "Brightness",
            Self::Contrast => "Contrast",
            Self::HighlightAmount => "Highlights",
            Self::ShadowAmount => "Shadows",
            Self::NeutralTemperature => "Temperature",
            Self::NeutralTint => "Tint",
            Self::VignetteIntensity => "Vignette Intensity",
            Self::VignetteRadius => "Vignette Radius",
        }
    }

    /// Slider bounds offered by the parameter UI.
    ///
    /// Writes are not clamped to these; brightness in particular is
    /// unconstrained.
    pub const fn slider_range(&self) -> (f32, f32) {
        match self {
            Self::Saturation | Self::Contrast => (0.0, 2.0),
            Self::Brightness => (-1.0, 1.0),
            Self::HighlightAmount | Self::ShadowAmount => (-1.0, 2.0),
            Self::NeutralTemperature => (0.0, 20000.0),
            Self::NeutralTint => (-100.0, 100.0),
            Self::VignetteIntensity | Self::VignetteRadius => (0.0, 10.0),
        }
    }
}

impl fmt::Display for FilterParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An `f32` stored in an `AtomicU32`. Relaxed ordering: only the value of
/// this one cell matters, never its order against other cells.
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

impl fmt::Debug for AtomicF32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.load(), f)
    }
}

/// Live filter parameters, written by any number of UI call sites and read
/// by the pipeline on every frame. Share it as `Arc<FilterParameters>`.
#[derive(Debug)]
pub struct FilterParameters {
    saturation: AtomicF32,
    brightness: AtomicF32,
    contrast: AtomicF32,
    highlight_amount: AtomicF32,
    shadow_amount: AtomicF32,
    neutral_temperature: AtomicF32,
    neutral_tint: AtomicF32,
    vignette_intensity: AtomicF32,
    vignette_radius: AtomicF32,
}

impl FilterParameters {
    /// Create live parameters holding `settings`.
    pub fn new(settings: FilterSettings) -> Self {
        let FilterSettings {
            color_controls,
            highlight_shadow,
            neutral,
            vignette,
        } = settings;

        Self {
            saturation: AtomicF32::new(color_controls.saturation),
            brightness: AtomicF32::new(color_controls.brightness),
            contrast: AtomicF32::new(color_controls.contrast),
            highlight_amount: AtomicF32::new(highlight_shadow.highlight_amount),
            shadow_amount: AtomicF32::new(highlight_shadow.shadow_amount),
            neutral_temperature: AtomicF32::new(neutral.temperature),
            neutral_tint: AtomicF32::new(neutral.tint),
            vignette_intensity: AtomicF32::new(vignette.intensity),
            vignette_radius: AtomicF32::new(vignette.radius),
        }
    }

    fn cell(&self, param: FilterParameter) -> &AtomicF32 {
        match param {
            FilterParameter::Saturation => &self.saturation,
            FilterParameter::Brightness => &self.brightness,
            FilterParameter::Contrast => &self.contrast,
            FilterParameter::HighlightAmount => &self.highlight_amount,
            FilterParameter::ShadowAmount => &self.shadow_amount,
            FilterParameter::NeutralTemperature => &self.neutral_temperature,
            FilterParameter::NeutralTint => &self.neutral_tint,
            FilterParameter::VignetteIntensity => &self.vignette_intensity,
            FilterParameter::VignetteRadius => &self.vignette_radius,
        }
    }

    /// Write one parameter. The next stage that reads it sees the new value.
    pub fn set(&self, param: FilterParameter, value: f32) {
        self.cell(param).store(value);
    }

    /// Read the current value of one parameter.
    pub fn get(&self, param: FilterParameter) -> f32 {
        self.cell(param).load()
    }

    /// Write both neutral coordinates. Two independent writes, not atomic
    /// as a pair.
    pub fn set_neutral(&self, temperature: f32, tint: f32) {
        self.neutral_temperature.store(temperature);
        self.neutral_tint.store(tint);
    }

    /// Write every parameter from `settings`, one field at a time.
    pub fn store(&self, settings: &FilterSettings) {
        let FilterSettings {
            color_controls,
            highlight_shadow,
            neutral,
            vignette,
        } = *settings;

        self.saturation.store(color_controls.saturation);
        self.brightness.store(color_controls.brightness);
        self.contrast.store(color_controls.contrast);
        self.highlight_amount.store(highlight_shadow.highlight_amount);
        self.shadow_amount.store(highlight_shadow.shadow_amount);
        self.set_neutral(neutral.temperature, neutral.tint);
        self.vignette_intensity.store(vignette.intensity);
        self.vignette_radius.store(vignette.radius);
    }

    /// Read every parameter into a value. Fields are read one at a time, so
    /// a concurrent writer may be half-observed.
    pub fn snapshot(&self) -> FilterSettings {
        FilterSettings {
            color_controls: self.color_controls(),
            highlight_shadow: self.highlight_shadow(),
            neutral: ParameterSource::neutral(self),
            vignette: self.vignette(),
        }
    }
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self::new(FilterSettings::default())
    }
}

impl ParameterSource for FilterParameters {
    fn color_controls(&self) -> ColorControls {
        ColorControls {
            saturation: self.saturation.load(),
            brightness: self.brightness.load(),
            contrast: self.contrast.load(),
        }
    }

    fn highlight_shadow(&self) -> HighlightShadow {
        HighlightShadow {
            highlight_amount: self.highlight_amount.load(),
            shadow_amount: self.shadow_amount.load(),
        }
    }

    fn neutral(&self) -> Neutral {
        Neutral {
            temperature: self.neutral_temperature.load(),
            tint: self.neutral_tint.load(),
        }
    }

    fn vignette(&self) -> Vignette {
        Vignette {
            intensity: self.vignette_intensity.load(),
            radius: self.vignette_radius.load(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let s = FilterSettings::default();
        assert_eq!(s.color_controls.saturation, 0.7);
        assert_eq!(s.color_controls.brightness, 0.0);
        assert_eq!(s.color_controls.contrast, 1.2);
        assert_eq!(s.highlight_shadow.highlight_amount, 1.1);
        assert_eq!(s.highlight_shadow.shadow_amount, -0.15);
        assert_eq!(s.vignette.intensity, 0.4);
        assert_eq!(s.vignette.radius, 0.6);
    }

    #[test]
    fn test_live_parameters_start_at_defaults() {
        let live = FilterParameters::default();
        assert_eq!(live.snapshot(), FilterSettings::default());
    }

    #[test]
    fn test_set_is_visible_to_next_read() {
        let live = FilterParameters::default();
        live.set(FilterParameter::Contrast, 1.7);
        assert_eq!(live.get(FilterParameter::Contrast), 1.7);
        assert_eq!(live.color_controls().contrast, 1.7);
    }

    #[test]
    fn test_set_neutral_writes_both_coordinates() {
        let live = FilterParameters::default();
        live.set_neutral(8000.0, 10.0);
        let n = ParameterSource::neutral(&live);
        assert_eq!(n.temperature, 8000.0);
        assert_eq!(n.tint, 10.0);
    }

    #[test]
    fn test_store_then_snapshot_roundtrips() {
        let live = FilterParameters::default();
        let settings = FilterSettings::identity();
        live.store(&settings);
        assert_eq!(live.snapshot(), settings);
    }

    #[test]
    fn test_brightness_is_not_clamped_to_slider_range() {
        let live = FilterParameters::default();
        live.set(FilterParameter::Brightness, 42.0);
        assert_eq!(live.get(FilterParameter::Brightness), 42.0);
    }

    #[test]
    fn test_concurrent_writers_leave_last_written_value() {
        let live = Arc::new(FilterParameters::default());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let live = Arc::clone(&live);
                std::thread::spawn(move || {
                    for step in 0..1000 {
                        live.set(FilterParameter::VignetteRadius, (i * 1000 + step) as f32);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().expect("writer thread panicked");
        }
        live.set(FilterParameter::VignetteRadius, 0.25);
        assert_eq!(live.vignette().radius, 0.25);
    }

    #[test]
    fn test_settings_json_missing_fields_use_defaults() {
        let json = r#"{ "vignette": { "intensity": 2.0 } }"#;
        let settings = FilterSettings::from_json(json).expect("valid json");
        assert_eq!(settings.vignette.intensity, 2.0);
        assert_eq!(settings.vignette.radius, 0.6);
        assert_eq!(settings.color_controls, ColorControls::default());
    }

    #[test]
    fn test_settings_json_roundtrip() {
        let settings = FilterSettings::default();
        let json = settings.to_json().expect("serializable");
        assert_eq!(FilterSettings::from_json(&json).expect("parseable"), settings);
    }

    #[test]
    fn test_every_parameter_has_distinct_cell() {
        let live = FilterParameters::default();
        for (i, param) in FilterParameter::ALL.iter().enumerate() {
            live.set(*param, i as f32 + 100.0);
        }
        for (i, param) in FilterParameter::ALL.iter().enumerate() {
            assert_eq!(live.get(*param), i as f32 + 100.0, "{param}");
        }
    }
}
