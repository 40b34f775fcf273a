//! The filter pipeline: five stages applied to every frame, in fixed order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color_management::white_balance::WhiteBalance;
use crate::error::PipelineError;
use crate::frame::{FilterImage, Frame};
use crate::grading::fade::apply_fade;
use crate::grading::sliders::{apply_color_controls, apply_highlight_shadow};
use crate::grading::vignette::{VignetteField, apply_vignette};
use crate::transform::params::ParameterSource;

/// One step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterStage {
    /// Saturation, contrast, brightness.
    ColorControls,
    /// Highlight compression and shadow lift.
    HighlightShadow,
    /// White balance from the neutral point.
    TemperatureTint,
    /// Radial darkening.
    Vignette,
    /// Fixed washed-out look.
    Fade,
}

impl FilterStage {
    /// Execution order. Each stage reads the previous stage's output.
    pub const ALL: [Self; 5] = [
        Self::ColorControls,
        Self::HighlightShadow,
        Self::TemperatureTint,
        Self::Vignette,
        Self::Fade,
    ];

    /// Human-readable label for logs and errors.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ColorControls => "color controls",
            Self::HighlightShadow => "highlight/shadow",
            Self::TemperatureTint => "temperature and tint",
            Self::Vignette => "vignette",
            Self::Fade => "fade",
        }
    }
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stateless frame filter.
///
/// Holds nothing between calls; every invocation reads parameters fresh from
/// the [`ParameterSource`] it is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterPipeline;

impl FilterPipeline {
    pub fn new() -> Self {
        Self
    }

    /// Filter one frame into a new RGBA frame of the same size.
    ///
    /// Fails as a unit: either every stage produced output or no frame is
    /// returned. The output keeps the input's sequence number.
    pub fn filter<P>(&self, frame: &Frame, params: &P) -> Result<Frame, PipelineError>
    where
        P: ParameterSource + ?Sized,
    {
        let image = FilterImage::decode(frame)?;
        let image = self.filter_image(image, params)?;
        Ok(image.encode(frame.sequence))
    }

    /// Run all five stages on an already decoded working image.
    ///
    /// Rejects empty images and images whose pixel count does not match
    /// their dimensions before any stage runs.
    pub fn filter_image<P>(&self, mut image: FilterImage, params: &P) -> Result<FilterImage, PipelineError>
    where
        P: ParameterSource + ?Sized,
    {
        image.validate()?;
        for stage in FilterStage::ALL {
            apply_stage(stage, &mut image, params)?;
        }
        Ok(image)
    }
}

/// Run a single stage in place, reading its parameters now.
///
/// On error the image contents are unspecified and must be discarded.
pub fn apply_stage<P>(
    stage: FilterStage,
    image: &mut FilterImage,
    params: &P,
) -> Result<(), PipelineError>
where
    P: ParameterSource + ?Sized,
{
    image.validate()?;
    match stage {
        FilterStage::ColorControls => {
            let controls = params.color_controls();
            map_rgb(image, |rgb| apply_color_controls(rgb, &controls));
        }
        FilterStage::HighlightShadow => {
            let amounts = params.highlight_shadow();
            map_rgb(image, |rgb| apply_highlight_shadow(rgb, &amounts));
        }
        FilterStage::TemperatureTint => {
            let wb = WhiteBalance::from_neutral(params.neutral());
            if !wb.is_identity() {
                map_rgb(image, |rgb| wb.apply(rgb));
            }
        }
        FilterStage::Vignette => {
            let field = VignetteField::new(image.width, image.height, &params.vignette());
            if !field.is_identity() {
                let width = image.width as usize;
                for (y, row) in image.pixels.chunks_exact_mut(width).enumerate() {
                    for (x, px) in row.iter_mut().enumerate() {
                        let shade = field.shade(x as u32, y as u32);
                        let [r, g, b] = apply_vignette([px[0], px[1], px[2]], shade);
                        *px = [r, g, b, px[3]];
                    }
                }
            }
        }
        FilterStage::Fade => map_rgb(image, apply_fade),
    }

    if !image.is_finite() {
        tracing::debug!("{stage} stage produced non-finite samples");
        return Err(PipelineError::StageProductionFailure { stage });
    }
    Ok(())
}

/// Apply `f` to the color channels of every pixel, leaving alpha alone.
fn map_rgb(image: &mut FilterImage, f: impl Fn([f32; 3]) -> [f32; 3]) {
    for px in &mut image.pixels {
        let [r, g, b] = f([px[0], px[1], px[2]]);
        *px = [r, g, b, px[3]];
    }
}
