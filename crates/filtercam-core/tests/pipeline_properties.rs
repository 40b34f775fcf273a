use filtercam_core::transform::pipeline::apply_stage;
use filtercam_core::{
    ColorControls, FilterImage, FilterParameter, FilterParameters, FilterPipeline, FilterSettings,
    FilterStage, Frame, PipelineError, PixelFormat, Vignette,
};

/// A frame with a smooth RGB gradient so every stage has something to do.
fn gradient_frame(width: u32, height: u32) -> Frame {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&[
                (x * 255 / (width - 1)) as u8,
                (y * 255 / (height - 1)) as u8,
                96,
                255,
            ]);
        }
    }
    Frame::new(width, height, PixelFormat::Rgba8, data)
}

fn channel_spread(px: [u8; 4]) -> u8 {
    let max = px[0].max(px[1]).max(px[2]);
    let min = px[0].min(px[1]).min(px[2]);
    max - min
}

#[test]
fn output_has_input_dimensions() {
    let pipeline = FilterPipeline::new();
    for (w, h) in [(1, 1), (2, 7), (64, 48), (33, 17)] {
        let out = pipeline
            .filter(&Frame::uniform_rgba(w, h, [200, 100, 50, 255]), &FilterSettings::default())
            .expect("filter should succeed");
        assert_eq!((out.width, out.height), (w, h));
        assert_eq!(out.format, PixelFormat::Rgba8);
        assert_eq!(out.data.len(), (w * h * 4) as usize);
    }
}

#[test]
fn output_keeps_sequence_number() {
    let frame = gradient_frame(8, 8).with_sequence(41);
    let out = FilterPipeline::new()
        .filter(&frame, &FilterSettings::default())
        .expect("filter should succeed");
    assert_eq!(out.sequence, 41);
}

#[test]
fn filtering_is_deterministic() {
    let frame = gradient_frame(32, 24);
    let settings = FilterSettings::default();
    let pipeline = FilterPipeline::new();
    let a = pipeline.filter(&frame, &settings).expect("first run");
    let b = pipeline.filter(&frame, &settings).expect("second run");
    assert_eq!(a.data, b.data);
}

#[test]
fn zero_vignette_stage_is_identity() {
    let image = FilterImage::decode(&gradient_frame(16, 12)).expect("decode");
    let mut settings = FilterSettings::default();
    settings.vignette = Vignette {
        intensity: 0.0,
        radius: 0.3,
    };

    let mut filtered = image.clone();
    apply_stage(FilterStage::Vignette, &mut filtered, &settings).expect("vignette stage");
    assert_eq!(filtered, image);
}

#[test]
fn neutral_color_controls_stage_is_identity() {
    let image = FilterImage::decode(&gradient_frame(16, 12)).expect("decode");
    let mut settings = FilterSettings::default();
    settings.color_controls = ColorControls::IDENTITY;

    let mut filtered = image.clone();
    apply_stage(FilterStage::ColorControls, &mut filtered, &settings).expect("color stage");
    assert_eq!(filtered, image);
}

#[test]
fn default_look_on_mid_gray() {
    let frame = Frame::uniform_rgba(100, 100, [128, 128, 128, 255]);
    let out = FilterPipeline::new()
        .filter(&frame, &FilterParameters::default())
        .expect("filter should succeed");

    let center = out.rgba_at(50, 50).expect("center pixel");
    for (x, y) in [(0, 0), (99, 0), (0, 99), (99, 99)] {
        let corner = out.rgba_at(x, y).expect("corner pixel");
        assert!(
            corner[1] < center[1],
            "corner ({x}, {y}) {corner:?} should be darker than center {center:?}"
        );
    }

    assert!(
        channel_spread(center) <= 8,
        "center should stay close to neutral, got {center:?}"
    );
    assert_eq!(center[3], 255);
}

#[test]
fn empty_frame_is_rejected() {
    let frame = Frame::new(0, 10, PixelFormat::Rgba8, Vec::<u8>::new());
    let err = FilterPipeline::new()
        .filter(&frame, &FilterSettings::default())
        .expect_err("empty frame must fail");
    assert_eq!(
        err,
        PipelineError::EmptyFrame {
            width: 0,
            height: 10
        }
    );
}

#[test]
fn short_buffer_is_rejected() {
    let frame = Frame::new(4, 4, PixelFormat::Bgra8, vec![0u8; 4 * 4 * 4 - 1]);
    let err = FilterPipeline::new()
        .filter(&frame, &FilterSettings::default())
        .expect_err("short buffer must fail");
    assert!(matches!(
        err,
        PipelineError::MalformedFrame {
            format: PixelFormat::Bgra8,
            ..
        }
    ));
}

#[test]
fn nan_brightness_fails_at_first_stage() {
    let params = FilterParameters::default();
    params.set(FilterParameter::Brightness, f32::NAN);
    let err = FilterPipeline::new()
        .filter(&gradient_frame(8, 8), &params)
        .expect_err("NaN brightness must fail");
    assert_eq!(
        err,
        PipelineError::StageProductionFailure {
            stage: FilterStage::ColorControls
        }
    );
}

#[test]
fn parameter_write_between_frames_affects_only_later_frame() {
    let params = FilterParameters::default();
    let pipeline = FilterPipeline::new();
    let frame = gradient_frame(16, 16);

    let before = pipeline.filter(&frame, &params).expect("first frame");
    params.set(FilterParameter::Brightness, 0.2);
    let after = pipeline.filter(&frame, &params).expect("second frame");

    let expected_before = pipeline
        .filter(&frame, &FilterSettings::default())
        .expect("reference frame");
    assert_eq!(before.data, expected_before.data);
    assert_ne!(before.data, after.data);
}

#[test]
fn gray_is_filtered_identically_in_every_format() {
    let (w, h) = (6, 4);
    let n = (w * h) as usize;
    let frames = [
        Frame::new(w, h, PixelFormat::Rgba8, [128u8, 128, 128, 255].repeat(n)),
        Frame::new(w, h, PixelFormat::Bgra8, [128u8, 128, 128, 255].repeat(n)),
        Frame::new(w, h, PixelFormat::Rgb8, [128u8, 128, 128].repeat(n)),
        Frame::new(w, h, PixelFormat::Yuyv, [128u8, 128, 128, 128].repeat(n / 2)),
    ];

    let pipeline = FilterPipeline::new();
    let settings = FilterSettings::default();
    let reference = pipeline.filter(&frames[0], &settings).expect("rgba frame");
    for frame in &frames[1..] {
        let out = pipeline.filter(frame, &settings).expect("filter should succeed");
        assert_eq!(out.data, reference.data, "{} output differs", frame.format);
    }
}

#[test]
fn stride_padding_is_ignored() {
    let (w, h) = (5u32, 3u32);
    let packed = gradient_frame(w, h);

    let stride = w * 4 + 12;
    let mut padded = vec![0xAAu8; (stride * h) as usize];
    for y in 0..h as usize {
        let src = &packed.data[y * w as usize * 4..(y + 1) * w as usize * 4];
        padded[y * stride as usize..y * stride as usize + src.len()].copy_from_slice(src);
    }
    let padded = Frame::new(w, h, PixelFormat::Rgba8, padded).with_stride(stride);

    let pipeline = FilterPipeline::new();
    let settings = FilterSettings::default();
    let a = pipeline.filter(&packed, &settings).expect("packed frame");
    let b = pipeline.filter(&padded, &settings).expect("padded frame");
    assert_eq!(a.data, b.data);
}
