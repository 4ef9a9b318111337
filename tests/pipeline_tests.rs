use lifting_vision::pipeline::{GateState, PixelCoord};
use lifting_vision::{ConfigError, FrameError, LiftingPipeline, PipelineConfig, TickInput};

const WIDTH: u32 = 32;
const HEIGHT: u32 = 24;

fn config() -> PipelineConfig {
    PipelineConfig {
        image_width: WIDTH,
        image_height: HEIGHT,
        sprite_height: 8,
        ..PipelineConfig::default()
    }
}

fn uniform_frame(value: u8) -> Vec<u8> {
    let mut buffer = vec![255u8; (WIDTH * HEIGHT * 4) as usize];
    for pixel in buffer.chunks_mut(4) {
        pixel[..3].fill(value);
    }
    buffer
}

fn set_pixel(buffer: &mut [u8], x: u32, y: u32, value: u8) {
    let i = ((y * WIDTH + x) * 4) as usize;
    buffer[i..i + 3].fill(value);
}

#[test]
fn black_frame_against_black_background_has_no_motion() {
    let black = uniform_frame(0);
    for threshold in [0u8, 30, 255] {
        let mut pipeline = LiftingPipeline::new(PipelineConfig { diff_threshold: threshold, ..config() }).unwrap();
        let output = pipeline.tick(TickInput::frame(&black)).unwrap().unwrap();
        assert!(output.mask.is_empty());
        assert_eq!(output.mask.flagged_coordinates().count(), 0);
    }
}

#[test]
fn before_capture_every_bright_pixel_is_motion() {
    let mut pipeline = LiftingPipeline::new(config()).unwrap();
    let mut frame = uniform_frame(31);
    set_pixel(&mut frame, 0, 0, 30);

    let output = pipeline.tick(TickInput::frame(&frame)).unwrap().unwrap();
    assert!(!pipeline.background().has_captured());
    assert_eq!(output.mask.flagged_count(), (WIDTH * HEIGHT - 1) as usize);
    assert!(!output.mask.contains(0, 0));
}

#[test]
fn one_brightened_pixel_yields_exactly_that_coordinate() {
    let mut pipeline = LiftingPipeline::new(config()).unwrap();
    let background = uniform_frame(100);
    pipeline.tick(TickInput::capture(&background)).unwrap();

    let mut frame = background.clone();
    set_pixel(&mut frame, 7, 11, 100 + 31);
    let output = pipeline.tick(TickInput::frame(&frame)).unwrap().unwrap();

    let flagged: Vec<PixelCoord> = output.mask.flagged_coordinates().collect();
    assert_eq!(flagged, vec![PixelCoord::new(7, 11)]);
}

#[test]
fn difference_equal_to_threshold_is_not_motion() {
    let mut pipeline = LiftingPipeline::new(config()).unwrap();
    let background = uniform_frame(10);
    pipeline.capture_background(&background).unwrap();

    let mut frame = background.clone();
    set_pixel(&mut frame, 3, 3, 40);
    set_pixel(&mut frame, 4, 3, 50);
    let output = pipeline.tick(TickInput::frame(&frame)).unwrap().unwrap();

    assert!(!output.mask.contains(3, 3));
    assert!(output.mask.contains(4, 3));
}

#[test]
fn capture_takes_effect_from_the_next_tick() {
    let mut pipeline = LiftingPipeline::new(config()).unwrap();
    let grey = uniform_frame(120);

    let first = pipeline.tick(TickInput::capture(&grey)).unwrap().unwrap();
    assert!(first.background_captured);
    assert_eq!(first.mask.flagged_count(), (WIDTH * HEIGHT) as usize);

    let second = pipeline.tick(TickInput::frame(&grey)).unwrap().unwrap();
    assert!(second.mask.is_empty());
    assert_eq!(pipeline.background().capture_count(), 1);
}

#[test]
fn missing_frame_is_a_no_op() {
    let mut pipeline = LiftingPipeline::new(config()).unwrap();
    let black = uniform_frame(0);
    pipeline.tick(TickInput::frame(&black)).unwrap();
    let physics = pipeline.physics();

    let output = pipeline
        .tick(TickInput { frame: None, capture_background: true })
        .unwrap();
    assert!(output.is_none());
    assert_eq!(pipeline.physics(), physics);
    assert_eq!(pipeline.frame_count(), 1);
    assert!(!pipeline.background().has_captured());
}

#[test]
fn undersized_frame_is_rejected_without_side_effects() {
    let mut pipeline = LiftingPipeline::new(config()).unwrap();
    let black = uniform_frame(0);
    pipeline.tick(TickInput::frame(&black)).unwrap();
    let physics = pipeline.physics();

    let short = &black[..black.len() - 1];
    let err = pipeline.tick(TickInput::capture(short)).unwrap_err();
    assert!(matches!(err, FrameError::BufferTooSmall { .. }));
    assert_eq!(pipeline.physics(), physics);
    assert!(!pipeline.background().has_captured());

    assert!(matches!(
        pipeline.tick(TickInput::frame(&[])).unwrap_err(),
        FrameError::BufferTooSmall { actual: 0, .. }
    ));
}

#[test]
fn object_falls_under_gravity_when_nothing_moves() {
    let mut pipeline = LiftingPipeline::new(config()).unwrap();
    let black = uniform_frame(0);
    let mut previous = pipeline.physics();

    for _ in 0..10 {
        let output = pipeline.tick(TickInput::frame(&black)).unwrap().unwrap();
        assert_eq!(output.gate_state, GateState::Falling);
        assert!(output.physics.position > previous.position);
        assert!((output.physics.velocity - previous.velocity - 0.01).abs() < 1e-12);
        previous = output.physics;
    }
}

#[test]
fn motion_at_probe_bounces_object() {
    let config = PipelineConfig { bounce_velocity: -2.5, ..config() };
    let mut pipeline = LiftingPipeline::new(config).unwrap();
    let black = uniform_frame(0);
    pipeline.capture_background(&black).unwrap();

    let mut frame = black.clone();
    set_pixel(&mut frame, WIDTH / 2, 0, 255);
    let output = pipeline.tick(TickInput::frame(&frame)).unwrap().unwrap();

    assert_eq!(pipeline.config().probe_column(), WIDTH / 2);
    assert_eq!(output.gate_state, GateState::Bouncing);
    assert_eq!(output.physics.velocity, -2.5);
    assert_eq!(output.physics.position, -2.5);
}

#[test]
fn object_comes_to_rest_above_bottom_edge() {
    let config = PipelineConfig { gravity: 1.0, ..config() };
    let lower_bound = config.lower_bound();
    let mut pipeline = LiftingPipeline::new(config).unwrap();
    let black = uniform_frame(0);

    let mut state = GateState::Falling;
    for _ in 0..50 {
        state = pipeline.tick(TickInput::frame(&black)).unwrap().unwrap().gate_state;
        if state == GateState::Resting {
            break;
        }
    }
    assert_eq!(state, GateState::Resting);
    assert_eq!(pipeline.gate_state(), GateState::Resting);
    assert_eq!(pipeline.physics().velocity, 0.0);
    assert!(pipeline.physics().position > lower_bound);
}

#[test]
fn frame_image_preserves_raw_pixels() {
    let pipeline = LiftingPipeline::new(config()).unwrap();
    let mut frame = uniform_frame(0);
    set_pixel(&mut frame, 1, 2, 200);
    let image = pipeline.frame_image(&frame).unwrap();
    assert_eq!(image.dimensions(), (WIDTH, HEIGHT));
    assert_eq!(image.get_pixel(1, 2).0, [200, 200, 200, 255]);
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let outside = PipelineConfig { probe_x: Some(WIDTH), ..config() };
    assert!(matches!(LiftingPipeline::new(outside), Err(ConfigError::Invalid(_))));

    let downward = PipelineConfig { bounce_velocity: 3.0, ..config() };
    assert!(matches!(LiftingPipeline::new(downward), Err(ConfigError::Invalid(_))));

    let last_column = PipelineConfig { probe_x: Some(WIDTH - 1), ..config() };
    assert!(LiftingPipeline::new(last_column).is_ok());
}
