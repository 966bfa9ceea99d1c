use super::*;

#[test]
fn frame_range_len_and_contains() {
    let r = FrameRange::new(FrameIndex(48), FrameIndex(96)).unwrap();
    assert_eq!(r.len_frames(), 48);
    assert!(r.contains(FrameIndex(48)));
    assert!(r.contains(FrameIndex(95)));
    assert!(!r.contains(FrameIndex(96)));
    assert!(FrameRange::new(FrameIndex(2), FrameIndex(1)).is_err());
    assert!(FrameRange::new(FrameIndex(3), FrameIndex(3)).unwrap().is_empty());
}

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(24, 0).is_err());
    assert_eq!(Fps::integer(24).unwrap().as_f64(), 24.0);
}

#[test]
fn fps_frame_time_is_exact_on_whole_seconds() {
    let fps = Fps::integer(24).unwrap();
    assert_eq!(fps.frame_time_secs(FrameIndex(24)), 1.0);
    assert_eq!(fps.frame_time_secs(FrameIndex(48)), 2.0);
}

#[test]
fn fps_secs_to_frames_floor_and_round() {
    let fps = Fps::integer(24).unwrap();
    assert_eq!(fps.secs_to_frames_floor(2.0), 48);
    assert_eq!(fps.secs_to_frames_floor(1.99), 47);
    assert_eq!(fps.secs_to_frames_round(1.99), 48);
    assert_eq!(fps.secs_to_frames_round(4.0), 96);
    assert_eq!(fps.secs_to_frames_round(-1.0), 0);
}

#[test]
fn canvas_rgba_len() {
    assert_eq!(Canvas::SHORTS.rgba_len(), 608 * 1080 * 4);
}
