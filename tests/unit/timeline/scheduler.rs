use super::*;

fn fps24() -> Fps {
    Fps::integer(24).unwrap()
}

fn win(start: f64, duration: f64) -> SegmentWindow {
    SegmentWindow { start, duration }
}

#[test]
fn uniform_two_segments_four_seconds() {
    let tl = Timeline::schedule(&TimingPolicy::Uniform, 2, 4.0, fps24()).unwrap();
    assert_eq!(tl.total_frames, 96);
    assert_eq!(
        tl.frames_for_segment(0),
        vec![FrameRange {
            start: FrameIndex(0),
            end: FrameIndex(48)
        }]
    );
    assert_eq!(
        tl.frames_for_segment(1),
        vec![FrameRange {
            start: FrameIndex(48),
            end: FrameIndex(96)
        }]
    );
    assert_eq!(tl.states.len(), 2);
    assert_eq!(tl.state_at(FrameIndex(47)), Some(&VisualState::single(0)));
    assert_eq!(tl.state_at(FrameIndex(48)), Some(&VisualState::single(1)));
    assert_eq!(tl.state_at(FrameIndex(96)), None);
}

#[test]
fn uniform_frames_sum_to_rounded_total() {
    for &d in &[0.5, 1.0, 2.31, 3.333, 4.0, 7.77, 12.49, 59.99] {
        for k in 1..=7usize {
            let tl = Timeline::schedule(&TimingPolicy::Uniform, k, d, fps24()).unwrap();
            let expected = (d * 24.0).round() as u64;
            assert_eq!(tl.total_frames, expected, "d={d} k={k}");
            let sum: u64 = (0..k).map(|i| tl.frame_count_for_segment(i)).sum();
            assert_eq!(sum, expected, "d={d} k={k}");
            assert_eq!(tl.frames().count() as u64, expected);
        }
    }
}

#[test]
fn uniform_last_segment_absorbs_remainder() {
    // 2.31s * 24 = 55.44 -> 55 frames; 2.31/3*24 = 18.48 -> 18 per segment.
    let tl = Timeline::schedule(&TimingPolicy::Uniform, 3, 2.31, fps24()).unwrap();
    assert_eq!(tl.frame_count_for_segment(0), 18);
    assert_eq!(tl.frame_count_for_segment(1), 18);
    assert_eq!(tl.frame_count_for_segment(2), 19);
}

#[test]
fn uniform_segments_are_sequential_and_disjoint() {
    let tl = Timeline::schedule(&TimingPolicy::Uniform, 4, 3.0, fps24()).unwrap();
    let order: Vec<&[usize]> = tl.frames().map(|(_, s)| s.active()).collect();
    let mut last = 0usize;
    for active in order {
        assert_eq!(active.len(), 1);
        assert!(active[0] >= last);
        last = active[0];
    }
}

#[test]
fn explicit_duration_is_max_of_narration_and_windows() {
    let windows = vec![win(0.0, 1.0), win(1.0, 4.5)];
    let tl = Timeline::schedule(&TimingPolicy::Explicit(windows.clone()), 2, 3.0, fps24())
        .unwrap();
    assert_eq!(tl.duration_secs, 5.5);
    assert_eq!(tl.total_frames, 132);

    let tl = Timeline::schedule(&TimingPolicy::Explicit(windows), 2, 8.0, fps24()).unwrap();
    assert_eq!(tl.duration_secs, 8.0);
    assert_eq!(tl.total_frames, 192);
    assert_eq!(tl.state_at(FrameIndex(140)), Some(&VisualState::empty()));
}

#[test]
fn explicit_overlap_shows_both_segments() {
    let windows = vec![win(0.0, 2.0), win(1.0, 2.0)];
    let tl = Timeline::schedule(&TimingPolicy::Explicit(windows), 2, 1.0, fps24()).unwrap();
    assert_eq!(tl.total_frames, 72);
    assert_eq!(tl.state_at(FrameIndex(0)), Some(&VisualState::single(0)));
    assert_eq!(tl.state_at(FrameIndex(24)), Some(&VisualState::new(vec![0, 1])));
    assert_eq!(tl.state_at(FrameIndex(48)), Some(&VisualState::single(1)));
    assert_eq!(tl.states.len(), 3);
    assert_eq!(tl.runs.len(), 3);
}

#[test]
fn explicit_gaps_show_background_only() {
    let windows = vec![win(1.0, 1.0)];
    let tl = Timeline::schedule(&TimingPolicy::Explicit(windows), 1, 3.0, fps24()).unwrap();
    assert_eq!(tl.state_at(FrameIndex(0)), Some(&VisualState::empty()));
    assert_eq!(tl.state_at(FrameIndex(24)), Some(&VisualState::single(0)));
    assert_eq!(tl.state_at(FrameIndex(48)), Some(&VisualState::empty()));
    assert_eq!(tl.states.len(), 2);
}

#[test]
fn explicit_states_cover_any_schedule() {
    let windows = vec![win(0.0, 2.0), win(1.0, 2.0), win(5.0, 0.5)];
    let known = explicit_states(&windows, fps24());
    for d in [0.1, 2.0, 6.0, 10.0] {
        let tl =
            Timeline::schedule(&TimingPolicy::Explicit(windows.clone()), 3, d, fps24()).unwrap();
        for s in &tl.states {
            assert!(known.contains(s), "missing {s:?} for d={d}");
        }
    }
}

#[test]
fn schedule_rejects_bad_inputs() {
    let e = Timeline::schedule(&TimingPolicy::Uniform, 0, 1.0, fps24()).unwrap_err();
    assert!(e.is_validation());
    let e = Timeline::schedule(&TimingPolicy::Uniform, 1, f64::NAN, fps24()).unwrap_err();
    assert!(e.is_validation());
    let e = Timeline::schedule(&TimingPolicy::Uniform, 1, 0.0, fps24()).unwrap_err();
    assert!(e.is_validation());

    let e = Timeline::schedule(&TimingPolicy::Explicit(vec![win(0.0, 1.0)]), 2, 1.0, fps24())
        .unwrap_err();
    assert!(e.is_validation());
    let e = Timeline::schedule(&TimingPolicy::Explicit(vec![win(-1.0, 1.0)]), 1, 1.0, fps24())
        .unwrap_err();
    assert!(e.is_validation());
    let e = Timeline::schedule(&TimingPolicy::Explicit(vec![win(0.0, 0.0)]), 1, 1.0, fps24())
        .unwrap_err();
    assert!(e.is_validation());
}

#[test]
fn too_short_narration_is_a_render_error() {
    let e = Timeline::schedule(&TimingPolicy::Uniform, 1, 0.01, fps24()).unwrap_err();
    assert!(matches!(e, ShortsError::Render(_)));
}

#[test]
fn uniform_narration_shorter_than_one_frame_per_segment_is_a_render_error() {
    // 0.1s * 24 = 2.4 -> 2 frames for 3 segments.
    let e = Timeline::schedule(&TimingPolicy::Uniform, 3, 0.1, fps24()).unwrap_err();
    assert!(matches!(e, ShortsError::Render(_)));

    // 0.125s -> 3 frames, one per segment plus the remainder on the last.
    let tl = Timeline::schedule(&TimingPolicy::Uniform, 2, 0.125, fps24()).unwrap();
    assert_eq!(tl.frame_count_for_segment(0), 1);
    assert_eq!(tl.frame_count_for_segment(1), 2);
}

#[test]
fn explicit_windows_past_the_limit_are_rejected() {
    let long = TimingPolicy::Explicit(vec![win(0.0, 2.0), win(1.0, 2.0e5)]);
    assert!(long.validate(2).is_ok());
    assert!(long.validate_length(600.0).unwrap_err().is_validation());

    let fits = TimingPolicy::Explicit(vec![win(0.0, 2.0), win(590.0, 10.0)]);
    assert!(fits.validate_length(600.0).is_ok());
    assert!(TimingPolicy::Uniform.validate_length(1.0).is_ok());
}
