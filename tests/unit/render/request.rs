use super::*;
use crate::foundation::core::Rgba8;

fn form(fields: &[(&str, &str)]) -> RequestForm {
    let mut f = RequestForm::new();
    for (k, v) in fields {
        f.push_field(k, v.to_string());
    }
    f
}

fn bg() -> Option<Vec<u8>> {
    Some(vec![1, 2, 3])
}

#[test]
fn defaults_apply_when_style_columns_are_omitted() {
    let req = form(&[("texts[]", "안녕"), ("texts[]", "반가워")])
        .into_request(bg(), vec![])
        .unwrap();
    assert_eq!(req.segments.len(), 2);
    assert_eq!(req.timing, TimingPolicy::Uniform);
    assert_eq!(req.segments[0].style, TextStyle::CAPTION);
    assert!(req.segments[0].title.is_none());
    assert!(req.labels.is_none());
    assert_eq!(req.voice, VoiceSelection::default());
    assert_eq!(req.script(), "안녕. 반가워");
}

#[test]
fn full_columns_decode_per_segment() {
    let req = form(&[
        ("texts", "a"),
        ("texts", "b"),
        ("starts", "0"),
        ("starts", "1.5"),
        ("durations", "2"),
        ("durations", "2.5"),
        ("positions", "3"),
        ("positions", "7"),
        ("fontSizes", "30"),
        ("fontSizes", "60"),
        ("fontColors", "red"),
        ("fontColors", "#00ff00"),
        ("bgColors", "transparent"),
        ("bgColors", "black"),
        ("bolds", "false"),
        ("bolds", "true"),
        ("titles", ""),
        ("titles", "제목"),
        ("voiceEngine", "edge"),
        ("edgeVoice", "ko-KR-InJoonNeural"),
    ])
    .into_request(bg(), vec![vec![9]])
    .unwrap();

    assert_eq!(
        req.timing,
        TimingPolicy::Explicit(vec![
            SegmentWindow {
                start: 0.0,
                duration: 2.0
            },
            SegmentWindow {
                start: 1.5,
                duration: 2.5
            },
        ])
    );
    let b = &req.segments[1];
    assert_eq!(b.style.position, 7);
    assert_eq!(b.style.font_size, 60);
    assert_eq!(b.style.font_color, ColorSpec::Solid(Rgba8::opaque(0, 255, 0)));
    assert_eq!(b.style.bg_color, ColorSpec::Solid(Rgba8::BLACK));
    assert!(b.style.bold);
    assert_eq!(b.title.as_ref().unwrap().text, "제목");
    assert_eq!(b.title.as_ref().unwrap().style, TextStyle::TITLE);
    assert!(req.segments[0].title.is_none());
    assert_eq!(req.segments[0].overlay, Some(vec![9]));
    assert_eq!(req.segments[1].overlay, None);
    assert_eq!(req.voice.engine, "edge");
    assert_eq!(
        req.voice.params("ko", "ko-KR-SunHiNeural").voice,
        "ko-KR-InJoonNeural"
    );
}

#[test]
fn column_length_mismatch_is_rejected() {
    let err = form(&[("texts", "a"), ("texts", "b"), ("fontSizes", "30")])
        .into_request(bg(), vec![])
        .unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("fontSizes"));
}

#[test]
fn starts_without_durations_is_rejected() {
    let err = form(&[("texts", "a"), ("starts", "0")])
        .into_request(bg(), vec![])
        .unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn bad_values_are_validation_errors() {
    for fields in [
        vec![("texts", "a"), ("fontSizes", "big")],
        vec![("texts", "a"), ("fontSizes", "0")],
        vec![("texts", "a"), ("fontColors", "transparent")],
        vec![("texts", "a"), ("bgColors", "mauve-ish")],
        vec![("texts", "a"), ("bolds", "maybe")],
        vec![("texts", "a"), ("starts", "0"), ("durations", "-1")],
        vec![("texts", "a"), ("titleSize", "x")],
    ] {
        let err = form(&fields).into_request(bg(), vec![]).unwrap_err();
        assert!(err.is_validation(), "{fields:?}: {err}");
    }
}

#[test]
fn missing_texts_background_or_too_many_images() {
    assert!(form(&[]).into_request(bg(), vec![]).unwrap_err().is_validation());
    assert!(
        form(&[("texts", "a")])
            .into_request(None, vec![])
            .unwrap_err()
            .is_validation()
    );
    assert!(
        form(&[("texts", "a")])
            .into_request(bg(), vec![vec![1], vec![2]])
            .unwrap_err()
            .is_validation()
    );
}

#[test]
fn images_are_matched_to_segments_by_position() {
    let req = form(&[("texts", "a"), ("texts", "b"), ("texts", "c")])
        .into_request(bg(), vec![vec![], vec![7], vec![]])
        .unwrap();
    assert_eq!(req.segments[0].overlay, None);
    assert_eq!(req.segments[1].overlay, Some(vec![7]));
    assert_eq!(req.segments[2].overlay, None);

    // Trailing empty parts beyond the last segment are ignored.
    let req = form(&[("texts", "a")])
        .into_request(bg(), vec![vec![7], vec![]])
        .unwrap();
    assert_eq!(req.segments[0].overlay, Some(vec![7]));
}

#[test]
fn global_labels_lines_and_offsets() {
    let req = form(&[
        ("texts", "a"),
        ("title", "오늘의 이야기"),
        ("views", "1234"),
        ("titleSize", "40"),
        ("titlePosition", "2"),
    ])
    .into_request(bg(), vec![])
    .unwrap();
    let labels = req.labels.unwrap();
    assert_eq!(labels.lines(), vec!["#오늘의 이야기", "조회수: 1234"]);
    let blocks = labels.blocks().unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].line_offset_px, 0);
    assert_eq!(blocks[1].line_offset_px, 60);
    assert_eq!(blocks[1].position, 2);
    assert_eq!(blocks[1].plate, ColorSpec::Transparent);
}

#[test]
fn parse_bool_accepts_form_spellings() {
    assert_eq!(parse_bool("ON"), Some(true));
    assert_eq!(parse_bool("1"), Some(true));
    assert_eq!(parse_bool(""), Some(false));
    assert_eq!(parse_bool("no"), Some(false));
    assert_eq!(parse_bool("2"), None);
}

#[test]
fn manifest_builds_request_and_reads_overlays() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("one.png"), [7u8, 7, 7]).unwrap();
    let manifest = RenderManifest::from_json(
        r#"{
            "segments": [
                { "text": "안녕", "image": "one.png", "style": { "fontSize": 30 } },
                { "text": "반가워", "title": { "text": "제목" } }
            ],
            "labels": { "title": "t" },
            "voiceEngine": "edge"
        }"#,
    )
    .unwrap();
    let req = manifest.into_request(vec![1], dir.path()).unwrap();
    assert_eq!(req.timing, TimingPolicy::Uniform);
    assert_eq!(req.segments[0].overlay, Some(vec![7, 7, 7]));
    assert_eq!(req.segments[0].style.font_size, 30);
    assert_eq!(req.segments[0].style.position, 8);
    assert_eq!(req.segments[1].title.as_ref().unwrap().style, TextStyle::TITLE);
    assert_eq!(req.labels.unwrap().size, 40);
    assert_eq!(req.voice.engine, "edge");
}

#[test]
fn manifest_rejects_partial_timing() {
    let manifest = RenderManifest::from_json(
        r#"{ "segments": [ { "text": "a", "start": 0, "duration": 1 }, { "text": "b" } ] }"#,
    )
    .unwrap();
    let err = manifest
        .into_request(vec![1], Path::new("."))
        .unwrap_err();
    assert!(err.is_validation());
}
