use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

struct Fixed {
    secs: f64,
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl Synthesizer for Fixed {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn synthesize(
        &self,
        _text: &str,
        _voice: &VoiceParams,
        out: &Path,
    ) -> ShortsResult<NarrationResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(NarrationResult {
            audio_path: out.to_path_buf(),
            duration_secs: self.secs,
        })
    }
}

fn voice() -> VoiceParams {
    VoiceParams {
        language: "ko".to_string(),
        voice: "ko-KR-SunHiNeural".to_string(),
    }
}

#[test]
fn script_joins_with_sentence_separator() {
    assert_eq!(narration_script(&["안녕", "반가워"]), "안녕. 반가워");
    assert_eq!(narration_script(&["one"]), "one");
}

#[test]
fn registry_resolves_aliases_case_insensitively() {
    let engine: Arc<dyn Synthesizer> = Arc::new(Fixed {
        secs: 1.0,
        calls: AtomicUsize::new(0),
    });
    let mut reg = SynthesizerRegistry::new();
    reg.register(&["gtts", "google"], engine);

    assert_eq!(reg.resolve("gtts").unwrap().name(), "fixed");
    assert_eq!(reg.resolve(" Google ").unwrap().name(), "fixed");
    let err = reg.resolve("foo").err().unwrap();
    assert!(err.is_validation());
    assert!(err.to_string().contains("foo"));
}

#[test]
fn standard_registry_has_stock_engines() {
    let reg = SynthesizerRegistry::standard("ffprobe", "edge-tts").unwrap();
    assert_eq!(reg.keys().collect::<Vec<_>>(), vec!["edge", "google", "gtts"]);
    assert_eq!(reg.resolve("edge").unwrap().name(), "edge");
    assert_eq!(reg.resolve("gtts").unwrap().name(), "google");
}

#[tokio::test]
async fn narrate_rejects_empty_script_without_calling_engine() {
    let engine = Fixed {
        secs: 1.0,
        calls: AtomicUsize::new(0),
    };
    let dir = tempfile::tempdir().unwrap();
    let err = narrate(&engine, "  ", &voice(), dir.path()).await.unwrap_err();
    assert!(matches!(err, ShortsError::Synthesis(_)));
    assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn narrate_rejects_unusable_duration() {
    let engine = Fixed {
        secs: f64::NAN,
        calls: AtomicUsize::new(0),
    };
    let dir = tempfile::tempdir().unwrap();
    let err = narrate(&engine, "hi", &voice(), dir.path()).await.unwrap_err();
    assert!(matches!(err, ShortsError::Synthesis(_)));
}

#[tokio::test]
async fn narrate_writes_into_directory() {
    let engine = Fixed {
        secs: 4.0,
        calls: AtomicUsize::new(0),
    };
    let dir = tempfile::tempdir().unwrap();
    let res = narrate(&engine, "안녕. 반가워", &voice(), dir.path())
        .await
        .unwrap();
    assert_eq!(res.audio_path, dir.path().join(NARRATION_FILE));
    assert_eq!(res.duration_secs, 4.0);
}
