use std::path::{Path, PathBuf};
use std::sync::Once;

use async_trait::async_trait;
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, install_logging_hooks,
};

use crate::error::{KonspektError, Result};
use crate::types::{Segment, Transcript};

static LOGGING_HOOKS_INSTALLED: Once = Once::new();

/// Speech-to-text port. The pipeline only needs "given an audio path, return
/// a transcript or a typed failure"; tests substitute deterministic fakes.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript>;
}

/// Whisper-backed transcriber. Loads a ggml model file and runs inference on
/// the CPU; no GPU flags so the same build behaves everywhere.
pub struct WhisperTranscriber {
    model_path: PathBuf,
}

impl WhisperTranscriber {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        // Route whisper.cpp's stderr chatter through the logging hooks so
        // non-actionable warnings stay out of the program output.
        LOGGING_HOOKS_INSTALLED.call_once(|| {
            install_logging_hooks();
        });
        Self {
            model_path: model_path.into(),
        }
    }

    fn read_samples(audio_path: &Path) -> Result<Vec<f32>> {
        let mut reader = hound::WavReader::open(audio_path).map_err(|e| {
            KonspektError::TranscriptionFailed {
                audio_path: audio_path.to_path_buf(),
                reason: format!("failed to read WAV: {e}"),
            }
        })?;
        let samples = reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<i16>, _>>()
            .map_err(|e| KonspektError::TranscriptionFailed {
                audio_path: audio_path.to_path_buf(),
                reason: format!("failed to decode WAV samples: {e}"),
            })?;
        Ok(samples.iter().map(|&s| s as f32 / 32768.0).collect())
    }

    fn run_model(&self, audio_path: &Path, samples: &[f32]) -> Result<Transcript> {
        let failed = |reason: String| KonspektError::TranscriptionFailed {
            audio_path: audio_path.to_path_buf(),
            reason,
        };

        let mut ctx_params = WhisperContextParameters::default();
        ctx_params.use_gpu(false);
        let model_path = self
            .model_path
            .to_str()
            .ok_or_else(|| failed("invalid UTF-8 in model path".to_string()))?;
        let ctx = WhisperContext::new_with_params(model_path, ctx_params)
            .map_err(|e| failed(format!("failed to load model: {e}")))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        let mut state = ctx
            .create_state()
            .map_err(|e| failed(format!("failed to create state: {e}")))?;
        state
            .full(params, samples)
            .map_err(|e| failed(format!("inference failed: {e}")))?;

        let mut text = String::new();
        let mut segments: Vec<Segment> = Vec::new();
        for segment in state.as_iter() {
            let Ok(seg_text) = segment.to_str() else {
                continue;
            };
            segments.push(Segment {
                start: segment.start_timestamp() as f64 / 100.0,
                end: segment.end_timestamp() as f64 / 100.0,
                text: seg_text.to_string(),
            });
            text.push_str(seg_text);
        }

        let language_index = state.full_lang_id_from_state();
        let language = whisper_rs::get_lang_str(language_index)
            .unwrap_or("unknown")
            .to_string();

        Ok(Transcript {
            text: text.trim().to_string(),
            segments,
            language,
        })
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript> {
        if !audio_path.exists() {
            return Err(KonspektError::AudioNotFound {
                path: audio_path.to_path_buf(),
            });
        }
        let samples = Self::read_samples(audio_path)?;
        self.run_model(audio_path, &samples)
    }
}
