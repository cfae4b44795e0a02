use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

pub mod api;
pub mod audio;

/// Error type for audio decoding and transcription.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    /// The whisper model file could not be loaded.
    #[error("Failed to load whisper model from {path}")]
    ModelLoad {
        path: String,
        #[source]
        source: whisper_rs::WhisperError,
    },
    /// The uploaded file could not be decoded as audio.
    #[error("Failed to decode audio: {0}")]
    Decode(#[from] symphonia::core::errors::Error),
    /// The file contained no decodable audio track.
    #[error("No audio track found in file")]
    NoAudioTrack,
    /// The audio track decoded to zero samples.
    #[error("Decoded audio stream is empty")]
    EmptyAudio,
    /// The resampler could not be constructed for the input rate.
    #[error("Failed to construct resampler: {0}")]
    ResamplerConstruction(#[from] rubato::ResamplerConstructionError),
    /// Resampling to the model rate failed.
    #[error("Failed to resample audio: {0}")]
    Resample(#[from] rubato::ResampleError),
    /// The whisper model rejected the inference request.
    #[error("Whisper inference failed: {0}")]
    Inference(#[from] whisper_rs::WhisperError),
    /// Represents an I/O error while reading the stored file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The blocking inference task was cancelled or panicked.
    #[error("Transcription task aborted")]
    Aborted,
}

/// Speech-to-text engine contract. The HTTP layer depends on this trait
/// instead of a concrete engine, which keeps request handling decoupled from
/// inference code.
pub trait SpeechToText: Send + Sync {
    /// Transcribes 16 kHz mono f32 PCM samples into text.
    fn transcribe(&self, samples: &[f32]) -> Result<String, TranscriptionError>;
}

/// Whisper-backed speech-to-text engine. Loaded once at process startup and
/// shared read-only across requests; each call creates its own decode state.
pub struct WhisperTranscriber {
    ctx: WhisperContext,
}

impl WhisperTranscriber {
    /// Loads a GGML whisper model from disk.
    ///
    /// # Arguments
    ///
    /// * `model_path` - Path to the GGML model file.
    ///
    /// # Returns
    ///
    /// A `Result` containing the engine if the model loaded, or an error otherwise.
    pub fn load(model_path: &str) -> Result<Self, TranscriptionError> {
        let ctx =
            WhisperContext::new_with_params(model_path, WhisperContextParameters::default())
                .map_err(|source| TranscriptionError::ModelLoad {
                    path: model_path.to_string(),
                    source,
                })?;
        Ok(Self { ctx })
    }
}

impl SpeechToText for WhisperTranscriber {
    #[tracing::instrument(skip(self, samples))]
    fn transcribe(&self, samples: &[f32]) -> Result<String, TranscriptionError> {
        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_translate(false);

        let mut state = self.ctx.create_state()?;
        state.full(params, samples)?;

        let num_segments = state.full_n_segments()?;
        let mut text = String::new();
        for i in 0..num_segments {
            if let Ok(segment) = state.full_get_segment_text(i) {
                text.push_str(&segment);
                text.push(' ');
            }
        }

        Ok(text.trim().to_string())
    }
}
