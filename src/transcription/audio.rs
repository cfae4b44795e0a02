//! Audio preparation for whisper inference: container bytes → symphonia
//! decode → mono mix-down → rubato resample to 16 kHz f32 PCM.

use std::path::Path;

use rubato::{FftFixedIn, Resampler};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::transcription::TranscriptionError;

/// Sample rate expected by the whisper model.
const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Decodes an audio file and prepares it for whisper inference: any
/// supported container/codec in, 16 kHz mono f32 samples out.
#[tracing::instrument]
pub fn load_pcm_mono_16khz(path: &Path) -> Result<Vec<f32>, TranscriptionError> {
    let (samples, sample_rate, channels) = decode_file(path)?;
    if samples.is_empty() {
        return Err(TranscriptionError::EmptyAudio);
    }

    let mono = to_mono(&samples, channels);
    resample_to_whisper_rate(&mono, sample_rate)
}

/// Decodes every packet of the first audio track, returning interleaved f32
/// samples together with the stream's rate and channel count.
fn decode_file(path: &Path) -> Result<(Vec<f32>, u32, usize), TranscriptionError> {
    let file = std::fs::File::open(path)?;
    let stream = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        stream,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(TranscriptionError::NoAudioTrack)?;
    let track_id = track.id;

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(WHISPER_SAMPLE_RATE);
    let mut channels = track
        .codec_params
        .channels
        .map(|channels| channels.count())
        .unwrap_or(1);
    let mut samples = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            // End of stream.
            Err(SymphoniaError::IoError(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(err) => return Err(err.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // Skip malformed frames; the rest of the stream is still usable.
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(err) => return Err(err.into()),
        };

        let spec = *decoded.spec();
        sample_rate = spec.rate;
        channels = spec.channels.count();

        let buf = sample_buf
            .get_or_insert_with(|| SampleBuffer::new(decoded.capacity() as u64, spec));
        buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buf.samples());
    }

    Ok((samples, sample_rate, channels))
}

/// Mixes interleaved samples down to mono by averaging channels.
fn to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }

    let num_frames = samples.len() / channels;
    let mut mono = Vec::with_capacity(num_frames);
    for frame in 0..num_frames {
        let mut sum = 0.0;
        for channel in 0..channels {
            sum += samples[frame * channels + channel];
        }
        mono.push(sum / channels as f32);
    }
    mono
}

/// Resamples mono audio to the whisper model rate.
fn resample_to_whisper_rate(
    samples: &[f32],
    input_rate: u32,
) -> Result<Vec<f32>, TranscriptionError> {
    if input_rate == WHISPER_SAMPLE_RATE {
        return Ok(samples.to_vec());
    }

    let mut resampler = FftFixedIn::<f32>::new(
        input_rate as usize,
        WHISPER_SAMPLE_RATE as usize,
        1024, // chunk size
        2,    // sub chunks
        1,    // channels
    )?;

    let mut output = Vec::new();
    let mut input_pos = 0;

    let frames_needed = resampler.input_frames_next();
    while input_pos + frames_needed <= samples.len() {
        let input_chunk = vec![samples[input_pos..input_pos + frames_needed].to_vec()];
        let resampled = resampler.process(&input_chunk, None)?;
        output.extend_from_slice(&resampled[0]);
        input_pos += frames_needed;
    }

    // The final partial chunk is zero-padded to a full frame; trim the output
    // back to the duration the real samples cover.
    if input_pos < samples.len() {
        let remaining = &samples[input_pos..];
        let mut padded = remaining.to_vec();
        padded.resize(frames_needed, 0.0);
        let resampled = resampler.process(&vec![padded], None)?;

        let remaining_duration = remaining.len() as f64 / input_rate as f64;
        let expected_output = (remaining_duration * WHISPER_SAMPLE_RATE as f64).ceil() as usize;
        let actual_output = expected_output.min(resampled[0].len());
        output.extend_from_slice(&resampled[0][..actual_output]);
    }

    Ok(output)
}
