//! Audio extraction.
//!
//! Decodes the best audio track of a video container and writes it as a
//! 16-bit PCM WAV file next to the video. Extraction is cached: if the
//! target file already exists it is reused as-is, even if the video changed
//! since. Pass [`ExtractOptions::with_force`] to re-extract.

use std::{
    fs,
    path::{Path, PathBuf},
};

use ffmpeg_next::{
    ChannelLayout, Packet, Rational,
    codec::{Id, context::Context as CodecContext},
    decoder::Audio as AudioDecoder,
    encoder::Audio as AudioEncoder,
    format::{Sample, context::Output, sample::Type as SampleType},
    frame::Audio as AudioFrame,
    software::resampling::Context as ResamplingContext,
};

use crate::{
    configuration::ExtractOptions,
    error::CompareError,
    media::MediaFile,
    progress::{OperationType, ProgressTracker},
};

/// What [`ensure_audio_extracted`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// The target already existed and was left untouched.
    Cached,
    /// The audio track was decoded and written to the target.
    Extracted,
}

/// Derive the audio cache path for a video: same directory and stem, `.wav`
/// extension.
///
/// ```
/// use std::path::Path;
///
/// let path = compare_audio::audio_cache_path("clips/take1.mp4");
/// assert_eq!(path, Path::new("clips/take1.wav"));
/// ```
pub fn audio_cache_path<P: AsRef<Path>>(video_path: P) -> PathBuf {
    video_path.as_ref().with_extension("wav")
}

/// Extract the audio of `video_path` into `target_path` unless the target
/// already exists.
///
/// # Errors
///
/// - [`CompareError::Extraction`] if the container cannot be opened or the
///   track cannot be transcoded.
/// - [`CompareError::NoAudioStream`] if the video has no audio track.
pub fn ensure_audio_extracted<V, T>(
    video_path: V,
    target_path: T,
) -> Result<ExtractionOutcome, CompareError>
where
    V: AsRef<Path>,
    T: AsRef<Path>,
{
    ensure_audio_extracted_with_options(video_path, target_path, &ExtractOptions::default())
}

/// Like [`ensure_audio_extracted`] but honours [`ExtractOptions`] for forced
/// re-extraction and progress reporting.
pub fn ensure_audio_extracted_with_options<V, T>(
    video_path: V,
    target_path: T,
    options: &ExtractOptions,
) -> Result<ExtractionOutcome, CompareError>
where
    V: AsRef<Path>,
    T: AsRef<Path>,
{
    let video_path = video_path.as_ref();
    let target_path = target_path.as_ref();

    if target_path.exists() {
        if !options.force {
            log::info!("Audio file {} already exists, skipping extraction", target_path.display());
            return Ok(ExtractionOutcome::Cached);
        }
        log::info!("Forcing re-extraction over {}", target_path.display());
    }

    log::debug!(
        "Extracting audio from {} to {}",
        video_path.display(),
        target_path.display()
    );

    let mut media = MediaFile::open(video_path)?;

    // Write beside the target and rename on success so a failed run never
    // leaves a truncated file that the cache would later trust.
    let partial_path = target_path.with_extension("partial.wav");
    if let Err(error) = write_pcm_wav(&mut media, &partial_path, options) {
        let _ = fs::remove_file(&partial_path);
        return Err(error);
    }
    fs::rename(&partial_path, target_path)
        .map_err(|error| CompareError::extraction(video_path, error))?;

    log::debug!("Audio extracted to {}", target_path.display());
    Ok(ExtractionOutcome::Extracted)
}

/// Decode the media file's audio stream and write it to `output_path` as
/// `pcm_s16le` WAV at the source rate and channel layout.
fn write_pcm_wav(
    media: &mut MediaFile,
    output_path: &Path,
    options: &ExtractOptions,
) -> Result<(), CompareError> {
    let audio_stream_index = media.require_audio_stream()?;
    let video_path = media.file_path.clone();

    let stream = media
        .input_context
        .stream(audio_stream_index)
        .ok_or_else(|| CompareError::NoAudioStream {
            path: video_path.clone(),
        })?;
    let codec_parameters = stream.parameters();

    let decoder_context = CodecContext::from_parameters(codec_parameters)?;
    let mut decoder = decoder_context
        .decoder()
        .audio()
        .map_err(|error| CompareError::extraction(&video_path, error))?;

    let sample_rate = decoder.rate();
    let channel_layout = decoder.channel_layout();
    let output_sample_format = Sample::I16(SampleType::Packed);

    let mut output_context = ffmpeg_next::format::output_as(&output_path, "wav")
        .map_err(|error| CompareError::extraction(&video_path, error))?;

    let (mut encoder, encoder_time_base) =
        open_pcm_encoder(&video_path, output_sample_format, sample_rate, channel_layout)?;

    {
        let output_codec = ffmpeg_next::encoder::find(Id::PCM_S16LE).ok_or_else(|| {
            CompareError::extraction(&video_path, "pcm_s16le encoder is unavailable")
        })?;
        let mut output_stream = output_context.add_stream(output_codec)?;
        output_stream.set_parameters(&encoder);
        output_stream.set_time_base(encoder_time_base);
    }

    output_context
        .write_header()
        .map_err(|error| CompareError::extraction(&video_path, error))?;
    let output_time_base = output_context
        .stream(0)
        .map(|stream| stream.time_base())
        .unwrap_or(encoder_time_base);

    let mut resampler = ResamplingContext::get(
        decoder.format(),
        decoder.channel_layout(),
        sample_rate,
        output_sample_format,
        channel_layout,
        sample_rate,
    )
    .map_err(|error| CompareError::extraction(&video_path, error))?;

    let expected_frames = media
        .metadata
        .audio
        .as_ref()
        .and_then(|audio| audio.expected_frames(media.metadata.duration));
    let mut tracker = ProgressTracker::new(
        options.progress.clone(),
        OperationType::AudioExtraction,
        video_path.clone(),
        expected_frames,
        options.batch_size,
    );

    let mut pipeline = EncodePipeline {
        resampler: &mut resampler,
        encoder: &mut encoder,
        output_context: &mut output_context,
        resampled_frame: AudioFrame::empty(),
        encoded_packet: Packet::empty(),
        samples_written: 0,
        encoder_time_base,
        output_time_base,
        video_path: &video_path,
    };

    let mut decoded_frame = AudioFrame::empty();

    for (stream, packet) in media.input_context.packets() {
        if stream.index() != audio_stream_index {
            continue;
        }

        decoder
            .send_packet(&packet)
            .map_err(|error| CompareError::extraction(&video_path, error))?;
        drain_decoder(&mut decoder, &mut decoded_frame, &mut pipeline, &mut tracker)?;
    }

    let _ = decoder.send_eof();
    drain_decoder(&mut decoder, &mut decoded_frame, &mut pipeline, &mut tracker)?;
    pipeline.flush()?;

    output_context
        .write_trailer()
        .map_err(|error| CompareError::extraction(&video_path, error))?;

    tracker.finish();
    Ok(())
}

/// Open a PCM encoder matching the source rate and layout.
fn open_pcm_encoder(
    video_path: &Path,
    sample_format: Sample,
    sample_rate: u32,
    channel_layout: ChannelLayout,
) -> Result<(AudioEncoder, Rational), CompareError> {
    let output_codec = ffmpeg_next::encoder::find(Id::PCM_S16LE)
        .ok_or_else(|| CompareError::extraction(video_path, "pcm_s16le encoder is unavailable"))?;

    let mut encoder_context = CodecContext::new()
        .encoder()
        .audio()
        .map_err(|error| CompareError::extraction(video_path, error))?;

    let time_base = Rational(1, sample_rate as i32);
    encoder_context.set_rate(sample_rate as i32);
    encoder_context.set_channel_layout(channel_layout);
    encoder_context.set_format(sample_format);
    encoder_context.set_time_base(time_base);

    let encoder = encoder_context
        .open_as(output_codec)
        .map_err(|error| CompareError::extraction(video_path, error))?;

    Ok((encoder, time_base))
}

/// Pull every frame the decoder has ready and push it through the pipeline.
fn drain_decoder(
    decoder: &mut AudioDecoder,
    decoded_frame: &mut AudioFrame,
    pipeline: &mut EncodePipeline<'_>,
    tracker: &mut ProgressTracker,
) -> Result<(), CompareError> {
    while decoder.receive_frame(decoded_frame).is_ok() {
        let written = pipeline.push(decoded_frame)?;
        tracker.advance_by(written);
    }
    Ok(())
}

/// Resample → encode → mux state for one extraction.
struct EncodePipeline<'a> {
    resampler: &'a mut ResamplingContext,
    encoder: &'a mut AudioEncoder,
    output_context: &'a mut Output,
    resampled_frame: AudioFrame,
    encoded_packet: Packet,
    samples_written: i64,
    encoder_time_base: Rational,
    output_time_base: Rational,
    video_path: &'a Path,
}

impl EncodePipeline<'_> {
    /// Convert one decoded frame and write the resulting packets. Returns
    /// the number of sample frames written.
    fn push(&mut self, decoded_frame: &AudioFrame) -> Result<u64, CompareError> {
        self.resampler
            .run(decoded_frame, &mut self.resampled_frame)
            .map_err(|error| CompareError::extraction(self.video_path, error))?;

        let sample_count = self.resampled_frame.samples();
        self.resampled_frame.set_pts(Some(self.samples_written));
        self.samples_written += sample_count as i64;

        self.encoder
            .send_frame(&self.resampled_frame)
            .map_err(|error| CompareError::extraction(self.video_path, error))?;
        self.write_ready_packets()?;

        Ok(sample_count as u64)
    }

    /// Flush the encoder at end of stream.
    fn flush(&mut self) -> Result<(), CompareError> {
        let _ = self.encoder.send_eof();
        self.write_ready_packets()
    }

    fn write_ready_packets(&mut self) -> Result<(), CompareError> {
        while self.encoder.receive_packet(&mut self.encoded_packet).is_ok() {
            self.encoded_packet.set_stream(0);
            self.encoded_packet
                .rescale_ts(self.encoder_time_base, self.output_time_base);
            self.encoded_packet
                .write_interleaved(self.output_context)
                .map_err(|error| CompareError::extraction(self.video_path, error))?;
        }
        Ok(())
    }
}
