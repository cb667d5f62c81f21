//! Player implementation using rodio.
//!
//! Each `RodioPlayer` keeps the encoded file in memory and builds a fresh
//! `Sink` per play. Completion callbacks and volume fades run on short-lived
//! helper threads that are cancelled by dropping a crossbeam sender.

use std::io::Cursor;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, select, RecvTimeoutError, Sender, TryRecvError};
use parking_lot::Mutex;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tracing::{debug, warn};

use super::asset::AssetIdentity;
use super::error::SoundError;
use super::{Player, PlayerCompletion, PlayerFactory};

/// How often a completion watcher checks whether its sink drained.
const COMPLETION_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Interval between volume updates during a fade.
const FADE_STEP: Duration = Duration::from_millis(20);

type SharedBytes = Arc<[u8]>;

/// The default audio output device.
///
/// The output must stay alive for as long as players created from its
/// factories should be audible.
pub struct RodioOutput {
    /// The audio output stream (must be kept alive for playback).
    _stream: OutputStream,
    /// Handle to the output stream for creating sinks.
    handle: OutputStreamHandle,
}

impl RodioOutput {
    /// Opens the default output device.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output device
    /// is available, or `SoundError::StreamError` if the stream cannot be
    /// opened.
    pub fn try_default() -> Result<Self, SoundError> {
        let (stream, handle) = OutputStream::try_default().map_err(|e| match e {
            rodio::StreamError::NoDevice => SoundError::DeviceNotAvailable(e.to_string()),
            other => SoundError::StreamError(other.to_string()),
        })?;

        debug!("Audio output stream initialized");

        Ok(Self {
            _stream: stream,
            handle,
        })
    }

    /// Returns a factory producing players on this output.
    #[must_use]
    pub fn factory(&self) -> RodioPlayerFactory {
        RodioPlayerFactory::new(self.handle.clone())
    }
}

impl std::fmt::Debug for RodioOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioOutput").finish_non_exhaustive()
    }
}

/// Builds [`RodioPlayer`]s for one output.
#[derive(Clone)]
pub struct RodioPlayerFactory {
    handle: OutputStreamHandle,
}

impl RodioPlayerFactory {
    #[must_use]
    pub fn new(handle: OutputStreamHandle) -> Self {
        Self { handle }
    }
}

impl PlayerFactory for RodioPlayerFactory {
    fn create(&self, asset: &AssetIdentity) -> Result<Arc<dyn Player>, SoundError> {
        let player = RodioPlayer::load(asset, self.handle.clone())?;
        Ok(Arc::new(player))
    }
}

impl std::fmt::Debug for RodioPlayerFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioPlayerFactory").finish_non_exhaustive()
    }
}

/// One in-flight play request.
struct Playback {
    sink: Arc<Sink>,
    /// Dropping this sender cancels the completion watcher.
    cancel: Option<Sender<()>>,
}

impl Playback {
    /// Stops the sink without firing the completion callback.
    fn halt(self) {
        // Cancel first so the watcher never mistakes this stop for a natural end
        drop(self.cancel);
        self.sink.stop();
    }
}

struct PlayerState {
    volume: f32,
    playback: Option<Playback>,
}

impl PlayerState {
    fn apply_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(playback) = &self.playback {
            playback.sink.set_volume(volume);
        }
    }
}

/// A player that decodes with rodio and plays on an output stream.
pub struct RodioPlayer {
    asset: AssetIdentity,
    data: SharedBytes,
    duration: Duration,
    handle: OutputStreamHandle,
    state: Arc<Mutex<PlayerState>>,
    fade_cancel: Mutex<Option<Sender<()>>>,
}

impl RodioPlayer {
    /// Reads and validates `asset`.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::FileNotFound` if the file cannot be read and
    /// `SoundError::DecodeError` if it is empty or not decodable.
    pub fn load(asset: &AssetIdentity, handle: OutputStreamHandle) -> Result<Self, SoundError> {
        let data = std::fs::read(asset.path())
            .map_err(|e| SoundError::FileNotFound(format!("{}: {}", asset, e)))?;
        Self::from_bytes(asset.clone(), data, handle)
    }

    /// Validates already-loaded encoded audio.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DecodeError` if `data` is empty or not decodable.
    pub fn from_bytes(
        asset: AssetIdentity,
        data: Vec<u8>,
        handle: OutputStreamHandle,
    ) -> Result<Self, SoundError> {
        if data.is_empty() {
            return Err(SoundError::DecodeError(format!("{}: empty file", asset)));
        }
        let data: SharedBytes = Arc::from(data);
        let duration = measure_duration(&asset, &data)?;

        debug!("Loaded {} ({:.3}s)", asset, duration.as_secs_f64());

        Ok(Self {
            asset,
            data,
            duration,
            handle,
            state: Arc::new(Mutex::new(PlayerState {
                volume: 1.0,
                playback: None,
            })),
            fade_cancel: Mutex::new(None),
        })
    }

    fn cancel_fade(&self) {
        self.fade_cancel.lock().take();
    }
}

impl Player for RodioPlayer {
    fn play(&self, loops: i32, completion: Option<PlayerCompletion>) -> bool {
        let sink = match Sink::try_new(&self.handle) {
            Ok(sink) => sink,
            Err(e) => {
                let error = SoundError::PlaybackError(e.to_string());
                warn!("Cannot play {}: {}", self.asset, error);
                return false;
            }
        };
        if let Err(e) = queue_loops(&sink, &self.asset, &self.data, loops) {
            warn!("Failed to queue {}: {}", self.asset, e);
            return false;
        }

        let mut state = self.state.lock();
        sink.set_volume(state.volume);
        let sink = Arc::new(sink);
        let cancel = completion.and_then(|c| spawn_completion_watcher(Arc::clone(&sink), c));

        if let Some(previous) = state.playback.replace(Playback { sink, cancel }) {
            previous.halt();
        }
        debug!("Playing {} (loops: {})", self.asset, loops);
        true
    }

    fn stop(&self) {
        let playback = self.state.lock().playback.take();
        if let Some(playback) = playback {
            playback.halt();
        }
    }

    fn pause(&self) {
        if let Some(playback) = &self.state.lock().playback {
            playback.sink.pause();
        }
    }

    fn resume(&self) {
        if let Some(playback) = &self.state.lock().playback {
            playback.sink.play();
        }
    }

    fn prepare(&self) -> bool {
        decode(&self.asset, &self.data).is_ok()
    }

    fn volume(&self) -> f32 {
        self.state.lock().volume
    }

    fn set_volume(&self, volume: f32) {
        self.cancel_fade();
        self.state.lock().apply_volume(volume.clamp(0.0, 1.0));
    }

    fn fade_volume(&self, target: f32, duration: Duration) {
        let target = target.clamp(0.0, 1.0);
        self.cancel_fade();
        if duration.is_zero() {
            self.state.lock().apply_volume(target);
            return;
        }

        match spawn_fade(Arc::clone(&self.state), target, duration) {
            Ok(cancel) => *self.fade_cancel.lock() = Some(cancel),
            Err(e) => {
                warn!("Failed to start fade for {}: {}", self.asset, e);
                self.state.lock().apply_volume(target);
            }
        }
    }

    fn duration(&self) -> Duration {
        self.duration
    }

    fn current_time(&self) -> Duration {
        self.state
            .lock()
            .playback
            .as_ref()
            .map_or(Duration::ZERO, |p| p.sink.get_pos())
    }

    fn set_current_time(&self, position: Duration) {
        if let Some(playback) = &self.state.lock().playback {
            if let Err(e) = playback.sink.try_seek(position) {
                debug!("Seek failed for {}: {:?}", self.asset, e);
            }
        }
    }

    fn is_playing(&self) -> bool {
        self.state
            .lock()
            .playback
            .as_ref()
            .is_some_and(|p| !p.sink.empty() && !p.sink.is_paused())
    }
}

impl Drop for RodioPlayer {
    fn drop(&mut self) {
        self.cancel_fade();
        if let Some(playback) = self.state.lock().playback.take() {
            playback.halt();
        }
    }
}

impl std::fmt::Debug for RodioPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioPlayer")
            .field("asset", &self.asset)
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}

fn decode(asset: &AssetIdentity, data: &SharedBytes) -> Result<Decoder<Cursor<SharedBytes>>, SoundError> {
    Decoder::new(Cursor::new(Arc::clone(data)))
        .map_err(|e| SoundError::DecodeError(format!("{}: {}", asset, e)))
}

/// Appends one decoder per repetition: `loops + 1` of them, or a single
/// endlessly repeating one when `loops` is negative.
fn queue_loops(
    sink: &Sink,
    asset: &AssetIdentity,
    data: &SharedBytes,
    loops: i32,
) -> Result<(), SoundError> {
    if loops < 0 {
        sink.append(decode(asset, data)?.repeat_infinite());
    } else {
        for _ in 0..=loops {
            sink.append(decode(asset, data)?);
        }
    }
    Ok(())
}

/// Ramps the volume linearly from its current value to `target`.
///
/// Dropping the returned sender stops the ramp. A step that raced with the
/// cancellation is discarded once the state lock is held.
fn spawn_fade(
    state: Arc<Mutex<PlayerState>>,
    target: f32,
    duration: Duration,
) -> std::io::Result<Sender<()>> {
    let start = state.lock().volume;
    let steps = u32::try_from(duration.as_millis() / FADE_STEP.as_millis())
        .unwrap_or(u32::MAX)
        .max(1);
    let step = duration / steps;
    let (cancel_tx, cancel_rx) = bounded::<()>(0);

    thread::Builder::new()
        .name("soundpool-fade".to_string())
        .spawn(move || {
            for i in 1..=steps {
                match cancel_rx.recv_timeout(step) {
                    Err(RecvTimeoutError::Timeout) => {}
                    _ => return,
                }
                let mut guard = state.lock();
                if matches!(cancel_rx.try_recv(), Err(TryRecvError::Disconnected)) {
                    return;
                }
                let volume = start + (target - start) * (i as f32 / steps as f32);
                guard.apply_volume(volume);
            }
        })?;

    Ok(cancel_tx)
}

/// Backend-reported length, falling back to counting samples.
fn measure_duration(asset: &AssetIdentity, data: &SharedBytes) -> Result<Duration, SoundError> {
    let decoder = decode(asset, data)?;
    if let Some(duration) = decoder.total_duration() {
        return Ok(duration);
    }
    let frame_rate = u64::from(decoder.channels().max(1)) * u64::from(decoder.sample_rate().max(1));
    let samples = decoder.count() as u64;
    Ok(Duration::from_secs_f64(samples as f64 / frame_rate as f64))
}

/// Fires `completion` once the sink drains, unless cancelled first.
///
/// Returns the cancel sender, or `None` if the thread could not start.
fn spawn_completion_watcher(sink: Arc<Sink>, completion: PlayerCompletion) -> Option<Sender<()>> {
    let (cancel_tx, cancel_rx) = bounded::<()>(0);
    let mut completion = Some(completion);

    let spawned = thread::Builder::new()
        .name("soundpool-completion".to_string())
        .spawn(move || loop {
            select! {
                recv(cancel_rx) -> _ => return,
                default(COMPLETION_POLL_INTERVAL) => {
                    if sink.empty() {
                        if matches!(cancel_rx.try_recv(), Err(TryRecvError::Disconnected)) {
                            return;
                        }
                        if let Some(completion) = completion.take() {
                            completion(true);
                        }
                        return;
                    }
                }
            }
        });

    match spawned {
        Ok(_) => Some(cancel_tx),
        Err(e) => {
            warn!("Failed to start completion watcher: {}", e);
            None
        }
    }
}
