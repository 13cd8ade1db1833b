//! Periodic frame capture.
//!
//! Platform capture APIs sit behind [`CaptureBackend`]. A [`BackendChain`]
//! holds backends in priority order (e.g. hardware duplication, then the
//! compositor, then a plain blit) and falls back on every grab.
//! [`CaptureLoop`] grabs on a fixed millisecond interval, crops to the
//! current [`CaptureRegion`], and hands each frame to a callback.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::MissedTickBehavior;

use difftrail_blend::Frame;
use difftrail_common::error::{DifftrailError, DifftrailResult};

/// Default grab interval in milliseconds (~60 Hz).
pub const DEFAULT_INTERVAL_MS: u64 = 16;

/// Abstract interface for a source of live frames.
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Short identifier used in logs and errors.
    fn name(&self) -> &str;

    /// Acquire whatever the backend needs (device handles, permissions).
    async fn init(&mut self) -> DifftrailResult<()>;

    /// Grab the next frame. `Ok(None)` means the source has ended.
    async fn grab(&mut self) -> DifftrailResult<Option<Frame>>;

    /// Release resources when capture ends.
    async fn shutdown(&mut self) -> DifftrailResult<()> {
        Ok(())
    }
}

/// Rectangle, in source pixels, that frames are cropped to before delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CaptureRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Crop `frame` to the region, clipped to the frame bounds.
    pub fn apply(&self, frame: &Frame) -> DifftrailResult<Frame> {
        frame
            .crop(self.x, self.y, self.width, self.height)
            .map_err(|e| DifftrailError::capture(e.to_string()))
    }
}

impl std::str::FromStr for CaptureRegion {
    type Err = DifftrailError;

    /// Parses `X,Y,WIDTH,HEIGHT`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [x, y, w, h] = parts.as_slice() else {
            return Err(DifftrailError::config(format!(
                "capture region '{s}' must be X,Y,WIDTH,HEIGHT"
            )));
        };
        let num = |v: &str| {
            v.parse::<u32>().map_err(|_| {
                DifftrailError::config(format!("capture region '{s}': '{v}' is not a number"))
            })
        };
        Ok(Self::new(num(*x)?, num(*y)?, num(*w)?, num(*h)?))
    }
}

/// Ordered list of backends, itself usable as a backend.
///
/// `init` keeps every backend that initializes. Each `grab` asks them in
/// priority order and returns the first frame, so losing the preferred
/// source mid-capture falls through to the next one on the same tick.
#[derive(Default)]
pub struct BackendChain {
    backends: Vec<Box<dyn CaptureBackend>>,
    current: usize,
}

impl BackendChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a backend with lower priority than those already added.
    pub fn with(mut self, backend: Box<dyn CaptureBackend>) -> Self {
        self.backends.push(backend);
        self
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Initialize the chain and box it for a [`CaptureLoop`].
    pub async fn select(mut self) -> DifftrailResult<Box<dyn CaptureBackend>> {
        self.init().await?;
        Ok(Box::new(self))
    }
}

#[async_trait::async_trait]
impl CaptureBackend for BackendChain {
    /// Name of the backend that delivered the last frame.
    fn name(&self) -> &str {
        self.backends
            .get(self.current)
            .map_or("chain", |backend| backend.name())
    }

    async fn init(&mut self) -> DifftrailResult<()> {
        let mut failures = Vec::new();
        let mut ready = Vec::new();
        for mut backend in std::mem::take(&mut self.backends) {
            match backend.init().await {
                Ok(()) => {
                    tracing::info!(backend = backend.name(), "Capture backend ready");
                    ready.push(backend);
                }
                Err(e) => {
                    tracing::warn!("Capture backend {} unavailable: {}", backend.name(), e);
                    failures.push(format!("{}: {e}", backend.name()));
                }
            }
        }
        self.backends = ready;
        self.current = 0;

        if !self.backends.is_empty() {
            return Ok(());
        }
        if failures.is_empty() {
            return Err(DifftrailError::capture("no capture backends configured"));
        }
        Err(DifftrailError::capture(format!(
            "no capture backend available ({})",
            failures.join("; ")
        )))
    }

    async fn grab(&mut self) -> DifftrailResult<Option<Frame>> {
        let mut failures = Vec::new();
        for (idx, backend) in self.backends.iter_mut().enumerate() {
            match backend.grab().await {
                Ok(frame) => {
                    if idx != self.current {
                        tracing::info!(backend = backend.name(), "Capture switched backend");
                        self.current = idx;
                    }
                    return Ok(frame);
                }
                Err(e) => {
                    tracing::debug!("Capture backend {} failed: {}", backend.name(), e);
                    failures.push(format!("{}: {e}", backend.name()));
                }
            }
        }
        if failures.is_empty() {
            return Err(DifftrailError::capture("no capture backend initialized"));
        }
        Err(DifftrailError::capture(format!(
            "every capture backend failed ({})",
            failures.join("; ")
        )))
    }

    async fn shutdown(&mut self) -> DifftrailResult<()> {
        let mut result = Ok(());
        for backend in &mut self.backends {
            if let Err(e) = backend.shutdown().await {
                tracing::warn!("Capture backend {} shutdown failed: {}", backend.name(), e);
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }
}

/// Replays pre-loaded frames as if they were being captured.
#[derive(Debug, Clone)]
pub struct SequenceBackend {
    frames: Vec<Frame>,
    cursor: usize,
    looping: bool,
}

impl SequenceBackend {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            cursor: 0,
            looping: false,
        }
    }

    /// Restart from the first frame instead of ending.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }
}

#[async_trait::async_trait]
impl CaptureBackend for SequenceBackend {
    fn name(&self) -> &str {
        "sequence"
    }

    async fn init(&mut self) -> DifftrailResult<()> {
        if self.frames.is_empty() {
            return Err(DifftrailError::capture("sequence has no frames"));
        }
        self.cursor = 0;
        Ok(())
    }

    async fn grab(&mut self) -> DifftrailResult<Option<Frame>> {
        if self.cursor >= self.frames.len() {
            if !self.looping || self.frames.is_empty() {
                return Ok(None);
            }
            self.cursor = 0;
        }
        let frame = self.frames[self.cursor].clone();
        self.cursor += 1;
        Ok(Some(frame))
    }
}

/// Parameters for a capture loop.
#[derive(Debug, Clone)]
pub struct CaptureLoopConfig {
    pub interval: Duration,
    pub region: Option<CaptureRegion>,
    /// Stop after delivering this many frames.
    pub max_frames: Option<u64>,
}

impl Default for CaptureLoopConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            region: None,
            max_frames: None,
        }
    }
}

/// Counters reported when a loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStats {
    pub frames: u64,
    pub errors: u64,
}

/// Cloneable handle for steering a running [`CaptureLoop`] from elsewhere.
#[derive(Debug, Clone, Default)]
pub struct CaptureControl {
    stop: Arc<AtomicBool>,
    region: Arc<Mutex<Option<CaptureRegion>>>,
    last_frame: Arc<Mutex<Option<Frame>>>,
}

impl CaptureControl {
    /// End the loop at the next tick.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Crop frames grabbed from the next tick on.
    pub fn set_region(&self, region: CaptureRegion) {
        *lock(&self.region) = Some(region);
    }

    /// Deliver whole frames again.
    pub fn reset_region(&self) {
        *lock(&self.region) = None;
    }

    pub fn region(&self) -> Option<CaptureRegion> {
        *lock(&self.region)
    }

    /// The most recently delivered frame, after cropping.
    pub fn last_frame(&self) -> Option<Frame> {
        lock(&self.last_frame).clone()
    }

    fn record(&self, frame: &Frame) {
        *lock(&self.last_frame) = Some(frame.clone());
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Grabs frames on a fixed interval until stopped.
pub struct CaptureLoop {
    backend: Box<dyn CaptureBackend>,
    config: CaptureLoopConfig,
    control: CaptureControl,
}

impl CaptureLoop {
    /// `backend` must already be initialized (see [`BackendChain::select`]).
    /// `config.region` is the starting region; change it through
    /// [`control`](Self::control).
    pub fn new(backend: Box<dyn CaptureBackend>, config: CaptureLoopConfig) -> Self {
        let control = CaptureControl::default();
        if let Some(region) = config.region {
            control.set_region(region);
        }
        Self {
            backend,
            config,
            control,
        }
    }

    pub fn control(&self) -> CaptureControl {
        self.control.clone()
    }

    /// Flag that ends the loop at the next tick when set.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.control.stop)
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Run until the stop flag is raised, `max_frames` is reached, or the
    /// source ends. Grab failures go to `on_error` and capture continues.
    pub async fn run<F, E>(&mut self, mut on_frame: F, mut on_error: E) -> DifftrailResult<CaptureStats>
    where
        F: FnMut(Frame) + Send,
        E: FnMut(&DifftrailError) + Send,
    {
        let period = self.config.interval.max(Duration::from_millis(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut stats = CaptureStats::default();

        tracing::info!(
            backend = self.backend.name(),
            interval_ms = period.as_millis() as u64,
            "Capture started"
        );

        loop {
            if self.control.is_stopped() {
                break;
            }
            if self
                .config
                .max_frames
                .is_some_and(|max| stats.frames >= max)
            {
                break;
            }

            ticker.tick().await;

            let grabbed = match self.backend.grab().await {
                Ok(Some(frame)) => match self.control.region() {
                    Some(region) => region.apply(&frame).map(Some),
                    None => Ok(Some(frame)),
                },
                Ok(None) => Ok(None),
                Err(e) => Err(e),
            };

            match grabbed {
                Ok(Some(frame)) => {
                    stats.frames += 1;
                    self.control.record(&frame);
                    on_frame(frame);
                }
                Ok(None) => {
                    tracing::info!("Capture source ended");
                    break;
                }
                Err(e) => {
                    stats.errors += 1;
                    tracing::warn!("Capture failed: {}", e);
                    on_error(&e);
                }
            }
        }

        self.backend.shutdown().await?;
        tracing::info!(
            frames = stats.frames,
            errors = stats.errors,
            "Capture stopped"
        );
        Ok(stats)
    }
}
