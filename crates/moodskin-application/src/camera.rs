//! Camera controller and sampler.
//!
//! The controller exclusively owns the camera stream while it is active. The
//! stream sits behind a guard that releases the device in `Drop`, so stop,
//! controller drop, sampler exit and failed acquisitions all release it.

use moodskin_core::camera::{CameraDevice, Frame, FrameSource};
use moodskin_core::error::Result;
use moodskin_core::inference::FacialMoodInference;
use moodskin_core::notice::Notice;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::mood_session::{DisplayState, MoodSession};

/// Owns an acquired frame source and releases it exactly once.
struct CameraStream {
    /// Distinguishes this acquisition from earlier ones.
    id: u64,
    source: Option<Box<dyn FrameSource>>,
}

impl CameraStream {
    fn new(id: u64, source: Box<dyn FrameSource>) -> Self {
        Self {
            id,
            source: Some(source),
        }
    }

    async fn capture(&mut self) -> Result<Frame> {
        match self.source.as_mut() {
            Some(source) => source.capture().await,
            None => Err(Notice::CameraInactive.into()),
        }
    }

    fn release(&mut self) {
        if let Some(mut source) = self.source.take() {
            source.release();
            tracing::debug!("Camera stream released");
        }
    }
}

impl Drop for CameraStream {
    fn drop(&mut self) {
        self.release();
    }
}

/// Result of one camera sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleOutcome {
    Applied(DisplayState),
    /// No face in frame; the display is unchanged.
    NoFace,
}

/// Event emitted by a running sampler, one per tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleEvent {
    Sampled(SampleOutcome),
    Failed(Notice),
}

pub struct CameraController {
    device: Arc<dyn CameraDevice>,
    facial: Arc<dyn FacialMoodInference>,
    session: Arc<MoodSession>,
    stream: Mutex<Option<CameraStream>>,
    next_stream_id: AtomicU64,
}

impl CameraController {
    pub fn new(
        device: Arc<dyn CameraDevice>,
        facial: Arc<dyn FacialMoodInference>,
        session: Arc<MoodSession>,
    ) -> Self {
        Self {
            device,
            facial,
            session,
            stream: Mutex::new(None),
            next_stream_id: AtomicU64::new(1),
        }
    }

    pub async fn is_active(&self) -> bool {
        self.stream.lock().await.is_some()
    }

    /// Acquires the camera. On failure the camera stays inactive.
    pub async fn start(&self) -> Result<()> {
        let mut stream = self.stream.lock().await;
        if stream.is_some() {
            return Ok(());
        }

        match self.device.open().await {
            Ok(source) => {
                let id = self.next_stream_id.fetch_add(1, Ordering::Relaxed);
                *stream = Some(CameraStream::new(id, source));
                tracing::info!("Camera started");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Camera acquisition failed");
                Err(e)
            }
        }
    }

    /// Releases the camera if it is active.
    pub async fn stop(&self) {
        if self.stream.lock().await.take().is_some() {
            tracing::info!("Camera stopped");
        }
    }

    /// Captures one frame, classifies it and applies the result.
    ///
    /// A capture failure stops the camera. If the camera is stopped or
    /// restarted while inference is in flight, the result is dropped and
    /// `CameraInactive` is returned.
    pub async fn sample_once(&self) -> Result<SampleOutcome> {
        let (stream_id, frame) = {
            let mut guard = self.stream.lock().await;
            let stream = guard.as_mut().ok_or(Notice::CameraInactive)?;
            match stream.capture().await {
                Ok(frame) => (stream.id, frame),
                Err(e) => {
                    tracing::warn!(error = %e, "Frame capture failed; stopping camera");
                    guard.take();
                    return Err(e);
                }
            }
        };

        let sample = self.facial.analyze(&frame).await.map_err(|e| {
            tracing::warn!(provider = self.facial.provider(), error = %e, "Facial inference failed");
            e
        })?;

        // Held while applying so a concurrent stop() waits for us.
        let guard = self.stream.lock().await;
        if guard.as_ref().map(|stream| stream.id) != Some(stream_id) {
            tracing::debug!("Camera stopped during inference; dropping sample");
            return Err(Notice::CameraInactive.into());
        }

        let resolution = self.session.resolver().resolve_from_facial_expression(&sample);
        match self.session.apply_resolution(&resolution).await {
            Some(state) => Ok(SampleOutcome::Applied(state)),
            None => Ok(SampleOutcome::NoFace),
        }
    }

    /// Starts periodic sampling every `interval`.
    ///
    /// Each tick awaits its inference before the next tick is considered and
    /// missed ticks are skipped, so at most one inference is in flight. The
    /// task stops after `max_ticks` samples (if set), on cancellation, or when
    /// the camera fails or is stopped; the camera is released when it ends.
    pub fn spawn_sampler(
        self: &Arc<Self>,
        interval: Duration,
        max_ticks: Option<u64>,
        events: Option<mpsc::UnboundedSender<SampleEvent>>,
    ) -> CameraSampler {
        let token = CancellationToken::new();
        let controller = Arc::clone(self);
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut ticks = 0u64;

            loop {
                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let event = match controller.sample_once().await {
                    Ok(outcome) => SampleEvent::Sampled(outcome),
                    Err(e) => SampleEvent::Failed(e.user_notice()),
                };
                let camera_gone = matches!(
                    event,
                    SampleEvent::Failed(Notice::CameraInactive | Notice::CameraUnavailable)
                );
                if let Some(events) = &events {
                    let _ = events.send(event);
                }

                ticks += 1;
                if camera_gone || max_ticks.is_some_and(|max| ticks >= max) {
                    break;
                }
            }

            controller.stop().await;
            ticks
        });

        CameraSampler { token, handle }
    }
}

/// Handle to a running sampler task.
pub struct CameraSampler {
    token: CancellationToken,
    handle: JoinHandle<u64>,
}

impl CameraSampler {
    /// Cancels sampling and waits for the task to release the camera.
    /// Returns the number of completed ticks.
    pub async fn stop(self) -> u64 {
        self.token.cancel();
        self.join().await
    }

    /// Waits for the sampler to finish on its own.
    pub async fn join(self) -> u64 {
        self.handle.await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Camera sampler task failed");
            0
        })
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use moodskin_core::CanonicalMood;
    use moodskin_core::MoodskinError;
    use moodskin_core::inference::{
        FacialSample, LabelScore, TextInference, TextMoodInference,
    };
    use moodskin_core::mood::MoodResolver;
    use std::sync::atomic::{AtomicBool, AtomicUsize};

    #[derive(Default)]
    struct DeviceStats {
        opens: AtomicUsize,
        releases: AtomicUsize,
        captures: AtomicUsize,
    }

    struct FakeCamera {
        stats: Arc<DeviceStats>,
        deny: bool,
    }

    struct FakeSource {
        stats: Arc<DeviceStats>,
    }

    #[async_trait]
    impl CameraDevice for FakeCamera {
        async fn open(&self) -> Result<Box<dyn FrameSource>> {
            if self.deny {
                return Err(MoodskinError::camera("permission denied"));
            }
            self.stats.opens.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeSource {
                stats: self.stats.clone(),
            }))
        }
    }

    #[async_trait]
    impl FrameSource for FakeSource {
        async fn capture(&mut self) -> Result<Frame> {
            self.stats.captures.fetch_add(1, Ordering::SeqCst);
            Ok(Frame::new(vec![0xff, 0xd8], "image/jpeg"))
        }

        fn release(&mut self) {
            self.stats.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Returns `happy` unless `no_face` is set; each call takes `latency`.
    struct FakeFacial {
        no_face: AtomicBool,
        latency: Duration,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl FakeFacial {
        fn new(latency: Duration) -> Self {
            Self {
                no_face: AtomicBool::new(false),
                latency,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl FacialMoodInference for FakeFacial {
        fn provider(&self) -> &str {
            "fake"
        }

        async fn analyze(&self, _frame: &Frame) -> Result<FacialSample> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.latency).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.no_face.load(Ordering::SeqCst) {
                Ok(FacialSample::NoFace)
            } else {
                Ok(FacialSample::Expressions(vec![
                    LabelScore::new("neutral", 0.1),
                    LabelScore::new("happy", 0.8),
                ]))
            }
        }
    }

    struct NoText;

    #[async_trait]
    impl TextMoodInference for NoText {
        fn provider(&self) -> &str {
            "none"
        }

        async fn classify(&self, _text: &str) -> Result<TextInference> {
            Ok(TextInference::Scores(Vec::new()))
        }
    }

    fn controller(
        deny: bool,
        facial: Arc<FakeFacial>,
    ) -> (Arc<CameraController>, Arc<DeviceStats>, Arc<MoodSession>) {
        let stats = Arc::new(DeviceStats::default());
        let session = Arc::new(MoodSession::new(MoodResolver::default(), Arc::new(NoText)));
        let camera = FakeCamera {
            stats: stats.clone(),
            deny,
        };
        let controller = Arc::new(CameraController::new(
            Arc::new(camera),
            facial,
            session.clone(),
        ));
        (controller, stats, session)
    }

    #[tokio::test]
    async fn test_sample_without_camera_is_inactive_notice() {
        let (controller, _, _) = controller(false, Arc::new(FakeFacial::new(Duration::ZERO)));
        let err = controller.sample_once().await.unwrap_err();
        assert_eq!(err.as_notice(), Some(Notice::CameraInactive));
    }

    #[tokio::test]
    async fn test_acquisition_failure_leaves_camera_inactive() {
        let (controller, stats, _) = controller(true, Arc::new(FakeFacial::new(Duration::ZERO)));
        let err = controller.start().await.unwrap_err();
        assert_eq!(err.user_notice(), Notice::CameraUnavailable);
        assert!(!controller.is_active().await);
        assert_eq!(stats.releases.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sample_applies_mood() {
        let (controller, _, session) = controller(false, Arc::new(FakeFacial::new(Duration::ZERO)));
        controller.start().await.unwrap();

        let outcome = controller.sample_once().await.unwrap();
        assert_eq!(
            outcome,
            SampleOutcome::Applied(DisplayState::for_mood(Some(CanonicalMood::Joy)))
        );
        assert_eq!(session.current().await.mood, Some(CanonicalMood::Joy));
    }

    #[tokio::test]
    async fn test_no_face_leaves_state_unchanged() {
        let facial = Arc::new(FakeFacial::new(Duration::ZERO));
        facial.no_face.store(true, Ordering::SeqCst);
        let (controller, _, session) = controller(false, facial);
        session.set_mood(Some(CanonicalMood::Fear)).await;
        controller.start().await.unwrap();

        assert_eq!(controller.sample_once().await.unwrap(), SampleOutcome::NoFace);
        assert_eq!(session.current().await.mood, Some(CanonicalMood::Fear));
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_sample_after_stop_is_dropped() {
        let facial = Arc::new(FakeFacial::new(Duration::from_millis(1_000)));
        let (controller, _, session) = controller(false, facial);
        session.set_mood(Some(CanonicalMood::Fear)).await;

        for restart in [false, true] {
            controller.start().await.unwrap();
            let in_flight = {
                let controller = controller.clone();
                tokio::spawn(async move { controller.sample_once().await })
            };
            tokio::time::sleep(Duration::from_millis(10)).await;
            controller.stop().await;
            if restart {
                controller.start().await.unwrap();
            }

            let err = in_flight.await.unwrap().unwrap_err();
            assert_eq!(err.as_notice(), Some(Notice::CameraInactive));
            assert_eq!(session.current().await.mood, Some(CanonicalMood::Fear));
            controller.stop().await;
        }
    }

    #[tokio::test]
    async fn test_stop_and_drop_release_once() {
        let (controller, stats, _) = controller(false, Arc::new(FakeFacial::new(Duration::ZERO)));
        controller.start().await.unwrap();
        controller.start().await.unwrap();
        controller.stop().await;
        controller.stop().await;
        assert_eq!(stats.opens.load(Ordering::SeqCst), 1);
        assert_eq!(stats.releases.load(Ordering::SeqCst), 1);

        controller.start().await.unwrap();
        drop(controller);
        assert_eq!(stats.releases.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sampler_stops_after_max_ticks_and_releases() {
        let (controller, stats, _) = controller(false, Arc::new(FakeFacial::new(Duration::ZERO)));
        controller.start().await.unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let sampler = controller.spawn_sampler(Duration::from_millis(800), Some(3), Some(tx));

        assert_eq!(sampler.join().await, 3);
        assert!(!controller.is_active().await);
        assert_eq!(stats.releases.load(Ordering::SeqCst), 1);

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], SampleEvent::Sampled(SampleOutcome::Applied(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sampler_cancel_releases_camera() {
        let (controller, stats, _) = controller(false, Arc::new(FakeFacial::new(Duration::ZERO)));
        controller.start().await.unwrap();

        let sampler = controller.spawn_sampler(Duration::from_millis(800), None, None);
        tokio::time::sleep(Duration::from_millis(2_000)).await;
        let ticks = sampler.stop().await;

        assert!(ticks >= 2);
        assert!(!controller.is_active().await);
        assert_eq!(stats.releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_inference_skips_ticks() {
        let facial = Arc::new(FakeFacial::new(Duration::from_millis(2_000)));
        let (controller, stats, _) = controller(false, facial.clone());
        controller.start().await.unwrap();

        let sampler = controller.spawn_sampler(Duration::from_millis(800), None, None);
        tokio::time::sleep(Duration::from_millis(5_000)).await;
        let ticks = sampler.stop().await;

        assert_eq!(facial.max_in_flight.load(Ordering::SeqCst), 1);
        assert!(ticks <= 3, "ticks = {ticks}");
        assert!(stats.captures.load(Ordering::SeqCst) as u64 <= ticks + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sampler_ends_when_camera_inactive() {
        let (controller, _, _) = controller(false, Arc::new(FakeFacial::new(Duration::ZERO)));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let sampler = controller.spawn_sampler(Duration::from_millis(800), None, Some(tx));

        assert_eq!(sampler.join().await, 1);
        assert_eq!(rx.try_recv().unwrap(), SampleEvent::Failed(Notice::CameraInactive));
    }
}
