// Copyright (C) 2025 Joshua Kesler
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

pub mod deferred;
pub mod layout;
pub mod record_button;
pub mod timer;
pub mod view;

use crate::capability::{CameraCapability, CaptureOutcome, CaptureToken, Facing, RecordOptions, VideoAsset};
use deferred::DeferredQueue;
use std::time::Instant;
use timer::ElapsedTimer;
use tracing::{debug, error, info, warn};

pub type CompletionCallback = Box<dyn FnOnce(VideoAsset)>;

#[derive(Debug, Clone, PartialEq)]
pub enum CapturePhase {
    Idle,
    Starting,
    Recording,
    Stopping,
    Complete(VideoAsset)
}

/// User intents raised by the overlay's controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayIntent {
    Start,
    Stop,
    Flip,
    Confirm,
    Close
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    Ready,
    BeginCapture(CaptureToken),
    EndCapture
}

/// Modal recorder state: one session per open/close cycle.
pub struct VideoCaptureOverlay<C: CameraCapability> {
    camera: Option<C>,
    options: RecordOptions,
    visible: bool,
    ready: bool,
    elapsed_seconds: u64,
    phase: CapturePhase,
    facing: Facing,
    on_complete: Option<CompletionCallback>,
    timer: Option<ElapsedTimer>,
    deferred: DeferredQueue<Deferred>,
    token: CaptureToken,
    capture_live: bool
}

impl<C: CameraCapability> VideoCaptureOverlay<C> {
    pub fn new(options: RecordOptions) -> Self {
        Self {
            camera: None,
            options,
            visible: false,
            ready: false,
            elapsed_seconds: 0,
            phase: CapturePhase::Idle,
            facing: Facing::default(),
            on_complete: None,
            timer: None,
            deferred: DeferredQueue::default(),
            token: CaptureToken::default(),
            capture_live: false
        }
    }

    /// Initial visibility, only meaningful before the first `open`/`close`.
    pub fn with_initial_open(mut self, open: bool) -> Self {
        self.visible = open;
        self
    }

    pub fn with_facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    /// Takes ownership of the camera handle. The overlay becomes ready once
    /// the next deferred batch runs.
    pub fn mount(&mut self, mut camera: C) {
        camera.set_facing(self.facing);
        self.unmount();
        self.camera = Some(camera);
        self.deferred.push(Deferred::Ready);
    }

    /// Releases the camera handle, stopping any capture it is still running.
    pub fn unmount(&mut self) -> Option<C> {
        self.timer = None;
        self.release_capture();
        self.ready = false;
        self.deferred.retain(|_| false);
        self.camera.take()
    }

    pub fn open(&mut self, on_complete: impl FnOnce(VideoAsset) + 'static) {
        self.present(Some(Box::new(on_complete)));
    }

    /// Opens without a completion callback; confirming just closes.
    pub fn open_detached(&mut self) {
        self.present(None);
    }

    fn present(&mut self, on_complete: Option<CompletionCallback>) {
        self.reset_session();
        self.on_complete = on_complete;
        self.visible = true;
        info!(token = %self.token, "overlay opened");
    }

    pub fn close(&mut self) {
        if self.visible {
            info!(token = %self.token, "overlay closed");
        }
        self.reset_session();
        self.on_complete = None;
        self.visible = false;
    }

    pub fn confirm(&mut self) {
        let asset = match std::mem::replace(&mut self.phase, CapturePhase::Idle) {
            CapturePhase::Complete(asset) => asset,
            other => {
                debug!(phase = ?other, "confirm ignored, nothing recorded");
                self.phase = other;
                return;
            }
        };

        match self.on_complete.take() {
            Some(callback) => callback(asset),
            None => {
                debug!(path = %asset.path.display(), "no completion callback, take dropped");
                self.discard(asset);
            }
        }
        self.close();
    }

    pub fn flip(&mut self) {
        self.facing = self.facing.flipped();
        if let Some(camera) = self.camera.as_mut() {
            camera.set_facing(self.facing);
        }
        debug!(facing = %self.facing, "camera flipped");
    }

    pub fn start(&mut self) {
        if !self.visible {
            return;
        }
        if self.is_recording() {
            debug!("start ignored, already recording");
            return;
        }

        self.token = self.token.next();
        self.timer = None;
        self.elapsed_seconds = 0;
        self.discard_pending();
        self.phase = CapturePhase::Starting;
        self.deferred.push(Deferred::BeginCapture(self.token));
    }

    pub fn stop(&mut self) {
        if !self.is_recording() {
            return;
        }

        self.timer = None;
        self.phase = CapturePhase::Stopping;
        self.deferred.push(Deferred::EndCapture);
    }

    pub fn handle(&mut self, intent: OverlayIntent) {
        match intent {
            OverlayIntent::Start => self.start(),
            OverlayIntent::Stop => self.stop(),
            OverlayIntent::Flip => self.flip(),
            OverlayIntent::Confirm => self.confirm(),
            OverlayIntent::Close => self.close()
        }
    }

    /// Runs deferred work, advances the timer and applies capture results.
    /// Call once per frame after input has been handled.
    pub fn pump(&mut self, now: Instant) {
        for task in self.deferred.take_batch() {
            self.run_deferred(task, now);
        }

        if let Some(timer) = self.timer.as_mut() {
            let ticks = timer.poll(now);
            self.elapsed_seconds += ticks;
        }

        while let Some(outcome) = self.camera.as_mut().and_then(|c| c.poll_outcome()) {
            self.apply_outcome(outcome);
        }
    }

    fn run_deferred(&mut self, task: Deferred, now: Instant) {
        match task {
            Deferred::Ready => self.ready = true,
            Deferred::BeginCapture(token) => self.begin_capture(token, now),
            Deferred::EndCapture => self.release_capture()
        }
    }

    fn begin_capture(&mut self, token: CaptureToken, now: Instant) {
        if token != self.token {
            debug!(%token, "stale capture start dropped");
            return;
        }

        let Some(camera) = self.camera.as_mut() else {
            warn!("record requested without a mounted camera");
            self.phase = CapturePhase::Idle;
            return;
        };

        if let Err(e) = camera.start_recording(self.options, token) {
            error!(error = %e, %token, "video capture failed to start");
            self.phase = CapturePhase::Idle;
            return;
        }

        self.capture_live = true;
        if self.phase == CapturePhase::Starting {
            self.phase = CapturePhase::Recording;
            self.timer = Some(ElapsedTimer::start(now));
        }
        info!(%token, quality = %self.options.quality, aspect = %self.options.aspect_ratio, "recording started");
    }

    fn release_capture(&mut self) {
        if !self.capture_live {
            return;
        }
        if let Some(camera) = self.camera.as_mut() {
            camera.stop_recording();
        }
        self.capture_live = false;
    }

    fn apply_outcome(&mut self, outcome: CaptureOutcome) {
        if outcome.token != self.token {
            debug!(token = %outcome.token, current = %self.token, "discarding capture result from an earlier session");
            if let Ok(asset) = outcome.result {
                self.discard(asset);
            }
            return;
        }
        if !matches!(self.phase, CapturePhase::Recording | CapturePhase::Stopping) {
            debug!(phase = ?self.phase, "discarding unexpected capture result");
            if let Ok(asset) = outcome.result {
                self.discard(asset);
            }
            return;
        }

        // The capability may still be feeding a take that already ended.
        self.timer = None;
        self.release_capture();
        match outcome.result {
            Ok(asset) => {
                info!(path = %asset.path.display(), seconds = asset.duration.as_secs_f64(), "video captured");
                self.phase = CapturePhase::Complete(asset);
            }
            Err(e) => {
                error!(error = %e, token = %outcome.token, "video capture failed");
                self.phase = CapturePhase::Idle;
            }
        }
    }

    fn discard_pending(&mut self) {
        if let CapturePhase::Complete(asset) = std::mem::replace(&mut self.phase, CapturePhase::Idle) {
            self.discard(asset);
        }
    }

    fn discard(&mut self, asset: VideoAsset) {
        debug!(path = %asset.path.display(), "discarding unused take");
        if let Some(camera) = self.camera.as_mut() {
            camera.discard(asset);
        }
    }

    fn reset_session(&mut self) {
        self.timer = None;
        self.release_capture();
        self.discard_pending();
        self.deferred.retain(|task| *task == Deferred::Ready);
        self.token = self.token.next();
        self.elapsed_seconds = 0;
        self.phase = CapturePhase::Idle;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.phase, CapturePhase::Starting | CapturePhase::Recording)
    }

    pub fn has_recorded_asset(&self) -> bool {
        matches!(self.phase, CapturePhase::Complete(_))
    }

    pub fn recorded_asset(&self) -> Option<&VideoAsset> {
        match &self.phase {
            CapturePhase::Complete(asset) => Some(asset),
            _ => None
        }
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn phase(&self) -> &CapturePhase {
        &self.phase
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn camera(&self) -> Option<&C> {
        self.camera.as_ref()
    }

    pub fn camera_mut(&mut self) -> Option<&mut C> {
        self.camera.as_mut()
    }
}

impl<C: CameraCapability> Drop for VideoCaptureOverlay<C> {
    fn drop(&mut self) {
        self.release_capture();
        self.discard_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::VideoQuality;
    use crate::error::CaptureError;
    use chrono::Local;
    use std::{cell::RefCell, collections::VecDeque, path::PathBuf, rc::Rc, time::Duration};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Start(CaptureToken, RecordOptions),
        Stop,
        Facing(Facing),
        Discard(PathBuf)
    }

    #[derive(Default)]
    struct FakeCamera {
        calls: Vec<Call>,
        outcomes: VecDeque<CaptureOutcome>,
        refuse_start: bool
    }

    impl FakeCamera {
        fn last_token(&self) -> CaptureToken {
            self.calls.iter().rev().find_map(|c| match c {
                Call::Start(token, _) => Some(*token),
                _ => None
            }).unwrap()
        }

        fn starts(&self) -> usize {
            self.calls.iter().filter(|c| matches!(c, Call::Start(..))).count()
        }

        fn stops(&self) -> usize {
            self.calls.iter().filter(|c| matches!(c, Call::Stop)).count()
        }

        fn discarded(&self) -> Vec<PathBuf> {
            self.calls.iter().filter_map(|c| match c {
                Call::Discard(path) => Some(path.clone()),
                _ => None
            }).collect()
        }

        fn resolve(&mut self, token: CaptureToken, result: Result<VideoAsset, CaptureError>) {
            self.outcomes.push_back(CaptureOutcome { token, result });
        }
    }

    impl CameraCapability for FakeCamera {
        fn start_recording(&mut self, options: RecordOptions, token: CaptureToken) -> Result<(), CaptureError> {
            if self.refuse_start {
                return Err(CaptureError::NoStream);
            }
            self.calls.push(Call::Start(token, options));
            Ok(())
        }

        fn stop_recording(&mut self) {
            self.calls.push(Call::Stop);
        }

        fn set_facing(&mut self, facing: Facing) {
            self.calls.push(Call::Facing(facing));
        }

        fn poll_outcome(&mut self) -> Option<CaptureOutcome> {
            self.outcomes.pop_front()
        }

        fn discard(&mut self, asset: VideoAsset) {
            self.calls.push(Call::Discard(asset.path));
        }
    }

    fn asset(name: &str) -> VideoAsset {
        VideoAsset {
            path: PathBuf::from(name),
            duration: Duration::from_secs(3),
            width: 960,
            height: 720,
            has_audio: true,
            recorded_at: Local::now()
        }
    }

    fn mounted() -> (VideoCaptureOverlay<FakeCamera>, Instant) {
        let t0 = Instant::now();
        let mut overlay = VideoCaptureOverlay::new(RecordOptions::default());
        overlay.mount(FakeCamera::default());
        overlay.pump(t0);
        (overlay, t0)
    }

    fn counter() -> (Rc<RefCell<Vec<VideoAsset>>>, impl FnOnce(VideoAsset) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |a: VideoAsset| sink.borrow_mut().push(a))
    }

    fn cam(overlay: &mut VideoCaptureOverlay<FakeCamera>) -> &mut FakeCamera {
        overlay.camera_mut().unwrap()
    }

    fn secs(t0: Instant, ms: u64) -> Instant {
        t0 + Duration::from_millis(ms)
    }

    /// Opens, records and stops, leaving a resolved take in `Complete`.
    fn recorded(name: &str) -> (VideoCaptureOverlay<FakeCamera>, Instant, Rc<RefCell<Vec<VideoAsset>>>) {
        let (mut overlay, t0) = mounted();
        let (seen, callback) = counter();
        overlay.open(callback);
        overlay.start();
        overlay.pump(t0);
        overlay.stop();
        overlay.pump(secs(t0, 10));
        let token = cam(&mut overlay).last_token();
        cam(&mut overlay).resolve(token, Ok(asset(name)));
        overlay.pump(secs(t0, 20));
        (overlay, t0, seen)
    }

    #[test]
    fn starts_closed_and_not_ready() {
        let mut overlay: VideoCaptureOverlay<FakeCamera> = VideoCaptureOverlay::new(RecordOptions::default());
        assert!(!overlay.is_visible());
        assert!(!overlay.is_ready());
        overlay.mount(FakeCamera::default());
        assert!(!overlay.is_ready());
        overlay.pump(Instant::now());
        assert!(overlay.is_ready());
        assert_eq!(cam(&mut overlay).calls, vec![Call::Facing(Facing::Back)]);
    }

    #[test]
    fn initial_open_is_honoured() {
        let overlay: VideoCaptureOverlay<FakeCamera> = VideoCaptureOverlay::new(RecordOptions::default()).with_initial_open(true);
        assert!(overlay.is_visible());
    }

    #[test]
    fn readiness_survives_an_early_close() {
        let mut overlay = VideoCaptureOverlay::new(RecordOptions::default());
        overlay.mount(FakeCamera::default());
        overlay.open_detached();
        overlay.close();
        overlay.pump(Instant::now());
        assert!(overlay.is_ready());
    }

    #[test]
    fn open_then_close_never_completes() {
        let (mut overlay, t0) = mounted();
        let (seen, callback) = counter();
        overlay.open(callback);
        assert!(overlay.is_visible());
        overlay.close();
        overlay.pump(secs(t0, 5000));
        assert!(!overlay.is_visible());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn start_resets_and_ticks_once_per_second() {
        let (mut overlay, t0) = mounted();
        overlay.open_detached();
        overlay.start();
        assert!(overlay.is_recording());
        assert_eq!(overlay.elapsed_seconds(), 0);

        overlay.pump(t0);
        assert_eq!(overlay.phase(), &CapturePhase::Recording);
        assert_eq!(cam(&mut overlay).starts(), 1);

        overlay.pump(secs(t0, 999));
        assert_eq!(overlay.elapsed_seconds(), 0);
        overlay.pump(secs(t0, 1000));
        assert_eq!(overlay.elapsed_seconds(), 1);
        overlay.pump(secs(t0, 1000));
        overlay.pump(secs(t0, 1999));
        assert_eq!(overlay.elapsed_seconds(), 1);
    }

    #[test]
    fn start_requests_fixed_profile() {
        let (mut overlay, t0) = mounted();
        overlay.open_detached();
        overlay.start();
        overlay.pump(t0);
        let token = cam(&mut overlay).last_token();
        assert!(cam(&mut overlay).calls.contains(&Call::Start(token, RecordOptions::default())));
        assert_eq!(RecordOptions::default().quality, VideoQuality::P720);
    }

    #[test]
    fn start_is_ignored_while_hidden() {
        let (mut overlay, t0) = mounted();
        overlay.start();
        overlay.pump(t0);
        assert!(!overlay.is_recording());
        assert_eq!(cam(&mut overlay).starts(), 0);
    }

    #[test]
    fn stop_is_immediate_and_freezes_the_clock() {
        let (mut overlay, t0) = mounted();
        overlay.open_detached();
        overlay.start();
        overlay.pump(t0);
        overlay.pump(secs(t0, 2500));
        assert_eq!(overlay.elapsed_seconds(), 2);

        overlay.stop();
        assert!(!overlay.is_recording());
        assert!(!overlay.has_recorded_asset());
        assert_eq!(overlay.phase(), &CapturePhase::Stopping);

        overlay.pump(secs(t0, 9000));
        assert_eq!(overlay.elapsed_seconds(), 2);
        assert_eq!(cam(&mut overlay).stops(), 1);
    }

    #[test]
    fn stop_before_capture_begins_still_stops_the_camera() {
        let (mut overlay, t0) = mounted();
        overlay.open_detached();
        overlay.start();
        overlay.stop();
        overlay.pump(t0);
        overlay.pump(secs(t0, 3000));
        assert_eq!(overlay.elapsed_seconds(), 0);
        assert_eq!(cam(&mut overlay).starts(), 1);
        assert_eq!(cam(&mut overlay).stops(), 1);
        assert_eq!(overlay.phase(), &CapturePhase::Stopping);
    }

    #[test]
    fn resolved_take_enables_confirm() {
        let (overlay, _, seen) = recorded("a.mp4");
        assert!(overlay.has_recorded_asset());
        assert!(!overlay.is_recording());
        assert_eq!(overlay.recorded_asset().unwrap().path, PathBuf::from("a.mp4"));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn confirm_without_asset_is_noop() {
        let (mut overlay, t0) = mounted();
        let (seen, callback) = counter();
        overlay.open(callback);
        overlay.confirm();
        assert!(overlay.is_visible());
        assert!(seen.borrow().is_empty());

        overlay.start();
        overlay.pump(t0);
        overlay.confirm();
        assert!(overlay.is_recording());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn confirm_hands_over_the_exact_asset_once() {
        let (mut overlay, t0, seen) = recorded("take.mp4");
        let expected = overlay.recorded_asset().cloned().unwrap();

        overlay.confirm();
        assert_eq!(seen.borrow().as_slice(), &[expected]);
        assert!(!overlay.is_visible());
        assert!(!overlay.has_recorded_asset());
        assert_eq!(overlay.elapsed_seconds(), 0);

        overlay.confirm();
        overlay.pump(secs(t0, 100));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn confirm_without_callback_still_closes() {
        let (mut overlay, t0) = mounted();
        overlay.open_detached();
        overlay.start();
        overlay.pump(t0);
        overlay.stop();
        overlay.pump(t0);
        let token = cam(&mut overlay).last_token();
        cam(&mut overlay).resolve(token, Ok(asset("x.mp4")));
        overlay.pump(t0);

        overlay.confirm();
        assert!(!overlay.is_visible());
        assert!(!overlay.has_recorded_asset());
    }

    #[test]
    fn reopening_replaces_the_callback() {
        let (mut overlay, t0) = mounted();
        let (first, callback) = counter();
        overlay.open(callback);
        let (second, callback) = counter();
        overlay.open(callback);

        overlay.start();
        overlay.pump(t0);
        overlay.stop();
        overlay.pump(t0);
        let token = cam(&mut overlay).last_token();
        cam(&mut overlay).resolve(token, Ok(asset("b.mp4")));
        overlay.pump(t0);
        overlay.confirm();

        assert!(first.borrow().is_empty());
        assert_eq!(second.borrow().len(), 1);
    }

    #[test]
    fn late_success_from_previous_session_is_ignored() {
        let (mut overlay, t0) = mounted();
        overlay.open_detached();
        overlay.start();
        overlay.pump(t0);
        let old = cam(&mut overlay).last_token();
        overlay.close();
        overlay.open_detached();
        overlay.start();
        overlay.pump(secs(t0, 100));
        overlay.pump(secs(t0, 1100));
        assert_eq!(overlay.elapsed_seconds(), 1);

        cam(&mut overlay).resolve(old, Ok(asset("stale.mp4")));
        overlay.pump(secs(t0, 1200));
        assert!(overlay.is_recording());
        assert!(!overlay.has_recorded_asset());
        assert_eq!(overlay.elapsed_seconds(), 1);
    }

    #[test]
    fn late_failure_from_previous_session_is_ignored() {
        let (mut overlay, t0) = mounted();
        overlay.open_detached();
        overlay.start();
        overlay.pump(t0);
        let old = cam(&mut overlay).last_token();
        overlay.close();
        overlay.open_detached();
        overlay.start();
        overlay.pump(t0);

        cam(&mut overlay).resolve(old, Err(CaptureError::Encoder(String::from("exit status: 1"))));
        overlay.pump(secs(t0, 2000));
        assert!(overlay.is_recording());
        assert_eq!(overlay.elapsed_seconds(), 2);
    }

    #[test]
    fn late_result_arriving_while_closed_is_ignored() {
        let (mut overlay, t0) = mounted();
        overlay.open_detached();
        overlay.start();
        overlay.pump(t0);
        let old = cam(&mut overlay).last_token();
        overlay.close();
        cam(&mut overlay).resolve(old, Ok(asset("late.mp4")));
        overlay.pump(t0);
        assert!(!overlay.has_recorded_asset());
    }

    #[test]
    fn capture_failure_allows_retry() {
        let (mut overlay, t0) = mounted();
        overlay.open_detached();
        overlay.start();
        overlay.pump(t0);
        overlay.stop();
        overlay.pump(t0);
        let token = cam(&mut overlay).last_token();
        cam(&mut overlay).resolve(token, Err(CaptureError::MissingOutput(PathBuf::from("gone.mp4"))));
        overlay.pump(t0);

        assert_eq!(overlay.phase(), &CapturePhase::Idle);
        assert!(!overlay.has_recorded_asset());
        overlay.start();
        overlay.pump(secs(t0, 50));
        assert_eq!(overlay.phase(), &CapturePhase::Recording);
    }

    #[test]
    fn failure_mid_recording_stops_the_clock() {
        let (mut overlay, t0) = mounted();
        overlay.open_detached();
        overlay.start();
        overlay.pump(t0);
        let token = cam(&mut overlay).last_token();
        cam(&mut overlay).resolve(token, Err(CaptureError::Spawn(std::io::Error::other("no ffmpeg"))));
        overlay.pump(secs(t0, 1500));
        assert!(!overlay.is_recording());
        let frozen = overlay.elapsed_seconds();
        overlay.pump(secs(t0, 5000));
        assert_eq!(overlay.elapsed_seconds(), frozen);
    }

    #[test]
    fn failed_take_releases_the_camera() {
        let (mut overlay, t0) = mounted();
        overlay.open_detached();
        overlay.start();
        overlay.pump(t0);
        let token = cam(&mut overlay).last_token();
        cam(&mut overlay).resolve(token, Err(CaptureError::Spawn(std::io::Error::other("no ffmpeg"))));
        overlay.pump(secs(t0, 100));

        assert_eq!(overlay.phase(), &CapturePhase::Idle);
        assert_eq!(cam(&mut overlay).stops(), 1);
        overlay.close();
        assert_eq!(cam(&mut overlay).stops(), 1);

        overlay.open_detached();
        overlay.flip();
        assert_eq!(cam(&mut overlay).calls.last(), Some(&Call::Facing(Facing::Front)));
    }

    #[test]
    fn failure_after_stop_does_not_stop_twice() {
        let (mut overlay, t0) = mounted();
        overlay.open_detached();
        overlay.start();
        overlay.pump(t0);
        overlay.stop();
        overlay.pump(t0);
        let token = cam(&mut overlay).last_token();
        cam(&mut overlay).resolve(token, Err(CaptureError::Encoder(String::from("exit status: 1"))));
        overlay.pump(t0);
        assert_eq!(cam(&mut overlay).stops(), 1);
    }

    #[test]
    fn unused_takes_are_handed_back_for_deletion() {
        let (mut overlay, t0, seen) = recorded("redo.mp4");
        overlay.start();
        assert_eq!(cam(&mut overlay).discarded(), vec![PathBuf::from("redo.mp4")]);

        overlay.pump(t0);
        overlay.stop();
        overlay.pump(t0);
        let token = cam(&mut overlay).last_token();
        cam(&mut overlay).resolve(token, Ok(asset("abandoned.mp4")));
        overlay.pump(t0);
        overlay.close();
        assert_eq!(cam(&mut overlay).discarded().last(), Some(&PathBuf::from("abandoned.mp4")));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn late_take_is_handed_back_for_deletion() {
        let (mut overlay, t0) = mounted();
        overlay.open_detached();
        overlay.start();
        overlay.pump(t0);
        let old = cam(&mut overlay).last_token();
        overlay.close();
        cam(&mut overlay).resolve(old, Ok(asset("late.mp4")));
        overlay.pump(t0);
        assert_eq!(cam(&mut overlay).discarded(), vec![PathBuf::from("late.mp4")]);
    }

    #[test]
    fn confirmed_take_is_kept() {
        let (mut overlay, _, seen) = recorded("keep.mp4");
        overlay.confirm();
        assert_eq!(seen.borrow().len(), 1);
        assert!(overlay.camera().unwrap().discarded().is_empty());
    }

    #[test]
    fn refused_start_returns_to_idle() {
        let (mut overlay, t0) = mounted();
        cam(&mut overlay).refuse_start = true;
        overlay.open_detached();
        overlay.start();
        overlay.pump(t0);
        assert_eq!(overlay.phase(), &CapturePhase::Idle);
        overlay.pump(secs(t0, 3000));
        assert_eq!(overlay.elapsed_seconds(), 0);
    }

    #[test]
    fn recording_again_discards_previous_take() {
        let (mut overlay, t0, _) = recorded("first.mp4");
        overlay.start();
        assert!(overlay.is_recording());
        assert!(!overlay.has_recorded_asset());
        assert!(overlay.recorded_asset().is_none());
        overlay.pump(secs(t0, 100));
        overlay.pump(secs(t0, 1100));
        assert_eq!(overlay.elapsed_seconds(), 1);
    }

    #[test]
    fn never_recording_and_recorded_at_once() {
        let (mut overlay, t0, _) = recorded("first.mp4");
        assert!(overlay.has_recorded_asset() && !overlay.is_recording());
        overlay.start();
        overlay.pump(t0);
        assert!(overlay.is_recording() && !overlay.has_recorded_asset());
    }

    #[test]
    fn close_while_recording_cancels_everything() {
        let (mut overlay, t0) = mounted();
        overlay.open_detached();
        overlay.start();
        overlay.pump(t0);
        overlay.pump(secs(t0, 1000));
        overlay.close();

        assert_eq!(cam(&mut overlay).stops(), 1);
        assert!(!overlay.is_recording());
        let frozen = overlay.elapsed_seconds();
        overlay.pump(secs(t0, 10_000));
        assert_eq!(overlay.elapsed_seconds(), frozen);
    }

    #[test]
    fn close_before_capture_begins_never_starts_the_camera() {
        let (mut overlay, t0) = mounted();
        overlay.open_detached();
        overlay.start();
        overlay.close();
        overlay.pump(t0);
        assert_eq!(cam(&mut overlay).starts(), 0);
    }

    #[test]
    fn open_resets_session() {
        let (mut overlay, t0, _) = recorded("keep.mp4");
        overlay.open_detached();
        assert!(!overlay.has_recorded_asset());
        assert_eq!(overlay.elapsed_seconds(), 0);
        assert_eq!(overlay.phase(), &CapturePhase::Idle);
        overlay.pump(t0);
        assert!(overlay.is_visible());
    }

    #[test]
    fn flip_toggles_and_reaches_camera() {
        let (mut overlay, _) = mounted();
        let original = overlay.facing();
        overlay.flip();
        assert_eq!(overlay.facing(), original.flipped());
        overlay.flip();
        assert_eq!(overlay.facing(), original);
        let calls = &cam(&mut overlay).calls;
        assert_eq!(calls[calls.len() - 2..], [Call::Facing(Facing::Front), Call::Facing(Facing::Back)]);
    }

    #[test]
    fn flip_mid_recording_keeps_recording() {
        let (mut overlay, t0) = mounted();
        overlay.open_detached();
        overlay.start();
        overlay.pump(t0);
        overlay.flip();
        assert!(overlay.is_recording());
        assert_eq!(overlay.facing(), Facing::Front);
    }

    #[test]
    fn intents_route_to_operations() {
        let (mut overlay, t0) = mounted();
        overlay.open_detached();
        overlay.handle(OverlayIntent::Start);
        overlay.pump(t0);
        assert!(overlay.is_recording());
        overlay.handle(OverlayIntent::Stop);
        assert!(!overlay.is_recording());
        overlay.handle(OverlayIntent::Flip);
        assert_eq!(overlay.facing(), Facing::Front);
        overlay.handle(OverlayIntent::Close);
        assert!(!overlay.is_visible());
    }

    #[test]
    fn unmount_releases_live_capture() {
        let (mut overlay, t0) = mounted();
        overlay.open_detached();
        overlay.start();
        overlay.pump(t0);
        let camera = overlay.unmount().unwrap();
        assert_eq!(camera.stops(), 1);
        assert!(!overlay.is_ready());
        assert!(overlay.camera().is_none());
    }

    #[test]
    fn record_without_camera_falls_back_to_idle() {
        let mut overlay: VideoCaptureOverlay<FakeCamera> = VideoCaptureOverlay::new(RecordOptions::default());
        overlay.open_detached();
        overlay.start();
        overlay.pump(Instant::now());
        assert_eq!(overlay.phase(), &CapturePhase::Idle);
    }
}
