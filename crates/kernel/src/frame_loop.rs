use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Host primitive that invokes the frame callback once more, typically on
/// the next vertical sync.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Cloneable cancellation flag for a [`FrameLoop`].
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Whether the loop will receive another frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// A self-rescheduling render loop.
///
/// Every call to [`FrameLoop::frame`] runs one tick and asks the scheduler
/// for the next frame, until the stop handle is triggered.
pub struct FrameLoop<S> {
    scheduler: S,
    stop: StopHandle,
    frames: u64,
}

impl<S: FrameScheduler> FrameLoop<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            stop: StopHandle::default(),
            frames: 0,
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    /// Number of ticks run so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Request the first frame.
    pub fn start(&mut self) {
        if self.stop.is_stopped() {
            return;
        }
        tracing::debug!("frame loop started");
        self.scheduler.request_frame();
    }

    /// Run one tick, then reschedule unless stopped.
    pub fn frame<F: FnOnce()>(&mut self, tick: F) -> LoopState {
        if self.stop.is_stopped() {
            return LoopState::Stopped;
        }

        tick();
        self.frames += 1;

        if self.stop.is_stopped() {
            tracing::debug!(frames = self.frames, "frame loop stopped");
            return LoopState::Stopped;
        }
        self.scheduler.request_frame();
        LoopState::Running
    }
}

/// Scheduler that only records requests. The caller decides when to run
/// the pending frame, which makes a bounded number of ticks easy to drive.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    pending: bool,
    requests: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the pending request, if any.
    pub fn take_pending(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    /// Total number of requests received.
    pub fn requests(&self) -> u64 {
        self.requests
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) {
        self.pending = true;
        self.requests += 1;
    }
}

impl FrameLoop<ManualScheduler> {
    /// Drive up to `max_frames` pending frames. Returns the ticks run.
    pub fn run_pending<F: FnMut()>(&mut self, max_frames: u64, mut tick: F) -> u64 {
        let before = self.frames;
        while self.frames - before < max_frames && self.scheduler.take_pending() {
            if self.frame(&mut tick) == LoopState::Stopped {
                break;
            }
        }
        self.frames - before
    }
}
