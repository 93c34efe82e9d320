//! Cube Kernel: transform state and the frame loop.
//!
//! # Invariants
//! - View and projection are computed once and never written again.
//! - The world matrix is re-derived from interaction angles every tick,
//!   never integrated from the previous frame.
//! - A stopped frame loop never ticks and never reschedules.

pub mod frame_loop;
pub mod transform;

pub use frame_loop::{FrameLoop, FrameScheduler, LoopState, ManualScheduler, StopHandle};
pub use transform::{CameraSetup, DEFAULT_SPEED, DepthRange, TransformState, world_rotation};
