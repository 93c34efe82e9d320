//! Interaction tracking: pointer events mapped to rotation angles.
//!
//! # Invariants
//! - Angles hold the last absolute pointer coordinates seen while dragging.
//!   They are not deltas and are never smoothed or clamped.
//! - Pointer moves outside a drag leave the angles untouched.

pub mod pointer;

pub use pointer::{InteractionState, PointerEvent};
