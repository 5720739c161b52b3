//! Atomic disc actions for RadioHome.
//!
//! An *atomic action* is a multi-step operation on a drive/player pair
//! (power on, clear, hand the disc off) that must not interleave with a
//! conflicting operation on the same drive. [`ActionEngine`] enforces that
//! with one async lock per drive: play sequences hold the lock for their
//! whole duration, and rip workers hold it for the whole rip.
//!
//! Rips are dispatched fire-and-forget ([`ActionEngine::begin_rip`]
//! returns as soon as the worker is spawned) but never silently: every
//! worker reports into the engine's [`RipRegistry`], so completion and
//! failures stay observable after the dispatching request is gone.

mod action;
mod commands;
mod engine;
mod errors;
mod locks;
mod rip;

pub use action::AtomicAction;
pub use commands::{DriveCommands, SystemDriveCommands};
pub use engine::ActionEngine;
pub use errors::ActionError;
pub use locks::DriveLocks;
pub use rip::{RipHandle, RipRegistry, RipStatus};
