//! Seam traits for the updater
//!
//! The scheduler only knows about [`Updater`]. The HTTP implementation lives
//! in [`crate::updater`]; tests drive the scheduler with their own doubles.

pub mod updater;

pub use updater::Updater;
