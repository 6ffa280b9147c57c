//! Asynchronous media intake for the LaneCut timeline: file validation and
//! categorization, a cancelable upload seam, a never-failing metadata
//! probe, and the drop pipeline that turns dropped files into placed
//! overlays on dedicated tracks.

pub mod error;
pub mod intake;
pub mod pipeline;
pub mod probe;
pub mod upload;
