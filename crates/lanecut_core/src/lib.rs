//! Timeline placement and interaction engine: overlay/track data model,
//! track compatibility rules, dedicated-row allocation, ruler marker
//! generation, and the ghost interaction state machine with its alignment
//! guides. Pure and synchronous; the async media intake lives in
//! `lanecut_media`.

pub mod align;
pub mod compat;
pub mod error;
pub mod ghost;
pub mod ruler;
pub mod timeline;
pub mod tracks;
pub mod types;
