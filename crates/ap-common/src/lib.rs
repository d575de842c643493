//! AuthPlane shared service plumbing.
//!
//! Currently this is the structured logging setup used by every binary.
//! Domain types live in `ap-platform`; nothing here should depend on them.

pub mod logging;
