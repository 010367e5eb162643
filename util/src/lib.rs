//! Utility library for the line follower software
//!
//! Infrastructure shared by the executables: the software root, sessions,
//! logging, parameter loading, CSV archives and command scripts.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod archive;
pub mod host;
pub mod logger;
pub mod maths;
pub mod params;
pub mod session;
pub mod script_interpreter;
pub mod time;
