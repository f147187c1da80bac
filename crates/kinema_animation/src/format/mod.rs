//! Motion-file text format.
//!
//! ```text
//! version <int>
//! // name: <string>
//! nodes
//!   <id> "<name>" <parentId>
//! end
//! skeleton
//!   time <frameIndex>
//!     <boneId> <px> <py> <pz> <rx> <ry> <rz>
//! end
//! ```
//!
//! Rotations are radians on disk and degrees in memory.

mod parser;
mod writer;

pub use parser::{DEFAULT_MOTION_NAME, DEFAULT_VERSION, parse_motion};
pub use writer::{MotionText, write_motion};
