//! CaviarScout domain core.
//!
//! Pure domain logic with no I/O: record types and their normalization,
//! static code tables, draft validation and the video moderation state
//! machine. Shared by the REST client and the store layer.

pub mod codes;
pub mod error;
pub mod moderation;
pub mod normalize;
pub mod prodige;
pub mod types;
pub mod video;
