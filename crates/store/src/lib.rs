//! Client-side state for CaviarScout.
//!
//! [`EntityListStore`](list_store::EntityListStore) holds one entity
//! collection and its loading/saving/deleting flags. The services in this
//! crate sit between it and the remote collaborators from `caviar_client`:
//! they validate input, raise flags for the duration of a call and commit
//! the backend's answer, or record a user-facing error when the call fails.

pub mod config;
pub mod error;
pub mod list_store;
pub mod moderation;
pub mod prodige_service;
pub mod session;
pub mod video_service;

pub use error::{ConfigError, ServiceError};
pub use list_store::{EntityListStore, Flag, StoreState, WritePolicy};
pub use moderation::ModerationWorkflow;
pub use prodige_service::ProdigeService;
pub use session::{SessionContext, UserRole};
pub use video_service::VideoService;
