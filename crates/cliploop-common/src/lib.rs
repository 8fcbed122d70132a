//! Cliploop-Common: shared domain types for the clip playback controller.
//!
//! - **Clips**: [`ClipDescriptor`] and its [`ClipLength`], the immutable unit
//!   of playback handed around between the queue, the history and the
//!   current-clip slot
//! - **Scopes**: [`Scope`], the subset of the library eligible for random picks
//! - **Library**: the `/tree` listing ([`TreeNode`]) and the backend's
//!   [`CacheStatus`] snapshot
//! - **IDs**: [`SessionId`]
//! - **Error Handling**: common error type and result alias
//!
//! # Examples
//!
//! ```
//! use cliploop_common::{ClipDescriptor, ClipLength, Scope};
//!
//! let clip = ClipDescriptor::new("movies/a.mp4", 12.0, ClipLength::Seconds(20.0)).unwrap();
//! assert_eq!(clip.end(), Some(32.0));
//!
//! let whole = ClipDescriptor::whole_file("movies/a.mp4");
//! assert!(whole.is_unbounded());
//!
//! assert_eq!(Scope::Root.target(), None);
//! assert_eq!(Scope::folder("movies").target(), Some("movies"));
//! ```

pub mod clip;
pub mod error;
pub mod ids;
pub mod library;
pub mod scope;

pub use clip::{ClipDescriptor, ClipLength};
pub use error::{Error, Result};
pub use ids::SessionId;
pub use library::{CacheStatus, NodeType, TreeNode};
pub use scope::Scope;
