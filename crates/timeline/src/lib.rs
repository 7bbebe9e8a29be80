//! Reelkit Timeline Model
//!
//! Defines the editable timeline and the single owner that mutates it:
//! - **Events:** Time-positioned clips (video, audio, image, caption, transition)
//! - **Document:** Canvas metadata plus the event list, persisted as JSON
//! - **Store:** Mutation operations, selection, clipboard, and undo/redo history
//! - **Placement:** Collision-aware layer selection for inserted clips
//!
//! All positions are integer frames at the document frame rate. `start` is
//! inclusive, `end` is exclusive, and layers are 1-based.

pub mod action;
pub mod asset;
pub mod document;
pub mod error;
pub mod event;
pub mod history;
pub mod placement;
pub mod store;

pub use document::*;
pub use error::*;
pub use event::*;
pub use history::*;
pub use placement::*;
pub use store::*;
