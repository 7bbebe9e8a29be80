//! Reelkit Timeline Engine
//!
//! Everything between the timeline store and the screen:
//!
//! ```text
//! pointer ──► interaction ──► TimelineStore ──► compositor ──► QuadRenderer
//!                  │                │                ▲
//!                  ▼                ▼                │ per-tick transforms
//!               layout           ruler          playback ◄── TimeSource
//! ```
//!
//! - **layout:** Frame/pixel conversion and the layer→row mapping
//! - **ruler:** Per-second grid ticks and the playhead line
//! - **compositor:** Colored clip quads, selection handles, and the render handle table
//! - **interaction:** Hit-testing and the select / move / resize / scrub gestures
//! - **playback:** Real-time clock with a throttled publish channel
//! - **visibility:** Off-thread "visible at frame" queries with last-request-wins

pub mod compositor;
pub mod interaction;
pub mod layout;
pub mod playback;
pub mod ruler;
pub mod visibility;

pub use compositor::*;
pub use interaction::*;
pub use layout::*;
pub use playback::*;
pub use ruler::*;
pub use visibility::*;
