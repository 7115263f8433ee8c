//! Hypescan Chat Model
//!
//! Defines the data contracts shared by every pipeline stage:
//! - **Messages:** Raw chat records and the normalized [`Message`]
//! - **Emotes:** The [`EmoteWeightTable`] used to weight excitement
//! - **Activity:** Fixed-width [`ActivityBucket`]s of chat intensity
//! - **Highlights:** Detected peaks and valleys
//!
//! All times are `f64` seconds elapsed since stream start.

pub mod activity;
pub mod emote;
pub mod highlight;
pub mod message;

pub use activity::*;
pub use emote::*;
pub use highlight::*;
pub use message::*;
