//! Video frames, GPU texture and sources
//!
//! The player samples a single [`VideoTexture`] that a [`VideoStream`] keeps
//! filled from a [`VideoSource`].

mod frame;
mod source;
mod texture;

pub use frame::DecodedFrame;
pub use source::{
    FirstFrameGate, SourceError, StillImageSource, TestPatternSource, VideoSource, VideoStream,
};
pub use texture::VideoTexture;
