//! Request handlers.

pub mod audio;
pub mod captions;
pub mod health;
pub mod relay;
pub mod trim;
pub mod videos;

pub use audio::*;
pub use captions::*;
pub use health::*;
pub use relay::*;
pub use trim::*;
pub use videos::*;
