#![allow(clippy::too_many_arguments, clippy::needless_range_loop)]
// MD2 keyframe model renderer with stencil shadow volumes

pub mod error;
pub mod model;
pub mod adjacency;
pub mod visibility;
pub mod shadow;
pub mod skin;
pub mod anim;
pub mod lights;
pub mod backend;
pub mod scene;

#[cfg(test)]
pub(crate) mod fixtures;

pub use error::Md2Error;
pub use model::{LoadOptions, Md2Model, ModelPose};
pub use scene::{FrameStats, Scene};
