//! # Render Feed
//!
//! Camera and drawable components plus the frame handoff to an external
//! renderer.

mod camera;
mod feed;

pub use camera::Camera;
pub use feed::{
    CameraMatrices, ChannelRenderer, InstanceData, MaterialHandle, MeshHandle, RenderFrame, RenderPacket, Renderable,
    Renderer,
};
