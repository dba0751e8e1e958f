//! Per-frame draw lists handed to the renderer.
//!
//! The simulation thread builds a [`RenderFrame`] and passes it to a
//! [`Renderer`]. [`ChannelRenderer`] forwards frames over a bounded
//! one-way queue to a render thread, which never touches ECS state.

// derive(Pod) expands to an unsafe impl
#![allow(unsafe_code)]

use bytemuck::{Pod, Zeroable};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use glesc_math::{Mat3F, Mat4F, Vec3F};

use crate::ecs::{Component, EntityId};

/// Renderer-owned mesh id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

/// Renderer-owned material id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub u32);

/// Marks an entity as drawable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Renderable {
    /// Mesh to draw.
    pub mesh: MeshHandle,
    /// Material to draw it with.
    pub material: MaterialHandle,
    /// Hidden entities are skipped.
    pub visible: bool,
}

impl Component for Renderable {}

impl Renderable {
    /// Visible renderable.
    #[must_use]
    pub const fn new(mesh: MeshHandle, material: MaterialHandle) -> Self {
        Self {
            mesh,
            material,
            visible: true,
        }
    }
}

/// One draw of one entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderPacket {
    /// Source entity.
    pub entity: EntityId,
    /// Mesh to draw.
    pub mesh: MeshHandle,
    /// Material to draw it with.
    pub material: MaterialHandle,
    /// Model matrix.
    pub model: Mat4F,
    /// Normal matrix.
    pub normal: Mat3F,
}

impl RenderPacket {
    /// GPU layout of the matrices.
    #[must_use]
    pub fn instance_data(&self) -> InstanceData {
        let normal = self.normal.to_column_major();
        InstanceData {
            model: self.model.to_column_major(),
            normal: normal.map(|[a, b, c]| [a, b, c, 0.0]),
        }
    }
}

/// Per-instance GPU data, column-major with std140 padding.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    /// Model matrix columns.
    pub model: [[f32; 4]; 4],
    /// Normal matrix columns, each padded to four floats.
    pub normal: [[f32; 4]; 3],
}

/// Camera matrices for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraMatrices {
    /// Entity carrying the camera.
    pub entity: EntityId,
    /// World to view.
    pub view: Mat4F,
    /// View to clip.
    pub projection: Mat4F,
    /// Eye position.
    pub position: Vec3F,
}

/// Everything the renderer needs to draw one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderFrame {
    /// Frame counter, starting at 0.
    pub frame: u64,
    /// Active camera, if the scene has one.
    pub camera: Option<CameraMatrices>,
    /// Draws in entity id order.
    pub packets: Vec<RenderPacket>,
}

/// Consumer of render frames. Must not mutate ECS state.
pub trait Renderer: Send {
    /// Takes one frame.
    fn submit(&mut self, frame: RenderFrame);
}

/// Forwards frames to a render thread over a bounded channel.
///
/// A full queue drops the new frame instead of stalling the simulation.
#[derive(Debug)]
pub struct ChannelRenderer {
    sender: Sender<RenderFrame>,
    dropped: u64,
}

impl ChannelRenderer {
    /// Creates the renderer and the receiving end for the render thread.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Frames in flight before new ones are dropped.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, Receiver<RenderFrame>) {
        let (sender, receiver) = bounded(capacity);
        (Self { sender, dropped: 0 }, receiver)
    }

    /// Frames dropped so far.
    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Renderer for ChannelRenderer {
    fn submit(&mut self, frame: RenderFrame) {
        match self.sender.try_send(frame) {
            Ok(()) => {}
            Err(TrySendError::Full(frame)) => {
                self.dropped += 1;
                tracing::warn!(frame = frame.frame, dropped = self.dropped, "render queue full, frame dropped");
            }
            Err(TrySendError::Disconnected(frame)) => {
                self.dropped += 1;
                tracing::warn!(frame = frame.frame, "render thread gone, frame dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(n: u64) -> RenderFrame {
        RenderFrame {
            frame: n,
            camera: None,
            packets: Vec::new(),
        }
    }

    #[test]
    fn test_frames_arrive_in_order() {
        let (mut renderer, receiver) = ChannelRenderer::new(4);
        renderer.submit(frame(0));
        renderer.submit(frame(1));
        assert_eq!(receiver.try_recv().unwrap().frame, 0);
        assert_eq!(receiver.try_recv().unwrap().frame, 1);
    }

    #[test]
    fn test_full_queue_drops_newest() {
        let (mut renderer, receiver) = ChannelRenderer::new(1);
        renderer.submit(frame(0));
        renderer.submit(frame(1));
        assert_eq!(renderer.dropped(), 1);
        assert_eq!(receiver.try_recv().unwrap().frame, 0);
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_instance_data_is_column_major() {
        let packet = RenderPacket {
            entity: EntityId::new(0),
            mesh: MeshHandle(1),
            material: MaterialHandle(2),
            model: Mat4F::translation(Vec3F::new(1.0, 2.0, 3.0)),
            normal: Mat3F::identity(),
        };
        let data = packet.instance_data();
        assert_eq!(data.model[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(data.normal[1], [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(bytemuck::bytes_of(&data).len(), 28 * 4);
    }
}
