//! Builds the per-frame draw list.

use crate::ecs::{ComponentManager, ComponentSet, EcsCoordinator, EntityId, Signature, System, SystemId};
use crate::error::EcsResult;
use crate::render::{Camera, CameraMatrices, RenderFrame, RenderPacket, Renderable, Renderer};
use crate::transform::Transform;

/// Collects visible renderables into a [`RenderFrame`] and submits it.
///
/// Requires `{Transform, Renderable}`. The camera is the lowest entity id
/// holding both [`Camera`] and [`Transform`].
pub struct RenderSystem {
    renderer: Box<dyn Renderer>,
    frame: u64,
}

impl RenderSystem {
    /// Registered name.
    pub const NAME: &'static str = "RenderSystem";

    /// Creates the system around `renderer`.
    #[must_use]
    pub fn new(renderer: Box<dyn Renderer>) -> Self {
        Self { renderer, frame: 0 }
    }

    /// Frames submitted so far.
    #[must_use]
    pub const fn frames_submitted(&self) -> u64 {
        self.frame
    }

    fn active_camera(ecs: &EcsCoordinator) -> Option<CameraMatrices> {
        let cameras = ecs.component_array::<Camera>().ok()?;
        let (entity, camera, transform) = cameras
            .iter()
            .filter_map(|(entity, camera)| ecs.try_component::<Transform>(entity).map(|t| (entity, camera, t)))
            .min_by_key(|(entity, _, _)| *entity)?;

        let tolerance = ecs.tolerance();
        let matrices = camera
            .view(transform, tolerance)
            .and_then(|view| camera.projection(tolerance).map(|projection| (view, projection)));
        match matrices {
            Ok((view, projection)) => Some(CameraMatrices {
                entity,
                view,
                projection,
                position: transform.position(),
            }),
            Err(err) => {
                tracing::warn!(entity = %entity, error = %err, "camera matrices unavailable");
                None
            }
        }
    }

    fn packet(ecs: &EcsCoordinator, entity: EntityId) -> EcsResult<Option<RenderPacket>> {
        let renderable = ecs.get_component::<Renderable>(entity)?;
        if !renderable.visible {
            return Ok(None);
        }
        let transform = ecs.get_component::<Transform>(entity)?;
        match transform.normal_matrix(ecs.tolerance()) {
            Ok(normal) => Ok(Some(RenderPacket {
                entity,
                mesh: renderable.mesh,
                material: renderable.material,
                model: transform.model_matrix(),
                normal,
            })),
            Err(err) => {
                tracing::warn!(entity = %entity, error = %err, "skipping draw with singular normal matrix");
                Ok(None)
            }
        }
    }
}

impl System for RenderSystem {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn signature(&self, components: &mut ComponentManager) -> EcsResult<Signature> {
        <(Transform, Renderable)>::signature(components)
    }

    fn update(&mut self, id: SystemId, ecs: &mut EcsCoordinator, _delta_time: f32) -> EcsResult<()> {
        let mut packets = Vec::new();
        for &entity in ecs.system_entities(id)? {
            if let Some(packet) = Self::packet(ecs, entity)? {
                packets.push(packet);
            }
        }
        let camera = Self::active_camera(ecs);
        if camera.is_none() {
            tracing::debug!(frame = self.frame, "no active camera");
        }

        tracing::trace!(frame = self.frame, draws = packets.len(), "render frame built");
        self.renderer.submit(RenderFrame {
            frame: self.frame,
            camera,
            packets,
        });
        self.frame += 1;
        Ok(())
    }
}

impl std::fmt::Debug for RenderSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSystem").field("frame", &self.frame).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use glesc_math::Vec3F;

    use super::*;
    use crate::render::{ChannelRenderer, MaterialHandle, MeshHandle};

    #[test]
    fn test_frame_contains_visible_renderables() {
        let mut ecs = EcsCoordinator::default();
        let (renderer, frames) = ChannelRenderer::new(2);
        let mut system = RenderSystem::new(Box::new(renderer));
        let signature = system.signature(ecs.components_mut()).unwrap();
        let id = ecs.register_system(RenderSystem::NAME, signature).unwrap();

        let shown = ecs.create_entity().unwrap();
        ecs.add_component(shown, Transform::from_position(Vec3F::new(1.0, 0.0, 0.0))).unwrap();
        ecs.add_component(shown, Renderable::new(MeshHandle(3), MaterialHandle(4))).unwrap();

        let hidden = ecs.create_entity().unwrap();
        ecs.add_component(hidden, Transform::default()).unwrap();
        let mut renderable = Renderable::new(MeshHandle(3), MaterialHandle(4));
        renderable.visible = false;
        ecs.add_component(hidden, renderable).unwrap();

        let flat = ecs.create_entity().unwrap();
        ecs.add_component(flat, Transform::new(Vec3F::zero(), Vec3F::zero(), Vec3F::new(1.0, 0.0, 1.0))).unwrap();
        ecs.add_component(flat, Renderable::new(MeshHandle(3), MaterialHandle(4))).unwrap();

        system.update(id, &mut ecs, 0.016).unwrap();
        let frame = frames.try_recv().unwrap();
        assert_eq!(frame.frame, 0);
        assert!(frame.camera.is_none());
        assert_eq!(frame.packets.len(), 1);
        assert_eq!(frame.packets[0].entity, shown);
        assert_eq!(frame.packets[0].model.translation_part(), Vec3F::new(1.0, 0.0, 0.0));
        assert_eq!(system.frames_submitted(), 1);
    }

    #[test]
    fn test_camera_is_picked_up() {
        let mut ecs = EcsCoordinator::default();
        let (renderer, frames) = ChannelRenderer::new(1);
        let mut system = RenderSystem::new(Box::new(renderer));
        let signature = system.signature(ecs.components_mut()).unwrap();
        let id = ecs.register_system(RenderSystem::NAME, signature).unwrap();

        let eye = ecs.create_named_entity("camera").unwrap();
        ecs.add_component(eye, Transform::from_position(Vec3F::new(0.0, 0.0, 5.0))).unwrap();
        ecs.add_component(eye, Camera::default()).unwrap();

        system.update(id, &mut ecs, 0.016).unwrap();
        let camera = frames.try_recv().unwrap().camera.unwrap();
        assert_eq!(camera.entity, eye);
        assert_eq!(camera.position, Vec3F::new(0.0, 0.0, 5.0));
        assert_eq!(camera.view.transform_point(Vec3F::zero()), Vec3F::new(0.0, 0.0, -5.0));
    }
}
