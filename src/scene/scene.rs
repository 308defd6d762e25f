use glam::Vec3;

use crate::asset::{Assets, Handle, Mesh};
use crate::renderer::{Material, ShadowAtlas};
use crate::scene::components::{
    Children, MaterialComponent, MeshComponent, Name, Parent, RenderableKind, TransformComponent,
    Visible, WorldTransform,
};
use crate::scene::internal::transforms::{propagate_transforms, update_world_bounds};
use crate::scene::light::Light;
use crate::scene::transform::Transform;

/// Everything the renderer consumes: renderable entities in a hecs world, an
/// explicitly ordered light list (batching and shadow-slot assignment walk it
/// in scene order), the ambient term, and the shadow atlas whose lifetime the
/// scene owns.
pub struct Scene {
    pub world: hecs::World,
    pub lights: Vec<Light>,
    pub ambient_light: Vec3,
    pub shadow_atlas: Option<ShadowAtlas>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            world: hecs::World::new(),
            lights: Vec::new(),
            ambient_light: Vec3::splat(0.1),
            shadow_atlas: None,
        }
    }

    /// Spawn a renderable. Mesh and material may be absent (assets still
    /// loading, placeholder slots); such entities simply produce no render
    /// call until both are present.
    pub fn spawn_renderable(
        &mut self,
        kind: RenderableKind,
        name: &str,
        transform: Transform,
        mesh: Option<Handle<Mesh>>,
        material: Option<Handle<Material>>,
    ) -> hecs::Entity {
        let entity = self.world.spawn((
            kind,
            Name::new(name),
            TransformComponent(transform),
            WorldTransform(transform),
            Visible::default(),
        ));
        if let Some(mesh) = mesh {
            self.world.insert_one(entity, MeshComponent(mesh)).ok();
        }
        if let Some(material) = material {
            self.world
                .insert_one(entity, MaterialComponent(material))
                .ok();
        }
        entity
    }

    /// Attach `child` under `parent`; its transform becomes parent-relative.
    pub fn set_parent(&mut self, child: hecs::Entity, parent: hecs::Entity) {
        self.world.insert_one(child, Parent(parent)).ok();
        let mut appended = false;
        if let Ok(mut children) = self.world.get::<&mut Children>(parent) {
            children.0.push(child);
            appended = true;
        }
        if !appended {
            self.world.insert_one(parent, Children(vec![child])).ok();
        }
    }

    /// Append a light; scene order is the order of this list.
    pub fn add_light(&mut self, light: Light) -> usize {
        self.lights.push(light);
        self.lights.len() - 1
    }

    pub fn set_visible(&mut self, entity: hecs::Entity, visible: bool) {
        if let Ok(mut flag) = self.world.get::<&mut Visible>(entity) {
            flag.0 = visible;
        }
    }

    /// Per-frame upkeep: propagate hierarchy transforms, then refresh cached
    /// world bounds from each mesh's local bounds.
    pub fn update(&mut self, assets: &Assets) {
        propagate_transforms(&mut self.world);
        update_world_bounds(&mut self.world, assets);
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::light::LightKind;

    #[test]
    fn spawned_renderable_is_visible_by_default() {
        let mut scene = Scene::new();
        let entity = scene.spawn_renderable(
            RenderableKind::WorldObject,
            "crate",
            Transform::IDENTITY,
            None,
            None,
        );
        let visible = scene.world.get::<&Visible>(entity).unwrap();
        assert!(visible.0);
    }

    #[test]
    fn set_parent_registers_children_both_ways() {
        let mut scene = Scene::new();
        let parent = scene.spawn_renderable(
            RenderableKind::WorldObject,
            "lamp post",
            Transform::IDENTITY,
            None,
            None,
        );
        let child_a = scene.spawn_renderable(
            RenderableKind::WorldObject,
            "lamp head",
            Transform::IDENTITY,
            None,
            None,
        );
        let child_b = scene.spawn_renderable(
            RenderableKind::WorldObject,
            "lamp glass",
            Transform::IDENTITY,
            None,
            None,
        );
        scene.set_parent(child_a, parent);
        scene.set_parent(child_b, parent);

        assert_eq!(scene.world.get::<&Parent>(child_a).unwrap().0, parent);
        let children = scene.world.get::<&Children>(parent).unwrap();
        assert_eq!(children.0, vec![child_a, child_b]);
    }

    #[test]
    fn lights_keep_insertion_order() {
        let mut scene = Scene::new();
        for i in 0..4 {
            let light = Light::new(LightKind::Point, Transform::IDENTITY)
                .with_intensity(i as f32);
            scene.add_light(light);
        }
        let intensities: Vec<f32> = scene.lights.iter().map(|l| l.intensity).collect();
        assert_eq!(intensities, vec![0.0, 1.0, 2.0, 3.0]);
    }
}
