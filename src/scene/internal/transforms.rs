use hecs::World;

use crate::asset::Assets;
use crate::scene::bounds::Aabb;
use crate::scene::components::{
    Children, MeshComponent, Parent, TransformComponent, WorldBounds, WorldTransform,
};
use crate::scene::transform::Transform;

/// Walk every hierarchy root-to-leaf and cache each entity's world transform:
/// local composed onto the parent's world transform.
pub(crate) fn propagate_transforms(world: &mut World) {
    let roots: Vec<hecs::Entity> = world
        .query::<&TransformComponent>()
        .without::<&Parent>()
        .iter()
        .map(|(entity, _)| entity)
        .collect();

    let mut stack: Vec<(hecs::Entity, Transform)> = Vec::new();

    for root in roots {
        stack.push((root, Transform::IDENTITY));

        while let Some((entity, parent_world)) = stack.pop() {
            let local = match world.get::<&TransformComponent>(entity) {
                Ok(t) => t.0,
                Err(_) => continue,
            };

            let world_transform = parent_world.mul_transform(&local);

            let updated = world
                .get::<&mut WorldTransform>(entity)
                .map(|mut wt| wt.0 = world_transform)
                .is_ok();
            if !updated {
                if let Err(err) = world.insert_one(entity, WorldTransform(world_transform)) {
                    log::error!("Failed to cache world transform for {:?}: {:?}", entity, err);
                    continue;
                }
            }

            if let Ok(children) = world.get::<&Children>(entity) {
                for &child in children.0.iter().rev() {
                    stack.push((child, world_transform));
                }
            }
        }
    }
}

/// World-space box of a mesh's local bounds under an entity transform.
pub(crate) fn world_bounds_of(local: Aabb, world: &Transform) -> Aabb {
    local.transformed(world.matrix())
}

/// Refresh every meshed entity's cached world bounding box from its mesh's
/// local bounds. Runs after transform propagation.
pub(crate) fn update_world_bounds(world: &mut World, assets: &Assets) {
    let mut missing: Vec<(hecs::Entity, Aabb)> = Vec::new();

    for (entity, (mesh, world_transform, bounds)) in world
        .query::<(&MeshComponent, &WorldTransform, Option<&mut WorldBounds>)>()
        .iter()
    {
        let Some(mesh) = assets.meshes.get(mesh.0) else {
            log::warn!("Entity {:?} references a missing mesh", entity);
            continue;
        };
        let world_bounds = world_bounds_of(mesh.bounds(), &world_transform.0);
        match bounds {
            Some(cached) => cached.0 = world_bounds,
            None => missing.push((entity, world_bounds)),
        }
    }

    for (entity, bounds) in missing {
        if let Err(err) = world.insert_one(entity, WorldBounds(bounds)) {
            log::error!("Failed to cache world bounds for {:?}: {:?}", entity, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::components::Name;
    use glam::{Quat, Vec3};

    #[test]
    fn propagation_composes_parent_translation() {
        let mut world = World::new();

        let parent = world.spawn((
            Name::new("parent"),
            TransformComponent(Transform::from_translation(Vec3::new(5.0, 0.0, 0.0))),
        ));
        let child = world.spawn((
            Name::new("child"),
            TransformComponent(Transform::from_translation(Vec3::new(2.0, 0.0, 0.0))),
            Parent(parent),
        ));
        world.insert_one(parent, Children(vec![child])).ok();

        propagate_transforms(&mut world);

        let parent_world = world.get::<&WorldTransform>(parent).unwrap();
        assert_eq!(parent_world.0.translation, Vec3::new(5.0, 0.0, 0.0));

        let child_world = world.get::<&WorldTransform>(child).unwrap();
        assert_eq!(child_world.0.translation, Vec3::new(7.0, 0.0, 0.0));
    }

    #[test]
    fn propagation_applies_parent_scale_and_rotation() {
        let mut world = World::new();

        let parent = world.spawn((TransformComponent(Transform::from_trs(
            Vec3::ZERO,
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            Vec3::splat(2.0),
        )),));
        let child = world.spawn((
            TransformComponent(Transform::from_translation(Vec3::new(1.0, 0.0, 0.0))),
            Parent(parent),
        ));
        world.insert_one(parent, Children(vec![child])).ok();

        propagate_transforms(&mut world);

        let child_world = world.get::<&WorldTransform>(child).unwrap();
        // Scaled by 2, then rotated 90° about Y: +X lands on −Z.
        assert!(child_world
            .0
            .translation
            .abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), 1e-5));
    }

    #[test]
    fn repropagation_tracks_parent_mutation() {
        let mut world = World::new();

        let parent = world.spawn((TransformComponent(Transform::IDENTITY),));
        let child = world.spawn((
            TransformComponent(Transform::from_translation(Vec3::new(2.0, 0.0, 0.0))),
            Parent(parent),
        ));
        world.insert_one(parent, Children(vec![child])).ok();

        propagate_transforms(&mut world);
        {
            let mut parent_local = world.get::<&mut TransformComponent>(parent).unwrap();
            parent_local.0.translation = Vec3::new(1.0, 0.0, 0.0);
        }
        propagate_transforms(&mut world);

        let child_world = world.get::<&WorldTransform>(child).unwrap();
        assert_eq!(child_world.0.translation, Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn world_bounds_follow_the_entity_transform() {
        let local = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let transform = Transform::from_trs(
            Vec3::new(10.0, 0.0, 0.0),
            Quat::IDENTITY,
            Vec3::splat(2.0),
        );
        let bounds = world_bounds_of(local, &transform);
        assert!(bounds.center.abs_diff_eq(Vec3::new(10.0, 0.0, 0.0), 1e-5));
        assert!(bounds.half_extents.abs_diff_eq(Vec3::splat(2.0), 1e-5));
    }
}
