use std::cmp::Ordering;

use glam::Mat4;

use crate::asset::{Assets, Handle, Mesh};
use crate::renderer::Material;
use crate::scene::bounds::Aabb;
use crate::scene::components::{
    MaterialComponent, MeshComponent, RenderableKind, Visible, WorldBounds, WorldTransform,
};
use crate::scene::{Camera, Scene};

/// One frame's instruction to draw one mesh with one material at one
/// transform. Rebuilt from scratch every frame; borrows assets via handles.
#[derive(Clone, Copy, Debug)]
pub struct RenderCall {
    pub mesh: Handle<Mesh>,
    pub material: Handle<Material>,
    pub model: Mat4,
    pub bounds: Aabb,
    /// Distance from the bounds center to the active camera's look-at target,
    /// computed once at build time.
    pub distance_to_camera: f32,
    /// Snapshot of the material's alpha class so sorting needs no asset
    /// lookups.
    pub blended: bool,
}

/// Collect one render call per visible, fully specified renderable. Entities
/// without a mesh or material are a valid transient state and are skipped,
/// not an error.
pub fn build_render_calls(scene: &Scene, camera: &Camera, assets: &Assets) -> Vec<RenderCall> {
    let mut calls = Vec::new();

    for (_entity, (kind, visible, mesh, material, world, bounds)) in scene
        .world
        .query::<(
            &RenderableKind,
            &Visible,
            Option<&MeshComponent>,
            Option<&MaterialComponent>,
            &WorldTransform,
            Option<&WorldBounds>,
        )>()
        .iter()
    {
        if !visible.0 {
            continue;
        }
        let (Some(mesh), Some(material)) = (mesh, material) else {
            log::trace!("Skipping {:?} renderable with missing mesh/material", kind);
            continue;
        };

        let model = world.0.matrix();
        let world_bounds = bounds.map(|b| b.0).unwrap_or(Aabb::ZERO);

        calls.push(RenderCall {
            mesh: mesh.0,
            material: material.0,
            model,
            bounds: world_bounds,
            distance_to_camera: world_bounds.center.distance(camera.target),
            blended: assets
                .materials
                .get(material.0)
                .map(Material::is_blended)
                .unwrap_or(false),
        });
    }

    sort_render_calls(&mut calls);
    calls
}

/// Order calls for drawing: every non-blended call before every blended one,
/// non-blended nearest first, blended farthest first. Ties fall back to
/// handle indices so the order is a strict total order.
pub fn sort_render_calls(calls: &mut [RenderCall]) {
    calls.sort_unstable_by(compare_render_calls);
}

pub fn compare_render_calls(a: &RenderCall, b: &RenderCall) -> Ordering {
    match (a.blended, b.blended) {
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (false, false) => a
            .distance_to_camera
            .total_cmp(&b.distance_to_camera)
            .then_with(|| tie_break(a, b)),
        (true, true) => b
            .distance_to_camera
            .total_cmp(&a.distance_to_camera)
            .then_with(|| tie_break(a, b)),
    }
}

fn tie_break(a: &RenderCall, b: &RenderCall) -> Ordering {
    a.mesh
        .index()
        .cmp(&b.mesh.index())
        .then(a.material.index().cmp(&b.material.index()))
}
