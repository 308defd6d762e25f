use crate::asset::{Handle, Mesh};
use crate::renderer::Material;
use crate::scene::bounds::Aabb;
use crate::scene::transform::Transform;

/// Which kind of renderable an entity is. The render-call builder matches on
/// this closed set instead of downcasting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderableKind {
    Character,
    Companion,
    WorldObject,
}

/// Local transform (relative to parent, if any).
#[derive(Debug, Clone, Copy)]
pub struct TransformComponent(pub Transform);

/// World-space transform, written by transform propagation.
#[derive(Debug, Clone, Copy)]
pub struct WorldTransform(pub Transform);

/// World-space bounding box, refreshed after transform propagation from the
/// mesh's local bounds.
#[derive(Debug, Clone, Copy)]
pub struct WorldBounds(pub Aabb);

#[derive(Debug, Clone, Copy)]
pub struct MeshComponent(pub Handle<Mesh>);

#[derive(Debug, Clone, Copy)]
pub struct MaterialComponent(pub Handle<Material>);

#[derive(Debug, Clone, Copy)]
pub struct Visible(pub bool);

impl Default for Visible {
    fn default() -> Self {
        Self(true)
    }
}

/// Debug-friendly entity name.
#[derive(Debug, Clone)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Parent(pub hecs::Entity);

#[derive(Debug, Clone)]
pub struct Children(pub Vec<hecs::Entity>);
