pub mod bounds;
pub mod camera;
pub mod components;
pub mod frustum;
mod internal;
pub mod light;
#[allow(clippy::module_inception)]
mod scene;
pub mod transform;

pub use bounds::Aabb;
pub use camera::Camera;
pub use frustum::{Frustum, Relation};
pub use light::{Light, LightKind, ShadowCamera, SHADOW_NEAR_PLANE};
pub use scene::Scene;
pub use transform::Transform;

pub use components::{
    Children, MaterialComponent, MeshComponent, Name, Parent, RenderableKind, TransformComponent,
    Visible, WorldBounds, WorldTransform,
};
