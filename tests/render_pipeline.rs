// CPU-side pipeline properties: call sorting, frustum culling decisions,
// light batching, and shadow-slot bookkeeping, exercised together the way
// one frame drives them.

use glam::{Mat4, Vec3};

use lantern::asset::Handle;
use lantern::renderer::{
    assign_shadow_slots, caster_signature, plan_light_batches, sort_render_calls,
    LightsBlock, RenderCall, MAX_LIGHTS_PER_BATCH,
};
use lantern::scene::{Aabb, Camera, Light, LightKind, Transform};

fn call(distance: f32, blended: bool, center: Vec3) -> RenderCall {
    RenderCall {
        mesh: Handle::new(0),
        material: Handle::new(0),
        model: Mat4::IDENTITY,
        bounds: Aabb::new(center, Vec3::ONE),
        distance_to_camera: distance,
        blended,
    }
}

fn point_light(index: usize) -> Light {
    Light::new(
        LightKind::Point,
        Transform::from_translation(Vec3::new(index as f32, 2.0, 0.0)),
    )
    .with_intensity(index as f32 + 1.0)
}

#[test]
fn sorted_calls_never_interleave_classes() {
    let mut calls: Vec<RenderCall> = (0..20)
        .map(|i| call((i * 7 % 13) as f32, i % 3 == 0, Vec3::ZERO))
        .collect();
    sort_render_calls(&mut calls);

    let first_blended = calls.iter().position(|c| c.blended).unwrap();
    assert!(calls[..first_blended].iter().all(|c| !c.blended));
    assert!(calls[first_blended..].iter().all(|c| c.blended));

    let opaque: Vec<f32> = calls[..first_blended]
        .iter()
        .map(|c| c.distance_to_camera)
        .collect();
    assert!(opaque.windows(2).all(|w| w[0] <= w[1]));

    let blended: Vec<f32> = calls[first_blended..]
        .iter()
        .map(|c| c.distance_to_camera)
        .collect();
    assert!(blended.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn culling_excludes_fully_outside_boxes_and_keeps_straddlers() {
    let camera = Camera {
        eye: Vec3::new(0.0, 0.0, 10.0),
        target: Vec3::ZERO,
        ..Camera::default()
    };
    let frustum = camera.frustum(1.0);

    let visible = call(10.0, false, Vec3::ZERO);
    let behind = call(10.0, false, Vec3::new(0.0, 0.0, 30.0));

    assert!(frustum.intersects(&visible.bounds));
    assert!(!frustum.intersects(&behind.bounds));

    // A box poking across the far plane still draws.
    let far_edge = camera.far;
    let straddling = call(
        far_edge,
        false,
        Vec3::new(0.0, 0.0, 10.0 - far_edge),
    );
    assert!(frustum.intersects(&straddling.bounds));
}

#[test]
fn seven_lights_batch_as_five_plus_two() {
    let lights: Vec<Light> = (0..7).map(point_light).collect();
    let ambient = Vec3::new(0.2, 0.2, 0.2);
    let batches = plan_light_batches(&lights, ambient, false);

    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].light_count(), 5);
    assert_eq!(batches[1].light_count(), 2);

    // First draw: scene ambient, normal blending, not the last iteration.
    assert!(batches[0].ambient().abs_diff_eq(ambient, 1e-6));
    assert!(!batches[0].is_last());

    // Second draw: zero ambient, additive accumulation, last iteration.
    assert_eq!(batches[1].ambient(), Vec3::ZERO);
    assert!(batches[1].is_last());
}

#[test]
fn batch_slices_are_disjoint_and_cover_every_light() {
    for n in [1usize, 4, 5, 6, 11, 23] {
        let lights: Vec<Light> = (0..n).map(point_light).collect();
        let batches = plan_light_batches(&lights, Vec3::ZERO, false);

        assert_eq!(batches.len(), n.div_ceil(MAX_LIGHTS_PER_BATCH));

        let marshalled: Vec<f32> = batches
            .iter()
            .flat_map(|b: &LightsBlock| {
                (0..b.light_count() as usize).map(|s| b.lights[s].color_intensity[3])
            })
            .collect();
        let expected: Vec<f32> = (0..n).map(|i| i as f32 + 1.0).collect();
        assert_eq!(marshalled, expected);
    }
}

#[test]
fn slot_assignment_is_stable_until_membership_changes() {
    let mut lights: Vec<Light> = (0..6).map(point_light).collect();
    lights[1].cast_shadows = true;
    lights[3].cast_shadows = true;
    lights[4].cast_shadows = true;

    let count = assign_shadow_slots(&mut lights);
    assert_eq!(count, 3);
    let signature = caster_signature(&lights);
    assert_eq!(signature, vec![1, 3, 4]);
    let slots: Vec<_> = lights.iter().map(|l| l.shadow_slot).collect();

    // Rebuilds with the same membership reproduce the same slots.
    assign_shadow_slots(&mut lights);
    assert_eq!(
        lights.iter().map(|l| l.shadow_slot).collect::<Vec<_>>(),
        slots
    );

    // Toggling one caster shifts everyone behind it and changes the
    // signature, which is the rebuild trigger.
    lights[1].cast_shadows = false;
    let count = assign_shadow_slots(&mut lights);
    assert_eq!(count, 2);
    assert_ne!(caster_signature(&lights), signature);
    assert_eq!(lights[3].shadow_slot, Some(0));
    assert_eq!(lights[4].shadow_slot, Some(1));
}

#[test]
fn hidden_light_keeps_its_slot_but_leaves_the_batches() {
    let mut lights: Vec<Light> = (0..3).map(point_light).collect();
    lights[0].cast_shadows = true;
    lights[2].cast_shadows = true;
    assign_shadow_slots(&mut lights);

    lights[2].visible = false;

    // Membership (cast_shadows) did not change: no rebuild needed.
    assert_eq!(caster_signature(&lights), vec![0, 2]);
    assert_eq!(lights[2].shadow_slot, Some(1));

    // But the hidden light contributes to no batch this frame.
    let batches = plan_light_batches(&lights, Vec3::ZERO, false);
    let total: u32 = batches.iter().map(|b| b.light_count()).sum();
    assert_eq!(total, 2);
}
