use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::scene::light::{Light, LightKind};

/// The lighting shader holds at most this many lights per draw; scenes with
/// more lights accumulate additively across several draws of the same mesh.
pub const MAX_LIGHTS_PER_BATCH: usize = 5;

const KIND_POINT: f32 = 0.0;
const KIND_SPOT: f32 = 1.0;
const KIND_DIRECTIONAL: f32 = 2.0;

/// GPU mirror of one light, 16-byte aligned for WGSL uniform arrays.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct LightRaw {
    /// xyz = position, w = max distance.
    pub position_range: [f32; 4],
    /// rgb = color, w = intensity.
    pub color_intensity: [f32; 4],
    /// xyz = forward (spot and directional), w = kind discriminant.
    pub direction_kind: [f32; 4],
    /// x = spot exponent, y = cos(cone angle), zw unused.
    pub cone: [f32; 4],
    /// x = shadows enabled, y = atlas slot, z = bias, w unused.
    pub shadow: [f32; 4],
    pub shadow_view_proj: [[f32; 4]; 4],
}

impl LightRaw {
    fn from_light(light: &Light, atlas_ready: bool) -> Self {
        let position = light.position();
        let forward = light.transform.forward();

        let (kind, cone) = match light.kind {
            LightKind::Point => (KIND_POINT, [0.0; 4]),
            LightKind::Spot {
                cone_angle,
                cone_exp,
            } => (KIND_SPOT, [cone_exp, cone_angle.cos(), 0.0, 0.0]),
            LightKind::Directional { .. } => (KIND_DIRECTIONAL, [0.0; 4]),
        };

        let mut raw = Self {
            position_range: [position.x, position.y, position.z, light.max_distance],
            color_intensity: [
                light.color.x,
                light.color.y,
                light.color.z,
                light.intensity,
            ],
            direction_kind: [forward.x, forward.y, forward.z, kind],
            cone,
            shadow: [0.0; 4],
            shadow_view_proj: [[0.0; 4]; 4],
        };

        // Shadow lookups only make sense once the atlas exists and the light
        // has a slot plus an aimed shadow camera.
        if atlas_ready && light.cast_shadows {
            if let (Some(slot), Some(camera)) = (light.shadow_slot, &light.shadow_camera) {
                raw.shadow = [1.0, slot as f32, light.shadow_bias, 0.0];
                raw.shadow_view_proj = camera.view_proj.to_cols_array_2d();
            }
        }

        raw
    }
}

/// One batch's whole uniform block: exactly what one accumulation draw sees.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct LightsBlock {
    /// x = lights in this batch, y = last-iteration flag, zw unused.
    pub counts: [u32; 4],
    /// rgb = ambient term for this batch, w unused.
    pub ambient: [f32; 4],
    pub lights: [LightRaw; MAX_LIGHTS_PER_BATCH],
}

impl LightsBlock {
    pub fn light_count(&self) -> u32 {
        self.counts[0]
    }

    pub fn is_last(&self) -> bool {
        self.counts[1] == 1
    }

    pub fn ambient(&self) -> Vec3 {
        Vec3::new(self.ambient[0], self.ambient[1], self.ambient[2])
    }
}

/// Partition the scene's visible lights into consecutive batches, preserving
/// scene order. Ambient is applied in the first batch only; the final batch
/// carries the last-iteration flag that gates the shader's one-time output
/// finalization. Returns an empty vec when no light is visible, in which case
/// the caller skips the color pass entirely.
pub fn plan_light_batches(lights: &[Light], ambient: Vec3, atlas_ready: bool) -> Vec<LightsBlock> {
    let visible: Vec<&Light> = lights.iter().filter(|light| light.visible).collect();
    if visible.is_empty() {
        return Vec::new();
    }

    let batch_count = visible.len().div_ceil(MAX_LIGHTS_PER_BATCH);

    visible
        .chunks(MAX_LIGHTS_PER_BATCH)
        .enumerate()
        .map(|(batch_index, chunk)| {
            let batch_ambient = if batch_index == 0 { ambient } else { Vec3::ZERO };

            let mut block = LightsBlock::zeroed();
            block.counts[0] = chunk.len() as u32;
            block.counts[1] = u32::from(batch_index == batch_count - 1);
            block.ambient = [batch_ambient.x, batch_ambient.y, batch_ambient.z, 0.0];

            for (slot, &light) in chunk.iter().enumerate() {
                block.lights[slot] = LightRaw::from_light(light, atlas_ready);
            }

            block
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::transform::Transform;
    use glam::Vec3;

    fn point_light() -> Light {
        Light::new(LightKind::Point, Transform::from_translation(Vec3::ONE))
    }

    fn lights(n: usize) -> Vec<Light> {
        (0..n)
            .map(|i| {
                point_light()
                    .with_intensity(i as f32 + 1.0)
                    .with_max_distance(10.0 * (i as f32 + 1.0))
            })
            .collect()
    }

    #[test]
    fn batch_sizes_partition_the_light_list() {
        for (count, expected) in [
            (1usize, vec![1u32]),
            (5, vec![5]),
            (6, vec![5, 1]),
            (7, vec![5, 2]),
            (12, vec![5, 5, 2]),
        ] {
            let batches = plan_light_batches(&lights(count), Vec3::ZERO, false);
            let sizes: Vec<u32> = batches.iter().map(LightsBlock::light_count).collect();
            assert_eq!(sizes, expected, "{} lights", count);
            assert_eq!(sizes.iter().sum::<u32>() as usize, count);
        }
    }

    #[test]
    fn batches_preserve_scene_order() {
        let batches = plan_light_batches(&lights(7), Vec3::ZERO, false);
        // Intensity encodes the original index (i + 1).
        let mut expected = 1.0;
        for block in &batches {
            for slot in 0..block.light_count() as usize {
                assert_eq!(block.lights[slot].color_intensity[3], expected);
                expected += 1.0;
            }
        }
    }

    #[test]
    fn ambient_applies_in_first_batch_only() {
        let ambient = Vec3::new(0.1, 0.2, 0.3);
        let batches = plan_light_batches(&lights(12), ambient, false);
        assert!(batches[0].ambient().abs_diff_eq(ambient, 1e-6));
        for block in &batches[1..] {
            assert_eq!(block.ambient(), Vec3::ZERO);
        }
    }

    #[test]
    fn last_iteration_flag_marks_only_the_final_batch() {
        let batches = plan_light_batches(&lights(7), Vec3::ZERO, false);
        assert_eq!(batches.len(), 2);
        assert!(!batches[0].is_last());
        assert!(batches[1].is_last());

        let single = plan_light_batches(&lights(3), Vec3::ZERO, false);
        assert!(single[0].is_last());
    }

    #[test]
    fn invisible_lights_are_excluded_without_renumbering() {
        let mut all = lights(7);
        all[2].visible = false;
        all[5].visible = false;

        let batches = plan_light_batches(&all, Vec3::ZERO, false);
        let total: u32 = batches.iter().map(LightsBlock::light_count).sum();
        assert_eq!(total, 5);

        let intensities: Vec<f32> = batches
            .iter()
            .flat_map(|b| {
                (0..b.light_count() as usize).map(|s| b.lights[s].color_intensity[3])
            })
            .collect();
        assert_eq!(intensities, vec![1.0, 2.0, 4.0, 5.0, 7.0]);
    }

    #[test]
    fn zero_lights_yields_no_batches() {
        assert!(plan_light_batches(&[], Vec3::ONE, false).is_empty());

        let mut one = lights(1);
        one[0].visible = false;
        assert!(plan_light_batches(&one, Vec3::ONE, false).is_empty());
    }

    #[test]
    fn spot_lights_marshal_direction_and_cone() {
        let light = Light::new(
            LightKind::Spot {
                cone_angle: 45f32.to_radians(),
                cone_exp: 30.0,
            },
            Transform::IDENTITY,
        );
        let batches = plan_light_batches(std::slice::from_ref(&light), Vec3::ZERO, false);
        let raw = &batches[0].lights[0];

        assert_eq!(raw.direction_kind[3], KIND_SPOT);
        // Identity transform: forward is −Z.
        assert_eq!(raw.direction_kind[2], -1.0);
        assert_eq!(raw.cone[0], 30.0);
        assert!((raw.cone[1] - 45f32.to_radians().cos()).abs() < 1e-6);
    }

    #[test]
    fn shadow_params_marshal_only_with_atlas_and_slot() {
        let mut light = Light::new(
            LightKind::Spot {
                cone_angle: 30f32.to_radians(),
                cone_exp: 20.0,
            },
            Transform::from_translation(Vec3::new(0.0, 5.0, 0.0)),
        )
        .with_shadows(0.002);
        light.shadow_slot = Some(3);
        light.refresh_shadow_camera();

        // Atlas present: full shadow parameters.
        let with_atlas = plan_light_batches(std::slice::from_ref(&light), Vec3::ZERO, true);
        let raw = &with_atlas[0].lights[0];
        assert_eq!(raw.shadow[0], 1.0);
        assert_eq!(raw.shadow[1], 3.0);
        assert_eq!(raw.shadow[2], 0.002);

        // No atlas this frame: shadows disabled for the shader.
        let without_atlas = plan_light_batches(std::slice::from_ref(&light), Vec3::ZERO, false);
        assert_eq!(without_atlas[0].lights[0].shadow[0], 0.0);

        // Caster without an assigned slot yet: also disabled.
        light.shadow_slot = None;
        let unslotted = plan_light_batches(std::slice::from_ref(&light), Vec3::ZERO, true);
        assert_eq!(unslotted[0].lights[0].shadow[0], 0.0);
    }

    #[test]
    fn lights_block_layout_matches_wgsl() {
        assert_eq!(std::mem::size_of::<LightRaw>(), 144);
        assert_eq!(
            std::mem::size_of::<LightsBlock>(),
            32 + MAX_LIGHTS_PER_BATCH * 144
        );
    }
}
