use crate::scene::light::Light;

/// Fixed resolution of one shadow tile; the atlas is one tile tall and one
/// tile wide per shadow-casting light.
pub const SHADOW_TILE_SIZE: u32 = 2048;

/// Width in pixels of an atlas holding `tile_count` tiles.
pub const fn atlas_width(tile_count: u32) -> u32 {
    SHADOW_TILE_SIZE * tile_count
}

/// Walk the ordered light list and hand each cast-shadow light the next
/// sequential atlas slot, clearing the slot of everything else. Returns the
/// caster count. Re-running over an unchanged caster set reassigns identical
/// slots, which is what keeps shadow lookups stable between rebuilds.
pub fn assign_shadow_slots(lights: &mut [Light]) -> u32 {
    let mut next_slot = 0u32;
    for light in lights {
        if light.cast_shadows {
            light.shadow_slot = Some(next_slot);
            next_slot += 1;
        } else {
            light.shadow_slot = None;
        }
    }
    next_slot
}

/// Ordered positions of the cast-shadow lights; when this changes (a light
/// added, removed, or toggled) the atlas must be rebuilt.
pub fn caster_signature(lights: &[Light]) -> Vec<usize> {
    lights
        .iter()
        .enumerate()
        .filter(|(_, light)| light.cast_shadows)
        .map(|(index, _)| index)
        .collect()
}

/// One wide depth-only texture shared by every shadow-casting light. Owned by
/// the scene; written by the shadow pass, sampled by the color pass and the
/// debug viewer.
pub struct ShadowAtlas {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub tile_count: u32,
    signature: Vec<usize>,
}

impl ShadowAtlas {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Allocate an atlas for `tile_count` casters. Returns `None` when there
    /// is nothing to allocate or the device cannot hold a texture this wide;
    /// in the latter case shadows are disabled scene-wide for the frame.
    pub fn build(
        device: &wgpu::Device,
        tile_count: u32,
        signature: Vec<usize>,
    ) -> Option<Self> {
        if tile_count == 0 {
            return None;
        }

        let width = atlas_width(tile_count);
        let max_dim = device.limits().max_texture_dimension_2d;
        if width > max_dim {
            log::warn!(
                "Shadow atlas for {} casters needs width {} (device limit {}); \
                 shadows disabled",
                tile_count,
                width,
                max_dim
            );
            return None;
        }

        log::info!(
            "Allocating shadow atlas: {} tiles, {}x{}",
            tile_count,
            width,
            SHADOW_TILE_SIZE
        );

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("ShadowAtlas"),
            size: wgpu::Extent3d {
                width,
                height: SHADOW_TILE_SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Some(Self {
            texture,
            view,
            tile_count,
            signature,
        })
    }

    /// True when the atlas still matches the scene's caster set.
    pub fn matches(&self, signature: &[usize]) -> bool {
        self.signature == signature
    }

    /// Pixel rectangle of one tile: (x, y, width, height).
    pub fn tile_viewport(&self, slot: u32) -> (u32, u32, u32, u32) {
        debug_assert!(slot < self.tile_count);
        (slot * SHADOW_TILE_SIZE, 0, SHADOW_TILE_SIZE, SHADOW_TILE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::light::LightKind;
    use crate::scene::transform::Transform;

    fn light(cast_shadows: bool) -> Light {
        let mut light = Light::new(LightKind::Point, Transform::IDENTITY);
        light.cast_shadows = cast_shadows;
        light
    }

    #[test]
    fn slots_are_sequential_in_scene_order() {
        let mut lights = vec![light(true), light(false), light(true), light(true)];
        let count = assign_shadow_slots(&mut lights);
        assert_eq!(count, 3);
        assert_eq!(lights[0].shadow_slot, Some(0));
        assert_eq!(lights[1].shadow_slot, None);
        assert_eq!(lights[2].shadow_slot, Some(1));
        assert_eq!(lights[3].shadow_slot, Some(2));
    }

    #[test]
    fn reassignment_is_stable_for_a_fixed_caster_set() {
        let mut lights = vec![light(true), light(true), light(false), light(true)];
        assign_shadow_slots(&mut lights);
        let first: Vec<_> = lights.iter().map(|l| l.shadow_slot).collect();

        assign_shadow_slots(&mut lights);
        let second: Vec<_> = lights.iter().map(|l| l.shadow_slot).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn toggling_shadows_clears_the_slot() {
        let mut lights = vec![light(true), light(true)];
        assign_shadow_slots(&mut lights);
        assert_eq!(lights[1].shadow_slot, Some(1));

        lights[1].cast_shadows = false;
        let count = assign_shadow_slots(&mut lights);
        assert_eq!(count, 1);
        assert_eq!(lights[1].shadow_slot, None);
    }

    #[test]
    fn signature_tracks_caster_membership() {
        let mut lights = vec![light(true), light(false), light(true)];
        assert_eq!(caster_signature(&lights), vec![0, 2]);

        lights[1].cast_shadows = true;
        assert_eq!(caster_signature(&lights), vec![0, 1, 2]);

        lights[0].cast_shadows = false;
        assert_eq!(caster_signature(&lights), vec![1, 2]);
    }

    #[test]
    fn zero_casters_means_no_slots() {
        let mut lights = vec![light(false), light(false)];
        assert_eq!(assign_shadow_slots(&mut lights), 0);
        assert!(caster_signature(&lights).is_empty());
    }

    #[test]
    fn atlas_width_is_tile_size_times_count() {
        assert_eq!(atlas_width(0), 0);
        assert_eq!(atlas_width(1), SHADOW_TILE_SIZE);
        assert_eq!(atlas_width(4), SHADOW_TILE_SIZE * 4);
    }
}
