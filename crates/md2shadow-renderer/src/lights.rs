// lights.rs — point light registry

use log::warn;

use md2shadow_common::mathlib::{vector_add, Vec3, VEC3_ORIGIN};

pub const MAX_LIGHTS: usize = 16;

pub const DEFAULT_LIGHT_SIZE: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub origin: Vec3,
    pub color: Vec3,
    pub size: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            origin: VEC3_ORIGIN,
            color: [1.0, 1.0, 1.0],
            size: DEFAULT_LIGHT_SIZE,
        }
    }
}

/// Names a light slot. A handle outlives its light harmlessly: once the slot
/// is freed or reused, lookups through the old handle fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightHandle {
    index: u16,
    generation: u32,
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    light: Option<PointLight>,
}

#[derive(Debug, Clone)]
pub struct LightSet {
    slots: Vec<Slot>,
}

impl Default for LightSet {
    fn default() -> Self {
        Self::new()
    }
}

impl LightSet {
    pub fn new() -> Self {
        Self {
            slots: vec![Slot::default(); MAX_LIGHTS],
        }
    }

    /// Add a default white light at `origin`. `None` when every slot is used.
    pub fn create(&mut self, origin: Vec3) -> Option<LightHandle> {
        let Some(index) = self.slots.iter().position(|s| s.light.is_none()) else {
            warn!("no free light slots ({} in use)", MAX_LIGHTS);
            return None;
        };

        let slot = &mut self.slots[index];
        slot.light = Some(PointLight {
            origin,
            ..PointLight::default()
        });
        Some(LightHandle {
            index: index as u16,
            generation: slot.generation,
        })
    }

    /// Remove a light. Returns false for a stale handle.
    pub fn destroy(&mut self, handle: LightHandle) -> bool {
        match self.slot_mut(handle) {
            Some(slot) => {
                slot.light = None;
                slot.generation = slot.generation.wrapping_add(1);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, handle: LightHandle) -> Option<&PointLight> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.light.as_ref())
    }

    pub fn get_mut(&mut self, handle: LightHandle) -> Option<&mut PointLight> {
        self.slot_mut(handle).and_then(|s| s.light.as_mut())
    }

    fn slot_mut(&mut self, handle: LightHandle) -> Option<&mut Slot> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|s| s.generation == handle.generation && s.light.is_some())
    }

    pub fn set_position(&mut self, handle: LightHandle, origin: Vec3) -> bool {
        self.get_mut(handle).map(|l| l.origin = origin).is_some()
    }

    pub fn translate(&mut self, handle: LightHandle, delta: Vec3) -> bool {
        self.get_mut(handle)
            .map(|l| l.origin = vector_add(&l.origin, &delta))
            .is_some()
    }

    pub fn set_size(&mut self, handle: LightHandle, size: f32) -> bool {
        self.get_mut(handle).map(|l| l.size = size).is_some()
    }

    pub fn set_color(&mut self, handle: LightHandle, color: Vec3) -> bool {
        self.get_mut(handle).map(|l| l.color = color).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.light.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live lights in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &PointLight> {
        self.slots.iter().filter_map(|s| s.light.as_ref())
    }

    pub fn positions(&self) -> Vec<Vec3> {
        self.iter().map(|l| l.origin).collect()
    }
}
