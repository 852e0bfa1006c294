use glam::Vec3;

/// Size of the light array in the fragment stage.
pub const MAX_LIGHTS: usize = 12;

/// Fixed-size point light storage with an explicit active length.
///
/// Positions in slots at or beyond `active` are kept but never shaded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSlots {
    positions: [Vec3; MAX_LIGHTS],
    active: usize,
}

impl Default for LightSlots {
    fn default() -> Self {
        Self {
            positions: [Vec3::ZERO; MAX_LIGHTS],
            active: 0,
        }
    }
}

impl LightSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> usize {
        self.active
    }

    /// Sets how many slots are shaded. Counts above [`MAX_LIGHTS`] are
    /// clamped; returns `false` when that happened.
    pub fn set_active(&mut self, count: usize) -> bool {
        if count > MAX_LIGHTS {
            log::warn!(
                "Light count {} exceeds maximum of {}. Clamping.",
                count,
                MAX_LIGHTS
            );
            self.active = MAX_LIGHTS;
            return false;
        }
        self.active = count;
        true
    }

    /// Writes slot `slot` if it is active. Anything else is ignored and
    /// reported through the return value only.
    pub fn set_position(&mut self, slot: usize, position: Vec3) -> bool {
        if slot >= self.active {
            log::trace!(
                "Ignoring light position for slot {} ({} active)",
                slot,
                self.active
            );
            return false;
        }
        self.positions[slot] = position;
        true
    }

    /// Positions of the active slots.
    pub fn active_positions(&self) -> &[Vec3] {
        &self.positions[..self.active]
    }

    /// Entire backing store, active or not.
    pub fn slots(&self) -> &[Vec3; MAX_LIGHTS] {
        &self.positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_no_active_lights() {
        let lights = LightSlots::new();
        assert_eq!(lights.active(), 0);
        assert!(lights.active_positions().is_empty());
    }

    #[test]
    fn writes_within_active_range_land() {
        let mut lights = LightSlots::new();
        assert!(lights.set_active(2));
        assert!(lights.set_position(1, Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(lights.active_positions()[1], Vec3::new(1.0, 2.0, 3.0));
    }

    // Out-of-range slots are a silent no-op rather than an error.
    #[test]
    fn writes_beyond_active_count_are_ignored() {
        let mut lights = LightSlots::new();
        lights.set_active(1);
        assert!(!lights.set_position(1, Vec3::ONE));
        assert_eq!(lights.slots()[1], Vec3::ZERO);
    }

    #[test]
    fn writes_beyond_array_are_ignored() {
        let mut lights = LightSlots::new();
        lights.set_active(MAX_LIGHTS);
        assert!(!lights.set_position(MAX_LIGHTS, Vec3::ONE));
        assert!(!lights.set_position(usize::MAX, Vec3::ONE));
    }

    #[test]
    fn count_is_clamped_to_maximum() {
        let mut lights = LightSlots::new();
        assert!(!lights.set_active(MAX_LIGHTS + 5));
        assert_eq!(lights.active(), MAX_LIGHTS);
        assert!(lights.set_active(MAX_LIGHTS));
    }

    #[test]
    fn shrinking_keeps_stored_positions() {
        let mut lights = LightSlots::new();
        lights.set_active(3);
        lights.set_position(2, Vec3::X);
        lights.set_active(1);
        assert_eq!(lights.active_positions().len(), 1);
        lights.set_active(3);
        assert_eq!(lights.active_positions()[2], Vec3::X);
    }
}
