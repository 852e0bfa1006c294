// renderer/instances.rs
use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::renderer::error::{allocate, buffer_size, RenderError};

/// Hard upper bound on instances per draw.
pub const MAX_INSTANCES: usize = 1000;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4], // 64 bytes, column-major
}

impl InstanceRaw {
    pub const SIZE: wgpu::BufferAddress = std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress;

    pub fn from_matrix(model: &Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }
}

/// CPU mirror of the instance buffer.
///
/// Slots past the last write keep whatever an earlier, larger update left
/// there, exactly like the device buffer does.
#[derive(Debug)]
pub struct InstanceStaging {
    slots: Vec<InstanceRaw>,
    count: usize,
}

impl InstanceStaging {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![InstanceRaw::zeroed(); capacity],
            count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of transforms written by the last successful [`stage`](Self::stage).
    pub fn count(&self) -> usize {
        self.count
    }

    /// Every slot, including stale ones beyond [`count`](Self::count).
    pub fn contents(&self) -> &[InstanceRaw] {
        &self.slots
    }

    /// Copies `transforms` into slots `0..len` and returns those slots.
    /// Over capacity nothing is touched.
    pub fn stage(&mut self, transforms: &[Mat4]) -> Result<&[InstanceRaw], RenderError> {
        let requested = transforms.len();
        if requested > self.capacity() {
            return Err(RenderError::CapacityExceeded {
                requested,
                capacity: self.capacity(),
            });
        }

        for (slot, transform) in self.slots.iter_mut().zip(transforms) {
            *slot = InstanceRaw::from_matrix(transform);
        }
        self.count = requested;

        Ok(&self.slots[..requested])
    }
}

/// Fixed-capacity per-instance transform buffer, rewritten every frame.
pub struct InstanceTransformBuffer {
    buffer: wgpu::Buffer,
    staging: InstanceStaging,
}

impl InstanceTransformBuffer {
    pub fn new(device: &wgpu::Device, capacity: usize) -> Result<Self, RenderError> {
        let size = buffer_size("instance transform buffer", capacity, InstanceRaw::SIZE)?;

        // Buffers created unmapped start out zero-filled.
        let buffer = allocate(device, "instance transform buffer", || {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("InstanceTransformBuffer"),
                size,
                usage: wgpu::BufferUsages::VERTEX
                    | wgpu::BufferUsages::COPY_DST
                    | wgpu::BufferUsages::COPY_SRC,
                mapped_at_creation: false,
            })
        })?;

        log::info!(
            "Created instance transform buffer: {} slots, {} bytes",
            capacity,
            size
        );

        Ok(Self {
            buffer,
            staging: InstanceStaging::new(capacity),
        })
    }

    /// Replaces the first `transforms.len()` slots, in order.
    ///
    /// The upload is queued and lands before the next submission on
    /// `queue`, so the draw reading it must be submitted after this call.
    pub fn update(&mut self, queue: &wgpu::Queue, transforms: &[Mat4]) -> Result<(), RenderError> {
        let staged = match self.staging.stage(transforms) {
            Ok(staged) => staged,
            Err(err) => {
                log::error!("{}. Keeping previous instance data.", err);
                return Err(err);
            }
        };

        if !staged.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(staged));
        }

        log::trace!("Uploaded {} instance transforms", transforms.len());
        Ok(())
    }

    /// Per-frame variant of [`update`](Self::update). An over-capacity list
    /// is reported and skipped, leaving the previous transforms and count in
    /// place so the frame still draws. Returns whether the list was applied.
    pub fn update_for_frame(&mut self, queue: &wgpu::Queue, transforms: &[Mat4]) -> bool {
        self.update(queue, transforms).is_ok()
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn capacity(&self) -> usize {
        self.staging.capacity()
    }

    /// Instances written by the last successful update; the draw count.
    pub fn instance_count(&self) -> u32 {
        self.staging.count() as u32
    }

    pub fn staging(&self) -> &InstanceStaging {
        &self.staging
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn translations(n: usize, offset: f32) -> Vec<Mat4> {
        (0..n)
            .map(|i| Mat4::from_translation(Vec3::new(i as f32 + offset, 0.0, 0.0)))
            .collect()
    }

    #[test]
    fn instance_raw_is_64_bytes() {
        assert_eq!(std::mem::size_of::<InstanceRaw>(), 64);
        assert_eq!(InstanceRaw::SIZE, 64);
    }

    #[test]
    fn instance_raw_is_column_major() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let raw = InstanceRaw::from_matrix(&m);
        assert_eq!(raw.model[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(raw.matrix(), m);
    }

    #[test]
    fn staging_starts_zeroed() {
        let staging = InstanceStaging::new(8);
        assert_eq!(staging.count(), 0);
        assert!(staging
            .contents()
            .iter()
            .all(|slot| *slot == InstanceRaw::zeroed()));
    }

    #[test]
    fn full_capacity_is_accepted() {
        let mut staging = InstanceStaging::new(MAX_INSTANCES);
        let staged = staging.stage(&translations(MAX_INSTANCES, 0.0)).unwrap().len();
        assert_eq!(staged, MAX_INSTANCES);
        assert_eq!(staging.count(), MAX_INSTANCES);
    }

    #[test]
    fn over_capacity_leaves_contents_unchanged() {
        let mut staging = InstanceStaging::new(MAX_INSTANCES);
        staging.stage(&translations(10, 0.0)).unwrap();
        let before = staging.contents().to_vec();

        let err = staging
            .stage(&translations(MAX_INSTANCES + 1, 100.0))
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::CapacityExceeded {
                requested: 1001,
                capacity: 1000
            }
        ));
        assert_eq!(staging.contents(), &before[..]);
        assert_eq!(staging.count(), 10);
    }

    #[test]
    fn empty_update_draws_nothing() {
        let mut staging = InstanceStaging::new(4);
        staging.stage(&translations(3, 0.0)).unwrap();
        assert!(staging.stage(&[]).unwrap().is_empty());
        assert_eq!(staging.count(), 0);
    }

    #[test]
    fn smaller_update_keeps_stale_tail() {
        let mut staging = InstanceStaging::new(4);
        staging.stage(&translations(4, 0.0)).unwrap();
        staging.stage(&translations(2, 50.0)).unwrap();

        let slots = staging.contents();
        assert_eq!(slots[0].model[3][0], 50.0);
        assert_eq!(slots[1].model[3][0], 51.0);
        // untouched by the second update
        assert_eq!(slots[2].model[3][0], 2.0);
        assert_eq!(slots[3].model[3][0], 3.0);
        assert_eq!(staging.count(), 2);
    }

    #[test]
    fn sequence_position_is_slot_index() {
        let mut staging = InstanceStaging::new(16);
        let transforms = translations(16, 0.5);
        let staged = staging.stage(&transforms).unwrap();
        for (k, slot) in staged.iter().enumerate() {
            assert_eq!(slot.matrix(), transforms[k]);
        }
    }
}
