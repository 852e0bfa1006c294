//! Grid of spinning cubes, one transform per instance.

use glam::{Mat4, Quat, Vec3};

use crate::settings::GridSettings;

#[derive(Debug)]
pub struct CubeGrid {
    columns: usize,
    rows: usize,
    spacing: f32,
    spin_speed: f32,
    axis: Vec3,
    angle: f32,
    transforms: Vec<Mat4>,
}

impl CubeGrid {
    pub fn new(settings: &GridSettings) -> Self {
        let mut grid = Self {
            columns: settings.columns,
            rows: settings.rows,
            spacing: settings.spacing,
            spin_speed: settings.spin_speed,
            axis: Vec3::new(1.0, 1.0, 0.0).normalize(),
            angle: 0.0,
            transforms: Vec::with_capacity(settings.instance_count()),
        };
        grid.rebuild();
        grid
    }

    pub fn len(&self) -> usize {
        self.columns * self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Side length of the square that contains every cube centre.
    pub fn extent(&self) -> f32 {
        (self.columns.max(self.rows).saturating_sub(1)) as f32 * self.spacing
    }

    pub fn advance(&mut self, dt: f32) {
        self.angle = (self.angle + self.spin_speed * dt) % std::f32::consts::TAU;
        self.rebuild();
    }

    pub fn transforms(&self) -> &[Mat4] {
        &self.transforms
    }

    fn rebuild(&mut self) {
        self.transforms.clear();
        let x0 = (self.columns.saturating_sub(1)) as f32 * self.spacing * 0.5;
        let y0 = (self.rows.saturating_sub(1)) as f32 * self.spacing * 0.5;

        for row in 0..self.rows {
            for column in 0..self.columns {
                let index = row * self.columns + column;
                // Neighbours are phase shifted so the grid ripples.
                let phase = index as f32 * 0.15;
                let rotation = Quat::from_axis_angle(self.axis, self.angle + phase);
                let translation = Vec3::new(
                    column as f32 * self.spacing - x0,
                    row as f32 * self.spacing - y0,
                    0.0,
                );
                self.transforms
                    .push(Mat4::from_rotation_translation(rotation, translation));
            }
        }
        log::trace!("Rebuilt {} grid transforms", self.transforms.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(columns: usize, rows: usize) -> GridSettings {
        GridSettings {
            columns,
            rows,
            spacing: 2.0,
            spin_speed: 1.0,
        }
    }

    #[test]
    fn one_transform_per_cell() {
        let grid = CubeGrid::new(&settings(4, 3));
        assert_eq!(grid.len(), 12);
        assert_eq!(grid.transforms().len(), 12);
    }

    #[test]
    fn grid_is_centred_on_origin() {
        let grid = CubeGrid::new(&settings(3, 3));
        let sum: Vec3 = grid
            .transforms()
            .iter()
            .map(|m| m.w_axis.truncate())
            .sum();
        assert!(sum.length() < 1e-4);
        assert_eq!(grid.extent(), 4.0);
    }

    #[test]
    fn advancing_spins_but_keeps_positions() {
        let mut grid = CubeGrid::new(&settings(2, 2));
        let before = grid.transforms().to_vec();
        grid.advance(0.5);
        for (a, b) in before.iter().zip(grid.transforms()) {
            assert!(a.w_axis.abs_diff_eq(b.w_axis, 1e-5));
            assert!(!a.x_axis.abs_diff_eq(b.x_axis, 1e-5));
        }
    }

    #[test]
    fn empty_grid_has_no_transforms() {
        let grid = CubeGrid::new(&settings(3, 0));
        assert!(grid.is_empty());
        assert!(grid.transforms().is_empty());
    }
}
