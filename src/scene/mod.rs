// scene/mod.rs

pub mod camera;
pub mod grid;

pub use camera::Camera;
pub use grid::CubeGrid;
