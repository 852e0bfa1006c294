use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::renderer::{MAX_INSTANCES, MAX_LIGHTS};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    #[serde(default)]
    pub resolution: Resolution,
    #[serde(default)]
    pub present_mode: PresentModeSetting,
    #[serde(default = "RenderSettings::default_clear_color")]
    pub clear_color: [f64; 4],
    #[serde(default = "RenderSettings::default_cube_size")]
    pub cube_size: [f32; 3],
    #[serde(default)]
    pub grid: GridSettings,
    #[serde(default)]
    pub material: MaterialSettings,
    #[serde(default = "RenderSettings::default_lights")]
    pub lights: Vec<[f32; 3]>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            present_mode: PresentModeSetting::default(),
            clear_color: Self::default_clear_color(),
            cube_size: Self::default_cube_size(),
            grid: GridSettings::default(),
            material: MaterialSettings::default(),
            lights: Self::default_lights(),
        }
    }
}

impl RenderSettings {
    pub fn load() -> Self {
        Self::load_from_path("settings.json")
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Self {
        use std::fs;

        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|err| {
                warn!(
                    "Failed to parse {:?} ({}). Falling back to default render settings.",
                    path, err
                );
                RenderSettings::default()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "Render settings file {:?} not found. Using default settings.",
                    path
                );
                RenderSettings::default()
            }
            Err(err) => {
                warn!(
                    "Failed to read {:?} ({}). Falling back to default render settings.",
                    path, err
                );
                RenderSettings::default()
            }
        }
    }

    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        let settings = serde_json::from_str::<RenderSettings>(contents)?;
        info!("Loaded render settings");
        Ok(settings.validate())
    }

    fn validate(mut self) -> Self {
        if self.resolution.width == 0 || self.resolution.height == 0 {
            warn!("Resolution must be greater than zero. Using default resolution.");
            self.resolution = Resolution::default();
        }

        if self.cube_size.iter().any(|&extent| !(extent > 0.0)) {
            warn!(
                "Cube size {:?} has a non-positive extent. Using default size.",
                self.cube_size
            );
            self.cube_size = Self::default_cube_size();
        }

        if self.grid.columns == 0 {
            warn!("Grid needs at least one column. Using 1 instead.");
            self.grid.columns = 1;
        }

        if self.grid.instance_count() > MAX_INSTANCES {
            let rows = (MAX_INSTANCES / self.grid.columns).max(1);
            let columns = self.grid.columns.min(MAX_INSTANCES);
            warn!(
                "Grid of {}x{} exceeds {} instances. Using {}x{}.",
                self.grid.columns, self.grid.rows, MAX_INSTANCES, columns, rows
            );
            self.grid.columns = columns;
            self.grid.rows = rows;
        }

        if self.lights.len() > MAX_LIGHTS {
            warn!(
                "{} lights configured, only {} supported. Dropping the rest.",
                self.lights.len(),
                MAX_LIGHTS
            );
            self.lights.truncate(MAX_LIGHTS);
        }

        if !(self.material.shininess > 0.0) {
            warn!("Material shininess must be positive. Using default value.");
            self.material.shininess = MaterialSettings::default().shininess;
        }

        self
    }

    pub fn present_mode(&self, available: &[wgpu::PresentMode]) -> wgpu::PresentMode {
        let desired = self.present_mode.to_wgpu();
        if available.contains(&desired) {
            return desired;
        }

        warn!(
            "Requested present mode {:?} is not supported. Falling back to FIFO.",
            desired
        );

        if available.contains(&wgpu::PresentMode::Fifo) {
            wgpu::PresentMode::Fifo
        } else {
            available
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo)
        }
    }

    pub fn clear_color(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_color;
        wgpu::Color { r, g, b, a }
    }

    const fn default_clear_color() -> [f64; 4] {
        [0.0, 0.0, 0.0, 1.0]
    }

    const fn default_cube_size() -> [f32; 3] {
        [1.0, 1.0, 1.0]
    }

    fn default_lights() -> Vec<[f32; 3]> {
        vec![[-2.5, 2.5, 1.0], [2.5, 2.5, 1.0]]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

/// Layout and motion of the demo cube grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub columns: usize,
    pub rows: usize,
    pub spacing: f32,
    /// Radians per second around each cube's own diagonal.
    pub spin_speed: f32,
}

impl GridSettings {
    pub fn instance_count(&self) -> usize {
        self.columns.saturating_mul(self.rows)
    }
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            columns: 5,
            rows: 5,
            spacing: 2.0,
            spin_speed: 0.8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialSettings {
    pub diffuse_color: [f32; 3],
    pub ambient: [f32; 3],
    pub shininess: f32,
}

impl Default for MaterialSettings {
    fn default() -> Self {
        Self {
            diffuse_color: [0.75, 0.75, 0.0],
            ambient: [0.01, 0.01, 0.01],
            shininess: 100.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentModeSetting {
    Fifo,
    FifoRelaxed,
    Immediate,
    Mailbox,
    AutoVsync,
    AutoNoVsync,
}

impl PresentModeSetting {
    fn to_wgpu(&self) -> wgpu::PresentMode {
        match self {
            PresentModeSetting::Fifo => wgpu::PresentMode::Fifo,
            PresentModeSetting::FifoRelaxed => wgpu::PresentMode::FifoRelaxed,
            PresentModeSetting::Immediate => wgpu::PresentMode::Immediate,
            PresentModeSetting::Mailbox => wgpu::PresentMode::Mailbox,
            PresentModeSetting::AutoVsync => wgpu::PresentMode::AutoVsync,
            PresentModeSetting::AutoNoVsync => wgpu::PresentMode::AutoNoVsync,
        }
    }
}

impl Default for PresentModeSetting {
    fn default() -> Self {
        PresentModeSetting::Fifo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let settings = RenderSettings::from_json("{}").unwrap();
        assert_eq!(settings.cube_size, [1.0, 1.0, 1.0]);
        assert_eq!(settings.grid.instance_count(), 25);
        assert_eq!(settings.lights.len(), 2);
        assert_eq!(settings.resolution.width, 640);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(RenderSettings::from_json("{ not json").is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = RenderSettings::load_from_path("does/not/exist/settings.json");
        assert_eq!(settings.grid.columns, GridSettings::default().columns);
    }

    #[test]
    fn validate_replaces_invalid_values_with_defaults() {
        let settings = RenderSettings::from_json(
            r#"{
                "resolution": { "width": 0, "height": 0 },
                "cube_size": [1.0, 0.0, 1.0],
                "material": { "shininess": -3.0 }
            }"#,
        )
        .unwrap();

        assert_eq!(settings.resolution.width, Resolution::default().width);
        assert_eq!(settings.cube_size, [1.0, 1.0, 1.0]);
        assert_eq!(settings.material.shininess, 100.0);
    }

    #[test]
    fn oversized_grid_is_clamped_to_instance_capacity() {
        let settings =
            RenderSettings::from_json(r#"{ "grid": { "columns": 40, "rows": 40 } }"#).unwrap();
        assert_eq!(settings.grid.columns, 40);
        assert_eq!(settings.grid.rows, 25);
        assert!(settings.grid.instance_count() <= MAX_INSTANCES);
    }

    #[test]
    fn extra_lights_are_dropped() {
        let lights: Vec<[f32; 3]> = (0..20).map(|i| [i as f32, 0.0, 0.0]).collect();
        let json = serde_json::json!({ "lights": lights }).to_string();
        let settings = RenderSettings::from_json(&json).unwrap();
        assert_eq!(settings.lights.len(), MAX_LIGHTS);
        assert_eq!(settings.lights[11], [11.0, 0.0, 0.0]);
    }

    #[test]
    fn present_mode_falls_back_to_fifo_when_desired_missing() {
        let settings = RenderSettings {
            present_mode: PresentModeSetting::Mailbox,
            ..RenderSettings::default()
        };

        let available = [wgpu::PresentMode::Fifo, wgpu::PresentMode::Immediate];

        assert_eq!(settings.present_mode(&available), wgpu::PresentMode::Fifo);
    }

    #[test]
    fn present_mode_uses_first_available_when_fifo_missing() {
        let settings = RenderSettings {
            present_mode: PresentModeSetting::Mailbox,
            ..RenderSettings::default()
        };

        let available = [wgpu::PresentMode::Immediate];

        assert_eq!(
            settings.present_mode(&available),
            wgpu::PresentMode::Immediate
        );
    }
}
