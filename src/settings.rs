use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Window/presentation configuration loaded from `settings.json`. Renderer
/// tuning (shadow tile size, light budget) is compile-time constants, not
/// settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    #[serde(default)]
    pub resolution: Resolution,
    #[serde(default)]
    pub present_mode: PresentModeSetting,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            present_mode: PresentModeSetting::default(),
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
            Ok(contents) => match serde_json::from_str::<RenderSettings>(&contents) {
                Ok(settings) => {
                    info!("Loaded render settings from {:?}", path);
                    settings.validate()
                }
                Err(err) => {
                    warn!(
                        "Failed to parse {:?} ({}). Falling back to default render settings.",
                        path, err
                    );
                    RenderSettings::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!("Render settings file {:?} not found. Using defaults.", path);
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

    fn validate(mut self) -> Self {
        if self.resolution.width == 0 || self.resolution.height == 0 {
            warn!("Resolution must be greater than zero. Using default resolution.");
            self.resolution = Resolution::default();
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
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentModeSetting {
    #[default]
    Fifo,
    FifoRelaxed,
    Immediate,
    Mailbox,
}

impl PresentModeSetting {
    fn to_wgpu(&self) -> wgpu::PresentMode {
        match self {
            PresentModeSetting::Fifo => wgpu::PresentMode::Fifo,
            PresentModeSetting::FifoRelaxed => wgpu::PresentMode::FifoRelaxed,
            PresentModeSetting::Immediate => wgpu::PresentMode::Immediate,
            PresentModeSetting::Mailbox => wgpu::PresentMode::Mailbox,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_replaces_zero_resolution() {
        let settings = RenderSettings {
            resolution: Resolution {
                width: 0,
                height: 0,
            },
            present_mode: PresentModeSetting::Fifo,
        }
        .validate();

        assert_eq!(settings.resolution.width, Resolution::default().width);
        assert_eq!(settings.resolution.height, Resolution::default().height);
    }

    #[test]
    fn validate_preserves_valid_values() {
        let settings = RenderSettings {
            resolution: Resolution {
                width: 1920,
                height: 1080,
            },
            present_mode: PresentModeSetting::Mailbox,
        }
        .validate();

        assert_eq!(settings.resolution.width, 1920);
        assert_eq!(settings.resolution.height, 1080);
    }

    #[test]
    fn present_mode_prefers_the_requested_mode() {
        let settings = RenderSettings {
            present_mode: PresentModeSetting::Mailbox,
            ..RenderSettings::default()
        };
        let available = [wgpu::PresentMode::Fifo, wgpu::PresentMode::Mailbox];
        assert_eq!(settings.present_mode(&available), wgpu::PresentMode::Mailbox);
    }

    #[test]
    fn present_mode_falls_back_to_fifo() {
        let settings = RenderSettings {
            present_mode: PresentModeSetting::Mailbox,
            ..RenderSettings::default()
        };
        let available = [wgpu::PresentMode::Fifo, wgpu::PresentMode::Immediate];
        assert_eq!(settings.present_mode(&available), wgpu::PresentMode::Fifo);
    }

    #[test]
    fn missing_settings_file_uses_defaults() {
        let settings = RenderSettings::load_from_path("definitely/not/here.json");
        assert_eq!(settings.resolution.width, Resolution::default().width);
    }
}
