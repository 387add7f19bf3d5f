//! Read-only view of the hardware configuration the backends compile
//! against. Owned and edited elsewhere; the compiler only ever reads it.

use serde::{Deserialize, Serialize};

/// Which physical hub a device is plugged into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Hub {
    #[default]
    Control,
    Expansion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotorConfig {
    pub name: String,
    #[serde(default)]
    pub port: u8,
    #[serde(default)]
    pub hub: Hub,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub reversed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServoConfig {
    pub name: String,
    #[serde(default)]
    pub port: u8,
    #[serde(default)]
    pub hub: Hub,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SensorKind {
    Touch,
    Color,
    Distance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorConfig {
    pub name: String,
    pub kind: SensorKind,
    #[serde(default)]
    pub port: u8,
    #[serde(default)]
    pub hub: Hub,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// Drive base layout, used by the backends that address wheels directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DriveKind {
    #[default]
    Mecanum,
    Differential,
}

/// Drivetrain geometry and encoder constants.
///
/// `motors` is ordered left-front, right-front, left-rear, right-rear for a
/// mecanum base, and left, right for a differential base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrivetrainConfig {
    pub kind: DriveKind,
    pub motors: Vec<String>,
    pub wheel_diameter_in: f64,
    pub ticks_per_rev: f64,
    pub gear_ratio: f64,
    pub track_width_in: f64,
}

impl Default for DrivetrainConfig {
    fn default() -> Self {
        Self {
            kind: DriveKind::Mecanum,
            motors: vec![
                "leftFront".to_string(),
                "rightFront".to_string(),
                "leftRear".to_string(),
                "rightRear".to_string(),
            ],
            // goBILDA 312 RPM motor on 96 mm wheels
            wheel_diameter_in: 3.78,
            ticks_per_rev: 537.7,
            gear_ratio: 1.0,
            track_width_in: 15.0,
        }
    }
}

impl DrivetrainConfig {
    /// Encoder counts per inch of wheel travel.
    pub fn counts_per_inch(&self) -> f64 {
        self.ticks_per_rev * self.gear_ratio / (self.wheel_diameter_in * std::f64::consts::PI)
    }
}

/// The enabled motors, servos and sensors a routine may reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceRegistry {
    pub motors: Vec<MotorConfig>,
    pub servos: Vec<ServoConfig>,
    pub sensors: Vec<SensorConfig>,
    pub drivetrain: Option<DrivetrainConfig>,
}

impl DeviceRegistry {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The drivetrain to compile against, falling back to the stock mecanum
    /// layout when none is configured.
    pub fn drivetrain(&self) -> DrivetrainConfig {
        self.drivetrain.clone().unwrap_or_default()
    }

    pub fn enabled_motors(&self) -> impl Iterator<Item = &MotorConfig> {
        self.motors.iter().filter(|m| m.enabled)
    }

    pub fn enabled_servos(&self) -> impl Iterator<Item = &ServoConfig> {
        self.servos.iter().filter(|s| s.enabled)
    }

    pub fn enabled_sensors(&self) -> impl Iterator<Item = &SensorConfig> {
        self.sensors.iter().filter(|s| s.enabled)
    }

    pub fn motor(&self, name: &str) -> Option<&MotorConfig> {
        self.enabled_motors().find(|m| m.name == name)
    }

    pub fn servo(&self, name: &str) -> Option<&ServoConfig> {
        self.enabled_servos().find(|s| s.name == name)
    }

    pub fn sensor(&self, name: &str) -> Option<&SensorConfig> {
        self.enabled_sensors().find(|s| s.name == name)
    }
}

fn default_enabled() -> bool {
    true
}
