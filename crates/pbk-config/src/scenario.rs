//! Exposure scenario defaults.

use serde::{Deserialize, Serialize};

const fn default_frequency() -> u32 {
    24
}

fn default_input_species() -> String {
    "AGut".to_string()
}

fn default_covariate() -> String {
    "BW".to_string()
}

const fn default_daily_intake() -> f64 {
    1.0
}

const fn default_washout_divisor() -> u32 {
    10
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScenarioConfig {
    /// Samples per simulated day.
    #[serde(default = "default_frequency")]
    pub frequency: u32,

    /// Quantity receiving oral doses.
    #[serde(default = "default_input_species")]
    pub input_species: String,

    /// Covariate scaling each dose (body weight).
    #[serde(default = "default_covariate")]
    pub covariate: String,

    /// Dose per day, per unit of covariate.
    #[serde(default = "default_daily_intake")]
    pub daily_intake: f64,

    /// Washout window is `floor(days_of_exposure / washout_divisor)` days.
    #[serde(default = "default_washout_divisor")]
    pub washout_divisor: u32,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            frequency: default_frequency(),
            input_species: default_input_species(),
            covariate: default_covariate(),
            daily_intake: default_daily_intake(),
            washout_divisor: default_washout_divisor(),
        }
    }
}
