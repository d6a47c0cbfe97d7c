// Driver configuration.
//
// `SimConfig` collects the knobs of a command-line run: the random seed,
// how amplitude dumps are rendered and the noise parameters used by the
// noise demonstration. It round-trips through JSON.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::noise::NoiseChannel;

/// Settings for a simulator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for the measurement RNG; `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Print the binary expansion of each basis index in amplitude dumps.
    pub show_binary: bool,
    /// Channel parameters for the noise demonstration.
    pub noise: NoiseConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            seed: None,
            show_binary: true,
            noise: NoiseConfig::default(),
        }
    }
}

/// Parameters of the three standard channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    pub dephasing: f64,
    pub amplitude_damping: f64,
    pub depolarizing: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        NoiseConfig {
            dephasing: 0.3,
            amplitude_damping: 0.3,
            depolarizing: 0.3,
        }
    }
}

impl NoiseConfig {
    /// The configured channels, in a fixed order.
    pub fn channels(&self) -> [NoiseChannel; 3] {
        [
            NoiseChannel::Dephasing(self.dephasing),
            NoiseChannel::AmplitudeDamping(self.amplitude_damping),
            NoiseChannel::Depolarizing(self.depolarizing),
        ]
    }
}

impl SimConfig {
    /// Load and validate a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::FileRead`] if the file cannot be read,
    /// [`ConfigError::Parse`] on malformed JSON, and
    /// [`ConfigError::InvalidValue`] if validation fails.
    pub fn from_json(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: SimConfig = serde_json::from_str(&contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Write this configuration as pretty-printed JSON.
    pub fn to_json(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check that every field is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for channel in self.noise.channels() {
            channel.validate()?;
        }
        Ok(())
    }

    /// The single uniform random source for a run.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_default_is_valid() {
        SimConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: SimConfig = serde_json::from_str(r#"{"seed": 7}"#).unwrap();
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.noise, NoiseConfig::default());
        assert!(cfg.show_binary);
    }

    #[test]
    fn test_invalid_noise_rejected() {
        let mut cfg = SimConfig::default();
        cfg.noise.amplitude_damping = 1.5;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidValue { field: "gamma", .. })
        ));
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let cfg = SimConfig {
            seed: Some(42),
            ..SimConfig::default()
        };
        let a: f64 = cfg.rng().r#gen();
        let b: f64 = cfg.rng().r#gen();
        assert_eq!(a, b);
    }

    #[test]
    fn test_json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.json");
        let cfg = SimConfig {
            seed: Some(3),
            show_binary: false,
            noise: NoiseConfig {
                dephasing: 0.1,
                amplitude_damping: 0.2,
                depolarizing: 1.2,
            },
        };
        cfg.to_json(&path).unwrap();
        assert_eq!(SimConfig::from_json(&path).unwrap(), cfg);
    }

    #[test]
    fn test_missing_file() {
        let err = SimConfig::from_json(Path::new("/nonexistent/sim.json")).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }
}
