//! Mapper configuration and the constants handed on to consumers

// crate modules
use crate::error::{Error, Result};

// etmap modules
use etmap_grid::{Field, Grid};

use serde::{Deserialize, Serialize};

/// Tunable parameters of a mapping pass
///
/// The defaults match the values the deposition simulation is calibrated
/// against. Anything can be overridden directly or read from JSON, where
/// missing fields keep their defaults.
///
/// ```rust
/// # use etmap_mapper::MapperConfig;
/// let config = MapperConfig::from_json(r#"{"segment_min_length": 0.5, "seed": 7}"#).unwrap();
///
/// assert_eq!(config.segment_min_length, 0.5);
/// assert_eq!(config.seed, Some(7));
/// assert_eq!(config.amplification, 10000.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Longest piece of a segment emitting from a single centre (nm)
    pub segment_min_length: f64,
    /// Multiplier on secondary electron counts to keep them well above noise
    pub amplification: f64,
    /// Escape length as a multiple of the material mean free escape path
    pub escape_factor: f64,
    /// Nominal escape length from cells that are not solid (nm)
    pub void_escape_length: f64,
    /// Nominal generation energy in cells that are not solid (eV)
    pub void_ionization_energy: f64,
    /// Shift applied to the end of a segment with identical end points (nm)
    pub perturbation: f64,
    /// Seed for the escape directions, drawn at random if not given
    pub seed: Option<u64>,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            segment_min_length: 0.3,
            amplification: 10000.0,
            escape_factor: 2.0,
            void_escape_length: 1e-5,
            void_ionization_energy: 1e6,
            perturbation: 1e-6,
            seed: None,
        }
    }
}

impl MapperConfig {
    /// Parse a configuration from a JSON string
    pub fn from_json(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Every length and factor must be finite and strictly positive
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("segment_min_length", self.segment_min_length),
            ("amplification", self.amplification),
            ("escape_factor", self.escape_factor),
            ("void_escape_length", self.void_escape_length),
            ("void_ionization_energy", self.void_ionization_energy),
            ("perturbation", self.perturbation),
        ];

        match fields.iter().find(|(_, v)| !(v.is_finite() && *v > 0.0)) {
            Some((name, value)) => Err(Error::InvalidConfig(format!(
                "{name} must be finite and positive, found {value}"
            ))),
            None => Ok(()),
        }
    }
}

/// Constants needed to turn the flux field into a physical yield
///
/// The flux field holds amplified secondary electron counts per cell, summed
/// over emission centres spaced about `segment_min_length` apart. The growth
/// solver divides all of that back out, together with its own normalisation
/// of the number of simulated primary electrons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingConstants {
    /// Multiplier applied to every secondary electron count
    pub amplification: f64,
    /// Edge length of a cell (nm)
    pub cell_dim: f64,
    /// Volume of a cell (nm^3)
    pub cell_volume: f64,
    /// Emission centre spacing used for the pass (nm)
    pub segment_min_length: f64,
}

impl ScalingConstants {
    /// Collect the constants for a grid and configuration
    pub fn new(grid: &Grid, config: &MapperConfig) -> Self {
        Self {
            amplification: config.amplification,
            cell_dim: grid.cell_dim(),
            cell_volume: grid.cell_volume(),
            segment_min_length: config.segment_min_length,
        }
    }

    /// Factor converting an amplified flux value to a surface yield
    ///
    /// `norm_factor` is the electrons per simulated trajectory supplied by the
    /// beam model. The result is per unit cell face area.
    ///
    /// ```rust
    /// # use etmap_mapper::ScalingConstants;
    /// let constants = ScalingConstants {
    ///     amplification: 10000.0,
    ///     cell_dim: 2.0,
    ///     cell_volume: 8.0,
    ///     segment_min_length: 0.5,
    /// };
    /// assert_eq!(constants.flux_factor(1000.0), 1000.0 / 10000.0 / 4.0 / 0.5);
    /// ```
    pub fn flux_factor(&self, norm_factor: f64) -> f64 {
        norm_factor / self.amplification / self.cell_dim.powi(2) / self.segment_min_length
    }

    /// Convert a whole flux field into physical surface yields
    pub fn surface_flux(&self, flux: &Field, norm_factor: f64) -> Field {
        let mut field = flux.clone();
        field.scale(self.flux_factor(norm_factor));
        field
    }

    /// Convert deposited energy into a volumetric heating density (eV/nm^3)
    pub fn heating(&self, deposited: &Field, norm_factor: f64) -> Field {
        let mut field = deposited.clone();
        field.scale(norm_factor / self.cell_volume);
        field
    }
}
