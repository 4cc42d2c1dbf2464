//! Secondary electron parameters of the solid phases

// crate modules
use crate::error::{Error, Result};
use crate::phase::Phase;

use serde::{Deserialize, Serialize};

/// Secondary electron parameters for one solid material
///
/// - `e` - Effective energy required to generate one secondary electron (eV)
/// - `lambda_escape` - Mean free escape path of a secondary electron (nm)
///
/// ```rust
/// # use etmap_grid::Material;
/// let gold = Material::new("Au", 35.0, 0.5).unwrap();
/// assert_eq!(gold.name, "Au");
///
/// // Non-positive parameters are rejected
/// assert!(Material::new("Au", 0.0, 0.5).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Short name of the material, e.g. "Au"
    pub name: String,
    /// Secondary electron generation energy (eV)
    pub e: f64,
    /// Secondary electron mean free escape path (nm)
    pub lambda_escape: f64,
}

impl Material {
    /// Create a new [Material], checking the parameters are physical
    pub fn new(name: impl Into<String>, e: f64, lambda_escape: f64) -> Result<Self> {
        let material = Self {
            name: name.into(),
            e,
            lambda_escape,
        };
        material.validate()?;
        Ok(material)
    }

    /// Both parameters must be finite and strictly positive
    pub fn validate(&self) -> Result<()> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if valid(self.e) && valid(self.lambda_escape) {
            Ok(())
        } else {
            Err(Error::InvalidMaterial {
                name: self.name.clone(),
                e: self.e,
                lambda_escape: self.lambda_escape,
            })
        }
    }
}

/// The pair of materials relevant to a mapping pass
///
/// Only the substrate and the deposited material are solid, so lookups for
/// [Phase::Void] cells return `None`.
///
/// ```rust
/// # use etmap_grid::{Material, Materials, Phase};
/// let materials = Materials {
///     substrate: Material::new("Si", 90.0, 2.7).unwrap(),
///     deposit: Material::new("PtC", 60.0, 0.6).unwrap(),
/// };
///
/// assert_eq!(materials.get(Phase::Deposit).unwrap().name, "PtC");
/// assert!(materials.get(Phase::Void).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Materials {
    /// Material of [Phase::Substrate] cells
    pub substrate: Material,
    /// Material of [Phase::Deposit] cells
    pub deposit: Material,
}

impl Materials {
    /// Material parameters for a phase, if it is solid
    pub fn get(&self, phase: Phase) -> Option<&Material> {
        match phase {
            Phase::Substrate => Some(&self.substrate),
            Phase::Deposit => Some(&self.deposit),
            Phase::Void => None,
        }
    }

    /// Validate both materials
    pub fn validate(&self) -> Result<()> {
        self.substrate.validate()?;
        self.deposit.validate()
    }
}
