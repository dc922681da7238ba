//! TOML loading and validation for unit templates
//!
//! Files hold a `[[unit]]` array; each entry deserializes into a
//! `UnitStats`. Validation rejects templates that could only fail later,
//! mid-attack, such as a gun with no penetration table entry.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, error};

use super::tables::ap_base_penetration;
use super::units::{Catalogue, UnitCategory, UnitStats, WeaponKind};
use crate::core::error::{ContentError, Result};

#[derive(Debug, Deserialize)]
struct CatalogueFile {
    #[serde(default, rename = "unit")]
    units: Vec<UnitStats>,
}

/// Parse and validate every template in a TOML string
pub fn parse_units(content: &str) -> Result<Vec<UnitStats>> {
    let file: CatalogueFile = toml::from_str(content)?;
    for stats in &file.units {
        if let Err(e) = validate(stats) {
            error!(type_id = %stats.type_id, error = %e, "rejected unit template");
            return Err(e.into());
        }
    }
    Ok(file.units)
}

/// Check a template for content-authoring defects
pub fn validate(stats: &UnitStats) -> std::result::Result<(), ContentError> {
    if stats.type_id.is_empty() {
        return Err(ContentError::Invalid("unit with empty type_id".into()));
    }

    if stats.turret.is_some() && stats.category != UnitCategory::Vehicle {
        return Err(ContentError::Invalid(format!(
            "{}: only vehicles have turrets",
            stats.type_id
        )));
    }

    for weapon in &stats.weapons {
        if weapon.kind == WeaponKind::Gun {
            let key = weapon
                .calibre_key()
                .ok_or_else(|| ContentError::MissingCalibre(weapon.name.clone()))?;
            if weapon.ammo_types.iter().any(|a| a.is_ap()) {
                ap_base_penetration(&key)?;
            }
        }

        if weapon.rr_size > weapon.max_ammo {
            return Err(ContentError::Invalid(format!(
                "{}: ready rack of {} exceeds capacity {}",
                weapon.name, weapon.rr_size, weapon.max_ammo
            )));
        }

        if weapon.uses_ammo() && weapon.max_ammo == 0 {
            return Err(ContentError::Invalid(format!(
                "{}: ammunition types listed but no capacity",
                weapon.name
            )));
        }

        let crewed = !stats.positions.is_empty();
        if crewed && weapon.operators.is_empty() && !weapon.all_around {
            return Err(ContentError::Invalid(format!(
                "{}: crewed unit weapon has no operators",
                weapon.name
            )));
        }
        for operator in &weapon.operators {
            if !stats.positions.iter().any(|p| p.kind == *operator) {
                return Err(ContentError::Invalid(format!(
                    "{}: operator {} has no position",
                    weapon.name,
                    operator.name()
                )));
            }
        }
    }

    Ok(())
}

impl Catalogue {
    /// Catalogue holding only the templates in `content`
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut catalogue = Catalogue::new();
        catalogue.extend_from_toml_str(content)?;
        Ok(catalogue)
    }

    /// Add or replace templates from a TOML string; returns how many
    pub fn extend_from_toml_str(&mut self, content: &str) -> Result<usize> {
        let units = parse_units(content)?;
        let count = units.len();
        for stats in units {
            self.insert(stats);
        }
        Ok(count)
    }

    /// Add or replace templates from a file on disk
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let count = self.extend_from_toml_str(&content)?;
        debug!(path = %path.display(), count, "loaded unit templates");
        Ok(count)
    }
}
