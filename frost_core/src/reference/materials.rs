//! Construction material records used to prefill layer fields.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Immutable construction material reference record.
///
/// `rho_d` and `c_f` are optional: the source table leaves them blank for
/// peat moss under an embankment, which therefore cannot prefill a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRecord {
    /// Row identifier
    pub id: u32,
    /// Material name (exact lookup key)
    pub name: String,
    /// Dry density ρd (kg/m³)
    #[serde(default)]
    pub rho_d: Option<f64>,
    /// Moisture W (fraction)
    pub w: f64,
    /// Thermal conductivity, thawed λth (W/(m·°C))
    #[serde(default)]
    pub lambda_th: Option<f64>,
    /// Thermal conductivity, frozen λf (W/(m·°C))
    pub lambda_f: f64,
    /// Volumetric heat capacity, thawed Cth (kJ/(m³·°C))
    #[serde(default)]
    pub c_th: Option<f64>,
    /// Volumetric heat capacity, frozen Cf (kJ/(m³·°C))
    #[serde(default)]
    pub c_f: Option<f64>,
}

impl MaterialRecord {
    /// Whether every field a construction layer needs is defined
    pub fn can_prefill(&self) -> bool {
        self.rho_d.is_some() && self.c_f.is_some() && (0.0..=1.0).contains(&self.w)
    }
}

/// Find a material by row id
pub fn material_by_id(materials: &[MaterialRecord], id: u32) -> CalcResult<&MaterialRecord> {
    materials
        .iter()
        .find(|m| m.id == id)
        .ok_or_else(|| CalcError::not_found("Material", id.to_string()))
}

/// Find a material by exact name
pub fn material_by_name<'a>(materials: &'a [MaterialRecord], name: &str) -> CalcResult<&'a MaterialRecord> {
    materials
        .iter()
        .find(|m| m.name == name)
        .ok_or_else(|| CalcError::not_found("Material", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concrete() -> MaterialRecord {
        MaterialRecord {
            id: 1,
            name: "Cement concrete".to_string(),
            rho_d: Some(2300.0),
            w: 0.03,
            lambda_th: Some(1.85),
            lambda_f: 1.90,
            c_th: Some(2010.0),
            c_f: Some(1675.0),
        }
    }

    fn peat() -> MaterialRecord {
        MaterialRecord {
            id: 22,
            name: "Peat moss under embankment".to_string(),
            rho_d: None,
            w: 3.55,
            lambda_th: Some(0.5),
            lambda_f: 0.8,
            c_th: None,
            c_f: None,
        }
    }

    #[test]
    fn test_lookup_by_id_and_name() {
        let materials = vec![concrete(), peat()];
        assert_eq!(material_by_id(&materials, 22).unwrap().name, "Peat moss under embankment");
        assert_eq!(material_by_name(&materials, "Cement concrete").unwrap().id, 1);
        assert!(material_by_id(&materials, 7).is_err());
        assert!(material_by_name(&materials, "cement concrete").is_err());
    }

    #[test]
    fn test_can_prefill() {
        assert!(concrete().can_prefill());
        assert!(!peat().can_prefill());
    }

    #[test]
    fn test_missing_optional_fields_deserialize() {
        let toml_str = r#"
            id = 22
            name = "Peat moss under embankment"
            w = 3.55
            lambda_f = 0.8
        "#;
        let record: MaterialRecord = toml::from_str(toml_str).unwrap();
        assert_eq!(record.rho_d, None);
        assert_eq!(record.c_f, None);
    }
}
