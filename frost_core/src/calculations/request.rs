//! # Calculation Request
//!
//! The typed input of one frost-depth calculation: the construction layers
//! above the subgrade (top to bottom), the subgrade soil code with optional
//! per-field overrides, and the climate of the site.
//!
//! Form-style callers (a CLI, a UI) hand over strings; [`RequestDraft`] parses
//! and validates them eagerly so the engine only ever sees numbers.
//!
//! ## Example
//!
//! ```rust
//! use frost_core::calculations::{CalculationRequest, Layer};
//!
//! let request = CalculationRequest::new("14_3")
//!     .with_layer(Layer::new("Cement concrete", 0.2, 2300.0, 0.03, 1.9, 1675.0));
//! assert!(request.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CalcError, CalcResult};
use crate::reference::{MaterialRecord, SoilRecord};

/// One construction layer of the pavement or embankment.
///
/// ## JSON Example
///
/// ```json
/// {
///   "name": "Cement concrete",
///   "thickness_m": 0.2,
///   "density_kg_m3": 2300.0,
///   "moisture": 0.03,
///   "lambda_f": 1.9,
///   "c_f": 1675.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Stable identity, carried into the diagnostic trail
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// Display name (usually the material)
    pub name: String,

    /// Layer thickness h (m)
    pub thickness_m: f64,

    /// Dry density ρd (kg/m³)
    pub density_kg_m3: f64,

    /// Moisture content w (fraction, 0..=1)
    pub moisture: f64,

    /// Thermal conductivity in the frozen state λf (W/(m·K))
    pub lambda_f: f64,

    /// Volumetric heat capacity in the frozen state Cf (kJ/(m³·K))
    pub c_f: f64,
}

impl Layer {
    pub fn new(
        name: impl Into<String>,
        thickness_m: f64,
        density_kg_m3: f64,
        moisture: f64,
        lambda_f: f64,
        c_f: f64,
    ) -> Self {
        Layer {
            id: Uuid::new_v4(),
            name: name.into(),
            thickness_m,
            density_kg_m3,
            moisture,
            lambda_f,
            c_f,
        }
    }

    /// Build a layer from a reference material and a thickness.
    ///
    /// Fails when the material row has no dry density or no frozen heat
    /// capacity, or when its moisture lies outside [0, 1].
    pub fn from_material(material: &MaterialRecord, thickness_m: f64) -> CalcResult<Self> {
        let field = format!("material[{}]", material.id);
        let density = material.rho_d.ok_or_else(|| {
            CalcError::invalid_parameter(format!("{}.rho_d", field), "none", "Material has no dry density")
        })?;
        let c_f = material.c_f.ok_or_else(|| {
            CalcError::invalid_parameter(format!("{}.c_f", field), "none", "Material has no frozen heat capacity")
        })?;
        if !(0.0..=1.0).contains(&material.w) {
            return Err(CalcError::invalid_parameter(
                format!("{}.w", field),
                material.w.to_string(),
                "Material moisture must be within [0, 1]",
            ));
        }

        let layer = Layer::new(&material.name, thickness_m, density, material.w, material.lambda_f, c_f);
        layer.validate(0)?;
        Ok(layer)
    }

    /// Validate layer values; `index` is used in field paths.
    pub fn validate(&self, index: usize) -> CalcResult<()> {
        let field = |name: &str| format!("layers[{}].{}", index, name);

        if !self.thickness_m.is_finite() || self.thickness_m <= 0.0 {
            return Err(CalcError::invalid_parameter(
                field("thickness_m"),
                self.thickness_m.to_string(),
                "Thickness must be positive",
            ));
        }
        if !self.density_kg_m3.is_finite() || self.density_kg_m3 <= 0.0 {
            return Err(CalcError::invalid_parameter(
                field("density_kg_m3"),
                self.density_kg_m3.to_string(),
                "Density must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.moisture) {
            return Err(CalcError::invalid_parameter(
                field("moisture"),
                self.moisture.to_string(),
                "Moisture must be within [0, 1]",
            ));
        }
        if !self.lambda_f.is_finite() || self.lambda_f < 0.0 {
            return Err(CalcError::invalid_parameter(
                field("lambda_f"),
                self.lambda_f.to_string(),
                "Thermal conductivity cannot be negative",
            ));
        }
        if !self.c_f.is_finite() || self.c_f < 0.0 {
            return Err(CalcError::invalid_parameter(
                field("c_f"),
                self.c_f.to_string(),
                "Heat capacity cannot be negative",
            ));
        }
        Ok(())
    }
}

/// Per-field overrides of the resolved soil record.
///
/// Blank fields keep the reference value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilInput {
    pub t0: Option<f64>,
    pub ip: Option<f64>,
    pub wp: Option<f64>,
    pub lambda_f: Option<f64>,
    pub c_f: Option<f64>,
    pub rho_d: Option<f64>,
    pub w: Option<f64>,
}

impl SoilInput {
    pub fn validate(&self) -> CalcResult<()> {
        let non_negative = [
            ("soil.t0", self.t0),
            ("soil.ip", self.ip),
            ("soil.lambda_f", self.lambda_f),
            ("soil.c_f", self.c_f),
            ("soil.rho_d", self.rho_d),
        ];
        for (field, value) in non_negative {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(CalcError::invalid_parameter(field, v.to_string(), "Cannot be negative"));
                }
            }
        }

        for (field, value) in [("soil.wp", self.wp), ("soil.w", self.w)] {
            if let Some(v) = value {
                if !(0.0..=1.0).contains(&v) {
                    return Err(CalcError::invalid_parameter(field, v.to_string(), "Must be within [0, 1]"));
                }
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == SoilInput::default()
    }
}

/// Soil values after applying overrides to the reference record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilProperties {
    pub t0: f64,
    pub ip: f64,
    pub wp: f64,
    pub lambda_f: f64,
    pub c_f: f64,
    pub rho_d: f64,
    pub w: f64,
}

impl SoilProperties {
    pub fn resolve(record: &SoilRecord, overrides: &SoilInput) -> Self {
        SoilProperties {
            t0: overrides.t0.unwrap_or(record.t0),
            ip: overrides.ip.unwrap_or(record.ip),
            wp: overrides.wp.unwrap_or(record.wp),
            lambda_f: overrides.lambda_f.unwrap_or(record.lambda_f),
            c_f: overrides.c_f.unwrap_or(record.c_f),
            rho_d: overrides.rho_d.unwrap_or(record.rho_d),
            w: overrides.w.unwrap_or(record.w),
        }
    }
}

/// Climate of the site. Blank values fall back to the reference constants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateInput {
    /// Absolute mean surface temperature of the freezing period θmp (°C)
    pub mean_surface_temp_c: Option<f64>,
    /// Duration of the freezing period τf (h)
    pub freezing_hours: Option<f64>,
}

impl ClimateInput {
    pub fn validate(&self) -> CalcResult<()> {
        let fields = [
            ("climate.mean_surface_temp_c", self.mean_surface_temp_c),
            ("climate.freezing_hours", self.freezing_hours),
        ];
        for (field, value) in fields {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(CalcError::invalid_parameter(field, v.to_string(), "Cannot be negative"));
                }
            }
        }
        Ok(())
    }
}

/// Everything one calculation needs besides the reference tables.
///
/// ## JSON Example
///
/// ```json
/// {
///   "soil_code": "14_3",
///   "soil": { "w": 0.24 },
///   "layers": [
///     { "name": "Cement concrete", "thickness_m": 0.2, "density_kg_m3": 2300.0,
///       "moisture": 0.03, "lambda_f": 1.9, "c_f": 1675.0 }
///   ],
///   "climate": { "freezing_hours": 3624.0 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// Reference code of the subgrade soil (e.g. "14_3")
    pub soil_code: String,

    #[serde(default)]
    pub soil: SoilInput,

    /// Construction layers, top to bottom. The soil is the implicit last layer.
    pub layers: Vec<Layer>,

    #[serde(default)]
    pub climate: ClimateInput,
}

impl CalculationRequest {
    pub fn new(soil_code: impl Into<String>) -> Self {
        CalculationRequest {
            soil_code: soil_code.into(),
            soil: SoilInput::default(),
            layers: Vec::new(),
            climate: ClimateInput::default(),
        }
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn with_climate(mut self, climate: ClimateInput) -> Self {
        self.climate = climate;
        self
    }

    pub fn with_soil(mut self, soil: SoilInput) -> Self {
        self.soil = soil;
        self
    }

    /// Validate the whole request before any lookup runs.
    pub fn validate(&self) -> CalcResult<()> {
        if self.soil_code.trim().is_empty() {
            return Err(CalcError::invalid_parameter("soil_code", "", "Soil code is required"));
        }
        if self.layers.is_empty() {
            return Err(CalcError::invalid_parameter(
                "layers",
                "[]",
                "At least one construction layer is required",
            ));
        }
        for (i, layer) in self.layers.iter().enumerate() {
            layer.validate(i)?;
        }
        self.soil.validate()?;
        self.climate.validate()
    }

    /// Total thickness of the construction layers (m)
    pub fn construction_thickness_m(&self) -> f64 {
        self.layers.iter().map(|l| l.thickness_m).sum()
    }
}

/// Parse a user-entered number.
///
/// Surrounding whitespace is ignored and `,` is accepted as the decimal
/// separator. Empty, non-numeric and non-finite text is rejected.
pub fn parse_number(field: &str, text: &str) -> CalcResult<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CalcError::invalid_parameter(field, text, "Value is required"));
    }

    let value: f64 = trimmed
        .replace(',', ".")
        .parse()
        .map_err(|_| CalcError::invalid_parameter(field, text, "Not a number"))?;

    if !value.is_finite() {
        return Err(CalcError::invalid_parameter(field, text, "Must be a finite number"));
    }
    Ok(value)
}

/// Like [`parse_number`], but blank text means "not given".
pub fn parse_optional_number(field: &str, text: &str) -> CalcResult<Option<f64>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    parse_number(field, text).map(Some)
}

/// String form of a [`Layer`], as typed into a form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerDraft {
    pub name: String,
    pub thickness: String,
    pub density: String,
    pub moisture: String,
    pub lambda_f: String,
    pub c_f: String,
}

impl LayerDraft {
    pub fn parse(&self, index: usize) -> CalcResult<Layer> {
        let field = |name: &str| format!("layers[{}].{}", index, name);
        let layer = Layer::new(
            self.name.trim(),
            parse_number(&field("thickness_m"), &self.thickness)?,
            parse_number(&field("density_kg_m3"), &self.density)?,
            parse_number(&field("moisture"), &self.moisture)?,
            parse_number(&field("lambda_f"), &self.lambda_f)?,
            parse_number(&field("c_f"), &self.c_f)?,
        );
        layer.validate(index)?;
        Ok(layer)
    }
}

/// String form of [`SoilInput`]; blank fields are not overridden.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilDraft {
    pub t0: String,
    pub ip: String,
    pub wp: String,
    pub lambda_f: String,
    pub c_f: String,
    pub rho_d: String,
    pub w: String,
}

impl SoilDraft {
    pub fn parse(&self) -> CalcResult<SoilInput> {
        let input = SoilInput {
            t0: parse_optional_number("soil.t0", &self.t0)?,
            ip: parse_optional_number("soil.ip", &self.ip)?,
            wp: parse_optional_number("soil.wp", &self.wp)?,
            lambda_f: parse_optional_number("soil.lambda_f", &self.lambda_f)?,
            c_f: parse_optional_number("soil.c_f", &self.c_f)?,
            rho_d: parse_optional_number("soil.rho_d", &self.rho_d)?,
            w: parse_optional_number("soil.w", &self.w)?,
        };
        input.validate()?;
        Ok(input)
    }
}

/// String form of a whole [`CalculationRequest`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestDraft {
    pub soil_code: String,
    pub soil: SoilDraft,
    pub layers: Vec<LayerDraft>,
    pub mean_surface_temp_c: String,
    pub freezing_hours: String,
}

impl RequestDraft {
    pub fn parse(&self) -> CalcResult<CalculationRequest> {
        let layers = self
            .layers
            .iter()
            .enumerate()
            .map(|(i, draft)| draft.parse(i))
            .collect::<CalcResult<Vec<_>>>()?;

        let request = CalculationRequest {
            soil_code: self.soil_code.trim().to_string(),
            soil: self.soil.parse()?,
            layers,
            climate: ClimateInput {
                mean_surface_temp_c: parse_optional_number("climate.mean_surface_temp_c", &self.mean_surface_temp_c)?,
                freezing_hours: parse_optional_number("climate.freezing_hours", &self.freezing_hours)?,
            },
        };
        request.validate()?;
        Ok(request)
    }
}
