//! # Equation Registry
//!
//! Metadata for every formula the engine evaluates: name, description,
//! Typst math for the report and a plain-text form for terminals and
//! markdown.
//!
//! ```rust
//! use frost_core::equations::Equation;
//!
//! let meta = Equation::FrostDepth.metadata();
//! assert_eq!(meta.name, "Frost Penetration Depth");
//! println!("{}", meta.formula_plain);
//! ```

use serde::{Deserialize, Serialize};

/// Grouping used by the report appendix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquationCategory {
    /// Unfrozen water and η terms
    ThermalCapacity,
    /// Equivalent thickness of construction layers
    Summation,
    /// Hn, Hn_alt, Hf
    Depth,
    /// Ratio, mz, sf
    Heave,
}

impl EquationCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            EquationCategory::ThermalCapacity => "Thermal Capacity",
            EquationCategory::Summation => "Layer Summation",
            EquationCategory::Depth => "Frost Depth",
            EquationCategory::Heave => "Heave",
        }
    }
}

/// Definition of a variable used in an equation.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Symbol in Typst math notation
    pub symbol: &'static str,
    pub description: &'static str,
    pub units: &'static str,
}

impl Variable {
    pub const fn new(symbol: &'static str, description: &'static str, units: &'static str) -> Self {
        Self {
            symbol,
            description,
            units,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquationMetadata {
    pub name: &'static str,
    pub description: &'static str,
    /// Formula in Typst math, including the `$` delimiters
    pub formula_typst: &'static str,
    pub formula_plain: &'static str,
    pub variables: Vec<Variable>,
    pub category: EquationCategory,
    /// Function implementing the equation
    pub source_function: &'static str,
}

/// Every formula of the frost-depth chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Equation {
    /// ww = kw·wp
    Moisture,
    /// η_f = 0.5·θmp·Cf + ρd·(w − ww)·L
    EtaF,
    /// η_f0 = 0.5·t0·Cf + ρd·(w − ww)·L
    EtaF0,
    /// σ_i = h_i·√(λf_soil·η_i / (λf_i·η_soil))
    SummationTerm,
    /// 1.9·√(2·λf·τf)
    DepthPart1,
    /// √(θmp/η_f) − √(t0/η_f0)
    DepthPart2,
    /// Hn = max(0, part1·part2 − Σ)
    FrostDepth,
    /// Hn_alt = Hn·k_alt
    AltMethod,
    /// Hf = Hn + Σh
    FrozenColumn,
    /// r = Hn/Hf
    DepthRatio,
    /// sf = Hn·mz·kf
    HeaveDeformation,
}

/// All equations in evaluation order
pub static ALL_EQUATIONS: &[Equation] = &[
    Equation::Moisture,
    Equation::EtaF,
    Equation::EtaF0,
    Equation::SummationTerm,
    Equation::DepthPart1,
    Equation::DepthPart2,
    Equation::FrostDepth,
    Equation::AltMethod,
    Equation::FrozenColumn,
    Equation::DepthRatio,
    Equation::HeaveDeformation,
];

impl Equation {
    pub fn metadata(&self) -> EquationMetadata {
        match self {
            Equation::Moisture => EquationMetadata {
                name: "Unfrozen Water Content",
                description: "Share of soil moisture that stays liquid below 0 °C",
                formula_typst: r#"$w_w = k_w dot w_p$"#,
                formula_plain: "ww = kw * wp",
                variables: vec![
                    Variable::new("w_w", "Unfrozen water content", "1"),
                    Variable::new("k_w", "Moisture coefficient from plasticity index", "1"),
                    Variable::new("w_p", "Moisture at the plastic limit", "1"),
                ],
                category: EquationCategory::ThermalCapacity,
                source_function: "unfrozen_water",
            },

            Equation::EtaF => EquationMetadata {
                name: "Phase-Change Capacity",
                description: "Heat released by a layer while freezing at the mean surface temperature",
                formula_typst: r#"$eta_f = 0.5 dot theta_"mp" dot C_f + rho_d (w - w_w) L$"#,
                formula_plain: "eta_f = 0.5 * theta_mp * Cf + rho_d * (w - ww) * L",
                variables: vec![
                    Variable::new(r#"theta_"mp""#, "Absolute mean surface temperature", "°C"),
                    Variable::new("C_f", "Volumetric heat capacity, frozen", "kJ/(m³·K)"),
                    Variable::new("rho_d", "Dry density", "kg/m³"),
                    Variable::new("w", "Moisture content", "1"),
                    Variable::new("L", "Latent heat of fusion", "kJ/kg"),
                ],
                category: EquationCategory::ThermalCapacity,
                source_function: "eta",
            },

            Equation::EtaF0 => EquationMetadata {
                name: "Phase-Change Capacity at Onset",
                description: "Soil phase-change capacity at the freezing-onset temperature",
                formula_typst: r#"$eta_(f 0) = 0.5 dot t_0 dot C_f + rho_d (w - w_w) L$"#,
                formula_plain: "eta_f0 = 0.5 * t0 * Cf + rho_d * (w - ww) * L",
                variables: vec![Variable::new("t_0", "Freezing-onset temperature of the soil", "°C")],
                category: EquationCategory::ThermalCapacity,
                source_function: "soil_eta",
            },

            Equation::SummationTerm => EquationMetadata {
                name: "Equivalent Soil Thickness",
                description: "Thickness of subgrade soil with the same frost resistance as a construction layer",
                formula_typst: r#"$sigma_i = h_i sqrt((lambda_(f,"soil") eta_(f,i)) / (lambda_(f,i) eta_(f,"soil")))$"#,
                formula_plain: "sigma_i = h_i * sqrt((lambda_soil * eta_i) / (lambda_i * eta_soil))",
                variables: vec![
                    Variable::new("h_i", "Layer thickness", "m"),
                    Variable::new("lambda_f", "Thermal conductivity, frozen", "W/(m·K)"),
                ],
                category: EquationCategory::Summation,
                source_function: "summation",
            },

            Equation::DepthPart1 => EquationMetadata {
                name: "Climate Term",
                description: "Conductive part of the frost-depth formula",
                formula_typst: r#"$A = 1.9 sqrt(2 lambda_(f,"soil") tau_f)$"#,
                formula_plain: "part1 = 1.9 * sqrt(2 * lambda_soil * tau_f)",
                variables: vec![Variable::new("tau_f", "Duration of the freezing period", "h")],
                category: EquationCategory::Depth,
                source_function: "frost_depth",
            },

            Equation::DepthPart2 => EquationMetadata {
                name: "Capacity Term",
                description: "Soil thermal-capacity part of the frost-depth formula",
                formula_typst: r#"$B = sqrt(theta_"mp" / eta_f) - sqrt(t_0 / eta_(f 0))$"#,
                formula_plain: "part2 = sqrt(theta_mp / eta_f) - sqrt(t0 / eta_f0)",
                variables: vec![],
                category: EquationCategory::Depth,
                source_function: "frost_depth",
            },

            Equation::FrostDepth => EquationMetadata {
                name: "Frost Penetration Depth",
                description: "Depth of frost below the construction",
                formula_typst: r#"$H_n = max(0, A dot B - sum_i sigma_i)$"#,
                formula_plain: "Hn = max(0, part1 * part2 - sum(sigma_i))",
                variables: vec![Variable::new("H_n", "Frost penetration depth below construction", "m")],
                category: EquationCategory::Depth,
                source_function: "frost_depth",
            },

            Equation::AltMethod => EquationMetadata {
                name: "Comparative Method",
                description: "Frost depth by the comparative method, as a calibrated scale of Hn",
                formula_typst: r#"$H_(n,"alt") = k_"alt" dot H_n$"#,
                formula_plain: "Hn_alt = k_alt * Hn",
                variables: vec![Variable::new(r#"k_"alt""#, "Comparative-method scale", "-")],
                category: EquationCategory::Depth,
                source_function: "frost_depth",
            },

            Equation::FrozenColumn => EquationMetadata {
                name: "Frozen Column Height",
                description: "Total frozen depth measured from the surface",
                formula_typst: r#"$H_f = H_n + sum_i h_i$"#,
                formula_plain: "Hf = Hn + sum(h_i)",
                variables: vec![Variable::new("H_f", "Frozen column height", "m")],
                category: EquationCategory::Depth,
                source_function: "frost_depth",
            },

            Equation::DepthRatio => EquationMetadata {
                name: "Depth Ratio",
                description: "Share of the frozen column that lies in the subgrade",
                formula_typst: r#"$r = H_n / H_f$"#,
                formula_plain: "r = Hn / Hf",
                variables: vec![],
                category: EquationCategory::Heave,
                source_function: "depth_ratio",
            },

            Equation::HeaveDeformation => EquationMetadata {
                name: "Frost Heave",
                description: "Estimated surface heave, with mz read from the depth-ratio table",
                formula_typst: r#"$s_f = H_n dot m_z dot k_f$"#,
                formula_plain: "sf = Hn * mz * kf",
                variables: vec![
                    Variable::new("m_z", "Heave reduction factor", "1"),
                    Variable::new("k_f", "Frost-heave coefficient", "1"),
                ],
                category: EquationCategory::Heave,
                source_function: "estimate_heave",
            },
        }
    }

    pub fn in_category(category: EquationCategory) -> Vec<Equation> {
        ALL_EQUATIONS
            .iter()
            .filter(|eq| eq.metadata().category == category)
            .copied()
            .collect()
    }
}

/// Typst markup for the "List of Equations" appendix.
pub fn generate_appendix_typst(equations: &[Equation]) -> String {
    let mut output = String::from(
        r##"
#pagebreak()

#block(width: 100%, fill: rgb("#eef3f8"), inset: 10pt, radius: 4pt)[
  #text(size: 16pt, weight: "bold")[Appendix: List of Equations]
]

#v(8pt)
"##,
    );

    let mut current = None;
    for equation in equations {
        let meta = equation.metadata();
        if current != Some(meta.category) {
            output.push_str(&format!("\n== {}\n\n", meta.category.display_name()));
            current = Some(meta.category);
        }

        output.push_str(&format!("=== {}\n\n", meta.name));
        output.push_str(&format!("#text(size: 10pt)[{}]\n\n", meta.description));
        output.push_str(&format!("{}\n\n", meta.formula_typst));

        if !meta.variables.is_empty() {
            output.push_str("#table(\n  columns: (auto, 1fr, auto),\n  inset: 5pt,\n  stroke: 0.5pt,\n");
            output.push_str("  table.header([*Symbol*], [*Description*], [*Units*]),\n");
            for var in &meta.variables {
                output.push_str(&format!("  [${}$], [{}], [{}],\n", var.symbol, var.description, var.units));
            }
            output.push_str(")\n\n");
        }
    }

    output
}

/// Plain-text listing of every equation, for `--help`-style output and docs.
pub fn generate_equations_markdown() -> String {
    let mut output = String::from("# Equations\n");
    for equation in ALL_EQUATIONS {
        let meta = equation.metadata();
        output.push_str(&format!(
            "\n## {}\n\n{}\n\n```\n{}\n```\n",
            meta.name, meta.description, meta.formula_plain
        ));
    }
    output
}
