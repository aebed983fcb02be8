//! # Frost Depth Calculations
//!
//! The synchronous engine, split by formula stage. Each stage follows the
//! same shape:
//!
//! - typed inputs (JSON-serializable)
//! - a pure function returning `CalcResult<_>`
//! - typed outputs kept for the diagnostic trail
//!
//! ## Stages
//!
//! - [`request`] - request types, validation and string parsing
//! - [`eta`] - phase-change capacity η per layer
//! - [`summation`] - equivalent soil thickness Σ
//! - [`depth`] - frost penetration depth Hn and frozen column Hf
//! - [`heave`] - depth ratio, mz, heave estimate, risk level
//! - [`result`] - the assembled result with diagnostics
//! - [`frost_depth`] - runs all of the above

pub mod depth;
pub mod eta;
pub mod frost_depth;
pub mod heave;
pub mod request;
pub mod result;
pub mod summation;

pub use depth::{frost_depth as compute_depth, DepthInputs, FrostDepth};
pub use eta::{LayerDerived, SoilEta};
pub use frost_depth::{calculate, ResolvedReference};
pub use heave::{classify_risk, estimate_heave, mz_for_ratio, HeaveEstimate, RiskLevel};
pub use request::{
    parse_number, parse_optional_number, CalculationRequest, ClimateInput, Layer, LayerDraft, RequestDraft,
    SoilDraft, SoilInput, SoilProperties,
};
pub use result::{CalculationResult, FormulaTrail, LayerDiagnostic};
pub use summation::{Summation, SummationTerm};
