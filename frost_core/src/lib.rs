//! # frost_core - Frost Penetration Depth Engine
//!
//! `frost_core` computes how deep frost reaches below a layered pavement or
//! embankment cross-section, and what that means for heave. All inputs and
//! outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Pure engine**: the formula chain is a synchronous function of its resolved inputs
//! - **Async edges**: reference lookups run concurrently behind [`reference::ReferenceSource`]
//! - **Rich Errors**: structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use frost_core::calculations::{CalculationRequest, Layer};
//! use frost_core::reference::EmbeddedReference;
//! use frost_core::service::{calculate_frost_depth, ServiceOptions};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let request = CalculationRequest::new("14_3")
//!     .with_layer(Layer::new("Cement concrete", 0.2, 2300.0, 0.03, 1.9, 1675.0));
//!
//! let result = calculate_frost_depth(&EmbeddedReference, &request, &ServiceOptions::default())
//!     .await
//!     .unwrap();
//! println!("Hn = {:.2} m, risk {}", result.hn_m, result.risk_level);
//! # });
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - the formula chain: η, Σ, depth, heave, result
//! - [`reference`] - soils, materials, coefficient ranges, constants
//! - [`service`] - async fan-out lookups + calculation
//! - [`config`] - TOML configuration
//! - [`history`] - saved calculations
//! - [`equations`] - formula metadata for reports
//! - [`pdf`] - Typst PDF report
//! - [`file_io`] - atomic saves and file locking
//! - [`units`] - type-safe unit wrappers
//! - [`errors`] - structured error types

pub mod calculations;
pub mod config;
pub mod equations;
pub mod errors;
pub mod file_io;
pub mod history;
pub mod pdf;
pub mod reference;
pub mod service;
pub mod units;

pub use calculations::{CalculationRequest, CalculationResult, Layer, RiskLevel};
pub use config::FrostConfig;
pub use errors::{CalcError, CalcResult};
pub use history::HistoryStore;
pub use service::{calculate_frost_depth, ServiceOptions};
