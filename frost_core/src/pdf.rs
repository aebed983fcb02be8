//! # PDF Report
//!
//! Renders a request/result pair into a PDF using Typst.
//!
//! - The report template is an embedded string constant
//! - Values are injected by placeholder replacement; user text is escaped
//! - Output is raw PDF bytes (`Vec<u8>`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use frost_core::pdf::{render_report_pdf, ReportMeta};
//! # use frost_core::calculations::{CalculationRequest, CalculationResult};
//! # fn demo(request: &CalculationRequest, result: &CalculationResult) -> frost_core::CalcResult<()> {
//! let meta = ReportMeta::new("Access road, km 4+200").with_soil_name("Clay, semi-hard");
//! let pdf = render_report_pdf(request, result, &meta)?;
//! std::fs::write("frost_report.pdf", pdf).unwrap();
//! # Ok(())
//! # }
//! ```

use chrono::Utc;
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::calculations::{CalculationRequest, CalculationResult};
use crate::equations::{generate_appendix_typst, ALL_EQUATIONS};
use crate::errors::{CalcError, CalcResult};
use crate::reference::KwSource;

// ============================================================================
// Typst World
// ============================================================================

/// A minimal Typst world: one detached source, bundled fonts, no files.
struct PdfWorld {
    main: Source,
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
    library: LazyHash<Library>,
}

impl PdfWorld {
    fn new(source: String) -> Self {
        let fonts: Vec<Font> = typst_assets::fonts()
            .flat_map(|data| Font::iter(Bytes::new(data.to_vec())))
            .collect();
        let book = FontBook::from_fonts(&fonts);

        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(book),
            fonts,
            library: LazyHash::new(Library::default()),
        }
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Utc::now();
        Datetime::from_ymd(
            now.format("%Y").to_string().parse().ok()?,
            now.format("%m").to_string().parse().ok()?,
            now.format("%d").to_string().parse().ok()?,
        )
    }
}

// ============================================================================
// Report Metadata
// ============================================================================

/// Header information printed on the report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportMeta {
    pub title: String,
    pub engineer: String,
    pub soil_name: String,
}

impl ReportMeta {
    pub fn new(title: impl Into<String>) -> Self {
        ReportMeta {
            title: title.into(),
            ..ReportMeta::default()
        }
    }

    pub fn with_engineer(mut self, engineer: impl Into<String>) -> Self {
        self.engineer = engineer.into();
        self
    }

    pub fn with_soil_name(mut self, soil_name: impl Into<String>) -> Self {
        self.soil_name = soil_name.into();
        self
    }
}

// ============================================================================
// Template
// ============================================================================

const REPORT_TEMPLATE: &str = r##"
#set page(
  paper: "a4",
  margin: (top: 2cm, bottom: 2cm, left: 2cm, right: 2cm),
  header: align(right)[#text(size: 9pt, fill: gray)[Frostline frost-depth report]],
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 1fr),
      align(left)[#text(size: 9pt)[{{ENGINEER}}]],
      align(right)[#text(size: 9pt)[{{DATE}} · Page #counter(page).display()]],
    )
  ]
)

#set text(font: "Libertinus Serif", size: 11pt)

#block(width: 100%, fill: rgb("#eef3f8"), inset: 12pt, radius: 4pt)[
  #text(size: 18pt, weight: "bold")[Frost Penetration Depth]
  #v(4pt)
  #text(size: 13pt)[{{TITLE}}]
]

#v(10pt)

== Subgrade and Climate

#table(
  columns: (1fr, auto),
  inset: 5pt,
  stroke: 0.5pt,
  [Soil], [{{SOIL}}],
  [Freezing-onset temperature $t_0$], [{{T0}} °C],
  [Thermal conductivity $lambda_f$], [{{SOIL_LAMBDA}} W/(m·K)],
  [Moisture coefficient $k_w$], [{{KW}} ({{KW_SOURCE}})],
  [Mean surface temperature $theta_"mp"$], [{{THETA}} °C],
  [Freezing period $tau_f$], [{{TAU}} h],
  [Latent heat $L$], [{{LATENT}} kJ/kg],
)

== Construction Layers

#table(
  columns: (auto, 1fr, auto, auto, auto, auto, auto, auto),
  inset: 5pt,
  stroke: 0.5pt,
  align: (center, left, right, right, right, right, right, right),
  table.header([*\#*], [*Layer*], [*h, m*], [*$rho_d$*], [*w*], [*$lambda_f$*], [*$eta_f$*], [*$sigma_i$*]),
{{LAYER_ROWS}}
)

== Formula Trail

#table(
  columns: (1fr, auto),
  inset: 5pt,
  stroke: 0.5pt,
  [Unfrozen water $w_w$], [{{WW}}],
  [Soil $eta_f$], [{{ETA_F}}],
  [Soil $eta_(f 0)$], [{{ETA_F0}}],
  [Climate term $A$], [{{PART1}}],
  [Capacity term $B$], [{{PART2}}],
  [Layer sum $sum sigma_i$], [{{SUM}} m],
  [$A dot B - sum sigma_i$], [{{HN_RAW}} m],
)

== Results

#table(
  columns: (1fr, auto),
  inset: 6pt,
  stroke: 0.5pt,
  [*Frost depth below construction $H_n$*], [*{{HN}} m*],
  [Comparative method $H_(n,"alt")$], [{{HN_ALT}} m],
  [Frozen column $H_f$], [{{HF}} m],
  [Depth ratio $H_n / H_f$], [{{RATIO}}],
  [Heave factor $m_z$], [{{MZ}}],
  [Estimated heave $s_f$], [{{SF}} cm],
  [Risk level], [#text(fill: rgb("{{RISK_COLOR}}"), weight: "bold")[{{RISK}}]],
)
"##;

/// Render the calculation report.
///
/// Typst compile or export failures are reported as `Internal`.
pub fn render_report_pdf(
    request: &CalculationRequest,
    result: &CalculationResult,
    meta: &ReportMeta,
) -> CalcResult<Vec<u8>> {
    let trail = &result.trail;
    let soil_label = if meta.soil_name.is_empty() {
        result.soil_code.clone()
    } else {
        format!("{} ({})", meta.soil_name, result.soil_code)
    };
    let kw_source = match trail.kw_source {
        KwSource::Range { id } => format!("range {}", id),
        KwSource::Default => "default".to_string(),
    };

    let mut source = REPORT_TEMPLATE
        .replace("{{TITLE}}", &escape_typst(&meta.title))
        .replace("{{ENGINEER}}", &escape_typst(&meta.engineer))
        .replace("{{DATE}}", &Utc::now().format("%Y-%m-%d").to_string())
        .replace("{{SOIL}}", &escape_typst(&soil_label))
        .replace("{{T0}}", &format!("{:.2}", trail.soil_t0))
        .replace("{{SOIL_LAMBDA}}", &format!("{:.2}", trail.soil_lambda_f))
        .replace("{{KW}}", &format!("{:.2}", trail.kw))
        .replace("{{KW_SOURCE}}", &kw_source)
        .replace("{{THETA}}", &format!("{:.2}", trail.mean_surface_temp_c))
        .replace("{{TAU}}", &format!("{:.0}", trail.freezing_hours))
        .replace("{{LATENT}}", &format!("{:.0}", trail.latent_heat))
        .replace("{{LAYER_ROWS}}", &build_layer_rows(request, result))
        .replace("{{WW}}", &format!("{:.4}", trail.ww_soil))
        .replace("{{ETA_F}}", &format!("{:.3}", trail.eta_f_soil))
        .replace("{{ETA_F0}}", &format!("{:.3}", trail.eta_f0_soil))
        .replace("{{PART1}}", &format!("{:.4}", trail.part1))
        .replace("{{PART2}}", &format!("{:.6}", trail.part2))
        .replace("{{SUM}}", &format!("{:.4}", trail.summation))
        .replace("{{HN_RAW}}", &format!("{:.4}", trail.hn_raw))
        .replace("{{HN_ALT}}", &format!("{:.3}", result.hn_alt_m))
        .replace("{{HN}}", &format!("{:.3}", result.hn_m))
        .replace("{{HF}}", &format!("{:.3}", result.hf_m))
        .replace("{{RATIO}}", &format!("{:.3}", result.ratio))
        .replace("{{MZ}}", &format!("{:.1}", result.mz))
        .replace("{{SF}}", &format!("{:.2}", result.sf_cm))
        .replace("{{RISK_COLOR}}", result.risk_level.color())
        .replace("{{RISK}}", result.risk_level.display_name());

    source.push_str(&generate_appendix_typst(ALL_EQUATIONS));

    let world = PdfWorld::new(source);
    let warned = typst::compile(&world);

    let document = warned.output.map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::Internal {
            message: format!("Typst compilation failed: {}", messages.join("; ")),
        }
    })?;

    typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::Internal {
            message: format!("PDF rendering failed: {}", messages.join("; ")),
        }
    })
}

/// Escape special Typst characters in user-provided text
fn escape_typst(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '*' | '_' | '#' | '$' | '@' | '<' | '>' | '\\' | '`' | '[' | ']' | '~' | '/') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn build_layer_rows(request: &CalculationRequest, result: &CalculationResult) -> String {
    result
        .layers
        .iter()
        .enumerate()
        .map(|(i, diag)| {
            let layer = request
                .layers
                .iter()
                .find(|l| l.id == diag.layer_id)
                .map(|l| (l.density_kg_m3, l.moisture));
            let (density, w) = match layer {
                Some((density, w)) => (format!("{:.0}", density), format!("{:.3}", w)),
                None => (String::new(), String::new()),
            };
            format!(
                "  [{}], [{}], [{:.3}], [{}], [{}], [{:.2}], [{:.1}], [{:.4}],",
                i + 1,
                escape_typst(&diag.name),
                diag.thickness_m,
                density,
                w,
                diag.lambda_f,
                diag.eta_f,
                diag.sigma
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
