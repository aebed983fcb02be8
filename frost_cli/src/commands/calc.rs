//! `frostline calc`

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgMatches, Args};

use frost_core::calculations::{parse_number, CalculationRequest, CalculationResult, Layer, LayerDraft, SoilDraft, SoilInput};
use frost_core::config::FrostConfig;
use frost_core::pdf::{render_report_pdf, ReportMeta};
use frost_core::reference::{material_by_id, material_by_name, MaterialRecord, ReferenceSource};
use frost_core::service::{calculate_frost_depth, ServiceOptions};
use frost_core::units::{Days, Hours};

#[derive(Args, Debug)]
pub struct CalcArgs {
    /// Subgrade soil code (see `frostline soils`)
    #[arg(long)]
    pub soil: Option<String>,

    /// Construction layer, top to bottom
    #[arg(long = "layer", value_name = "NAME:THICKNESS:DENSITY:MOISTURE:LAMBDA:CF")]
    pub layers: Vec<String>,

    /// Construction layer taken from the materials table
    #[arg(long = "material", value_name = "ID|NAME:THICKNESS")]
    pub materials: Vec<String>,

    /// Read the request from a JSON file instead
    #[arg(long, value_name = "FILE", conflicts_with_all = ["soil", "layers", "materials"])]
    pub request: Option<PathBuf>,

    /// Override one soil value, e.g. `--soil-set w=0,24`
    #[arg(long = "soil-set", value_name = "FIELD=VALUE")]
    pub soil_overrides: Vec<String>,

    /// Absolute mean surface temperature of the freezing period (°C)
    #[arg(long, value_name = "CELSIUS")]
    pub surface_temp: Option<String>,

    /// Freezing period duration in hours
    #[arg(long, value_name = "HOURS", conflicts_with = "freezing_days")]
    pub freezing_hours: Option<String>,

    /// Freezing period duration in days
    #[arg(long, value_name = "DAYS")]
    pub freezing_days: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Append the calculation to the history file
    #[arg(long)]
    pub save: bool,

    /// Write a PDF report
    #[arg(long, value_name = "PATH")]
    pub pdf: Option<PathBuf>,

    /// Report title
    #[arg(long, default_value = "Frost depth calculation")]
    pub title: String,

    /// Engineer named on the report
    #[arg(long)]
    pub engineer: Option<String>,
}

pub async fn execute<S: ReferenceSource>(
    args: &CalcArgs,
    matches: Option<&ArgMatches>,
    config: &FrostConfig,
    source: &S,
) -> Result<()> {
    let request = build_request(args, matches, source).await?;
    let options = ServiceOptions::from(config.clone());
    let result = calculate_frost_depth(source, &request, &options).await?;
    let soil_name = source
        .soil_by_code(&request.soil_code)
        .await?
        .map(|soil| soil.name)
        .unwrap_or_default();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&soil_name, &result);
    }

    if args.save {
        let mut store = super::open_history(config)?;
        let record = store.record(&request, soil_name.as_str(), &result)?;
        if !args.json {
            println!("\nSaved as {}", record.id);
        }
    }

    if let Some(path) = &args.pdf {
        let mut meta = ReportMeta::new(args.title.as_str()).with_soil_name(soil_name.as_str());
        if let Some(engineer) = &args.engineer {
            meta = meta.with_engineer(engineer.as_str());
        }
        let bytes = render_report_pdf(&request, &result, &meta)?;
        std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        if !args.json {
            println!("Report written to {}", path.display());
        }
    }

    Ok(())
}

enum LayerSpec<'a> {
    Manual(&'a str),
    Material(&'a str),
}

/// Interleave `--layer` and `--material` in the order they were typed.
fn ordered_specs<'a>(args: &'a CalcArgs, matches: Option<&ArgMatches>) -> Vec<LayerSpec<'a>> {
    let indices = |id: &str| -> Vec<usize> {
        matches
            .and_then(|m| m.indices_of(id))
            .map(|found| found.collect())
            .unwrap_or_default()
    };
    let layer_at = indices("layers");
    let material_at = indices("materials");

    let mut specs: Vec<(usize, LayerSpec<'a>)> = Vec::with_capacity(args.layers.len() + args.materials.len());
    for (n, text) in args.layers.iter().enumerate() {
        specs.push((layer_at.get(n).copied().unwrap_or(n), LayerSpec::Manual(text)));
    }
    for (n, text) in args.materials.iter().enumerate() {
        specs.push((material_at.get(n).copied().unwrap_or(usize::MAX), LayerSpec::Material(text)));
    }
    specs.sort_by_key(|(position, _)| *position);
    specs.into_iter().map(|(_, spec)| spec).collect()
}

async fn build_request<S: ReferenceSource>(
    args: &CalcArgs,
    matches: Option<&ArgMatches>,
    source: &S,
) -> Result<CalculationRequest> {
    let mut request = match &args.request {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str::<CalculationRequest>(&text)
                .with_context(|| format!("Invalid request file {}", path.display()))?
        }
        None => {
            let Some(soil) = args.soil.as_deref() else {
                bail!("--soil is required unless --request is given");
            };
            let materials = if args.materials.is_empty() {
                Vec::new()
            } else {
                source.materials().await?
            };

            let mut request = CalculationRequest::new(soil);
            for (index, spec) in ordered_specs(args, matches).into_iter().enumerate() {
                let layer = match spec {
                    LayerSpec::Manual(text) => parse_layer(index, text)?,
                    LayerSpec::Material(text) => material_layer(index, text, &materials)?,
                };
                request = request.with_layer(layer);
            }
            request
        }
    };

    if !args.soil_overrides.is_empty() {
        let overrides = parse_soil_overrides(&args.soil_overrides)?;
        request.soil = merge_soil(request.soil, overrides);
    }

    if let Some(text) = &args.surface_temp {
        request.climate.mean_surface_temp_c = Some(parse_number("climate.mean_surface_temp_c", text)?);
    }
    if let Some(text) = &args.freezing_hours {
        request.climate.freezing_hours = Some(parse_number("climate.freezing_hours", text)?);
    } else if let Some(text) = &args.freezing_days {
        let days = Days(parse_number("climate.freezing_days", text)?);
        request.climate.freezing_hours = Some(Hours::from(days).value());
    }

    Ok(request)
}

fn parse_layer(index: usize, text: &str) -> Result<Layer> {
    let mut parts: Vec<&str> = text.rsplitn(6, ':').collect();
    if parts.len() != 6 {
        bail!("--layer '{}' must look like NAME:THICKNESS:DENSITY:MOISTURE:LAMBDA:CF", text);
    }
    parts.reverse();

    let draft = LayerDraft {
        name: parts[0].to_string(),
        thickness: parts[1].to_string(),
        density: parts[2].to_string(),
        moisture: parts[3].to_string(),
        lambda_f: parts[4].to_string(),
        c_f: parts[5].to_string(),
    };
    Ok(draft.parse(index)?)
}

fn material_layer(index: usize, text: &str, materials: &[MaterialRecord]) -> Result<Layer> {
    let Some((key, thickness)) = text.rsplit_once(':') else {
        bail!("--material '{}' must look like ID:THICKNESS or NAME:THICKNESS", text);
    };
    let material = match key.trim().parse::<u32>() {
        Ok(id) => material_by_id(materials, id)?,
        Err(_) => material_by_name(materials, key.trim())?,
    };
    let thickness = parse_number(&format!("layers[{}].thickness_m", index), thickness)?;
    Ok(Layer::from_material(material, thickness)?)
}

fn parse_soil_overrides(pairs: &[String]) -> Result<SoilInput> {
    let mut draft = SoilDraft::default();
    for pair in pairs {
        let Some((field, value)) = pair.split_once('=') else {
            bail!("--soil-set '{}' must look like FIELD=VALUE", pair);
        };
        let slot = match field.trim() {
            "t0" => &mut draft.t0,
            "ip" => &mut draft.ip,
            "wp" => &mut draft.wp,
            "lambda_f" => &mut draft.lambda_f,
            "c_f" => &mut draft.c_f,
            "rho_d" => &mut draft.rho_d,
            "w" => &mut draft.w,
            other => bail!("Unknown soil field '{}' (expected t0, ip, wp, lambda_f, c_f, rho_d or w)", other),
        };
        *slot = value.to_string();
    }
    Ok(draft.parse()?)
}

fn merge_soil(base: SoilInput, overrides: SoilInput) -> SoilInput {
    SoilInput {
        t0: overrides.t0.or(base.t0),
        ip: overrides.ip.or(base.ip),
        wp: overrides.wp.or(base.wp),
        lambda_f: overrides.lambda_f.or(base.lambda_f),
        c_f: overrides.c_f.or(base.c_f),
        rho_d: overrides.rho_d.or(base.rho_d),
        w: overrides.w.or(base.w),
    }
}

fn print_result(soil_name: &str, result: &CalculationResult) {
    println!("Soil:  {} {}", result.soil_code, soil_name);
    println!();
    println!("{:<24} {:>8} {:>8} {:>12} {:>10}", "Layer", "h, m", "λf", "ηf", "σ");
    for layer in &result.layers {
        println!(
            "{:<24} {:>8.3} {:>8.3} {:>12.1} {:>10.4}",
            layer.name, layer.thickness_m, layer.lambda_f, layer.eta_f, layer.sigma
        );
    }
    println!();
    println!("Frost depth below construction  Hn  = {:.3} m", result.hn_m);
    println!("Alternative method              Hn' = {:.3} m", result.hn_alt_m);
    println!("Total frost depth               Hf  = {:.3} m", result.hf_m);
    println!("Hn / Hf                             = {:.3} (mz {:.2})", result.ratio, result.mz);
    println!("Frost heave                     sf  = {:.2} cm", result.sf_cm);
    println!("Risk                                = {}", result.risk_level);
    if result.frost_contained() {
        println!("Frost stays within the construction layers.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, FromArgMatches, Parser};

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        calc: CalcArgs,
    }

    fn parse(argv: &[&str]) -> (CalcArgs, ArgMatches) {
        let matches = Harness::command().get_matches_from(argv);
        let harness = Harness::from_arg_matches(&matches).unwrap();
        (harness.calc, matches)
    }

    #[test]
    fn test_parse_layer_with_decimal_commas() {
        let layer = parse_layer(0, "Cement concrete:0,2:2300:0,03:1,9:1675").unwrap();
        assert_eq!(layer.name, "Cement concrete");
        assert_eq!(layer.thickness_m, 0.2);
        assert_eq!(layer.moisture, 0.03);
        assert_eq!(layer.c_f, 1675.0);
    }

    #[test]
    fn test_parse_layer_rejects_bad_text() {
        assert!(parse_layer(0, "Sand:0.2:1800").is_err());
        let err = parse_layer(1, "Sand:0:1800:0.05:1.8:1840").unwrap_err();
        let calc = err.downcast_ref::<frost_core::CalcError>().unwrap();
        assert_eq!(calc.error_code(), "INVALID_PARAMETER");
    }

    #[test]
    fn test_soil_overrides_merge() {
        let overrides = parse_soil_overrides(&["w=0,24".to_string(), "t0=1.2".to_string()]).unwrap();
        let base = SoilInput {
            w: Some(0.3),
            ip: Some(8.0),
            ..SoilInput::default()
        };
        let merged = merge_soil(base, overrides);
        assert_eq!(merged.w, Some(0.24));
        assert_eq!(merged.t0, Some(1.2));
        assert_eq!(merged.ip, Some(8.0));
        assert!(parse_soil_overrides(&["depth=3".to_string()]).is_err());
    }

    #[test]
    fn test_layers_keep_command_line_order() {
        let (args, matches) = parse(&[
            "calc",
            "--material",
            "1:0.2",
            "--layer",
            "Sand:0.3:1800:0.05:1.8:1840",
            "--material",
            "2:0.1",
        ]);
        let order: Vec<&str> = ordered_specs(&args, Some(&matches))
            .into_iter()
            .map(|spec| match spec {
                LayerSpec::Manual(text) | LayerSpec::Material(text) => text,
            })
            .collect();
        assert_eq!(order, vec!["1:0.2", "Sand:0.3:1800:0.05:1.8:1840", "2:0.1"]);
    }

    #[test]
    fn test_freezing_days_convert_to_hours() {
        let (args, matches) = parse(&[
            "calc",
            "--soil",
            "14_3",
            "--layer",
            "Concrete:0.2:2300:0.03:1.9:1675",
            "--freezing-days",
            "151",
        ]);
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let request = runtime
            .block_on(build_request(&args, Some(&matches), &frost_core::reference::EmbeddedReference))
            .unwrap();
        assert_eq!(request.climate.freezing_hours, Some(3624.0));
        assert_eq!(request.layers.len(), 1);
    }

    #[test]
    fn test_request_conflicts_with_inline_layers() {
        let result = Harness::command().try_get_matches_from(["calc", "--request", "r.json", "--soil", "14_3"]);
        assert!(result.is_err());
    }
}
