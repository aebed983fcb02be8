//! `frostline soils` and `frostline materials`

use anyhow::Result;
use clap::Args;

use frost_core::reference::ReferenceSource;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print the table as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn soils<S: ReferenceSource>(args: &ListArgs, source: &S) -> Result<()> {
    let soils = source.soils().await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&soils)?);
        return Ok(());
    }

    println!(
        "{:<8} {:<36} {:>5} {:>5} {:>6} {:>6} {:>7} {:>7} {:>6}",
        "Code", "Name", "t0", "Ip", "wp", "λf", "Cf", "ρd", "w"
    );
    for soil in &soils {
        println!(
            "{:<8} {:<36} {:>5.2} {:>5.1} {:>6.3} {:>6.2} {:>7.0} {:>7.0} {:>6.3}",
            soil.code, soil.name, soil.t0, soil.ip, soil.wp, soil.lambda_f, soil.c_f, soil.rho_d, soil.w
        );
    }
    Ok(())
}

pub async fn materials<S: ReferenceSource>(args: &ListArgs, source: &S) -> Result<()> {
    let materials = source.materials().await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&materials)?);
        return Ok(());
    }

    let optional = |value: Option<f64>| value.map(|v| format!("{:.0}", v)).unwrap_or_else(|| "-".to_string());

    println!("{:>4} {:<36} {:>7} {:>6} {:>6} {:>7}", "Id", "Name", "ρd", "w", "λf", "Cf");
    for material in &materials {
        println!(
            "{:>4} {:<36} {:>7} {:>6.3} {:>6.2} {:>7}",
            material.id,
            material.name,
            optional(material.rho_d),
            material.w,
            material.lambda_f,
            optional(material.c_f)
        );
    }
    Ok(())
}
