//! `frostline history`

use anyhow::Result;
use clap::Subcommand;

use frost_core::config::FrostConfig;
use frost_core::history::HistoryRecord;

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// List saved calculations, newest first
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,

        /// Show at most this many records
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Show one saved calculation
    Show {
        /// Record id or a unique prefix of it
        id: String,

        #[arg(long)]
        json: bool,
    },
    /// Delete one saved calculation
    Delete {
        /// Record id or a unique prefix of it
        id: String,
    },
    /// Delete every saved calculation
    Clear,
}

pub fn execute(command: &HistoryCommand, config: &FrostConfig) -> Result<()> {
    let mut store = super::open_history(config)?;

    match command {
        HistoryCommand::List { json, limit } => {
            let records: Vec<&HistoryRecord> = store.list().iter().take(*limit).collect();
            if *json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("No saved calculations in {}", store.path().display());
            } else {
                println!("{:<8} {:<17} {:<8} {:>7} {:>7} {:<6}", "Id", "Saved", "Soil", "Hn, m", "sf, cm", "Risk");
                for record in records {
                    println!(
                        "{:<8} {:<17} {:<8} {:>7.3} {:>7.2} {:<6}",
                        &record.id.to_string()[..8],
                        record.timestamp.format("%Y-%m-%d %H:%M"),
                        record.soil_code,
                        record.hn_m,
                        record.sf_cm,
                        record.risk_level
                    );
                }
            }
        }
        HistoryCommand::Show { id, json } => {
            let record = store.find(id)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(record)?);
            } else {
                print_record(record);
            }
        }
        HistoryCommand::Delete { id } => {
            let target = store.find(id)?.id;
            let removed = store.delete(target)?;
            println!("Deleted {}", removed.id);
        }
        HistoryCommand::Clear => {
            let count = store.clear()?;
            println!("Deleted {} record(s)", count);
        }
    }
    Ok(())
}

fn print_record(record: &HistoryRecord) {
    println!("Id:        {}", record.id);
    println!("Saved:     {}", record.timestamp.to_rfc3339());
    println!("Soil:      {} {}", record.soil_code, record.soil_name);
    println!("Climate:   {:.1} °C over {:.0} h", record.mean_surface_temp_c, record.freezing_hours);
    println!("Layers:");
    for layer in &record.layers {
        println!("  {:<24} {:.3} m", layer.name, layer.thickness_m);
    }
    println!("Hn = {:.3} m, Hn' = {:.3} m", record.hn_m, record.hn_alt_m);
    println!("sf = {:.2} cm, risk {}", record.sf_cm, record.risk_level);
}
