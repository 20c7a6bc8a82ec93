use clap::Args;
use serde_json::Value;

use homeloan_core::jurisdiction::acquisition_costs::{self, Jurisdiction};

/// Arguments for listing acquisition cost presets
#[derive(Args)]
pub struct JurisdictionsArgs {
    /// Show a single preset instead of all
    #[arg(long)]
    pub jurisdiction: Option<Jurisdiction>,
}

pub fn run_jurisdictions(args: JurisdictionsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let profiles = match args.jurisdiction {
        Some(j) => vec![j.profile()],
        None => acquisition_costs::list_profiles(),
    };

    let rows = profiles
        .into_iter()
        .map(|p| -> Result<Value, serde_json::Error> {
            let total_rate = p.total_rate();
            let mut row = serde_json::to_value(&p)?;
            if let Value::Object(ref mut map) = row {
                map.insert("total_rate".into(), serde_json::to_value(total_rate)?);
            }
            Ok(row)
        })
        .collect::<Result<Vec<Value>, _>>()?;

    Ok(Value::Array(rows))
}
