//! Transaction costs ("Kaufnebenkosten") charged on a residential purchase.
//!
//! Each German state sets its own land transfer tax; notary/land registry
//! fees and the buyer-side broker commission are roughly uniform. The total
//! rate is applied to the purchase price and must be covered by equity.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HomeLoanError;
use crate::types::Rate;
use crate::HomeLoanResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Notary and land registry fees, about 1.5% of the price.
const NOTARY_AND_REGISTRY: Rate = dec!(0.015);

/// Buyer-side broker commission: 3% plus 19% VAT.
const BROKER_COMMISSION: Rate = dec!(0.0357);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// States with a built-in acquisition cost preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Jurisdiction {
    /// Munich / Bavaria, 8.57% in total.
    #[default]
    Bavaria,
    BadenWuerttemberg,
    Berlin,
    Hamburg,
    NorthRhineWestphalia,
}

/// Breakdown of the acquisition cost rate. All components are decimal
/// fractions of the purchase price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionCostProfile {
    /// Free-form label, e.g. "Bavaria" or a custom name.
    pub jurisdiction: String,
    /// Land transfer tax (Grunderwerbsteuer)
    pub land_transfer_tax: Rate,
    /// Notary and land registry fees
    pub notary_and_registry: Rate,
    /// Broker commission incl. VAT
    pub broker_commission: Rate,
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

impl Jurisdiction {
    pub const ALL: [Jurisdiction; 5] = [
        Jurisdiction::Bavaria,
        Jurisdiction::BadenWuerttemberg,
        Jurisdiction::Berlin,
        Jurisdiction::Hamburg,
        Jurisdiction::NorthRhineWestphalia,
    ];

    /// Land transfer tax rate levied by the state.
    pub fn land_transfer_tax(&self) -> Rate {
        match self {
            Jurisdiction::Bavaria => dec!(0.035),
            Jurisdiction::BadenWuerttemberg => dec!(0.05),
            Jurisdiction::Berlin => dec!(0.06),
            Jurisdiction::Hamburg => dec!(0.055),
            Jurisdiction::NorthRhineWestphalia => dec!(0.065),
        }
    }

    pub fn profile(&self) -> AcquisitionCostProfile {
        AcquisitionCostProfile {
            jurisdiction: self.to_string(),
            land_transfer_tax: self.land_transfer_tax(),
            notary_and_registry: NOTARY_AND_REGISTRY,
            broker_commission: BROKER_COMMISSION,
        }
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Jurisdiction::Bavaria => "Bavaria",
            Jurisdiction::BadenWuerttemberg => "Baden-Wuerttemberg",
            Jurisdiction::Berlin => "Berlin",
            Jurisdiction::Hamburg => "Hamburg",
            Jurisdiction::NorthRhineWestphalia => "North Rhine-Westphalia",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Jurisdiction {
    type Err = HomeLoanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalised.as_str() {
            "bavaria" | "by" | "munich" => Ok(Jurisdiction::Bavaria),
            "baden-wuerttemberg" | "bw" => Ok(Jurisdiction::BadenWuerttemberg),
            "berlin" | "be" => Ok(Jurisdiction::Berlin),
            "hamburg" | "hh" => Ok(Jurisdiction::Hamburg),
            "north-rhine-westphalia" | "nrw" => Ok(Jurisdiction::NorthRhineWestphalia),
            _ => Err(HomeLoanError::InvalidInput {
                field: "jurisdiction".into(),
                reason: format!("unknown jurisdiction '{s}'"),
            }),
        }
    }
}

impl Default for AcquisitionCostProfile {
    fn default() -> Self {
        Jurisdiction::default().profile()
    }
}

impl AcquisitionCostProfile {
    /// Sum of all components; the rate applied to the purchase price.
    pub fn total_rate(&self) -> Rate {
        self.land_transfer_tax + self.notary_and_registry + self.broker_commission
    }

    /// Every component and the total must lie in [0, 1).
    pub fn validate(&self) -> HomeLoanResult<()> {
        let components = [
            ("land_transfer_tax", self.land_transfer_tax),
            ("notary_and_registry", self.notary_and_registry),
            ("broker_commission", self.broker_commission),
        ];
        for (field, value) in components {
            if value < Decimal::ZERO || value >= Decimal::ONE {
                return Err(HomeLoanError::InvalidInput {
                    field: field.into(),
                    reason: "Cost component must be between 0 and 1 (exclusive upper)".into(),
                });
            }
        }
        if self.total_rate() >= Decimal::ONE {
            return Err(HomeLoanError::InvalidInput {
                field: "acquisition_cost_rate".into(),
                reason: "Total acquisition cost rate must be below 100%".into(),
            });
        }
        Ok(())
    }
}

/// All built-in presets, in declaration order.
pub fn list_profiles() -> Vec<AcquisitionCostProfile> {
    Jurisdiction::ALL.iter().map(Jurisdiction::profile).collect()
}
