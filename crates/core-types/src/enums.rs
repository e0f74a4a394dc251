use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The open-ended fund categories published by the data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FundCategory {
    Bond,
    Balanced,
    Stock,
}

impl FundCategory {
    /// Every category, in the order the downloader walks them.
    pub const ALL: [FundCategory; 3] = [
        FundCategory::Bond,
        FundCategory::Balanced,
        FundCategory::Stock,
    ];

    /// The asset-type label the provider attaches to funds of this category.
    pub fn provider_label(&self) -> &'static str {
        match self {
            FundCategory::Bond => "Quỹ trái phiếu",
            FundCategory::Balanced => "Quỹ cân bằng",
            FundCategory::Stock => "Quỹ cổ phiếu",
        }
    }

    /// The sub-directory of the data directory that holds this category's CSVs.
    pub fn dir_name(&self) -> &'static str {
        match self {
            FundCategory::Bond => "bond_fund",
            FundCategory::Balanced => "balanced_fund",
            FundCategory::Stock => "stock_fund",
        }
    }

    /// Returns true if a provider asset-type label belongs to this category.
    /// The match is case-insensitive and tolerates surrounding text.
    pub fn matches_label(&self, label: &str) -> bool {
        label
            .to_lowercase()
            .contains(&self.provider_label().to_lowercase())
    }
}

impl fmt::Display for FundCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FundCategory::Bond => "bond",
            FundCategory::Balanced => "balanced",
            FundCategory::Stock => "stock",
        };
        write!(f, "{name}")
    }
}

impl FromStr for FundCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bond" | "bond_fund" => Ok(FundCategory::Bond),
            "balanced" | "balanced_fund" => Ok(FundCategory::Balanced),
            "stock" | "stock_fund" | "equity" => Ok(FundCategory::Stock),
            other => Err(CoreError::UnknownCategory(other.to_string())),
        }
    }
}
