//! Material catalog models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Units materials are counted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MaterialUnit {
    #[default]
    Piece,
    Meter,
    Kilogram,
    Liter,
    Box,
    Package,
}

impl MaterialUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialUnit::Piece => "piece",
            MaterialUnit::Meter => "meter",
            MaterialUnit::Kilogram => "kilogram",
            MaterialUnit::Liter => "liter",
            MaterialUnit::Box => "box",
            MaterialUnit::Package => "package",
        }
    }
}

impl std::str::FromStr for MaterialUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "piece" => Ok(MaterialUnit::Piece),
            "meter" => Ok(MaterialUnit::Meter),
            "kilogram" => Ok(MaterialUnit::Kilogram),
            "liter" => Ok(MaterialUnit::Liter),
            "box" => Ok(MaterialUnit::Box),
            "package" => Ok(MaterialUnit::Package),
            other => Err(format!("unknown material unit: {other}")),
        }
    }
}

impl TryFrom<String> for MaterialUnit {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A catalog material
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit: MaterialUnit,
    pub unit_price: Option<Decimal>,
    /// Quantity at or below which the material counts as low stock
    pub min_stock_level: i64,
    pub barcode: Option<String>,
    pub supplier: Option<String>,
}
