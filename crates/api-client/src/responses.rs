use rust_decimal::Decimal;
use serde::Deserialize;

// Using `#[serde(rename_all = "camelCase")]` to automatically map from JSON camelCase to Rust snake_case.

/// Every provider payload wraps its result in a `data` field.
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// `data` of `POST /res/products/filter`.
#[derive(Debug, Clone, Deserialize)]
pub struct FundListResponse {
    pub rows: Vec<FundRow>,
}

/// One open-ended fund from the product listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundRow {
    pub id: i64,
    pub short_name: String,
    pub name: String,
    pub data_fund_asset_type: Option<AssetType>,
    // There are more fields (issuer, fees, ...), but these are all we use.
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetType {
    pub name: String,
}

/// One entry of `POST /res/product/get-nav-history`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavPoint {
    pub nav_date: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub nav: Decimal,
}

/// One daily bar of `GET /stock-insight/v2/stock/bars-long-term`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteBar {
    pub trading_date: String, // e.g. "2024-01-05T00:00:00.000Z"
    #[serde(with = "rust_decimal::serde::float")]
    pub close: Decimal,
}
