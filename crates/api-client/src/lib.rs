use crate::error::ApiError;
use crate::responses::{DataEnvelope, FundListResponse, FundRow, NavPoint, QuoteBar};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use configuration::FetchConfig;
use core_types::{FundCategory, PricePoint, PriceSeries};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

pub mod download;
pub mod error;
pub mod responses;

// --- Public API ---
pub use download::{DownloadSummary, download_category};

/// Symbols served by the quote API as indices rather than stocks.
const INDEX_SYMBOLS: [&str; 6] = ["VNINDEX", "VN30", "VN100", "HNXINDEX", "HNX30", "UPCOMINDEX"];

/// A fund as listed by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundInfo {
    /// Provider product id, used to request the NAV history.
    pub id: i64,
    pub short_name: String,
    pub name: String,
    /// The provider's asset-type label, e.g. "Quỹ cổ phiếu".
    pub asset_type: String,
}

impl From<FundRow> for FundInfo {
    fn from(row: FundRow) -> Self {
        Self {
            id: row.id,
            short_name: row.short_name,
            name: row.name,
            asset_type: row.data_fund_asset_type.map(|t| t.name).unwrap_or_default(),
        }
    }
}

/// The interface to the market-data provider.
/// This trait is what the download commands use, allowing the HTTP
/// implementation to be swapped for a mock in tests.
#[async_trait]
pub trait FundDataClient: Send + Sync {
    /// Lists the open-ended funds of one category.
    async fn list_funds(&self, category: FundCategory) -> Result<Vec<FundInfo>, ApiError>;

    /// Fetches the full NAV-per-unit history of a fund.
    async fn fetch_nav_history(&self, fund: &FundInfo) -> Result<PriceSeries, ApiError>;

    /// Fetches daily closes of an index or stock between two dates, inclusive.
    async fn fetch_index_history(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<PriceSeries, ApiError>;
}

/// The HTTP implementation of `FundDataClient`.
#[derive(Clone)]
pub struct ProviderClient {
    client: reqwest::Client,
    fund_base_url: String,
    quote_base_url: String,
}

impl ProviderClient {
    pub fn new(config: &FetchConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            fund_base_url: config.fund_base_url.trim_end_matches('/').to_string(),
            quote_base_url: config.quote_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn read_data<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let url = response.url().to_string();
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                url,
                status: status.as_u16(),
                body: text,
            });
        }
        serde_json::from_str::<DataEnvelope<T>>(&text)
            .map(|envelope| envelope.data)
            .map_err(|e| ApiError::Deserialization(format!("{e} (from {url})")))
    }
}

#[async_trait]
impl FundDataClient for ProviderClient {
    async fn list_funds(&self, category: FundCategory) -> Result<Vec<FundInfo>, ApiError> {
        let url = format!("{}/res/products/filter", self.fund_base_url);
        let body = json!({
            "types": ["NEW_FUND", "TRADING_FUND"],
            "issuerIds": [],
            "sortOrder": "DESC",
            "sortField": "navTo6Months",
            "page": 1,
            "pageSize": 500,
            "isIpo": false,
            "fundAssetTypes": [],
            "bondRemainPeriods": [],
            "searchField": "",
            "isBuyByReward": false,
            "thirdAppIds": [],
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let listing: FundListResponse = Self::read_data(response).await?;

        let funds: Vec<FundInfo> = listing
            .rows
            .into_iter()
            .map(FundInfo::from)
            .filter(|f| category.matches_label(&f.asset_type))
            .collect();
        tracing::info!(category = %category, funds = funds.len(), "Listed funds");
        Ok(funds)
    }

    async fn fetch_nav_history(&self, fund: &FundInfo) -> Result<PriceSeries, ApiError> {
        let url = format!("{}/res/product/get-nav-history", self.fund_base_url);
        let body = json!({
            "isAllData": 1,
            "productId": fund.id,
            "fromDate": null,
            "toDate": Utc::now().date_naive().format("%Y%m%d").to_string(),
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let navs: Vec<NavPoint> = Self::read_data(response).await?;

        let points = navs
            .into_iter()
            .map(|p| Ok(PricePoint::new(parse_provider_date(&p.nav_date)?, p.nav)))
            .collect::<Result<Vec<_>, ApiError>>()?;
        Ok(PriceSeries::new(fund.short_name.clone(), points)?)
    }

    async fn fetch_index_history(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<PriceSeries, ApiError> {
        if from > to {
            return Err(ApiError::InvalidData(format!("Empty date range {from}..{to}")));
        }
        let symbol = symbol.to_uppercase();
        let url = format!("{}/stock-insight/v2/stock/bars-long-term", self.quote_base_url);
        let start = from.and_hms_opt(0, 0, 0).map(|t| t.and_utc().timestamp());
        let end = to.and_hms_opt(23, 59, 59).map(|t| t.and_utc().timestamp());
        let (Some(start), Some(end)) = (start, end) else {
            return Err(ApiError::InvalidData(format!("Invalid date range {from}..{to}")));
        };
        let kind = if INDEX_SYMBOLS.contains(&symbol.as_str()) { "index" } else { "stock" };
        let (start, end) = (start.to_string(), end.to_string());

        let response = self
            .client
            .get(&url)
            .query(&[
                ("ticker", symbol.as_str()),
                ("type", kind),
                ("resolution", "D"),
                ("from", start.as_str()),
                ("to", end.as_str()),
            ])
            .send()
            .await?;
        let bars: Vec<QuoteBar> = Self::read_data(response).await?;

        let points = bars
            .into_iter()
            .map(|b| Ok(PricePoint::new(parse_provider_date(&b.trading_date)?, b.close)))
            .collect::<Result<Vec<_>, ApiError>>()?;
        tracing::info!(symbol = %symbol, points = points.len(), "Fetched index history");
        Ok(PriceSeries::new(symbol, points)?)
    }
}

/// Parses the `YYYY-MM-DD` prefix of a provider date or timestamp.
fn parse_provider_date(raw: &str) -> Result<NaiveDate, ApiError> {
    raw.get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .ok_or_else(|| ApiError::InvalidData(format!("Invalid date: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ProviderClient {
        let config = FetchConfig {
            fund_base_url: server.uri(),
            quote_base_url: server.uri(),
            ..FetchConfig::default()
        };
        ProviderClient::new(&config).unwrap()
    }

    fn fund(id: i64, short_name: &str) -> FundInfo {
        FundInfo {
            id,
            short_name: short_name.to_string(),
            name: String::new(),
            asset_type: String::new(),
        }
    }

    #[tokio::test]
    async fn lists_only_funds_of_the_requested_category() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/res/products/filter"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 200,
                "data": { "total": 3, "rows": [
                    { "id": 23, "shortName": "DCDS", "name": "Quỹ Đầu tư Chứng khoán Năng động DC",
                      "dataFundAssetType": { "name": "Quỹ cổ phiếu" } },
                    { "id": 11, "shortName": "DCBF", "name": "Quỹ Đầu tư Trái phiếu DC",
                      "dataFundAssetType": { "name": "Quỹ trái phiếu" } },
                    { "id": 47, "shortName": "VESAF", "name": "Quỹ Đầu tư Cổ phiếu Tiếp cận Thị trường VinaCapital",
                      "dataFundAssetType": { "name": "Quỹ cổ phiếu" } }
                ]}
            })))
            .mount(&server)
            .await;

        let funds = client_for(&server).list_funds(FundCategory::Stock).await.unwrap();

        let names: Vec<&str> = funds.iter().map(|f| f.short_name.as_str()).collect();
        assert_eq!(names, vec!["DCDS", "VESAF"]);
        assert_eq!(funds[0].id, 23);
    }

    #[tokio::test]
    async fn nav_history_becomes_a_sorted_series() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/res/product/get-nav-history"))
            .and(body_partial_json(json!({ "productId": 23, "isAllData": 1 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    { "navDate": "2024-01-03", "nav": 25410.5 },
                    { "navDate": "2024-01-02", "nav": 25300.12 }
                ]
            })))
            .mount(&server)
            .await;

        let series = client_for(&server).fetch_nav_history(&fund(23, "DCDS")).await.unwrap();

        assert_eq!(series.id(), "DCDS");
        assert_eq!(series.len(), 2);
        let first = series.first().unwrap();
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(first.value, Decimal::from_str("25300.12").unwrap());
    }

    #[tokio::test]
    async fn index_history_parses_timestamps() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stock-insight/v2/stock/bars-long-term"))
            .and(query_param("ticker", "VNINDEX"))
            .and(query_param("type", "index"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ticker": "VNINDEX",
                "data": [
                    { "tradingDate": "2024-01-02T00:00:00.000Z", "close": 1139.77 },
                    { "tradingDate": "2024-01-03T00:00:00.000Z", "close": 1142.89 }
                ]
            })))
            .mount(&server)
            .await;

        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let series = client_for(&server)
            .fetch_index_history("vnindex", from, to)
            .await
            .unwrap();

        assert_eq!(series.id(), "VNINDEX");
        assert_eq!(series.last().unwrap().value, Decimal::from_str("1142.89").unwrap());
    }

    #[tokio::test]
    async fn error_status_is_reported_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Too many requests"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_nav_history(&fund(1, "X"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Status { status: 429, ref body, .. } if body == "Too many requests"));
    }

    #[tokio::test]
    async fn malformed_date_is_invalid_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": [{ "navDate": "03/01/2024", "nav": 1.0 }] })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_nav_history(&fund(1, "X"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidData(_)));
    }
}
