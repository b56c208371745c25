//! # Company fundamentals from the Yahoo Finance quoteSummary endpoint.
//!
//! Every field is optional: a missing module or value becomes `None` instead of an
//! error. Yahoo wraps numbers as `{"raw": 1.0, "fmt": "1.00"}`; bare numbers are
//! accepted as well.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::{HttpClient, SourceError};

const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const MODULES: &str = "price,summaryDetail,defaultKeyStatistics,financialData,assetProfile,\
                       incomeStatementHistory,cashflowStatementHistory";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub exchange: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub last: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub market_cap: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub forward_pe: Option<f64>,
    pub price_to_book: Option<f64>,
}

/// Latest annual figures.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Financials {
    pub revenue: Option<f64>,
    pub net_income: Option<f64>,
    pub free_cash_flow: Option<f64>,
}

/// Fundamentals snapshot for one ticker.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub ticker: String,
    pub identity: Identity,
    pub price: Price,
    pub valuation: Valuation,
    pub financials: Financials,
    /// False when the provider returned no company data at all.
    pub raw_info_available: bool,
}

impl Fundamentals {
    /// Builds a snapshot from a quoteSummary response body.
    pub fn from_quote_summary(ticker: &str, body: &Value) -> Self {
        let ticker = ticker.to_uppercase();
        let Some(result) = body
            .pointer("/quoteSummary/result/0")
            .filter(|v| v.as_object().is_some_and(|o| !o.is_empty()))
        else {
            return Self {
                ticker,
                ..Self::default()
            };
        };

        let text = |paths: &[&str]| paths.iter().find_map(|p| string_at(result, p));
        let number = |paths: &[&str]| paths.iter().find_map(|p| number_at(result, p));

        Self {
            ticker,
            identity: Identity {
                name: text(&["/price/longName", "/price/shortName"]),
                sector: text(&["/assetProfile/sector"]),
                industry: text(&["/assetProfile/industry"]),
                exchange: text(&["/price/exchange", "/price/exchangeName"]),
            },
            price: Price {
                last: number(&["/price/regularMarketPrice", "/financialData/currentPrice"]),
                currency: text(&["/price/currency", "/financialData/financialCurrency"]),
            },
            valuation: Valuation {
                market_cap: number(&["/price/marketCap", "/summaryDetail/marketCap"]),
                trailing_pe: number(&["/summaryDetail/trailingPE"]),
                forward_pe: number(&["/summaryDetail/forwardPE", "/defaultKeyStatistics/forwardPE"]),
                price_to_book: number(&["/defaultKeyStatistics/priceToBook"]),
            },
            financials: Financials {
                revenue: number(&[
                    "/incomeStatementHistory/incomeStatementHistory/0/totalRevenue",
                    "/financialData/totalRevenue",
                ]),
                net_income: number(&["/incomeStatementHistory/incomeStatementHistory/0/netIncome"]),
                free_cash_flow: number(&[
                    "/financialData/freeCashflow",
                    "/cashflowStatementHistory/cashflowStatements/0/freeCashFlow",
                ]),
            },
            raw_info_available: true,
        }
    }
}

fn string_at(root: &Value, path: &str) -> Option<String> {
    root.pointer(path)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn number_at(root: &Value, path: &str) -> Option<f64> {
    let v = root.pointer(path)?;
    v.as_f64()
        .or_else(|| v.get("raw").and_then(Value::as_f64))
        .filter(|n| n.is_finite())
}

/// Yahoo Finance fetcher. Cheap to clone.
#[derive(Clone)]
pub struct FundamentalsSource {
    http: HttpClient,
}

impl FundamentalsSource {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn fetch(
        &self,
        ticker: &str,
        ctx: &CancellationToken,
    ) -> Result<Fundamentals, SourceError> {
        let url = format!(
            "{QUOTE_SUMMARY_URL}/{}?modules={MODULES}",
            ticker.to_uppercase()
        );
        let body = self.http.get_json(&url, ctx).await?;
        let fundamentals = Fundamentals::from_quote_summary(ticker, &body);
        if !fundamentals.raw_info_available {
            tracing::debug!(ticker, "quoteSummary returned no company data");
        }
        Ok(fundamentals)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn maps_quote_summary_modules() {
        let body = json!({
            "quoteSummary": {
                "result": [{
                    "price": {
                        "longName": "Apple Inc.",
                        "exchangeName": "NasdaqGS",
                        "currency": "USD",
                        "regularMarketPrice": {"raw": 227.55, "fmt": "227.55"},
                        "marketCap": {"raw": 3.45e12, "fmt": "3.45T"}
                    },
                    "summaryDetail": {"trailingPE": {"raw": 34.6}, "forwardPE": {}},
                    "defaultKeyStatistics": {"forwardPE": {"raw": 30.1}, "priceToBook": 51.2},
                    "assetProfile": {"sector": "Technology", "industry": "Consumer Electronics"},
                    "financialData": {"freeCashflow": {"raw": 1.1e11}, "totalRevenue": {"raw": 1.0}},
                    "incomeStatementHistory": {
                        "incomeStatementHistory": [
                            {"totalRevenue": {"raw": 3.91e11}, "netIncome": {"raw": 9.37e10}},
                            {"totalRevenue": {"raw": 3.83e11}}
                        ]
                    }
                }],
                "error": null
            }
        });

        let f = Fundamentals::from_quote_summary("aapl", &body);
        assert_eq!(f.ticker, "AAPL");
        assert!(f.raw_info_available);
        assert_eq!(f.identity.name.as_deref(), Some("Apple Inc."));
        assert_eq!(f.identity.exchange.as_deref(), Some("NasdaqGS"));
        assert_eq!(f.identity.sector.as_deref(), Some("Technology"));
        assert_eq!(f.price.last, Some(227.55));
        assert_eq!(f.price.currency.as_deref(), Some("USD"));
        assert_eq!(f.valuation.market_cap, Some(3.45e12));
        assert_eq!(f.valuation.trailing_pe, Some(34.6));
        // empty summaryDetail.forwardPE falls through to defaultKeyStatistics
        assert_eq!(f.valuation.forward_pe, Some(30.1));
        assert_eq!(f.valuation.price_to_book, Some(51.2));
        assert_eq!(f.financials.revenue, Some(3.91e11));
        assert_eq!(f.financials.net_income, Some(9.37e10));
        assert_eq!(f.financials.free_cash_flow, Some(1.1e11));
    }

    #[test]
    fn unknown_ticker_yields_empty_snapshot() {
        let body = json!({
            "quoteSummary": {
                "result": null,
                "error": {"code": "Not Found", "description": "Quote not found for symbol: ZZZZ"}
            }
        });
        let f = Fundamentals::from_quote_summary("zzzz", &body);
        assert_eq!(f.ticker, "ZZZZ");
        assert!(!f.raw_info_available);
        assert_eq!(f.identity, Identity::default());
        assert_eq!(f.valuation.market_cap, None);
    }
}
