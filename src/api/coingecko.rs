// ============================================================================
// API : endpoints de marché (compatible CoinGecko v3)
// ============================================================================
// Appels en lecture seule, tous via ApiClient :
// - coins/markets           : liste des coins triée par market cap,
//                             ou restreinte à une liste d'ids (watchlist)
// - coins/{id}              : fiche détail
// - coins/{id}/market_chart : historique de prix
// - global                  : statistiques globales
// - search                  : recherche par nom/symbole
//
// Les structures "wire" matchent le JSON de l'API et sont converties vers
// nos modèles (Coin, CoinDetail, PriceSeries, GlobalStats, SearchHit).
// ============================================================================

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::api::client::{ApiClient, RequestConfig};
use crate::error::ApiError;
use crate::models::{ChartTimeframe, Coin, CoinDetail, GlobalStats, PriceSeries, SearchHit};

// ============================================================================
// Structures pour parser les réponses JSON
// ============================================================================

/// Valeurs indexées par devise : {"usd": 45234.56, "eur": 41000.0, ...}
///
/// CONCEPT RUST : Option<HashMap<..., Option<f64>>>
/// - La map peut être null pour certains coins
/// - Une valeur peut être null dans la map
type CurrencyMap = Option<HashMap<String, Option<f64>>>;

fn pick(map: &CurrencyMap, currency: &str) -> Option<f64> {
    map.as_ref()?.get(currency).copied().flatten()
}

#[derive(Debug, Deserialize)]
struct CoinDetailResponse {
    id: String,
    name: String,
    symbol: String,
    #[serde(default)]
    image: Option<ImageUrls>,
    #[serde(default)]
    market_data: Option<MarketData>,
}

#[derive(Debug, Default, Deserialize)]
struct ImageUrls {
    #[serde(default)]
    large: Option<String>,
    #[serde(default)]
    small: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct MarketData {
    #[serde(default)]
    current_price: CurrencyMap,
    #[serde(default)]
    price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    market_cap: CurrencyMap,
    #[serde(default)]
    total_volume: CurrencyMap,
    #[serde(default)]
    high_24h: CurrencyMap,
    #[serde(default)]
    low_24h: CurrencyMap,
    #[serde(default)]
    circulating_supply: Option<f64>,
    #[serde(default)]
    total_supply: Option<f64>,
    #[serde(default)]
    max_supply: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    #[serde(default)]
    prices: Option<Vec<(f64, f64)>>,
}

#[derive(Debug, Deserialize)]
struct GlobalResponse {
    data: GlobalData,
}

#[derive(Debug, Deserialize)]
struct GlobalData {
    #[serde(default)]
    total_market_cap: CurrencyMap,
    #[serde(default)]
    total_volume: CurrencyMap,
    #[serde(default)]
    market_cap_percentage: CurrencyMap,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    coins: Vec<SearchHit>,
}

// ============================================================================
// Conversions wire -> modèles
// ============================================================================

fn detail_from_response(resp: CoinDetailResponse, currency: &str) -> CoinDetail {
    let market = resp.market_data.unwrap_or_default();
    let image = resp.image.unwrap_or_default();

    CoinDetail {
        id: resp.id,
        name: resp.name,
        symbol: resp.symbol,
        image: image.large.or(image.small).unwrap_or_default(),
        current_price: pick(&market.current_price, currency).unwrap_or(0.0),
        price_change_percentage_24h: market.price_change_percentage_24h.unwrap_or(0.0),
        market_cap: pick(&market.market_cap, currency).unwrap_or(0.0),
        total_volume: pick(&market.total_volume, currency).unwrap_or(0.0),
        circulating_supply: market.circulating_supply.unwrap_or(0.0),
        total_supply: market.total_supply,
        max_supply: market.max_supply,
        high_24h: pick(&market.high_24h, currency).unwrap_or(0.0),
        low_24h: pick(&market.low_24h, currency).unwrap_or(0.0),
    }
}

fn global_from_response(resp: GlobalResponse, currency: &str) -> GlobalStats {
    GlobalStats {
        total_market_cap: pick(&resp.data.total_market_cap, currency),
        total_volume: pick(&resp.data.total_volume, currency),
        btc_dominance: pick(&resp.data.market_cap_percentage, "btc"),
    }
}

/// Série de prix seulement si la réponse est 200 et contient "prices"
fn series_from_response(
    resp: MarketChartResponse,
    status: u16,
    coin_id: &str,
    timeframe: ChartTimeframe,
) -> PriceSeries {
    match resp.prices {
        Some(prices) if status == 200 => PriceSeries::from_prices(coin_id, timeframe, &prices),
        _ => {
            warn!(coin = %coin_id, status, "Market chart response without prices");
            PriceSeries::empty(coin_id, timeframe)
        }
    }
}

// ============================================================================
// MarketSource : abstraction des appels de marché
// ============================================================================
// CONCEPT RUST : async fn dans un trait
// - Le worker est générique sur S: MarketSource
// - En prod : MarketApi (HTTP) ; en test : un fake en mémoire
// - Le worker exécute les futures sur un LocalSet : pas besoin de Send
// ============================================================================

#[allow(async_fn_in_trait)]
pub trait MarketSource {
    async fn top_coins(&self, currency: &str, page: u32, per_page: u32) -> Result<Vec<Coin>, ApiError>;

    /// Lignes de marché pour une liste d'ids précise
    async fn coins_by_ids(&self, ids: &[String], currency: &str) -> Result<Vec<Coin>, ApiError>;

    async fn coin_details(&self, id: &str, currency: &str) -> Result<CoinDetail, ApiError>;

    async fn market_chart(
        &self,
        id: &str,
        currency: &str,
        timeframe: ChartTimeframe,
    ) -> Result<PriceSeries, ApiError>;

    async fn global_stats(&self, currency: &str) -> Result<GlobalStats, ApiError>;

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ApiError>;
}

/// Implémentation HTTP de MarketSource
#[derive(Debug, Clone)]
pub struct MarketApi {
    client: ApiClient,
}

impl MarketApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl MarketSource for MarketApi {
    #[instrument(skip(self))]
    async fn top_coins(&self, currency: &str, page: u32, per_page: u32) -> Result<Vec<Coin>, ApiError> {
        let config = RequestConfig::default()
            .query("vs_currency", currency)
            .query("order", "market_cap_desc")
            .query("per_page", per_page)
            .query("page", page)
            .query("sparkline", false);

        let resp = self.client.get::<Vec<Coin>>("coins/markets", Some(&config)).await?;
        info!(count = resp.data.len(), "Fetched market list");
        Ok(resp.data)
    }

    /// Liste vide : aucune requête (l'API renverrait le top du marché)
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn coins_by_ids(&self, ids: &[String], currency: &str) -> Result<Vec<Coin>, ApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let config = RequestConfig::default()
            .query("vs_currency", currency)
            .query("ids", ids.join(","))
            .query("order", "market_cap_desc")
            .query("sparkline", false);

        let resp = self.client.get::<Vec<Coin>>("coins/markets", Some(&config)).await?;
        info!(count = resp.data.len(), "Fetched watchlist coins");
        Ok(resp.data)
    }

    #[instrument(skip(self))]
    async fn coin_details(&self, id: &str, currency: &str) -> Result<CoinDetail, ApiError> {
        let config = RequestConfig::default()
            .query("localization", false)
            .query("tickers", false)
            .query("community_data", false)
            .query("developer_data", false);

        let resp = self
            .client
            .get::<CoinDetailResponse>(&format!("coins/{}", id), Some(&config))
            .await?;
        debug!(status = resp.status, "Fetched coin details");
        Ok(detail_from_response(resp.data, currency))
    }

    #[instrument(skip(self), fields(days = timeframe.days()))]
    async fn market_chart(
        &self,
        id: &str,
        currency: &str,
        timeframe: ChartTimeframe,
    ) -> Result<PriceSeries, ApiError> {
        let config = RequestConfig::default()
            .query("vs_currency", currency)
            .query("days", timeframe.days());

        let resp = self
            .client
            .get::<MarketChartResponse>(&format!("coins/{}/market_chart", id), Some(&config))
            .await?;
        let series = series_from_response(resp.data, resp.status, id, timeframe);
        info!(points = series.len(), "Fetched market chart");
        Ok(series)
    }

    #[instrument(skip(self))]
    async fn global_stats(&self, currency: &str) -> Result<GlobalStats, ApiError> {
        let resp = self.client.get::<GlobalResponse>("global", None).await?;
        Ok(global_from_response(resp.data, currency))
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ApiError> {
        let config = RequestConfig::default().query("query", query);
        let resp = self.client.get::<SearchResponse>("search", Some(&config)).await?;
        info!(hits = resp.data.coins.len(), "Search completed");
        Ok(resp.data.coins)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coin_detail() {
        let json = r#"{
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "image": {"thumb": "t.png", "small": "s.png", "large": "l.png"},
            "market_data": {
                "current_price": {"usd": 45234.56, "eur": 41500.0},
                "price_change_percentage_24h": 2.45,
                "market_cap": {"usd": 885000000000.0},
                "total_volume": {"usd": 28000000000.0},
                "high_24h": {"usd": 46000.0},
                "low_24h": {"usd": 44000.0},
                "circulating_supply": 19500000.0,
                "total_supply": 21000000.0,
                "max_supply": null
            }
        }"#;
        let resp: CoinDetailResponse = serde_json::from_str(json).unwrap();
        let detail = detail_from_response(resp, "usd");

        assert_eq!(detail.id, "bitcoin");
        assert_eq!(detail.image, "l.png");
        assert_eq!(detail.current_price, 45234.56);
        assert_eq!(detail.high_24h, 46000.0);
        assert_eq!(detail.total_supply, Some(21000000.0));
        assert_eq!(detail.max_supply, None);
    }

    #[test]
    fn test_coin_detail_missing_currency_defaults_to_zero() {
        let json = r#"{"id": "x", "symbol": "x", "name": "X", "market_data": {"current_price": {"usd": 1.0}, "high_24h": null}}"#;
        let resp: CoinDetailResponse = serde_json::from_str(json).unwrap();
        let detail = detail_from_response(resp, "eur");
        assert_eq!(detail.current_price, 0.0);
        assert_eq!(detail.high_24h, 0.0);
        assert_eq!(detail.image, "");
    }

    #[test]
    fn test_parse_global() {
        let json = r#"{"data": {
            "total_market_cap": {"usd": 1650000000000.0},
            "total_volume": {"usd": 75000000000.0},
            "market_cap_percentage": {"btc": 52.1, "eth": 17.3}
        }}"#;
        let resp: GlobalResponse = serde_json::from_str(json).unwrap();
        let stats = global_from_response(resp, "usd");

        assert_eq!(stats.total_market_cap, Some(1650000000000.0));
        assert_eq!(stats.btc_dominance, Some(52.1));
        assert_eq!(stats.market_cap_label("usd"), "$1.65T");
    }

    #[test]
    fn test_market_chart_requires_ok_status_and_prices() {
        let json = r#"{"prices": [[1705327500000, 45000.0], [1705331100000, 45500.5]], "market_caps": [], "total_volumes": []}"#;

        let resp: MarketChartResponse = serde_json::from_str(json).unwrap();
        let series = series_from_response(resp, 200, "bitcoin", ChartTimeframe::OneDay);
        assert_eq!(series.len(), 2);
        assert_eq!(series.current_price(), 45500.5);

        let resp: MarketChartResponse = serde_json::from_str(json).unwrap();
        assert!(series_from_response(resp, 203, "bitcoin", ChartTimeframe::OneDay).is_empty());

        let resp: MarketChartResponse = serde_json::from_str("{}").unwrap();
        assert!(series_from_response(resp, 200, "bitcoin", ChartTimeframe::OneDay).is_empty());
    }

    #[tokio::test]
    async fn test_coins_by_ids_empty_skips_request() {
        // Personne n'écoute sur ce port : une requête échouerait
        let client = ApiClient::new("http://127.0.0.1:9", "").unwrap();
        let coins = MarketApi::new(client).coins_by_ids(&[], "usd").await.unwrap();
        assert!(coins.is_empty());
    }

    #[tokio::test]
    async fn test_coins_by_ids_queries_market_rows() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 1024];
            while !received.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
            }
            let body = r#"[{"id":"pepe","symbol":"pepe","name":"Pepe","image":"","current_price":0.0000012,"market_cap":500000000.0,"total_volume":1.0,"market_cap_rank":40,"price_change_percentage_24h":-3.5}]"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&received).to_string()
        });

        let api = MarketApi::new(ApiClient::new(&base, "").unwrap());
        let ids = vec!["pepe".to_string(), "bonk".to_string()];
        let coins = api.coins_by_ids(&ids, "eur").await.unwrap();
        assert_eq!(coins.len(), 1);
        assert_eq!(coins[0].id, "pepe");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /coins/markets?vs_currency=eur&ids=pepe%2Cbonk&"));
    }

    #[test]
    fn test_parse_search() {
        let json = r#"{"coins": [
            {"id": "bitcoin", "name": "Bitcoin", "api_symbol": "bitcoin", "symbol": "BTC", "market_cap_rank": 1, "thumb": "t", "large": "l"},
            {"id": "bitcoin-cash", "name": "Bitcoin Cash", "api_symbol": "bitcoin-cash", "symbol": "BCH", "market_cap_rank": null, "thumb": "t", "large": "l"}
        ], "exchanges": [], "categories": []}"#;
        let resp: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.coins.len(), 2);
        assert_eq!(resp.coins[0].market_cap_rank, Some(1));
        assert_eq!(resp.coins[1].market_cap_rank, None);
    }
}
