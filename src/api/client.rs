// ============================================================================
// Client HTTP générique vers l'API de marché
// ============================================================================
// Un seul client reqwest, réutilisé pour toutes les requêtes :
// - URL de base + chemin relatif
// - Headers communs : Content-Type et clé d'API
// - Timeout de 30 secondes, pas de retry
//
// Chaque verbe (get, post, put, patch, delete) passe par request() et
// retourne ApiResponse { data, status }.
// ============================================================================

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, instrument};

use crate::config::Config;
use crate::error::ApiError;

/// Header attendu par CoinGecko pour les clés "demo"
pub const API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// Timeout appliqué à chaque requête
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Réponse décodée + code HTTP
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: u16,
}

/// Options par requête : paramètres de query et headers supplémentaires
///
/// CONCEPT RUST : Builder par valeur
/// - Chaque méthode consomme self et le retourne
/// - Permet d'enchaîner : RequestConfig::default().query("a", 1).query("b", 2)
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl RequestConfig {
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn header(mut self, name: &str, value: impl ToString) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// Client de l'API de marché
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(&config.api_base_url, &config.api_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL complète pour un chemin relatif (le "/" initial est toléré)
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        config: Option<&RequestConfig>,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(Method::GET, path, None::<&()>, config).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: Option<&B>,
        config: Option<&RequestConfig>,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(Method::POST, path, body, config).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: Option<&B>,
        config: Option<&RequestConfig>,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(Method::PUT, path, body, config).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: Option<&B>,
        config: Option<&RequestConfig>,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(Method::PATCH, path, body, config).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        config: Option<&RequestConfig>,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(Method::DELETE, path, None::<&()>, config).await
    }

    /// Envoie la requête et décode la réponse
    ///
    /// - 2xx avec corps vide -> EmptyPayload
    /// - 2xx avec JSON invalide -> Decode
    /// - hors 2xx -> Status { status, body }
    #[instrument(skip(self, method, body, config), fields(method = %method))]
    async fn request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        config: Option<&RequestConfig>,
    ) -> Result<ApiResponse<T>, ApiError> {
        let url = self.url(path);

        let mut req = self
            .client
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, &self.api_key);

        if let Some(config) = config {
            if !config.query.is_empty() {
                req = req.query(&config.query);
            }
            for (name, value) in &config.headers {
                req = req.header(name.as_str(), value.as_str());
            }
        }

        if let Some(body) = body {
            req = req.json(body);
        }

        debug!(url = %url, "Sending HTTP request");
        let resp = req.send().await.map_err(|e| {
            error!(url = %url, error = %e, "HTTP request failed");
            ApiError::Transport(e)
        })?;

        let status = resp.status();
        let text = resp.text().await?;
        debug!(status = %status, bytes = text.len(), "Received HTTP response");

        if !status.is_success() {
            error!(status = %status, url = %url, "API returned error status");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Err(ApiError::EmptyPayload(url));
        }

        let data = serde_json::from_str::<T>(&text)?;
        Ok(ApiResponse {
            data,
            status: status.as_u16(),
        })
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
// Un mini serveur HTTP local (TcpListener tokio) répond une seule fois avec
// une réponse brute : pas de réseau externe nécessaire.
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Sert une réponse unique et renvoie la requête reçue (ligne, headers et corps)
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 1024];

            // Lit les headers, puis le corps annoncé par Content-Length
            let mut expected: Option<usize> = None;
            loop {
                if expected.is_none() {
                    if let Some(pos) = received.windows(4).position(|w| w == b"\r\n\r\n") {
                        let head = String::from_utf8_lossy(&received[..pos]).to_lowercase();
                        let length = head
                            .lines()
                            .find_map(|line| line.strip_prefix("content-length:"))
                            .and_then(|value| value.trim().parse::<usize>().ok())
                            .unwrap_or(0);
                        expected = Some(pos + 4 + length);
                    }
                }
                if matches!(expected, Some(total) if received.len() >= total) {
                    break;
                }
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&received).to_string()
        });

        (format!("http://{}", addr), handle)
    }

    /// Corps de la requête capturée (après la ligne vide)
    fn request_body(request: &str) -> &str {
        request.split_once("\r\n\r\n").map(|(_, body)| body).unwrap_or("")
    }

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new("https://api.example.com/v3/", "key").unwrap();
        assert_eq!(client.base_url(), "https://api.example.com/v3");
        assert_eq!(client.url("global"), "https://api.example.com/v3/global");
        assert_eq!(client.url("/coins/markets"), "https://api.example.com/v3/coins/markets");
    }

    #[test]
    fn test_request_config_builder() {
        let config = RequestConfig::default()
            .query("vs_currency", "usd")
            .query("page", 2)
            .header("x-trace", "abc");
        assert_eq!(config.query[1], ("page".to_string(), "2".to_string()));
        assert_eq!(config.headers.len(), 1);
    }

    #[tokio::test]
    async fn test_get_decodes_and_sends_headers() {
        let (base, server) = serve_once("200 OK", r#"{"gecko_says":"(V3) To the Moon!"}"#).await;
        let client = ApiClient::new(&base, "demo-key").unwrap();

        let config = RequestConfig::default().query("vs_currency", "usd");
        let resp: ApiResponse<serde_json::Value> = client.get("/ping", Some(&config)).await.unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.data["gecko_says"], "(V3) To the Moon!");

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /ping?vs_currency=usd "));
        assert!(request.contains("x-cg-demo-api-key: demo-key"));
        assert!(request.contains("content-type: application/json"));
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let (base, server) = serve_once("201 Created", r#"{"id":"pf-1","coins":["bitcoin"]}"#).await;
        let client = ApiClient::new(&base, "demo-key").unwrap();

        let body = serde_json::json!({"name": "Main", "coins": ["bitcoin"]});
        let resp: ApiResponse<serde_json::Value> = client.post("portfolios", Some(&body), None).await.unwrap();
        assert_eq!(resp.status, 201);
        assert_eq!(resp.data["id"], "pf-1");

        let request = server.await.unwrap();
        assert!(request.to_lowercase().starts_with("post /portfolios "));
        let sent: serde_json::Value = serde_json::from_str(request_body(&request)).unwrap();
        assert_eq!(sent, body);
    }

    #[tokio::test]
    async fn test_put_sends_json_body() {
        let (base, server) = serve_once("200 OK", r#"{"updated":true}"#).await;
        let client = ApiClient::new(&base, "").unwrap();

        let body = serde_json::json!({"coins": ["ethereum", "solana"]});
        let config = RequestConfig::default().header("x-trace", "abc");
        let resp: ApiResponse<serde_json::Value> = client.put("portfolios/pf-1", Some(&body), Some(&config)).await.unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.data["updated"], true);

        let request = server.await.unwrap();
        assert!(request.to_lowercase().starts_with("put /portfolios/pf-1 "));
        assert!(request.to_lowercase().contains("x-trace: abc"));
        let sent: serde_json::Value = serde_json::from_str(request_body(&request)).unwrap();
        assert_eq!(sent, body);
    }

    #[tokio::test]
    async fn test_patch_sends_json_body() {
        let (base, server) = serve_once("200 OK", r#"{"name":"Renamed"}"#).await;
        let client = ApiClient::new(&base, "").unwrap();

        let body = serde_json::json!({"name": "Renamed"});
        let resp: ApiResponse<serde_json::Value> = client.patch("portfolios/pf-1", Some(&body), None).await.unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.data["name"], "Renamed");

        let request = server.await.unwrap();
        assert!(request.to_lowercase().starts_with("patch /portfolios/pf-1 "));
        let sent: serde_json::Value = serde_json::from_str(request_body(&request)).unwrap();
        assert_eq!(sent, body);
    }

    #[tokio::test]
    async fn test_post_without_body_sends_nothing() {
        let (base, server) = serve_once("200 OK", r#"{"ok":true}"#).await;
        let client = ApiClient::new(&base, "").unwrap();

        let resp: ApiResponse<serde_json::Value> = client.post("ping", None::<&()>, None).await.unwrap();
        assert_eq!(resp.data["ok"], true);

        let request = server.await.unwrap();
        assert!(request.to_lowercase().starts_with("post /ping "));
        assert_eq!(request_body(&request), "");
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let (base, server) = serve_once("429 Too Many Requests", r#"{"error":"rate limited"}"#).await;
        let client = ApiClient::new(&base, "").unwrap();

        let err = client.get::<serde_json::Value>("global", None).await.unwrap_err();
        assert_eq!(err.status(), Some(429));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_body_is_empty_payload() {
        let (base, server) = serve_once("200 OK", "").await;
        let client = ApiClient::new(&base, "").unwrap();

        let err = client.delete::<serde_json::Value>("coins/x", None).await.unwrap_err();
        assert!(matches!(err, ApiError::EmptyPayload(_)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let (base, server) = serve_once("200 OK", "not json").await;
        let client = ApiClient::new(&base, "").unwrap();

        let err = client.get::<serde_json::Value>("global", None).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Port réservé puis libéré : plus personne n'écoute
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ApiClient::new(&format!("http://{}", addr), "").unwrap();
        let err = client.get::<serde_json::Value>("global", None).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
