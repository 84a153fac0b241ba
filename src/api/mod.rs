// ============================================================================
// Module : api
// ============================================================================
// - client    : client HTTP générique (get/post/put/patch/delete)
// - coingecko : endpoints de marché et trait MarketSource
// ============================================================================

pub mod client;
pub mod coingecko;

pub use client::{ApiClient, ApiResponse, RequestConfig};
pub use coingecko::{MarketApi, MarketSource};
