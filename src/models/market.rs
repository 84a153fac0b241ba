// ============================================================================
// Structures : GlobalStats et SearchHit
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::format::{format_market_cap, format_percent, PLACEHOLDER};

/// Statistiques globales du marché (endpoint global)
///
/// Tous les champs sont optionnels : en cas d'échec réseau, la vue affiche "--"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_market_cap: Option<f64>,
    pub total_volume: Option<f64>,
    pub btc_dominance: Option<f64>,
}

impl GlobalStats {
    pub fn market_cap_label(&self, currency: &str) -> String {
        self.total_market_cap
            .map(|v| format_market_cap(v, currency))
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    pub fn volume_label(&self, currency: &str) -> String {
        self.total_volume
            .map(|v| format_market_cap(v, currency))
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    pub fn dominance_label(&self) -> String {
        format_percent(self.btc_dominance)
    }
}

/// Un résultat de l'endpoint search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub api_symbol: String,
    pub symbol: String,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub thumb: String,
    #[serde(default)]
    pub large: String,
}

impl SearchHit {
    /// "#1  Bitcoin (BTC)" ou "Bitcoin (BTC)" sans rang
    pub fn display(&self) -> String {
        match self.market_cap_rank {
            Some(rank) => format!("#{:<4} {} ({})", rank, self.name, self.symbol.to_uppercase()),
            None => format!("{:<6}{} ({})", "", self.name, self.symbol.to_uppercase()),
        }
    }
}
