// ============================================================================
// Structures : Coin et CoinDetail
// ============================================================================
// Coin : une ligne de la liste des marchés (endpoint coins/markets)
// CoinDetail : la fiche complète d'une crypto (endpoint coins/{id})
//
// Les données viennent telles quelles de l'API et ne sont jamais modifiées :
// au prochain fetch, la liste entière est remplacée.
// ============================================================================

use serde::{Deserialize, Deserializer, Serialize};

use crate::format::{format_change, PriceChange};

/// Désérialise un nombre qui peut être null ou absent en 0.0
///
/// CONCEPT RUST : deserialize_with
/// - L'API renvoie parfois `null` pour des coins peu liquides
/// - Option<f64> accepte null, puis on remplace par 0
pub(crate) fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Une crypto dans la liste des marchés
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    /// Identifiant API (ex: "bitcoin")
    pub id: String,

    /// Nom complet (ex: "Bitcoin")
    pub name: String,

    /// Symbole (ex: "btc")
    pub symbol: String,

    /// URL du logo
    #[serde(default)]
    pub image: String,

    #[serde(default, deserialize_with = "null_as_zero")]
    pub current_price: f64,

    #[serde(default, deserialize_with = "null_as_zero")]
    pub market_cap: f64,

    /// Volume échangé sur 24h
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total_volume: f64,

    #[serde(default)]
    pub market_cap_rank: Option<u32>,

    /// Variation sur 24h en pourcentage (absente pour certains coins)
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
}

impl Coin {
    /// Variation 24h, 0 si inconnue
    pub fn change_percent(&self) -> f64 {
        self.price_change_percentage_24h.unwrap_or(0.0)
    }

    /// Variation formatée avec signe et flèche
    pub fn change(&self) -> PriceChange {
        format_change(self.change_percent())
    }

    /// True si la variation 24h est strictement positive
    pub fn is_positive(&self) -> bool {
        self.change_percent() > 0.0
    }

    /// Filtre texte insensible à la casse sur le nom ou le symbole
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.name.to_lowercase().contains(&query)
            || self.symbol.to_lowercase().contains(&query)
    }

    /// Symbole en majuscules pour l'affichage
    pub fn ticker(&self) -> String {
        self.symbol.to_uppercase()
    }
}

/// Fiche détaillée d'une crypto
///
/// Les montants sont exprimés dans la devise d'affichage configurée
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinDetail {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub image: String,
    pub current_price: f64,
    pub price_change_percentage_24h: f64,
    pub market_cap: f64,
    pub total_volume: f64,
    pub circulating_supply: f64,
    /// None pour les coins sans plafond connu (ex: Ethereum)
    pub total_supply: Option<f64>,
    pub max_supply: Option<f64>,
    pub high_24h: f64,
    pub low_24h: f64,
}

impl CoinDetail {
    pub fn change(&self) -> PriceChange {
        format_change(self.price_change_percentage_24h)
    }

    pub fn ticker(&self) -> String {
        self.symbol.to_uppercase()
    }
}
