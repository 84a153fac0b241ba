// ============================================================================
// Module : models
// ============================================================================
// Structures de données venant de l'API de marché
// ============================================================================

pub mod coin;   // Coin (liste des marchés) et CoinDetail (fiche)
pub mod market; // Statistiques globales et résultats de recherche
pub mod chart;  // Série de prix historique

// Re-export des structures principales pour simplifier les imports
pub use chart::{ChartPoint, ChartTimeframe, PriceSeries};
pub use coin::{Coin, CoinDetail};
pub use market::{GlobalStats, SearchHit};
