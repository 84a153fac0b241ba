// ============================================================================
// Structures : ChartTimeframe, ChartPoint, PriceSeries
// ============================================================================
// Série de prix historique d'une crypto pour le graphique de la fiche détail
//
// CONCEPTS :
// 1. Timeframe : fenêtre en jours demandée à l'API (1, 7, 30, 365)
// 2. ChartPoint : un couple (timestamp, prix) + la date ISO dérivée
// 3. PriceSeries : les points + les valeurs dérivées (variation, bornes Y)
//
// Les points sont recalculés à chaque changement de coin ou de timeframe,
// jamais persistés.
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fenêtre de temps du graphique (boutons 1D / 7D / 1M / 1Y)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChartTimeframe {
    /// 1 jour (points toutes les ~5 minutes)
    #[default]
    OneDay,
    /// 7 jours (points horaires)
    SevenDays,
    /// 30 jours
    OneMonth,
    /// 365 jours (points journaliers)
    OneYear,
}

impl ChartTimeframe {
    /// Valeur du paramètre `days` de l'API
    pub fn days(&self) -> u32 {
        match self {
            ChartTimeframe::OneDay => 1,
            ChartTimeframe::SevenDays => 7,
            ChartTimeframe::OneMonth => 30,
            ChartTimeframe::OneYear => 365,
        }
    }

    /// Label du bouton
    pub fn label(&self) -> &'static str {
        match self {
            ChartTimeframe::OneDay => "1D",
            ChartTimeframe::SevenDays => "7D",
            ChartTimeframe::OneMonth => "1M",
            ChartTimeframe::OneYear => "1Y",
        }
    }

    /// Tous les timeframes dans l'ordre des boutons
    pub fn all() -> [ChartTimeframe; 4] {
        [
            ChartTimeframe::OneDay,
            ChartTimeframe::SevenDays,
            ChartTimeframe::OneMonth,
            ChartTimeframe::OneYear,
        ]
    }

    /// Timeframe suivant (cycle)
    pub fn next(&self) -> ChartTimeframe {
        match self {
            ChartTimeframe::OneDay => ChartTimeframe::SevenDays,
            ChartTimeframe::SevenDays => ChartTimeframe::OneMonth,
            ChartTimeframe::OneMonth => ChartTimeframe::OneYear,
            ChartTimeframe::OneYear => ChartTimeframe::OneDay, // Boucle
        }
    }

    /// Timeframe précédent (cycle)
    pub fn previous(&self) -> ChartTimeframe {
        match self {
            ChartTimeframe::OneDay => ChartTimeframe::OneYear, // Boucle
            ChartTimeframe::SevenDays => ChartTimeframe::OneDay,
            ChartTimeframe::OneMonth => ChartTimeframe::SevenDays,
            ChartTimeframe::OneYear => ChartTimeframe::OneMonth,
        }
    }

    /// Vue intraday : les labels montrent l'heure plutôt que la date
    pub fn is_intraday(&self) -> bool {
        matches!(self, ChartTimeframe::OneDay)
    }

    /// Format de l'axe X
    /// - 1D : "14:05"
    /// - autres : "Jan 5"
    pub fn axis_format(&self) -> &'static str {
        if self.is_intraday() {
            "%H:%M"
        } else {
            "%b %-d"
        }
    }

    /// Format du label détaillé (point survolé / dernier point)
    /// - 1D : "Jan 5, 14:05"
    /// - autres : "Mon, Jan 5"
    pub fn tooltip_format(&self) -> &'static str {
        if self.is_intraday() {
            "%b %-d, %H:%M"
        } else {
            "%a, %b %-d"
        }
    }
}

/// Un point du graphique
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub timestamp: DateTime<Utc>,
    /// Date ISO "YYYY-MM-DD"
    pub date: String,
    pub price: f64,
}

impl ChartPoint {
    /// Construit un point depuis un couple [timestamp_ms, prix] de l'API
    ///
    /// None si le timestamp est hors de la plage représentable
    pub fn from_pair(timestamp_ms: f64, price: f64) -> Option<Self> {
        let timestamp = DateTime::from_timestamp_millis(timestamp_ms as i64)?;
        Some(Self {
            date: timestamp.format("%Y-%m-%d").to_string(),
            timestamp,
            price,
        })
    }
}

/// Série de prix pour un coin et un timeframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub coin_id: String,
    pub timeframe: ChartTimeframe,
    /// Points triés par timestamp croissant (ordre de l'API)
    pub points: Vec<ChartPoint>,
}

impl PriceSeries {
    /// Série vide (placeholder en cas d'erreur)
    pub fn empty(coin_id: &str, timeframe: ChartTimeframe) -> Self {
        Self {
            coin_id: coin_id.to_string(),
            timeframe,
            points: Vec::new(),
        }
    }

    /// Construit la série depuis les couples bruts de l'API
    pub fn from_prices(coin_id: &str, timeframe: ChartTimeframe, prices: &[(f64, f64)]) -> Self {
        let points = prices
            .iter()
            .filter_map(|&(ts, price)| ChartPoint::from_pair(ts, price))
            .collect();

        Self {
            coin_id: coin_id.to_string(),
            timeframe,
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Dernier prix de la série, 0 si vide
    pub fn current_price(&self) -> f64 {
        self.points.last().map(|p| p.price).unwrap_or(0.0)
    }

    /// Premier prix de la série, 0 si vide
    pub fn first_price(&self) -> f64 {
        self.points.first().map(|p| p.price).unwrap_or(0.0)
    }

    /// Variation absolue sur la fenêtre
    pub fn price_change(&self) -> f64 {
        self.current_price() - self.first_price()
    }

    /// Variation en pourcentage, 0 si le premier prix est nul
    pub fn price_change_percent(&self) -> f64 {
        let first = self.first_price();
        if first == 0.0 {
            0.0
        } else {
            (self.price_change() / first) * 100.0
        }
    }

    /// Couleur du graphique : vert si la variation est >= 0
    pub fn is_positive(&self) -> bool {
        self.price_change() >= 0.0
    }

    /// Variation de moins de 1% (affichage atténué)
    pub fn is_small_change(&self) -> bool {
        self.price_change_percent().abs() < 1.0
    }

    /// Bornes de l'axe Y : min * 0.995 et max * 1.005
    ///
    /// CONCEPT RUST : fold pour min/max en un seul passage
    pub fn y_bounds(&self) -> Option<(f64, f64)> {
        if self.points.is_empty() {
            return None;
        }
        let (min, max) = self
            .points
            .iter()
            .fold((f64::MAX, f64::MIN), |(min, max), p| (min.min(p.price), max.max(p.price)));
        Some((min * 0.995, max * 1.005))
    }

    /// Label de l'axe X pour un point
    pub fn axis_label(&self, point: &ChartPoint) -> String {
        point.timestamp.format(self.timeframe.axis_format()).to_string()
    }

    /// Label détaillé pour un point
    pub fn tooltip_label(&self, point: &ChartPoint) -> String {
        point.timestamp.format(self.timeframe.tooltip_format()).to_string()
    }

    /// Points (x = index, y = prix) pour le widget Chart de ratatui
    pub fn plot_points(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, p.price))
            .collect()
    }

    /// Labels de l'axe X répartis uniformément (premier, milieu(x), dernier)
    pub fn axis_labels(&self, count: usize) -> Vec<String> {
        if self.points.is_empty() || count == 0 {
            return Vec::new();
        }
        if count == 1 || self.points.len() == 1 {
            return vec![self.axis_label(&self.points[0])];
        }
        let last = self.points.len() - 1;
        (0..count)
            .map(|i| {
                let index = i * last / (count - 1);
                self.axis_label(&self.points[index])
            })
            .collect()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
