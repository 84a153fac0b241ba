// ============================================================================
// Slice : watchlist
// ============================================================================
// Liste ordonnée d'identifiants de coins choisis par l'utilisateur
//
// Deux transitions seulement :
// - Toggle(id) : retire l'id s'il est présent, sinon l'ajoute à la fin
// - Set(ids)   : remplace toute la liste
//
// Toggle garantit l'unicité : pas besoin de déduplication ailleurs
// ============================================================================

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::Coin;
use crate::store::Notice;

/// État de la watchlist (ordre d'insertion)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistState {
    pub ids: Vec<String>,
}

impl WatchlistState {
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Transitions de la watchlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchlistAction {
    Toggle(String),
    Set(Vec<String>),
}

/// Reducer pur
///
/// CONCEPT RUST : ownership
/// - L'état est pris par valeur et rendu modifié
/// - Pas de mutation partagée, pas de singleton global
pub fn reduce(mut state: WatchlistState, action: WatchlistAction) -> (WatchlistState, Option<Notice>) {
    match action {
        WatchlistAction::Toggle(id) => {
            if state.contains(&id) {
                state.ids.retain(|existing| existing != &id);
                (state, Some(Notice::success("Removed from watchlist!")))
            } else {
                state.ids.push(id);
                (state, Some(Notice::success("Added to watchlist!")))
            }
        }
        WatchlistAction::Set(ids) => (WatchlistState { ids }, None),
    }
}

// ============================================================================
// Vue filtrée et triée de la watchlist
// ============================================================================

/// Critère de tri de l'écran watchlist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    Name,
    Price,
    Change,
}

impl SortBy {
    pub fn label(&self) -> &'static str {
        match self {
            SortBy::Name => "Name",
            SortBy::Price => "Price",
            SortBy::Change => "24h Change",
        }
    }

    /// Critère suivant (cycle Name -> Price -> Change)
    pub fn next(&self) -> SortBy {
        match self {
            SortBy::Name => SortBy::Price,
            SortBy::Price => SortBy::Change,
            SortBy::Change => SortBy::Name,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggle(&self) -> SortOrder {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortOrder::Asc => "↑",
            SortOrder::Desc => "↓",
        }
    }
}

/// Une ligne de l'écran watchlist
///
/// CONCEPT RUST : Enum avec références
/// - Market : le coin a une ligne de marché chargée
/// - Pending : id suivi sans données (pas encore chargé ou inconnu de l'API)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WatchlistRow<'a> {
    Market(&'a Coin),
    Pending(&'a str),
}

impl<'a> WatchlistRow<'a> {
    pub fn id(&self) -> &'a str {
        match *self {
            WatchlistRow::Market(coin) => &coin.id,
            WatchlistRow::Pending(id) => id,
        }
    }

    /// Nom affiché : l'id tant que le coin n'est pas chargé
    pub fn name(&self) -> &'a str {
        match *self {
            WatchlistRow::Market(coin) => &coin.name,
            WatchlistRow::Pending(id) => id,
        }
    }

    pub fn coin(&self) -> Option<&'a Coin> {
        match *self {
            WatchlistRow::Market(coin) => Some(coin),
            WatchlistRow::Pending(_) => None,
        }
    }

    fn matches(&self, filter: &str) -> bool {
        match *self {
            WatchlistRow::Market(coin) => coin.matches(filter),
            WatchlistRow::Pending(id) => {
                let filter = filter.trim().to_lowercase();
                filter.is_empty() || id.to_lowercase().contains(&filter)
            }
        }
    }

    fn sort_value(&self, sort_by: SortBy) -> Option<f64> {
        let coin = self.coin()?;
        match sort_by {
            SortBy::Name => None,
            SortBy::Price => Some(coin.current_price),
            SortBy::Change => Some(coin.change_percent()),
        }
    }
}

/// Construit les lignes de la watchlist, filtrées par texte puis triées
///
/// Chaque id suivi donne exactement une ligne : d'abord cherché dans
/// `primary` (coins chargés pour la watchlist), puis dans `fallback`
/// (dernière liste des marchés), sinon ligne Pending.
/// Pour les tris numériques, les lignes sans données restent en fin de liste.
pub fn select_rows<'a>(
    primary: &'a [Coin],
    fallback: &'a [Coin],
    state: &'a WatchlistState,
    filter: &str,
    sort_by: SortBy,
    order: SortOrder,
) -> Vec<WatchlistRow<'a>> {
    let find = |id: &str| {
        primary
            .iter()
            .chain(fallback.iter())
            .find(|coin| coin.id == id)
    };

    let mut rows: Vec<WatchlistRow<'a>> = state
        .ids
        .iter()
        .map(|id| match find(id.as_str()) {
            Some(coin) => WatchlistRow::Market(coin),
            None => WatchlistRow::Pending(id.as_str()),
        })
        .filter(|row| row.matches(filter))
        .collect();

    let directed = |ordering: Ordering| match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    };

    rows.sort_by(|a, b| match sort_by {
        SortBy::Name => directed(a.name().to_lowercase().cmp(&b.name().to_lowercase())),
        _ => match (a.sort_value(sort_by), b.sort_value(sort_by)) {
            (Some(x), Some(y)) => directed(x.partial_cmp(&y).unwrap_or(Ordering::Equal)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    });

    rows
}
