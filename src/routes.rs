// ============================================================================
// Routes de l'application
// ============================================================================
// Chaque écran correspond à un chemin :
// - /            : login (public)
// - /dashboard   : liste des marchés (protégé)
// - /watchlist   : watchlist (protégé)
// - /coin/{id}   : fiche détail (protégé)
//
// Toute navigation passe par resolve() qui applique les gardes :
// - Non authentifié sur une route protégée -> login
// - Authentifié sur le login -> dashboard
// ============================================================================

use std::fmt;

/// Écrans de l'application
///
/// CONCEPT RUST : Enum pour state machine
/// - Un seul écran actif à la fois
/// - CoinDetail porte l'identifiant du coin affiché
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    Watchlist,
    CoinDetail(String),
}

impl Route {
    /// Chemin de la route
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Watchlist => "/watchlist".to_string(),
            Route::CoinDetail(id) => format!("/coin/{}", id),
        }
    }

    /// Parse un chemin, None si inconnu
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim();
        match trimmed {
            "" | "/" => Some(Route::Login),
            "/dashboard" => Some(Route::Dashboard),
            "/watchlist" => Some(Route::Watchlist),
            _ => {
                let id = trimmed.strip_prefix("/coin/")?;
                if id.is_empty() || id.contains('/') {
                    None
                } else {
                    Some(Route::CoinDetail(id.to_string()))
                }
            }
        }
    }

    /// True pour toutes les routes sauf le login
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Applique les gardes de navigation
pub fn resolve(route: Route, authenticated: bool) -> Route {
    match (authenticated, route) {
        (false, route) if route.is_protected() => Route::Login,
        (true, Route::Login) => Route::Dashboard,
        (_, route) => route,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_route_redirects_to_login() {
        assert_eq!(resolve(Route::Dashboard, false), Route::Login);
        assert_eq!(resolve(Route::Watchlist, false), Route::Login);
        assert_eq!(resolve(Route::CoinDetail("bitcoin".into()), false), Route::Login);
    }

    #[test]
    fn test_login_redirects_when_authenticated() {
        assert_eq!(resolve(Route::Login, true), Route::Dashboard);
    }

    #[test]
    fn test_allowed_routes_unchanged() {
        assert_eq!(resolve(Route::Login, false), Route::Login);
        assert_eq!(resolve(Route::Dashboard, true), Route::Dashboard);
        assert_eq!(
            resolve(Route::CoinDetail("ethereum".into()), true),
            Route::CoinDetail("ethereum".into())
        );
    }

    #[test]
    fn test_path_round_trip() {
        for route in [
            Route::Login,
            Route::Dashboard,
            Route::Watchlist,
            Route::CoinDetail("bitcoin".into()),
        ] {
            assert_eq!(Route::from_path(&route.path()), Some(route));
        }
        assert_eq!(Route::from_path("/coin/"), None);
        assert_eq!(Route::from_path("/portfolio"), None);
    }
}
