// ============================================================================
// Module : store
// ============================================================================
// État applicatif explicite, sérialisable, passé par référence
//
// CONCEPTS :
// 1. Deux slices indépendantes : auth et watchlist
// 2. Reducers purs : (état, action) -> nouvel état
// 3. Pas de singleton global : App possède un AppState
// ============================================================================

pub mod auth;
pub mod watchlist;

use serde::{Deserialize, Serialize};

pub use auth::{AuthAction, AuthState};
pub use watchlist::{WatchlistAction, WatchlistState};

/// Message court affiché dans la barre de statut après une action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub is_error: bool,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }
}

/// Toutes les actions du store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Auth(AuthAction),
    Watchlist(WatchlistAction),
}

impl From<AuthAction> for Action {
    fn from(action: AuthAction) -> Self {
        Action::Auth(action)
    }
}

impl From<WatchlistAction> for Action {
    fn from(action: WatchlistAction) -> Self {
        Action::Watchlist(action)
    }
}

/// État global de la session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub auth: AuthState,
    pub watchlist: WatchlistState,
}

impl AppState {
    /// Applique une action à la slice concernée
    ///
    /// CONCEPT RUST : std::mem::take
    /// - Sort la slice de self (laisse Default à la place)
    /// - La passe par valeur au reducer, puis remet le résultat
    pub fn dispatch(&mut self, action: impl Into<Action>) -> Option<Notice> {
        match action.into() {
            Action::Auth(action) => {
                let (auth, notice) = auth::reduce(self.auth, action);
                self.auth = auth;
                Some(notice)
            }
            Action::Watchlist(action) => {
                let current = std::mem::take(&mut self.watchlist);
                let (watchlist, notice) = watchlist::reduce(current, action);
                self.watchlist = watchlist;
                notice
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_routes_to_slices() {
        let mut state = AppState::default();
        assert!(!state.is_authenticated());

        state.dispatch(AuthAction::Login);
        assert!(state.is_authenticated());

        state.dispatch(WatchlistAction::Toggle("bitcoin".to_string()));
        assert!(state.watchlist.contains("bitcoin"));
        // La slice auth n'est pas touchée par une action watchlist
        assert!(state.is_authenticated());
    }

    #[test]
    fn test_state_roundtrips_through_json() {
        let mut state = AppState::default();
        state.dispatch(AuthAction::Login);
        state.dispatch(WatchlistAction::Set(vec!["bitcoin".into(), "solana".into()]));

        let json = serde_json::to_string(&state).unwrap();
        let restored: AppState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
    }
}
