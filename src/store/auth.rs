// ============================================================================
// Slice : authentification
// ============================================================================
// Un simple booléen : true après un login réussi, false après logout
// Pas de token, pas d'expiration, pas de persistance
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::config::Credentials;
use crate::error::LoginError;
use crate::store::Notice;

/// État d'authentification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    pub is_authenticated: bool,
}

/// Transitions possibles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    Login,
    Logout,
}

/// Reducer pur : (état, action) -> (nouvel état, notification)
pub fn reduce(_state: AuthState, action: AuthAction) -> (AuthState, Notice) {
    match action {
        AuthAction::Login => (
            AuthState { is_authenticated: true },
            Notice::success("Logged in successfully!"),
        ),
        AuthAction::Logout => (
            AuthState { is_authenticated: false },
            Notice::success("Logged out successfully!"),
        ),
    }
}

/// Compare les identifiants saisis aux identifiants configurés
///
/// Comparaison stricte de chaînes, sans trim du mot de passe
/// Un champ vide (après trim) est refusé avant la comparaison
pub fn check_credentials(
    email: &str,
    password: &str,
    expected: &Credentials,
) -> Result<(), LoginError> {
    if email.trim().is_empty() || password.trim().is_empty() {
        return Err(LoginError::MissingFields);
    }
    if email.trim() == expected.email && password == expected.password {
        Ok(())
    } else {
        Err(LoginError::InvalidCredentials)
    }
}
