// ============================================================================
// Erreurs typées de la librairie
// ============================================================================
// Le binaire travaille avec anyhow::Result, mais la librairie expose des
// erreurs typées pour que les appelants puissent réagir au cas par cas
// (placeholder vide, message inline, etc.)
//
// CONCEPT RUST : thiserror
// - #[derive(Error)] génère l'implémentation de std::error::Error
// - #[error("...")] génère Display
// - #[from] génère From<T> pour l'opérateur ?
// ============================================================================

use thiserror::Error;

/// Erreurs du client HTTP vers l'API de marché
#[derive(Error, Debug)]
pub enum ApiError {
    /// Échec réseau : connexion refusée, timeout, DNS...
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Réponse HTTP hors 2xx
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Corps de réponse qui ne correspond pas au type attendu
    #[error("Malformed payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// Réponse 2xx mais sans contenu exploitable
    #[error("Empty payload from {0}")]
    EmptyPayload(String),
}

impl ApiError {
    /// Code HTTP si l'erreur vient d'une réponse du serveur
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Erreurs de lecture de la configuration
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Échec de connexion affiché sous le formulaire de login
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    #[error("Please enter both email and password")]
    MissingFields,

    #[error("Invalid email or password")]
    InvalidCredentials,
}
