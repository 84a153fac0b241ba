// ============================================================================
// CoinWatch - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;     // Client HTTP + endpoints de marché
pub mod app;     // État de l'application TUI
pub mod config;  // Configuration (env + .env)
pub mod error;   // Erreurs typées
pub mod format;  // Formatage des montants et pourcentages
pub mod models;  // Structures de données
pub mod routes;  // Routes et gardes d'authentification
pub mod search;  // Debounce + séquençage de la recherche
pub mod store;   // AppState, reducers auth et watchlist
pub mod ui;      // Interface utilisateur
pub mod worker;  // Worker thread des appels réseau
