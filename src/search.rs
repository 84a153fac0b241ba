// ============================================================================
// Recherche avec debounce
// ============================================================================
// À chaque frappe, le timer en attente est annulé et un nouveau est armé.
// Quand l'utilisateur arrête de taper pendant `delay`, la requête part avec
// le texte courant.
//
// Course connue : une réponse lente d'une vieille requête peut arriver après
// une réponse plus récente. Chaque requête reçoit donc un numéro de séquence
// croissant, et les réponses plus anciennes que la dernière appliquée sont
// ignorées.
//
// CONCEPT : Instant passé en paramètre
// - Les fonctions reçoivent `now` au lieu d'appeler Instant::now()
// - L'event loop fournit l'heure réelle, les tests une heure simulée
// ============================================================================

use std::time::{Duration, Instant};

use tracing::debug;

use crate::models::SearchHit;

/// Longueur minimale (après trim) pour déclencher une requête
pub const MIN_QUERY_LEN: usize = 2;

/// Retourne le texte à chercher, None si trop court
pub fn accept_query(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_QUERY_LEN {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Timer de debounce
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    /// Texte en attente et échéance
    pending: Option<(String, Instant)>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Nouvelle frappe : annule l'échéance précédente et en arme une nouvelle
    pub fn input(&mut self, text: &str, now: Instant) {
        self.pending = Some((text.to_string(), now + self.delay));
    }

    /// Retourne le texte si l'échéance est passée (une seule fois)
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(text, _)| text),
            _ => None,
        }
    }

    /// Annule toute requête en attente
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Résultats de recherche protégés par numéro de séquence
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    /// Dernier numéro émis
    issued: u64,
    /// Numéro de la réponse actuellement affichée
    applied: u64,
    hits: Vec<SearchHit>,
}

impl SearchResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Émet un nouveau numéro pour une requête qui part
    pub fn begin(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Applique une réponse si elle est plus récente que celle affichée
    ///
    /// Les résultats remplacent entièrement les précédents
    /// Retourne false si la réponse est périmée (ignorée)
    pub fn apply(&mut self, seq: u64, hits: Vec<SearchHit>) -> bool {
        if seq <= self.applied {
            debug!(seq, applied = self.applied, "Discarding stale search response");
            return false;
        }
        self.applied = seq;
        self.hits = hits;
        true
    }

    /// Vide les résultats et invalide toutes les requêtes en vol
    pub fn clear(&mut self) {
        self.applied = self.issued;
        self.hits.clear();
    }

    pub fn hits(&self) -> &[SearchHit] {
        &self.hits
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Une requête émise n'a pas encore reçu de réponse applicable
    pub fn is_in_flight(&self) -> bool {
        self.issued > self.applied
    }
}

// ============================================================================
// Tests
// ============================================================================
