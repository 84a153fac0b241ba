// ============================================================================
// Gestion des événements
// ============================================================================
// Lit le clavier via crossterm et produit des Event pour l'event loop
//
// - Key : touche pressée (les Release sont ignorés)
// - Tick : aucun événement pendant tick_rate ; sert à faire avancer le
//   debounce de la recherche même quand l'utilisateur ne tape plus
//
// Les helpers is_*_event classifient les touches ; main.rs combine ces
// helpers avec l'écran courant pour décider de l'action.
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Intervalle entre deux ticks sans saisie
pub const DEFAULT_TICK_RATE: Duration = Duration::from_millis(100);

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Tick régulier (debounce, indicateur de chargement)
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Lit le prochain événement (bloquant au plus tick_rate)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - poll(timeout) attend au plus tick_rate
    /// - Si pas d'événement, retourne Ok(Event::Tick)
    pub fn next(&self) -> Result<Event> {
        if !event::poll(self.tick_rate)? {
            return Ok(Event::Tick);
        }

        match event::read()? {
            // Sur certains OS, on reçoit Press ET Release : on ne garde que Press
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
            // Resize, souris, Release : un tick suffit à redessiner
            _ => Ok(Event::Tick),
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_RATE)
    }
}

// ============================================================================
// Helpers : classification des touches
// ============================================================================
// CONCEPT RUST : Pattern matching avec if let + matches!
// ============================================================================

/// Vérifie si l'événement est la touche 'q' (quitter)
pub fn is_quit_event(event: &Event) -> bool {
    // CONCEPT RUST : Pattern matching avec if let
    // - Destructure Event::Key et vérifie le KeyCode en une ligne
    // - Plus élégant que match pour un seul cas
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
    } else {
        false
    }
}

/// Vérifie si l'événement est Échap
pub fn is_escape_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Esc)
    } else {
        false
    }
}

/// Vérifie si l'événement est Espace
pub fn is_space_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char(' '))
    } else {
        false
    }
}

/// Vérifie si l'événement est Entrée
pub fn is_enter_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Enter)
    } else {
        false
    }
}

/// Vérifie si l'événement est la flèche vers le haut ou 'k' (vim)
///
/// CONCEPT RUST : Multiple patterns avec |
/// - KeyCode::Up | KeyCode::Char('k') : match l'un ou l'autre
/// - Support des touches Vim pour les power users !
pub fn is_up_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K'))
    } else {
        false
    }
}

/// Vérifie si l'événement est la flèche vers le bas ou 'j' (vim)
pub fn is_down_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J'))
    } else {
        false
    }
}

/// Vérifie si l'événement est 'l' ou → (timeframe suivant)
pub fn is_next_timeframe_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('l') | KeyCode::Right)
    } else {
        false
    }
}

/// Vérifie si l'événement est 'h' ou ← (timeframe précédent)
pub fn is_previous_timeframe_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('h') | KeyCode::Left)
    } else {
        false
    }
}

/// Touches 1 à 4 : sélection directe du timeframe (index 0 à 3)
pub fn get_timeframe_index(event: &Event) -> Option<usize> {
    if let Event::Key(key) = event {
        if let KeyCode::Char(c @ '1'..='4') = key.code {
            return c.to_digit(10).map(|d| d as usize - 1);
        }
    }
    None
}

/// Vérifie si l'événement est Ctrl+C (quitter sans confirmation)
pub fn is_force_quit_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
    } else {
        false
    }
}

/// Vérifie si l'événement est Ctrl+V (afficher/masquer le mot de passe)
pub fn is_toggle_password_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        key.code == KeyCode::Char('v') && key.modifiers.contains(KeyModifiers::CONTROL)
    } else {
        false
    }
}

/// Vérifie si l'événement est Tab ou Shift+Tab
pub fn is_tab_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Tab | KeyCode::BackTab)
    } else {
        false
    }
}

/// Vérifie si l'événement est '/' (ouvrir la recherche)
pub fn is_search_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('/'))
    } else {
        false
    }
}

/// Vérifie si l'événement est 'f' ou '/' (filtre de la watchlist)
pub fn is_filter_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('f') | KeyCode::Char('/'))
    } else {
        false
    }
}

/// Vérifie si l'événement est 's' (ajouter/retirer de la watchlist)
pub fn is_star_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('s') | KeyCode::Char('S'))
    } else {
        false
    }
}

/// Vérifie si l'événement est 'm' (écran Markets)
pub fn is_markets_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('m') | KeyCode::Char('M'))
    } else {
        false
    }
}

/// Vérifie si l'événement est 'w' (écran Watchlist)
pub fn is_watchlist_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('w') | KeyCode::Char('W'))
    } else {
        false
    }
}

/// Vérifie si l'événement est 'L' majuscule (logout)
///
/// Majuscule uniquement : 'l' sert déjà au timeframe suivant
pub fn is_logout_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('L'))
    } else {
        false
    }
}

/// Vérifie si l'événement est 'r' (rafraîchir)
pub fn is_refresh_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('r') | KeyCode::Char('R'))
    } else {
        false
    }
}

/// Vérifie si l'événement est 'o' (critère de tri suivant)
pub fn is_sort_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('o') | KeyCode::Char('O'))
    } else {
        false
    }
}

/// Vérifie si l'événement est 'd' (inverser l'ordre de tri)
pub fn is_sort_order_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char('d') | KeyCode::Char('D'))
    } else {
        false
    }
}

/// Vérifie si l'événement est Backspace
pub fn is_backspace_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Backspace)
    } else {
        false
    }
}

/// Caractère imprimable sans Ctrl/Alt (saisie de texte)
pub fn get_text_char(event: &Event) -> Option<char> {
    if let Event::Key(key) = event {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return None;
        }
        if let KeyCode::Char(c) = key.code {
            if !c.is_control() {
                return Some(c);
            }
        }
    }
    None
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    fn ctrl(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    #[test]
    fn test_is_quit_event() {
        assert!(is_quit_event(&key(KeyCode::Char('q'))));
        assert!(!is_quit_event(&key(KeyCode::Char('a'))));
        assert!(!is_quit_event(&Event::Tick));
    }

    #[test]
    fn test_control_shortcuts() {
        assert!(is_force_quit_event(&ctrl('c')));
        assert!(!is_force_quit_event(&key(KeyCode::Char('c'))));
        assert!(is_toggle_password_event(&ctrl('v')));
        assert_eq!(get_text_char(&ctrl('v')), None);
        assert_eq!(get_text_char(&key(KeyCode::Char('v'))), Some('v'));
    }

    #[test]
    fn test_timeframe_keys() {
        assert_eq!(get_timeframe_index(&key(KeyCode::Char('1'))), Some(0));
        assert_eq!(get_timeframe_index(&key(KeyCode::Char('4'))), Some(3));
        assert_eq!(get_timeframe_index(&key(KeyCode::Char('5'))), None);
        assert!(is_next_timeframe_event(&key(KeyCode::Right)));
        assert!(is_previous_timeframe_event(&key(KeyCode::Char('h'))));
    }

    #[test]
    fn test_logout_is_uppercase_only() {
        assert!(is_logout_event(&key(KeyCode::Char('L'))));
        assert!(!is_logout_event(&key(KeyCode::Char('l'))));
    }
}
