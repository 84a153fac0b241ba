// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod events;    // Gestion des événements clavier
pub mod dashboard; // Router + cadre commun + écran Markets
pub mod login;     // Formulaire de connexion
pub mod watchlist; // Écran Watchlist
pub mod detail;    // Fiche détail d'un coin
pub mod chart;     // Graphique ligne des prix

// Re-exports pour simplifier les imports
pub use dashboard::render;
pub use events::{Event, EventHandler};

// ============================================================================
// Tests de rendu
// ============================================================================
// CONCEPT RATATUI : TestBackend
// - Terminal en mémoire, pas besoin d'un vrai TTY
// - On vérifie que chaque écran se dessine et contient les textes clés
// ============================================================================

#[cfg(test)]
mod tests {
    use ratatui::{backend::TestBackend, Terminal};

    use super::render;
    use crate::app::App;
    use crate::models::{ChartTimeframe, Coin, CoinDetail, PriceSeries, SearchHit};
    use crate::routes::Route;
    use crate::store::AuthAction;
    use crate::worker::AppResult;

    fn draw(app: &App) -> String {
        let backend = TestBackend::new(140, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn bitcoin() -> Coin {
        Coin {
            id: "bitcoin".into(),
            name: "Bitcoin".into(),
            symbol: "btc".into(),
            image: String::new(),
            current_price: 45234.56,
            market_cap: 885_000_000_000.0,
            total_volume: 28_000_000_000.0,
            market_cap_rank: Some(1),
            price_change_percentage_24h: Some(2.45),
        }
    }

    fn token(i: usize) -> Coin {
        Coin {
            id: format!("token-{:02}", i),
            name: format!("Token{:02}", i),
            symbol: format!("t{:02}", i),
            market_cap_rank: Some(i as u32 + 1),
            ..bitcoin()
        }
    }

    fn authenticated_app() -> App {
        let mut app = App::default();
        app.state.dispatch(AuthAction::Login);
        app
    }

    #[test]
    fn test_render_login() {
        let mut app = App::default();
        app.login.error = Some("Invalid email or password".into());
        let screen = draw(&app);
        assert!(screen.contains("Email"));
        assert!(screen.contains("Invalid email or password"));
    }

    #[test]
    fn test_render_dashboard_table() {
        let mut app = authenticated_app();
        app.navigate(Route::Dashboard);
        app.apply_result(AppResult::MarketsLoaded(vec![bitcoin()]));
        let screen = draw(&app);
        assert!(screen.contains("Bitcoin"));
        assert!(screen.contains("$45,234.56"));
        assert!(screen.contains("$885.00B"));
    }

    #[test]
    fn test_render_empty_watchlist() {
        let mut app = authenticated_app();
        app.navigate(Route::Watchlist);
        let screen = draw(&app);
        assert!(screen.contains("Your watchlist is empty"));
    }

    #[test]
    fn test_render_detail_with_chart() {
        let mut app = authenticated_app();
        app.navigate(Route::CoinDetail("bitcoin".into()));
        app.apply_result(AppResult::CoinDetailLoaded(CoinDetail {
            id: "bitcoin".into(),
            name: "Bitcoin".into(),
            symbol: "btc".into(),
            image: String::new(),
            current_price: 45234.56,
            price_change_percentage_24h: -1.5,
            market_cap: 885_000_000_000.0,
            total_volume: 28_000_000_000.0,
            circulating_supply: 19_500_000.0,
            total_supply: Some(21_000_000.0),
            max_supply: Some(21_000_000.0),
            high_24h: 46000.0,
            low_24h: 44000.0,
        }));
        app.apply_result(AppResult::ChartLoaded(PriceSeries::from_prices(
            "bitcoin",
            ChartTimeframe::OneDay,
            &[(1_705_327_500_000.0, 45000.0), (1_705_331_100_000.0, 45500.0)],
        )));

        let screen = draw(&app);
        assert!(screen.contains("Bitcoin"));
        assert!(screen.contains("19,500,000 BTC"));
        assert!(screen.contains("1D"));
    }

    #[test]
    fn test_dashboard_scrolls_to_selected_row() {
        let mut app = authenticated_app();
        app.navigate(Route::Dashboard);
        app.apply_result(AppResult::MarketsLoaded((0..50).map(token).collect()));
        for _ in 0..45 {
            app.navigate_down();
        }
        assert_eq!(app.selected_index, 45);

        let screen = draw(&app);
        assert!(screen.contains("Token45"));
        assert!(!screen.contains("Token00"));
    }

    #[test]
    fn test_watchlist_scrolls_to_selected_row() {
        let mut app = authenticated_app();
        for i in 0..50 {
            app.toggle_watchlist(&format!("token-{:02}", i));
        }
        app.navigate(Route::Watchlist);
        app.apply_result(AppResult::WatchlistLoaded((0..50).map(token).collect()));
        for _ in 0..45 {
            app.navigate_down();
        }

        let screen = draw(&app);
        assert!(screen.contains("Token45"));
        assert!(!screen.contains("Token00"));
    }

    #[test]
    fn test_search_overlay_scrolls_to_selected_hit() {
        let mut app = authenticated_app();
        app.navigate(Route::Dashboard);
        app.start_search();
        let seq = app.search.begin();
        let hits = (0..50)
            .map(|i| SearchHit {
                id: format!("hit-{:02}", i),
                name: format!("Hit{:02}", i),
                api_symbol: format!("hit-{:02}", i),
                symbol: format!("h{:02}", i),
                market_cap_rank: None,
                thumb: String::new(),
                large: String::new(),
            })
            .collect();
        app.apply_result(AppResult::SearchCompleted { seq, hits });
        for _ in 0..45 {
            app.navigate_down();
        }
        assert_eq!(app.search_selected, 45);

        let screen = draw(&app);
        assert!(screen.contains("Hit45"));
        assert!(!screen.contains("Hit00"));
    }

    #[test]
    fn test_watchlist_shows_coin_without_market_row() {
        let mut app = authenticated_app();
        app.apply_result(AppResult::MarketsLoaded(vec![bitcoin()]));
        app.toggle_watchlist("pepe");
        app.navigate(Route::Watchlist);

        let screen = draw(&app);
        assert!(screen.contains("Watchlist (1)"));
        assert!(screen.contains("pepe"));
        assert!(screen.contains("--"));
        assert!(!screen.contains("No coins match your filter"));

        app.watchlist_filter = "zzz".into();
        let screen = draw(&app);
        assert!(screen.contains("No coins match your filter"));
    }
}
