// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine l'interface TUI en utilisant les widgets de ratatui
//
// Tous les écrans authentifiés partagent le même cadre :
// - Header : nom de l'app, navigation Markets/Watchlist, recherche, logout
// - Contenu : propre à chaque écran
// - Footer : raccourcis, notification, indicateur de chargement
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Widgets : composants UI (Block, Paragraph, Table, etc.)
// 3. Layout : découpage de l'espace en zones
// 4. Style : couleurs et attributs de texte
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, InputMode};
use crate::format::{format_crypto_price, format_market_cap, Trend};
use crate::routes::Route;
use crate::ui::{detail, login, watchlist};

// ============================================================================
// Fonction principale de rendu
// ============================================================================

/// Dessine l'interface complète
///
/// CONCEPT RUST : Routing avec match sur enum
/// - Pattern "State Machine" : un écran par route
/// - Le compilateur force à gérer tous les variants
pub fn render(frame: &mut Frame, app: &App) {
    match &app.route {
        Route::Login => login::render_login(frame, app),
        Route::Dashboard => render_dashboard(frame, app),
        Route::Watchlist => watchlist::render_watchlist(frame, app),
        Route::CoinDetail(_) => detail::render_detail(frame, app),
    }
}

/// Dessine le dashboard (stats globales + table des marchés)
fn render_dashboard(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);

    let content = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(chunks[1]);

    render_global_stats(frame, app, content[0]);
    render_coin_table(frame, app, content[1]);

    // La recherche s'affiche par-dessus la table
    if app.is_searching() && !app.search.is_empty() {
        render_search_results(frame, app, content[1]);
    }

    render_footer(frame, app, chunks[2], dashboard_shortcuts(app));
}

// ============================================================================
// Layout : Découpage de l'écran
// ============================================================================

/// Crée le layout principal (header, content, footer)
pub(crate) fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header : 3 lignes
            Constraint::Min(0),    // Content : tout le reste
            Constraint::Length(3), // Footer : 3 lignes
        ])
        .split(area)
        .to_vec()
}

/// Vert pour une hausse, rouge pour une baisse
pub(crate) fn trend_color(trend: Trend) -> Color {
    match trend {
        Trend::Up => Color::Green,
        Trend::Down => Color::Red,
    }
}

pub(crate) fn key_style() -> Style {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

// ============================================================================
// Header
// ============================================================================

/// Header commun : titre, navigation, barre de recherche, logout
pub(crate) fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" CoinWatch ")
        .title_alignment(Alignment::Left);

    let tab = |label: &'static str, active: bool| {
        if active {
            Span::styled(
                label,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            )
        } else {
            Span::styled(label, Style::default().fg(Color::Gray))
        }
    };

    let search_style = if app.input_mode == InputMode::Search {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let search_text = if app.search_input.is_empty() && app.input_mode != InputMode::Search {
        "Search coins...".to_string()
    } else {
        app.search_input.clone()
    };

    let mut spans = vec![
        tab("[m] Markets", app.route == Route::Dashboard),
        Span::raw("   "),
        tab("[w] Watchlist", app.route == Route::Watchlist),
        Span::raw("   │  "),
        Span::styled("🔍 ", search_style),
        Span::styled(search_text, search_style),
    ];
    if app.input_mode == InputMode::Search {
        spans.push(Span::styled("█", Style::default().add_modifier(Modifier::SLOW_BLINK)));
    }
    spans.push(Span::raw("   │  "));
    spans.push(Span::styled("[L]", key_style()));
    spans.push(Span::raw(" Logout"));

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Stats globales
// ============================================================================

fn render_global_stats(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let stats = [
        ("Total Market Cap", app.global.market_cap_label(&app.currency)),
        ("24h Volume", app.global.volume_label(&app.currency)),
        ("BTC Dominance", app.global.dominance_label()),
    ];

    for ((title, value), column) in stats.into_iter().zip(columns.iter()) {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            value,
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" {} ", title)),
        )
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, *column);
    }
}

// ============================================================================
// Table des marchés
// ============================================================================

/// Table des coins : rang, nom, symbole, prix, variation, market cap, volume, étoile
///
/// CONCEPT RATATUI : Table widget + TableState
/// - Row : une ligne de cellules
/// - widths : contraintes par colonne
/// - TableState porte la sélection : ratatui fait défiler la table pour
///   garder la ligne sélectionnée visible
fn render_coin_table(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 📊 Cryptocurrency Prices ");

    if app.coins.is_empty() {
        let message = if app.is_loading_data() {
            "Loading markets..."
        } else {
            "No market data available"
        };
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(message, Style::default().fg(Color::Gray))),
        ])
        .block(block)
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec!["#", "Name", "Symbol", "Price", "24h %", "Market Cap", "Volume", "★"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = app
        .coins
        .iter()
        .map(|coin| {
            let change = coin.change();
            let star = if app.is_in_watchlist(&coin.id) { "★" } else { "☆" };
            let rank = coin
                .market_cap_rank
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string());

            Row::new(vec![
                Cell::from(rank),
                Cell::from(coin.name.clone()),
                Cell::from(coin.ticker()),
                Cell::from(format_crypto_price(coin.current_price, &app.currency)),
                Cell::from(change.display()).style(Style::default().fg(trend_color(change.trend))),
                Cell::from(format_market_cap(coin.market_cap, &app.currency)),
                Cell::from(format_market_cap(coin.total_volume, &app.currency)),
                Cell::from(star).style(Style::default().fg(Color::Yellow)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Min(14),
        Constraint::Length(7),
        Constraint::Length(16),
        Constraint::Length(11),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(2),
    ];

    // Pas de surlignage pendant la saisie de recherche
    let selected = (app.input_mode == InputMode::Normal).then_some(app.selected_index);
    let mut state = TableState::default().with_selected(selected);

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));
    frame.render_stateful_widget(table, area, &mut state);
}

// ============================================================================
// Résultats de recherche
// ============================================================================

/// Liste flottante sous la barre de recherche
///
/// CONCEPT RATATUI : Clear
/// - Efface la zone avant de dessiner par-dessus
fn render_search_results(frame: &mut Frame, app: &App, area: Rect) {
    let height = (app.search.hits().len() as u16 + 2).min(area.height);
    let popup = Rect {
        x: area.x + area.width / 4,
        y: area.y,
        width: area.width / 2,
        height,
    };

    let items: Vec<ListItem> = app
        .search
        .hits()
        .iter()
        .map(|hit| ListItem::new(hit.display()))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green))
                .title(" Search results "),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));
    let mut state = ListState::default().with_selected(Some(app.search_selected));

    frame.render_widget(Clear, popup);
    frame.render_stateful_widget(list, popup, &mut state);
}

// ============================================================================
// Footer
// ============================================================================

fn dashboard_shortcuts(app: &App) -> Vec<Span<'static>> {
    if app.is_searching() {
        vec![
            Span::styled("[↑↓]", key_style()),
            Span::raw(" Select  "),
            Span::styled("[Enter]", key_style()),
            Span::raw(" Open  "),
            Span::styled("[Esc]", key_style()),
            Span::raw(" Close search"),
        ]
    } else {
        vec![
            Span::styled("[q]", key_style()),
            Span::raw(" Quit  "),
            Span::styled("[↑↓ / j k]", key_style()),
            Span::raw(" Navigate  "),
            Span::styled("[Enter]", key_style()),
            Span::raw(" Details  "),
            Span::styled("[/]", key_style()),
            Span::raw(" Search  "),
            Span::styled("[s]", key_style()),
            Span::raw(" Star  "),
            Span::styled("[r]", key_style()),
            Span::raw(" Refresh"),
        ]
    }
}

/// Footer commun : confirmation de quit, notification ou raccourcis
pub(crate) fn render_footer(frame: &mut Frame, app: &App, area: Rect, shortcuts: Vec<Span<'static>>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let line = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled(
                "⚠  Press ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " again to quit, any other key to cancel ⚠",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        let mut spans = shortcuts;
        if let Some(message) = &app.loading_message {
            spans.push(Span::raw("  │  "));
            spans.push(Span::styled(format!("⏳ {}", message), Style::default().fg(Color::Cyan)));
        } else if let Some(notice) = &app.notice {
            let color = if notice.is_error { Color::Red } else { Color::Green };
            spans.push(Span::raw("  │  "));
            spans.push(Span::styled(notice.message.clone(), Style::default().fg(color)));
        }
        Line::from(spans)
    };

    let paragraph = Paragraph::new(line).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
