// ============================================================================
// Fiche détail d'un coin
// ============================================================================
// - En-tête : nom, symbole, statut watchlist
// - Stats 24h : prix, variation, plus haut, plus bas, volume
// - Graphique du timeframe courant
// - Stats de marché : market cap, supply
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::format::{format_currency, format_market_cap, format_supply, PLACEHOLDER};
use crate::models::CoinDetail;
use crate::ui::chart::{render_price_chart, summary_line};
use crate::ui::dashboard::{create_layout, key_style, render_footer, render_header, trend_color};

pub fn render_detail(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());
    render_header(frame, app, chunks[0]);

    let content = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Nom + watchlist
            Constraint::Length(3), // Stats 24h
            Constraint::Min(8),    // Graphique
            Constraint::Length(1), // Résumé du graphique
            Constraint::Length(3), // Stats de marché
        ])
        .split(chunks[1]);

    match &app.detail {
        Some(detail) => {
            render_title(frame, app, detail, content[0]);
            render_stats(frame, app, detail, content[1]);
            render_market_stats(frame, app, detail, content[4]);
        }
        None => {
            let message = if app.is_loading_data() {
                "Loading coin details..."
            } else {
                "Coin details unavailable"
            };
            let paragraph = Paragraph::new(Span::styled(message, Style::default().fg(Color::Gray)))
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Center);
            frame.render_widget(paragraph, content[0]);
        }
    }

    render_price_chart(frame, &app.series, &app.currency, app.is_loading_data(), content[2]);
    frame.render_widget(
        Paragraph::new(summary_line(&app.series, &app.currency)).alignment(Alignment::Center),
        content[3],
    );

    let shortcuts = vec![
        Span::styled("[Esc]", key_style()),
        Span::raw(" Back  "),
        Span::styled("[h l / ← →]", key_style()),
        Span::raw(" Timeframe  "),
        Span::styled("[1-4]", key_style()),
        Span::raw(" 1D 7D 1M 1Y  "),
        Span::styled("[s]", key_style()),
        Span::raw(" Star  "),
        Span::styled("[r]", key_style()),
        Span::raw(" Refresh"),
    ];
    render_footer(frame, app, chunks[2], shortcuts);
}

fn render_title(frame: &mut Frame, app: &App, detail: &CoinDetail, area: Rect) {
    let watched = app.is_in_watchlist(&detail.id);
    let star = if watched {
        Span::styled("★ In watchlist", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    } else {
        Span::styled("☆ Not in watchlist", Style::default().fg(Color::Gray))
    };

    let line = Line::from(vec![
        Span::styled(
            detail.name.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(format!("({})", detail.ticker()), Style::default().fg(Color::Gray)),
        Span::raw("    "),
        star,
    ]);

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(paragraph, area);
}

/// Une case de statistique : titre dans la bordure, valeur au centre
fn stat_box(frame: &mut Frame, title: &str, value: Span, area: Rect) {
    let paragraph = Paragraph::new(Line::from(value))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" {} ", title)),
        )
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_stats(frame: &mut Frame, app: &App, detail: &CoinDetail, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 5); 5])
        .split(area);

    let change = detail.change();
    let bold = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);

    stat_box(
        frame,
        "Price",
        Span::styled(format_currency(detail.current_price, &app.currency, None), bold),
        columns[0],
    );
    stat_box(
        frame,
        "24h Change",
        Span::styled(change.display(), Style::default().fg(trend_color(change.trend))),
        columns[1],
    );
    stat_box(
        frame,
        "24h High",
        Span::raw(format_currency(detail.high_24h, &app.currency, None)),
        columns[2],
    );
    stat_box(
        frame,
        "24h Low",
        Span::raw(format_currency(detail.low_24h, &app.currency, None)),
        columns[3],
    );
    stat_box(
        frame,
        "24h Volume",
        Span::raw(format_market_cap(detail.total_volume, &app.currency)),
        columns[4],
    );
}

fn render_market_stats(frame: &mut Frame, app: &App, detail: &CoinDetail, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(area);

    let symbol = detail.ticker();
    let max_supply = detail
        .max_supply
        .map(|s| format_supply(s, &symbol))
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    stat_box(
        frame,
        "Market Cap",
        Span::raw(format_market_cap(detail.market_cap, &app.currency)),
        columns[0],
    );
    stat_box(
        frame,
        "Circulating Supply",
        Span::raw(format_supply(detail.circulating_supply, &symbol)),
        columns[1],
    );
    stat_box(frame, "Max Supply", Span::raw(max_supply), columns[2]);
}
