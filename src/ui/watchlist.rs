// ============================================================================
// Écran Watchlist
// ============================================================================
// Coins suivis, filtrés par texte et triés (nom / prix / variation 24h)
//
// Un id suivi dont la ligne de marché n'est pas (encore) chargée reste
// listé avec des "--"
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, InputMode};
use crate::format::{format_crypto_price, format_market_cap};
use crate::store::watchlist::WatchlistRow;
use crate::ui::dashboard::{create_layout, key_style, render_footer, render_header, trend_color};

pub fn render_watchlist(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);

    let content = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(chunks[1]);

    render_toolbar(frame, app, content[0]);
    render_table(frame, app, content[1]);

    let shortcuts = if app.input_mode == InputMode::Filter {
        vec![
            Span::styled("[Enter/Esc]", key_style()),
            Span::raw(" Done filtering"),
        ]
    } else {
        vec![
            Span::styled("[q]", key_style()),
            Span::raw(" Quit  "),
            Span::styled("[f]", key_style()),
            Span::raw(" Filter  "),
            Span::styled("[o]", key_style()),
            Span::raw(" Sort by  "),
            Span::styled("[d]", key_style()),
            Span::raw(" Asc/Desc  "),
            Span::styled("[s]", key_style()),
            Span::raw(" Remove  "),
            Span::styled("[Enter]", key_style()),
            Span::raw(" Details"),
        ]
    };
    render_footer(frame, app, chunks[2], shortcuts);
}

/// Barre d'outils : filtre + critère de tri
fn render_toolbar(frame: &mut Frame, app: &App, area: Rect) {
    let filtering = app.input_mode == InputMode::Filter;
    let filter_style = if filtering {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    let mut spans = vec![
        Span::styled("Filter: ", Style::default().fg(Color::Cyan)),
        Span::styled(app.watchlist_filter.clone(), filter_style),
    ];
    if filtering {
        spans.push(Span::styled("█", Style::default().add_modifier(Modifier::SLOW_BLINK)));
    }
    spans.push(Span::raw("    "));
    spans.push(Span::styled("Sort: ", Style::default().fg(Color::Cyan)));
    spans.push(Span::raw(format!("{} {}", app.sort_by.label(), app.sort_order.arrow())));

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(paragraph, area);
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let entries = app.watchlist_view();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" ★ Watchlist ({}) ", app.state.watchlist.len()));

    if entries.is_empty() {
        let message = if app.state.watchlist.is_empty() || app.watchlist_filter.trim().is_empty() {
            "Your watchlist is empty. Press [s] on a coin in Markets to add it."
        } else {
            "No coins match your filter."
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

    let header = Row::new(vec!["Name", "Symbol", "Price", "24h %", "Market Cap"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = entries
        .iter()
        .map(|entry| match entry {
            WatchlistRow::Market(coin) => {
                let change = coin.change();
                Row::new(vec![
                    Cell::from(coin.name.clone()),
                    Cell::from(coin.ticker()),
                    Cell::from(format_crypto_price(coin.current_price, &app.currency)),
                    Cell::from(change.display()).style(Style::default().fg(trend_color(change.trend))),
                    Cell::from(format_market_cap(coin.market_cap, &app.currency)),
                ])
            }
            WatchlistRow::Pending(id) => Row::new(vec![
                Cell::from(id.to_string()),
                Cell::from("--"),
                Cell::from("--"),
                Cell::from("--"),
                Cell::from("--"),
            ])
            .style(Style::default().fg(Color::Gray)),
        })
        .collect();

    let widths = [
        Constraint::Min(14),
        Constraint::Length(8),
        Constraint::Length(16),
        Constraint::Length(11),
        Constraint::Length(12),
    ];

    let mut state = TableState::default().with_selected(Some(app.watchlist_selected));
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));
    frame.render_stateful_widget(table, area, &mut state);
}
