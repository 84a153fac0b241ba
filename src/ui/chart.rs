// ============================================================================
// Chart - Rendu du graphique de prix
// ============================================================================
// Affiche un graphique ligne (line chart) pour la série de prix courante
//
// CONCEPTS RUST :
// 1. Option handling : gérer l'absence de données
// 2. Iterator chaining : transformer les points en (x, y)
//
// CONCEPTS RATATUI :
// 1. Chart widget : graphique ligne
// 2. Dataset : série de données à afficher
// 3. Axis : configuration des axes X et Y
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::format::format_crypto_price;
use crate::models::{ChartTimeframe, PriceSeries};

/// Nombre de labels sur l'axe X
const X_LABELS: usize = 4;

/// Couleur de la courbe
///
/// - Hausse ou stable : vert
/// - Baisse : rouge
/// - Variation < 1% : couleur atténuée
pub fn series_color(series: &PriceSeries) -> Color {
    match (series.is_positive(), series.is_small_change()) {
        (true, false) => Color::Green,
        (true, true) => Color::LightGreen,
        (false, false) => Color::Red,
        (false, true) => Color::LightRed,
    }
}

/// Titre du bloc : timeframes disponibles, le courant en surbrillance
fn timeframe_tabs(current: ChartTimeframe) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for timeframe in ChartTimeframe::all() {
        let style = if timeframe == current {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", timeframe.label()), style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

/// Dessine le graphique de la série
///
/// CONCEPT RUST : Early return
/// - Série vide : message et return
pub fn render_price_chart(frame: &mut Frame, series: &PriceSeries, currency: &str, loading: bool, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(timeframe_tabs(series.timeframe));

    let (y_min, y_max) = match series.y_bounds() {
        Some(bounds) => bounds,
        None => {
            let message = if loading { "Loading chart..." } else { "No chart data available" };
            render_no_data(frame, block, area, message);
            return;
        }
    };

    let points = series.plot_points();
    let color = series_color(series);

    let datasets = vec![Dataset::default()
        .name(series.coin_id.as_str())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points)];

    let x_labels: Vec<Span> = series.axis_labels(X_LABELS).into_iter().map(Span::raw).collect();
    let x_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, (points.len().saturating_sub(1)) as f64])
        .labels(x_labels);

    let y_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format_crypto_price(y_min, currency)),
            Span::raw(format_crypto_price((y_min + y_max) / 2.0, currency)),
            Span::raw(format_crypto_price(y_max, currency)),
        ]);

    let chart = Chart::new(datasets).block(block).x_axis(x_axis).y_axis(y_axis);
    frame.render_widget(chart, area);
}

/// Résumé de la fenêtre : dernier point et variation sur la période
pub fn summary_line(series: &PriceSeries, currency: &str) -> Line<'static> {
    let last = match series.points.last() {
        Some(point) => point,
        None => return Line::default(),
    };
    let color = series_color(series);
    Line::from(vec![
        Span::styled(series.tooltip_label(last), Style::default().fg(Color::Gray)),
        Span::raw("  "),
        Span::styled(
            format_crypto_price(last.price, currency),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{:+.2}% over {}", series.price_change_percent(), series.timeframe.label()),
            Style::default().fg(color),
        ),
    ])
}

fn render_no_data(frame: &mut Frame, block: Block, area: Rect, message: &str) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Gray))),
    ];
    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: f64 = 1_705_327_500_000.0;
    const HOUR: f64 = 3_600_000.0;

    #[test]
    fn test_series_color() {
        let up = PriceSeries::from_prices("btc", ChartTimeframe::OneDay, &[(TS, 100.0), (TS + HOUR, 110.0)]);
        assert_eq!(series_color(&up), Color::Green);

        let flat = PriceSeries::from_prices("btc", ChartTimeframe::OneDay, &[(TS, 100.0), (TS + HOUR, 100.5)]);
        assert_eq!(series_color(&flat), Color::LightGreen);

        let down = PriceSeries::from_prices("btc", ChartTimeframe::OneDay, &[(TS, 100.0), (TS + HOUR, 90.0)]);
        assert_eq!(series_color(&down), Color::Red);
    }

    #[test]
    fn test_summary_line_empty_series() {
        let empty = PriceSeries::empty("btc", ChartTimeframe::OneDay);
        assert!(summary_line(&empty, "usd").spans.is_empty());
    }
}
