// ============================================================================
// Écran de login
// ============================================================================
// Formulaire centré : email, mot de passe (masqué), message d'erreur
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, LoginField};
use crate::ui::dashboard::key_style;

/// Zone centrée de taille fixe (bornée par l'écran)
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

pub fn render_login(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 16, frame.size());

    let outer = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" CoinWatch ")
        .title_alignment(Alignment::Center);
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Titre
            Constraint::Length(3), // Email
            Constraint::Length(3), // Mot de passe
            Constraint::Length(2), // Erreur
            Constraint::Min(0),    // Aide
        ])
        .split(inner);

    let title = Paragraph::new(Line::from(Span::styled(
        "Sign in to track the crypto market",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    let form = &app.login;
    render_field(frame, chunks[1], "Email", &form.email, form.focus == LoginField::Email);
    render_field(
        frame,
        chunks[2],
        "Password",
        &form.password_display(),
        form.focus == LoginField::Password,
    );

    if let Some(error) = &form.error {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, chunks[3]);
    }

    let visibility = if form.show_password { " Hide password" } else { " Show password" };
    let help = vec![
        Line::from(vec![
            Span::styled("[Tab]", key_style()),
            Span::raw(" Next field  "),
            Span::styled("[Enter]", key_style()),
            Span::raw(" Sign in"),
        ]),
        Line::from(vec![
            Span::styled("[Ctrl+V]", key_style()),
            Span::raw(visibility),
            Span::raw("  "),
            Span::styled("[Esc]", key_style()),
            Span::raw(" Quit"),
        ]),
    ];
    frame.render_widget(Paragraph::new(help).alignment(Alignment::Center), chunks[4]);

    if app.is_awaiting_quit_confirmation() {
        let warning = Paragraph::new(Line::from(Span::styled(
            "Press Esc again to quit",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(warning, chunks[3]);
    }
}

fn render_field(frame: &mut Frame, area: Rect, label: &str, value: &str, focused: bool) {
    let border = if focused { Color::Green } else { Color::DarkGray };
    let mut spans = vec![Span::raw(value.to_string())];
    if focused {
        spans.push(Span::styled("█", Style::default().add_modifier(Modifier::SLOW_BLINK)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(format!(" {} ", label)),
    );
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fits_small_screens() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = centered_rect(60, 16, area);
        assert_eq!(rect, Rect::new(0, 0, 40, 10));

        let rect = centered_rect(20, 4, Rect::new(0, 0, 100, 40));
        assert_eq!(rect, Rect::new(40, 18, 20, 4));
    }
}
