use crate::session::QuizSession;
use crate::ui::layout::calculate_summary_chunks;
use crate::utils::truncate_string;
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn draw_game_over(f: &mut Frame, session: &QuizSession, status_line: Option<&str>) {
    let layout = calculate_summary_chunks(f.area());

    let title = Paragraph::new(format!("Time's Up! - {}", session.config.topic.title()))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, layout.header_area);

    let correct = session.history.iter().filter(|r| r.is_correct).count();

    let mut summary_text = Text::default();
    summary_text.push_line(Line::from(vec![
        Span::from("Final Score: "),
        Span::styled(
            session.game.score.to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    summary_text.push_line(Line::from(format!(
        "Answered: {} ({} correct)",
        session.game.total_answered, correct
    )));
    if let Some(sub) = session.config.sub_topic_label() {
        summary_text.push_line(Line::from(format!(
            "Focus: {} - {}",
            sub,
            session.config.difficulty.label()
        )));
    }
    summary_text.push_line(Line::from(""));

    for (i, record) in session.history.iter().enumerate() {
        let mark = if record.is_correct { "[✓]" } else { "[✗]" };
        summary_text.push_line(Line::from(format!(
            "{} {}. {}",
            mark,
            i + 1,
            truncate_string(&record.question.full_sentence(), 60)
        )));
    }

    if let Some(status) = status_line {
        summary_text.push_line(Line::from(""));
        summary_text.push_line(Line::from(Span::styled(
            status,
            Style::default().fg(Color::Cyan),
        )));
    }

    let summary = Paragraph::new(summary_text)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(summary, layout.content_area);

    let help_text = vec![Line::from(vec![
        Span::styled(
            "e",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Export Results  "),
        Span::styled(
            "r",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Play Again  "),
        Span::styled(
            "b",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Focus Menu  "),
        Span::styled(
            "m",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Main Menu  "),
        Span::styled(
            "q",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Quit"),
    ])];
    let help = Paragraph::new(help_text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, layout.footer_area);
}
