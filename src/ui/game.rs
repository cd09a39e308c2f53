use crate::catalog::GameMode;
use crate::models::AnswerStatus;
use crate::session::QuizSession;
use crate::ui::layout::calculate_game_chunks;
use crate::utils::format_clock;
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

pub fn draw_game(f: &mut Frame, session: &QuizSession, status_line: Option<&str>) {
    let layout = calculate_game_chunks(f.area());

    let mut header = format!(
        "{} - Level {} - Question {}",
        session.config.topic.title(),
        session.level(),
        session.current_index + 1,
    );
    if let Some(sub) = session.config.sub_topic_label() {
        header.push_str(&format!(" ({})", sub));
    }
    let header = Paragraph::new(header)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, layout.header_area);

    draw_scoreboard(f, session, &layout);

    if session.current_question().is_some() {
        draw_sentence(f, session, &layout);
        draw_options(f, session, &layout);
        draw_feedback(f, session, &layout, status_line);
    } else {
        let waiting = Paragraph::new("More questions are on the way...")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(waiting, layout.sentence_area);
    }

    let mut help_spans = vec![
        Span::styled(
            "↑/↓ 1-4",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Pick  "),
        Span::styled(
            "Enter",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    if session.status == AnswerStatus::Idle {
        help_spans.push(Span::from(" Check  "));
    } else {
        help_spans.push(Span::from(" Next  "));
    }
    help_spans.extend([
        Span::styled(
            "e",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Export  "),
        Span::styled(
            "b",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Back  "),
        Span::styled(
            "m",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Menu"),
    ]);
    let help = Paragraph::new(vec![Line::from(help_spans)])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, layout.help_area);
}

fn draw_scoreboard(
    f: &mut Frame,
    session: &QuizSession,
    layout: &crate::ui::layout::GameLayout,
) {
    let mut spans = vec![
        Span::from("Score: "),
        Span::styled(
            session.game.score.to_string(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from("   Streak: "),
        Span::styled(
            format!("{}x", session.game.streak),
            if session.game.streak > 2 {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            },
        ),
        Span::from("   Answered: "),
        Span::styled(
            session.game.total_answered.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ];

    if session.config.mode == GameMode::Timed {
        spans.push(Span::from("   Time: "));
        spans.push(Span::styled(
            format_clock(session.game.time_left_secs),
            if session.game.time_left_secs < 10 {
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            },
        ));
    }

    let scoreboard = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(scoreboard, layout.score_area);
}

fn draw_sentence(
    f: &mut Frame,
    session: &QuizSession,
    layout: &crate::ui::layout::GameLayout,
) {
    let Some(question) = session.current_question() else {
        return;
    };

    let blank = match session.selected.and_then(|i| question.options.get(i)) {
        Some(option) => format!("[ {} ]", option),
        None => "[ _______ ]".to_string(),
    };
    let blank_style = match session.status {
        AnswerStatus::Idle => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        AnswerStatus::Correct => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
        AnswerStatus::Incorrect => Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::BOLD),
    };

    let line = Line::from(vec![
        Span::from(question.sentence_pre.clone()),
        Span::styled(blank, blank_style),
        Span::styled(
            format!(" ({})", question.hint_text),
            Style::default().fg(Color::DarkGray),
        ),
        Span::from(question.sentence_post.clone()),
    ]);

    let sentence = Paragraph::new(line)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Sentence"));
    f.render_widget(sentence, layout.sentence_area);
}

fn draw_options(
    f: &mut Frame,
    session: &QuizSession,
    layout: &crate::ui::layout::GameLayout,
) {
    let Some(question) = session.current_question() else {
        return;
    };

    let items: Vec<ListItem> = question
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let style = if session.status == AnswerStatus::Idle {
                if session.selected == Some(i) {
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                }
            } else if *option == question.correct_answer {
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else if session.selected == Some(i) {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            ListItem::new(format!("{}. {}", i + 1, option)).style(style)
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Options"));
    f.render_widget(list, layout.options_area);
}

fn draw_feedback(
    f: &mut Frame,
    session: &QuizSession,
    layout: &crate::ui::layout::GameLayout,
    status_line: Option<&str>,
) {
    let mut text = Text::default();

    match session.status {
        AnswerStatus::Idle => {
            text.push_line(Line::from(Span::styled(
                "Pick an option and press Enter to check.",
                Style::default().fg(Color::DarkGray),
            )));
        }
        AnswerStatus::Correct => {
            text.push_line(Line::from(Span::styled(
                "Great Job!",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )));
            if let Some(question) = session.current_question() {
                text.push_line(Line::from(""));
                text.push_line(Line::from(question.explanation.as_str()));
            }
        }
        AnswerStatus::Incorrect => {
            text.push_line(Line::from(Span::styled(
                "Not quite right",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            )));
            if let Some(question) = session.current_question() {
                text.push_line(Line::from(""));
                text.push_line(Line::from(vec![
                    Span::from("Correct answer: "),
                    Span::styled(
                        question.correct_answer.clone(),
                        Style::default()
                            .fg(Color::Green)
                            .add_modifier(Modifier::BOLD),
                    ),
                ]));
                text.push_line(Line::from(question.explanation.as_str()));
            }
        }
    }

    if let Some(status) = status_line {
        text.push_line(Line::from(""));
        text.push_line(Line::from(Span::styled(
            status,
            Style::default().fg(Color::Cyan),
        )));
    }

    let feedback = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Feedback"));
    f.render_widget(feedback, layout.feedback_area);
}
