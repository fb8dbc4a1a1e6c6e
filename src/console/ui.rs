use super::app::App;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
};

pub fn draw(f: &mut Frame, app: &mut App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(1)])
        .split(f.area());

    let tables: Vec<ListItem> = app
        .completer
        .tables()
        .iter()
        .map(|table| ListItem::new(table.as_str()))
        .collect();
    let tables_panel = List::new(tables)
        .block(Block::default().borders(Borders::ALL).title(" Tables "))
        .style(Style::default().fg(Color::White));
    f.render_widget(tables_panel, columns[0]);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(columns[1]);

    // Keep the tail of the output visible.
    let inner_height = chunks[0].height.saturating_sub(2) as usize;
    let skip_count = app.messages.len().saturating_sub(inner_height);

    let messages: Vec<ListItem> = app
        .messages
        .iter()
        .skip(skip_count)
        .map(|line| ListItem::new(line.clone()))
        .collect();

    let messages_panel = List::new(messages)
        .block(Block::default().borders(Borders::ALL).title(" Output "))
        .style(Style::default().fg(Color::White));
    f.render_widget(messages_panel, chunks[0]);

    let input_rect = chunks[1];
    f.render_widget(&app.textarea, input_rect);

    if app.popup_open && !app.suggestions.is_empty() {
        let (_, col) = app.textarea.cursor();
        let screen = f.area();

        let width = 30.min(screen.width);
        let height = (app.suggestions.len() as u16 + 2).min(8);
        let popup_x = input_rect.x + col as u16 + 1;
        // Open above the input line, which sits at the bottom of the screen.
        let popup_y = input_rect.y.saturating_sub(height);

        let area = Rect::new(
            popup_x.min(screen.width.saturating_sub(width)),
            popup_y,
            width,
            height.min(screen.height),
        );

        f.render_widget(Clear, area);

        let items: Vec<ListItem> = app
            .suggestions
            .iter()
            .map(|s| ListItem::new(s.as_str()))
            .collect();

        let mut state = ListState::default();
        state.select(Some(app.suggestion_index));

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Suggestions"))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol(">> ");

        f.render_stateful_widget(list, area, &mut state);
    }
}
