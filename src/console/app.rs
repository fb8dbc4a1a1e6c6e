use super::autocomplete::TableCompleter;
use super::{ConsoleError, dump_table, list_tables, resolve_table, ui};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use sqlx::SqlitePool;
use std::io;
use tui_textarea::TextArea;

pub struct App<'a> {
    pub textarea: TextArea<'a>,
    pub messages: Vec<Line<'static>>,
    pub pool: SqlitePool,
    pub exit: bool,

    pub completer: TableCompleter,
    pub suggestions: Vec<String>,
    pub suggestion_index: usize,
    pub popup_open: bool,
}

impl<'a> App<'a> {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            textarea: Self::new_textarea(),
            messages: vec![
                Line::from(vec![Span::styled(
                    "Coin store console",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )]),
                Line::from("Type a table name and press Enter to show its contents."),
                Line::from("-".repeat(50)),
            ],
            pool,
            exit: false,
            completer: TableCompleter::default(),
            suggestions: Vec::new(),
            suggestion_index: 0,
            popup_open: false,
        }
    }

    fn new_textarea() -> TextArea<'static> {
        let mut textarea = TextArea::default();
        textarea.set_placeholder_text(
            "Table name ('Enter' to show, 'Tab' to complete, 'Ctrl+R' to refresh, 'Esc' to quit)",
        );
        textarea.set_block(
            ratatui::widgets::Block::default()
                .borders(ratatui::widgets::Borders::ALL)
                .title(" Table "),
        );
        textarea
    }

    fn reset_textarea(&mut self) {
        self.textarea = Self::new_textarea();
    }

    pub async fn run(&mut self) -> Result<(), ConsoleError> {
        self.refresh_tables().await?;

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.run_loop(&mut terminal).await;

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }

    async fn run_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), ConsoleError> {
        while !self.exit {
            terminal.draw(|f| ui::draw(f, self))?;

            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if self.popup_open {
                match key.code {
                    KeyCode::Down => {
                        if !self.suggestions.is_empty() {
                            self.suggestion_index =
                                (self.suggestion_index + 1) % self.suggestions.len();
                        }
                        continue;
                    }
                    KeyCode::Up => {
                        if !self.suggestions.is_empty() {
                            self.suggestion_index = (self.suggestion_index
                                + self.suggestions.len()
                                - 1)
                                % self.suggestions.len();
                        }
                        continue;
                    }
                    KeyCode::Enter | KeyCode::Tab => {
                        self.accept_suggestion();
                        continue;
                    }
                    KeyCode::Esc => {
                        self.popup_open = false;
                        continue;
                    }
                    _ => {
                        self.popup_open = false;
                    }
                }
            }

            match key.code {
                KeyCode::Esc => self.exit = true,
                KeyCode::Enter => self.show_table().await,
                KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    if let Err(err) = self.refresh_tables().await {
                        self.push_error(&err);
                    }
                }
                KeyCode::Tab => {
                    self.update_suggestions();
                    self.popup_open = !self.suggestions.is_empty();
                }
                _ => {
                    self.textarea.input(key);
                }
            }
        }
        Ok(())
    }

    async fn refresh_tables(&mut self) -> Result<(), ConsoleError> {
        let tables = list_tables(&self.pool).await?;
        self.completer.set_tables(tables);
        Ok(())
    }

    fn update_suggestions(&mut self) {
        let input = self.input();
        self.suggestions = self.completer.suggestions(&input);
        self.suggestion_index = 0;
    }

    fn accept_suggestion(&mut self) {
        if let Some(suggestion) = self.suggestions.get(self.suggestion_index).cloned() {
            self.reset_textarea();
            self.textarea.insert_str(&suggestion);
        }
        self.popup_open = false;
    }

    fn input(&self) -> String {
        self.textarea.lines().join("")
    }

    async fn show_table(&mut self) {
        let input = self.input();
        self.messages.push(Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Yellow)),
            Span::raw(input.clone()),
        ]));
        self.reset_textarea();

        match self.load_table(&input).await {
            Ok((name, rendered)) => {
                self.messages.push(Line::from(Span::styled(
                    format!("Contents of '{name}':"),
                    Style::default().fg(Color::Green),
                )));
                for line in rendered.lines() {
                    self.messages.push(Line::from(line.to_string()));
                }
            }
            Err(err) => self.push_error(&err),
        }

        self.messages.push(Line::from(Span::styled(
            "-".repeat(50),
            Style::default().fg(Color::DarkGray),
        )));
    }

    async fn load_table(&self, input: &str) -> Result<(String, String), ConsoleError> {
        let table = resolve_table(&self.pool, input).await?;
        let dump = dump_table(&self.pool, &table).await?;
        Ok((dump.table.clone(), dump.render()))
    }

    fn push_error(&mut self, err: &ConsoleError) {
        self.messages.push(Line::from(Span::styled(
            err.to_string(),
            Style::default().fg(Color::Red),
        )));
    }
}
