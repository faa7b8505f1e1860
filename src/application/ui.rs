use std::io;

use anyhow::Result;
use crossterm::cursor;
use crossterm::event::DisableBracketedPaste;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Scrollbar;
use ratatui::widgets::ScrollbarOrientation;
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::domain::models::Action;
use crate::domain::models::EngineStatus;
use crate::domain::models::Event;
use crate::domain::models::ASSISTANT_NAME;
use crate::domain::services::events::EventsService;
use crate::domain::services::AppState;

const EMPTY_TRANSCRIPT_TEXT: &str = "Ready to reason.";
const DISCLAIMER_TEXT: &str =
    "Agentic Reasoner may produce hallucinations. Use with caution.";

fn render_header<B: Backend>(frame: &mut Frame<B>, rect: Rect, status: &EngineStatus) {
    let status_color = match status {
        EngineStatus::Checking => Color::DarkGray,
        EngineStatus::Online(_) => Color::Green,
        EngineStatus::Offline(_) => Color::Red,
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {ASSISTANT_NAME}"),
            Style::default()
                .fg(Color::Rgb(94, 129, 244))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("●", Style::default().fg(status_color)),
        Span::raw(" "),
        Span::styled(status.to_string(), Style::default().fg(Color::DarkGray)),
    ]);

    frame.render_widget(Paragraph::new(line), rect);
}

fn render_transcript<B: Backend>(frame: &mut Frame<B>, rect: Rect, app_state: &mut AppState) {
    if app_state.messages.is_empty() {
        let top = rect.y + rect.height / 2;
        frame.render_widget(
            Paragraph::new(EMPTY_TRANSCRIPT_TEXT)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            Rect::new(rect.x, top, rect.width, 1.min(rect.height)),
        );
        return;
    }

    app_state
        .bubble_list
        .render(frame, rect, app_state.scroll.position);
    frame.render_stateful_widget(
        Scrollbar::new(ScrollbarOrientation::VerticalRight),
        rect.inner(&Margin {
            vertical: 1,
            horizontal: 0,
        }),
        &mut app_state.scroll.scrollbar_state,
    );
}

fn render_footer<B: Backend>(frame: &mut Frame<B>, rect: Rect) {
    frame.render_widget(
        Paragraph::new(DISCLAIMER_TEXT)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        rect,
    );
}

async fn start_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState,
    tx: mpsc::UnboundedSender<Action>,
    mut events: EventsService,
) -> Result<()> {
    loop {
        terminal.draw(|frame| {
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints(vec![
                    Constraint::Length(1),
                    Constraint::Min(1),
                    Constraint::Max(4),
                    Constraint::Length(1),
                ])
                .split(frame.size());

            if layout[1].width != app_state.last_known_width
                || layout[1].height != app_state.last_known_height
            {
                app_state.set_rect(layout[1]);
            }

            render_header(frame, layout[0], &app_state.engine_status);
            render_transcript(frame, layout[1], app_state);

            frame.render_widget(app_state.prompt.widget(), layout[2]);

            render_footer(frame, layout[3]);
        })?;

        match events.next().await? {
            Event::TranscriptChanged(messages) => {
                app_state.handle_transcript(messages);
            }
            Event::ControllerStateChanged(state) => {
                app_state.set_controller_state(state);
            }
            Event::EngineStatusChanged(status) => {
                app_state.set_engine_status(status);
            }
            Event::KeyboardCharInput(input) => {
                app_state.handle_input(input);
            }
            Event::KeyboardPaste(text) => {
                app_state.handle_paste(&text);
            }
            Event::KeyboardCTRLC() => {
                break;
            }
            Event::KeyboardEnter() => {
                if let Some(question) = app_state.submit() {
                    tx.send(Action::Submit(question))?;
                }
            }
            Event::UIResize() => {
                // Layout is recomputed on the next draw.
            }
            Event::UIScrollDown() => {
                app_state.scroll.down();
            }
            Event::UIScrollUp() => {
                app_state.scroll.up();
            }
            Event::UIScrollPageDown() => {
                app_state.scroll.down_page();
            }
            Event::UIScrollPageUp() => {
                app_state.scroll.up_page();
            }
        }
    }

    return Ok(());
}

pub fn destruct_terminal_for_panic() {
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    );
    let _ = crossterm::execute!(io::stdout(), cursor::Show);
}

pub async fn start(
    tx: mpsc::UnboundedSender<Action>,
    events: EventsService,
    username: &str,
) -> Result<()> {
    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    enable_raw_mode()?;
    crossterm::execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;
    let mut app_state = AppState::new(username);

    let res = start_loop(&mut terminal, &mut app_state, tx, events).await;

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    return res;
}
