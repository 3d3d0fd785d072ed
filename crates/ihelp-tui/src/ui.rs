use ihelp_core::{Entry, Role};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{cursor_row_col, App, InputMode, SUGGESTIONS};

const INPUT_PLACEHOLDER: &str = "Ask me anything about your document...";
const MAX_INPUT_ROWS: u16 = 4;

/// Parse a line of text and convert **bold** and `code` markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        let (closing, style) = match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                ("**", Style::default().add_modifier(Modifier::BOLD))
            }
            '`' => ("`", Style::default().fg(Color::Green)),
            _ => {
                current_text.push(c);
                continue;
            }
        };

        // Collect up to the closing marker
        let mut inner = String::new();
        let mut found_close = false;
        while let Some(c) = chars.next() {
            if closing == "**" && c == '*' && chars.peek() == Some(&'*') {
                chars.next();
                found_close = true;
                break;
            }
            if closing == "`" && c == '`' {
                found_close = true;
                break;
            }
            inner.push(c);
        }

        if found_close && !inner.is_empty() {
            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }
            spans.push(Span::styled(inner, style));
        } else {
            // No closing marker, keep it literal
            current_text.push_str(closing);
            current_text.push_str(&inner);
            if found_close {
                current_text.push_str(closing);
            }
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

fn role_style(role: Role) -> Style {
    match role {
        Role::User => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        Role::Bot => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    }
}

/// Everything in the chat pane, one `Line` per source line (before wrapping)
fn transcript_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    for entry in app.session.transcript() {
        match entry {
            Entry::Message(msg) => {
                lines.push(Line::from(vec![
                    Span::styled(format!("{}:", msg.role().label()), role_style(msg.role())),
                    Span::raw(" "),
                    Span::styled(msg.formatted_time(), Style::default().fg(Color::DarkGray)),
                ]));
                for line in msg.content().lines() {
                    match msg.role() {
                        Role::User => lines.push(Line::from(line.to_string())),
                        Role::Bot => lines.push(parse_markdown_line(line)),
                    }
                }
                lines.push(Line::default());
            }
            Entry::Thinking => {
                lines.push(Line::from(Span::styled(
                    format!("{}:", Role::Bot.label()),
                    role_style(Role::Bot),
                )));
                // Animated ellipsis: cycles through ".", "..", "..."
                let dots = ".".repeat((app.animation_frame as usize) + 1);
                lines.push(Line::from(Span::styled(
                    format!("Thinking{}", dots),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )));
            }
        }
    }

    lines
}

/// Rows the paragraph occupies once word-wrapped to `width`. Measure before
/// attaching a block, otherwise the borders are counted too.
fn wrapped_height(paragraph: &Paragraph<'_>, width: u16) -> u16 {
    u16::try_from(paragraph.line_count(width.max(1))).unwrap_or(u16::MAX)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let input_rows = (app.input.split('\n').count() as u16).clamp(1, MAX_INPUT_ROWS);

    let [header_area, chat_area, suggestions_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(input_rows + 2),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_suggestions(frame, suggestions_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);

    if app.show_document_picker {
        render_document_picker(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let document = match app.active_document_title() {
        Some(title) => Span::styled(format!(" [{}]", title), Style::default().fg(Color::Green)),
        None => Span::styled(" [no document]", Style::default().fg(Color::Gray)),
    };

    let title = Line::from(vec![
        Span::styled(" iHelp ", Style::default().fg(Color::Cyan).bold()),
        document,
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);
    let subtitle = Line::from(Span::styled(
        " Maximo Assistant to Help with Analyzing, Summarizing and Advising",
        Style::default().fg(Color::Gray),
    ));

    let header = Paragraph::new(vec![title, subtitle]).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if app.input_mode == InputMode::Normal {
            Color::Cyan
        } else {
            Color::DarkGray
        }))
        .title(format!(" {} ", app.backend_url()));

    let chat = Paragraph::new(Text::from(transcript_lines(app))).wrap(Wrap { trim: false });

    // Measure before scrolling so the jump-to-latest lands on the real bottom
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);
    app.chat_content_height = wrapped_height(&chat, app.chat_width);
    app.sync_scroll();

    let chat = chat.block(block).scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_suggestions(frame: &mut Frame, area: Rect) {
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().fg(Color::Magenta);

    let mut spans = vec![Span::raw(" ")];
    for (i, suggestion) in SUGGESTIONS.iter().enumerate() {
        spans.push(Span::styled(format!(" {} ", i + 1), key_style));
        spans.push(Span::styled(format!(" {}  ", suggestion), label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let pending = app.session.is_pending();

    let border_color = if editing { Color::Yellow } else { Color::DarkGray };
    let title = if pending {
        " Waiting for a reply... "
    } else {
        " Message (Enter to send, Alt+Enter for newline) "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;

    if app.input.is_empty() {
        let placeholder = Paragraph::new(INPUT_PLACEHOLDER)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
    } else {
        let (row, col) = cursor_row_col(&app.input, app.input_cursor);

        // Keep the cursor visible in both directions
        let row_offset = row.saturating_sub(inner_height.saturating_sub(1));
        let col_offset = if inner_width > 0 && col >= inner_width {
            col - inner_width + 1
        } else {
            0
        };

        let input = Paragraph::new(app.input.as_str())
            .style(Style::default().fg(Color::Cyan))
            .block(block)
            .scroll((row_offset as u16, col_offset as u16));
        frame.render_widget(input, area);
    }

    if editing && !app.show_document_picker {
        let (row, col) = cursor_row_col(&app.input, app.input_cursor);
        let row = row.min(inner_height.saturating_sub(1));
        let col = col.min(inner_width.saturating_sub(1));
        frame.set_cursor_position((area.x + 1 + col as u16, area.y + 1 + row as u16));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " TYPING ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let disabled_style = Style::default().bg(Color::Black).fg(Color::DarkGray);

    let send_label = if app.can_send() {
        Span::styled(" send ", label_style)
    } else {
        Span::styled(" send ", disabled_style)
    };

    let hints = if app.show_document_picker {
        vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" nav ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" select ", label_style),
            Span::styled(" x ", key_style),
            Span::styled(" clear ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" close ", label_style),
        ]
    } else {
        match app.input_mode {
            InputMode::Editing => vec![
                Span::styled(" Enter ", key_style),
                send_label,
                Span::styled(" PgUp/PgDn ", key_style),
                Span::styled(" scroll ", label_style),
                Span::styled(" Esc ", key_style),
                Span::styled(" stop typing ", label_style),
            ],
            InputMode::Normal => vec![
                Span::styled(" i ", key_style),
                Span::styled(" type ", label_style),
                Span::styled(" j/k ", key_style),
                Span::styled(" scroll ", label_style),
                Span::styled(" d ", key_style),
                Span::styled(" documents ", label_style),
                Span::styled(" 1-3 ", key_style),
                Span::styled(" suggest ", label_style),
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ],
        }
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

/// Rows needed for the picker list: two per document, one for the empty message
fn picker_rows(count: usize) -> u16 {
    if count == 0 {
        1
    } else {
        u16::try_from(count).unwrap_or(u16::MAX).saturating_mul(2)
    }
}

fn render_document_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let documents = app.session.documents();

    // Calculate popup size and position (centered)
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = picker_rows(documents.len())
        .saturating_add(2)
        .min(area.height.saturating_sub(4));

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Select Document ");

    if app.documents_loading() || documents.is_empty() {
        let text = if app.documents_loading() {
            "Loading documents..."
        } else {
            "No documents available."
        };
        let placeholder = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, popup_area);
        return;
    }

    let active = app.session.active_document();
    let items: Vec<ListItem> = documents
        .iter()
        .map(|doc| {
            let is_active = active == Some(doc.id.as_str());
            let prefix = if is_active { "* " } else { "  " };
            let style = if is_active {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            ListItem::new(vec![
                Line::from(format!("{}{}", prefix, doc.display_title())),
                Line::from(Span::styled(
                    format!("    {}", doc.summary()),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .style(style)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, popup_area, &mut app.document_picker_state);
}
