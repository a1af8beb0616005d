use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, EditField};

pub fn draw(frame: &mut Frame, app: &App) {
    // Main horizontal split: 1/3 left, 2/3 right
    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3), // Left pane: item list
            Constraint::Ratio(2, 3), // Right pane: editor
        ])
        .split(frame.area());

    // Left pane: header + item list + activity log + status
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),  // Title bar
            Constraint::Min(0),     // Item list
            Constraint::Length(12), // Activity log
            Constraint::Length(1),  // Status line
        ])
        .split(main_chunks[0]);

    // Right pane: title + draft + hook + body + faqs + status
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),      // Item title
            Constraint::Percentage(20), // Raw draft
            Constraint::Length(5),      // Hook
            Constraint::Min(0),         // Body
            Constraint::Percentage(15), // FAQ
            Constraint::Length(1),      // Status
        ])
        .split(main_chunks[1]);

    // Render left pane
    render_header(frame, app, left_chunks[0]);
    render_item_list(frame, app, left_chunks[1]);
    render_activity_log(frame, app, left_chunks[2]);
    render_left_status(frame, app, left_chunks[3]);

    // Render right pane
    render_item_title(frame, app, right_chunks[0]);
    render_draft(frame, app, right_chunks[1]);
    render_field(frame, app, EditField::Hook, &app.edited_hook, right_chunks[2]);
    render_field(frame, app, EditField::Body, &app.edited_body, right_chunks[3]);
    render_field(frame, app, EditField::Faqs, &app.edited_faqs, right_chunks[4]);
    render_right_status(frame, app, right_chunks[5]);

    if app.show_help {
        render_help(frame);
    }

    if let Some(message) = &app.notification {
        render_notification(frame, message);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let filter_label = app.filter.label();
    let total = app.items.len();
    let pending = app.pending_count();
    let ready = total - pending;

    let title = format!(" Newsdesk [{filter_label}] ");

    let (autopilot_label, autopilot_color) = match &app.autopilot {
        Some(autopilot) if autopilot.is_running() => (
            format!("AUTOPILOT ON (every {}s)", autopilot.interval().as_secs()),
            Color::Green,
        ),
        Some(_) => ("Autopilot off".to_string(), Color::DarkGray),
        None => ("Autopilot unavailable (no API key)".to_string(), Color::Red),
    };

    let search = if app.search_active {
        format!("/{}_", app.search_query)
    } else if !app.search_query.is_empty() {
        format!("/{}", app.search_query)
    } else {
        String::new()
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" {total} Items | {pending} Pending | {ready} Ready "),
                Style::default().fg(Color::White),
            ),
            Span::styled(search, Style::default().fg(Color::Yellow)),
        ]),
        Line::from(Span::styled(
            format!(" {autopilot_label}"),
            Style::default().fg(autopilot_color).add_modifier(Modifier::BOLD),
        )),
    ];

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_item_list(frame: &mut Frame, app: &App, area: Rect) {
    let items = app.filtered_items();

    let list_items: Vec<ListItem> = items
        .iter()
        .map(|item| {
            let (marker, marker_color) = if item.is_ready() {
                ("✓ ", Color::Green)
            } else if item.raw_draft.is_some() {
                ("• ", Color::Yellow)
            } else {
                ("? ", Color::DarkGray)
            };

            let style = if app.editing_item_id == Some(item.id) {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::White)
            };

            let line = Line::from(vec![
                Span::styled(marker, Style::default().fg(marker_color)),
                Span::styled(
                    format!("{} ", item.created_at.format("%d/%m %H:%M")),
                    Style::default().fg(Color::Blue),
                ),
                Span::styled(item.title.as_str(), style),
            ]);

            ListItem::new(line)
        })
        .collect();

    let list = List::new(list_items)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !items.is_empty() {
        state.select(Some(app.selected_index));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_activity_log(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = app
        .activity_log
        .snapshot()
        .into_iter()
        .map(Line::from)
        .collect();

    let block = Block::default()
        .title(" Activity ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().fg(Color::Gray));

    frame.render_widget(paragraph, area);
}

fn render_left_status(frame: &mut Frame, _app: &App, area: Rect) {
    let status = "j/k:nav  /:search  f:filter  a:autopilot  ?:help  q:quit";

    let paragraph = Paragraph::new(status).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

fn render_item_title(frame: &mut Frame, app: &App, area: Rect) {
    let item = app.editing_item();
    let title = item
        .map(|i| i.title.as_str())
        .unwrap_or("No item selected (Enter to open)");

    let mut spans = vec![Span::styled(
        title,
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if let Some(subtitle) = item.and_then(|i| i.subtitle.as_deref()) {
        spans.push(Span::styled(
            format!(" | {subtitle}"),
            Style::default().fg(Color::Gray),
        ));
    }

    let block_title = match item.and_then(|i| i.source_url.as_deref()) {
        Some(source) => format!(" Item | {source} "),
        None => " Item ".to_string(),
    };

    let block = Block::default()
        .title(block_title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn render_draft(frame: &mut Frame, app: &App, area: Rect) {
    let draft = app
        .editing_item()
        .map(|i| i.raw_draft.as_deref().unwrap_or("No raw draft found."))
        .unwrap_or("");

    let block = Block::default()
        .title(" Raw draft (source of facts) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let paragraph = Paragraph::new(draft)
        .block(block)
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC))
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn render_field(frame: &mut Frame, app: &App, field: EditField, text: &str, area: Rect) {
    let focused = app.edit_active && app.edit_field == field;

    let border_color = if focused { Color::Yellow } else { Color::Blue };
    let content = if focused {
        format!("{text}_")
    } else {
        text.to_string()
    };

    let block = Block::default()
        .title(format!(" {} ", field.label()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn render_right_status(frame: &mut Frame, app: &App, area: Rect) {
    let status = if app.is_generating {
        "⏳ Generating..."
    } else if app.edit_active {
        "Editing: Tab:next field  Enter:newline  Esc:done"
    } else if app.editing_item_id.is_some() {
        "g:generate  e:edit  s:publish"
    } else {
        ""
    };

    let model = app
        .model_name
        .as_deref()
        .map(|m| format!(" | {m}"))
        .unwrap_or_default();

    let text = format!("{status}{model}");
    let paragraph = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

fn render_notification(frame: &mut Frame, message: &str) {
    let area = centered_rect(50, 30, frame.area());

    let block = Block::default()
        .title(" Notice ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let paragraph = Paragraph::new(format!("{message}\n\nPress any key to close"))
        .block(block)
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: false });

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn render_help(frame: &mut Frame) {
    let area = centered_rect(50, 60, frame.area());

    let help_text = vec![
        "",
        " Navigation:",
        "   j / ↓    Move down",
        "   k / ↑    Move up",
        "   < / >    Jump to top / bottom",
        "   Enter    Open item in editor",
        "   /        Search titles",
        "   f        Toggle pending / ready",
        "",
        " Editing:",
        "   g        Generate hook and article",
        "   e        Edit (Tab: next field, Esc: done)",
        "   s        Publish",
        "",
        " General:",
        "   a        Toggle autopilot",
        "   r        Reload items",
        "   ?        Toggle this help",
        "   q        Quit",
        "",
        " Press any key to close",
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(help_text.join("\n"))
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
