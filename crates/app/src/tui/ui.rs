//! TUI rendering with ratatui
//!
//! Implements the visual layout: device status panel on top, activity log in
//! the middle, key help at the bottom, with help and device-selection
//! dialogs rendered over the top.

use pnp::DeviceStatus;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table, TableState},
};
use std::time::Duration;

use super::app::{App, Dialog};

/// Main render function
///
/// Renders the complete UI based on current application state.
pub fn render(frame: &mut Frame, app: &App) {
    // Main layout: device panel (top), activity log (center), help bar (bottom)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Device panel
            Constraint::Min(6),    // Activity log
            Constraint::Length(3), // Help bar
        ])
        .split(frame.area());

    render_device_panel(frame, app, chunks[0]);
    render_activity_log(frame, app, chunks[1]);
    render_help_bar(frame, chunks[2]);

    // Render dialog on top if open
    match app.dialog() {
        Dialog::None => {}
        Dialog::Help => render_help_dialog(frame),
        Dialog::SelectDevice => render_select_dialog(frame, app),
    }
}

/// Render the device panel (top)
fn render_device_panel(frame: &mut Frame, app: &App, area: Rect) {
    let id_line = match app.current_id() {
        Some(id) => Line::from(vec![
            Span::styled("Device: ", Style::default().fg(Color::DarkGray)),
            Span::styled(id.to_string(), Style::default().fg(Color::Cyan)),
        ]),
        None => Line::from(Span::styled(
            "No device selected — press 's' to scan",
            Style::default().fg(Color::DarkGray),
        )),
    };

    let status_line = Line::from(vec![
        Span::styled("Status: ", Style::default().fg(Color::DarkGray)),
        status_span(app),
    ]);

    let panel = Paragraph::new(vec![id_line, status_line]).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" USB Switch ")
            .title_alignment(Alignment::Center)
            .border_style(Style::default().fg(Color::Blue)),
    );

    frame.render_widget(panel, area);
}

/// Styled span for the current device status
fn status_span(app: &App) -> Span<'static> {
    if app.action_in_flight() {
        return Span::styled("working...", Style::default().fg(Color::Yellow));
    }
    if app.scanning() {
        return Span::styled("scanning...", Style::default().fg(Color::Yellow));
    }

    match app.status() {
        Some(DeviceStatus::Enabled) => Span::styled(
            "Enabled",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Some(DeviceStatus::Disabled) => Span::styled(
            "Disabled",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Some(DeviceStatus::NotFound) => {
            Span::styled("Not found", Style::default().fg(Color::Yellow))
        }
        Some(DeviceStatus::Unknown) => {
            Span::styled("Unknown", Style::default().fg(Color::DarkGray))
        }
        None => Span::styled("...", Style::default().fg(Color::DarkGray)),
    }
}

/// Render the activity log (center)
fn render_activity_log(frame: &mut Frame, app: &App, area: Rect) {
    // Keep the newest entries visible
    let visible = area.height.saturating_sub(2) as usize;
    let entries = app.log();
    let skip = entries.len().saturating_sub(visible);

    let items: Vec<ListItem> = entries
        .iter()
        .skip(skip)
        .map(|entry| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("[{}] ", format_elapsed(entry.at)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(entry.message.clone()),
            ]))
        })
        .collect();

    let log = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Activity ")
            .border_style(Style::default().fg(Color::Blue)),
    );

    frame.render_widget(log, area);
}

/// Render the help bar (bottom)
fn render_help_bar(frame: &mut Frame, area: Rect) {
    let help_text = Line::from(vec![
        key_span("e"),
        Span::raw(" enable  "),
        key_span("d"),
        Span::raw(" disable  "),
        key_span("s"),
        Span::raw(" scan  "),
        key_span("r"),
        Span::raw(" refresh  "),
        key_span("?"),
        Span::raw(" help  "),
        key_span("q"),
        Span::raw(" quit"),
    ]);

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(help, area);
}

fn key_span(key: &str) -> Span<'static> {
    Span::styled(
        key.to_string(),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )
}

/// Render the help dialog
fn render_help_dialog(frame: &mut Frame) {
    let area = centered_rect(50, 40, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from("  e       Enable the selected device"),
        Line::from("  d       Disable the selected device"),
        Line::from("  s       Scan for USB devices"),
        Line::from("  r       Refresh device status"),
        Line::from("  ↑/k ↓/j Move selection"),
        Line::from("  Enter   Confirm selection"),
        Line::from("  Esc     Close dialog"),
        Line::from("  q       Quit"),
    ];

    let help = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help ")
            .title_alignment(Alignment::Center)
            .border_style(Style::default().fg(Color::Yellow)),
    );

    frame.render_widget(help, area);
}

/// Render the device-selection dialog
fn render_select_dialog(frame: &mut Frame, app: &App) {
    let area = centered_rect(80, 60, frame.area());
    frame.render_widget(Clear, area);

    let header_cells = ["Name", "Instance ID"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .scan_results()
        .iter()
        .map(|device| {
            Row::new(vec![
                Cell::from(device.name.clone()),
                Cell::from(device.id.clone()),
            ])
        })
        .collect();

    let table = Table::new(rows, [Constraint::Min(20), Constraint::Min(30)])
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(
                    " Select a device ({}) — Enter to confirm ",
                    app.scan_results().len()
                ))
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = TableState::default();
    if !app.scan_results().is_empty() {
        state.select(Some(app.selected_index()));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

/// Format a duration since startup as mm:ss
fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Create a centered rect using a percentage of the available area
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
