//! TUI rendering.
//!
//! ┌──────────────────────────────────────────────┐
//! │  myolink   http://192.168.1.201   auto       │
//! ├──────────────────────────────────────────────┤
//! │  1 Readings │ 2 Muscle State │ 3 Entropy     │
//! ├──────────────────────────────────────────────┤
//! │                                              │
//! │  (active view)                               │
//! │                                              │
//! ├──────────────────────────────────────────────┤
//! │  r: refresh   a: auto   tab: view   q: quit  │
//! └──────────────────────────────────────────────┘

use super::app::{App, SaveMessage, Snapshot, View};
use myolink_core::{MuscleState, epoch_millis};
use ratatui::{prelude::*, widgets::*};

pub fn draw(f: &mut Frame, app: &App, snap: &Snapshot) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Length(3), // tabs
            Constraint::Min(10),   // view
            Constraint::Length(1), // keys
        ])
        .split(f.area());

    draw_title(f, rows[0], app, snap);
    draw_tabs(f, rows[1], app.view());
    match app.view() {
        View::Readings => draw_readings(f, rows[2], snap),
        View::State => draw_state(f, rows[2], snap),
        View::Entropy => draw_entropy(f, rows[2], app, snap),
    }
    draw_keys(f, rows[3], app.view());
}

fn muscle_color(muscle: MuscleState) -> Color {
    let (r, g, b) = muscle.rgb();
    Color::Rgb(r, g, b)
}

fn draw_title(f: &mut Frame, area: Rect, app: &App, snap: &Snapshot) {
    let spin = if snap.readings.loading { " ⟳" } else { "" };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Line::from(vec![
            Span::styled(" myolink ", Style::default().bold().fg(Color::Cyan)),
            Span::raw("  sensor: "),
            Span::styled(app.device_url(), Style::default().bold().fg(Color::Yellow)),
            Span::styled(
                format!(
                    "  {}  {} ok / {} failed{spin} ",
                    snap.mode, snap.readings.total_reads, snap.readings.failed_reads
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    f.render_widget(block, area);
}

fn draw_tabs(f: &mut Frame, area: Rect, view: View) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, v)| Line::from(format!("{} {}", i + 1, v.title())))
        .collect();
    let selected = View::ALL.iter().position(|v| *v == view).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL))
        .select(selected)
        .highlight_style(Style::default().bold().fg(Color::Yellow));
    f.render_widget(tabs, area);
}

// ---------------------------------------------------------------------------
// Readings view
// ---------------------------------------------------------------------------

fn draw_readings(f: &mut Frame, area: Rect, snap: &Snapshot) {
    let history = &snap.readings.history;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Readings ({}/{}) ", history.len(), history.capacity()));

    if history.is_empty() {
        let text = if snap.readings.loading {
            "Loading..."
        } else {
            "No data available. Press refresh to fetch readings."
        };
        let p = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(p, area);
        return;
    }

    let items: Vec<ListItem> = history
        .numbered()
        .map(|(n, value)| {
            let color = muscle_color(myolink_core::classify(value));
            ListItem::new(Line::from(vec![
                Span::raw("Value: "),
                Span::styled(format!("{value:>6}"), Style::default().fg(color).bold()),
                Span::styled(format!("  (Reading #{n})"), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();
    f.render_widget(List::new(items).block(block), area);
}

// ---------------------------------------------------------------------------
// Muscle state view
// ---------------------------------------------------------------------------

fn draw_state(f: &mut Frame, area: Rect, snap: &Snapshot) {
    let color = muscle_color(snap.muscle);
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("  ██████████  ", Style::default().fg(color))).centered(),
        Line::from(Span::styled(
            snap.muscle.label().to_uppercase(),
            Style::default().fg(color).bold(),
        ))
        .centered(),
        Line::from(format!("Value: {}", snap.latest)).centered(),
        Line::from(""),
    ];

    for level in MuscleState::ALL {
        let marker = if level == snap.muscle { "▸ " } else { "  " };
        lines.push(
            Line::from(vec![
                Span::raw(marker),
                Span::styled("■ ", Style::default().fg(muscle_color(level))),
                Span::raw(level.scale_label()),
            ])
            .centered(),
        );
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Muscle State ")
        .border_style(Style::default().fg(color));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

// ---------------------------------------------------------------------------
// Entropy view
// ---------------------------------------------------------------------------

fn draw_entropy(f: &mut Frame, area: Rect, app: &App, snap: &Snapshot) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // status
            Constraint::Min(5),    // values
            Constraint::Length(3), // save message
        ])
        .split(area);

    let status = snap.collection.status;
    let indicator_style = if status.is_collecting() {
        Style::default().bold().fg(Color::Black).bg(Color::Red)
    } else {
        Style::default().bold().fg(Color::Cyan)
    };
    let last_update = match snap.collection.last_update {
        Some(ts) => format!("{:.1}s ago", epoch_millis().saturating_sub(ts) as f64 / 1000.0),
        None => "never".to_string(),
    };
    let status_lines = vec![
        Line::from(vec![
            Span::raw("Status: "),
            Span::styled(format!(" {} ", status.indicator()), indicator_style),
            Span::styled(
                format!(
                    "  {} values, {} skipped",
                    snap.collection.log.len(),
                    snap.collection.skipped
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(format!("Last update: {last_update}")),
    ];
    let session = Block::default().borders(Borders::ALL).title(" Session ");
    f.render_widget(Paragraph::new(status_lines).block(session), rows[0]);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Recent values (latest {}) ", snap.display.len()));
    if snap.display.is_empty() {
        let p = Paragraph::new("No values yet. Press s to start collecting.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(p, rows[1]);
    } else {
        let items: Vec<ListItem> = snap
            .collection
            .log
            .iter()
            .take(snap.display.len())
            .map(|sample| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:>14}  ", sample.timestamp_ms),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(sample.value.to_string(), Style::default().fg(Color::Yellow)),
                ]))
            })
            .collect();
        f.render_widget(List::new(items).block(block), rows[1]);
    }

    let (text, style) = match app.save_message() {
        Some(SaveMessage::Saved(msg)) => {
            (msg.replace('\n', " "), Style::default().fg(Color::Green))
        }
        Some(SaveMessage::Failed(msg)) => (msg.clone(), Style::default().fg(Color::Red)),
        None => (String::new(), Style::default()),
    };
    f.render_widget(
        Paragraph::new(text)
            .style(style)
            .block(Block::default().borders(Borders::ALL).title(" Export ")),
        rows[2],
    );
}

fn draw_keys(f: &mut Frame, area: Rect, view: View) {
    let keys = match view {
        View::Readings | View::State => {
            " r: refresh   a: toggle auto-refresh   tab/1-3: view   q: quit"
        }
        View::Entropy => " s: start   x: stop   w: save log   tab/1-3: view   q: quit",
    };
    let bar = Paragraph::new(keys).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyCode;
    use myolink_core::{AppState, Config};
    use ratatui::backend::TestBackend;
    use std::sync::Arc;

    fn render(app: &App, width: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, 30)).unwrap();
        let snap = app.snapshot();
        terminal.draw(|f| draw(f, app, &snap)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn every_view_renders() {
        let tmp = tempfile::tempdir().unwrap();
        let rt = tokio::runtime::Runtime::new().unwrap();
        let config = Config {
            device_url: "http://127.0.0.1:9".into(),
            downloads_dir: tmp.path().to_path_buf(),
            ..Default::default()
        };
        let state = Arc::new(AppState::connect(config).unwrap());
        let mut app = App::new(state, rt.handle().clone());

        let screen = render(&app, 100);
        assert!(screen.contains("No data available"));

        app.handle_key(KeyCode::Char('2'));
        let screen = render(&app, 100);
        assert!(screen.contains("RELAXED"));
        assert!(screen.contains("Slightly Strained"));

        app.handle_key(KeyCode::Char('3'));
        let screen = render(&app, 100);
        assert!(screen.contains("Ready"));
        assert!(screen.contains("Last update: never"));
    }
}
