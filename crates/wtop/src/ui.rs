use crate::theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};
use wtop_core::format::{format_metric, format_total};
use wtop_core::{App, GroupMode, InputMode, MetricName, MetricSet, Metered, Role, View};

const METRIC_WIDTH: u16 = 16;

pub fn render(f: &mut Frame, app: &App) {
    let area = f.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(2),
        ])
        .split(area);

    render_title(f, app, chunks[0]);
    render_cluster(f, app, chunks[1]);
    render_status(f, app, chunks[2]);
    if app.show_help {
        render_help(f, chunks[3]);
    } else {
        match app.view {
            View::Main => render_hosts(f, app, chunks[3]),
            View::NodeDetails => render_nodes(f, app, chunks[3]),
        }
    }
    render_footer(f, app, chunks[4]);
}

fn render_title(f: &mut Frame, app: &App, area: Rect) {
    let view = match (&app.view, &app.drill) {
        (View::NodeDetails, Some(target)) => format!("Node details: {}", target.group_key),
        _ => "Hosts".to_string(),
    };
    let line = Line::from(vec![
        Span::styled(
            "wtop",
            Style::default()
                .fg(Color::Rgb(142, 192, 124))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "  Mode: {} | View: {} | Refresh: {:.1}s",
            app.mode,
            view,
            app.schedule.interval_secs()
        )),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_cluster(f: &mut Frame, app: &App, area: Rect) {
    let lines = match &app.cluster {
        Some(snapshot) => {
            let summary = snapshot.summary();
            vec![
                Line::from(vec![
                    Span::styled(
                        format!("[{}] ", summary.status),
                        Style::default().fg(theme::cluster_status_color(&summary.status)),
                    ),
                    Span::raw(summary.identity_line()),
                ]),
                Line::from(summary.activity_line()),
            ]
        }
        None => vec![Line::from(Span::styled(
            "Cluster status unavailable",
            theme::MUTED_STYLE,
        ))],
    };
    f.render_widget(Paragraph::new(lines), area);
}

fn render_status(f: &mut Frame, app: &App, area: Rect) {
    let style = if app.status_message.starts_with("Error") {
        theme::ERROR_STYLE
    } else {
        theme::MUTED_STYLE
    };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(app.status_message.as_str(), style))),
        area,
    );
}

fn metric_header(app: &App, slot: usize, metric: MetricName) -> String {
    let marker = match app.sort.key {
        Some(key) if key == metric => format!(" {}", app.sort.direction().symbol()),
        _ => String::new(),
    };
    format!("{}:{}{}", slot + 1, metric.header(), marker)
}

fn metric_cells<T: Metered>(app: &App, row: &T) -> Vec<Cell<'static>> {
    app.columns
        .as_slice()
        .iter()
        .map(|metric| Cell::from(format_metric(*metric, row.metric(*metric))))
        .collect()
}

fn table_widths(identity: &[Constraint], metrics: usize) -> Vec<Constraint> {
    let mut widths = identity.to_vec();
    widths.extend(std::iter::repeat(Constraint::Length(METRIC_WIDTH)).take(metrics));
    widths
}

fn render_hosts(f: &mut Frame, app: &App, area: Rect) {
    let mut header = vec!["#".to_string(), "Hostname".to_string()];
    header.extend(
        app.columns
            .as_slice()
            .iter()
            .enumerate()
            .map(|(slot, metric)| metric_header(app, slot, *metric)),
    );

    let rows: Vec<Row> = app
        .hosts
        .iter()
        .enumerate()
        .map(|(idx, host)| {
            let mut cells = vec![
                Cell::from((idx + 1).to_string()),
                Cell::from(host.group_key.clone()),
            ];
            cells.extend(metric_cells(app, host));
            Row::new(cells).style(theme::zebra_row_style(idx))
        })
        .collect();

    let widths = table_widths(
        &[Constraint::Length(4), Constraint::Min(18)],
        app.columns.len(),
    );
    let title = format!("{} hosts ({})", app.mode, app.hosts.len());
    let table = Table::new(rows, widths)
        .header(Row::new(header).style(theme::HEADER_STYLE))
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(theme::SELECTED_STYLE);

    let mut state = TableState::default();
    if !app.hosts.is_empty() {
        state.select(Some(app.selected_row));
    }
    f.render_stateful_widget(table, area, &mut state);
}

fn render_nodes(f: &mut Frame, app: &App, area: Rect) {
    let backend = app.mode == GroupMode::Backend;
    let mut header = vec!["Node ID".to_string(), "Hostname".to_string()];
    if backend {
        header.push("Role".to_string());
    }
    header.extend(
        app.columns
            .as_slice()
            .iter()
            .enumerate()
            .map(|(slot, metric)| metric_header(app, slot, *metric)),
    );

    let mut rows: Vec<Row> = Vec::new();
    if let Some(totals) = &app.node_totals {
        rows.push(totals_row(app, totals, backend));
    }
    let offset = rows.len();
    let visible = app.visible_nodes();
    rows.extend(visible.iter().enumerate().map(|(idx, node)| {
        let mut cells = vec![
            Cell::from(node.node_id.clone()),
            Cell::from(node.host.clone()),
        ];
        if backend {
            let role = node.role.clone().unwrap_or_default();
            let color = theme::role_color(&role);
            cells.push(Cell::from(Span::styled(role, Style::default().fg(color))));
        }
        cells.extend(metric_cells(app, *node));
        Row::new(cells).style(theme::zebra_row_style(idx))
    }));

    let mut identity = vec![Constraint::Length(14), Constraint::Min(18)];
    if backend {
        identity.push(Constraint::Length(10));
    }
    let widths = table_widths(&identity, app.columns.len());
    let title = format!("Processes ({} of {})", visible.len(), app.nodes.len());
    let table = Table::new(rows, widths)
        .header(Row::new(header).style(theme::HEADER_STYLE))
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(theme::SELECTED_STYLE);

    let mut state = TableState::default();
    if !visible.is_empty() {
        state.select(Some(app.selected_row + offset));
    }
    f.render_stateful_widget(table, area, &mut state);
}

fn totals_row(app: &App, totals: &MetricSet, backend: bool) -> Row<'static> {
    let mut cells = vec![Cell::from("TOTAL"), Cell::from("")];
    if backend {
        cells.push(Cell::from(""));
    }
    cells.extend(
        app.columns
            .as_slice()
            .iter()
            .map(|metric| Cell::from(format_total(*metric, totals[*metric]))),
    );
    Row::new(cells).style(theme::TOTALS_STYLE)
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();
    if app.input_mode == InputMode::Command {
        lines.push(Line::from(vec![
            Span::styled("Command: ", theme::KEY_STYLE),
            Span::raw(format!(":{}", app.input)),
            Span::styled(
                "  (Enter apply, Esc cancel, <n>d drill, s<+|-><col> sort)",
                theme::MUTED_STYLE,
            ),
        ]));
    } else {
        let back = if app.view == View::NodeDetails {
            "Enter/Esc back"
        } else {
            "Enter drill"
        };
        lines.push(Line::from(Span::styled(
            format!(
                "q quit | h help | m mode | +/- refresh | 1-9 cycle | a/r add/remove | : command | s sort | {back}"
            ),
            theme::MUTED_STYLE,
        )));
    }

    if app.role_filters_active() {
        let mut spans = vec![Span::styled("Roles: ", theme::KEY_STYLE)];
        for (idx, role) in Role::ALL.iter().enumerate() {
            let visible = app.role_filters.is_visible(*role);
            let style = if visible {
                Style::default().fg(theme::role_color(role.as_str()))
            } else {
                theme::MUTED_STYLE.add_modifier(Modifier::CROSSED_OUT)
            };
            spans.push(Span::styled(
                format!("[{}] {} ", idx + 1, role.as_str()),
                style,
            ));
        }
        lines.push(Line::from(spans));
    } else {
        let columns: Vec<&str> = app.columns.as_slice().iter().map(|m| m.header()).collect();
        lines.push(Line::from(Span::styled(
            format!("Columns: {}", columns.join(", ")),
            theme::MUTED_STYLE,
        )));
    }
    f.render_widget(Paragraph::new(lines), area);
}

fn render_help(f: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Help")
        .border_style(Style::default().fg(Color::Yellow));
    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let entries = [
        ("q", "Quit"),
        ("h", "Show this help (any key closes)"),
        ("m", "Switch client / backend grouping"),
        ("+ / -", "Slow down / speed up refresh (0.5s steps)"),
        ("1-9", "Cycle the metric shown in that column"),
        ("a / r", "Add / remove a column"),
        (":<n>", "Select row n"),
        (":<n>d", "Select row n and drill into it"),
        ("s<+|-><col>", "Sort by column number or name"),
        ("Up / Down", "Move selection"),
        ("Enter", "Drill into host / return"),
        ("Esc", "Return from node details"),
        ("1 / 2 / 3", "Toggle DRIVES / COMPUTE / FRONTEND in backend details"),
    ];
    let mut text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    text.extend(entries.iter().map(|(key, action)| {
        Line::from(vec![
            Span::styled(format!("{key:<14}"), theme::KEY_STYLE),
            Span::raw(*action),
        ])
    }));

    let p = Paragraph::new(text).wrap(Wrap { trim: true });
    f.render_widget(p, inner_area);
}
