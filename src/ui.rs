use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::Stylize,
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table},
};

use crate::model::UIData;

pub const CONTROLS_HEIGHT: u16 = 1;
pub const PAGINATION_HEIGHT: u16 = 1;
pub const STATUSLINE_HEIGHT: u16 = 1;
const SEARCH_LABEL: &str = " Search: ";
const STATUS_MESSAGE_TIMEOUT_MS: u128 = 5000;

pub fn draw(uidata: &UIData, frame: &mut Frame) {
    let [controls, table_area, pagination, statusline] = Layout::vertical([
        Constraint::Length(CONTROLS_HEIGHT),
        Constraint::Min(1),
        Constraint::Length(PAGINATION_HEIGHT),
        Constraint::Length(STATUSLINE_HEIGHT),
    ])
    .areas(frame.area());

    draw_controls(uidata, frame, controls);
    draw_table(uidata, frame, table_area);
    draw_pagination(uidata, frame, pagination);
    draw_statusline(uidata, frame, statusline);

    if uidata.show_popup {
        draw_popup(uidata, frame);
    }
}

fn draw_controls(uidata: &UIData, frame: &mut Frame, area: Rect) {
    let search = if uidata.active_input {
        uidata.input.text.as_str()
    } else {
        uidata.search_text.as_str()
    };

    let mut spans: Vec<Span> = vec![SEARCH_LABEL.bold()];
    if search.is_empty() && !uidata.active_input {
        spans.push("Search...".dim());
    } else {
        spans.push(search.into());
    }

    // The selectable options: "All" plus every distinct category.
    spans.push("  Filter: ".bold());
    let stale = !uidata.category_filter.is_empty()
        && !uidata.filter_options.contains(&uidata.category_filter);
    for (value, label) in std::iter::once(("", "All"))
        .chain(uidata.filter_options.iter().map(|o| (o.as_str(), o.as_str())))
    {
        if value == uidata.category_filter {
            spans.push(format!("[{}]", label).yellow().bold());
        } else {
            spans.push(format!(" {} ", label).into());
        }
    }
    if stale {
        spans.push(format!("[{}]", uidata.category_filter).yellow().dim());
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);

    if uidata.active_input {
        let x = area.x + SEARCH_LABEL.len() as u16 + uidata.input.cursor as u16;
        frame.set_cursor_position(Position::new(x, area.y));
    }
}

fn draw_table(uidata: &UIData, frame: &mut Frame, area: Rect) {
    let title = Line::from(format!(" {} ", uidata.title).bold());
    let instructions = Line::from(vec![
        " Search ".into(),
        "</>".blue().bold(),
        " Filter ".into(),
        "<f>".blue().bold(),
        " Help ".into(),
        "<?>".blue().bold(),
        " Quit ".into(),
        "<q> ".blue().bold(),
    ]);
    let block = Block::bordered()
        .title(title.centered())
        .title_bottom(instructions.centered())
        .border_set(border::THICK);

    if uidata.loading {
        frame.render_widget(Paragraph::new("Loading...").centered().block(block), area);
        return;
    }
    if uidata.filtered_count == 0 {
        frame.render_widget(
            Paragraph::new("No data found").centered().block(block),
            area,
        );
        return;
    }

    let header = Row::new(
        uidata
            .headers
            .iter()
            .map(|h| Cell::from(h.as_str().bold())),
    );
    let rows = uidata
        .rows
        .iter()
        .map(|row| Row::new(row.iter().map(|cell| Cell::from(cell.as_str()))));
    let widths = vec![Constraint::Fill(1); uidata.headers.len()];

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(block);
    frame.render_widget(table, area);
}

fn draw_pagination(uidata: &UIData, frame: &mut Frame, area: Rect) {
    if uidata.loading || uidata.total_pages == 0 {
        return;
    }

    let mut spans: Vec<Span> = vec!["Previous ".into(), "<p> ".blue().bold()];
    for n in 1..=uidata.total_pages {
        let label = format!(" {} ", n);
        if n == uidata.page_index {
            spans.push(label.black().on_blue().bold());
        } else {
            spans.push(label.into());
        }
    }
    spans.push(" <n> ".blue().bold());
    spans.push("Next".into());

    frame.render_widget(Paragraph::new(Line::from(spans)).centered(), area);
}

fn draw_statusline(uidata: &UIData, frame: &mut Frame, area: Rect) {
    if uidata.last_status_message_update.elapsed().as_millis() < STATUS_MESSAGE_TIMEOUT_MS {
        frame.render_widget(
            Paragraph::new(uidata.status_message.as_str().dim()),
            area,
        );
    }
    if !uidata.loading {
        let counts = format!(
            "{} rows, page {}/{}",
            uidata.filtered_count, uidata.page_index, uidata.total_pages
        );
        frame.render_widget(Paragraph::new(counts.dim()).right_aligned(), area);
    }
}

fn draw_popup(uidata: &UIData, frame: &mut Frame) {
    let area = popup_area(frame.area(), 60, 60);
    let block = Block::bordered().title(Line::from(" Help ".bold()).centered());
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(uidata.popup_message.as_str()).block(block),
        area,
    );
}

fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [_, vertical, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(area);
    let [_, rect, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(vertical);
    rect
}
