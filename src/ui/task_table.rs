use egui::{Align2, Color32, Pos2, Rect, RichText, Sense, Stroke, Ui, Vec2};

use gantt_timeline::engine::VirtualItem;
use gantt_timeline::model::{Row, RowId};

use crate::tasks::Task;
use crate::ui::palette;

/// Actions that the task table can request.
pub enum TaskTableAction {
    None,
    Select(RowId),
}

/// Render the left-side task table.
///
/// Only the realized rows are drawn, offset by the chart's vertical scroll so
/// both panels stay aligned row for row.
pub fn show_task_table(
    rows: &[Row<'_, Task>],
    items: &[VirtualItem],
    scroll_y: f32,
    selected: Option<&RowId>,
    ui: &mut Ui,
) -> TaskTableAction {
    let mut action = TaskTableAction::None;

    // Column headers, as tall as the chart's timeline header.
    let (header, _) = ui.allocate_exact_size(
        Vec2::new(ui.available_width(), palette::HEADER_HEIGHT),
        Sense::hover(),
    );
    let painter = ui.painter();
    painter.rect_filled(header, 0.0, palette::HEADER_BAND);
    painter.text(
        Pos2::new(header.left() + 8.0, header.top() + 12.0),
        Align2::LEFT_CENTER,
        format!("Tasks ({})", rows.iter().filter(|r| !r.is_group()).count()),
        palette::heading_font(),
        palette::INK,
    );
    let columns = column_layout(header);
    for (label, x) in [("TASK", columns.name), ("START", columns.start), ("END", columns.end)] {
        painter.text(
            Pos2::new(x, header.bottom() - 10.0),
            Align2::LEFT_CENTER,
            label,
            palette::caption_font(),
            palette::INK_FAINT,
        );
    }
    painter.line_segment([header.left_bottom(), header.right_bottom()], Stroke::new(1.0, palette::RULE));

    let (body, _) = ui.allocate_exact_size(ui.available_size(), Sense::hover());
    let painter = ui.painter_at(body);
    let columns = column_layout(body);

    for item in items {
        let Some(row) = rows.get(item.index) else {
            continue;
        };
        let top = body.top() + item.start - scroll_y;
        let rect = Rect::from_min_size(Pos2::new(body.left(), top), Vec2::new(body.width(), item.size));
        if !rect.intersects(body) {
            continue;
        }

        let is_selected = selected == Some(row.row_id());
        let fill = if is_selected {
            palette::SELECTION
        } else if row.is_group() {
            palette::STORY_ROW
        } else if item.index % 2 == 0 {
            palette::PANEL
        } else {
            palette::CANVAS
        };
        painter.rect_filled(rect, 0.0, fill);
        painter.line_segment([rect.left_bottom(), rect.right_bottom()], Stroke::new(0.5, palette::RULE));

        let y = rect.center().y;
        match row {
            Row::Group { value, leaves, .. } => {
                painter.text(
                    Pos2::new(columns.name - 4.0, y),
                    Align2::LEFT_CENTER,
                    format!("▾ {value}  ({})", leaves.len()),
                    palette::bar_font(),
                    palette::INK,
                );
            }
            Row::Leaf { record, .. } => {
                painter.circle_filled(Pos2::new(columns.name, y), 3.0, record.color);
                let name_clip = Rect::from_x_y_ranges(columns.name + 8.0..=columns.start - 6.0, rect.y_range());
                painter.with_clip_rect(name_clip.intersect(body)).text(
                    Pos2::new(columns.name + 8.0, y),
                    Align2::LEFT_CENTER,
                    &record.name,
                    palette::bar_font(),
                    if is_selected { Color32::WHITE } else { palette::INK },
                );
                let format = |d: Option<chrono::NaiveDate>| d.map_or("–".to_string(), |d| d.format("%m/%d").to_string());
                painter.text(
                    Pos2::new(columns.start, y),
                    Align2::LEFT_CENTER,
                    format(record.start),
                    palette::label_font(),
                    palette::INK_MUTED,
                );
                painter.text(
                    Pos2::new(columns.end, y),
                    Align2::LEFT_CENTER,
                    format(record.end),
                    palette::label_font(),
                    palette::INK_MUTED,
                );
            }
        }

        // Make entire row clickable
        let row_click = ui.interact(
            rect.intersect(body),
            egui::Id::new(("task-row", row.row_id().as_str())),
            Sense::click(),
        );
        if row_click.clicked() {
            action = TaskTableAction::Select(row.row_id().clone());
        }
    }

    if rows.is_empty() {
        ui.put(body, egui::Label::new(RichText::new("No tasks").color(palette::INK_FAINT)));
    }

    action
}

struct Columns {
    name: f32,
    start: f32,
    end: f32,
}

fn column_layout(rect: Rect) -> Columns {
    Columns {
        name: rect.left() + 12.0,
        start: rect.right() - 96.0,
        end: rect.right() - 48.0,
    }
}
