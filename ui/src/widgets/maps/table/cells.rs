//! Cell rendering functions for the map-version table.

use egui::{Color32, RichText, Stroke, StrokeKind, TextEdit, Ui};
use mapconsole_business::maps::{Field, MapStatus, RowPatch, TableError, descriptor};

use crate::widgets::maps::state::PanelAction;

/// Read-only text cell. Long values are clipped; hover shows the full text.
#[inline]
pub fn render_text_cell(ui: &mut Ui, text: &str) {
    let response = ui.label(text);
    if !text.is_empty() {
        response.on_hover_text(text);
    }
}

#[inline]
pub fn render_status_cell(ui: &mut Ui, status: Option<MapStatus>) {
    let Some(status) = status else {
        ui.label("-");
        return;
    };
    ui.label(RichText::new(status.label()).color(status_color(status)));
}

#[inline]
fn status_color(status: MapStatus) -> Color32 {
    match status {
        MapStatus::Online => Color32::from_rgb(34, 139, 34),
        MapStatus::GrayRelease => Color32::from_rgb(255, 165, 0),
        MapStatus::Offline => Color32::GRAY,
    }
}

/// Text input bound to one draft field. The offending field of a failed
/// save gets a red outline and the error as tooltip.
pub fn render_edit_cell(ui: &mut Ui, draft: &mut RowPatch, field: Field, error: Option<&TableError>) {
    let Some(value) = draft.get_mut(field) else {
        return;
    };
    let response = ui.add(
        TextEdit::singleline(value)
            .hint_text(descriptor(field).title)
            .desired_width(f32::INFINITY),
    );

    if let Some(err) = error.filter(|err| err.field() == Some(field)) {
        ui.painter().rect_stroke(
            response.rect,
            2.0,
            Stroke::new(1.5, Color32::RED),
            StrokeKind::Outside,
        );
        response.on_hover_text(err.to_string());
    }
}

/// 编辑 / 删除 / 发布 / 下线 for idle rows, 保存 / 取消 for the row under edit.
pub fn render_action_buttons(
    ui: &mut Ui,
    key: &str,
    status: Option<MapStatus>,
    editing: bool,
) -> Option<PanelAction> {
    let mut action = None;
    ui.horizontal(|ui| {
        if editing {
            if ui.button("保存").clicked() {
                action = Some(PanelAction::Save(key.to_owned()));
            }
            if ui.button("取消").clicked() {
                action = Some(PanelAction::Cancel(key.to_owned()));
            }
            return;
        }

        if ui.button("编辑").clicked() {
            action = Some(PanelAction::Edit(key.to_owned()));
        }
        if ui
            .button(RichText::new("删除").color(Color32::RED))
            .clicked()
        {
            action = Some(PanelAction::Delete(key.to_owned()));
        }
        if status != Some(MapStatus::Online) && ui.button("发布").clicked() {
            action = Some(PanelAction::Publish(key.to_owned()));
        }
        if status != Some(MapStatus::Offline) && ui.button("下线").clicked() {
            action = Some(PanelAction::TakeOffline(key.to_owned()));
        }
    });
    action
}
