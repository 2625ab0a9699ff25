//! Main panel for map-version management.
//!
//! Rendering only collects a [`PanelAction`]; the action is applied to the
//! state afterwards so the table is never borrowed twice.

use chrono::{DateTime, Utc};
use egui::{Color32, ComboBox, Frame, Margin, Response, RichText, ScrollArea, Stroke, Ui, Window};
use egui_extras::TableBuilder;
use log::info;
use mapconsole_business::maps::{
    MapStatus, NotificationLevel, RowPatch, VersionTable, load_maps, reload_maps,
};
use mapconsole_states::{StateCtx, Time};

use super::state::{PanelAction, VersionPanelState};
use super::table::columns::{HEADER_HEIGHT, ROW_HEIGHT, column_widths, table_columns};
use super::table::header::render_table_header;
use super::table::row::render_version_row;

/// Border color of the table frame.
const TABLE_BORDER_COLOR: Color32 = Color32::from_rgb(200, 200, 200);

/// Selectable page sizes.
const PAGE_SIZES: [u32; 4] = [10, 20, 50, 100];

/// Query parameter the status filter is sent as.
const STATUS_FILTER_KEY: &str = "mapStatus";

/// Displays notifications, toolbar, table, pagination bar and the delete
/// confirmation.
pub fn version_panel(
    state_ctx: &mut StateCtx,
    panel: &mut VersionPanelState,
    ui: &mut Ui,
) -> Response {
    if !panel.initial_load_sent {
        panel.initial_load_sent = true;
        reload_maps(state_ctx);
    }

    let mut action = None;
    let response = ui.vertical(|ui| {
        let Ok(table) = state_ctx.try_state_mut::<VersionTable>() else {
            ui.colored_label(Color32::RED, "map version table is not registered");
            return;
        };

        merge(&mut action, render_notifications(ui, table));
        merge(&mut action, render_toolbar(ui, table, panel.status_filter));
        ui.add_space(8.0);
        merge(&mut action, render_table(ui, table));
        ui.add_space(4.0);
        merge(&mut action, render_pagination(ui, table));
    });

    if let Some(key) = panel.pending_delete.clone() {
        merge(&mut action, show_delete_modal(ui, panel, &key));
    }

    if let Some(action) = action {
        let now = state_ctx
            .try_state::<Time>()
            .map_or_else(|_| Utc::now(), Time::now);
        apply_action(state_ctx, panel, action, now);
    }

    response.response
}

fn merge(slot: &mut Option<PanelAction>, action: Option<PanelAction>) {
    if action.is_some() {
        *slot = action;
    }
}

fn render_notifications(ui: &mut Ui, table: &VersionTable) -> Option<PanelAction> {
    let mut action = None;
    for (index, notification) in table.notifications().iter().enumerate() {
        let color = match notification.level {
            NotificationLevel::Info => Color32::from_rgb(34, 139, 34),
            NotificationLevel::Error => Color32::RED,
        };
        ui.horizontal(|ui| {
            ui.colored_label(color, &notification.message);
            if ui.small_button("✕").clicked() {
                action = Some(PanelAction::DismissNotification(index));
            }
        });
    }
    action
}

fn status_filter_text(status: Option<MapStatus>) -> &'static str {
    status.map_or("全部", MapStatus::label)
}

fn render_toolbar(
    ui: &mut Ui,
    table: &VersionTable,
    status_filter: Option<MapStatus>,
) -> Option<PanelAction> {
    let mut action = None;
    ui.horizontal(|ui| {
        if ui.button("刷新").clicked() {
            action = Some(PanelAction::Reload);
        }
        if ui.button("新增").clicked() {
            action = Some(PanelAction::AddRow);
        }

        ui.separator();
        let mut selected = status_filter;
        ComboBox::from_label("状态")
            .selected_text(status_filter_text(selected))
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut selected, None, status_filter_text(None));
                for status in MapStatus::ALL {
                    ui.selectable_value(&mut selected, Some(status), status.label());
                }
            });
        if selected != status_filter {
            action = Some(PanelAction::Filter(selected));
        }

        if table.is_loading() {
            ui.spinner();
            ui.label("加载中...");
        }
    });
    action
}

fn render_table(ui: &mut Ui, table: &mut VersionTable) -> Option<PanelAction> {
    let mut action = None;
    let width_overrides = table.widths().clone();
    let widths = column_widths(&width_overrides);
    let params = table.params().clone();
    let editing = table.editing_key();
    let error = table.commit_error().cloned();
    let mut draft = table.draft().cloned();

    Frame::NONE
        .stroke(Stroke::new(1.0, TABLE_BORDER_COLOR))
        .inner_margin(Margin::ZERO)
        .show(ui, |ui| {
            ScrollArea::horizontal().show(ui, |ui| {
                let mut builder = TableBuilder::new(ui)
                    .id_salt("map_versions_table")
                    .striped(true)
                    .cell_layout(egui::Layout::left_to_right(egui::Align::Center));
                for column in table_columns(&widths) {
                    builder = builder.column(column);
                }

                builder
                    .header(HEADER_HEIGHT, |mut header| {
                        merge(
                            &mut action,
                            render_table_header(&mut header, &params, &width_overrides),
                        );
                    })
                    .body(|mut body| {
                        for row in table.rows() {
                            let row_draft = if editing
                                .is_some_and(|key| key.as_str() == row.map_version_id)
                            {
                                draft.as_mut()
                            } else {
                                None
                            };
                            body.row(ROW_HEIGHT, |mut table_row| {
                                merge(
                                    &mut action,
                                    render_version_row(
                                        &mut table_row,
                                        row,
                                        row_draft,
                                        error.as_ref(),
                                    ),
                                );
                            });
                        }
                    });
            });
        });

    if table.rows().is_empty() && !table.is_loading() {
        ui.weak("暂无数据");
    }

    if let (Some(edited), Some(slot)) = (draft, table.draft_mut()) {
        *slot = edited;
    }
    action
}

fn render_pagination(ui: &mut Ui, table: &VersionTable) -> Option<PanelAction> {
    let mut action = None;
    let pagination = table.pagination();
    ui.horizontal(|ui| {
        ui.label(format!("共 {} 条", pagination.total));

        if ui
            .add_enabled(pagination.has_previous(), egui::Button::new("上一页"))
            .clicked()
        {
            action = Some(PanelAction::Page(pagination.current - 1));
        }
        ui.label(format!(
            "第 {} / {} 页",
            pagination.current,
            pagination.page_count()
        ));
        if ui
            .add_enabled(pagination.has_next(), egui::Button::new("下一页"))
            .clicked()
        {
            action = Some(PanelAction::Page(pagination.current + 1));
        }

        let mut page_size = pagination.page_size;
        ComboBox::from_id_salt("map_versions_page_size")
            .selected_text(format!("{page_size} 条/页"))
            .show_ui(ui, |ui| {
                for size in PAGE_SIZES {
                    ui.selectable_value(&mut page_size, size, format!("{size} 条/页"));
                }
            });
        if page_size != pagination.page_size {
            action = Some(PanelAction::PageSize(page_size));
        }
    });
    action
}

fn show_delete_modal(ui: &mut Ui, panel: &mut VersionPanelState, key: &str) -> Option<PanelAction> {
    let mut action = None;
    let mut open = true;

    Window::new("删除地图版本")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .show(ui.ctx(), |ui| {
            ui.label(format!("确定删除地图版本 {key} 吗？"));
            ui.add_space(16.0);
            ui.horizontal(|ui| {
                if ui
                    .button(RichText::new("确定").color(Color32::RED))
                    .clicked()
                {
                    action = Some(PanelAction::ConfirmDelete(key.to_owned()));
                }
                if ui.button("取消").clicked() {
                    panel.pending_delete = None;
                }
            });
        });

    if !open {
        panel.pending_delete = None;
    }
    action
}

/// Apply one user action to the table and, for paging, sorting and
/// filtering, start a new load.
pub fn apply_action(
    state_ctx: &mut StateCtx,
    panel: &mut VersionPanelState,
    action: PanelAction,
    now: DateTime<Utc>,
) {
    let params = match state_ctx.try_state::<VersionTable>() {
        Ok(table) => table.params().clone(),
        Err(err) => {
            log::error!("cannot apply {action:?}: {err}");
            return;
        }
    };

    match action {
        PanelAction::Reload => {
            reload_maps(state_ctx);
        }
        PanelAction::Sort(field) => {
            load_maps(state_ctx, params.toggle_sort(field));
        }
        PanelAction::Page(page) => {
            load_maps(state_ctx, params.with_page(page));
        }
        PanelAction::PageSize(page_size) => {
            load_maps(state_ctx, params.with_page_size(page_size));
        }
        PanelAction::Filter(status) => {
            panel.status_filter = status;
            let value = status.map(|status| status.code().to_string());
            load_maps(state_ctx, params.with_filter(STATUS_FILTER_KEY, value));
        }
        PanelAction::Delete(key) => {
            panel.pending_delete = Some(key);
        }
        PanelAction::ConfirmDelete(key) => {
            panel.pending_delete = None;
            state_ctx.update::<VersionTable>(|table| match table.delete_row(&key) {
                Ok(_) => {
                    info!("deleted map version {key}");
                    table.notify(NotificationLevel::Info, format!("已删除 {key}"), now);
                }
                Err(err) => table.report(&err, now),
            });
        }
        action => {
            state_ctx.update::<VersionTable>(|table| apply_table_action(table, action, now));
        }
    }
}

fn apply_table_action(table: &mut VersionTable, action: PanelAction, now: DateTime<Utc>) {
    let result = match action {
        PanelAction::AddRow => table.add_row().map(|_| ()),
        PanelAction::Edit(key) => table.begin_edit(&key),
        PanelAction::Save(key) => table.commit_edit(&key, &RowPatch::new()),
        PanelAction::Cancel(key) => table.cancel_edit(&key),
        PanelAction::Publish(key) => table.publish(&key),
        PanelAction::TakeOffline(key) => table.take_offline(&key),
        PanelAction::Resize { index, width } => table.resize_column(index, width).map(|_| ()),
        PanelAction::ResetWidth(index) => {
            table.reset_column_width(index);
            Ok(())
        }
        PanelAction::DismissNotification(index) => {
            table.dismiss_notification(index);
            Ok(())
        }
        other => {
            log::warn!("{other:?} is not a table action");
            Ok(())
        }
    };
    if let Err(err) = result {
        table.report(&err, now);
    }
}
