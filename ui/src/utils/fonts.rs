use egui::{
    FontData, FontFamily,
    epaint::text::{FontInsert, FontPriority, InsertFontFamily},
};

/// CJK glyphs for column titles, status labels and buttons. Registered as a
/// fallback so the default fonts keep rendering latin text.
pub fn add_font(ctx: &egui::Context, font_data: Vec<u8>) {
    let data = FontData::from_owned(font_data);
    ctx.add_font(FontInsert::new(
        "source han serif",
        data,
        vec![InsertFontFamily {
            family: FontFamily::Proportional,
            priority: FontPriority::Lowest,
        }],
    ));
}

/// Read the font at `path` and register it.
///
/// A missing font is not fatal: the console still works, Chinese text just
/// renders as boxes.
#[cfg(not(target_arch = "wasm32"))]
pub fn load_font_file(ctx: &egui::Context, path: &str) -> bool {
    match std::fs::read(path) {
        Ok(data) => {
            log::info!("loaded font {path} ({} bytes)", data.len());
            add_font(ctx, data);
            true
        }
        Err(err) => {
            log::warn!("failed to load font {path}: {err}");
            false
        }
    }
}
