use std::path::{Path, PathBuf};
use std::time::Duration;

use eframe::{egui, App, Frame};
use egui::{Align2, Color32, RichText, TextStyle};

use codepad_core::{
    DocumentId, LanguageHint, SaveRequest, SessionError, SessionEvent, SessionManager,
};
use codepad_project::DirectoryEntry;
use codepad_settings::{
    PreferencesStore, SchemeCatalog, SchemeSubscription, StyleScheme, WindowGeometry,
};

use crate::actions::{self, Action, MENU};
use crate::style::{color32, visuals_for};
use crate::title::{window_title, APP_TITLE};

const TOAST_SECONDS: f64 = 3.0;
const BUSY_REPAINT: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToastKind {
    Info,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    message: String,
    kind: ToastKind,
    expires_at: f64,
}

/// Snapshot of one tab taken before drawing, so the strip can be rendered while
/// the manager is mutated by clicks.
struct TabView {
    id: DocumentId,
    label: String,
    tooltip: String,
    active: bool,
}

enum TabClick {
    Activate(DocumentId),
    Close(DocumentId),
}

pub struct CodepadApp {
    manager: SessionManager,
    preferences: PreferencesStore,
    scheme_updates: SchemeSubscription,
    catalog: SchemeCatalog,
    palette_scheme: StyleScheme,
    show_sidebar: bool,
    show_preferences: bool,
    show_about: bool,
    toasts: Vec<Toast>,
    title: String,
    geometry: WindowGeometry,
}

impl CodepadApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        manager: SessionManager,
        mut preferences: PreferencesStore,
        catalog: SchemeCatalog,
    ) -> Self {
        let scheme_updates = preferences.subscribe();
        let palette_scheme = catalog.resolve(preferences.style_scheme()).clone();
        cc.egui_ctx.set_visuals(visuals_for(&palette_scheme));
        let geometry = preferences.preferences().window;
        Self {
            manager,
            preferences,
            scheme_updates,
            catalog,
            palette_scheme,
            show_sidebar: true,
            show_preferences: false,
            show_about: false,
            toasts: Vec::new(),
            title: APP_TITLE.to_string(),
            geometry,
        }
    }

    fn perform(&mut self, ctx: &egui::Context, action: Action) {
        tracing::debug!(?action, "action");
        let now = ctx_time(ctx);
        match action {
            Action::NewDocument => {
                self.manager.new_document();
            }
            Action::OpenFile => {
                if let Some(path) = rfd::FileDialog::new()
                    .set_title("Open File")
                    .pick_file()
                {
                    self.open(now, path);
                }
            }
            Action::OpenFolder => {
                if let Some(path) = rfd::FileDialog::new()
                    .set_title("Open Folder")
                    .pick_folder()
                {
                    self.open(now, path);
                }
            }
            Action::Save => self.save_active(now, false),
            Action::SaveAs => self.save_active(now, true),
            Action::ToggleSidebar => self.show_sidebar = !self.show_sidebar,
            Action::Preferences => self.show_preferences = true,
            Action::About => self.show_about = true,
            Action::Quit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
        }
    }

    fn open(&mut self, now: f64, path: PathBuf) {
        if let Err(err) = self.manager.request_open(path) {
            self.report(now, &err);
        }
    }

    /// Saves the active document, prompting for a destination when it has none
    /// or when `force_prompt` is set.
    fn save_active(&mut self, now: f64, force_prompt: bool) {
        let Some(doc) = self.manager.session().active_document() else {
            return;
        };
        let id = doc.id();
        let suggested = doc.title().to_string();
        let directory = doc
            .associated_file()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .or_else(|| self.manager.session().root_folder().map(Path::to_path_buf));

        let answer = if force_prompt {
            Ok(SaveRequest::NeedsDestination)
        } else {
            self.manager.request_save(id)
        };
        let answer = match answer {
            Ok(SaveRequest::NeedsDestination) => {
                let mut dialog = rfd::FileDialog::new()
                    .set_title("Save As")
                    .set_file_name(suggested.as_str());
                if let Some(directory) = directory {
                    dialog = dialog.set_directory(directory);
                }
                match dialog.save_file() {
                    Some(path) => self.manager.request_save_as(id, path),
                    None => return,
                }
            }
            other => other,
        };
        if let Err(err) = answer {
            self.report(now, &err);
        }
    }

    fn drain_completions(&mut self, now: f64) {
        for outcome in self.manager.poll() {
            match outcome {
                Ok(SessionEvent::DocumentOpened(_)) => {}
                Ok(SessionEvent::FolderOpened { root, summary }) => self.toast(
                    now,
                    ToastKind::Info,
                    format!(
                        "Opened {}: {} files, {} folders",
                        display_name(&root),
                        summary.files,
                        summary.directories
                    ),
                ),
                Ok(SessionEvent::Saved { path, .. }) => self.toast(
                    now,
                    ToastKind::Info,
                    format!("Saved {}", display_name(&path)),
                ),
                Err(err) => self.report(now, &err),
            }
        }
    }

    fn report(&mut self, now: f64, err: &SessionError) {
        tracing::warn!(error = %err, "operation failed");
        self.toast(now, ToastKind::Error, err.to_string());
    }

    fn toast(&mut self, now: f64, kind: ToastKind, message: String) {
        self.toasts.push(Toast {
            message,
            kind,
            expires_at: now + TOAST_SECONDS,
        });
    }

    fn apply_scheme_updates(&mut self, ctx: &egui::Context) {
        if let Some(id) = self.scheme_updates.latest() {
            self.palette_scheme = self.catalog.resolve(&id).clone();
            tracing::info!(scheme = self.palette_scheme.id, "style scheme applied");
            ctx.set_visuals(visuals_for(&self.palette_scheme));
        }
    }

    fn sync_title(&mut self, ctx: &egui::Context) {
        let title = window_title(self.manager.session().root_folder());
        if title != self.title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.title = title;
        }
    }

    fn track_geometry(&mut self, ctx: &egui::Context) {
        let (inner, maximized) =
            ctx.input(|input| (input.viewport().inner_rect, input.viewport().maximized));
        let maximized = maximized.unwrap_or(false);
        self.geometry.maximized = maximized;
        if let Some(rect) = inner.filter(|_| !maximized) {
            self.geometry.width = rect.width().round() as u32;
            self.geometry.height = rect.height().round() as u32;
        }
    }

    fn show_menu_bar(&mut self, ctx: &egui::Context) {
        let mut chosen = None;
        egui::TopBottomPanel::top("menu_bar")
            .resizable(false)
            .show(ctx, |ui| {
                egui::menu::bar(ui, |ui| {
                    for section in MENU {
                        ui.menu_button(section.title, |ui| {
                            for action in section.actions {
                                let mut button = egui::Button::new(action.label());
                                if let Some(shortcut) = action.shortcut() {
                                    button = button.shortcut_text(ctx.format_shortcut(&shortcut));
                                }
                                if ui.add(button).clicked() {
                                    chosen = Some(*action);
                                    ui.close_menu();
                                }
                            }
                        });
                    }
                });
            });
        if let Some(action) = chosen {
            self.perform(ctx, action);
        }
    }

    fn show_project_panel(&mut self, ctx: &egui::Context) {
        let mut clicked = None;
        let mut open_folder = false;
        let active_path = self
            .manager
            .session()
            .active_document()
            .and_then(|doc| doc.associated_file())
            .map(Path::to_path_buf);
        egui::SidePanel::left("project_panel")
            .default_width(220.0)
            .resizable(true)
            .show_animated(ctx, self.show_sidebar, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.manager.session().tree() {
                        Some(tree) => {
                            ui.heading(display_name(&tree.full_path));
                            ui.separator();
                            for child in &tree.children {
                                render_tree_node(ui, child, active_path.as_deref(), &mut clicked);
                            }
                        }
                        None => {
                            ui.add_space(8.0);
                            if ui.button(Action::OpenFolder.label()).clicked() {
                                open_folder = true;
                            }
                        }
                    }
                });
            });
        if open_folder {
            self.perform(ctx, Action::OpenFolder);
        }
        if let Some(path) = clicked {
            if let Err(err) = self.manager.request_open_tree_entry(&path) {
                self.report(ctx_time(ctx), &err);
            }
        }
    }

    fn show_tab_strip(&mut self, ui: &mut egui::Ui) {
        let session = self.manager.session();
        let active = session.active_document().map(|doc| doc.id());
        let tabs: Vec<TabView> = session
            .documents()
            .iter()
            .map(|doc| TabView {
                id: doc.id(),
                label: if doc.has_unsaved_changes() {
                    format!("• {}", doc.title())
                } else {
                    doc.title().to_string()
                },
                tooltip: tab_tooltip(&doc.tooltip(), doc.language()),
                active: Some(doc.id()) == active,
            })
            .collect();

        let mut click = None;
        egui::ScrollArea::horizontal().show(ui, |ui| {
            ui.horizontal(|ui| {
                for tab in &tabs {
                    let text = if tab.active {
                        RichText::new(&tab.label).strong()
                    } else {
                        RichText::new(&tab.label)
                    };
                    if ui
                        .selectable_label(tab.active, text)
                        .on_hover_text(&tab.tooltip)
                        .clicked()
                    {
                        click = Some(TabClick::Activate(tab.id));
                    }
                    let close = egui::Button::new(RichText::new("✕").small()).frame(false);
                    if ui.add(close).on_hover_text("Close").clicked() {
                        click = Some(TabClick::Close(tab.id));
                    }
                    ui.add_space(6.0);
                }
            });
        });

        let result = match click {
            Some(TabClick::Activate(id)) => self.manager.activate(id),
            Some(TabClick::Close(id)) => self.manager.close(id).map(|closed| {
                tracing::debug!(id = %closed.id(), "tab closed");
            }),
            None => Ok(()),
        };
        if let Err(err) = result {
            self.report(ui.input(|input| input.time), &err);
        }
    }

    fn show_greeter(&mut self, ctx: &egui::Context) {
        let mut chosen = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() * 0.3);
                ui.heading(APP_TITLE);
                ui.label("Open a file or folder to start editing.");
                ui.add_space(12.0);
                for action in [Action::NewDocument, Action::OpenFile, Action::OpenFolder] {
                    if ui.button(action.label()).clicked() {
                        chosen = Some(action);
                    }
                }
            });
        });
        if let Some(action) = chosen {
            self.perform(ctx, action);
        }
    }

    fn show_editor(&mut self, ctx: &egui::Context) {
        let editor = &self.preferences.preferences().editor;
        let show_line_numbers = editor.show_line_numbers;
        let highlight_current_line = editor.highlight_current_line;
        let palette = self.palette_scheme.palette;

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_tab_strip(ui);
            ui.separator();

            let Some(doc) = self.manager.session().active_document() else {
                return;
            };
            let id = doc.id();
            let mut buffer = doc.text().to_string();

            egui::Frame::none()
                .fill(color32(palette.background))
                .show(ui, |ui| {
                    egui::ScrollArea::both()
                        .id_source(("editor", id.as_u64()))
                        .auto_shrink([false, false])
                        .show(ui, |ui| {
                            ui.horizontal_top(|ui| {
                                if show_line_numbers {
                                    let count = buffer.split('\n').count();
                                    let numbers = (1..=count)
                                        .map(|line| line.to_string())
                                        .collect::<Vec<_>>()
                                        .join("\n");
                                    ui.label(
                                        RichText::new(numbers)
                                            .text_style(TextStyle::Monospace)
                                            .color(color32(palette.line_numbers)),
                                    );
                                }

                                let highlight_slot = ui.painter().add(egui::Shape::Noop);
                                let output = egui::TextEdit::multiline(&mut buffer)
                                    .code_editor()
                                    .frame(false)
                                    .desired_width(f32::INFINITY)
                                    .desired_rows(24)
                                    .show(ui);

                                if highlight_current_line {
                                    if let Some(range) = output.cursor_range {
                                        let row = output
                                            .galley
                                            .pos_from_cursor(&range.primary)
                                            .translate(output.text_draw_pos.to_vec2());
                                        let rect = egui::Rect::from_x_y_ranges(
                                            output.response.rect.x_range(),
                                            row.y_range(),
                                        );
                                        ui.painter().set(
                                            highlight_slot,
                                            egui::Shape::rect_filled(
                                                rect,
                                                0.0,
                                                color32(palette.current_line),
                                            ),
                                        );
                                    }
                                }

                                if output.response.changed() {
                                    if let Err(err) = self.manager.edit(id, buffer.clone()) {
                                        self.report(ui.input(|input| input.time), &err);
                                    }
                                }
                            });
                        });
                });
        });
    }

    fn show_preferences_window(&mut self, ctx: &egui::Context) {
        if !self.show_preferences {
            return;
        }
        let mut open = self.show_preferences;
        let mut scheme = self.preferences.style_scheme().to_string();
        let mut editor = self.preferences.preferences().editor.clone();
        let before = editor.clone();

        egui::Window::new("Preferences")
            .open(&mut open)
            .resizable(false)
            .collapsible(false)
            .default_width(320.0)
            .show(ctx, |ui| {
                ui.heading("Appearance");
                ui.separator();
                let selected = self.catalog.resolve(&scheme).name;
                egui::ComboBox::from_label("Style scheme")
                    .selected_text(selected)
                    .show_ui(ui, |ui| {
                        for candidate in self.catalog.iter() {
                            ui.selectable_value(
                                &mut scheme,
                                candidate.id.to_string(),
                                candidate.name,
                            );
                        }
                    });
                ui.add_space(8.0);
                ui.heading("Editor");
                ui.separator();
                ui.checkbox(&mut editor.show_line_numbers, "Show line numbers");
                ui.checkbox(&mut editor.highlight_current_line, "Highlight current line");
            });
        self.show_preferences = open;

        let mut result = Ok(());
        if scheme != self.preferences.style_scheme() {
            result = self.preferences.set_style_scheme(scheme);
        }
        if result.is_ok() && editor != before {
            result = self.preferences.update(|prefs| {
                prefs.editor.show_line_numbers = editor.show_line_numbers;
                prefs.editor.highlight_current_line = editor.highlight_current_line;
            });
        }
        if let Err(err) = result {
            tracing::warn!(error = %err, "failed to save preferences");
            self.toast(ctx_time(ctx), ToastKind::Error, err.to_string());
        }
    }

    fn show_about_window(&mut self, ctx: &egui::Context) {
        if !self.show_about {
            return;
        }
        let mut open = self.show_about;
        egui::Window::new(format!("About {APP_TITLE}"))
            .open(&mut open)
            .resizable(false)
            .collapsible(false)
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.heading(APP_TITLE);
                    ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                    ui.add_space(6.0);
                    ui.label("A small code editor with a project sidebar.");
                });
            });
        self.show_about = open;
    }

    fn show_toasts(&mut self, ctx: &egui::Context) {
        let now = ctx_time(ctx);
        self.toasts.retain(|toast| toast.expires_at > now);
        if self.toasts.is_empty() {
            return;
        }

        egui::Area::new("toasts")
            .anchor(Align2::CENTER_BOTTOM, [0.0, -24.0])
            .interactable(false)
            .show(ctx, |ui| {
                for toast in &self.toasts {
                    let fill = match toast.kind {
                        ToastKind::Info => ui.visuals().window_fill,
                        ToastKind::Error => Color32::from_rgb(0xa5, 0x1d, 0x2d),
                    };
                    egui::Frame::popup(ui.style()).fill(fill).show(ui, |ui| {
                        ui.label(&toast.message);
                    });
                    ui.add_space(4.0);
                }
            });

        let next = self
            .toasts
            .iter()
            .map(|toast| toast.expires_at - now)
            .fold(f64::INFINITY, f64::min);
        ctx.request_repaint_after(Duration::from_secs_f64(next.max(0.0)));
    }
}

impl App for CodepadApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        let now = ctx_time(ctx);
        self.drain_completions(now);
        self.apply_scheme_updates(ctx);

        for action in actions::pressed_actions(ctx) {
            self.perform(ctx, action);
        }

        self.sync_title(ctx);
        self.track_geometry(ctx);

        self.show_menu_bar(ctx);
        self.show_project_panel(ctx);
        if self.manager.session().is_empty() {
            self.show_greeter(ctx);
        } else {
            self.show_editor(ctx);
        }
        self.show_preferences_window(ctx);
        self.show_about_window(ctx);
        self.show_toasts(ctx);

        if self.manager.in_flight() > 0 {
            ctx.request_repaint_after(BUSY_REPAINT);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Err(err) = self.preferences.set_window_geometry(self.geometry) {
            tracing::warn!(error = %err, "failed to persist window geometry");
        }
        tracing::info!("exiting");
    }
}

fn render_tree_node(
    ui: &mut egui::Ui,
    entry: &DirectoryEntry,
    active: Option<&Path>,
    clicked: &mut Option<PathBuf>,
) {
    if entry.is_directory {
        egui::CollapsingHeader::new(&entry.name)
            .id_source(&entry.full_path)
            .default_open(false)
            .show(ui, |ui| {
                for child in &entry.children {
                    render_tree_node(ui, child, active, clicked);
                }
            });
    } else {
        let selected = active == Some(entry.full_path.as_path());
        if ui
            .selectable_label(selected, &entry.name)
            .on_hover_text(entry.full_path.display().to_string())
            .clicked()
        {
            *clicked = Some(entry.full_path.clone());
        }
    }
}

/// Tab hover text: the location, followed by the detected language when known.
fn tab_tooltip(location: &str, language: Option<&LanguageHint>) -> String {
    match language {
        Some(hint) => format!("{location}\n{}", hint.display_name),
        None => location.to_string(),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn ctx_time(ctx: &egui::Context) -> f64 {
    ctx.input(|input| input.time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use codepad_core::detect_language;

    #[test]
    fn tab_tooltip_names_the_detected_language() {
        let path = Path::new("/proj/src/main.rs");
        let hint = detect_language(path);
        assert_eq!(
            tab_tooltip("/proj/src/main.rs", hint.as_ref()),
            "/proj/src/main.rs\nRust"
        );
        assert_eq!(tab_tooltip("Untitled", None), "Untitled");
    }

    #[test]
    fn empty_sidebar_offers_the_open_folder_action() {
        assert_eq!(Action::OpenFolder.label(), "Open Folder…");
        assert!(MENU
            .iter()
            .any(|section| section.actions.contains(&Action::OpenFolder)));
    }
}
