use crate::store::NameStore;
use tokio::runtime::Handle;

#[cfg(feature = "ui")]
use crate::form::{AddNameForm, Feedback};
#[cfg(feature = "ui")]
use crate::generator::{Connection, NameGenerator};
#[cfg(feature = "ui")]
use crate::model::Gender;
#[cfg(feature = "ui")]
use eframe::egui;

#[cfg(feature = "ui")]
pub struct GeneratorApp {
    generator: NameGenerator,
    form: AddNameForm,
}

#[cfg(feature = "ui")]
pub fn run_app(store: NameStore, handle: Handle) -> anyhow::Result<()> {
    let options = eframe::NativeOptions::default();
    let _ = eframe::run_native(
        "Irish Baby Name Generator",
        options,
        Box::new(move |_cc| Box::new(GeneratorApp::new(store, handle))),
    );
    Ok(())
}

#[cfg(feature = "ui")]
impl GeneratorApp {
    fn new(store: NameStore, handle: Handle) -> Self {
        GeneratorApp {
            generator: NameGenerator::new(store.clone(), handle.clone()),
            form: AddNameForm::new(store, handle),
        }
    }

    fn draw_connection_status(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            match self.generator.connection() {
                Connection::Pending => {
                    ui.spinner();
                    ui.label("Connecting to the database...");
                }
                Connection::Ready => {
                    ui.colored_label(egui::Color32::GREEN, "●");
                    ui.label("Connected");
                }
                Connection::Failed => {
                    ui.colored_label(egui::Color32::RED, "●");
                    ui.label("Offline");
                }
            }
        });
    }

    fn draw_generator(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            let label = if self.generator.is_loading() {
                "Generating..."
            } else {
                "Generate Name"
            };
            if ui
                .add_enabled(self.generator.can_generate(), egui::Button::new(label))
                .clicked()
            {
                self.generator.request_name();
            }

            if self.generator.is_loading() {
                ui.spinner();
            }

            if let Some(message) = self.generator.error() {
                ui.add_space(4.0);
                ui.colored_label(egui::Color32::RED, message);
            }

            if let Some(record) = self.generator.current() {
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    ui.heading(&record.name);
                    ui.label(&record.meaning);
                    let badge = match record.gender {
                        Gender::Boy => egui::Color32::LIGHT_BLUE,
                        Gender::Girl => egui::Color32::LIGHT_RED,
                    };
                    ui.colored_label(badge, record.gender.label());
                });
            }
        });
    }

    fn draw_form(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.heading("Add a Name");
            ui.separator();

            ui.horizontal(|ui| {
                ui.label("Name:");
                ui.text_edit_singleline(&mut self.form.name);
            });
            ui.horizontal(|ui| {
                ui.label("Meaning:");
                ui.text_edit_singleline(&mut self.form.meaning);
            });
            egui::ComboBox::from_label("Gender")
                .selected_text(self.form.gender.label())
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.form.gender, Gender::Boy, "Boy");
                    ui.selectable_value(&mut self.form.gender, Gender::Girl, "Girl");
                });

            ui.add_space(4.0);
            let label = if self.form.is_submitting() { "Adding..." } else { "Add Name" };
            if ui
                .add_enabled(!self.form.is_submitting(), egui::Button::new(label))
                .clicked()
            {
                self.form.submit();
            }

            if let Some(feedback) = self.form.feedback() {
                ui.add_space(4.0);
                match feedback {
                    Feedback::Success(text) => {
                        ui.colored_label(egui::Color32::GREEN, text);
                    }
                    Feedback::Error(text) => {
                        ui.colored_label(egui::Color32::RED, text);
                    }
                }
            }
        });
    }
}

#[cfg(feature = "ui")]
impl eframe::App for GeneratorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.generator.poll();
        self.form.poll();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Irish Baby Name Generator");
                ui.label("Discover beautiful Irish names for your little one");
            });
            ui.separator();

            self.draw_connection_status(ui);
            ui.separator();

            self.draw_generator(ui);
            ui.add_space(12.0);
            self.draw_form(ui);
        });

        // Probe and fetch results arrive between frames; keep polling.
        ctx.request_repaint_after(std::time::Duration::from_millis(200));
    }
}

#[cfg(not(feature = "ui"))]
pub fn run_app(_store: NameStore, _handle: Handle) -> anyhow::Result<()> {
    tracing::info!("UI requires 'ui' feature. Build with: cargo build --features ui");
    Ok(())
}
