use std::time::Duration;

use chrono::{DateTime, Local};
use egui::Color32;
use egui_plot::{Line, Plot, PlotPoints};

use crate::acquisition::{Acquisition, AppMsg};
use crate::updater::PlotUpdater;

pub const WINDOW_TITLE: &str = "live plot from serial";

/// White background with blue text and axis labels.
pub fn plot_visuals() -> egui::Visuals {
    let mut visuals = egui::Visuals::light();
    visuals.override_text_color = Some(Color32::BLUE);
    visuals
}

pub struct PlotApp {
    acquisition: Option<Acquisition>,
    updater: PlotUpdater,
    status: String,
    last_received: Option<DateTime<Local>>,
    tick: Duration,
}

impl PlotApp {
    pub fn new(acquisition: Acquisition, tick: Duration) -> Self {
        PlotApp {
            status: format!("Waiting for {}", acquisition.source()),
            acquisition: Some(acquisition),
            updater: PlotUpdater::new(),
            last_received: None,
            tick,
        }
    }

    /// Drains everything the worker has queued. Returns the number of lines
    /// handed to the updater.
    pub fn poll(&mut self) -> usize {
        let Some(acquisition) = self.acquisition.as_mut() else {
            return 0;
        };

        let mut lines = 0;
        while let Some(msg) = acquisition.try_recv() {
            match msg {
                AppMsg::Line(line) => {
                    self.updater.on_line(&line.text);
                    self.last_received = Some(line.received);
                    lines += 1;
                }
                AppMsg::Status(s) => self.status = s,
            }
        }

        lines
    }

    pub fn updater(&self) -> &PlotUpdater {
        &self.updater
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    fn is_running(&self) -> bool {
        self.acquisition.as_ref().is_some_and(|a| a.is_running())
    }

    fn can_stop(&self) -> bool {
        self.acquisition
            .as_ref()
            .is_some_and(|a| a.is_running() && !a.stop_requested())
    }

    fn status_line(&self) -> String {
        let samples = self.updater.samples();
        let last = match samples.last() {
            Some(v) => format!("{v} ns"),
            None => "-".to_string(),
        };
        let received = match self.last_received {
            Some(t) => t.format("%H:%M:%S").to_string(),
            None => "-".to_string(),
        };

        format!(
            "{} | samples: {} | last: {} at {} | ignored: {} | malformed: {}",
            self.status,
            samples.len(),
            last,
            received,
            self.updater.ignored(),
            self.updater.malformed(),
        )
    }
}

impl eframe::App for PlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll();

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(self.can_stop(), egui::Button::new("Stop"))
                    .clicked()
                {
                    if let Some(a) = &self.acquisition {
                        a.stop();
                    }
                }
                if let Some(a) = &self.acquisition {
                    ui.label(a.source());
                }
            });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(self.status_line());
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let points: PlotPoints = self.updater.samples().points().collect();
            Plot::new("offset_plot")
                .x_axis_label("sample")
                .y_axis_label("offset [ns]")
                .show(ui, |plot_ui| {
                    plot_ui.line(Line::new("nanoseconds", points).color(Color32::RED));
                });
        });

        ctx.request_repaint_after(self.tick);
    }
}
