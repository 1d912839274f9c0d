use crate::interfaces::chart_model::ChartModel;
use chrono::{TimeZone, Utc};
use eframe::egui;
use egui_plot::{BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints, Polygon};

const BULL_FILL: egui::Color32 = egui::Color32::from_rgba_premultiplied(0, 90, 30, 40);
const BEAR_FILL: egui::Color32 = egui::Color32::from_rgba_premultiplied(110, 20, 20, 40);

/// Zone chart viewer: candlesticks with shaded zones on top, the
/// detection indicator in a lower pane.
pub struct ViewerApp {
    receiver: crossbeam_channel::Receiver<Result<ChartModel, String>>,
    model: Option<ChartModel>,
    error: Option<String>,
}

impl ViewerApp {
    pub fn new(receiver: crossbeam_channel::Receiver<Result<ChartModel, String>>) -> Self {
        Self {
            receiver,
            model: None,
            error: None,
        }
    }

    fn poll(&mut self) {
        if self.model.is_some() || self.error.is_some() {
            return;
        }
        match self.receiver.try_recv() {
            Ok(Ok(model)) => self.model = Some(model),
            Ok(Err(e)) => self.error = Some(e),
            Err(_) => {}
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll();

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(error) = &self.error {
                ui.centered_and_justified(|ui| {
                    ui.label(
                        egui::RichText::new(format!("Analysis failed: {}", error))
                            .color(egui::Color32::LIGHT_RED),
                    );
                });
                return;
            }

            let Some(model) = &self.model else {
                ui.centered_and_justified(|ui| {
                    ui.label("Running analysis...");
                });
                // Keep polling while the background thread works
                ctx.request_repaint_after(std::time::Duration::from_millis(100));
                return;
            };

            ui.label(
                egui::RichText::new(format!(
                    "{} — {} zones",
                    model.symbol,
                    model.spans.len()
                ))
                .strong()
                .size(16.0),
            );
            ui.add_space(6.0);

            let total_height = ui.available_height();
            render_price_pane(ui, model, total_height * 0.65);
            ui.add_space(4.0);
            render_indicator_pane(ui, model, total_height * 0.3);
        });
    }
}

fn format_time(value: f64) -> String {
    Utc.timestamp_opt(value as i64, 0)
        .single()
        .map(|dt| dt.format("%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

fn render_price_pane(ui: &mut egui::Ui, model: &ChartModel, height: f32) {
    let half_box = model.bar_step() * 0.35;

    let y_min = model.candles.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let y_max = model
        .candles
        .iter()
        .map(|c| c.high)
        .fold(f64::NEG_INFINITY, f64::max);

    Plot::new("price_pane")
        .height(height.max(240.0))
        .show_grid([true, true])
        .legend(Legend::default())
        .x_axis_formatter(|mark, _range| format_time(mark.value))
        .show(ui, |plot_ui| {
            // Zones behind the candles
            for span in &model.spans {
                let fill = match span.kind {
                    crate::domain::zones::ZoneKind::Bull => BULL_FILL,
                    crate::domain::zones::ZoneKind::Bear => BEAR_FILL,
                };
                let corners = vec![
                    [span.start_t - half_box, y_min],
                    [span.end_t + half_box, y_min],
                    [span.end_t + half_box, y_max],
                    [span.start_t - half_box, y_max],
                ];
                plot_ui.polygon(
                    Polygon::new(span.id.clone(), PlotPoints::from(corners))
                        .fill_color(fill)
                        .stroke(egui::Stroke::NONE),
                );
            }

            let mut box_elems = Vec::with_capacity(model.candles.len());
            for c in &model.candles {
                let color = if c.close >= c.open {
                    egui::Color32::GREEN
                } else {
                    egui::Color32::RED
                };
                let min_oc = c.open.min(c.close);
                let max_oc = c.open.max(c.close);
                let mid = (c.open + c.close) / 2.0;

                box_elems.push(
                    BoxElem::new(c.t, BoxSpread::new(c.low, min_oc, mid, max_oc, c.high))
                        .fill(color)
                        .stroke(egui::Stroke::new(1.0, color))
                        .box_width(half_box * 2.0),
                );
            }
            plot_ui.box_plot(BoxPlot::new(model.symbol.clone(), box_elems));
        });
}

fn render_indicator_pane(ui: &mut egui::Ui, model: &ChartModel, height: f32) {
    Plot::new("indicator_pane")
        .height(height.max(120.0))
        .show_grid([true, true])
        .legend(Legend::default())
        .x_axis_formatter(|mark, _range| format_time(mark.value))
        .show(ui, |plot_ui| {
            if let (Some(first), Some(last)) = (model.candles.first(), model.candles.last()) {
                plot_ui.line(
                    Line::new("zero", vec![[first.t, 0.0], [last.t, 0.0]])
                        .color(egui::Color32::from_gray(110)),
                );
            }

            let palette = [
                egui::Color32::from_rgb(100, 200, 255),
                egui::Color32::from_rgb(255, 165, 0),
                egui::Color32::from_rgb(190, 120, 255),
            ];
            for (i, trace) in model.traces.iter().enumerate() {
                plot_ui.line(
                    Line::new(trace.name.clone(), trace.points.clone())
                        .color(palette[i % palette.len()]),
                );
            }
        });
}
