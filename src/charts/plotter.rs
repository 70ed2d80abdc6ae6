//! Chart Plotter Module
//! Interactive rendering of a [`ChartSpec`] using egui_plot.

use crate::charts::spec::{
    defined_segments, ChartRow, ChartSpec, OhlcSeries, Rgb, Trace, FALLING, RISING,
};
use egui::{Color32, Id, RichText, Stroke};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints};

/// Half-width of a candle body / OHLC tick, in bar units.
const BAR_HALF_WIDTH: f64 = 0.3;

pub fn to_color32(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

/// Draws chart specifications with egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Draw every row of `spec` top to bottom, one plot per row.
    pub fn draw_chart(ui: &mut egui::Ui, spec: &ChartSpec) {
        let palette = spec.style.palette();

        ui.scope(|ui| {
            let visuals = ui.visuals_mut();
            *visuals = if palette.dark {
                egui::Visuals::dark()
            } else {
                egui::Visuals::light()
            };
            visuals.extreme_bg_color = to_color32(palette.background);
            visuals.override_text_color = Some(to_color32(palette.text));
            visuals.widgets.noninteractive.bg_stroke.color = to_color32(palette.grid);

            ui.label(
                RichText::new(&spec.title)
                    .size(18.0)
                    .strong()
                    .color(to_color32(palette.text)),
            );
            ui.add_space(6.0);

            for (idx, row) in spec.rows.iter().enumerate() {
                Self::draw_row(ui, spec, row, idx);
                ui.add_space(4.0);
            }
        });
    }

    fn draw_row(ui: &mut egui::Ui, spec: &ChartSpec, row: &ChartRow, idx: usize) {
        if idx > 0 {
            ui.label(RichText::new(&row.title).size(13.0).strong());
        }

        let x_labels = spec.x_labels.clone();
        let mut plot = Plot::new(format!("chart_row_{}_{}", spec.title, idx))
            .height(spec.row_height_px as f32)
            .allow_scroll(false)
            .link_axis(Self::axis_group(spec), [true, false])
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (idx as usize) < x_labels.len() && mark.value.fract() == 0.0 {
                    x_labels[idx as usize].clone()
                } else {
                    String::new()
                }
            });
        if spec.show_legend {
            plot = plot.legend(Legend::default());
        }

        plot.show(ui, |plot_ui| {
            for trace in &row.traces {
                match trace {
                    Trace::Candlestick { name, data } => {
                        let (rising, falling) = Self::candle_boxes(data);
                        plot_ui.box_plot(BoxPlot::new(rising).name(name));
                        plot_ui.box_plot(BoxPlot::new(falling).name(name));
                    }
                    Trace::Ohlc { name, data } => {
                        for (i, o, h, l, c) in data.bars() {
                            let x = i as f64;
                            let color = if c >= o { RISING } else { FALLING };
                            let points: PlotPoints = vec![
                                [x - BAR_HALF_WIDTH, o],
                                [x, o],
                                [x, l],
                                [x, h],
                                [x, c],
                                [x + BAR_HALF_WIDTH, c],
                            ]
                            .into();
                            plot_ui.line(Line::new(points).color(to_color32(color)).name(name));
                        }
                    }
                    Trace::Bar {
                        name,
                        values,
                        color,
                    } => {
                        let bars: Vec<Bar> = values
                            .iter()
                            .enumerate()
                            .filter_map(|(i, v)| v.map(|v| Bar::new(i as f64, v).width(0.8)))
                            .collect();
                        plot_ui.bar_chart(
                            BarChart::new(bars)
                                .color(to_color32(*color))
                                .name(name),
                        );
                    }
                    Trace::Line {
                        name,
                        values,
                        color,
                    } => {
                        for segment in defined_segments(values) {
                            plot_ui.line(
                                Line::new(PlotPoints::from(segment))
                                    .color(to_color32(*color))
                                    .width(1.5)
                                    .name(name),
                            );
                        }
                    }
                }
            }
        });
    }

    /// Rows of one chart zoom and pan together along x.
    fn axis_group(spec: &ChartSpec) -> Id {
        Id::new(("chart_x_axis", &spec.title))
    }

    /// Candle bodies as box elements: whiskers span low..high, the box spans
    /// open..close and the median mark sits on the close.
    fn candle_boxes(data: &OhlcSeries) -> (Vec<BoxElem>, Vec<BoxElem>) {
        let mut rising = Vec::new();
        let mut falling = Vec::new();

        for (i, o, h, l, c) in data.bars() {
            let color = to_color32(if c >= o { RISING } else { FALLING });
            let elem = BoxElem::new(
                i as f64,
                BoxSpread::new(l, o.min(c), c, o.max(c), h),
            )
            .box_width(BAR_HALF_WIDTH * 2.0)
            .whisker_width(0.0)
            .fill(color.gamma_multiply(0.6))
            .stroke(Stroke::new(1.0, color));

            if c >= o {
                rising.push(elem);
            } else {
                falling.push(elem);
            }
        }
        (rising, falling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_of_one_chart_share_axis_group() {
        let chart = |title: &str| ChartSpec {
            title: title.into(),
            style: crate::charts::ChartStyle::Default,
            x_labels: vec![],
            rows: vec![],
            row_height_px: 300,
            show_legend: true,
        };
        let a = chart("Financial Chart");
        assert_eq!(ChartPlotter::axis_group(&a), ChartPlotter::axis_group(&a.clone()));
        assert_ne!(
            ChartPlotter::axis_group(&a),
            ChartPlotter::axis_group(&chart("Other"))
        );
    }

    #[test]
    fn candles_split_by_direction() {
        let data = OhlcSeries {
            open: vec![Some(1.0), Some(2.0)],
            high: vec![Some(3.0), Some(3.0)],
            low: vec![Some(0.5), Some(0.5)],
            close: vec![Some(2.0), Some(1.0)],
        };
        let (rising, falling) = ChartPlotter::candle_boxes(&data);
        assert_eq!(rising.len(), 1);
        assert_eq!(falling.len(), 1);
    }
}
