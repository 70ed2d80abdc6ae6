//! Static Chart Renderer
//! Writes a [`ChartSpec`] to a PNG image with plotters.
//!
//! Layout:
//! 1. One band per chart row, stacked vertically, `row_height_px` each
//! 2. Row title as the band caption
//! 3. Shared x axis labelled with the table's index labels

use crate::charts::spec::{
    defined_segments, ChartRow, ChartSpec, Rgb, Trace, FALLING, RISING,
};
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;
use tracing::info;

const CANDLE_WIDTH_PX: u32 = 5;
const Y_PADDING: f64 = 0.05;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Chart has no rows to render")]
    Empty,
    #[error("Drawing failed: {0}")]
    Draw(String),
}

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

fn rgb(color: Rgb) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render the chart to `path` at the given width; the height is the
    /// chart's own pixel height.
    pub fn render_png(spec: &ChartSpec, path: &Path, width: u32) -> Result<(), RenderError> {
        if spec.rows.is_empty() {
            return Err(RenderError::Empty);
        }
        let (width, height) = Self::canvas_size(spec, width);
        let palette = spec.style.palette();

        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&rgb(palette.background)).map_err(draw_err)?;

        let areas = root.split_evenly((spec.rows.len(), 1));
        for (row, area) in spec.rows.iter().zip(areas.iter()) {
            Self::draw_row(spec, row, area)?;
        }

        root.present().map_err(draw_err)?;
        info!("Rendered {}x{} chart to {}", width, height, path.display());
        Ok(())
    }

    /// Pixel dimensions for `spec`; the width is clamped to a usable minimum.
    pub fn canvas_size(spec: &ChartSpec, width: u32) -> (u32, u32) {
        (width.max(320), spec.height_px().max(1))
    }

    /// Vertical extent of a row with some headroom; flat rows get a unit span.
    fn y_range(row: &ChartRow) -> (f64, f64) {
        match row.value_range() {
            None => (0.0, 1.0),
            Some((lo, hi)) if (hi - lo).abs() < f64::EPSILON => (lo - 0.5, hi + 0.5),
            Some((lo, hi)) => {
                let pad = (hi - lo) * Y_PADDING;
                (lo - pad, hi + pad)
            }
        }
    }

    fn draw_row(
        spec: &ChartSpec,
        row: &ChartRow,
        area: &DrawingArea<BitMapBackend<'_>, plotters::coord::Shift>,
    ) -> Result<(), RenderError> {
        let palette = spec.style.palette();
        let text = rgb(palette.text);
        let n = spec.x_labels.len().max(1);
        let (y_lo, y_hi) = Self::y_range(row);

        let mut chart = ChartBuilder::on(area)
            .caption(&row.title, ("sans-serif", 16).into_font().color(&text))
            .margin(8)
            .x_label_area_size(24)
            .y_label_area_size(56)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_lo..y_hi)
            .map_err(draw_err)?;

        let labels = &spec.x_labels;
        let label_for = |x: &f64| -> String {
            let idx = x.round();
            if idx >= 0.0 && (idx as usize) < labels.len() {
                labels[idx as usize].clone()
            } else {
                String::new()
            }
        };

        chart
            .configure_mesh()
            .light_line_style(rgb(palette.grid))
            .bold_line_style(rgb(palette.grid))
            .axis_style(text)
            .label_style(("sans-serif", 11).into_font().color(&text))
            .x_labels(8)
            .x_label_formatter(&label_for)
            .draw()
            .map_err(draw_err)?;

        for trace in &row.traces {
            match trace {
                Trace::Candlestick { name, data } => {
                    chart
                        .draw_series(data.bars().map(|(i, o, h, l, c)| {
                            CandleStick::new(
                                i as f64,
                                o,
                                h,
                                l,
                                c,
                                rgb(RISING).filled(),
                                rgb(FALLING).filled(),
                                CANDLE_WIDTH_PX,
                            )
                        }))
                        .map_err(draw_err)?
                        .label(name.as_str())
                        .legend(|(x, y)| {
                            Rectangle::new([(x, y - 4), (x + 12, y + 4)], rgb(RISING).filled())
                        });
                }
                Trace::Ohlc { name, data } => {
                    chart
                        .draw_series(data.bars().map(|(i, o, h, l, c)| {
                            let x = i as f64;
                            let color = rgb(if c >= o { RISING } else { FALLING });
                            PathElement::new(
                                vec![
                                    (x - 0.3, o),
                                    (x, o),
                                    (x, l),
                                    (x, h),
                                    (x, c),
                                    (x + 0.3, c),
                                ],
                                color,
                            )
                        }))
                        .map_err(draw_err)?
                        .label(name.as_str())
                        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 12, y)], rgb(RISING)));
                }
                Trace::Bar {
                    name,
                    values,
                    color,
                } => {
                    let color = rgb(*color);
                    chart
                        .draw_series(values.iter().enumerate().filter_map(|(i, v)| {
                            let v = (*v)?;
                            let x = i as f64;
                            Some(Rectangle::new([(x - 0.4, 0.0), (x + 0.4, v)], color.filled()))
                        }))
                        .map_err(draw_err)?
                        .label(name.as_str())
                        .legend(move |(x, y)| {
                            Rectangle::new([(x, y - 4), (x + 12, y + 4)], color.filled())
                        });
                }
                Trace::Line {
                    name,
                    values,
                    color,
                } => {
                    let color = rgb(*color);
                    chart
                        .draw_series(defined_segments(values).into_iter().map(|segment| {
                            PathElement::new(
                                segment.into_iter().map(|[x, y]| (x, y)).collect::<Vec<_>>(),
                                color.stroke_width(2),
                            )
                        }))
                        .map_err(draw_err)?
                        .label(name.as_str())
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 12, y)], color));
                }
            }
        }

        if spec.show_legend && !row.traces.is_empty() {
            chart
                .configure_series_labels()
                .background_style(rgb(palette.background).mix(0.8))
                .border_style(rgb(palette.grid))
                .label_font(("sans-serif", 11).into_font().color(&text))
                .position(SeriesLabelPosition::UpperLeft)
                .draw()
                .map_err(draw_err)?;
        }

        Ok(())
    }
}
