//! Chart rendering to SVG documents.
//!
//! Axis charts are drawn with plotters on its SVG backend. The track map is a
//! hand-written SVG (see [`track_map`]) since it needs no axes and one stroke
//! color per segment.

pub mod track_map;

use std::error::Error;
use std::ops::Range;

use log::debug;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};

use crate::curves::{
    DistancePoint, LapTimePoint, SpeedPoint, build_speed_curve, build_track_curve,
};
use crate::errors::FastlapError;
use crate::telemetry::Session;

pub use track_map::{ScalingAlgorithm, TrackMapConfig, TrackMapRenderer};

type DrawResult = Result<(), Box<dyn Error + Send + Sync>>;

const SPEED_LINE: RGBColor = RGBColor(31, 119, 180);
const LAP_TIME_LINE: RGBColor = RGBColor(214, 39, 40);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Axis chart dimensions (width, height) in pixels
    pub chart_size: (u32, u32),
    pub track_map: TrackMapConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            chart_size: (640, 480),
            track_map: TrackMapConfig::default(),
        }
    }
}

/// The SVG pair served for one driver's fastest lap
#[derive(Debug, Clone)]
pub struct DriverPlots {
    pub driver: String,
    pub lap_number: u32,
    pub speed_svg: String,
    pub track_svg: String,
}

/// Render the speed chart and the track map of the driver's fastest lap.
pub fn render_driver_plots(
    session: &Session,
    driver: &str,
    config: &RenderConfig,
) -> Result<DriverPlots, FastlapError> {
    let lap = session.pick_fastest(driver)?;
    debug!(
        "Rendering lap {} of {} ({} samples)",
        lap.lap_number,
        lap.driver,
        lap.telemetry.len()
    );

    let speed_curve = build_speed_curve(&lap.telemetry)?;
    let track_curve = build_track_curve(&lap.telemetry)?;

    let speed_svg = speed_chart_svg(&speed_curve, &lap.driver, config.chart_size)?;
    let title = format!(
        "{} {} - {} - Speed",
        session.info.event_name, session.info.year, lap.driver
    );
    let track_svg =
        TrackMapRenderer::with_config(config.track_map.clone()).render(&track_curve, &title)?;

    Ok(DriverPlots {
        driver: lap.driver.clone(),
        lap_number: lap.lap_number,
        speed_svg,
        track_svg,
    })
}

/// Time against speed, one line labelled "Fast"
pub fn speed_chart_svg(
    curve: &[SpeedPoint],
    driver: &str,
    size: (u32, u32),
) -> Result<String, FastlapError> {
    let points: Vec<(f64, f64)> = curve
        .iter()
        .map(|p| (p.time_s, f64::from(p.speed_kph)))
        .collect();
    let caption = format!("{} Speed Plot", driver);
    render_svg(size, |root| {
        draw_line_chart(
            root,
            &caption,
            ("Time [s]", "Speed [Km/h]"),
            &points,
            SPEED_LINE,
            Some("Fast"),
            false,
        )
    })
}

/// Lap number against lap time, with a marker on every timed lap
pub fn lap_time_chart_svg(
    curve: &[LapTimePoint],
    driver: &str,
    size: (u32, u32),
) -> Result<String, FastlapError> {
    let points: Vec<(f64, f64)> = curve
        .iter()
        .map(|p| (f64::from(p.lap_number), p.lap_time_s))
        .collect();
    let caption = format!("{} Lap Times", driver);
    render_svg(size, |root| {
        draw_line_chart(
            root,
            &caption,
            ("Lap Number", "Lap Time [s]"),
            &points,
            LAP_TIME_LINE,
            None,
            true,
        )
    })
}

/// Distance against speed as a scatter
pub fn speed_distance_chart_svg(
    curve: &[DistancePoint],
    driver: &str,
    size: (u32, u32),
) -> Result<String, FastlapError> {
    let points: Vec<(f64, f64)> = curve
        .iter()
        .map(|p| (p.distance_m, f64::from(p.speed_kph)))
        .collect();
    let caption = format!("{} Speed vs. Distance", driver);
    render_svg(size, |root| {
        let mut chart = build_chart(root, &caption, &points)?;
        chart
            .configure_mesh()
            .x_desc("Distance [m]")
            .y_desc("Speed [Km/h]")
            .draw()?;
        chart.draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 2, SPEED_LINE.filled())),
        )?;
        Ok(())
    })
}

fn render_svg<F>(size: (u32, u32), draw: F) -> Result<String, FastlapError>
where
    F: FnOnce(&DrawingArea<SVGBackend<'_>, plotters::coord::Shift>) -> DrawResult,
{
    if size.0 == 0 || size.1 == 0 {
        return Err(FastlapError::RenderError {
            reason: format!("Invalid chart size: {}x{}", size.0, size.1),
        });
    }
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE).map_err(|e| FastlapError::RenderError {
            reason: e.to_string(),
        })?;
        draw(&root).map_err(|e| FastlapError::RenderError {
            reason: e.to_string(),
        })?;
        root.present().map_err(|e| FastlapError::RenderError {
            reason: e.to_string(),
        })?;
    }
    Ok(svg)
}

type SvgChart<'a, 'b> = ChartContext<
    'a,
    SVGBackend<'b>,
    Cartesian2d<plotters::coord::types::RangedCoordf64, plotters::coord::types::RangedCoordf64>,
>;

fn build_chart<'a, 'b>(
    root: &'a DrawingArea<SVGBackend<'b>, plotters::coord::Shift>,
    caption: &str,
    points: &[(f64, f64)],
) -> Result<SvgChart<'a, 'b>, Box<dyn Error + Send + Sync>> {
    let (x_range, y_range) = axis_ranges(points);
    let chart = ChartBuilder::on(root)
        .caption(caption, ("sans-serif", 22))
        .margin(15)
        .set_label_area_size(LabelAreaPosition::Left, 55)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x_range, y_range)?;
    Ok(chart)
}

fn draw_line_chart(
    root: &DrawingArea<SVGBackend<'_>, plotters::coord::Shift>,
    caption: &str,
    (x_desc, y_desc): (&str, &str),
    points: &[(f64, f64)],
    color: RGBColor,
    legend: Option<&str>,
    markers: bool,
) -> DrawResult {
    let mut chart = build_chart(root, caption, points)?;
    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()?;

    let series = chart.draw_series(LineSeries::new(points.iter().copied(), &color))?;
    if let Some(label) = legend {
        series
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    if markers {
        chart.draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
        )?;
    }
    Ok(())
}

/// Data extents padded by 5%, widened around the value when an axis is flat
fn axis_ranges(points: &[(f64, f64)]) -> (Range<f64>, Range<f64>) {
    let axis = |values: &mut dyn Iterator<Item = f64>| {
        let (min, max) = values
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if !min.is_finite() {
            return 0.0..1.0;
        }
        if max - min <= f64::EPSILON {
            return (min - 1.0)..(max + 1.0);
        }
        let pad = (max - min) * 0.05;
        (min - pad)..(max + pad)
    };
    (
        axis(&mut points.iter().map(|p| p.0)),
        axis(&mut points.iter().map(|p| p.1)),
    )
}
