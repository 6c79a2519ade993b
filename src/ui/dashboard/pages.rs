use egui::{Color32, RichText, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use crate::FastlapError;
use crate::curves::{
    Colormap, SummaryStatistics, TrackCurve, build_lap_time_curve, build_speed_curve,
    build_speed_distance_curve, build_summary_statistics, build_track_curve, speed_series,
};
use crate::telemetry::{Lap, Session, with_distance};
use crate::ui::{PALETTE_MAROON, PALETTE_ORANGE, warning_label};

use super::data_types::{LapSelection, Page};

const UNDERLAY_WIDTH: f32 = 16.;
const SEGMENT_WIDTH: f32 = 5.;

/// Series ready to be painted by one dashboard page
#[derive(Debug, Clone, PartialEq)]
pub enum PageData {
    Speed(Vec<[f64; 2]>),
    LapTimes(Vec<[f64; 2]>),
    SpeedDistance(Vec<[f64; 2]>),
    Summary(SummaryStatistics),
    TrackMap(TrackCurve),
}

pub fn select_lap<'s>(
    session: &'s Session,
    driver: &str,
    selection: LapSelection,
) -> Result<&'s Lap, FastlapError> {
    match selection {
        LapSelection::Fastest => session.pick_fastest(driver),
        LapSelection::Number(lap_number) => session.pick_lap(driver, lap_number),
    }
}

pub fn build_page_data(
    page: Page,
    session: &Session,
    driver: &str,
    selection: LapSelection,
) -> Result<PageData, FastlapError> {
    let data = match page {
        Page::LapTimes => PageData::LapTimes(
            build_lap_time_curve(&session.pick_driver(driver))?
                .iter()
                .map(|p| [f64::from(p.lap_number), p.lap_time_s])
                .collect(),
        ),
        Page::SpeedPlot => {
            let lap = select_lap(session, driver, selection)?;
            PageData::Speed(
                build_speed_curve(&lap.telemetry)?
                    .iter()
                    .map(|p| [p.time_s, f64::from(p.speed_kph)])
                    .collect(),
            )
        }
        Page::SpeedDistance => {
            let lap = select_lap(session, driver, selection)?;
            let telemetry = with_distance(&lap.telemetry)?;
            PageData::SpeedDistance(
                build_speed_distance_curve(&telemetry)?
                    .iter()
                    .map(|p| [p.distance_m, f64::from(p.speed_kph)])
                    .collect(),
            )
        }
        Page::SummaryStatistics => {
            let lap = select_lap(session, driver, selection)?;
            PageData::Summary(build_summary_statistics(&speed_series(&lap.telemetry)?)?)
        }
        Page::TrackMap => {
            let lap = select_lap(session, driver, selection)?;
            PageData::TrackMap(build_track_curve(&lap.telemetry)?)
        }
    };
    Ok(data)
}

pub fn show_page(ui: &mut Ui, data: &PageData, driver: &str, title: &str) {
    match data {
        PageData::Speed(points) => {
            ui.heading(format!("{} Speed Plot", driver));
            Plot::new("speed_plot")
                .legend(Legend::default())
                .x_axis_label("Time [s]")
                .y_axis_label("Speed [Km/h]")
                .show(ui, |plot_ui| {
                    plot_ui.line(
                        Line::new("Fast", PlotPoints::new(points.clone())).color(PALETTE_ORANGE),
                    );
                });
        }
        PageData::LapTimes(points) => {
            ui.heading(format!("{} Lap Times", driver));
            Plot::new("lap_times_plot")
                .x_axis_label("Lap Number")
                .y_axis_label("Lap Time [s]")
                .show(ui, |plot_ui| {
                    plot_ui.line(
                        Line::new("Lap Time", PlotPoints::new(points.clone()))
                            .color(PALETTE_ORANGE),
                    );
                    plot_ui.points(
                        Points::new("Lap", PlotPoints::new(points.clone()))
                            .color(PALETTE_MAROON)
                            .radius(3.),
                    );
                });
        }
        PageData::SpeedDistance(points) => {
            ui.heading(format!("{} Speed vs. Distance", driver));
            Plot::new("speed_distance_plot")
                .x_axis_label("Distance [m]")
                .y_axis_label("Speed [Km/h]")
                .show(ui, |plot_ui| {
                    plot_ui.points(
                        Points::new("Speed", PlotPoints::new(points.clone()))
                            .color(PALETTE_ORANGE)
                            .radius(2.),
                    );
                });
        }
        PageData::Summary(stats) => {
            ui.heading(format!("{} Speed Summary Statistics", driver));
            for line in [
                format!("Mean Speed: {:.2} Km/h", stats.mean_kph),
                format!("Max Speed: {:.2} Km/h", stats.max_kph),
                format!("Min Speed: {:.2} Km/h", stats.min_kph),
            ] {
                ui.label(RichText::new(line).color(Color32::WHITE));
            }
        }
        PageData::TrackMap(curve) => {
            ui.heading(title);
            if curve.segments.is_empty() {
                warning_label(ui, "No track data available for this lap");
                return;
            }
            show_track_map(ui, curve);
        }
    }
}

fn show_track_map(ui: &mut Ui, curve: &TrackCurve) {
    let outline: Vec<[f64; 2]> = curve
        .points
        .iter()
        .map(|p| [f64::from(p.x), f64::from(p.y)])
        .collect();
    let colormap = Colormap::PLASMA;

    Plot::new("track_map")
        .data_aspect(1.)
        .show_axes(false)
        .show_grid(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new("Track", PlotPoints::new(outline))
                    .color(Color32::BLACK)
                    .width(UNDERLAY_WIDTH),
            );
            for segment in &curve.segments {
                let points = vec![
                    [f64::from(segment.start.x), f64::from(segment.start.y)],
                    [f64::from(segment.end.x), f64::from(segment.end.y)],
                ];
                plot_ui.line(
                    Line::new("Speed", PlotPoints::new(points))
                        .color(Color32::from(colormap.color_at(segment.color_value as f32)))
                        .width(SEGMENT_WIDTH),
                );
            }
        });
}
