// SVG track map renderer: draws the lap outline and colors each segment by speed

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::curves::{Colormap, TrackCurve, TrackPoint};
use crate::errors::FastlapError;

/// Configuration for SVG track map rendering
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackMapConfig {
    /// Canvas dimensions (width, height) in pixels
    pub canvas_size: (u32, u32),
    /// Stroke width of the black outline drawn under the colored line
    pub underlay_width: f32,
    /// Stroke width of the speed-colored segments
    pub stroke_width: f32,
    /// Scaling algorithm to use for coordinate normalization
    pub scaling_algorithm: ScalingAlgorithm,
    /// Margin around the track as percentage of canvas size
    pub margin_percentage: f32,
}

impl Default for TrackMapConfig {
    fn default() -> Self {
        Self {
            canvas_size: (1200, 675),
            underlay_width: 16.0,
            stroke_width: 5.0,
            scaling_algorithm: ScalingAlgorithm::AutoFit,
            margin_percentage: 0.08,
        }
    }
}

/// Scaling algorithms for coordinate normalization
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum ScalingAlgorithm {
    /// Automatically fit track to canvas with uniform scaling
    AutoFit,
    /// Scale to fill canvas (may distort aspect ratio)
    FillCanvas,
    /// Use fixed scale factor
    FixedScale(f32),
}

/// Represents a 2D coordinate point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Bounding box for coordinate calculations
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl BoundingBox {
    pub fn new() -> Self {
        Self {
            min_x: f32::INFINITY,
            max_x: f32::NEG_INFINITY,
            min_y: f32::INFINITY,
            max_y: f32::NEG_INFINITY,
        }
    }

    pub fn from_points(points: &[TrackPoint]) -> Self {
        let mut bbox = Self::new();
        for point in points {
            bbox.update(Point2D::new(point.x, point.y));
        }
        bbox
    }

    pub fn update(&mut self, point: Point2D) {
        self.min_x = self.min_x.min(point.x);
        self.max_x = self.max_x.max(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_y = self.max_y.max(point.y);
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point2D {
        Point2D::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    fn is_finite(&self) -> bool {
        self.min_x.is_finite()
            && self.max_x.is_finite()
            && self.min_y.is_finite()
            && self.max_y.is_finite()
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders speed-colored track maps as SVG documents
pub struct TrackMapRenderer {
    config: TrackMapConfig,
    colormap: Colormap,
}

impl TrackMapRenderer {
    /// Create a new track map renderer with default configuration
    pub fn new() -> Self {
        Self::with_config(TrackMapConfig::default())
    }

    /// Create a new track map renderer with custom configuration
    pub fn with_config(config: TrackMapConfig) -> Self {
        Self {
            config,
            colormap: Colormap::PLASMA,
        }
    }

    /// Render the track curve of a lap.
    ///
    /// The outline is drawn in black under the segments, then every segment
    /// is stroked with the colormap color of its normalized speed. A curve
    /// without segments renders a message in place of the map, so callers
    /// always get a visible image.
    pub fn render(&self, curve: &TrackCurve, title: &str) -> Result<String, FastlapError> {
        self.validate_config()?;

        if curve.segments.is_empty() {
            warn!(
                "No track segments to draw ({} points), rendering placeholder",
                curve.points.len()
            );
            return Ok(self.render_message(title, "No track data available for this lap"));
        }

        let bbox = BoundingBox::from_points(&curve.points);
        if !bbox.is_finite() {
            return Err(FastlapError::RenderError {
                reason: "Invalid bounding box with non-finite coordinates".to_string(),
            });
        }
        debug!(
            "Track bounding box: ({:.2}, {:.2}) to ({:.2}, {:.2})",
            bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y
        );

        let (scale_x, scale_y) = self.calculate_scaling_factors(&bbox);
        debug!(
            "Calculated scaling factors: x={:.4}, y={:.4}",
            scale_x, scale_y
        );
        let projected: Vec<Point2D> = curve
            .points
            .iter()
            .map(|p| self.project(p, &bbox, scale_x, scale_y))
            .collect();

        let (width, height) = self.config.canvas_size;
        let mut svg = String::with_capacity(1024 + curve.segments.len() * 96);
        svg.push_str(&self.svg_header());
        svg.push_str(&self.svg_title(title));

        svg.push_str("\n  <polyline class=\"track-underlay\" points=\"");
        for (i, point) in projected.iter().enumerate() {
            if i > 0 {
                svg.push(' ');
            }
            svg.push_str(&format!("{:.2},{:.2}", point.x, point.y));
        }
        svg.push_str("\" />");

        // segment i joins points i and i + 1
        for (segment, ends) in curve.segments.iter().zip(projected.windows(2)) {
            let color = self.colormap.color_at(segment.color_value as f32);
            svg.push_str(&format!(
                "\n  <line class=\"speed-segment\" x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" />",
                ends[0].x,
                ends[0].y,
                ends[1].x,
                ends[1].y,
                color.to_hex()
            ));
        }

        if let Some(normalizer) = curve.normalizer {
            svg.push_str(&format!(
                "\n  <!-- {} points, {} segments, speed {:.1}-{:.1} km/h on {}x{} -->",
                curve.points.len(),
                curve.segments.len(),
                normalizer.min_kph,
                normalizer.max_kph,
                width,
                height
            ));
        }
        svg.push_str("\n</svg>");

        info!(
            "Rendered track map with {} segments ({} characters)",
            curve.segments.len(),
            svg.len()
        );
        Ok(svg)
    }

    /// A canvas with the title and a centered message instead of a map
    pub fn render_message(&self, title: &str, message: &str) -> String {
        let (width, height) = self.config.canvas_size;
        let mut svg = self.svg_header();
        svg.push_str(&self.svg_title(title));
        svg.push_str(&format!(
            "\n  <text class=\"message\" x=\"{}\" y=\"{}\" text-anchor=\"middle\">{}</text>",
            width / 2,
            height / 2,
            escape_xml(message)
        ));
        svg.push_str("\n</svg>");
        svg
    }

    fn validate_config(&self) -> Result<(), FastlapError> {
        let (width, height) = self.config.canvas_size;
        if width == 0 || height == 0 {
            return Err(FastlapError::RenderError {
                reason: format!("Invalid canvas size: {}x{}", width, height),
            });
        }
        if self.config.stroke_width <= 0.0 || self.config.stroke_width > 50.0 {
            return Err(FastlapError::RenderError {
                reason: format!(
                    "Invalid stroke width: {} (must be 0.1-50.0)",
                    self.config.stroke_width
                ),
            });
        }
        if !(0.0..0.5).contains(&self.config.margin_percentage) {
            return Err(FastlapError::RenderError {
                reason: format!(
                    "Invalid margin: {} (must be below 0.5)",
                    self.config.margin_percentage
                ),
            });
        }
        Ok(())
    }

    fn usable_area(&self) -> (f32, f32) {
        let (width, height) = self.config.canvas_size;
        let margin = 1.0 - 2.0 * self.config.margin_percentage;
        (width as f32 * margin, height as f32 * margin)
    }

    /// Calculate scaling factors based on the configured scaling algorithm.
    /// A zero-length axis (a straight line) takes its scale from the other one.
    fn calculate_scaling_factors(&self, bbox: &BoundingBox) -> (f32, f32) {
        let (usable_width, usable_height) = self.usable_area();
        let fit = |usable: f32, extent: f32| (extent > 0.0).then(|| usable / extent);
        let fit_x = fit(usable_width, bbox.width());
        let fit_y = fit(usable_height, bbox.height());

        match self.config.scaling_algorithm {
            ScalingAlgorithm::AutoFit => {
                // Uniform scaling to fit within canvas while preserving aspect ratio
                let scale = match (fit_x, fit_y) {
                    (Some(x), Some(y)) => x.min(y),
                    (Some(s), None) | (None, Some(s)) => s,
                    (None, None) => 1.0,
                };
                (scale, scale)
            }
            ScalingAlgorithm::FillCanvas => (fit_x.unwrap_or(1.0), fit_y.unwrap_or(1.0)),
            ScalingAlgorithm::FixedScale(scale) => (scale, scale),
        }
    }

    /// Map a track point onto the canvas, centered, with Y pointing up
    fn project(&self, point: &TrackPoint, bbox: &BoundingBox, scale_x: f32, scale_y: f32) -> Point2D {
        let (width, height) = self.config.canvas_size;
        let center = bbox.center();
        Point2D::new(
            width as f32 / 2.0 + (point.x - center.x) * scale_x,
            height as f32 / 2.0 - (point.y - center.y) * scale_y,
        )
    }

    fn svg_header(&self) -> String {
        let (width, height) = self.config.canvas_size;
        format!(
            r##"<svg width="{w}" height="{h}" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}">
  <defs>
    <style>
      .track-underlay {{ stroke: #000; stroke-width: {underlay:.2}; fill: none; stroke-linecap: round; stroke-linejoin: round; }}
      .speed-segment {{ stroke-width: {stroke:.2}; fill: none; stroke-linecap: round; }}
      .title {{ font-family: sans-serif; font-size: 20px; fill: #222; }}
      .message {{ font-family: sans-serif; font-size: 24px; fill: #555; }}
    </style>
  </defs>
  <rect width="100%" height="100%" fill="#ffffff" />"##,
            w = width,
            h = height,
            underlay = self.config.underlay_width,
            stroke = self.config.stroke_width
        )
    }

    fn svg_title(&self, title: &str) -> String {
        format!(
            "\n  <text class=\"title\" x=\"{}\" y=\"30\" text-anchor=\"middle\">{}</text>",
            self.config.canvas_size.0 / 2,
            escape_xml(title)
        )
    }

    /// Get current configuration
    pub fn config(&self) -> &TrackMapConfig {
        &self.config
    }
}

impl Default for TrackMapRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
