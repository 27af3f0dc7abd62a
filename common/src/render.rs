use std::{error::Error, ops::Range, path::Path};

use plotters::{
    coord::Shift,
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};

use crate::{
    error::{PlotError, Result},
    plot::{BarChart, ChartRenderer},
};

const TITLE_FONT_SIZE: f64 = 24.0;
const LABEL_FONT_SIZE: f64 = 14.0;
/// Gap between the x axis and the closest pixel of a tick label
const TICK_GAP: f64 = 8.0;
const TICK_LENGTH: i32 = 5;
const BAR_MARGIN: u32 = 6;

/// Draws charts with plotters' bitmap backend and encodes them as PNG
#[derive(Debug, Clone)]
pub struct PngRenderer {
    pub size: (u32, u32),
    pub font: &'static str,
}

impl Default for PngRenderer {
    fn default() -> Self {
        Self {
            size: (1000, 600),
            font: "sans-serif",
        }
    }
}

impl ChartRenderer for PngRenderer {
    fn render(&mut self, chart: &BarChart, path: &Path) -> Result<()> {
        let render_err = |e: Box<dyn Error>| PlotError::Render {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        let root = BitMapBackend::new(path, self.size).into_drawing_area();
        self.draw_on(&root, chart).map_err(render_err)?;
        root.present().map_err(|e| render_err(e.into()))
    }
}

/// One slot per bar, bar `i` spans `i..i + 1`
fn x_range(bar_count: usize) -> Range<f64> {
    0.0..bar_count.max(1) as f64
}

fn bar_center(i: usize) -> f64 {
    i as f64 + 0.5
}

/// Geometry of a tick label turned 45° counter-clockwise, right aligned so
/// the middle of its last glyph sits straight below the tick.
///
/// Offsets are in pixels relative to the tick, y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RotatedLabel {
    width: f64,
    height: f64,
}

impl RotatedLabel {
    fn new((width, height): (u32, u32)) -> Self {
        Self {
            width: width as f64,
            height: height as f64,
        }
    }

    fn drop_below_tick(&self) -> f64 {
        std::f64::consts::FRAC_1_SQRT_2 * self.height / 2.0 + TICK_GAP
    }

    /// Offset of the point `(u, v)` of the unrotated text
    fn project(&self, u: f64, v: f64) -> (f64, f64) {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let along = u - self.width;
        let across = v - self.height / 2.0;
        (
            s * (along + across),
            s * (across - along) + self.drop_below_tick(),
        )
    }

    /// Point of the unrotated text that lands on offset `(dx, dy)`
    fn unproject(&self, dx: f64, dy: f64) -> (f64, f64) {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let dy = dy - self.drop_below_tick();
        (
            s * (dx - dy) + self.width,
            s * (dx + dy) + self.height / 2.0,
        )
    }

    /// `(left, top, right, bottom)` offsets enclosing the rotated text
    fn bounds(&self) -> (i32, i32, i32, i32) {
        let corners = [
            self.project(0.0, 0.0),
            self.project(self.width, 0.0),
            self.project(0.0, self.height),
            self.project(self.width, self.height),
        ];
        let (mut left, mut top) = (f64::MAX, f64::MAX);
        let (mut right, mut bottom) = (f64::MIN, f64::MIN);
        for (x, y) in corners {
            left = left.min(x);
            right = right.max(x);
            top = top.min(y);
            bottom = bottom.max(y);
        }
        (
            left.floor() as i32,
            top.floor() as i32,
            right.ceil() as i32,
            bottom.ceil() as i32,
        )
    }
}

impl PngRenderer {
    fn label_style(&self) -> TextStyle<'static> {
        TextStyle::from((self.font, LABEL_FONT_SIZE).into_font())
    }

    /// `(x, y)` label area sizes fitting every tick label, the x axis
    /// description and the first label's reach to the left
    fn label_areas(&self, labels: &[RotatedLabel]) -> (u32, u32) {
        let below = labels
            .iter()
            .map(|label| label.bounds().3)
            .max()
            .unwrap_or(0)
            .max(0) as f64;
        let x_area = below + 2.0 * LABEL_FONT_SIZE + 16.0;
        let left = labels
            .first()
            .map(|label| -label.bounds().0)
            .unwrap_or(0)
            .max(70);
        (
            (x_area as u32).min(self.size.1 * 3 / 5),
            (left as u32).min(self.size.0 / 3),
        )
    }

    fn draw_on<DB>(&self, root: &DrawingArea<DB, Shift>, chart: &BarChart) -> Result<(), Box<dyn Error>>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;

        let label_style = self.label_style();
        let labels = chart
            .bars
            .iter()
            .map(|bar| -> Result<RotatedLabel, Box<dyn Error>> {
                Ok(RotatedLabel::new(
                    root.estimate_text_size(&bar.label, &label_style)?,
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let (x_label_area, y_label_area) = self.label_areas(&labels);

        let (low, high) = chart
            .bars
            .iter()
            .fold((0.0_f64, 0.0_f64), |(lo, hi), bar| {
                (lo.min(bar.value), hi.max(bar.value))
            });
        // headroom for the annotations
        let high = if high > 0.0 { high * 1.1 } else { 1.0 };
        let low = low * 1.1;

        let mut ctx = ChartBuilder::on(root)
            .caption(&chart.title, (self.font, TITLE_FONT_SIZE).into_font())
            .margin(15)
            .x_label_area_size(x_label_area)
            .y_label_area_size(y_label_area)
            .build_cartesian_2d(x_range(chart.bars.len()), low..high)?;

        ctx.configure_mesh()
            .disable_mesh()
            .x_labels(0)
            .x_desc(chart.x_label)
            .y_desc(chart.y_label)
            .axis_desc_style((self.font, LABEL_FONT_SIZE).into_font())
            .draw()?;

        ctx.draw_series(chart.bars.iter().enumerate().map(|(i, bar)| {
            let mut rect = Rectangle::new(
                [(i as f64, 0.0), (i as f64 + 1.0, bar.value)],
                bar.color.rgb().filled(),
            );
            rect.set_margin(0, 0, BAR_MARGIN, BAR_MARGIN);
            rect
        }))?;

        let annotation = label_style.pos(Pos::new(HPos::Center, VPos::Bottom));
        ctx.draw_series(chart.bars.iter().enumerate().map(|(i, bar)| {
            Text::new(
                bar.annotation(),
                (bar_center(i), bar.value),
                annotation.clone(),
            )
        }))?;

        for (i, bar) in chart.bars.iter().enumerate() {
            let (x, y) = ctx.backend_coord(&(bar_center(i), low));
            root.draw(&PathElement::new(vec![(x, y), (x, y + TICK_LENGTH)], BLACK))?;
            draw_rotated_label(root, &bar.label, &label_style, (x, y))?;
        }
        Ok(())
    }
}

/// Rasterizes `label` upright into a scratch buffer, then copies its ink
/// onto `root` turned by 45° below `tick`
fn draw_rotated_label<DB>(
    root: &DrawingArea<DB, Shift>,
    label: &str,
    style: &TextStyle<'_>,
    tick: (i32, i32),
) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (width, height) = root.estimate_text_size(label, style)?;
    // slack for glyphs overhanging their advance box
    let (width, height) = (width + 2, height + 4);
    let mut buf = vec![255u8; width as usize * height as usize * 3];
    {
        let scratch = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        scratch.draw_text(label, style, (1, 1))?;
        scratch.present()?;
    }

    let rotated = RotatedLabel::new((width, height));
    let (left, top, right, bottom) = rotated.bounds();
    for dy in top..=bottom {
        for dx in left..=right {
            let (u, v) = rotated.unproject(dx as f64, dy as f64);
            if u < 0.0 || v < 0.0 || u >= width as f64 || v >= height as f64 {
                continue;
            }
            let idx = (v as usize * width as usize + u as usize) * 3;
            let ink = 1.0 - buf[idx] as f64 / 255.0;
            if ink > 0.05 {
                root.draw_pixel((tick.0 + dx, tick.1 + dy), &BLACK.mix(ink))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use plotters::coord::{ranged1d::Ranged, types::RangedCoordf64};

    use super::*;
    use crate::{plot::Bar, setting::BarColor};

    fn chart(bars: &[(&str, f64, BarColor)]) -> BarChart {
        BarChart {
            name: "parse".to_owned(),
            title: "Benchmark: parse".to_owned(),
            x_label: crate::plot::X_LABEL,
            y_label: crate::plot::Y_LABEL,
            bars: bars
                .iter()
                .map(|(label, value, color)| Bar {
                    label: (*label).to_owned(),
                    value: *value,
                    color: *color,
                })
                .collect(),
        }
    }

    fn fonts_available(font: &str) -> bool {
        let mut buf = vec![0u8; 16 * 16 * 3];
        let area = BitMapBackend::with_buffer(&mut buf, (16, 16)).into_drawing_area();
        area.estimate_text_size("x", &TextStyle::from((font, LABEL_FONT_SIZE).into_font()))
            .is_ok()
    }

    #[test]
    fn bars_fill_the_x_axis() {
        for bar_count in 1..=4 {
            let coord: RangedCoordf64 = x_range(bar_count).into();
            assert_eq!(coord.map(&0.0, (0, 900)), 0);
            assert_eq!(coord.map(&(bar_count as f64), (0, 900)), 900);
        }
        let coord: RangedCoordf64 = x_range(2).into();
        assert_eq!(coord.map(&bar_center(0), (0, 900)), 225);
        assert_eq!(coord.map(&bar_center(1), (0, 900)), 675);
    }

    #[test]
    fn label_ends_below_its_tick() {
        let label = RotatedLabel::new((200, 16));
        let (x, y) = label.project(200.0, 8.0);
        assert!(x.abs() < 1e-9);
        assert!((y - label.drop_below_tick()).abs() < 1e-9);

        let (left, top, right, bottom) = label.bounds();
        assert!(top as f64 >= TICK_GAP - 1.0);
        assert!(right <= 6);
        // text runs down and to the left at 45°
        assert!(left < -140);
        assert!(bottom > 140);
        assert!((left.abs() - bottom).abs() < 20);
    }

    #[test]
    fn unproject_inverts_project() {
        let label = RotatedLabel::new((120, 18));
        for (u, v) in [(0.0, 0.0), (60.0, 9.0), (120.0, 18.0), (13.5, 2.25)] {
            let (dx, dy) = label.project(u, v);
            let (u2, v2) = label.unproject(dx, dy);
            assert!((u - u2).abs() < 1e-9 && (v - v2).abs() < 1e-9);
        }
    }

    #[test]
    fn label_areas_fit_the_longest_label() {
        let renderer = PngRenderer::default();
        let short = RotatedLabel::new((80, 16));
        let long = RotatedLabel::new((240, 16));

        let (x_short, _) = renderer.label_areas(&[short]);
        let (x_long, y_long) = renderer.label_areas(&[long, short]);
        assert!(x_long > x_short);
        assert!(x_long as i32 > long.bounds().3);
        assert!(y_long as i32 >= -long.bounds().0);
    }

    #[test]
    fn label_areas_are_capped() {
        let renderer = PngRenderer::default();
        let huge = RotatedLabel::new((5000, 16));
        assert_eq!(renderer.label_areas(&[huge]), (360, 333));
        assert_eq!(renderer.label_areas(&[]).1, 70);
    }

    /// Draws the two bar example into memory and checks where bars and labels land
    #[test]
    fn draws_bars_and_labels_in_place() {
        let renderer = PngRenderer::default();
        if !fonts_available(renderer.font) {
            eprintln!("no {} font, skipping", renderer.font);
            return;
        }
        let chart = chart(&[
            ("with split | d1", 1.234, BarColor::Blue),
            ("vectorization with split | d1", 0.987, BarColor::Green),
        ]);
        let (w, h) = renderer.size;
        let mut buf = vec![0u8; w as usize * h as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buf, renderer.size).into_drawing_area();
            renderer.draw_on(&root, &chart).unwrap();
            root.present().unwrap();
        }

        let pixel = |x: u32, y: u32| {
            let i = (y as usize * w as usize + x as usize) * 3;
            (buf[i], buf[i + 1], buf[i + 2])
        };
        let extent = |rgb: (u8, u8, u8)| {
            let mut found: Option<(u32, u32, u32, u32)> = None;
            for y in 0..h {
                for x in 0..w {
                    if pixel(x, y) == rgb {
                        let (x0, y0, x1, y1) = found.unwrap_or((x, y, x, y));
                        found = Some((x0.min(x), y0.min(y), x1.max(x), y1.max(y)));
                    }
                }
            }
            found
        };

        let (blue_left, blue_top, blue_right, axis) = extent((0, 0, 255)).unwrap();
        let (green_left, green_top, green_right, green_axis) = extent((0, 128, 0)).unwrap();
        assert!(blue_right < green_left);
        assert!(blue_top < green_top);
        assert!(axis.abs_diff(green_axis) <= 1);
        // no empty slot after the last bar
        assert!(green_right > w - 15 - 2 * BAR_MARGIN - 20);
        assert!((blue_right - blue_left).abs_diff(green_right - green_left) <= 2);

        // label ink sits below the axis, left of and under each bar
        let dark = |x: u32, y: u32| {
            let (r, g, b) = pixel(x, y);
            r < 100 && g < 100 && b < 100
        };
        for (left, right) in [(blue_left, blue_right), (green_left, green_right)] {
            let center = (left + right) / 2;
            let ink = (axis + TICK_GAP as u32..axis + 80)
                .flat_map(|y| (center.saturating_sub(80)..=center + 4).map(move |x| (x, y)))
                .filter(|&(x, y)| dark(x, y))
                .count();
            assert!(ink > 20, "no label ink under bar at {center}");
        }
        // nothing drawn over the bars
        for y in blue_top + 20..axis - 2 {
            assert_eq!(pixel((blue_left + blue_right) / 2, y), (0, 0, 255));
        }
    }

    #[test]
    #[ignore = "writes through the PNG encoder, needs a sans-serif system font"]
    fn writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parse.png");
        PngRenderer::default()
            .render(
                &chart(&[
                    ("with split | d1", 1.234, BarColor::Blue),
                    ("original | d1", 2.5, BarColor::Red),
                ]),
                &path,
            )
            .unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
