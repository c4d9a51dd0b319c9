use std::io::Cursor;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::LineSeries;
use plotters::prelude::*;
use crate::telemetry::error::TelemetryError;
use crate::telemetry::snapshot::GroupSnapshot;
/// Bounds used when a range is `NoRange`.
const FALLBACK_BOUNDS: (f64, f64) = (0.0, 1.0);
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub palette: Vec<RGBColor>,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 900,
            height: 400,
            background: RGBColor(10, 10, 10),
            palette: vec![BLUE, RED, GREEN, CYAN, MAGENTA, YELLOW, WHITE],
        }
    }
}
/// Draws one chart group. Missing samples break the line; an empty range
/// leaves the axis at its fallback bounds.
pub fn render_group_png(
    snapshot: &GroupSnapshot,
    style: PlotStyle,
) -> Result<Vec<u8>, TelemetryError> {
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let x_bounds = axis_bounds(
            snapshot
                .domain_range
                .bounds()
                .map(|(first, last)| (first.seq as f64, last.seq as f64)),
        );
        let y_bounds = axis_bounds(snapshot.value_range.bounds());
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(&snapshot.title, ("sans-serif", 20).into_font().color(&WHITE))
            .set_label_area_size(LabelAreaPosition::Left, 55)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .build_cartesian_2d(x_bounds.0..x_bounds.1, y_bounds.0..y_bounds.1)?;
        chart
            .configure_mesh()
            .y_desc(snapshot.unit.as_str())
            .light_line_style(&WHITE.mix(0.1))
            .draw()?;
        let xs: Vec<f64> = snapshot.axis.iter().map(|t| t.seq as f64).collect();
        for (idx, channel) in snapshot.series.iter().enumerate() {
            let color = series_color(&style.palette, idx);
            for (run_idx, run) in present_runs(&xs, &channel.samples).into_iter().enumerate() {
                let drawn = chart.draw_series(LineSeries::new(run, &color))?;
                if run_idx == 0 {
                    drawn
                        .label(channel.name.as_str())
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
                }
            }
        }
        chart
            .configure_series_labels()
            .border_style(&WHITE.mix(0.2))
            .background_style(&style.background)
            .draw()?;
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}
/// Splits a series into contiguous runs of present samples, paired with their x value.
fn present_runs(xs: &[f64], samples: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (x, sample) in xs.iter().zip(samples) {
        match sample {
            Some(y) => current.push((*x, *y)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}
/// Cycles through the palette; white when the palette is empty.
fn series_color(palette: &[RGBColor], idx: usize) -> RGBColor {
    if palette.is_empty() {
        return WHITE;
    }
    palette[idx % palette.len()]
}
/// Pads degenerate ranges so the chart never has zero height or width.
fn axis_bounds(range: Option<(f64, f64)>) -> (f64, f64) {
    match range {
        None => FALLBACK_BOUNDS,
        Some((min, max)) if (max - min).abs() < f64::EPSILON => {
            let pad = (min.abs() * 0.1).max(1.0);
            (min - pad, max + pad)
        }
        Some(bounds) => bounds,
    }
}
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, TelemetryError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| TelemetryError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn gaps_split_the_line() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let samples = [Some(5.0), None, Some(3.0), Some(4.0), None, None];
        assert_eq!(
            present_runs(&xs, &samples),
            vec![vec![(1.0, 5.0)], vec![(3.0, 3.0), (4.0, 4.0)]]
        );
        assert!(present_runs(&xs, &[None; 6]).is_empty());
    }
    #[test]
    fn colors_cycle_and_survive_an_empty_palette() {
        let palette = [RED, GREEN];
        assert_eq!(series_color(&palette, 0), RED);
        assert_eq!(series_color(&palette, 3), GREEN);
        assert_eq!(series_color(&[], 5), WHITE);
    }
    #[test]
    fn empty_and_flat_ranges_get_usable_bounds() {
        assert_eq!(axis_bounds(None), FALLBACK_BOUNDS);
        assert_eq!(axis_bounds(Some((20.0, 20.0))), (18.0, 22.0));
        assert_eq!(axis_bounds(Some((0.0, 0.0))), (-1.0, 1.0));
        assert_eq!(axis_bounds(Some((-2.0, 8.0))), (-2.0, 8.0));
    }
}
