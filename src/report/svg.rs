//! SVG rendering of the treemap
//!
//! Slice-and-dice layout: categories split the plot along its longer side in
//! proportion to their totals, then each category splits its own cell along
//! the other side between its leaves.

use super::{escape, TreemapChart};
use std::fmt::Write;

const TITLE_HEIGHT: f64 = 44.0;
const LEGEND_ROW_HEIGHT: f64 = 22.0;
const LEGEND_ENTRY_WIDTH: f64 = 170.0;
const MARGIN: f64 = 12.0;
const MIN_LABEL_WIDTH: f64 = 48.0;
const MIN_LABEL_HEIGHT: f64 = 30.0;

const STYLE: &str = "\
  .background{fill:transparent}\
  .plot{fill:#FFFFFF}\
  .title{font:600 18px sans-serif;fill:#111111}\
  .legend{font:12px sans-serif;fill:#111111}\
  .label{font:11px sans-serif;fill:#111111}\
  .value{font:600 11px sans-serif;fill:#111111}\
  .reactive{fill-opacity:.6;stroke:#FFFFFF;stroke-width:1;transition:400ms ease-in}\
  .reactive:hover{fill-opacity:.9}";

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    /// Splits along x (`horizontal`) or y in proportion to `weights`.
    pub(crate) fn slice(&self, weights: &[u64], horizontal: bool) -> Vec<Rect> {
        let total: u64 = weights.iter().sum();
        if total == 0 {
            return weights.iter().map(|_| Rect { w: 0.0, h: 0.0, ..*self }).collect();
        }

        let mut offset = 0.0;
        weights
            .iter()
            .map(|&weight| {
                let share = weight as f64 / total as f64;
                let rect = if horizontal {
                    Rect { x: self.x + offset, y: self.y, w: self.w * share, h: self.h }
                } else {
                    Rect { x: self.x, y: self.y + offset, w: self.w, h: self.h * share }
                };
                offset += if horizontal { rect.w } else { rect.h };
                rect
            })
            .collect()
    }
}

impl TreemapChart {
    pub fn render_svg(&self, width: u32, height: u32) -> String {
        let (width_f, height_f) = (f64::from(width), f64::from(height));
        let per_row = ((width_f - 2.0 * MARGIN) / LEGEND_ENTRY_WIDTH).floor().max(1.0) as usize;
        let legend_rows = self.categories.len().div_ceil(per_row);
        let legend_height = legend_rows as f64 * LEGEND_ROW_HEIGHT;

        let plot = Rect {
            x: MARGIN,
            y: TITLE_HEIGHT,
            w: (width_f - 2.0 * MARGIN).max(0.0),
            h: (height_f - TITLE_HEIGHT - legend_height - 2.0 * MARGIN).max(0.0),
        };

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
        );
        let _ = writeln!(svg, "<style>{STYLE}</style>");
        let _ = writeln!(svg, "<rect class=\"background\" width=\"{width}\" height=\"{height}\"/>");
        let _ = writeln!(
            svg,
            "<text class=\"title\" x=\"{:.1}\" y=\"28\" text-anchor=\"middle\">{}</text>",
            width_f / 2.0,
            escape(&self.title)
        );
        let _ = writeln!(
            svg,
            "<rect class=\"plot\" x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\"/>",
            plot.x, plot.y, plot.w, plot.h
        );

        if self.total() == 0 {
            let _ = writeln!(
                svg,
                "<text class=\"legend\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">No data</text>",
                plot.x + plot.w / 2.0,
                plot.y + plot.h / 2.0
            );
        } else {
            self.write_cells(&mut svg, plot);
        }

        self.write_legend(&mut svg, per_row, plot.y + plot.h + MARGIN);
        svg.push_str("</svg>\n");
        svg
    }

    fn write_cells(&self, svg: &mut String, plot: Rect) {
        let horizontal = plot.w >= plot.h;
        let totals: Vec<u64> = self.categories.iter().map(|c| c.total()).collect();

        for (category, cell) in self.categories.iter().zip(plot.slice(&totals, horizontal)) {
            if category.total() == 0 {
                continue;
            }
            let values: Vec<u64> = category.leaves.iter().map(|leaf| leaf.value).collect();
            let _ = writeln!(svg, "<g class=\"series\">");
            for (leaf, rect) in category.leaves.iter().zip(cell.slice(&values, !horizontal)) {
                if leaf.value == 0 {
                    continue;
                }
                let _ = writeln!(
                    svg,
                    "<g><title>{} / {}: {}</title><rect class=\"reactive\" x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\"/>",
                    escape(&category.name),
                    escape(&leaf.label),
                    leaf.value,
                    rect.x,
                    rect.y,
                    rect.w,
                    rect.h,
                    escape(&category.colour)
                );
                if rect.w >= MIN_LABEL_WIDTH && rect.h >= MIN_LABEL_HEIGHT {
                    let cx = rect.x + rect.w / 2.0;
                    let cy = rect.y + rect.h / 2.0;
                    let _ = writeln!(
                        svg,
                        "<text class=\"label\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>",
                        cx,
                        cy - 2.0,
                        escape(&leaf.label)
                    );
                    let _ = writeln!(
                        svg,
                        "<text class=\"value\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>",
                        cx,
                        cy + 12.0,
                        leaf.value
                    );
                }
                svg.push_str("</g>\n");
            }
            svg.push_str("</g>\n");
        }
    }

    fn write_legend(&self, svg: &mut String, per_row: usize, top: f64) {
        for (i, category) in self.categories.iter().enumerate() {
            let x = MARGIN + (i % per_row) as f64 * LEGEND_ENTRY_WIDTH;
            let y = top + (i / per_row) as f64 * LEGEND_ROW_HEIGHT;
            let _ = writeln!(
                svg,
                "<g class=\"legend\"><rect class=\"reactive\" x=\"{:.1}\" y=\"{:.1}\" width=\"12\" height=\"12\" fill=\"{}\"/><text class=\"legend\" x=\"{:.1}\" y=\"{:.1}\">{}</text></g>",
                x,
                y,
                escape(&category.colour),
                x + 18.0,
                y + 10.0,
                escape(&category.name)
            );
        }
    }
}
