//! HTML breakdown table, one coloured heading and table per category

use super::{escape, TreemapChart};
use std::fmt::Write;

impl TreemapChart {
    pub fn render_table_html(&self, stylesheet: &str) -> String {
        let mut html = String::new();
        let _ = write!(
            html,
            "<!DOCTYPE html>\n<html>\n<head>\n<link rel=\"stylesheet\" href=\"{}\">\n</head>\n<body>",
            escape(stylesheet)
        );

        for category in &self.categories {
            let _ = write!(
                html,
                "\n <h1 style=\"color:{};\">{}</h1>\n",
                escape(&category.colour),
                escape(&category.name)
            );
            html.push_str("<table>\n  <thead>\n    <tr><th></th><th>Count</th></tr>\n  </thead>\n  <tbody>\n");
            for leaf in &category.leaves {
                let _ = writeln!(
                    html,
                    "    <tr><th>{}</th><td>{}</td></tr>",
                    escape(&leaf.label),
                    leaf.value
                );
            }
            let _ = write!(
                html,
                "  </tbody>\n  <tfoot>\n    <tr><th>Total</th><td>{}</td></tr>\n  </tfoot>\n</table>",
                category.total()
            );
        }

        html.push_str("\n</body>\n</html>");
        html
    }
}
