//! Bar chart of a month's daily primary totals.

use std::path::Path;

use chrono::Datelike;
use svg::Document;
use svg::node::Text as TextNode;
use svg::node::element::{Line, Rectangle, Text};

use crate::core::Ledger;

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 500.0;
const MARGIN: f64 = 60.0;
const BAR_GAP: f64 = 0.2;
const BAR_COLOR: &str = "blue";

fn label(x: f64, y: f64, content: impl Into<String>) -> Text {
    Text::new()
        .set("x", x)
        .set("y", y)
        .set("font-family", "sans-serif")
        .set("font-size", "12")
        .add(TextNode::new(content))
}

fn axis(x1: f64, y1: f64, x2: f64, y2: f64) -> Line {
    Line::new()
        .set("x1", x1)
        .set("y1", y1)
        .set("x2", x2)
        .set("y2", y2)
        .set("stroke", "black")
        .set("stroke-width", 2.0)
}

/// Draws one bar per day, scaled to the largest daily total.
pub fn render_daily_chart(ledger: &Ledger, currency: &str) -> Document {
    let points = ledger.daily_totals();
    let plot_w = WIDTH - 2.0 * MARGIN;
    let plot_h = HEIGHT - 2.0 * MARGIN;
    let base_y = MARGIN + plot_h;

    let peak = points.iter().map(|(_, total)| *total).fold(0.0, f64::max);
    let scale = if peak > 0.0 { plot_h / peak } else { 0.0 };
    let slot = plot_w / points.len().max(1) as f64;

    let month = ledger.month();
    let mut document = Document::new()
        .set("viewBox", (0.0, 0.0, WIDTH, HEIGHT))
        .set("width", WIDTH)
        .set("height", HEIGHT)
        .add(label(
            MARGIN,
            MARGIN / 2.0,
            format!("Daily Expenses for {} {}", month.month_name(), month.year()),
        ))
        .add(label(
            5.0,
            MARGIN - 8.0,
            format!("Total Expense ({currency}) max {peak:.2}"),
        ));

    for (i, (date, total)) in points.iter().enumerate() {
        let height = total * scale;
        let x = MARGIN + i as f64 * slot + slot * BAR_GAP / 2.0;
        let bar = Rectangle::new()
            .set("x", x)
            .set("y", base_y - height)
            .set("width", slot * (1.0 - BAR_GAP))
            .set("height", height)
            .set("fill", BAR_COLOR);
        let tick_y = base_y + 16.0;
        let tick = label(x, tick_y, date.day().to_string())
            .set("transform", format!("rotate(45 {x} {tick_y})"));
        document = document.add(bar).add(tick);
    }

    document
        .add(axis(MARGIN, MARGIN, MARGIN, base_y))
        .add(axis(MARGIN, base_y, MARGIN + plot_w, base_y))
}

/// Renders the chart and writes it to `path`.
pub fn save_daily_chart(
    ledger: &Ledger,
    currency: &str,
    path: impl AsRef<Path>,
) -> std::io::Result<()> {
    svg::save(path, &render_daily_chart(ledger, currency))
}
