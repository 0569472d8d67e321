//! Scatter plot scene as SVG.
//!
//! Layer order: gridlines, axes, then marks in draw order (largest first) so
//! small marks end up on top.

use crate::models::TimelineView;
use crate::timeline::config::ViewConfig;

use super::html_escape;

/// Renders the plot for `view` using the geometry in `config`.
pub fn render_plot(view: &TimelineView, config: &ViewConfig) -> String {
    let area = config.plot_area();
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" id="chart" viewBox="0 0 {w} {h}" width="{w}" height="{h}" role="img">"#,
        w = config.width,
        h = config.height,
    );
    svg.push('\n');

    if let Some(error) = &view.error {
        svg.push_str(&format!(
            r#"  <text class="placeholder" x="{x:.1}" y="{y:.1}" text-anchor="middle">{msg}</text>"#,
            x = config.width / 2.0,
            y = config.height / 2.0,
            msg = html_escape(error),
        ));
        svg.push_str("\n</svg>\n");
        return svg;
    }

    svg.push_str(r#"  <g class="gridlines">"#);
    svg.push('\n');
    for tick in &view.y_axis {
        svg.push_str(&format!(
            r#"    <line x1="{x1:.1}" x2="{x2:.1}" y1="{y:.2}" y2="{y:.2}" />"#,
            x1 = area.left,
            x2 = area.right,
            y = tick.position,
        ));
        svg.push('\n');
    }
    svg.push_str("  </g>\n");

    svg.push_str(&format!(
        r#"  <g class="x-axis" transform="translate(0, {:.1})">"#,
        area.bottom
    ));
    svg.push('\n');
    for tick in &view.x_axis {
        svg.push_str(&format!(
            r#"    <g class="tick" transform="translate({x:.2}, 0)"><line y2="6" /><text y="18" text-anchor="middle">{label}</text></g>"#,
            x = tick.position,
            label = html_escape(&tick.label),
        ));
        svg.push('\n');
    }
    svg.push_str("  </g>\n");

    svg.push_str(&format!(
        r#"  <g class="y-axis" transform="translate({:.1}, 0)">"#,
        area.left
    ));
    svg.push('\n');
    for tick in &view.y_axis {
        svg.push_str(&format!(
            r#"    <g class="tick" transform="translate(0, {y:.2})"><line x2="-6" /><text x="-9" dy="0.32em" text-anchor="end">{label}</text></g>"#,
            y = tick.position,
            label = html_escape(&tick.label),
        ));
        svg.push('\n');
    }
    svg.push_str("  </g>\n");

    svg.push_str(r#"  <g class="dots">"#);
    svg.push('\n');
    for mark in &view.marks {
        svg.push_str(&format!(
            r#"    <circle data-commit="{id}" cx="{cx:.2}" cy="{cy:.2}" r="{r:.2}" fill="{fill}" fill-opacity="{opacity}"{class}><title>{id}</title></circle>"#,
            id = html_escape(&mark.commit_id),
            cx = mark.cx,
            cy = mark.cy,
            r = mark.r,
            fill = mark.fill,
            opacity = mark.opacity,
            class = if mark.selected { r#" class="selected""# } else { "" },
        ));
        svg.push('\n');
    }
    svg.push_str("  </g>\n</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::record::fixtures::line;
    use crate::timeline::selection::{BrushPhase, SelectionRegion};
    use crate::timeline::TimelineController;
    use crate::models::Point;

    fn controller() -> TimelineController {
        TimelineController::new(
            "loc.csv",
            vec![
                line("small", "a.rs", "rs", "2024-05-01T09:00:00+00:00"),
                line("big", "a.rs", "rs", "2024-05-02T15:00:00+00:00"),
                line("big", "b.rs", "rs", "2024-05-02T15:00:00+00:00"),
                line("big", "c.rs", "rs", "2024-05-02T15:00:00+00:00"),
            ],
            ViewConfig::default(),
        )
    }

    #[test]
    fn test_marks_drawn_largest_first() {
        let svg = render_plot(&controller().view(), &ViewConfig::default());
        let big = svg.find(r#"data-commit="big""#).unwrap();
        let small = svg.find(r#"data-commit="small""#).unwrap();
        assert!(big < small);
        assert!(svg.contains(r#"fill-opacity="0.7""#));
        assert!(svg.contains(r#"viewBox="0 0 1000 600""#));
    }

    #[test]
    fn test_axes_and_selection_class() {
        let mut controller = controller();
        let all = SelectionRegion::new(Point::new(0.0, 0.0), Point::new(1000.0, 600.0));
        controller.brush(BrushPhase::End, Some(all)).unwrap();

        let svg = render_plot(&controller.view(), &ViewConfig::default());
        assert_eq!(svg.matches(r#"class="selected""#).count(), 2);
        assert!(svg.contains(">00:00</text>"));
        assert!(svg.contains(r#"<g class="x-axis" transform="translate(0, 570.0)">"#));
    }

    #[test]
    fn test_placeholder_when_unavailable() {
        let view = TimelineView::placeholder("loc.csv", "No such file <loc.csv>");
        let svg = render_plot(&view, &ViewConfig::default());
        assert!(svg.contains("No such file &lt;loc.csv&gt;"));
        assert!(!svg.contains("<circle"));
    }
}
