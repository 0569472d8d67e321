//! Server-side rendering of a `TimelineView` snapshot.
//!
//! - `svg`: the scatter plot scene as a standalone SVG document
//! - `page`: the full HTML page (range control, stats, plot, selection,
//!   file dot matrix, narrative)
//!
//! Both are pure string builders over the snapshot; they never touch the
//! controller, so what they draw always matches what the JSON API returns.

pub mod page;
pub mod svg;

pub use page::render_page;
pub use svg::render_plot;

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }
}
