//! Full HTML page for a timeline snapshot.
//!
//! The page is self-contained: inline CSS plus a small script that forwards
//! slider input, narrative scrolling, mark hover and brush drags to the JSON
//! API and patches the page from the returned `TimelineView`.

use crate::models::{NarrativeCheckpointView, TimelineView};
use crate::timeline::config::ViewConfig;

use super::{html_escape, render_plot};

pub fn render_page(
    view: &TimelineView,
    narrative: &[NarrativeCheckpointView],
    config: &ViewConfig,
) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Commit timeline - {source}</title>
    <style>{css}</style>
</head>
<body>
    <header>
        <h1>Commit timeline</h1>
        <p class="meta">{source}</p>
        {error}
    </header>
    {range}
    {stats}
    <div class="plot-area">
        {plot}
        {tooltip}
    </div>
    {selection}
    {legend}
    {files}
    {narrative}
    <script>{js}</script>
</body>
</html>"#,
        source = html_escape(&view.source),
        css = CSS,
        js = JS,
        error = render_error(view),
        range = render_range(view),
        stats = render_stats(view),
        plot = render_plot(view, config),
        tooltip = render_tooltip(view),
        selection = render_selection(view),
        legend = render_legend(view),
        files = render_files(view),
        narrative = render_narrative(narrative),
    )
}

fn render_error(view: &TimelineView) -> String {
    view.error
        .as_deref()
        .map(|e| format!(r#"<p class="error">{}</p>"#, html_escape(e)))
        .unwrap_or_default()
}

fn render_range(view: &TimelineView) -> String {
    let Some(range) = view.range else {
        return String::new();
    };
    let label = view
        .cursor
        .as_ref()
        .map(|c| html_escape(&c.label))
        .unwrap_or_default();

    format!(
        r#"<label class="range">
        Show commits until:
        <input id="commit-progress" type="range" min="{min}" max="{max}" value="{value}" step="any" style="--fill: {fill:.2}%">
        <time>{label}</time>
    </label>"#,
        min = range.min,
        max = range.max,
        value = range.value,
        fill = range.fill_percent,
        label = label,
    )
}

fn render_stats(view: &TimelineView) -> String {
    let items: String = view
        .stat_items
        .iter()
        .map(|item| format!("<div><dt>{}</dt><dd>{}</dd></div>", item.label, item.value))
        .collect();
    format!(r#"<dl id="stats" class="stats">{}</dl>"#, items)
}

fn render_tooltip(view: &TimelineView) -> String {
    let tooltip = &view.tooltip;
    if !tooltip.visible {
        return r#"<dl id="commit-tooltip" class="info tooltip" hidden></dl>"#.to_string();
    }
    let id = html_escape(tooltip.commit_id.as_deref().unwrap_or_default());
    let url = html_escape(tooltip.url.as_deref().unwrap_or_default());
    let date = html_escape(tooltip.date.as_deref().unwrap_or_default());

    format!(
        r#"<dl id="commit-tooltip" class="info tooltip" style="left: {left:.0}px; top: {top:.0}px">
            <dt>Commit</dt><dd><a href="{url}" target="_blank">{id}</a></dd>
            <dt>Date</dt><dd>{date}</dd>
        </dl>"#,
        left = tooltip.left,
        top = tooltip.top,
    )
}

fn render_selection(view: &TimelineView) -> String {
    let breakdown: String = view
        .selection
        .breakdown
        .iter()
        .map(|share| {
            format!(
                "<div><dt>{}</dt><dd>{} lines ({})</dd></div>",
                html_escape(&share.category),
                share.lines,
                share.percent
            )
        })
        .collect();

    format!(
        r#"<p id="selection-count">{label}</p>
    <dl id="language-breakdown" class="stats">{breakdown}</dl>"#,
        label = view.selection.label,
        breakdown = breakdown,
    )
}

fn render_legend(view: &TimelineView) -> String {
    let entries: String = view
        .categories
        .iter()
        .map(|entry| {
            format!(
                r#"<li style="--color: {color}"><span class="swatch"></span>{category} <em>({lines})</em></li>"#,
                color = entry.color,
                category = html_escape(&entry.category),
                lines = entry.lines,
            )
        })
        .collect();
    format!(r#"<ul class="legend">{}</ul>"#, entries)
}

fn render_files(view: &TimelineView) -> String {
    if view.files.is_empty() {
        return r#"<dl class="files"><p class="empty">No files</p></dl>"#.to_string();
    }

    let rows: String = view
        .files
        .iter()
        .map(|file| {
            let dots: String = file
                .dots
                .iter()
                .map(|dot| {
                    let title = dot.line.map(|n| format!(r#" title="line {}""#, n)).unwrap_or_default();
                    format!(r#"<div class="loc" style="--color: {}"{}></div>"#, dot.color, title)
                })
                .collect();
            format!(
                r#"<div><dt><code>{name}</code><small>{lines} lines</small></dt><dd>{dots}</dd></div>"#,
                name = html_escape(&file.name),
                lines = file.lines,
                dots = dots,
            )
        })
        .collect();
    format!(r#"<dl class="files">{}</dl>"#, rows)
}

fn render_narrative(checkpoints: &[NarrativeCheckpointView]) -> String {
    let steps: String = checkpoints
        .iter()
        .map(|step| {
            format!(
                r#"<div class="step{active}" data-commit="{id}" style="height: {height}px"><p>{text}</p></div>"#,
                active = if step.active { " active" } else { "" },
                id = html_escape(&step.commit_id),
                height = step.height,
                text = html_escape(&step.text),
            )
        })
        .collect();
    format!(r#"<div id="scrollytelling"><div id="scroll-container">{}</div></div>"#, steps)
}

const CSS: &str = r#"
body {
    font-family: system-ui, -apple-system, 'Segoe UI', sans-serif;
    max-width: 1100px;
    margin: 0 auto;
    padding: 1rem 2rem;
    color: #1f2933;
}
header .meta { color: #6b7280; font-size: 0.875rem; }
.error { color: #b42318; }
.range { display: flex; gap: 1em; align-items: baseline; }
.range input { flex: 1; }
.range time { margin-left: auto; }
#commit-progress {
    appearance: none;
    height: 0.5em;
    border-radius: 0.25em;
    background: linear-gradient(to right, #4f7cac var(--fill, 100%), #e5e7eb var(--fill, 100%));
}
.stats {
    display: grid;
    grid-template-columns: repeat(auto-fit, minmax(8em, 1fr));
    gap: 0.5em;
}
.stats dt { font-size: 0.75rem; color: #6b7280; }
.stats dd { margin: 0; font-size: 1.5rem; }
.plot-area { position: relative; }
#chart .gridlines line { stroke: #e5e7eb; }
#chart .tick line { stroke: #9ca3af; }
#chart .tick text { font-size: 10px; fill: #4b5563; }
#chart circle { transition: all 200ms; }
#chart circle.selected { stroke: #ff6b6b; stroke-width: 2; }
#chart rect.brush { fill: rgba(79, 124, 172, 0.15); stroke: #4f7cac; }
#chart { touch-action: none; }
.tooltip {
    position: absolute;
    background: rgba(255, 255, 255, 0.9);
    box-shadow: 0 1px 4px rgba(0, 0, 0, 0.2);
    border-radius: 4px;
    padding: 0.5em;
    margin: 0;
}
.legend { display: flex; gap: 1.5em; list-style: none; padding: 0; }
.swatch {
    display: inline-block;
    width: 1em;
    height: 1em;
    margin-right: 0.3em;
    border-radius: 50%;
    background: var(--color);
}
.files > div { display: grid; grid-template-columns: subgrid; grid-column: 1 / -1; }
.files { display: grid; grid-template-columns: 1fr 4fr; }
.files dt small { display: block; font-size: 0.75em; opacity: 0.6; }
.files dd { display: flex; flex-wrap: wrap; align-content: start; gap: 0.15em; margin: 0; }
.loc { width: 0.5em; aspect-ratio: 1; border-radius: 50%; background: var(--color); }
#scroll-container { position: relative; }
.step { padding-bottom: 1em; opacity: 0.6; }
.step.active { opacity: 1; }
"#;

const JS: &str = r#"
const send = async (method, url, body) => {
    const init = { method, headers: { 'Content-Type': 'application/json' } };
    if (body !== undefined) init.body = JSON.stringify(body);
    const res = await fetch(url, init);
    return res.ok ? res.json() : null;
};

const el = (tag, attrs = {}, text) => {
    const node = document.createElement(tag);
    for (const [key, value] of Object.entries(attrs)) node.setAttribute(key, value);
    if (text !== undefined) node.textContent = text;
    return node;
};

const plotArea = document.querySelector('.plot-area');
const tooltip = document.getElementById('commit-tooltip');
const slider = document.getElementById('commit-progress');

function applyRange(view) {
    if (!slider || !view.range) return;
    slider.value = view.range.value;
    slider.style.setProperty('--fill', view.range.fill_percent.toFixed(2) + '%');
    const time = slider.parentElement.querySelector('time');
    if (time && view.cursor) time.textContent = view.cursor.label;
}

function applyMarks(view) {
    for (const mark of view.marks) {
        const circle = document.querySelector('#chart circle[data-commit="' + CSS.escape(mark.commit_id) + '"]');
        if (!circle) continue;
        circle.setAttribute('fill-opacity', mark.opacity);
        circle.classList.toggle('selected', mark.selected);
    }
}

function applyTooltip(view) {
    const tip = view.tooltip;
    tooltip.hidden = !tip.visible;
    if (!tip.visible) return;
    tooltip.replaceChildren(
        el('dt', {}, 'Commit'),
        el('dd'),
        el('dt', {}, 'Date'),
        el('dd', {}, tip.date || ''),
    );
    tooltip.children[1].append(el('a', { href: tip.url || '', target: '_blank' }, tip.commit_id || ''));
    tooltip.style.left = tip.left + 'px';
    tooltip.style.top = tip.top + 'px';
}

function applySelection(view) {
    document.getElementById('selection-count').textContent = view.selection.label;
    document.getElementById('language-breakdown').replaceChildren(
        ...view.selection.breakdown.map((share) => {
            const row = el('div');
            row.append(el('dt', {}, share.category), el('dd', {}, share.lines + ' lines (' + share.percent + ')'));
            return row;
        }),
    );
}

function applyPanels(view) {
    document.getElementById('stats').replaceChildren(
        ...view.stat_items.map((item) => {
            const row = el('div');
            row.append(el('dt', {}, item.label), el('dd', {}, item.value));
            return row;
        }),
    );
    document.querySelector('.legend').replaceChildren(
        ...view.categories.map((entry) => {
            const li = el('li', { style: '--color: ' + entry.color });
            li.append(el('span', { class: 'swatch' }), entry.category + ' ', el('em', {}, '(' + entry.lines + ')'));
            return li;
        }),
    );
    const files = document.querySelector('.files');
    if (view.files.length === 0) {
        files.replaceChildren(el('p', { class: 'empty' }, 'No files'));
        return;
    }
    files.replaceChildren(
        ...view.files.map((file) => {
            const dt = el('dt');
            dt.append(el('code', {}, file.name), el('small', {}, file.lines + ' lines'));
            const dd = el('dd');
            for (const dot of file.dots) {
                const attrs = { class: 'loc', style: '--color: ' + dot.color };
                if (dot.line !== null) attrs.title = 'line ' + dot.line;
                dd.append(el('div', attrs));
            }
            const row = el('div');
            row.append(dt, dd);
            return row;
        }),
    );
}

function applyNarrative(view) {
    for (const step of document.querySelectorAll('.step')) {
        step.classList.toggle('active', step.dataset.commit === view.narrative_active);
    }
}

// The cursor moved: marks and axes changed, so the plot is swapped whole.
async function applyCursorView(view) {
    const res = await fetch('/plot.svg');
    if (res.ok) {
        document.getElementById('chart').outerHTML = await res.text();
        bindChart();
    }
    applyRange(view);
    applyTooltip(view);
    applySelection(view);
    applyPanels(view);
    applyNarrative(view);
}

function pointerIn(svg, event) {
    const point = svg.createSVGPoint();
    point.x = event.clientX;
    point.y = event.clientY;
    const local = point.matrixTransform(svg.getScreenCTM().inverse());
    return [local.x, local.y];
}

function bindChart() {
    const svg = document.getElementById('chart');
    if (!svg) return;

    for (const circle of svg.querySelectorAll('circle[data-commit]')) {
        circle.addEventListener('mouseenter', async (event) => {
            const bounds = plotArea.getBoundingClientRect();
            const view = await send('POST', '/api/v1/hover', {
                commit: circle.dataset.commit,
                pointer: { x: event.clientX - bounds.left, y: event.clientY - bounds.top },
            });
            if (view) {
                applyMarks(view);
                applyTooltip(view);
            }
        });
        circle.addEventListener('mouseleave', async () => {
            const view = await send('DELETE', '/api/v1/hover');
            if (view) {
                applyMarks(view);
                applyTooltip(view);
            }
        });
    }

    let origin = null;
    let rect = null;
    let inFlight = false;
    const region = (event) => [origin, pointerIn(svg, event)];
    const brush = async (phase, event) => {
        const view = await send('POST', '/api/v1/selection', { phase, region: region(event) });
        if (view) {
            applyMarks(view);
            applySelection(view);
            applyPanels(view);
        }
    };

    svg.addEventListener('pointerdown', (event) => {
        if (event.target.matches('circle')) return;
        origin = pointerIn(svg, event);
        rect = document.createElementNS('http://www.w3.org/2000/svg', 'rect');
        rect.setAttribute('class', 'brush');
        svg.append(rect);
        svg.setPointerCapture(event.pointerId);
        brush('start', event);
    });
    svg.addEventListener('pointermove', async (event) => {
        if (!origin) return;
        const [[x0, y0], [x1, y1]] = region(event);
        rect.setAttribute('x', Math.min(x0, x1));
        rect.setAttribute('y', Math.min(y0, y1));
        rect.setAttribute('width', Math.abs(x1 - x0));
        rect.setAttribute('height', Math.abs(y1 - y0));
        if (inFlight) return;
        inFlight = true;
        try {
            await brush('move', event);
        } finally {
            inFlight = false;
        }
    });
    svg.addEventListener('pointerup', async (event) => {
        if (!origin) return;
        await brush('end', event);
        origin = null;
    });
}

bindChart();

document.addEventListener('keydown', async (event) => {
    if (event.key !== 'Escape') return;
    const view = await send('DELETE', '/api/v1/selection');
    document.querySelector('#chart rect.brush')?.remove();
    if (view) {
        applyMarks(view);
        applySelection(view);
        applyPanels(view);
    }
});

if (slider) {
    let latest = 0;
    slider.addEventListener('input', async () => {
        const token = ++latest;
        const view = await send('POST', '/api/v1/cursor/range', { value: Number(slider.value) });
        if (view && token === latest) await applyCursorView(view);
    });
}

let pending = false;
window.addEventListener('scroll', () => {
    if (pending) return;
    pending = true;
    requestAnimationFrame(async () => {
        try {
            const container = document.getElementById('scroll-container');
            const top = container ? -container.getBoundingClientRect().top : window.scrollY;
            const active = document.querySelector('.step.active');
            const view = await send('POST', '/api/v1/narrative/scroll', {
                scroll_top: top,
                viewport_height: window.innerHeight,
            });
            if (view && view.narrative_active && (!active || active.dataset.commit !== view.narrative_active)) {
                await applyCursorView(view);
            }
        } finally {
            pending = false;
        }
    });
});
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Point;
    use crate::timeline::record::fixtures::line;
    use crate::timeline::TimelineController;

    fn controller() -> TimelineController {
        TimelineController::new(
            "data/<loc>.csv",
            vec![
                line("c1", "src/a.rs", "rs", "2024-05-01T09:00:00+00:00"),
                line("c1", "style.css", "css", "2024-05-01T09:00:00+00:00"),
                line("c2", "src/a.rs", "rs", "2024-05-03T21:00:00+00:00"),
            ],
            ViewConfig::default(),
        )
    }

    #[test]
    fn test_page_has_every_panel() {
        let controller = controller();
        let html = render_page(
            &controller.view(),
            &controller.narrative().views(),
            &ViewConfig::default(),
        );

        assert!(html.contains("Commit timeline - data/&lt;loc&gt;.csv"));
        assert!(html.contains(r#"id="commit-progress""#));
        assert!(html.contains("<dt>TOTAL LOC</dt><dd>3</dd>"));
        assert!(html.contains("<svg"));
        assert!(html.contains("No commits selected"));
        assert!(html.contains("<code>src/a.rs</code><small>2 lines</small>"));
        assert_eq!(html.matches(r#"class="step"#).count(), 2);
        assert!(html.contains(r#"id="commit-tooltip" class="info tooltip" hidden"#));
    }

    #[test]
    fn test_tooltip_positioned_near_pointer() {
        let mut controller = controller();
        controller.hover("c2", Point::new(100.0, 50.0)).unwrap();
        let html = render_page(&controller.view(), &[], &ViewConfig::default());

        assert!(html.contains("left: 110px; top: 60px"));
        assert!(html.contains("https://github.com/vis-society/lab-7/commit/c2"));
    }

    #[test]
    fn test_script_drives_every_input() {
        let controller = controller();
        let html = render_page(&controller.view(), &[], &ViewConfig::default());

        assert!(html.contains("'/api/v1/hover'"));
        assert!(html.contains("'/api/v1/selection'"));
        assert!(html.contains("'/api/v1/cursor/range'"));
        assert!(html.contains("'/api/v1/narrative/scroll'"));
        assert!(html.contains("slider.addEventListener('input'"));
        assert!(!html.contains("addEventListener('change'"));
        assert!(html.contains("finally {\n            pending = false;"));
    }

    #[test]
    fn test_range_fill_is_styled() {
        let controller = controller();
        let html = render_page(&controller.view(), &[], &ViewConfig::default());

        assert!(html.contains("style=\"--fill: 100.00%\""));
        assert!(html.contains("#4f7cac var(--fill, 100%)"));
    }

    #[test]
    fn test_unavailable_page_shows_error() {
        let view = TimelineView::placeholder("loc.csv", "Missing required column: commit");
        let html = render_page(&view, &[], &ViewConfig::default());
        assert!(html.contains(r#"<p class="error">Missing required column: commit</p>"#));
        assert!(!html.contains(r#"id="commit-progress""#));
        assert!(html.contains(r#"<p class="empty">No files</p>"#));
    }
}
