// HTML page assembly for the temperature dashboard
use crate::domain::chart::{ChartSelection, Trigger};
use std::fmt::Write;
use std::path::Path;

pub const PAGE_HEADER: &str = "Temperature (TC) Visualizations";
pub const CHOOSER_HEADING: &str = "Choose a Visualizations";
pub const SELECT_ACTION: &str = "/temperature/select";

/// Page chrome shared by every response
#[derive(Debug, Clone)]
pub struct PageChrome {
    pub title: String,
    pub footer: String,
    pub stylesheet: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ChartBody {
    Svg(String),
    Empty(String),
}

/// Read the side-loaded stylesheet. A missing file only costs the styling.
pub async fn load_stylesheet(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(css) => Some(css),
        Err(e) => {
            tracing::warn!("Stylesheet {} not loaded: {}", path.display(), e);
            None
        }
    }
}

pub fn render_temperature_page(
    chrome: &PageChrome,
    selection: ChartSelection,
    body: &ChartBody,
) -> String {
    let mut html = String::new();
    open_document(&mut html, chrome);

    let _ = writeln!(html, "<div class='header'>{}</div>", PAGE_HEADER);
    let _ = writeln!(html, "<div class='card'><h3>{}</h3></div>", CHOOSER_HEADING);

    let _ = writeln!(
        html,
        "<form class='chart-buttons' method='post' action='{}'>",
        SELECT_ACTION
    );
    for trigger in Trigger::ALL {
        let active = if trigger.target() == selection {
            " class='active'"
        } else {
            ""
        };
        let _ = writeln!(
            html,
            "<button type='submit' name='chart' value='{}'{}>{}</button>",
            trigger.value(),
            active,
            trigger.label()
        );
    }
    html.push_str("</form>\n");

    let _ = writeln!(
        html,
        "<div class='card'><h3>{}</h3></div>",
        selection.heading()
    );
    match body {
        ChartBody::Svg(svg) => {
            let _ = writeln!(
                html,
                "<div class='chart chart-{}'>{}</div>",
                selection.slug(),
                svg
            );
        }
        ChartBody::Empty(message) => {
            let _ = writeln!(html, "<div class='empty-state'>{}</div>", escape_html(message));
        }
    }

    close_document(&mut html, chrome);
    html
}

/// Fatal page-load failure: no chart can be drawn without data.
pub fn render_error_page(chrome: &PageChrome, message: &str) -> String {
    let mut html = String::new();
    open_document(&mut html, chrome);
    let _ = writeln!(html, "<div class='header'>{}</div>", PAGE_HEADER);
    let _ = writeln!(
        html,
        "<div class='card error'><h3>Unable to load sensor data</h3><p>{}</p></div>",
        escape_html(message)
    );
    close_document(&mut html, chrome);
    html
}

fn open_document(html: &mut String, chrome: &PageChrome) {
    html.push_str("<!DOCTYPE html>\n<html lang='en'>\n<head>\n<meta charset='UTF-8'>\n");
    html.push_str("<meta name='viewport' content='width=device-width, initial-scale=1.0'>\n");
    let _ = writeln!(html, "<title>{}</title>", escape_html(&chrome.title));
    if let Some(css) = &chrome.stylesheet {
        let _ = writeln!(html, "<style>{}</style>", css);
    }
    html.push_str("</head>\n<body class='layout-wide'>\n<main>\n");
}

fn close_document(html: &mut String, chrome: &PageChrome) {
    let _ = writeln!(html, "</main>\n<footer>{}</footer>", escape_html(&chrome.footer));
    html.push_str("</body>\n</html>\n");
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
