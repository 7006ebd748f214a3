pub mod report;

use colored::Colorize;

use crate::view::{ImageView, ViewBody, ViewTree};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }

    pub fn renderer(self) -> Box<dyn Renderer> {
        match self {
            Self::Text => Box::new(TextRenderer),
            Self::Json => Box::new(JsonRenderer),
            Self::Html => Box::new(HtmlRenderer),
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

/// Materializes a [`ViewTree`] on some surface.
///
/// Output always describes the whole tree; callers replace whatever they
/// showed before.
pub trait Renderer {
    fn render(&self, view: &ViewTree) -> Vec<u8>;
}

pub struct TextRenderer;

pub struct JsonRenderer;

pub struct HtmlRenderer;

impl Renderer for TextRenderer {
    fn render(&self, view: &ViewTree) -> Vec<u8> {
        render_text(view)
    }
}

impl Renderer for JsonRenderer {
    fn render(&self, view: &ViewTree) -> Vec<u8> {
        render_json(view)
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, view: &ViewTree) -> Vec<u8> {
        report::render_html(view)
    }
}

pub fn render_text(view: &ViewTree) -> Vec<u8> {
    let mut out = String::new();
    match &view.body {
        ViewBody::Loading => {
            out.push_str(&format!("{}\n", "Cargando certificados...".dimmed()));
        }
        ViewBody::Error { message } => {
            out.push_str(&format!("{} {}\n", "[ERR]".bold().red(), message));
        }
        ViewBody::Empty { message } => {
            out.push_str(&format!("{} {}\n", "[INF]".bold().yellow(), message));
        }
        ViewBody::Gallery(gallery) => {
            let controls = gallery
                .sort_controls
                .iter()
                .map(|c| {
                    if c.active {
                        format!("[{}]", c.label).bold().cyan().to_string()
                    } else {
                        c.label.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(" ");
            out.push_str(&format!(
                ":: {:<10}: {}\n",
                "Total",
                gallery.total.to_string().bold().cyan()
            ));
            out.push_str(&format!(":: {:<10}: {}\n", "Ordenar", controls));
            out.push_str(&format!(":: {:<10}: {}\n\n", "Secciones", gallery.toggle_label));

            for section in &gallery.sections {
                let marker = if section.open { "▾" } else { "▸" };
                out.push_str(&format!(
                    "{} {} ({})\n",
                    marker.bold().green(),
                    section.name.bold().white(),
                    section.count
                ));
                if !section.open {
                    continue;
                }
                for card in &section.cards {
                    let image = match &card.image {
                        ImageView::Image { .. } => "🖼",
                        ImageView::Placeholder { .. } => "📄",
                    };
                    out.push_str(&format!("    {} {}\n", image, card.title.bold()));
                    out.push_str(&format!("      {}\n", card.institution));
                    out.push_str(&format!("      {}\n", card.date_label.dimmed()));
                    if !card.link.is_empty() {
                        out.push_str(&format!("      {}\n", card.link.underline().blue()));
                    }
                }
            }
        }
    }
    out.into_bytes()
}

pub fn render_json(view: &ViewTree) -> Vec<u8> {
    let mut out = serde_json::to_vec_pretty(view).unwrap_or_else(|_| b"{}".to_vec());
    out.push(b'\n');
    out
}
