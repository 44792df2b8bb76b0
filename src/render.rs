//! Stylesheet resolution for the rendering surface.
//!
//! The finalized pages are layout-free markup; everything visual lives in a
//! single [`Stylesheet`] the rendering surface applies globally. Only three
//! knobs exist: font family (resolved against the installed catalog), font
//! size, and the grid-line style of the cutting guides. The class names in
//! the generated CSS mirror [`crate::pipeline::markup`] exactly.

use crate::config::{BookletConfig, GridLineStyle};
use crate::fonts;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Resolved visual parameters for one booklet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stylesheet {
    /// Concrete family name after catalog resolution.
    pub font_family: String,
    pub font_size_pt: f32,
    pub grid_line: GridLineStyle,
}

impl Stylesheet {
    /// Resolve the configured font against the installed catalog.
    pub fn resolve(config: &BookletConfig) -> Self {
        let catalog = fonts::font_catalog();
        let font_family = fonts::resolve_family(config.font_family.as_deref(), &catalog);
        debug!(
            "Stylesheet resolved: '{}' at {}pt, {:?} grid",
            font_family, config.font_size_pt, config.grid_line
        );
        Self {
            font_family,
            font_size_pt: config.font_size_pt,
            grid_line: config.grid_line,
        }
    }

    /// The global CSS handed to the rendering surface alongside the pages.
    pub fn css(&self) -> String {
        let family = &self.font_family;
        let size = self.font_size_pt;
        let line = self.grid_line.css_keyword();
        format!(
            ".page {{ display: grid; grid-template-columns: repeat(4, 1fr); }}\n\
             .cell {{ border: 0.2pt {line} #888; overflow: hidden; \
             font-family: \"{family}\"; font-size: {size}pt; \
             text-align: justify; }}\n\
             .cell .h1, .cell .h2, .cell .h3, .cell .h4, .cell .h5, .cell .h6 \
             {{ font-weight: bold; }}\n\
             .cell .quote {{ font-style: italic; }}\n\
             .cell .strong {{ font-weight: bold; }}\n\
             .cell .em {{ font-style: italic; }}\n\
             .cell .code {{ font-family: monospace; }}\n\
             .cell .gap {{ white-space: pre; }}\n\
             .cell .rule {{ letter-spacing: 0.3em; }}\n\
             .cell .end {{ font-weight: bold; }}\n\
             .header-main table {{ font-size: {size}pt; }}\n\
             .header-mini {{ font-size: {size}pt; opacity: 0.7; }}\n"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(style: GridLineStyle) -> Stylesheet {
        Stylesheet {
            font_family: "Liberation Mono".into(),
            font_size_pt: 4.5,
            grid_line: style,
        }
    }

    #[test]
    fn css_names_the_resolved_family_and_size() {
        let css = sheet(GridLineStyle::Dashed).css();
        assert!(css.contains("font-family: \"Liberation Mono\""));
        assert!(css.contains("font-size: 4.5pt"));
    }

    #[test]
    fn css_uses_the_configured_grid_line() {
        assert!(sheet(GridLineStyle::Dotted).css().contains("0.2pt dotted"));
        assert!(sheet(GridLineStyle::Solid).css().contains("0.2pt solid"));
    }

    #[test]
    fn unknown_family_resolves_to_fallback() {
        let config = BookletConfig {
            font_family: Some("No Such Family 997".into()),
            ..BookletConfig::default()
        };
        let sheet = Stylesheet::resolve(&config);
        assert_eq!(sheet.font_family, fonts::FALLBACK_FAMILY);
    }
}
