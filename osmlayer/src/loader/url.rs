//! Tile URL templates.
//!
//! Templates follow the slippy-map convention:
//!
//! - `{z}` zoom, `{x}` column, `{y}` row (XYZ, 0 at north)
//! - `{-y}` row counted from the south (TMS)
//! - `{s}` subdomain, rotated by `(x + y) % subdomains.len()`
//!
//! Example: `https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png`

use crate::coord::{tiles_per_axis, TileCoord, MAX_ZOOM};
use crate::error::LayerError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Zoom,
    X,
    Y,
    TmsY,
    Subdomain,
}

/// A parsed tile URL template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    segments: Vec<Segment>,
    subdomains: Vec<String>,
}

impl UrlTemplate {
    /// Parse a template, checking that it addresses tiles unambiguously.
    ///
    /// # Arguments
    ///
    /// * `template` - URL with `{z}`, `{x}` and `{y}` or `{-y}` placeholders
    /// * `subdomains` - Values substituted for `{s}`
    ///
    /// # Returns
    ///
    /// The parsed template, or `LayerError::InvalidTemplate` naming the problem.
    pub fn parse(template: &str, subdomains: Vec<String>) -> Result<Self, LayerError> {
        let invalid = |reason: &str| LayerError::InvalidTemplate {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = Vec::new();
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }
            let close = rest[open..]
                .find('}')
                .map(|i| open + i)
                .ok_or_else(|| invalid("unterminated placeholder"))?;
            let segment = match &rest[open + 1..close] {
                "z" => Segment::Zoom,
                "x" => Segment::X,
                "y" => Segment::Y,
                "-y" => Segment::TmsY,
                "s" => Segment::Subdomain,
                other => return Err(invalid(&format!("unknown placeholder {{{}}}", other))),
            };
            segments.push(segment);
            rest = &rest[close + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        let has = |s: &Segment| segments.contains(s);
        if !has(&Segment::Zoom) {
            return Err(invalid("missing {z}"));
        }
        if !has(&Segment::X) {
            return Err(invalid("missing {x}"));
        }
        if !has(&Segment::Y) && !has(&Segment::TmsY) {
            return Err(invalid("missing {y} or {-y}"));
        }
        if has(&Segment::Subdomain) && subdomains.is_empty() {
            return Err(invalid("{s} used without subdomains"));
        }

        Ok(Self {
            segments,
            subdomains,
        })
    }

    /// Build the URL for a tile. The world copy does not affect the URL.
    pub fn expand(&self, tile: &TileCoord) -> String {
        let mut url = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => url.push_str(text),
                Segment::Zoom => url.push_str(&tile.zoom.to_string()),
                Segment::X => url.push_str(&tile.x.to_string()),
                Segment::Y => url.push_str(&tile.y.to_string()),
                Segment::TmsY => {
                    // Rows outside the grid clamp to the southern edge.
                    let last_row = tiles_per_axis(tile.zoom.min(MAX_ZOOM)) - 1;
                    let row = last_row.saturating_sub(tile.y);
                    url.push_str(&row.to_string());
                }
                Segment::Subdomain => {
                    let index = (tile.x as usize + tile.y as usize) % self.subdomains.len();
                    url.push_str(&self.subdomains[index]);
                }
            }
        }
        url
    }
}
