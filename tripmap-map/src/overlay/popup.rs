//! Popup markup for a location marker.

use tripmap_core::Location;

/// Render the popup shown when a location's marker is activated.
///
/// Shows the name, the human-readable type label, the optional description
/// and the coordinates at six decimal places. Text is HTML-escaped.
///
/// # Examples
/// ```
/// use tripmap_core::{LngLat, Location};
/// use tripmap_map::popup_content;
///
/// let html = popup_content(&Location::new(
///     "Temple of Heaven",
///     LngLat::new(116.407_1, 39.882_2),
///     "cultural",
/// ));
/// assert!(html.contains("Type: Cultural venue"));
/// assert!(html.contains("Coordinates: 39.882200, 116.407100"));
/// ```
#[must_use]
pub fn popup_content(location: &Location) -> String {
    let description = location
        .description
        .as_deref()
        .filter(|text| !text.is_empty())
        .map(|text| {
            format!(
                r#"<p style="margin: 0 0 4px 0; font-size: 12px; color: #606266;">{}</p>"#,
                escape(text)
            )
        })
        .unwrap_or_default();
    format!(
        concat!(
            r#"<div style="padding: 8px; max-width: 200px;">"#,
            r#"<h4 style="margin: 0 0 8px 0; font-size: 14px; color: #303133;">{name}</h4>"#,
            r#"<p style="margin: 0 0 4px 0; font-size: 12px; color: #606266;">Type: {label}</p>"#,
            "{description}",
            r#"<p style="margin: 0; font-size: 12px; color: #909399;">Coordinates: {lat:.6}, {lng:.6}</p>"#,
            "</div>",
        ),
        name = escape(&location.name),
        label = escape(location.kind_label()),
        description = description,
        lat = location.lat,
        lng = location.lng,
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
