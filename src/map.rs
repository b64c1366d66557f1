//! Interactive Map Document
//!
//! Writes the self-contained bubble-map HTML: one toggleable marker layer per
//! category group, popups with the facility details, the top-K shortest
//! cross-category connections as fading red lines, a legend, and a layer
//! control. The document is assembled by string concatenation; the Leaflet
//! runtime it references is an external collaborator, not something this
//! crate reimplements.

use anyhow::Result;
use serde_json::json;

use crate::config::MapConfig;
use crate::distance::FacilityPair;
use crate::error::AtlasError;
use crate::records::FacilityRecord;

/// Render the map document for two resolved groups.
///
/// Fails with the designed-fatal error when no record in either group has
/// coordinates; producing an empty map would hide total resolution failure.
pub fn render_map(
    group_a: &[FacilityRecord],
    group_b: &[FacilityRecord],
    lines: &[FacilityPair],
    cfg: &MapConfig,
) -> Result<String> {
    let coords: Vec<_> = group_a
        .iter()
        .chain(group_b.iter())
        .filter_map(|r| r.coordinates)
        .collect();
    if coords.is_empty() {
        return Err(AtlasError::NoResolvedFacilities(format!(
            "{} + {}",
            cfg.group_a_label, cfg.group_b_label
        ))
        .into());
    }

    let center_lat = coords.iter().map(|c| c.lat).sum::<f64>() / coords.len() as f64;
    let center_lng = coords.iter().map(|c| c.lng).sum::<f64>() / coords.len() as f64;

    let markers_a = marker_payload(group_a, &cfg.group_a_label, &cfg.group_a_color);
    let markers_b = marker_payload(group_b, &cfg.group_b_label, &cfg.group_b_color);
    let line_payload = line_payload(lines, cfg.line_count);

    let mut html = String::with_capacity(16 * 1024);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str("<title>Facility Locations</title>\n");
    html.push_str(
        "<link rel=\"stylesheet\" href=\"https://unpkg.com/leaflet@1.9.4/dist/leaflet.css\"/>\n",
    );
    html.push_str("<script src=\"https://unpkg.com/leaflet@1.9.4/dist/leaflet.js\"></script>\n");
    html.push_str("<style>\n");
    html.push_str("html, body, #map { height: 100%; margin: 0; }\n");
    html.push_str(".legend { position: fixed; bottom: 50px; left: 50px; width: 320px; background: white; border: 2px solid grey; z-index: 9999; font: 14px system-ui, sans-serif; padding: 15px; border-radius: 8px; box-shadow: 0 4px 8px rgba(0,0,0,0.2); }\n");
    html.push_str(".legend .dot { display: inline-block; width: 12px; height: 12px; border-radius: 50%; margin-right: 6px; vertical-align: middle; }\n");
    html.push_str(".legend .note { font-size: 12px; color: #666; margin: 4px 0 0 0; }\n");
    html.push_str("</style>\n</head>\n<body>\n");
    html.push_str("<div id=\"map\"></div>\n");

    // Legend with per-group counts and the line explanation.
    html.push_str("<div class=\"legend\">\n");
    html.push_str("<p style=\"margin:0 0 10px 0; font-weight:bold; font-size:16px;\">Facility Types</p>\n");
    html.push_str(&format!(
        "<p style=\"margin:5px 0;\"><span class=\"dot\" style=\"background:{}\"></span><b>{}</b> ({} facilities)</p>\n",
        cfg.group_a_color,
        cfg.group_a_label,
        group_a.len()
    ));
    html.push_str(&format!(
        "<p style=\"margin:5px 0;\"><span class=\"dot\" style=\"background:{}\"></span><b>{}</b> ({} facilities)</p>\n",
        cfg.group_b_color,
        cfg.group_b_label,
        group_b.len()
    ));
    html.push_str(&format!(
        "<p class=\"note\">Red lines show the {} shortest distances between facility types</p>\n",
        lines.len().min(cfg.line_count)
    ));
    html.push_str("<p class=\"note\">Use the layer control (top right) to toggle visibility</p>\n");
    html.push_str("</div>\n");

    html.push_str("<script>\n");
    html.push_str(&format!(
        "var map = L.map('map').setView([{:.4}, {:.4}], 3);\n",
        center_lat, center_lng
    ));
    html.push_str("L.tileLayer('https://tile.openstreetmap.org/{z}/{x}/{y}.png', { attribution: '&copy; OpenStreetMap contributors' }).addTo(map);\n");

    html.push_str(&format!("var groupA = {};\n", markers_a));
    html.push_str(&format!("var groupB = {};\n", markers_b));
    html.push_str(&format!("var lines = {};\n", line_payload));

    html.push_str(
        r#"function markerLayer(items) {
  var layer = L.layerGroup();
  items.forEach(function (m) {
    L.circleMarker([m.lat, m.lng], {
      radius: 12, color: 'white', weight: 2,
      fillColor: m.color, fillOpacity: 0.8
    }).bindPopup(m.popup, { maxWidth: 320 })
      .bindTooltip(m.tooltip)
      .addTo(layer);
  });
  return layer;
}
var layerA = markerLayer(groupA).addTo(map);
var layerB = markerLayer(groupB).addTo(map);
var lineLayer = L.layerGroup();
lines.forEach(function (l) {
  L.polyline([l.from, l.to], { color: 'red', weight: 2, opacity: l.opacity })
    .bindPopup(l.popup)
    .addTo(lineLayer);
});
lineLayer.addTo(map);
"#,
    );
    html.push_str(&format!(
        "var overlays = {{}};\n\
         overlays['{} Facilities'] = layerA;\n\
         overlays['{} Facilities'] = layerB;\n\
         overlays['Shortest Distances'] = lineLayer;\n\
         L.control.layers(null, overlays).addTo(map);\n",
        cfg.group_a_label, cfg.group_b_label
    ));
    html.push_str("</script>\n</body>\n</html>\n");

    Ok(html)
}

fn marker_payload(records: &[FacilityRecord], label: &str, color: &str) -> String {
    let markers: Vec<_> = records
        .iter()
        .filter_map(|r| {
            let coords = r.coordinates?;
            Some(json!({
                "lat": coords.lat,
                "lng": coords.lng,
                "color": color,
                "tooltip": format!("{} ({})", r.name, label),
                "popup": facility_popup(r, label),
            }))
        })
        .collect();
    serde_json::to_string(&markers).unwrap_or_else(|_| "[]".to_string())
}

fn facility_popup(r: &FacilityRecord, label: &str) -> String {
    let mut popup = String::with_capacity(256);
    popup.push_str("<div style=\"width: 280px;\">");
    popup.push_str(&format!("<b>{}</b><br>", escape(&r.name)));
    popup.push_str(&format!("<b>Type:</b> {}<br>", escape(label)));
    if let Some(product) = &r.product_type {
        popup.push_str(&format!("<b>Product:</b> {}<br>", escape(product)));
    }
    popup.push_str(&format!(
        "<b>Location:</b> {}, {}<br>",
        escape(r.city.as_deref().unwrap_or("-")),
        escape(r.country.as_deref().unwrap_or("-"))
    ));
    if let Some(workers) = r.worker_count {
        popup.push_str(&format!("<b>Total Workers:</b> {}<br>", workers));
    }
    if let Some(pct) = r.female_worker_pct {
        popup.push_str(&format!("<b>Female Workers:</b> {}%<br>", pct));
    }
    if let Some(pct) = r.migrant_worker_pct {
        popup.push_str(&format!("<b>Migrant Workers:</b> {}%", pct));
    }
    popup.push_str("</div>");
    popup
}

fn line_payload(lines: &[FacilityPair], line_count: usize) -> String {
    let k = line_count.max(1);
    let payload: Vec<_> = lines
        .iter()
        .take(line_count)
        .enumerate()
        .map(|(i, pair)| {
            // Fade longer connections.
            let intensity = 1.0 - (i as f64 / k as f64);
            let opacity = 0.3 + intensity * 0.4;
            json!({
                "from": [pair.from.lat, pair.from.lng],
                "to": [pair.to.lat, pair.to.lng],
                "opacity": opacity,
                "popup": format!(
                    "<b>Distance:</b> {:.1} km<br><b>From:</b> {}<br><b>To:</b> {}",
                    pair.distance_km,
                    escape(&pair.facility_a),
                    escape(&pair.facility_b)
                ),
            })
        })
        .collect();
    serde_json::to_string(&payload).unwrap_or_else(|_| "[]".to_string())
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Coordinates;

    fn record(name: &str, lat: f64, lng: f64) -> FacilityRecord {
        FacilityRecord {
            name: name.to_string(),
            category: "FINISHED GOODS".to_string(),
            city: Some("Hanoi".to_string()),
            country: Some("Vietnam".to_string()),
            worker_count: Some(1200.0),
            female_worker_pct: Some(70.0),
            migrant_worker_pct: Some(4.0),
            product_type: Some("Footwear".to_string()),
            coordinates: Some(Coordinates { lat, lng }),
        }
    }

    #[test]
    fn map_document_is_self_contained_html() {
        let cfg = MapConfig::finished_goods_vs_components();
        let a = vec![record("Alpha Plant", 21.0, 105.8)];
        let b = vec![record("Beta Works", 10.8, 106.6)];
        let pairs = crate::distance::rank_pairs(&a, &b);

        let html = render_map(&a, &b, &pairs, &cfg).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Alpha Plant"));
        assert!(html.contains("Beta Works"));
        assert!(html.contains("L.control.layers"));
        assert!(html.contains(&cfg.group_a_color));
        assert!(html.contains("Facility Types"));
    }

    #[test]
    fn empty_groups_are_a_designed_fatal_error() {
        let cfg = MapConfig::finished_goods_vs_components();
        let err = render_map(&[], &[], &[], &cfg).unwrap_err();
        assert!(err.downcast_ref::<AtlasError>().is_some());
    }

    #[test]
    fn popup_escapes_markup_in_names() {
        let mut r = record("A <b>Plant</b> & Co", 0.0, 0.0);
        r.product_type = None;
        let popup = facility_popup(&r, "Components");
        assert!(popup.contains("A &lt;b&gt;Plant&lt;/b&gt; &amp; Co"));
    }
}
