use serde_json::Value;
use tracing::debug;

/// Latitude/longitude from the first embedded JSON-LD payload that carries a
/// `geo` object, either flat or as the first node of an `@graph`. Payloads
/// that fail to parse are skipped. `("", "")` when none qualifies.
pub fn extract_geo<S: AsRef<str>>(payloads: &[S]) -> (String, String) {
    for (idx, raw) in payloads.iter().enumerate() {
        let data: Value = match serde_json::from_str(raw.as_ref()) {
            Ok(v) => v,
            Err(e) => {
                debug!(payload = idx, error = %e, "skipping malformed structured payload");
                continue;
            }
        };
        if let Some(found) = geo_of(&data) {
            return found;
        }
    }
    (String::new(), String::new())
}

fn geo_of(data: &Value) -> Option<(String, String)> {
    let node = match data.get("@graph").and_then(Value::as_array) {
        Some(graph) if !graph.is_empty() => &graph[0],
        _ => data,
    };
    let geo = node.get("geo")?.as_object()?;
    let lat = geo.get("latitude").map(render).unwrap_or_default();
    let lon = geo.get("longitude").map(render).unwrap_or_default();
    if lat.is_empty() && lon.is_empty() { return None; }
    Some((lat, lon))
}

fn render(v: &Value) -> String {
    match v {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_wrapped_payload() {
        let p = r#"{"@context":"https://schema.org","@graph":[{"@type":"Residence","geo":{"latitude":51.7592,"longitude":19.456}}]}"#;
        assert_eq!(extract_geo(&[p]), ("51.7592".to_string(), "19.456".to_string()));
    }

    #[test]
    fn flat_payload_with_string_coords() {
        let p = r#"{"@type":"Place","geo":{"@type":"GeoCoordinates","latitude":"52.2297","longitude":"21.0122"}}"#;
        assert_eq!(extract_geo(&[p]), ("52.2297".to_string(), "21.0122".to_string()));
    }

    #[test]
    fn malformed_payload_does_not_block_later_one() {
        let bad = r#"{"geo": {"latitude": 50.0,"#;
        let unrelated = r#"{"@type":"BreadcrumbList"}"#;
        let good = r#"{"geo":{"latitude":50.06,"longitude":19.94}}"#;
        assert_eq!(extract_geo(&[bad, unrelated, good]), ("50.06".to_string(), "19.94".to_string()));
    }

    #[test]
    fn first_qualifying_payload_wins() {
        let a = r#"{"geo":{"latitude":1.5,"longitude":2.5}}"#;
        let b = r#"{"geo":{"latitude":3.5,"longitude":4.5}}"#;
        assert_eq!(extract_geo(&[a, b]).0, "1.5");
    }

    #[test]
    fn nothing_found() {
        let empty: [&str; 0] = [];
        assert_eq!(extract_geo(&empty), (String::new(), String::new()));
        assert_eq!(extract_geo(&[r#"{"geo":{}}"#]), (String::new(), String::new()));
    }
}
