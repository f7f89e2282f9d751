//! Rendering a finished design as text for the consumer.
//!
//! YAML is the default: it is what LLM prompts get, and it is noticeably
//! shorter than JSON for deep trees. Rendering never changes the design.

use crate::builder::SimplifiedDesign;
use crate::error::{DigestError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

/// Render `design` in the requested format.
///
/// # Errors
/// Only if the serializer itself fails, which a well-formed design never
/// triggers.
pub fn render(design: &SimplifiedDesign, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => Ok(serde_yaml::to_string(design)?),
        OutputFormat::Json => serde_json::to_string_pretty(design).map_err(DigestError::Json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_from_value;
    use crate::config::DigestConfig;
    use serde_json::json;

    fn design() -> SimplifiedDesign {
        build_from_value(
            json!({
                "name": "Doc",
                "lastModified": "2024-01-01T00:00:00Z",
                "document": {"id": "0:0", "name": "Document", "type": "DOCUMENT", "children": [
                    {"id": "1:1", "name": "Hero", "type": "FRAME",
                     "fills": [{"type": "SOLID"}], "opacity": 0.5}
                ]}
            }),
            &DigestConfig::seeded(9),
        )
        .unwrap()
    }

    #[test]
    fn yaml_has_top_level_sections() {
        let text = render(&design(), OutputFormat::Yaml).unwrap();
        for key in ["metadata:", "nodes:", "components:", "componentSets:", "globalVars:"] {
            assert!(text.contains(key), "missing {key} in:\n{text}");
        }
        assert!(text.contains("opacity: 0.5"));
    }

    #[test]
    fn json_round_trips_as_value() {
        let d = design();
        let text = render(&d, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let fill_id = d.nodes[0].fills.clone().unwrap();
        assert_eq!(value["nodes"][0]["fills"], json!(fill_id));
        assert_eq!(value["globalVars"]["styles"][&fill_id], json!([{"type": "SOLID"}]));
        // Empty optional fields stay out of the output.
        assert!(value["nodes"][0].get("children").is_none());
        assert!(value["nodes"][0].get("text").is_none());
    }
}
