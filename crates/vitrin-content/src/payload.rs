//! Landing document decoding.
//!
//! Detection runs on the text with leading whitespace (and a UTF-8 BOM)
//! ignored:
//!
//! 1. starts with `{`: JSON
//! 2. starts with `---`: frontmatter; the YAML block ends at the next line
//!    beginning with `---`, and whatever follows is the markdown body
//! 3. anything else: a bare YAML document
//!
//! Every format unwraps `meta` the same way: if the decoded root is a
//! mapping whose `meta` value is itself a mapping, that value is the
//! metadata; otherwise the root is. Decode failures are logged and yield
//! empty metadata, never an error.

use serde_json::Value;
use vitrin_core::Metadata;

/// Which encoding the payload was detected as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// `{ "meta": {...} }` or the bare object.
    Json,
    /// `---` delimited YAML followed by a markdown body.
    Frontmatter,
    /// A bare YAML document.
    Yaml,
    /// Nothing to decode (empty or whitespace-only text).
    Empty,
}

/// Result of decoding a fetched document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPayload {
    /// Detected encoding.
    pub format: PayloadFormat,
    /// Canonical metadata; empty when decoding failed.
    pub metadata: Metadata,
    /// Markdown body following a frontmatter block (unused by rendering).
    pub body: String,
}

impl ParsedPayload {
    fn new(format: PayloadFormat, metadata: Metadata, body: impl Into<String>) -> Self {
        Self {
            format,
            metadata,
            body: body.into(),
        }
    }
}

const FRONTMATTER_FENCE: &str = "---";

/// Decode raw fetched text into metadata.
///
/// Never fails; see the module docs for the detection order.
///
/// # Example
///
/// ```
/// use vitrin_content::{parse_payload, PayloadFormat};
///
/// let parsed = parse_payload("---\ncontact:\n  email: a@b.c\n---\n# Body\n");
/// assert_eq!(parsed.format, PayloadFormat::Frontmatter);
/// assert_eq!(parsed.metadata.contact.email.as_deref(), Some("a@b.c"));
/// assert_eq!(parsed.body, "# Body");
/// ```
pub fn parse_payload(raw: &str) -> ParsedPayload {
    let text = raw.trim_start_matches('\u{feff}').trim_start();

    if text.is_empty() {
        return ParsedPayload::new(PayloadFormat::Empty, Metadata::default(), "");
    }

    if text.starts_with('{') {
        let metadata = decode_json(text).map(into_metadata).unwrap_or_default();
        return ParsedPayload::new(PayloadFormat::Json, metadata, "");
    }

    if text.starts_with(FRONTMATTER_FENCE) {
        return parse_frontmatter(text);
    }

    let metadata = decode_yaml(text).map(into_metadata).unwrap_or_default();
    ParsedPayload::new(PayloadFormat::Yaml, metadata, "")
}

/// Split and decode a frontmatter document.
///
/// An unterminated block yields empty metadata with the whole text as body.
fn parse_frontmatter(text: &str) -> ParsedPayload {
    let rest = &text[FRONTMATTER_FENCE.len()..];
    let Some(close) = rest.find("\n---") else {
        log::warn!("frontmatter block is not terminated; ignoring metadata");
        return ParsedPayload::new(PayloadFormat::Frontmatter, Metadata::default(), text);
    };

    let yaml = rest[..close].trim();
    let after_fence = &rest[close + 1 + FRONTMATTER_FENCE.len()..];
    // Drop the remainder of the closing fence line (e.g. `---` followed by spaces).
    let body = after_fence
        .split_once('\n')
        .map_or("", |(_, body)| body)
        .trim();

    let metadata = if yaml.is_empty() {
        Metadata::default()
    } else {
        decode_yaml(yaml).map(into_metadata).unwrap_or_default()
    };
    ParsedPayload::new(PayloadFormat::Frontmatter, metadata, body)
}

fn decode_json(text: &str) -> Option<Value> {
    serde_json::from_str(text)
        .map_err(|e| log::error!("JSON parse error: {e}"))
        .ok()
}

fn decode_yaml(text: &str) -> Option<Value> {
    yaml_serde::from_str(text)
        .map_err(|e| log::error!("YAML parse error: {e}"))
        .ok()
}

/// Apply the canonical `meta` unwrapping rule, then normalise.
fn into_metadata(root: Value) -> Metadata {
    let value = match root {
        Value::Object(mut map) if map.get("meta").is_some_and(Value::is_object) => {
            map.remove("meta").unwrap_or_default()
        }
        other => other,
    };
    Metadata::from_value(value)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const YAML_META: &str = "\
contact:
  phone: \"+90 532 000 00 00\"
  whatsapp_message: Merhaba
contact_links:
  - tag: Web
    label: Site
    url: https://example.com
sections:
  - id: intro
    body: \"# Hoş geldiniz\"
  - figure:
      light: b.jpg
      small-light: a.jpg
";

    fn json_meta() -> &'static str {
        r##"{
            "contact": {"phone": "+90 532 000 00 00", "whatsapp_message": "Merhaba"},
            "contact_links": [{"tag": "Web", "label": "Site", "url": "https://example.com"}],
            "sections": [
                {"id": "intro", "body": "# Hoş geldiniz"},
                {"figure": {"light": "b.jpg", "small-light": "a.jpg"}}
            ]
        }"##
    }

    // ------------------------------------------------------------------------
    // Format equivalence
    // ------------------------------------------------------------------------

    #[test]
    fn test_all_formats_decode_to_same_metadata() {
        let json = parse_payload(json_meta());
        let wrapped = parse_payload(&format!("{{\"meta\": {}}}", json_meta()));
        let frontmatter = parse_payload(&format!("---\n{YAML_META}---\n\nBody text\n"));
        let yaml = parse_payload(YAML_META);
        let yaml_wrapped = parse_payload(&format!(
            "meta:\n{}",
            YAML_META
                .lines()
                .map(|l| format!("  {l}\n"))
                .collect::<String>()
        ));

        assert_eq!(json.format, PayloadFormat::Json);
        assert_eq!(frontmatter.format, PayloadFormat::Frontmatter);
        assert_eq!(yaml.format, PayloadFormat::Yaml);

        assert!(!json.metadata.is_empty());
        assert_eq!(json.metadata, wrapped.metadata);
        assert_eq!(json.metadata, frontmatter.metadata);
        assert_eq!(json.metadata, yaml.metadata);
        assert_eq!(json.metadata, yaml_wrapped.metadata);
    }

    #[test]
    fn test_meta_unwrap_in_frontmatter() {
        let parsed = parse_payload("---\nmeta:\n  contact:\n    email: a@b.c\n---\n");
        assert_eq!(parsed.metadata.contact.email.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn test_non_mapping_meta_is_not_unwrapped() {
        let parsed = parse_payload(r#"{"meta": "ignored", "contact": {"email": "a@b.c"}}"#);
        assert_eq!(parsed.metadata.contact.email.as_deref(), Some("a@b.c"));
    }

    // ------------------------------------------------------------------------
    // Frontmatter splitting
    // ------------------------------------------------------------------------

    #[test]
    fn test_frontmatter_body_is_preserved() {
        let parsed = parse_payload("---\nsections: []\n---\n\n# Title\n\nText\n");
        assert_eq!(parsed.body, "# Title\n\nText");
        assert!(parsed.metadata.sections.is_empty());
    }

    #[test]
    fn test_frontmatter_unterminated_is_empty() {
        let raw = "---\ncontact:\n  email: a@b.c\n";
        let parsed = parse_payload(raw);
        assert_eq!(parsed.format, PayloadFormat::Frontmatter);
        assert!(parsed.metadata.is_empty());
        assert_eq!(parsed.body, raw);
    }

    #[test]
    fn test_frontmatter_empty_block() {
        let parsed = parse_payload("---\n---\nbody");
        assert!(parsed.metadata.is_empty());
        assert_eq!(parsed.body, "body");
    }

    #[test]
    fn test_frontmatter_with_bom_and_leading_whitespace() {
        let parsed = parse_payload("\u{feff}\n  ---\ncontact:\n  phone: \"1\"\n---\n");
        assert_eq!(parsed.format, PayloadFormat::Frontmatter);
        assert_eq!(parsed.metadata.contact.phone.as_deref(), Some("1"));
    }

    #[test]
    fn test_frontmatter_numeric_phone() {
        let parsed = parse_payload("---\ncontact:\n  phone: 905320000000\n---\n");
        assert_eq!(parsed.metadata.contact.phone.as_deref(), Some("905320000000"));
    }

    // ------------------------------------------------------------------------
    // Failure handling
    // ------------------------------------------------------------------------

    #[test]
    fn test_malformed_json_is_empty() {
        let parsed = parse_payload("{ \"contact\": ");
        assert_eq!(parsed.format, PayloadFormat::Json);
        assert!(parsed.metadata.is_empty());
    }

    #[test]
    fn test_malformed_yaml_is_empty() {
        let parsed = parse_payload("---\ncontact: [unclosed\n---\n");
        assert!(parsed.metadata.is_empty());

        let parsed = parse_payload("sections: [unclosed");
        assert_eq!(parsed.format, PayloadFormat::Yaml);
        assert!(parsed.metadata.is_empty());
    }

    #[test]
    fn test_plain_markdown_is_empty() {
        let parsed = parse_payload("# Just a heading\n\nSome prose.\n");
        assert_eq!(parsed.format, PayloadFormat::Yaml);
        assert!(parsed.metadata.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_payload("").format, PayloadFormat::Empty);
        assert_eq!(parse_payload("  \n\t").format, PayloadFormat::Empty);
        assert!(parse_payload("").metadata.is_empty());
    }
}
