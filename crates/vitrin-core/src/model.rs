//! Canonical document metadata.
//!
//! Every wire format (JSON, frontmatter YAML, bare YAML) is decoded into a
//! `serde_json::Value` tree first and then normalised into [`Metadata`] via
//! [`Metadata::from_value`]. Field decoding is lenient: a missing, `null`, or
//! wrongly-typed field degrades to "absent" instead of failing the whole
//! document. Numbers and booleans in string positions are stringified, so a
//! phone number written as a bare YAML integer still works.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::links;

// ============================================================================
// Schema
// ============================================================================

/// Root metadata object for a landing page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    /// Contact channels projected onto the host page.
    #[serde(deserialize_with = "lenient_struct")]
    pub contact: Contact,

    /// Auxiliary links rendered into `data-contact-links` containers.
    #[serde(deserialize_with = "lenient_vec")]
    pub contact_links: Vec<ContactLink>,

    /// Page sections, in document order.
    #[serde(deserialize_with = "lenient_vec")]
    pub sections: Vec<Section>,
}

/// Contact metadata. Every field is optional; empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub phone_display: Option<String>,

    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,

    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub instagram_handle: Option<String>,

    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub whatsapp_message: Option<String>,
}

/// One entry of the auxiliary link list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactLink {
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A page section: optional figure plus optional markdown body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Section {
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(deserialize_with = "lenient_option", skip_serializing_if = "Option::is_none")]
    pub figure: Option<Figure>,
}

/// Image URLs for a section figure.
///
/// `small-light` / `small-dark` are the low-resolution placeholders used in
/// progressive mode; `light` (or legacy `src`) and `dark` are the final
/// images.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Figure {
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub light: Option<String>,

    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,

    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub dark: Option<String>,

    #[serde(
        rename = "small-light",
        alias = "small_light",
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub small_light: Option<String>,

    #[serde(
        rename = "small-dark",
        alias = "small_dark",
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub small_dark: Option<String>,

    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

// ============================================================================
// Accessors
// ============================================================================

impl Metadata {
    /// Normalise a decoded value tree into metadata.
    ///
    /// Anything other than a mapping yields empty metadata.
    pub fn from_value(value: Value) -> Self {
        if !value.is_object() {
            log::debug!("metadata root is not a mapping; using empty metadata");
            return Self::default();
        }
        serde_json::from_value(value).unwrap_or_else(|e| {
            log::error!("metadata normalisation failed: {e}");
            Self::default()
        })
    }

    /// Whether there is nothing at all to render.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl Contact {
    /// Phone text for display: `phone_display`, else the raw phone.
    pub fn display_phone(&self) -> Option<&str> {
        self.phone_display.as_deref().or(self.phone.as_deref())
    }

    /// Instagram handle for display: `instagram_handle`, else the profile URL.
    pub fn display_instagram(&self) -> Option<&str> {
        self.instagram_handle
            .as_deref()
            .or(self.instagram.as_deref())
    }

    /// `https://wa.me/...` deep link, or empty when no phone is set.
    pub fn whatsapp_link(&self) -> String {
        links::whatsapp_link(self.phone.as_deref(), self.whatsapp_message.as_deref())
    }

    /// `tel:` link, or empty when no phone is set.
    pub fn tel_href(&self) -> String {
        links::tel_href(self.phone.as_deref().unwrap_or_default())
    }

    /// `mailto:` link, or empty when no email is set.
    pub fn mailto_href(&self) -> String {
        links::mailto_href(self.email.as_deref().unwrap_or_default())
    }
}

impl Figure {
    /// Final light-scheme URL: `light`, else `src`, else empty.
    pub fn base_url(&self) -> &str {
        self.light
            .as_deref()
            .or(self.src.as_deref())
            .unwrap_or_default()
    }

    /// Whether any low-resolution placeholder is present.
    pub fn is_progressive(&self) -> bool {
        self.small_light.is_some() || self.small_dark.is_some()
    }
}

// ============================================================================
// Lenient field decoding
// ============================================================================

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_struct<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned + Default,
{
    Ok(lenient_option(deserializer)?.unwrap_or_default())
}

fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

// ============================================================================
// Tests
// ============================================================================
