//! The three document encodings render the same page.

use vitrin_content::{PayloadFormat, parse_payload};
use vitrin_core::RenderContext;
use vitrin_dom::{PageContext, SectionBuilder, bind_contact, landing_shell};

const YAML: &str = r##"contact:
  phone: 90 532 000 00 00
  phone_display: "0532 000 00 00"
  email: info@example.com
  instagram: https://instagram.com/shop
  instagram_handle: "@shop"
  whatsapp_message: Merhaba
contact_links:
  - tag: Web
    label: shop.example
    url: https://shop.example
  - tag: Adres
    label: Kadıköy
sections:
  - id: hero
    body: "# Hoş geldiniz\n\nBize [yazın]({{ whatsapp_link }})"
    figure:
      light: hero.jpg
      dark: hero-dark.jpg
      small-light: hero-small.jpg
      small-dark: hero-dark-small.jpg
      alt: Vitrin
  - body: "Sadece metin"
"##;

const JSON: &str = r##"{
  "meta": {
    "contact": {
      "phone": "90 532 000 00 00",
      "phone_display": "0532 000 00 00",
      "email": "info@example.com",
      "instagram": "https://instagram.com/shop",
      "instagram_handle": "@shop",
      "whatsapp_message": "Merhaba"
    },
    "contact_links": [
      {"tag": "Web", "label": "shop.example", "url": "https://shop.example"},
      {"tag": "Adres", "label": "Kadıköy"}
    ],
    "sections": [
      {
        "id": "hero",
        "body": "# Hoş geldiniz\n\nBize [yazın]({{ whatsapp_link }})",
        "figure": {
          "light": "hero.jpg",
          "dark": "hero-dark.jpg",
          "small-light": "hero-small.jpg",
          "small-dark": "hero-dark-small.jpg",
          "alt": "Vitrin"
        }
      },
      {"body": "Sadece metin"}
    ]
  }
}"##;

/// Decode `raw` and render it onto a fresh host page.
fn render(raw: &str) -> (PayloadFormat, String) {
    let parsed = parse_payload(raw);
    let page = PageContext::new(landing_shell("vitrin").unwrap().into_shared());
    let context = RenderContext::from_contact(&parsed.metadata.contact);

    SectionBuilder::new().render(&page, &parsed.metadata.sections, &context);
    bind_contact(&page, &parsed.metadata, &context);

    let html = page.document().to_html();
    (parsed.format, html)
}

#[test]
fn test_json_frontmatter_and_yaml_render_identically() {
    let (json_format, json_html) = render(JSON);
    let (fm_format, fm_html) = render(&format!("---\n{YAML}---\n\nIgnored body\n"));
    let (yaml_format, yaml_html) = render(YAML);

    assert_eq!(json_format, PayloadFormat::Json);
    assert_eq!(fm_format, PayloadFormat::Frontmatter);
    assert_eq!(yaml_format, PayloadFormat::Yaml);

    assert_eq!(json_html, fm_html);
    assert_eq!(json_html, yaml_html);

    // The shared page carries the rendered sections and the bound contact data.
    let wa = "https://wa.me/905320000000?text=Merhaba";
    assert!(json_html.contains("<section class=\"view\" id=\"hero\">"));
    assert!(json_html.contains("id=\"section_2\""));
    assert!(json_html.contains(&format!("href=\"{wa}\"")));
    assert!(json_html.contains("href=\"mailto:info@example.com\""));
    assert!(json_html.contains("data-large-dark=\"hero-dark.jpg\""));
    assert!(json_html.contains("0532 000 00 00"));
    assert!(json_html.contains("<span class=\"tag\">Adres</span><span>Kadıköy</span>"));
}
