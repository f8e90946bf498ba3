//! Standalone preview documents for inputs that are not HTML.

use base64::{Engine as _, engine::general_purpose};

use crate::classify::mime_essence;

/// Full-viewport page centring a single embedded image.
pub fn image_preview(content_type: &str, bytes: &[u8]) -> String {
  let encoded = general_purpose::STANDARD.encode(bytes);
  format!(
    r#"<!DOCTYPE html><html><head><meta charset="UTF-8"></head><body style="margin:0;display:flex;justify-content:center;align-items:center;height:100vh;background:#f0f0f0;"><img src="data:{mime};base64,{encoded}" style="max-width:100%;max-height:100%;object-fit:contain;"></body></html>"#,
    mime = mime_essence(content_type),
  )
}

/// Page showing `bytes` as escaped, wrapped monospace text.
///
/// Bytes are read as UTF-8 with invalid sequences replaced; nothing is transcoded.
pub fn text_preview(bytes: &[u8]) -> String {
  let text = String::from_utf8_lossy(bytes);
  format!(
    r#"<!DOCTYPE html><html><head><meta charset="UTF-8"></head><body style="margin:0;padding:10px;"><pre style="white-space:pre-wrap;word-wrap:break-word;font-family:monospace;">{}</pre></body></html>"#,
    html_escape::encode_text(&text)
  )
}
