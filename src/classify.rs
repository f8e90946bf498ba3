//! Content sniffing and selection of the per-file processing strategy.

use std::path::Path;

use crate::models::ContentKind;

/// Number of leading bytes inspected when sniffing.
const SNIFF_LEN: usize = 512;

const HTML_TAGS: &[&[u8]] = &[
  b"<!DOCTYPE HTML",
  b"<HTML",
  b"<HEAD",
  b"<SCRIPT",
  b"<IFRAME",
  b"<H1",
  b"<DIV",
  b"<FONT",
  b"<TABLE",
  b"<A",
  b"<STYLE",
  b"<TITLE",
  b"<B",
  b"<BODY",
  b"<BR",
  b"<P",
  b"<!--",
];

const EXACT_SIGNATURES: &[(&[u8], &str)] = &[
  (b"<?xml", "text/xml; charset=utf-8"),
  (b"%PDF-", "application/pdf"),
  (b"%!PS-Adobe-", "application/postscript"),
  (b"\xFE\xFF", "text/plain; charset=utf-16be"),
  (b"\xFF\xFE", "text/plain; charset=utf-16le"),
  (b"\xEF\xBB\xBF", "text/plain; charset=utf-8"),
  (b"\x00\x00\x01\x00", "image/x-icon"),
  (b"\x00\x00\x02\x00", "image/x-icon"),
  (b"BM", "image/bmp"),
  (b"GIF87a", "image/gif"),
  (b"GIF89a", "image/gif"),
  (b"\x89PNG\r\n\x1A\n", "image/png"),
  (b"\xFF\xD8\xFF", "image/jpeg"),
  (b"\x00asm", "application/wasm"),
  (b"PK\x03\x04", "application/zip"),
  (b"\x1F\x8B\x08", "application/x-gzip"),
];

/// Outcome of classifying one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
  /// Processing strategy.
  pub kind: ContentKind,
  /// Sniffed MIME type, possibly with parameters.
  pub content_type: String,
}

/// Sniff the MIME type of `data` from its leading bytes.
///
/// Recognises HTML by its usual opening tags, a fixed table of magic numbers, and falls
/// back to `text/plain` when no binary control bytes are present.
pub fn sniff_content_type(data: &[u8]) -> &'static str {
  let data = &data[..data.len().min(SNIFF_LEN)];

  let trimmed = trim_leading_whitespace(data);
  if HTML_TAGS.iter().any(|tag| matches_html_tag(trimmed, tag)) {
    return "text/html; charset=utf-8";
  }

  if let Some((_, mime)) = EXACT_SIGNATURES
    .iter()
    .find(|(signature, _)| data.starts_with(signature))
  {
    return mime;
  }

  if data.len() >= 14 && data.starts_with(b"RIFF") && &data[8..14] == b"WEBPVP" {
    return "image/webp";
  }

  if data.iter().any(|byte| is_binary_byte(*byte)) {
    "application/octet-stream"
  } else {
    "text/plain; charset=utf-8"
  }
}

/// Decide how a file is processed from its content and path.
///
/// The `.html`/`.htm` extension forces [`ContentKind::Html`] whatever the sniffed type.
pub fn classify(data: &[u8], path: &Path) -> Classification {
  let content_type = sniff_content_type(data);
  let kind = if content_type.starts_with("text/html") || has_html_extension(path) {
    ContentKind::Html
  } else if content_type.starts_with("image/") {
    ContentKind::Image
  } else {
    ContentKind::Other
  };

  Classification {
    kind,
    content_type: content_type.to_string(),
  }
}

/// MIME type for an inlined image, without parameters.
///
/// Uses the sniffed type when it is an image, otherwise the extension of `name` when that
/// names an image format (SVG sniffs as XML), otherwise the sniffed type.
pub fn image_mime(data: &[u8], name: &Path) -> String {
  let sniffed = sniff_content_type(data);
  if sniffed.starts_with("image/") {
    return mime_essence(sniffed).to_string();
  }

  mime_guess::from_path(name)
    .first()
    .filter(|guess| guess.type_() == mime_guess::mime::IMAGE)
    .map(|guess| guess.essence_str().to_string())
    .unwrap_or_else(|| mime_essence(sniffed).to_string())
}

/// Strip parameters such as `charset` from a MIME type.
pub fn mime_essence(content_type: &str) -> &str {
  content_type
    .split(';')
    .next()
    .unwrap_or(content_type)
    .trim()
}

fn has_html_extension(path: &Path) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}

fn trim_leading_whitespace(data: &[u8]) -> &[u8] {
  let start = data
    .iter()
    .position(|byte| !matches!(byte, b'\t' | b'\n' | 0x0C | b'\r' | b' '))
    .unwrap_or(data.len());
  &data[start..]
}

fn matches_html_tag(data: &[u8], tag: &[u8]) -> bool {
  if data.len() <= tag.len() || !data[..tag.len()].eq_ignore_ascii_case(tag) {
    return false;
  }
  matches!(data[tag.len()], b' ' | b'>')
}

fn is_binary_byte(byte: u8) -> bool {
  matches!(byte, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}
