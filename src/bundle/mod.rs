//! Rendering a [`Bundle`] into the final viewer page.
//!
//! Entries reach the page through a single contract: a JSON array inside
//! `<script type="application/json">`, each entry's document base64 encoded. `<`, `>` and
//! `&` in the JSON text are written as `\u` escapes so nothing can close the data block.

pub mod navigation;
pub mod output;
pub mod template;

use crate::config::NavigationLayout;
use crate::error::BundleResult;
use crate::models::{Bundle, EmbeddedEntry};

pub use navigation::render_navigation;
pub use output::write_atomic;
pub use template::{PageContext, PageTemplate};

/// Serialise the entries as JSON that is safe inside a `<script>` element.
pub fn encode_entries(bundle: &Bundle) -> BundleResult<String> {
  let embedded: Vec<EmbeddedEntry<'_>> = bundle.entries().iter().map(EmbeddedEntry::from).collect();
  let json = serde_json::to_string(&embedded)?;
  Ok(escape_script_json(&json))
}

fn escape_script_json(json: &str) -> String {
  json
    .replace('<', "\\u003c")
    .replace('>', "\\u003e")
    .replace('&', "\\u0026")
}

/// Render the complete page for `bundle`.
pub fn render_page(
  template: &PageTemplate,
  bundle: &Bundle,
  title: &str,
  layout: NavigationLayout,
) -> BundleResult<String> {
  let navigation = render_navigation(bundle.entries(), layout);
  let entries = encode_entries(bundle)?;
  Ok(template.render(&PageContext {
    title,
    layout: layout.css_class(),
    navigation: &navigation,
    entries: &entries,
  }))
}
