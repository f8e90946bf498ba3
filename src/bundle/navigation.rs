//! Navigation markup linking each entry to the viewer frame.

use std::fmt::Write as _;

use crate::config::NavigationLayout;
use crate::models::BundleEntry;

enum Node {
  Dir(String, Vec<Node>),
  File(String, usize),
}

/// Render the navigation for `entries`.
///
/// Every link carries `data-index` pointing into the embedded entry array.
pub fn render_navigation(entries: &[BundleEntry], layout: NavigationLayout) -> String {
  match layout {
    NavigationLayout::Sidebar => render_tree(entries),
    NavigationLayout::Tabs => render_tabs(entries),
  }
}

fn render_tabs(entries: &[BundleEntry]) -> String {
  let mut html = String::from("    <div class=\"tabs\">\n");
  for (index, entry) in entries.iter().enumerate() {
    let _ = writeln!(
      html,
      "      {}",
      link(index, &entry.display_name, &entry.display_name)
    );
  }
  html.push_str("    </div>");
  html
}

fn render_tree(entries: &[BundleEntry]) -> String {
  let mut root = Vec::new();
  for (index, entry) in entries.iter().enumerate() {
    let segments: Vec<&str> = entry.display_name.split('/').collect();
    insert(&mut root, &segments, index);
  }

  let mut html = String::new();
  write_nodes(&mut html, &root, entries, 2);
  html.truncate(html.trim_end().len());
  html
}

fn insert(nodes: &mut Vec<Node>, segments: &[&str], index: usize) {
  match segments {
    [] => {}
    [name] => nodes.push(Node::File(name.to_string(), index)),
    [dir, rest @ ..] => {
      let position = nodes
        .iter()
        .position(|node| matches!(node, Node::Dir(name, _) if name == dir));
      let position = match position {
        Some(position) => position,
        None => {
          nodes.push(Node::Dir(dir.to_string(), Vec::new()));
          nodes.len() - 1
        }
      };
      if let Node::Dir(_, children) = &mut nodes[position] {
        insert(children, rest, index);
      }
    }
  }
}

fn write_nodes(html: &mut String, nodes: &[Node], entries: &[BundleEntry], depth: usize) {
  let indent = "  ".repeat(depth);
  let _ = writeln!(html, "{indent}<ul>");
  for node in nodes {
    match node {
      Node::Dir(name, children) => {
        let _ = writeln!(
          html,
          "{indent}  <li class=\"dir\"><details open><summary>{}</summary>",
          html_escape::encode_text(name)
        );
        write_nodes(html, children, entries, depth + 2);
        let _ = writeln!(html, "{indent}  </details></li>");
      }
      Node::File(name, index) => {
        let _ = writeln!(
          html,
          "{indent}  <li>{}</li>",
          link(*index, &entries[*index].display_name, name)
        );
      }
    }
  }
  let _ = writeln!(html, "{indent}</ul>");
}

fn link(index: usize, path: &str, label: &str) -> String {
  format!(
    "<a href=\"#\" data-index=\"{index}\" title=\"{}\">{}</a>",
    html_escape::encode_double_quoted_attribute(path),
    html_escape::encode_text(label)
  )
}
