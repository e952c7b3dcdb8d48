//! Metadata generator - ArcGIS Pro `.pyt.xml` documentation files
//!
//! Built from the same schema tree the factory uses: one toolbox document and
//! one document per enabled tool.

mod generator;
mod xml;

pub use generator::{ARC_TOOLBOX_HELP_PATH, MetadataGenerator, toolbox_file_name, tool_file_name};
pub use xml::{Element, escape_attr, escape_text};

use xml::escape_html;

const DIV_OPEN: &str = r#"<DIV STYLE="text-align:Left;"><DIV>"#;
const DIV_CLOSE: &str = "</DIV></DIV>";

fn paragraph(lines: &[String]) -> String {
    let escaped: Vec<String> = lines.iter().map(|l| escape_html(l)).collect();
    format!("<P><SPAN>{}</SPAN></P>", escaped.join("<BR/>"))
}

/// Wrap plain text in the rich-text markup ArcGIS Pro stores in metadata.
///
/// Without `preserve_newlines` the trimmed text becomes one paragraph. With
/// it, blank lines split paragraphs, lines inside a paragraph are joined with
/// `<BR/>`, and a line that does not start with `- ` continues a preceding
/// `- ` bullet.
pub fn wrap_in_html_div(text: &str, preserve_newlines: bool) -> String {
    if !preserve_newlines {
        return format!("{}{}{}", DIV_OPEN, paragraph(&[text.trim().to_string()]), DIV_CLOSE);
    }

    let mut paragraphs = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for line in text.trim().lines() {
        let stripped = line.trim();
        if stripped.is_empty() {
            if !current.is_empty() {
                paragraphs.push(paragraph(&current));
                current.clear();
            }
            continue;
        }

        match current.last_mut() {
            Some(last) if last.starts_with("- ") && !stripped.starts_with("- ") => {
                last.push(' ');
                last.push_str(stripped);
            }
            _ => current.push(stripped.to_string()),
        }
    }
    if !current.is_empty() {
        paragraphs.push(paragraph(&current));
    }

    format!("{}{}{}", DIV_OPEN, paragraphs.concat(), DIV_CLOSE)
}
