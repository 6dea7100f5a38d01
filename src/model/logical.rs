//! Logical pages: the emitted units of output text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default label used in page headings (`## Page 3`).
pub const DEFAULT_HEADING_LABEL: &str = "Page";

/// One side of a two-column page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSide {
    Left,
    Right,
}

impl fmt::Display for ColumnSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnSide::Left => write!(f, "left"),
            ColumnSide::Right => write!(f, "right"),
        }
    }
}

/// A numbered unit of output text.
///
/// A single-column physical page yields one logical page; a two-column page
/// yields two, left before right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalPage {
    /// Sequential logical page number (1-indexed)
    pub number: u32,

    /// Page body text
    pub body: String,

    /// Physical page this logical page came from
    pub physical_page: u32,

    /// Column the body was taken from; `None` for single-column pages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<ColumnSide>,
}

impl LogicalPage {
    /// Logical page built from a whole single-column page.
    pub fn single(number: u32, physical_page: u32, body: impl Into<String>) -> Self {
        Self {
            number,
            body: body.into(),
            physical_page,
            side: None,
        }
    }

    /// Logical page built from one column of a two-column page.
    pub fn column(
        number: u32,
        physical_page: u32,
        side: ColumnSide,
        body: impl Into<String>,
    ) -> Self {
        Self {
            number,
            body: body.into(),
            physical_page,
            side: Some(side),
        }
    }

    /// Append the Markdown form of this page to `out`.
    pub fn write_markdown(&self, label: &str, out: &mut String) {
        out.push_str("## ");
        out.push_str(label);
        out.push(' ');
        out.push_str(&self.number.to_string());
        out.push_str("\n\n");
        out.push_str(&self.body);
        out.push_str("\n\n");
    }

    /// Markdown form of this page: `"## {label} {number}\n\n{body}\n\n"`.
    pub fn to_markdown(&self, label: &str) -> String {
        let mut out = String::with_capacity(self.body.len() + label.len() + 16);
        self.write_markdown(label, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_format() {
        let page = LogicalPage::single(4, 3, "Body text");
        assert_eq!(
            page.to_markdown(DEFAULT_HEADING_LABEL),
            "## Page 4\n\nBody text\n\n"
        );
    }

    #[test]
    fn test_markdown_empty_body() {
        let page = LogicalPage::single(1, 1, "");
        assert_eq!(page.to_markdown("Page"), "## Page 1\n\n\n\n");
    }

    #[test]
    fn test_custom_label() {
        let page = LogicalPage::column(2, 1, ColumnSide::Right, "右");
        assert_eq!(page.to_markdown("ページ"), "## ページ 2\n\n右\n\n");
    }

    #[test]
    fn test_single_page_json_omits_side() {
        let json = serde_json::to_string(&LogicalPage::single(1, 1, "x")).unwrap();
        assert!(!json.contains("side"));
        let json =
            serde_json::to_string(&LogicalPage::column(1, 1, ColumnSide::Left, "x")).unwrap();
        assert!(json.contains("\"side\":\"left\""));
    }
}
