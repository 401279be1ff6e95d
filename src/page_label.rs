/// Render a repeated-header (or footer) label template for one page.
///
/// Supported tokens: `{page}`, `{pages}`, `{title}`. Unknown tokens are
/// left in place verbatim; an unclosed `{` is kept as-is rather than
/// rejected, since label templates come from user-editable document
/// metadata.
pub fn substitute_label(template: &str, page_number: usize, page_count: usize, title: &str) -> String {
    let mut out = String::with_capacity(template.len() + 8);
    let mut rest: &str = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        rest = &rest[start + 1..];

        let Some(end) = rest.find('}') else {
            out.push('{');
            out.push_str(rest);
            return out;
        };

        let token = &rest[..end];
        match token {
            "page" => out.push_str(&page_number.to_string()),
            "pages" => out.push_str(&page_count.to_string()),
            "title" => out.push_str(title),
            _ => {
                out.push('{');
                out.push_str(token);
                out.push('}');
            }
        }

        rest = &rest[end + 1..];
    }
    out.push_str(rest);
    out
}

/// Default repeated-header line: document name plus the current page
/// number, the way exported invoices and contracts head their pages.
pub const DEFAULT_HEADER_TEMPLATE: &str = "{title} | Page {page}";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_all_tokens() {
        assert_eq!(
            substitute_label("{title} | Page {page} of {pages}", 3, 7, "Service Agreement"),
            "Service Agreement | Page 3 of 7"
        );
    }

    #[test]
    fn keeps_unknown_tokens() {
        assert_eq!(
            substitute_label("{title} {client}", 1, 1, "Invoice"),
            "Invoice {client}"
        );
    }

    #[test]
    fn tolerates_unclosed_token() {
        assert_eq!(substitute_label("Page {page", 2, 5, "X"), "Page {page");
    }
}
