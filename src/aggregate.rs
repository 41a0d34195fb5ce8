//! Joins per-page text into one result blob.

/// Marker inserted between pages in the aggregated result.
pub const PAGE_SEPARATOR: &str = "\n\n--- next page ---\n\n";

/// Join per-page texts in page order, dropping blank pages.
///
/// Pages are trimmed, and pages that are empty after trimming are dropped.
/// Returns `None` when every page is blank, which the worker treats as total
/// job failure even if each page individually "succeeded" with no text. A
/// single surviving page comes back as-is, with no separator.
pub fn aggregate_pages(pages: &[String]) -> Option<String> {
    let kept: Vec<&str> = pages
        .iter()
        .map(|page| page.trim())
        .filter(|page| !page.is_empty())
        .collect();
    if kept.is_empty() {
        None
    } else {
        Some(kept.join(PAGE_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|text| text.to_string()).collect()
    }

    #[test]
    fn single_page_has_no_separator() {
        assert_eq!(
            aggregate_pages(&pages(&["Hello"])).as_deref(),
            Some("Hello")
        );
    }

    #[test]
    fn pages_are_trimmed_before_joining() {
        assert_eq!(
            aggregate_pages(&pages(&["Invoice #123\n\n"])).as_deref(),
            Some("Invoice #123")
        );
    }

    #[test]
    fn blank_pages_are_dropped_without_a_trailing_separator() {
        assert_eq!(
            aggregate_pages(&pages(&["Invoice #123", "   \n"])).as_deref(),
            Some("Invoice #123")
        );
    }

    #[test]
    fn multiple_pages_join_in_order() {
        assert_eq!(
            aggregate_pages(&pages(&["one", "two", "three"])).as_deref(),
            Some(&format!("one{sep}two{sep}three", sep = PAGE_SEPARATOR)[..])
        );
    }

    #[test]
    fn blank_middle_page_leaves_one_separator() {
        assert_eq!(
            aggregate_pages(&pages(&["one", "", "three"])).as_deref(),
            Some(&format!("one{}three", PAGE_SEPARATOR)[..])
        );
    }

    #[test]
    fn all_blank_pages_yield_none() {
        assert_eq!(aggregate_pages(&pages(&["", "  ", "\n\t"])), None);
        assert_eq!(aggregate_pages(&[]), None);
    }
}
