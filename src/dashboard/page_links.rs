//! The page links shown under the dashboard's transaction table.

/// One entry in the row of page links.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum PageLink {
    /// A link to another page.
    Page(u64),
    /// The page being shown.
    Current(u64),
    /// Pages left out between two links.
    Gap,
    Previous(u64),
    Next(u64),
}

/// The number of pages needed to show `count` transactions, `page_size` at a time.
pub(super) fn page_count(count: u64, page_size: u64) -> u64 {
    count.div_ceil(page_size.max(1))
}

/// The links for `current` out of `page_count` pages.
///
/// At most `max_pages` consecutive pages are listed, centred on `current`
/// where possible. The first and last pages are always reachable, with a
/// [PageLink::Gap] wherever pages are skipped.
pub(super) fn page_links(current: u64, page_count: u64, max_pages: u64) -> Vec<PageLink> {
    if page_count == 0 {
        return Vec::new();
    }

    let window = max_pages.clamp(1, page_count);
    let first = current
        .saturating_sub(window / 2)
        .clamp(1, page_count - window + 1);
    let last = first + window - 1;

    let mut links = Vec::new();

    if current > 1 {
        links.push(PageLink::Previous(current - 1));
    }

    if first > 1 {
        links.push(PageLink::Page(1));
        if first > 2 {
            links.push(PageLink::Gap);
        }
    }

    links.extend((first..=last).map(|page| {
        if page == current {
            PageLink::Current(page)
        } else {
            PageLink::Page(page)
        }
    }));

    if last < page_count {
        if last + 1 < page_count {
            links.push(PageLink::Gap);
        }
        links.push(PageLink::Page(page_count));
    }

    if current < page_count {
        links.push(PageLink::Next(current + 1));
    }

    links
}
