//! Table, card and form views for the dashboard.

use maud::{Markup, html};
use serde::Serialize;
use time::{Month, macros::format_description};

use crate::{
    dashboard::page_links::{PageLink, page_count, page_links},
    endpoints,
    html::{
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, format_currency, truncate_text,
    },
    statistics::Statistics,
    transaction::{ListQuery, Transaction},
};

/// The page sizes offered by the page size selector.
const PAGE_SIZE_OPTIONS: [u64; 5] = [10, 20, 30, 40, 50];
/// Descriptions longer than this many characters are cut short in the table.
const DESCRIPTION_PREVIEW_LENGTH: usize = 60;

const BUTTON_STYLE: &str = "px-4 py-2.5 bg-blue-500 dark:bg-blue-600 \
    hover:bg-blue-600 text-white text-sm rounded";
const CARD_STYLE: &str = "w-full p-4 mb-4 bg-white dark:bg-gray-800 rounded shadow";

/// The query string of a dashboard link.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardLink<'a> {
    month: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
    page_number: u64,
    page_size: u64,
}

/// The URL of page `page_number` of the dashboard for `query`.
pub(super) fn dashboard_url(query: &ListQuery, page_number: u64) -> String {
    let link = DashboardLink {
        month: query.month.into(),
        search: query.search_text(),
        page_number,
        page_size: query.page.page_size,
    };

    match serde_urlencoded::to_string(&link) {
        Ok(query_string) => format!("{}?{query_string}", endpoints::DASHBOARD),
        Err(error) => {
            tracing::error!("could not encode dashboard link: {error}");
            endpoints::DASHBOARD.to_owned()
        }
    }
}

/// Renders the search box, month selector and page size selector.
pub(super) fn controls_form(query: &ListQuery) -> Markup {
    html! {
        form
            id="controls"
            method="get"
            action=(endpoints::DASHBOARD)
            class="w-full grid grid-cols-1 md:grid-cols-4 gap-4 items-end mb-4"
        {
            div
            {
                label for="search" class=(FORM_LABEL_STYLE) { "Search transaction" }
                input
                    type="search"
                    id="search"
                    name="search"
                    placeholder="Title, description or price"
                    value=(query.search.as_deref().unwrap_or_default())
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="month" class=(FORM_LABEL_STYLE) { "Month" }
                select
                    id="month"
                    name="month"
                    class=(FORM_TEXT_INPUT_STYLE)
                    onchange="this.form.submit()"
                {
                    @for number in 1..=12u8 {
                        @if let Ok(month) = Month::try_from(number) {
                            option value=(number) selected[month == query.month] { (month) }
                        }
                    }
                }
            }

            div
            {
                label for="pageSize" class=(FORM_LABEL_STYLE) { "Per page" }
                select
                    id="pageSize"
                    name="pageSize"
                    class=(FORM_TEXT_INPUT_STYLE)
                    onchange="this.form.submit()"
                {
                    @for size in PAGE_SIZE_OPTIONS {
                        option value=(size) selected[size == query.page.page_size] { (size) }
                    }
                }
            }

            input type="hidden" name="pageNumber" value="1";

            button type="submit" class=(BUTTON_STYLE) { "Apply" }
        }
    }
}

/// Renders the sale totals for `month`.
pub(super) fn statistics_card(statistics: &Statistics, month: Month) -> Markup {
    html! {
        section id="statistics" class=(CARD_STYLE)
        {
            h3 class="text-xl font-semibold mb-4" { "Statistics - " (month) }

            dl class="grid grid-cols-1 md:grid-cols-3 gap-4"
            {
                div
                {
                    dt class="text-sm text-gray-500 dark:text-gray-400" { "Total sale" }
                    dd class="text-lg font-semibold" { (format_currency(statistics.total_sale_amount)) }
                }
                div
                {
                    dt class="text-sm text-gray-500 dark:text-gray-400" { "Total sold items" }
                    dd class="text-lg font-semibold" { (statistics.total_sold_items) }
                }
                div
                {
                    dt class="text-sm text-gray-500 dark:text-gray-400" { "Total not sold items" }
                    dd class="text-lg font-semibold" { (statistics.total_not_sold_items) }
                }
            }
        }
    }
}

fn format_sold_date(transaction: &Transaction) -> String {
    transaction
        .date_of_sale
        .and_then(|date| {
            date.format(format_description!("[day]-[month]-[year]"))
                .inspect_err(|error| tracing::error!("could not format date {date}: {error}"))
                .ok()
        })
        .unwrap_or_else(|| "-".to_owned())
}

/// Renders a table of `transactions`.
pub(super) fn transactions_table(transactions: &[Transaction]) -> Markup {
    html! {
        div class="w-full overflow-x-auto shadow rounded mb-4"
        {
            table id="transactions" class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "ID" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Title" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Price" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Sold" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Image" }
                    }
                }

                tbody
                {
                    @for transaction in transactions {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (transaction.id) }
                            td class=(TABLE_CELL_STYLE) { (transaction.title) }
                            td class=(TABLE_CELL_STYLE) title=(transaction.description)
                            {
                                (truncate_text(&transaction.description, DESCRIPTION_PREVIEW_LENGTH))
                            }
                            td class=(TABLE_CELL_STYLE)
                            {
                                @if let Some(price) = transaction.price {
                                    (format_currency(price))
                                } @else {
                                    "-"
                                }
                            }
                            td class=(TABLE_CELL_STYLE) { (transaction.category.as_deref().unwrap_or("-")) }
                            td class=(TABLE_CELL_STYLE) { (format_sold_date(transaction)) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                @if let Some(image) = &transaction.image {
                                    img src=(image) alt=(transaction.title) class="w-12 h-12 object-contain";
                                }
                            }
                        }
                    }

                    @if transactions.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan="7" class=(TABLE_CELL_STYLE) { "No transactions found." }
                        }
                    }
                }
            }
        }
    }
}

/// Renders the page number, page links and page size for the listing.
pub(super) fn pagination_view(query: &ListQuery, count: u64, max_pages: u64) -> Markup {
    let links = page_links(
        query.page.page_number,
        page_count(count, query.page.page_size),
        max_pages,
    );

    html! {
        nav id="pagination" class="w-full flex flex-wrap justify-between items-center gap-4 mb-4"
        {
            p { "Page No: " (query.page.page_number) }

            ul class="inline-flex items-center gap-3"
            {
                @for link in links {
                    li
                    {
                        @match link {
                            PageLink::Page(page) => {
                                a href=(dashboard_url(query, page)) class=(LINK_STYLE) { (page) }
                            }
                            PageLink::Current(page) => {
                                span aria-current="page" class="font-bold" { (page) }
                            }
                            PageLink::Gap => {
                                span { "..." }
                            }
                            PageLink::Previous(page) => {
                                a href=(dashboard_url(query, page)) role="button" class=(LINK_STYLE) { "Back" }
                            }
                            PageLink::Next(page) => {
                                a href=(dashboard_url(query, page)) role="button" class=(LINK_STYLE) { "Next" }
                            }
                        }
                    }
                }
            }

            p { "Per Page: " (query.page.page_size) }
        }
    }
}

#[cfg(test)]
mod tests {
    use time::{Month, macros::datetime};

    use crate::transaction::{ListQuery, PageRequest, Transaction};

    use super::{dashboard_url, format_sold_date};

    #[test]
    fn dashboard_url_keeps_search_and_page_size() {
        let query = ListQuery {
            page: PageRequest {
                page_number: 1,
                page_size: 20,
            },
            search: Some(" 50% off ".to_owned()),
            month: Month::July,
        };

        let got = dashboard_url(&query, 3);

        assert_eq!(got, "/?month=7&search=50%25+off&pageNumber=3&pageSize=20");
    }

    #[test]
    fn dashboard_url_omits_blank_search() {
        let query = ListQuery {
            page: PageRequest {
                page_number: 1,
                page_size: 10,
            },
            search: Some(String::new()),
            month: Month::March,
        };

        assert_eq!(dashboard_url(&query, 2), "/?month=3&pageNumber=2&pageSize=10");
    }

    #[test]
    fn sold_date_is_day_month_year() {
        let transaction =
            Transaction::build("Widget", 50.0, datetime!(2022-03-07 12:00 UTC)).finalise(1);

        assert_eq!(format_sold_date(&transaction), "07-03-2022");
    }
}
