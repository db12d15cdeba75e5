//! Chart generation and rendering for the dashboard.
//!
//! This module creates interactive ECharts visualizations for a month of sales:
//! - **Price Range Chart**: Number of items sold per price range
//! - **Category Chart**: Donut chart of the items sold per category
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with corresponding HTML containers and JavaScript initialization code.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisPointer, AxisPointerType, AxisType, Tooltip, Trigger},
    series::{Bar, Pie},
};
use maud::{Markup, PreEscaped, html};
use time::Month;

use crate::{
    histogram::{CategoryCount, PriceRangeCount},
    html::HeadElement,
};

/// The label used for sales without a category.
const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the HTML containers for dashboard charts.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded bg-white dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Creates scripts that initialize ECharts instances that resize with the window.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

pub(super) fn price_range_chart(price_ranges: &[PriceRangeCount], month: Month) -> Chart {
    let labels: Vec<&str> = price_ranges.iter().map(|entry| entry.range).collect();
    let counts: Vec<f64> = price_ranges.iter().map(|entry| entry.count as f64).collect();

    Chart::new()
        .title(
            Title::new()
                .text("Items per price range")
                .subtext(month.to_string()),
        )
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(Axis::new().type_(AxisType::Value))
        .series(Bar::new().name("Items sold").data(counts))
}

pub(super) fn category_chart(categories: &[CategoryCount], month: Month) -> Chart {
    let mut slices: Vec<(f64, &str)> = categories
        .iter()
        .map(|entry| {
            (
                entry.count as f64,
                entry.category.as_deref().unwrap_or(UNCATEGORIZED_LABEL),
            )
        })
        .collect();
    // The store returns categories in no particular order.
    slices.sort_by(|a, b| a.1.cmp(b.1));

    Chart::new()
        .title(
            Title::new()
                .text("Items per category")
                .subtext(month.to_string()),
        )
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().top("bottom"))
        .series(
            Pie::new()
                .name("Items sold")
                .radius(vec!["40%", "70%"])
                .data(slices),
        )
}

#[cfg(test)]
mod tests {
    use time::Month;

    use crate::histogram::{CategoryCount, PRICE_RANGE_LABELS, PriceRangeCount};

    use super::{category_chart, price_range_chart};

    #[test]
    fn price_range_chart_lists_every_range() {
        let ranges: Vec<_> = PRICE_RANGE_LABELS
            .into_iter()
            .map(|range| PriceRangeCount { range, count: 2 })
            .collect();

        let options = price_range_chart(&ranges, Month::March).to_string();

        for label in PRICE_RANGE_LABELS {
            assert!(options.contains(label), "missing {label} in {options}");
        }
        assert!(options.contains("March"));
    }

    #[test]
    fn category_chart_names_missing_category() {
        let categories = vec![
            CategoryCount {
                category: Some("electronics".to_owned()),
                count: 2,
            },
            CategoryCount {
                category: None,
                count: 1,
            },
        ];

        let options = category_chart(&categories, Month::July).to_string();

        assert!(options.contains("electronics"));
        assert!(options.contains("Uncategorized"));
    }
}
