use crate::period::ReportPeriod;

/// Filter shared by every sub-query: only rows whose `dt` parses as a
/// calendar date under the dataset's format count toward any aggregate,
/// and only within the period's inclusive bounds. Unparseable dates are
/// excluded, never silently coerced.
fn date_filter(start: &str, end: &str) -> String {
    format!(
        "TRY(CAST(DATE_PARSE(dt, '%Y-%m-%d') AS DATE)) IS NOT NULL \
         AND DATE_PARSE(dt, '%Y-%m-%d') BETWEEN DATE '{start}' AND DATE '{end}'"
    )
}

/// Bootstrap query for the dataset's overall date extent.
pub fn min_max_dates(table: &str) -> String {
    format!(
        "SELECT MIN(dt), MAX(dt) FROM {table} \
         WHERE TRY(CAST(DATE_PARSE(dt, '%Y-%m-%d') AS DATE)) IS NOT NULL"
    )
}

/// The fixed batch of seven analytical sub-queries instantiated for one
/// reporting period. A closed struct rather than a name-keyed map: a
/// missing or mistyped sub-query cannot exist.
#[derive(Debug, Clone)]
pub struct SubQueries {
    pub top_sellers: String,
    pub holiday_sales: String,
    pub weather_impact: String,
    pub weekly_trend: String,
    pub discount_impact: String,
    pub sales_by_city: String,
    pub co_purchase_simulation: String,
}

impl SubQueries {
    pub fn for_period(table: &str, period: &ReportPeriod) -> Self {
        let filter = date_filter(&period.start_str(), &period.end_str());

        let top_sellers = format!(
            "SELECT product_id, SUM(sale_amount) AS total_sales \
             FROM {table} WHERE {filter} \
             GROUP BY product_id ORDER BY total_sales DESC LIMIT 10"
        );

        let holiday_sales = format!(
            "SELECT CASE WHEN coalesce(holiday_flag, 0) >= 0.9 THEN 'Holiday' \
                         ELSE 'Non-Holiday' END AS day_type, \
                    ROUND(AVG(sale_amount), 2) AS avg_sales \
             FROM {table} WHERE {filter} \
             GROUP BY CASE WHEN coalesce(holiday_flag, 0) >= 0.9 THEN 'Holiday' \
                           ELSE 'Non-Holiday' END"
        );

        let weather_impact = format!(
            "SELECT CASE WHEN precpt > 5 THEN 'Rainy' ELSE 'Dry' END AS weather, \
                    CASE WHEN avg_temperature < 15 THEN 'Cold' \
                         WHEN avg_temperature BETWEEN 15 AND 30 THEN 'Moderate' \
                         ELSE 'Hot' END AS temp_range, \
                    ROUND(AVG(sale_amount), 2) AS avg_sales \
             FROM {table} WHERE {filter} \
             GROUP BY 1, 2"
        );

        let weekly_trend = format!(
            "SELECT date_trunc('week', DATE_PARSE(dt, '%Y-%m-%d')) AS week, \
                    SUM(sale_amount) AS total_sales \
             FROM {table} WHERE {filter} \
             GROUP BY 1 ORDER BY 1"
        );

        let discount_impact = format!(
            "SELECT CASE WHEN discount = 0 THEN 'No Discount' \
                         WHEN discount < 0.5 THEN 'Low Discount' \
                         ELSE 'High Discount' END AS discount_level, \
                    ROUND(AVG(sale_amount), 2) AS avg_sales \
             FROM {table} WHERE {filter} \
             GROUP BY 1"
        );

        let sales_by_city = format!(
            "SELECT city_id, ROUND(SUM(sale_amount), 2) AS total_sales \
             FROM {table} WHERE {filter} \
             GROUP BY city_id ORDER BY total_sales DESC LIMIT 10"
        );

        // Co-purchase proxy: distinct store-days a product sold on.
        let co_purchase_simulation = format!(
            "SELECT product_id, \
                    COUNT(DISTINCT CAST(store_id AS VARCHAR) || dt) AS product_days \
             FROM {table} WHERE {filter} AND sale_amount > 0 \
             GROUP BY product_id ORDER BY product_days DESC LIMIT 10"
        );

        Self {
            top_sellers,
            holiday_sales,
            weather_impact,
            weekly_trend,
            discount_impact,
            sales_by_city,
            co_purchase_simulation,
        }
    }
}
