use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Semaphore;

use crate::date_util::parse_dataset_date;
use crate::error::{Error, Result};
use crate::period::ReportPeriod;
use crate::query::templates::{min_max_dates, SubQueries};
use crate::query::{QueryClient, TableResult};

/// Materialized results of the seven analytical sub-queries for one period.
/// `top_sellers` is the primary table: it gates whether a report exists at
/// all, and it is the one persisted as the raw CSV artifact.
#[derive(Debug, Clone)]
pub struct PeriodTables {
    pub top_sellers: TableResult,
    pub holiday_sales: TableResult,
    pub weather_impact: TableResult,
    pub weekly_trend: TableResult,
    pub discount_impact: TableResult,
    pub sales_by_city: TableResult,
    pub co_purchase_simulation: TableResult,
}

/// The assembled per-period payload handed to narrative generation and
/// persistence. Owned by the assembler invocation that built it.
#[derive(Debug, Clone)]
pub struct ReportBundle {
    pub period: ReportPeriod,
    pub tables: PeriodTables,
}

/// Run the bootstrap min/max query and parse the dataset's full date extent.
/// Fails with `EmptyDataset` when either bound is absent, i.e. no row in the
/// source table has a date that parses under the expected format.
pub async fn discover_range(
    client: &QueryClient,
    database: &str,
    table: &str,
    output_location: &str,
) -> Result<(NaiveDate, NaiveDate)> {
    log::info!("discovering the full date range of {table}");
    let result = client
        .submit_and_await(&min_max_dates(table), database, output_location)
        .await?;

    if !result.has_data() {
        return Err(Error::EmptyDataset);
    }

    let row = &result.rows[0];
    let min_str = row.first().filter(|s| !s.is_empty()).ok_or(Error::EmptyDataset)?;
    let max_str = row.get(1).filter(|s| !s.is_empty()).ok_or(Error::EmptyDataset)?;

    let min_date = parse_dataset_date(min_str)?;
    let max_date = parse_dataset_date(max_str)?;
    log::info!("full data range: {min_date} to {max_date}");
    Ok((min_date, max_date))
}

/// Run all seven sub-queries for one period and assemble their tables.
///
/// The sub-queries have no data dependencies on each other, so they run
/// concurrently, bounded by `max_concurrent` to stay inside the query
/// service's account quota. Any query failure aborts the whole period: a
/// partial bundle would be misleading. A period whose primary table came
/// back as the "no data" sentinel is skipped by returning `Ok(None)`;
/// sparse periods are expected, not errors.
pub async fn assemble(
    client: &QueryClient,
    database: &str,
    table: &str,
    output_location: &str,
    period: &ReportPeriod,
    max_concurrent: usize,
) -> Result<Option<ReportBundle>> {
    let SubQueries {
        top_sellers,
        holiday_sales,
        weather_impact,
        weekly_trend,
        discount_impact,
        sales_by_city,
        co_purchase_simulation,
    } = SubQueries::for_period(table, period);

    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let run = |sql: String| {
        let semaphore = Arc::clone(&semaphore);
        async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("semaphore is never closed");
            client.submit_and_await(&sql, database, output_location).await
        }
    };

    let (top_sellers, holiday_sales, weather_impact, weekly_trend, discount_impact, sales_by_city, co_purchase_simulation) = tokio::join!(
        run(top_sellers),
        run(holiday_sales),
        run(weather_impact),
        run(weekly_trend),
        run(discount_impact),
        run(sales_by_city),
        run(co_purchase_simulation),
    );

    let tables = PeriodTables {
        top_sellers: top_sellers?,
        holiday_sales: holiday_sales?,
        weather_impact: weather_impact?,
        weekly_trend: weekly_trend?,
        discount_impact: discount_impact?,
        sales_by_city: sales_by_city?,
        co_purchase_simulation: co_purchase_simulation?,
    };

    if !tables.top_sellers.has_data() {
        log::info!("no data found for period {}, skipping report", period.label);
        return Ok(None);
    }

    Ok(Some(ReportBundle {
        period: period.clone(),
        tables,
    }))
}
