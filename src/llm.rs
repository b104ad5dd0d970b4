use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::period::Granularity;
use crate::query::markdown_block;
use crate::report::ReportBundle;

/// Ordered fallback list of text-completion providers, tried first to last.
pub const DEFAULT_PROVIDERS: &[&str] = &[
    "deepseek/deepseek-chat:free",
    "google/gemini-2.0-flash-experimental:free",
    "meta-llama/llama-3.1-8b-instruct:free",
];

pub const SYSTEM_PROMPT: &str = "You are a retail data analyst.";

const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.7;

/// The external text-completion service, addressed by provider id.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(
        &self,
        provider: &str,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String>;
}

/// Render the grounding-constrained prompt for one period's bundle.
///
/// All seven tables are embedded as deterministic markdown blocks, and the
/// instruction set pins the five-section output structure and forbids any
/// value not present in the tables.
pub fn build_prompt(bundle: &ReportBundle, granularity: Granularity) -> String {
    let tables = &bundle.tables;
    format!(
        r#"You are a professional retail business analyst.

Your task is to write a business-ready {mode} sales performance report based only on the structured data below.

STRICT RULES:
1. Do NOT invent or assume any product IDs, sales numbers, city names, or trends.
2. Only use the exact values, product IDs, and city names provided in the tables.
3. Do NOT hallucinate additional content. This is a factual report for executives.

INPUT DATA (Structured Tables):

Top-Selling Products:
{top_sellers}

Holiday Sales Impact:
{holiday_sales}

Weather Influence:
{weather_impact}

Weekly Trends:
{weekly_trend}

Discount Impact:
{discount_impact}

City-wise Sales:
{sales_by_city}

Co-purchase Simulation:
{co_purchase}

YOUR TASK:
Write a clear and professional report in this structure:
- Executive Summary: 2-3 sentence overview of overall trends.
- Sales Highlights: Bullet points based on top products, cities, trends.
- Consumer Behavior: Bullet points from co-purchase + product preferences.
- External Influences: Bullet points from weather, holidays, discount analysis.
- Strategic Recommendations: Business actions derived from observed data.

Use simple, non-technical language that's suitable for business stakeholders. Be concise and data-driven.
"#,
        mode = granularity.as_str(),
        top_sellers = markdown_block(&tables.top_sellers),
        holiday_sales = markdown_block(&tables.holiday_sales),
        weather_impact = markdown_block(&tables.weather_impact),
        weekly_trend = markdown_block(&tables.weekly_trend),
        discount_impact = markdown_block(&tables.discount_impact),
        sales_by_city = markdown_block(&tables.sales_by_city),
        co_purchase = markdown_block(&tables.co_purchase_simulation),
    )
}

/// Generate the narrative for a bundle, trying providers strictly in order.
///
/// The first provider that returns successfully short-circuits the chain;
/// every failure reason is collected so an exhausted chain surfaces all of
/// them in `Error::NarrationUnavailable` instead of only the last.
pub async fn narrate(
    service: &dyn CompletionService,
    providers: &[String],
    bundle: &ReportBundle,
    granularity: Granularity,
) -> Result<String> {
    if providers.is_empty() {
        return Err(Error::NarrationUnavailable(
            "no providers configured".to_string(),
        ));
    }

    let prompt = build_prompt(bundle, granularity);
    let mut failures = Vec::new();

    for provider in providers {
        match service
            .complete(provider, SYSTEM_PROMPT, &prompt, MAX_TOKENS, TEMPERATURE)
            .await
        {
            Ok(text) => return Ok(text),
            Err(e) => {
                log::warn!("provider {provider} failed for period {}: {e}", bundle.period.label);
                failures.push(format!("{provider}: {e}"));
            }
        }
    }

    Err(Error::NarrationUnavailable(failures.join("; ")))
}
