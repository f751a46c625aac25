//! Data model shared by the aggregators and the service layer

use crate::error::{DashboardError, Result};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Inclusive calendar-day range
///
/// Deserialising goes through [`DateRange::new`], so an inverted range is
/// rejected there as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = DashboardError;

    fn try_from(raw: RawDateRange) -> Result<Self> {
        DateRange::new(raw.start, raw.end)
    }
}

impl DateRange {
    /// Rejects ranges whose end precedes their start
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(DashboardError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days, counting both ends
    pub fn num_days(&self) -> usize {
        usize::try_from((self.end - self.start).num_days() + 1).unwrap_or(0)
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.num_days())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Range of the same length ending the day before `start`
    pub fn previous_period(&self) -> Self {
        let len = self.num_days() as i64;
        let end = self.start - Duration::days(1);
        let start = end - Duration::days(len - 1);
        Self { start, end }
    }
}

/// Bucket granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFrame {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl TimeFrame {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFrame::Daily => "daily",
            TimeFrame::Weekly => "weekly",
            TimeFrame::Monthly => "monthly",
            TimeFrame::Yearly => "yearly",
        }
    }

    pub fn all() -> [TimeFrame; 4] {
        [
            TimeFrame::Daily,
            TimeFrame::Weekly,
            TimeFrame::Monthly,
            TimeFrame::Yearly,
        ]
    }

    /// Sortable bucket key for a date
    ///
    /// Weekly buckets are keyed by the Sunday that starts the week.
    pub fn bucket_key(&self, date: NaiveDate) -> String {
        match self {
            TimeFrame::Daily => date.format("%Y-%m-%d").to_string(),
            TimeFrame::Weekly => week_start(date).format("%Y-%m-%d").to_string(),
            TimeFrame::Monthly => format!("{:04}-{:02}", date.year(), date.month()),
            TimeFrame::Yearly => format!("{:04}", date.year()),
        }
    }

    /// Display label for the bucket containing `date`
    pub fn bucket_label(&self, date: NaiveDate) -> String {
        match self {
            TimeFrame::Daily => date.format("%b %-d").to_string(),
            TimeFrame::Weekly => format!("Week of {}", week_start(date).format("%b %-d")),
            TimeFrame::Monthly => date.format("%b %y").to_string(),
            TimeFrame::Yearly => date.year().to_string(),
        }
    }
}

impl FromStr for TimeFrame {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(TimeFrame::Daily),
            "weekly" => Ok(TimeFrame::Weekly),
            "monthly" => Ok(TimeFrame::Monthly),
            "yearly" => Ok(TimeFrame::Yearly),
            _ => Err(DashboardError::UnknownTimeframe(s.to_string())),
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sunday on or before `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// The fixed product category set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Electronics,
    Clothing,
    HomeAndGarden,
    Sports,
    Books,
    FoodAndBeverages,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Electronics,
        Category::Clothing,
        Category::HomeAndGarden,
        Category::Sports,
        Category::Books,
        Category::FoodAndBeverages,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Electronics => "Electronics",
            Category::Clothing => "Clothing",
            Category::HomeAndGarden => "Home & Garden",
            Category::Sports => "Sports",
            Category::Books => "Books",
            Category::FoodAndBeverages => "Food & Beverages",
        }
    }

    /// Chart palette token; rendering maps it to a concrete colour
    pub fn color_token(&self) -> &'static str {
        match self {
            Category::Electronics => "chart-1",
            Category::Clothing => "chart-2",
            Category::HomeAndGarden => "chart-3",
            Category::Sports => "chart-4",
            Category::Books => "chart-5",
            Category::FoodAndBeverages => "chart-6",
        }
    }

    /// Parse an optional filter list; an empty list means "all categories"
    pub fn parse_filter<S: AsRef<str>>(names: &[S]) -> Result<Vec<Category>> {
        if names.is_empty() {
            return Ok(Category::ALL.to_vec());
        }
        let mut selected = Vec::with_capacity(names.len());
        for name in names {
            let category: Category = name.as_ref().parse()?;
            if !selected.contains(&category) {
                selected.push(category);
            }
        }
        Ok(selected)
    }
}

impl FromStr for Category {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DashboardError::UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One synthetic transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub date: NaiveDate,
    pub revenue: f64,
    pub order_count: u32,
    pub category: Category,
    pub customer_count: u32,
}

/// One grouped, time-keyed aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBucket {
    pub key: String,
    pub label: String,
    pub revenue_sum: f64,
    pub order_sum: u64,
    pub previous_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: Category,
    pub revenue: f64,
    pub orders: u64,
    /// Share of total revenue, one decimal place
    pub percentage: f64,
    pub color_token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub total_revenue: f64,
    pub total_orders: u64,
    pub total_customers: u64,
    pub avg_order_value: f64,
    /// `None` when the period has no revenue at all
    pub top_category: Option<Category>,
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodDeltas {
    pub revenue: f64,
    pub orders: f64,
    pub avg_order_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
    pub current: PeriodSummary,
    pub previous: PeriodSummary,
    pub deltas: PeriodDeltas,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking<T> {
    pub entity: T,
    pub rank: usize,
    pub percentile: u32,
    pub value: f64,
    /// Change against the entity's historical value, `None` without history
    pub delta_pct: Option<f64>,
    pub trend: Trend,
}

/// One hour of the intraday sales profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySales {
    pub hour: u32,
    pub label: String,
    pub revenue: f64,
    pub orders: u64,
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_range_rejects_reversed_dates() {
        let err = DateRange::new(date(2024, 3, 10), date(2024, 3, 1)).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidRange { .. }));

        // Single-day range is valid
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 1)).unwrap();
        assert_eq!(range.num_days(), 1);
    }

    #[test]
    fn test_deserialize_validates_range() {
        let err = serde_json::from_str::<DateRange>(r#"{"start":"2024-05-10","end":"2024-05-01"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("invalid date range"), "{}", err);

        let range: DateRange = serde_json::from_str(r#"{"start":"2024-05-01","end":"2024-05-10"}"#).unwrap();
        assert_eq!(range.num_days(), 10);
        assert_eq!(serde_json::to_string(&range).unwrap(), r#"{"start":"2024-05-01","end":"2024-05-10"}"#);
    }

    #[test]
    fn test_previous_period_same_length() {
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 31)).unwrap();
        let prev = range.previous_period();

        assert_eq!(prev.end(), date(2024, 2, 29));
        assert_eq!(prev.num_days(), 31);
        assert_eq!(prev.start(), date(2024, 1, 30));
    }

    #[test]
    fn test_bucket_keys() {
        // 2024-03-13 is a Wednesday; its week starts Sunday 2024-03-10
        let d = date(2024, 3, 13);
        assert_eq!(TimeFrame::Daily.bucket_key(d), "2024-03-13");
        assert_eq!(TimeFrame::Weekly.bucket_key(d), "2024-03-10");
        assert_eq!(TimeFrame::Monthly.bucket_key(d), "2024-03");
        assert_eq!(TimeFrame::Yearly.bucket_key(d), "2024");

        // A Sunday is its own week start
        assert_eq!(week_start(date(2024, 3, 10)), date(2024, 3, 10));
    }

    #[test]
    fn test_timeframe_parse() {
        assert_eq!("Monthly".parse::<TimeFrame>().unwrap(), TimeFrame::Monthly);
        assert_eq!(
            "hourly".parse::<TimeFrame>().unwrap_err(),
            DashboardError::UnknownTimeframe("hourly".to_string())
        );
    }

    #[test]
    fn test_category_filter_parse() {
        let all = Category::parse_filter::<&str>(&[]).unwrap();
        assert_eq!(all.len(), 6);

        let some = Category::parse_filter(&["books", "Home & Garden", "Books"]).unwrap();
        assert_eq!(some, vec![Category::Books, Category::HomeAndGarden]);

        assert!(Category::parse_filter(&["Toys"]).is_err());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.345, 1), 12.3);
        assert_eq!(round_to(12.35, 0), 12.0);
        assert_eq!(round_to(-4.56, 1), -4.6);
    }
}
