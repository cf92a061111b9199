//! Date operands for check-date and element-age comparisons.

use time::macros::format_description;
use time::{Date, Duration};

use super::EvalContext;

/// A date operand in a filter: either a fixed calendar date or a date
/// relative to "today".
#[derive(Debug, Clone, PartialEq)]
pub enum DateFilter {
    Fixed(Date),
    Relative(RelativeDate),
}

impl DateFilter {
    /// Resolve the operand to a concrete date under the given context.
    pub fn date(&self, ctx: &EvalContext) -> Date {
        match self {
            DateFilter::Fixed(date) => *date,
            DateFilter::Relative(rel) => rel.date(ctx),
        }
    }
}

/// "today ± N days", stored as a signed day delta. The delta is scaled by
/// the context's resurvey-interval multiplier at resolution time, so a
/// multiplier change affects all subsequent evaluations uniformly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativeDate {
    pub delta_days: f64,
}

impl RelativeDate {
    pub fn new(delta_days: f64) -> Self {
        RelativeDate { delta_days }
    }

    pub fn date(&self, ctx: &EvalContext) -> Date {
        let days = (self.delta_days * ctx.resurvey_multiplier).round() as i64;
        ctx.today
            .checked_add(Duration::days(days))
            .unwrap_or(ctx.today)
    }
}

/// Parse a `YYYY-MM-DD` string, as used in check-date tag values.
pub fn parse_check_date(s: &str) -> Option<Date> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(s, &format).ok()
}
