// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cron expression evaluation against a point in time.
//!
//! Pure and non-suspending — this module does no I/O and never panics on
//! malformed input. A field that fails to parse simply never matches,
//! so one bad `Schedule` row can't take down the schedule loop.

use chrono::{DateTime, Datelike, TimeZone, Timelike};

/// A parsed 5-field cron expression: minute hour day-of-month month weekday.
#[derive(Debug, Clone)]
pub struct CronEvaluator {
    minute: Field,
    hour: Field,
    day_of_month: Field,
    month: Field,
    weekday: Field,
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    min: u32,
    max: u32,
    /// Cron day-of-week accepts the literal `7` as a synonym for `0` (Sunday).
    dow_seven_is_zero: bool,
}

const MINUTE: Bounds = Bounds { min: 0, max: 59, dow_seven_is_zero: false };
const HOUR: Bounds = Bounds { min: 0, max: 23, dow_seven_is_zero: false };
const DAY_OF_MONTH: Bounds = Bounds { min: 1, max: 31, dow_seven_is_zero: false };
const MONTH: Bounds = Bounds { min: 1, max: 12, dow_seven_is_zero: false };
const WEEKDAY: Bounds = Bounds { min: 0, max: 6, dow_seven_is_zero: true };

#[derive(Debug, Clone)]
struct Field {
    tokens: Vec<Token>,
}

#[derive(Debug, Clone, Copy)]
enum Token {
    Star { step: Option<u32> },
    Single(u32),
    Range { start: u32, end: u32, step: Option<u32> },
}

impl Field {
    /// Parse a comma-separated field. An empty field never matches; a
    /// malformed individual token is dropped (also never matches) rather
    /// than failing the whole field, so `"1,bogus,3"` still fires on 1 and 3.
    fn parse(raw: &str, bounds: Bounds) -> Self {
        if raw.trim().is_empty() {
            return Field { tokens: vec![] };
        }
        let tokens = raw.split(',').filter_map(|tok| Self::parse_token(tok, bounds)).collect();
        Field { tokens }
    }

    fn parse_token(tok: &str, bounds: Bounds) -> Option<Token> {
        let tok = tok.trim();
        if tok.is_empty() {
            return None;
        }
        let (base, step) = match tok.split_once('/') {
            Some((base, step_str)) => {
                let step: u32 = step_str.trim().parse().ok()?;
                if step == 0 {
                    return None;
                }
                (base.trim(), Some(step))
            }
            None => (tok, None),
        };

        if base == "*" {
            return Some(Token::Star { step });
        }

        if let Some((start_str, end_str)) = base.split_once('-') {
            let start = Self::normalize(start_str.trim().parse().ok()?, bounds);
            let end = Self::normalize(end_str.trim().parse().ok()?, bounds);
            let start = start.clamp(bounds.min, bounds.max);
            let end = end.clamp(bounds.min, bounds.max);
            if start > end {
                return None;
            }
            return Some(Token::Range { start, end, step });
        }

        // Bare "N/S" (step with no explicit range) is still a single base value.
        let n = Self::normalize(base.parse().ok()?, bounds);
        Some(Token::Single(n.clamp(bounds.min, bounds.max)))
    }

    fn normalize(n: u32, bounds: Bounds) -> u32 {
        if bounds.dow_seven_is_zero && n == 7 {
            0
        } else {
            n
        }
    }

    fn matches(&self, value: u32, bounds: Bounds) -> bool {
        let value = Self::normalize(value, bounds);
        self.tokens.iter().any(|tok| match *tok {
            Token::Star { step } => match step {
                Some(s) => (value.saturating_sub(bounds.min)) % s == 0,
                None => true,
            },
            Token::Single(n) => n == value,
            Token::Range { start, end, step } => {
                if value < start || value > end {
                    return false;
                }
                match step {
                    Some(s) => (value - start) % s == 0,
                    None => true,
                }
            }
        })
    }
}

impl CronEvaluator {
    /// Parse a 5-field expression (`minute hour day month weekday`). A
    /// malformed expression is accepted — it simply never matches.
    pub fn parse(expr: &str) -> Self {
        let mut fields = expr.split_whitespace();
        let minute = Field::parse(fields.next().unwrap_or(""), MINUTE);
        let hour = Field::parse(fields.next().unwrap_or(""), HOUR);
        let day_of_month = Field::parse(fields.next().unwrap_or(""), DAY_OF_MONTH);
        let month = Field::parse(fields.next().unwrap_or(""), MONTH);
        let weekday = Field::parse(fields.next().unwrap_or(""), WEEKDAY);
        CronEvaluator { minute, hour, day_of_month, month, weekday }
    }

    /// Does this expression fire at `t` (resolution: one minute)?
    ///
    /// Day-of-month and day-of-week are combined with AND, a deliberate
    /// simplification versus classical cron's OR — see module docs on
    /// `Schedule.cron_expression`.
    pub fn matches<Tz: TimeZone>(&self, t: DateTime<Tz>) -> bool {
        self.minute.matches(t.minute(), MINUTE)
            && self.hour.matches(t.hour(), HOUR)
            && self.day_of_month.matches(t.day(), DAY_OF_MONTH)
            && self.month.matches(t.month(), MONTH)
            && self.weekday.matches(t.weekday().num_days_from_sunday(), WEEKDAY)
    }

    /// Convenience: parse and evaluate in one call.
    pub fn expression_matches<Tz: TimeZone>(expr: &str, t: DateTime<Tz>) -> bool {
        Self::parse(expr).matches(t)
    }
}

#[cfg(test)]
#[path = "cron_tests.rs"]
mod tests;
