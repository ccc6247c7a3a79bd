//! Nominal/actual value reconciliation and locale number normalization.
//!
//! A security's context (table row or raw-text window) usually carries
//! several numeric tokens: nominal, price, market value, weight. This
//! module normalizes locale-formatted numbers and applies the positional
//! layout heuristic "CCY NOMINAL ... ACTUAL WEIGHT%" to tell them apart.
//! Contexts with a different numeric ordering will misassign nominal and
//! actual; that limitation is accepted rather than papered over with more
//! guessing.

use chrono::NaiveDate;
use regex::Regex;

use crate::classify::KeywordTable;
use crate::model::{DiagnosticKind, Diagnostics, SecurityRecord};

/// Normalize a locale-formatted numeric token into a plain number.
///
/// Handles apostrophe (including U+2019) and space thousands separators,
/// decimal commas, mixed `.`/`,` grouping (the rightmost separator is the
/// decimal one) and leading currency symbols. Returns `None` for anything
/// that does not survive normalization.
pub fn normalize_number(token: &str) -> Option<f64> {
    let mut s = token.trim().to_string();
    while s.starts_with(['$', '€', '£']) {
        s.remove(0);
    }
    s.retain(|c| !c.is_whitespace() && c != '\'' && c != '\u{2019}');
    if s.is_empty() || !s.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let has_dot = s.contains('.');
    let has_comma = s.contains(',');

    let cleaned = if has_dot && has_comma {
        // The rightmost separator is the decimal one.
        let last_dot = s.rfind('.').unwrap_or(0);
        let last_comma = s.rfind(',').unwrap_or(0);
        if last_dot > last_comma {
            s.replace(',', "")
        } else {
            s.replace('.', "").replace(',', ".")
        }
    } else if has_comma {
        if is_grouped(&s, ',') {
            s.replace(',', "")
        } else {
            s.replace(',', ".")
        }
    } else if has_dot {
        if is_grouped(&s, '.') {
            s.replace('.', "")
        } else {
            s
        }
    } else {
        s
    };

    cleaned.parse::<f64>().ok()
}

/// Normalize a percentage token ("1.02%", "3,5 %") into its number.
pub fn normalize_percent(token: &str) -> Option<f64> {
    let stripped = token.trim().strip_suffix('%')?;
    normalize_number(stripped)
}

/// Strict thousands grouping: 1-3 leading digits, then groups of exactly
/// three. Anything else treats the separator as decimal.
fn is_grouped(s: &str, sep: char) -> bool {
    let body = s.trim_start_matches(['+', '-']);
    let parts: Vec<&str> = body.split(sep).collect();
    parts.len() >= 2
        && !parts[0].is_empty()
        && parts[0].len() <= 3
        && parts[0].chars().all(|c| c.is_ascii_digit())
        && parts[1..]
            .iter()
            .all(|p| p.len() == 3 && p.chars().all(|c| c.is_ascii_digit()))
}

/// Monetary threshold for the positional heuristic. Tokens below it
/// without grouping separators are prices or rates, not position values.
const MONETARY_THRESHOLD: f64 = 1000.0;

#[derive(Debug)]
struct NumericToken {
    position: usize,
    value: f64,
    grouped: bool,
    is_percent: bool,
}

impl NumericToken {
    /// Order of magnitude consistent with a position value.
    fn is_monetary(&self) -> bool {
        !self.is_percent && (self.grouped || self.value >= MONETARY_THRESHOLD)
    }

    /// Bare four-digit tokens in a plausible year range are maturity
    /// years, not values.
    fn looks_like_year(&self, raw: &str) -> bool {
        raw.len() == 4 && !self.grouped && (1900.0..=2100.0).contains(&self.value)
    }
}

/// Fills a record's value fields from its raw context.
pub struct ValueReconciler {
    keywords: KeywordTable,
    dmy_re: Regex,
    iso_re: Regex,
}

impl ValueReconciler {
    /// Create a reconciler with the built-in keyword table.
    pub fn new() -> Self {
        Self::with_keywords(KeywordTable::builtin())
    }

    /// Create a reconciler with a custom keyword table.
    pub fn with_keywords(keywords: KeywordTable) -> Self {
        Self {
            keywords,
            dmy_re: Regex::new(r"\b(\d{1,2})[./](\d{1,2})[./](\d{4})\b").unwrap(),
            iso_re: Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").unwrap(),
        }
    }

    /// Populate empty value fields of `record` from `context`.
    ///
    /// Never raises: unparsable tokens leave their field `None` and are
    /// reported in the diagnostics list. Populated fields are left
    /// untouched.
    pub fn reconcile(
        &self,
        record: &mut SecurityRecord,
        context: &str,
        diagnostics: &mut Diagnostics,
    ) {
        let page = Some(record.provenance.page_index());
        let tokens: Vec<&str> = context
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| matches!(c, ',' | ';' | ':' | '(' | ')' | '*')))
            .filter(|t| !t.is_empty())
            .collect();

        // Currency anchors the positional heuristic.
        let currency_pos = tokens.iter().position(|t| {
            t.len() == 3 && t.chars().all(|c| c.is_ascii_uppercase()) && self.keywords.is_currency_code(t)
        });
        if let (None, Some(pos)) = (&record.currency, currency_pos) {
            record.currency = Some(tokens[pos].to_string());
        }

        let scan_from = currency_pos.map(|p| p + 1).unwrap_or(0);
        let mut numerics: Vec<NumericToken> = Vec::new();
        let mut percents: Vec<NumericToken> = Vec::new();

        for (position, raw) in tokens.iter().enumerate() {
            if raw.ends_with('%') {
                match normalize_percent(raw) {
                    Some(value) => percents.push(NumericToken {
                        position,
                        value,
                        grouped: false,
                        is_percent: true,
                    }),
                    None => diagnostics.record(
                        DiagnosticKind::UnparsableToken,
                        page,
                        format!("percent token: {}", raw),
                    ),
                }
                continue;
            }
            if position < scan_from {
                continue;
            }
            let digits = raw.chars().filter(|c| c.is_ascii_digit()).count();
            if digits == 0 {
                continue;
            }
            // Skip identifier-shaped and date-shaped tokens.
            if raw.chars().any(|c| c.is_ascii_alphabetic()) || self.dmy_re.is_match(raw) || self.iso_re.is_match(raw) {
                continue;
            }
            let grouped = raw.contains('\'')
                || raw.contains('\u{2019}')
                || is_grouped(raw, ',')
                || is_grouped(raw, '.');
            match normalize_number(raw) {
                Some(value) => {
                    let token = NumericToken {
                        position,
                        value,
                        grouped,
                        is_percent: false,
                    };
                    if !token.looks_like_year(raw) {
                        numerics.push(token);
                    }
                }
                None => diagnostics.record(
                    DiagnosticKind::UnparsableToken,
                    page,
                    format!("numeric token: {}", raw),
                ),
            }
        }

        // Trailing percentage is the percent-of-assets weight; earlier
        // percentages at coupon scale feed the coupon field.
        if let Some(last) = percents.last() {
            if record.weight_percent.is_none() {
                record.weight_percent = Some(last.value);
            }
        }
        if percents.len() > 1 && record.coupon.is_none() {
            if let Some(coupon) = percents[..percents.len() - 1]
                .iter()
                .find(|p| p.value > 0.0 && p.value <= 20.0)
            {
                record.coupon = Some(coupon.value);
            }
        }

        let monetary: Vec<&NumericToken> = numerics.iter().filter(|t| t.is_monetary()).collect();
        match monetary.len() {
            0 => {}
            1 => {
                // A single large token is the market value; nominal stays
                // null rather than guessed.
                if record.actual_value.is_none() {
                    record.actual_value = Some(monetary[0].value);
                }
            }
            _ => {
                if record.nominal_value.is_none() {
                    record.nominal_value = Some(monetary[0].value);
                }
                if record.actual_value.is_none() {
                    record.actual_value = Some(self.pick_actual(&monetary, percents.last()));
                }
            }
        }

        // A price-scale decimal between nominal and actual.
        if record.current_price.is_none() {
            if let Some(price) = numerics
                .iter()
                .find(|t| !t.is_monetary() && t.value > 0.0 && t.value < MONETARY_THRESHOLD && t.value.fract() != 0.0)
            {
                record.current_price = Some(price.value);
            }
        }

        if record.maturity.is_none() {
            record.maturity = self.find_maturity(context);
        }
    }

    /// With two monetary tokens the second is the actual value; with more,
    /// the one nearest the trailing weight percentage wins, falling back
    /// to the last one.
    fn pick_actual(&self, monetary: &[&NumericToken], weight: Option<&NumericToken>) -> f64 {
        if let Some(weight) = weight {
            if let Some(best) = monetary
                .iter()
                .filter(|t| t.position < weight.position)
                .min_by_key(|t| weight.position - t.position)
            {
                return best.value;
            }
        }
        monetary[monetary.len() - 1].value
    }

    fn find_maturity(&self, context: &str) -> Option<NaiveDate> {
        if let Some(caps) = self.dmy_re.captures(context) {
            let day: u32 = caps[1].parse().ok()?;
            let month: u32 = caps[2].parse().ok()?;
            let year: i32 = caps[3].parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, day);
        }
        if let Some(caps) = self.iso_re.captures(context) {
            let year: i32 = caps[1].parse().ok()?;
            let month: u32 = caps[2].parse().ok()?;
            let day: u32 = caps[3].parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, day);
        }
        None
    }
}

impl Default for ValueReconciler {
    fn default() -> Self {
        Self::new()
    }
}
