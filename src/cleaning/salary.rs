use super::frame::{Cells, Frame};

pub const SALARY_AVG: &str = "salary_avg";
pub const SALARY_MIN: &str = "salary_min";
pub const SALARY_MAX: &str = "salary_max";

/// Characters stripped from salary text before parsing. The last three are
/// what a UTF-8 rupee sign turns into when the file was decoded as cp1252.
const CURRENCY_NOISE: &[char] = &['$', ',', '₹', '€', '£', '¥', 'â', '‚', '¹'];

/// Parse a salary cell such as `"$90,000"` into a number
///
/// Anything that does not parse, including NaN and infinities, is `None`.
pub fn parse_currency(raw: &str) -> Option<f64> {
    let stripped: String = raw.chars().filter(|c| !CURRENCY_NOISE.contains(c)).collect();
    stripped
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Convert any column to nullable decimals
pub fn to_decimal(cells: Cells) -> Vec<Option<f64>> {
    match cells {
        Cells::Decimal(values) => values,
        Cells::Text(values) => values
            .iter()
            .map(|v| v.as_deref().and_then(parse_currency))
            .collect(),
        Cells::Flag(values) => values.into_iter().map(|v| Some(f64::from(v))).collect(),
        Cells::DateTime(values) => vec![None; values.len()],
    }
}

/// Names of every column whose label contains "salary"
pub fn salary_columns(frame: &Frame) -> Vec<String> {
    frame
        .names()
        .filter(|name| name.contains("salary"))
        .map(str::to_string)
        .collect()
}

/// Median of the non-null values, `None` when there are none
pub fn median(values: &[Option<f64>]) -> Option<f64> {
    let mut present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    present.sort_by(f64::total_cmp);

    let mid = present.len() / 2;
    if present.len() % 2 == 0 {
        Some((present[mid - 1] + present[mid]) / 2.0)
    } else {
        Some(present[mid])
    }
}

/// Null both bounds wherever `min > max`; returns the number of rows affected
pub fn null_inverted_ranges(min: &mut [Option<f64>], max: &mut [Option<f64>]) -> usize {
    let mut nulled = 0;
    for (lo, hi) in min.iter_mut().zip(max.iter_mut()) {
        if let (Some(l), Some(h)) = (*lo, *hi) {
            if l > h {
                *lo = None;
                *hi = None;
                nulled += 1;
            }
        }
    }
    nulled
}

/// Fill a missing average with the midpoint of both bounds; returns rows filled
pub fn backfill_average(avg: &mut [Option<f64>], min: &[Option<f64>], max: &[Option<f64>]) -> usize {
    let mut filled = 0;
    for ((a, lo), hi) in avg.iter_mut().zip(min).zip(max) {
        if a.is_none() {
            if let (Some(l), Some(h)) = (lo, hi) {
                *a = Some((l + h) / 2.0);
                filled += 1;
            }
        }
    }
    filled
}

/// Replace remaining nulls with the column median; returns (cells filled, median)
pub fn impute_median(values: &mut [Option<f64>]) -> (usize, Option<f64>) {
    let Some(m) = median(values) else {
        return (0, None);
    };
    let mut filled = 0;
    for v in values.iter_mut().filter(|v| v.is_none()) {
        *v = Some(m);
        filled += 1;
    }
    (filled, Some(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_strings_are_stripped() {
        assert_eq!(parse_currency("$90,000"), Some(90000.0));
        assert_eq!(parse_currency("₹1,20,000"), Some(120000.0));
        assert_eq!(parse_currency("â‚¹45000"), Some(45000.0));
        assert_eq!(parse_currency(" 72500.50 "), Some(72500.5));
    }

    #[test]
    fn unparsable_salaries_become_null() {
        assert_eq!(parse_currency("competitive"), None);
        assert_eq!(parse_currency("nan"), None);
        assert_eq!(parse_currency("inf"), None);
        assert_eq!(parse_currency(""), None);
        assert_eq!(parse_currency("$50k"), None);
    }

    #[test]
    fn median_handles_odd_even_and_empty() {
        assert_eq!(median(&[Some(3.0), None, Some(1.0), Some(2.0)]), Some(2.0));
        assert_eq!(median(&[Some(4.0), Some(1.0), Some(2.0), Some(3.0)]), Some(2.5));
        assert_eq!(median(&[None, None]), None);
    }

    #[test]
    fn inverted_ranges_null_both_bounds() {
        let mut min = vec![Some(90000.0), Some(50000.0), None];
        let mut max = vec![Some(70000.0), Some(60000.0), Some(10.0)];

        assert_eq!(null_inverted_ranges(&mut min, &mut max), 1);
        assert_eq!(min, vec![None, Some(50000.0), None]);
        assert_eq!(max, vec![None, Some(60000.0), Some(10.0)]);
    }

    #[test]
    fn average_is_backfilled_only_when_both_bounds_exist() {
        let mut avg = vec![None, None, Some(1.0)];
        let min = vec![Some(50000.0), Some(50000.0), Some(50000.0)];
        let max = vec![Some(60000.0), None, Some(60000.0)];

        assert_eq!(backfill_average(&mut avg, &min, &max), 1);
        assert_eq!(avg, vec![Some(55000.0), None, Some(1.0)]);
    }

    #[test]
    fn impute_fills_with_median_of_present_values() {
        let mut values = vec![Some(10.0), None, Some(30.0)];
        assert_eq!(impute_median(&mut values), (1, Some(20.0)));
        assert_eq!(values, vec![Some(10.0), Some(20.0), Some(30.0)]);

        let mut empty: Vec<Option<f64>> = vec![None, None];
        assert_eq!(impute_median(&mut empty), (0, None));
        assert_eq!(empty, vec![None, None]);
    }
}
