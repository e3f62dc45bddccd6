/// Limit normalization and popup table ordering

use std::collections::BTreeSet;

use crate::protocol::Snapshot;

/// Turn requested minutes into a stored limit; None means "delete"
///
/// Absent, NaN and non-positive values delete. Anything else is floored and
/// clamped to at least one minute, so 0.5 becomes 1.
pub fn normalize_limit(minutes: Option<f64>) -> Option<u32> {
    let minutes = minutes?;

    if minutes.is_nan() || minutes <= 0.0 {
        return None;
    }

    Some(minutes.floor().clamp(1.0, u32::MAX as f64) as u32)
}

/// Parse the minutes field like `parseInt`: an optional sign followed by the
/// leading digits, ignoring whatever comes after
pub fn parse_minutes(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    let (sign, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    digits.parse::<f64>().ok().map(|value| sign * value)
}

/// One line of the popup table
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRow {
    pub domain: String,
    pub used: u32,
    pub limit: Option<u32>,
    pub active: bool,
}

impl UsageRow {
    pub fn used_label(&self) -> String {
        format!("{}m", self.used)
    }

    pub fn limit_label(&self) -> String {
        match self.limit {
            Some(limit) => format!("{}m", limit),
            None => "-".to_string(),
        }
    }
}

/// Rows for every domain that has usage today or a limit
///
/// The active domain is pinned first, the rest by usage descending, then by
/// domain name ascending.
pub fn usage_rows(snapshot: &Snapshot) -> Vec<UsageRow> {
    let domains: BTreeSet<&String> = snapshot.usage.keys().chain(snapshot.limits.keys()).collect();
    let active = snapshot.active_domain.as_deref();

    let mut rows: Vec<UsageRow> = domains
        .into_iter()
        .map(|domain| UsageRow {
            domain: domain.clone(),
            used: snapshot.usage.get(domain).copied().unwrap_or(0),
            limit: snapshot.limits.get(domain).copied(),
            active: Some(domain.as_str()) == active,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.active
            .cmp(&a.active)
            .then_with(|| b.used.cmp(&a.used))
            .then_with(|| a.domain.cmp(&b.domain))
    });

    rows
}

/// Header line of the popup
pub fn active_label(active_domain: Option<&str>) -> String {
    match active_domain {
        Some(domain) => format!("Active: {}", domain),
        None => "No active domain".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_snapshot(usage: &[(&str, u32)], limits: &[(&str, u32)], active: Option<&str>) -> Snapshot {
        Snapshot {
            date: "2024-05-01".to_string(),
            usage: usage.iter().map(|(d, m)| (d.to_string(), *m)).collect(),
            limits: limits.iter().map(|(d, m)| (d.to_string(), *m)).collect(),
            active_domain: active.map(str::to_string),
            active_tab_id: None,
        }
    }

    #[test]
    fn test_normalize_limit_deletes() {
        assert_eq!(normalize_limit(None), None);
        assert_eq!(normalize_limit(Some(0.0)), None);
        assert_eq!(normalize_limit(Some(-5.0)), None);
        assert_eq!(normalize_limit(Some(f64::NAN)), None);
    }

    #[test]
    fn test_normalize_limit_floors_and_clamps() {
        assert_eq!(normalize_limit(Some(30.0)), Some(30));
        assert_eq!(normalize_limit(Some(12.9)), Some(12));
        assert_eq!(normalize_limit(Some(0.5)), Some(1));
        assert_eq!(normalize_limit(Some(1e12)), Some(u32::MAX));
    }

    #[test]
    fn test_parse_minutes() {
        assert_eq!(parse_minutes("30"), Some(30.0));
        assert_eq!(parse_minutes(" 45 "), Some(45.0));
        assert_eq!(parse_minutes("12.7"), Some(12.0));
        assert_eq!(parse_minutes("20min"), Some(20.0));
        assert_eq!(parse_minutes("-3"), Some(-3.0));
        assert_eq!(parse_minutes(""), None);
        assert_eq!(parse_minutes("abc"), None);
    }

    #[test]
    fn test_usage_rows_union_of_usage_and_limits() {
        let snapshot = create_snapshot(&[("github.com", 4)], &[("youtube.com", 30)], None);

        let rows = usage_rows(&snapshot);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].domain, "github.com");
        assert_eq!(rows[0].limit, None);
        assert_eq!(rows[1].domain, "youtube.com");
        assert_eq!(rows[1].used, 0);
        assert_eq!(rows[1].limit, Some(30));
    }

    #[test]
    fn test_usage_rows_active_domain_first() {
        let snapshot = create_snapshot(
            &[("github.com", 40), ("reddit.com", 3), ("youtube.com", 12)],
            &[("youtube.com", 30), ("reddit.com", 25)],
            Some("reddit.com"),
        );

        let rows = usage_rows(&snapshot);
        let order: Vec<&str> = rows.iter().map(|r| r.domain.as_str()).collect();

        assert_eq!(order, vec!["reddit.com", "github.com", "youtube.com"]);
        assert!(rows[0].active);
        assert!(!rows[1].active);
    }

    #[test]
    fn test_usage_rows_ties_sorted_by_name() {
        let snapshot = create_snapshot(&[("b.com", 5), ("a.com", 5)], &[("c.com", 10)], None);

        let rows = usage_rows(&snapshot);
        let order: Vec<&str> = rows.iter().map(|r| r.domain.as_str()).collect();

        assert_eq!(order, vec!["a.com", "b.com", "c.com"]);
    }

    #[test]
    fn test_active_label() {
        assert_eq!(active_label(Some("youtube.com")), "Active: youtube.com");
        assert_eq!(active_label(None), "No active domain");
    }

    #[test]
    fn test_row_labels() {
        let row = UsageRow {
            domain: "youtube.com".to_string(),
            used: 7,
            limit: None,
            active: false,
        };
        assert_eq!(row.used_label(), "7m");
        assert_eq!(row.limit_label(), "-");

        let row = UsageRow { limit: Some(30), ..row };
        assert_eq!(row.limit_label(), "30m");
    }
}
