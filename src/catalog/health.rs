//! Repository health score
//!
//! A 0-100 summary of a project's activity, recomputed whenever its GitHub
//! statistics are refreshed:
//! - stars: up to 40 points on a log scale, full at 100k stars
//! - recency of the last push: up to 35 points
//! - contributors: up to 25 points, linear, full at 50 contributors

use bson::DateTime;

const STAR_POINTS: f64 = 40.0;
const STAR_SATURATION: f64 = 100_000.0;
const CONTRIBUTOR_POINTS: f64 = 25.0;
const CONTRIBUTOR_SATURATION: f64 = 50.0;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Recency points by age of the last commit, first match wins
const RECENCY_STEPS: [(i64, u8); 4] = [(30, 35), (90, 25), (180, 15), (365, 5)];

pub fn health_score(
    stars: i64,
    contributors: i64,
    last_commit: Option<DateTime>,
    now: DateTime,
) -> u8 {
    let stars = stars.max(0) as f64;
    let star_points = if stars <= 0.0 {
        0.0
    } else {
        (STAR_POINTS * (stars + 1.0).ln() / (STAR_SATURATION + 1.0).ln()).min(STAR_POINTS)
    };

    let contributors = (contributors.max(0) as f64).min(CONTRIBUTOR_SATURATION);
    let contributor_points = CONTRIBUTOR_POINTS * contributors / CONTRIBUTOR_SATURATION;

    let recency_points = last_commit
        .map(|at| recency_points(now.timestamp_millis() - at.timestamp_millis()))
        .unwrap_or(0);

    let total = star_points.round() as i64 + contributor_points.round() as i64 + recency_points as i64;
    total.clamp(0, 100) as u8
}

fn recency_points(age_ms: i64) -> u8 {
    // Clock skew can put the last push slightly in the future
    let age_days = age_ms.max(0) / DAY_MS;
    RECENCY_STEPS
        .iter()
        .find(|(max_days, _)| age_days <= *max_days)
        .map(|(_, points)| *points)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days_ago(now: DateTime, days: i64) -> Option<DateTime> {
        Some(DateTime::from_millis(now.timestamp_millis() - days * DAY_MS))
    }

    #[test]
    fn test_inactive_project_scores_zero() {
        assert_eq!(health_score(0, 0, None, DateTime::now()), 0);
    }

    #[test]
    fn test_saturated_project_scores_hundred() {
        let now = DateTime::now();
        assert_eq!(health_score(250_000, 400, days_ago(now, 2), now), 100);
    }

    #[test]
    fn test_recency_steps() {
        let now = DateTime::now();
        let score = |days| health_score(0, 0, days_ago(now, days), now);
        assert_eq!(score(0), 35);
        assert_eq!(score(30), 35);
        assert_eq!(score(31), 25);
        assert_eq!(score(120), 15);
        assert_eq!(score(300), 5);
        assert_eq!(score(400), 0);
    }

    #[test]
    fn test_future_commit_counts_as_fresh() {
        let now = DateTime::now();
        assert_eq!(health_score(0, 0, days_ago(now, -1), now), 35);
    }

    #[test]
    fn test_contributors_linear() {
        let now = DateTime::now();
        assert_eq!(health_score(0, 10, None, now), 5);
        assert_eq!(health_score(0, 50, None, now), 25);
        assert_eq!(health_score(0, 5_000, None, now), 25);
    }

    #[test]
    fn test_stars_log_scale() {
        let now = DateTime::now();
        let small = health_score(10, 0, None, now);
        let medium = health_score(1_000, 0, None, now);
        let large = health_score(100_000, 0, None, now);
        assert!(small < medium && medium < large);
        assert_eq!(large, 40);
        assert_eq!(medium, 24);
    }
}
