use chrono::{DateTime, Utc};

use crate::models::job_alert::JobAlert;
use crate::models::listing::Listing;

/// Weighted relevance of a listing for an alert, 0-100.
///
/// Title keyword coverage 40, company substring 20, location substring 15,
/// contract equality 10, recency up to 15. All string comparisons are
/// case-insensitive. Deterministic for a fixed `now`.
pub fn match_score(alert: &JobAlert, listing: &Listing) -> i32 {
    match_score_at(alert, listing, Utc::now())
}

pub fn match_score_at(alert: &JobAlert, listing: &Listing, now: DateTime<Utc>) -> i32 {
    let mut score = 0.0_f64;

    if !alert.keywords.is_empty() {
        let title = listing.title.to_lowercase();
        let matched = alert
            .keywords
            .iter()
            .filter(|keyword| title.contains(&keyword.to_lowercase()))
            .count();
        score += matched as f64 / alert.keywords.len() as f64 * 40.0;
    }

    if let Some(company) = &alert.company {
        if !company.is_empty()
            && listing
                .company
                .to_lowercase()
                .contains(&company.to_lowercase())
        {
            score += 20.0;
        }
    }

    if let Some(location) = &alert.location {
        if !location.is_empty()
            && listing
                .location
                .to_lowercase()
                .contains(&location.to_lowercase())
        {
            score += 15.0;
        }
    }

    if let (Some(wanted), Some(offered)) = (&alert.contract, &listing.contract) {
        if wanted.to_lowercase() == offered.to_lowercase() {
            score += 10.0;
        }
    }

    let days_since_published = (now - listing.published_at).num_seconds() as f64 / 86_400.0;
    if days_since_published <= 1.0 {
        score += 15.0;
    } else if days_since_published <= 7.0 {
        score += 10.0;
    } else if days_since_published <= 30.0 {
        score += 5.0;
    }

    // Components cannot exceed 100 by construction; clamp anyway.
    (score.round() as i32).clamp(0, 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn alert(keywords: &[&str]) -> JobAlert {
        JobAlert {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Test alert".to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            location: None,
            company: None,
            salary: None,
            contract: None,
            frequency: "daily".to_string(),
            active: true,
            last_check: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn listing(title: &str, published_at: DateTime<Utc>) -> Listing {
        Listing {
            external_id: "test_1".to_string(),
            title: title.to_string(),
            company: "Acme".to_string(),
            location: "Paris, France".to_string(),
            salary: None,
            contract: None,
            description: "A job".to_string(),
            url: "https://example.com/1".to_string(),
            source: "Test".to_string(),
            published_at,
            match_score: 0,
        }
    }

    #[test]
    fn reference_scenario_scores_eighty() {
        let now = Utc::now();
        let mut alert = alert(&["python", "backend"]);
        alert.location = Some("Paris".to_string());
        alert.contract = Some("CDI".to_string());

        let mut listing = listing("Backend Python Developer", now);
        listing.contract = Some("CDI".to_string());

        // 40 (2/2 keywords) + 15 (location) + 10 (contract) + 15 (today)
        assert_eq!(match_score_at(&alert, &listing, now), 80);
    }

    #[test]
    fn scoring_is_deterministic() {
        let now = Utc::now();
        let alert = alert(&["rust"]);
        let listing = listing("Rust Engineer", now - Duration::days(3));
        let first = match_score_at(&alert, &listing, now);
        for _ in 0..10 {
            assert_eq!(match_score_at(&alert, &listing, now), first);
        }
        assert!((0..=100).contains(&first));
    }

    #[test]
    fn adding_a_matching_keyword_never_decreases_the_score() {
        let now = Utc::now();
        let alert_one = alert(&["python"]);
        let alert_two = alert(&["python", "developer"]);
        let listing = listing("Senior Python Developer", now - Duration::days(3));

        let base = match_score_at(&alert_one, &listing, now);
        let extended = match_score_at(&alert_two, &listing, now);
        assert!(extended >= base);
    }

    #[test]
    fn keyword_matching_is_case_insensitive() {
        let now = Utc::now();
        let alert = alert(&["PYTHON"]);
        let listing = listing("python developer", now);
        // 40 keywords + 15 recency
        assert_eq!(match_score_at(&alert, &listing, now), 55);
    }

    #[test]
    fn company_match_adds_twenty() {
        let now = Utc::now();
        let mut alert = alert(&["dev"]);
        alert.company = Some("acme".to_string());
        let listing = listing("Dev", now);
        // 40 + 20 company + 15 recency
        assert_eq!(match_score_at(&alert, &listing, now), 75);
    }

    #[test]
    fn recency_bonus_decays_in_tiers() {
        let now = Utc::now();
        let alert = alert(&["dev"]);

        let today = listing("dev", now - Duration::hours(12));
        let this_week = listing("dev", now - Duration::days(3));
        let this_month = listing("dev", now - Duration::days(20));
        let old = listing("dev", now - Duration::days(45));

        assert_eq!(match_score_at(&alert, &today, now), 55);
        assert_eq!(match_score_at(&alert, &this_week, now), 50);
        assert_eq!(match_score_at(&alert, &this_month, now), 45);
        assert_eq!(match_score_at(&alert, &old, now), 40);
    }

    #[test]
    fn no_keywords_matched_scores_only_recency() {
        let now = Utc::now();
        let alert = alert(&["java", "spring"]);
        let listing = listing("Rust Engineer", now - Duration::days(45));
        assert_eq!(match_score_at(&alert, &listing, now), 0);
    }
}
