//! Team and task rule tests
//!
//! Property-based tests for:
//! - Slug generation
//! - Membership and assignment permissions
//! - Email job retry policy

use chrono::Utc;
use proptest::prelude::*;
use shared::models::{resolve_team_slug, EmailJob, Task, Team, TEAM_SLUG_MAX_LEN};
use shared::permissions::{
    can_be_assigned, is_assigned_to_task, is_team_creator, is_team_member_or_creator,
};
use shared::slug::slugify;
use tms::config::WorkerConfig;
use tms::worker::{retry_decision, RetryDecision};

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Generate team names with punctuation, padding and mixed case
fn team_name_strategy() -> impl Strategy<Value = String> {
    "[ A-Za-z0-9_!,.-]{0,120}"
}

fn member_list_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{3,8}", 0..6)
}

fn team(created_by: i64, creator: &str, members: Vec<String>) -> Team {
    Team {
        id: 1,
        name: "Platform".to_string(),
        description: None,
        slug: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        created_by,
        created_by_username: creator.to_string(),
        members,
    }
}

fn task(assigned_to: Option<i64>) -> Task {
    Task {
        id: 1,
        title: "Task".to_string(),
        description: None,
        completed: false,
        team_id: 1,
        assigned_to,
        assigned_to_username: None,
        due_date: None,
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Slugs only contain lowercase ASCII letters, digits, `-` and `_`
    #[test]
    fn test_slug_charset(name in team_name_strategy()) {
        let slug = slugify(&name);
        prop_assert!(slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_'));
    }

    #[test]
    fn test_slug_has_no_edge_or_double_hyphens(name in team_name_strategy()) {
        let slug = slugify(&name);
        prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
        prop_assert!(!slug.starts_with('_') && !slug.ends_with('_'));
        prop_assert!(!slug.contains("--"));
    }

    #[test]
    fn test_slugify_is_idempotent(name in team_name_strategy()) {
        let once = slugify(&name);
        prop_assert_eq!(slugify(&once), once.clone());
    }

    /// A team saved without a slug gets one derived from its name
    #[test]
    fn test_missing_slug_derived_from_name(name in team_name_strategy()) {
        prop_assert_eq!(resolve_team_slug(&name, None), slugify(&name));
        prop_assert_eq!(resolve_team_slug(&name, Some("   ")), slugify(&name));
    }

    #[test]
    fn test_explicit_slug_is_kept(name in team_name_strategy(), slug in "[a-z0-9-]{1,300}") {
        let resolved = resolve_team_slug(&name, Some(&slug));
        prop_assert!(resolved.chars().count() <= TEAM_SLUG_MAX_LEN);
        prop_assert!(slug.starts_with(&resolved));
    }

    /// The creator always passes member-or-creator checks
    #[test]
    fn test_creator_always_allowed(
        creator_id in 1i64..10_000,
        members in member_list_strategy(),
    ) {
        let team = team(creator_id, "owner", members);
        prop_assert!(is_team_creator(&team, creator_id));
        prop_assert!(is_team_member_or_creator(&team, creator_id, "owner"));
        prop_assert!(can_be_assigned(&team, creator_id, "owner"));
    }

    #[test]
    fn test_members_allowed_but_not_creators(
        members in prop::collection::vec("[a-z]{3,8}", 1..6),
        pick in any::<prop::sample::Index>(),
    ) {
        let team = team(1, "owner", members.clone());
        let member = pick.get(&members);
        prop_assert!(is_team_member_or_creator(&team, 999, member));
        prop_assert!(!is_team_creator(&team, 999));
    }

    #[test]
    fn test_outsiders_denied(members in member_list_strategy()) {
        let team = team(1, "owner", members);
        // Uppercase names never collide with the generated members
        prop_assert!(!is_team_member_or_creator(&team, 999, "OUTSIDER"));
        prop_assert!(!can_be_assigned(&team, 999, "OUTSIDER"));
    }

    #[test]
    fn test_only_assignee_may_update(assignee in 1i64..1000, other in 1000i64..2000) {
        prop_assert!(is_assigned_to_task(&task(Some(assignee)), assignee));
        prop_assert!(!is_assigned_to_task(&task(Some(assignee)), other));
        prop_assert!(!is_assigned_to_task(&task(None), assignee));
    }

    /// A job is attempted exactly `max_retries` times before dead-lettering
    #[test]
    fn test_attempts_bounded_by_max_retries(max_retries in 1u32..10, backoff in 0u64..30) {
        let config = WorkerConfig {
            queue_name: "tms:email".to_string(),
            max_retries,
            poll_timeout_secs: 5,
            retry_backoff_secs: backoff,
        };

        let mut job = EmailJob::new("s", "m", None, vec!["a@example.com".to_string()]);
        let mut deliveries = 1;
        while let RetryDecision::Retry { delay } = retry_decision(job.attempts, &config) {
            prop_assert_eq!(delay.as_secs(), backoff * u64::from(job.attempts + 1));
            job = job.next_attempt();
            deliveries += 1;
        }
        prop_assert_eq!(deliveries, max_retries);
    }
}
