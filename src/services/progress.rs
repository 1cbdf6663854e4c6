use sqlx::types::Json;

use crate::db::models::{Profile, TopicStrength};
use crate::db::types::SkillLevel;
use crate::services::ai_grading::BaselineAssessment;

pub(crate) const STRENGTH_STEP: f64 = 0.1;
pub(crate) const STRENGTH_CEILING: f64 = 1.0;
pub(crate) const INTERMEDIATE_THRESHOLD: i32 = 5;
pub(crate) const ADVANCED_THRESHOLD: i32 = 15;

/// Result of folding one graded submission into a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ProgressOutcome {
    pub(crate) promoted_to: Option<SkillLevel>,
}

/// Replaces level and strengths wholesale with the assessment verdict.
pub(crate) fn apply_baseline(profile: &mut Profile, assessment: &BaselineAssessment) {
    profile.skill_level = assessment.skill_level;
    profile.topic_strength = Json(
        assessment
            .topic_strength
            .iter()
            .map(|(topic, score)| (topic.clone(), score.clamp(0.0, STRENGTH_CEILING)))
            .collect::<TopicStrength>(),
    );
    profile.assessment_completed = true;
}

/// Incorrect submissions leave the profile untouched. A correct one bumps the
/// counter, nudges the problem's topic strength and promotes exactly when the
/// counter lands on a threshold from the level just below it.
pub(crate) fn apply_grading(
    profile: &mut Profile,
    topic: Option<&str>,
    is_correct: bool,
) -> ProgressOutcome {
    if !is_correct {
        return ProgressOutcome { promoted_to: None };
    }

    profile.problems_solved = profile.problems_solved.saturating_add(1);

    if let Some(topic) = topic {
        let strength = profile.topic_strength.0.entry(topic.to_string()).or_insert(0.0);
        *strength = (*strength + STRENGTH_STEP).clamp(0.0, STRENGTH_CEILING);
    }

    let promoted_to = match (profile.problems_solved, profile.skill_level) {
        (INTERMEDIATE_THRESHOLD, SkillLevel::Beginner) => Some(SkillLevel::Intermediate),
        (ADVANCED_THRESHOLD, SkillLevel::Intermediate) => Some(SkillLevel::Advanced),
        _ => None,
    };
    if let Some(level) = promoted_to {
        profile.skill_level = level;
    }

    ProgressOutcome { promoted_to }
}

pub(crate) fn reset(profile: &mut Profile) {
    profile.skill_level = SkillLevel::Beginner;
    profile.problems_solved = 0;
    profile.topic_strength = Json(TopicStrength::new());
    profile.assessment_completed = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::primitive_now_utc;

    fn fresh_profile() -> Profile {
        Profile {
            user_id: "user-1".to_string(),
            skill_level: SkillLevel::Beginner,
            problems_solved: 0,
            topic_strength: Json(TopicStrength::new()),
            assessment_completed: false,
            updated_at: primitive_now_utc(),
        }
    }

    #[test]
    fn first_correct_arrays_submission() {
        let mut profile = fresh_profile();

        let outcome = apply_grading(&mut profile, Some("Arrays"), true);

        assert_eq!(outcome, ProgressOutcome { promoted_to: None });
        assert_eq!(profile.problems_solved, 1);
        assert_eq!(profile.topic_strength.0.get("Arrays"), Some(&0.1));
        assert_eq!(profile.skill_level, SkillLevel::Beginner);
    }

    #[test]
    fn incorrect_submission_changes_nothing() {
        let mut profile = fresh_profile();
        profile.problems_solved = 4;
        profile.topic_strength.0.insert("Strings".to_string(), 0.3);
        let before = profile.clone();

        let outcome = apply_grading(&mut profile, Some("Strings"), false);

        assert_eq!(outcome.promoted_to, None);
        assert_eq!(profile, before);
    }

    #[test]
    fn fifth_solve_promotes_beginner() {
        let mut profile = fresh_profile();
        profile.problems_solved = 4;

        let outcome = apply_grading(&mut profile, Some("Arrays"), true);

        assert_eq!(outcome.promoted_to, Some(SkillLevel::Intermediate));
        assert_eq!(profile.skill_level, SkillLevel::Intermediate);
        assert_eq!(profile.problems_solved, 5);
    }

    #[test]
    fn fifteenth_solve_promotes_intermediate() {
        let mut profile = fresh_profile();
        profile.skill_level = SkillLevel::Intermediate;
        profile.problems_solved = 14;

        apply_grading(&mut profile, None, true);

        assert_eq!(profile.skill_level, SkillLevel::Advanced);
    }

    #[test]
    fn promotion_only_on_exact_threshold() {
        let mut profile = fresh_profile();
        profile.problems_solved = 5;

        apply_grading(&mut profile, None, true);
        assert_eq!(profile.problems_solved, 6);
        assert_eq!(profile.skill_level, SkillLevel::Beginner);

        let mut advanced_early = fresh_profile();
        advanced_early.skill_level = SkillLevel::Beginner;
        advanced_early.problems_solved = 14;
        apply_grading(&mut advanced_early, None, true);
        assert_eq!(advanced_early.skill_level, SkillLevel::Beginner);
    }

    #[test]
    fn levels_never_demote() {
        let mut profile = fresh_profile();
        profile.skill_level = SkillLevel::Advanced;
        profile.problems_solved = 4;

        apply_grading(&mut profile, None, true);

        assert_eq!(profile.skill_level, SkillLevel::Advanced);
    }

    #[test]
    fn steady_progress_walks_through_every_level() {
        let mut profile = fresh_profile();
        let mut promotions = Vec::new();

        for _ in 0..20 {
            if let Some(level) = apply_grading(&mut profile, Some("Arrays"), true).promoted_to {
                promotions.push((profile.problems_solved, level));
            }
        }

        assert_eq!(
            promotions,
            vec![(5, SkillLevel::Intermediate), (15, SkillLevel::Advanced)]
        );
        assert_eq!(profile.problems_solved, 20);
    }

    #[test]
    fn strength_saturates_at_ceiling() {
        let mut profile = fresh_profile();
        profile.topic_strength.0.insert("DP".to_string(), 0.95);

        apply_grading(&mut profile, Some("DP"), true);
        assert_eq!(profile.topic_strength.0.get("DP"), Some(&1.0));

        for _ in 0..30 {
            apply_grading(&mut profile, Some("DP"), true);
        }
        let strength = profile.topic_strength.0["DP"];
        assert!((0.0..=STRENGTH_CEILING).contains(&strength));
    }

    #[test]
    fn unassigned_problem_only_counts() {
        let mut profile = fresh_profile();
        profile.topic_strength.0.insert("Arrays".to_string(), 0.2);

        apply_grading(&mut profile, None, true);

        assert_eq!(profile.problems_solved, 1);
        assert_eq!(profile.topic_strength.0.len(), 1);
        assert_eq!(profile.topic_strength.0.get("Arrays"), Some(&0.2));
    }

    #[test]
    fn baseline_overwrites_previous_state() {
        let mut profile = fresh_profile();
        profile.topic_strength.0.insert("Trees".to_string(), 0.8);
        profile.problems_solved = 7;

        let mut strengths = TopicStrength::new();
        strengths.insert("Arrays".to_string(), 0.6);
        apply_baseline(
            &mut profile,
            &BaselineAssessment {
                skill_level: SkillLevel::Intermediate,
                topic_strength: strengths.clone(),
                feedback: "Good".to_string(),
            },
        );

        assert_eq!(profile.skill_level, SkillLevel::Intermediate);
        assert_eq!(profile.topic_strength.0, strengths);
        assert!(profile.assessment_completed);
        assert_eq!(profile.problems_solved, 7);
    }

    #[test]
    fn solved_counter_saturates() {
        let mut profile = fresh_profile();
        profile.skill_level = SkillLevel::Advanced;
        profile.problems_solved = i32::MAX;

        apply_grading(&mut profile, Some("Arrays"), true);

        assert_eq!(profile.problems_solved, i32::MAX);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut profile = fresh_profile();
        profile.skill_level = SkillLevel::Advanced;
        profile.problems_solved = 22;
        profile.topic_strength.0.insert("Arrays".to_string(), 1.0);
        profile.assessment_completed = true;

        reset(&mut profile);
        let once = profile.clone();
        reset(&mut profile);

        assert_eq!(profile, once);
        assert_eq!(profile.skill_level, SkillLevel::Beginner);
        assert_eq!(profile.problems_solved, 0);
        assert!(profile.topic_strength.0.is_empty());
        assert!(!profile.assessment_completed);
    }
}
