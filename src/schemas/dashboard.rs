use std::collections::HashMap;

use serde::Serialize;

use crate::db::models::{Problem, Profile, Topic, TopicStrength, User};
use crate::db::types::{Difficulty, SkillLevel};

pub(crate) const MIXED_PRACTICE_ID: i64 = 0;

#[derive(Debug, Serialize)]
pub(crate) struct UserSummary {
    pub(crate) id: String,
    pub(crate) username: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProfileResponse {
    pub(crate) user: UserSummary,
    pub(crate) skill_level: SkillLevel,
    pub(crate) problems_solved: i32,
    pub(crate) topic_strength: TopicStrength,
    pub(crate) assessment_completed: bool,
}

impl ProfileResponse {
    pub(crate) fn from_db(user: &User, profile: Profile) -> Self {
        Self {
            user: UserSummary { id: user.id.clone(), username: user.username.clone() },
            skill_level: profile.skill_level,
            problems_solved: profile.problems_solved,
            topic_strength: profile.topic_strength.0,
            assessment_completed: profile.assessment_completed,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ProblemResponse {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) difficulty: Difficulty,
    pub(crate) starter_code: String,
}

impl From<Problem> for ProblemResponse {
    fn from(problem: Problem) -> Self {
        Self {
            id: problem.id,
            title: problem.title,
            description: problem.description,
            difficulty: problem.difficulty,
            starter_code: problem.starter_code,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LearningPathEntry {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) description: String,
    pub(crate) problems: Vec<ProblemResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DashboardResponse {
    pub(crate) profile: ProfileResponse,
    pub(crate) learning_path: Vec<LearningPathEntry>,
}

/// Groups problems under their topics, keeping the topics' order. Every topic
/// appears even without problems; problems with no topic go into a trailing
/// "Mixed Practice" entry that exists only when there are any.
pub(crate) fn build_learning_path(
    topics: Vec<Topic>,
    problems: Vec<Problem>,
) -> Vec<LearningPathEntry> {
    let mut by_topic: HashMap<i64, Vec<ProblemResponse>> = HashMap::new();
    let mut unassigned = Vec::new();

    for problem in problems {
        match problem.topic_id {
            Some(topic_id) => by_topic.entry(topic_id).or_default().push(problem.into()),
            None => unassigned.push(problem.into()),
        }
    }

    let mut entries: Vec<LearningPathEntry> = topics
        .into_iter()
        .map(|topic| LearningPathEntry {
            problems: by_topic.remove(&topic.id).unwrap_or_default(),
            id: topic.id,
            name: topic.name,
            slug: topic.slug,
            description: topic.description,
        })
        .collect();

    if !unassigned.is_empty() {
        entries.push(LearningPathEntry {
            id: MIXED_PRACTICE_ID,
            name: "Mixed Practice".to_string(),
            slug: "mixed".to_string(),
            description: "General problems".to_string(),
            problems: unassigned,
        });
    }

    entries
}
