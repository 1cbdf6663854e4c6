use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::models::TopicStrength;
use crate::db::types::SkillLevel;
use crate::services::ai_grading::{BaselineAssessment, BaselineSample};

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AssessmentQuestion {
    pub(crate) id: i64,
    pub(crate) title: &'static str,
    pub(crate) description: &'static str,
    pub(crate) starter_code: &'static str,
}

pub(crate) const DIAGNOSTIC_QUESTIONS: [AssessmentQuestion; 3] = [
    AssessmentQuestion {
        id: 101,
        title: "Reverse a String",
        description:
            "Write a function to reverse a string without using built-in reverse functions.",
        starter_code: "def reverse_string(s):\n    # Your code here\n    pass",
    },
    AssessmentQuestion {
        id: 102,
        title: "Find Duplicates",
        description: "Find the duplicate number in an array of integers.",
        starter_code: "def find_duplicate(nums):\n    # Your code here\n    pass",
    },
    AssessmentQuestion {
        id: 103,
        title: "Valid Parentheses",
        description: "Given a string containing just the characters '(', ')', '{', '}', '[' \
                      and ']', determine if the input string is valid.",
        starter_code: "def is_valid(s):\n    # Your code here\n    pass",
    },
];

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AssessmentSubmitRequest {
    #[serde(default)]
    #[validate(length(max = 10, message = "Too many assessment answers"))]
    pub(crate) submissions: Vec<AssessmentAnswer>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AssessmentAnswer {
    #[serde(default, alias = "prompt_label")]
    pub(crate) question: Option<String>,
    #[serde(default)]
    pub(crate) code: String,
}

impl From<AssessmentAnswer> for BaselineSample {
    fn from(answer: AssessmentAnswer) -> Self {
        Self { label: answer.question, code: answer.code }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AssessmentResultResponse {
    pub(crate) skill_level: SkillLevel,
    pub(crate) topic_strength: TopicStrength,
    pub(crate) feedback: String,
}

impl From<BaselineAssessment> for AssessmentResultResponse {
    fn from(result: BaselineAssessment) -> Self {
        Self {
            skill_level: result.skill_level,
            topic_strength: result.topic_strength,
            feedback: result.feedback,
        }
    }
}
