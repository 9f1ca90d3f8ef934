//! Learning-path quiz: maps answers to an ordered list of milestones.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ToolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl FromStr for Level {
    type Err = ToolError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "beginner" | "new" => Ok(Level::Beginner),
            "intermediate" => Ok(Level::Intermediate),
            "advanced" | "expert" => Ok(Level::Advanced),
            other => Err(ToolError::invalid("level", format!("unknown level `{other}`"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Goal {
    LlmApps,
    MachineLearning,
    DataScience,
    Research,
}

impl Goal {
    pub fn as_str(self) -> &'static str {
        match self {
            Goal::LlmApps => "llm-apps",
            Goal::MachineLearning => "machine-learning",
            Goal::DataScience => "data-science",
            Goal::Research => "research",
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Goal {
    type Err = ToolError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "llm-apps" | "llm" | "apps" => Ok(Goal::LlmApps),
            "machine-learning" | "ml" => Ok(Goal::MachineLearning),
            "data-science" | "data" => Ok(Goal::DataScience),
            "research" => Ok(Goal::Research),
            other => Err(ToolError::invalid("goal", format!("unknown goal `{other}`"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answers {
    pub level: Level,
    pub goal: Goal,
    pub weekly_hours: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub title: &'static str,
    pub topics: &'static [&'static str],
    pub hours: u32,
    pub weeks: u32,
    /// 1-based week the milestone begins in.
    pub starts_week: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Roadmap {
    pub answers: Answers,
    pub milestones: Vec<Milestone>,
    pub total_weeks: u32,
}

struct Stage {
    title: &'static str,
    topics: &'static [&'static str],
    hours: u32,
    level: Level,
    /// Empty means every goal.
    goals: &'static [Goal],
}

const STAGES: &[Stage] = &[
    Stage {
        title: "Python foundations",
        topics: &["syntax and data structures", "virtual environments", "notebooks"],
        hours: 30,
        level: Level::Beginner,
        goals: &[],
    },
    Stage {
        title: "Math for machine learning",
        topics: &["linear algebra", "probability", "gradients"],
        hours: 25,
        level: Level::Beginner,
        goals: &[Goal::MachineLearning, Goal::DataScience, Goal::Research],
    },
    Stage {
        title: "Data wrangling",
        topics: &["pandas", "cleaning and joins", "plotting"],
        hours: 20,
        level: Level::Beginner,
        goals: &[Goal::DataScience, Goal::MachineLearning],
    },
    Stage {
        title: "Working with LLM APIs",
        topics: &["chat completions", "structured output", "rate limits and retries"],
        hours: 15,
        level: Level::Intermediate,
        goals: &[Goal::LlmApps],
    },
    Stage {
        title: "Classical machine learning",
        topics: &["regression and classification", "cross-validation", "feature engineering"],
        hours: 35,
        level: Level::Intermediate,
        goals: &[Goal::MachineLearning, Goal::DataScience, Goal::Research],
    },
    Stage {
        title: "Prompt engineering and evaluation",
        topics: &["few-shot prompting", "eval sets", "regression testing prompts"],
        hours: 20,
        level: Level::Intermediate,
        goals: &[Goal::LlmApps],
    },
    Stage {
        title: "Deep learning fundamentals",
        topics: &["backpropagation", "CNNs and transformers", "training loops"],
        hours: 40,
        level: Level::Intermediate,
        goals: &[Goal::MachineLearning, Goal::Research],
    },
    Stage {
        title: "Retrieval-augmented generation",
        topics: &["embeddings", "vector search", "grounded answers"],
        hours: 25,
        level: Level::Advanced,
        goals: &[Goal::LlmApps],
    },
    Stage {
        title: "Experiment tracking and deployment",
        topics: &["experiment tracking", "model serving", "monitoring"],
        hours: 30,
        level: Level::Advanced,
        goals: &[Goal::MachineLearning, Goal::DataScience, Goal::LlmApps],
    },
    Stage {
        title: "Reading and reproducing papers",
        topics: &["paper reading", "reimplementation", "ablations"],
        hours: 40,
        level: Level::Advanced,
        goals: &[Goal::Research],
    },
    Stage {
        title: "Capstone project",
        topics: &["scoping", "building end to end", "write-up"],
        hours: 30,
        level: Level::Advanced,
        goals: &[],
    },
];

/// Stages at or above the learner's level that serve their goal, in order.
pub fn build(answers: Answers) -> Result<Roadmap, ToolError> {
    if !(1..=60).contains(&answers.weekly_hours) {
        return Err(ToolError::invalid("weekly_hours", "must be between 1 and 60"));
    }

    let mut next_week = 1;
    let milestones: Vec<Milestone> = STAGES
        .iter()
        .filter(|stage| stage.level >= answers.level)
        .filter(|stage| stage.goals.is_empty() || stage.goals.contains(&answers.goal))
        .map(|stage| {
            let weeks = stage.hours.div_ceil(answers.weekly_hours);
            let milestone = Milestone {
                title: stage.title,
                topics: stage.topics,
                hours: stage.hours,
                weeks,
                starts_week: next_week,
            };
            next_week += weeks;
            milestone
        })
        .collect();

    Ok(Roadmap {
        answers,
        total_weeks: next_week - 1,
        milestones,
    })
}
