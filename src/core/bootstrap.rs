use anyhow::Context;
use sqlx::PgPool;

use crate::db::types::Difficulty;
use crate::repositories;

pub(crate) struct SeedTopic {
    pub(crate) name: &'static str,
    pub(crate) slug: &'static str,
    pub(crate) description: &'static str,
    /// Title and description, listed Beginner, Intermediate, Advanced.
    pub(crate) problems: [(&'static str, &'static str); 3],
}

const DIFFICULTY_LADDER: [Difficulty; 3] =
    [Difficulty::Beginner, Difficulty::Intermediate, Difficulty::Advanced];

pub(crate) const DEFAULT_CATALOG: [SeedTopic; 5] = [
    SeedTopic {
        name: "Arrays",
        slug: "arrays",
        description: "Master the basics of data storage.",
        problems: [
            ("Two Sum", "Find indices of two numbers that add up to target."),
            ("Max Subarray", "Find the contiguous subarray with the largest sum."),
            ("Rotate Image", "Rotate a 2D matrix by 90 degrees."),
        ],
    },
    SeedTopic {
        name: "Strings",
        slug: "strings",
        description: "Manipulation and parsing of text.",
        problems: [
            ("Valid Anagram", "Check if two strings are anagrams."),
            ("Longest Palindrome", "Find the longest palindromic substring."),
            ("Word Break", "Segment string into dictionary words."),
        ],
    },
    SeedTopic {
        name: "Linked Lists",
        slug: "linked-lists",
        description: "Nodes, pointers, and dynamic structures.",
        problems: [
            ("Reverse List", "Reverse a singly linked list."),
            ("Detect Cycle", "Determine if a linked list has a cycle."),
            ("Merge k Lists", "Merge k sorted linked lists."),
        ],
    },
    SeedTopic {
        name: "Trees & Graphs",
        slug: "trees-graphs",
        description: "Hierarchical data and network structures.",
        problems: [
            ("Invert Binary Tree", "Invert a binary tree."),
            ("Number of Islands", "Count islands in a grid."),
            ("Word Ladder", "Transform start word to end word."),
        ],
    },
    SeedTopic {
        name: "Dynamic Programming",
        slug: "dp",
        description: "Optimization through recursion and memoization.",
        problems: [
            ("Climbing Stairs", "Count ways to climb stairs."),
            ("Coin Change", "Fewest coins to make up amount."),
            ("Longest Increasing Subsequence", "Find the length of LIS."),
        ],
    },
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SeedReport {
    pub(crate) topics_created: usize,
    pub(crate) problems_created: usize,
}

/// Inserts the default topics and problems. Topics are matched by slug and
/// problems by title, so reruns only fill gaps and never touch edited rows.
pub(crate) async fn seed_catalog(pool: &PgPool) -> anyhow::Result<SeedReport> {
    let mut report = SeedReport::default();
    let mut tx = pool.begin().await.context("Failed to start seed transaction")?;

    for (order, topic) in DEFAULT_CATALOG.iter().enumerate() {
        let (topic_id, created) = repositories::topics::get_or_create(
            &mut *tx,
            repositories::topics::UpsertTopic {
                name: topic.name,
                slug: topic.slug,
                description: topic.description,
                display_order: order as i32,
            },
        )
        .await
        .with_context(|| format!("Failed to seed topic {}", topic.slug))?;

        if created {
            report.topics_created += 1;
            tracing::info!(topic = topic.name, "Seeded topic");
        }

        let ladder = topic.problems.iter().zip(DIFFICULTY_LADDER);
        for (&(title, description), difficulty) in ladder {
            if repositories::problems::exists_by_title(&mut *tx, title).await? {
                continue;
            }

            let starter_code = format!("# Solution for {title}\ndef solution():\n    pass");
            repositories::problems::create(
                &mut *tx,
                repositories::problems::CreateProblem {
                    title,
                    description,
                    difficulty,
                    topic_id: Some(topic_id),
                    starter_code: Some(&starter_code),
                },
            )
            .await
            .with_context(|| format!("Failed to seed problem {title}"))?;
            report.problems_created += 1;
        }
    }

    tx.commit().await.context("Failed to commit seed transaction")?;

    tracing::info!(
        topics_created = report.topics_created,
        problems_created = report.problems_created,
        "Catalog seeding finished"
    );
    Ok(report)
}
