//! Vote tally - turns live reaction counts into the closing summary of an idea

use std::collections::HashMap;
use std::fmt::Write as _;

use idea_core::entities::{Idea, PostField, ReactionCount, VoteType};
use idea_core::value_objects::Color;

use super::humanize::comma;

pub const RATING_FIELD_NAME: &str = "Overall Rating";
pub const SECTION_VOTES_FIELD_NAME: &str = "Section Votes";

const RATING_UNAVAILABLE: &str = "*Could not calculate as some reactions were deleted*";
const REACTION_REMOVED: &str = "*Reaction was removed*";

/// Where a rating falls on the scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingBand {
    Negative,
    Neutral,
    Positive,
}

impl RatingBand {
    /// Band of a rating normalised to `0.0..=1.0`
    pub fn of(score: f64) -> Self {
        if score < 1.0 / 3.0 {
            Self::Negative
        } else if score < 2.0 / 3.0 {
            Self::Neutral
        } else {
            Self::Positive
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Negative => Color::RED,
            Self::Neutral => Color::YELLOW,
            Self::Positive => Color::GREEN,
        }
    }
}

/// Closing summary of an idea
#[derive(Debug, Clone, PartialEq)]
pub struct VoteSummary {
    pub rating_field: PostField,
    /// Present if the idea has sections
    pub section_votes_field: Option<PostField>,
    /// Rating normalised to `0.0..=1.0`, `None` without votes or reaction data
    pub score: Option<f64>,
    pub color: Color,
}

/// Tally the votes on an idea
///
/// `reactions` are the live counts on the post, which include the bot's own
/// seed reaction for every symbol.
pub fn tally(idea: &Idea, reactions: &[ReactionCount]) -> VoteSummary {
    let counts = Counts::new(idea, reactions);

    let (rating, score) = rating(idea.vote_type, &counts);
    let section_votes_field = idea
        .has_sections()
        .then(|| PostField::new(SECTION_VOTES_FIELD_NAME, section_votes(idea, &counts)));

    VoteSummary {
        rating_field: PostField::new(RATING_FIELD_NAME, rating),
        section_votes_field,
        score,
        color: score.map_or(Color::YELLOW, |s| RatingBand::of(s).color()),
    }
}

/// Votes per symbol, excluding the bot's own reaction
struct Counts<'a>(HashMap<&'a str, i64>);

impl<'a> Counts<'a> {
    fn new(idea: &'a Idea, reactions: &'a [ReactionCount]) -> Self {
        let wanted: Vec<&str> = idea
            .vote_type
            .emojis()
            .iter()
            .copied()
            .chain(idea.section_emojis())
            .collect();

        let counts = reactions
            .iter()
            .filter(|r| wanted.contains(&r.emoji.as_str()))
            .map(|r| (r.emoji.as_str(), i64::from(r.count - 1).max(0)))
            .collect();

        Self(counts)
    }

    fn get(&self, emoji: &str) -> Option<i64> {
        self.0.get(emoji).copied()
    }
}

fn rating(vote_type: VoteType, counts: &Counts<'_>) -> (String, Option<f64>) {
    let emojis = vote_type.emojis();
    let Some(votes) = emojis.iter().map(|e| counts.get(e)).collect::<Option<Vec<_>>>() else {
        return (RATING_UNAVAILABLE.to_string(), None);
    };

    if vote_type.is_binary() {
        binary_rating(emojis, &votes)
    } else {
        weighted_rating(vote_type, counts)
    }
}

/// `votes` is in display order: positive first
fn binary_rating(emojis: &[&str], votes: &[i64]) -> (String, Option<f64>) {
    let (pos, neg) = (votes[0], votes[1]);
    let total = pos + neg;
    if total <= 0 {
        return ("-/- %".to_string(), None);
    }

    let score = pos as f64 / total as f64;
    let percent = (score * 1000.0).round() / 10.0;
    let text = format!(
        "**{percent:.1}%**\n\n{}: {pos}x\n{}: {neg}x",
        emojis[0], emojis[1]
    );
    (text, Some(score))
}

/// Weighted mean over the scale, the worst symbol weighing 1
///
/// Every symbol of the scale has a count; `rating` checked that.
fn weighted_rating(vote_type: VoteType, counts: &Counts<'_>) -> (String, Option<f64>) {
    let points = vote_type.points();
    let votes = |emoji: &str| counts.get(emoji).unwrap_or(0);

    let (total, weighted) = vote_type
        .rating_scale()
        .zip(1_i64..)
        .fold((0, 0), |(total, weighted), (emoji, weight)| {
            let n = votes(emoji);
            (total + n, weighted + weight * n)
        });

    let mut text = if total <= 0 {
        format!("**-/{points}**\n")
    } else {
        let mean = weighted as f64 / total as f64;
        format!("**{:.1}/{points}**\n", (mean * 10.0).round() / 10.0)
    };
    for emoji in vote_type.emojis() {
        let _ = write!(text, "\n{emoji}: {}x", votes(*emoji));
    }

    let score = (total > 0).then(|| {
        let mean = weighted as f64 / total as f64;
        (mean - 1.0) / (points - 1) as f64
    });
    (text, score)
}

fn section_votes(idea: &Idea, counts: &Counts<'_>) -> String {
    let line = |emoji: &str| match counts.get(emoji) {
        Some(n) => format!("{emoji}: {}x", comma(n)),
        None => format!("{emoji}: {REACTION_REMOVED}"),
    };

    let mut blocks: Vec<String> = Vec::with_capacity(idea.groups.len() + 1);
    if !idea.global_section_emojis.is_empty() {
        blocks.push(
            idea.global_section_emojis
                .iter()
                .map(|e| line(e.as_str()))
                .collect::<Vec<_>>()
                .join("\n"),
        );
    }
    for group in &idea.groups {
        let mut block = format!("**{}**", group.title);
        for emoji in &group.emojis {
            block.push('\n');
            block.push_str(&line(emoji.as_str()));
        }
        blocks.push(block);
    }

    blocks.join("\n\n")
}
