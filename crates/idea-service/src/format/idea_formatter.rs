//! Turns a parsed message into the post to send and the idea to store

use idea_core::entities::{
    ChannelSettings, Idea, IdeaPost, PostAuthor, PostField, SectionGroup, SECTION_EMOJIS,
};
use idea_core::events::MessageCreated;
use idea_core::value_objects::Snowflake;

use super::parser::{parse, ParseError, ParsedIdea};

/// Maximum length of a post description, in bytes
pub const MAX_DESCRIPTION_LEN: usize = 4096;
/// Maximum length of a post field value, in bytes
pub const MAX_FIELD_LEN: usize = 1024;

pub const VOTING_ENDS_FOOTER: &str = "Voting ends:";

/// Why a message could not be turned into an idea
///
/// The `Display` output is meant to be shown to the author as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(
        "The description and titleless sections are a total of {overflow} characters too long. \
         Reduce their length or assign titles to some of the sections."
    )]
    DescriptionTooLong { overflow: usize },

    #[error("The sections in the group with the name {title} are a total of {overflow} characters too long.")]
    GroupTooLong { title: String, overflow: usize },

    #[error("The voting duration of this channel is too long. Ask a moderator to shorten it.")]
    VoteDurationOutOfRange,
}

/// Post and idea produced from a message
///
/// The idea's guild, channel, and message ids are zero until the post is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedIdea {
    pub post: IdeaPost,
    pub idea: Idea,
}

/// Parse a message and lay it out as an idea post
pub fn idea(msg: &MessageCreated, settings: &ChannelSettings) -> Result<FormattedIdea, FormatError> {
    let parsed = parse(&msg.content)?;
    layout(&parsed, msg, settings)
}

fn layout(
    parsed: &ParsedIdea,
    msg: &MessageCreated,
    settings: &ChannelSettings,
) -> Result<FormattedIdea, FormatError> {
    let mut symbols = SECTION_EMOJIS.iter().map(|e| (*e).to_string());
    let mut assign = |count: usize| symbols.by_ref().take(count).collect::<Vec<_>>();

    let global_section_emojis = assign(parsed.sections.len());
    let group_emojis: Vec<Vec<String>> = parsed
        .groups
        .iter()
        .map(|g| assign(g.sections.len()))
        .collect();

    let description = description(parsed, &global_section_emojis)?;
    let fields = parsed
        .groups
        .iter()
        .zip(&group_emojis)
        .map(|(group, emojis)| {
            let value = render_sections(emojis, &group.sections);
            if value.len() > MAX_FIELD_LEN {
                return Err(FormatError::GroupTooLong {
                    title: group.title.clone(),
                    overflow: value.len() - MAX_FIELD_LEN,
                });
            }
            Ok(PostField::new(group.title.clone(), value))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let vote_until = settings
        .has_deadline()
        .then(|| {
            msg.timestamp
                .checked_add_signed(settings.vote_duration)
                .ok_or(FormatError::VoteDurationOutOfRange)
        })
        .transpose()?;

    let author = (!settings.anonymous).then(|| PostAuthor {
        name: msg.author.name.clone(),
        icon_url: msg.author.avatar_url.clone(),
    });

    let post = IdeaPost {
        title: parsed.title.clone(),
        description,
        author,
        fields,
        footer: vote_until.map(|_| VOTING_ENDS_FOOTER.to_string()),
        timestamp: vote_until,
        color: settings.color,
    };

    let idea = Idea {
        guild_id: Snowflake::default(),
        channel_id: Snowflake::default(),
        message_id: Snowflake::default(),
        global_section_emojis,
        groups: parsed
            .groups
            .iter()
            .zip(group_emojis)
            .map(|(group, emojis)| SectionGroup::new(group.title.clone(), emojis))
            .collect(),
        vote_type: settings.vote_type,
        vote_until,
    };

    Ok(FormattedIdea { post, idea })
}

/// Description followed by the ungrouped sections
fn description(parsed: &ParsedIdea, emojis: &[String]) -> Result<Option<String>, FormatError> {
    let sections = render_sections(emojis, &parsed.sections);
    let text = match (&parsed.description, sections.is_empty()) {
        (Some(desc), false) => format!("{desc}\n\n{sections}"),
        (Some(desc), true) => desc.clone(),
        (None, _) => sections,
    };

    if text.len() > MAX_DESCRIPTION_LEN {
        return Err(FormatError::DescriptionTooLong {
            overflow: text.len() - MAX_DESCRIPTION_LEN,
        });
    }
    Ok((!text.is_empty()).then_some(text))
}

fn render_sections(emojis: &[String], sections: &[String]) -> String {
    emojis
        .iter()
        .zip(sections)
        .map(|(emoji, section)| format!("{emoji} {section}"))
        .collect::<Vec<_>>()
        .join("\n")
}
