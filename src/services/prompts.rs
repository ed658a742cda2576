//! Prompt construction for the content request services.

use chrono::NaiveDate;

/// Fixed user turn for the narration request
pub const NARRATION_QUESTION: &str = "What happened today in history?";

/// System prompt for narration text generation.
///
/// Embeds the run date, the target word count, and every text already
/// generated in this batch so the model steers away from repeats.
pub fn narration(date: NaiveDate, words_count: usize, previous_texts: &[String]) -> String {
    format!(
        "\
Today's date is {date}.
You must look for a historical event which happened on this day years ago and write it as follows:
- It must be about historical events.
- It must be targeted at the general public and safe for kids.
- It must be informative, engaging and entertaining.
- It must avoid controversial topics and violence.
- It must NOT be accompanied by visuals and sound effects.
- It must be around {words_count} words long.
- It must RESPECT the culture and traditions of those about whom it speaks.

AVOID these topics:
- colonisation
- conspiracy theory
- death
- gender identity and LGBTQ+ issues
- health and vaccination debates
- historical revisionism
- homophobia
- immigration
- nazism
- patriotism
- political endorsements
- racism
- religion
- sexism
- violence
- war
- weapons
- xenophobia

You should not use the events and words from this list:
- atomic bomb
- {previous_texts}

The script must include only narration, not visuals or sound effects. ONLY NARRATION.",
        date = date,
        words_count = words_count,
        previous_texts = previous_texts.join("\n- "),
    )
}

/// System prompt for the two-word title
pub const TITLE: &str = "Get a title for this text. The title should contain two words that \
summarize the text. It should be 2 words long.";

/// System prompt for tags, excluding the given words
pub fn tags(exclude_tags: &[String]) -> String {
    format!(
        "Get a list of tags for the text. It should contain 3 tags maximum. Each tag should be \
one word long. Country names, historical events, and general terms are good tags. Answer with \
a comma-separated list.\nExclude the following words: {}",
        exclude_tags.join(", ")
    )
}

/// System prompt for the short description, excluding the given words
pub fn description(exclude_words: &[String]) -> String {
    format!(
        "Get a short summary for the text. It should be around 3 or 4 words long. It should be \
informative and engaging.\nExclude the following words: {}",
        exclude_words.join(", ")
    )
}
