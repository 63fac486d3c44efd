//! Prompt templates sent to the generative backend.

/// Number of places a search prompt asks for.
pub const PLACES_PER_SEARCH: usize = 10;

pub fn search_prompt(location: &str) -> String {
    format!(
        r#"You are a travel expert. Identify the {count} most famous, must-see tourist attractions in or very near '{location}'.
If '{location}' is itself a specific landmark, list it first, followed by {rest} other famous places nearby.

Respond with a single minified JSON array of objects and nothing else: no text before or after the array, no markdown.
Every object must have exactly two keys:
1. "name": the name of the attraction.
2. "description": a brief, engaging 3-4 sentence summary for a tourist.

Example:
[{{"name":"Louvre Museum","description":"The Louvre is the world's largest art museum and a historic monument in Paris, France. It is home to the Mona Lisa. It sits on the Right Bank of the Seine."}}]"#,
        count = PLACES_PER_SEARCH,
        rest = PLACES_PER_SEARCH - 1,
        location = location,
    )
}

pub fn detail_prompt(place_name: &str) -> String {
    format!(
        r###"You are a friendly, enthusiastic and knowledgeable tour guide.
A traveler has asked you for a detailed guide to "{place_name}".
Write a captivating travel guide of 800 to 1000 words in a warm, conversational tone, speaking directly to them.

Format the guide as markdown with exactly these seven sections, in this order, each starting with its own "## " heading line:
## Introduction: welcome the traveler and introduce "{place_name}" with excitement.
## History and Significance: tell the story of the place, not a dry history lesson.
## What to See and Do: the main highlights inside and around it.
## Best Photo Spots: be specific about where to stand and when.
## Local Food: nearby dishes or eateries worth trying.
## Best Time to Visit: season, day of the week or time of day.
## Parting Tip: a friendly closing remark or insider tip.

Use only the heading names above (without the text after the colon), followed by flowing prose. No other markdown headings.
Address the traveler directly ("You'll want to...", "Imagine yourself...")."###,
        place_name = place_name,
    )
}
