// All LLM prompt templates for the plant field generators.
// Placeholders are `{name}`-style and filled with `str::replace`.

use crate::llm_client::prompts::is_portuguese;

/// Exact reply the scientific-name lookup must use when it has no answer.
pub const SCIENTIFIC_NAME_UNAVAILABLE: &str = "information unavailable";

/// Replace: {input_name}, {language}, {answer_only}
pub const CANONICAL_NAME_PROMPT_TEMPLATE: &str = r#"A user supplied the plant name "{input_name}".
What is the MOST WIDELY USED and correct common name for this plant in {language}?

Instructions for the answer:
1. Answer ONLY with the plant name in {language}.
2. For example, if the supplied name is "Girasol" (the user may have typed it in Spanish) and the target language is English, the answer must be "Sunflower".
3. If the supplied name is "Lavanda" and the target language is French, the answer must be "Lavande".
4. If the supplied name is "Rosemary" and the target language is Brazilian Portuguese, the answer must be "Alecrim".
5. If you cannot confidently determine a clear common name in the target language, or the name is already correct, answer with the original name: "{input_name}".
6. {answer_only} Do not end with a period unless it is part of the name."#;

/// Replace: {plant_name}, {language}
pub const CULTIVABLE_PROMPT_TEMPLATE: &str = r#"Does the term "{plant_name}" (in {language}) refer to a kind of plant that can be cultivated, such as a flower, fruit tree, ornamental shrub, vegetable or aromatic herb?
Answer EXCLUSIVELY with "yes" or "no"."#;

/// Replace: {plant_name}, {language}, {unavailable}
pub const SCIENTIFIC_NAME_PROMPT_TEMPLATE: &str = r#"Provide the most common and recognised scientific name (genus and species) for the plant popularly known as "{plant_name}" (a common name in {language}).

RULES FOR THE ANSWER:
1. Return ONLY the scientific name in the format "Genus species" (e.g. "Solanum lycopersicum").
2. If there are many common varieties and a specific name is hard to determine for "{plant_name}", give the main genus followed by "spp." (e.g. "Rosa spp.").
3. If no reliable scientific name can be found for "{plant_name}", answer EXACTLY with: "{unavailable}".
4. Do not include any words, explanation or formatting beyond what was requested."#;

/// Replace: {plant_name}, {language}
pub const SEO_TITLE_PROMPT_TEMPLATE: &str = r#"Write a blog article title about the plant "{plant_name}".
The title must:
1. Be SEO optimised.
2. Be memorable and interesting enough to attract readers.
3. Avoid generic, repetitive phrases such as "How to care for", "Learn more about", "Complete guide".
4. Be a little more descriptive than the plant name alone, hinting at what the reader will learn or discover.
5. Be written in {language}.

Examples of titles I do NOT want:
- Butterfly Orchid
- Guide to Roses
- Learn more about Succulents

Examples of titles I want:
- Unlocking the Secrets of Growing the Butterfly Orchid
- Vibrant Roses: Essential Tips for a Blooming Garden
- Succulents for Beginners: A Practical Guide to Care and Varieties

Return only the title, without any introduction or additional text."#;

/// Replace: {plant_name}, {title}, {structure}, {language}
pub const ARTICLE_PROMPT_TEMPLATE: &str = r#"Write an informative, practical article teaching how to plant and care for "{plant_name}", whose main title for context is "{title}".
Follow STRICTLY this section structure and format:

{structure}

ABSOLUTELY MANDATORY FORMATTING RULES:
1. Use EXACTLY the section headings given above, including the emojis and the plant name where indicated.
2. Separate EACH section (heading + its paragraphs) from the next by EXACTLY one blank line.
3. Write ALL content as plain text. Do NOT use HTML, Markdown (no **, _, *, -, #, 1.), bullet points or numbering. Only simple paragraphs.
4. Do NOT include an overall title at the start, nor an introduction or conclusion. Start directly with the first section and end after the last one.
5. Write all the text in {language}, in clear, objective and accessible language, even when covering technical terms."#;

/// Replace: {plant_name}, {language}, {lower}, {upper}, {article}
pub const BRIEF_DESCRIPTION_PROMPT_TEMPLATE: &str = r#"Based on the following article about the plant "{plant_name}", write a concise, SEO-optimised meta description.

RULES AND GOALS FOR THE DESCRIPTION:
1. Language: {language}.
2. Length: ideally between {lower} and {upper} characters. Do not exceed {upper} characters.
3. Content: summarise the most important and appealing points of the article about "{plant_name}", encouraging clicks from search engines.
4. SEO: use relevant keywords someone would search for when looking up how to grow "{plant_name}" or what it is used for.
5. Clarity: clear, direct and interesting enough to be used as a search snippet.
6. Format: plain text only, one or at most two sentences, no line breaks.

Reference article:
---
{article}
---

Return ONLY the optimised meta description."#;

/// One fixed article section: its exact heading and what the model must write under it.
pub struct ArticleSection {
    pub heading: &'static str,
    pub instruction: &'static str,
}

const SECTION_INSTRUCTIONS: [&str; 7] = [
    "[Write a clear, detailed paragraph explaining how this species is planted: seeds or seedlings, depth, spacing and first care.]",
    "[Give the most common scientific name (genus and species) for \"{plant_name}\". If there are many varieties or uncertainty, say so briefly or give the main genus (e.g. Rosa spp.). If no reliable information exists, write only that the information is unavailable.]",
    "[Describe the ideal climate: preferred temperature range, cold and heat tolerance, humidity needs and suitability for specific climates (tropical, temperate, etc.).]",
    "[Detail the perfect soil for \"{plant_name}\": drainage, ideal pH, texture (sandy, clay, etc.) and how to prepare or amend existing soil.]",
    "[Give precise watering instructions: frequency across seasons and growth stages, amount of water, best method, and checking soil moisture before watering again.]",
    "[Explain the light requirement: hours of direct sun per day (or whether it prefers indirect light), ideal intensity (morning sun, full sun, partial shade) and the risks of too little or too much light.]",
    "[Offer 2-3 valuable, practical extra tips: fertilising, pruning, easy propagation, preventing common pests and diseases, or other care specific to \"{plant_name}\".]",
];

const HEADINGS_EN: [&str; 7] = [
    "🌱 How to Plant {plant_name}",
    "🔬 Scientific Name",
    "🌤️ Ideal Climate",
    "🌱 Soil Type",
    "💧 Watering",
    "☀️ Light",
    "✨ Extra Growing Tips",
];

const HEADINGS_PT: [&str; 7] = [
    "🌱 Como Plantar {plant_name}",
    "🔬 Nome Científico",
    "🌤️ Clima Ideal",
    "🌱 Tipo de Solo",
    "💧 Rega",
    "☀️ Luz",
    "✨ Dicas Extras de Cultivo",
];

/// The seven article sections for a language, headings localised.
pub fn article_sections(language: &str) -> Vec<ArticleSection> {
    let headings = if is_portuguese(language) {
        HEADINGS_PT
    } else {
        HEADINGS_EN
    };
    headings
        .into_iter()
        .zip(SECTION_INSTRUCTIONS)
        .map(|(heading, instruction)| ArticleSection {
            heading,
            instruction,
        })
        .collect()
}

/// The exact heading lines an article for `plant_name` must contain.
pub fn article_headings(plant_name: &str, language: &str) -> Vec<String> {
    article_sections(language)
        .iter()
        .map(|s| s.heading.replace("{plant_name}", plant_name))
        .collect()
}

/// Renders the section skeleton placed in the article prompt.
pub fn article_structure(plant_name: &str, language: &str) -> String {
    article_sections(language)
        .iter()
        .map(|s| {
            format!(
                "{}\n{}",
                s.heading.replace("{plant_name}", plant_name),
                s.instruction.replace("{plant_name}", plant_name)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
