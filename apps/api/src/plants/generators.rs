//! Field Generators, one strategy per AI-derived plant field.
//!
//! Every generator swallows its own failures. A blocked prompt, a transport
//! error and an empty answer all end in the field's fallback value and a log
//! line; none of them ever reaches the request boundary.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::llm_client::prompts::{language_display_name, ANSWER_ONLY_INSTRUCTION};
use crate::llm_client::{GenerationParams, TextGenerator};
use crate::plants::prompts::{
    article_headings, article_structure, ARTICLE_PROMPT_TEMPLATE,
    BRIEF_DESCRIPTION_PROMPT_TEMPLATE, CANONICAL_NAME_PROMPT_TEMPLATE, CULTIVABLE_PROMPT_TEMPLATE,
    SCIENTIFIC_NAME_PROMPT_TEMPLATE, SCIENTIFIC_NAME_UNAVAILABLE, SEO_TITLE_PROMPT_TEMPLATE,
};

const CANONICAL_NAME_PARAMS: GenerationParams = GenerationParams::new(0.3, 20);
const CULTIVABLE_PARAMS: GenerationParams = GenerationParams::new(0.1, 5);
const SCIENTIFIC_NAME_PARAMS: GenerationParams = GenerationParams::new(0.2, 20);
const SEO_TITLE_PARAMS: GenerationParams = GenerationParams::new(0.7, 60);
const ARTICLE_PARAMS: GenerationParams = GenerationParams::new(0.6, 3500);
const BRIEF_DESCRIPTION_PARAMS: GenerationParams = GenerationParams::new(0.5, 100);

/// Only this much of the article is sent to the brief-description prompt.
const ARTICLE_EXCERPT_CHARS: usize = 7500;
const BRIEF_DESCRIPTION_LOWER: usize = 140;
const BRIEF_DESCRIPTION_UPPER: usize = 160;

/// Abbreviations whose trailing period belongs to the name.
const ABBREVIATIONS: &[&str] = &["st.", "sr.", "dr.", "spp.", "sp.", "ssp.", "subsp.", "var."];

/// The six plant-field generators, sharing one optional text generator.
///
/// `llm` is `None` when no Gemini credential is configured; every generator
/// then returns its fallback without making a call.
#[derive(Clone)]
pub struct FieldGenerators {
    llm: Option<Arc<dyn TextGenerator>>,
    model: String,
}

impl FieldGenerators {
    pub fn new(llm: Option<Arc<dyn TextGenerator>>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    /// Whether a generative credential is configured.
    pub fn is_enabled(&self) -> bool {
        self.llm.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn text_generator(&self) -> Option<&Arc<dyn TextGenerator>> {
        self.llm.as_ref()
    }

    /// One generation attempt; every failure mode collapses to `None`.
    async fn ask(&self, field: &str, prompt: &str, params: GenerationParams) -> Option<String> {
        let llm = self.llm.as_ref()?;
        match llm.generate(prompt, &self.model, params).await {
            Ok(Some(text)) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Ok(_) => {
                warn!("{field}: generation returned no text");
                None
            }
            Err(e) => {
                error!("{field}: generation failed: {e}");
                None
            }
        }
    }

    /// Standard common name for `input_name` in `language`.
    /// Falls back to the trimmed input on any failure.
    pub async fn canonical_name(&self, input_name: &str, language: &str) -> String {
        let input_name = input_name.trim();
        let language_name = language_display_name(language);
        let prompt = CANONICAL_NAME_PROMPT_TEMPLATE
            .replace("{input_name}", input_name)
            .replace("{language}", language_name)
            .replace("{answer_only}", ANSWER_ONLY_INSTRUCTION);

        match self
            .ask("canonical_name", &prompt, CANONICAL_NAME_PARAMS)
            .await
            .and_then(|raw| clean_canonical_name(&raw))
        {
            Some(name) => {
                info!("Canonical name for {input_name:?} in {language_name}: {name:?}");
                name
            }
            None => {
                warn!("No canonical name for {input_name:?}; keeping the input name");
                input_name.to_string()
            }
        }
    }

    /// Yes/no judgment: does `plant_name` denote a cultivable plant?
    /// Anything but a clear "yes" counts as `false`.
    pub async fn is_cultivable(&self, plant_name: &str, language: &str) -> bool {
        let prompt = CULTIVABLE_PROMPT_TEMPLATE
            .replace("{plant_name}", plant_name)
            .replace("{language}", language_display_name(language));

        let Some(raw) = self.ask("is_cultivable", &prompt, CULTIVABLE_PARAMS).await else {
            warn!("Cultivability check for {plant_name:?} gave no answer; assuming not cultivable");
            return false;
        };

        match parse_yes_no(&raw) {
            Some(answer) => {
                info!("Cultivability check for {plant_name:?}: {answer}");
                answer
            }
            None => {
                warn!("Unexpected cultivability answer for {plant_name:?}: {raw:?}; assuming not cultivable");
                false
            }
        }
    }

    /// Binomial name for `plant_name`, or `SCIENTIFIC_NAME_UNAVAILABLE`.
    pub async fn scientific_name(&self, plant_name: &str, language: &str) -> String {
        let prompt = SCIENTIFIC_NAME_PROMPT_TEMPLATE
            .replace("{plant_name}", plant_name)
            .replace("{language}", language_display_name(language))
            .replace("{unavailable}", SCIENTIFIC_NAME_UNAVAILABLE);

        let Some(raw) = self
            .ask("scientific_name", &prompt, SCIENTIFIC_NAME_PARAMS)
            .await
        else {
            return SCIENTIFIC_NAME_UNAVAILABLE.to_string();
        };

        let name = clean_scientific_name(&raw);
        if name == SCIENTIFIC_NAME_UNAVAILABLE {
            warn!("No usable scientific name for {plant_name:?} (got {raw:?})");
        } else {
            info!("Scientific name for {plant_name:?}: {name:?}");
        }
        name
    }

    /// Catchy, non-generic headline. `None` on failure.
    pub async fn seo_title(&self, plant_name: &str, language: &str) -> Option<String> {
        let prompt = SEO_TITLE_PROMPT_TEMPLATE
            .replace("{plant_name}", plant_name)
            .replace("{language}", language_display_name(language));

        let title = self
            .ask("seo_title", &prompt, SEO_TITLE_PARAMS)
            .await
            .and_then(|raw| clean_title(&raw));
        match &title {
            Some(t) => info!("Generated title for {plant_name:?}: {t:?}"),
            None => warn!("Title generation for {plant_name:?} produced nothing"),
        }
        title
    }

    /// Seven-section plain-text cultivation guide. `None` on failure.
    pub async fn cultivation_article(
        &self,
        plant_name: &str,
        title: Option<&str>,
        language: &str,
    ) -> Option<String> {
        let prompt = ARTICLE_PROMPT_TEMPLATE
            .replace("{plant_name}", plant_name)
            .replace("{title}", title.unwrap_or(plant_name))
            .replace("{structure}", &article_structure(plant_name, language))
            .replace("{language}", language_display_name(language));

        let article = normalize_article(
            &self
                .ask("cultivation_article", &prompt, ARTICLE_PARAMS)
                .await?,
        );

        let missing = missing_headings(&article, &article_headings(plant_name, language));
        if !missing.is_empty() {
            warn!(
                "Article for {plant_name:?} is missing {} section heading(s): {missing:?}",
                missing.len()
            );
        }
        info!(
            "Generated article for {plant_name:?} ({} characters)",
            article.chars().count()
        );
        Some(article)
    }

    /// ~140–160 character meta description derived from the article.
    pub async fn brief_description(
        &self,
        plant_name: &str,
        article: &str,
        language: &str,
    ) -> Option<String> {
        let prompt = BRIEF_DESCRIPTION_PROMPT_TEMPLATE
            .replace("{plant_name}", plant_name)
            .replace("{language}", language_display_name(language))
            .replace("{lower}", &BRIEF_DESCRIPTION_LOWER.to_string())
            .replace("{upper}", &BRIEF_DESCRIPTION_UPPER.to_string())
            .replace("{article}", &article_excerpt(article));

        let description = self
            .ask("brief_description", &prompt, BRIEF_DESCRIPTION_PARAMS)
            .await?;

        let len = description.chars().count();
        if !(100..=BRIEF_DESCRIPTION_UPPER + 20).contains(&len) {
            warn!(
                "Brief description for {plant_name:?} has {len} characters (ideal {BRIEF_DESCRIPTION_LOWER}-{BRIEF_DESCRIPTION_UPPER})"
            );
        }
        Some(description)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Post-processing
// ────────────────────────────────────────────────────────────────────────────

/// Removes one trailing period unless it closes a known abbreviation
/// ("St.", "spp.", ...).
pub fn strip_trailing_period(text: &str) -> &str {
    let Some(stripped) = text.strip_suffix('.') else {
        return text;
    };
    let last_token = text
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or(text)
        .to_lowercase();
    if ABBREVIATIONS.contains(&last_token.as_str()) {
        text
    } else {
        stripped
    }
}

fn trim_quotes(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '“' | '”'))
}

fn clean_canonical_name(raw: &str) -> Option<String> {
    let first_line = raw.trim().lines().next()?;
    let name = strip_trailing_period(trim_quotes(first_line)).trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// `Some(true)` for yes/sim, `Some(false)` for no/não, `None` otherwise.
pub fn parse_yes_no(raw: &str) -> Option<bool> {
    let answer = trim_quotes(raw)
        .trim_end_matches(|c: char| matches!(c, '.' | '!'))
        .to_lowercase();
    match answer.as_str() {
        "yes" | "sim" => Some(true),
        "no" | "não" | "nao" => Some(false),
        _ => None,
    }
}

/// Normalises a scientific-name answer. Anything that does not start with a
/// capitalised token becomes the sentinel.
pub fn clean_scientific_name(raw: &str) -> String {
    let first_line = raw.trim().lines().next().unwrap_or_default();
    let unquoted = trim_quotes(first_line);

    if unquoted
        .trim_end_matches('.')
        .eq_ignore_ascii_case(SCIENTIFIC_NAME_UNAVAILABLE)
    {
        return SCIENTIFIC_NAME_UNAVAILABLE.to_string();
    }

    let name = strip_trailing_period(unquoted).trim();
    let starts_capitalised = name
        .split_whitespace()
        .next()
        .and_then(|token| token.chars().next())
        .is_some_and(char::is_uppercase);

    if starts_capitalised {
        name.to_string()
    } else {
        SCIENTIFIC_NAME_UNAVAILABLE.to_string()
    }
}

/// First line of the answer with surrounding quotes removed.
pub fn clean_title(raw: &str) -> Option<String> {
    let first_line = trim_quotes(raw).lines().next()?;
    let title = trim_quotes(first_line);
    (!title.is_empty()).then(|| title.to_string())
}

/// Trims the article and collapses every run of blank lines to exactly one.
pub fn normalize_article(raw: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for line in raw.trim().lines() {
        let line = line.trim_end();
        if line.is_empty() && out.last().is_some_and(|prev| prev.is_empty()) {
            continue;
        }
        out.push(line);
    }
    out.join("\n")
}

/// Headings from `expected` that do not appear as a line of `article`.
pub fn missing_headings(article: &str, expected: &[String]) -> Vec<String> {
    expected
        .iter()
        .filter(|heading| !article.lines().any(|line| line.trim() == heading.as_str()))
        .cloned()
        .collect()
}

fn article_excerpt(article: &str) -> String {
    article.chars().take(ARTICLE_EXCERPT_CHARS).collect()
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm_client::{GenerationParams, LlmError, TextGenerator};

    type Script = dyn Fn(&str) -> Result<Option<String>, LlmError> + Send + Sync;

    /// Test double answering each prompt through a closure and recording
    /// every prompt it was given.
    pub struct ScriptedGenerator {
        script: Box<Script>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub fn new(
            script: impl Fn(&str) -> Result<Option<String>, LlmError> + Send + Sync + 'static,
        ) -> Self {
            Self {
                script: Box::new(script),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn calls_starting_with(&self, prefix: &str) -> usize {
            self.prompts
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.starts_with(prefix))
                .count()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(
            &self,
            prompt: &str,
            _model: &str,
            _params: GenerationParams,
        ) -> Result<Option<String>, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            (self.script)(prompt)
        }
    }

    // Prompt openings, one per generator.
    pub const CANONICAL: &str = "A user supplied the plant name";
    pub const CULTIVABLE: &str = "Does the term";
    pub const SCIENTIFIC: &str = "Provide the most common";
    pub const TITLE: &str = "Write a blog article title";
    pub const ARTICLE: &str = "Write an informative, practical article";
    pub const BRIEF: &str = "Based on the following article";
}
