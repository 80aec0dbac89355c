//! System prompts fixing each capability's behavior.
//!
//! The local runtime serves one general chat model; the capability-specific
//! behavior (rewrite vs. summarize vs. translate) is carried entirely by
//! the system prompt derived from the session configuration.

use pagelens_types::capability::{
    CapabilityConfig, OutputFormat, OutputLength, RewriteTone, SummaryStyle, WriterTone,
};

/// Render the system prompt for a capability configuration.
pub fn system_prompt_for(config: &CapabilityConfig) -> String {
    match config {
        CapabilityConfig::Writer {
            tone,
            length,
            format,
            shared_context,
        } => {
            let mut prompt = format!(
                "You are a writing assistant. Write {} content in a {} tone, \
                 following the user's request. {}",
                length_word(*length),
                writer_tone_word(*tone),
                format_instruction(*format),
            );
            append_shared_context(&mut prompt, shared_context);
            prompt
        }
        CapabilityConfig::Rewriter {
            tone,
            length,
            shared_context,
        } => {
            let mut prompt = format!(
                "Rewrite the user's text{}, keeping its meaning. \
                 Aim for {} output. Reply with only the rewritten text.",
                rewrite_tone_clause(*tone),
                length_word(*length),
            );
            append_shared_context(&mut prompt, shared_context);
            prompt
        }
        CapabilityConfig::Summarizer {
            style,
            length,
            shared_context,
        } => {
            let mut prompt = format!(
                "{} Aim for a {} summary. Reply with only the summary.",
                style_instruction(*style),
                length_word(*length),
            );
            append_shared_context(&mut prompt, shared_context);
            prompt
        }
        CapabilityConfig::Translator { source, target } => format!(
            "Translate the user's text from {source} to {target}. \
             Reply with only the translation, no commentary."
        ),
        CapabilityConfig::LanguageDetector => {
            "Identify the language of the user's text. \
             Reply with only the BCP-47 language code (for example: en, fr, pt-BR)."
                .to_string()
        }
    }
}

fn append_shared_context(prompt: &mut String, shared_context: &Option<String>) {
    if let Some(context) = shared_context {
        prompt.push_str("\n\nBackground for every request in this session: ");
        prompt.push_str(context);
    }
}

fn writer_tone_word(tone: WriterTone) -> &'static str {
    match tone {
        WriterTone::Formal => "formal",
        WriterTone::Neutral => "neutral",
        WriterTone::Casual => "casual",
    }
}

fn rewrite_tone_clause(tone: RewriteTone) -> &'static str {
    match tone {
        RewriteTone::AsIs => "",
        RewriteTone::MoreFormal => " in a more formal register",
        RewriteTone::MoreCasual => " in a more casual register",
    }
}

fn length_word(length: OutputLength) -> &'static str {
    match length {
        OutputLength::Short => "short",
        OutputLength::Medium => "medium-length",
        OutputLength::Long => "long",
    }
}

fn format_instruction(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::PlainText => "Reply in plain text without markup.",
        OutputFormat::Markdown => "Reply in markdown.",
    }
}

fn style_instruction(style: SummaryStyle) -> &'static str {
    match style {
        SummaryStyle::KeyPoints => {
            "Summarize the user's text as a markdown bullet list of its key points."
        }
        SummaryStyle::Tldr => "Summarize the user's text as a short tl;dr paragraph.",
        SummaryStyle::Teaser => {
            "Summarize the user's text as a one-sentence teaser that invites reading on."
        }
        SummaryStyle::Headline => "Summarize the user's text as a single headline.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagelens_types::capability::LanguageTag;

    #[test]
    fn test_translator_prompt_names_both_languages() {
        let prompt = system_prompt_for(&CapabilityConfig::Translator {
            source: LanguageTag::new("en").unwrap(),
            target: LanguageTag::new("pt-BR").unwrap(),
        });
        assert!(prompt.contains("from en to pt-BR"));
        assert!(prompt.contains("only the translation"));
    }

    #[test]
    fn test_detector_demands_bare_code() {
        let prompt = system_prompt_for(&CapabilityConfig::LanguageDetector);
        assert!(prompt.contains("BCP-47"));
        assert!(prompt.contains("only the"));
    }

    #[test]
    fn test_summarizer_styles_differ() {
        let key_points = system_prompt_for(&CapabilityConfig::summarizer(SummaryStyle::KeyPoints));
        let headline = system_prompt_for(&CapabilityConfig::summarizer(SummaryStyle::Headline));
        assert!(key_points.contains("bullet list"));
        assert!(headline.contains("headline"));
        assert_ne!(key_points, headline);
    }

    #[test]
    fn test_shared_context_is_appended() {
        let config = CapabilityConfig::Writer {
            tone: WriterTone::Neutral,
            length: OutputLength::Medium,
            format: OutputFormat::Markdown,
            shared_context: Some("The user is applying for jobs.".to_string()),
        };
        let prompt = system_prompt_for(&config);
        assert!(prompt.ends_with("The user is applying for jobs."));
    }

    #[test]
    fn test_as_is_rewrite_has_no_register_clause() {
        let prompt = system_prompt_for(&CapabilityConfig::rewriter(RewriteTone::AsIs));
        assert!(prompt.starts_with("Rewrite the user's text,"));
    }
}
