//! Fixed-style document summaries.

use super::client::GeminiClient;

/// Only this many leading chunks feed the summary prompt; later chunks of
/// long documents are excluded to bound prompt size.
const MAX_SUMMARY_CHUNKS: usize = 15;

/// The supported summary styles, each with its own prompt template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryStyle {
    Overview,
    KeyPoints,
    Executive,
    Detailed,
}

impl SummaryStyle {
    pub const ALL: [SummaryStyle; 4] = [
        SummaryStyle::Overview,
        SummaryStyle::KeyPoints,
        SummaryStyle::Executive,
        SummaryStyle::Detailed,
    ];

    /// The wire tag for this style.
    pub fn tag(&self) -> &'static str {
        match self {
            SummaryStyle::Overview => "overview",
            SummaryStyle::KeyPoints => "key_points",
            SummaryStyle::Executive => "executive",
            SummaryStyle::Detailed => "detailed",
        }
    }

    /// Parse a wire tag; unknown tags are the caller's to default.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|style| style.tag() == tag)
    }

    /// Prompt template, with a `{context}` placeholder for the document
    /// content.
    fn template(&self) -> &'static str {
        match self {
            SummaryStyle::Overview => {
                r#"You are an expert document analysis assistant. Provide a comprehensive overview of the following document.

Focus on:
- Main topics and themes
- Key findings or conclusions
- Overall purpose and scope
- Important data points or statistics

DOCUMENT CONTENT:
{context}

Provide a concise yet informative summary (3-4 paragraphs). Focus on the most important information that gives a complete picture of the document."#
            }
            SummaryStyle::KeyPoints => {
                r#"Extract the key points and main ideas from this document. Focus on the most important information.

DOCUMENT CONTENT:
{context}

Provide a bullet-point list of the 5-7 most important points from the document."#
            }
            SummaryStyle::Executive => {
                r#"Create an executive summary of this document suitable for quick understanding by busy professionals.

DOCUMENT CONTENT:
{context}

Provide a very concise summary (2-3 paragraphs) highlighting:
- Primary objective/purpose
- Main findings/conclusions
- Key recommendations or next steps"#
            }
            SummaryStyle::Detailed => {
                r#"Provide a detailed, comprehensive analysis of this document covering all major aspects.

DOCUMENT CONTENT:
{context}

Provide an in-depth summary covering:
1. Introduction and context
2. Main content and analysis
3. Key findings and data
4. Conclusions and implications
5. Recommendations (if any)"#
            }
        }
    }
}

/// Summarize a document from its stored chunks.
///
/// A failed model call yields the style's fallback message rather than an
/// error.
pub async fn summarize(client: &GeminiClient, chunks: &[String], style: SummaryStyle) -> String {
    let context_text = chunks
        .iter()
        .take(MAX_SUMMARY_CHUNKS)
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = style.template().replace("{context}", &context_text);

    match client.generate(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            log::error!("Summary generation error: {}", e);
            format!("Unable to generate {} summary at this time.", style.tag())
        }
    }
}
