//! Slide decks: the large model outlines the content, images are looked up per slide
//! and the result is written to a `.pptx` file under the presentations directory.

use crate::content::find_owned;
use crate::error::Error;
use crate::generated_output;
use crate::llm_json;
use entity::feature::Feature;
use entity::Id;
use log::*;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use service::config::Config;
use std::path::Path;
use study_ai::traits::{chat, image_search};
use study_ai::types::chat::{CompletionRequest, Message};
use study_ai::types::image::Image;

pub mod pptx;
pub mod theme;

pub use theme::Theme;

const DEFAULT_SLIDES: u32 = 10;
const MIN_SLIDES: u32 = 3;
const MAX_SLIDES: u32 = 20;

const SAMPLE_THRESHOLD_CHARS: usize = 5000;
const SAMPLE_PART_CHARS: usize = 1500;
const SAMPLE_SEPARATOR: &str = "\n\n[...content continues...]\n\n";

const GENERIC_PHRASES: &[&str] = &[
    "key point",
    "important concept",
    "supporting detail",
    "conclusion",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideStructure {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub slides: Vec<Slide>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    /// `title`, `content` or `summary`. Anything else renders as content.
    #[serde(default = "content_slide_type")]
    pub slide_type: String,
    #[serde(default)]
    pub heading: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub points: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_keyword: Option<String>,
}

fn content_slide_type() -> String {
    "content".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationOptions {
    pub slide_count: u32,
    pub theme: Theme,
    pub include_images: bool,
}

impl PresentationOptions {
    pub fn new(slide_count: Option<u32>, theme: Option<&str>, include_images: Option<bool>) -> Self {
        Self {
            slide_count: slide_count
                .unwrap_or(DEFAULT_SLIDES)
                .clamp(MIN_SLIDES, MAX_SLIDES),
            theme: theme.map(Theme::from_name).unwrap_or_default(),
            include_images: include_images.unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedPresentation {
    pub content_id: Id,
    pub output_id: Id,
    pub slide_structure: SlideStructure,
    pub download_url: String,
}

/// A rendered deck read back from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub fn download_url(output_id: Id) -> String {
    format!("/content/presentation/{output_id}/download")
}

/// Long texts are cut down to their beginning, middle and end.
pub fn sample_text(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= SAMPLE_THRESHOLD_CHARS {
        return text.to_string();
    }

    let middle_start = chars.len() / 2 - SAMPLE_PART_CHARS / 2;
    let beginning: String = chars[..SAMPLE_PART_CHARS].iter().collect();
    let middle: String = chars[middle_start..middle_start + SAMPLE_PART_CHARS]
        .iter()
        .collect();
    let end: String = chars[chars.len() - SAMPLE_PART_CHARS..].iter().collect();

    [beginning, middle, end].join(SAMPLE_SEPARATOR)
}

fn outline_prompt(sample: &str, slide_count: u32) -> String {
    format!(
        r#"You are an expert presentation designer. Analyze this content and create a professional {slide_count}-slide presentation.

=== CONTENT TO ANALYZE ===
{sample}

=== CRITICAL INSTRUCTIONS ===
Extract REAL information from the content above: topics, facts, data, names and concepts it actually mentions.
Do NOT use generic phrases like "Key Point 1", "Important concept", "Supporting detail" or "Conclusion".

Create EXACTLY {slide_count} slides:
1. Slide 1 (title): the main topic of the text, with a subtitle describing what it covers.
2. Slides 2-{last_content} (content): one concept from the text per slide, with 3-5 specific bullet points and an image keyword matching the heading.
3. Slide {slide_count} (summary): 2-3 main takeaways using specific terms from the text.

Return ONLY valid JSON (no markdown, no explanation):
{{
  "title": "main topic",
  "subtitle": "what the content discusses",
  "slides": [
    {{"slide_type": "title", "heading": "topic", "subtitle": "description", "image_keyword": "keyword"}},
    {{"slide_type": "content", "heading": "concept", "points": ["fact 1", "fact 2", "fact 3"], "image_keyword": "keyword"}},
    {{"slide_type": "summary", "heading": "Key Takeaways", "points": ["takeaway 1", "takeaway 2"]}}
  ]
}}"#,
        last_content = slide_count - 1
    )
}

fn strict_prompt(sample: &str, slide_count: u32) -> String {
    format!(
        r#"STOP! You are giving generic responses.

READ THIS CONTENT and extract REAL information:

{sample}

Create {slide_count} slides. Each slide must have a heading naming an ACTUAL topic from the text above and bullet points with REAL facts, data or concepts from it.
Do NOT write "Key Point 1/2/3", "Important concept" or "Supporting detail".
Write actual content like "Photosynthesis Process" with "Plants convert CO2 and H2O into glucose using sunlight".

Use the same JSON shape: {{"title", "subtitle", "slides": [{{"slide_type", "heading", "subtitle", "points", "image_keyword"}}]}}.
Return JSON only:"#
    )
}

/// True when the first content slide reads like a template rather than the material.
pub fn is_generic(structure: &SlideStructure) -> bool {
    let Some(slide) = structure.slides.iter().find(|s| s.slide_type == "content") else {
        return false;
    };
    let heading = slide.heading.to_lowercase();
    let points = slide.points.join(" ").to_lowercase();
    GENERIC_PHRASES
        .iter()
        .any(|phrase| heading.contains(phrase) || points.contains(phrase))
}

async fn request_outline(
    provider: &dyn chat::Provider,
    model: &str,
    prompt: String,
    temperature: f32,
) -> Result<SlideStructure, Error> {
    let request = CompletionRequest::new(model, vec![Message::user(prompt)])
        .temperature(temperature)
        .max_tokens(4000);
    let reply = provider.complete(request).await?.content;

    llm_json::parse_object(&reply)
        .and_then(|value| serde_json::from_value::<SlideStructure>(value).ok())
        .filter(|structure| !structure.slides.is_empty())
        .ok_or_else(|| {
            warn!(
                "Unusable presentation outline from {}: {}",
                provider.provider_id(),
                crate::text_processing::truncate_chars(&reply, 500)
            );
            Error::provider("Failed to generate presentation structure")
        })
}

/// Outlines `text` as at most `slide_count` slides, retrying once with a stricter
/// prompt when the first answer is generic.
pub async fn outline(
    provider: &dyn chat::Provider,
    model: &str,
    text: &str,
    slide_count: u32,
) -> Result<SlideStructure, Error> {
    let sample = sample_text(text);
    let mut structure =
        request_outline(provider, model, outline_prompt(&sample, slide_count), 0.3).await?;

    if is_generic(&structure) {
        warn!("Presentation outline is generic, retrying with a stricter prompt");
        structure = request_outline(provider, model, strict_prompt(&sample, slide_count), 0.2).await?;
    }

    structure.slides.truncate(slide_count as usize);
    Ok(structure)
}

/// The first image any source finds for `keyword`. Source failures are logged and skipped.
pub async fn find_image(
    sources: &[Box<dyn image_search::Provider>],
    keyword: &str,
) -> Option<Image> {
    for source in sources {
        match source.find_image(keyword).await {
            Ok(Some(image)) => return Some(image),
            Ok(None) => debug!("{} has no image for {keyword:?}", source.provider_id()),
            Err(e) => warn!("{} image search failed: {e}", source.provider_id()),
        }
    }
    None
}

async fn slide_images(
    sources: &[Box<dyn image_search::Provider>],
    structure: &SlideStructure,
) -> Vec<Option<Image>> {
    let mut images = Vec::with_capacity(structure.slides.len());
    for slide in &structure.slides {
        let keyword = slide
            .image_keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && slide.slide_type != "title" && slide.slide_type != "summary");
        images.push(match keyword {
            Some(keyword) => find_image(sources, keyword).await,
            None => None,
        });
    }
    images
}

/// Generates, renders and stores a deck for a content record.
pub async fn create(
    db: &DatabaseConnection,
    config: &Config,
    provider: &dyn chat::Provider,
    image_sources: &[Box<dyn image_search::Provider>],
    user_id: Id,
    content_id: Id,
    options: PresentationOptions,
) -> Result<GeneratedPresentation, Error> {
    let content = find_owned(db, content_id, user_id).await?;

    let structure = outline(
        provider,
        config.large_model(),
        &content.normalized_text,
        options.slide_count,
    )
    .await?;

    let images = if options.include_images {
        slide_images(image_sources, &structure).await
    } else {
        Vec::new()
    };
    let bytes = pptx::render(&structure, options.theme.palette(), &images)?;

    let file_name = format!("presentation_{}.pptx", Id::new_v4());
    let file_path = config.presentations_dir().join(&file_name);
    tokio::fs::create_dir_all(config.presentations_dir()).await?;
    tokio::fs::write(&file_path, &bytes).await?;
    info!(
        "Wrote {file_name} ({} slides, {} bytes) for content {content_id}",
        structure.slides.len(),
        bytes.len()
    );

    let output = match entity_api::generated_output::create(
        db,
        user_id,
        content_id,
        Feature::Presentation,
        serde_json::to_value(options)?,
        json!({ "slide_structure": structure, "file_name": file_name, "download_url": "" }),
    )
    .await
    {
        Ok(output) => output,
        Err(err) => {
            if let Err(e) = tokio::fs::remove_file(&file_path).await {
                warn!("Failed to remove unrecorded deck {file_name}: {e}");
            }
            return Err(err.into());
        }
    };

    let download_url = download_url(output.id);
    entity_api::generated_output::update_output(
        db,
        output.id,
        json!({
            "slide_structure": structure,
            "file_name": file_name,
            "download_url": download_url,
        }),
    )
    .await?;

    Ok(GeneratedPresentation {
        content_id,
        output_id: output.id,
        slide_structure: structure,
        download_url,
    })
}

/// Reads back the `.pptx` file of a presentation output owned by `user_id`.
pub async fn download(
    db: &DatabaseConnection,
    config: &Config,
    output_id: Id,
    user_id: Id,
) -> Result<PresentationFile, Error> {
    let output = generated_output::find_owned(db, output_id, user_id).await?;
    if output.feature != Feature::Presentation {
        return Err(Error::not_found("Presentation not found"));
    }

    // Only a bare file name is accepted, never a path.
    let file_name = output
        .output
        .get("file_name")
        .and_then(|name| name.as_str())
        .and_then(|name| Path::new(name).file_name())
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| Error::not_found("Presentation file not found"))?;

    match tokio::fs::read(config.presentations_dir().join(&file_name)).await {
        Ok(bytes) => Ok(PresentationFile { file_name, bytes }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Presentation file {file_name} of output {output_id} is missing");
            Err(Error::not_found("Presentation file not found"))
        }
        Err(e) => Err(e.into()),
    }
}


#[cfg(test)]
#[cfg(feature = "mock")]
mod db_tests {
    use super::*;
    use crate::content::tests::content_model;
    use crate::generated_outputs;
    use crate::test_utils::replying;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};
    use serde_json::Value;

    fn output(user_id: Id, content_id: Id, feature: Feature, output: Value) -> generated_outputs::Model {
        let now = chrono::Utc::now();
        generated_outputs::Model {
            id: Id::new_v4(),
            user_id,
            content_id,
            feature,
            options: json!({}),
            output,
            score: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn config(dir: &Path) -> Config {
        Config::from_args(["edugen"]).set_presentations_dir(dir.to_path_buf())
    }

    #[tokio::test]
    async fn create_writes_the_deck_and_records_its_download_url() {
        let user_id = Id::new_v4();
        let content = content_model(user_id, "Volcanoes erupt when magma rises.");
        let stored = output(user_id, content.id, Feature::Presentation, json!({}));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![content.clone()]])
            .append_query_results([vec![stored.clone()]])
            .append_query_results([vec![stored.clone()]])
            .append_query_results([vec![stored.clone()]])
            .into_connection();
        let provider = replying(
            r#"{"title": "Volcanoes", "subtitle": "Eruptions", "slides": [
                {"slide_type": "title", "heading": "Volcanoes"},
                {"slide_type": "content", "heading": "Magma", "points": ["Magma rises"]},
                {"slide_type": "summary", "heading": "Takeaways", "points": ["Magma erupts"]}
            ]}"#,
        );
        let dir = tempfile::tempdir().unwrap();

        let generated = create(
            &db,
            &config(dir.path()),
            &provider,
            &[],
            user_id,
            content.id,
            PresentationOptions::new(Some(3), Some("minimal"), Some(false)),
        )
        .await
        .unwrap();

        assert_eq!(
            generated.download_url,
            format!("/content/presentation/{}/download", stored.id)
        );
        assert_eq!(generated.slide_structure.slides.len(), 3);
        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn decks_are_removed_when_the_output_cannot_be_stored() {
        let user_id = Id::new_v4();
        let content = content_model(user_id, "Volcanoes erupt when magma rises.");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![content.clone()]])
            .append_query_errors([DbErr::Custom("insert failed".to_string())])
            .into_connection();
        let provider = replying(
            r#"{"title": "Volcanoes", "subtitle": "Eruptions", "slides": [
                {"slide_type": "title", "heading": "Volcanoes"},
                {"slide_type": "content", "heading": "Magma", "points": ["Magma rises"]},
                {"slide_type": "summary", "heading": "Takeaways", "points": ["Magma erupts"]}
            ]}"#,
        );
        let dir = tempfile::tempdir().unwrap();

        let result = create(
            &db,
            &config(dir.path()),
            &provider,
            &[],
            user_id,
            content.id,
            PresentationOptions::new(Some(3), None, Some(false)),
        )
        .await;

        assert!(result.is_err());
        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn download_reads_the_stored_file() {
        let user_id = Id::new_v4();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("presentation_x.pptx"), b"PK").unwrap();
        let stored = output(
            user_id,
            Id::new_v4(),
            Feature::Presentation,
            json!({"file_name": "../../presentation_x.pptx"}),
        );
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored.clone()]])
            .into_connection();

        let file = download(&db, &config(dir.path()), stored.id, user_id)
            .await
            .unwrap();

        assert_eq!(file.file_name, "presentation_x.pptx");
        assert_eq!(file.bytes, b"PK");
    }

    #[tokio::test]
    async fn download_rejects_other_features() {
        let user_id = Id::new_v4();
        let dir = tempfile::tempdir().unwrap();
        let stored = output(user_id, Id::new_v4(), Feature::Quiz, json!({}));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored.clone()]])
            .into_connection();

        let err = download(&db, &config(dir.path()), stored.id, user_id)
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }
}
