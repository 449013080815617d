//! Writing-style analysis and style-conditioned generation.

use std::sync::Arc;

use serde::Serialize;

use inkworld_domain::{
    profile_confidence, strip_markup, truncate_chars, word_count, StyleEligibility, StyleMetrics,
    StyleProfile, StyleVoice, UserId, MIN_CONFIDENCE_FOR_GENERATION,
};
use inkworld_shared::GenerateStyleRequest;

use crate::infrastructure::ports::{
    ChatMessage, ClockPort, LlmError, LlmPort, LlmRequest, NodeRepo, RepoError, StoryRepo,
    StyleProfileRepo,
};
use crate::use_cases::json_reply::parse_json_reply;

/// Characters of sample prose sent for the voice summary.
const VOICE_SAMPLE_CHARS: usize = 8000;
const DEFAULT_GENERATION_WORDS: u32 = 500;

#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    #[error("{0}")]
    InsufficientData(String),
    #[error("{0}")]
    LowConfidence(String),
    #[error("Style profile not found")]
    ProfileNotFound,
    #[error("Unreadable model reply: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

/// Text written in the user's voice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyledText {
    pub content: String,
    pub word_count: u32,
    pub confidence: f32,
}

/// A user's writing, one document per linear story or interactive node.
struct Corpus {
    documents: Vec<String>,
    stories: u32,
    words: u32,
}

pub struct StyleOps {
    stories: Arc<dyn StoryRepo>,
    nodes: Arc<dyn NodeRepo>,
    profiles: Arc<dyn StyleProfileRepo>,
    llm: Arc<dyn LlmPort>,
    clock: Arc<dyn ClockPort>,
}

impl StyleOps {
    pub fn new(
        stories: Arc<dyn StoryRepo>,
        nodes: Arc<dyn NodeRepo>,
        profiles: Arc<dyn StyleProfileRepo>,
        llm: Arc<dyn LlmPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            stories,
            nodes,
            profiles,
            llm,
            clock,
        }
    }

    pub async fn eligibility(&self, user_id: UserId) -> Result<StyleEligibility, StyleError> {
        let corpus = self.corpus(user_id).await?;
        Ok(StyleEligibility::evaluate(corpus.stories, corpus.words))
    }

    /// Measure the user's writing and store a fresh profile.
    pub async fn analyze(&self, user_id: UserId) -> Result<StyleProfile, StyleError> {
        let corpus = self.corpus(user_id).await?;
        let eligibility = StyleEligibility::evaluate(corpus.stories, corpus.words);
        if let Some(shortfall) = eligibility.shortfall() {
            return Err(StyleError::InsufficientData(shortfall));
        }

        let metrics = StyleMetrics::measure(&corpus.documents);
        let voice = self.describe_voice(&corpus.documents).await?;
        let now = self.clock.now();
        let created_at = self
            .profiles
            .get(user_id)
            .await?
            .map(|existing| existing.created_at)
            .unwrap_or(now);

        let profile = StyleProfile {
            user_id,
            confidence: profile_confidence(corpus.stories, corpus.words),
            metrics,
            voice,
            stories_analyzed: corpus.stories,
            words_analyzed: corpus.words,
            created_at,
            updated_at: now,
        };
        self.profiles.save(&profile).await?;

        tracing::info!(
            user_id = %user_id,
            confidence = profile.confidence,
            stories = corpus.stories,
            words = corpus.words,
            "Style profile analyzed"
        );
        Ok(profile)
    }

    pub async fn generate(
        &self,
        user_id: UserId,
        data: GenerateStyleRequest,
    ) -> Result<StyledText, StyleError> {
        let profile = self.profiles.get(user_id).await?.ok_or_else(|| {
            StyleError::InsufficientData(
                "No style profile yet. Analyze your writing first.".to_string(),
            )
        })?;
        if !profile.usable_for_generation() {
            return Err(StyleError::LowConfidence(format!(
                "Style profile confidence {:.2} is below {:.2}. Write more and analyze again.",
                profile.confidence, MIN_CONFIDENCE_FOR_GENERATION
            )));
        }

        let length = data.length.unwrap_or(DEFAULT_GENERATION_WORDS);
        let request = LlmRequest::new(vec![ChatMessage::user(format!(
            "Write about {} words for this prompt:\n{}",
            length, data.prompt
        ))])
        .with_system_prompt(format!(
            "You are a ghostwriter. Write in the author's voice as described below. \
             Reply with prose only.\n\n{}",
            profile.as_prompt_guidance()
        ))
        .with_temperature(0.8)
        .with_max_tokens(Some(length.saturating_mul(2)));

        let response = self.llm.generate(request).await?;
        let content = response.content.trim().to_string();
        Ok(StyledText {
            word_count: word_count(&content),
            content,
            confidence: profile.confidence,
        })
    }

    pub async fn profile(&self, user_id: UserId) -> Result<StyleProfile, StyleError> {
        self.profiles
            .get(user_id)
            .await?
            .ok_or(StyleError::ProfileNotFound)
    }

    pub async fn delete_profile(&self, user_id: UserId) -> Result<(), StyleError> {
        if self.profiles.delete(user_id).await? {
            Ok(())
        } else {
            Err(StyleError::ProfileNotFound)
        }
    }

    /// Stories without any words are not counted.
    async fn corpus(&self, user_id: UserId) -> Result<Corpus, StyleError> {
        let mut corpus = Corpus {
            documents: Vec::new(),
            stories: 0,
            words: 0,
        };

        for story in self.stories.list_by_author(user_id).await? {
            let (documents, words) = if story.is_interactive {
                let nodes = self.nodes.list_for_story(story.id).await?;
                let words = nodes.iter().map(|n| n.word_count).sum();
                (nodes.into_iter().map(|n| n.content).collect(), words)
            } else {
                (vec![story.content], story.word_count)
            };
            if words == 0 {
                continue;
            }
            corpus.stories += 1;
            corpus.words += words;
            corpus.documents.extend(documents);
        }

        Ok(corpus)
    }

    async fn describe_voice(&self, documents: &[String]) -> Result<StyleVoice, StyleError> {
        let sample = documents
            .iter()
            .map(|d| strip_markup(d))
            .collect::<Vec<_>>()
            .join("\n\n");
        let request = LlmRequest::new(vec![ChatMessage::user(format!(
            "Describe the writing voice of this author. Reply with a JSON object \
             {{\"tone\": \"...\", \"pacing\": \"...\", \"themes\": [\"...\"], \
             \"description\": \"...\"}}.\n\nSample:\n{}",
            truncate_chars(&sample, VOICE_SAMPLE_CHARS)
        ))])
        .with_system_prompt("You are a literary analyst.")
        .with_temperature(0.3)
        .expecting_json();

        let response = self.llm.generate(request).await?;
        parse_json_reply(&response.content).map_err(|e| StyleError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::{
        FinishReason, LlmResponse, MockLlmPort, MockNodeRepo, MockStoryRepo,
        MockStyleProfileRepo,
    };
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use inkworld_domain::{NodeType, Story, StoryNode};

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn words(n: usize) -> String {
        format!("<p>{}</p>", vec!["word"; n].join(" "))
    }

    fn reply(content: &str) -> LlmResponse {
        LlmResponse {
            content: content.into(),
            finish_reason: FinishReason::Stop,
            usage: None,
        }
    }

    fn ops(
        stories: MockStoryRepo,
        nodes: MockNodeRepo,
        profiles: MockStyleProfileRepo,
        llm: MockLlmPort,
    ) -> StyleOps {
        StyleOps::new(
            Arc::new(stories),
            Arc::new(nodes),
            Arc::new(profiles),
            Arc::new(llm),
            Arc::new(FixedClock(now())),
        )
    }

    fn profile(user_id: UserId, confidence: f32) -> StyleProfile {
        StyleProfile {
            user_id,
            confidence,
            metrics: StyleMetrics::default(),
            voice: StyleVoice::default(),
            stories_analyzed: 2,
            words_analyzed: 3000,
            created_at: now(),
            updated_at: now(),
        }
    }

    #[tokio::test]
    async fn eligibility_counts_interactive_stories_through_nodes() {
        let user = UserId::new();
        let linear = Story::new(user, "Linear", now()).with_content(words(1000));
        let mut branching = Story::new(user, "Branching", now());
        branching.mark_interactive(now());
        let empty = Story::new(user, "Empty", now());
        let branching_id = branching.id;

        let mut stories = MockStoryRepo::new();
        stories
            .expect_list_by_author()
            .returning(move |_| Ok(vec![linear.clone(), branching.clone(), empty.clone()]));
        let mut nodes = MockNodeRepo::new();
        nodes
            .expect_list_for_story()
            .withf(move |id| *id == branching_id)
            .returning(move |id| {
                Ok(vec![
                    StoryNode::new(id, "A", words(1500), NodeType::Content, now()),
                    StoryNode::new(id, "B", words(600), NodeType::Ending, now()),
                ])
            });

        let eligibility = ops(stories, nodes, MockStyleProfileRepo::new(), MockLlmPort::new())
            .eligibility(user)
            .await
            .unwrap();
        assert_eq!(eligibility.story_count, 2);
        assert_eq!(eligibility.word_count, 3100);
        assert!(eligibility.eligible);
    }

    #[tokio::test]
    async fn analyze_refuses_small_corpus() {
        let user = UserId::new();
        let story = Story::new(user, "Only", now()).with_content(words(5000));
        let mut stories = MockStoryRepo::new();
        stories
            .expect_list_by_author()
            .returning(move |_| Ok(vec![story.clone()]));
        let mut profiles = MockStyleProfileRepo::new();
        profiles.expect_save().never();

        let result = ops(stories, MockNodeRepo::new(), profiles, MockLlmPort::new())
            .analyze(user)
            .await;
        assert!(matches!(result, Err(StyleError::InsufficientData(_))));
    }

    #[tokio::test]
    async fn analyze_stores_profile_keeping_original_creation_time() {
        let user = UserId::new();
        let first = Story::new(user, "One", now()).with_content(words(2000));
        let second = Story::new(user, "Two", now()).with_content(words(2000));
        let mut stories = MockStoryRepo::new();
        stories
            .expect_list_by_author()
            .returning(move |_| Ok(vec![first.clone(), second.clone()]));

        let mut llm = MockLlmPort::new();
        llm.expect_generate().returning(|_| {
            Ok(reply(
                "{\"tone\": \"wry\", \"pacing\": \"brisk\", \"themes\": [\"loss\"], \"description\": \"Spare.\"}",
            ))
        });

        let earlier = now() - Duration::days(7);
        let mut profiles = MockStyleProfileRepo::new();
        profiles.expect_get().returning(move |id| {
            let mut existing = profile(id, 0.4);
            existing.created_at = earlier;
            Ok(Some(existing))
        });
        profiles
            .expect_save()
            .withf(move |p| p.created_at == earlier && p.updated_at == now())
            .times(1)
            .returning(|_| Ok(()));

        let analyzed = ops(stories, MockNodeRepo::new(), profiles, llm)
            .analyze(user)
            .await
            .unwrap();
        // 0.3 + 0.1 * 2 + 4000 / 20000
        assert_eq!(analyzed.confidence, 0.7);
        assert_eq!(analyzed.voice.tone, "wry");
        assert_eq!(analyzed.words_analyzed, 4000);
    }

    #[tokio::test]
    async fn generate_without_profile_is_insufficient_data() {
        let mut profiles = MockStyleProfileRepo::new();
        profiles.expect_get().returning(|_| Ok(None));

        let result = ops(MockStoryRepo::new(), MockNodeRepo::new(), profiles, MockLlmPort::new())
            .generate(
                UserId::new(),
                GenerateStyleRequest {
                    prompt: "A storm".into(),
                    length: None,
                },
            )
            .await;
        assert!(matches!(result, Err(StyleError::InsufficientData(_))));
    }

    #[tokio::test]
    async fn generate_with_weak_profile_is_low_confidence() {
        let mut profiles = MockStyleProfileRepo::new();
        profiles
            .expect_get()
            .returning(|id| Ok(Some(profile(id, 0.49))));
        let mut llm = MockLlmPort::new();
        llm.expect_generate().never();

        let result = ops(MockStoryRepo::new(), MockNodeRepo::new(), profiles, llm)
            .generate(
                UserId::new(),
                GenerateStyleRequest {
                    prompt: "A storm".into(),
                    length: None,
                },
            )
            .await;
        assert!(matches!(result, Err(StyleError::LowConfidence(_))));
    }

    #[tokio::test]
    async fn generate_uses_profile_guidance() {
        let mut profiles = MockStyleProfileRepo::new();
        profiles
            .expect_get()
            .returning(|id| Ok(Some(profile(id, 0.8))));
        let mut llm = MockLlmPort::new();
        llm.expect_generate()
            .withf(|r| {
                r.max_tokens == Some(200)
                    && r.system_prompt
                        .as_deref()
                        .is_some_and(|s| s.contains("Tone:"))
            })
            .returning(|_| Ok(reply("  The storm broke at dawn.  ")));

        let text = ops(MockStoryRepo::new(), MockNodeRepo::new(), profiles, llm)
            .generate(
                UserId::new(),
                GenerateStyleRequest {
                    prompt: "A storm".into(),
                    length: Some(100),
                },
            )
            .await
            .unwrap();
        assert_eq!(text.content, "The storm broke at dawn.");
        assert_eq!(text.word_count, 5);
        assert_eq!(text.confidence, 0.8);
    }

    #[tokio::test]
    async fn deleting_missing_profile_is_not_found() {
        let mut profiles = MockStyleProfileRepo::new();
        profiles.expect_delete().returning(|_| Ok(false));

        let result = ops(MockStoryRepo::new(), MockNodeRepo::new(), profiles, MockLlmPort::new())
            .delete_profile(UserId::new())
            .await;
        assert!(matches!(result, Err(StyleError::ProfileNotFound)));
    }
}
