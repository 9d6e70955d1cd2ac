//! Cascade resolver: the policy deciding which answer source handles a query.
//!
//! Strict linear cascade: static map, then fuzzy corpus, then web search,
//! then generative fallback, short-circuiting at the first accepted answer.
//! No retries within a stage, no backtracking. All dependencies are injected
//! read-only at startup; nothing is mutated per request.

use crate::corpus::Corpus;
use crate::generative::GenerativeSource;
use crate::knowledge::StaticKnowledge;
use crate::web::{WebLookup, WebSource};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Shown when the final stage fails too (generative error or deadline).
pub const DEGRADED_ANSWER: &str =
    "I'm having trouble answering right now. Please try again in a moment.";

/// Which stage produced the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    Static,
    Corpus,
    Web,
    Generative,
    Degraded,
}

/// The final answer plus its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub source: AnswerSource,
}

impl Answer {
    fn new(text: impl Into<String>, source: AnswerSource) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }

    /// The answer used when every stage is exhausted.
    pub fn degraded() -> Self {
        Self::new(DEGRADED_ANSWER, AnswerSource::Degraded)
    }
}

/// Cascade orchestrator over injected, read-only answer sources.
pub struct Resolver {
    knowledge: Arc<StaticKnowledge>,
    corpus: Arc<Corpus>,
    fuzzy_threshold: u8,
    web: Arc<dyn WebSource>,
    generative: Arc<dyn GenerativeSource>,
}

impl Resolver {
    pub fn new(
        knowledge: Arc<StaticKnowledge>,
        corpus: Arc<Corpus>,
        fuzzy_threshold: u8,
        web: Arc<dyn WebSource>,
        generative: Arc<dyn GenerativeSource>,
    ) -> Self {
        Self {
            knowledge,
            corpus,
            fuzzy_threshold,
            web,
            generative,
        }
    }

    /// Resolve one query through the cascade. Always produces an answer; the
    /// worst case is the degraded-service text.
    pub async fn resolve(&self, query: &str) -> Answer {
        if let Some(text) = self.knowledge.lookup(query) {
            info!(target: "csbot::chat", "Static knowledge hit");
            return Answer::new(text, AnswerSource::Static);
        }

        if let Some(data) = self.corpus.best_match(query, self.fuzzy_threshold) {
            info!(target: "csbot::chat", "Corpus match above threshold");
            return Answer::new(data, AnswerSource::Corpus);
        }

        match self.web.search(query).await {
            WebLookup::Found(text) => {
                info!(target: "csbot::chat", "Web stage answered");
                return Answer::new(text, AnswerSource::Web);
            }
            WebLookup::NotFound => {
                info!(target: "csbot::chat", "No web result - escalating to generative stage");
            }
            WebLookup::TransientError => {
                warn!(target: "csbot::chat", "Web stage unavailable - escalating to generative stage");
            }
        }

        match self.generative.complete(query).await {
            Ok(text) => Answer::new(text, AnswerSource::Generative),
            Err(e) => {
                warn!(target: "csbot::generative", error = %e, "Generative fallback failed - degrading");
                Answer::degraded()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::CorpusRecord;
    use crate::generative::GenerativeError;
    use crate::knowledge::{ClockMode, StaticKnowledge};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockWeb {
        lookup: WebLookup,
        calls: AtomicUsize,
    }

    impl MockWeb {
        fn new(lookup: WebLookup) -> Arc<Self> {
            Arc::new(Self {
                lookup,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl WebSource for MockWeb {
        async fn search(&self, _query: &str) -> WebLookup {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.lookup.clone()
        }
    }

    struct MockGenerative {
        reply: Option<String>,
        calls: AtomicUsize,
    }

    impl MockGenerative {
        fn answering(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(text.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl GenerativeSource for MockGenerative {
        async fn complete(&self, _query: &str) -> Result<String, GenerativeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().ok_or(GenerativeError::EmptyCompletion)
        }
    }

    fn test_corpus() -> Arc<Corpus> {
        Arc::new(Corpus::from_records(vec![CorpusRecord {
            heading: "binary search".into(),
            data: "Divide and conquer over a sorted array.".into(),
        }]))
    }

    fn resolver(
        web: Arc<MockWeb>,
        generative: Arc<MockGenerative>,
    ) -> Resolver {
        Resolver::new(
            Arc::new(StaticKnowledge::new(ClockMode::FrozenAtStartup)),
            test_corpus(),
            80,
            web,
            generative,
        )
    }

    #[tokio::test]
    async fn static_hit_short_circuits_later_stages() {
        let web = MockWeb::new(WebLookup::Found("unused".into()));
        let generative = MockGenerative::answering("unused");
        let r = resolver(Arc::clone(&web), Arc::clone(&generative));

        let answer = r.resolve("HELLO").await;
        assert_eq!(answer.text, "Hi there! How can I assist you today?");
        assert_eq!(answer.source, AnswerSource::Static);
        assert_eq!(web.calls.load(Ordering::SeqCst), 0);
        assert_eq!(generative.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fuzzy_hit_short_circuits_later_stages() {
        let web = MockWeb::new(WebLookup::Found("unused".into()));
        let generative = MockGenerative::answering("unused");
        let r = resolver(Arc::clone(&web), Arc::clone(&generative));

        let answer = r.resolve("binery serch").await;
        assert_eq!(answer.text, "Divide and conquer over a sorted array.");
        assert_eq!(answer.source, AnswerSource::Corpus);
        assert_eq!(web.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn web_found_skips_generative() {
        let web = MockWeb::new(WebLookup::Found("Here's what I found: summary".into()));
        let generative = MockGenerative::answering("unused");
        let r = resolver(Arc::clone(&web), Arc::clone(&generative));

        let answer = r.resolve("something obscure").await;
        assert_eq!(answer.source, AnswerSource::Web);
        assert_eq!(web.calls.load(Ordering::SeqCst), 1);
        assert_eq!(generative.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn web_not_found_escalates_to_generative() {
        let web = MockWeb::new(WebLookup::NotFound);
        let generative = MockGenerative::answering("generated answer");
        let r = resolver(Arc::clone(&web), Arc::clone(&generative));

        let answer = r.resolve("something obscure").await;
        assert_eq!(answer.text, "generated answer");
        assert_eq!(answer.source, AnswerSource::Generative);
        assert_eq!(generative.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn web_transient_error_escalates_to_generative() {
        let web = MockWeb::new(WebLookup::TransientError);
        let generative = MockGenerative::answering("generated answer");
        let r = resolver(web, Arc::clone(&generative));

        let answer = r.resolve("something obscure").await;
        assert_eq!(answer.source, AnswerSource::Generative);
        assert_eq!(generative.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn generative_failure_degrades() {
        let web = MockWeb::new(WebLookup::NotFound);
        let generative = MockGenerative::failing();
        let r = resolver(web, generative);

        let answer = r.resolve("something obscure").await;
        assert_eq!(answer.text, DEGRADED_ANSWER);
        assert_eq!(answer.source, AnswerSource::Degraded);
    }

    #[tokio::test]
    async fn static_and_fuzzy_stages_are_idempotent() {
        let r = resolver(MockWeb::new(WebLookup::NotFound), MockGenerative::failing());
        assert_eq!(r.resolve("hello").await, r.resolve("hello").await);
        assert_eq!(
            r.resolve("binery serch").await,
            r.resolve("binery serch").await
        );
    }
}
