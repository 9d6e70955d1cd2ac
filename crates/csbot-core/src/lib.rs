//! csbot-core: cascade decision logic for the chatbot gateway.
//!
//! Four answer sources (static knowledge map, fuzzy corpus matcher, web
//! fallback searcher, generative bridge) and the resolver that cascades a
//! query through them. The gateway add-on wires these into an HTTP endpoint;
//! everything here is plain async library code with injected dependencies.

mod config;
mod corpus;
mod fuzzy;
mod generative;
mod knowledge;
mod resolver;
mod web;

pub use config::BotConfig;
pub use corpus::{Corpus, CorpusError, CorpusRecord, CorpusResult};
pub use fuzzy::token_set_ratio;
pub use generative::{CohereBridge, GenerativeError, GenerativeSource, UnconfiguredGenerative};
pub use knowledge::{ClockMode, StaticKnowledge};
pub use resolver::{Answer, AnswerSource, Resolver, DEGRADED_ANSWER};
pub use web::{
    default_endpoints, EndpointError, QueryStyle, SearchEndpoint, WebLookup, WebSearcher,
    WebSource,
};
