use crate::config::Settings;
use crate::engine::{self, ChatResult, Graphmaster, Request, TurnMetrics};
use crate::error::Result;
use crate::markup::Element;
use crate::tags::{TagContext, TagFlags, TagHandler, TagRegistry};
use crate::user::User;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// A bot: its settings, its categories and its tag handlers.
///
/// A `Bot` is immutable while it answers; all per-conversation state lives in
/// the [`User`] passed to [`Bot::chat`].
#[derive(Debug, Default)]
pub struct Bot {
    settings: Settings,
    graphmaster: Graphmaster,
    tags: TagRegistry,
}

/// Result from [`Bot::chat_verbose`].
#[derive(Debug, Clone)]
pub struct ChatResultVerbose {
    pub result: ChatResult,
    pub metrics: TurnMetrics,
}

impl Bot {
    pub fn new(settings: Settings) -> Self {
        Bot { settings, graphmaster: Graphmaster::new(), tags: TagRegistry::new() }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn graphmaster(&self) -> &Graphmaster {
        &self.graphmaster
    }

    pub fn graphmaster_mut(&mut self) -> &mut Graphmaster {
        &mut self.graphmaster
    }

    pub fn tags(&self) -> &TagRegistry {
        &self.tags
    }

    /// Number of categories loaded.
    pub fn size(&self) -> usize {
        self.graphmaster.size()
    }

    // --- Loading -------------------------------------------------------------

    /// Load an AIML document held in memory. `source` names it in logs and
    /// in [`SubQuery::source`](crate::engine::SubQuery::source).
    pub fn learn_str(&mut self, document: &str, source: &str) -> Result<usize> {
        engine::load_aiml_str(&mut self.graphmaster, document, source, &self.settings.substitutions.normal)
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        engine::load_aiml_file(&mut self.graphmaster, path, &self.settings.substitutions.normal)
    }

    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize> {
        engine::load_aiml_dir(&mut self.graphmaster, dir, &self.settings.substitutions.normal)
    }

    /// Add a single category. Empty `that` / `topic` mean `*`.
    pub fn add_category(&mut self, pattern: &str, that: &str, topic: &str, template: &str) -> Result<()> {
        let path = engine::build_category_path(pattern, that, topic, &self.settings.substitutions.normal);
        self.graphmaster.insert(&path, template, "api")
    }

    /// Register a custom tag handler; it shadows a built-in of the same name.
    pub fn register_tag<F>(&mut self, name: &str, flags: TagFlags, eval: F)
    where
        F: Fn(&Element, &mut TagContext<'_>) -> Result<String> + Send + Sync + 'static,
    {
        self.tags.register(TagHandler { name: name.to_string(), flags, eval: Box::new(eval) });
    }

    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.graphmaster.save_snapshot(BufWriter::new(File::create(path)?))?;
        log::info!("saved {} categories to {}", self.size(), path.display());
        Ok(())
    }

    /// Replace all categories with those of a snapshot.
    pub fn load_snapshot(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.graphmaster = Graphmaster::load_snapshot(BufReader::new(File::open(path)?))?;
        log::info!("loaded {} categories from {}", self.size(), path.display());
        Ok(())
    }

    // --- Chatting ------------------------------------------------------------

    /// A user whose topic is the configured default topic.
    pub fn new_user(&self, id: impl Into<String>) -> User {
        User::with_topic(id, &self.settings.default_topic)
    }

    /// Answer `input` for `user` and append the result to the user's history.
    ///
    /// # Example
    /// ```
    /// use graphmaster::{Bot, Settings};
    ///
    /// let mut bot = Bot::new(Settings::default());
    /// bot.add_category("HELLO", "", "", "Hi there").unwrap();
    /// let mut user = bot.new_user("u1");
    /// assert_eq!(bot.chat("hello", &mut user).output(), "Hi there.");
    /// ```
    pub fn chat(&self, input: &str, user: &mut User) -> ChatResult {
        let mut request = Request::new(input, self.settings.timeout());
        self.chat_request(&mut request, user)
    }

    /// Answer a prepared root request.
    pub fn chat_request(&self, request: &mut Request, user: &mut User) -> ChatResult {
        let mut metrics = TurnMetrics::default();
        self.run_root(request, user, &mut metrics)
    }

    /// Like [`Bot::chat`], with per-sentence traces and counters.
    pub fn chat_verbose(&self, input: &str, user: &mut User) -> ChatResultVerbose {
        let mut request = Request::new(input, self.settings.timeout());
        let mut metrics = TurnMetrics::verbose();
        let result = self.run_root(&mut request, user, &mut metrics);
        ChatResultVerbose { result, metrics }
    }

    fn run_root(&self, request: &mut Request, user: &mut User, metrics: &mut TurnMetrics) -> ChatResult {
        let result = engine::run_request(self, request, user, None, metrics);
        metrics.total = result.duration;
        log::debug!(
            "user {}: {} sentence(s), {} redirect(s), {} node(s) in {:?}",
            user.id(),
            result.input_sentences.len(),
            metrics.redirects,
            metrics.nodes_visited,
            result.duration
        );
        user.push_result(result.clone());
        result
    }
}
