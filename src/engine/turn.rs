//! Per-request pipeline: sentences in, output sentences out.
//!
//! ```text
//! Request ──split_sentences──▶ [s1, s2, ..]
//!                                │ for each sentence
//!                                ├─ build_input_path(s, that, topic)
//!                                ├─ Graphmaster::evaluate_within   (deadline polled)
//!                                ├─ process_template               (deadline polled)
//!                                └─ push output sentence (if non-empty)
//!                                ▼
//!                             ChatResult
//! ```
//!
//! A failing template is logged and contributes nothing; the remaining
//! sentences are still answered. `that` is fixed for the whole request: it is
//! the last sentence of the user's latest stored result, and redirect children
//! do not store results.

use super::interpreter::process_template;
use super::metrics::{SentenceMetrics, TurnMetrics};
use super::normalize::{build_input_path, split_sentences};
use super::request::{ChatResult, Request, SubQuery};
use crate::api::Bot;
use crate::tags::TagContext;
use crate::user::User;
use std::time::Instant;

/// The root turn a redirect child answers to.
#[derive(Clone, Copy)]
pub(crate) struct TurnRef<'a> {
    pub result: &'a ChatResult,
    pub sentence: usize,
}

/// Evaluate `request` for `user`.
///
/// `parent` is `None` for a root request; the result under construction then
/// serves as the turn seen by history tags.
pub(crate) fn run_request(
    bot: &Bot,
    request: &mut Request,
    user: &mut User,
    parent: Option<TurnRef<'_>>,
    metrics: &mut TurnMetrics,
) -> ChatResult {
    let settings = bot.settings();
    request.begin();
    metrics.max_depth = metrics.max_depth.max(request.depth());

    let mut result = ChatResult::with_settings(request.raw_input.clone(), settings);
    result.input_sentences = split_sentences(&request.raw_input, &settings.sentence_splitters);
    let that = user.last_output_sentence().unwrap_or("").to_string();

    for index in 0..result.input_sentences.len() {
        if request.check_deadline() {
            break;
        }

        let path = build_input_path(&result.input_sentences[index], &that, user.topic(), &settings.substitutions.normal);
        log::debug!("depth {} path: {path}", request.depth());

        let started = Instant::now();
        let query = bot.graphmaster().evaluate_within(&path, request);
        let matching = started.elapsed();

        let started = Instant::now();
        let output = if query.is_match() && !request.has_timed_out() {
            let turn = parent.unwrap_or(TurnRef { result: &result, sentence: index });
            answer(bot, request, user, &query, turn, metrics)
        } else {
            if !query.is_match() {
                log::debug!("no category matched \"{path}\"");
            }
            String::new()
        };
        let processing = started.elapsed();

        if metrics.record_sentences && parent.is_none() {
            metrics.sentences.push(SentenceMetrics {
                path: path.clone(),
                pattern: query.pattern.clone(),
                source: query.source.clone(),
                input_star: query.input_star.clone(),
                matching,
                processing,
                output: output.clone(),
            });
        }

        result.normalized_paths.push(path);
        result.sub_queries.push(query);
        if !output.trim().is_empty() {
            result.output_sentences.push(output);
        }
    }

    request.check_deadline();
    request.complete();
    result.duration = request.deadline().elapsed();
    result.timed_out = request.has_timed_out();
    result
}

fn answer(
    bot: &Bot,
    request: &mut Request,
    user: &mut User,
    query: &SubQuery,
    turn: TurnRef<'_>,
    metrics: &mut TurnMetrics,
) -> String {
    let mut ctx = TagContext { bot, user, request, query, turn: turn.result, sentence: turn.sentence, metrics };
    match process_template(&query.template, &mut ctx) {
        Ok(text) => text,
        Err(err) => {
            log::error!("template of \"{}\" failed: {err}", query.pattern);
            String::new()
        }
    }
}

/// Evaluate `text` as a child of the request in `ctx` and return the child's
/// output sentences joined by spaces.
///
/// Past the configured depth cap the redirect is refused and yields nothing.
pub(crate) fn redirect(text: &str, ctx: &mut TagContext<'_>) -> String {
    let cap = ctx.bot.settings().redirect_depth_cap();
    if ctx.request.depth() >= cap {
        log::warn!("redirect depth {cap} reached, dropping \"{text}\"");
        return String::new();
    }
    if ctx.request.has_timed_out() {
        return String::new();
    }

    ctx.metrics.redirects += 1;
    let mut child = ctx.request.child(text);
    let parent = TurnRef { result: ctx.turn, sentence: ctx.sentence };
    let sub = run_request(ctx.bot, &mut child, ctx.user, Some(parent), ctx.metrics);
    ctx.request.absorb(&child);
    sub.output_sentences.join(" ")
}
