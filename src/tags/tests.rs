use super::TagFlags;
use crate::api::Bot;
use crate::config::Settings;
use crate::engine::{Deadline, Request, RequestState};
use chrono::NaiveDateTime;
use pretty_assertions::assert_eq;
use std::time::{Duration, Instant};

const BRAIN: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<aiml version="1.0.1">
  <category><pattern>HELLO</pattern><template>Hi there</template></category>
  <category><pattern>HI</pattern><template><srai>HELLO</srai></template></category>
  <category><pattern>HEY *</pattern><template><sr/></template></category>
  <category>
    <pattern>MY NAME IS *</pattern>
    <template><think><set name="name"><star/></set></think>Nice to meet you <get name="name"/></template>
  </category>
  <category>
    <pattern>WHAT IS MY NAME</pattern>
    <template>
      <condition name="name">
        <li value="*">Your name is <get name="name"/></li>
        <li>I do not know your name</li>
      </condition>
    </template>
  </category>
  <category><pattern>FORGET ME</pattern><template><think><set name="name"></set></think>Forgotten</template></category>
  <category><pattern>WHAT IS YOUR NAME</pattern><template>My name is <bot name="name"/></template></category>
  <category><pattern>SHOUT *</pattern><template><uppercase><star/></uppercase></template></category>
  <category><pattern>WHISPER *</pattern><template><lowercase/></template></category>
  <category><pattern>FORMAL *</pattern><template><formal><star/></formal></template></category>
  <category><pattern>SENTENCE *</pattern><template><sentence><star/></sentence></template></category>
  <category><pattern>SAY * TO *</pattern><template><star index="2"/>, <star/></template></category>
  <category><pattern>I LIKE *</pattern><template>You like <person2><star/></person2></template></category>
  <category><pattern>TELL HIM *</pattern><template><gender/></template></category>
  <category><pattern>UNKNOWN</pattern><template><blink>plain</blink> text</template></category>
  <category><pattern>REMEMBER *</pattern><template><think><set name="thing"><star/></set></think>OK</template></category>
  <category><pattern>PICK</pattern><template><random><li>only</li></random></template></category>
  <category><pattern>MOOD</pattern><template><condition name="mood" value="happy">Yay</condition>Hmm</template></category>
  <category><pattern>I AM *</pattern><template><think><set name="mood"><star/></set></think>Noted</template></category>
  <category>
    <pattern>HOW AM I</pattern>
    <template><condition><li name="mood" value="happy">Glad</li><li name="mood" value="sad">Sorry</li><li>No idea</li></condition></template>
  </category>
  <category><pattern>ASK ME</pattern><template>Do you like cats?</template></category>
  <category><pattern>YES</pattern><that>Do you like cats?</that><template>Me too</template></category>
  <category><pattern>YES</pattern><template>Yes what</template></category>
  <category><pattern>REPEAT</pattern><template>You said <input index="2"/></template></category>
  <category><pattern>ECHO</pattern><template><input/></template></category>
  <category><pattern>WHAT DID YOU SAY</pattern><template>I said <that/></template></category>
  <category><pattern>AGAIN</pattern><template><output/></template></category>
  <category><pattern>SURE</pattern><that>Do you like *</that><template>I like <thatstar/> too</template></category>
  <category><pattern>THEY SAID *</pattern><template><person/></template></category>
  <category><pattern>GOSSIP *</pattern><template><gossip><star/></gossip>Heard</template></category>
  <category><pattern>ROLL</pattern><template><random><li>a</li><li>b</li><li>c</li></random></template></category>
  <category><pattern>STAR BAD *</pattern><template>[<star index="x"/>][<star index="5"/>]<star/></template></category>
  <category><pattern>LET US PLAY *</pattern><template><think><set name="topic">game <star/></set></think>Ready</template></category>
  <topic name="GAME *">
    <category><pattern>SCORE</pattern><template><topicstar/> is fun</template></category>
  </topic>
  <category><pattern>LOOP</pattern><template><srai>LOOP</srai></template></category>
  <category><pattern>LET US TALK ABOUT PETS</pattern><template><think><set name="topic">pets</set></think>Sure</template></category>
  <topic name="PETS">
    <category><pattern>*</pattern><template>We were talking about <get name="topic"/></template></category>
  </topic>
</aiml>"#;

fn brain(settings: Settings) -> Bot {
    let mut bot = Bot::new(settings);
    bot.learn_str(BRAIN, "brain.aiml").unwrap();
    bot
}

fn test_settings() -> Settings {
    Settings { max_redirect_depth: 16, ..Settings::default() }
}

#[test]
fn single_turn_examples() {
    // Array of (expected_output, input)
    let cases: Vec<(&str, &str)> = vec![
        ("Hi there.", "hello"),
        ("Hi there.", "Hello!"),
        ("Hi there.", "hi"),
        ("Hi there.", "hey hello"),
        ("Nice to meet you Ada.", "my name is Ada"),
        ("I do not know your name.", "What is my name?"),
        ("My name is Graphmaster.", "what's your name"),
        ("HELLO WORLD.", "shout hello world"),
        ("quiet please.", "whisper QUIET Please"),
        ("Ada Lovelace.", "formal ada LOVELACE"),
        ("Hello world.", "sentence hELLO wORLD"),
        ("Bob, hi.", "say hi to Bob"),
        ("You like your cat.", "I like my cat"),
        ("he is nice.", "tell him she is nice"),
        ("plain text.", "unknown"),
        ("OK.", "remember the milk"),
        ("only.", "pick"),
        ("Hmm.", "mood"),
        ("No idea.", "how am I"),
        ("Hi there. Hi there.", "hello. hi"),
        ("Hi there. echo.", "hello. echo"),
        ("he or she was happy.", "they said I was happy"),
        ("Heard.", "gossip the cat is out"),
        ("[][]ok.", "star bad ok"),
        ("", "sure"),
        ("", "nothing matches this"),
        ("", "loop"),
    ];

    let bot = brain(test_settings());
    for (expected, input) in cases {
        let mut user = bot.new_user("tester");
        let result = bot.chat(input, &mut user);
        assert_eq!(result.output(), expected, "input: {input}");
        assert!(!result.timed_out, "input: {input}");
    }
}

#[test]
fn predicates_persist_across_turns() {
    let bot = brain(test_settings());
    let mut user = bot.new_user("ada");

    bot.chat("my name is Ada", &mut user);
    assert_eq!(user.predicate("name"), "Ada");
    assert_eq!(bot.chat("what is my name", &mut user).output(), "Your name is Ada.");

    assert_eq!(bot.chat("forget me", &mut user).output(), "Forgotten.");
    assert_eq!(user.predicate("name"), "");
    assert_eq!(bot.chat("what is my name", &mut user).output(), "I do not know your name.");
}

#[test]
fn think_hides_output_but_keeps_side_effects() {
    let bot = brain(test_settings());
    let mut user = bot.new_user("u");
    assert_eq!(bot.chat("remember the milk", &mut user).output(), "OK.");
    assert_eq!(user.predicate("thing"), "the milk");
}

#[test]
fn multi_predicate_condition_follows_mood() {
    let bot = brain(test_settings());
    let mut user = bot.new_user("u");

    bot.chat("I am happy", &mut user);
    assert_eq!(bot.chat("how am I", &mut user).output(), "Glad.");
    bot.chat("I am SAD", &mut user);
    assert_eq!(bot.chat("how am I", &mut user).output(), "Sorry.");
    bot.chat("I am very sad", &mut user);
    assert_eq!(bot.chat("how am I", &mut user).output(), "No idea.");
}

#[test]
fn that_selects_the_follow_up_category() {
    let bot = brain(test_settings());
    let mut user = bot.new_user("u");

    assert_eq!(bot.chat("ask me", &mut user).output(), "Do you like cats?");
    assert_eq!(bot.chat("yes", &mut user).output(), "Me too.");
    assert_eq!(bot.chat("yes", &mut user).output(), "Yes what.");

    bot.chat("ask me", &mut user);
    assert_eq!(bot.chat("sure", &mut user).output(), "I like cats too.");
}

#[test]
fn random_picks_among_all_branches() {
    let bot = brain(test_settings());
    let mut user = bot.new_user("u");
    let mut seen = std::collections::BTreeSet::new();
    for _ in 0..100 {
        seen.insert(bot.chat("roll", &mut user).output());
    }
    let expected: std::collections::BTreeSet<String> = ["a.", "b.", "c."].iter().map(|s| s.to_string()).collect();
    assert_eq!(seen, expected);
}

#[test]
fn topic_categories_apply_after_topic_change() {
    let bot = brain(test_settings());
    let mut user = bot.new_user("u");

    assert_eq!(bot.chat("anything at all", &mut user).output(), "");
    assert_eq!(bot.chat("Let's talk about pets", &mut user).output(), "Sure.");
    assert_eq!(user.topic(), "pets");
    assert_eq!(bot.chat("anything at all", &mut user).output(), "We were talking about pets.");
    assert_eq!(bot.chat("hello", &mut user).output(), "Hi there.");

    assert_eq!(bot.chat("let us play chess", &mut user).output(), "Ready.");
    assert_eq!(user.topic(), "game chess");
    assert_eq!(bot.chat("score", &mut user).output(), "chess is fun.");
}

#[test]
fn history_tags_read_previous_turns() {
    let bot = brain(test_settings());
    let mut user = bot.new_user("u");

    bot.chat("hello", &mut user);
    assert_eq!(bot.chat("what did you say", &mut user).output(), "I said Hi there.");
    assert_eq!(bot.chat("repeat", &mut user).output(), "You said what did you say.");
    assert_eq!(bot.chat("again", &mut user).output(), "You said what did you say.");
}

#[test]
fn redirect_loops_stop_at_the_depth_cap() {
    let bot = brain(test_settings());
    let mut user = bot.new_user("u");
    let verbose = bot.chat_verbose("loop", &mut user);

    assert_eq!(verbose.result.output(), "");
    assert!(!verbose.result.timed_out);
    assert_eq!(verbose.metrics.redirects, 16);
    assert_eq!(verbose.metrics.max_depth, 16);
}

#[test]
fn zero_depth_setting_still_bounds_redirect_loops() {
    let bot = brain(Settings { max_redirect_depth: 0, timeout_ms: 500, ..Settings::default() });
    let mut user = bot.new_user("u");
    let verbose = bot.chat_verbose("loop", &mut user);

    assert_eq!(verbose.result.output(), "");
    assert!(!verbose.result.timed_out);
    assert_eq!(verbose.metrics.redirects, 1);
    assert_eq!(verbose.metrics.max_depth, 1);
}

#[test]
fn redirects_are_not_stored_as_turns() {
    let bot = brain(test_settings());
    let mut user = bot.new_user("u");
    bot.chat("hi", &mut user);
    bot.chat("hey hello", &mut user);

    assert_eq!(user.results().len(), 2);
    assert_eq!(user.result(0).unwrap().raw_input, "hey hello");
}

#[test]
fn expired_requests_answer_with_the_timeout_message() {
    let bot = brain(test_settings());
    let mut user = bot.new_user("u");
    let started = Instant::now().checked_sub(Duration::from_secs(1)).expect("monotonic clock too young for test");
    let mut request = Request::with_deadline("hello. hi", Deadline::starting_at(started, Duration::from_millis(10)));

    let result = bot.chat_request(&mut request, &mut user);
    assert!(result.timed_out);
    assert_eq!(request.state(), RequestState::TimedOut);
    assert!(result.output_sentences.is_empty());
    assert_eq!(result.output(), "ERROR: The request has timed out.");
    assert_eq!(user.results().len(), 1);
}

#[test]
fn broken_templates_only_silence_their_sentence() {
    let mut bot = brain(test_settings());
    bot.add_category("BROKEN", "", "", "<b>never closed").unwrap();
    let mut user = bot.new_user("u");

    let result = bot.chat("broken. hello", &mut user);
    assert_eq!(result.output(), "Hi there.");
    assert_eq!(result.sub_queries.len(), 2);
    assert!(result.sub_queries[0].is_match());
}

#[test]
fn bot_properties_and_metadata_tags() {
    let mut settings = test_settings();
    settings.bot.insert("master".to_string(), "Ada".to_string());
    settings.clock = NaiveDateTime::parse_from_str("2024-03-05T10:20:30", "%Y-%m-%dT%H:%M:%S").ok();
    let mut bot = brain(settings);
    bot.add_category("WHO MADE YOU", "", "", r#"<bot name="master"/> did"#).unwrap();
    bot.add_category("WHAT DAY IS IT", "", "", r#"<date format="%Y-%m-%d"/>"#).unwrap();
    bot.add_category("HOW BIG ARE YOU", "", "", "<size/> categories").unwrap();
    bot.add_category("VERSION", "", "", "v<version/>").unwrap();
    bot.add_category("WHO AM I", "", "", "<id/>").unwrap();
    let mut user = bot.new_user("u-42");

    assert_eq!(bot.chat("who made you", &mut user).output(), "Ada did.");
    assert_eq!(bot.chat("what day is it", &mut user).output(), "2024-03-05.");
    assert_eq!(bot.chat("how big are you", &mut user).output(), format!("{} categories.", bot.size()));
    assert_eq!(bot.chat("version", &mut user).output(), format!("v{}.", env!("CARGO_PKG_VERSION")));
    assert_eq!(bot.chat("who am I", &mut user).output(), "u-42.");
}

#[test]
fn registry_resolves_builtins_and_custom_tags() {
    let mut bot = brain(test_settings());
    let tags = bot.tags();
    assert!(tags.get("srai").is_some_and(|h| h.flags.contains(TagFlags::REDIRECT)));
    assert!(tags.get("condition").is_some_and(|h| !h.is_recursive()));
    assert!(tags.get("blink").is_none());

    bot.register_tag("Blink", TagFlags::RECURSIVE, |node, _ctx| Ok(format!("*{}*", node.inner_text())));
    assert!(bot.tags().names().contains(&"blink"));
    let mut user = bot.new_user("u");
    assert_eq!(bot.chat("unknown", &mut user).output(), "*plain* text.");
}
