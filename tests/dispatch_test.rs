//! Dispatch Integration Tests
//! Run with: cargo test --test dispatch_test

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use phial::{
    ArgumentError, Bot, BotError, CommandError, CommandOptions, Config, Dispatch, Handler, Message, OutboundAction,
    Param, Reply,
};

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

fn message(text: &str) -> Message {
    Message::new(text, "general", "alice", "1700000000.000100")
}

fn bot() -> Bot {
    let mut config = Config::default();
    config.bot.register_help_command = false;
    Bot::new(config).unwrap()
}

fn counting(name: &str, counter: &Arc<AtomicUsize>) -> Handler {
    let counter = Arc::clone(counter);
    Handler::new(name, move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Reply::Nothing)
    })
}

fn adder() -> Handler {
    Handler::new("add", |_, args| {
        Ok((args.int("x").unwrap_or_default() + args.int("y").unwrap_or_default()).to_string())
    })
    .param(Param::int("x"))
    .param(Param::int("y").with_default(5))
}

#[test]
fn add_uses_default_for_missing_trailing_argument() {
    ensure_init();
    let mut bot = bot();
    bot.command("add <x> <y>", adder()).unwrap();

    assert_eq!(bot.dispatch(message("!add 3")).reply_text(), Some("8"));
    assert_eq!(bot.dispatch(message("!add 3 4")).reply_text(), Some("7"));
    assert_eq!(bot.dispatch(message("!ADD 1 1")).reply_text(), Some("2"));
}

fn greeter() -> Handler {
    Handler::new("greet", |_, args| Ok(format!("hi {}", args.str("name").unwrap_or_default())))
        .param(Param::str("name").with_default("there"))
}

#[test]
fn single_optional_argument_can_be_left_out() {
    ensure_init();
    let mut bot = bot();
    bot.command("greet <name>", greeter()).unwrap();

    assert_eq!(bot.dispatch(message("!greet")).reply_text(), Some("hi there"));
    assert_eq!(bot.dispatch(message("!greet bob")).reply_text(), Some("hi bob"));
    assert_eq!(bot.dispatch(message("!greetings")), Dispatch::Unmatched);
}

#[test]
fn empty_message_does_not_match_optional_command_without_prefix() {
    ensure_init();
    let mut config = Config::default();
    config.bot.prefix = String::new();
    config.bot.register_help_command = false;
    let mut bot = Bot::new(config).unwrap();
    bot.command("greet <name>", greeter()).unwrap();

    assert_eq!(bot.dispatch(message("")), Dispatch::Unmatched);
    assert_eq!(bot.dispatch(message("greet")).reply_text(), Some("hi there"));
}

#[test]
fn panicking_handler_is_reported_as_failure() {
    ensure_init();
    let mut bot = bot();
    bot.command("explode", Handler::new("explode", |_, _| -> Result<Reply, BotError> { panic!("kaboom") }))
        .unwrap();
    bot.command("add <x> <y>", adder()).unwrap();

    let outcome = bot.dispatch(message("!explode"));
    assert!(matches!(outcome, Dispatch::Failed { .. }));
    assert!(outcome.action().is_none());
    assert_eq!(bot.dispatch(message("!add 1 1")).reply_text(), Some("2"));
}

#[test]
fn conversion_failure_is_sent_back() {
    ensure_init();
    let mut bot = bot();
    bot.command(
        "age <age>",
        Handler::new("age", |_, args| Ok(format!("You are {}", args.int("age").unwrap_or_default())))
            .param(Param::int("age")),
    )
    .unwrap();

    assert_eq!(bot.dispatch(message("!age 30")).reply_text(), Some("You are 30"));

    let expected = ArgumentError::Type { value: "old".into(), target: "int".into() }.to_string();
    assert_eq!(expected, "old could not be converted to int");
    assert_eq!(bot.dispatch(message("!age old")).reply_text(), Some(expected.as_str()));
}

#[test]
fn missing_required_argument_is_sent_back() {
    ensure_init();
    let mut bot = bot();
    bot.command(
        "greet",
        Handler::new("greet", |_, _| Ok("hello")).param(Param::str("name")),
    )
    .unwrap();

    assert_eq!(
        bot.dispatch(message("!greet")).reply_text(),
        Some("Parameter name not provided to greet")
    );
}

#[test]
fn halting_middleware_stops_everything() {
    ensure_init();
    let commands = Arc::new(AtomicUsize::new(0));
    let fallbacks = Arc::new(AtomicUsize::new(0));
    let later = Arc::new(AtomicUsize::new(0));

    let mut bot = bot();
    bot.command("ping", counting("ping", &commands)).unwrap();
    {
        let fallbacks = Arc::clone(&fallbacks);
        bot.fallback(move |_| {
            fallbacks.fetch_add(1, Ordering::SeqCst);
            Ok(Reply::Nothing)
        });
    }
    bot.middleware(|_message: Message| -> Option<Message> { None });
    {
        let later = Arc::clone(&later);
        bot.middleware(move |message: Message| {
            later.fetch_add(1, Ordering::SeqCst);
            Some(message)
        });
    }

    assert_eq!(bot.dispatch(message("!ping")), Dispatch::Intercepted);
    assert_eq!(bot.dispatch(message("!unknown")), Dispatch::Intercepted);
    assert_eq!(commands.load(Ordering::SeqCst), 0);
    assert_eq!(fallbacks.load(Ordering::SeqCst), 0);
    assert_eq!(later.load(Ordering::SeqCst), 0);
}

#[test]
fn middleware_runs_in_registration_order() {
    ensure_init();
    let mut bot = bot();
    bot.command(
        "echo <text>",
        Handler::new("echo", |_, args| Ok(args.str("text").unwrap_or_default().to_string()))
            .param(Param::str("text")),
    )
    .unwrap();
    bot.middleware(|message: Message| {
        let text = format!("{} one", message.text);
        Some(message.with_text(text))
    });
    bot.middleware(|message: Message| {
        let text = format!("{} two", message.text);
        Some(message.with_text(text))
    });

    assert_eq!(bot.dispatch(message("!echo zero")).reply_text(), Some("zero one two"));
}

#[test]
fn duplicate_registration_fails() {
    ensure_init();
    let mut bot = bot();
    bot.command("ping", Handler::new("ping", |_, _| Ok("pong"))).unwrap();

    let err = bot.command("ping", Handler::new("ping2", |_, _| Ok("pong"))).unwrap_err();
    assert!(matches!(err, BotError::Command(CommandError::Duplicate(ref t)) if t == "!ping"));
    assert_eq!(err.to_string(), "Command error: Command !ping already exists");
}

#[test]
fn first_registered_command_wins() {
    ensure_init();
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    let mut bot = bot();
    bot.command("say <anything>", counting("first", &first).param(Param::str("anything")))
        .unwrap();
    bot.command("say hi", counting("second", &second)).unwrap();

    bot.dispatch(message("!say hi"));
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 0);
}

#[test]
fn primary_pattern_is_tried_before_aliases() {
    ensure_init();
    let mut bot = bot();
    bot.command(
        "greet <name>",
        Handler::new("greet", |_, args| Ok(format!("Hello {}", args.str("name").unwrap_or_default())))
            .param(Param::str("name")),
    )
    .unwrap();
    bot.alias("greet <name> please").unwrap();
    bot.alias("hey <name>").unwrap();

    assert_eq!(bot.dispatch(message("!greet bob please")).reply_text(), Some("Hello bob please"));
    assert_eq!(bot.dispatch(message("!hey bob")).reply_text(), Some("Hello bob"));
}

#[test]
fn quoted_arguments() {
    ensure_init();
    let mut bot = bot();
    bot.command(
        "hi <name>",
        Handler::new("hi", |_, args| Ok(format!("Hi {}", args.str("name").unwrap_or_default())))
            .param(Param::str("name")),
    )
    .unwrap();

    assert_eq!(bot.dispatch(message("!hi \"Bob Smith\"")).reply_text(), Some("Hi Bob Smith"));
    assert_eq!(bot.dispatch(message("!hi Bob Smith")).reply_text(), Some("Hi Bob Smith"));
}

#[test]
fn case_sensitive_commands() {
    ensure_init();
    let mut bot = bot();
    bot.command_with("Ping", Handler::new("ping", |_, _| Ok("pong")), CommandOptions::new().case_sensitive())
        .unwrap();

    assert_eq!(bot.dispatch(message("!Ping")).reply_text(), Some("pong"));
    assert_eq!(bot.dispatch(message("!ping")), Dispatch::Unmatched);
}

#[test]
fn bot_messages_and_missing_prefix_are_skipped() {
    ensure_init();
    let calls = Arc::new(AtomicUsize::new(0));
    let mut bot = bot();
    bot.command("ping", counting("ping", &calls)).unwrap();

    assert_eq!(bot.dispatch(message("!ping").with_bot_id("B01")), Dispatch::FromBot);
    assert_eq!(bot.dispatch(message("ping")), Dispatch::MissingPrefix);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn fallback_gets_unmatched_messages() {
    ensure_init();
    let mut bot = bot();
    bot.fallback(|ctx| Ok(ctx.reply_in_thread(format!("Unknown: {}", ctx.message().text)).into()));

    let outcome = bot.dispatch(message("!nope"));
    match outcome.action() {
        Some(OutboundAction::SendMessage(sent)) => {
            assert_eq!(sent.text.as_deref(), Some("Unknown: !nope"));
            assert_eq!(sent.thread_ts.as_deref(), Some("1700000000.000100"));
        }
        other => panic!("unexpected action {:?}", other),
    }
}

#[test]
fn help_lists_visible_commands() {
    ensure_init();
    let mut bot = Bot::new(Config::default()).unwrap();
    bot.command("ping", Handler::new("ping", |_, _| Ok("pong")).describe("Check the bot\n   is alive"))
        .unwrap();
    bot.command_with(
        "secret",
        Handler::new("secret", |_, _| Ok("shh")).describe("Hidden"),
        CommandOptions::new().hidden(),
    )
    .unwrap();
    bot.command_with(
        "add <x> <y>",
        adder().describe("Ignored"),
        CommandOptions::new().help("Add numbers"),
    )
    .unwrap();

    assert_eq!(
        bot.dispatch(message("!help")).reply_text(),
        Some(
            "All available commands:\n\
             *!help* - List all available commands\n\
             *!ping* - Check the bot is alive\n\
             *!add <x> <y>* - Add numbers\n"
        )
    );
}

#[test]
fn handler_failure_sends_nothing() {
    ensure_init();
    let mut bot = bot();
    bot.command("fail", Handler::new("fail", |_, _| Err::<Reply, _>(BotError::handler("boom"))))
        .unwrap();

    let outcome = bot.dispatch(message("!fail"));
    assert!(matches!(outcome, Dispatch::Failed { .. }));
    assert!(outcome.action().is_none());
}
