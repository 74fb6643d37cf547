use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use phial::infrastructure::adapters::ConsoleAdapter;
use phial::{
    Attachment, Bot, BotError, CommandOptions, Config, Handler, LoggingMiddleware, Param, Reply, Schedule,
};

#[derive(Parser)]
#[command(name = "phial")]
#[command(about = "A small chat bot framework", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Command prefix (overrides config)
    #[arg(short, long)]
    prefix: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot on the console
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

/// Number of messages the demo bot has greeted
#[derive(Default)]
struct Greeted(AtomicU64);

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run => run_bot(&cli.config, cli.prefix),
        Commands::Version => {
            println!("phial v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(config_path: &str) -> Config {
    if std::path::Path::new(config_path).exists() {
        Config::load(config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        Config::load_env()
    }
}

fn run_bot(config_path: &str, prefix_override: Option<String>) -> Result<(), BotError> {
    let mut config = load_config(config_path);
    if let Some(prefix) = prefix_override {
        config.bot.prefix = prefix;
    }
    if !config.console_enabled() {
        return Err(BotError::Internal("No adapter enabled in config".to_string()));
    }

    tracing::info!("Starting {}", config.bot.name);
    let name = config.bot.name.clone();

    let mut bot = Bot::new(config)?;
    bot.middleware(LoggingMiddleware);
    bot.state_mut().insert(Greeted::default());
    register_commands(&mut bot)?;
    register_jobs(&mut bot)?;

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| BotError::Internal(format!("Failed to start runtime: {}", e)))?;
    runtime.block_on(bot.run(Arc::new(ConsoleAdapter::new(name))))
}

fn register_commands(bot: &mut Bot) -> Result<(), BotError> {
    bot.command("ping", Handler::new("ping", |_, _| Ok("pong")).describe("Check the bot is alive"))?;

    bot.command(
        "hi <name>",
        Handler::new("hi", |ctx, args| {
            if let Some(greeted) = ctx.state().get::<Greeted>() {
                greeted.0.fetch_add(1, Ordering::Relaxed);
            }
            Ok(format!("Hi {}!", args.str("name").unwrap_or("there")))
        })
        .describe("Say hello to someone")
        .param(Param::str("name")),
    )?;
    bot.alias("hello <name>")?;

    bot.command(
        "add <x> <y>",
        Handler::new("add", |_, args| {
            let x = args.int("x").unwrap_or_default();
            let y = args.int("y").unwrap_or_default();
            Ok(x.saturating_add(y).to_string())
        })
        .describe(
            "Add two numbers.
             The second one defaults to 5.",
        )
        .param(Param::int("x"))
        .param(Param::int("y").with_default(5)),
    )?;

    bot.command("react", Handler::new("react", |ctx, _| Ok(ctx.react("wave"))).describe("React to this message"))?;

    bot.command(
        "thread <text>",
        Handler::new("thread", |ctx, args| Ok(ctx.reply_in_thread(args.str("text").unwrap_or_default())))
            .describe("Reply in a thread")
            .param(Param::str("text")),
    )?;

    bot.command(
        "whisper <text>",
        Handler::new("whisper", |ctx, args| {
            Ok(ctx.respond().with_text(args.str("text").unwrap_or_default()).ephemeral_to(ctx.user()))
        })
        .describe("Reply only to you")
        .param(Param::str("text")),
    )?;

    bot.command(
        "upload <filename>",
        Handler::new("upload", |ctx, args| {
            let filename = args.str("filename").unwrap_or("hello.txt");
            Ok(Attachment::new(ctx.channel(), filename, b"hello from phial\n".to_vec()))
        })
        .describe("Upload a small text file")
        .param(Param::str("filename")),
    )?;

    bot.command_with(
        "stats",
        Handler::new("stats", |ctx, _| {
            let greeted = ctx.state().get::<Greeted>().map_or(0, |g| g.0.load(Ordering::Relaxed));
            Ok(format!("Greeted {} times", greeted))
        }),
        CommandOptions::new().hidden(),
    )?;

    bot.command_with(
        "Shout <text>",
        Handler::new("shout", |_, args| Ok(args.str("text").unwrap_or_default().to_uppercase()))
            .param(Param::str("text")),
        CommandOptions::new().case_sensitive().help("Case sensitive: only `Shout` works"),
    )?;

    bot.fallback(|ctx| {
        let prefix = ctx.registry().prefix().unwrap_or("");
        Ok(Reply::from(format!(
            "Sorry, I don't know `{}`. Try `{}help`.",
            ctx.message().text,
            prefix
        )))
    });

    Ok(())
}

fn register_jobs(bot: &mut Bot) -> Result<(), BotError> {
    let outbox = bot.outbox();
    bot.scheduled("heartbeat", Schedule::new().every().minutes(5), move || {
        outbox.send_text("console", "Still here")
    })?;
    Ok(())
}

fn init_config() -> Result<(), BotError> {
    let yaml = Config::default().to_yaml()?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}
