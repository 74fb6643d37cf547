//! Bot - Registration facade and host loop
//!
//! `Bot` owns the dispatcher, the scheduler and the shared state. Commands,
//! middleware and jobs are registered up front; `run` then drives a
//! `Transport` until it closes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use super::errors::BotError;
use super::messaging::help::{help_handler, HELP_TEMPLATE};
use super::messaging::{Dispatch, Middleware, MessageDispatcher, RateLimitMiddleware};
use super::scheduling::{Schedule, ScheduledJob, Scheduler};
use crate::domain::entities::{CommandOptions, Context, Handler, HandlerResult, Message, OutboundAction, OutgoingMessage, State};
use crate::domain::traits::{Inbound, Transport};
use crate::infrastructure::config::Config;

const IDLE_BACKOFF: Duration = Duration::from_millis(100);

/// Sender for outbound actions that do not answer an inbound message,
/// e.g. posts from scheduled jobs.
#[derive(Clone, Debug)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<OutboundAction>,
}

impl Outbox {
    pub fn send(&self, action: OutboundAction) -> Result<(), BotError> {
        self.tx
            .send(action)
            .map_err(|_| BotError::Transport("Outbox is closed".to_string()))
    }

    pub fn send_text(&self, channel: impl Into<String>, text: impl Into<String>) -> Result<(), BotError> {
        self.send(OutboundAction::SendMessage(OutgoingMessage::text(channel, text)))
    }
}

/// The bot application
pub struct Bot {
    config: Config,
    dispatcher: MessageDispatcher,
    scheduler: Scheduler,
    outbox_tx: mpsc::UnboundedSender<OutboundAction>,
    outbox_rx: mpsc::UnboundedReceiver<OutboundAction>,
}

impl Bot {
    pub fn new(config: Config) -> Result<Self, BotError> {
        let mut dispatcher = MessageDispatcher::new(config.bot.prefix.clone());

        if let Some(limit) = &config.security.rate_limit {
            dispatcher.add_middleware(RateLimitMiddleware::new(limit.max_requests, limit.window_seconds));
        }

        if config.bot.register_help_command {
            dispatcher.register_command(
                HELP_TEMPLATE,
                help_handler(config.bot.base_help_text.clone()),
                CommandOptions::new(),
            )?;
        }

        let (outbox_tx, outbox_rx) = mpsc::unbounded_channel();
        Ok(Self {
            config,
            dispatcher,
            scheduler: Scheduler::new(),
            outbox_tx,
            outbox_rx,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register a command with default options
    pub fn command(&mut self, template: &str, handler: Handler) -> Result<(), BotError> {
        self.command_with(template, handler, CommandOptions::new())
    }

    pub fn command_with(&mut self, template: &str, handler: Handler, options: CommandOptions) -> Result<(), BotError> {
        self.dispatcher.register_command(template, handler, options)?;
        Ok(())
    }

    /// Add an alternate template to the most recently registered command
    pub fn alias(&mut self, template: &str) -> Result<(), BotError> {
        self.dispatcher.register_alias(template)?;
        Ok(())
    }

    pub fn middleware<M: Middleware + 'static>(&mut self, middleware: M) {
        self.dispatcher.add_middleware(middleware);
    }

    /// Handle messages no command matched
    pub fn fallback<F>(&mut self, fallback: F)
    where
        F: Fn(&Context<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.dispatcher.set_fallback(fallback);
    }

    /// Run `job` on `schedule`. The first run is one schedule interval from now.
    pub fn scheduled<F>(&mut self, name: &str, schedule: Schedule, job: F) -> Result<(), BotError>
    where
        F: Fn() -> Result<(), BotError> + Send + Sync + 'static,
    {
        self.scheduler.add_job(ScheduledJob::new(name, schedule, job))?;
        Ok(())
    }

    pub fn outbox(&self) -> Outbox {
        Outbox {
            tx: self.outbox_tx.clone(),
        }
    }

    pub fn state(&self) -> &State {
        self.dispatcher.state()
    }

    pub fn state_mut(&mut self) -> &mut State {
        self.dispatcher.state_mut()
    }

    pub fn dispatcher(&self) -> &MessageDispatcher {
        &self.dispatcher
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    /// Dispatch one message without a transport
    pub fn dispatch(&self, message: Message) -> Dispatch {
        self.dispatcher.dispatch(message)
    }

    /// Drive `transport` until it reports the connection closed.
    ///
    /// Scheduled jobs are polled on a background task and outbox actions are
    /// sent from another; inbound messages are dispatched one at a time.
    pub async fn run<T: Transport + 'static>(self, transport: Arc<T>) -> Result<(), BotError> {
        let Bot {
            config,
            dispatcher,
            scheduler,
            outbox_tx,
            mut outbox_rx,
        } = self;
        drop(outbox_tx);

        transport.start().await?;
        let info = transport.bot_info();
        tracing::info!("{} connected as {} ({})", config.bot.name, info.name, info.id);

        let poll = Duration::from_millis(config.scheduler.poll_interval_ms.max(1));
        let ticker = tokio::spawn(poll_scheduler(scheduler, poll));

        let outbox = {
            let transport = Arc::clone(&transport);
            tokio::spawn(async move {
                while let Some(action) = outbox_rx.recv().await {
                    if let Err(e) = transport.perform(&action).await {
                        tracing::error!("Failed to send to {}: {}", action.channel(), e);
                    }
                }
            })
        };

        let result = loop {
            match transport.next_message().await {
                Ok(Inbound::Message(message)) => {
                    let outcome = dispatcher.dispatch(message);
                    if let Some(action) = outcome.action() {
                        if let Err(e) = transport.perform(action).await {
                            tracing::error!("Failed to send to {}: {}", action.channel(), e);
                        }
                    }
                }
                Ok(Inbound::Idle) => tokio::time::sleep(IDLE_BACKOFF).await,
                Ok(Inbound::Closed) => {
                    tracing::info!("Transport closed, stopping");
                    break Ok(());
                }
                Err(e) => break Err(e),
            }
        };

        ticker.abort();
        outbox.abort();
        result
    }
}

/// Poll the scheduler every `period`. The scheduler moves onto the blocking
/// pool for each pass and comes back, so passes never overlap.
async fn poll_scheduler(mut scheduler: Scheduler, period: Duration) {
    if scheduler.is_empty() {
        return;
    }
    tracing::info!("Scheduler started with {} jobs", scheduler.len());

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        scheduler = match tokio::task::spawn_blocking(move || {
            scheduler.run_pending();
            scheduler
        })
        .await
        {
            Ok(scheduler) => scheduler,
            Err(e) => {
                tracing::error!("Scheduler pass failed: {}", e);
                return;
            }
        };
    }
}
