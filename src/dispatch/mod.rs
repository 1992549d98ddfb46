//! The command dispatch pipeline.
//!
//! A [`Dispatcher`] takes inbound [`MessageEvent`]s and runs each one through a fixed
//! sequence of stages. Every stage except the executor is a strategy object that the host
//! may replace independently.
//!
//! # Pipeline
//!
//! ```text
//! MessageEvent
//!      │
//!      ▼
//! EventPreprocessor ── no prefix, unknown command ► dropped
//!      │ CommandSpec + CommandInvocation
//!      ▼
//! AuthorizationGate ── guild-only / owner-only ───► dropped
//!      │            └─ missing bot permissions ───► ResultProcessor::process_missing_permissions
//!      ▼
//! execute ──────────── platform refused action ───► ResultProcessor::process_missing_permissions
//!      │ CommandResult
//!      ▼
//! ResultProcessor::process_result ──► MessagingFallback ──► Platform
//! ```
//!
//! # Concurrency
//!
//! Events are independent: [`Dispatcher::spawn`] and [`Dispatcher::run`] process each one
//! on its own task. The registry, the settings and the bot owner are shared by all of them
//! and may change while events are in flight; a single event always sees one consistent
//! snapshot of the registered commands.
//!
//! # Examples
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use commandeer::{
//! #     commands::{CommandCategory, CommandResult, CommandSpec, handler_fn},
//! #     config::Config,
//! #     dispatch::Dispatcher,
//! #     platform::{MessageEvent, Platform},
//! # };
//! # async fn example(platform: Arc<dyn Platform>) -> anyhow::Result<()> {
//! let config = Config::load("commandeer.yaml")?;
//! let dispatcher = Dispatcher::builder(platform)
//!     .config(config)
//!     .category(CommandCategory::single(CommandSpec::new(
//!         "ping",
//!         "Replies with pong",
//!         handler_fn(|_| Ok(CommandResult::message("pong"))),
//!     )))
//!     .build()
//!     .await?;
//!
//! let (sender, receiver) = tokio::sync::mpsc::channel::<MessageEvent>(64);
//! let handle = tokio::spawn(Arc::clone(&dispatcher).run(receiver));
//! // Feed `sender` from the platform gateway...
//! # drop(sender);
//! dispatcher.shutdown();
//! handle.await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use log::{debug, info};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};

use crate::{
    commands::{CommandCategory, CommandContext, CommandRegistry, Snapshot, help::help_category},
    config::Config,
    platform::{MessageEvent, Platform},
};

mod authorize;
mod executor;
mod fallback;
mod owner;
mod prefix;
mod preprocess;
pub mod responses;
mod result;
mod settings;

pub use authorize::{AuthorizationGate, AuthzDecision, DefaultAuthorizationGate};
pub use executor::{ExecutionOutcome, execute};
pub use fallback::{Delivery, MessagingFallback};
pub use owner::BotOwner;
pub use prefix::{DefaultPrefixResolver, PrefixResolver};
pub use preprocess::{DefaultEventPreprocessor, EventPreprocessor};
pub use result::{DefaultResultProcessor, ResultProcessor};
pub use settings::{OptOutPredicate, Settings};

/// Shared state visible to the pipeline stages while one event is processed.
pub struct DispatchScope<'a> {
    pub platform: &'a dyn Platform,
    /// Categories registered when the event entered the pipeline
    pub categories: &'a Snapshot,
    pub settings: &'a Settings,
    pub prefix_resolver: &'a dyn PrefixResolver,
    pub bot_owner: &'a BotOwner,
}

/// Host-facing command dispatcher.
///
/// Built with [`Dispatcher::builder`], shared behind an [`Arc`].
pub struct Dispatcher {
    platform: Arc<dyn Platform>,
    registry: CommandRegistry,
    settings: Settings,
    bot_owner: BotOwner,
    prefix_resolver: Box<dyn PrefixResolver>,
    event_preprocessor: Box<dyn EventPreprocessor>,
    authorization_gate: Box<dyn AuthorizationGate>,
    result_processor: Box<dyn ResultProcessor>,
    shutdown: watch::Sender<bool>,
}

impl Dispatcher {
    pub fn builder(platform: Arc<dyn Platform>) -> DispatcherBuilder {
        DispatcherBuilder::new(platform)
    }

    fn scope<'a>(&'a self, categories: &'a Snapshot) -> DispatchScope<'a> {
        DispatchScope {
            platform: &*self.platform,
            categories,
            settings: &self.settings,
            prefix_resolver: &*self.prefix_resolver,
            bot_owner: &self.bot_owner,
        }
    }

    /// Registers categories after the existing ones.
    pub fn add_categories(&self, categories: impl IntoIterator<Item = CommandCategory>) {
        self.registry.add_categories(categories);
    }

    /// Unregisters every category named `name`, returns how many were removed.
    pub fn remove_category(&self, name: &str) -> usize {
        self.registry.remove_category(name)
    }

    /// Returns the currently registered categories in registration order.
    pub fn categories(&self) -> Snapshot {
        self.registry.snapshot()
    }

    pub fn default_prefix(&self) -> String {
        self.settings.default_prefix()
    }

    pub fn set_default_prefix(&self, prefix: &str) {
        info!("default prefix set to {}", prefix);
        self.settings.set_default_prefix(prefix);
    }

    pub fn allow_mention_as_prefix(&self) -> bool {
        self.settings.allow_mention_as_prefix()
    }

    pub fn set_allow_mention_as_prefix(&self, allow: bool) {
        self.settings.set_allow_mention_as_prefix(allow);
    }

    /// Replaces the predicate deciding whether a message opted out of warning reactions.
    pub fn set_warning_opt_out<F>(&self, predicate: F)
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.settings.set_warning_opt_out(predicate);
    }

    pub fn bot_owner_id(&self) -> Option<String> {
        self.bot_owner.get()
    }

    /// Fetches the bot owner from the platform again.
    ///
    /// # Errors
    ///
    /// Returns the platform lookup error, the previous owner stays in place.
    pub async fn reload_bot_owner(&self) -> anyhow::Result<String> {
        self.bot_owner.reload(&*self.platform).await
    }

    /// Runs one event through the pipeline to completion.
    ///
    /// Does nothing once the dispatcher is shut down.
    pub async fn dispatch(&self, event: MessageEvent) {
        if self.is_shut_down() {
            debug!("dispatcher shut down, ignore message {}", event.message_id);
            return;
        }

        let categories = self.registry.snapshot();
        let scope = self.scope(&categories);

        let Some((command, invocation)) = self.event_preprocessor.preprocess(&event, &scope)
        else {
            return;
        };

        match self
            .authorization_gate
            .authorize(&command, &invocation, &scope)
        {
            AuthzDecision::Proceed => {}
            AuthzDecision::SilentlyDrop => return,
            AuthzDecision::MissingPermissions(missing) => {
                self.result_processor
                    .process_missing_permissions(&missing, &invocation, &scope);
                return;
            }
        }

        let context = CommandContext {
            invocation,
            platform: Arc::clone(&self.platform),
            categories: Arc::clone(&categories),
            bot_owner_id: self.bot_owner.get(),
        };

        match execute(&command, &context).await {
            ExecutionOutcome::Completed(result) => {
                self.result_processor
                    .process_result(result, &context.invocation, &scope)
            }
            ExecutionOutcome::MissingPermissions(missing) => self
                .result_processor
                .process_missing_permissions(&missing, &context.invocation, &scope),
        }
    }

    /// Runs one event through the pipeline on its own task.
    pub fn spawn(self: &Arc<Self>, event: MessageEvent) -> JoinHandle<()> {
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move { dispatcher.dispatch(event).await })
    }

    /// Consumes inbound events until shutdown or until every sender is dropped.
    ///
    /// Each event is processed on its own task; events already spawned keep running after
    /// this returns.
    pub async fn run(self: Arc<Self>, mut events: mpsc::Receiver<MessageEvent>) {
        let mut shutdown = self.shutdown.subscribe();
        info!("dispatcher started");

        loop {
            if self.is_shut_down() {
                break;
            }

            tokio::select! {
                biased;
                _ = shutdown.changed() => {}
                event = events.recv() => match event {
                    Some(event) => {
                        self.spawn(event);
                    }
                    None => {
                        info!("event stream closed");
                        break;
                    }
                },
            }
        }

        info!("dispatcher stopped");
    }

    /// Detaches the dispatcher from its event stream. Further events are ignored.
    pub fn shutdown(&self) {
        if !self.shutdown.send_replace(true) {
            info!("dispatcher shutting down");
        }
    }

    pub fn is_shut_down(&self) -> bool {
        *self.shutdown.borrow()
    }
}

/// Builder for a [`Dispatcher`].
///
/// Every strategy defaults to its `Default*` implementation and can be overridden on its
/// own.
pub struct DispatcherBuilder {
    platform: Arc<dyn Platform>,
    config: Config,
    categories: Vec<CommandCategory>,
    help_command: bool,
    prefix_resolver: Box<dyn PrefixResolver>,
    event_preprocessor: Box<dyn EventPreprocessor>,
    authorization_gate: Box<dyn AuthorizationGate>,
    result_processor: Box<dyn ResultProcessor>,
}

impl DispatcherBuilder {
    fn new(platform: Arc<dyn Platform>) -> Self {
        DispatcherBuilder {
            platform,
            config: Config::default(),
            categories: Vec::new(),
            help_command: true,
            prefix_resolver: Box::new(DefaultPrefixResolver),
            event_preprocessor: Box::new(DefaultEventPreprocessor),
            authorization_gate: Box::new(DefaultAuthorizationGate),
            result_processor: Box::new(DefaultResultProcessor),
        }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn category(mut self, category: CommandCategory) -> Self {
        self.categories.push(category);
        self
    }

    pub fn categories(mut self, categories: impl IntoIterator<Item = CommandCategory>) -> Self {
        self.categories.extend(categories);
        self
    }

    /// Registers the built-in help category before any other, enabled by default.
    pub fn help_command(mut self, enabled: bool) -> Self {
        self.help_command = enabled;
        self
    }

    pub fn prefix_resolver(mut self, resolver: impl PrefixResolver + 'static) -> Self {
        self.prefix_resolver = Box::new(resolver);
        self
    }

    pub fn event_preprocessor(mut self, preprocessor: impl EventPreprocessor + 'static) -> Self {
        self.event_preprocessor = Box::new(preprocessor);
        self
    }

    pub fn authorization_gate(mut self, gate: impl AuthorizationGate + 'static) -> Self {
        self.authorization_gate = Box::new(gate);
        self
    }

    pub fn result_processor(mut self, processor: impl ResultProcessor + 'static) -> Self {
        self.result_processor = Box::new(processor);
        self
    }

    /// Builds the dispatcher and loads the bot owner.
    ///
    /// The owner comes from [`Config::bot_owner_id`] when set, from the platform otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform cannot provide the application owner.
    pub async fn build(self) -> anyhow::Result<Arc<Dispatcher>> {
        let bot_owner = BotOwner::new();
        match &self.config.bot_owner_id {
            Some(id) => bot_owner.set(id),
            None => {
                bot_owner.reload(&*self.platform).await?;
            }
        }

        let registry = CommandRegistry::new();
        if self.help_command {
            registry.add_categories([help_category()]);
        }
        registry.add_categories(self.categories);

        let (shutdown, _) = watch::channel(false);

        info!(
            "dispatcher built with prefix {} (mention as prefix: {})",
            self.config.default_prefix, self.config.allow_mention_as_prefix
        );

        Ok(Arc::new(Dispatcher {
            platform: self.platform,
            registry,
            settings: Settings::from_config(&self.config),
            bot_owner,
            prefix_resolver: self.prefix_resolver,
            event_preprocessor: self.event_preprocessor,
            authorization_gate: self.authorization_gate,
            result_processor: self.result_processor,
            shutdown,
        }))
    }
}
