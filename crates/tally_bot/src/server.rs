//! Bot server: wires the stream, dispatcher, queue, digest and status API.

use std::sync::Arc;
use std::time::Duration;
use tally_actions::{BotContext, default_rules};
use tally_core::NormalizedEvent;
use tally_database::MemoryCounterStore;
use tally_error::{ConfigError, TallyResult};
use tally_interface::{Action, CounterStore, SocialClient};
use tally_pipeline::{ActionScheduler, EventDispatcher, MatchCandidate};
use tally_social::{DEFAULT_USER_AGENT, HttpFortuneClient, MastodonClient, build_http_client};
use tally_stream::{Backoff, ConnectionSupervisor, MastodonDecoder, WebSocketConnector};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, instrument, warn};

use crate::api::{ApiState, serve};
use crate::{BotConfig, BotStatus, DigestJob, DryRunSocialClient, StatusSink};

/// Runs the bot until shutdown.
///
/// Startup order: validate configuration, build the clients and counter
/// store, resolve owner ids, compile the rules, then start the queue, the
/// digest job, the optional status API and finally the stream supervisor.
/// On shutdown the supervisor stops reading and queued actions drain
/// before [`BotServer::run`] returns.
pub struct BotServer {
    config: BotConfig,
    dry_run: bool,
    status: BotStatus,
}

impl BotServer {
    /// Create a server for `config`.
    pub fn new(config: BotConfig) -> Self {
        Self {
            config,
            dry_run: false,
            status: BotStatus::new(),
        }
    }

    /// Log writes instead of sending them, and keep counts in memory.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Status collector fed by the running server.
    pub fn status(&self) -> &BotStatus {
        &self.status
    }

    /// Validate configuration and compile the rules without touching the network.
    ///
    /// Returns the rule names in priority order.
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid or a rule fails to compile.
    pub fn check(&self) -> TallyResult<Vec<String>> {
        self.config.validate()?;
        let ctx = self.offline_context()?;
        let rules = default_rules(&self.config.rules, ctx)?;
        Ok(rules.iter().map(|rule| rule.name().to_string()).collect())
    }

    /// Rules that would run for `event`, in execution order. Nothing is executed.
    ///
    /// # Errors
    ///
    /// Returns error if a rule fails to compile.
    pub async fn plan(&self, event: NormalizedEvent) -> TallyResult<Vec<MatchCandidate>> {
        let ctx = self.offline_context()?;
        let rules = default_rules(&self.config.rules, ctx)?;
        let scheduler = Arc::new(ActionScheduler::default());
        let dispatcher = EventDispatcher::new(rules, Arc::clone(&scheduler));
        let plan = dispatcher.plan(&Arc::new(event));
        scheduler.shutdown().await;
        Ok(plan)
    }

    /// Run until `shutdown` turns true.
    ///
    /// # Errors
    ///
    /// Returns error if startup fails. Runtime failures of the stream, actions
    /// or digest are logged and retried, never returned.
    #[instrument(skip_all, fields(dry_run = self.dry_run))]
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> TallyResult<()> {
        self.config.validate()?;
        let mastodon = &self.config.mastodon;
        info!(server = %mastodon.server_url, stream = %mastodon.stream, "Starting tally bot");

        let http = build_http_client(
            Duration::from_secs(self.config.http.timeout_secs),
            self.config
                .http
                .user_agent
                .as_deref()
                .unwrap_or(DEFAULT_USER_AGENT),
        )?;

        let mut social: Arc<dyn SocialClient> = Arc::new(MastodonClient::new(
            http.clone(),
            &mastodon.server_url,
            &mastodon.access_token,
        ));
        if self.dry_run {
            warn!("Dry run: statuses and profile updates are logged, not sent");
            social = Arc::new(DryRunSocialClient::new(social));
        }

        let counters = self.counter_store().await?;
        let owner_ids = self.owner_ids(social.as_ref()).await?;
        info!(owners = owner_ids.len(), "Owner accounts resolved");

        let ctx = Arc::new(
            BotContext::new(social, counters, Arc::new(HttpFortuneClient::new(http)))
                .with_owner_ids(owner_ids)
                .with_reply_limit(self.config.rules.reply_limit),
        );
        let rules = default_rules(&self.config.rules, Arc::clone(&ctx))?;
        info!(rules = rules.len(), "Rules compiled");

        let scheduler = Arc::new(ActionScheduler::new(
            self.config.scheduler.action_timeout(),
        ));
        let dispatcher = Arc::new(EventDispatcher::new(rules, Arc::clone(&scheduler)));

        let digest = if self.config.digest.enabled {
            let job = DigestJob::new(
                &self.config.digest.cron,
                Arc::clone(&ctx),
                Arc::clone(&scheduler),
            )?
            .with_visibility(self.config.digest.visibility);
            Some(tokio::spawn(job.run(shutdown.clone())))
        } else {
            None
        };

        let api = if self.config.api.enabled {
            let listener = TcpListener::bind(&self.config.api.bind)
                .await
                .map_err(|e| {
                    ConfigError::new(format!(
                        "Failed to bind status API on {}: {}",
                        self.config.api.bind, e
                    ))
                })?;
            let state = ApiState::new(self.status.clone());
            let api_shutdown = shutdown.clone();
            Some(tokio::spawn(async move {
                if let Err(e) = serve(listener, state, api_shutdown).await {
                    error!(error = %e, "Status API failed");
                }
            }))
        } else {
            None
        };

        let connector = Arc::new(WebSocketConnector::new(
            &mastodon.server_url,
            &mastodon.access_token,
            &mastodon.stream,
        )?);
        let decoder = Arc::new(MastodonDecoder::new(mastodon.ignore_application.clone()));
        let sink = Arc::new(StatusSink::new(dispatcher, self.status.clone()));

        let (lifecycle_tx, lifecycle_rx) = mpsc::unbounded_channel();
        let follower = tokio::spawn(self.status.clone().follow(lifecycle_rx));

        ConnectionSupervisor::new(connector, decoder, sink)
            .with_backoff(Backoff::new(
                self.config.stream.initial_backoff(),
                self.config.stream.max_backoff(),
            ))
            .with_lifecycle(lifecycle_tx)
            .run(shutdown)
            .await;

        if let Some(digest) = digest {
            if let Err(e) = digest.await {
                error!(error = %e, "Digest job ended abnormally");
            }
        }

        info!(pending = scheduler.pending(), "Draining action queue");
        scheduler.shutdown().await;

        if let Some(api) = api {
            if let Err(e) = api.await {
                error!(error = %e, "Status API task ended abnormally");
            }
        }
        if let Err(e) = follower.await {
            error!(error = %e, "Status follower ended abnormally");
        }

        info!("Tally bot stopped");
        Ok(())
    }

    async fn owner_ids(&self, social: &dyn SocialClient) -> TallyResult<Vec<String>> {
        if !self.config.mastodon.owner_ids.is_empty() {
            return Ok(self.config.mastodon.owner_ids.clone());
        }
        let account = social.verify_credentials().await?;
        info!(account = %account.acct(), "No owners configured, using the bot account");
        Ok(vec![account.id().clone()])
    }

    async fn counter_store(&self) -> TallyResult<Arc<dyn CounterStore>> {
        match self.config.database.url.as_deref() {
            Some(url) if !self.dry_run => {
                connect_postgres(url, self.config.database.pool_size).await
            }
            Some(_) => {
                warn!("Dry run: counts are kept in memory");
                Ok(Arc::new(MemoryCounterStore::new()))
            }
            None => {
                info!("No database configured, counts are kept in memory");
                Ok(Arc::new(MemoryCounterStore::new()))
            }
        }
    }

    /// Context whose clients are built but never called.
    fn offline_context(&self) -> TallyResult<Arc<BotContext>> {
        let http = build_http_client(
            Duration::from_secs(self.config.http.timeout_secs),
            DEFAULT_USER_AGENT,
        )?;
        let social = Arc::new(MastodonClient::new(
            http.clone(),
            &self.config.mastodon.server_url,
            &self.config.mastodon.access_token,
        ));
        Ok(Arc::new(
            BotContext::new(
                social,
                Arc::new(MemoryCounterStore::new()),
                Arc::new(HttpFortuneClient::new(http)),
            )
            .with_owner_ids(self.config.mastodon.owner_ids.clone())
            .with_reply_limit(self.config.rules.reply_limit),
        ))
    }
}

#[cfg(feature = "postgres")]
async fn connect_postgres(url: &str, pool_size: u32) -> TallyResult<Arc<dyn CounterStore>> {
    let store = tally_database::PgCounterStore::connect(url, pool_size)?;
    store.run_migrations().await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "postgres"))]
async fn connect_postgres(_url: &str, _pool_size: u32) -> TallyResult<Arc<dyn CounterStore>> {
    Err(ConfigError::new(
        "database.url is set but tally was built without the `postgres` feature",
    ))?
}
