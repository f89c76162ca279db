//! The [`FitnessBridge`] façade.

use std::sync::Arc;

use bridge_traits::{
    BridgeError, BroadcastHub, Clock, EventChannel, FitnessCapability, Listener,
    NativeWeightRecord,
};
use chrono::{DateTime, Utc};
use core_runtime::{BridgeConfig, TimeZonePolicy};
use tracing::{debug, info, instrument, warn};

use crate::dates::parse_date_string;
use crate::error::{FitnessError, Metric, Result};
use crate::models::{
    AuthorizationUpdate, DateRange, DistanceSample, SourcedSteps, StepHistoryUpdate,
    WeightQuery, WeightRecordRequest, WeightSample,
};
use crate::normalize::{
    normalize_distance_samples, normalize_step_sources, normalize_weight_samples,
};
use crate::subscriptions::{
    authorize_listener, history_listener, step_listener, Subscription, SubscriptionSet,
};
use crate::units::to_kilograms;

/// Application-facing entry point to the host fitness service.
///
/// Each operation is one delegated host call plus reshaping of the answer.
/// Subscriptions are tracked per instance; [`unsubscribe_listeners`]
/// releases only the listeners this bridge registered.
///
/// [`unsubscribe_listeners`]: FitnessBridge::unsubscribe_listeners
pub struct FitnessBridge {
    capability: Arc<dyn FitnessCapability>,
    broadcast: Arc<dyn BroadcastHub>,
    clock: Arc<dyn Clock>,
    time_zone: TimeZonePolicy,
    subscriptions: SubscriptionSet,
}

impl FitnessBridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            capability: config.capability,
            broadcast: config.broadcast,
            clock: config.clock,
            time_zone: config.time_zone,
            subscriptions: SubscriptionSet::default(),
        }
    }

    /// Build a bridge over `capability` with default broadcast hub, clock and zone.
    pub fn with_capability(capability: Arc<dyn FitnessCapability>) -> Result<Self> {
        let config = BridgeConfig::builder().capability(capability).build()?;
        Ok(Self::new(config))
    }

    /// Hub the bridge registers listeners on and the host emits to.
    pub fn broadcast(&self) -> Arc<dyn BroadcastHub> {
        Arc::clone(&self.broadcast)
    }

    pub fn time_zone(&self) -> TimeZonePolicy {
        self.time_zone
    }

    /// Run the platform consent flow.
    #[instrument(skip(self))]
    pub async fn authorize(&self) -> Result<bool> {
        info!("Requesting fitness authorization");
        let authorized = self
            .capability
            .authorize()
            .await
            .map_err(host_failure("authorize"))?;
        info!(authorized, "Authorization flow finished");
        Ok(authorized)
    }

    /// Daily step totals per data source.
    #[instrument(skip(self, range), fields(start_ms = range.start_ms(), end_ms = range.end_ms()))]
    pub async fn get_daily_step_count_samples(&self, range: DateRange) -> Result<Vec<SourcedSteps>> {
        let sources = self
            .capability
            .get_daily_step_count_samples(range.start_ms(), range.end_ms())
            .await
            .map_err(host_failure("get_daily_step_count_samples"))?;

        if sources.is_empty() {
            debug!("Host returned no step sources");
            return Err(FitnessError::NoData(Metric::Steps));
        }

        let shaped = normalize_step_sources(sources, self.time_zone);
        debug!(sources = shaped.len(), "Aggregated daily steps");
        Ok(shaped)
    }

    #[instrument(skip(self, range), fields(start_ms = range.start_ms(), end_ms = range.end_ms()))]
    pub async fn get_daily_distance_samples(&self, range: DateRange) -> Result<Vec<DistanceSample>> {
        let samples = self
            .capability
            .get_daily_distance_samples(range.start_ms(), range.end_ms())
            .await
            .map_err(host_failure("get_daily_distance_samples"))?;

        if samples.is_empty() {
            debug!("Host returned no distance samples");
            return Err(FitnessError::NoData(Metric::Distance));
        }

        let received = samples.len();
        let shaped = normalize_distance_samples(samples);
        debug!(received, kept = shaped.len(), "Normalized distance samples");
        Ok(shaped)
    }

    /// Weight history, converted to `query.unit`.
    #[instrument(skip(self, query), fields(unit = query.unit.as_str()))]
    pub async fn get_weight_samples(&self, query: WeightQuery) -> Result<Vec<WeightSample>> {
        let start = parse_date_string(&query.start_date, self.time_zone)?;
        let end = parse_date_string(&query.end_date, self.time_zone)?;

        let samples = self
            .capability
            .get_weight_samples(start.timestamp_millis(), end.timestamp_millis())
            .await
            .map_err(host_failure("get_weight_samples"))?;

        if samples.is_empty() {
            debug!("Host returned no weight samples");
            return Err(FitnessError::NoData(Metric::Weight));
        }

        let received = samples.len();
        let shaped = normalize_weight_samples(samples, query.unit);
        debug!(received, kept = shaped.len(), "Normalized weight samples");
        Ok(shaped)
    }

    #[instrument(skip(self, request), fields(unit = request.unit.as_str()))]
    pub async fn save_weight(&self, request: WeightRecordRequest) -> Result<bool> {
        let record = self.native_weight_record(&request)?;
        let saved = self
            .capability
            .save_weight(record)
            .await
            .map_err(host_failure("save_weight"))?;
        info!(saved, "Weight save acknowledged");
        Ok(saved)
    }

    #[instrument(skip(self, request), fields(unit = request.unit.as_str()))]
    pub async fn delete_weight(&self, request: WeightRecordRequest) -> Result<bool> {
        let record = self.native_weight_record(&request)?;
        let deleted = self
            .capability
            .delete_weight(record)
            .await
            .map_err(host_failure("delete_weight"))?;
        info!(deleted, "Weight delete acknowledged");
        Ok(deleted)
    }

    /// Whether the fitness service exists on this device.
    #[instrument(skip(self))]
    pub async fn is_available(&self) -> Result<bool> {
        self.capability
            .is_available()
            .await
            .map_err(host_failure("is_available"))
    }

    /// Whether the user has granted access.
    #[instrument(skip(self))]
    pub async fn is_enabled(&self) -> Result<bool> {
        self.capability
            .is_enabled()
            .await
            .map_err(host_failure("is_enabled"))
    }

    /// Listen for live step counts and ask the host to start emitting them.
    ///
    /// The listener is registered before the host is asked; if the host then
    /// fails, the error is returned and the listener stays registered until
    /// [`unsubscribe_listeners`](Self::unsubscribe_listeners).
    #[instrument(skip(self, callback))]
    pub async fn observe_steps<F>(&self, callback: F) -> Result<Subscription>
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        let subscription = self
            .subscribe(EventChannel::StepChanged, step_listener(callback))
            .await?;

        self.capability
            .observe_steps()
            .await
            .map_err(host_failure("observe_steps"))?;

        info!(listener = %subscription.id(), "Observing live steps");
        Ok(subscription)
    }

    /// Listen for finished history queries. Does not contact the host.
    #[instrument(skip(self, callback))]
    pub async fn observe_history<F>(&self, callback: F) -> Result<Subscription>
    where
        F: Fn(StepHistoryUpdate) + Send + Sync + 'static,
    {
        self.subscribe(EventChannel::StepHistoryChanged, history_listener(callback))
            .await
    }

    /// Listen for the asynchronous result of the consent flow.
    #[instrument(skip(self, callback))]
    pub async fn on_authorize<F>(&self, callback: F) -> Result<Subscription>
    where
        F: Fn(AuthorizationUpdate) + Send + Sync + 'static,
    {
        self.subscribe(EventChannel::Authorize, authorize_listener(callback))
            .await
    }

    /// Remove every listener this bridge registered. Returns how many were removed.
    ///
    /// Removal continues past hub failures; the first failure is reported
    /// after all handles have been tried. Handles the hub failed to remove
    /// stay with the bridge so a later call can retry them.
    #[instrument(skip(self))]
    pub async fn unsubscribe_listeners(&self) -> Result<usize> {
        let handles = self.subscriptions.drain().await;
        let mut removed = 0;
        let mut retained = Vec::new();
        let mut first_failure = None;

        for subscription in handles {
            match self.broadcast.remove_listener(subscription.id()) {
                Ok(true) => removed += 1,
                Ok(false) => {
                    debug!(listener = %subscription.id(), "Listener already gone from hub");
                }
                Err(err) => {
                    warn!(listener = %subscription.id(), error = %err, "Failed to remove listener");
                    first_failure.get_or_insert(err);
                    retained.push(subscription);
                }
            }
        }

        if let Some(err) = first_failure {
            self.subscriptions.restore(retained).await;
            return Err(FitnessError::Broadcast(err.host_message()));
        }

        info!(removed, "Released bridge listeners");
        Ok(removed)
    }

    /// Number of listener handles this bridge currently holds.
    pub async fn subscription_count(&self) -> usize {
        self.subscriptions.len().await
    }

    /// Legacy day query; the result arrives on the history channel.
    #[deprecated(note = "use `get_daily_step_count_samples`")]
    #[instrument(skip(self))]
    pub async fn get_steps(&self, day_start: DateTime<Utc>, day_end: DateTime<Utc>) -> Result<()> {
        self.capability
            .get_daily_steps(day_start.timestamp_millis(), day_end.timestamp_millis())
            .await
            .map_err(host_failure("get_daily_steps"))
    }

    /// Legacy query from `start` until now; the result arrives on the history channel.
    #[deprecated(note = "use `get_daily_step_count_samples`")]
    #[instrument(skip(self))]
    pub async fn get_weekly_steps(&self, start: DateTime<Utc>) -> Result<()> {
        let now = self.clock.unix_timestamp_millis();
        self.capability
            .get_weekly_steps(start.timestamp_millis(), now)
            .await
            .map_err(host_failure("get_weekly_steps"))
    }

    async fn subscribe(&self, channel: EventChannel, listener: Listener) -> Result<Subscription> {
        let subscription = self
            .subscriptions
            .register(self.broadcast.as_ref(), channel, listener)
            .await
            .map_err(|err| {
                warn!(channel = %channel, error = %err, "Listener registration failed");
                FitnessError::Broadcast(err.host_message())
            })?;
        debug!(channel = %channel, listener = %subscription.id(), "Listener registered");
        Ok(subscription)
    }

    fn native_weight_record(&self, request: &WeightRecordRequest) -> Result<NativeWeightRecord> {
        let date = parse_date_string(&request.date, self.time_zone)?;
        Ok(NativeWeightRecord {
            value: to_kilograms(request.value, request.unit),
            unit: request.unit,
            date: date.timestamp_millis(),
        })
    }
}

fn host_failure(operation: &'static str) -> impl FnOnce(BridgeError) -> FitnessError {
    move |err| {
        warn!(operation, error = %err, "Host fitness call failed");
        FitnessError::from(err)
    }
}
