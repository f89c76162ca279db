#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use bridge_traits::{
    error::Result, BroadcastHub, Clock, FitnessCapability, NativeDistanceSample,
    NativeSourceSteps, NativeWeightRecord, NativeWeightSample,
};
use chrono::{DateTime, TimeZone, Utc};
use core_fitness::FitnessBridge;
use core_runtime::{BridgeConfig, EventBus, TimeZonePolicy};
use mockall::mock;

mock! {
    pub Fitness {}

    #[async_trait]
    impl FitnessCapability for Fitness {
        async fn authorize(&self) -> Result<bool>;
        async fn get_daily_steps(&self, start_ms: i64, end_ms: i64) -> Result<()>;
        async fn get_weekly_steps(&self, start_ms: i64, end_ms: i64) -> Result<()>;
        async fn get_daily_step_count_samples(&self, start_ms: i64, end_ms: i64) -> Result<Vec<NativeSourceSteps>>;
        async fn get_daily_distance_samples(&self, start_ms: i64, end_ms: i64) -> Result<Vec<NativeDistanceSample>>;
        async fn get_weight_samples(&self, start_ms: i64, end_ms: i64) -> Result<Vec<NativeWeightSample>>;
        async fn save_weight(&self, record: NativeWeightRecord) -> Result<bool>;
        async fn delete_weight(&self, record: NativeWeightRecord) -> Result<bool>;
        async fn is_available(&self) -> Result<bool>;
        async fn is_enabled(&self) -> Result<bool>;
        async fn observe_steps(&self) -> Result<()>;
    }
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

/// Bridge over `capability` with its own event bus, bucketing days in UTC.
pub fn bridge(capability: MockFitness) -> FitnessBridge {
    bridge_on(capability, Arc::new(EventBus::new(16)))
}

pub fn bridge_on(capability: MockFitness, bus: Arc<EventBus>) -> FitnessBridge {
    bridge_on_hub(capability, bus)
}

pub fn bridge_on_hub(capability: MockFitness, hub: Arc<dyn BroadcastHub>) -> FitnessBridge {
    let config = BridgeConfig::builder()
        .capability(Arc::new(capability))
        .broadcast(hub)
        .time_zone(TimeZonePolicy::Utc)
        .build()
        .unwrap();
    FitnessBridge::new(config)
}

pub fn bridge_with_clock(capability: MockFitness, clock: Arc<dyn Clock>) -> FitnessBridge {
    let config = BridgeConfig::builder()
        .capability(Arc::new(capability))
        .clock(clock)
        .time_zone(TimeZonePolicy::Utc)
        .build()
        .unwrap();
    FitnessBridge::new(config)
}
