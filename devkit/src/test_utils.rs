/*!
Test harness for the exporter

Starts a fake SmartThings API already holding the reference lock, so a
test only has to describe what differs from the happy path.
*/

use crate::api_stub::FakeSmartThings;
use crate::fixtures::{self, StatusBuilder, LOCK_DEVICE_ID};
use anyhow::Result;
use serde_json::Value;

pub struct TestHarness {
    pub api: FakeSmartThings,
}

impl TestHarness {
    /// Fake API with the reference lock registered and its status set.
    pub async fn start() -> Result<Self> {
        env_logger::try_init().ok();

        let api = FakeSmartThings::spawn(fixtures::API_TOKEN).await?;
        api.add_device(fixtures::lock_device());
        api.set_status(LOCK_DEVICE_ID, StatusBuilder::schlage_lock().build());
        log::info!("[HARNESS] reference lock {} registered", LOCK_DEVICE_ID);
        Ok(Self { api })
    }

    /// Fake API with no device at all.
    pub async fn empty() -> Result<Self> {
        env_logger::try_init().ok();
        Ok(Self { api: FakeSmartThings::spawn(fixtures::API_TOKEN).await? })
    }

    pub fn api_url(&self) -> String {
        self.api.base_url()
    }

    pub fn set_lock_status(&self, status: Value) {
        self.api.set_status(LOCK_DEVICE_ID, status);
    }

    /// Swaps one attribute of the reference lock status.
    pub fn set_lock_attribute(&self, capability: &str, name: &str, value: Value) {
        let status = StatusBuilder::schlage_lock()
            .without(name)
            .attribute(capability, name, value, None)
            .build();
        self.set_lock_status(status);
    }

    pub fn remove_lock(&self) {
        self.api.remove_device(LOCK_DEVICE_ID);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_harness_registers_lock() {
        let harness = TestHarness::start().await.unwrap();
        let body: Value = reqwest::Client::new()
            .get(format!("{}/devices", harness.api_url()))
            .bearer_auth(fixtures::API_TOKEN)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["items"][0]["deviceId"], LOCK_DEVICE_ID);
    }

    #[tokio::test]
    async fn test_empty_harness_has_no_devices() {
        let harness = TestHarness::empty().await.unwrap();
        harness.remove_lock();
        let body: Value = reqwest::Client::new()
            .get(format!("{}/devices", harness.api_url()))
            .bearer_auth(fixtures::API_TOKEN)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(body["items"].as_array().unwrap().is_empty());
    }
}
