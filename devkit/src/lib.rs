/*!
# Lockstat DevKit - stubs and helpers for exporter development

Lets the exporter be exercised without a SmartThings account:
- Fake SmartThings cloud API (axum on an ephemeral local port)
- JSON fixtures matching the API's device and status payloads
- Test harness wiring both together
*/

pub mod api_stub;
pub mod fixtures;
pub mod test_utils;

pub use api_stub::FakeSmartThings;
pub use test_utils::TestHarness;
