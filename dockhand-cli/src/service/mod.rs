//! Service layer
//!
//! The deploy service drives a run through build, push and notify. It talks
//! to the container engine and the webhook through traits so both can be
//! replaced in tests.

mod deploy;

pub use deploy::{DeployService, ImageBuilder, send_notification};
