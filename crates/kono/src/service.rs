//! The opaque capability behind `/service`.

use async_trait::async_trait;

use kono_core::{ports::CommandResponder, Result};

const DEFAULT_REPLY: &str = "Example service here: everything is up and running";

/// Stand-in business service. Replies with a fixed line, overridable through
/// `SERVICE_REPLY`.
pub struct ExampleResponder {
    reply: String,
}

impl ExampleResponder {
    pub fn new(reply: Option<String>) -> Self {
        Self {
            reply: reply.unwrap_or_else(|| DEFAULT_REPLY.to_string()),
        }
    }
}

#[async_trait]
impl CommandResponder for ExampleResponder {
    async fn respond(&self) -> Result<String> {
        Ok(self.reply.clone())
    }
}
