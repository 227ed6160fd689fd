mod webhook_secret;

pub use webhook_secret::{WebhookSecretFactory, WebhookSecretService};
