pub mod health;
pub mod redirect;
pub mod tracking;
pub mod webhook;

pub use health::{HealthService, health_routes};
pub use redirect::{RedirectService, redirect_routes};
pub use tracking::{TrackingService, tracking_routes};
pub use webhook::{WebhookService, webhook_routes};
