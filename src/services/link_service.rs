//! Link registry and redirector
//!
//! Registers tracking codes for outbound links and records visits against them.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::config::get_config;
use crate::errors::TrackerError;
use crate::storage::{ClickEvent, NewClick, NewLink, SeaOrmStorage, TrackedLink};
use crate::utils::generate_random_code;

/// 追踪链接的路由前缀
pub const REDIRECT_PATH_PREFIX: &str = "/t/";

// ============ Request/Response DTOs ============

/// Request to register a tracked link
///
/// Fields are already normalized to strings; empty values count as missing.
#[derive(Debug, Clone, Default)]
pub struct RegisterLinkRequest {
    pub contact_id: Option<String>,
    pub contact_email: Option<String>,
    pub agent_type: Option<String>,
    pub original_url: Option<String>,
}

/// Result of link registration
#[derive(Debug, Clone)]
pub struct RegisterLinkResult {
    pub link: TrackedLink,
    /// Fully-qualified redirect URL for the tracking code
    pub tracked_url: String,
}

/// Caller details captured on each redirect
#[derive(Debug, Clone, Default)]
pub struct VisitInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Link row plus its click history
#[derive(Debug, Clone, Serialize)]
pub struct LinkDetail {
    pub link: TrackedLink,
    pub clicks: Vec<ClickEvent>,
}

fn required(value: Option<String>, field: &str) -> Result<String, TrackerError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| TrackerError::validation(format!("{} is required", field)))
}

// ============ LinkService Implementation ============

pub struct LinkService {
    storage: Arc<SeaOrmStorage>,
    code_length: usize,
    public_base_url: Option<String>,
}

impl LinkService {
    /// Create a LinkService using the `[tracking]` section of the static config
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        let config = get_config();
        Self {
            storage,
            code_length: config.tracking.code_length.clamp(4, 32),
            public_base_url: config
                .tracking
                .public_base_url
                .clone()
                .filter(|u| !u.trim().is_empty()),
        }
    }

    pub fn with_code_length(mut self, code_length: usize) -> Self {
        self.code_length = code_length.clamp(4, 32);
        self
    }

    pub fn with_public_base_url(mut self, base_url: Option<String>) -> Self {
        self.public_base_url = base_url.filter(|u| !u.trim().is_empty());
        self
    }

    /// Build the redirect URL for a code
    ///
    /// `request_base` is `<scheme>://<host>` of the current request and is only
    /// used when no public base URL is configured.
    pub fn tracked_url(&self, request_base: &str, tracking_id: &str) -> String {
        let base = self.public_base_url.as_deref().unwrap_or(request_base);
        format!(
            "{}{}{}",
            base.trim_end_matches('/'),
            REDIRECT_PATH_PREFIX,
            tracking_id
        )
    }

    /// Register a new tracked link
    ///
    /// A tracking-code collision is rejected by the unique index and comes back
    /// as a storage error; no retry is attempted.
    pub async fn register(
        &self,
        req: RegisterLinkRequest,
        request_base: &str,
    ) -> Result<RegisterLinkResult, TrackerError> {
        let contact_id = required(req.contact_id, "contactId")?;
        let agent_type = required(req.agent_type, "agentType")?;
        let original_url = required(req.original_url, "originalUrl")?;
        let contact_email = req
            .contact_email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());

        let new_link = NewLink {
            tracking_id: generate_random_code(self.code_length),
            contact_id,
            contact_email,
            agent_type,
            original_url,
            created_at: Utc::now(),
        };

        let link = self.storage.insert_link(&new_link).await?;
        let tracked_url = self.tracked_url(request_base, &link.tracking_id);

        info!(
            "LinkService: registered '{}' -> '{}'",
            link.tracking_id, link.original_url
        );

        Ok(RegisterLinkResult { link, tracked_url })
    }

    /// Resolve a code and record the visit
    ///
    /// Returns `Ok(None)` for unknown codes without writing anything. Failures
    /// while logging the click or stamping the first click are logged and do
    /// not prevent the redirect.
    pub async fn visit(
        &self,
        tracking_id: &str,
        visit: VisitInfo,
    ) -> Result<Option<TrackedLink>, TrackerError> {
        let Some(link) = self.storage.get_link(tracking_id).await? else {
            return Ok(None);
        };

        let now = Utc::now();
        let click = NewClick {
            tracking_id: link.tracking_id.clone(),
            clicked_at: now,
            ip_address: visit.ip_address,
            user_agent: visit.user_agent,
        };

        if let Err(e) = self.storage.insert_click(&click).await {
            error!("Failed to record click for '{}': {}", tracking_id, e);
        }

        if !link.clicked {
            match self.storage.mark_first_click(&link.tracking_id, now).await {
                Ok(true) => info!("First click on '{}'", link.tracking_id),
                Ok(false) => debug!(
                    "First click on '{}' was already stamped by a concurrent visit",
                    link.tracking_id
                ),
                Err(e) => error!("Failed to stamp first click for '{}': {}", tracking_id, e),
            }
        }

        Ok(Some(link))
    }

    /// Link row plus every click event, newest first
    pub async fn get_link_detail(&self, tracking_id: &str) -> Result<LinkDetail, TrackerError> {
        let link = self
            .storage
            .get_link(tracking_id)
            .await?
            .ok_or_else(|| TrackerError::not_found(format!("Link '{}' not found", tracking_id)))?;

        let clicks = self.storage.load_clicks(tracking_id).await?;

        Ok(LinkDetail { link, clicks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_rejects_missing_and_blank() {
        assert!(matches!(
            required(None, "contactId"),
            Err(TrackerError::Validation(_))
        ));
        assert!(matches!(
            required(Some("   ".to_string()), "agentType"),
            Err(TrackerError::Validation(_))
        ));
        assert_eq!(required(Some(" 42 ".to_string()), "contactId").unwrap(), "42");
    }
}
