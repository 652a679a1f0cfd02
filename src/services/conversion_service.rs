//! Conversion attribution
//!
//! Records conversion events posted by upstream webhooks and attributes them
//! to the contact's most recently clicked link.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::errors::TrackerError;
use crate::storage::{NewConversion, SeaOrmStorage};
use crate::utils::payload::{APPOINTMENT_ID_RULE, CONTACT_ID_RULE};

/// 默认转化类型
pub const DEFAULT_CONVERSION_TYPE: &str = "appointment_booked";

/// Result of a conversion webhook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// No contact id could be extracted; nothing was written
    Skipped,
    /// A conversion row was written
    Recorded {
        conversion_id: i64,
        contact_id: String,
        /// Attributed tracking code, None when the contact has no clicked link
        tracking_id: Option<String>,
    },
}

impl ConversionOutcome {
    pub fn tracking_id(&self) -> Option<&str> {
        match self {
            ConversionOutcome::Skipped => None,
            ConversionOutcome::Recorded { tracking_id, .. } => tracking_id.as_deref(),
        }
    }
}

pub struct ConversionService {
    storage: Arc<SeaOrmStorage>,
}

impl ConversionService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// Record a conversion from a raw webhook document
    pub async fn record_from_payload(
        &self,
        payload: &Value,
    ) -> Result<ConversionOutcome, TrackerError> {
        let Some(contact_id) = CONTACT_ID_RULE.extract(payload) else {
            debug!(
                "Conversion webhook without {}, ignoring",
                CONTACT_ID_RULE.name
            );
            return Ok(ConversionOutcome::Skipped);
        };
        let appointment_id = APPOINTMENT_ID_RULE.extract(payload);

        self.record(contact_id, appointment_id, payload).await
    }

    /// Record a conversion for a known contact
    ///
    /// Always writes a Conversion row. When the contact has a clicked link the
    /// link is marked converted; an already converted link is stamped again.
    pub async fn record(
        &self,
        contact_id: String,
        appointment_id: Option<String>,
        payload: &Value,
    ) -> Result<ConversionOutcome, TrackerError> {
        let attributed = self
            .storage
            .find_latest_clicked_for_contact(&contact_id)
            .await?;
        let tracking_id = attributed.map(|link| link.tracking_id);

        let now = Utc::now();
        let metadata = json!({
            "appointmentId": appointment_id,
            "payload": payload,
        });

        let conversion = self
            .storage
            .insert_conversion(&NewConversion {
                contact_id: contact_id.clone(),
                tracking_id: tracking_id.clone(),
                conversion_type: DEFAULT_CONVERSION_TYPE.to_string(),
                created_at: now,
                metadata: Some(serde_json::to_string(&metadata)?),
            })
            .await?;

        if let Some(ref code) = tracking_id {
            self.storage.mark_converted(code, now).await?;
            info!("Conversion for contact {} attributed to '{}'", contact_id, code);
        } else {
            info!("Conversion for contact {} has no clicked link", contact_id);
        }

        Ok(ConversionOutcome::Recorded {
            conversion_id: conversion.id,
            contact_id,
            tracking_id,
        })
    }
}
