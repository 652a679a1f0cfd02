use crate::storage::{ClickEvent, Conversion, NewClick, NewConversion, NewLink, TrackedLink};
use migration::entities::{click_event, conversion, tracked_link};

/// 将 Sea-ORM Model 转换为 TrackedLink
pub fn model_to_link(model: tracked_link::Model) -> TrackedLink {
    TrackedLink {
        id: model.id,
        tracking_id: model.tracking_id,
        contact_id: model.contact_id,
        contact_email: model.contact_email,
        agent_type: model.agent_type,
        original_url: model.original_url,
        created_at: model.created_at,
        clicked: model.clicked,
        clicked_at: model.clicked_at,
        converted: model.converted,
        converted_at: model.converted_at,
    }
}

pub fn model_to_click(model: click_event::Model) -> ClickEvent {
    ClickEvent {
        id: model.id,
        tracking_id: model.tracking_id,
        clicked_at: model.clicked_at,
        ip_address: model.ip_address,
        user_agent: model.user_agent,
    }
}

pub fn model_to_conversion(model: conversion::Model) -> Conversion {
    Conversion {
        id: model.id,
        contact_id: model.contact_id,
        tracking_id: model.tracking_id,
        conversion_type: model.conversion_type,
        created_at: model.created_at,
        metadata: model.metadata,
    }
}

/// 新链接 → ActiveModel，clicked / converted 初始为 false
pub(super) fn new_link_to_active_model(link: &NewLink) -> tracked_link::ActiveModel {
    use sea_orm::ActiveValue::*;

    tracked_link::ActiveModel {
        id: NotSet,
        tracking_id: Set(link.tracking_id.clone()),
        contact_id: Set(link.contact_id.clone()),
        contact_email: Set(link.contact_email.clone()),
        agent_type: Set(link.agent_type.clone()),
        original_url: Set(link.original_url.clone()),
        created_at: Set(link.created_at),
        clicked: Set(false),
        clicked_at: Set(None),
        converted: Set(false),
        converted_at: Set(None),
    }
}

pub(super) fn new_click_to_active_model(click: &NewClick) -> click_event::ActiveModel {
    use sea_orm::ActiveValue::*;

    click_event::ActiveModel {
        id: NotSet,
        tracking_id: Set(click.tracking_id.clone()),
        clicked_at: Set(click.clicked_at),
        ip_address: Set(click.ip_address.clone()),
        user_agent: Set(click.user_agent.clone()),
    }
}

pub(super) fn new_conversion_to_active_model(conv: &NewConversion) -> conversion::ActiveModel {
    use sea_orm::ActiveValue::*;

    conversion::ActiveModel {
        id: NotSet,
        contact_id: Set(conv.contact_id.clone()),
        tracking_id: Set(conv.tracking_id.clone()),
        conversion_type: Set(conv.conversion_type.clone()),
        created_at: Set(conv.created_at),
        metadata: Set(conv.metadata.clone()),
    }
}
