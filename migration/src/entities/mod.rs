pub mod click_event;
pub mod conversion;
pub mod tracked_link;
