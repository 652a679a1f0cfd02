//! Aggregate statistics
//!
//! Link counts, click rate and conversion rate by time window and agent type.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Days, Local, NaiveTime, Utc};
use serde::Serialize;

use crate::config::get_config;
use crate::errors::TrackerError;
use crate::storage::{LinkFilter, LinkOutcome, SeaOrmStorage, TrackedLink};

/// Agent types with this prefix are listed first in the per-agent view
pub const SUPPORT_AGENT_PREFIX: &str = "support_";
/// Listed right after the support family
pub const POST_CALL_AGENT: &str = "post_call";

/// 统计时间窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsPeriod {
    Today,
    Week,
    Month,
    All,
}

impl StatsPeriod {
    /// Parse a query value; anything other than the exact lowercase names means `All`
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("today") => StatsPeriod::Today,
            Some("week") => StatsPeriod::Week,
            Some("month") => StatsPeriod::Month,
            _ => StatsPeriod::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatsPeriod::Today => "today",
            StatsPeriod::Week => "week",
            StatsPeriod::Month => "month",
            StatsPeriod::All => "all",
        }
    }

    fn days_back(&self) -> Option<u64> {
        match self {
            StatsPeriod::Today => Some(0),
            StatsPeriod::Week => Some(7),
            StatsPeriod::Month => Some(30),
            StatsPeriod::All => None,
        }
    }

    /// Start of the window: local midnight `days_back` days before `now`
    pub fn window_start(&self, now: DateTime<Local>) -> Option<DateTime<Utc>> {
        let days = self.days_back()?;
        let day = now.date_naive().checked_sub_days(Days::new(days))?;
        let midnight = day.and_time(NaiveTime::MIN);

        // DST 跳变时当地零点可能不存在或重复，取最早的合法时刻
        midnight
            .and_local_timezone(Local)
            .earliest()
            .or_else(|| midnight.and_utc().with_timezone(&Local).into())
            .map(|start| start.with_timezone(&Utc))
    }
}

/// Link counts and rates for one slice of links
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkMetrics {
    pub total_links: u64,
    pub total_clicked: u64,
    pub total_converted: u64,
    /// Percentage of links clicked, one decimal
    pub click_rate: f64,
    /// Percentage of clicked links that converted, one decimal; None without clicks
    pub conversion_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMetrics {
    pub agent_type: String,
    #[serde(flatten)]
    pub metrics: LinkMetrics,
}

/// Reduced link projection for the activity feed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentLink {
    pub tracking_id: String,
    pub contact_id: String,
    pub agent_type: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub clicked: bool,
    pub clicked_at: Option<DateTime<Utc>>,
    pub converted: bool,
    pub converted_at: Option<DateTime<Utc>>,
}

impl From<TrackedLink> for RecentLink {
    fn from(link: TrackedLink) -> Self {
        Self {
            tracking_id: link.tracking_id,
            contact_id: link.contact_id,
            agent_type: link.agent_type,
            original_url: link.original_url,
            created_at: link.created_at,
            clicked: link.clicked,
            clicked_at: link.clicked_at,
            converted: link.converted,
            converted_at: link.converted_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub overview: LinkMetrics,
    pub by_agent: Vec<AgentMetrics>,
    pub recent_activity: Vec<RecentLink>,
    pub period: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// 累加器
#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    links: u64,
    clicked: u64,
    converted: u64,
    clicked_converted: u64,
}

impl Tally {
    fn add(&mut self, outcome: &LinkOutcome) {
        self.links += 1;
        if outcome.clicked {
            self.clicked += 1;
            if outcome.converted {
                self.clicked_converted += 1;
            }
        }
        if outcome.converted {
            self.converted += 1;
        }
    }

    fn metrics(&self) -> LinkMetrics {
        LinkMetrics {
            total_links: self.links,
            total_clicked: self.clicked,
            total_converted: self.converted,
            click_rate: percentage(self.clicked, self.links).unwrap_or(0.0),
            conversion_rate: percentage(self.clicked_converted, self.clicked),
        }
    }
}

/// part / whole × 100, rounded to one decimal; None when whole is zero
fn percentage(part: u64, whole: u64) -> Option<f64> {
    if whole == 0 {
        return None;
    }
    let pct = part as f64 / whole as f64 * 100.0;
    Some((pct * 10.0).round() / 10.0)
}

/// Sort tier for the per-agent view
fn agent_tier(agent_type: &str) -> u8 {
    if agent_type.starts_with(SUPPORT_AGENT_PREFIX) {
        0
    } else if agent_type == POST_CALL_AGENT {
        1
    } else {
        2
    }
}

/// Overall metrics for the outcomes matching `agent_type` (all when None)
pub fn summarize(outcomes: &[LinkOutcome], agent_type: Option<&str>) -> LinkMetrics {
    let mut tally = Tally::default();
    outcomes
        .iter()
        .filter(|o| agent_type.is_none_or(|a| o.agent_type == a))
        .for_each(|o| tally.add(o));
    tally.metrics()
}

/// Per-agent metrics, support family first, then post_call, then the rest
pub fn summarize_by_agent(outcomes: &[LinkOutcome]) -> Vec<AgentMetrics> {
    let mut groups: BTreeMap<&str, Tally> = BTreeMap::new();
    for outcome in outcomes {
        groups
            .entry(outcome.agent_type.as_str())
            .or_default()
            .add(outcome);
    }

    let mut by_agent: Vec<AgentMetrics> = groups
        .into_iter()
        .map(|(agent_type, tally)| AgentMetrics {
            agent_type: agent_type.to_string(),
            metrics: tally.metrics(),
        })
        .collect();

    // sort_by_key 是稳定排序，同档内保持名称顺序
    by_agent.sort_by_key(|m| agent_tier(&m.agent_type));
    by_agent
}

pub struct StatsService {
    storage: Arc<SeaOrmStorage>,
    recent_limit: u64,
}

impl StatsService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self {
            storage,
            recent_limit: get_config().tracking.recent_activity_limit,
        }
    }

    pub fn with_recent_limit(mut self, limit: u64) -> Self {
        self.recent_limit = limit;
        self
    }

    /// Build the stats report for a period, optionally scoped to one agent type
    ///
    /// The per-agent view ignores the agent filter so every agent type in the
    /// period is always listed.
    pub async fn get_stats(
        &self,
        period: StatsPeriod,
        agent_type: Option<String>,
    ) -> Result<StatsReport, TrackerError> {
        let agent_type = agent_type
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty() && a != "all");

        let filter = LinkFilter {
            created_after: period.window_start(Local::now()),
            agent_type,
        };

        let outcomes = self
            .storage
            .load_link_outcomes(&filter.without_agent())
            .await?;

        let overview = summarize(&outcomes, filter.agent_type.as_deref());
        let by_agent = summarize_by_agent(&outcomes);

        let recent_activity = self
            .storage
            .load_recent_links(&filter, self.recent_limit)
            .await?
            .into_iter()
            .map(RecentLink::from)
            .collect();

        Ok(StatsReport {
            overview,
            by_agent,
            recent_activity,
            period: period.as_str(),
            timestamp: Utc::now(),
        })
    }
}
