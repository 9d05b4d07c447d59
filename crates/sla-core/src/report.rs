//! Dashboard aggregation over a batch of tickets.
//!
//! Every ticket is evaluated against the same `now` so counts and the
//! at-risk ordering are consistent within one report.

use crate::config::SlaConfig;
use crate::sla::{summarize, SlaSummary, TrackSummary};
use crate::ticket::Ticket;
use crate::types::{Priority, SlaStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackStats {
    pub on_time: usize,
    pub breached: usize,
    pub pending: usize,
    pub imminent: usize,
    /// `on_time / (on_time + breached)` as a percentage; `None` until some
    /// ticket has a decided outcome on this track.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compliance_percent: Option<f64>,
}

impl TrackStats {
    fn record(&mut self, track: &TrackSummary) {
        match track.result.status {
            SlaStatus::OnTime => self.on_time += 1,
            SlaStatus::Breached => self.breached += 1,
            SlaStatus::Pending => self.pending += 1,
        }
        if track.is_imminent {
            self.imminent += 1;
        }
    }

    fn finish(&mut self) {
        let decided = self.on_time + self.breached;
        self.compliance_percent = if decided == 0 {
            None
        } else {
            Some(self.on_time as f64 / decided as f64 * 100.0)
        };
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityStats {
    pub priority: Priority,
    pub tickets: usize,
    pub breached: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtRisk {
    pub id: String,
    pub title: String,
    pub priority: Priority,
    /// The larger percent used of the two tracks that put it at risk.
    pub percent_used: f64,
    pub summary: SlaSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaReport {
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    pub response: TrackStats,
    pub solving: TrackStats,
    pub by_priority: Vec<PriorityStats>,
    pub at_risk: Vec<AtRisk>,
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// A track is at risk while still running and either imminent or breached.
fn risk_percent(track: &TrackSummary, running: bool) -> Option<f64> {
    let hot = track.is_imminent || track.result.status == SlaStatus::Breached;
    (running && hot).then_some(track.result.percent_used)
}

impl SlaReport {
    pub fn build(tickets: &[Ticket], config: &SlaConfig, now: DateTime<Utc>) -> Self {
        let mut response = TrackStats::default();
        let mut solving = TrackStats::default();
        let mut by_priority: Vec<PriorityStats> = Vec::new();
        let mut at_risk = Vec::new();

        for ticket in tickets {
            let summary = summarize(ticket, config.policy_for(&ticket.priority), now);
            response.record(&summary.response);
            solving.record(&summary.solving);

            let any_breached = summary.response.result.status == SlaStatus::Breached
                || summary.solving.result.status == SlaStatus::Breached;
            match by_priority.iter_mut().find(|p| p.priority == ticket.priority) {
                Some(stats) => {
                    stats.tickets += 1;
                    stats.breached += usize::from(any_breached);
                }
                None => by_priority.push(PriorityStats {
                    priority: ticket.priority.clone(),
                    tickets: 1,
                    breached: usize::from(any_breached),
                }),
            }

            let response_risk =
                risk_percent(&summary.response, ticket.first_response_at.is_none());
            let solving_risk = risk_percent(&summary.solving, !ticket.status.is_finished());
            let worst = match (response_risk, solving_risk) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, b) => a.or(b),
            };
            if let Some(percent_used) = worst {
                at_risk.push(AtRisk {
                    id: ticket.id.clone(),
                    title: ticket.title.clone(),
                    priority: ticket.priority.clone(),
                    percent_used,
                    summary,
                });
            }
        }

        response.finish();
        solving.finish();
        by_priority.sort_by_key(|p| priority_rank(&p.priority));
        at_risk.sort_by(|a, b| b.percent_used.total_cmp(&a.percent_used));

        tracing::debug!(
            total = tickets.len(),
            at_risk = at_risk.len(),
            "built sla report"
        );

        Self {
            generated_at: now,
            total: tickets.len(),
            response,
            solving,
            by_priority,
            at_risk,
        }
    }
}

fn priority_rank(priority: &Priority) -> usize {
    Priority::known()
        .iter()
        .position(|p| p == priority)
        .unwrap_or(Priority::known().len())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TicketStatus;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    fn ticket(id: &str, priority: Priority, status: TicketStatus) -> Ticket {
        Ticket {
            id: id.to_string(),
            title: format!("ticket {id}"),
            priority,
            status,
            created_at: t0(),
            first_response_at: None,
            resolved_at: None,
        }
    }

    #[test]
    fn empty_report() {
        let report = SlaReport::build(&[], &SlaConfig::default(), t0());
        assert_eq!(report.total, 0);
        assert!(report.response.compliance_percent.is_none());
        assert!(report.at_risk.is_empty());
    }

    #[test]
    fn counts_and_compliance() {
        let now = t0() + Duration::hours(5);

        // responded on time, resolved on time
        let mut a = ticket("T1", Priority::High, TicketStatus::Resolved);
        a.first_response_at = Some(t0() + Duration::hours(1));
        a.resolved_at = Some(t0() + Duration::hours(4));

        // never responded, high: response breached at 5h
        let b = ticket("T2", Priority::High, TicketStatus::Open);

        // low priority, fresh
        let c = ticket("T3", Priority::Low, TicketStatus::Open);

        let report = SlaReport::build(&[a, b, c], &SlaConfig::default(), now);
        assert_eq!(report.total, 3);
        assert_eq!(report.response.on_time, 1);
        assert_eq!(report.response.breached, 1);
        assert_eq!(report.response.pending, 1);
        assert_eq!(report.response.compliance_percent, Some(50.0));
        assert_eq!(report.solving.on_time, 1);
        assert_eq!(report.solving.pending, 2);
        assert_eq!(report.solving.compliance_percent, Some(100.0));

        assert_eq!(report.by_priority.len(), 2);
        assert_eq!(report.by_priority[0].priority, Priority::High);
        assert_eq!(report.by_priority[0].tickets, 2);
        assert_eq!(report.by_priority[0].breached, 1);
        assert_eq!(report.by_priority[1].priority, Priority::Low);

        assert_eq!(report.at_risk.len(), 1);
        assert_eq!(report.at_risk[0].id, "T2");
    }

    #[test]
    fn at_risk_ordered_by_percent_used() {
        let now = t0() + Duration::minutes(50);
        // critical: 50/60 response = 83%, imminent
        let a = ticket("T1", Priority::Critical, TicketStatus::Open);
        // high with policy of 0.5h response: 166% breached
        let b = ticket("T2", Priority::High, TicketStatus::InProgress);
        // medium: 10%
        let c = ticket("T3", Priority::Medium, TicketStatus::Open);

        let config = SlaConfig {
            version: 1,
            policies: vec![crate::sla::SlaPolicy {
                priority: Priority::High,
                response_time_hours: 0.5,
                resolution_time_hours: 8.0,
                is_active: true,
            }],
        };
        let report = SlaReport::build(&[a, b, c], &config, now);
        let ids: Vec<&str> = report.at_risk.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["T2", "T1"]);
        assert_eq!(report.response.imminent, 1);
    }

    #[test]
    fn finished_breaches_are_not_at_risk() {
        let mut t = ticket("T1", Priority::Critical, TicketStatus::Closed);
        t.first_response_at = Some(t0() + Duration::hours(3));
        t.resolved_at = Some(t0() + Duration::hours(9));
        let report = SlaReport::build(&[t], &SlaConfig::default(), t0() + Duration::days(1));
        assert!(report.at_risk.is_empty());
        assert_eq!(report.response.breached, 1);
        assert_eq!(report.solving.breached, 1);
        assert_eq!(report.solving.compliance_percent, Some(0.0));
    }

    #[test]
    fn unknown_priorities_sort_last() {
        let a = ticket("T1", Priority::from("vip".to_string()), TicketStatus::Open);
        let b = ticket("T2", Priority::Low, TicketStatus::Open);
        let report = SlaReport::build(&[a, b], &SlaConfig::default(), t0());
        assert_eq!(report.by_priority[0].priority, Priority::Low);
        assert_eq!(
            report.by_priority[1].priority,
            Priority::Unrecognized("vip".to_string())
        );
    }
}
