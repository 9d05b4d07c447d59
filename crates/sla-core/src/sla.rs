//! SLA engine: deadline resolution, per-track status, remaining time and the
//! color classes the dashboards render.
//!
//! Every entry point takes the evaluation time `now` explicitly. Nothing here
//! reads the clock except [`summarize_now`], which reads it once.

use crate::ticket::Ticket;
use crate::types::{ColorToken, Priority, SlaStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MS_PER_HOUR: f64 = 3_600_000.0;

pub const BREACHED_LABEL: &str = "Breached";

// ---------------------------------------------------------------------------
// Policy and resolved windows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaPolicy {
    pub priority: Priority,
    pub response_time_hours: f64,
    pub resolution_time_hours: f64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlaTimes {
    pub response_hours: f64,
    pub resolution_hours: f64,
}

/// Built-in windows used when no policy applies.
pub fn default_times(priority: &Priority) -> SlaTimes {
    let (response_hours, resolution_hours) = match priority {
        Priority::Critical => (1.0, 4.0),
        Priority::High => (4.0, 24.0),
        Priority::Medium => (8.0, 48.0),
        Priority::Low => (24.0, 120.0),
        // Unrecognized priorities quietly get medium windows. Kept as-is
        // until product decides whether they should be rejected instead.
        Priority::Unrecognized(_) => (8.0, 48.0),
    };
    SlaTimes {
        response_hours,
        resolution_hours,
    }
}

/// Resolve the allowed windows for a priority.
///
/// `policy` is trusted to be active and priority-matched; its hours win
/// verbatim over the default table.
pub fn resolve_sla_times(priority: &Priority, policy: Option<&SlaPolicy>) -> SlaTimes {
    match policy {
        Some(p) => SlaTimes {
            response_hours: p.response_time_hours,
            resolution_hours: p.resolution_time_hours,
        },
        None => default_times(priority),
    }
}

// ---------------------------------------------------------------------------
// Track calculation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlaTrackResult {
    pub status: SlaStatus,
    pub hours_elapsed: f64,
    pub hours_allowed: f64,
    pub percent_used: f64,
}

fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / MS_PER_HOUR
}

fn evaluate_track(
    created_at: DateTime<Utc>,
    end_time: DateTime<Utc>,
    hours_allowed: f64,
    finished: bool,
) -> SlaTrackResult {
    let hours_elapsed = hours_between(created_at, end_time);
    let status = if finished {
        if hours_elapsed <= hours_allowed {
            SlaStatus::OnTime
        } else {
            SlaStatus::Breached
        }
    } else if hours_elapsed > hours_allowed {
        SlaStatus::Breached
    } else {
        SlaStatus::Pending
    };
    SlaTrackResult {
        status,
        hours_elapsed,
        hours_allowed,
        percent_used: hours_elapsed / hours_allowed * 100.0,
    }
}

/// Response track. Completion is detected by `first_response_at` being set,
/// and once set the verdict no longer depends on `now`.
pub fn compute_response_sla(
    ticket: &Ticket,
    policy: Option<&SlaPolicy>,
    now: DateTime<Utc>,
) -> SlaTrackResult {
    let allowed = resolve_sla_times(&ticket.priority, policy).response_hours;
    let end_time = ticket.first_response_at.unwrap_or(now);
    evaluate_track(
        ticket.created_at,
        end_time,
        allowed,
        ticket.first_response_at.is_some(),
    )
}

/// Resolution track. Completion is detected by the ticket status, not by
/// `resolved_at`; a ticket carrying `resolved_at` while still open is scored
/// as unfinished.
pub fn compute_resolution_sla(
    ticket: &Ticket,
    policy: Option<&SlaPolicy>,
    now: DateTime<Utc>,
) -> SlaTrackResult {
    let allowed = resolve_sla_times(&ticket.priority, policy).resolution_hours;
    let end_time = ticket.resolved_at.unwrap_or(now);
    evaluate_track(
        ticket.created_at,
        end_time,
        allowed,
        ticket.status.is_finished(),
    )
}

// ---------------------------------------------------------------------------
// Remaining time and formatting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Remaining {
    pub hours_remaining: f64,
    pub formatted: String,
    pub is_breached: bool,
}

pub fn compute_remaining(hours_elapsed: f64, hours_allowed: f64) -> Remaining {
    let hours_remaining = hours_allowed - hours_elapsed;
    let is_breached = hours_remaining <= 0.0;
    let formatted = if is_breached {
        BREACHED_LABEL.to_string()
    } else {
        format_duration(hours_remaining)
    };
    Remaining {
        hours_remaining,
        formatted,
        is_breached,
    }
}

/// Halves round toward positive infinity (2.5 -> 3, -2.5 -> -2).
fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

/// Render an hour count as `"45 min"`, `"5 hrs"`, `"2 days"` or `"1d 6h"`.
///
/// The hour remainder is rounded after the day split, so 47.6 renders as
/// `"1d 24h"` rather than carrying into the day count.
pub fn format_duration(hours: f64) -> String {
    if hours < 1.0 {
        return format!("{} min", round_half_up(hours * 60.0));
    }
    if hours < 24.0 {
        return format!("{} hrs", round_half_up(hours));
    }
    let days = (hours / 24.0).floor() as i64;
    let remaining_hours = round_half_up(hours % 24.0);
    if remaining_hours == 0 {
        let plural = if days > 1 { "s" } else { "" };
        format!("{days} day{plural}")
    } else {
        format!("{days}d {remaining_hours}h")
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

pub fn is_breach_imminent(percent_used: f64) -> bool {
    percent_used > 80.0 && percent_used < 100.0
}

pub fn status_color(status: SlaStatus) -> ColorToken {
    match status {
        SlaStatus::OnTime => ColorToken::Green,
        SlaStatus::Breached => ColorToken::Red,
        SlaStatus::Pending => ColorToken::Yellow,
    }
}

pub fn progress_color(percent_used: f64) -> ColorToken {
    if percent_used < 50.0 {
        ColorToken::Green
    } else if percent_used < 80.0 {
        ColorToken::Yellow
    } else if percent_used < 100.0 {
        ColorToken::Orange
    } else {
        ColorToken::Red
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSummary {
    #[serde(flatten)]
    pub result: SlaTrackResult,
    #[serde(flatten)]
    pub remaining: Remaining,
    pub status_color: ColorToken,
    pub progress_color: ColorToken,
    pub is_imminent: bool,
}

impl TrackSummary {
    fn from_result(result: SlaTrackResult) -> Self {
        Self {
            remaining: compute_remaining(result.hours_elapsed, result.hours_allowed),
            status_color: status_color(result.status),
            progress_color: progress_color(result.percent_used),
            is_imminent: is_breach_imminent(result.percent_used),
            result,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaSummary {
    pub response: TrackSummary,
    pub solving: TrackSummary,
}

pub fn summarize(ticket: &Ticket, policy: Option<&SlaPolicy>, now: DateTime<Utc>) -> SlaSummary {
    let response = TrackSummary::from_result(compute_response_sla(ticket, policy, now));
    let solving = TrackSummary::from_result(compute_resolution_sla(ticket, policy, now));
    tracing::debug!(
        ticket = %ticket.id,
        response = %response.result.status,
        solving = %solving.result.status,
        "evaluated sla"
    );
    SlaSummary { response, solving }
}

pub fn summarize_now(ticket: &Ticket, policy: Option<&SlaPolicy>) -> SlaSummary {
    summarize(ticket, policy, Utc::now())
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

    fn ticket(priority: Priority) -> Ticket {
        Ticket {
            id: "T1".to_string(),
            title: "Printer on fire".to_string(),
            priority,
            status: TicketStatus::Open,
            created_at: t0(),
            first_response_at: None,
            resolved_at: None,
        }
    }

    fn policy(response: f64, resolution: f64) -> SlaPolicy {
        SlaPolicy {
            priority: Priority::High,
            response_time_hours: response,
            resolution_time_hours: resolution,
            is_active: true,
        }
    }

    #[test]
    fn default_table_is_complete() {
        let expected = [
            (Priority::Critical, 1.0, 4.0),
            (Priority::High, 4.0, 24.0),
            (Priority::Medium, 8.0, 48.0),
            (Priority::Low, 24.0, 120.0),
        ];
        for (priority, response, resolution) in expected {
            let times = resolve_sla_times(&priority, None);
            assert_eq!(times.response_hours, response, "{priority}");
            assert_eq!(times.resolution_hours, resolution, "{priority}");
        }
    }

    #[test]
    fn unknown_priority_falls_back_to_medium() {
        let unknown = Priority::from("unknown".to_string());
        assert_eq!(
            resolve_sla_times(&unknown, None),
            resolve_sla_times(&Priority::Medium, None)
        );
    }

    #[test]
    fn policy_overrides_defaults_verbatim() {
        let p = policy(0.5, 7.25);
        let times = resolve_sla_times(&Priority::Critical, Some(&p));
        assert_eq!(times.response_hours, 0.5);
        assert_eq!(times.resolution_hours, 7.25);
    }

    #[test]
    fn response_pending_before_deadline() {
        let t = ticket(Priority::High);
        let r = compute_response_sla(&t, None, t0() + Duration::hours(2));
        assert_eq!(r.status, SlaStatus::Pending);
        assert_eq!(r.hours_allowed, 4.0);
        assert!((r.percent_used - 50.0).abs() < 1e-9);
    }

    #[test]
    fn response_breached_without_reply() {
        let t = ticket(Priority::High);
        let r = compute_response_sla(&t, None, t0() + Duration::hours(5));
        assert_eq!(r.status, SlaStatus::Breached);
        assert!(r.percent_used > 100.0);
    }

    #[test]
    fn response_exactly_at_deadline_is_still_pending() {
        let t = ticket(Priority::High);
        let r = compute_response_sla(&t, None, t0() + Duration::hours(4));
        assert_eq!(r.status, SlaStatus::Pending);
    }

    #[test]
    fn on_time_response() {
        let mut t = ticket(Priority::High);
        t.first_response_at = Some(t0() + Duration::hours(3));
        let r = compute_response_sla(&t, None, t0() + Duration::days(30));
        assert_eq!(r.status, SlaStatus::OnTime);
        assert_eq!(r.hours_elapsed, 3.0);

        t.first_response_at = Some(t0() + Duration::hours(4));
        assert_eq!(compute_response_sla(&t, None, t0()).status, SlaStatus::OnTime);
    }

    #[test]
    fn late_response_stays_breached_regardless_of_now() {
        let mut t = ticket(Priority::High);
        t.first_response_at = Some(t0() + Duration::hours(10));
        for now in [t0(), t0() + Duration::hours(11), t0() + Duration::days(90)] {
            let r = compute_response_sla(&t, None, now);
            assert_eq!(r.status, SlaStatus::Breached);
            assert_eq!(r.hours_elapsed, 10.0);
        }
    }

    #[test]
    fn resolution_keyed_on_status_not_resolved_at() {
        let mut t = ticket(Priority::High);
        t.resolved_at = Some(t0() + Duration::hours(2));
        let r = compute_resolution_sla(&t, None, t0() + Duration::hours(3));
        assert_eq!(r.status, SlaStatus::Pending);

        t.resolved_at = Some(t0() + Duration::hours(30));
        let r = compute_resolution_sla(&t, None, t0() + Duration::hours(31));
        assert_eq!(r.status, SlaStatus::Breached);
    }

    #[test]
    fn resolved_and_closed_are_terminal() {
        for status in [TicketStatus::Resolved, TicketStatus::Closed] {
            let mut t = ticket(Priority::Critical);
            t.status = status;
            t.resolved_at = Some(t0() + Duration::hours(3));
            let r = compute_resolution_sla(&t, None, t0() + Duration::days(2));
            assert_eq!(r.status, SlaStatus::OnTime, "{status}");
            assert_eq!(r.hours_elapsed, 3.0);
        }
    }

    #[test]
    fn resolved_without_timestamp_measures_to_now() {
        let mut t = ticket(Priority::Critical);
        t.status = TicketStatus::Resolved;
        let r = compute_resolution_sla(&t, None, t0() + Duration::hours(6));
        assert_eq!(r.status, SlaStatus::Breached);
        assert_eq!(r.hours_elapsed, 6.0);
    }

    #[test]
    fn policy_applies_to_both_tracks() {
        let t = ticket(Priority::High);
        let p = policy(0.5, 2.0);
        let now = t0() + Duration::hours(1);
        assert_eq!(compute_response_sla(&t, Some(&p), now).status, SlaStatus::Breached);
        assert_eq!(compute_resolution_sla(&t, Some(&p), now).status, SlaStatus::Pending);
    }

    #[test]
    fn elapsed_is_monotonic_in_now() {
        let t = ticket(Priority::Medium);
        let mut last = f64::MIN;
        for minutes in (0..2000).step_by(37) {
            let r = compute_resolution_sla(&t, None, t0() + Duration::minutes(minutes));
            assert!(r.hours_elapsed >= last);
            assert!(r.percent_used >= 0.0);
            last = r.hours_elapsed;
        }
    }

    #[test]
    fn inconsistent_timestamps_are_not_clamped() {
        let mut t = ticket(Priority::High);
        t.first_response_at = Some(t0() - Duration::hours(1));
        let r = compute_response_sla(&t, None, t0());
        assert_eq!(r.hours_elapsed, -1.0);
        assert_eq!(r.status, SlaStatus::OnTime);
    }

    #[test]
    fn remaining_breach_flag() {
        let r = compute_remaining(5.0, 4.0);
        assert!(r.is_breached);
        assert_eq!(r.formatted, "Breached");
        assert_eq!(r.hours_remaining, -1.0);

        let r = compute_remaining(4.0, 4.0);
        assert!(r.is_breached);

        let r = compute_remaining(1.0, 4.0);
        assert!(!r.is_breached);
        assert_eq!(r.formatted, "3 hrs");
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(0.5), "30 min");
        assert_eq!(format_duration(0.25), "15 min");
        assert_eq!(format_duration(1.5), "2 hrs");
        assert_eq!(format_duration(2.49), "2 hrs");
        assert_eq!(format_duration(25.0), "1d 1h");
        assert_eq!(format_duration(24.0), "1 day");
        assert_eq!(format_duration(48.0), "2 days");
        assert_eq!(format_duration(60.0), "2d 12h");
    }

    #[test]
    fn duration_rounding_edges() {
        // Rounds up to the next unit label without switching units.
        assert_eq!(format_duration(0.9999), "60 min");
        assert_eq!(format_duration(23.6), "24 hrs");
        assert_eq!(format_duration(47.6), "1d 24h");
        assert_eq!(format_duration(24.2), "1 day");
    }

    #[test]
    fn imminence_boundaries() {
        assert!(!is_breach_imminent(80.0));
        assert!(is_breach_imminent(80.01));
        assert!(is_breach_imminent(99.99));
        assert!(!is_breach_imminent(100.0));
        assert!(!is_breach_imminent(150.0));
    }

    #[test]
    fn status_colors() {
        assert_eq!(status_color(SlaStatus::OnTime), ColorToken::Green);
        assert_eq!(status_color(SlaStatus::Breached), ColorToken::Red);
        assert_eq!(status_color(SlaStatus::Pending), ColorToken::Yellow);
    }

    #[test]
    fn progress_color_thresholds() {
        assert_eq!(progress_color(0.0), ColorToken::Green);
        assert_eq!(progress_color(49.9), ColorToken::Green);
        assert_eq!(progress_color(50.0), ColorToken::Yellow);
        assert_eq!(progress_color(79.9), ColorToken::Yellow);
        assert_eq!(progress_color(80.0), ColorToken::Orange);
        assert_eq!(progress_color(99.9), ColorToken::Orange);
        assert_eq!(progress_color(100.0), ColorToken::Red);
        assert_eq!(progress_color(340.0), ColorToken::Red);
    }

    #[test]
    fn summary_combines_both_tracks() {
        let t = ticket(Priority::High);
        let s = summarize(&t, None, t0() + Duration::hours(3) + Duration::minutes(30));

        assert_eq!(s.response.result.status, SlaStatus::Pending);
        assert!(s.response.is_imminent);
        assert_eq!(s.response.progress_color, ColorToken::Orange);
        assert_eq!(s.response.status_color, ColorToken::Yellow);
        assert_eq!(s.response.remaining.formatted, "30 min");

        assert_eq!(s.solving.result.status, SlaStatus::Pending);
        assert!(!s.solving.is_imminent);
        assert_eq!(s.solving.progress_color, ColorToken::Green);
        assert_eq!(s.solving.remaining.formatted, "21 hrs");
    }

    #[test]
    fn summarize_now_on_fresh_ticket() {
        let mut t = ticket(Priority::Low);
        t.created_at = Utc::now();
        let v = serde_json::to_value(summarize_now(&t, None)).unwrap();
        assert_eq!(v["response"]["status"], "pending");
        assert_eq!(v["solving"]["status"], "pending");
        assert_eq!(v["solving"]["hours_allowed"], 120.0);
    }

    #[test]
    fn summary_json_shape() {
        let t = ticket(Priority::Low);
        let s = summarize(&t, None, t0() + Duration::hours(1));
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["response"]["status"], "pending");
        assert_eq!(v["response"]["hours_allowed"], 24.0);
        assert_eq!(v["solving"]["formatted"], "4d 23h");
        assert_eq!(v["solving"]["status_color"], "yellow");
    }
}
