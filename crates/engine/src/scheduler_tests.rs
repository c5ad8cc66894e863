// SPDX-License-Identifier: MIT

use super::*;
use chrono::Duration as ChronoDuration;

fn now() -> DateTime<Utc> {
    Utc::now()
}

#[test]
fn schedule_then_pop_due_returns_only_overdue_tasks() {
    let mut scheduler = Scheduler::new();
    let base = now();
    scheduler.schedule(JobKey::new("past"), base - ChronoDuration::seconds(5));
    scheduler.schedule(JobKey::new("future"), base + ChronoDuration::seconds(60));

    let due = scheduler.pop_due(base);
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].job_key, JobKey::new("past"));
    assert_eq!(scheduler.len(), 1);
}

#[test]
fn rescheduling_a_key_replaces_its_entry() {
    let mut scheduler = Scheduler::new();
    let base = now();
    scheduler.schedule(JobKey::new("job"), base + ChronoDuration::seconds(60));
    scheduler.schedule(JobKey::new("job"), base - ChronoDuration::seconds(1));

    assert_eq!(scheduler.len(), 1);
    let due = scheduler.pop_due(base);
    assert_eq!(due.len(), 1);
    assert!(scheduler.is_empty());
}

#[test]
fn peek_does_not_remove_the_entry() {
    let mut scheduler = Scheduler::new();
    let base = now();
    scheduler.schedule(JobKey::new("job"), base - ChronoDuration::seconds(1));
    assert!(scheduler.peek().is_some());
    assert_eq!(scheduler.len(), 1);
}

#[test]
fn clear_empties_the_schedule() {
    let mut scheduler = Scheduler::new();
    scheduler.schedule(JobKey::new("job"), now());
    scheduler.clear();
    assert!(scheduler.is_empty());
    assert!(scheduler.peek().is_none());
}

#[test]
fn tie_break_is_stable_insertion_order() {
    let mut scheduler = Scheduler::new();
    let when = now();
    scheduler.schedule(JobKey::new("first"), when);
    scheduler.schedule(JobKey::new("second"), when);
    let popped = scheduler.pop().unwrap();
    assert_eq!(popped.job_key, JobKey::new("first"));
}
