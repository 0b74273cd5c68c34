use crate::calc;
use crate::ipc::error::ok;
use crate::ipc::helpers::{get_required_str, require_store, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{new_record_id, ExamReminder};
use crate::store::{Collection, EXAM_REMINDERS};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde_json::json;

const COLLECTION: Collection<ExamReminder> = Collection::new(EXAM_REMINDERS);

fn parse_exam_date(raw: &str) -> Result<DateTime<Utc>, HandlerErr> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| HandlerErr::bad_params("examDate must be an RFC 3339 datetime"))
}

fn reminder_row(r: &ExamReminder, now: DateTime<Utc>) -> serde_json::Value {
    let days_left = calc::days_until(r.exam_date, now);
    json!({
        "id": r.id,
        "examName": r.exam_name,
        "subject": r.subject,
        "class": r.class,
        "examDate": r.exam_date,
        "daysLeft": days_left,
        "completed": days_left <= 0,
    })
}

fn reminders_list(conn: &Connection) -> Result<serde_json::Value, HandlerErr> {
    let reminders = COLLECTION.load(conn)?;
    let now = Utc::now();
    let rows: Vec<serde_json::Value> = reminders.iter().map(|r| reminder_row(r, now)).collect();
    Ok(json!({ "reminders": rows }))
}

fn reminders_upcoming(conn: &Connection) -> Result<serde_json::Value, HandlerErr> {
    let reminders = COLLECTION.load(conn)?;
    let now = Utc::now();
    let upcoming = calc::upcoming_reminders(&reminders, now);
    let rows: Vec<serde_json::Value> = upcoming.iter().map(|r| reminder_row(r, now)).collect();
    Ok(json!({
        "nextExam": rows.first(),
        "upcoming": rows,
    }))
}

fn reminders_create(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let reminder = ExamReminder {
        id: new_record_id(),
        exam_name: get_required_str(params, "examName")?,
        subject: get_required_str(params, "subject")?,
        class: get_required_str(params, "class")?,
        exam_date: parse_exam_date(&get_required_str(params, "examDate")?)?,
    };
    let mut reminders = COLLECTION.load(conn)?;
    reminders.push(reminder.clone());
    COLLECTION.replace(conn, &reminders)?;
    Ok(json!({ "reminder": reminder }))
}

fn reminders_delete(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let reminder_id = get_required_str(params, "reminderId")?;
    let mut reminders = COLLECTION.load(conn)?;
    let before = reminders.len();
    reminders.retain(|r| r.id != reminder_id);
    if reminders.len() == before {
        return Err(HandlerErr::not_found("reminder not found"));
    }
    COLLECTION.replace(conn, &reminders)?;
    Ok(json!({ "ok": true }))
}

fn dispatch(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match require_store(&state.store) {
        Ok(c) => c,
        Err(e) => return e.response(&req.id),
    };
    let outcome = match req.method.as_str() {
        "reminders.list" => reminders_list(conn),
        "reminders.upcoming" => reminders_upcoming(conn),
        "reminders.create" => reminders_create(conn, &req.params),
        _ => reminders_delete(conn, &req.params),
    };
    match outcome {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reminders.list" | "reminders.upcoming" | "reminders.create" | "reminders.delete" => {
            Some(dispatch(state, req))
        }
        _ => None,
    }
}
