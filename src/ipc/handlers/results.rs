use crate::calc;
use crate::ipc::error::ok;
use crate::ipc::helpers::{get_required_str, require_store, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{new_record_id, ExamResult, MARKS_PER_SUBJECT, RESULT_SUBJECTS};
use crate::store::{Collection, RESULTS};
use rusqlite::Connection;
use serde_json::json;
use std::collections::BTreeMap;

const COLLECTION: Collection<ExamResult> = Collection::new(RESULTS);

/// Marks come in as an object over the fixed subject set; a missing
/// subject counts as zero, an unknown one is rejected.
fn parse_subjects(params: &serde_json::Value) -> Result<BTreeMap<String, u32>, HandlerErr> {
    let Some(raw) = params.get("subjects").and_then(|v| v.as_object()) else {
        return Err(HandlerErr::bad_params("missing subjects object"));
    };
    let mut subjects: BTreeMap<String, u32> = RESULT_SUBJECTS
        .iter()
        .map(|s| (s.to_string(), 0))
        .collect();
    for (subject, marks) in raw {
        if !RESULT_SUBJECTS.contains(&subject.as_str()) {
            return Err(HandlerErr::bad_params(format!(
                "unknown subject: {}",
                subject
            )));
        }
        let Some(marks) = marks.as_u64() else {
            return Err(HandlerErr::bad_params(format!(
                "marks for {} must be a non-negative integer",
                subject
            )));
        };
        if marks > u64::from(MARKS_PER_SUBJECT) {
            return Err(HandlerErr::bad_params(format!(
                "marks for {} exceed {}",
                subject, MARKS_PER_SUBJECT
            )));
        }
        subjects.insert(subject.clone(), marks as u32);
    }
    Ok(subjects)
}

fn results_add(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_name = get_required_str(params, "studentName")?;
    let student_roll = get_required_str(params, "studentRoll")?;
    let subjects = parse_subjects(params)?;

    let result = ExamResult {
        id: new_record_id(),
        student_roll,
        student_name,
        total_marks: calc::total_marks(&subjects),
        grade: calc::grade_for_subjects(&subjects).to_string(),
        subjects,
    };
    let mut results = COLLECTION.load(conn)?;
    results.push(result.clone());
    COLLECTION.replace(conn, &results)?;
    Ok(json!({ "result": result }))
}

fn results_list(conn: &Connection) -> Result<serde_json::Value, HandlerErr> {
    let results = COLLECTION.load(conn)?;
    Ok(json!({ "results": results }))
}

fn results_leaderboard(conn: &Connection) -> Result<serde_json::Value, HandlerErr> {
    let results = COLLECTION.load(conn)?;
    Ok(json!({ "leaderboard": calc::leaderboard(&results) }))
}

fn results_lookup(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let roll = get_required_str(params, "rollNumber")?;
    let results = COLLECTION.load(conn)?;
    let found = results.iter().find(|r| r.student_roll == roll);
    Ok(json!({ "result": found }))
}

fn results_delete(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let result_id = get_required_str(params, "resultId")?;
    let mut results = COLLECTION.load(conn)?;
    let before = results.len();
    results.retain(|r| r.id != result_id);
    if results.len() == before {
        return Err(HandlerErr::not_found("result not found"));
    }
    COLLECTION.replace(conn, &results)?;
    Ok(json!({ "ok": true }))
}

fn dispatch(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match require_store(&state.store) {
        Ok(c) => c,
        Err(e) => return e.response(&req.id),
    };
    let outcome = match req.method.as_str() {
        "results.add" => results_add(conn, &req.params),
        "results.list" => results_list(conn),
        "results.leaderboard" => results_leaderboard(conn),
        "results.lookup" => results_lookup(conn, &req.params),
        _ => results_delete(conn, &req.params),
    };
    match outcome {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "results.add" | "results.list" | "results.leaderboard" | "results.lookup"
        | "results.delete" => Some(dispatch(state, req)),
        _ => None,
    }
}
