use crate::calc;
use crate::ipc::error::ok;
use crate::ipc::handlers::session::{current_user_name, current_user_roll};
use crate::ipc::helpers::{get_optional_str, get_required_str, require_store, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{new_record_id, BudgetCategory, BudgetEntry};
use crate::store::{Collection, BUDGET_ENTRIES};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde_json::json;

const COLLECTION: Collection<BudgetEntry> = Collection::new(BUDGET_ENTRIES);

fn budget_list(conn: &Connection) -> Result<serde_json::Value, HandlerErr> {
    let entries = COLLECTION.load(conn)?;
    Ok(json!({ "entries": entries }))
}

fn budget_create(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let category_raw = get_required_str(params, "category")?;
    let Some(category) = BudgetCategory::parse(&category_raw) else {
        return Err(HandlerErr::bad_params(format!(
            "unknown category: {}",
            category_raw
        )));
    };
    let amount = params
        .get("amount")
        .and_then(|v| v.as_f64())
        .ok_or_else(|| HandlerErr::bad_params("missing amount"))?;
    if amount < 0.0 {
        return Err(HandlerErr::bad_params("amount must not be negative"));
    }
    let date = NaiveDate::parse_from_str(&get_required_str(params, "date")?, "%Y-%m-%d")
        .map_err(|_| HandlerErr::bad_params("date must be YYYY-MM-DD"))?;

    // A student logging their own expense can omit the roll; it falls
    // back to the session's roll number.
    let student_roll = match get_optional_str(params, "studentRoll") {
        Some(r) => r,
        None => current_user_roll(conn)
            .ok_or_else(|| HandlerErr::bad_params("missing studentRoll"))?,
    };

    let entry = BudgetEntry {
        id: new_record_id(),
        student_roll,
        category,
        description: get_required_str(params, "description")?,
        amount,
        date,
        added_by: current_user_name(conn),
    };
    let mut entries = COLLECTION.load(conn)?;
    entries.push(entry.clone());
    COLLECTION.replace(conn, &entries)?;
    Ok(json!({ "entry": entry }))
}

fn budget_monthly(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let month = get_required_str(params, "month")?;
    if month.len() != 7 || month.as_bytes()[4] != b'-' {
        return Err(HandlerErr::bad_params("month must be YYYY-MM"));
    }
    let roll = get_optional_str(params, "rollNumber");
    let entries = COLLECTION.load(conn)?;
    let summary = calc::monthly_budget(&entries, &month, roll.as_deref());
    serde_json::to_value(summary).map_err(|e| HandlerErr::new("db_read_failed", e.to_string()))
}

fn budget_delete(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let entry_id = get_required_str(params, "entryId")?;
    let mut entries = COLLECTION.load(conn)?;
    let before = entries.len();
    entries.retain(|e| e.id != entry_id);
    if entries.len() == before {
        return Err(HandlerErr::not_found("budget entry not found"));
    }
    COLLECTION.replace(conn, &entries)?;
    Ok(json!({ "ok": true }))
}

fn dispatch(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match require_store(&state.store) {
        Ok(c) => c,
        Err(e) => return e.response(&req.id),
    };
    let outcome = match req.method.as_str() {
        "budget.list" => budget_list(conn),
        "budget.create" => budget_create(conn, &req.params),
        "budget.monthly" => budget_monthly(conn, &req.params),
        _ => budget_delete(conn, &req.params),
    };
    match outcome {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "budget.list" | "budget.create" | "budget.monthly" | "budget.delete" => {
            Some(dispatch(state, req))
        }
        _ => None,
    }
}
