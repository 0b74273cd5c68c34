use crate::ipc::error::ok;
use crate::ipc::helpers::{get_required_str, require_store, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{new_record_id, CareerGoal};
use crate::store::{Collection, CAREER_GOALS};
use rusqlite::Connection;
use serde_json::json;

const COLLECTION: Collection<CareerGoal> = Collection::new(CAREER_GOALS);

fn parse_based_on_results(params: &serde_json::Value) -> bool {
    params
        .get("basedOnResults")
        .and_then(|v| v.as_bool())
        .unwrap_or(true)
}

fn career_list(conn: &Connection) -> Result<serde_json::Value, HandlerErr> {
    let goals = COLLECTION.load(conn)?;
    Ok(json!({ "goals": goals }))
}

fn career_assign(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    // A second goal for the same roll is stored as-is; one-per-student
    // is a UI convention, not a constraint here.
    let goal = CareerGoal {
        id: new_record_id(),
        student_roll: get_required_str(params, "studentRoll")?,
        student_name: get_required_str(params, "studentName")?,
        assigned_goal: get_required_str(params, "assignedGoal")?,
        description: get_required_str(params, "description")?,
        based_on_results: parse_based_on_results(params),
    };
    let mut goals = COLLECTION.load(conn)?;
    goals.push(goal.clone());
    COLLECTION.replace(conn, &goals)?;
    Ok(json!({ "goal": goal }))
}

fn career_update(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let goal_id = get_required_str(params, "goalId")?;
    let student_roll = get_required_str(params, "studentRoll")?;
    let student_name = get_required_str(params, "studentName")?;
    let assigned_goal = get_required_str(params, "assignedGoal")?;
    let description = get_required_str(params, "description")?;
    let based_on_results = parse_based_on_results(params);

    let mut goals = COLLECTION.load(conn)?;
    let Some(slot) = goals.iter_mut().find(|g| g.id == goal_id) else {
        return Err(HandlerErr::not_found("career goal not found"));
    };
    slot.student_roll = student_roll;
    slot.student_name = student_name;
    slot.assigned_goal = assigned_goal;
    slot.description = description;
    slot.based_on_results = based_on_results;
    let updated = slot.clone();
    COLLECTION.replace(conn, &goals)?;
    Ok(json!({ "goal": updated }))
}

fn career_lookup(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let roll = get_required_str(params, "rollNumber")?;
    let goals = COLLECTION.load(conn)?;
    let found = goals.iter().find(|g| g.student_roll == roll);
    Ok(json!({ "goal": found }))
}

fn career_delete(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let goal_id = get_required_str(params, "goalId")?;
    let mut goals = COLLECTION.load(conn)?;
    let before = goals.len();
    goals.retain(|g| g.id != goal_id);
    if goals.len() == before {
        return Err(HandlerErr::not_found("career goal not found"));
    }
    COLLECTION.replace(conn, &goals)?;
    Ok(json!({ "ok": true }))
}

fn dispatch(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match require_store(&state.store) {
        Ok(c) => c,
        Err(e) => return e.response(&req.id),
    };
    let outcome = match req.method.as_str() {
        "career.list" => career_list(conn),
        "career.assign" => career_assign(conn, &req.params),
        "career.update" => career_update(conn, &req.params),
        "career.lookup" => career_lookup(conn, &req.params),
        _ => career_delete(conn, &req.params),
    };
    match outcome {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "career.list" | "career.assign" | "career.update" | "career.lookup"
        | "career.delete" => Some(dispatch(state, req)),
        _ => None,
    }
}
