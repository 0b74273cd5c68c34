use crate::ipc::error::ok;
use crate::ipc::helpers::{get_optional_str, get_required_str, require_store, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{new_record_id, SeatPlan, SEAT_COLS, SEAT_ROWS};
use crate::store::{Collection, SEAT_PLANS};
use rusqlite::Connection;
use serde_json::json;
use std::collections::BTreeMap;

const COLLECTION: Collection<SeatPlan> = Collection::new(SEAT_PLANS);

/// Seat keys are "row-col" with 0-based positions inside the fixed
/// 5x6 grid. Blank occupant names are dropped rather than stored.
fn parse_seats(params: &serde_json::Value) -> Result<BTreeMap<String, String>, HandlerErr> {
    let Some(raw) = params.get("seats").and_then(|v| v.as_object()) else {
        return Err(HandlerErr::bad_params("missing seats object"));
    };
    let mut seats = BTreeMap::new();
    for (pos, occupant) in raw {
        let Some((row, col)) = pos.split_once('-') else {
            return Err(HandlerErr::bad_params(format!(
                "seat position must be row-col, got {}",
                pos
            )));
        };
        let row: usize = row
            .parse()
            .map_err(|_| HandlerErr::bad_params(format!("bad seat row in {}", pos)))?;
        let col: usize = col
            .parse()
            .map_err(|_| HandlerErr::bad_params(format!("bad seat col in {}", pos)))?;
        if row >= SEAT_ROWS || col >= SEAT_COLS {
            return Err(HandlerErr::bad_params(format!(
                "seat {} outside the {}x{} grid",
                pos, SEAT_ROWS, SEAT_COLS
            )));
        }
        let Some(name) = occupant.as_str() else {
            return Err(HandlerErr::bad_params(format!(
                "occupant for {} must be a string",
                pos
            )));
        };
        let name = name.trim();
        if !name.is_empty() {
            seats.insert(pos.clone(), name.to_string());
        }
    }
    Ok(seats)
}

fn seating_list(conn: &Connection) -> Result<serde_json::Value, HandlerErr> {
    let plans = COLLECTION.load(conn)?;
    Ok(json!({
        "plans": plans,
        "rows": SEAT_ROWS,
        "cols": SEAT_COLS,
    }))
}

fn seating_save(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let class = get_required_str(params, "class")?;
    let branch = get_required_str(params, "branch")?;
    let seats = parse_seats(params)?;

    let mut plans = COLLECTION.load(conn)?;
    let plan = match get_optional_str(params, "planId") {
        Some(plan_id) => {
            let Some(slot) = plans.iter_mut().find(|p| p.id == plan_id) else {
                return Err(HandlerErr::not_found("seat plan not found"));
            };
            slot.class = class;
            slot.branch = branch;
            slot.seats = seats;
            slot.clone()
        }
        None => {
            let plan = SeatPlan {
                id: new_record_id(),
                class,
                branch,
                seats,
            };
            plans.push(plan.clone());
            plan
        }
    };
    COLLECTION.replace(conn, &plans)?;
    Ok(json!({ "plan": plan }))
}

fn seating_delete(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let plan_id = get_required_str(params, "planId")?;
    let mut plans = COLLECTION.load(conn)?;
    let before = plans.len();
    plans.retain(|p| p.id != plan_id);
    if plans.len() == before {
        return Err(HandlerErr::not_found("seat plan not found"));
    }
    COLLECTION.replace(conn, &plans)?;
    Ok(json!({ "ok": true }))
}

fn dispatch(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match require_store(&state.store) {
        Ok(c) => c,
        Err(e) => return e.response(&req.id),
    };
    let outcome = match req.method.as_str() {
        "seating.list" => seating_list(conn),
        "seating.save" => seating_save(conn, &req.params),
        _ => seating_delete(conn, &req.params),
    };
    match outcome {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "seating.list" | "seating.save" | "seating.delete" => Some(dispatch(state, req)),
        _ => None,
    }
}
