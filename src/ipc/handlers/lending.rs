use crate::ipc::error::ok;
use crate::ipc::helpers::{get_optional_str, get_required_str, require_store, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{new_record_id, BookLending};
use crate::store::{Collection, BOOK_LENDINGS};
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use serde_json::json;

const COLLECTION: Collection<BookLending> = Collection::new(BOOK_LENDINGS);

fn parse_date(raw: &str, key: &str) -> Result<NaiveDate, HandlerErr> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| HandlerErr::bad_params(format!("{} must be YYYY-MM-DD", key)))
}

fn lending_list(conn: &Connection) -> Result<serde_json::Value, HandlerErr> {
    let lendings = COLLECTION.load(conn)?;
    let (returned, active): (Vec<&BookLending>, Vec<&BookLending>) =
        lendings.iter().partition(|l| l.is_returned());
    Ok(json!({
        "active": active,
        "returned": returned,
        "total": lendings.len(),
    }))
}

fn lending_create(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let borrow_date = parse_date(&get_required_str(params, "borrowDate")?, "borrowDate")?;
    let return_date = match get_optional_str(params, "returnDate") {
        Some(raw) => Some(parse_date(&raw, "returnDate")?),
        None => None,
    };
    let lending = BookLending {
        id: new_record_id(),
        book_id: get_required_str(params, "bookId")?,
        book_name: get_required_str(params, "bookName")?,
        borrower_name: get_required_str(params, "borrowerName")?,
        borrower_roll: get_required_str(params, "borrowerRoll")?,
        borrow_date,
        return_date,
    };
    let mut lendings = COLLECTION.load(conn)?;
    lendings.push(lending.clone());
    COLLECTION.replace(conn, &lendings)?;
    Ok(json!({ "lending": lending }))
}

fn lending_mark_returned(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let lending_id = get_required_str(params, "lendingId")?;
    let mut lendings = COLLECTION.load(conn)?;
    let Some(slot) = lendings.iter_mut().find(|l| l.id == lending_id) else {
        return Err(HandlerErr::not_found("lending record not found"));
    };
    slot.return_date = Some(Utc::now().date_naive());
    let updated = slot.clone();
    COLLECTION.replace(conn, &lendings)?;
    Ok(json!({ "lending": updated }))
}

fn lending_delete(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let lending_id = get_required_str(params, "lendingId")?;
    let mut lendings = COLLECTION.load(conn)?;
    let before = lendings.len();
    lendings.retain(|l| l.id != lending_id);
    if lendings.len() == before {
        return Err(HandlerErr::not_found("lending record not found"));
    }
    COLLECTION.replace(conn, &lendings)?;
    Ok(json!({ "ok": true }))
}

fn dispatch(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match require_store(&state.store) {
        Ok(c) => c,
        Err(e) => return e.response(&req.id),
    };
    let outcome = match req.method.as_str() {
        "lending.list" => lending_list(conn),
        "lending.create" => lending_create(conn, &req.params),
        "lending.markReturned" => lending_mark_returned(conn, &req.params),
        _ => lending_delete(conn, &req.params),
    };
    match outcome {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "lending.list" | "lending.create" | "lending.markReturned" | "lending.delete" => {
            Some(dispatch(state, req))
        }
        _ => None,
    }
}
