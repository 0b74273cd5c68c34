use crate::ipc::error::ok;
use crate::ipc::handlers::session::current_user_name;
use crate::ipc::helpers::{get_optional_str, get_required_str, require_store, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{new_record_id, DictionaryEntry};
use crate::store::{Collection, DICTIONARY};
use chrono::Utc;
use rusqlite::Connection;
use serde_json::json;

const COLLECTION: Collection<DictionaryEntry> = Collection::new(DICTIONARY);

fn dictionary_list(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let entries = COLLECTION.load(conn)?;
    let entries: Vec<DictionaryEntry> = match get_optional_str(params, "search") {
        Some(term) => {
            let needle = term.to_lowercase();
            entries
                .into_iter()
                .filter(|e| e.english.to_lowercase().contains(&needle) || e.bangla.contains(&term))
                .collect()
        }
        None => entries,
    };
    Ok(json!({ "entries": entries }))
}

fn dictionary_upsert(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    // Headwords are stored lowercased, as the dashboard normalized
    // them on entry.
    let english = get_required_str(params, "english")?.to_lowercase();
    let bangla = get_required_str(params, "bangla")?;

    let mut entries = COLLECTION.load(conn)?;
    let entry = match get_optional_str(params, "entryId") {
        Some(entry_id) => {
            let Some(slot) = entries.iter_mut().find(|e| e.id == entry_id) else {
                return Err(HandlerErr::not_found("dictionary entry not found"));
            };
            slot.english = english;
            slot.bangla = bangla;
            slot.added_by = current_user_name(conn);
            slot.timestamp = Utc::now();
            slot.clone()
        }
        None => {
            let entry = DictionaryEntry {
                id: new_record_id(),
                english,
                bangla,
                added_by: current_user_name(conn),
                timestamp: Utc::now(),
            };
            entries.push(entry.clone());
            entry
        }
    };
    COLLECTION.replace(conn, &entries)?;
    Ok(json!({ "entry": entry }))
}

fn dictionary_delete(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let entry_id = get_required_str(params, "entryId")?;
    let mut entries = COLLECTION.load(conn)?;
    let before = entries.len();
    entries.retain(|e| e.id != entry_id);
    if entries.len() == before {
        return Err(HandlerErr::not_found("dictionary entry not found"));
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
        "dictionary.list" => dictionary_list(conn, &req.params),
        "dictionary.upsert" => dictionary_upsert(conn, &req.params),
        _ => dictionary_delete(conn, &req.params),
    };
    match outcome {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dictionary.list" | "dictionary.upsert" | "dictionary.delete" => {
            Some(dispatch(state, req))
        }
        _ => None,
    }
}
