use crate::ipc::error::ok;
use crate::ipc::helpers::{get_optional_str, get_required_str, require_store, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{new_record_id, Role, User};
use crate::store;
use rusqlite::Connection;
use serde_json::json;

fn parse_role(raw: &str) -> Result<Role, HandlerErr> {
    match raw {
        "teacher" => Ok(Role::Teacher),
        "student" => Ok(Role::Student),
        other => Err(HandlerErr::bad_params(format!(
            "role must be teacher or student, got {}",
            other
        ))),
    }
}

fn session_login(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let role = parse_role(&get_required_str(params, "role")?)?;
    let name = get_required_str(params, "name")?;
    let roll_number = get_optional_str(params, "rollNumber");

    let user = User {
        id: new_record_id(),
        role,
        name,
        roll_number,
    };
    store::replace_object(conn, store::CURRENT_USER, &user)?;
    log::info!("session opened for {}", user.name);
    Ok(json!({ "user": user }))
}

fn session_current(conn: &Connection) -> Result<serde_json::Value, HandlerErr> {
    let user: Option<User> = store::load_object(conn, store::CURRENT_USER)?;
    Ok(json!({ "user": user }))
}

fn session_logout(conn: &Connection) -> Result<serde_json::Value, HandlerErr> {
    store::clear_object(conn, store::CURRENT_USER)?;
    Ok(json!({ "ok": true }))
}

/// The active user's display name, for addedBy stamps. Falls back to
/// "Unknown" when nobody is logged in, as the dashboard did.
pub fn current_user_name(conn: &Connection) -> String {
    store::load_object::<User>(conn, store::CURRENT_USER)
        .ok()
        .flatten()
        .map(|u| u.name)
        .unwrap_or_else(|| "Unknown".to_string())
}

/// The active user's roll number, when one was entered at login.
pub fn current_user_roll(conn: &Connection) -> Option<String> {
    store::load_object::<User>(conn, store::CURRENT_USER)
        .ok()
        .flatten()
        .and_then(|u| u.roll_number)
}

fn handle_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match require_store(&state.store) {
        Ok(c) => c,
        Err(e) => return e.response(&req.id),
    };
    match session_login(conn, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_current(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match require_store(&state.store) {
        Ok(c) => c,
        Err(e) => return e.response(&req.id),
    };
    match session_current(conn) {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

fn handle_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match require_store(&state.store) {
        Ok(c) => c,
        Err(e) => return e.response(&req.id),
    };
    match session_logout(conn) {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "session.login" => Some(handle_login(state, req)),
        "session.current" => Some(handle_current(state, req)),
        "session.logout" => Some(handle_logout(state, req)),
        _ => None,
    }
}
