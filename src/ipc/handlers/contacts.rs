use crate::ipc::error::ok;
use crate::ipc::handlers::session::current_user_name;
use crate::ipc::helpers::{get_optional_str, get_required_str, require_store, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{new_record_id, Contact, Role};
use crate::store::{Collection, CONTACTS};
use rusqlite::Connection;
use serde_json::json;

const COLLECTION: Collection<Contact> = Collection::new(CONTACTS);

fn contacts_list(conn: &Connection) -> Result<serde_json::Value, HandlerErr> {
    let contacts = COLLECTION.load(conn)?;
    let (teachers, students): (Vec<&Contact>, Vec<&Contact>) = contacts
        .iter()
        .partition(|c| c.role == Role::Teacher);
    Ok(json!({
        "teachers": teachers,
        "students": students,
    }))
}

fn contacts_save(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let name = get_required_str(params, "name")?;
    let role = match get_required_str(params, "role")?.as_str() {
        "teacher" => Role::Teacher,
        "student" => Role::Student,
        other => {
            return Err(HandlerErr::bad_params(format!(
                "role must be teacher or student, got {}",
                other
            )))
        }
    };
    // Roll and parent details only apply to student contacts; a
    // teacher contact drops them silently.
    let (roll_number, parent_whatsapp, parent_gmail) = if role == Role::Student {
        (
            Some(get_required_str(params, "rollNumber")?),
            get_optional_str(params, "parentWhatsapp"),
            get_optional_str(params, "parentGmail"),
        )
    } else {
        (None, None, None)
    };
    let whatsapp = get_optional_str(params, "whatsapp");
    let gmail = get_optional_str(params, "gmail");

    let mut contacts = COLLECTION.load(conn)?;
    let contact = match get_optional_str(params, "contactId") {
        Some(contact_id) => {
            let Some(slot) = contacts.iter_mut().find(|c| c.id == contact_id) else {
                return Err(HandlerErr::not_found("contact not found"));
            };
            slot.name = name;
            slot.role = role;
            slot.roll_number = roll_number;
            slot.whatsapp = whatsapp;
            slot.gmail = gmail;
            slot.parent_whatsapp = parent_whatsapp;
            slot.parent_gmail = parent_gmail;
            slot.clone()
        }
        None => {
            let contact = Contact {
                id: new_record_id(),
                name,
                role,
                roll_number,
                whatsapp,
                gmail,
                parent_whatsapp,
                parent_gmail,
                added_by: current_user_name(conn),
            };
            contacts.push(contact.clone());
            contact
        }
    };
    COLLECTION.replace(conn, &contacts)?;
    Ok(json!({ "contact": contact }))
}

fn contacts_delete(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let contact_id = get_required_str(params, "contactId")?;
    let mut contacts = COLLECTION.load(conn)?;
    let before = contacts.len();
    contacts.retain(|c| c.id != contact_id);
    if contacts.len() == before {
        return Err(HandlerErr::not_found("contact not found"));
    }
    COLLECTION.replace(conn, &contacts)?;
    Ok(json!({ "ok": true }))
}

fn dispatch(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match require_store(&state.store) {
        Ok(c) => c,
        Err(e) => return e.response(&req.id),
    };
    let outcome = match req.method.as_str() {
        "contacts.list" => contacts_list(conn),
        "contacts.save" => contacts_save(conn, &req.params),
        _ => contacts_delete(conn, &req.params),
    };
    match outcome {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "contacts.list" | "contacts.save" | "contacts.delete" => Some(dispatch(state, req)),
        _ => None,
    }
}
