use crate::ipc::error::ok;
use crate::ipc::helpers::{get_required_str, require_store, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{new_record_id, Student};
use crate::store::{Collection, STUDENTS};
use rusqlite::Connection;
use serde_json::json;

const COLLECTION: Collection<Student> = Collection::new(STUDENTS);

fn students_list(conn: &Connection) -> Result<serde_json::Value, HandlerErr> {
    let students = COLLECTION.load(conn)?;
    Ok(json!({ "students": students }))
}

fn students_create(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student = Student {
        id: new_record_id(),
        name: get_required_str(params, "name")?,
        roll_number: get_required_str(params, "rollNumber")?,
        section: get_required_str(params, "section")?,
        class: get_required_str(params, "class")?,
    };
    let mut students = COLLECTION.load(conn)?;
    students.push(student.clone());
    COLLECTION.replace(conn, &students)?;
    Ok(json!({ "student": student }))
}

fn students_update(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let name = get_required_str(params, "name")?;
    let roll_number = get_required_str(params, "rollNumber")?;
    let section = get_required_str(params, "section")?;
    let class = get_required_str(params, "class")?;

    let mut students = COLLECTION.load(conn)?;
    let Some(slot) = students.iter_mut().find(|s| s.id == student_id) else {
        return Err(HandlerErr::not_found("student not found"));
    };
    // Replace in place; position and id are preserved.
    slot.name = name;
    slot.roll_number = roll_number;
    slot.section = section;
    slot.class = class;
    let updated = slot.clone();
    COLLECTION.replace(conn, &students)?;
    Ok(json!({ "student": updated }))
}

fn students_delete(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let student_id = get_required_str(params, "studentId")?;
    let mut students = COLLECTION.load(conn)?;
    let before = students.len();
    students.retain(|s| s.id != student_id);
    if students.len() == before {
        return Err(HandlerErr::not_found("student not found"));
    }
    COLLECTION.replace(conn, &students)?;
    Ok(json!({ "ok": true }))
}

fn dispatch(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match require_store(&state.store) {
        Ok(c) => c,
        Err(e) => return e.response(&req.id),
    };
    let outcome = match req.method.as_str() {
        "students.list" => students_list(conn),
        "students.create" => students_create(conn, &req.params),
        "students.update" => students_update(conn, &req.params),
        _ => students_delete(conn, &req.params),
    };
    match outcome {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" | "students.create" | "students.update" | "students.delete" => {
            Some(dispatch(state, req))
        }
        _ => None,
    }
}
