use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_classdeskd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn classdeskd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

#[test]
fn headwords_are_normalized_and_searchable() {
    let workspace = temp_dir("classdesk-dictionary");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "session.login",
        json!({ "role": "student", "name": "Anisa", "rollNumber": "07" }),
    );

    let added = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "dictionary.upsert",
        json!({ "english": "  Serendipity ", "bangla": "আকস্মিক সৌভাগ্য" }),
    );
    assert_eq!(added["entry"]["english"], "serendipity");
    assert_eq!(added["entry"]["addedBy"], "Anisa");
    let entry_id = added["entry"]["id"].as_str().expect("id").to_string();

    request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "dictionary.upsert",
        json!({ "english": "gratitude", "bangla": "কৃতজ্ঞতা" }),
    );

    let found = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "dictionary.list",
        json!({ "search": "SEREN" }),
    );
    assert_eq!(found["entries"].as_array().expect("entries").len(), 1);

    let found = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "dictionary.list",
        json!({ "search": "কৃতজ্ঞ" }),
    );
    assert_eq!(found["entries"].as_array().expect("entries").len(), 1);
    assert_eq!(found["entries"][0]["english"], "gratitude");

    // Edit by id replaces in place.
    let edited = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "dictionary.upsert",
        json!({ "entryId": entry_id, "english": "serendipity", "bangla": "সৌভাগ্য" }),
    );
    assert_eq!(edited["entry"]["id"].as_str(), Some(entry_id.as_str()));
    let all = request_ok(&mut stdin, &mut reader, "8", "dictionary.list", json!({}));
    assert_eq!(all["entries"].as_array().expect("entries").len(), 2);

    request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "dictionary.delete",
        json!({ "entryId": entry_id }),
    );
    let all = request_ok(&mut stdin, &mut reader, "10", "dictionary.list", json!({}));
    assert_eq!(all["entries"].as_array().expect("entries").len(), 1);

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
