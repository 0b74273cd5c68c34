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
fn monthly_totals_and_overall_average() {
    let workspace = temp_dir("classdesk-budget");
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
        json!({ "role": "teacher", "name": "Ms. Rahman" }),
    );

    request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "budget.create",
        json!({
            "studentRoll": "07",
            "category": "transport",
            "description": "bus pass",
            "amount": 150,
            "date": "2024-03-10",
        }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "budget.create",
        json!({
            "studentRoll": "07",
            "category": "food",
            "description": "tiffin",
            "amount": 50,
            "date": "2024-04-02",
        }),
    );

    let march = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "budget.monthly",
        json!({ "month": "2024-03" }),
    );
    assert_eq!(march["total"], 150.0);
    assert_eq!(march["entries"].as_array().expect("entries").len(), 1);
    assert_eq!(march["categoryTotals"]["transport"], 150.0);
    // 200 spent over two distinct months.
    assert_eq!(march["averagePerMonth"], 100);

    let entries = request_ok(&mut stdin, &mut reader, "6", "budget.list", json!({}));
    assert_eq!(entries["entries"][0]["addedBy"], "Ms. Rahman");

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn monthly_summary_can_narrow_to_one_roll() {
    let workspace = temp_dir("classdesk-budget-roll");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    for (i, (roll, amount)) in [("07", 30), ("08", 70)].iter().enumerate() {
        request_ok(
            &mut stdin,
            &mut reader,
            &format!("add-{}", i),
            "budget.create",
            json!({
                "studentRoll": roll,
                "category": "personal",
                "description": "stationery",
                "amount": amount,
                "date": "2024-03-15",
            }),
        );
    }

    let mine = request_ok(
        &mut stdin,
        &mut reader,
        "mine",
        "budget.monthly",
        json!({ "month": "2024-03", "rollNumber": "07" }),
    );
    assert_eq!(mine["total"], 30.0);
    assert_eq!(mine["entries"].as_array().expect("entries").len(), 1);

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
