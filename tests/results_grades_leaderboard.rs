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

fn add_result(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    name: &str,
    roll: &str,
    marks: [u32; 5],
) -> serde_json::Value {
    let [math, english, science, history, bengali] = marks;
    request_ok(
        stdin,
        reader,
        id,
        "results.add",
        json!({
            "studentName": name,
            "studentRoll": roll,
            "subjects": {
                "Math": math,
                "English": english,
                "Science": science,
                "History": history,
                "Bengali": bengali,
            },
        }),
    )
}

#[test]
fn grades_band_on_percentage_of_500() {
    let workspace = temp_dir("classdesk-grades");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    // 450/500 = 90% -> A+; 445/500 = 89% -> A; 250/500 = 50% -> D;
    // 245/500 = 49% -> F.
    let cases = [
        ([90, 90, 90, 90, 90], 450, "A+"),
        ([89, 89, 89, 89, 89], 445, "A"),
        ([50, 50, 50, 50, 50], 250, "D"),
        ([49, 49, 49, 49, 49], 245, "F"),
    ];
    for (i, (marks, total, grade)) in cases.iter().enumerate() {
        let added = add_result(
            &mut stdin,
            &mut reader,
            &format!("add-{}", i),
            &format!("Student {}", i),
            &format!("{:02}", i + 1),
            *marks,
        );
        assert_eq!(added["result"]["totalMarks"], *total);
        assert_eq!(added["result"]["grade"].as_str(), Some(*grade));
    }

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn leaderboard_ranks_top_three_by_total() {
    let workspace = temp_dir("classdesk-leaderboard");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    add_result(&mut stdin, &mut reader, "a", "Anisa", "07", [80, 80, 80, 80, 80]);
    add_result(&mut stdin, &mut reader, "b", "Rafi", "01", [95, 95, 95, 95, 95]);
    add_result(&mut stdin, &mut reader, "c", "Mitu", "02", [95, 95, 95, 95, 95]);
    add_result(&mut stdin, &mut reader, "d", "Tanvir", "03", [40, 40, 40, 40, 40]);

    let board = request_ok(
        &mut stdin,
        &mut reader,
        "board",
        "results.leaderboard",
        json!({}),
    );
    let rows = board["leaderboard"].as_array().expect("leaderboard");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["rank"], 1);
    // 475-point tie: Rafi was added before Mitu and stays ahead.
    assert_eq!(rows[0]["studentName"], "Rafi");
    assert_eq!(rows[1]["studentName"], "Mitu");
    assert_eq!(rows[2]["studentName"], "Anisa");

    let lookup = request_ok(
        &mut stdin,
        &mut reader,
        "lookup",
        "results.lookup",
        json!({ "rollNumber": "07" }),
    );
    assert_eq!(lookup["result"]["studentName"], "Anisa");

    let missing = request_ok(
        &mut stdin,
        &mut reader,
        "missing",
        "results.lookup",
        json!({ "rollNumber": "99" }),
    );
    assert!(missing["result"].is_null());

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
