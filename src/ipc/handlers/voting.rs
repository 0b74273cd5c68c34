use crate::calc;
use crate::ipc::error::ok;
use crate::ipc::helpers::{get_required_str, require_store, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{new_record_id, Candidate, Vote};
use crate::store::{Collection, CANDIDATES, VOTES};
use chrono::Utc;
use rusqlite::Connection;
use serde_json::json;

const CANDIDATE_COLLECTION: Collection<Candidate> = Collection::new(CANDIDATES);
const VOTE_COLLECTION: Collection<Vote> = Collection::new(VOTES);

fn voting_open(conn: &Connection) -> Result<serde_json::Value, HandlerErr> {
    let candidates = CANDIDATE_COLLECTION.load(conn)?;
    let votes = VOTE_COLLECTION.load(conn)?;
    let tallies = calc::tally_votes(&candidates, &votes);
    let leading = tallies
        .first()
        .filter(|t| t.votes > 0)
        .map(|t| t.name.clone());
    Ok(json!({
        "candidates": tallies,
        "candidateCount": candidates.len(),
        "totalVotes": votes.len(),
        "leadingCandidate": leading,
    }))
}

fn voting_add_candidate(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let candidate = Candidate {
        id: new_record_id(),
        name: get_required_str(params, "name")?,
        roll_number: get_required_str(params, "rollNumber")?,
    };
    let mut candidates = CANDIDATE_COLLECTION.load(conn)?;
    candidates.push(candidate.clone());
    CANDIDATE_COLLECTION.replace(conn, &candidates)?;
    Ok(json!({ "candidate": candidate }))
}

fn voting_cast(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let candidate_id = get_required_str(params, "candidateId")?;
    let voter_roll = get_required_str(params, "voterRoll")?;

    let candidates = CANDIDATE_COLLECTION.load(conn)?;
    if !candidates.iter().any(|c| c.id == candidate_id) {
        return Err(HandlerErr::not_found("candidate not found"));
    }

    let mut votes = VOTE_COLLECTION.load(conn)?;
    if votes.iter().any(|v| v.voter_roll == voter_roll) {
        return Err(HandlerErr::new(
            "already_voted",
            format!("roll {} has already voted", voter_roll),
        ));
    }

    let vote = Vote {
        id: new_record_id(),
        candidate_id,
        voter_roll,
        cast_at: Utc::now(),
    };
    votes.push(vote.clone());
    VOTE_COLLECTION.replace(conn, &votes)?;
    Ok(json!({ "vote": vote }))
}

fn voting_history(conn: &Connection) -> Result<serde_json::Value, HandlerErr> {
    let candidates = CANDIDATE_COLLECTION.load(conn)?;
    let votes = VOTE_COLLECTION.load(conn)?;
    // A vote whose candidate was deleted keeps its row; the name just
    // renders empty, as the dashboard behaved.
    let rows: Vec<serde_json::Value> = votes
        .iter()
        .map(|v| {
            let name = candidates
                .iter()
                .find(|c| c.id == v.candidate_id)
                .map(|c| c.name.as_str())
                .unwrap_or("");
            json!({
                "voterRoll": v.voter_roll,
                "candidateName": name,
                "castAt": v.cast_at,
            })
        })
        .collect();
    Ok(json!({ "votes": rows }))
}

fn voting_delete_candidate(
    conn: &Connection,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let candidate_id = get_required_str(params, "candidateId")?;
    let mut candidates = CANDIDATE_COLLECTION.load(conn)?;
    let before = candidates.len();
    candidates.retain(|c| c.id != candidate_id);
    if candidates.len() == before {
        return Err(HandlerErr::not_found("candidate not found"));
    }
    // Existing votes for the candidate stay; there is no referential
    // cleanup between collections.
    CANDIDATE_COLLECTION.replace(conn, &candidates)?;
    Ok(json!({ "ok": true }))
}

fn dispatch(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match require_store(&state.store) {
        Ok(c) => c,
        Err(e) => return e.response(&req.id),
    };
    let outcome = match req.method.as_str() {
        "voting.open" => voting_open(conn),
        "voting.addCandidate" => voting_add_candidate(conn, &req.params),
        "voting.cast" => voting_cast(conn, &req.params),
        "voting.history" => voting_history(conn),
        _ => voting_delete_candidate(conn, &req.params),
    };
    match outcome {
        Ok(result) => ok(&req.id, result),
        Err(e) => e.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "voting.open" | "voting.addCandidate" | "voting.cast" | "voting.history"
        | "voting.deleteCandidate" => Some(dispatch(state, req)),
        _ => None,
    }
}
