use crate::db::board_store::{load_board, save_board};
use crate::db::Database;
use crate::domain::board::SiteBoard;
use crate::domain::filter::RecordFilter;
use crate::domain::market::MarketResolver;
use crate::domain::site::Stage;
use crate::errors::ServerError;
use crate::mailings::{dispatch_notice, Notifier};
use crate::responses::{json_response, ok_response, xlsx_response};
use crate::responses::ResultResp;
use crate::spreadsheets::export_board_xlsx;
use astra::Request;
use chrono::Utc;
use serde_json::json;
use std::sync::{Arc, Mutex};

/// Everything a request handler needs.
pub struct AppContext {
    pub db: Database,
    pub resolver: MarketResolver,
    pub notifier: Arc<dyn Notifier>,
    /// The board invariants assume serial mutation. Requests are handled
    /// on a worker pool, so a single writer lock stands in for the
    /// original's one-user-action-at-a-time model.
    pub board_lock: Mutex<()>,
}

impl AppContext {
    pub fn new(db: Database, resolver: MarketResolver, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            db,
            resolver,
            notifier,
            board_lock: Mutex::new(()),
        }
    }
}

pub fn handle(req: Request, ctx: &AppContext) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let params = parse_query(&req);

    let _guard = ctx
        .board_lock
        .lock()
        .map_err(|_| ServerError::InternalError)?;

    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    match (method.as_str(), segments.as_slice()) {
        ("POST", ["rows", "add"]) => {
            let mut board = expired_board(ctx)?;
            let record = board.add_record().clone();
            save_board(&ctx.db, &board)?;
            json_response(&record)
        }

        ("POST", ["rows", index, "update"]) => {
            let index = parse_index(index)?;
            let field = params
                .get("field")
                .ok_or_else(|| ServerError::BadRequest("Missing 'field' parameter".into()))?;
            let value = params.get("value").map(String::as_str).unwrap_or("");

            let mut board = expired_board(ctx)?;
            board.update_field(Stage::Ongoing, index, field, value, &ctx.resolver)?;
            save_board(&ctx.db, &board)?;
            json_response(&board.ongoing[index])
        }

        ("POST", ["rows", index, "soak"]) => {
            let index = parse_index(index)?;
            let mut board = expired_board(ctx)?;
            let notice = board.move_to_soak(index, Utc::now())?;
            save_board(&ctx.db, &board)?;
            // The move is already saved; delivery runs detached and its
            // outcome cannot undo it.
            dispatch_notice(ctx.notifier.clone(), notice);
            ok_response()
        }

        ("POST", ["rows", index, "cancel"]) => {
            let index = parse_index(index)?;
            let mut board = expired_board(ctx)?;
            let notice = board.cancel_record(index, Utc::now())?;
            save_board(&ctx.db, &board)?;
            dispatch_notice(ctx.notifier.clone(), notice);
            ok_response()
        }

        // Addressing a record by stage name. Only Ongoing records are
        // mutable, so this surfaces InvalidStage for the other two.
        ("POST", [stage, index, "update"]) => {
            let stage = parse_stage(stage)?;
            let index = parse_index(index)?;
            let field = params
                .get("field")
                .ok_or_else(|| ServerError::BadRequest("Missing 'field' parameter".into()))?;
            let value = params.get("value").map(String::as_str).unwrap_or("");

            let mut board = expired_board(ctx)?;
            board.update_field(stage, index, field, value, &ctx.resolver)?;
            save_board(&ctx.db, &board)?;
            json_response(&board.ongoing[index])
        }

        ("POST", [stage, index, "delete"]) => {
            let stage = parse_stage(stage)?;
            let index = parse_index(index)?;
            let mut board = expired_board(ctx)?;
            board.delete_record(stage, index)?;
            save_board(&ctx.db, &board)?;
            ok_response()
        }

        ("POST", ["expire"]) => {
            let mut board = load_board(&ctx.db)?;
            let removed = board.expire_stale(Utc::now());
            if removed > 0 {
                save_board(&ctx.db, &board)?;
            }
            json_response(&json!({ "removed": removed }))
        }

        ("GET", ["export.xlsx"]) => {
            let board = expired_board(ctx)?;
            let buffer = export_board_xlsx(&board)?;
            xlsx_response(buffer, "site_tracker.xlsx")
        }

        ("GET", [stage]) => {
            let stage = parse_stage(stage)?;
            let board = expired_board(ctx)?;
            let filter = RecordFilter::from_query(&params);
            let view = filter.view(board.stage(stage));
            let records: Vec<_> = view.iter().collect();
            json_response(&records)
        }

        _ => Err(ServerError::NotFound),
    }
}

/// Loads the board, dropping anything past its retention window first.
/// This replaces the original's render-driven cleanup: every request sees
/// an already-expired board. A save only happens when something was
/// removed.
fn expired_board(ctx: &AppContext) -> Result<SiteBoard, ServerError> {
    let mut board = load_board(&ctx.db)?;
    if board.expire_stale(Utc::now()) > 0 {
        save_board(&ctx.db, &board)?;
    }
    Ok(board)
}

fn parse_stage(s: &str) -> Result<Stage, ServerError> {
    Stage::parse(s).ok_or(ServerError::NotFound)
}

fn parse_index(s: &str) -> Result<usize, ServerError> {
    s.parse()
        .map_err(|_| ServerError::BadRequest(format!("Invalid index: {s}")))
}

fn parse_query(req: &astra::Request) -> std::collections::HashMap<String, String> {
    let mut map = std::collections::HashMap::new();

    if let Some(q) = req.uri().query() {
        for pair in q.split('&') {
            let mut parts = pair.splitn(2, '=');
            if let (Some(k), Some(v)) = (parts.next(), parts.next()) {
                map.insert(k.to_string(), percent_decode(v));
            }
        }
    }

    map
}

/// Minimal decoder for the two encodings form values actually arrive
/// with: '+' for space and %XX escapes.
fn percent_decode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
                match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    Some(byte) => {
                        out.push(byte);
                        i += 3;
                    }
                    None => {
                        out.push(bytes[i]);
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
