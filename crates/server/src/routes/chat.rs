use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use mabot_ai::{Intent, ParsedTransaction};
use mabot_analyzer::data_summary;
use mabot_core::TxKind;

use crate::error::AppError;
use crate::session::AuthUser;
use crate::state::AppState;

const MANUAL_PROMPT: &str = "Maaf, saya tidak bisa memahami detail transaksinya. Coba tulis ulang dengan tanggal, jumlah dan keterangan, atau gunakan form transaksi manual.";
const NO_SHEET_PROMPT: &str =
    "Hubungkan spreadsheet terlebih dahulu untuk melihat data keuangan Anda.";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub spreadsheet_id: Option<String>,
    /// A previously parsed transaction the user has not confirmed yet. The
    /// API is stateless; the client echoes it back with each message.
    pub pending: Option<ParsedTransaction>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<ParsedTransaction>,
}

impl ChatResponse {
    fn plain(reply: impl Into<String>) -> Self {
        ChatResponse { reply: reply.into(), pending: None }
    }
}

fn kind_label(kind: TxKind) -> &'static str {
    match kind {
        TxKind::Expense => "pengeluaran",
        TxKind::Income => "pemasukan",
    }
}

fn confirmation_reply(txn: &ParsedTransaction) -> String {
    let reasoning = txn
        .reasoning
        .as_deref()
        .filter(|r| !r.trim().is_empty())
        .map(|r| format!("\n\nPerhitungan: {r}"))
        .unwrap_or_default();
    format!(
        "Saya telah mengenali transaksi berikut:\n\nTanggal: {}\nJumlah: Rp {}\nTipe: {}\nKategori: {}\nCatatan: {}{}\n\nApakah Anda ingin menyimpannya?",
        txn.date,
        txn.amount.format_idr(),
        kind_label(txn.kind),
        txn.category,
        txn.note,
        reasoning
    )
}

/// One turn of conversation: classify, then route to data analysis,
/// transaction parsing or small talk. A successful parse is returned as a
/// pending transaction; nothing is written until the client confirms it via
/// `POST /api/transactions`.
pub async fn chat(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err(AppError::BadRequest("message is empty".into()));
    }
    let today = Utc::now().date_naive();

    // An unconfirmed transaction reframes the whole turn: the message may be
    // a correction to it, a brand new transaction, or unrelated chatter.
    if let Some(pending) = &req.pending {
        let response = match state.engine.parse_with_context(message, pending, today).await {
            Ok(parsed) => match (parsed.intent, parsed.transaction) {
                (Intent::Conversation, _) => ChatResponse {
                    reply: state.engine.friendly_reply(message).await,
                    pending: Some(pending.clone()),
                },
                (_, Some(txn)) => ChatResponse {
                    reply: confirmation_reply(&txn),
                    pending: Some(txn),
                },
                (_, None) => ChatResponse::plain(MANUAL_PROMPT),
            },
            Err(e) => {
                info!(error = %e, "contextual parse failed");
                ChatResponse::plain(MANUAL_PROMPT)
            }
        };
        return Ok(Json(response));
    }

    let classification = state.engine.classify(message).await;

    if classification.is_data_query {
        let Some(sheet_id) = req.spreadsheet_id.as_deref() else {
            return Ok(Json(ChatResponse::plain(NO_SHEET_PROMPT)));
        };
        super::ensure_owned(&state, user.id, sheet_id).await?;
        let rows = state.sheets.read_rows(sheet_id).await?;
        let digest = data_summary(&rows, today);
        let reply = state.engine.answer_data_query(message, &digest).await;
        return Ok(Json(ChatResponse::plain(reply)));
    }

    if classification.is_transaction {
        let response = match state.engine.parse_transaction(message, today).await {
            Ok(txn) => ChatResponse {
                reply: confirmation_reply(&txn),
                pending: Some(txn),
            },
            Err(e) => {
                info!(error = %e, "transaction parse failed");
                ChatResponse::plain(MANUAL_PROMPT)
            }
        };
        return Ok(Json(response));
    }

    let reply = if classification.response.trim().is_empty() {
        state.engine.friendly_reply(message).await
    } else {
        classification.response
    };
    Ok(Json(ChatResponse::plain(reply)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mabot_core::{Category, Money};

    fn txn(reasoning: Option<&str>) -> ParsedTransaction {
        ParsedTransaction {
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            amount: Money::from_f64(50_000.0).unwrap(),
            kind: TxKind::Expense,
            category: Category::Food,
            note: "nasi goreng".to_string(),
            reasoning: reasoning.map(|r| r.to_string()),
        }
    }

    #[test]
    fn confirmation_reply_lists_all_fields() {
        let reply = confirmation_reply(&txn(None));
        assert!(reply.contains("Tanggal: 2025-03-10"));
        assert!(reply.contains("Jumlah: Rp 50.000,00"));
        assert!(reply.contains("Tipe: pengeluaran"));
        assert!(reply.contains("Kategori: food"));
        assert!(reply.contains("Catatan: nasi goreng"));
        assert!(reply.contains("Apakah Anda ingin menyimpannya?"));
        assert!(!reply.contains("Perhitungan"));
    }

    #[test]
    fn confirmation_reply_includes_reasoning_when_present() {
        let reply = confirmation_reply(&txn(Some("50k = 50.000")));
        assert!(reply.contains("Perhitungan: 50k = 50.000"));
    }

    #[test]
    fn pending_is_omitted_from_json_when_absent() {
        let body = serde_json::to_value(ChatResponse::plain("halo")).unwrap();
        assert_eq!(body, serde_json::json!({ "reply": "halo" }));
    }
}
