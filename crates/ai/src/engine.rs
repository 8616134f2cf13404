use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use mabot_core::{parse_amount, Category, Money, TxKind};

use crate::extract::parse_json;
use crate::model::LanguageModel;
use crate::{prompts, AiError};

const MAX_TOKENS: u32 = 512;
const MAX_TOKENS_LONG: u32 = 1024;

const FRIENDLY_FALLBACK: &str = "Maaf, saya tidak dapat memproses pesan Anda. Saya di sini untuk membantu mencatat transaksi keuangan Anda dan menganalisis data Anda.";
const ANALYZE_FALLBACK: &str =
    "Maaf, saya tidak dapat menganalisis data Anda saat ini. Silakan coba lagi nanti.";

/// What kind of message the user sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub is_transaction: bool,
    pub is_data_query: bool,
    pub reasoning: String,
    pub response: String,
}

/// A transaction the model extracted, normalized and ready to persist once
/// the user confirms it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTransaction {
    pub date: NaiveDate,
    pub amount: Money,
    #[serde(rename = "type")]
    pub kind: TxKind,
    pub category: Category,
    pub note: String,
    pub reasoning: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    UpdateTransaction,
    NewTransaction,
    Conversation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextualParse {
    pub intent: Intent,
    pub transaction: Option<ParsedTransaction>,
}

// Raw shapes as the model returns them; everything optional so one odd field
// does not discard the whole reply.
#[derive(Deserialize)]
struct RawClassification {
    #[serde(default)]
    is_transaction: bool,
    #[serde(default)]
    is_data_query: bool,
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    response: String,
}

#[derive(Deserialize)]
struct RawTransaction {
    intent: Option<String>,
    date: Option<String>,
    amount: Option<Value>,
    #[serde(rename = "type")]
    kind: Option<String>,
    category: Option<String>,
    note: Option<String>,
    reasoning: Option<String>,
}

fn normalize_amount(value: &Value) -> Result<Money, AiError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .and_then(Money::from_f64)
            .ok_or_else(|| AiError::Unparseable(format!("bad amount: {n}"))),
        Value::String(s) => {
            parse_amount(s).map_err(|e| AiError::Unparseable(e.to_string()))
        }
        other => Err(AiError::Unparseable(format!("bad amount: {other}"))),
    }
}

fn normalize_transaction(raw: RawTransaction, today: NaiveDate) -> Result<ParsedTransaction, AiError> {
    let date = match raw.date.as_deref() {
        None | Some("") => today,
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| AiError::Unparseable(format!("bad date: '{s}'")))?,
    };
    let amount = normalize_amount(
        raw.amount
            .as_ref()
            .ok_or_else(|| AiError::Unparseable("missing amount".to_string()))?,
    )?;
    let kind = raw
        .kind
        .as_deref()
        .ok_or_else(|| AiError::Unparseable("missing type".to_string()))?
        .parse::<TxKind>()
        .map_err(|e| AiError::Unparseable(e.to_string()))?;
    let category = Category::normalize(raw.category.as_deref().unwrap_or(""));

    Ok(ParsedTransaction {
        date,
        amount,
        kind,
        category,
        note: raw.note.unwrap_or_default(),
        reasoning: raw.reasoning,
    })
}

/// The conversation brain: routes raw model text through prompts and
/// normalization. Generic over the model so tests can script replies.
pub struct ChatEngine<M> {
    model: M,
}

impl<M: LanguageModel> ChatEngine<M> {
    pub fn new(model: M) -> Self {
        ChatEngine { model }
    }

    /// Decide whether the text is a new transaction, a data query, or chit
    /// chat. An unreadable model reply defaults to "transaction" so the user
    /// still gets a parse attempt.
    pub async fn classify(&self, text: &str) -> Classification {
        let attempt = async {
            let reply = self.model.generate(&prompts::classify(text), MAX_TOKENS).await?;
            parse_json::<RawClassification>(&reply)
        };
        match attempt.await {
            Ok(raw) => Classification {
                is_transaction: raw.is_transaction,
                is_data_query: raw.is_data_query,
                reasoning: raw.reasoning,
                response: raw.response,
            },
            Err(e) => {
                tracing::warn!(error = %e, "classification failed, defaulting to transaction");
                Classification {
                    is_transaction: true,
                    is_data_query: false,
                    reasoning: "Analysis failed, defaulting to transaction".to_string(),
                    response: String::new(),
                }
            }
        }
    }

    /// Extract a structured transaction. Errors must leave no trace: the
    /// caller prompts for manual entry and writes nothing.
    pub async fn parse_transaction(
        &self,
        text: &str,
        today: NaiveDate,
    ) -> Result<ParsedTransaction, AiError> {
        let reply = self
            .model
            .generate(&prompts::parse_transaction(text, today), MAX_TOKENS)
            .await?;
        let raw: RawTransaction = parse_json(&reply)?;
        normalize_transaction(raw, today)
    }

    /// Re-parse in the context of a pending (unconfirmed) transaction: the
    /// new text may amend it, replace it, or be unrelated chatter. Falls back
    /// to a context-free parse when the contextual reply is unusable.
    pub async fn parse_with_context(
        &self,
        text: &str,
        pending: &ParsedTransaction,
        today: NaiveDate,
    ) -> Result<ContextualParse, AiError> {
        let attempt = async {
            let reply = self
                .model
                .generate(&prompts::parse_with_context(text, pending, today), MAX_TOKENS_LONG)
                .await?;
            let raw: RawTransaction = parse_json(&reply)?;
            let intent = match raw.intent.as_deref() {
                Some("update_transaction") => Intent::UpdateTransaction,
                Some("new_transaction") => Intent::NewTransaction,
                Some("conversation") => Intent::Conversation,
                other => {
                    return Err(AiError::Unparseable(format!("bad intent: {other:?}")));
                }
            };
            let transaction = if intent == Intent::Conversation {
                None
            } else {
                Some(normalize_transaction(raw, today)?)
            };
            Ok(ContextualParse { intent, transaction })
        };

        match attempt.await {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                tracing::info!(error = %e, "contextual parse failed, retrying without context");
                let transaction = self.parse_transaction(text, today).await?;
                Ok(ContextualParse {
                    intent: Intent::NewTransaction,
                    transaction: Some(transaction),
                })
            }
        }
    }

    pub async fn friendly_reply(&self, text: &str) -> String {
        match self.model.generate(&prompts::friendly_reply(text), MAX_TOKENS).await {
            Ok(reply) => reply.trim().to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "friendly reply failed");
                FRIENDLY_FALLBACK.to_string()
            }
        }
    }

    pub async fn answer_data_query(&self, text: &str, data_summary: &str) -> String {
        match self
            .model
            .generate(&prompts::answer_data_query(text, data_summary), MAX_TOKENS_LONG)
            .await
        {
            Ok(reply) => reply.trim().to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "data query answer failed");
                ANALYZE_FALLBACK.to_string()
            }
        }
    }
}
