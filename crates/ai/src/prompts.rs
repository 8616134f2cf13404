//! Prompt templates. All of them end with the JSON-only (or text-only)
//! contract; `extract` copes with the fences models add anyway.

use chrono::NaiveDate;

use crate::engine::ParsedTransaction;

pub fn classify(text: &str) -> String {
    format!(
        r#"Analyze the following text in Indonesian and determine what type of request it is:

1. Is it about a financial transaction (adding a new expense/income)?
2. Is it a query about existing financial data?
3. Is it just a general conversation?

Use chain of thought to analyze:
1. Does the text mention adding, recording, or inputting money, spending, or income?
2. Does it contain specific amounts or prices for a new transaction?
3. Is it describing a purchase, payment, or earning that happened?
4. Or is it asking questions about existing data (e.g., "what's my biggest expense?", "how much did I spend on food?")?

Text: "{text}"

Return a JSON object with these keys:
- is_transaction: true if it's about adding a new financial transaction, false otherwise
- is_data_query: true if it's asking about existing financial data, false otherwise
- reasoning: brief explanation of your decision
- response: a friendly response to the user (if it's just a conversation)

Only return valid JSON, nothing else."#
    )
}

pub fn parse_transaction(text: &str, today: NaiveDate) -> String {
    format!(
        r#"Extract transaction information from the following text in Indonesian.

Use chain of thought to analyze:
1. Identify the date of the transaction (if not mentioned, use today's date which is {today})
2. Identify the amount - if there are quantities and unit prices, calculate the total
3. Determine if it's an expense or income
4. Categorize the transaction appropriately
5. Extract a brief description/note

Text: "{text}"

Return a JSON object with these keys:
- date: transaction date in YYYY-MM-DD format
- amount: numeric value without currency symbols
- type: either "expense" or "income"
- category: one of these categories: food, transport, shopping, bills, entertainment, health, education, income, or uncategorized
- note: brief description of the transaction
- reasoning: brief explanation of how you calculated the amount

Only return valid JSON, nothing else."#
    )
}

pub fn parse_with_context(text: &str, pending: &ParsedTransaction, today: NaiveDate) -> String {
    format!(
        r#"Analisis teks pengguna berikut dalam konteks transaksi sebelumnya. Tanggal hari ini adalah {today}.

Transaksi Sebelumnya yang Sedang Diproses:
- Tanggal: {date}
- Jumlah: Rp {amount}
- Tipe: {kind}
- Kategori: {category}
- Catatan: {note}

Teks Pengguna Baru: "{text}"

Tugas Anda adalah memutuskan apakah teks baru ini:
1. **Merupakan pembaruan** dari transaksi sebelumnya (misalnya, menambah biaya ongkir, mengubah jumlah, dll.).
2. **Merupakan transaksi baru** yang sama sekali berbeda.
3. Hanya percakapan biasa.

Jika ini adalah pembaruan, hitung total baru dan gabungkan informasinya.
Jika ini adalah transaksi baru, ekstrak informasinya seperti biasa.

Return a JSON object with these keys:
- intent: "update_transaction", "new_transaction", or "conversation"
- date: transaction date in YYYY-MM-DD format
- amount: numeric value without currency symbols (total if updated)
- type: either "expense" or "income"
- category: one of these categories: food, transport, shopping, bills, entertainment, health, education, income, or uncategorized
- note: brief description of the transaction (combine if updated)
- reasoning: brief explanation of your decision

Only return valid JSON, nothing else."#,
        date = pending.date,
        amount = pending.amount.format_idr(),
        kind = pending.kind,
        category = pending.category,
        note = pending.note,
    )
}

pub fn friendly_reply(text: &str) -> String {
    format!(
        r#"Generate a friendly, conversational response to the following text in Indonesian.
The user is talking to a finance chatbot, but this message is not about a transaction or data query.

Text: "{text}"

Your response should:
1. Be friendly and conversational
2. Acknowledge what the user said
3. Gently remind them that you're here to help with financial transactions and data analysis
4. Keep it brief and natural
5. Use Jaksel Indonesia style language such as gw, lo, mantap, etc.

Only return the response text, nothing else."#
    )
}

pub fn answer_data_query(text: &str, data_summary: &str) -> String {
    format!(
        r#"Analyze the following user query about financial data and provide a helpful response based on the data summary.

User query: "{text}"

Data summary:
{data_summary}

Your response should:
1. Directly answer the user's question based on the data
2. Provide specific numbers and details when possible
3. Be conversational and friendly
4. Use Jaksel Indonesia style language such as gw, lo, mantap, etc.
5. If the data doesn't contain enough information to answer the question, explain what data would be needed

Only return the response text, nothing else."#
    )
}
