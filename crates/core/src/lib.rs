pub mod amount;
pub mod category;
pub mod money;
pub mod period;
pub mod record;
pub mod sheet_url;

pub use amount::{parse_amount, AmountParseError};
pub use category::Category;
pub use money::Money;
pub use period::{DateRange, Period};
pub use record::{RecordError, SheetRow, TransactionRecord, TxKind};
pub use sheet_url::extract_spreadsheet_id;
