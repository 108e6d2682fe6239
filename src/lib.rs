// Mumbai Kit - Core Library
// Pass formatting, chat line parsing and UPI log summaries, all pure functions

pub mod pass;
pub mod whatsapp;
pub mod upi;

// Re-export commonly used types
pub use pass::{
    ClassType, LocalPass, PassError, Passenger,
    generate_local_pass, generate_local_pass_value, title_case,
    INVALID_PASS, PASS_TITLE,
};
pub use whatsapp::{
    ChatMessage, Sentiment, SentimentRules,
    parse_whatsapp_message, parse_whatsapp_message_value, parse_with_rules,
    parse_chat_export, word_count,
};
pub use upi::{
    Transaction, TransactionType, TransactionSummary, SummaryThresholds, CategoryBreakdown,
    analyze_upi_transactions, analyze_upi_transactions_value, analyze_with_thresholds,
    read_transactions_csv,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
