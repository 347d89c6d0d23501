pub mod compare;
pub mod scoring;
pub mod timer;
pub mod tokenizer;

pub use compare::{CharMatch, compare_char};
pub use scoring::{WordOutcome, XpRules};
pub use timer::TimerQueue;
pub use tokenizer::{Token, tokenize};
