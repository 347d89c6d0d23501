pub mod cloze_view;
pub mod matching_view;
pub mod progress_bar;
pub mod sentence_view;
pub mod summary_view;
