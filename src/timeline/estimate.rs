pub const DEFAULT_WORDS_PER_MINUTE: u32 = 150;

/// Advisory narration length in seconds from a whitespace word count.
///
/// Used for planning and previews only; final cut timing always comes from measured audio.
pub fn estimate_duration(text: &str, words_per_minute: u32) -> f64 {
    if words_per_minute == 0 {
        return 0.0;
    }
    let words = text.split_whitespace().count();
    words as f64 / f64::from(words_per_minute) * 60.0
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/estimate.rs"]
mod tests;
