//! Reading time estimation

use super::html::strip_html;

/// Words read per minute
const WORDS_PER_MINUTE: f64 = 200.0;

/// Estimated reading time of a body of text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingTime {
    pub minutes: f64,
    pub words: usize,
}

impl ReadingTime {
    /// Human readable form, e.g. "3 min read"
    pub fn text(&self) -> String {
        let minutes = self.minutes.ceil().max(1.0) as u64;
        format!("{} min read", minutes)
    }
}

/// Estimate reading time of markdown or plain text
pub fn estimate_reading_time(text: &str) -> ReadingTime {
    let words = count_words(text);
    ReadingTime {
        minutes: words as f64 / WORDS_PER_MINUTE,
        words,
    }
}

/// Count words; each CJK character counts as one word
pub fn count_words(text: &str) -> usize {
    let mut count = 0;
    let mut in_word = false;

    for c in strip_html(text).chars() {
        if is_cjk(c) {
            count += 1;
            in_word = false;
        } else if c.is_alphanumeric() {
            if !in_word {
                in_word = true;
                count += 1;
            }
        } else if in_word && (c == '\'' || c == '-') {
            // contractions and hyphenated words
        } else {
            in_word = false;
        }
    }

    count
}

fn is_cjk(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
        || ('\u{3040}'..='\u{30FF}').contains(&c)
        || ('\u{AC00}'..='\u{D7AF}').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_words() {
        assert_eq!(count_words("Hello, world! It's a well-known test."), 6);
        assert_eq!(count_words("<Image src=\"/a.png\" /> two words"), 2);
        assert_eq!(count_words("你好世界 rust"), 5);
    }

    #[test]
    fn test_reading_time_text() {
        assert_eq!(estimate_reading_time("").text(), "1 min read");
        assert_eq!(estimate_reading_time(&"w ".repeat(200)).text(), "1 min read");
        assert_eq!(estimate_reading_time(&"w ".repeat(201)).text(), "2 min read");
    }

    #[test]
    fn test_deterministic() {
        let body = "Some body text with <Audio src=\"/ep1.mp3\" /> in it.";
        assert_eq!(estimate_reading_time(body), estimate_reading_time(body));
    }
}
