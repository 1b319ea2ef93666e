use std::collections::VecDeque;
use std::io::BufRead;

use indexmap::{IndexMap, IndexSet};
use unicode_normalization::UnicodeNormalization;

use crate::models::LoadError;

/// Hard cap on candidates collected during a prefix walk, independent of the
/// requested suggestion count. Keeps dense subtrees from being enumerated
/// exhaustively for short prefixes.
const COLLECT_CAP: usize = 100;

/// Normalize a word or prefix: trim surrounding whitespace and apply Unicode
/// canonical composition (NFC). Inserts and lookups both go through this so
/// decomposed and composed spellings index identically.
pub fn normalize(s: &str) -> String {
    s.trim().nfc().collect()
}

#[derive(Default)]
struct TrieNode {
    // Insertion-ordered so traversal order is stable across runs.
    children: IndexMap<char, TrieNode>,
    terminal: bool,
    frequency: u64,
}

/// Character-keyed trie over dictionary words. Terminal nodes carry a
/// cumulative frequency; inserting the same word again adds to it.
#[derive(Default)]
pub struct PrefixTrie {
    root: TrieNode,
}

impl PrefixTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a word with the given frequency. The word is normalized first;
    /// an empty (or all-whitespace) word is a no-op.
    pub fn insert(&mut self, word: &str, freq: u64) {
        let word = normalize(word);
        if word.is_empty() {
            return;
        }

        let mut node = &mut self.root;
        for ch in word.chars() {
            node = node.children.entry(ch).or_default();
        }
        node.terminal = true;
        node.frequency += freq;
    }

    /// Load a dictionary from a line-oriented reader. Each non-blank line is
    /// `<word>` or `<word> <frequency>`; a frequency that isn't a plain
    /// non-negative integer falls back to 1. Returns the number of words
    /// inserted. Loading the same data twice accumulates frequencies.
    pub fn load_reader(&mut self, reader: impl BufRead) -> Result<usize, LoadError> {
        let mut n = 0;
        for line in reader.lines() {
            let line = line?;
            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else {
                continue;
            };
            let freq = match parts.next() {
                Some(t) => parse_freq(t).unwrap_or(1),
                None => 1,
            };
            self.insert(word, freq);
            n += 1;
        }
        Ok(n)
    }

    /// Walk to the node for a prefix (normalized), if every character exists.
    fn find_node(&self, prefix: &str) -> Option<&TrieNode> {
        let mut node = &self.root;
        for ch in normalize(prefix).chars() {
            node = node.children.get(&ch)?;
        }
        Some(node)
    }
}

/// Parse a frequency/count token: digits only, no sign.
pub(crate) fn parse_freq(t: &str) -> Option<u64> {
    if t.is_empty() || !t.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    t.parse().ok()
}

/// Ranked prefix lookup over a PrefixTrie, with a single-edit fuzzy fallback.
pub struct SuggestionEngine {
    trie: PrefixTrie,
    // Letters tried for fuzzy substitutions and insertions.
    alphabet: Vec<char>,
}

impl SuggestionEngine {
    pub fn new(alphabet: Vec<char>) -> Self {
        Self {
            trie: PrefixTrie::new(),
            alphabet,
        }
    }

    /// The default fuzzy alphabet: the Devanagari block U+0900..U+097F.
    pub fn devanagari_alphabet() -> Vec<char> {
        (0x0900..0x097F).filter_map(char::from_u32).collect()
    }

    pub fn insert(&mut self, word: &str, freq: u64) {
        self.trie.insert(word, freq);
    }

    pub fn load_reader(&mut self, reader: impl BufRead) -> Result<usize, LoadError> {
        self.trie.load_reader(reader)
    }

    /// Words matching a prefix exactly, ranked by frequency descending with a
    /// lexicographic tie-break, truncated to `max`. The subtree walk is
    /// breadth-first and stops once COLLECT_CAP candidates are gathered.
    pub fn starts_with(&self, prefix: &str, max: usize) -> Vec<String> {
        let prefix = normalize(prefix);
        let Some(node) = self.trie.find_node(&prefix) else {
            return Vec::new();
        };

        let mut found: Vec<(String, u64)> = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back((node, prefix));

        while let Some((node, word)) = queue.pop_front() {
            if found.len() >= COLLECT_CAP {
                break;
            }
            if node.terminal {
                found.push((word.clone(), node.frequency));
            }
            for (ch, child) in &node.children {
                let mut w = word.clone();
                w.push(*ch);
                queue.push_back((child, w));
            }
        }

        found.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        found.truncate(max);
        found.into_iter().map(|(w, _)| w).collect()
    }

    /// Single-edit fuzzy lookup: prefix matches for the query itself, every
    /// one-character substitution and insertion drawn from the configured
    /// alphabet, and every one-character deletion. Results are de-duplicated
    /// and kept in first-generated order, truncated to `max`. No frequency
    /// ranking is applied across variants.
    pub fn fuzzy_search(&self, prefix: &str, max: usize) -> Vec<String> {
        let prefix = normalize(prefix);
        let chars: Vec<char> = prefix.chars().collect();

        let mut out: IndexSet<String> = IndexSet::new();
        out.extend(self.starts_with(&prefix, max));

        // Substitutions.
        for i in 0..chars.len() {
            for &l in &self.alphabet {
                let mut v = chars.clone();
                v[i] = l;
                out.extend(self.starts_with(&v.iter().collect::<String>(), max));
            }
        }

        // Insertions.
        for i in 0..=chars.len() {
            for &l in &self.alphabet {
                let mut v = chars.clone();
                v.insert(i, l);
                out.extend(self.starts_with(&v.iter().collect::<String>(), max));
            }
        }

        // Deletions.
        for i in 0..chars.len() {
            let mut v = chars.clone();
            v.remove(i);
            out.extend(self.starts_with(&v.iter().collect::<String>(), max));
        }

        out.into_iter().take(max).collect()
    }

    /// Exact prefix matches if there are any, otherwise the fuzzy fallback.
    pub fn autocomplete(&self, prefix: &str, max: usize) -> Vec<String> {
        let suggestions = self.starts_with(prefix, max);
        if !suggestions.is_empty() {
            return suggestions;
        }
        self.fuzzy_search(prefix, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn engine() -> SuggestionEngine {
        SuggestionEngine::new(SuggestionEngine::devanagari_alphabet())
    }

    #[test]
    fn normalize_trims_and_composes() {
        assert_eq!(normalize("  app  "), "app");
        // e + combining acute composes to é.
        assert_eq!(normalize("e\u{0301}"), "\u{00e9}");
        // Idempotent.
        assert_eq!(normalize(&normalize("e\u{0301}")), "\u{00e9}");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn insert_accumulates_frequency() {
        let mut e = engine();
        e.insert("app", 3);
        e.insert("app", 2);
        e.insert("apple", 5);

        // app accumulated 3+2=5, tying with apple at 5; the tie breaks
        // lexicographically.
        assert_eq!(e.starts_with("ap", 10), vec!["app", "apple"]);
    }

    #[test]
    fn ranking_frequency_then_lexicographic() {
        let mut e = engine();
        e.insert("app", 3);
        e.insert("apple", 5);
        assert_eq!(e.starts_with("ap", 10), vec!["apple", "app"]);

        e.insert("apt", 5);
        // apple and apt tie at 5, lexicographic order between them.
        assert_eq!(e.starts_with("ap", 10), vec!["apple", "apt", "app"]);
    }

    #[test]
    fn empty_or_unknown_prefix() {
        let mut e = engine();
        e.insert("app", 1);
        assert!(e.starts_with("b", 10).is_empty());
        // Empty prefix matches from the root.
        assert_eq!(e.starts_with("", 10), vec!["app"]);
    }

    #[test]
    fn insert_empty_is_noop() {
        let mut e = engine();
        e.insert("   ", 7);
        assert!(e.starts_with("", 10).is_empty());
    }

    #[test]
    fn truncates_to_max() {
        let mut e = engine();
        for (i, w) in ["aa", "ab", "ac", "ad"].iter().enumerate() {
            e.insert(w, (i + 1) as u64);
        }
        assert_eq!(e.starts_with("a", 2), vec!["ad", "ac"]);
    }

    #[test]
    fn collection_cap_bounds_candidates() {
        let mut e = engine();
        for i in 0..150 {
            e.insert(&format!("w{:03}", i), 1);
        }
        // Only 100 candidates are collected before ranking, so even a large
        // max cannot return more.
        assert_eq!(e.starts_with("w", 200).len(), 100);
    }

    #[test]
    fn load_reader_parses_words_and_frequencies() {
        let mut e = engine();
        let data = "apple 5\napp 3\n\nbanana\nberry abc\n";
        let n = e.load_reader(Cursor::new(data)).unwrap();
        assert_eq!(n, 4);

        assert_eq!(e.starts_with("ap", 10), vec!["apple", "app"]);
        // Malformed frequency falls back to 1.
        assert_eq!(e.starts_with("berry", 10), vec!["berry"]);
    }

    #[test]
    fn load_twice_doubles_frequencies() {
        let mut e = engine();
        let data = "low 1\nhigh 9\n";
        e.load_reader(Cursor::new(data)).unwrap();
        e.load_reader(Cursor::new(data)).unwrap();

        // Ordering unchanged; frequencies doubled rather than deduplicated.
        assert_eq!(e.starts_with("", 10), vec!["high", "low"]);
        let mut t = PrefixTrie::new();
        t.load_reader(Cursor::new(data)).unwrap();
        t.load_reader(Cursor::new(data)).unwrap();
        assert_eq!(t.find_node("high").map(|n| n.frequency), Some(18));
    }

    #[test]
    fn autocomplete_prefers_exact_over_fuzzy() {
        let mut e = engine();
        e.insert("नमस्ते", 5);
        e.insert("नमक", 2);

        // Exact prefix hit: no fuzzy variants mixed in.
        assert_eq!(e.autocomplete("नम", 10), vec!["नमस्ते", "नमक"]);
    }

    #[test]
    fn autocomplete_falls_back_to_fuzzy() {
        let mut e = engine();
        e.insert("नमस्ते", 5);

        // "ञम" has no exact match; a single substitution of the first
        // character reaches "नम".
        let out = e.autocomplete("ञम", 10);
        assert_eq!(out, vec!["नमस्ते"]);
    }

    #[test]
    fn fuzzy_alphabet_is_devanagari_only() {
        let mut e = engine();
        e.insert("cat", 1);

        // Latin prefixes can never reach "cat" via substitution or insertion
        // since those draw from the Devanagari block; "cart" only matches via
        // deletion of 'r'.
        assert!(e.fuzzy_search("bat", 10).is_empty());
        assert_eq!(e.fuzzy_search("cart", 10), vec!["cat"]);
    }

    #[test]
    fn fuzzy_deduplicates_variants() {
        let mut e = engine();
        e.insert("नमन", 1);

        // Multiple edits of "नमन" (identity, substitutions of each position
        // with the same letter) all reach the same word; it appears once.
        let out = e.fuzzy_search("नमन", 10);
        assert_eq!(out, vec!["नमन"]);
    }
}
