use std::io::BufRead;

use indexmap::{IndexMap, IndexSet};

use crate::models::LoadError;
use crate::suggest::parse_freq;

/// Bigram counts: previous word -> (next word -> accumulated count).
/// Tokens are stored raw as split on whitespace, with no normalization, so
/// lookups must use the same raw form the dataset was written in.
#[derive(Default)]
pub struct BigramModel {
    model: IndexMap<String, IndexMap<String, u64>>,
}

impl BigramModel {
    /// Add `count` to the (prev, next) pair.
    pub fn record(&mut self, prev: &str, next: &str, count: u64) {
        *self
            .model
            .entry(prev.to_string())
            .or_default()
            .entry(next.to_string())
            .or_default() += count;
    }

    /// Next words for a previous word, ranked by count descending. Equal
    /// counts keep first-insertion order (stable sort over an
    /// insertion-ordered map), not lexicographic order.
    pub fn predict_next(&self, prev: &str, top_k: usize) -> Vec<String> {
        let Some(nexts) = self.model.get(prev) else {
            return Vec::new();
        };

        let mut ranked: Vec<(&String, u64)> = nexts.iter().map(|(w, c)| (w, *c)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.into_iter().take(top_k).map(|(w, _)| w.clone()).collect()
    }
}

#[derive(Default)]
struct CompletionNode {
    children: IndexMap<char, CompletionNode>,
    terminal: bool,
}

/// Trie over next-word tokens only. No frequencies: completion results come
/// back in discovery order, which follows per-node insertion order.
#[derive(Default)]
pub struct CompletionTrie {
    root: CompletionNode,
}

impl CompletionTrie {
    pub fn insert(&mut self, word: &str) {
        let mut node = &mut self.root;
        for ch in word.chars() {
            node = node.children.entry(ch).or_default();
        }
        node.terminal = true;
    }

    /// Words completing `prefix`, up to `top_k`, in preorder over the subtree.
    /// Iterative with an explicit stack so deep tries can't blow the call
    /// stack; children are pushed reversed so pop order matches insertion
    /// order.
    pub fn complete(&self, prefix: &str, top_k: usize) -> Vec<String> {
        let mut node = &self.root;
        for ch in prefix.chars() {
            match node.children.get(&ch) {
                Some(child) => node = child,
                None => return Vec::new(),
            }
        }

        let mut out = Vec::new();
        let mut stack = vec![(node, prefix.to_string())];

        while let Some((node, word)) = stack.pop() {
            if out.len() >= top_k {
                break;
            }
            if node.terminal {
                out.push(word.clone());
            }
            for (ch, child) in node.children.iter().rev() {
                let mut w = word.clone();
                w.push(*ch);
                stack.push((child, w));
            }
        }

        out
    }
}

/// Next-word prediction blended with completion of a partially typed
/// trailing word.
#[derive(Default)]
pub struct Predictor {
    bigrams: BigramModel,
    completions: CompletionTrie,
}

impl Predictor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load bigram pairs from a line-oriented reader. Each non-blank line is
    /// `<prev> <next>` or `<prev> <next> <count>`; lines with fewer than two
    /// tokens are skipped, and a count that isn't a plain non-negative
    /// integer falls back to 1. Every next word is also inserted into the
    /// completion trie. Returns the number of pairs recorded.
    pub fn load_reader(&mut self, reader: impl BufRead) -> Result<usize, LoadError> {
        let mut n = 0;
        for line in reader.lines() {
            let line = line?;
            let mut parts = line.split_whitespace();
            let (Some(prev), Some(next)) = (parts.next(), parts.next()) else {
                continue;
            };
            let count = match parts.next() {
                Some(t) => parse_freq(t).unwrap_or(1),
                None => 1,
            };

            self.bigrams.record(prev, next, count);
            self.completions.insert(next);
            n += 1;
        }
        Ok(n)
    }

    pub fn predict_next_word(&self, prev: &str, top_k: usize) -> Vec<String> {
        self.bigrams.predict_next(prev, top_k)
    }

    pub fn predict_prefix(&self, prefix: &str, top_k: usize) -> Vec<String> {
        self.completions.complete(prefix, top_k)
    }

    /// Blend both models based on the shape of the input:
    /// - empty input: nothing;
    /// - single token: next-word predictions for it, or, when it is unknown
    ///   as a previous word, completions of it as a prefix;
    /// - multiple tokens: next words after the second-to-last token unioned
    ///   with completions of the last (partial) token, first-seen order,
    ///   truncated to `top_k`.
    pub fn hybrid_predict(&self, input: &str, top_k: usize) -> Vec<String> {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        let Some(&last) = tokens.last() else {
            return Vec::new();
        };

        if tokens.len() == 1 {
            let next = self.bigrams.predict_next(last, top_k);
            if !next.is_empty() {
                return next;
            }
            return self.completions.complete(last, top_k);
        }

        let prev = tokens[tokens.len() - 2];
        let mut out: IndexSet<String> = IndexSet::new();
        out.extend(self.bigrams.predict_next(prev, top_k));
        out.extend(self.completions.complete(last, top_k));
        out.into_iter().take(top_k).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn loaded(data: &str) -> Predictor {
        let mut p = Predictor::new();
        p.load_reader(Cursor::new(data)).unwrap();
        p
    }

    #[test]
    fn unknown_prev_word_is_empty() {
        let p = loaded("i am 10\n");
        assert!(p.predict_next_word("you", 5).is_empty());
    }

    #[test]
    fn predict_next_ranks_by_count_then_first_seen() {
        let p = loaded("i am 10\ni like 5\n");
        assert_eq!(p.predict_next_word("i", 5), vec!["am", "like"]);

        // Equal counts keep first-insertion order, not lexicographic.
        let p = loaded("i zebra 3\ni apple 3\n");
        assert_eq!(p.predict_next_word("i", 5), vec!["zebra", "apple"]);
    }

    #[test]
    fn counts_accumulate_across_lines() {
        let p = loaded("i am 2\ni am 3\ni like 4\n");
        assert_eq!(p.predict_next_word("i", 5), vec!["am", "like"]);
    }

    #[test]
    fn load_skips_short_lines_and_defaults_counts() {
        let p = loaded("solo\n\na b\na c xyz\n");
        // "solo" skipped; "a b" and "a c" both count 1, first-seen order.
        assert_eq!(p.predict_next_word("a", 5), vec!["b", "c"]);
    }

    #[test]
    fn predict_prefix_is_discovery_order() {
        let p = loaded("x yes\nx yellow\nx apple 100\n");
        // Completion results follow trie insertion order, not counts.
        assert_eq!(p.predict_prefix("y", 5), vec!["yes", "yellow"]);
        assert!(p.predict_prefix("z", 5).is_empty());
    }

    #[test]
    fn predict_prefix_respects_top_k() {
        let p = loaded("x aa\nx ab\nx ac\n");
        assert_eq!(p.predict_prefix("a", 2), vec!["aa", "ab"]);
    }

    #[test]
    fn hybrid_single_token_prefers_next_word() {
        let p = loaded("i am 10\ni like 5\n");
        // "i" is a known previous word; the next-word path wins even though
        // nothing in the completion trie starts with "i".
        assert_eq!(p.hybrid_predict("i", 5), vec!["am", "like"]);
    }

    #[test]
    fn hybrid_single_token_falls_back_to_prefix() {
        let p = loaded("go away\ngo ahead\n");
        // "a" is not a previous word; complete it from next-word tokens.
        assert_eq!(p.hybrid_predict("a", 5), vec!["away", "ahead"]);
    }

    #[test]
    fn hybrid_multi_token_unions_both_paths() {
        let p = loaded("q yes\nq yellow\n");
        // "x" is unknown as a previous word; only the prefix path of the
        // trailing "y" contributes, in discovery order.
        assert_eq!(p.hybrid_predict("x y", 5), vec!["yes", "yellow"]);
    }

    #[test]
    fn hybrid_multi_token_dedups_and_truncates() {
        let p = loaded("i am 10\ni and 5\nz and\nz ant\nz any\n");
        // prev = "i" gives [am, and]; prefix "an" completes [and, ant, any];
        // "and" appears once and the union truncates to top_k.
        assert_eq!(p.hybrid_predict("i an", 3), vec!["am", "and", "ant"]);
    }

    #[test]
    fn hybrid_empty_input() {
        let p = loaded("i am\n");
        assert!(p.hybrid_predict("", 5).is_empty());
        assert!(p.hybrid_predict("   ", 5).is_empty());
    }
}
