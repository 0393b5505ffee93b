use std::collections::HashMap;

use wordlab_core::WordFrequency;

/// Frequency table over `words`, most frequent first.
///
/// Ties keep first-occurrence order, so identical input order always yields
/// an identical table.
pub fn word_frequencies<'a, I>(words: I) -> Vec<WordFrequency>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut tallies: Vec<(&'a str, u64)> = Vec::new();

    for word in words {
        match index.get(word) {
            Some(&slot) => tallies[slot].1 += 1,
            None => {
                index.insert(word, tallies.len());
                tallies.push((word, 1));
            }
        }
    }

    let total: u64 = tallies.iter().map(|(_, count)| count).sum();
    // sort_by is stable
    tallies.sort_by(|a, b| b.1.cmp(&a.1));

    tallies
        .into_iter()
        .map(|(word, count)| WordFrequency {
            word: word.to_string(),
            count,
            percentage: percentage(count, total),
        })
        .collect()
}

pub fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}

pub fn counts(frequencies: &[WordFrequency]) -> Vec<u64> {
    frequencies.iter().map(|f| f.count).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sorted_by_count_descending() {
        let table = word_frequencies(["a", "b", "b", "c", "b", "c"]);
        let words: Vec<&str> = table.iter().map(|f| f.word.as_str()).collect();
        assert_eq!(words, vec!["b", "c", "a"]);
        assert_eq!(counts(&table), vec![3, 2, 1]);
    }

    #[test]
    fn test_ties_keep_first_occurrence_order() {
        let table = word_frequencies(["pear", "fig", "fig", "pear", "kiwi", "kiwi"]);
        let words: Vec<&str> = table.iter().map(|f| f.word.as_str()).collect();
        assert_eq!(words, vec!["pear", "fig", "kiwi"]);
    }

    #[test]
    fn test_percentages() {
        let table = word_frequencies(["x", "x", "x", "y"]);
        assert_eq!(table[0].percentage, 75.0);
        assert_eq!(table[1].percentage, 25.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(word_frequencies(std::iter::empty()).is_empty());
        assert_eq!(percentage(0, 0), 0.0);
    }
}
