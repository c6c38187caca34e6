//! Case-permutation enumeration for header names.
//!
//! When the load balancer's target group has no native multi-value header
//! channel, duplicate response headers are conveyed as distinct keys that
//! differ only in letter casing. This module produces every casing of a name
//! in a deterministic order without materializing the full set up front.

/// Lazy iterator over every casing of a name.
///
/// Only ASCII letters toggle; other characters stay fixed. The all-lowercase
/// form comes first and the first letter varies fastest, so for `ab` the order
/// is `ab`, `Ab`, `aB`, `AB`. A name with `n` letters yields `2^n` items; a
/// name without letters (including the empty string) yields itself exactly
/// once.
#[derive(Debug, Clone)]
pub struct AllCasings {
    lower: Vec<char>,
    letters: Vec<usize>,
    upper_mask: Vec<bool>,
    done: bool,
}

/// Enumerates all casings of `input`, lowercase variants first.
#[must_use]
pub fn all_casings(input: &str) -> AllCasings {
    let lower: Vec<char> = input.chars().map(|c| c.to_ascii_lowercase()).collect();
    let letters: Vec<usize> = lower
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_ascii_alphabetic())
        .map(|(i, _)| i)
        .collect();
    let upper_mask = vec![false; letters.len()];
    AllCasings {
        lower,
        letters,
        upper_mask,
        done: false,
    }
}

impl Iterator for AllCasings {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }

        let mut out = self.lower.clone();
        for (&pos, &upper) in self.letters.iter().zip(self.upper_mask.iter()) {
            if upper {
                out[pos] = out[pos].to_ascii_uppercase();
            }
        }

        // Binary increment with the first letter as the least significant bit.
        let mut carry = true;
        for bit in &mut self.upper_mask {
            if *bit {
                *bit = false;
            } else {
                *bit = true;
                carry = false;
                break;
            }
        }
        if carry {
            self.done = true;
        }

        Some(out.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_letter_order() {
        let casings: Vec<String> = all_casings("ab").collect();
        assert_eq!(casings, vec!["ab", "Ab", "aB", "AB"]);
    }

    #[test]
    fn test_non_letters_are_fixed() {
        let casings: Vec<String> = all_casings("x-c").collect();
        assert_eq!(casings, vec!["x-c", "X-c", "x-C", "X-C"]);
    }

    #[test]
    fn test_input_case_is_ignored() {
        let from_upper: Vec<String> = all_casings("AB").collect();
        let from_lower: Vec<String> = all_casings("ab").collect();
        assert_eq!(from_upper, from_lower);
    }

    #[test]
    fn test_empty_string_yields_once() {
        let casings: Vec<String> = all_casings("").collect();
        assert_eq!(casings, vec![""]);
    }

    #[test]
    fn test_no_letters_yields_once() {
        let casings: Vec<String> = all_casings("123").collect();
        assert_eq!(casings, vec!["123"]);
    }

    #[test]
    fn test_restartable() {
        let first: Vec<String> = all_casings("set-cookie").take(4).collect();
        let second: Vec<String> = all_casings("set-cookie").take(4).collect();
        assert_eq!(first, second);
        assert_eq!(first[0], "set-cookie");
        assert_eq!(first[1], "Set-cookie");
    }

    #[test]
    fn test_count_is_two_to_the_letters() {
        assert_eq!(all_casings("abc").count(), 8);
        assert_eq!(all_casings("a-1").count(), 2);
    }
}
