// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::api::propagation::propagate_window;
use crate::api::Propagation;
use crate::engine::manager::TransactionManager;
use crate::engine_core::traits::HostString;
use crate::engine_core::types::TransactionKey;

/// ECMAScript WhiteSpace or LineTerminator. Unlike `char::is_whitespace`
/// this excludes U+0085 (NEL).
fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\u{b}'
            | '\u{c}'
            | '\r'
            | ' '
            | '\u{a0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200a}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202f}'
            | '\u{205f}'
            | '\u{3000}'
            | '\u{feff}'
    )
}

/// Whitespace as `String.prototype.trim` sees it, in UTF-16 units.
fn leading_whitespace(text: &str) -> usize {
    text.chars()
        .take_while(|c| is_js_whitespace(*c))
        .map(char::len_utf16)
        .sum()
}

pub fn trim<S: HostString>(
    manager: &mut TransactionManager<S::Weak>,
    transaction: TransactionKey,
    result: &S,
    subject: &S,
) -> Propagation {
    let left = leading_whitespace(&subject.to_utf8());
    let end = left + result.len_utf16();
    propagate_window("trim", manager, transaction, result, subject, left, end)
}

pub fn trim_start<S: HostString>(
    manager: &mut TransactionManager<S::Weak>,
    transaction: TransactionKey,
    result: &S,
    subject: &S,
) -> Propagation {
    let left = leading_whitespace(&subject.to_utf8());
    let end = left + result.len_utf16();
    propagate_window("trim_start", manager, transaction, result, subject, left, end)
}

pub fn trim_end<S: HostString>(
    manager: &mut TransactionManager<S::Weak>,
    transaction: TransactionKey,
    result: &S,
    subject: &S,
) -> Propagation {
    let end = result.len_utf16();
    propagate_window("trim_end", manager, transaction, result, subject, 0, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_whitespace_units() {
        assert_eq!(leading_whitespace("  \tabc "), 3);
        assert_eq!(leading_whitespace("\u{feff}\u{3000}x"), 2);
        assert_eq!(leading_whitespace("abc"), 0);
        assert_eq!(leading_whitespace("   "), 3);
        assert_eq!(leading_whitespace("\u{2028}\u{a0}x"), 2);
    }

    #[test]
    fn test_next_line_is_not_trimmed() {
        assert_eq!(leading_whitespace("\u{85}abc"), 0);
        assert_eq!(leading_whitespace(" \u{85} "), 1);
        assert!(!is_js_whitespace('\u{85}'));
        assert!(!is_js_whitespace('\u{180e}'));
    }
}
