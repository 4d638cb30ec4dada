// ABOUTME: Bracket matching for (), [] and {} using a stack.
// ABOUTME: Characters other than brackets are ignored.

fn closing_for(open: char) -> Option<char> {
    match open {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        _ => None,
    }
}

fn is_closing(c: char) -> bool {
    matches!(c, ')' | ']' | '}')
}

/// Whether every bracket in `expr` is closed by its partner in the right order.
pub fn is_balanced(expr: &str) -> bool {
    let mut expected: Vec<char> = Vec::new();
    for c in expr.chars() {
        if let Some(close) = closing_for(c) {
            expected.push(close);
        } else if is_closing(c) && expected.pop() != Some(c) {
            return false;
        }
    }
    expected.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced() {
        for expr in ["", "()", "([]{})", "{[()()]}", "fn(a[0], {b})", "no brackets"] {
            assert!(is_balanced(expr), "{expr} should be balanced");
        }
    }

    #[test]
    fn test_unbalanced() {
        for expr in ["(", ")", "(]", "([)]", "{{}", "())(", "}{"] {
            assert!(!is_balanced(expr), "{expr} should not be balanced");
        }
    }
}
