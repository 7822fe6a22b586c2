// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TEXT UTILITIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Utilitários para processamento de texto:
// - Cortes seguros em boundary de caractere
// - Normalização de whitespace
// - Contagem de palavras
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Número de caracteres (não bytes) de um texto
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Maior índice de byte <= `index` que cai em boundary de caractere
pub fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut end = index;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    end
}

/// Índice de byte onde começa o caractere de número `n`
fn byte_offset_of_char(text: &str, n: usize) -> usize {
    text.char_indices()
        .nth(n)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Primeiros `n` caracteres do texto
pub fn take_chars(text: &str, n: usize) -> &str {
    &text[..byte_offset_of_char(text, n)]
}

/// Últimos `n` caracteres do texto
pub fn last_chars(text: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    let total = char_len(text);
    if n >= total {
        return text;
    }
    &text[byte_offset_of_char(text, total - n)..]
}

/// Colapsa qualquer sequência de whitespace em um espaço
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Conta palavras em um texto
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Preview de uma linha para logs: primeiros `max` caracteres + "..."
pub fn preview(text: &str, max: usize) -> String {
    if char_len(text) > max {
        format!("{}...", take_chars(text, max))
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_and_last_chars_unicode() {
        let text = "ação é útil";
        assert_eq!(take_chars(text, 4), "ação");
        assert_eq!(last_chars(text, 4), "útil");
        assert_eq!(take_chars(text, 100), text);
        assert_eq!(last_chars(text, 100), text);
        assert_eq!(last_chars(text, 0), "");
    }

    #[test]
    fn test_floor_char_boundary() {
        let text = "aé";
        // 'é' ocupa os bytes 1..3
        assert_eq!(floor_char_boundary(text, 2), 1);
        assert_eq!(floor_char_boundary(text, 3), 3);
        assert_eq!(floor_char_boundary(text, 10), 3);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("Hello\n\n   world\t test "), "Hello world test");
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("Hello world test"), 3);
        assert_eq!(word_count("  multiple   spaces  "), 2);
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("0123456789abc", 10), "0123456789...");
    }
}
